use std::sync::Arc;

use crate::{config::InterestMatching, db::CatalogStore};

/// Shared application state
///
/// Holds the session factory, never an open session: each request opens and
/// releases its own.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CatalogStore>,
    pub interest_matching: InterestMatching,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogStore>, interest_matching: InterestMatching) -> Self {
        Self {
            store,
            interest_matching,
        }
    }
}
