use crate::{
    error::AppResult,
    models::{Event, ScoredEvent},
};

/// Source of request-scoped catalog sessions
///
/// Handlers open one session per request; the session is released when it
/// is dropped, on success and error paths alike.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn session(&self) -> AppResult<Box<dyn CatalogSession>>;
}

/// Read operations over users, events, reservations and favorites
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSession: Send {
    /// Names of the events the user has reserved, in arbitrary order
    async fn reserved_event_names(&mut self, user_id: i32) -> AppResult<Vec<String>>;

    /// Distinct categories of the events the user has reserved
    async fn reserved_categories(&mut self, user_id: i32) -> AppResult<Vec<String>>;

    /// Events whose category is in `categories` and whose name is not in
    /// `excluded_names`
    async fn events_by_category_excluding(
        &mut self,
        categories: &[String],
        excluded_names: &[String],
    ) -> AppResult<Vec<Event>>;

    /// Aggregate score of each candidate event, skipping excluded names
    async fn score_candidates(
        &mut self,
        candidate_ids: &[i32],
        excluded_names: &[String],
    ) -> AppResult<Vec<ScoredEvent>>;

    /// Every event, ordered by id
    async fn list_events(&mut self) -> AppResult<Vec<Event>>;
}
