use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;

use super::Event;

/// A candidate event with its aggregate score.
///
/// `score` is `None` when nothing was aggregated for the event (no
/// reservations and no favorites).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEvent {
    pub event: Event,
    pub score: Option<f64>,
}

/// One entry of the `GET /recommend/{user_id}` response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedEvent {
    pub id: i32,
    pub nom_evenement: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub time: String,
    /// Base64 cover image, omitted when the event has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub score: f64,
}

impl RecommendedEvent {
    pub fn new(event: &Event, score: f64) -> Self {
        Self {
            id: event.id,
            nom_evenement: event.nom_evenement.clone(),
            date: event.date_iso(),
            time: event.time_text(),
            image: event.image.as_deref().map(|bytes| STANDARD.encode(bytes)),
            score,
        }
    }
}
