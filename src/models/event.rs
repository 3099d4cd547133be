use chrono::NaiveDateTime;
use serde::Serialize;

/// A schedulable activity (class, competition, outing) published by a user
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Event {
    pub id: i32,
    /// Unique event name
    pub nom_evenement: String,
    pub date: NaiveDateTime,
    /// Capacity
    pub nbr_place: i32,
    pub categorie: String,
    pub objectif: String,
    /// Active flag, unset for drafts
    pub etat: Option<bool>,
    pub time: NaiveDateTime,
    /// Raw cover image bytes
    pub image: Option<Vec<u8>>,
    /// Creator
    pub user_id: i32,
}

impl Event {
    /// Date part rendered as `YYYY-MM-DD`
    pub fn date_iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Time of day rendered as `HH:MM:SS`
    pub fn time_text(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

/// Listing entry for `GET /evenements`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub id: i32,
    pub nom_evenement: String,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            nom_evenement: event.nom_evenement.clone(),
        }
    }
}
