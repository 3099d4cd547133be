use chrono::NaiveDateTime;

/// A booking made by a user for an event.
///
/// The event is referenced by id; its current name is always read through
/// the `evenement` table, so renaming an event keeps its reservations.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Reservation {
    pub id: i32,
    pub date_reservation: NaiveDateTime,
    pub nom_participant: String,
    pub user_id: i32,
    pub evenement_id: i32,
}
