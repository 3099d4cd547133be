/// A user's marker on an event. `loved` and `unloved` are stored
/// independently and may both be set.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Favorite {
    pub id: i32,
    pub loved: bool,
    pub unloved: bool,
    pub user_id: i32,
    pub evenement_id: i32,
}

impl Favorite {
    /// Contribution of this favorite to an event's loved count (0 or 1)
    pub fn loved_count(&self) -> i64 {
        i64::from(self.loved)
    }
}
