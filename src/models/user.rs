/// A platform member. Deleting a user removes the events, reservations and
/// favorites they own.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: i32,
    /// Unique login address
    pub email: String,
    /// Display name
    pub nom: String,
    pub telephone: String,
    pub is_verified: bool,
    /// Avatar path, if uploaded
    pub image: Option<String>,
    pub roles: Vec<String>,
}

impl User {
    /// Creates an unverified user with no roles
    pub fn new(id: i32, email: impl Into<String>, nom: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            nom: nom.into(),
            telephone: String::new(),
            is_verified: false,
            image: None,
            roles: Vec::new(),
        }
    }
}
