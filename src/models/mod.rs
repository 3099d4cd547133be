pub mod event;
pub mod favorite;
pub mod recommendation;
pub mod reservation;
pub mod user;

pub use event::{Event, EventSummary};
pub use favorite::Favorite;
pub use recommendation::{RecommendedEvent, ScoredEvent};
pub use reservation::Reservation;
pub use user::User;
