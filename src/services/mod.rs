pub mod recommendations;
pub mod scoring;

pub use recommendations::recommend_events;
