//! Daily study streaks: detection, persistence and self-healing reads.

mod routes;
mod service;

pub use routes::routes;
pub use service::StreakService;
