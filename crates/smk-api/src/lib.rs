pub mod auth;
pub mod clock;
pub mod concept;
pub mod config;
pub mod error;
pub mod jobs;
pub mod materia;
pub mod metrics;
pub mod middleware;
pub mod notebook;
pub mod outcome;
pub mod points;
pub mod progress;
pub mod ranking;
pub mod router;
pub mod state;
pub mod streak;
pub mod tracing;
pub mod v1;

pub use config::ApiConfig;
pub use outcome::Outcome;
pub use state::{ApiState, AuthConfig, EngineSettings};
