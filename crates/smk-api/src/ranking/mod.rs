//! Materia rankings of enrolled students.

mod cache;
mod model;
mod service;

pub use cache::{RankingCache, RankingKey};
pub use model::{RankingEntry, ScoredStudent, UNKNOWN_STUDENT_NAME, rank, top_n};
pub use service::RankingService;
