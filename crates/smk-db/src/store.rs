//! The document-store seam the progress engine reads through.
//!
//! Every capability the engine needs from storage is one method here, so the
//! services can run against Postgres in production and against
//! [`MemoryStore`](crate::memory::MemoryStore) in tests.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    ActivitySource, ActivityWindow, Concept, GamePoints, LearningState, Materia, Notebook,
    QuizResultInsert, QuizStats, SessionQuery, StreakRecord, StudySession, UserProfile,
};

/// Failure of a single store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to the data behind scores, progress and streaks.
pub trait ProgressStore: Send + Sync + 'static {
    /// Concepts of a notebook, in notebook order.
    fn list_concepts(
        &self,
        notebook_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Concept>, StoreError>> + Send;

    /// Learning state of one concept for one user, `None` if never reviewed.
    fn get_learning_state(
        &self,
        user_id: Uuid,
        concept_id: Uuid,
    ) -> impl Future<Output = Result<Option<LearningState>, StoreError>> + Send;

    fn upsert_learning_state(
        &self,
        state: &LearningState,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn list_sessions(
        &self,
        query: &SessionQuery,
    ) -> impl Future<Output = Result<Vec<StudySession>, StoreError>> + Send;

    fn get_quiz_stats(
        &self,
        user_id: Uuid,
        notebook_id: Uuid,
    ) -> impl Future<Output = Result<Option<QuizStats>, StoreError>> + Send;

    /// Store a finished quiz and fold its score into the running statistics.
    fn record_quiz_result(
        &self,
        result: &QuizResultInsert,
    ) -> impl Future<Output = Result<QuizStats, StoreError>> + Send;

    /// Total mini-game points of a user on a notebook.
    fn get_game_points(
        &self,
        user_id: Uuid,
        notebook_id: Uuid,
    ) -> impl Future<Output = Result<GamePoints, StoreError>> + Send;

    fn get_streak(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<StreakRecord>, StoreError>> + Send;

    fn upsert_streak(
        &self,
        record: &StreakRecord,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Whether the user has qualifying activity of `source` inside `window`.
    fn has_activity(
        &self,
        user_id: Uuid,
        source: ActivitySource,
        window: ActivityWindow,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn get_notebook(
        &self,
        notebook_id: Uuid,
    ) -> impl Future<Output = Result<Option<Notebook>, StoreError>> + Send;

    fn list_materia_notebooks(
        &self,
        materia_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Notebook>, StoreError>> + Send;

    fn get_materia(
        &self,
        materia_id: Uuid,
    ) -> impl Future<Output = Result<Option<Materia>, StoreError>> + Send;

    /// Students with an active enrollment in the materia under the teacher.
    fn list_active_students(
        &self,
        materia_id: Uuid,
        teacher_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Uuid>, StoreError>> + Send;

    fn get_profile(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<UserProfile>, StoreError>> + Send;
}
