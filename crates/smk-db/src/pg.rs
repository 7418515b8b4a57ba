//! Postgres implementation of [`ProgressStore`].

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    models::{
        ActivitySource, ActivityWindow, Concept, GamePoints, LearningState, Materia, Notebook,
        QuizResultInsert, QuizStats, SessionQuery, StreakRecord, StudySession, UserProfile,
    },
    repositories::{activity, concept, game, learning_state, materia, quiz, session, streak, user},
    store::{ProgressStore, StoreError},
};

/// [`ProgressStore`] backed by a Postgres connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ProgressStore for PgStore {
    async fn list_concepts(&self, notebook_id: Uuid) -> Result<Vec<Concept>, StoreError> {
        Ok(concept::list_by_notebook(&self.pool, notebook_id).await?)
    }

    async fn get_learning_state(
        &self,
        user_id: Uuid,
        concept_id: Uuid,
    ) -> Result<Option<LearningState>, StoreError> {
        Ok(learning_state::find(&self.pool, user_id, concept_id).await?)
    }

    async fn upsert_learning_state(&self, state: &LearningState) -> Result<(), StoreError> {
        Ok(learning_state::upsert(&self.pool, state).await?)
    }

    async fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<StudySession>, StoreError> {
        Ok(session::list(&self.pool, query).await?)
    }

    async fn get_quiz_stats(
        &self,
        user_id: Uuid,
        notebook_id: Uuid,
    ) -> Result<Option<QuizStats>, StoreError> {
        Ok(quiz::find_stats(&self.pool, user_id, notebook_id).await?)
    }

    async fn record_quiz_result(&self, result: &QuizResultInsert) -> Result<QuizStats, StoreError> {
        // Single transaction so the result and the running stats never diverge
        let mut tx = self.pool.begin().await?;

        quiz::insert_result(&mut *tx, result).await?;
        let stats = quiz::upsert_stats(&mut *tx, result.user_id, result.notebook_id, result.score).await?;

        tx.commit().await?;
        Ok(stats)
    }

    async fn get_game_points(&self, user_id: Uuid, notebook_id: Uuid) -> Result<GamePoints, StoreError> {
        Ok(game::notebook_points(&self.pool, user_id, notebook_id).await?)
    }

    async fn get_streak(&self, user_id: Uuid) -> Result<Option<StreakRecord>, StoreError> {
        Ok(streak::find(&self.pool, user_id).await?)
    }

    async fn upsert_streak(&self, record: &StreakRecord) -> Result<(), StoreError> {
        Ok(streak::upsert(&self.pool, record).await?)
    }

    async fn has_activity(
        &self,
        user_id: Uuid,
        source: ActivitySource,
        window: ActivityWindow,
    ) -> Result<bool, StoreError> {
        Ok(activity::exists(&self.pool, user_id, source, window).await?)
    }

    async fn get_notebook(&self, notebook_id: Uuid) -> Result<Option<Notebook>, StoreError> {
        Ok(materia::find_notebook(&self.pool, notebook_id).await?)
    }

    async fn list_materia_notebooks(&self, materia_id: Uuid) -> Result<Vec<Notebook>, StoreError> {
        Ok(materia::list_notebooks(&self.pool, materia_id).await?)
    }

    async fn get_materia(&self, materia_id: Uuid) -> Result<Option<Materia>, StoreError> {
        Ok(materia::find(&self.pool, materia_id).await?)
    }

    async fn list_active_students(
        &self,
        materia_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError> {
        Ok(materia::list_active_students(&self.pool, materia_id, teacher_id).await?)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(user::find_profile_by_id(&self.pool, user_id).await?)
    }
}
