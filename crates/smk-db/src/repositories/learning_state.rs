use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::LearningState;

pub async fn find<'e, E>(
    executor: E,
    user_id: Uuid,
    concept_id: Uuid,
) -> Result<Option<LearningState>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, concept_id, repetitions, review_interval, ease_factor, last_module
            FROM learning_states
            WHERE user_id = $1 AND concept_id = $2
        "#,
    )
    .bind(user_id)
    .bind(concept_id)
    .fetch_optional(executor)
    .await
}

pub async fn upsert<'e, E>(executor: E, state: &LearningState) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO learning_states (user_id, concept_id, repetitions, review_interval, ease_factor, last_module)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, concept_id)
            DO UPDATE SET
                repetitions = $3,
                review_interval = $4,
                ease_factor = $5,
                last_module = COALESCE($6, learning_states.last_module),
                updated_at = NOW()
        "#,
    )
    .bind(state.user_id)
    .bind(state.concept_id)
    .bind(state.repetitions)
    .bind(state.interval)
    .bind(state.ease_factor)
    .bind(state.last_module.as_deref())
    .execute(executor)
    .await?;
    Ok(())
}
