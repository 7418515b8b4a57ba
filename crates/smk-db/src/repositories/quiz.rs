use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{QuizResultInsert, QuizStats};

pub async fn find_stats<'e, E>(
    executor: E,
    user_id: Uuid,
    notebook_id: Uuid,
) -> Result<Option<QuizStats>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, notebook_id, max_score, total_score, attempts
            FROM quiz_stats
            WHERE user_id = $1 AND notebook_id = $2
        "#,
    )
    .bind(user_id)
    .bind(notebook_id)
    .fetch_optional(executor)
    .await
}

pub async fn insert_result<'e, E>(executor: E, result: &QuizResultInsert) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO quiz_results (user_id, notebook_id, score, completed_at)
            VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(result.user_id)
    .bind(result.notebook_id)
    .bind(result.score)
    .bind(result.completed_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Fold a new quiz score into the running maximum and total.
pub async fn upsert_stats<'e, E>(
    executor: E,
    user_id: Uuid,
    notebook_id: Uuid,
    score: i64,
) -> Result<QuizStats, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            INSERT INTO quiz_stats (user_id, notebook_id, max_score, total_score, attempts)
            VALUES ($1, $2, $3, $3, 1)
            ON CONFLICT (user_id, notebook_id)
            DO UPDATE SET
                max_score = GREATEST(quiz_stats.max_score, $3),
                total_score = quiz_stats.total_score + $3,
                attempts = quiz_stats.attempts + 1,
                updated_at = NOW()
            RETURNING user_id, notebook_id, max_score, total_score, attempts
        "#,
    )
    .bind(user_id)
    .bind(notebook_id)
    .bind(score)
    .fetch_one(executor)
    .await
}
