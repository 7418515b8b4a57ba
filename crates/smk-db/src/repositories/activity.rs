//! Probes for "did the user study in this window" used by the streak check.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{ActivitySource, ActivityWindow};

pub async fn exists<'e, E>(
    executor: E,
    user_id: Uuid,
    source: ActivitySource,
    window: ActivityWindow,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = match source {
        ActivitySource::StudySession => {
            // language=PostgreSQL
            r#"
                SELECT EXISTS(
                    SELECT 1 FROM study_sessions
                    WHERE user_id = $1 AND started_at >= $2 AND started_at < $3
                        AND duration_seconds > 0
                )
            "#
        }
        ActivitySource::Quiz => {
            // language=PostgreSQL
            r#"
                SELECT EXISTS(
                    SELECT 1 FROM quiz_results
                    WHERE user_id = $1 AND completed_at >= $2 AND completed_at < $3
                )
            "#
        }
        ActivitySource::MiniQuiz => {
            // language=PostgreSQL
            r#"
                SELECT EXISTS(
                    SELECT 1 FROM mini_quiz_results
                    WHERE user_id = $1 AND completed_at >= $2 AND completed_at < $3
                )
            "#
        }
        ActivitySource::Game => {
            // language=PostgreSQL
            r#"
                SELECT EXISTS(
                    SELECT 1 FROM game_sessions
                    WHERE user_id = $1 AND played_at >= $2 AND played_at < $3
                        AND (completed OR duration_seconds > 0)
                )
            "#
        }
    };

    sqlx::query_scalar(sql)
        .bind(user_id)
        .bind(window.from)
        .bind(window.to)
        .fetch_one(executor)
        .await
}
