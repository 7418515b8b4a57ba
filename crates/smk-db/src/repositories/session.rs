use sqlx::{Executor, Postgres};

use crate::models::{SessionQuery, StudySession};

pub async fn list<'e, E>(executor: E, query: &SessionQuery) -> Result<Vec<StudySession>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT
                id,
                user_id,
                notebook_id,
                mode,
                started_at,
                duration_seconds,
                intensity,
                session_score,
                final_session_score,
                validated
            FROM study_sessions
            WHERE user_id = $1
                AND notebook_id = $2
                AND mode = ANY($3)
                AND (NOT $4 OR validated)
            ORDER BY started_at
        "#,
    )
    .bind(query.user_id)
    .bind(query.notebook_id)
    .bind(query.mode.labels())
    .bind(query.validated_only)
    .fetch_all(executor)
    .await
}
