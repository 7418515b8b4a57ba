use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::StreakRecord;

pub async fn find<'e, E>(executor: E, user_id: Uuid) -> Result<Option<StreakRecord>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, current_streak, last_study_date, study_history
            FROM streaks
            WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn upsert<'e, E>(executor: E, record: &StreakRecord) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO streaks (user_id, current_streak, last_study_date, study_history)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id)
            DO UPDATE SET
                current_streak = $2,
                last_study_date = $3,
                study_history = $4,
                updated_at = NOW()
        "#,
    )
    .bind(record.user_id)
    .bind(record.current_streak)
    .bind(record.last_study_date)
    .bind(&record.study_history)
    .execute(executor)
    .await?;
    Ok(())
}
