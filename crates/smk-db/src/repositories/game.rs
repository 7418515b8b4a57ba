use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::GamePoints;

pub async fn notebook_points<'e, E>(
    executor: E,
    user_id: Uuid,
    notebook_id: Uuid,
) -> Result<GamePoints, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT COALESCE(SUM(points), 0)::bigint as total_points
            FROM game_sessions
            WHERE user_id = $1 AND notebook_id = $2
        "#,
    )
    .bind(user_id)
    .bind(notebook_id)
    .fetch_one(executor)
    .await
}
