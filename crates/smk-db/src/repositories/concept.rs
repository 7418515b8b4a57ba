use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::Concept;

pub async fn list_by_notebook<'e, E>(executor: E, notebook_id: Uuid) -> Result<Vec<Concept>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, notebook_id, term, definition
            FROM concepts
            WHERE notebook_id = $1
            ORDER BY position, created_at
        "#,
    )
    .bind(notebook_id)
    .fetch_all(executor)
    .await
}
