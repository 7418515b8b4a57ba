use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{Materia, Notebook};

pub async fn find<'e, E>(executor: E, materia_id: Uuid) -> Result<Option<Materia>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, name, teacher_id
            FROM materias
            WHERE id = $1
        "#,
    )
    .bind(materia_id)
    .fetch_optional(executor)
    .await
}

pub async fn find_notebook<'e, E>(executor: E, notebook_id: Uuid) -> Result<Option<Notebook>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, title, materia_id
            FROM notebooks
            WHERE id = $1
        "#,
    )
    .bind(notebook_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_notebooks<'e, E>(executor: E, materia_id: Uuid) -> Result<Vec<Notebook>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, title, materia_id
            FROM notebooks
            WHERE materia_id = $1
            ORDER BY created_at
        "#,
    )
    .bind(materia_id)
    .fetch_all(executor)
    .await
}

pub async fn list_active_students<'e, E>(
    executor: E,
    materia_id: Uuid,
    teacher_id: Uuid,
) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT DISTINCT student_id
            FROM enrollments
            WHERE materia_id = $1 AND teacher_id = $2 AND status = 'active'
        "#,
    )
    .bind(materia_id)
    .bind(teacher_id)
    .fetch_all(executor)
    .await
}
