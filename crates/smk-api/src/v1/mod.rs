use axum::Router;
use smk_db::ProgressStore;

use crate::{concept, materia, notebook, state::ApiState, streak};

/// V1 API routes
pub fn routes<S: ProgressStore>() -> Router<ApiState<S>> {
    Router::new()
        .merge(notebook::routes())
        .merge(concept::routes())
        .merge(materia::routes())
        .merge(streak::routes())
}
