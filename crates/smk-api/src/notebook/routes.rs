use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use smk_db::{
    ProgressStore,
    models::{QuizResultInsert, QuizStats},
};
use smk_srs::MasteryTally;
use uuid::Uuid;

use crate::{ApiState, Outcome, auth::AuthUser, error::ApiError, points::NotebookPoints};

pub fn routes<S: ProgressStore>() -> Router<ApiState<S>> {
    Router::new()
        .route("/notebooks/{notebook_id}/progress", get(progress::<S>))
        .route("/notebooks/{notebook_id}/points", get(points::<S>))
        .route("/notebooks/{notebook_id}/quiz-results", post(record_quiz_result::<S>))
}

/// Anonymous callers get every concept as not started.
async fn progress<S: ProgressStore>(
    auth_user: Option<AuthUser>,
    State(state): State<ApiState<S>>,
    Path(notebook_id): Path<Uuid>,
) -> Outcome<MasteryTally> {
    let cancel = state.request_token();
    state
        .progress
        .compute(notebook_id, auth_user.map(|u| u.user_id), &cancel)
        .await
}

async fn points<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
    Path(notebook_id): Path<Uuid>,
) -> Outcome<NotebookPoints> {
    let cancel = state.request_token();
    state
        .points
        .notebook_points(notebook_id, auth_user.user_id, &cancel)
        .await
}

#[derive(Deserialize)]
struct QuizResultSubmission {
    score: i64,
}

async fn record_quiz_result<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
    Path(notebook_id): Path<Uuid>,
    Json(payload): Json<QuizResultSubmission>,
) -> Result<(StatusCode, Json<QuizStats>), ApiError> {
    if payload.score < 0 {
        return Err(ApiError::Validation("score must not be negative".to_string()));
    }

    let notebook = state
        .store
        .get_notebook(notebook_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("notebook {notebook_id}")))?;

    let stats = state
        .store
        .record_quiz_result(&QuizResultInsert {
            user_id: auth_user.user_id,
            notebook_id,
            score: payload.score,
            completed_at: state.clock.now(),
        })
        .await?;

    tracing::info!(
        user_id = %auth_user.user_id,
        %notebook_id,
        score = payload.score,
        max_score = stats.max_score,
        "Quiz result recorded"
    );

    if state.settings.ranking_write_through
        && let Some(materia_id) = notebook.materia_id
    {
        state.ranking.invalidate_materia(materia_id).await;
    }

    Ok((StatusCode::CREATED, Json(stats)))
}
