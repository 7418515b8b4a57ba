use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use smk_db::ProgressStore;
use uuid::Uuid;

use crate::{ApiState, Outcome, auth::AuthUser, error::ApiError, ranking::RankingEntry};

/// Largest `top` a caller may ask for.
const MAX_TOP: usize = 100;

pub fn routes<S: ProgressStore>() -> Router<ApiState<S>> {
    Router::new()
        .route("/materias/{materia_id}/score", get(materia_score::<S>))
        .route("/materias/{materia_id}/ranking", get(ranking::<S>))
        .route("/materias/{materia_id}/ranking/refresh", post(refresh_ranking::<S>))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MateriaScore {
    materia_id: Uuid,
    score: i64,
}

async fn materia_score<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
    Path(materia_id): Path<Uuid>,
) -> Outcome<MateriaScore> {
    let cancel = state.request_token();
    state
        .points
        .materia_score(materia_id, auth_user.user_id, &cancel)
        .await
        .map(|score| MateriaScore { materia_id, score })
}

#[derive(Debug, Deserialize)]
struct RankingQuery {
    teacher_id: Option<Uuid>,
    top: Option<usize>,
}

async fn ranking<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
    Path(materia_id): Path<Uuid>,
    Query(query): Query<RankingQuery>,
) -> Result<Outcome<Vec<RankingEntry>>, ApiError> {
    let cancel = state.request_token();
    let user_id = auth_user.user_id;

    let outcome = match query.top {
        None => {
            state
                .ranking
                .materia_ranking(materia_id, user_id, query.teacher_id, &cancel)
                .await
        }
        Some(top) if (1..=MAX_TOP).contains(&top) => {
            state
                .ranking
                .top_ranking(materia_id, user_id, query.teacher_id, top, &cancel)
                .await
        }
        Some(_) => {
            return Err(ApiError::Validation(format!(
                "top must be between 1 and {MAX_TOP}"
            )));
        }
    };

    Ok(outcome)
}

async fn refresh_ranking<S: ProgressStore>(
    _auth_user: AuthUser,
    State(state): State<ApiState<S>>,
    Path(materia_id): Path<Uuid>,
) -> StatusCode {
    state.ranking.invalidate_materia(materia_id).await;
    StatusCode::NO_CONTENT
}
