use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use serde::{Deserialize, Serialize};
use smk_db::{ProgressStore, models::LearningState};
use smk_srs::{Mastery, classify, sm2};
use uuid::Uuid;

use crate::{ApiState, auth::AuthUser, error::ApiError, progress::srs_state};

pub fn routes<S: ProgressStore>() -> Router<ApiState<S>> {
    Router::new().route("/concepts/{concept_id}/reviews", post(submit_review::<S>))
}

#[derive(Deserialize)]
struct ReviewSubmission {
    /// Recall quality from 0 (blackout) to 5 (perfect)
    quality: u8,
    /// Study mode the review happened in
    module: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewResult {
    concept_id: Uuid,
    repetitions: u32,
    interval: f64,
    ease_factor: f64,
    mastery: Mastery,
}

async fn submit_review<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
    Path(concept_id): Path<Uuid>,
    Json(payload): Json<ReviewSubmission>,
) -> Result<Json<ReviewResult>, ApiError> {
    if payload.quality > sm2::MAX_QUALITY {
        return Err(ApiError::Validation(format!(
            "quality must be between 0 and {}",
            sm2::MAX_QUALITY
        )));
    }

    let user_id = auth_user.user_id;
    let current = state
        .store
        .get_learning_state(user_id, concept_id)
        .await?
        .map(|s| srs_state(&s))
        .unwrap_or_default();
    let next = sm2::review(&current, payload.quality);

    state
        .store
        .upsert_learning_state(&LearningState {
            user_id,
            concept_id,
            repetitions: i32::try_from(next.repetitions).unwrap_or(i32::MAX),
            interval: next.interval,
            ease_factor: next.ease_factor,
            last_module: payload.module,
        })
        .await?;

    tracing::debug!(%user_id, %concept_id, quality = payload.quality, "Concept reviewed");

    Ok(Json(ReviewResult {
        concept_id,
        repetitions: next.repetitions,
        interval: next.interval,
        ease_factor: next.ease_factor,
        mastery: classify(Some(&next)),
    }))
}
