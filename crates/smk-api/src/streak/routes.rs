use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use smk_db::ProgressStore;
use smk_srs::{StreakState, WeeklyActivity};

use crate::{ApiState, Outcome, auth::AuthUser};

pub fn routes<S: ProgressStore>() -> Router<ApiState<S>> {
    Router::new()
        .route("/streak", get(get_streak::<S>))
        .route("/streak/check", post(check_streak::<S>))
        .route("/streak/week", get(weekly_activity::<S>))
}

async fn get_streak<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
) -> Outcome<StreakState> {
    let cancel = state.request_token();
    state.streak.read(auth_user.user_id, &cancel).await
}

async fn check_streak<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
) -> Outcome<StreakState> {
    let cancel = state.request_token();
    state.streak.check_and_update(auth_user.user_id, &cancel).await
}

async fn weekly_activity<S: ProgressStore>(
    auth_user: AuthUser,
    State(state): State<ApiState<S>>,
) -> Outcome<WeeklyActivity> {
    let cancel = state.request_token();
    state.streak.weekly_activity(auth_user.user_id, &cancel).await
}
