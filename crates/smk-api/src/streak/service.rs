use std::sync::Arc;

use futures_util::future::join_all;
use smk_db::{
    ProgressStore, StoreError,
    models::{ActivitySource, StreakRecord},
};
use smk_srs::{StreakState, StreakTransition, WeeklyActivity};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    clock::Clock,
    metrics::record_computation,
    outcome::{Outcome, cancellable},
};

fn to_state(record: StreakRecord) -> StreakState {
    StreakState {
        current_streak: u32::try_from(record.current_streak).unwrap_or(0),
        last_study_date: record.last_study_date,
        study_history: record.study_history,
    }
}

fn to_record(user_id: Uuid, state: &StreakState) -> StreakRecord {
    StreakRecord {
        user_id,
        current_streak: i32::try_from(state.current_streak).unwrap_or(i32::MAX),
        last_study_date: state.last_study_date,
        study_history: state.study_history.clone(),
    }
}

pub struct StreakService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for StreakService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S: ProgressStore> StreakService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Whether the user has any qualifying activity during the local today.
    ///
    /// One positive source is enough. Failed probes only matter when no
    /// other source reports activity.
    pub async fn studied_today(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let window = self.clock.today_window();
        let probes = join_all(
            ActivitySource::ALL
                .map(|source| self.store.has_activity(user_id, source, window)),
        )
        .await;

        let mut first_error = None;
        for (source, probe) in ActivitySource::ALL.iter().zip(probes) {
            match probe {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(%user_id, ?source, "Activity probe failed: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        first_error.map_or(Ok(false), Err)
    }

    /// Streak of the user, zeroed and persisted when it has gone stale.
    pub async fn read(&self, user_id: Uuid, cancel: &CancellationToken) -> Outcome<StreakState> {
        let outcome = cancellable(cancel, self.load_healed(user_id)).await;
        record_computation("streak_read", &outcome);
        outcome
    }

    /// Record today's activity, if any, and return the resulting streak.
    ///
    /// Repeated calls on the same day never grow the streak twice.
    pub async fn check_and_update(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Outcome<StreakState> {
        let outcome = cancellable(cancel, self.advance(user_id)).await;
        record_computation("streak_update", &outcome);
        outcome
    }

    /// Study days of the current Monday-to-Sunday week.
    pub async fn weekly_activity(
        &self,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Outcome<WeeklyActivity> {
        let today = self.clock.today();
        self.read(user_id, cancel)
            .await
            .map(|state| state.weekly_activity(today))
    }

    async fn load_healed(&self, user_id: Uuid) -> Outcome<StreakState> {
        let state = match self.store.get_streak(user_id).await {
            Ok(record) => record.map(to_state).unwrap_or_default(),
            Err(e) => {
                tracing::error!(%user_id, "Failed to read streak: {e}");
                return Outcome::defaulted(StreakState::default(), e);
            }
        };

        let Some(healed) = state.heal(self.clock.today()) else {
            return Outcome::Computed(state);
        };

        tracing::info!(
            %user_id,
            last_study_date = ?healed.last_study_date,
            "Streak went stale, resetting to zero"
        );
        match self.store.upsert_streak(&to_record(user_id, &healed)).await {
            Ok(()) => Outcome::Computed(healed),
            Err(e) => {
                tracing::warn!(%user_id, "Failed to persist healed streak: {e}");
                Outcome::with_failures(healed, 1)
            }
        }
    }

    async fn advance(&self, user_id: Uuid) -> Outcome<StreakState> {
        let current = self.load_healed(user_id).await;
        if matches!(current, Outcome::Defaulted { .. }) {
            return current;
        }
        let failures = current.failures();
        let Some(state) = current.into_value() else {
            return Outcome::Cancelled;
        };

        let studied = match self.studied_today(user_id).await {
            Ok(studied) => studied,
            Err(e) => return Outcome::defaulted(state, e),
        };

        let today = self.clock.today();
        let next = match state.advance(today, studied) {
            StreakTransition::Unchanged => return Outcome::with_failures(state, failures),
            StreakTransition::Extended(next) => {
                tracing::info!(%user_id, streak = next.current_streak, "Streak extended");
                next
            }
            StreakTransition::Restarted(next) => {
                tracing::info!(%user_id, "Streak restarted");
                next
            }
        };

        // The stored record is current again, so an earlier failed heal no longer counts
        match self.store.upsert_streak(&to_record(user_id, &next)).await {
            Ok(()) => Outcome::Computed(next),
            Err(e) => {
                tracing::error!(%user_id, "Failed to persist streak: {e}");
                Outcome::defaulted(state, e)
            }
        }
    }
}
