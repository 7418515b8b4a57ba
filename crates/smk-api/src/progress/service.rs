use std::sync::Arc;

use futures_util::future::join_all;
use smk_db::{ProgressStore, models::LearningState};
use smk_srs::{MasteryTally, SrsState, classify};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    metrics::record_computation,
    outcome::{Outcome, cancellable},
};

/// Spaced-repetition view of a stored learning state.
pub fn srs_state(state: &LearningState) -> SrsState {
    SrsState {
        repetitions: u32::try_from(state.repetitions).unwrap_or(0),
        interval: state.interval,
        ease_factor: state.ease_factor,
    }
}

/// Classifies every concept of a notebook for one user.
pub struct DomainProgressService<S> {
    store: Arc<S>,
    batch_size: usize,
}

impl<S> Clone for DomainProgressService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            batch_size: self.batch_size,
        }
    }
}

impl<S: ProgressStore> DomainProgressService<S> {
    pub fn new(store: Arc<S>, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    /// Mastery tally of `notebook_id`.
    ///
    /// Without a user every concept is not started. A concept whose learning
    /// state cannot be read counts as not started and makes the outcome
    /// partial; failing to list the concepts yields an all-zero tally.
    pub async fn compute(
        &self,
        notebook_id: Uuid,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> Outcome<MasteryTally> {
        let outcome = cancellable(cancel, self.tally(notebook_id, user_id, cancel)).await;
        record_computation("domain_progress", &outcome);
        outcome
    }

    async fn tally(
        &self,
        notebook_id: Uuid,
        user_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> Outcome<MasteryTally> {
        let concepts = match self.store.list_concepts(notebook_id).await {
            Ok(concepts) => concepts,
            Err(e) => {
                tracing::error!(%notebook_id, "Failed to list concepts: {e}");
                return Outcome::defaulted(MasteryTally::default(), e);
            }
        };
        let total = u32::try_from(concepts.len()).unwrap_or(u32::MAX);

        let Some(user_id) = user_id else {
            return Outcome::Computed(MasteryTally::all_not_started(total));
        };

        let mut tally = MasteryTally::default();
        let mut failures = 0;

        for batch in concepts.chunks(self.batch_size) {
            if cancel.is_cancelled() {
                return Outcome::Cancelled;
            }

            let states = join_all(
                batch
                    .iter()
                    .map(|concept| self.store.get_learning_state(user_id, concept.id)),
            )
            .await;

            for (concept, state) in batch.iter().zip(states) {
                let state = state.unwrap_or_else(|e| {
                    tracing::warn!(
                        %user_id,
                        concept_id = %concept.id,
                        "Failed to read learning state, counting as not started: {e}"
                    );
                    failures += 1;
                    None
                });
                tally.record(classify(state.as_ref().map(srs_state).as_ref()));
            }
        }

        tracing::debug!(%notebook_id, %user_id, ?tally, failures, "Domain progress computed");
        Outcome::with_failures(tally, failures)
    }
}
