use std::sync::Arc;

use futures_util::future::join_all;
use smk_db::{
    ProgressStore,
    models::{SessionQuery, StudyMode},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::NotebookPoints;
use crate::{
    metrics::record_computation,
    outcome::{Outcome, cancellable},
    progress::DomainProgressService,
    streak::StreakService,
};

/// Aggregates every point source of a user.
pub struct PointsService<S> {
    store: Arc<S>,
    progress: DomainProgressService<S>,
    streak: StreakService<S>,
}

impl<S> Clone for PointsService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            progress: self.progress.clone(),
            streak: self.streak.clone(),
        }
    }
}

impl<S: ProgressStore> PointsService<S> {
    pub fn new(
        store: Arc<S>,
        progress: DomainProgressService<S>,
        streak: StreakService<S>,
    ) -> Self {
        Self {
            store,
            progress,
            streak,
        }
    }

    /// Points breakdown of `user_id` on `notebook_id`.
    ///
    /// If any session, quiz or game source fails the whole breakdown is
    /// zero. Streak and mastery failures fall back to zero on their own.
    pub async fn notebook_points(
        &self,
        notebook_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Outcome<NotebookPoints> {
        let outcome = cancellable(cancel, self.breakdown(notebook_id, user_id, cancel)).await;
        record_computation("notebook_points", &outcome);
        outcome
    }

    /// Sum of notebook scores over every notebook of the materia.
    ///
    /// The streak bonus is part of each notebook score, so it is counted
    /// once per notebook.
    pub async fn materia_score(
        &self,
        materia_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Outcome<i64> {
        let outcome = cancellable(cancel, self.sum_materia(materia_id, user_id, cancel)).await;
        record_computation("materia_score", &outcome);
        outcome
    }

    async fn breakdown(
        &self,
        notebook_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Outcome<NotebookPoints> {
        let query = |mode, validated_only| SessionQuery {
            user_id,
            notebook_id,
            mode,
            validated_only,
        };
        let smart_query = query(StudyMode::Smart, true);
        let voice_query = query(StudyMode::Voice, false);
        let free_query = query(StudyMode::Free, false);

        let (smart, voice, free, quiz, games, streak, progress) = tokio::join!(
            self.store.list_sessions(&smart_query),
            self.store.list_sessions(&voice_query),
            self.store.list_sessions(&free_query),
            self.store.get_quiz_stats(user_id, notebook_id),
            self.store.get_game_points(user_id, notebook_id),
            self.streak.read(user_id, cancel),
            self.progress.compute(notebook_id, Some(user_id), cancel),
        );

        if streak.is_cancelled() || progress.is_cancelled() {
            return Outcome::Cancelled;
        }

        let sources = smart.and_then(|smart| {
            Ok((smart, voice?, free?, quiz?, games?))
        });
        let (smart, voice, free, quiz, games) = match sources {
            Ok(sources) => sources,
            Err(e) => {
                tracing::error!(%user_id, %notebook_id, "Failed to read point sources: {e}");
                return Outcome::defaulted(NotebookPoints::default(), e);
            }
        };

        let failures = streak.failures() + progress.failures();
        let streak_days = streak.into_value().map_or(0, |s| s.current_streak);
        let tally = progress.into_value().unwrap_or_default();

        let points = NotebookPoints::compute(
            &smart,
            &voice,
            &free,
            quiz.as_ref(),
            games,
            streak_days,
            &tally,
        );
        tracing::debug!(%user_id, %notebook_id, score = points.score, "Notebook points computed");

        Outcome::with_failures(points, failures)
    }

    async fn sum_materia(
        &self,
        materia_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> Outcome<i64> {
        let notebooks = match self.store.list_materia_notebooks(materia_id).await {
            Ok(notebooks) => notebooks,
            Err(e) => {
                tracing::error!(%materia_id, "Failed to list materia notebooks: {e}");
                return Outcome::defaulted(0, e);
            }
        };

        let outcomes = join_all(
            notebooks
                .iter()
                .map(|notebook| self.notebook_points(notebook.id, user_id, cancel)),
        )
        .await;

        let mut score = 0;
        let mut failures = 0;
        for outcome in outcomes {
            failures += outcome.failures();
            match outcome.into_value() {
                Some(points) => score += points.score,
                None => return Outcome::Cancelled,
            }
        }

        Outcome::with_failures(score, failures)
    }
}
