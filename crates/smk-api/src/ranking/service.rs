use std::{collections::HashSet, sync::Arc};

use futures_util::future::join_all;
use smk_db::ProgressStore;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{RankingCache, RankingEntry, RankingKey, ScoredStudent, UNKNOWN_STUDENT_NAME, rank, top_n};
use crate::{
    metrics::record_computation,
    outcome::{Outcome, cancellable},
    points::PointsService,
};

pub struct RankingService<S> {
    store: Arc<S>,
    points: PointsService<S>,
    cache: Arc<RankingCache>,
}

impl<S> Clone for RankingService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            points: self.points.clone(),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: ProgressStore> RankingService<S> {
    pub fn new(store: Arc<S>, points: PointsService<S>, cache: Arc<RankingCache>) -> Self {
        Self {
            store,
            points,
            cache,
        }
    }

    pub fn cache(&self) -> Arc<RankingCache> {
        Arc::clone(&self.cache)
    }

    /// Full ranking of the materia, always containing `current_user`.
    ///
    /// `teacher_id` defaults to the materia's teacher. Without a teacher the
    /// ranking only holds the current user.
    pub async fn materia_ranking(
        &self,
        materia_id: Uuid,
        current_user: Uuid,
        teacher_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> Outcome<Vec<RankingEntry>> {
        let outcome = cancellable(
            cancel,
            self.build(materia_id, current_user, teacher_id, cancel),
        )
        .await;
        record_computation("materia_ranking", &outcome);
        outcome
    }

    /// The first `limit` entries of the ranking, with the current user
    /// substituted into the last slot when they rank lower.
    pub async fn top_ranking(
        &self,
        materia_id: Uuid,
        current_user: Uuid,
        teacher_id: Option<Uuid>,
        limit: usize,
        cancel: &CancellationToken,
    ) -> Outcome<Vec<RankingEntry>> {
        self.materia_ranking(materia_id, current_user, teacher_id, cancel)
            .await
            .map(|entries| top_n(entries, limit))
    }

    /// Forget cached rankings of the materia.
    pub async fn invalidate_materia(&self, materia_id: Uuid) -> usize {
        let dropped = self.cache.invalidate_materia(materia_id).await;
        tracing::debug!(%materia_id, dropped, "Ranking cache invalidated");
        dropped
    }

    async fn build(
        &self,
        materia_id: Uuid,
        current_user: Uuid,
        teacher_id: Option<Uuid>,
        cancel: &CancellationToken,
    ) -> Outcome<Vec<RankingEntry>> {
        let Some(teacher_id) = self.resolve_teacher(materia_id, teacher_id).await else {
            let (me, _) = self.score_student(materia_id, current_user, cancel).await;
            if cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            return Outcome::defaulted(rank(vec![me], current_user), "materia has no teacher");
        };

        let key = RankingKey {
            materia_id,
            teacher_id,
        };
        let (mut students, mut failures) = match self.cache.get(&key).await {
            Some(students) => (students, 0),
            None => {
                let students = match self.store.list_active_students(materia_id, teacher_id).await
                {
                    Ok(students) => students,
                    Err(e) => {
                        tracing::error!(%materia_id, %teacher_id, "Failed to list enrolled students: {e}");
                        let (me, _) = self.score_student(materia_id, current_user, cancel).await;
                        if cancel.is_cancelled() {
                            return Outcome::Cancelled;
                        }
                        return Outcome::defaulted(rank(vec![me], current_user), e);
                    }
                };

                let (scored, failures) = self.score_all(materia_id, &students, cancel).await;
                if cancel.is_cancelled() {
                    return Outcome::Cancelled;
                }
                if failures == 0 {
                    self.cache.insert(key, scored.clone()).await;
                }
                (scored, failures)
            }
        };

        if !students.iter().any(|s| s.user_id == current_user) {
            let (me, my_failures) = self.score_student(materia_id, current_user, cancel).await;
            if cancel.is_cancelled() {
                return Outcome::Cancelled;
            }
            students.push(me);
            failures += my_failures;
        }

        Outcome::with_failures(rank(students, current_user), failures)
    }

    async fn resolve_teacher(&self, materia_id: Uuid, teacher_id: Option<Uuid>) -> Option<Uuid> {
        if teacher_id.is_some() {
            return teacher_id;
        }

        match self.store.get_materia(materia_id).await {
            Ok(materia) => materia.and_then(|m| m.teacher_id),
            Err(e) => {
                tracing::warn!(%materia_id, "Failed to read materia: {e}");
                None
            }
        }
    }

    async fn score_all(
        &self,
        materia_id: Uuid,
        students: &[Uuid],
        cancel: &CancellationToken,
    ) -> (Vec<ScoredStudent>, usize) {
        let mut seen = HashSet::new();
        let unique: Vec<Uuid> = students.iter().copied().filter(|id| seen.insert(*id)).collect();

        let scored = join_all(
            unique
                .iter()
                .map(|user_id| self.score_student(materia_id, *user_id, cancel)),
        )
        .await;

        scored.into_iter().fold(
            (Vec::with_capacity(unique.len()), 0),
            |(mut students, failures), (student, student_failures)| {
                students.push(student);
                (students, failures + student_failures)
            },
        )
    }

    /// Materia score and display name of one student, with the number of
    /// inputs that had to be defaulted.
    async fn score_student(
        &self,
        materia_id: Uuid,
        user_id: Uuid,
        cancel: &CancellationToken,
    ) -> (ScoredStudent, usize) {
        let (profile, score) = tokio::join!(
            self.store.get_profile(user_id),
            self.points.materia_score(materia_id, user_id, cancel),
        );

        let mut failures = score.failures();
        let name = match profile {
            Ok(Some(profile)) => profile.shown_name().to_string(),
            Ok(None) => UNKNOWN_STUDENT_NAME.to_string(),
            Err(e) => {
                tracing::warn!(%user_id, "Failed to read profile: {e}");
                failures += 1;
                UNKNOWN_STUDENT_NAME.to_string()
            }
        };

        let student = ScoredStudent {
            user_id,
            name,
            score: score.into_value().unwrap_or(0),
        };
        (student, failures)
    }
}
