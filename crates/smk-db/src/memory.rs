//! In-memory [`ProgressStore`] with failure injection.
//!
//! Holds every collection in plain vectors and maps behind one async lock.
//! Individual reads can be made to fail with [`MemoryStore::fail`], which is
//! how the degraded paths of the services are exercised.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    models::{
        ActivitySource, ActivityWindow, Concept, Enrollment, GamePoints, GameSession,
        LearningState, Materia, Notebook, QuizResultInsert, QuizStats, SessionQuery, StreakRecord,
        StudySession, UserProfile,
    },
    store::{ProgressStore, StoreError},
};

/// A read that [`MemoryStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Concept list of a notebook
    Concepts(Uuid),
    /// Learning state of a concept, for any user
    LearningState(Uuid),
    /// Session scans of a user
    Sessions(Uuid),
    /// Quiz statistics of a user
    QuizStats(Uuid),
    /// Game points of a user
    GamePoints(Uuid),
    /// Streak record of a user, reads and writes
    Streak(Uuid),
    /// Activity probes of a user
    Activity(Uuid),
    /// Notebook list of a materia
    Notebooks(Uuid),
    /// Enrollment scan of a materia
    Enrollments(Uuid),
    /// Profile of a user
    Profile(Uuid),
}

#[derive(Debug, Default)]
struct Inner {
    profiles: HashMap<Uuid, UserProfile>,
    materias: HashMap<Uuid, Materia>,
    notebooks: Vec<Notebook>,
    concepts: Vec<Concept>,
    learning_states: HashMap<(Uuid, Uuid), LearningState>,
    sessions: Vec<StudySession>,
    quiz_results: Vec<QuizResultInsert>,
    mini_quiz_results: Vec<QuizResultInsert>,
    quiz_stats: HashMap<(Uuid, Uuid), QuizStats>,
    game_sessions: Vec<GameSession>,
    streaks: HashMap<Uuid, StreakRecord>,
    enrollments: Vec<Enrollment>,
    failures: HashSet<FailPoint>,
    next_write_failures: HashSet<FailPoint>,
}

/// [`ProgressStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    enrollment_scans: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every read matching `point` fail until [`MemoryStore::recover`] is called.
    pub async fn fail(&self, point: FailPoint) {
        self.inner.write().await.failures.insert(point);
    }

    /// Make only the next streak write matching `point` fail.
    pub async fn fail_next_write(&self, point: FailPoint) {
        self.inner.write().await.next_write_failures.insert(point);
    }

    pub async fn recover(&self, point: FailPoint) {
        self.inner.write().await.failures.remove(&point);
    }

    /// Number of enrollment scans served so far.
    pub fn enrollment_scans(&self) -> usize {
        self.enrollment_scans.load(Ordering::Relaxed)
    }

    pub async fn insert_profile(&self, profile: UserProfile) {
        self.inner.write().await.profiles.insert(profile.id, profile);
    }

    pub async fn insert_materia(&self, materia: Materia) {
        self.inner.write().await.materias.insert(materia.id, materia);
    }

    pub async fn insert_notebook(&self, notebook: Notebook) {
        self.inner.write().await.notebooks.push(notebook);
    }

    pub async fn insert_concept(&self, concept: Concept) {
        self.inner.write().await.concepts.push(concept);
    }

    pub async fn insert_session(&self, session: StudySession) {
        self.inner.write().await.sessions.push(session);
    }

    pub async fn insert_mini_quiz_result(&self, result: QuizResultInsert) {
        self.inner.write().await.mini_quiz_results.push(result);
    }

    pub async fn insert_game_session(&self, game: GameSession) {
        self.inner.write().await.game_sessions.push(game);
    }

    pub async fn insert_enrollment(&self, enrollment: Enrollment) {
        self.inner.write().await.enrollments.push(enrollment);
    }

    /// Current streak record of a user, bypassing failure injection.
    pub async fn streak_of(&self, user_id: Uuid) -> Option<StreakRecord> {
        self.inner.read().await.streaks.get(&user_id).cloned()
    }

    pub async fn set_streak(&self, record: StreakRecord) {
        self.inner.write().await.streaks.insert(record.user_id, record);
    }

    fn check(inner: &Inner, point: FailPoint) -> Result<(), StoreError> {
        if inner.failures.contains(&point) {
            return Err(StoreError::Unavailable(format!("injected failure: {point:?}")));
        }
        Ok(())
    }

    fn check_write(inner: &mut Inner, point: FailPoint) -> Result<(), StoreError> {
        Self::check(inner, point)?;
        if inner.next_write_failures.remove(&point) {
            return Err(StoreError::Unavailable(format!("injected write failure: {point:?}")));
        }
        Ok(())
    }
}

impl ProgressStore for MemoryStore {
    async fn list_concepts(&self, notebook_id: Uuid) -> Result<Vec<Concept>, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::Concepts(notebook_id))?;

        Ok(inner
            .concepts
            .iter()
            .filter(|c| c.notebook_id == notebook_id)
            .cloned()
            .collect())
    }

    async fn get_learning_state(
        &self,
        user_id: Uuid,
        concept_id: Uuid,
    ) -> Result<Option<LearningState>, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::LearningState(concept_id))?;

        Ok(inner.learning_states.get(&(user_id, concept_id)).cloned())
    }

    async fn upsert_learning_state(&self, state: &LearningState) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let key = (state.user_id, state.concept_id);

        let mut next = state.clone();
        if next.last_module.is_none() {
            next.last_module = inner
                .learning_states
                .get(&key)
                .and_then(|s| s.last_module.clone());
        }
        inner.learning_states.insert(key, next);
        Ok(())
    }

    async fn list_sessions(&self, query: &SessionQuery) -> Result<Vec<StudySession>, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::Sessions(query.user_id))?;

        Ok(inner
            .sessions
            .iter()
            .filter(|s| s.user_id == query.user_id && s.notebook_id == query.notebook_id)
            .filter(|s| query.mode.labels().contains(&s.mode.as_str()))
            .filter(|s| !query.validated_only || s.validated)
            .cloned()
            .collect())
    }

    async fn get_quiz_stats(
        &self,
        user_id: Uuid,
        notebook_id: Uuid,
    ) -> Result<Option<QuizStats>, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::QuizStats(user_id))?;

        Ok(inner.quiz_stats.get(&(user_id, notebook_id)).cloned())
    }

    async fn record_quiz_result(&self, result: &QuizResultInsert) -> Result<QuizStats, StoreError> {
        let mut inner = self.inner.write().await;
        inner.quiz_results.push(result.clone());

        let stats = inner
            .quiz_stats
            .entry((result.user_id, result.notebook_id))
            .and_modify(|s| {
                s.max_score = s.max_score.max(result.score);
                s.total_score += result.score;
                s.attempts += 1;
            })
            .or_insert_with(|| QuizStats {
                user_id: result.user_id,
                notebook_id: result.notebook_id,
                max_score: result.score,
                total_score: result.score,
                attempts: 1,
            });

        Ok(stats.clone())
    }

    async fn get_game_points(&self, user_id: Uuid, notebook_id: Uuid) -> Result<GamePoints, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::GamePoints(user_id))?;

        let total_points = inner
            .game_sessions
            .iter()
            .filter(|g| g.user_id == user_id && g.notebook_id == notebook_id)
            .map(|g| g.points)
            .sum();

        Ok(GamePoints { total_points })
    }

    async fn get_streak(&self, user_id: Uuid) -> Result<Option<StreakRecord>, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::Streak(user_id))?;

        Ok(inner.streaks.get(&user_id).cloned())
    }

    async fn upsert_streak(&self, record: &StreakRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        Self::check_write(&mut inner, FailPoint::Streak(record.user_id))?;

        inner.streaks.insert(record.user_id, record.clone());
        Ok(())
    }

    async fn has_activity(
        &self,
        user_id: Uuid,
        source: ActivitySource,
        window: ActivityWindow,
    ) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::Activity(user_id))?;

        let found = match source {
            ActivitySource::StudySession => inner.sessions.iter().any(|s| {
                s.user_id == user_id && window.contains(s.started_at) && s.duration_seconds > 0
            }),
            ActivitySource::Quiz => inner
                .quiz_results
                .iter()
                .any(|q| q.user_id == user_id && window.contains(q.completed_at)),
            ActivitySource::MiniQuiz => inner
                .mini_quiz_results
                .iter()
                .any(|q| q.user_id == user_id && window.contains(q.completed_at)),
            ActivitySource::Game => inner.game_sessions.iter().any(|g| {
                g.user_id == user_id
                    && window.contains(g.played_at)
                    && (g.completed || g.duration_seconds > 0)
            }),
        };

        Ok(found)
    }

    async fn get_notebook(&self, notebook_id: Uuid) -> Result<Option<Notebook>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.notebooks.iter().find(|n| n.id == notebook_id).cloned())
    }

    async fn list_materia_notebooks(&self, materia_id: Uuid) -> Result<Vec<Notebook>, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::Notebooks(materia_id))?;

        Ok(inner
            .notebooks
            .iter()
            .filter(|n| n.materia_id == Some(materia_id))
            .cloned()
            .collect())
    }

    async fn get_materia(&self, materia_id: Uuid) -> Result<Option<Materia>, StoreError> {
        Ok(self.inner.read().await.materias.get(&materia_id).cloned())
    }

    async fn list_active_students(
        &self,
        materia_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<Vec<Uuid>, StoreError> {
        self.enrollment_scans.fetch_add(1, Ordering::Relaxed);

        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::Enrollments(materia_id))?;

        let mut students: Vec<Uuid> = Vec::new();
        for enrollment in inner
            .enrollments
            .iter()
            .filter(|e| e.materia_id == materia_id && e.teacher_id == teacher_id && e.is_active())
        {
            if !students.contains(&enrollment.student_id) {
                students.push(enrollment.student_id);
            }
        }

        Ok(students)
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let inner = self.inner.read().await;
        Self::check(&inner, FailPoint::Profile(user_id))?;

        Ok(inner.profiles.get(&user_id).cloned())
    }
}
