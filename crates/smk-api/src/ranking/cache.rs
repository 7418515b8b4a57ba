use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;
use uuid::Uuid;

use super::ScoredStudent;
use crate::metrics::record_ranking_cache;

/// A ranking is specific to a materia taught by one teacher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RankingKey {
    pub materia_id: Uuid,
    pub teacher_id: Uuid,
}

#[derive(Debug)]
struct Snapshot {
    stored_at: Instant,
    students: Vec<ScoredStudent>,
}

/// Scored enrolled students per ranking key, kept for a fixed time.
#[derive(Debug)]
pub struct RankingCache {
    ttl: Duration,
    entries: RwLock<HashMap<RankingKey, Snapshot>>,
}

impl RankingCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh snapshot for `key`, if any.
    pub async fn get(&self, key: &RankingKey) -> Option<Vec<ScoredStudent>> {
        let entries = self.entries.read().await;
        let students = entries
            .get(key)
            .filter(|snapshot| snapshot.stored_at.elapsed() < self.ttl)
            .map(|snapshot| snapshot.students.clone());

        record_ranking_cache(students.is_some());
        students
    }

    pub async fn insert(&self, key: RankingKey, students: Vec<ScoredStudent>) {
        self.entries.write().await.insert(
            key,
            Snapshot {
                stored_at: Instant::now(),
                students,
            },
        );
    }

    /// Drop every snapshot of the materia, whatever the teacher.
    pub async fn invalidate_materia(&self, materia_id: Uuid) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| key.materia_id != materia_id);
        before - entries.len()
    }

    /// Drop expired snapshots, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, snapshot| snapshot.stored_at.elapsed() < self.ttl);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
