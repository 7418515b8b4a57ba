use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name shown for students without a readable profile.
pub const UNKNOWN_STUDENT_NAME: &str = "Student";

/// A student with a materia score, before positions are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredStudent {
    pub user_id: Uuid,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    /// 1-based, no gaps
    pub position: u32,
    pub user_id: Uuid,
    pub name: String,
    pub score: i64,
    pub is_current_user: bool,
}

/// Higher score first, then name (case-insensitive), then user id.
fn ranking_order(a: &ScoredStudent, b: &ScoredStudent) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Sort students and assign positions.
pub fn rank(mut students: Vec<ScoredStudent>, current_user: Uuid) -> Vec<RankingEntry> {
    students.sort_by(ranking_order);

    students
        .into_iter()
        .zip(1..)
        .map(|(student, position)| RankingEntry {
            position,
            is_current_user: student.user_id == current_user,
            user_id: student.user_id,
            name: student.name,
            score: student.score,
        })
        .collect()
}

/// First `limit` entries. When the current user falls outside them, their
/// entry takes the last slot and keeps its real position. At least one slot
/// is always kept.
pub fn top_n(mut entries: Vec<RankingEntry>, limit: usize) -> Vec<RankingEntry> {
    let limit = limit.max(1);
    if entries.len() <= limit {
        return entries;
    }

    let current = entries
        .iter()
        .position(|e| e.is_current_user)
        .filter(|index| *index >= limit)
        .map(|index| entries.swap_remove(index));

    entries.truncate(limit);
    if let (Some(current), Some(last)) = (current, entries.last_mut()) {
        *last = current;
    }
    entries
}
