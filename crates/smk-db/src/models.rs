use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Concept model - a single term/definition pair owned by one notebook
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Concept {
    pub id: Uuid,
    pub notebook_id: Uuid,
    pub term: String,
    pub definition: String,
}

/// Notebook model - an ordered collection of concepts
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notebook {
    pub id: Uuid,
    pub title: String,
    /// Subject this notebook is taught under, if any
    pub materia_id: Option<Uuid>,
}

/// Materia (subject) model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Materia {
    pub id: Uuid,
    pub name: String,
    /// Teacher owning the subject
    pub teacher_id: Option<Uuid>,
}

/// Public profile used to label ranking entries
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: Option<String>,
}

impl UserProfile {
    /// Name shown to other students: the display name, else the username.
    pub fn shown_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Spaced-repetition state of one concept for one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LearningState {
    pub user_id: Uuid,
    pub concept_id: Uuid,
    /// Successful recalls in a row (never negative)
    pub repetitions: i32,
    /// Days until the next expected review
    #[sqlx(rename = "review_interval")]
    pub interval: f64,
    pub ease_factor: f64,
    /// Study mode that last reviewed the concept
    pub last_module: Option<String>,
}

/// Study mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StudyMode {
    /// Intelligent review, scored by intensity
    #[serde(rename = "smart", alias = "intelligent")]
    Smart,
    /// Active study with voice recognition, scored by the session score
    #[serde(rename = "voice-recognition")]
    Voice,
    /// Free study, scored per session
    #[serde(rename = "free")]
    Free,
}

impl StudyMode {
    /// Label stored in the `mode` column
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Voice => "voice-recognition",
            Self::Free => "free",
        }
    }

    /// Every label a session of this mode may be stored under
    pub const fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::Smart => &["smart", "intelligent"],
            Self::Voice => &["voice-recognition"],
            Self::Free => &["free"],
        }
    }

    /// Parse a stored label, accepting `intelligent` as an alias of `smart`
    pub fn from_label(label: &str) -> Option<Self> {
        [Self::Smart, Self::Voice, Self::Free]
            .into_iter()
            .find(|mode| mode.labels().contains(&label))
    }
}

impl std::fmt::Display for StudyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One study activity of a user on a notebook
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudySession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notebook_id: Uuid,
    pub mode: String,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: i64,
    /// Smart mode only: `warm_up`, `progress` or `rocket`
    pub intensity: Option<String>,
    /// Voice mode only: running score
    pub session_score: Option<f64>,
    /// Voice mode only: score recorded at completion
    pub final_session_score: Option<f64>,
    pub validated: bool,
}

/// Filter for scanning study sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionQuery {
    pub user_id: Uuid,
    pub notebook_id: Uuid,
    pub mode: StudyMode,
    /// Only return sessions marked as validated
    pub validated_only: bool,
}

/// Running quiz statistics of a user on a notebook
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct QuizStats {
    pub user_id: Uuid,
    pub notebook_id: Uuid,
    /// Best quiz score so far
    pub max_score: i64,
    /// Sum of every quiz score
    pub total_score: i64,
    pub attempts: i32,
}

/// Aggregate points earned in mini-games for a notebook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GamePoints {
    pub total_points: i64,
}

/// Persisted streak of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StreakRecord {
    pub user_id: Uuid,
    pub current_streak: i32,
    pub last_study_date: Option<NaiveDate>,
    /// Study days, oldest first, at most 30 days back
    pub study_history: Vec<NaiveDate>,
}

/// Sources that count as "studied" for the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    /// Study session with a positive duration
    StudySession,
    /// Completed quiz
    Quiz,
    /// Completed mini-quiz
    MiniQuiz,
    /// Completed game session, or one with a positive duration
    Game,
}

impl ActivitySource {
    pub const ALL: [Self; 4] = [Self::StudySession, Self::Quiz, Self::MiniQuiz, Self::Game];
}

/// Half-open time window `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ActivityWindow {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at < self.to
    }
}

/// Insert struct for a finished quiz
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResultInsert {
    pub user_id: Uuid,
    pub notebook_id: Uuid,
    pub score: i64,
    pub completed_at: DateTime<Utc>,
}

/// One mini-game play
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GameSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notebook_id: Uuid,
    pub game: String,
    pub points: i64,
    pub duration_seconds: i64,
    pub completed: bool,
    pub played_at: DateTime<Utc>,
}

/// Link between a student, a teacher and a materia
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Enrollment {
    pub student_id: Uuid,
    pub materia_id: Uuid,
    pub teacher_id: Uuid,
    /// Only `active` enrollments count for rankings
    pub status: String,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}
