//! Point tables for study activities.

/// Points granted for every day of an active streak.
pub const STREAK_BONUS_PER_DAY: i64 = 200;

/// Raw points granted for each free-study session.
pub const FREE_STUDY_SESSION_POINTS: f64 = 0.05;

/// Factor turning fractional session sums into integer points.
pub const SESSION_POINTS_SCALE: f64 = 1000.0;

/// Intensity picked by the learner for a smart (intelligent review) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudyIntensity {
    WarmUp,
    Progress,
    Rocket,
    /// Any value the table does not know about
    Other(String),
}

impl StudyIntensity {
    /// Parse the stored intensity label. Unknown labels are kept as [`StudyIntensity::Other`].
    pub fn from_label(label: &str) -> Self {
        match label {
            "warm_up" => Self::WarmUp,
            "progress" => Self::Progress,
            "rocket" => Self::Rocket,
            other => Self::Other(other.to_string()),
        }
    }

    /// Raw points for one session at this intensity.
    ///
    /// * `warm_up` - 0.5
    /// * `progress` - 1.0
    /// * `rocket` - 2.0
    /// * anything else - 0.5
    pub const fn points(&self) -> f64 {
        match self {
            Self::WarmUp | Self::Other(_) => 0.5,
            Self::Progress => 1.0,
            Self::Rocket => 2.0,
        }
    }
}

/// Raw points for a smart session whose intensity may be missing.
pub fn intensity_points(label: Option<&str>) -> f64 {
    label.map_or(0.5, |l| StudyIntensity::from_label(l).points())
}

/// Scale a raw session sum into integer points: `round(raw * 1000)`.
pub fn scale_points(raw: f64) -> i64 {
    (raw * SESSION_POINTS_SCALE).round() as i64
}

/// Bonus points for a streak of `days` consecutive study days.
///
/// The bonus grows linearly without a cap.
pub const fn streak_bonus(days: u32) -> i64 {
    days as i64 * STREAK_BONUS_PER_DAY
}
