//! Mastery classification of a single concept.

use serde::{Deserialize, Serialize};

/// Ease factor assigned to a concept that has never been reviewed.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval (in days) assigned to a concept that has never been reviewed.
pub const DEFAULT_INTERVAL: f64 = 1.0;

/// Spaced-repetition bookkeeping for one user and one concept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SrsState {
    /// Number of successful recalls in a row
    pub repetitions: u32,
    /// Days until the next expected review
    pub interval: f64,
    /// Recall difficulty, higher is easier
    pub ease_factor: f64,
}

impl Default for SrsState {
    fn default() -> Self {
        Self {
            repetitions: 0,
            interval: DEFAULT_INTERVAL,
            ease_factor: DEFAULT_EASE_FACTOR,
        }
    }
}

/// How well a user knows a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mastery {
    Dominated,
    Learning,
    NotStarted,
}

/// Classify a concept from its learning state.
///
/// `None` means the user has no learning record for the concept, which is
/// always [`Mastery::NotStarted`], even though a freshly created record with
/// default values would count as [`Mastery::Learning`].
///
/// # Examples
/// ```
/// use smk_srs::{Mastery, SrsState, classify};
///
/// let state = SrsState { repetitions: 2, interval: 3.0, ease_factor: 2.5 };
/// assert_eq!(classify(Some(&state)), Mastery::Dominated);
/// assert_eq!(classify(None), Mastery::NotStarted);
/// ```
pub fn classify(state: Option<&SrsState>) -> Mastery {
    let Some(state) = state else {
        return Mastery::NotStarted;
    };

    let reps = state.repetitions;
    let interval = state.interval;

    if reps >= 2 || interval >= 7.0 || (reps >= 1 && state.ease_factor > 2.6) {
        Mastery::Dominated
    } else if reps >= 1 || interval > 1.0 || (reps == 0 && interval >= 0.25) {
        Mastery::Learning
    } else {
        Mastery::NotStarted
    }
}

/// Per-bucket concept counts for a notebook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryTally {
    pub total: u32,
    pub dominated: u32,
    pub learning: u32,
    pub not_started: u32,
}

impl MasteryTally {
    /// A tally where every one of `total` concepts is not started.
    pub const fn all_not_started(total: u32) -> Self {
        Self {
            total,
            dominated: 0,
            learning: 0,
            not_started: total,
        }
    }

    /// Count one more concept.
    pub const fn record(&mut self, mastery: Mastery) {
        self.total += 1;
        match mastery {
            Mastery::Dominated => self.dominated += 1,
            Mastery::Learning => self.learning += 1,
            Mastery::NotStarted => self.not_started += 1,
        }
    }

    /// Share of dominated concepts, rounded to a whole percent.
    pub fn dominated_percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.dominated) / f64::from(self.total) * 100.0).round() as u32
    }
}

impl FromIterator<Mastery> for MasteryTally {
    fn from_iter<I: IntoIterator<Item = Mastery>>(iter: I) -> Self {
        let mut tally = Self::default();
        for mastery in iter {
            tally.record(mastery);
        }
        tally
    }
}
