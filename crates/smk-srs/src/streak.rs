//! Daily study streak state machine.
//!
//! All comparisons work on calendar dates, so "yesterday" means the previous
//! midnight-to-midnight day, never "24 hours ago".

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// How many days of study history are kept.
pub const HISTORY_DAYS: i64 = 30;

/// Persistent streak data of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    /// Consecutive study days up to `last_study_date`
    pub current_streak: u32,
    /// Last day with qualifying study activity
    pub last_study_date: Option<NaiveDate>,
    /// Study days of the last [`HISTORY_DAYS`] days, oldest first
    pub study_history: Vec<NaiveDate>,
}

/// Result of checking today's activity against a streak.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreakTransition {
    /// Nothing to persist
    Unchanged,
    /// Studied today after studying yesterday
    Extended(StreakState),
    /// Studied today after a gap, or for the first time
    Restarted(StreakState),
}

impl StreakTransition {
    /// The new state to persist, if any.
    pub fn into_state(self) -> Option<StreakState> {
        match self {
            Self::Unchanged => None,
            Self::Extended(state) | Self::Restarted(state) => Some(state),
        }
    }
}

/// Number of calendar days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = u64::from(day.weekday().num_days_from_monday());
    day - Days::new(offset)
}

impl StreakState {
    /// Advance the streak given whether the user studied `today`.
    ///
    /// Calling this again on the same day is a no-op, so a streak can only
    /// grow once per day.
    pub fn advance(&self, today: NaiveDate, studied_today: bool) -> StreakTransition {
        if !studied_today {
            return StreakTransition::Unchanged;
        }

        match self.last_study_date {
            Some(last) if last == today => StreakTransition::Unchanged,
            Some(last) if days_between(last, today) == 1 => {
                StreakTransition::Extended(self.with_study_day(today, self.current_streak + 1))
            }
            _ => StreakTransition::Restarted(self.with_study_day(today, 1)),
        }
    }

    /// Zero the streak if more than one full day passed since the last study day.
    ///
    /// Returns `None` when the stored state is still valid.
    pub fn heal(&self, today: NaiveDate) -> Option<Self> {
        let last = self.last_study_date?;
        if self.current_streak == 0 || days_between(last, today) <= 1 {
            return None;
        }

        Some(Self {
            current_streak: 0,
            ..self.clone()
        })
    }

    /// Which days of the current Monday-anchored week had study activity.
    pub fn weekly_activity(&self, today: NaiveDate) -> WeeklyActivity {
        let start = week_start(today);
        let mut days = [false; 7];

        for date in &self.study_history {
            let offset = days_between(start, *date);
            if (0..7).contains(&offset) {
                days[offset as usize] = true;
            }
        }

        WeeklyActivity {
            week_start: start,
            days,
        }
    }

    fn with_study_day(&self, today: NaiveDate, current_streak: u32) -> Self {
        let mut study_history: Vec<NaiveDate> = self
            .study_history
            .iter()
            .copied()
            .filter(|d| {
                let age = days_between(*d, today);
                (0..HISTORY_DAYS).contains(&age)
            })
            .collect();
        study_history.push(today);
        study_history.sort_unstable();
        study_history.dedup();

        Self {
            current_streak,
            last_study_date: Some(today),
            study_history,
        }
    }
}

/// Study activity of one Monday-to-Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyActivity {
    pub week_start: NaiveDate,
    /// Index 0 is Monday, index 6 is Sunday
    pub days: [bool; 7],
}
