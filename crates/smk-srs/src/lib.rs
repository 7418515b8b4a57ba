//! SRS (Spaced Repetition System) rules for Simonkey
//!
//! This crate holds the pure, I/O-free rules of the progress engine:
//! how a concept's review history maps to a mastery level, how a review
//! updates that history, how study sessions turn into points, and how the
//! daily study streak advances or decays.

pub mod mastery;
pub mod points;
pub mod sm2;
pub mod streak;

pub use mastery::{Mastery, MasteryTally, SrsState, classify};
pub use points::{StudyIntensity, scale_points, streak_bonus};
pub use streak::{StreakState, StreakTransition, WeeklyActivity};
