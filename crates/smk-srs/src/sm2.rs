//! SM-2 review update.

use crate::mastery::SrsState;

/// Lowest ease factor a concept can reach.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Highest recall quality accepted by [`review`].
pub const MAX_QUALITY: u8 = 5;

/// Apply one review of the given recall `quality` (0-5) to a learning state.
///
/// Qualities above 5 are treated as 5. A quality below 3 is a lapse: the
/// repetition count resets and the concept comes back the next day.
///
/// # Algorithm
///
/// * `EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`, floored at 1.3
/// * first success: 1 day, second success: 6 days
/// * later successes: `round(interval * EF')` days
pub fn review(state: &SrsState, quality: u8) -> SrsState {
    let q = f64::from(quality.min(MAX_QUALITY));

    let ease_delta = 0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02);
    let ease_factor = (state.ease_factor + ease_delta).max(MIN_EASE_FACTOR);

    if q < 3.0 {
        return SrsState {
            repetitions: 0,
            interval: 1.0,
            ease_factor,
        };
    }

    let interval = match state.repetitions {
        0 => 1.0,
        1 => 6.0,
        _ => (state.interval * ease_factor).round(),
    };

    SrsState {
        repetitions: state.repetitions + 1,
        interval,
        ease_factor,
    }
}
