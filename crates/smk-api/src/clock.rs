//! Source of "now" and of the local calendar day.

use std::{
    fmt::Debug,
    sync::atomic::{AtomicI64, Ordering},
};

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use smk_db::models::ActivityWindow;

pub trait Clock: Send + Sync + Debug + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// Offset of the local calendar from UTC.
    fn offset(&self) -> FixedOffset;

    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset()).date_naive()
    }

    /// `[local midnight, next local midnight)` of `day`, expressed in UTC.
    fn day_window(&self, day: NaiveDate) -> ActivityWindow {
        let offset = TimeDelta::seconds(i64::from(self.offset().local_minus_utc()));
        let from = (day.and_time(NaiveTime::MIN) - offset).and_utc();

        ActivityWindow {
            from,
            to: from + Duration::days(1),
        }
    }

    fn today_window(&self) -> ActivityWindow {
        self.day_window(self.today())
    }
}

/// Wall clock with a fixed local offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
    offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            millis: AtomicI64::new(now.timestamp_millis()),
            offset,
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.millis.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}
