//! Time source used for timestamps and join dates.
//!
//! Production code uses [`SystemClock`]; tests swap in a stepping clock so
//! ordering assertions do not depend on wall-clock resolution.

use std::fmt::Debug;

use time::{Date, OffsetDateTime};

pub trait Clock: Send + Sync + Debug {
    /// Current instant in UTC.
    fn now(&self) -> OffsetDateTime;

    /// Current calendar date in UTC.
    fn today(&self) -> Date {
        self.now().date()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(test)]
pub use self::testing::SteppingClock;

#[cfg(test)]
mod testing {
    use std::sync::Mutex;

    use time::{Duration, OffsetDateTime};

    use super::Clock;

    /// Advances by a fixed step on every `now()` call, so consecutive
    /// timestamps are strictly increasing.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<OffsetDateTime>,
        step: Duration,
    }

    impl SteppingClock {
        pub fn starting_at(start: OffsetDateTime) -> Self {
            Self {
                next: Mutex::new(start),
                step: Duration::seconds(1),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> OffsetDateTime {
            let mut next = self.next.lock().unwrap();
            let current = *next;
            *next = current + self.step;
            current
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn stepping_clock_is_strictly_increasing() {
        let clock = SteppingClock::starting_at(datetime!(2024-03-01 09:00 UTC));
        let a = clock.now();
        let b = clock.now();
        let c = clock.now();
        assert!(a < b && b < c);
        assert_eq!(a, datetime!(2024-03-01 09:00 UTC));
    }

    #[test]
    fn today_uses_the_clock_date() {
        let clock = SteppingClock::starting_at(datetime!(2024-03-01 23:59:59 UTC));
        assert_eq!(clock.today(), time::macros::date!(2024 - 03 - 01));
    }
}
