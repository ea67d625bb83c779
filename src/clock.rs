//! Deterministic calendar abstraction for the caller side of verification.
//!
//! The verifier itself takes the current date as a parameter. `Clock` is how
//! applications acquire that date, and how tests pin it.

use chrono::{Local, NaiveDate};

/// Clock trait for deterministic dates in tests.
pub trait Clock: Send + Sync {
    /// Get the current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// System clock using the local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Mock clock for deterministic testing.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    today: NaiveDate,
}

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Create a mock clock frozen at the given date.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Create a mock clock from a `YYYY-MM-DD` string.
    pub fn from_ymd_str(s: &str) -> Self {
        Self {
            today: NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid YYYY-MM-DD date"),
        }
    }

    /// Advance the clock by a number of days (negative goes back).
    pub fn advance_days(&mut self, days: i64) {
        self.today = self.today + chrono::Duration::days(days);
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}
