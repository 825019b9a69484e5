//! Selection window and predicate.
//!
//! A record is eligible when it is flagged for indexing and was marked at
//! or after `now - window`. The bound is inclusive.

use chrono::{DateTime, Duration, Utc};
use docsync_types::SyncMetadata;
use thiserror::Error;

/// Window length used when none is configured.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Invalid selection window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("selection window must not be negative (got {0}s)")]
    NegativeWindow(i64),

    #[error("selection window of {0} days is out of range")]
    OutOfRange(i64),
}

/// How far back a run looks for marked records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow(Duration);

impl SelectionWindow {
    /// Creates a window. Negative durations are rejected.
    pub fn new(window: Duration) -> Result<Self, QueryError> {
        if window < Duration::zero() {
            return Err(QueryError::NegativeWindow(window.num_seconds()));
        }
        Ok(Self(window))
    }

    /// Creates a window spanning `days` days.
    pub fn days(days: i64) -> Result<Self, QueryError> {
        let window = Duration::try_days(days).ok_or(QueryError::OutOfRange(days))?;
        Self::new(window)
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    /// A zero window selects nothing in practice; callers treat it as
    /// "sync disabled".
    pub fn is_disabled(&self) -> bool {
        self.0.is_zero()
    }

    /// Builds the predicate relative to the current time.
    pub fn build_filter(&self) -> Predicate {
        self.build_filter_at(Utc::now())
    }

    /// Builds the predicate relative to `now`.
    ///
    /// A window reaching past the earliest representable instant selects
    /// every flagged record.
    pub fn build_filter_at(&self, now: DateTime<Utc>) -> Predicate {
        Predicate {
            threshold: now
                .checked_sub_signed(self.0)
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

impl Default for SelectionWindow {
    fn default() -> Self {
        Self(Duration::days(DEFAULT_WINDOW_DAYS))
    }
}

/// `should_index == true AND last_marked_at >= threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate {
    threshold: DateTime<Utc>,
}

impl Predicate {
    /// Predicate with an explicit lower bound on the mark timestamp.
    pub fn since(threshold: DateTime<Utc>) -> Self {
        Self { threshold }
    }

    /// Earliest mark timestamp that still matches.
    pub fn threshold(&self) -> DateTime<Utc> {
        self.threshold
    }

    pub fn matches(&self, meta: &SyncMetadata) -> bool {
        meta.should_index
            && meta
                .last_marked_at
                .is_some_and(|marked| marked >= self.threshold)
    }
}
