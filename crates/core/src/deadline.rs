//! Caller-supplied deadlines for store round trips
//!
//! A deadline is checked before each store call an operation issues. Once it
//! has passed, the next call is not made and the operation fails with
//! `DeadlineExceeded`. Calls already issued are not rolled back.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

/// Point in time after which no further store calls are issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// No deadline
    pub fn none() -> Self {
        Deadline { at: None }
    }

    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Deadline {
            at: Some(Instant::now() + timeout),
        }
    }

    /// Deadline at a fixed instant
    pub fn at(instant: Instant) -> Self {
        Deadline { at: Some(instant) }
    }

    /// Whether a deadline is set
    pub fn is_set(&self) -> bool {
        self.at.is_some()
    }

    /// Time left, `None` when unbounded
    pub fn remaining(&self) -> Option<Duration> {
        self.at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        matches!(self.at, Some(at) if Instant::now() >= at)
    }

    /// Fail with `DeadlineExceeded` if the deadline has passed
    ///
    /// `operation` names the store call about to be issued.
    #[inline]
    pub fn check(&self, operation: &str) -> Result<()> {
        if self.is_expired() {
            return Err(Error::DeadlineExceeded {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// `self` if set, otherwise `fallback`
    pub fn or(self, fallback: Deadline) -> Deadline {
        if self.is_set() {
            self
        } else {
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_never_expires() {
        let d = Deadline::none();
        assert!(!d.is_set());
        assert!(!d.is_expired());
        assert!(d.remaining().is_none());
        assert!(d.check("map_put").is_ok());
    }

    #[test]
    fn test_past_deadline_fails_check() {
        let d = Deadline::at(Instant::now() - Duration::from_millis(1));
        assert!(d.is_expired());
        match d.check("ranked_upsert") {
            Err(Error::DeadlineExceeded { operation }) => assert_eq!(operation, "ranked_upsert"),
            other => panic!("expected DeadlineExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_future_deadline_passes() {
        let d = Deadline::after(Duration::from_secs(60));
        assert!(d.check("exists").is_ok());
        assert!(d.remaining().unwrap() > Duration::from_secs(50));
    }

    #[test]
    fn test_or_prefers_explicit() {
        let explicit = Deadline::after(Duration::from_secs(1));
        let fallback = Deadline::after(Duration::from_secs(100));
        assert_eq!(explicit.or(fallback), explicit);
        assert_eq!(Deadline::none().or(fallback), fallback);
    }
}
