use std::time::{Duration, Instant};

use crate::error::{SketchError, SketchResult};

/// Per-file time budget for pattern matching.
///
/// Rule sets call [`Deadline::check`] between pattern applications; once the
/// budget is spent the current file's analysis fails with
/// [`SketchError::PatternTimeout`] and the caller degrades that file only.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget: Some(budget),
        }
    }

    pub fn unbounded() -> Self {
        Self {
            started: Instant::now(),
            budget: None,
        }
    }

    pub fn expired(&self) -> bool {
        match self.budget {
            Some(budget) => self.started.elapsed() >= budget,
            None => false,
        }
    }

    pub fn check(&self) -> SketchResult<()> {
        match self.budget {
            Some(budget) if self.expired() => Err(SketchError::PatternTimeout { budget }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_budget_is_already_expired() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.expired());
        assert!(deadline.check().unwrap_err().is_timeout());
    }

    #[test]
    fn unbounded_never_expires() {
        assert!(Deadline::unbounded().check().is_ok());
    }
}
