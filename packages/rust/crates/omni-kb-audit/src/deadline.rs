//! Caller-supplied run deadline shared by all audit stages.

use std::time::{Duration, Instant};

use crate::error::{AuditError, AuditResult};

/// Overall time budget for one audit run.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// Start a deadline; `None` never expires.
    #[must_use]
    pub fn start(limit: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    /// A deadline that never expires.
    #[must_use]
    pub fn unbounded() -> Self {
        Self::start(None)
    }

    /// Fail once the budget is spent.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Timeout`] carrying the elapsed milliseconds.
    pub fn check(&self) -> AuditResult<()> {
        let Some(limit) = self.limit else {
            return Ok(());
        };
        let elapsed = self.started.elapsed();
        if elapsed >= limit {
            return Err(AuditError::Timeout {
                elapsed_ms: elapsed.as_millis(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_expires() {
        assert!(Deadline::unbounded().check().is_ok());
    }

    #[test]
    fn test_zero_budget_expires_immediately() {
        let deadline = Deadline::start(Some(Duration::ZERO));
        assert!(matches!(deadline.check(), Err(AuditError::Timeout { .. })));
    }
}
