//! Caller-supplied deadline for long-running geometry passes.

use crate::error::{ResolverError, Result};
use std::time::{Duration, Instant};

/// A wall-clock deadline checked between geometry operations.
///
/// Expiry aborts the resolver run before anything is committed; the
/// plan/commit split makes the rollback free.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    limit: Option<Instant>,
    started: Instant,
}

impl Deadline {
    /// No deadline.
    pub fn none() -> Self {
        Self {
            limit: None,
            started: Instant::now(),
        }
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        let now = Instant::now();
        Self {
            limit: now.checked_add(timeout),
            started: now,
        }
    }

    /// True once the deadline has passed.
    pub fn is_expired(&self) -> bool {
        self.limit.is_some_and(|limit| Instant::now() >= limit)
    }

    /// Error out if the deadline has passed.
    pub fn check(&self) -> Result<()> {
        if self.is_expired() {
            Err(ResolverError::DeadlineExceeded {
                elapsed_ms: self.started.elapsed().as_millis(),
            })
        } else {
            Ok(())
        }
    }
}
