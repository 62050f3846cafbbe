//! Change detection between renders.
//!
//! The poller remembers the last version tag it saw and decides whether a
//! new render is needed. Failed checks back off exponentially.

use std::time::Duration;

use crate::services::source::{EventSource, SourceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    Render,
    Unchanged,
}

#[derive(Debug, Clone)]
pub struct ChangePoller {
    last_tag: Option<String>,
    has_checked: bool,
    consecutive_failures: u32,
    max_backoff: Duration,
}

impl Default for ChangePoller {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangePoller {
    pub fn new() -> Self {
        Self {
            last_tag: None,
            has_checked: false,
            consecutive_failures: 0,
            max_backoff: Duration::from_secs(60 * 60),
        }
    }

    pub fn last_tag(&self) -> Option<&str> {
        self.last_tag.as_deref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Compare a freshly observed tag with the remembered one.
    ///
    /// The first check always renders. After that only a matching pair of
    /// present tags counts as unchanged; a missing tag on either side renders.
    pub fn check(&mut self, current: Option<&str>) -> PollDecision {
        let unchanged = self.has_checked
            && matches!((self.last_tag.as_deref(), current), (Some(last), Some(now)) if last == now);

        self.has_checked = true;
        self.consecutive_failures = 0;

        if unchanged {
            PollDecision::Unchanged
        } else {
            self.last_tag = current.map(str::to_string);
            PollDecision::Render
        }
    }

    /// Ask the source for its current tag and decide.
    pub fn poll(&mut self, source: &dyn EventSource) -> Result<PollDecision, SourceError> {
        match source.version_tag() {
            Ok(tag) => Ok(self.check(tag.as_deref())),
            Err(err) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                Err(err)
            }
        }
    }

    /// Forget the remembered tag so the next check renders, e.g. after a
    /// failed render.
    pub fn invalidate(&mut self) {
        self.last_tag = None;
        self.has_checked = false;
    }

    /// Wait before the next check: the base interval, doubled for every
    /// consecutive failure and capped.
    pub fn next_delay(&self, base: Duration) -> Duration {
        if self.consecutive_failures == 0 {
            return base;
        }

        let factor = 2_u32.saturating_pow(self.consecutive_failures.min(10));
        base.saturating_mul(factor).min(self.max_backoff.max(base))
    }
}
