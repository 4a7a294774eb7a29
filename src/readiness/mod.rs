// src/readiness/mod.rs

//! Readiness conditions: "wait until this service/file is ready".
//!
//! - [`condition`] parses the one-line spec grammar into a validated
//!   [`ReadinessCondition`].
//! - [`poller`] probes a condition until it holds or the time budget runs out.

pub mod condition;
pub mod poller;

use std::time::Duration;

pub use condition::{ReadinessCondition, ReadinessState, ReadinessTarget, TargetKind};
pub use poller::{wait, wait_with};

use crate::types::{DEFAULT_WAIT_INTERVAL, DEFAULT_WAIT_TIMEOUT};

/// A condition plus the time budget for waiting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitSpec {
    pub condition: ReadinessCondition,
    pub timeout: Duration,
    pub interval: Duration,
}

impl WaitSpec {
    /// Wait spec with the default timeout and interval.
    pub fn new(condition: ReadinessCondition) -> Self {
        Self {
            condition,
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_WAIT_INTERVAL,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
