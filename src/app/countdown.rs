// SPDX-License-Identifier: GPL-3.0-only

//! Capture countdown
//!
//! ```text
//! Idle ─start(3)→ Running(3) ─tick→ Running(2) ─tick→ Running(1) ─tick→ Fire → Idle
//! ```
//!
//! The countdown cannot be cancelled; once started it always fires.

use std::fmt;

/// Outcome of one countdown step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still counting; the value to show now
    Continue(u32),
    /// Reached zero: capture now. The countdown is idle again.
    Fire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownError {
    AlreadyRunning,
    ZeroLength,
}

impl fmt::Display for CountdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountdownError::AlreadyRunning => write!(f, "Countdown is already running"),
            CountdownError::ZeroLength => write!(f, "Countdown must start above zero"),
        }
    }
}

impl std::error::Error for CountdownError {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: Option<u32>,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, from: u32) -> Result<(), CountdownError> {
        if self.remaining.is_some() {
            return Err(CountdownError::AlreadyRunning);
        }
        if from == 0 {
            return Err(CountdownError::ZeroLength);
        }
        self.remaining = Some(from);
        Ok(())
    }

    /// Advance by one step
    ///
    /// Returns `None` when idle, so a stray timer tick is harmless.
    pub fn tick(&mut self) -> Option<CountdownStep> {
        let remaining = self.remaining?;
        let next = remaining.saturating_sub(1);
        if next == 0 {
            self.remaining = None;
            Some(CountdownStep::Fire)
        } else {
            self.remaining = Some(next);
            Some(CountdownStep::Continue(next))
        }
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }
}
