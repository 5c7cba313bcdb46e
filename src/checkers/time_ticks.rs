//! Consecutive time tick verification.
//!
//! Each record carries the analyzer's 64-bit tick count. A gap or a repeated
//! tick means states were dropped or duplicated by the capture, so every such
//! transition is reported once. The first state only seeds the comparison.

use crate::catalog::CheckerKind;
use crate::config::LinkConfig;
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::traits::{Checker, StateView};
use crate::types::TimeTicks;

/// Every state must be exactly one tick after the previous one.
#[derive(Debug, Default)]
pub struct TimeTickChecker {
    previous: Option<TimeTicks>,
}

impl TimeTickChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for TimeTickChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::TimeTicks
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        self.previous = None;
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let ticks = state.ticks();
        if let Some(previous) = self.previous {
            if ticks.since(previous) != Some(1) {
                log::trace!("Tick gap at {}: {previous} -> {ticks}", state.index());
                ledger.report("Time Tick Error");
            }
        }
        self.previous = Some(ticks);
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        Vec::new()
    }

    fn description(&self) -> &'static [&'static str] {
        &[" This test verifies time ticks are consecutive.", " "]
    }
}
