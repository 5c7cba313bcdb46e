//! Pixel immediately following BE.
//!
//! The state after every blanking end must be a pixel state. Only event codes
//! are used. Unlike the first-pixel placement rule, an empty active segment
//! (BE straight into stuffing or a new blanking start) is a violation here.

use crate::catalog::CheckerKind;
use crate::config::LinkConfig;
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::traits::{Checker, StateView};

#[derive(Debug, Default)]
pub struct PixelAfterBeChecker {
    /// The previous state was a BE.
    after_be: bool,
    blanking_ends: u64,
}

impl PixelAfterBeChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for PixelAfterBeChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::PixelFollowsBe
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::default();
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let category = state.event()?;
        if self.after_be {
            self.after_be = false;
            if !category.is_pixel() {
                log::trace!("{} follows BE at {}", state.event_name()?, state.index());
                ledger.report("Pixel Does Not Immediately Follow BE Symbol.");
            }
        } else if category.is_blanking_end() {
            self.after_be = true;
            self.blanking_ends += 1;
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!("Number of BE States Processed: {}", self.blanking_ends)]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies the state following a Blanking End (BE) is a",
            " pixel state.",
            " ",
            " The test processes/utilizes Event Codes to identify state types.",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{drive, mst_run, mst_states, run, state};
    use crate::config::LinkWidth;

    #[test]
    fn pixel_after_be_passes() {
        let mut run = mst_run(CheckerKind::PixelFollowsBe, LinkConfig::new(LinkWidth::Four));
        let records = mst_states(&["BS", "VBID", "MVID", "MAUD", "BE", "Pixel", "Pixel", "BS"]);
        assert!(drive(&mut run, &records).is_empty());
        assert_eq!(run.results_summary()[1], "Number of BE States Processed: 1");
    }

    #[test]
    fn stuffing_after_be_is_reported_once() {
        let mut run = run(CheckerKind::PixelFollowsBe, LinkConfig::new(LinkWidth::One));
        let records = vec![
            state(&[], "Hor. BE"),
            state(&[], "F0 Stuff"),
            state(&[], "F0 Stuff"),
            state(&[], "Ver. BE"),
            state(&[], "F1 Pixel"),
        ];
        assert_eq!(
            drive(&mut run, &records),
            vec!["Pixel Does Not Immediately Follow BE Symbol."]
        );
    }

    #[test]
    fn be_after_be_is_reported_and_consumed() {
        let mut run = mst_run(CheckerKind::PixelFollowsBe, LinkConfig::new(LinkWidth::Two));
        let records = mst_states(&["BE", "BE", "Pixel"]);
        assert_eq!(drive(&mut run, &records).len(), 1);
        assert_eq!(run.results_summary()[1], "Number of BE States Processed: 1");
    }
}
