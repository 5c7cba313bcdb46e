//! Blank lines carry no pixel states.
//!
//! The vertical-blanking and no-video flags are latched from each VBID on
//! lane 0. While either flag is set, a blanking end, pixel or stuffing state
//! is a violation. Reporting stops until the next blanking-start sequence.

use crate::catalog::CheckerKind;
use crate::checkers::SequenceTracker;
use crate::config::LinkConfig;
use crate::constants::{VBID_NO_VIDEO_FLAG, VBID_VERTICAL_BLANKING_FLAG};
use crate::error::{CheckerError, ConfigError};
use crate::event::EventCategory;
use crate::ledger::ErrorLedger;
use crate::traits::{Checker, StateView};

#[derive(Debug)]
pub struct BlankLineChecker {
    vertical_blanking: bool,
    no_video: bool,
    /// Set until the first blanking start, and after every violation.
    inhibit: bool,
    sequences: SequenceTracker,
}

impl Default for BlankLineChecker {
    fn default() -> Self {
        Self {
            vertical_blanking: false,
            no_video: false,
            inhibit: true,
            sequences: SequenceTracker::new(),
        }
    }
}

impl BlankLineChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn violation(category: EventCategory) -> Option<&'static str> {
        match category {
            EventCategory::BlankingEnd(_) => Some("Unexpected Blanking End Encountered."),
            EventCategory::Pixel(_) => Some("Unexpected Pixel Encountered."),
            EventCategory::Stuffing(_) => Some("Unexpected Active Dummy (Stuffed) Encountered."),
            _ => None,
        }
    }
}

impl Checker for BlankLineChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::BlankLineNoPixel
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::default();
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lane0 = state.lane(0)?;
        if self.sequences.observe(lane0, state.index()) {
            self.inhibit = false;
        }

        let category = state.event()?;
        if let EventCategory::Vbid(_) = category {
            self.vertical_blanking = lane0 & VBID_VERTICAL_BLANKING_FLAG != 0;
            self.no_video = lane0 & VBID_NO_VIDEO_FLAG != 0;
            return Ok(());
        }
        if (self.vertical_blanking || self.no_video) && !self.inhibit {
            if let Some(message) = Self::violation(category) {
                log::trace!("{message} at {}", state.index());
                ledger.report(message);
                self.inhibit = true;
            }
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number of BS Sequences Processed: {}",
            self.sequences.count()
        )]
    }

    fn fail_status(&self) -> &'static str {
        "Failed: Unexpected Pixel States Encountered."
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies blank lines do not contain any pixel states.",
            " ",
            " The test extracts the Vertical_Blanking_Flag and No_Video bits from",
            " each encountered VBID (lane 0 only).  The blanking section must not contain",
            " any pixel, stuffing or blanking end states while either flag is set.",
            " ",
            " This test only operates on lane 0.",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{drive, run, state};
    use crate::config::LinkWidth;
    use crate::constants::{SYMBOL_BE, SYMBOL_BF, SYMBOL_BS};
    use crate::record::StateRecord;

    fn line(vbid: u16, body: &[&str]) -> Vec<StateRecord> {
        let mut records = vec![
            state(&[SYMBOL_BS], "Hor. BS"),
            state(&[SYMBOL_BF], "Hor. BF"),
            state(&[SYMBOL_BF], "Hor. BF"),
            state(&[SYMBOL_BS], "Hor. BS"),
            state(&[vbid], "Hor. VBID"),
            state(&[0x000], "Hor. MVID"),
            state(&[0x000], "Hor. MAUD"),
        ];
        records.extend(body.iter().map(|event| state(&[SYMBOL_BE], event)));
        records
    }

    #[test]
    fn active_lines_may_carry_pixels() {
        let mut run = run(CheckerKind::BlankLineNoPixel, LinkConfig::new(LinkWidth::One));
        let records = line(0x000, &["Hor. BE", "F0 Pixel", "F0 Stuff", "F0 Pixel"]);
        assert!(drive(&mut run, &records).is_empty());
    }

    #[test]
    fn blank_line_reports_first_offender_only() {
        let mut run = run(CheckerKind::BlankLineNoPixel, LinkConfig::new(LinkWidth::One));
        let mut records = line(0x001, &["F0 Pixel", "F0 Stuff", "Hor. BE"]);
        records.extend(line(0x008, &["F1 Stuff"]));
        records.extend(line(0x009, &["Ver. BE"]));
        assert_eq!(
            drive(&mut run, &records),
            vec![
                "Unexpected Pixel Encountered.",
                "Unexpected Active Dummy (Stuffed) Encountered.",
                "Unexpected Blanking End Encountered.",
            ]
        );
        assert_eq!(
            run.results_summary().last().unwrap(),
            "  Failed: Unexpected Pixel States Encountered."
        );
    }

    #[test]
    fn nothing_is_checked_before_the_first_blanking_start() {
        let mut run = run(CheckerKind::BlankLineNoPixel, LinkConfig::new(LinkWidth::Two));
        let records = vec![state(&[0x001, 0x001], "Hor. VBID"), state(&[0, 0], "F0 Pixel")];
        assert!(drive(&mut run, &records).is_empty());
    }
}
