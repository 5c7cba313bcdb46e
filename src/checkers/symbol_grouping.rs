//! BS / SR symbol grouping length.
//!
//! Blanking-start symbols arrive as a group of consecutive states: BS (or
//! SR) with its BF fill. A group longer than [`BLANKING_START_SEQUENCE_LEN`]
//! states means a symbol was replicated in time instead of across lanes.
//! Every state past the limit is reported, labelled by its own symbol.
//!
//! A group already in progress when the capture starts is not judged since its
//! head may have been cut off.

use crate::catalog::CheckerKind;
use crate::config::LinkConfig;
use crate::constants::BLANKING_START_SEQUENCE_LEN;
use crate::error::{CheckerError, ConfigError};
use crate::event::EventCategory;
use crate::ledger::ErrorLedger;
use crate::traits::{Checker, StateView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupSymbol {
    Bs,
    Sr,
}

impl GroupSymbol {
    fn from_category(category: EventCategory) -> Option<Self> {
        match category {
            EventCategory::ScramblerReset(_) => Some(Self::Sr),
            EventCategory::BlankingStart(_) | EventCategory::BlankingFill(_) => Some(Self::Bs),
            _ => None,
        }
    }

    const fn error(self) -> &'static str {
        match self {
            Self::Bs => "BS Symbol Grouping Error.",
            Self::Sr => "SR Symbol Grouping Error.",
        }
    }
}

/// Counts consecutive BS, BF and SR states.
#[derive(Debug, Default)]
pub struct SymbolGroupingChecker {
    /// States in the current group, 0 outside a group.
    run_length: usize,
    /// Current group began on the first state of the capture.
    truncated: bool,
    bs_groups: u64,
    sr_groups: u64,
}

impl SymbolGroupingChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for SymbolGroupingChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::SymbolGrouping
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::default();
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let Some(symbol) = GroupSymbol::from_category(state.event()?) else {
            self.run_length = 0;
            return Ok(());
        };

        if self.run_length == 0 {
            self.truncated = state.index().value() == 0;
            match symbol {
                GroupSymbol::Bs => self.bs_groups += 1,
                GroupSymbol::Sr => self.sr_groups += 1,
            }
        }
        self.run_length = self.run_length.saturating_add(1);

        if !self.truncated && self.run_length > usize::from(BLANKING_START_SEQUENCE_LEN) {
            log::trace!(
                "Grouping of {} states at {}",
                self.run_length,
                state.index()
            );
            ledger.report(symbol.error());
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![
            format!("Number of BS Groupings Processed: {}", self.bs_groups),
            format!("Number of SR Groupings Processed: {}", self.sr_groups),
        ]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies BS and SR symbols are grouped into no more than",
            " four consecutive states (the symbol and its BF fill).",
            " ",
            " Each state beyond the fourth reports an error named after its own",
            " symbol. A grouping already in progress at the start of the capture is",
            " not verified.",
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
    fn sst_blanking_start_sequence_is_one_group() {
        let mut run = run(CheckerKind::SymbolGrouping, LinkConfig::new(LinkWidth::Four));
        let mut records = vec![state(&[], "F0 Pixel")];
        for first in ["Hor. BS", "Hor. SR"] {
            records.extend([
                state(&[], first),
                state(&[], "Hor. BF"),
                state(&[], "Hor. BF"),
                state(&[], first),
                state(&[], "Hor. VBID"),
            ]);
        }
        assert!(drive(&mut run, &records).is_empty());
        let summary = run.results_summary();
        assert_eq!(summary[1], "Number of BS Groupings Processed: 1");
        assert_eq!(summary[2], "Number of SR Groupings Processed: 1");
    }

    #[test]
    fn overlong_groupings_report_each_extra_state() {
        let mut run = mst_run(CheckerKind::SymbolGrouping, LinkConfig::new(LinkWidth::Four));
        let records = mst_states(&[
            "MAUD", "SR", "SR", "SR", "SR", "SR", "BS", "VBID", "BS", "BS", "BS", "BS", "BS",
        ]);
        assert_eq!(
            drive(&mut run, &records),
            vec![
                "SR Symbol Grouping Error.",
                "BS Symbol Grouping Error.",
                "BS Symbol Grouping Error.",
            ]
        );
    }

    #[test]
    fn grouping_at_capture_start_is_not_judged() {
        let mut run = mst_run(CheckerKind::SymbolGrouping, LinkConfig::new(LinkWidth::One));
        let records = mst_states(&["BS", "BS", "BS", "BS", "BS", "BS", "VBID"]);
        assert!(drive(&mut run, &records).is_empty());
    }
}
