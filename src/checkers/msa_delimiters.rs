//! Main stream attribute packet delimiters.
//!
//! An MSA opens with two SS symbols in consecutive states and closes with a
//! single SE. At most one violation is reported per state: the inhibit flag is
//! shared by all lanes and cleared by the next SE or event code change. Lane
//! bookkeeping survives the SE until the event code changes or a new SS
//! arrives, so a repeated SE is still attributed to its packet.

use crate::catalog::CheckerKind;
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::MAX_LANES;
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::symbol::ControlSymbol;
use crate::traits::{Checker, StateView};
use crate::types::StateIndex;

#[derive(Debug, Clone, Copy, Default)]
struct LaneMsa {
    ss_count: u32,
    first_ss: Option<StateIndex>,
    se_count: u32,
    in_msa: bool,
    /// An SE was seen; the next SS starts a new packet.
    closed: bool,
}

#[derive(Debug, Default)]
pub struct MsaDelimiterChecker {
    width: LinkWidth,
    lanes: [LaneMsa; MAX_LANES],
    previous_event: Option<u32>,
    inhibit: bool,
    msa_count: u64,
}

impl MsaDelimiterChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, ledger: &mut ErrorLedger, message: &'static str) {
        if !self.inhibit {
            ledger.report(message);
            self.inhibit = true;
        }
    }

    fn on_ss(&mut self, lane: usize, index: StateIndex, ledger: &mut ErrorLedger) {
        let tracked = &mut self.lanes[lane];
        if tracked.closed {
            *tracked = LaneMsa::default();
        }
        tracked.ss_count = tracked.ss_count.saturating_add(1);
        match tracked.ss_count {
            1 => tracked.first_ss = Some(index),
            2 if tracked.first_ss.and_then(|first| index.since(first)) == Some(1) => {
                tracked.in_msa = true;
                if lane == 0 {
                    self.msa_count += 1;
                }
            }
            2 => self.fail(ledger, "Non-Sequential MSA SS Symbols"),
            _ => self.fail(ledger, "Three or more SS Symbols"),
        }
    }

    fn on_se(&mut self, lane: usize, ledger: &mut ErrorLedger) {
        let tracked = &mut self.lanes[lane];
        tracked.closed = true;
        if tracked.in_msa {
            tracked.se_count = tracked.se_count.saturating_add(1);
            if tracked.se_count != 1 {
                self.fail(ledger, "Multiple MSA SE Symbols");
            }
        }
    }

    fn on_event_change(&mut self, lane: usize, ledger: &mut ErrorLedger) {
        let tracked = self.lanes[lane];
        if tracked.in_msa && tracked.se_count == 0 {
            self.fail(ledger, "Missing SE Symbol");
        }
        self.lanes[lane] = LaneMsa::default();
    }
}

impl Checker for MsaDelimiterChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::MsaDelimiters
    }

    fn reset(&mut self, config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self {
            width: config.width,
            ..Self::default()
        };
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lanes = state.lanes()?;
        let event = state.event_code()?;
        let event_changed = self.previous_event.is_some_and(|previous| previous != event);
        self.previous_event = Some(event);
        if event_changed {
            self.inhibit = false;
        }

        let mut closing = false;
        for lane in 0..self.width.lanes() {
            match ControlSymbol::from_lane(lanes.get(lane)?) {
                Some(ControlSymbol::Ss) => self.on_ss(lane, state.index(), ledger),
                Some(ControlSymbol::Se) => {
                    self.on_se(lane, ledger);
                    closing = true;
                }
                _ if event_changed => self.on_event_change(lane, ledger),
                _ => {}
            }
        }
        if closing {
            self.inhibit = false;
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number Of MSA SDPs Encountered: {}",
            self.msa_count
        )]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies that each MSA packet begins with two consecutive SS",
            " control characters and ends with a single SE control character.",
            " ",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{all_lanes, drive, run};
    use crate::constants::{SYMBOL_SE, SYMBOL_SS};
    use crate::record::StateRecord;

    fn msa(width: LinkWidth, opening: &[u16]) -> Vec<StateRecord> {
        let mut records = vec![all_lanes(0x000, width, "Ver. MAUD")];
        records.extend(opening.iter().map(|value| all_lanes(*value, width, "MSA")));
        records.extend((1..=9).map(|byte| all_lanes(byte, width, "MSA")));
        records.push(all_lanes(SYMBOL_SE, width, "MSA"));
        records.push(all_lanes(0x000, width, "Ver. BS"));
        records
    }

    #[test]
    fn consecutive_ss_counts_one_msa() {
        let width = LinkWidth::Four;
        let mut run = run(CheckerKind::MsaDelimiters, LinkConfig::new(width));
        assert!(drive(&mut run, &msa(width, &[SYMBOL_SS, SYMBOL_SS])).is_empty());
        assert_eq!(run.results_summary()[1], "Number Of MSA SDPs Encountered: 1");
    }

    #[test]
    fn split_ss_pair_reports_once_across_lanes() {
        let width = LinkWidth::Four;
        let mut run = run(CheckerKind::MsaDelimiters, LinkConfig::new(width));
        let records = msa(width, &[SYMBOL_SS, 0x044, SYMBOL_SS]);
        assert_eq!(
            drive(&mut run, &records),
            vec!["Non-Sequential MSA SS Symbols"]
        );
        assert_eq!(run.results_summary()[1], "Number Of MSA SDPs Encountered: 0");
    }

    #[test]
    fn msa_without_se_is_reported() {
        let width = LinkWidth::Two;
        let mut run = run(CheckerKind::MsaDelimiters, LinkConfig::new(width));
        let mut records = msa(width, &[SYMBOL_SS, SYMBOL_SS]);
        records.retain(|record| *record != all_lanes(SYMBOL_SE, width, "MSA"));
        assert_eq!(drive(&mut run, &records), vec!["Missing SE Symbol"]);
    }

    #[test]
    fn repeated_se_is_reported() {
        let width = LinkWidth::One;
        let mut run = run(CheckerKind::MsaDelimiters, LinkConfig::new(width));
        let mut records = msa(width, &[SYMBOL_SS, SYMBOL_SS]);
        records.insert(records.len() - 1, all_lanes(SYMBOL_SE, width, "MSA"));
        assert_eq!(drive(&mut run, &records), vec!["Multiple MSA SE Symbols"]);
    }

    #[test]
    fn triple_ss_is_reported() {
        let width = LinkWidth::One;
        let mut run = run(CheckerKind::MsaDelimiters, LinkConfig::new(width));
        let records = msa(width, &[SYMBOL_SS, SYMBOL_SS, SYMBOL_SS]);
        assert_eq!(drive(&mut run, &records), vec!["Three or more SS Symbols"]);
    }
}
