//! Scrambler reset spacing: every 512th blanking start must be an SR.
//!
//! Lane 0 only. An SR sequence is SR, BF, BF, SR; between two completed SR
//! sequences exactly 511 BS sequences must be seen. A BS is counted once per
//! sequence, i.e. only when it lies more than four states after the previously
//! counted one.

use crate::catalog::CheckerKind;
use crate::config::LinkConfig;
use crate::constants::{BLANKING_START_SEQUENCE_LEN, BS_SEQUENCES_BETWEEN_SR};
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::symbol::ControlSymbol;
use crate::traits::{Checker, StateView};
use crate::types::StateIndex;

/// Index of the closing SR inside an SR sequence.
const SR_SEQUENCE_LAST: u8 = BLANKING_START_SEQUENCE_LEN - 1;

#[derive(Debug, Default)]
pub struct SrSpacingChecker {
    sr_position: Option<u8>,
    sr_sequences: u64,
    bs_sequences: u32,
    last_counted_bs: Option<StateIndex>,
}

impl SrSpacingChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn on_sr(&mut self, ledger: &mut ErrorLedger) {
        let position = self.sr_position.map_or(0, |p| p.saturating_add(1));
        self.sr_position = Some(position);
        if position == SR_SEQUENCE_LAST {
            if self.sr_sequences > 0 && self.bs_sequences != BS_SEQUENCES_BETWEEN_SR {
                log::debug!(
                    "{} BS sequences between SR sequences, expected {BS_SEQUENCES_BETWEEN_SR}",
                    self.bs_sequences
                );
                ledger.report("Invalid Number of BS Symbols between SR Symbols");
            }
            self.sr_sequences += 1;
            self.bs_sequences = 0;
        } else if position > SR_SEQUENCE_LAST {
            ledger.report("Invalid SR Symbol Sequence");
        }
    }

    fn on_bf(&mut self, ledger: &mut ErrorLedger) {
        if let Some(position) = self.sr_position {
            let position = position.saturating_add(1);
            self.sr_position = Some(position);
            if position > SR_SEQUENCE_LAST {
                ledger.report("Invalid SR Symbol Sequence");
            }
        }
    }

    fn on_bs(&mut self, index: StateIndex) {
        if self.sr_sequences == 0 {
            return;
        }
        let min_gap = u64::from(BLANKING_START_SEQUENCE_LEN);
        let new_sequence = self
            .last_counted_bs
            .is_none_or(|last| index.since(last).is_some_and(|gap| gap > min_gap));
        if new_sequence {
            self.bs_sequences = self.bs_sequences.saturating_add(1);
            self.last_counted_bs = Some(index);
        }
    }
}

impl Checker for SrSpacingChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::SrEvery512thBs
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::default();
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lane0 = match state.lane(0) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Lane0 lookup failed at {}: {err}", state.index());
                ledger.report("Lane0 - Get Lane Data Failure");
                return Ok(());
            }
        };

        match ControlSymbol::from_lane(lane0) {
            Some(ControlSymbol::Sr) => self.on_sr(ledger),
            Some(ControlSymbol::Bf) => self.on_bf(ledger),
            Some(ControlSymbol::Bs) => self.on_bs(state.index()),
            _ => self.sr_position = None,
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number Of SR Symbols Encountered: {}",
            self.sr_sequences
        )]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies that every 512th BS sequence is replaced with an SR control character.",
            "  ",
            "  This test operates on lane 0 only.",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{all_lanes, drive, run};
    use crate::config::LinkWidth;
    use crate::constants::{SYMBOL_BF, SYMBOL_BS, SYMBOL_SR};
    use crate::record::StateRecord;

    fn blanking(first: u16, width: LinkWidth) -> Vec<StateRecord> {
        [first, SYMBOL_BF, SYMBOL_BF, first, 0x000, 0x000]
            .iter()
            .map(|symbol| all_lanes(*symbol, width, "Hor. BS"))
            .collect()
    }

    fn capture(bs_between: usize) -> Vec<StateRecord> {
        let width = LinkWidth::One;
        let mut records = blanking(SYMBOL_SR, width);
        for _ in 0..bs_between {
            records.extend(blanking(SYMBOL_BS, width));
        }
        records.extend(blanking(SYMBOL_SR, width));
        records
    }

    #[test]
    fn exactly_511_bs_sequences_pass() {
        let mut run = run(CheckerKind::SrEvery512thBs, LinkConfig::new(LinkWidth::One));
        assert!(drive(&mut run, &capture(511)).is_empty());
        assert!(
            run.results_summary()
                .contains(&"Number Of SR Symbols Encountered: 2".to_string())
        );
    }

    #[test]
    fn off_by_one_spacing_reports_once() {
        for count in [510, 512] {
            let mut run = run(CheckerKind::SrEvery512thBs, LinkConfig::new(LinkWidth::One));
            assert_eq!(
                drive(&mut run, &capture(count)),
                vec!["Invalid Number of BS Symbols between SR Symbols"]
            );
        }
    }

    #[test]
    fn first_sr_is_exempt() {
        let mut run = run(CheckerKind::SrEvery512thBs, LinkConfig::new(LinkWidth::Four));
        let mut records = Vec::new();
        for _ in 0..3 {
            records.extend(blanking(SYMBOL_BS, LinkWidth::Four));
        }
        records.extend(blanking(SYMBOL_SR, LinkWidth::Four));
        assert!(drive(&mut run, &records).is_empty());
    }

    #[test]
    fn overlong_sr_sequence() {
        let mut run = run(CheckerKind::SrEvery512thBs, LinkConfig::new(LinkWidth::One));
        let records: Vec<_> = [SYMBOL_SR, SYMBOL_BF, SYMBOL_BF, SYMBOL_SR, SYMBOL_BF]
            .iter()
            .map(|symbol| all_lanes(*symbol, LinkWidth::One, "Hor. SR"))
            .collect();
        assert_eq!(drive(&mut run, &records), vec!["Invalid SR Symbol Sequence"]);
    }
}
