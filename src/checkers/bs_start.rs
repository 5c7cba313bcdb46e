//! Blanking-start symbol sequence verification.
//!
//! A blanking start is the four-state sequence BS|SR, BF, BF, BS|SR carried
//! identically on every active lane. The window opens on the first state in
//! which any active lane carries BS, SR or BF and always closes four states
//! later, so a corrupt sequence is reported once and the checker resyncs on
//! the next start symbol.

use crate::catalog::CheckerKind;
use crate::config::LinkConfig;
use crate::constants::BLANKING_START_SEQUENCE_LEN;
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::symbol::{ControlSymbol, is_blanking_start};
use crate::traits::{Checker, StateView};

#[derive(Debug, Default)]
pub struct BlankingStartChecker {
    /// Position inside the current four-state window.
    position: Option<u8>,
    inhibit: bool,
    sequences: u64,
}

impl BlankingStartChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_position(&self, position: u8, lane0: u16) -> Option<&'static str> {
        let symbol = ControlSymbol::from_lane(lane0);
        match position {
            0 | 3 if !symbol.is_some_and(ControlSymbol::is_bs_or_sr) => {
                Some("Invalid BS/SR Control Character")
            }
            1 | 2 if symbol != Some(ControlSymbol::Bf) => Some("Invalid BF Control Character"),
            _ => None,
        }
    }
}

impl Checker for BlankingStartChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::BlankingStartSequence
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::default();
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lanes = state.lanes()?;
        let values = lanes.as_slice();

        if self.position.is_none() && values.iter().any(|value| is_blanking_start(*value)) {
            self.position = Some(0);
            self.sequences += 1;
        }
        let Some(position) = self.position else {
            return Ok(());
        };

        if !self.inhibit {
            let violation = if values.windows(2).any(|pair| pair[0] != pair[1]) {
                Some("Data Lanes contain different Control Characters")
            } else {
                self.check_position(position, lanes.lane0())
            };
            if let Some(message) = violation {
                log::trace!("{} at {} (position {position})", message, state.index());
                ledger.report(message);
                self.inhibit = true;
            }
        }

        let next = position + 1;
        if next >= BLANKING_START_SEQUENCE_LEN {
            self.position = None;
            self.inhibit = false;
        } else {
            self.position = Some(next);
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number of BS Sequences Processed: {}",
            self.sequences
        )]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies the four state blanking start control character sequences.",
            " ",
            "  All active lanes must carry the same value and the control characters",
            "  must follow the order BS, BF, BF, BS (SR may replace either BS).",
            "  ",
            "  The test does not verify that every 512th BS is replaced with SR.",
            "  The test does not verify that the 1st and 4th symbols are equal.",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{all_lanes, drive, run, state};
    use crate::config::LinkWidth;
    use crate::constants::{SYMBOL_BF, SYMBOL_BS, SYMBOL_SR};
    use crate::record::StateRecord;

    fn sequence(symbols: &[u16], width: LinkWidth) -> Vec<StateRecord> {
        let mut records: Vec<_> = symbols
            .iter()
            .map(|symbol| all_lanes(*symbol, width, "Hor. BS"))
            .collect();
        records.push(all_lanes(0x000, width, "Hor. VBID"));
        records
    }

    #[test]
    fn valid_sequences_pass_on_every_width() {
        for width in [LinkWidth::One, LinkWidth::Two, LinkWidth::Four] {
            let mut run = run(CheckerKind::BlankingStartSequence, LinkConfig::new(width));
            let mut records = sequence(&[SYMBOL_BS, SYMBOL_BF, SYMBOL_BF, SYMBOL_BS], width);
            records.extend(sequence(&[SYMBOL_SR, SYMBOL_BF, SYMBOL_BF, SYMBOL_SR], width));
            assert!(drive(&mut run, &records).is_empty());
            assert!(
                run.results_summary()
                    .contains(&"Number of BS Sequences Processed: 2".to_string())
            );
        }
    }

    #[test]
    fn bs_in_place_of_bf_reports_once() {
        let width = LinkWidth::Four;
        let mut run = run(CheckerKind::BlankingStartSequence, LinkConfig::new(width));
        let records = sequence(&[SYMBOL_BS, SYMBOL_BS, SYMBOL_BF, SYMBOL_BS], width);
        assert_eq!(
            drive(&mut run, &records),
            vec!["Invalid BF Control Character"]
        );
    }

    #[test]
    fn window_opened_by_bf_expects_bs() {
        let width = LinkWidth::One;
        let mut run = run(CheckerKind::BlankingStartSequence, LinkConfig::new(width));
        let records = sequence(&[SYMBOL_BF, SYMBOL_BF, SYMBOL_BS], width);
        assert_eq!(
            drive(&mut run, &records),
            vec!["Invalid BS/SR Control Character"]
        );
    }

    #[test]
    fn lane_disagreement_and_resync() {
        let width = LinkWidth::Two;
        let mut run = run(CheckerKind::BlankingStartSequence, LinkConfig::new(width));
        let mut records = vec![
            state(&[SYMBOL_BS, SYMBOL_SR], "Hor. BS"),
            state(&[SYMBOL_BF, SYMBOL_BS], "Hor. BF"),
            state(&[SYMBOL_BF, SYMBOL_BF], "Hor. BF"),
            state(&[SYMBOL_BS, SYMBOL_BS], "Hor. BS"),
        ];
        records.extend(sequence(&[SYMBOL_BS, SYMBOL_BF, SYMBOL_BF, SYMBOL_BS], width));
        assert_eq!(
            drive(&mut run, &records),
            vec!["Data Lanes contain different Control Characters"]
        );
    }
}
