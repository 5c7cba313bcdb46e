//! Transfer unit length in active video.
//!
//! A transfer unit is a run of pixel states followed by its stuffing. Each
//! lane counts states from BE, or from the state after the previous FE, up to
//! the next FE. The BE state belongs to the first unit of the line and the FE
//! that closes a unit is not counted. Every finished count must lie within
//! [32, 64].

use crate::catalog::CheckerKind;
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::{MAX_LANES, TU_LENGTH_MAX, TU_LENGTH_MIN};
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::symbol::ControlSymbol;
use crate::traits::{Checker, StateView};

/// Per-lane progress through the active section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum LaneSection {
    #[default]
    Outside,
    Active {
        length: u32,
    },
}

/// Per-lane transfer unit tracker.
///
/// Lanes are judged independently; lanes beyond the configured width are
/// never touched.
#[derive(Debug, Default)]
pub struct TransferUnitChecker {
    width: LinkWidth,
    /// Active-section progress of each lane.
    lanes: [LaneSection; MAX_LANES],
    transfer_units: u64,
}

impl TransferUnitChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances one lane; returns the finished unit length on FE.
    fn advance_lane(&mut self, lane: usize, value: u16) -> Option<u32> {
        let symbol = ControlSymbol::from_lane(value);
        let section = &mut self.lanes[lane];
        match (symbol, *section) {
            (Some(symbol), _) if symbol.is_blanking_start() => {
                *section = LaneSection::Outside;
                None
            }
            (Some(ControlSymbol::Be), _) => {
                *section = LaneSection::Active { length: 1 };
                None
            }
            (Some(ControlSymbol::Fe), LaneSection::Active { length }) => {
                *section = LaneSection::Active { length: 0 };
                Some(length)
            }
            (_, LaneSection::Active { length }) => {
                *section = LaneSection::Active {
                    length: length.saturating_add(1),
                };
                None
            }
            (_, LaneSection::Outside) => None,
        }
    }
}

impl Checker for TransferUnitChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::TransferUnitLength
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
        let mut invalid = None;
        for lane in 0..self.width.lanes() {
            let Some(length) = self.advance_lane(lane, lanes.get(lane)?) else {
                continue;
            };
            if lane == 0 {
                self.transfer_units += 1;
            }
            if !(TU_LENGTH_MIN..=TU_LENGTH_MAX).contains(&length) {
                invalid.get_or_insert((lane, length));
            }
        }
        if let Some((lane, length)) = invalid {
            log::trace!("Lane{lane} transfer unit of {length} states at {}", state.index());
            ledger.report("Invalid Transfer Unit Length");
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number of Transfer Units Processed: {}",
            self.transfer_units
        )]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies Pixel Transfer Units, made up of",
            " pixels and one set of stuffing dummy states, have a length between",
            " 32 and 64 states.",
            " ",
            " All active lanes are checked; one error is reported per state.",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{all_lanes, drive, run};
    use crate::constants::{SYMBOL_BE, SYMBOL_BS, SYMBOL_FE, SYMBOL_FS};
    use crate::record::StateRecord;

    /// Active line made of transfer units of the given lengths. The first
    /// unit includes the BE state.
    fn line(width: LinkWidth, units: &[u32]) -> Vec<StateRecord> {
        let mut records = vec![all_lanes(SYMBOL_BE, width, "Hor. BE")];
        for (position, length) in units.iter().enumerate() {
            let framing = if position == 0 { 3 } else { 2 };
            let pixels = length.saturating_sub(framing);
            records.extend((0..pixels).map(|_| all_lanes(0x0AA, width, "F0 Pixel")));
            records.push(all_lanes(SYMBOL_FS, width, "F0 Stuff"));
            records.push(all_lanes(0x000, width, "F0 Stuff"));
            records.push(all_lanes(SYMBOL_FE, width, "F0 Stuff"));
        }
        records.push(all_lanes(SYMBOL_BS, width, "Hor. BS"));
        records
    }

    #[test]
    fn bounds_are_inclusive() {
        let width = LinkWidth::Four;
        let mut run = run(CheckerKind::TransferUnitLength, LinkConfig::new(width));
        assert!(drive(&mut run, &line(width, &[32, 64, 48])).is_empty());
        assert_eq!(run.results_summary()[1], "Number of Transfer Units Processed: 3");
    }

    #[test]
    fn short_and_long_units_are_reported() {
        let width = LinkWidth::Two;
        let mut run = run(CheckerKind::TransferUnitLength, LinkConfig::new(width));
        assert_eq!(
            drive(&mut run, &line(width, &[31, 65, 40])).len(),
            2
        );
    }

    #[test]
    fn first_unit_counts_the_be_state() {
        let width = LinkWidth::One;
        let mut records = vec![all_lanes(SYMBOL_BE, width, "Hor. BE")];
        records.extend((0..29).map(|_| all_lanes(0x0AA, width, "F0 Pixel")));
        records.push(all_lanes(SYMBOL_FS, width, "F0 Stuff"));
        records.push(all_lanes(0x000, width, "F0 Stuff"));
        records.push(all_lanes(SYMBOL_FE, width, "F0 Stuff"));

        let mut conforming = run(CheckerKind::TransferUnitLength, LinkConfig::new(width));
        assert!(drive(&mut conforming, &records).is_empty());

        records.remove(1);
        let mut short = run(CheckerKind::TransferUnitLength, LinkConfig::new(width));
        assert_eq!(drive(&mut short, &records), vec!["Invalid Transfer Unit Length"]);
    }

    #[test]
    fn blanking_states_are_not_counted() {
        let width = LinkWidth::One;
        let mut run = run(CheckerKind::TransferUnitLength, LinkConfig::new(width));
        let mut records = line(width, &[40]);
        records.extend((0..100).map(|_| all_lanes(0x000, width, "Hor. BS")));
        records.push(all_lanes(SYMBOL_FE, width, "Hor. BS"));
        assert!(drive(&mut run, &records).is_empty());
    }
}
