//! VB-ID / Mvid / Maud replication after every blanking start.
//!
//! Each blanking-start sequence is followed by four VBID, MVID, MAUD triples
//! striped over the active lanes: all four on lane 0 at width 1, two per lane
//! at width 2 and one per lane at width 4. The same checker runs in two
//! modes:
//!
//! - [`ReplicationMode::Values`] checks ordering and that every copy equals
//!   the one before it.
//! - [`ReplicationMode::Grouping`] checks ordering and that the group is
//!   complete before the blanking region moves on.

use crate::catalog::CheckerKind;
use crate::checkers::lane_label;
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::{MAX_LANES, VBID_GROUPING_STATES, VBID_TRIPLES_PER_BLANKING_START};
use crate::error::{CheckerError, ConfigError};
use crate::event::EventCategory;
use crate::ledger::ErrorLedger;
use crate::symbol::is_blanking_start;
use crate::traits::{Checker, StateView};

const ORDINALS: [&str; VBID_TRIPLES_PER_BLANKING_START] = ["First", "Second", "Third", "Fourth"];

/// What the replication checker verifies besides ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplicationMode {
    Values,
    Grouping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Vbid,
    Mvid,
    Maud,
}

impl Slot {
    const fn name(self) -> &'static str {
        match self {
            Self::Vbid => "VBID",
            Self::Mvid => "MVID",
            Self::Maud => "MAUD",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }

    const fn next(self) -> Option<Self> {
        match self {
            Self::Vbid => Some(Self::Mvid),
            Self::Mvid => Some(Self::Maud),
            Self::Maud => None,
        }
    }

    fn of(category: EventCategory) -> Option<Self> {
        match category {
            EventCategory::Vbid(_) => Some(Self::Vbid),
            EventCategory::Mvid(_) => Some(Self::Mvid),
            EventCategory::Maud(_) => Some(Self::Maud),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct LaneProgress {
    expected: Option<Slot>,
    triples: usize,
    seen: usize,
}

/// Verifies the replicated VB-ID, Mvid or Maud triples, depending on `mode`.
#[derive(Debug)]
pub struct VbidReplicationChecker {
    mode: ReplicationMode,
    width: LinkWidth,
    lanes: [LaneProgress; MAX_LANES],
    /// Values per slot, indexed by occurrence (`triple * width + lane`).
    copies: [[Option<u16>; VBID_TRIPLES_PER_BLANKING_START]; 3],
    in_blanking_start: bool,
    tracking: bool,
    inhibit: bool,
    sequences: u64,
}

impl VbidReplicationChecker {
    pub fn new(mode: ReplicationMode) -> Self {
        Self {
            mode,
            width: LinkWidth::default(),
            lanes: [LaneProgress::default(); MAX_LANES],
            copies: [[None; VBID_TRIPLES_PER_BLANKING_START]; 3],
            in_blanking_start: false,
            tracking: false,
            inhibit: false,
            sequences: 0,
        }
    }

    fn triples_per_lane(&self) -> usize {
        VBID_TRIPLES_PER_BLANKING_START / self.width.lanes()
    }

    fn begin_group(&mut self) {
        let progress = LaneProgress {
            expected: Some(Slot::Vbid),
            ..LaneProgress::default()
        };
        self.lanes = [progress; MAX_LANES];
        self.copies = [[None; VBID_TRIPLES_PER_BLANKING_START]; 3];
        self.tracking = true;
        self.inhibit = false;
    }

    fn abandon(&mut self, ledger: &mut ErrorLedger, message: impl Into<String>) {
        ledger.report(message);
        self.inhibit = true;
        self.tracking = false;
    }

    /// Stores one copy and compares it with the previous occurrence.
    fn record_copy(&mut self, slot: Slot, occurrence: usize, value: u16) -> Option<String> {
        let copies = &mut self.copies[slot.index()];
        let slot_copy = copies.get_mut(occurrence)?;
        *slot_copy = Some(value);
        let previous = occurrence.checked_sub(1).and_then(|p| copies[p])?;
        (previous != value).then(|| {
            format!(
                "{} {} Does Not Equal {} {}",
                ORDINALS[occurrence],
                slot.name(),
                ORDINALS[occurrence - 1],
                slot.name()
            )
        })
    }

    fn advance_lane(&mut self, lane: usize, slot: Slot, value: u16) -> Option<String> {
        let width = self.width.lanes();
        let per_lane = self.triples_per_lane();
        let progress = &mut self.lanes[lane];
        let occurrence = progress.triples * width + lane;
        progress.seen += 1;
        progress.expected = match slot.next() {
            Some(next) => Some(next),
            None => {
                progress.triples += 1;
                (progress.triples < per_lane).then_some(Slot::Vbid)
            }
        };
        match self.mode {
            ReplicationMode::Values => self.record_copy(slot, occurrence, value),
            ReplicationMode::Grouping => None,
        }
    }

    fn lanes_finished(&self) -> bool {
        self.lanes[..self.width.lanes()]
            .iter()
            .all(|lane| lane.expected.is_none())
    }

    fn grouping_complete(&self) -> bool {
        let seen: usize = self.lanes[..self.width.lanes()]
            .iter()
            .map(|lane| lane.seen)
            .sum();
        seen >= VBID_GROUPING_STATES
    }
}

impl Checker for VbidReplicationChecker {
    fn kind(&self) -> CheckerKind {
        match self.mode {
            ReplicationMode::Values => CheckerKind::VbidValues,
            ReplicationMode::Grouping => CheckerKind::VbidGrouping,
        }
    }

    fn reset(&mut self, config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::new(self.mode);
        self.width = config.width;
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lanes = state.lanes()?;

        if lanes.as_slice().iter().any(|value| is_blanking_start(*value)) {
            if !self.in_blanking_start {
                self.begin_group();
            }
            self.in_blanking_start = true;
            return Ok(());
        }
        if self.in_blanking_start {
            self.in_blanking_start = false;
            self.sequences += 1;
        }
        if !self.tracking || self.inhibit {
            return Ok(());
        }

        let found = Slot::of(state.event()?);
        for lane in 0..self.width.lanes() {
            let Some(expected) = self.lanes[lane].expected else {
                continue;
            };
            match found {
                Some(slot) if slot == expected => {
                    if let Some(message) = self.advance_lane(lane, slot, lanes.get(lane)?) {
                        log::trace!("{message} at {}", state.index());
                        self.abandon(ledger, message);
                        return Ok(());
                    }
                }
                None if self.mode == ReplicationMode::Grouping => {
                    log::debug!("Replication group cut short at {}", state.index());
                    self.abandon(
                        ledger,
                        "Missing at least 1 state in the VBID, MVID and MAUD grouping",
                    );
                    return Ok(());
                }
                _ => {
                    let message = format!(
                        "{} - Invalid {} Sequence",
                        lane_label(lane),
                        expected.name()
                    );
                    self.abandon(ledger, message);
                    return Ok(());
                }
            }
        }

        if self.lanes_finished() {
            if self.mode == ReplicationMode::Grouping && !self.grouping_complete() {
                ledger.report("Missing at least 1 state in the VBID, MVID and MAUD grouping");
                self.inhibit = true;
            }
            self.tracking = false;
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number of BS Sequences Processed: {}",
            self.sequences
        )]
    }

    fn fail_status(&self) -> &'static str {
        "Failed: Invalid VB-ID Sequence(s) encountered.."
    }

    fn description(&self) -> &'static [&'static str] {
        match self.mode {
            ReplicationMode::Values => &[
                " This test verifies that every BS/SR is followed by four sets of ",
                " VBID, MVID and MAUD values.  The ordering of the values across the lanes",
                " depends on the link width.",
                " ",
                " Every copy of the VBID, MVID and MAUD values must equal the previous",
                " copy within the same blanking start.",
            ],
            ReplicationMode::Grouping => &[
                " This test verifies that every BS/SR is followed by a complete group of",
                " four VBID, MVID and MAUD sets spread across the active lanes.",
                " ",
                " The test does not verify the VBID, MVID and MAUD values.",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{all_lanes, drive, run, state};
    use crate::constants::{SYMBOL_BF, SYMBOL_BS};
    use crate::record::StateRecord;

    fn blanking_start(width: LinkWidth) -> Vec<StateRecord> {
        vec![
            all_lanes(SYMBOL_BS, width, "Hor. BS"),
            all_lanes(SYMBOL_BF, width, "Hor. BF"),
            all_lanes(SYMBOL_BF, width, "Hor. BF"),
            all_lanes(SYMBOL_BS, width, "Hor. BS"),
        ]
    }

    /// Blanking start followed by `triples` complete triples.
    fn group(width: LinkWidth, vbid: u16, triples: usize) -> Vec<StateRecord> {
        let mut records = blanking_start(width);
        for _ in 0..triples {
            records.push(all_lanes(vbid, width, "Hor. VBID"));
            records.push(all_lanes(0x012, width, "Hor. MVID"));
            records.push(all_lanes(0x034, width, "Hor. MAUD"));
        }
        records.push(all_lanes(0x000, width, "F0 Pixel"));
        records
    }

    #[test]
    fn complete_groups_pass_on_every_width() {
        for width in [LinkWidth::One, LinkWidth::Two, LinkWidth::Four] {
            for mode in [CheckerKind::VbidValues, CheckerKind::VbidGrouping] {
                let mut run = run(mode, LinkConfig::new(width));
                let triples = VBID_TRIPLES_PER_BLANKING_START / width.lanes();
                let mut records = group(width, 0x001, triples);
                records.extend(group(width, 0x001, triples));
                assert!(drive(&mut run, &records).is_empty(), "{mode} width {width}");
                assert!(
                    run.results_summary()
                        .contains(&"Number of BS Sequences Processed: 2".to_string())
                );
            }
        }
    }

    #[test]
    fn differing_copy_is_reported_with_ordinals() {
        let width = LinkWidth::Four;
        let mut run = run(CheckerKind::VbidValues, LinkConfig::new(width));
        let mut records = blanking_start(width);
        records.push(state(&[0x001, 0x001, 0x009, 0x001], "Hor. VBID"));
        records.push(all_lanes(0x012, width, "Hor. MVID"));
        assert_eq!(
            drive(&mut run, &records),
            vec!["Third VBID Does Not Equal Second VBID"]
        );
    }

    #[test]
    fn width_one_chains_across_states() {
        let width = LinkWidth::One;
        let mut run = run(CheckerKind::VbidValues, LinkConfig::new(width));
        let mut records = blanking_start(width);
        for maud in [0x034, 0x034, 0x035, 0x035] {
            records.push(all_lanes(0x001, width, "Hor. VBID"));
            records.push(all_lanes(0x012, width, "Hor. MVID"));
            records.push(all_lanes(maud, width, "Hor. MAUD"));
        }
        assert_eq!(
            drive(&mut run, &records),
            vec!["Third MAUD Does Not Equal Second MAUD"]
        );
    }

    #[test]
    fn out_of_order_slot_names_the_lane() {
        let width = LinkWidth::Two;
        let mut run = run(CheckerKind::VbidValues, LinkConfig::new(width));
        let mut records = blanking_start(width);
        records.push(all_lanes(0x001, width, "Hor. VBID"));
        records.push(all_lanes(0x034, width, "Hor. MAUD"));
        records.push(all_lanes(0x034, width, "Hor. MAUD"));
        assert_eq!(
            drive(&mut run, &records),
            vec!["Lane0 - Invalid MVID Sequence"]
        );
    }

    #[test]
    fn truncated_group_is_missing_states() {
        let width = LinkWidth::Two;
        let mut run = run(CheckerKind::VbidGrouping, LinkConfig::new(width));
        let mut records = group(width, 0x001, 1);
        records.extend(group(width, 0x001, 2));
        assert_eq!(
            drive(&mut run, &records),
            vec!["Missing at least 1 state in the VBID, MVID and MAUD grouping"]
        );
        assert!(
            run.results_summary()
                .contains(&"  Failed: Invalid VB-ID Sequence(s) encountered..".to_string())
        );
    }

    #[test]
    fn no_blanking_start_means_no_checks() {
        let mut run = run(CheckerKind::VbidGrouping, LinkConfig::new(LinkWidth::One));
        let records = vec![StateRecord::default(); 8];
        assert!(drive(&mut run, &records).is_empty());
    }
}
