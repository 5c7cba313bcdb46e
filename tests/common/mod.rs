//! Common test utilities for dplinkcheck integration tests.
//!
//! This module provides a synthetic capture builder that lays out blanking
//! starts, VB-ID groupings, packets and active video the way a DisplayPort
//! source sends them, with consecutive time ticks.

#![allow(dead_code)] // Not every test binary uses every helper

use dplinkcheck::constants::{
    EVENT_CODE_OFFSET, EVENT_CODE_WIDTH, SYMBOL_BE, SYMBOL_BF, SYMBOL_BS, SYMBOL_FE, SYMBOL_FS,
    SYMBOL_SE, SYMBOL_SR, SYMBOL_SS,
};
use dplinkcheck::field::lane_field_name;
use dplinkcheck::{
    Capture, CheckerKind, CheckerRun, EventCodeTable, FieldLayout, LinkConfig, LinkWidth,
    StateRecord, TimeTicks,
};

/// Builds one state carrying `lanes` and the SST event code named `event`.
///
/// Unknown event names map to code 0.
pub fn state(lanes: &[u16], event: &str) -> StateRecord {
    let layout = FieldLayout::sst();
    let code = EventCodeTable::sst().code_of(event).unwrap_or(0);
    let mut record = StateRecord::default();
    for (lane, value) in lanes.iter().enumerate() {
        let spec = layout
            .get(&lane_field_name(lane))
            .expect("SST layout has four lane fields");
        record = record
            .with_bits(spec.offset, spec.width, u32::from(*value))
            .expect("lane field lies inside the record");
    }
    record
        .with_bits(EVENT_CODE_OFFSET, EVENT_CODE_WIDTH, code)
        .expect("event code lies inside the record")
}

/// Same value on every active lane.
pub fn all_lanes(value: u16, width: LinkWidth, event: &str) -> StateRecord {
    state(&vec![value; width.lanes()], event)
}

/// Creates a harness for `kind`, panicking on configuration errors.
pub fn checker_run(kind: CheckerKind, config: LinkConfig) -> CheckerRun {
    CheckerRun::new(kind, &config).expect("configuration accepted")
}

/// Feeds `records` and returns every message in order.
pub fn drive(run: &mut CheckerRun, records: &[StateRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| run.process_state(record))
        .collect()
}

/// Appends states in transmission order and stamps them with consecutive
/// time ticks.
#[derive(Debug, Clone)]
pub struct CaptureBuilder {
    width: LinkWidth,
    records: Vec<StateRecord>,
}

impl CaptureBuilder {
    pub fn new(width: LinkWidth) -> Self {
        Self {
            width,
            records: Vec::new(),
        }
    }

    pub fn width(&self) -> LinkWidth {
        self.width
    }

    pub fn push(mut self, record: StateRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn uniform(self, value: u16, event: &str) -> Self {
        let record = all_lanes(value, self.width, event);
        self.push(record)
    }

    /// `first, BF, BF, first` on every lane.
    pub fn blanking_start(self, first: u16) -> Self {
        let name = if first == SYMBOL_SR { "Hor. SR" } else { "Hor. BS" };
        self.uniform(first, name)
            .uniform(SYMBOL_BF, "Hor. BF")
            .uniform(SYMBOL_BF, "Hor. BF")
            .uniform(first, name)
    }

    /// A corrupted blanking start: `BS, BS, BF, BS`.
    pub fn corrupt_blanking_start(self) -> Self {
        self.uniform(SYMBOL_BS, "Hor. BS")
            .uniform(SYMBOL_BS, "Hor. BS")
            .uniform(SYMBOL_BF, "Hor. BF")
            .uniform(SYMBOL_BS, "Hor. BS")
    }

    /// VBID, MVID and MAUD replicated until every lane has carried four
    /// copies of each.
    pub fn vbid_grouping(mut self, vbid: u16, mvid: u16, maud: u16) -> Self {
        let repeats = 4 / self.width.lanes();
        for _ in 0..repeats {
            self = self
                .uniform(vbid, "Hor. VBID")
                .uniform(mvid, "Hor. MVID")
                .uniform(maud, "Hor. MAUD");
        }
        self
    }

    /// MSA packet: `SS, SS`, `payload` states and `SE`.
    pub fn msa(mut self, payload: &[u16]) -> Self {
        self = self.uniform(SYMBOL_SS, "MSA").uniform(SYMBOL_SS, "MSA");
        for value in payload {
            self = self.uniform(*value, "MSA");
        }
        self.uniform(SYMBOL_SE, "MSA")
    }

    /// MSA whose second SS arrives one state late.
    pub fn split_msa(mut self, payload: &[u16]) -> Self {
        self = self
            .uniform(SYMBOL_SS, "MSA")
            .uniform(0x000, "MSA")
            .uniform(SYMBOL_SS, "MSA");
        for value in payload {
            self = self.uniform(*value, "MSA");
        }
        self.uniform(SYMBOL_SE, "MSA")
    }

    /// Active segment made of transfer units of `unit_length` states.
    pub fn active_segment(mut self, units: usize, unit_length: usize) -> Self {
        self = self.uniform(SYMBOL_BE, "Hor. BE");
        for _ in 0..units {
            for pixel in 0..unit_length - 3 {
                self = self.uniform((pixel % 0x100) as u16, "F0 Pixel");
            }
            self = self
                .uniform(SYMBOL_FS, "F0 Stuff")
                .uniform(0x000, "F0 Stuff")
                .uniform(SYMBOL_FE, "F0 Stuff");
        }
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records with ticks `first_tick, first_tick + 1, ...`.
    pub fn build_from(&self, first_tick: u64) -> Vec<StateRecord> {
        self.records
            .iter()
            .zip(first_tick..)
            .map(|(record, ticks)| record.with_time_ticks(TimeTicks::new(ticks)))
            .collect()
    }

    pub fn build(&self) -> Vec<StateRecord> {
        self.build_from(0)
    }

    pub fn capture(&self) -> Capture {
        Capture::from_records(&self.build())
    }
}

/// One horizontal line: blanking start, VB-ID grouping and an active segment
/// of two transfer units.
pub fn active_line(builder: CaptureBuilder) -> CaptureBuilder {
    builder
        .blanking_start(SYMBOL_BS)
        .vbid_grouping(0x000, 0x000, 0x000)
        .active_segment(2, 40)
}
