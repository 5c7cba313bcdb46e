//! MVID state vs. MSA Mvid[7:0] in synchronous clock mode.
//!
//! The MSA carries Mvid[7:0] at cursor 3 on lane 0 and MISC0 on the highest
//! active lane. MISC0 bit 0 selects synchronous clock mode, in which the MVID
//! state sent after every blanking start must repeat the MSA value. MVID
//! states seen before the first MSA are ignored.

use crate::catalog::CheckerKind;
use crate::checkers::{PacketCursor, PacketEvent};
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::{DATA_BYTE_MASK, MISC0_SYNCHRONOUS_CLOCK_FLAG};
use crate::error::{CheckerError, ConfigError};
use crate::field::LaneValues;
use crate::layout::{SubField, locate};
use crate::ledger::ErrorLedger;
use crate::symbol::is_blanking_start;
use crate::traits::{Checker, StateView};
use crate::types::StateIndex;

/// Distance from the last blanking-start symbol to the MVID state.
const MVID_STATE_OFFSET: u64 = 2;

#[derive(Debug, Default)]
pub struct MvidLsbChecker {
    width: LinkWidth,
    cursor: PacketCursor,
    msa_mvid: Option<u8>,
    synchronous: bool,
    last_blanking_start: Option<StateIndex>,
    inhibit: bool,
    msa_count: u64,
    mvid_count: u64,
}

impl MvidLsbChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_msa(&mut self, cursor: u32, lanes: &LaneValues) -> Result<(), CheckerError> {
        if let Some((_, position)) = locate(SubField::MsaMvidLsb, self.width, cursor) {
            self.msa_mvid = Some((lanes.get(position.lane)? & DATA_BYTE_MASK) as u8);
        }
        if let Some((_, position)) = locate(SubField::MsaMisc0, self.width, cursor) {
            let misc0 = (lanes.get(position.lane)? & DATA_BYTE_MASK) as u8;
            self.synchronous = misc0 & MISC0_SYNCHRONOUS_CLOCK_FLAG != 0;
            log::trace!("MSA MISC0 0x{misc0:02X}, synchronous: {}", self.synchronous);
        }
        Ok(())
    }

    fn is_mvid_state(&self, index: StateIndex) -> bool {
        self.last_blanking_start
            .and_then(|start| index.since(start))
            .is_some_and(|gap| gap == MVID_STATE_OFFSET)
    }

    fn check_mvid(&mut self, lanes: &LaneValues, ledger: &mut ErrorLedger) {
        self.mvid_count += 1;
        if self.inhibit || !self.synchronous {
            return;
        }
        let Some(expected) = self.msa_mvid else {
            return;
        };
        let mismatch = lanes
            .as_slice()
            .iter()
            .any(|value| (value & DATA_BYTE_MASK) as u8 != expected);
        if mismatch {
            ledger.report("MVid value differs from MSA's Mvid[7:0] value");
            self.inhibit = true;
        }
    }
}

impl Checker for MvidLsbChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::MvidMatchesMsa
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
        match self.cursor.advance(lanes.lane0(), state.index()) {
            PacketEvent::Opened => self.inhibit = false,
            PacketEvent::MsaOpened => {
                self.inhibit = false;
                self.msa_count += 1;
            }
            PacketEvent::Misplaced => {
                if !self.inhibit {
                    ledger.report("SS Control Chars are not consecutive");
                }
                self.inhibit = true;
            }
            PacketEvent::Closed => self.inhibit = false,
            PacketEvent::Data(cursor) => {
                if self.cursor.in_msa() {
                    self.read_msa(cursor, &lanes)?;
                }
            }
            PacketEvent::Outside if self.msa_count > 0 => {
                if is_blanking_start(lanes.lane0()) {
                    self.last_blanking_start = Some(state.index());
                } else if self.is_mvid_state(state.index()) {
                    self.check_mvid(&lanes, ledger);
                }
            }
            PacketEvent::Outside => {}
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![
            format!("Number of MVID States Processed: {}", self.mvid_count),
            format!("Number of MSA SDPs Processed: {}", self.msa_count),
        ]
    }

    fn fail_status(&self) -> &'static str {
        "Failed: One or more errors were encountered."
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            "  This test verifies that the MVID state contains the same value as the ",
            "  previous MSA Mvid[7:0] sub-field value when in synchronous clock mode.",
            "  ",
            "  The MSA Mvid[7:0] sub-field is always located in lane 0.",
            "  ",
            "  MISC0, used to get sync/async mode, is located in the highest data lane",
            "  used in the link: lane 3 in four lane mode, lane 1 in two lane mode and",
            "  lane 0 in one lane mode.",
            " ",
            "  The test reports the number of MSA seen in both async and sync modes.",
            "  MVID states that are encountered before an MSA Secondary Data Packet are ignored.",
        ]
    }
}
