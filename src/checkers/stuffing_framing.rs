//! FS / FE framing of stuffed states in active video.
//!
//! Each lane enters its active section on BE and leaves it on BS, SR or BF.
//! Inside, stuffing runs from FS to FE and every stuffed state must carry
//! 0x00. A non-zero stuffed state is reported once per stuffing run.

use crate::catalog::CheckerKind;
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::MAX_LANES;
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::symbol::ControlSymbol;
use crate::traits::{Checker, StateView};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Section {
    #[default]
    Unknown,
    Blanking,
    Active,
}

#[derive(Debug, Default)]
pub struct StuffingFramingChecker {
    width: LinkWidth,
    sections: [Section; MAX_LANES],
    stuffing: [bool; MAX_LANES],
    inhibit: bool,
    segments: u64,
}

impl StuffingFramingChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn report(&mut self, ledger: &mut ErrorLedger, message: &'static str) {
        if !self.inhibit {
            ledger.report(message);
        }
    }

    fn process_lane(&mut self, lane: usize, value: u16, ledger: &mut ErrorLedger) {
        let symbol = ControlSymbol::from_lane(value);
        match symbol {
            Some(symbol) if symbol.is_blanking_start() => self.sections[lane] = Section::Blanking,
            Some(ControlSymbol::Be) => {
                self.sections[lane] = Section::Active;
                self.stuffing = [false; MAX_LANES];
                self.inhibit = false;
            }
            _ => {}
        }
        if self.sections[lane] != Section::Active {
            return;
        }

        match symbol {
            Some(ControlSymbol::Fs) => {
                if self.stuffing[lane] {
                    self.report(ledger, "Missing FE Ctrl Char..");
                }
                self.stuffing[lane] = true;
                self.inhibit = false;
            }
            Some(ControlSymbol::Fe) => {
                if !self.stuffing[lane] {
                    self.report(ledger, "Missing FS Ctrl Char..");
                }
                self.stuffing[lane] = false;
                if lane == 0 {
                    self.segments += 1;
                }
            }
            _ if self.stuffing[lane] && value != 0 && !self.inhibit => {
                ledger.report("Stuffing State data Not Equal to Zero.");
                self.inhibit = true;
            }
            _ => {}
        }
    }
}

impl Checker for StuffingFramingChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::StuffingFraming
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
        for lane in 0..self.width.lanes() {
            self.process_lane(lane, lanes.get(lane)?, ledger);
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number of Active Video Stuffing Segments Processed: {}",
            self.segments
        )]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies that Active Video Stuffing framing begins with",
            " an FS control character and ends with an FE control character on all",
            " active data lanes.",
            " ",
            " The test detects state sequences where the FS is encountered but the FE",
            " is missing and vice versa.",
            " ",
            " The test verifies all stuffed states contain a data value of 0x00.",
            " ",
            " This test does not check for short data stuffs (one state) in which only the ",
            " FS control character is contained in the data stuffing segment.",
        ]
    }
}
