//! Mvid cleared while no video stream is sent.
//!
//! The no-video flag is latched from each VBID on lane 0; the MVID state that
//! follows must then be zero on every active lane.

use crate::catalog::CheckerKind;
use crate::checkers::SequenceTracker;
use crate::config::LinkConfig;
use crate::constants::VBID_NO_VIDEO_FLAG;
use crate::error::{CheckerError, ConfigError};
use crate::event::EventCategory;
use crate::ledger::ErrorLedger;
use crate::traits::{Checker, StateView};

#[derive(Debug, Default)]
pub struct MvidNoVideoChecker {
    no_video: bool,
    sequences: SequenceTracker,
}

impl MvidNoVideoChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for MvidNoVideoChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::MvidClearedNoVideo
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::default();
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lanes = state.lanes()?;
        self.sequences.observe(lanes.lane0(), state.index());

        match state.event()? {
            EventCategory::Vbid(_) => self.no_video = lanes.lane0() & VBID_NO_VIDEO_FLAG != 0,
            EventCategory::Mvid(_) if self.no_video => {
                if lanes.as_slice().iter().any(|value| *value != 0) {
                    ledger.report(
                        "MSA Mvid[7:0] is not cleared to 0x00 for section with VBID:NoVideoStream_Flag bit set to 1.",
                    );
                }
            }
            _ => {}
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
        "Failed: VB-ID packet contains an invalid Mvid value."
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies the MVID state is set to zero when the VBID's No Video bit is set to 1.",
            " ",
            "  All active data lanes are checked.",
            " ",
            "  The test does not verify the absence of Pixel states after a VBID with the No Video bit set.",
        ]
    }
}
