//! Info Frame / MSA issued exactly once per video frame.
//!
//! Works purely on event categories; lane data is never read. A frame
//! boundary is a vertical BS seen after at least one horizontal BS. The first
//! frame is only used to synchronize.

use crate::catalog::CheckerKind;
use crate::config::LinkConfig;
use crate::error::{CheckerError, ConfigError};
use crate::event::{Blanking, EventCategory};
use crate::ledger::ErrorLedger;
use crate::traits::{Checker, StateView};

/// Packet type required once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSdp {
    InfoFrame,
    Msa,
}

impl FrameSdp {
    pub const fn name(self) -> &'static str {
        match self {
            Self::InfoFrame => "Info Frame",
            Self::Msa => "MSA",
        }
    }

    fn matches(self, category: EventCategory) -> bool {
        matches!(
            (self, category),
            (Self::InfoFrame, EventCategory::InfoFrame) | (Self::Msa, EventCategory::Msa)
        )
    }
}

/// Counts one packet kind per frame.
///
/// The same state machine serves both the Info Frame and the MSA rule; only
/// the packet kind and the messages differ.
#[derive(Debug)]
pub struct OncePerFrameChecker {
    sdp: FrameSdp,
    /// Horizontal blanking starts in the current frame. A vertical blanking
    /// start only closes a frame once this is non-zero.
    horizontal_bs: u64,
    frames: u64,
    /// Packets of the tracked kind seen in the current frame.
    in_frame_count: u64,
    total: u64,
    /// Inside a packet of the tracked kind; its remaining states are not
    /// counted again.
    in_sdp: bool,
}

impl OncePerFrameChecker {
    pub fn new(sdp: FrameSdp) -> Self {
        Self {
            sdp,
            horizontal_bs: 0,
            frames: 0,
            in_frame_count: 0,
            total: 0,
            in_sdp: false,
        }
    }

    fn close_frame(&mut self, ledger: &mut ErrorLedger) {
        self.frames += 1;
        if self.frames > 1 && self.in_frame_count != 1 {
            ledger.report(format!(
                "Invalid number of {} in frame: {}",
                self.sdp.name(),
                self.in_frame_count
            ));
        }
        log::debug!(
            "Frame {} closed with {} {}",
            self.frames,
            self.in_frame_count,
            self.sdp.name()
        );
        self.in_frame_count = 0;
        self.horizontal_bs = 0;
    }
}

impl Checker for OncePerFrameChecker {
    fn kind(&self) -> CheckerKind {
        match self.sdp {
            FrameSdp::InfoFrame => CheckerKind::InfoFrameOncePerFrame,
            FrameSdp::Msa => CheckerKind::MsaOncePerFrame,
        }
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::new(self.sdp);
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let category = state.event()?;
        match category {
            EventCategory::BlankingStart(Blanking::Horizontal) => {
                self.horizontal_bs += 1;
                self.in_sdp = false;
            }
            EventCategory::BlankingStart(Blanking::Vertical) => {
                if self.horizontal_bs > 0 {
                    self.close_frame(ledger);
                }
                self.in_sdp = false;
            }
            _ if self.sdp.matches(category) => {
                if !self.in_sdp {
                    self.in_frame_count += 1;
                    self.total += 1;
                    self.in_sdp = true;
                }
            }
            _ => self.in_sdp = false,
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number Of {} Encountered: {}",
            self.sdp.name(),
            self.total
        )]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            "  This test verifies Info Frame or MSA Secondary Data Packets",
            "  are issued once per frame during the vertical blanking section.",
            "  ",
            "  A frame starts at the first Ver. BS that follows a Hor. BS. The test",
            "  reports an error if zero or more than one Info Frame or MSA SDP is",
            "  encountered between two frame starts.",
            "  ",
            "  The test processes/utilizes Event Codes to identify state types.",
            "  ",
            "  The test does not process any lane data to make any of its decisions.",
        ]
    }
}
