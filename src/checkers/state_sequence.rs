//! Main-link state sequencing.
//!
//! Every state is reduced to a [`Stage`] of the line structure (blanking
//! start, VB-ID grouping, MSA / SDP packets, stream fill, blanking end,
//! pixels and video stuffing) and checked against the stages allowed to
//! precede it. Consecutive states of the same packet or fill stage are always
//! allowed; only the entry into a stage is judged.
//!
//! MSA and SDP packets inside a blanking section must also be preceded by a
//! complete VBID, MVID, MAUD grouping since the last blanking start.
//!
//! VCPF and MTP header states interleave with stream data and do not change
//! the predecessor. A run of VCPF states may not exceed the four VCPF symbols
//! spread across the active lanes. Unknown and link training states drop
//! synchronization; checking resumes at the next BS or BE.

use crate::catalog::CheckerKind;
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::VCPF_SYMBOLS_PER_SEQUENCE;
use crate::error::{CheckerError, ConfigError};
use crate::event::EventCategory;
use crate::ledger::ErrorLedger;
use crate::traits::{Checker, StateView};

/// Position of a state in the line structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BlankingStart,
    Vbid,
    Mvid,
    Maud,
    Msa,
    Sdp,
    StreamFill,
    BlankingEnd,
    Pixel,
    VideoStuff,
}

impl Stage {
    /// Stages allowed immediately before `self`, or `None` if any is.
    fn predecessors(self) -> Option<&'static [Stage]> {
        use Stage::*;
        let allowed: &'static [Stage] = match self {
            BlankingStart => &[BlankingStart, Pixel, Msa, Sdp, StreamFill, VideoStuff],
            Vbid => &[BlankingStart, Maud],
            Mvid => &[Vbid],
            Maud => &[Mvid],
            Msa => &[Msa, Maud, Sdp, StreamFill],
            Sdp => &[Sdp, Maud, Msa, StreamFill, VideoStuff],
            StreamFill => &[StreamFill, Maud, Msa, Sdp],
            BlankingEnd => return None,
            Pixel => &[BlankingEnd, Pixel, VideoStuff],
            VideoStuff => &[Pixel, VideoStuff, Sdp],
        };
        Some(allowed)
    }

    const fn sequence_error(self) -> &'static str {
        match self {
            Self::BlankingStart => "Unexpected Blanking Start State Sequence",
            Self::Vbid => "Unexpected VBID State Sequence",
            Self::Mvid => "Unexpected MVID State Sequence",
            Self::Maud => "Unexpected MAUD State Sequence",
            Self::Msa => "Invalid MSA Packet location.",
            Self::Sdp => "Invalid SDP Packet location.",
            Self::StreamFill => "Invalid Blanking Section Stuff Packet location.",
            Self::BlankingEnd => "Unexpected Blanking End State Sequence",
            Self::Pixel => "Unexpected Pixel State Sequence",
            Self::VideoStuff => "Unexpected Video Stuff State Sequence",
        }
    }
}

/// How one state affects the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Enter(Stage),
    Vcpf,
    /// Carried alongside the stream without moving it.
    Interleaved,
    /// Synchronization is lost.
    Lost,
}

impl Transition {
    fn from_category(category: EventCategory) -> Self {
        match category {
            EventCategory::BlankingStart(_)
            | EventCategory::ScramblerReset(_)
            | EventCategory::BlankingFill(_) => Self::Enter(Stage::BlankingStart),
            EventCategory::Vbid(_) => Self::Enter(Stage::Vbid),
            EventCategory::Mvid(_) => Self::Enter(Stage::Mvid),
            EventCategory::Maud(_) => Self::Enter(Stage::Maud),
            EventCategory::Msa => Self::Enter(Stage::Msa),
            EventCategory::InfoFrame | EventCategory::Sdp => Self::Enter(Stage::Sdp),
            EventCategory::StreamFill => Self::Enter(Stage::StreamFill),
            EventCategory::BlankingEnd(_) => Self::Enter(Stage::BlankingEnd),
            EventCategory::Pixel(_) => Self::Enter(Stage::Pixel),
            EventCategory::Stuffing(_) => Self::Enter(Stage::VideoStuff),
            EventCategory::Vcpf => Self::Vcpf,
            EventCategory::MtpHeader => Self::Interleaved,
            EventCategory::Training | EventCategory::Unknown => Self::Lost,
        }
    }
}

/// VB-ID grouping seen since the last blanking start.
#[derive(Debug, Clone, Copy, Default)]
struct Grouping {
    vbid: bool,
    mvid: bool,
    maud: bool,
}

impl Grouping {
    fn complete(self) -> bool {
        self.vbid && self.mvid && self.maud
    }
}

/// Judges every stage entry against the stage that preceded it.
///
/// VCPF and MTP header states are transparent: they leave the predecessor
/// untouched. Training and unknown states drop synchronization until the next
/// BS or BE.
#[derive(Debug, Default)]
pub struct StateSequenceChecker {
    width: LinkWidth,
    /// `None` while waiting for a BS or BE to synchronize on.
    previous: Option<Stage>,
    /// VB-ID, Mvid and Maud seen since the last blanking start.
    grouping: Grouping,
    /// Between a blanking start and the following BE.
    in_blanking: bool,
    /// Consecutive VCPF states, reset by any other state.
    vcpf_run: usize,
    blanking_sections: u64,
    unsynchronized_states: u64,
}

impl StateSequenceChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn vcpf_limit(&self) -> usize {
        VCPF_SYMBOLS_PER_SEQUENCE / self.width.lanes()
    }

    fn validate(&self, previous: Stage, stage: Stage) -> Option<&'static str> {
        let allowed = stage.predecessors()?;
        if !allowed.contains(&previous) {
            return Some(stage.sequence_error());
        }
        if previous == stage || !self.in_blanking || self.grouping.complete() {
            return None;
        }
        match stage {
            Stage::Msa => Some(
                "Invalid MSA Packet location; VBID, MVID or MAUD were not processed prior to MSA Packet",
            ),
            Stage::Sdp => Some(
                "Invalid SDP Packet location; VBID, MVID or MAUD were not processed prior to SDP Packet",
            ),
            _ => None,
        }
    }

    fn enter(&mut self, stage: Stage) {
        match stage {
            Stage::BlankingStart if self.previous != Some(Stage::BlankingStart) => {
                self.blanking_sections += 1;
                self.grouping = Grouping::default();
                self.in_blanking = true;
            }
            Stage::Vbid => self.grouping.vbid = true,
            Stage::Mvid => self.grouping.mvid = true,
            Stage::Maud => self.grouping.maud = true,
            Stage::BlankingEnd => self.in_blanking = false,
            _ => {}
        }
        self.previous = Some(stage);
    }
}

impl Checker for StateSequenceChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::StateSequence
    }

    fn reset(&mut self, config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self {
            width: config.width,
            ..Self::default()
        };
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let transition = Transition::from_category(state.event()?);
        if transition != Transition::Vcpf {
            self.vcpf_run = 0;
        }

        let stage = match transition {
            Transition::Enter(stage) => stage,
            Transition::Vcpf => {
                self.vcpf_run = self.vcpf_run.saturating_add(1);
                if self.previous.is_some() && self.vcpf_run > self.vcpf_limit() {
                    ledger.report("Invalid number of VCPF Symbols Encountered.");
                }
                return Ok(());
            }
            Transition::Interleaved => return Ok(()),
            Transition::Lost => {
                if self.previous.take().is_some() {
                    log::debug!("State sequence lost at {}", state.index());
                }
                self.unsynchronized_states += 1;
                return Ok(());
            }
        };

        let Some(previous) = self.previous else {
            if matches!(stage, Stage::BlankingStart | Stage::BlankingEnd) {
                log::debug!("State sequence synchronized at {}", state.index());
                self.enter(stage);
            } else {
                self.unsynchronized_states += 1;
            }
            return Ok(());
        };

        if let Some(message) = self.validate(previous, stage) {
            log::trace!("{previous:?} -> {stage:?} at {}", state.index());
            ledger.report(message);
        }
        self.enter(stage);
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![
            format!(
                "Number of Blanking Sections Processed: {}",
                self.blanking_sections
            ),
            format!(
                "Number of Unsynchronized States: {}",
                self.unsynchronized_states
            ),
        ]
    }

    fn fail_status(&self) -> &'static str {
        "Failed: Unexpected State Sequences Encountered."
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test identifies unexpected state sequences.",
            " ",
            " Each state is compared against the state preceding it: BS, then",
            " VBID, MVID and MAUD, then MSA/SDP packets or stream fill in the",
            " blanking section; BE, then pixels and video stuffing in the active",
            " section. MSA and SDP packets in the blanking section must follow a",
            " complete VBID/MVID/MAUD grouping.",
            " ",
            " VCPF states may not exceed four symbols spread across the active lanes.",
            " Unknown and training states suspend checking until the next BS or BE.",
            " ",
            " The test processes/utilizes Event Codes to identify state types.",
        ]
    }
}
