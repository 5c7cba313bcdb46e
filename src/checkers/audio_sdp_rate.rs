//! Audio sample delivery rate.
//!
//! Frames are delimited on lane 0 by the first VBID with the vertical
//! blanking flag set after a run of VBIDs without it. For every complete
//! frame the checker compares the number of Audio Stream SDPs received with
//! the count predicted from the link clock, the Audio TS Maud/Naud ratio and
//! the MSA timing:
//!
//! ```text
//! Fs       = f_LS_CLK * (Maud / Naud) / 512
//! refresh  = 1e9 / (frame ticks * clock period ns)
//! expected = floor(lines * Fs * Htotal / (Htotal * Vtotal * refresh))
//! ```
//!
//! A frame passes when the received count lies within four samples of the
//! expected count. The number of lines counted in a frame must also match the
//! MSA Vtotal.

use crate::catalog::CheckerKind;
use crate::checkers::{PacketCursor, PacketEvent};
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::{
    AUDIO_MAUD_NAUD_SCALE, AUDIO_SAMPLE_TOLERANCE, DATA_BYTE_MASK, NANOS_PER_SECOND,
    SAMPLING_FREQUENCY_MASK, SAMPLING_FREQUENCY_SHIFT, VBID_VERTICAL_BLANKING_FLAG,
};
use crate::error::{CheckerError, ConfigError};
use crate::field::LaneValues;
use crate::layout::{SubField, assemble, byte_count, locate};
use crate::ledger::{ErrorLedger, format_indexed};
use crate::symbol::{SdpKind, is_blanking_start};
use crate::traits::{Checker, StateView};
use crate::types::{StateIndex, TimeTicks};

/// Audio sampling frequency in Hz, or `None` when Naud is zero.
pub fn sampling_frequency(ls_clk_hz: u32, maud: u32, naud: u32) -> Option<f64> {
    (naud != 0)
        .then(|| f64::from(ls_clk_hz) * (f64::from(maud) / f64::from(naud)) / AUDIO_MAUD_NAUD_SCALE)
}

/// Frame refresh rate in Hz from two vertical-blanking time stamps.
///
/// Returns `None` unless `later` is strictly after `earlier`.
pub fn refresh_rate(earlier: TimeTicks, later: TimeTicks, clock_period_ns: f64) -> Option<f64> {
    let delta = later.since(earlier).filter(|delta| *delta > 0)?;
    let frame_ns = delta as f64 * clock_period_ns;
    (frame_ns > 0.0).then(|| NANOS_PER_SECOND / frame_ns)
}

/// Number of audio samples predicted for a frame of `lines` lines.
///
/// Returns `None` when the pixel rate is not positive.
pub fn expected_sample_count(lines: u64, fs: f64, htotal: u32, pixel_rate: f64) -> Option<i64> {
    (pixel_rate > 0.0)
        .then(|| (lines as f64 * fs * f64::from(htotal) / pixel_rate).floor() as i64)
}

/// Whether `received` lies within the tolerance around `expected`.
pub fn sample_count_within_tolerance(expected: i64, received: i64) -> bool {
    (received - expected).abs() <= AUDIO_SAMPLE_TOLERANCE
}

/// Per-frame measurements collected over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStatistics {
    /// Time stamp of every frame start.
    pub vertical_ticks: Vec<TimeTicks>,
    /// Blanking-start sequences counted in each completed frame.
    pub line_counts: Vec<u64>,
    /// Audio Stream SDPs received in each completed frame.
    pub audio_sample_counts: Vec<u64>,
    /// Sampling-frequency IDs from every Audio InfoFrame.
    pub sampling_frequency_ids: Vec<u8>,
}

impl FrameStatistics {
    /// Refresh rate from the two most recent frame starts.
    pub fn latest_refresh_rate(&self, clock_period_ns: f64) -> Option<f64> {
        match self.vertical_ticks.as_slice() {
            [.., earlier, later] => refresh_rate(*earlier, *later, clock_period_ns),
            _ => None,
        }
    }
}

/// MSA and Audio TS values received during the current frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FrameTiming {
    htotal: u32,
    vtotal: u32,
    maud: u32,
    naud: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Packet {
    #[default]
    Unidentified,
    Msa,
    Sdp(SdpKind),
}

/// Measures frame timing and audio samples per frame.
///
/// Requires a link speed; [`Checker::reset`] rejects a configuration
/// without one.
#[derive(Debug, Default)]
pub struct AudioSdpRateChecker {
    width: LinkWidth,
    /// Link symbol clock derived from the configured speed.
    ls_clk_hz: u32,
    clock_period_ns: f64,
    cursor: PacketCursor,
    packet: Packet,
    timing: FrameTiming,
    in_blanking_start: bool,
    vertical: bool,
    frames: u64,
    /// Sequences since the current frame started.
    lines: u64,
    /// Sequences with the vertical blanking flag clear in the current frame.
    active_lines: u64,
    frame_samples: u64,
    first_vertical: Option<StateIndex>,
    statistics: FrameStatistics,
    msa_count: u64,
    info_frames: u64,
    audio_packets: u64,
}

impl AudioSdpRateChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statistics(&self) -> &FrameStatistics {
        &self.statistics
    }

    /// Handles the VBID that follows a blanking-start sequence.
    fn on_vbid(&mut self, lane0: u16, state: &StateView<'_>, ledger: &mut ErrorLedger) {
        if lane0 & VBID_VERTICAL_BLANKING_FLAG != 0 {
            if !self.vertical {
                self.start_frame(state, ledger);
            }
        } else {
            self.vertical = false;
            self.active_lines += 1;
        }
        if self.frames > 0 {
            self.lines += 1;
        }
    }

    fn start_frame(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) {
        self.statistics.vertical_ticks.push(state.ticks());
        self.frames += 1;
        if self.frames == 1 {
            self.first_vertical = Some(state.index());
        } else if self.active_lines > 0 {
            self.statistics.line_counts.push(self.lines);
            self.statistics.audio_sample_counts.push(self.frame_samples);
            self.evaluate_frame(ledger);
            self.timing = FrameTiming::default();
            self.active_lines = 0;
        }
        log::debug!(
            "Frame {} starts at {} ({} audio SDPs in previous frame)",
            self.frames,
            state.index(),
            self.frame_samples
        );
        self.frame_samples = 0;
        self.vertical = true;
        self.lines = 0;
    }

    fn evaluate_frame(&self, ledger: &mut ErrorLedger) {
        let timing = self.timing;
        if self.lines != u64::from(timing.vtotal) {
            ledger.report(
                "MSA Vtotal field value is different that the number of actual lines in the frame",
            );
        }

        let Some(fs) = sampling_frequency(self.ls_clk_hz, timing.maud, timing.naud) else {
            log::warn!("No Audio TS Naud in frame {}, sample rate not checked", self.frames - 1);
            return;
        };
        let Some(refresh) = self.statistics.latest_refresh_rate(self.clock_period_ns) else {
            log::warn!("Frame {} has no measurable duration, sample rate not checked", self.frames - 1);
            return;
        };
        let pixel_rate = f64::from(timing.htotal) * f64::from(timing.vtotal) * refresh;
        let Some(expected) = expected_sample_count(self.lines, fs, timing.htotal, pixel_rate) else {
            log::warn!("Zero pixel rate in frame {}, sample rate not checked", self.frames - 1);
            return;
        };

        let received = self.frame_samples as i64;
        log::trace!("Fs {fs} Hz, refresh {refresh} Hz, expected {expected}, received {received}");
        if !sample_count_within_tolerance(expected, received) {
            ledger.report(format!(
                "Invalid audio Sample Rate Detected: Expected (+/- {AUDIO_SAMPLE_TOLERANCE}): {expected}, Received: {received}"
            ));
        }
    }

    fn on_packet_data(&mut self, cursor: u32, lanes: &LaneValues) -> Result<(), CheckerError> {
        let width = self.width;
        match self.packet {
            Packet::Unidentified => {
                if let Some((_, at)) = locate(SubField::SdpHeaderByte1, width, cursor) {
                    let hb1 = (lanes.get(at.lane)? & DATA_BYTE_MASK) as u8;
                    self.packet = Packet::Sdp(SdpKind::from_hb1(hb1));
                }
            }
            Packet::Msa => {
                if let Some((byte, at)) = locate(SubField::MsaHtotal, width, cursor) {
                    self.timing.htotal = assemble(self.timing.htotal, byte, lanes.get(at.lane)?);
                }
                if let Some((byte, at)) = locate(SubField::MsaVtotal, width, cursor) {
                    self.timing.vtotal = assemble(self.timing.vtotal, byte, lanes.get(at.lane)?);
                }
            }
            Packet::Sdp(SdpKind::AudioInfoFrame) => {
                if let Some((_, at)) = locate(SubField::InfoFrameSamplingFrequency, width, cursor) {
                    let byte = (lanes.get(at.lane)? & DATA_BYTE_MASK) as u8;
                    let id = (byte & SAMPLING_FREQUENCY_MASK) >> SAMPLING_FREQUENCY_SHIFT;
                    self.statistics.sampling_frequency_ids.push(id);
                    self.info_frames += 1;
                }
            }
            Packet::Sdp(SdpKind::AudioTimestamp) => {
                if let Some((byte, at)) = locate(SubField::AudioTsMaud, width, cursor) {
                    self.timing.maud = assemble(self.timing.maud, byte, lanes.get(at.lane)?);
                }
                if let Some((byte, at)) = locate(SubField::AudioTsNaud, width, cursor) {
                    self.timing.naud = assemble(self.timing.naud, byte, lanes.get(at.lane)?);
                    if byte + 1 == byte_count(SubField::AudioTsNaud, width) {
                        log::trace!("Audio TS Maud {} Naud {}", self.timing.maud, self.timing.naud);
                    }
                }
            }
            Packet::Sdp(SdpKind::AudioStream) => {
                if locate(SubField::AudioStreamSample, width, cursor).is_some() {
                    self.frame_samples += 1;
                    self.audio_packets += 1;
                }
            }
            Packet::Sdp(SdpKind::Other) => {}
        }
        Ok(())
    }
}

impl Checker for AudioSdpRateChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::AudioSampleRate
    }

    fn reset(&mut self, config: &LinkConfig) -> Result<(), ConfigError> {
        let speed = config.require_speed()?;
        *self = Self {
            width: config.width,
            ls_clk_hz: speed.ls_clk_hz(),
            clock_period_ns: speed.clock_period_ns(),
            ..Self::default()
        };
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lanes = state.lanes()?;
        let lane0 = lanes.lane0();

        if is_blanking_start(lane0) {
            self.in_blanking_start = true;
            return Ok(());
        }
        if self.in_blanking_start {
            self.in_blanking_start = false;
            self.on_vbid(lane0, state, ledger);
            return Ok(());
        }

        match self.cursor.advance(lane0, state.index()) {
            PacketEvent::Opened | PacketEvent::Misplaced | PacketEvent::Closed => {
                self.packet = Packet::Unidentified;
            }
            PacketEvent::MsaOpened => {
                self.packet = Packet::Msa;
                self.msa_count += 1;
            }
            PacketEvent::Data(cursor) => self.on_packet_data(cursor, &lanes)?,
            PacketEvent::Outside => {}
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        let first_vertical = self.first_vertical.map_or(0, StateIndex::value);
        vec![
            format!("Number of MSA SDPs Processed: {}", self.msa_count),
            format!("Number of Audio Info Frame SDPs Processed: {}", self.info_frames),
            format!("Number of Audio SDPs Processed: {}", self.audio_packets),
            format!("1st Vertical Frame Offset: {first_vertical}"),
            format_indexed("Freq Sampling IDs", &self.statistics.sampling_frequency_ids),
            format_indexed("Frame Line Counts", &self.statistics.line_counts),
            format_indexed("Audio Stream SDP Counts", &self.statistics.audio_sample_counts),
        ]
    }

    fn fail_status(&self) -> &'static str {
        "Failed: Audio sample delivery rate errors encountered."
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies the number of audio samples delivered in each frame",
            " is within +/- 4 samples of the rate derived from the Audio TS Maud/Naud",
            " values, the link symbol clock and the MSA Htotal/Vtotal timing.",
            " ",
            " Frames are delimited using the VBID Vertical Blanking flag on lane 0.",
            " The first partial frame of the capture is not evaluated.",
            " ",
            " This test requires the SPEED parameter.",
        ]
    }
}
