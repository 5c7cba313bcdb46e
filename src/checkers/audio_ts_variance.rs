//! Audio timestamp stability.
//!
//! Every Audio TS SDP carries Maud and Naud. Their ratio tracks the audio
//! sampling frequency, so consecutive timestamps must not move by more than
//! 5% of the previous ratio.

use crate::catalog::CheckerKind;
use crate::checkers::{PacketCursor, PacketEvent};
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::{AUDIO_TS_VARIANCE, DATA_BYTE_MASK};
use crate::error::{CheckerError, ConfigError};
use crate::field::LaneValues;
use crate::layout::{SubField, assemble, byte_count, locate};
use crate::ledger::ErrorLedger;
use crate::symbol::SdpKind;
use crate::traits::{Checker, StateView};

/// Maud/Naud ratio, or `None` when Naud is zero.
pub fn timestamp_ratio(maud: u32, naud: u32) -> Option<f64> {
    (naud != 0).then(|| f64::from(maud) / f64::from(naud))
}

/// Whether `current` moved away from `previous` by more than the allowed
/// fraction of `previous`.
pub fn exceeds_variance(previous: f64, current: f64) -> bool {
    (current - previous).abs() > previous * AUDIO_TS_VARIANCE
}

/// What the packet being walked turned out to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Packet {
    #[default]
    Unidentified,
    Msa,
    Sdp(SdpKind),
}

#[derive(Debug, Default)]
pub struct AudioTsVarianceChecker {
    width: LinkWidth,
    cursor: PacketCursor,
    packet: Packet,
    maud: u32,
    naud: u32,
    previous_ratio: Option<f64>,
    timestamps: u64,
}

impl AudioTsVarianceChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn identify(&mut self, cursor: u32, lanes: &LaneValues) -> Result<(), CheckerError> {
        if let Some((_, position)) = locate(SubField::SdpHeaderByte1, self.width, cursor) {
            let hb1 = (lanes.get(position.lane)? & DATA_BYTE_MASK) as u8;
            self.packet = Packet::Sdp(SdpKind::from_hb1(hb1));
        }
        Ok(())
    }

    fn read_timestamp(
        &mut self,
        cursor: u32,
        lanes: &LaneValues,
        ledger: &mut ErrorLedger,
    ) -> Result<(), CheckerError> {
        if let Some((byte, position)) = locate(SubField::AudioTsMaud, self.width, cursor) {
            self.maud = assemble(self.maud, byte, lanes.get(position.lane)?);
        }
        if let Some((byte, position)) = locate(SubField::AudioTsNaud, self.width, cursor) {
            self.naud = assemble(self.naud, byte, lanes.get(position.lane)?);
            if byte + 1 == byte_count(SubField::AudioTsNaud, self.width) {
                self.finish_timestamp(ledger);
            }
        }
        Ok(())
    }

    fn finish_timestamp(&mut self, ledger: &mut ErrorLedger) {
        self.timestamps += 1;
        let Some(ratio) = timestamp_ratio(self.maud, self.naud) else {
            log::warn!("Audio TS with Naud 0 (Maud {}), skipped", self.maud);
            return;
        };
        log::trace!("Audio TS Maud {} / Naud {} = {ratio}", self.maud, self.naud);
        if let Some(previous) = self.previous_ratio
            && exceeds_variance(previous, ratio)
        {
            ledger.report("Audio TS change greater than 5% detected");
        }
        self.previous_ratio = Some(ratio);
    }
}

impl Checker for AudioTsVarianceChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::AudioTimestampVariance
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
            PacketEvent::Opened => self.packet = Packet::Unidentified,
            PacketEvent::MsaOpened => self.packet = Packet::Msa,
            PacketEvent::Misplaced => {
                ledger.report("Invalid SS Ctrl Character Encountered");
                self.packet = Packet::Unidentified;
            }
            PacketEvent::Closed => self.packet = Packet::Unidentified,
            PacketEvent::Data(cursor) => match self.packet {
                Packet::Unidentified => self.identify(cursor, &lanes)?,
                Packet::Sdp(SdpKind::AudioTimestamp) => {
                    self.read_timestamp(cursor, &lanes, ledger)?;
                }
                Packet::Msa | Packet::Sdp(_) => {}
            },
            PacketEvent::Outside => {}
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number of Audio TS SDPs Processed: {}",
            self.timestamps
        )]
    }

    fn fail_status(&self) -> &'static str {
        "Failed: One or more Maud value(s) did not match Audio TimeStamp"
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies the Maud/Naud ratio carried by consecutive Audio",
            " TimeStamp SDPs does not change by more than 5%.",
            " ",
            " Maud and Naud are read from lane 0.",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{all_lanes, drive, run, state};
    use crate::constants::{HB1_AUDIO_STREAM, HB1_AUDIO_TIMESTAMP, SYMBOL_SE, SYMBOL_SS};
    use crate::layout::positions;
    use crate::record::StateRecord;

    /// SDP with header byte 1 `hb1` carrying Maud and Naud at the timestamp
    /// positions for `width`.
    fn sdp(width: LinkWidth, hb1: u8, maud: u32, naud: u32) -> Vec<StateRecord> {
        let naud_at = positions(SubField::AudioTsNaud, width);
        let last = naud_at[naud_at.len() - 1].cursor;
        let mut records = vec![all_lanes(SYMBOL_SS, width, "Audio TS")];
        for cursor in 1..=last + 1 {
            let mut values = vec![0u16; width.lanes()];
            if let Some((_, at)) = locate(SubField::SdpHeaderByte1, width, cursor) {
                values[at.lane] = u16::from(hb1);
            }
            for (field, value) in [(SubField::AudioTsMaud, maud), (SubField::AudioTsNaud, naud)] {
                if let Some((byte, at)) = locate(field, width, cursor) {
                    values[at.lane] = ((value >> (8 * (2 - byte))) & 0xFF) as u16;
                }
            }
            records.push(state(&values, "Audio TS"));
        }
        records.push(all_lanes(SYMBOL_SE, width, "Audio TS"));
        records
    }

    #[test]
    fn variance_threshold_is_five_percent() {
        assert!(!exceeds_variance(100.0, 104.9));
        assert!(!exceeds_variance(100.0, 95.5));
        assert!(exceeds_variance(100.0, 106.0));
        assert!(exceeds_variance(100.0, 94.0));
    }

    #[test]
    fn ratio_needs_nonzero_naud() {
        assert_eq!(timestamp_ratio(1000, 0), None);
        assert_eq!(timestamp_ratio(1000, 500), Some(2.0));
    }

    #[test]
    fn stable_timestamps_pass_at_every_width() {
        for width in [LinkWidth::One, LinkWidth::Two, LinkWidth::Four] {
            let mut run = run(CheckerKind::AudioTimestampVariance, LinkConfig::new(width));
            let mut records = sdp(width, HB1_AUDIO_TIMESTAMP, 1000, 1000);
            records.extend(sdp(width, HB1_AUDIO_TIMESTAMP, 1049, 1000));
            records.extend(sdp(width, HB1_AUDIO_TIMESTAMP, 1040, 1000));
            assert!(drive(&mut run, &records).is_empty(), "width {width}");
            assert_eq!(
                run.results_summary()[1],
                "Number of Audio TS SDPs Processed: 3"
            );
        }
    }

    #[test]
    fn jump_is_reported() {
        let width = LinkWidth::Four;
        let mut run = run(CheckerKind::AudioTimestampVariance, LinkConfig::new(width));
        let mut records = sdp(width, HB1_AUDIO_TIMESTAMP, 0x10_0000, 0x01_0000);
        records.extend(sdp(width, HB1_AUDIO_TIMESTAMP, 0x11_0000, 0x01_0000));
        assert_eq!(
            drive(&mut run, &records),
            vec!["Audio TS change greater than 5% detected"]
        );
        assert_eq!(
            run.results_summary().last().unwrap(),
            "  Failed: One or more Maud value(s) did not match Audio TimeStamp"
        );
    }

    #[test]
    fn other_packets_are_ignored() {
        let width = LinkWidth::Two;
        let mut run = run(CheckerKind::AudioTimestampVariance, LinkConfig::new(width));
        let mut records = sdp(width, HB1_AUDIO_TIMESTAMP, 1000, 1000);
        records.extend(sdp(width, HB1_AUDIO_STREAM, 9000, 1000));
        records.extend(sdp(width, HB1_AUDIO_TIMESTAMP, 1000, 1000));
        assert!(drive(&mut run, &records).is_empty());
        assert_eq!(
            run.results_summary()[1],
            "Number of Audio TS SDPs Processed: 2"
        );
    }

    #[test]
    fn misplaced_ss_is_reported() {
        let width = LinkWidth::One;
        let mut run = run(CheckerKind::AudioTimestampVariance, LinkConfig::new(width));
        let records = vec![
            all_lanes(SYMBOL_SS, width, "Audio TS"),
            all_lanes(0x000, width, "Audio TS"),
            all_lanes(SYMBOL_SS, width, "Audio TS"),
        ];
        assert_eq!(
            drive(&mut run, &records),
            vec!["Invalid SS Ctrl Character Encountered"]
        );
    }
}
