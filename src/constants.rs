//! DisplayPort main-link constants shared by the field accessor, the classifier
//! and the conformance checkers.
//!
//! Values are taken from DP 1.4a and the analyzer's state record layout.
//! Rule-specific thresholds live here as well so they can be asserted in one
//! place.

// --- State Record Layout ---

/// Size of one captured state record in bytes.
pub const STATE_RECORD_LEN: usize = 16;
/// Maximum number of main-link lanes carried by a state record.
pub const MAX_LANES: usize = 4;
/// Bit offset (from the MSB of byte 0) of lane 0's INV flag.
pub const LANE_FIELD_BASE_OFFSET: u16 = 88;
/// Distance in bits between consecutive lane fields (INV + K + 8 data bits).
pub const LANE_FIELD_STRIDE: u16 = 10;
/// Width of a lane symbol value: the K flag followed by the data byte.
pub const LANE_SYMBOL_WIDTH: u8 = 9;
/// Bit offset of the event code field (`byte9 >> 2`).
pub const EVENT_CODE_OFFSET: u16 = 72;
/// Width of the event code field.
pub const EVENT_CODE_WIDTH: u8 = 6;
/// Number of distinct event codes representable by the event code field.
pub const EVENT_CODE_COUNT: usize = 1 << EVENT_CODE_WIDTH;
/// Mask selecting the data byte of a lane symbol value.
pub const DATA_BYTE_MASK: u16 = 0x00FF;

// --- Control Symbols (K flag | data byte) ---

/// Scrambler Reset (K28.0).
pub const SYMBOL_SR: u16 = 0x11C;
/// Blanking Start (K28.5).
pub const SYMBOL_BS: u16 = 0x1BC;
/// Blanking Fill (K28.3).
pub const SYMBOL_BF: u16 = 0x17C;
/// Secondary-data Start (K28.2).
pub const SYMBOL_SS: u16 = 0x15C;
/// Secondary-data End (K29.7).
pub const SYMBOL_SE: u16 = 0x1FD;
/// Blanking End (K27.7).
pub const SYMBOL_BE: u16 = 0x1FB;
/// Fill Start (K30.7).
pub const SYMBOL_FS: u16 = 0x1FE;
/// Fill End (K23.7).
pub const SYMBOL_FE: u16 = 0x1F7;

// --- Secondary Data Packet Header Byte 1 Identifiers ---

/// HB1 value of an Audio InfoFrame SDP.
pub const HB1_AUDIO_INFOFRAME: u8 = 0x84;
/// HB1 value of an Audio Timestamp SDP.
pub const HB1_AUDIO_TIMESTAMP: u8 = 0x01;
/// HB1 value of an Audio Stream SDP.
pub const HB1_AUDIO_STREAM: u8 = 0x02;

// --- Packet Sub-field Bits ---

/// VB-ID bit 0: vertical blanking flag.
pub const VBID_VERTICAL_BLANKING_FLAG: u16 = 0x01;
/// VB-ID bit 3: no-video-stream flag.
pub const VBID_NO_VIDEO_FLAG: u16 = 0x08;
/// MSA MISC0 bit 0: synchronous clock mode.
pub const MISC0_SYNCHRONOUS_CLOCK_FLAG: u8 = 0x01;
/// Audio InfoFrame sampling-frequency field mask.
pub const SAMPLING_FREQUENCY_MASK: u8 = 0x1C;
/// Audio InfoFrame sampling-frequency field shift.
pub const SAMPLING_FREQUENCY_SHIFT: u8 = 2;

// --- Framing Rules ---

/// Number of states in a blanking-start (or scrambler-reset) symbol sequence.
pub const BLANKING_START_SEQUENCE_LEN: u8 = 4;
/// Number of BS sequences expected between two SR sequences.
pub const BS_SEQUENCES_BETWEEN_SR: u32 = 511;
/// VBID/MVID/MAUD triples transported after every blanking start.
pub const VBID_TRIPLES_PER_BLANKING_START: usize = 4;
/// Total VBID, MVID and MAUD states expected after every blanking start.
pub const VBID_GROUPING_STATES: usize = 3 * VBID_TRIPLES_PER_BLANKING_START;

// --- MST Sequencing ---

/// VCPF symbols in one fill sequence, spread across the active lanes.
pub const VCPF_SYMBOLS_PER_SEQUENCE: usize = 4;

// --- Video Rules ---

/// Minimum transfer unit length in link symbols per lane.
pub const TU_LENGTH_MIN: u32 = 32;
/// Maximum transfer unit length in link symbols per lane.
pub const TU_LENGTH_MAX: u32 = 64;

// --- Audio Rules ---

/// Allowed relative change between consecutive Audio TS Maud/Naud ratios.
pub const AUDIO_TS_VARIANCE: f64 = 0.05;
/// Allowed deviation from the predicted audio sample count per frame.
pub const AUDIO_SAMPLE_TOLERANCE: i64 = 4;
/// `Maud/Naud = 512 * Fs / f_LS_CLK`.
pub const AUDIO_MAUD_NAUD_SCALE: f64 = 512.0;
/// Nanoseconds per second.
pub const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

// --- Link Clocks ---

/// Link symbol clock for the 1.67G link rate.
pub const LS_CLK_1_67G_HZ: u32 = 167_000_000;
/// Link symbol clock for the 2.7G link rate.
pub const LS_CLK_2_7G_HZ: u32 = 270_000_000;
/// Link symbol clock for the 5.4G link rate.
pub const LS_CLK_5_4G_HZ: u32 = 540_000_000;
/// Link symbol clock for the 8.1G link rate.
pub const LS_CLK_8_1G_HZ: u32 = 810_000_000;
/// Clock period in nanoseconds for the 1.67G link rate.
pub const CLOCK_PERIOD_1_67G_NS: f64 = 6.172;
/// Clock period in nanoseconds for the 2.7G link rate.
pub const CLOCK_PERIOD_2_7G_NS: f64 = 3.703;
/// Clock period in nanoseconds for the 5.4G link rate.
pub const CLOCK_PERIOD_5_4G_NS: f64 = 1.851;
/// Clock period in nanoseconds for the 8.1G link rate.
pub const CLOCK_PERIOD_8_1G_NS: f64 = 1.234;

// --- Reporting ---

/// Default cap on reported violations per checker.
pub const DEFAULT_MAX_REPORTED_ERRORS: u32 = 10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_symbols_carry_k_flag() {
        for symbol in [
            SYMBOL_SR, SYMBOL_BS, SYMBOL_BF, SYMBOL_SS, SYMBOL_SE, SYMBOL_BE, SYMBOL_FS, SYMBOL_FE,
        ] {
            assert_eq!(symbol & 0x100, 0x100, "0x{symbol:03X} lacks the K flag");
            assert!(symbol < (1 << LANE_SYMBOL_WIDTH));
        }
    }

    #[test]
    fn lane_fields_fit_in_record() {
        let last_bit = LANE_FIELD_BASE_OFFSET + LANE_FIELD_STRIDE * (MAX_LANES as u16) - 1;
        assert_eq!(last_bit as usize, STATE_RECORD_LEN * 8 - 1);
        assert_eq!(EVENT_CODE_COUNT, 64);
    }

    #[test]
    fn grouping_total_matches_triples() {
        assert_eq!(VBID_GROUPING_STATES, 12);
        assert!(TU_LENGTH_MIN < TU_LENGTH_MAX);
    }
}
