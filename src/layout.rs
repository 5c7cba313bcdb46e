//! Packet sub-field placement per link width.
//!
//! Secondary data packets are striped across the active lanes, so the state
//! (cursor) and lane that carry a given byte depend on the link width. The
//! mapping is irregular and is therefore kept as data: one position list per
//! `(SubField, LinkWidth)` pair, most significant byte first.
//!
//! Cursor 1 is the first state after the (last) SS symbol opening the packet.

use crate::config::LinkWidth;
use crate::constants::DATA_BYTE_MASK;

/// Location of one packet byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PacketPosition {
    pub cursor: u32,
    pub lane: usize,
}

const fn at(cursor: u32, lane: usize) -> PacketPosition {
    PacketPosition { cursor, lane }
}

/// Packet sub-fields read by the checkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubField {
    /// SDP header byte 1 (packet type).
    SdpHeaderByte1,
    /// Audio timestamp Maud[23:0].
    AudioTsMaud,
    /// Audio timestamp Naud[23:0].
    AudioTsNaud,
    /// MSA Mvid[7:0].
    MsaMvidLsb,
    /// MSA Htotal[15:0].
    MsaHtotal,
    /// MSA Vtotal[15:0].
    MsaVtotal,
    /// MSA MISC0.
    MsaMisc0,
    /// Audio InfoFrame data byte carrying the sampling-frequency ID.
    InfoFrameSamplingFrequency,
    /// State at which one audio stream packet is counted.
    AudioStreamSample,
}

/// Positions of `field` at `width`, most significant byte first.
pub fn positions(field: SubField, width: LinkWidth) -> &'static [PacketPosition] {
    use LinkWidth::{Four, One, Two};
    use SubField::*;

    const HB1_ONE: &[PacketPosition] = &[at(3, 0)];
    const HB1_WIDE: &[PacketPosition] = &[at(1, 1)];
    const MAUD_ONE: &[PacketPosition] = &[at(9, 0), at(10, 0), at(11, 0)];
    const MAUD_TWO: &[PacketPosition] = &[at(5, 0), at(6, 0), at(7, 0)];
    const MAUD_FOUR: &[PacketPosition] = &[at(3, 0), at(4, 0), at(5, 0)];
    const NAUD_ONE: &[PacketPosition] = &[at(29, 0), at(30, 0), at(31, 0)];
    const NAUD_TWO: &[PacketPosition] = &[at(15, 0), at(16, 0), at(17, 0)];
    const NAUD_FOUR: &[PacketPosition] = &[at(8, 0), at(9, 0), at(10, 0)];
    const MVID_LSB: &[PacketPosition] = &[at(3, 0)];
    const HTOTAL: &[PacketPosition] = &[at(4, 0), at(5, 0)];
    const VTOTAL: &[PacketPosition] = &[at(6, 0), at(7, 0)];
    const MISC0_ONE: &[PacketPosition] = &[at(34, 0)];
    const MISC0_TWO: &[PacketPosition] = &[at(16, 1)];
    const MISC0_FOUR: &[PacketPosition] = &[at(7, 3)];
    const FS_ONE: &[PacketPosition] = &[at(10, 0)];
    const FS_WIDE: &[PacketPosition] = &[at(4, 0)];
    const SAMPLE_ONE: &[PacketPosition] = &[at(4, 0)];
    const SAMPLE_WIDE: &[PacketPosition] = &[at(2, 0)];

    match (field, width) {
        (SdpHeaderByte1, One) => HB1_ONE,
        (SdpHeaderByte1, Two | Four) => HB1_WIDE,
        (AudioTsMaud, One) => MAUD_ONE,
        (AudioTsMaud, Two) => MAUD_TWO,
        (AudioTsMaud, Four) => MAUD_FOUR,
        (AudioTsNaud, One) => NAUD_ONE,
        (AudioTsNaud, Two) => NAUD_TWO,
        (AudioTsNaud, Four) => NAUD_FOUR,
        (MsaMvidLsb, _) => MVID_LSB,
        (MsaHtotal, _) => HTOTAL,
        (MsaVtotal, _) => VTOTAL,
        (MsaMisc0, One) => MISC0_ONE,
        (MsaMisc0, Two) => MISC0_TWO,
        (MsaMisc0, Four) => MISC0_FOUR,
        (InfoFrameSamplingFrequency, One) => FS_ONE,
        (InfoFrameSamplingFrequency, Two | Four) => FS_WIDE,
        (AudioStreamSample, One) => SAMPLE_ONE,
        (AudioStreamSample, Two | Four) => SAMPLE_WIDE,
    }
}

/// Finds the byte of `field` carried at `cursor`, returning its index (0 for
/// the most significant byte) and position.
pub fn locate(field: SubField, width: LinkWidth, cursor: u32) -> Option<(usize, PacketPosition)> {
    positions(field, width)
        .iter()
        .copied()
        .enumerate()
        .find(|(_, position)| position.cursor == cursor)
}

/// Number of bytes making up `field`.
pub fn byte_count(field: SubField, width: LinkWidth) -> usize {
    positions(field, width).len()
}

/// Folds one lane value into a big-endian accumulator. The first byte
/// restarts the accumulation.
pub fn assemble(accumulator: u32, byte_index: usize, lane_value: u16) -> u32 {
    let data = u32::from(lane_value & DATA_BYTE_MASK);
    if byte_index == 0 {
        data
    } else {
        (accumulator << 8) | data
    }
}
