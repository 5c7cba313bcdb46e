//! Conformance rule state machines.
//!
//! One module per rule. Each checker owns an explicit state struct and
//! implements [`Checker`](crate::traits::Checker); shared packet tracking lives
//! in [`PacketCursor`].

pub mod audio_sdp_rate;
pub mod audio_ts_variance;
pub mod blank_line;
pub mod bs_start;
pub mod first_pixel;
pub mod msa_delimiters;
pub mod mvid_lsbyte;
pub mod mvid_no_video;
pub mod once_per_frame;
pub mod pixel_after_be;
pub mod sdp_delimiters;
pub mod sr_spacing;
pub mod state_sequence;
pub mod stuffing_framing;
pub mod symbol_grouping;
pub mod time_ticks;
pub mod tu_length;
pub mod vbid_replication;

use crate::constants::BLANKING_START_SEQUENCE_LEN;
use crate::symbol::ControlSymbol;
use crate::types::StateIndex;

/// Outcome of feeding one lane value to a [`PacketCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketEvent {
    /// SS opening a packet.
    Opened,
    /// Second SS immediately following the first: the packet is an MSA.
    MsaOpened,
    /// SS that is neither an opening nor a consecutive second SS. The cursor
    /// resynchronizes on it as if it opened a new packet.
    Misplaced,
    /// SE closing the current packet.
    Closed,
    /// Non-delimiter state inside a packet, with its cursor (1-based).
    Data(u32),
    /// State outside any packet.
    Outside,
}

/// Tracks the position inside a secondary data packet on one lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacketCursor {
    ss_count: u8,
    cursor: u32,
    opened_at: Option<StateIndex>,
}

impl PacketCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the cursor by one state carrying `value` on the tracked lane.
    pub fn advance(&mut self, value: u16, index: StateIndex) -> PacketEvent {
        match ControlSymbol::from_lane(value) {
            Some(ControlSymbol::Ss) => {
                if self.ss_count == 0 {
                    self.open(index);
                    PacketEvent::Opened
                } else if self.ss_count == 1
                    && self.cursor == 0
                    && self.opened_at.and_then(|at| index.since(at)) == Some(1)
                {
                    self.ss_count = 2;
                    PacketEvent::MsaOpened
                } else {
                    self.open(index);
                    PacketEvent::Misplaced
                }
            }
            Some(ControlSymbol::Se) if self.in_packet() => {
                self.reset();
                PacketEvent::Closed
            }
            _ if self.in_packet() => {
                self.cursor = self.cursor.saturating_add(1);
                PacketEvent::Data(self.cursor)
            }
            _ => PacketEvent::Outside,
        }
    }

    fn open(&mut self, index: StateIndex) {
        self.ss_count = 1;
        self.cursor = 0;
        self.opened_at = Some(index);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn in_packet(&self) -> bool {
        self.ss_count > 0
    }

    pub fn in_msa(&self) -> bool {
        self.ss_count == 2
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }
}

/// Counts blanking-start sequences from lane 0.
///
/// A BS or BF at least four states after the start of the previous sequence
/// begins a new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceTracker {
    start: Option<StateIndex>,
    count: u64,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `lane0` starts a new sequence.
    pub fn observe(&mut self, lane0: u16, index: StateIndex) -> bool {
        if !matches!(
            ControlSymbol::from_lane(lane0),
            Some(ControlSymbol::Bs | ControlSymbol::Bf)
        ) {
            return false;
        }
        let min_gap = u64::from(BLANKING_START_SEQUENCE_LEN);
        let new_sequence = self
            .start
            .is_none_or(|start| index.since(start).is_some_and(|gap| gap >= min_gap));
        if new_sequence {
            self.start = Some(index);
            self.count += 1;
        }
        new_sequence
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

/// Prefix used by per-lane messages.
pub(crate) fn lane_label(lane: usize) -> String {
    format!("Lane{lane}")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SYMBOL_SE, SYMBOL_SS};

    #[test]
    fn cursor_counts_from_first_state_after_ss() {
        let mut cursor = PacketCursor::new();
        assert_eq!(cursor.advance(0x00, 0u64.into()), PacketEvent::Outside);
        assert_eq!(cursor.advance(SYMBOL_SS, 1u64.into()), PacketEvent::Opened);
        assert_eq!(cursor.advance(0x12, 2u64.into()), PacketEvent::Data(1));
        assert_eq!(cursor.advance(0x34, 3u64.into()), PacketEvent::Data(2));
        assert_eq!(cursor.advance(SYMBOL_SE, 4u64.into()), PacketEvent::Closed);
        assert!(!cursor.in_packet());
    }

    #[test]
    fn consecutive_ss_opens_msa() {
        let mut cursor = PacketCursor::new();
        cursor.advance(SYMBOL_SS, 10u64.into());
        assert_eq!(
            cursor.advance(SYMBOL_SS, 11u64.into()),
            PacketEvent::MsaOpened
        );
        assert!(cursor.in_msa());
        assert_eq!(cursor.advance(0x01, 12u64.into()), PacketEvent::Data(1));
    }

    #[test]
    fn sequence_tracker_counts_once_per_blanking_start() {
        use crate::constants::{SYMBOL_BF, SYMBOL_BS};

        let mut tracker = SequenceTracker::new();
        let lane0 = [SYMBOL_BS, SYMBOL_BF, SYMBOL_BF, SYMBOL_BS, 0x00, SYMBOL_BS];
        let started: Vec<bool> = lane0
            .iter()
            .enumerate()
            .map(|(index, value)| tracker.observe(*value, (index as u64).into()))
            .collect();
        assert_eq!(started, [true, false, false, false, false, true]);
        assert_eq!(tracker.count(), 2);
    }

    #[test]
    fn late_ss_is_misplaced_and_resyncs() {
        let mut cursor = PacketCursor::new();
        cursor.advance(SYMBOL_SS, 0u64.into());
        cursor.advance(0x00, 1u64.into());
        assert_eq!(
            cursor.advance(SYMBOL_SS, 2u64.into()),
            PacketEvent::Misplaced
        );
        assert!(!cursor.in_msa());
        assert_eq!(cursor.advance(0x00, 3u64.into()), PacketEvent::Data(1));
    }

    #[test]
    fn cursor_saturates_in_an_unterminated_packet() {
        let mut cursor = PacketCursor {
            ss_count: 1,
            cursor: u32::MAX - 1,
            opened_at: Some(0u64.into()),
        };
        assert_eq!(cursor.advance(0x00, 1u64.into()), PacketEvent::Data(u32::MAX));
        assert_eq!(cursor.advance(0x00, 2u64.into()), PacketEvent::Data(u32::MAX));
        assert!(cursor.in_packet());
    }
}
