//! Raw analyzer state records and bit-level field extraction.
//!
//! A [`StateRecord`] is one decoded physical-layer symbol slot across up to four
//! lanes. Fields are addressed by a bit offset counted from the most
//! significant bit of byte 0 and a width of 1 to 32 bits; a field may span
//! several bytes.
//!
//! [`Capture`] walks a contiguous buffer of records without copying it.

use bytes::Bytes;

use crate::constants::STATE_RECORD_LEN;
use crate::error::FieldError;
use crate::types::TimeTicks;

const RECORD_BITS: usize = STATE_RECORD_LEN * 8;

/// One 16-byte analyzer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StateRecord([u8; STATE_RECORD_LEN]);

impl StateRecord {
    /// Wraps a raw 16-byte state.
    pub const fn new(bytes: [u8; STATE_RECORD_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes of the state.
    pub const fn as_bytes(&self) -> &[u8; STATE_RECORD_LEN] {
        &self.0
    }

    /// Extracts `width` contiguous bits starting `offset` bits after the MSB of
    /// byte 0.
    ///
    /// Bytes are accumulated left-aligned starting at the byte holding `offset`
    /// (with the bits above the field masked off), then the excess low bits are
    /// shifted out.
    ///
    /// # Errors
    /// - [`FieldError::UnsupportedWidth`] - `width` is 0 or larger than 32
    /// - [`FieldError::OutOfRange`] - the bit range extends past the record
    pub fn extract_bits(&self, offset: u16, width: u8) -> Result<u32, FieldError> {
        check_range(offset, width)?;

        let first_byte = offset as usize / 8;
        let leading_bits = 8 - (offset as usize % 8);
        let width = width as usize;

        let mut value: u64 = u64::from(self.0[first_byte]) & ((1u64 << leading_bits) - 1);
        let mut accumulated = leading_bits;
        let mut byte = first_byte + 1;
        while accumulated < width {
            value = (value << 8) | u64::from(self.0[byte]);
            accumulated += 8;
            byte += 1;
        }

        Ok((value >> (accumulated - width)) as u32)
    }

    /// Returns a copy of this record with `value` written into the given bit
    /// range. Bits of `value` above `width` are ignored.
    ///
    /// # Errors
    /// Same conditions as [`extract_bits`](Self::extract_bits).
    pub fn with_bits(mut self, offset: u16, width: u8, value: u32) -> Result<Self, FieldError> {
        check_range(offset, width)?;
        for bit in 0..width as usize {
            let position = offset as usize + bit;
            let source = (width as usize) - 1 - bit;
            let set = (value >> source) & 1 == 1;
            let mask = 0x80u8 >> (position % 8);
            if set {
                self.0[position / 8] |= mask;
            } else {
                self.0[position / 8] &= !mask;
            }
        }
        Ok(self)
    }

    /// The 50-bit time-tick counter held in bytes 1..=7.
    pub fn time_ticks(&self) -> TimeTicks {
        let b = |i: usize| u64::from(self.0[i]);
        let ticks = ((b(7) & 0xFE) >> 1)
            | (b(6) << 7)
            | (b(5) << 15)
            | (b(4) << 23)
            | (b(3) << 31)
            | (b(2) << 39)
            | ((b(1) & 0x07) << 47);
        TimeTicks::new(ticks)
    }

    /// Returns a copy of this record with the time-tick counter set to `ticks`
    /// (truncated to 50 bits). Other bits of bytes 1 and 7 are preserved.
    pub fn with_time_ticks(mut self, ticks: TimeTicks) -> Self {
        let t = ticks.value();
        self.0[1] = (self.0[1] & !0x07) | ((t >> 47) & 0x07) as u8;
        self.0[2] = (t >> 39) as u8;
        self.0[3] = (t >> 31) as u8;
        self.0[4] = (t >> 23) as u8;
        self.0[5] = (t >> 15) as u8;
        self.0[6] = (t >> 7) as u8;
        self.0[7] = (self.0[7] & 0x01) | (((t & 0x7F) as u8) << 1);
        self
    }
}

fn check_range(offset: u16, width: u8) -> Result<(), FieldError> {
    if width == 0 || width > 32 {
        return Err(FieldError::UnsupportedWidth(width));
    }
    if offset as usize + width as usize > RECORD_BITS {
        return Err(FieldError::OutOfRange {
            offset,
            width,
            record_bits: RECORD_BITS,
        });
    }
    Ok(())
}

impl From<[u8; STATE_RECORD_LEN]> for StateRecord {
    fn from(bytes: [u8; STATE_RECORD_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for StateRecord {
    type Error = FieldError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let array: [u8; STATE_RECORD_LEN] =
            bytes.try_into().map_err(|_| FieldError::MalformedRecord {
                expected: STATE_RECORD_LEN,
                got: bytes.len(),
            })?;
        Ok(Self(array))
    }
}

/// A contiguous capture buffer holding back-to-back state records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    data: Bytes,
}

impl Capture {
    /// Wraps a capture buffer.
    ///
    /// # Errors
    /// - [`FieldError::MalformedRecord`] - the buffer ends in a partial record
    pub fn new(data: Bytes) -> Result<Self, FieldError> {
        let trailing = data.len() % STATE_RECORD_LEN;
        if trailing != 0 {
            return Err(FieldError::MalformedRecord {
                expected: STATE_RECORD_LEN,
                got: trailing,
            });
        }
        Ok(Self { data })
    }

    /// Builds a capture from already decoded records.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a StateRecord>) -> Self {
        let mut buffer = Vec::new();
        for record in records {
            buffer.extend_from_slice(record.as_bytes());
        }
        Self {
            data: Bytes::from(buffer),
        }
    }

    /// Number of records in the capture.
    pub fn len(&self) -> usize {
        self.data.len() / STATE_RECORD_LEN
    }

    /// Whether the capture holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterates the records in capture order.
    pub fn records(&self) -> impl Iterator<Item = StateRecord> + '_ {
        self.data.chunks_exact(STATE_RECORD_LEN).map(|chunk| {
            let mut bytes = [0u8; STATE_RECORD_LEN];
            bytes.copy_from_slice(chunk);
            StateRecord(bytes)
        })
    }
}
