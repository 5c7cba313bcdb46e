//! Named field lookup over state records.
//!
//! A [`FieldLayout`] maps field names (`Lane0`, `EventCode`, ...) to bit
//! ranges inside a [`StateRecord`]. The [`FieldAccessor`] trait is the seam a
//! host can replace with its own lookup service; [`FieldLayout`] is the
//! default implementation.

use std::collections::HashMap;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::config::LinkWidth;
use crate::constants::{
    EVENT_CODE_OFFSET, EVENT_CODE_WIDTH, LANE_FIELD_BASE_OFFSET, LANE_FIELD_STRIDE,
    LANE_SYMBOL_WIDTH, MAX_LANES,
};
use crate::error::FieldError;
use crate::record::StateRecord;

/// Name of the event code field in every layout.
pub const EVENT_CODE_FIELD: &str = "EventCode";

/// Bit range of a single named field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Offset in bits from the MSB of byte 0.
    pub offset: u16,
    /// Width in bits (1..=32).
    pub width: u8,
}

impl FieldSpec {
    pub const fn new(offset: u16, width: u8) -> Self {
        Self { offset, width }
    }
}

/// Name of the symbol field of `lane`.
pub fn lane_field_name(lane: usize) -> String {
    format!("Lane{lane}")
}

/// Resolves field names to integer values for a state record.
pub trait FieldAccessor: Send + Sync + Debug {
    /// Reads the named field from `record`.
    ///
    /// # Errors
    /// - [`FieldError::UnknownField`] - the name is not part of the layout
    /// - [`FieldError::OutOfRange`] / [`FieldError::UnsupportedWidth`] - the
    ///   layout entry does not describe a valid bit range
    fn field(&self, record: &StateRecord, name: &str) -> Result<u32, FieldError>;

    /// Reads the symbol value of every lane active at `width`.
    ///
    /// # Errors
    /// Propagates the first lane lookup failure.
    fn lane_values(&self, record: &StateRecord, width: LinkWidth) -> Result<LaneValues, FieldError> {
        let mut values = [0u16; MAX_LANES];
        for (lane, slot) in values.iter_mut().enumerate().take(width.lanes()) {
            *slot = self.field(record, &lane_field_name(lane))? as u16;
        }
        Ok(LaneValues { values, width })
    }
}

/// Symbol values (K flag | data byte) of the active lanes of one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneValues {
    values: [u16; MAX_LANES],
    width: LinkWidth,
}

impl LaneValues {
    /// Builds lane values directly; entries beyond `width` are ignored.
    pub fn new(values: [u16; MAX_LANES], width: LinkWidth) -> Self {
        let mut values = values;
        for slot in values.iter_mut().skip(width.lanes()) {
            *slot = 0;
        }
        Self { values, width }
    }

    /// Value of `lane`.
    ///
    /// # Errors
    /// - [`FieldError::InactiveLane`] - `lane` is beyond the link width
    pub fn get(&self, lane: usize) -> Result<u16, FieldError> {
        if lane >= self.width.lanes() {
            return Err(FieldError::InactiveLane {
                lane,
                width: self.width.lanes(),
            });
        }
        Ok(self.values[lane])
    }

    /// Value of lane 0, which is always active.
    pub fn lane0(&self) -> u16 {
        self.values[0]
    }

    /// Values of the active lanes.
    pub fn as_slice(&self) -> &[u16] {
        &self.values[..self.width.lanes()]
    }

    pub fn width(&self) -> LinkWidth {
        self.width
    }
}

/// Table-driven field layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldLayout {
    fields: HashMap<String, FieldSpec>,
}

impl FieldLayout {
    /// Creates a layout from explicit entries.
    pub fn new(fields: HashMap<String, FieldSpec>) -> Self {
        Self { fields }
    }

    /// The SST main-link layout: four lane symbols, their INV flags and the
    /// event code.
    pub fn sst() -> Self {
        let mut fields = HashMap::new();
        for lane in 0..MAX_LANES {
            let inv_offset = LANE_FIELD_BASE_OFFSET + LANE_FIELD_STRIDE * lane as u16;
            fields.insert(format!("Lane{lane}Inv"), FieldSpec::new(inv_offset, 1));
            fields.insert(
                lane_field_name(lane),
                FieldSpec::new(inv_offset + 1, LANE_SYMBOL_WIDTH),
            );
        }
        fields.insert(
            EVENT_CODE_FIELD.to_string(),
            FieldSpec::new(EVENT_CODE_OFFSET, EVENT_CODE_WIDTH),
        );
        Self { fields }
    }

    /// Adds or replaces a field entry.
    pub fn insert(&mut self, name: impl Into<String>, spec: FieldSpec) -> Option<FieldSpec> {
        self.fields.insert(name.into(), spec)
    }

    pub fn get(&self, name: &str) -> Option<FieldSpec> {
        self.fields.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Default for FieldLayout {
    fn default() -> Self {
        Self::sst()
    }
}

impl FieldAccessor for FieldLayout {
    fn field(&self, record: &StateRecord, name: &str) -> Result<u32, FieldError> {
        let spec = self
            .fields
            .get(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;
        record.extract_bits(spec.offset, spec.width)
    }
}
