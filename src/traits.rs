//! Core checker traits.
//!
//! Every conformance rule is a [`Checker`]: a state machine owning its own
//! bookkeeping, fed one [`StateView`] at a time by the
//! [`CheckerRun`](crate::harness::CheckerRun) harness. The view bundles the raw
//! record with the shared field accessor and event classifier so rules never
//! parse names or offsets themselves.

use std::fmt::Debug;

use crate::catalog::CheckerKind;
use crate::config::{LinkConfig, LinkWidth};
use crate::error::{CheckerError, ConfigError, FieldError};
use crate::event::{EventCategory, EventClassifier};
use crate::field::{EVENT_CODE_FIELD, FieldAccessor, LaneValues};
use crate::ledger::ErrorLedger;
use crate::record::StateRecord;
use crate::types::{StateIndex, TimeTicks};

/// Read-only view of one state as seen by the checkers.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    record: &'a StateRecord,
    index: StateIndex,
    width: LinkWidth,
    fields: &'a dyn FieldAccessor,
    events: &'a EventClassifier,
}

impl<'a> StateView<'a> {
    pub fn new(
        record: &'a StateRecord,
        index: StateIndex,
        width: LinkWidth,
        fields: &'a dyn FieldAccessor,
        events: &'a EventClassifier,
    ) -> Self {
        Self {
            record,
            index,
            width,
            fields,
            events,
        }
    }

    pub fn record(&self) -> &'a StateRecord {
        self.record
    }

    /// Position of this state in the capture.
    pub fn index(&self) -> StateIndex {
        self.index
    }

    pub fn width(&self) -> LinkWidth {
        self.width
    }

    /// Symbol values of the active lanes.
    ///
    /// # Errors
    /// Propagates the field accessor's lookup failure.
    pub fn lanes(&self) -> Result<LaneValues, FieldError> {
        self.fields.lane_values(self.record, self.width)
    }

    /// Symbol value of a single lane.
    ///
    /// # Errors
    /// - [`FieldError::InactiveLane`] - `lane` is not active
    pub fn lane(&self, lane: usize) -> Result<u16, FieldError> {
        if lane >= self.width.lanes() {
            return Err(FieldError::InactiveLane {
                lane,
                width: self.width.lanes(),
            });
        }
        Ok(self
            .fields
            .field(self.record, &crate::field::lane_field_name(lane))? as u16)
    }

    /// Named field lookup for rules that need more than lanes and events.
    pub fn field(&self, name: &str) -> Result<u32, FieldError> {
        self.fields.field(self.record, name)
    }

    pub fn event_code(&self) -> Result<u32, FieldError> {
        self.fields.field(self.record, EVENT_CODE_FIELD)
    }

    pub fn event(&self) -> Result<EventCategory, FieldError> {
        Ok(self.events.category(self.event_code()?))
    }

    pub fn event_name(&self) -> Result<&'a str, FieldError> {
        Ok(self.events.name(self.event_code()?))
    }

    pub fn ticks(&self) -> TimeTicks {
        self.record.time_ticks()
    }
}

/// A single conformance rule.
pub trait Checker: Send + Debug {
    /// Catalog entry implemented by this checker.
    fn kind(&self) -> CheckerKind;

    /// Clears all state ahead of a new run.
    ///
    /// # Errors
    /// - [`ConfigError`] - the configuration lacks something this rule needs
    fn reset(&mut self, config: &LinkConfig) -> Result<(), ConfigError>;

    /// Advances the state machine by one state, reporting violations into
    /// `ledger`.
    ///
    /// # Errors
    /// - [`CheckerError`] - the state could not be processed; the harness
    ///   records it and continues with the next state
    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger)
    -> Result<(), CheckerError>;

    /// Rule-specific summary lines, placed between the processed-state count
    /// and the test status.
    fn counters(&self) -> Vec<String>;

    /// Status line shown when the rule failed.
    fn fail_status(&self) -> &'static str {
        "Failed: Errors Encountered"
    }

    /// Human-readable description of the rule.
    fn description(&self) -> &'static [&'static str];
}
