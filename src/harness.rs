//! Per-checker run harness.
//!
//! [`CheckerRun`] drives one [`Checker`] across a capture. It owns the error
//! ledger, counts processed states, turns per-state [`CheckerError`]s into
//! "Processing Error" messages and renders the host-facing summary.

use std::sync::Arc;

use crate::catalog::CheckerKind;
use crate::config::LinkConfig;
use crate::error::{CheckerError, ConfigError};
use crate::event::EventClassifier;
use crate::field::{FieldAccessor, FieldLayout};
use crate::ledger::{ErrorLedger, format_count};
use crate::record::StateRecord;
use crate::traits::{Checker, StateView};
use crate::types::StateIndex;

/// One checker bound to a configuration and the shared decoders.
#[derive(Debug)]
pub struct CheckerRun {
    checker: Box<dyn Checker>,
    fields: Arc<dyn FieldAccessor>,
    events: Arc<EventClassifier>,
    config: LinkConfig,
    ledger: ErrorLedger,
    states_processed: u64,
    processing_errors: u64,
}

impl CheckerRun {
    /// Creates and initializes a run using the SST field layout and event
    /// code table.
    ///
    /// # Errors
    /// - [`ConfigError`] - the rule rejects `config`
    pub fn new(kind: CheckerKind, config: &LinkConfig) -> Result<Self, ConfigError> {
        Self::with_decoders(
            kind.create_checker(),
            Arc::new(FieldLayout::sst()),
            Arc::new(EventClassifier::sst()),
            config,
        )
    }

    /// Creates and initializes a run with host-provided decoders.
    ///
    /// # Errors
    /// - [`ConfigError`] - the rule rejects `config`
    pub fn with_decoders(
        checker: Box<dyn Checker>,
        fields: Arc<dyn FieldAccessor>,
        events: Arc<EventClassifier>,
        config: &LinkConfig,
    ) -> Result<Self, ConfigError> {
        let mut run = Self {
            checker,
            fields,
            events,
            config: *config,
            ledger: ErrorLedger::new(config.max_reported_errors),
            states_processed: 0,
            processing_errors: 0,
        };
        run.initialize(config)?;
        Ok(run)
    }

    /// Resets every counter and the checker's state for a new run.
    ///
    /// # Errors
    /// - [`ConfigError`] - the rule rejects `config`
    pub fn initialize(&mut self, config: &LinkConfig) -> Result<(), ConfigError> {
        self.config = *config;
        self.ledger.reset(config.max_reported_errors);
        self.states_processed = 0;
        self.processing_errors = 0;
        self.checker.reset(config)?;
        log::debug!(
            "Initialized {} (width {}, cap {})",
            self.checker.kind(),
            config.width,
            config.max_reported_errors
        );
        Ok(())
    }

    /// Feeds the next state and returns the violations it produced.
    pub fn process_state(&mut self, record: &StateRecord) -> Vec<String> {
        let index = StateIndex::new(self.states_processed);
        self.states_processed += 1;

        if self.ledger.is_saturated() {
            return Vec::new();
        }

        let view = StateView::new(
            record,
            index,
            self.config.width,
            self.fields.as_ref(),
            self.events.as_ref(),
        );
        if let Err(err) = self.checker.step(&view, &mut self.ledger) {
            self.record_processing_error(index, &err);
        }
        self.ledger.take_messages()
    }

    /// Feeds a raw state; input that is not exactly one record yields a
    /// processing error message.
    pub fn process_bytes(&mut self, bytes: &[u8]) -> Vec<String> {
        match StateRecord::try_from(bytes) {
            Ok(record) => self.process_state(&record),
            Err(err) => {
                let index = StateIndex::new(self.states_processed);
                self.states_processed += 1;
                self.record_processing_error(index, &CheckerError::from(err));
                self.ledger.take_messages()
            }
        }
    }

    fn record_processing_error(&mut self, index: StateIndex, err: &CheckerError) {
        log::error!("{}: state {index}: {err}", self.checker.kind());
        self.processing_errors += 1;
        self.ledger.note(format!("Processing Error: {err}"));
    }

    pub fn kind(&self) -> CheckerKind {
        self.checker.kind()
    }

    pub fn states_processed(&self) -> u64 {
        self.states_processed
    }

    pub fn error_count(&self) -> u32 {
        self.ledger.error_count()
    }

    pub fn processing_errors(&self) -> u64 {
        self.processing_errors
    }

    /// Whether no violation and no processing error has been seen.
    pub fn passed(&self) -> bool {
        self.ledger.error_count() == 0 && self.processing_errors == 0
    }

    /// Host-facing summary: processed states, rule counters and test status.
    pub fn results_summary(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "Number Of States Processed: {}",
            format_count(self.states_processed)
        )];
        lines.extend(self.checker.counters());
        if self.processing_errors > 0 {
            lines.push(format!("Processing Errors: {}", self.processing_errors));
        }
        lines.push("Test Status:".to_string());
        if self.passed() {
            lines.push("  Passed: No errors were encountered.".to_string());
        } else {
            lines.push(format!("  {}", self.checker.fail_status()));
        }
        lines
    }

    pub fn results_detailed(&self) -> Vec<String> {
        vec!["None".to_string()]
    }

    pub fn description(&self) -> Vec<String> {
        self.checker
            .description()
            .iter()
            .map(|line| (*line).to_string())
            .collect()
    }
}
