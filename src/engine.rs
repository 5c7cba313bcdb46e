//! The validation engine.
//!
//! [`ValidationEngine`] fans every captured state out to a set of registered
//! [`CheckerRun`]s sharing one configuration and one set of decoders, and
//! collects their violations tagged with the rule and state that raised them.
//!
//! The engine owns the state numbering: the first state fed after creation or
//! [`ValidationEngine::reconfigure`] is state 0. Rules never see each other's
//! state; a rule that fails on one state only affects its own summary.

use std::sync::Arc;

use crate::catalog::{CheckerKind, TestGroup};
use crate::config::LinkConfig;
use crate::error::DpCheckError;
use crate::event::EventClassifier;
use crate::field::{FieldAccessor, FieldLayout};
use crate::harness::CheckerRun;
use crate::record::{Capture, StateRecord};
use crate::types::StateIndex;

/// A violation raised by one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Rule that raised the violation.
    pub kind: CheckerKind,
    /// Engine-wide index of the offending state.
    pub state: StateIndex,
    /// Message as it appears in the rule's ledger.
    pub message: String,
}

/// Runs several checkers over the same capture.
///
/// Every registered rule receives every state, in registration order. Rules
/// share the engine's [`LinkConfig`], field accessor and event classifier, so
/// a custom decoder set applies to all of them at once.
///
/// ## Usage
///
/// 1. Create an engine with [`ValidationEngine::new`]
/// 2. Register rules with [`register`] or [`register_group`]
/// 3. Feed states with [`process_state`] or a whole [`Capture`] with
///    [`process_capture`]
/// 4. Read the per-rule [`summaries`]
///
/// [`register`]: Self::register
/// [`register_group`]: Self::register_group
/// [`process_state`]: Self::process_state
/// [`process_capture`]: Self::process_capture
/// [`summaries`]: Self::summaries
#[derive(Debug)]
pub struct ValidationEngine {
    /// Configuration every registered rule was initialized with.
    config: LinkConfig,
    /// Field accessor shared by all runs.
    fields: Arc<dyn FieldAccessor>,
    /// Pre-classified event table shared by all runs.
    events: Arc<EventClassifier>,
    /// Registered rules in registration order.
    runs: Vec<CheckerRun>,
    /// Index the next fed state will carry.
    next_state: StateIndex,
}

impl ValidationEngine {
    /// Creates an engine using the SST field layout and event code table.
    ///
    /// The engine starts without rules; register them with [`register`] or
    /// [`register_group`] before feeding states.
    ///
    /// # Parameters
    /// - `config`: Link width, optional speed and error cap for every rule
    ///
    /// [`register`]: Self::register
    /// [`register_group`]: Self::register_group
    pub fn new(config: LinkConfig) -> Self {
        Self::with_decoders(
            config,
            Arc::new(FieldLayout::sst()),
            Arc::new(EventClassifier::sst()),
        )
    }

    /// Creates an engine with host-provided decoders.
    ///
    /// Use this for analyzers whose record layout or event code table differs
    /// from the SST defaults, e.g. [`EventClassifier::mst`] for MST listings.
    ///
    /// # Parameters
    /// - `config`: Link width, optional speed and error cap for every rule
    /// - `fields`: Accessor resolving lane and packet fields of a record
    /// - `events`: Classifier resolving event codes to categories
    pub fn with_decoders(
        config: LinkConfig,
        fields: Arc<dyn FieldAccessor>,
        events: Arc<EventClassifier>,
    ) -> Self {
        Self {
            config,
            fields,
            events,
            runs: Vec::new(),
            next_state: StateIndex::new(0),
        }
    }

    /// Registers a rule.
    ///
    /// The rule is created through [`CheckerKind::create_checker`] and
    /// initialized with the engine configuration immediately, so a rule that
    /// needs a parameter the configuration lacks is rejected here rather than
    /// while processing.
    ///
    /// # Parameters
    /// - `kind`: Rule to register
    ///
    /// # Errors
    /// - [`DpCheckError::AlreadyRegistered`] - the rule is already registered
    /// - [`DpCheckError::Config`] - the rule rejects the engine configuration
    pub fn register(&mut self, kind: CheckerKind) -> Result<(), DpCheckError> {
        if self.runs.iter().any(|run| run.kind() == kind) {
            return Err(DpCheckError::AlreadyRegistered(kind.to_string()));
        }
        let run = CheckerRun::with_decoders(
            kind.create_checker(),
            Arc::clone(&self.fields),
            Arc::clone(&self.events),
            &self.config,
        )?;
        self.runs.push(run);
        Ok(())
    }

    /// Registers every rule of `group` that is not registered yet.
    ///
    /// Rules already registered individually are skipped silently. Rules
    /// registered before a failing one stay registered.
    ///
    /// # Errors
    /// - [`DpCheckError::Config`] - a rule rejects the engine configuration
    pub fn register_group(&mut self, group: TestGroup) -> Result<(), DpCheckError> {
        for kind in CheckerKind::in_group(group) {
            match self.register(kind) {
                Ok(()) | Err(DpCheckError::AlreadyRegistered(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Registered rules in registration order.
    pub fn registered(&self) -> Vec<CheckerKind> {
        self.runs.iter().map(CheckerRun::kind).collect()
    }

    /// Feeds one state to every registered rule.
    ///
    /// # Parameters
    /// - `record`: The next captured state
    ///
    /// # Returns
    /// The violations raised on this state, grouped by rule in registration
    /// order. Rules that have reached their error cap contribute nothing.
    pub fn process_state(&mut self, record: &StateRecord) -> Vec<Finding> {
        let state = self.next_state;
        self.next_state = state + 1;
        let mut findings = Vec::new();
        for run in &mut self.runs {
            let kind = run.kind();
            findings.extend(run.process_state(record).into_iter().map(|message| Finding {
                kind,
                state,
                message,
            }));
        }
        findings
    }

    /// Feeds every state of `capture` in order.
    ///
    /// # Returns
    /// All violations raised across the capture, in state order.
    pub fn process_capture(&mut self, capture: &Capture) -> Vec<Finding> {
        let mut findings = Vec::new();
        for record in capture.records() {
            findings.extend(self.process_state(&record));
        }
        log::debug!(
            "Processed {} states through {} checkers: {} findings",
            capture.len(),
            self.runs.len(),
            findings.len()
        );
        findings
    }

    /// Summary of every registered rule.
    ///
    /// See [`CheckerRun::results_summary`] for the line layout.
    pub fn summaries(&self) -> Vec<(CheckerKind, Vec<String>)> {
        self.runs
            .iter()
            .map(|run| (run.kind(), run.results_summary()))
            .collect()
    }

    /// The run of a registered rule, for counters and descriptions.
    pub fn run(&self, kind: CheckerKind) -> Option<&CheckerRun> {
        self.runs.iter().find(|run| run.kind() == kind)
    }

    /// Whether every registered rule passed.
    pub fn all_passed(&self) -> bool {
        self.runs.iter().all(CheckerRun::passed)
    }

    /// Restarts every registered rule with a new configuration.
    ///
    /// All counters and ledgers are cleared and state numbering restarts at
    /// 0. Registration is kept.
    ///
    /// # Parameters
    /// - `config`: Configuration for the next capture
    ///
    /// # Errors
    /// - [`DpCheckError::Config`] - a rule rejects `config`
    pub fn reconfigure(&mut self, config: LinkConfig) -> Result<(), DpCheckError> {
        self.config = config;
        self.next_state = StateIndex::new(0);
        for run in &mut self.runs {
            run.initialize(&config)?;
        }
        Ok(())
    }
}
