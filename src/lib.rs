//! `dplinkcheck`: DisplayPort main-link conformance checking over captured link states.
//!
//! This library evaluates streams of 16-byte analyzer states captured from a
//! DisplayPort main link against a catalog of link-layer rules covering
//! blanking framing, secondary data packets, active video and audio timing.
//! The primary entry point is the [`ValidationEngine`].
//!
//! ## Core Concepts
//!
//! - **[`StateRecord`]**: One captured state. Lane symbols, the event code and
//!   the time tick counter are bit fields addressed through a [`FieldLayout`].
//! - **[`Checker`]**: A rule state machine fed one state at a time. Each rule
//!   is wrapped in a [`CheckerRun`] which counts states, caps the reported
//!   violations and formats the results summary.
//! - **[`ValidationEngine`]**: Fans a capture out to any number of registered
//!   rules sharing one [`LinkConfig`].
//!
//! ## Quick Start
//!
//! ```rust
//! use dplinkcheck::{CheckerKind, LinkConfig, LinkWidth, StateRecord, TimeTicks, ValidationEngine};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = ValidationEngine::new(LinkConfig::new(LinkWidth::Four));
//!     engine.register(CheckerKind::TimeTicks)?;
//!
//!     let mut findings = Vec::new();
//!     for ticks in [100, 101, 103] {
//!         let record = StateRecord::default().with_time_ticks(TimeTicks::new(ticks));
//!         findings.extend(engine.process_state(&record));
//!     }
//!
//!     assert_eq!(findings.len(), 1);
//!     assert_eq!(findings[0].message, "Time Tick Error");
//!     for (kind, summary) in engine.summaries() {
//!         println!("{kind}");
//!         for line in summary {
//!             println!("{line}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Rule Groups
//!
//! - **Framing**: blanking-start sequences, SR placement, VB-ID replication,
//!   SDP and MSA delimiters, once-per-frame packets and time ticks
//! - **Video**: blank lines, Mvid checks, stuffing framing, transfer unit length
//!   and first pixel placement
//! - **Audio**: Audio TS stability and the audio sample delivery rate

pub mod catalog;
pub mod checkers;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod event;
pub mod field;
pub mod harness;
pub mod layout;
pub mod ledger;
pub mod record;
pub mod symbol;
pub mod traits;
pub mod types;

pub use catalog::{CheckerKind, TestGroup, catalog};
pub use config::{LinkConfig, LinkSpeed, LinkWidth};
pub use engine::{Finding, ValidationEngine};
pub use error::{CheckerError, ConfigError, DpCheckError, FieldError};
pub use event::{EventCategory, EventClassifier, EventCodeNames, EventCodeTable};
pub use field::{FieldAccessor, FieldLayout, FieldSpec, LaneValues};
pub use harness::CheckerRun;
pub use record::{Capture, StateRecord};
pub use traits::{Checker, StateView};
pub use types::{StateIndex, TimeTicks};
