//! Pixel data immediately follows BE.
//!
//! The state after a blanking end opens the active video segment and must be
//! a pixel state carrying data symbols on every active lane. A blanking start
//! in its place is an empty segment and is accepted.

use crate::catalog::CheckerKind;
use crate::checkers::lane_label;
use crate::config::LinkConfig;
use crate::error::{CheckerError, ConfigError};
use crate::event::EventCategory;
use crate::ledger::ErrorLedger;
use crate::symbol::ControlSymbol;
use crate::traits::{Checker, StateView};

#[derive(Debug, Default)]
pub struct FirstPixelChecker {
    after_blanking_end: bool,
    segments: u64,
}

impl FirstPixelChecker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Checker for FirstPixelChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::FirstPixelPlacement
    }

    fn reset(&mut self, _config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self::default();
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let category = state.event()?;

        if self.after_blanking_end {
            self.after_blanking_end = false;
            if matches!(
                category,
                EventCategory::BlankingStart(_) | EventCategory::ScramblerReset(_)
            ) {
                return Ok(());
            }
            let lanes = state.lanes()?;
            let offending = if category.is_pixel() {
                lanes
                    .as_slice()
                    .iter()
                    .position(|value| ControlSymbol::from_lane(*value).is_some())
            } else {
                Some(0)
            };
            if let Some(lane) = offending {
                log::trace!("Active segment at {} opens with {category:?}", state.index());
                ledger.report(format!(
                    "{} - Invalid Start-of Active Video Segment",
                    lane_label(lane)
                ));
            }
            return Ok(());
        }

        if category.is_blanking_end() {
            self.after_blanking_end = true;
            self.segments += 1;
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        vec![format!(
            "Number Of Active Video Segments Encountered: {}",
            self.segments
        )]
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies pixel data immediately follows BE control characters.",
            "  ",
            " This test tests all active data lanes.",
            " ",
            " This test does not evaluate the pixel value(s).",
        ]
    }
}
