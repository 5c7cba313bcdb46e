//! SS / SE delimiting of secondary data packets.
//!
//! Every SDP opens with one SS and closes with one SE; an MSA opens with two
//! consecutive SS. Delimiters are tracked per lane. The event code is the
//! packet boundary oracle: when it changes while a lane has seen only one side
//! of the pair, the delimiter is missing.

use crate::catalog::CheckerKind;
use crate::config::{LinkConfig, LinkWidth};
use crate::constants::MAX_LANES;
use crate::error::{CheckerError, ConfigError};
use crate::ledger::ErrorLedger;
use crate::symbol::ControlSymbol;
use crate::traits::{Checker, StateView};
use crate::types::StateIndex;

#[derive(Debug, Clone, Copy, Default)]
struct LaneDelimiters {
    ss_count: u32,
    first_ss: Option<StateIndex>,
    se_count: u32,
    in_msa: bool,
}

impl LaneDelimiters {
    fn on_ss(&mut self, index: StateIndex) -> Option<&'static str> {
        self.ss_count = self.ss_count.saturating_add(1);
        match self.ss_count {
            1 => {
                self.first_ss = Some(index);
                None
            }
            2 if self.first_ss.and_then(|first| index.since(first)) == Some(1) => {
                self.in_msa = true;
                None
            }
            2 => Some("Multiple SS Symbols"),
            _ => Some("Three or more SS Symbols"),
        }
    }

    /// Counts the SE; `Ok(true)` when it closes a well-formed packet.
    fn on_se(&mut self) -> Result<bool, &'static str> {
        self.se_count = self.se_count.saturating_add(1);
        let result = match (self.in_msa, self.ss_count, self.se_count) {
            (false, 1, 1) | (true, 2, 1) => Ok(true),
            (false, _, _) => Err("Invalid Number of SS and/or SE Symbols"),
            (true, _, _) => Err("Invalid Number of MSA SS/SE Symbols"),
        };
        *self = Self::default();
        result
    }

    fn half_open(&self) -> bool {
        (self.ss_count == 0) != (self.se_count == 0)
    }
}

#[derive(Debug, Default)]
pub struct SdpDelimiterChecker {
    width: LinkWidth,
    lanes: [LaneDelimiters; MAX_LANES],
    /// Event code of the previous state, to spot packets of a new kind.
    previous_event: Option<u32>,
    /// Set after an error until the event code next changes.
    inhibit: bool,
    /// Closed packets per event name, in first-seen order.
    packets: Vec<(String, u64)>,
}

impl SdpDelimiterChecker {
    pub fn new() -> Self {
        Self::default()
    }

    fn count_packet(&mut self, name: &str) {
        match self.packets.iter_mut().find(|(known, _)| known == name) {
            Some((_, count)) => *count += 1,
            None => self.packets.push((name.to_string(), 1)),
        }
    }

    fn fail(&mut self, ledger: &mut ErrorLedger, message: &'static str) {
        ledger.report(message);
        self.inhibit = true;
    }
}

impl Checker for SdpDelimiterChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::SdpDelimiters
    }

    fn reset(&mut self, config: &LinkConfig) -> Result<(), ConfigError> {
        *self = Self {
            width: config.width,
            ..Self::default()
        };
        Ok(())
    }

    fn step(&mut self, state: &StateView<'_>, ledger: &mut ErrorLedger) -> Result<(), CheckerError> {
        let lanes = state.lanes()?;
        let event = state.event_code()?;
        let event_changed = self.previous_event.is_some_and(|previous| previous != event);
        self.previous_event = Some(event);

        for lane in 0..self.width.lanes() {
            match ControlSymbol::from_lane(lanes.get(lane)?) {
                Some(ControlSymbol::Ss) => {
                    if let Some(message) = self.lanes[lane].on_ss(state.index()) {
                        self.fail(ledger, message);
                    }
                }
                Some(ControlSymbol::Se) => {
                    if self.inhibit {
                        self.lanes[lane] = LaneDelimiters::default();
                        continue;
                    }
                    match self.lanes[lane].on_se() {
                        Ok(true) if lane == 0 => self.count_packet(state.event_name()?),
                        Ok(_) => {}
                        Err(message) => self.fail(ledger, message),
                    }
                }
                _ if event_changed => {
                    if !self.inhibit && self.lanes[lane].half_open() {
                        self.fail(ledger, "Missing SS or SE Symbol");
                    }
                    if lane == self.width.last_lane() {
                        if self.inhibit {
                            log::debug!("SDP delimiter tracking resynced at {}", state.index());
                        }
                        self.inhibit = false;
                        self.lanes = [LaneDelimiters::default(); MAX_LANES];
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn counters(&self) -> Vec<String> {
        self.packets
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect()
    }

    fn description(&self) -> &'static [&'static str] {
        &[
            " This test verifies that all the SDP packets begin with an",
            " SS control character and end with an SE control character.",
            " ",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{all_lanes, drive, run};
    use crate::constants::{SYMBOL_BS, SYMBOL_SE, SYMBOL_SS};
    use crate::record::StateRecord;

    fn packet(width: LinkWidth, event: &str, leading_ss: usize, data: usize) -> Vec<StateRecord> {
        let mut records = vec![all_lanes(SYMBOL_BS, width, "Hor. BS")];
        records.extend((0..leading_ss).map(|_| all_lanes(SYMBOL_SS, width, event)));
        records.extend((0..data).map(|i| all_lanes(i as u16, width, event)));
        records.push(all_lanes(SYMBOL_SE, width, event));
        records.push(all_lanes(0x000, width, "F0 Pixel"));
        records
    }

    #[test]
    fn well_formed_packets_are_counted_by_name() {
        let width = LinkWidth::Four;
        let mut run = run(CheckerKind::SdpDelimiters, LinkConfig::new(width));
        let mut records = packet(width, "Audio TS", 1, 8);
        records.extend(packet(width, "MSA", 2, 9));
        records.extend(packet(width, "Audio TS", 1, 8));
        assert!(drive(&mut run, &records).is_empty());
        let summary = run.results_summary();
        assert_eq!(summary[1], "Audio TS: 2");
        assert_eq!(summary[2], "MSA: 1");
    }

    #[test]
    fn missing_se_is_detected_on_event_change() {
        let width = LinkWidth::One;
        let mut run = run(CheckerKind::SdpDelimiters, LinkConfig::new(width));
        let mut records = packet(width, "Audio TS", 1, 4);
        records.remove(records.len() - 2);
        assert_eq!(drive(&mut run, &records), vec!["Missing SS or SE Symbol"]);
    }

    #[test]
    fn late_second_ss_then_resync() {
        let width = LinkWidth::Two;
        let mut run = run(CheckerKind::SdpDelimiters, LinkConfig::new(width));
        let mut records = vec![
            all_lanes(SYMBOL_SS, width, "Audio Stream"),
            all_lanes(0x011, width, "Audio Stream"),
            all_lanes(SYMBOL_SS, width, "Audio Stream"),
            all_lanes(SYMBOL_SE, width, "Audio Stream"),
            all_lanes(0x000, width, "F0 Pixel"),
        ];
        records.extend(packet(width, "Audio Stream", 1, 4));
        let messages = drive(&mut run, &records);
        assert_eq!(messages, vec!["Multiple SS Symbols", "Multiple SS Symbols"]);
        assert_eq!(run.results_summary()[1], "Audio Stream: 1");
    }
}
