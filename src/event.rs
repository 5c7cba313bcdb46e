//! Event code naming and classification.
//!
//! The analyzer tags every state with a 6-bit event code. Names such as
//! `"Hor. BS"` or `"F0 Pixel"` come from a host-provided table; they are
//! parsed exactly once into an [`EventCategory`] by the [`EventClassifier`]
//! and the checkers only ever match on the enum.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::EVENT_CODE_COUNT;

/// Horizontal or vertical blanking region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Blanking {
    Horizontal,
    Vertical,
}

/// Interlaced video field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoField {
    F0,
    F1,
}

/// Closed classification of an event code name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    BlankingStart(Blanking),
    ScramblerReset(Blanking),
    BlankingFill(Blanking),
    Vbid(Blanking),
    Mvid(Blanking),
    Maud(Blanking),
    BlankingEnd(Blanking),
    Pixel(VideoField),
    Stuffing(VideoField),
    InfoFrame,
    Msa,
    Sdp,
    /// MST stream fill during blanking.
    StreamFill,
    /// MST VC payload fill.
    Vcpf,
    MtpHeader,
    /// Link training pattern (TPS1-4).
    Training,
    Unknown,
}

impl EventCategory {
    /// Parses an analyzer event name.
    ///
    /// Matching is case-insensitive. A `"Ver."` prefix selects the vertical
    /// region and an `"F1"` prefix the second video field; everything else
    /// defaults to horizontal / F0. Bare symbol names such as `"BS"` (as MST
    /// listings use them) classify as horizontal.
    pub fn from_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let blanking = if upper.starts_with("VER") {
            Blanking::Vertical
        } else {
            Blanking::Horizontal
        };
        let field = if upper.starts_with("F1") {
            VideoField::F1
        } else {
            VideoField::F0
        };

        if upper.contains("INFO FRAME") {
            return Self::InfoFrame;
        }
        if upper.starts_with("MTP") {
            return Self::MtpHeader;
        }
        if upper.starts_with("TPS") {
            return Self::Training;
        }
        if upper == "VCPF" {
            return Self::Vcpf;
        }
        if upper.contains("STREAM FILL") {
            return Self::StreamFill;
        }
        if upper.ends_with("PIXEL") {
            return Self::Pixel(field);
        }
        if upper.ends_with("STUFF") || upper.ends_with("STUFFING") {
            return Self::Stuffing(field);
        }
        let bare = !upper.contains(' ');
        if bare || upper.starts_with("HOR") || upper.starts_with("VER") {
            let suffix = upper.rsplit(' ').next().unwrap_or_default();
            match suffix {
                "BS" => return Self::BlankingStart(blanking),
                "SR" => return Self::ScramblerReset(blanking),
                "BF" => return Self::BlankingFill(blanking),
                "VBID" => return Self::Vbid(blanking),
                "MVID" => return Self::Mvid(blanking),
                "MAUD" => return Self::Maud(blanking),
                "BE" => return Self::BlankingEnd(blanking),
                _ => {}
            }
        }
        if upper.contains("MSA") {
            return Self::Msa;
        }
        if upper.contains("SDP") || upper.contains("AUDIO") {
            return Self::Sdp;
        }
        Self::Unknown
    }

    /// BS, SR or BF in either blanking region.
    pub const fn is_blanking_start(self) -> bool {
        matches!(
            self,
            Self::BlankingStart(_) | Self::ScramblerReset(_) | Self::BlankingFill(_)
        )
    }

    pub const fn is_pixel(self) -> bool {
        matches!(self, Self::Pixel(_))
    }

    pub const fn is_blanking_end(self) -> bool {
        matches!(self, Self::BlankingEnd(_))
    }
}

/// Source of event code names.
pub trait EventCodeNames {
    /// Name of `code`, or `None` if the code is not defined.
    fn event_code_name(&self, code: u32) -> Option<&str>;
}

/// Serializable event code table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventCodeTable {
    names: BTreeMap<u32, String>,
}

impl EventCodeTable {
    pub fn new(names: BTreeMap<u32, String>) -> Self {
        Self { names }
    }

    /// Default SST main-link event codes.
    pub fn sst() -> Self {
        const SST: &[(u32, &str)] = &[
            (0x00, "Unknown"),
            (0x01, "Hor. BS"),
            (0x02, "Ver. BS"),
            (0x03, "Hor. SR"),
            (0x04, "Ver. SR"),
            (0x05, "Hor. BF"),
            (0x06, "Ver. BF"),
            (0x07, "Hor. VBID"),
            (0x08, "Ver. VBID"),
            (0x09, "Hor. MVID"),
            (0x0A, "Ver. MVID"),
            (0x0B, "Hor. MAUD"),
            (0x0C, "Ver. MAUD"),
            (0x0D, "Hor. BE"),
            (0x0E, "Ver. BE"),
            (0x10, "F0 Pixel"),
            (0x11, "F1 Pixel"),
            (0x12, "F0 Stuff"),
            (0x13, "F1 Stuff"),
            (0x14, "Info Frame"),
            (0x15, "MSA"),
            (0x16, "Audio TS"),
            (0x17, "Audio Stream"),
            (0x18, "Ext SDP"),
        ];
        Self {
            names: SST
                .iter()
                .map(|(code, name)| (*code, (*name).to_string()))
                .collect(),
        }
    }

    /// Default MST main-link event codes.
    ///
    /// MST listings do not separate horizontal and vertical blanking, so
    /// the blanking symbols carry bare names.
    pub fn mst() -> Self {
        const MST: &[(u32, &str)] = &[
            (0x00, "Unknown"),
            (0x01, "TPS1"),
            (0x02, "TPS2"),
            (0x03, "TPS3"),
            (0x04, "TPS4"),
            (0x07, "Uncompressed VC"),
            (0x08, "Pixel"),
            (0x09, "VBID"),
            (0x0A, "BS"),
            (0x0B, "SR"),
            (0x0C, "MVID"),
            (0x11, "MAUD"),
            (0x12, "VSC SDP"),
            (0x14, "Info Frame SDP"),
            (0x15, "BE"),
            (0x1C, "MSA"),
            (0x20, "Audio Stream SDP"),
            (0x21, "PPS SDP"),
            (0x22, "VSC EXT VESA SDP"),
            (0x24, "Audio TS SDP"),
            (0x25, "VSC EXT CEA SDP"),
            (0x29, "Camera SDP"),
            (0x2B, "Audio Copy Mgmt SDP"),
            (0x31, "MTP Header (No ACT)"),
            (0x32, "ISRC SDP"),
            (0x33, "Stream Fill"),
            (0x34, "MTP Header (Other)"),
            (0x38, "VCPF"),
            (0x3C, "Extension SDP"),
            (0x3F, "MTP Header (Zero)"),
        ];
        Self {
            names: MST
                .iter()
                .map(|(code, name)| (*code, (*name).to_string()))
                .collect(),
        }
    }

    /// Code registered under `name`, if any.
    pub fn code_of(&self, name: &str) -> Option<u32> {
        self.names
            .iter()
            .find(|(_, candidate)| candidate.as_str() == name)
            .map(|(code, _)| *code)
    }

    pub fn insert(&mut self, code: u32, name: impl Into<String>) -> Option<String> {
        self.names.insert(code, name.into())
    }
}

impl EventCodeNames for EventCodeTable {
    fn event_code_name(&self, code: u32) -> Option<&str> {
        self.names.get(&code).map(String::as_str)
    }
}

/// Pre-classified event code table shared by all checkers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventClassifier {
    entries: Vec<(String, EventCategory)>,
}

impl EventClassifier {
    /// Classifies every representable event code once.
    ///
    /// Codes the provider does not name get a generated `"Event 0xNN"` name
    /// and the [`EventCategory::Unknown`] category.
    pub fn new(names: &dyn EventCodeNames) -> Self {
        let entries = (0..EVENT_CODE_COUNT as u32)
            .map(|code| match names.event_code_name(code) {
                Some(name) => (name.to_string(), EventCategory::from_name(name)),
                None => (format!("Event 0x{code:02X}"), EventCategory::Unknown),
            })
            .collect();
        Self { entries }
    }

    pub fn sst() -> Self {
        Self::new(&EventCodeTable::sst())
    }

    pub fn mst() -> Self {
        Self::new(&EventCodeTable::mst())
    }

    pub fn category(&self, code: u32) -> EventCategory {
        self.entries
            .get(code as usize)
            .map_or(EventCategory::Unknown, |(_, category)| *category)
    }

    pub fn name(&self, code: u32) -> &str {
        self.entries
            .get(code as usize)
            .map_or("Unknown", |(name, _)| name.as_str())
    }
}

impl Default for EventClassifier {
    fn default() -> Self {
        Self::sst()
    }
}
