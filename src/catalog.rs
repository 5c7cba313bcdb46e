//! Checker catalog.
//!
//! Hosts address rules by test group and test number. [`CheckerKind`] is the
//! closed list of rules this crate implements together with their catalog
//! metadata, and the factory for the matching [`Checker`].

use std::fmt;

use crate::checkers::audio_sdp_rate::AudioSdpRateChecker;
use crate::checkers::audio_ts_variance::AudioTsVarianceChecker;
use crate::checkers::blank_line::BlankLineChecker;
use crate::checkers::bs_start::BlankingStartChecker;
use crate::checkers::first_pixel::FirstPixelChecker;
use crate::checkers::msa_delimiters::MsaDelimiterChecker;
use crate::checkers::mvid_lsbyte::MvidLsbChecker;
use crate::checkers::mvid_no_video::MvidNoVideoChecker;
use crate::checkers::once_per_frame::{FrameSdp, OncePerFrameChecker};
use crate::checkers::pixel_after_be::PixelAfterBeChecker;
use crate::checkers::sdp_delimiters::SdpDelimiterChecker;
use crate::checkers::sr_spacing::SrSpacingChecker;
use crate::checkers::state_sequence::StateSequenceChecker;
use crate::checkers::stuffing_framing::StuffingFramingChecker;
use crate::checkers::symbol_grouping::SymbolGroupingChecker;
use crate::checkers::time_ticks::TimeTickChecker;
use crate::checkers::tu_length::TransferUnitChecker;
use crate::checkers::vbid_replication::{ReplicationMode, VbidReplicationChecker};
use crate::error::DpCheckError;
use crate::traits::Checker;

/// Host-facing test group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TestGroup {
    Framing,
    Video,
    Audio,
    /// Event-code sequencing rules of the MST main-link suite.
    Mst,
}

impl TestGroup {
    pub const ALL: [TestGroup; 4] = [Self::Framing, Self::Video, Self::Audio, Self::Mst];
}

impl fmt::Display for TestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Framing => "Framing",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Mst => "MST",
        };
        f.write_str(name)
    }
}

/// Every conformance rule implemented by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckerKind {
    BlankingStartSequence,
    SrEvery512thBs,
    VbidValues,
    VbidGrouping,
    SdpDelimiters,
    MsaDelimiters,
    InfoFrameOncePerFrame,
    MsaOncePerFrame,
    TimeTicks,
    BlankLineNoPixel,
    MvidMatchesMsa,
    MvidClearedNoVideo,
    StuffingFraming,
    TransferUnitLength,
    FirstPixelPlacement,
    AudioTimestampVariance,
    AudioSampleRate,
    StateSequence,
    SymbolGrouping,
    PixelFollowsBe,
}

impl CheckerKind {
    /// All rules in catalog order.
    pub const ALL: [CheckerKind; 20] = [
        Self::BlankingStartSequence,
        Self::SrEvery512thBs,
        Self::VbidValues,
        Self::VbidGrouping,
        Self::SdpDelimiters,
        Self::MsaDelimiters,
        Self::InfoFrameOncePerFrame,
        Self::MsaOncePerFrame,
        Self::TimeTicks,
        Self::BlankLineNoPixel,
        Self::MvidMatchesMsa,
        Self::MvidClearedNoVideo,
        Self::StuffingFraming,
        Self::TransferUnitLength,
        Self::FirstPixelPlacement,
        Self::AudioTimestampVariance,
        Self::AudioSampleRate,
        Self::StateSequence,
        Self::SymbolGrouping,
        Self::PixelFollowsBe,
    ];

    pub const fn group(self) -> TestGroup {
        match self {
            Self::BlankingStartSequence
            | Self::SrEvery512thBs
            | Self::VbidValues
            | Self::VbidGrouping
            | Self::SdpDelimiters
            | Self::MsaDelimiters
            | Self::InfoFrameOncePerFrame
            | Self::MsaOncePerFrame
            | Self::TimeTicks => TestGroup::Framing,
            Self::BlankLineNoPixel
            | Self::MvidMatchesMsa
            | Self::MvidClearedNoVideo
            | Self::StuffingFraming
            | Self::TransferUnitLength
            | Self::FirstPixelPlacement => TestGroup::Video,
            Self::AudioTimestampVariance | Self::AudioSampleRate => TestGroup::Audio,
            Self::StateSequence | Self::SymbolGrouping | Self::PixelFollowsBe => TestGroup::Mst,
        }
    }

    /// Test number within the group.
    pub const fn test_number(self) -> u32 {
        match self {
            Self::BlankingStartSequence => 1,
            Self::SrEvery512thBs => 2,
            Self::VbidValues => 3,
            Self::VbidGrouping => 4,
            Self::SdpDelimiters => 5,
            Self::MsaDelimiters => 6,
            Self::InfoFrameOncePerFrame => 7,
            Self::MsaOncePerFrame => 8,
            Self::TimeTicks => 100,
            Self::BlankLineNoPixel => 1,
            Self::MvidMatchesMsa => 2,
            Self::MvidClearedNoVideo => 3,
            Self::StuffingFraming => 4,
            Self::TransferUnitLength => 5,
            Self::FirstPixelPlacement => 6,
            Self::AudioTimestampVariance => 1,
            Self::AudioSampleRate => 2,
            Self::StateSequence => 8,
            Self::SymbolGrouping => 9,
            Self::PixelFollowsBe => 11,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::BlankingStartSequence => "BS Start Symbol Sequence",
            Self::SrEvery512thBs => "SR is Every 512th BS",
            Self::VbidValues => "BS Followed By VBID",
            Self::VbidGrouping => "VB-ID Packet Sequence",
            Self::SdpDelimiters => "Secondary Data Delimiters",
            Self::MsaDelimiters => "MSA Delimiters",
            Self::InfoFrameOncePerFrame => "Info Frame Count",
            Self::MsaOncePerFrame => "MSA Count",
            Self::TimeTicks => "Time Gaps",
            Self::BlankLineNoPixel => "Blank Line",
            Self::MvidMatchesMsa => "MVID LSByte Verification",
            Self::MvidClearedNoVideo => "MVID is Set To Zero When No Video Stream",
            Self::StuffingFraming => "Active Video Stuffing Symbols Framing",
            Self::TransferUnitLength => "Active Video TU Length",
            Self::FirstPixelPlacement => "First Line Pixel Location",
            Self::AudioTimestampVariance => "Audio TS SDP Verification",
            Self::AudioSampleRate => "Audio Sample Delivery Run Rate",
            Self::StateSequence => "State Sequence",
            Self::SymbolGrouping => "BS/SR Symbol Grouping",
            Self::PixelFollowsBe => "Pixel Follows BE",
        }
    }

    /// One-line summary with the DP 1.4a section the rule enforces.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::BlankingStartSequence => {
                "Verifies all active lanes begin with the correct BS symbols (DP1.4a 2.2.1.1, 2.2.1.2)."
            }
            Self::SrEvery512thBs => "Verifies every 512th BS is an SR (DP1.4a 2.2.5.3.7).",
            Self::VbidValues => {
                "Verifies BS is followed on all lanes by VBID, MVID and MAUD (DP1.4a 2.2.1.3)."
            }
            Self::VbidGrouping => {
                "Verifies VBID, MVID and MAUD are transported four times, regardless of link width (DP1.4a 2.2.1.3)."
            }
            Self::SdpDelimiters => {
                "Verifies all secondary data packets are delimited by SS and SE (DP1.4a 2.2.5)."
            }
            Self::MsaDelimiters => "Verifies MSA packets start with two SS symbols (DP1.4a 2.2.4).",
            Self::InfoFrameOncePerFrame => {
                "Verifies Info Frame SDPs occur once per frame (DP1.4a 2.2.5.3)."
            }
            Self::MsaOncePerFrame => "Verifies MSA SDPs occur once per frame (DP1.4a 2.2.4).",
            Self::TimeTicks => "Verifies all time tick values are consecutive.",
            Self::BlankLineNoPixel => "Verifies blank lines do not contain any pixels (DP1.4a 2.1.4).",
            Self::MvidMatchesMsa => "Verifies MVID equals the MSA's Mvid LSByte (DP1.4a 2.2.4).",
            Self::MvidClearedNoVideo => {
                "Verifies Mvid is cleared to zero when no video stream is transported (DP1.4a 2.2.1.3)."
            }
            Self::StuffingFraming => {
                "Verifies active video stuffing symbols are framed with FS/FE (DP1.4a 2.2.1.4)."
            }
            Self::TransferUnitLength => {
                "Verifies active video transfer units are 32-64 link symbols per lane (DP1.4a 2.2.1.4)."
            }
            Self::FirstPixelPlacement => {
                "Verifies the first pixel of a line immediately follows BE (DP1.4a 2.2.1.4)."
            }
            Self::AudioTimestampVariance => {
                "Verifies Audio TS Maud/Naud varies by less than 5% between timestamps (DP1.4a 2.2.5.2)."
            }
            Self::AudioSampleRate => {
                "Verifies audio samples arrive within +/- 4 samples of the predicted rate (DP1.4a 2.2.5.2)."
            }
            Self::StateSequence => "Identifies unexpected state sequences.",
            Self::SymbolGrouping => {
                "Verifies BS and SR symbols are grouped into at most four consecutive states."
            }
            Self::PixelFollowsBe => "Verifies a pixel state immediately follows every BE.",
        }
    }

    /// Catalog entry in the host's `$$`-separated format.
    pub fn catalog_line(self) -> String {
        let number = self.test_number();
        format!(
            "Test Number:{number} $$ Test Name:{number}) {} $$ Description: {}",
            self.name(),
            self.summary()
        )
    }

    /// Rules belonging to `group`, in catalog order.
    pub fn in_group(group: TestGroup) -> impl Iterator<Item = CheckerKind> {
        Self::ALL.into_iter().filter(move |kind| kind.group() == group)
    }

    /// Resolves a host test number.
    ///
    /// # Errors
    /// - [`DpCheckError::UnknownTest`] - no rule has this number in `group`
    pub fn from_test_id(group: TestGroup, number: u32) -> Result<Self, DpCheckError> {
        Self::in_group(group)
            .find(|kind| kind.test_number() == number)
            .ok_or_else(|| DpCheckError::UnknownTest {
                group: group.to_string(),
                number,
            })
    }

    /// Creates a fresh checker for this rule.
    pub fn create_checker(self) -> Box<dyn Checker> {
        match self {
            Self::BlankingStartSequence => Box::new(BlankingStartChecker::new()),
            Self::SrEvery512thBs => Box::new(SrSpacingChecker::new()),
            Self::VbidValues => Box::new(VbidReplicationChecker::new(ReplicationMode::Values)),
            Self::VbidGrouping => Box::new(VbidReplicationChecker::new(ReplicationMode::Grouping)),
            Self::SdpDelimiters => Box::new(SdpDelimiterChecker::new()),
            Self::MsaDelimiters => Box::new(MsaDelimiterChecker::new()),
            Self::InfoFrameOncePerFrame => Box::new(OncePerFrameChecker::new(FrameSdp::InfoFrame)),
            Self::MsaOncePerFrame => Box::new(OncePerFrameChecker::new(FrameSdp::Msa)),
            Self::TimeTicks => Box::new(TimeTickChecker::new()),
            Self::BlankLineNoPixel => Box::new(BlankLineChecker::new()),
            Self::MvidMatchesMsa => Box::new(MvidLsbChecker::new()),
            Self::MvidClearedNoVideo => Box::new(MvidNoVideoChecker::new()),
            Self::StuffingFraming => Box::new(StuffingFramingChecker::new()),
            Self::TransferUnitLength => Box::new(TransferUnitChecker::new()),
            Self::FirstPixelPlacement => Box::new(FirstPixelChecker::new()),
            Self::AudioTimestampVariance => Box::new(AudioTsVarianceChecker::new()),
            Self::AudioSampleRate => Box::new(AudioSdpRateChecker::new()),
            Self::StateSequence => Box::new(StateSequenceChecker::new()),
            Self::SymbolGrouping => Box::new(SymbolGroupingChecker::new()),
            Self::PixelFollowsBe => Box::new(PixelAfterBeChecker::new()),
        }
    }
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.group(), self.test_number(), self.name())
    }
}

/// Catalog lines of every rule in `group`.
pub fn catalog(group: TestGroup) -> Vec<String> {
    CheckerKind::in_group(group)
        .map(CheckerKind::catalog_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_per_group() {
        for kind in CheckerKind::ALL {
            assert_eq!(
                CheckerKind::from_test_id(kind.group(), kind.test_number()),
                Ok(kind)
            );
        }
    }

    #[test]
    fn unknown_test_id() {
        assert_eq!(
            CheckerKind::from_test_id(TestGroup::Audio, 3),
            Err(DpCheckError::UnknownTest {
                group: "Audio".into(),
                number: 3
            })
        );
    }

    #[test]
    fn catalog_line_format() {
        assert_eq!(
            CheckerKind::TimeTicks.catalog_line(),
            "Test Number:100 $$ Test Name:100) Time Gaps $$ Description: Verifies all time tick values are consecutive."
        );
        assert_eq!(catalog(TestGroup::Video).len(), 6);
        assert_eq!(catalog(TestGroup::Framing).len(), 9);
        assert_eq!(catalog(TestGroup::Mst).len(), 3);
        assert_eq!(
            CheckerKind::from_test_id(TestGroup::Mst, 11),
            Ok(CheckerKind::PixelFollowsBe)
        );
    }

    #[test]
    fn factory_matches_kind() {
        for kind in CheckerKind::ALL {
            let checker = kind.create_checker();
            assert_eq!(checker.kind(), kind);
            assert!(!checker.description().is_empty());
        }
    }
}
