//! Control symbol and SDP header classification.

use crate::constants::{
    HB1_AUDIO_INFOFRAME, HB1_AUDIO_STREAM, HB1_AUDIO_TIMESTAMP, SYMBOL_BE, SYMBOL_BF, SYMBOL_BS,
    SYMBOL_FE, SYMBOL_FS, SYMBOL_SE, SYMBOL_SR, SYMBOL_SS,
};

/// Main-link control (K) symbols recognised by the checkers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSymbol {
    /// Scrambler Reset.
    Sr,
    /// Blanking Start.
    Bs,
    /// Blanking Fill.
    Bf,
    /// Secondary-data Start.
    Ss,
    /// Secondary-data End.
    Se,
    /// Blanking End.
    Be,
    /// Fill Start.
    Fs,
    /// Fill End.
    Fe,
}

impl ControlSymbol {
    /// Classifies a lane value (K flag | data byte).
    pub fn from_lane(value: u16) -> Option<Self> {
        match value {
            SYMBOL_SR => Some(Self::Sr),
            SYMBOL_BS => Some(Self::Bs),
            SYMBOL_BF => Some(Self::Bf),
            SYMBOL_SS => Some(Self::Ss),
            SYMBOL_SE => Some(Self::Se),
            SYMBOL_BE => Some(Self::Be),
            SYMBOL_FS => Some(Self::Fs),
            SYMBOL_FE => Some(Self::Fe),
            _ => None,
        }
    }

    /// Lane value of this symbol.
    pub const fn value(self) -> u16 {
        match self {
            Self::Sr => SYMBOL_SR,
            Self::Bs => SYMBOL_BS,
            Self::Bf => SYMBOL_BF,
            Self::Ss => SYMBOL_SS,
            Self::Se => SYMBOL_SE,
            Self::Be => SYMBOL_BE,
            Self::Fs => SYMBOL_FS,
            Self::Fe => SYMBOL_FE,
        }
    }

    /// BS, SR and BF all belong to a blanking-start sequence.
    pub const fn is_blanking_start(self) -> bool {
        matches!(self, Self::Bs | Self::Sr | Self::Bf)
    }

    /// BS or SR, the symbols that open and close a blanking-start sequence.
    pub const fn is_bs_or_sr(self) -> bool {
        matches!(self, Self::Bs | Self::Sr)
    }
}

/// Whether `value` is one of the blanking-start sequence symbols.
pub fn is_blanking_start(value: u16) -> bool {
    ControlSymbol::from_lane(value).is_some_and(ControlSymbol::is_blanking_start)
}

/// Kind of secondary data packet identified by header byte 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdpKind {
    AudioInfoFrame,
    AudioTimestamp,
    AudioStream,
    Other,
}

impl SdpKind {
    pub fn from_hb1(hb1: u8) -> Self {
        match hb1 {
            HB1_AUDIO_INFOFRAME => Self::AudioInfoFrame,
            HB1_AUDIO_TIMESTAMP => Self::AudioTimestamp,
            HB1_AUDIO_STREAM => Self::AudioStream,
            _ => Self::Other,
        }
    }
}
