//! Link configuration.
//!
//! A [`LinkConfig`] is fixed for a run: the number of active lanes selects the
//! packet sub-field layout, the link speed selects the symbol clock used by the
//! audio rate rule, and `max_reported_errors` caps the violations a checker
//! reports before going inert.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::constants::{
    CLOCK_PERIOD_1_67G_NS, CLOCK_PERIOD_2_7G_NS, CLOCK_PERIOD_5_4G_NS, CLOCK_PERIOD_8_1G_NS,
    DEFAULT_MAX_REPORTED_ERRORS, LS_CLK_1_67G_HZ, LS_CLK_2_7G_HZ, LS_CLK_5_4G_HZ, LS_CLK_8_1G_HZ,
};
use crate::error::ConfigError;

/// Number of active main-link lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LinkWidth {
    One,
    Two,
    #[default]
    Four,
}

impl LinkWidth {
    pub const fn lanes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    /// Index of the highest active lane.
    pub const fn last_lane(self) -> usize {
        self.lanes() - 1
    }
}

impl TryFrom<u8> for LinkWidth {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            other => Err(ConfigError::InvalidWidth(other.to_string())),
        }
    }
}

impl From<LinkWidth> for u8 {
    fn from(width: LinkWidth) -> Self {
        width.lanes() as u8
    }
}

impl FromStr for LinkWidth {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidWidth(trimmed.to_string()))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for LinkWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lanes())
    }
}

/// Main-link rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSpeed {
    Gbps1_67,
    Gbps2_7,
    Gbps5_4,
    Gbps8_1,
}

impl LinkSpeed {
    /// Link symbol clock frequency in Hz.
    pub const fn ls_clk_hz(self) -> u32 {
        match self {
            Self::Gbps1_67 => LS_CLK_1_67G_HZ,
            Self::Gbps2_7 => LS_CLK_2_7G_HZ,
            Self::Gbps5_4 => LS_CLK_5_4G_HZ,
            Self::Gbps8_1 => LS_CLK_8_1G_HZ,
        }
    }

    /// Duration of one time tick in nanoseconds.
    pub const fn clock_period_ns(self) -> f64 {
        match self {
            Self::Gbps1_67 => CLOCK_PERIOD_1_67G_NS,
            Self::Gbps2_7 => CLOCK_PERIOD_2_7G_NS,
            Self::Gbps5_4 => CLOCK_PERIOD_5_4G_NS,
            Self::Gbps8_1 => CLOCK_PERIOD_8_1G_NS,
        }
    }
}

impl FromStr for LinkSpeed {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "1.67G" => Ok(Self::Gbps1_67),
            "2.7G" => Ok(Self::Gbps2_7),
            "5.4G" => Ok(Self::Gbps5_4),
            "8.1G" => Ok(Self::Gbps8_1),
            _ => Err(ConfigError::InvalidSpeed(trimmed.to_string())),
        }
    }
}

impl fmt::Display for LinkSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Gbps1_67 => "1.67G",
            Self::Gbps2_7 => "2.7G",
            Self::Gbps5_4 => "5.4G",
            Self::Gbps8_1 => "8.1G",
        };
        f.write_str(label)
    }
}

fn default_max_reported_errors() -> u32 {
    DEFAULT_MAX_REPORTED_ERRORS
}

/// Configuration shared by every checker of a run.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    pub width: LinkWidth,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub speed: Option<LinkSpeed>,
    #[serde(default = "default_max_reported_errors")]
    pub max_reported_errors: u32,
}

impl LinkConfig {
    pub fn new(width: LinkWidth) -> Self {
        Self {
            width,
            speed: None,
            max_reported_errors: DEFAULT_MAX_REPORTED_ERRORS,
        }
    }

    pub fn with_speed(mut self, speed: LinkSpeed) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_max_reported_errors(mut self, max: u32) -> Self {
        self.max_reported_errors = max;
        self
    }

    /// Builds a configuration from host parameter strings.
    ///
    /// Parameters take the form `KEY:VALUE` or `KEY=VALUE`; keys are matched
    /// case-insensitively. `WIDTH` is required, `SPEED` is optional.
    ///
    /// # Errors
    /// - [`ConfigError::MissingParameter`] - no `WIDTH` entry
    /// - [`ConfigError::InvalidWidth`] / [`ConfigError::InvalidSpeed`] - a value
    ///   could not be parsed
    pub fn from_params<S: AsRef<str>>(
        params: &[S],
        max_reported_errors: u32,
    ) -> Result<Self, ConfigError> {
        let width = get_config_value(params, "WIDTH")
            .ok_or(ConfigError::MissingParameter("WIDTH"))?
            .parse::<LinkWidth>()?;
        let speed = get_config_value(params, "SPEED")
            .map(str::parse::<LinkSpeed>)
            .transpose()?;
        log::debug!("Link configuration: width {width}, speed {speed:?}");
        Ok(Self {
            width,
            speed,
            max_reported_errors,
        })
    }

    /// The configured speed.
    ///
    /// # Errors
    /// - [`ConfigError::MissingParameter`] - no speed was configured
    pub fn require_speed(&self) -> Result<LinkSpeed, ConfigError> {
        self.speed.ok_or(ConfigError::MissingParameter("SPEED"))
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(LinkWidth::default())
    }
}

/// Value of the first `KEY:VALUE` / `KEY=VALUE` entry whose key matches `key`.
pub fn get_config_value<'a, S: AsRef<str>>(params: &'a [S], key: &str) -> Option<&'a str> {
    params.iter().find_map(|param| {
        let (name, value) = param.as_ref().split_once([':', '='])?;
        name.trim()
            .eq_ignore_ascii_case(key)
            .then_some(value.trim())
    })
}

/// Parses an error report cap supplied as text.
///
/// # Errors
/// - [`ConfigError::InvalidErrorCap`] - not a non-negative integer
pub fn parse_error_cap(text: &str) -> Result<u32, ConfigError> {
    text.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidErrorCap(text.trim().to_string()))
}
