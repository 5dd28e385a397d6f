use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::{error::Error, fmt};

/// Irrigation strategy driving a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Threshold-driven irrigation, optionally forecast-aware.
    Ai,
    /// Blanket irrigation of every cell every tick; the control group.
    Traditional,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Ai, Mode::Traditional];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Ai => "ai",
            Mode::Traditional => "traditional",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Mode::Ai => 0,
            Mode::Traditional => 1,
        }
    }

    /// Offset applied to the configured seed so each mode owns its own stream.
    pub(crate) fn seed_offset(self) -> u64 {
        self.index() as u64
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeParseError(pub String);

impl fmt::Display for ModeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mode '{}' (expected 'ai' or 'traditional')", self.0)
    }
}

impl Error for ModeParseError {}

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai" => Ok(Mode::Ai),
            "traditional" => Ok(Mode::Traditional),
            other => Err(ModeParseError(other.to_string())),
        }
    }
}
