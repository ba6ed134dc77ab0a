//! Enumeration types shared across the workspace.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Designs
// ---------------------------------------------------------------------------

/// The causal structure used to generate a synthetic spatial sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Design {
    /// Exogenous spillover only: the spatial lag of treatment enters the
    /// outcome, the outcome's own lag does not.
    Slx,
    /// Spatial Durbin: the outcome's own spatial lag enters as well and is
    /// resolved by a fixed number of fixed-point rounds.
    Sdm,
    /// Treatment assignment is itself a threshold on the neighbours'
    /// treatment, then the outcome follows the SDM process.
    Backdoor,
}

impl Design {
    /// All designs, in the order the study reports them.
    pub const ALL: [Self; 3] = [Self::Slx, Self::Sdm, Self::Backdoor];

    /// Short lowercase label used in file names and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slx => "slx",
            Self::Sdm => "sdm",
            Self::Backdoor => "backdoor",
        }
    }

    /// Whether the outcome carries its own spatial lag (`WY`).
    pub const fn has_outcome_lag(self) -> bool {
        matches!(self, Self::Sdm | Self::Backdoor)
    }
}

impl fmt::Display for Design {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`Design`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown design '{0}' (expected one of: slx, sdm, backdoor)")]
pub struct ParseDesignError(pub String);

impl FromStr for Design {
    type Err = ParseDesignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slx" => Ok(Self::Slx),
            "sdm" => Ok(Self::Sdm),
            "backdoor" => Ok(Self::Backdoor),
            other => Err(ParseDesignError(other.to_owned())),
        }
    }
}
