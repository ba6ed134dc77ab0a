//! Core value structs: model coefficients, per-unit sample records and the
//! metadata attached to every generated sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::Design;
use crate::ids::RunId;

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

/// Coefficients of the outcome equation
/// `Y = β·X + γ·WD + γ·D + ρ·WY`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coefficients {
    /// Effect of the covariate `X`.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Direct treatment effect and effect of the treatment's spatial lag.
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    /// Weight on the outcome's own spatial lag (ignored by SLX).
    #[serde(default = "default_rho")]
    pub rho: f64,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            beta: default_beta(),
            gamma: default_gamma(),
            rho: default_rho(),
        }
    }
}

impl Coefficients {
    /// Outcomes without any outcome lag: the SLX equations.
    ///
    /// `Y = β·X + γ·WD + γ·D`, `Y1 = β·X + γ·WD + γ`, `Y0 = β·X + γ·WD`.
    pub fn exogenous(&self, x: f64, wd: f64, d: u8) -> Outcomes {
        let base = self.beta * x + self.gamma * wd;
        Outcomes {
            y: base + self.gamma * f64::from(d),
            y1: base + self.gamma,
            y0: base,
        }
    }

    /// Outcomes with the outcome lag `WY` added with weight `ρ`.
    pub fn endogenous(&self, x: f64, wd: f64, d: u8, wy: f64) -> Outcomes {
        let base = self.beta * x + self.gamma * wd;
        let spill = self.rho * wy;
        Outcomes {
            y: base + self.gamma * f64::from(d) + spill,
            y1: base + self.gamma + spill,
            y0: base + spill,
        }
    }
}

const fn default_beta() -> f64 {
    0.9
}

const fn default_gamma() -> f64 {
    0.25
}

const fn default_rho() -> f64 {
    0.05
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Observed outcome and both potential outcomes for one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcomes {
    /// Observed outcome.
    pub y: f64,
    /// Potential outcome under treatment.
    pub y1: f64,
    /// Potential outcome without treatment.
    pub y0: f64,
}

impl Outcomes {
    /// Unit-level treatment effect `Y1 - Y0`.
    pub fn effect(&self) -> f64 {
        self.y1 - self.y0
    }
}

// ---------------------------------------------------------------------------
// Sample records
// ---------------------------------------------------------------------------

/// One spatial unit of a generated sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    /// Flat index `row * side + col`.
    pub unit: usize,
    /// Grid row.
    pub row: usize,
    /// Grid column.
    pub col: usize,
    /// Binary treatment (after any reassignment).
    pub d: u8,
    /// Continuous covariate.
    pub x: f64,
    /// Spatial lag of treatment, `W·D` with the binary weights. The backdoor
    /// design stores the row-normalized lag of the drawn treatment instead.
    pub wd: f64,
    /// Spatial lag of the outcome from the last fixed-point round.
    /// `None` for designs without an outcome lag.
    pub wy: Option<f64>,
    /// Final outcomes.
    pub outcomes: Outcomes,
    /// Outcomes before any outcome-lag rounds (the SLX iterate).
    /// `None` for SLX, where they equal [`Self::outcomes`].
    pub no_spill: Option<Outcomes>,
    /// Row-normalized lag of the originally drawn treatment that decided
    /// reassignment. Only set by the backdoor design.
    pub wd_assignment: Option<f64>,
}

// ---------------------------------------------------------------------------
// Sample metadata
// ---------------------------------------------------------------------------

/// Provenance of a generated sample, persisted next to the data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleMeta {
    /// Unique run identifier.
    pub run_id: RunId,
    /// Data-generating design.
    pub design: Design,
    /// Number of units.
    pub n: usize,
    /// Neighbours per unit.
    pub k: usize,
    /// Seed used for the treatment and covariate draws.
    pub seed: u64,
    /// Outcome coefficients.
    pub coefficients: Coefficients,
    /// Fixed-point rounds applied (zero for SLX).
    pub iterations: usize,
    /// When the sample was generated.
    pub generated_at: DateTime<Utc>,
}
