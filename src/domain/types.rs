//! Core domain types

use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::error::{DpdError, DpdResult};

/// Baseband IQ sample
pub type Sample = Complex64;

/// Frequency in Hz (also used for sample rates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frequency(pub f64);

impl Frequency {
    pub fn hz(hz: f64) -> Self {
        Self(hz)
    }

    pub fn khz(khz: f64) -> Self {
        Self(khz * 1_000.0)
    }

    pub fn mhz(mhz: f64) -> Self {
        Self(mhz * 1_000_000.0)
    }

    pub fn as_hz(&self) -> f64 {
        self.0
    }
}

/// Fine-delay strategy used after coarse alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlignmentMethod {
    /// Cubic-spline interpolation of the envelope correlation peak
    #[default]
    Spline,
    /// Parabolic curve fit through the correlation peak and its neighbours
    #[serde(rename = "PCF")]
    Pcf,
    /// Two-tap least-squares interpolator
    #[serde(rename = "LS")]
    Ls,
}

impl AlignmentMethod {
    pub const ALL: [AlignmentMethod; 3] = [Self::Spline, Self::Pcf, Self::Ls];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spline => "Spline",
            Self::Pcf => "PCF",
            Self::Ls => "LS",
        }
    }
}

impl fmt::Display for AlignmentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlignmentMethod {
    type Err = DpdError;

    fn from_str(s: &str) -> DpdResult<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                DpdError::InvalidArgument(format!(
                    "unknown alignment method '{s}' (expected Spline, PCF or LS)"
                ))
            })
    }
}
