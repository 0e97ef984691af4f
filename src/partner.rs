//! Fusion partner roles.

use std::fmt;

use serde::Serialize;

/// Position of a gene within the fusion product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PartnerRole {
    /// Partner A, transcribed first; contributes everything upstream of its breakpoint.
    #[serde(rename = "A")]
    FivePrime,
    /// Partner B; contributes everything downstream of its breakpoint.
    #[serde(rename = "B")]
    ThreePrime,
}

impl PartnerRole {
    #[must_use]
    pub fn is_five_prime(self) -> bool {
        self == Self::FivePrime
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FivePrime => "A",
            Self::ThreePrime => "B",
        }
    }
}

impl fmt::Display for PartnerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FivePrime => write!(f, "5'"),
            Self::ThreePrime => write!(f, "3'"),
        }
    }
}
