//! Strand orientation for genomic features.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Strand orientation of a genomic feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    /// Parse from an Ensembl-style strand integer (`1` or `-1`).
    pub fn from_ensembl(value: i8) -> Result<Self, Error> {
        match value {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Reverse),
            _ => Err(Error::Parse(format!("invalid strand value: {value}"))),
        }
    }

    #[must_use]
    pub fn is_reverse(self) -> bool {
        self == Self::Reverse
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Forward => '+',
            Self::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" | "1" | "+1" => Ok(Self::Forward),
            "-" | "-1" => Ok(Self::Reverse),
            other => Err(Error::Parse(format!("invalid strand: '{other}'"))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl Serialize for Strand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.symbol())
    }
}

// Accepts "+"/"-" as well as Ensembl's 1/-1.
impl<'de> Deserialize<'de> for Strand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i8),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Strand::from_ensembl(v).map_err(serde::de::Error::custom),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
