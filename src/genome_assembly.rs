//! Genome assembly identification.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GenomeAssembly {
    GRCh37,
    #[default]
    GRCh38,
}

impl std::str::FromStr for GenomeAssembly {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grch37" | "hg19" => Ok(GenomeAssembly::GRCh37),
            "grch38" | "hg38" => Ok(GenomeAssembly::GRCh38),
            _ => Err(Error::Parse(format!("unrecognized genome assembly: {s}"))),
        }
    }
}

impl fmt::Display for GenomeAssembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenomeAssembly::GRCh37 => write!(f, "GRCh37"),
            GenomeAssembly::GRCh38 => write!(f, "GRCh38"),
        }
    }
}

impl Serialize for GenomeAssembly {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GenomeAssembly {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
