//! Parsers turning fusion-caller output and manual entries into [`FusionInput`]s.
//!
//! Every parser yields one [`BatchItem`] per data line, so a malformed line is reported
//! next to its line number instead of disappearing.

pub mod arriba;
pub mod manual;
pub mod star_fusion;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::fusion::{Breakpoint, FusionInput};
use crate::strand::Strand;

/// Outcome of parsing one line. `line` is 1-based.
#[derive(Debug)]
pub struct BatchItem {
    pub line: usize,
    pub result: Result<FusionInput, Error>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputFormat {
    Manual,
    StarFusion,
    Arriba,
}

impl FromStr for InputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "star-fusion" | "star_fusion" | "starfusion" => Ok(Self::StarFusion),
            "arriba" => Ok(Self::Arriba),
            other => Err(Error::Parse(format!("unknown input format: '{other}'"))),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::StarFusion => write!(f, "STAR-Fusion"),
            Self::Arriba => write!(f, "Arriba"),
        }
    }
}

/// Sniff the format from its header line, falling back to manual entry.
#[must_use]
pub fn detect_format(content: &str) -> InputFormat {
    for line in content.lines() {
        if line.starts_with("#FusionName") || line.contains("FusionName") {
            return InputFormat::StarFusion;
        }
        if line.starts_with("#gene1") || line.contains("gene1\tgene2") {
            return InputFormat::Arriba;
        }
    }
    InputFormat::Manual
}

#[must_use]
pub fn parse(content: &str, format: InputFormat) -> Vec<BatchItem> {
    match format {
        InputFormat::Manual => manual::parse(content),
        InputFormat::StarFusion => star_fusion::parse(content),
        InputFormat::Arriba => arriba::parse(content),
    }
}

/// Parse a `chr<N>:<position>:<strand>` descriptor, e.g. `chr22:23632600:+`.
pub fn parse_breakpoint(s: &str) -> Result<Breakpoint, Error> {
    let fields: Vec<&str> = s.trim().split(':').collect();
    let [chromosome, position, strand] = fields[..] else {
        return Err(Error::Parse(format!(
            "invalid breakpoint '{s}': expected chr:position:strand"
        )));
    };

    let strand = match strand {
        "+" => Strand::Forward,
        "-" => Strand::Reverse,
        other => {
            return Err(Error::Parse(format!(
                "invalid strand '{other}' in breakpoint '{s}'"
            )));
        }
    };
    Breakpoint::new(chromosome, parse_position(position, s)?, strand)
}

pub(crate) fn parse_position(field: &str, context: &str) -> Result<i32, Error> {
    field
        .trim()
        .parse::<i32>()
        .map_err(|_| Error::Parse(format!("non-numeric position '{field}' in '{context}'")))
}

pub(crate) fn parse_count(field: &str, name: &str) -> Result<u32, Error> {
    field
        .trim()
        .parse::<u32>()
        .map_err(|_| Error::Parse(format!("invalid {name} '{field}'")))
}

/// Column lookup by header name with positional fallbacks.
pub(crate) struct ColumnMap {
    index: HashMap<String, usize>,
}

impl ColumnMap {
    pub(crate) fn from_header(header: &str) -> Self {
        let index = header
            .trim_start_matches('#')
            .split('\t')
            .enumerate()
            .map(|(i, name)| (name.trim().to_string(), i))
            .collect();
        Self { index }
    }

    pub(crate) fn empty() -> Self {
        Self {
            index: HashMap::new(),
        }
    }

    pub(crate) fn get<'a>(
        &self,
        fields: &[&'a str],
        name: &str,
        fallback: usize,
    ) -> Result<&'a str, Error> {
        let idx = self.index.get(name).copied().unwrap_or(fallback);
        fields
            .get(idx)
            .copied()
            .ok_or_else(|| Error::Parse(format!("missing column '{name}' (index {idx})")))
    }
}

/// Locate the header line and return it with the data lines (1-based numbers) after it.
///
/// Without a header, every line counts as data and columns are positional.
pub(crate) fn split_header<'a>(
    content: &'a str,
    is_header: impl Fn(&str) -> bool,
) -> (ColumnMap, Vec<(usize, &'a str)>) {
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .collect();

    match lines.iter().position(|(_, line)| is_header(line)) {
        Some(idx) => (
            ColumnMap::from_header(lines[idx].1),
            lines[idx + 1..].to_vec(),
        ),
        None => (ColumnMap::empty(), lines),
    }
}

pub(crate) fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
