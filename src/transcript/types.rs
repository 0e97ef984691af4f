//! Reference transcript model types.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::strand::Strand;

/// An exon of a reference transcript. Genomic coordinates are 1-based inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exon {
    /// 1-based rank in transcription order; 0 when the source did not provide one.
    #[serde(default)]
    pub rank: u16,
    pub start: i32,
    pub end: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<i8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_phase: Option<i8>,
}

impl Exon {
    #[must_use]
    pub fn new(rank: u16, start: i32, end: i32) -> Self {
        Self {
            rank,
            start,
            end,
            phase: None,
            end_phase: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> i32 {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    #[must_use]
    pub fn contains(&self, pos: i32) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Intersection of this exon with a coding span, or `None` if they do not overlap.
    #[must_use]
    pub fn coding_part(&self, coding: CodingSpan) -> Option<CodingSpan> {
        let start = self.start.max(coding.start);
        let end = self.end.min(coding.end);
        (start <= end).then_some(CodingSpan { start, end })
    }
}

/// Genomic span (1-based inclusive) of a transcript's coding sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingSpan {
    pub start: i32,
    pub end: i32,
}

impl CodingSpan {
    #[must_use]
    pub fn len(&self) -> i32 {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    #[must_use]
    pub fn contains(&self, pos: i32) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Protein product of a coding transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProteinRecord {
    pub id: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub sequence: Option<String>,
}

impl ProteinRecord {
    /// Protein length, taken from the sequence when the record carries no explicit length.
    #[must_use]
    pub fn resolved_length(&self) -> Option<u32> {
        self.length
            .or_else(|| self.sequence.as_ref().map(|s| s.chars().count() as u32))
    }
}

/// A reference transcript as supplied by the reference-data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptModel {
    pub id: String,
    #[serde(default)]
    pub biotype: String,
    #[serde(default)]
    pub is_canonical: bool,
    pub strand: Strand,
    pub start: i32,
    pub end: i32,
    #[serde(default)]
    pub cds_start: Option<i32>,
    #[serde(default)]
    pub cds_end: Option<i32>,
    #[serde(default)]
    pub exons: Vec<Exon>,
    #[serde(default)]
    pub protein: Option<ProteinRecord>,
}

impl TranscriptModel {
    /// The coding span, if the transcript has both CDS boundaries.
    #[must_use]
    pub fn coding(&self) -> Option<CodingSpan> {
        match (self.cds_start, self.cds_end) {
            (Some(start), Some(end)) => Some(CodingSpan { start, end }),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_coding(&self) -> bool {
        self.coding().is_some()
    }

    #[must_use]
    pub fn protein_id(&self) -> Option<&str> {
        self.protein.as_ref().map(|p| p.id.as_str())
    }

    #[must_use]
    pub fn protein_sequence(&self) -> Option<&str> {
        self.protein
            .as_ref()
            .and_then(|p| p.sequence.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Checks coordinate ordering and that exons do not overlap.
    pub fn validate(&self) -> Result<(), Error> {
        if self.start > self.end {
            return Err(Error::Validation(format!(
                "{}: transcript start {} > end {}",
                self.id, self.start, self.end
            )));
        }
        if let Some(coding) = self.coding()
            && coding.is_empty()
        {
            return Err(Error::Validation(format!(
                "{}: CDS start {} > CDS end {}",
                self.id, coding.start, coding.end
            )));
        }

        let mut sorted: Vec<&Exon> = self.exons.iter().collect();
        sorted.sort_by_key(|e| e.start);
        for exon in &sorted {
            if exon.is_empty() {
                return Err(Error::Validation(format!(
                    "{}: exon start {} > end {}",
                    self.id, exon.start, exon.end
                )));
            }
        }
        for pair in sorted.windows(2) {
            if pair[1].start <= pair[0].end {
                return Err(Error::Validation(format!(
                    "{}: exons {}-{} and {}-{} overlap",
                    self.id, pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }
        Ok(())
    }
}
