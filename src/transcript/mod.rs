//! Reference transcript models supplied by the reference-data provider.

pub mod construction;
pub mod types;

pub use types::{CodingSpan, Exon, ProteinRecord, TranscriptModel};
