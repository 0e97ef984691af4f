//! Exon ordering and rank inference.

use crate::strand::Strand;

use super::types::{CodingSpan, Exon};

/// Exons sorted by ascending genomic start, regardless of strand.
#[must_use]
pub fn genomic_order(exons: &[Exon]) -> Vec<&Exon> {
    let mut sorted: Vec<&Exon> = exons.iter().collect();
    sorted.sort_by_key(|e| e.start);
    sorted
}

/// Exons in transcription order: ascending start on the forward strand,
/// descending start on the reverse strand.
#[must_use]
pub fn transcription_order(exons: &[Exon], strand: Strand) -> Vec<&Exon> {
    let mut sorted = genomic_order(exons);
    if strand.is_reverse() {
        sorted.reverse();
    }
    sorted
}

/// Returns owned exons in transcription order with 1-based ranks.
///
/// Ranks supplied by the source are kept when every exon has a distinct non-zero rank.
/// Otherwise all ranks are reassigned from genomic position and strand.
#[must_use]
pub fn ranked_exons(exons: &[Exon], strand: Strand) -> Vec<Exon> {
    let mut ranked: Vec<Exon> = transcription_order(exons, strand)
        .into_iter()
        .cloned()
        .collect();

    if !has_usable_ranks(&ranked) {
        for (i, exon) in ranked.iter_mut().enumerate() {
            exon.rank = (i + 1) as u16;
        }
    }

    ranked.sort_by_key(|e| e.rank);
    ranked
}

fn has_usable_ranks(exons: &[Exon]) -> bool {
    if exons.iter().any(|e| e.rank == 0) {
        return false;
    }
    let mut ranks: Vec<u16> = exons.iter().map(|e| e.rank).collect();
    ranks.sort_unstable();
    ranks.windows(2).all(|w| w[0] != w[1])
}

/// Total number of coding bases across all exons.
#[must_use]
pub fn coding_length(exons: &[Exon], coding: CodingSpan) -> i32 {
    exons
        .iter()
        .filter_map(|e| e.coding_part(coding))
        .map(|c| c.len())
        .sum()
}
