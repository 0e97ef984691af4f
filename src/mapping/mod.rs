//! Genomic-to-protein coordinate mapping.
//!
//! All genomic positions are 1-based. CDS positions count coding bases from the first
//! base of the start codon (position 1) in transcription order.

pub mod frame;

use log::debug;

use crate::partner::PartnerRole;
use crate::strand::Strand;
use crate::transcript::construction::{coding_length, genomic_order, transcription_order};
use crate::transcript::{CodingSpan, Exon, TranscriptModel};

/// Map a genomic position to its 1-based CDS position.
///
/// Exons are walked in transcription order. A position inside an exon's coding part
/// resolves exactly. A position inside the CDS span that falls in an intron snaps to the
/// last coding base of the upstream exon. Positions outside the CDS span, or on a
/// transcript without coding exons, do not resolve.
#[must_use]
pub fn cds_position(
    genomic_pos: i32,
    strand: Strand,
    exons: &[Exon],
    coding: CodingSpan,
) -> Option<i32> {
    if exons.is_empty() || !coding.contains(genomic_pos) {
        return None;
    }

    let mut running = 0;
    for part in transcription_order(exons, strand)
        .into_iter()
        .filter_map(|e| e.coding_part(coding))
    {
        if part.contains(genomic_pos) {
            let offset = if strand.is_reverse() {
                part.end - genomic_pos
            } else {
                genomic_pos - part.start
            };
            return Some(running + offset + 1);
        }

        let upstream_of_part = if strand.is_reverse() {
            genomic_pos > part.end
        } else {
            genomic_pos < part.start
        };
        if upstream_of_part {
            // Intronic: nearest boundary is the end of the previous coding exon.
            return (running > 0).then_some(running);
        }

        running += part.len();
    }

    None
}

/// Map a genomic position to its 1-based amino-acid position in the transcript's protein.
#[must_use]
pub fn amino_acid_position(
    genomic_pos: i32,
    strand: Strand,
    transcript: &TranscriptModel,
) -> Option<u32> {
    let coding = transcript.coding()?;
    let cds_pos = cds_position(genomic_pos, strand, &transcript.exons, coding)?;
    if cds_pos < 1 {
        return None;
    }
    let aa = (cds_pos - 1) / 3 + 1;
    debug!(
        "{}: {genomic_pos} ({strand}) -> c.{cds_pos} -> p.{aa}",
        transcript.id
    );
    Some(aa as u32)
}

/// Codon phase (0, 1 or 2) of a genomic position.
#[must_use]
pub fn frame_phase(genomic_pos: i32, strand: Strand, transcript: &TranscriptModel) -> Option<u8> {
    let coding = transcript.coding()?;
    let cds_pos = cds_position(genomic_pos, strand, &transcript.exons, coding)?;
    if cds_pos < 1 {
        return None;
    }
    Some(((cds_pos - 1) % 3) as u8)
}

/// Coding length contributed by one side of a breakpoint.
///
/// Walks coding exons in ascending genomic order accumulating the coding length before
/// the breakpoint; an exon containing the breakpoint contributes the partial amount up to
/// it (measured from the exon's coding end on the reverse strand). On the reverse strand
/// the accumulated amount is then inverted against the total, since ascending genomic
/// order runs against transcription. The 5' partner keeps the "before" length, the 3'
/// partner the remainder.
#[must_use]
pub fn cds_length_to_breakpoint(
    transcript: &TranscriptModel,
    breakpoint: i32,
    strand: Strand,
    role: PartnerRole,
) -> Option<i32> {
    let coding = transcript.coding()?;
    let parts: Vec<CodingSpan> = genomic_order(&transcript.exons)
        .into_iter()
        .filter_map(|e| e.coding_part(coding))
        .collect();
    if parts.is_empty() {
        return None;
    }

    let total = coding_length(&transcript.exons, coding);
    let mut before = 0;
    for part in &parts {
        if breakpoint < part.start {
            break;
        }
        if part.contains(breakpoint) {
            before += if strand.is_reverse() {
                part.end - breakpoint + 1
            } else {
                breakpoint - part.start + 1
            };
            break;
        }
        before += part.len();
    }

    if strand.is_reverse() {
        before = total - before;
    }

    Some(match role {
        PartnerRole::FivePrime => before,
        PartnerRole::ThreePrime => total - before,
    })
}
