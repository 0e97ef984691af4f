//! Exon-level and protein-level layouts of a fusion for drawing.

use std::fmt;

use serde::Serialize;

use crate::domain::AnnotatedDomain;
use crate::fusion::FusionRecord;
use crate::partner::PartnerRole;
use crate::strand::Strand;
use crate::transcript::TranscriptModel;
use crate::transcript::construction::ranked_exons;

/// Protein length assumed when nothing better is known.
const FALLBACK_PROTEIN_LENGTH: u32 = 100;

/// Whether an exon makes it into the fusion transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExonRetention {
    Retained,
    Partial,
    Lost,
}

/// One exon of a partner transcript, classified against the breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExonStatus {
    pub rank: u16,
    pub start: i32,
    pub end: i32,
    pub is_coding: bool,
    /// Genomic sub-range of the exon that lies inside the CDS.
    pub cds_start: Option<i32>,
    pub cds_end: Option<i32>,
    pub status: ExonRetention,
}

impl ExonStatus {
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

fn exon_retention(
    start: i32,
    end: i32,
    breakpoint: i32,
    strand: Strand,
    role: PartnerRole,
) -> ExonRetention {
    if start <= breakpoint && breakpoint <= end {
        return ExonRetention::Partial;
    }

    // 5' partners keep what lies upstream of the cut, 3' partners what lies downstream.
    let upstream = if strand.is_reverse() {
        start > breakpoint
    } else {
        end < breakpoint
    };
    if upstream == role.is_five_prime() {
        ExonRetention::Retained
    } else {
        ExonRetention::Lost
    }
}

/// Classify every exon of a transcript, in rank order.
///
/// Missing or inconsistent ranks are inferred from genomic position and strand.
#[must_use]
pub fn exon_statuses(
    transcript: &TranscriptModel,
    breakpoint: i32,
    strand: Strand,
    role: PartnerRole,
) -> Vec<ExonStatus> {
    let coding = transcript.coding();

    ranked_exons(&transcript.exons, strand)
        .into_iter()
        .map(|exon| {
            let part = coding.and_then(|c| exon.coding_part(c));
            ExonStatus {
                rank: exon.rank,
                start: exon.start,
                end: exon.end,
                is_coding: part.is_some(),
                cds_start: part.map(|p| p.start),
                cds_end: part.map(|p| p.end),
                status: exon_retention(exon.start, exon.end, breakpoint, strand, role),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Exon,
    Intron,
}

/// Where a breakpoint falls on its transcript, e.g. "exon 13" or "intron 1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BreakpointLocation {
    pub kind: LocationKind,
    pub number: u16,
}

impl BreakpointLocation {
    #[must_use]
    pub fn exon(number: u16) -> Self {
        Self {
            kind: LocationKind::Exon,
            number,
        }
    }

    #[must_use]
    pub fn intron(number: u16) -> Self {
        Self {
            kind: LocationKind::Intron,
            number,
        }
    }
}

impl fmt::Display for BreakpointLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LocationKind::Exon => write!(f, "exon {}", self.number),
            LocationKind::Intron => write!(f, "intron {}", self.number),
        }
    }
}

/// Name the exon or intron containing the breakpoint.
///
/// Introns are numbered after their 5'-side exon. When no exon or intron matches
/// directly, the retention statuses decide: a partial exon first, then the intron after
/// the last retained exon (5' partner) or before the first retained exon (3' partner).
#[must_use]
pub fn breakpoint_location(
    statuses: &[ExonStatus],
    breakpoint: i32,
    strand: Strand,
    role: PartnerRole,
) -> Option<BreakpointLocation> {
    let mut ordered: Vec<&ExonStatus> = statuses.iter().collect();
    ordered.sort_by_key(|e| e.start);
    if strand.is_reverse() {
        ordered.reverse();
    }

    for (i, exon) in ordered.iter().enumerate() {
        if exon.contains(breakpoint) {
            return Some(BreakpointLocation::exon(exon.rank));
        }
        if i == 0 {
            continue;
        }

        let prev = ordered[i - 1];
        let in_intron = if strand.is_reverse() {
            exon.end < breakpoint && breakpoint < prev.start
        } else {
            prev.end < breakpoint && breakpoint < exon.start
        };
        if in_intron {
            return Some(BreakpointLocation::intron(prev.rank.min(exon.rank)));
        }
    }

    if let Some(partial) = statuses
        .iter()
        .find(|e| e.status == ExonRetention::Partial)
    {
        return Some(BreakpointLocation::exon(partial.rank));
    }

    let mut retained = statuses
        .iter()
        .filter(|e| e.status == ExonRetention::Retained)
        .map(|e| e.rank);
    match role {
        PartnerRole::FivePrime => retained.max().map(BreakpointLocation::intron),
        PartnerRole::ThreePrime => retained
            .min()
            .map(|rank| BreakpointLocation::intron(rank.saturating_sub(1).max(1))),
    }
}

/// One exon (or the kept part of one) placed on the fusion transcript.
///
/// `start`/`end` are fusion-transcript offsets, half-open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FusionExonSegment {
    pub role: PartnerRole,
    pub exon_rank: u16,
    pub start: i32,
    pub end: i32,
    pub is_coding: bool,
    pub genomic_start: i32,
    pub genomic_end: i32,
}

impl FusionExonSegment {
    #[must_use]
    pub fn len(&self) -> i32 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The spliced fusion transcript: partner A's kept exons followed by partner B's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FusionTranscriptModel {
    pub segments: Vec<FusionExonSegment>,
    pub junction_position: i32,
    pub cds_start: Option<i32>,
    pub cds_end: Option<i32>,
    pub total_length: i32,
}

fn kept_length(exon: &ExonStatus, breakpoint: i32, strand: Strand, role: PartnerRole) -> i32 {
    if exon.status != ExonRetention::Partial {
        return exon.len();
    }
    match (role, strand) {
        (PartnerRole::FivePrime, Strand::Forward) | (PartnerRole::ThreePrime, Strand::Reverse) => {
            breakpoint - exon.start
        }
        (PartnerRole::FivePrime, Strand::Reverse) | (PartnerRole::ThreePrime, Strand::Forward) => {
            exon.end - breakpoint
        }
    }
}

fn append_segments(
    segments: &mut Vec<FusionExonSegment>,
    offset: &mut i32,
    exons: &[ExonStatus],
    breakpoint: i32,
    strand: Strand,
    role: PartnerRole,
) {
    let mut kept: Vec<&ExonStatus> = exons
        .iter()
        .filter(|e| e.status != ExonRetention::Lost)
        .collect();
    kept.sort_by_key(|e| e.rank);

    for exon in kept {
        let len = kept_length(exon, breakpoint, strand, role);
        if len <= 0 {
            continue;
        }
        segments.push(FusionExonSegment {
            role,
            exon_rank: exon.rank,
            start: *offset,
            end: *offset + len,
            is_coding: exon.is_coding,
            genomic_start: exon.start,
            genomic_end: exon.end,
        });
        *offset += len;
    }
}

/// Splice both partners' kept exons into one transcript.
///
/// `None` when neither partner keeps any exon.
#[must_use]
pub fn build_fusion_transcript(
    exons_a: &[ExonStatus],
    exons_b: &[ExonStatus],
    breakpoint_a: i32,
    breakpoint_b: i32,
    strand_a: Strand,
    strand_b: Strand,
) -> Option<FusionTranscriptModel> {
    let kept = |e: &ExonStatus| e.status != ExonRetention::Lost;
    if !exons_a.iter().any(kept) && !exons_b.iter().any(kept) {
        return None;
    }

    let mut segments = Vec::new();
    let mut offset = 0;
    append_segments(
        &mut segments,
        &mut offset,
        exons_a,
        breakpoint_a,
        strand_a,
        PartnerRole::FivePrime,
    );
    let junction_position = offset;
    append_segments(
        &mut segments,
        &mut offset,
        exons_b,
        breakpoint_b,
        strand_b,
        PartnerRole::ThreePrime,
    );

    let mut coding = segments.iter().filter(|s| s.is_coding);
    let first_coding = coding.next();
    let last_coding = coding.last().or(first_coding);

    Some(FusionTranscriptModel {
        cds_start: first_coding.map(|s| s.start),
        cds_end: last_coding.map(|s| s.end),
        segments,
        junction_position,
        total_length: offset,
    })
}

/// Exon-level view of one partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartnerExonView {
    pub transcript_id: String,
    pub exons: Vec<ExonStatus>,
    pub location: Option<BreakpointLocation>,
}

/// Everything needed to draw a fusion at exon level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FusionTranscriptView {
    pub fusion_name: String,
    pub partner_a: PartnerExonView,
    pub partner_b: PartnerExonView,
    pub transcript: Option<FusionTranscriptModel>,
}

/// Protein-level diagram dimensions, in amino acids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProteinLayout {
    pub length_a: u32,
    pub length_b: u32,
    pub junction_position: u32,
    pub total_length: u32,
}

fn max_domain_end(domains: &[AnnotatedDomain]) -> Option<u32> {
    domains.iter().filter_map(|d| d.domain.end).max()
}

impl ProteinLayout {
    /// Partner A spans up to its breakpoint; partner B spans from its breakpoint to its end.
    ///
    /// Unknown lengths are estimated from the furthest domain end, then from a fixed
    /// fallback.
    #[must_use]
    pub fn from_record(record: &FusionRecord) -> Self {
        let a = &record.partner_a;
        let b = &record.partner_b;

        let length_a = a
            .aa_breakpoint
            .or_else(|| max_domain_end(&a.domains))
            .unwrap_or(FALLBACK_PROTEIN_LENGTH);
        let full_b = b
            .protein_length
            .or_else(|| max_domain_end(&b.domains))
            .unwrap_or(FALLBACK_PROTEIN_LENGTH);
        let length_b = full_b.saturating_sub(b.aa_breakpoint.unwrap_or(0));

        Self {
            length_a,
            length_b,
            junction_position: length_a,
            total_length: length_a + length_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DomainAnnotation, DomainStatus};
    use crate::fusion::{Breakpoint, Confidence, PartnerAnnotation};
    use crate::genome_assembly::GenomeAssembly;
    use crate::mapping::frame::FrameStatus;
    use crate::transcript::Exon;

    fn transcript(strand: Strand, exons: &[(i32, i32)], cds: (i32, i32)) -> TranscriptModel {
        TranscriptModel {
            id: "ENST00000000001".to_string(),
            biotype: "protein_coding".to_string(),
            is_canonical: true,
            strand,
            start: exons.iter().map(|e| e.0).min().unwrap(),
            end: exons.iter().map(|e| e.1).max().unwrap(),
            cds_start: Some(cds.0),
            cds_end: Some(cds.1),
            exons: exons.iter().map(|&(s, e)| Exon::new(0, s, e)).collect(),
            protein: None,
        }
    }

    fn three_exons(strand: Strand) -> TranscriptModel {
        transcript(strand, &[(100, 199), (300, 399), (500, 599)], (150, 550))
    }

    fn statuses_of(v: &[ExonStatus]) -> Vec<(u16, ExonRetention)> {
        v.iter().map(|e| (e.rank, e.status)).collect()
    }

    #[test]
    fn forward_five_prime_statuses() {
        let t = three_exons(Strand::Forward);
        let s = exon_statuses(&t, 350, Strand::Forward, PartnerRole::FivePrime);
        assert_eq!(
            statuses_of(&s),
            vec![
                (1, ExonRetention::Retained),
                (2, ExonRetention::Partial),
                (3, ExonRetention::Lost)
            ]
        );
        assert_eq!(s[0].cds_start, Some(150));
        assert_eq!(s[0].cds_end, Some(199));
        assert_eq!(s[2].cds_end, Some(550));
    }

    #[test]
    fn reverse_five_prime_statuses() {
        let t = three_exons(Strand::Reverse);
        let s = exon_statuses(&t, 350, Strand::Reverse, PartnerRole::FivePrime);
        assert_eq!(s[0].start, 500);
        assert_eq!(
            statuses_of(&s),
            vec![
                (1, ExonRetention::Retained),
                (2, ExonRetention::Partial),
                (3, ExonRetention::Lost)
            ]
        );
    }

    #[test]
    fn three_prime_statuses_mirror() {
        let t = three_exons(Strand::Forward);
        let s = exon_statuses(&t, 350, Strand::Forward, PartnerRole::ThreePrime);
        assert_eq!(
            statuses_of(&s),
            vec![
                (1, ExonRetention::Lost),
                (2, ExonRetention::Partial),
                (3, ExonRetention::Retained)
            ]
        );

        let t = three_exons(Strand::Reverse);
        let s = exon_statuses(&t, 250, Strand::Reverse, PartnerRole::ThreePrime);
        // rank 3 is the lowest exon (100-199), downstream of the cut on this strand
        assert_eq!(
            statuses_of(&s),
            vec![
                (1, ExonRetention::Lost),
                (2, ExonRetention::Lost),
                (3, ExonRetention::Retained)
            ]
        );
    }

    #[test]
    fn non_coding_exons_are_flagged() {
        let t = transcript(Strand::Forward, &[(100, 199), (300, 399)], (320, 399));
        let s = exon_statuses(&t, 350, Strand::Forward, PartnerRole::FivePrime);
        assert!(!s[0].is_coding);
        assert_eq!(s[0].cds_start, None);
        assert!(s[1].is_coding);
        assert_eq!(s[1].cds_start, Some(320));
    }

    #[test]
    fn locates_exons_and_introns() {
        let t = three_exons(Strand::Forward);
        let s = exon_statuses(&t, 250, Strand::Forward, PartnerRole::FivePrime);
        let loc = breakpoint_location(&s, 250, Strand::Forward, PartnerRole::FivePrime).unwrap();
        assert_eq!(loc.to_string(), "intron 1");

        let s = exon_statuses(&t, 350, Strand::Forward, PartnerRole::FivePrime);
        let loc = breakpoint_location(&s, 350, Strand::Forward, PartnerRole::FivePrime).unwrap();
        assert_eq!(loc, BreakpointLocation::exon(2));

        let t = three_exons(Strand::Reverse);
        let s = exon_statuses(&t, 250, Strand::Reverse, PartnerRole::FivePrime);
        let loc = breakpoint_location(&s, 250, Strand::Reverse, PartnerRole::FivePrime).unwrap();
        assert_eq!(loc.to_string(), "intron 2");
    }

    #[test]
    fn location_fallback_uses_retention() {
        let t = three_exons(Strand::Forward);

        let s = exon_statuses(&t, 700, Strand::Forward, PartnerRole::FivePrime);
        let loc = breakpoint_location(&s, 700, Strand::Forward, PartnerRole::FivePrime);
        assert_eq!(loc, Some(BreakpointLocation::intron(3)));

        let s = exon_statuses(&t, 50, Strand::Forward, PartnerRole::ThreePrime);
        let loc = breakpoint_location(&s, 50, Strand::Forward, PartnerRole::ThreePrime);
        assert_eq!(loc, Some(BreakpointLocation::intron(1)));

        let s = exon_statuses(&t, 50, Strand::Forward, PartnerRole::FivePrime);
        assert_eq!(
            breakpoint_location(&s, 50, Strand::Forward, PartnerRole::FivePrime),
            None
        );
    }

    #[test]
    fn location_of_empty_transcript() {
        assert_eq!(
            breakpoint_location(&[], 10, Strand::Forward, PartnerRole::FivePrime),
            None
        );
    }

    fn spliced() -> FusionTranscriptModel {
        let a = three_exons(Strand::Forward);
        let b = transcript(
            Strand::Forward,
            &[(1000, 1099), (1200, 1299), (1400, 1499)],
            (1050, 1450),
        );
        let exons_a = exon_statuses(&a, 350, Strand::Forward, PartnerRole::FivePrime);
        let exons_b = exon_statuses(&b, 1250, Strand::Forward, PartnerRole::ThreePrime);
        build_fusion_transcript(
            &exons_a,
            &exons_b,
            350,
            1250,
            Strand::Forward,
            Strand::Forward,
        )
        .unwrap()
    }

    #[test]
    fn splices_partial_exons() {
        let model = spliced();
        let spans: Vec<(PartnerRole, u16, i32, i32)> = model
            .segments
            .iter()
            .map(|s| (s.role, s.exon_rank, s.start, s.end))
            .collect();
        assert_eq!(
            spans,
            vec![
                (PartnerRole::FivePrime, 1, 0, 100),
                (PartnerRole::FivePrime, 2, 100, 150),
                (PartnerRole::ThreePrime, 2, 150, 199),
                (PartnerRole::ThreePrime, 3, 199, 299),
            ]
        );
        assert_eq!(model.junction_position, 150);
        assert_eq!(model.total_length, 299);
        assert_eq!(model.cds_start, Some(0));
        assert_eq!(model.cds_end, Some(299));
    }

    #[test]
    fn segment_invariants() {
        let model = spliced();
        let total: i32 = model.segments.iter().map(FusionExonSegment::len).sum();
        assert_eq!(total, model.total_length);

        let a_total: i32 = model
            .segments
            .iter()
            .filter(|s| s.role == PartnerRole::FivePrime)
            .map(FusionExonSegment::len)
            .sum();
        assert_eq!(a_total, model.junction_position);

        let first_b = model
            .segments
            .iter()
            .position(|s| s.role == PartnerRole::ThreePrime)
            .unwrap();
        assert!(model.segments[..first_b].iter().all(|s| s.role.is_five_prime()));
        assert!(model.segments[first_b..].iter().all(|s| !s.role.is_five_prime()));
        assert_eq!(model.segments[first_b].start, model.junction_position);
        assert!(model.segments.iter().all(|s| s.len() > 0));
    }

    #[test]
    fn reverse_partial_keeps_upstream_bases() {
        let a = three_exons(Strand::Reverse);
        let exons_a = exon_statuses(&a, 350, Strand::Reverse, PartnerRole::FivePrime);
        let model =
            build_fusion_transcript(&exons_a, &[], 350, 0, Strand::Reverse, Strand::Forward)
                .unwrap();
        // exon 500-599 whole, then 351-399 of the partial exon
        assert_eq!(model.segments.len(), 2);
        assert_eq!(model.segments[1].len(), 49);
        assert_eq!(model.junction_position, 149);
        assert_eq!(model.total_length, 149);
    }

    #[test]
    fn nothing_kept_gives_none() {
        let t = three_exons(Strand::Forward);
        let exons_a = exon_statuses(&t, 50, Strand::Forward, PartnerRole::FivePrime);
        let exons_b = exon_statuses(&t, 700, Strand::Forward, PartnerRole::ThreePrime);
        assert!(
            build_fusion_transcript(&exons_a, &exons_b, 50, 700, Strand::Forward, Strand::Forward)
                .is_none()
        );
    }

    fn partner(symbol: &str, aa: Option<u32>, length: Option<u32>, ends: &[u32]) -> PartnerAnnotation {
        PartnerAnnotation {
            gene_symbol: symbol.to_string(),
            breakpoint: Breakpoint::new("1", 1000, Strand::Forward).unwrap(),
            transcript_id: None,
            protein_id: None,
            protein_length: length,
            aa_breakpoint: aa,
            frame_phase: None,
            domains: ends
                .iter()
                .map(|&end| AnnotatedDomain {
                    domain: DomainAnnotation {
                        name: "domain".to_string(),
                        description: None,
                        source: "Pfam".to_string(),
                        accession: None,
                        start: Some(1),
                        end: Some(end),
                        score: None,
                    },
                    status: DomainStatus::Unknown,
                    is_kinase: false,
                })
                .collect(),
        }
    }

    fn record(a: PartnerAnnotation, b: PartnerAnnotation) -> FusionRecord {
        FusionRecord {
            partner_a: a,
            partner_b: b,
            genome_build: GenomeAssembly::GRCh38,
            junction_reads: None,
            spanning_reads: None,
            is_in_frame: FrameStatus::Unknown,
            fusion_sequence: None,
            has_kinase_domain: false,
            kinase_retained: None,
            confidence: Confidence::Low,
        }
    }

    #[test]
    fn protein_layout_from_breakpoints() {
        let layout = ProteinLayout::from_record(&record(
            partner("BCR", Some(200), Some(1271), &[]),
            partner("ABL1", Some(229), Some(1130), &[]),
        ));
        assert_eq!(layout.length_a, 200);
        assert_eq!(layout.length_b, 901);
        assert_eq!(layout.junction_position, 200);
        assert_eq!(layout.total_length, 1101);
    }

    #[test]
    fn protein_layout_falls_back_to_domains_then_default() {
        let layout = ProteinLayout::from_record(&record(
            partner("A", None, None, &[50, 180]),
            partner("B", None, None, &[]),
        ));
        assert_eq!(layout.length_a, 180);
        assert_eq!(layout.length_b, 100);
        assert_eq!(layout.total_length, 280);

        let layout = ProteinLayout::from_record(&record(
            partner("A", None, None, &[]),
            partner("B", Some(400), None, &[120]),
        ));
        assert_eq!(layout.length_a, 100);
        assert_eq!(layout.length_b, 0);
    }
}
