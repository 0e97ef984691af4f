//! Builds fusion records from parsed calls and reference data.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::domain::{AnnotatedDomain, KinaseSummary, annotate_domains};
use crate::error::Error;
use crate::genome_assembly::GenomeAssembly;
use crate::mapping::frame::{FrameStatus, PartnerBreakpoint, is_in_frame_fusion};
use crate::mapping::{amino_acid_position, frame_phase};
use crate::partner::PartnerRole;
use crate::reference::ReferenceProvider;
use crate::transcript::TranscriptModel;
use crate::visualization::{
    FusionTranscriptView, PartnerExonView, breakpoint_location, build_fusion_transcript,
    exon_statuses,
};

use super::types::{
    ConfidenceThresholds, FusionInput, FusionRecord, PartnerAnnotation, PartnerDescriptor,
};

/// One partner after transcript resolution and breakpoint mapping.
struct ResolvedPartner<'a> {
    descriptor: &'a PartnerDescriptor,
    transcript: Option<TranscriptModel>,
    aa_breakpoint: Option<u32>,
}

impl ResolvedPartner<'_> {
    fn breakpoint(&self) -> Option<PartnerBreakpoint<'_>> {
        self.transcript.as_ref().map(|transcript| PartnerBreakpoint {
            transcript,
            position: self.descriptor.breakpoint.position,
            strand: self.descriptor.breakpoint.strand,
        })
    }

    fn protein_sequence(&self) -> Option<&str> {
        self.transcript.as_ref().and_then(TranscriptModel::protein_sequence)
    }
}

/// Concatenate partner A's protein up to its breakpoint with partner B's protein from
/// its breakpoint on.
///
/// A breakpoint that is missing or outside `1..=len` keeps that partner's full sequence.
/// `None` when either sequence is unavailable or not plain ASCII residue codes.
#[must_use]
pub fn build_fusion_sequence(
    sequence_a: Option<&str>,
    aa_breakpoint_a: Option<u32>,
    sequence_b: Option<&str>,
    aa_breakpoint_b: Option<u32>,
) -> Option<String> {
    let (seq_a, seq_b) = (sequence_a?, sequence_b?);
    if seq_a.is_empty() || seq_b.is_empty() || !seq_a.is_ascii() || !seq_b.is_ascii() {
        return None;
    }

    let head = match aa_breakpoint_a.map(|aa| aa as usize) {
        Some(aa) if aa >= 1 && aa <= seq_a.len() => &seq_a[..aa],
        _ => seq_a,
    };
    let tail = match aa_breakpoint_b.map(|aa| aa as usize) {
        Some(aa) if aa >= 1 && aa <= seq_b.len() => &seq_b[aa - 1..],
        _ => seq_b,
    };

    let mut fused = String::with_capacity(head.len() + tail.len());
    fused.push_str(head);
    fused.push_str(tail);
    Some(fused)
}

/// Fusion Assembler: resolves both partners through a [`ReferenceProvider`] and derives
/// protein-level annotations.
///
/// Holds no mutable state, so one assembler can serve many fusions concurrently.
pub struct FusionAssembler<P> {
    provider: P,
    thresholds: ConfidenceThresholds,
}

impl<P: ReferenceProvider> FusionAssembler<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            thresholds: ConfidenceThresholds::default(),
        }
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: ConfidenceThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn resolve<'a>(
        &self,
        descriptor: &'a PartnerDescriptor,
        assembly: GenomeAssembly,
        role: PartnerRole,
    ) -> ResolvedPartner<'a> {
        let transcript = self.provider.resolve_transcript(
            assembly,
            &descriptor.gene_symbol,
            descriptor.transcript_id.as_deref(),
        );

        let aa_breakpoint = match &transcript {
            Some(t) => {
                let bp = &descriptor.breakpoint;
                let aa = amino_acid_position(bp.position, bp.strand, t);
                if aa.is_none() {
                    debug!(
                        "{} ({role}): {bp} does not map onto the CDS of {}",
                        descriptor.gene_symbol, t.id
                    );
                }
                aa
            }
            None => {
                warn!(
                    "{} ({role}): no transcript found on {assembly}",
                    descriptor.gene_symbol
                );
                None
            }
        };

        ResolvedPartner {
            descriptor,
            transcript,
            aa_breakpoint,
        }
    }

    fn partner_domains(
        &self,
        gene_symbol: &str,
        protein_id: Option<&str>,
        aa_breakpoint: Option<u32>,
        assembly: GenomeAssembly,
        role: PartnerRole,
    ) -> Vec<AnnotatedDomain> {
        let Some(protein_id) = protein_id else {
            return Vec::new();
        };
        let domains = self.provider.domains(assembly, protein_id);
        if domains.is_empty() {
            warn!("{gene_symbol} ({role}): no domains annotated on {protein_id}");
        }
        annotate_domains(domains, aa_breakpoint, role)
    }

    fn annotate_partner(
        &self,
        partner: &ResolvedPartner<'_>,
        assembly: GenomeAssembly,
        role: PartnerRole,
    ) -> PartnerAnnotation {
        let descriptor = partner.descriptor;
        let transcript = partner.transcript.as_ref();
        let protein_id = transcript.and_then(TranscriptModel::protein_id);

        if let Some(t) = transcript
            && protein_id.is_none()
        {
            warn!(
                "{} ({role}): transcript {} has no protein product",
                descriptor.gene_symbol, t.id
            );
        }

        PartnerAnnotation {
            gene_symbol: descriptor.gene_symbol.clone(),
            breakpoint: descriptor.breakpoint.clone(),
            transcript_id: transcript.map(|t| t.id.clone()),
            protein_id: protein_id.map(str::to_string),
            protein_length: transcript
                .and_then(|t| t.protein.as_ref())
                .and_then(|p| p.resolved_length()),
            aa_breakpoint: partner.aa_breakpoint,
            frame_phase: transcript.and_then(|t| {
                frame_phase(descriptor.breakpoint.position, descriptor.breakpoint.strand, t)
            }),
            domains: self.partner_domains(
                &descriptor.gene_symbol,
                protein_id,
                partner.aa_breakpoint,
                assembly,
                role,
            ),
        }
    }

    /// Assemble one fusion.
    ///
    /// Missing reference data degrades the affected fields to `None` or empty; the only
    /// error is a structurally invalid input.
    pub fn build_fusion(&self, input: &FusionInput) -> Result<FusionRecord, Error> {
        input.validate()?;
        let assembly = input.genome_build;

        let a = self.resolve(&input.partner_a, assembly, PartnerRole::FivePrime);
        let b = self.resolve(&input.partner_b, assembly, PartnerRole::ThreePrime);

        let is_in_frame = match (a.breakpoint(), b.breakpoint()) {
            (Some(bp_a), Some(bp_b)) => FrameStatus::from(is_in_frame_fusion(bp_a, bp_b)),
            _ => FrameStatus::Unknown,
        };

        let partner_a = self.annotate_partner(&a, assembly, PartnerRole::FivePrime);
        let partner_b = self.annotate_partner(&b, assembly, PartnerRole::ThreePrime);

        let fusion_sequence = build_fusion_sequence(
            a.protein_sequence(),
            a.aa_breakpoint,
            b.protein_sequence(),
            b.aa_breakpoint,
        );

        let kinase = KinaseSummary::from_domains(&partner_a.domains, &partner_b.domains);
        let confidence = self.thresholds.classify(input.total_reads(), is_in_frame);

        debug!(
            "{}: aa {:?}/{:?}, {is_in_frame}, {confidence} confidence",
            input.fusion_name(),
            a.aa_breakpoint,
            b.aa_breakpoint
        );

        Ok(FusionRecord {
            partner_a,
            partner_b,
            genome_build: assembly,
            junction_reads: input.junction_reads,
            spanning_reads: input.spanning_reads,
            is_in_frame,
            fusion_sequence,
            has_kinase_domain: kinase.has_kinase_domain,
            kinase_retained: kinase.kinase_retained,
            confidence,
        })
    }

    /// Assemble many fusions in parallel. Results come back in input order.
    pub fn build_batch(&self, inputs: &[FusionInput]) -> Vec<Result<FusionRecord, Error>> {
        let results: Vec<Result<FusionRecord, Error>> = inputs
            .par_iter()
            .map(|input| self.build_fusion(input))
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        info!(
            "assembled {} of {} fusions ({failed} failed)",
            results.len() - failed,
            results.len()
        );
        results
    }

    /// Re-fetch and re-classify both domain lists, then recompute the kinase summary.
    pub fn refresh_domains(&self, record: &mut FusionRecord) {
        let assembly = record.genome_build;
        for (partner, role) in [
            (&mut record.partner_a, PartnerRole::FivePrime),
            (&mut record.partner_b, PartnerRole::ThreePrime),
        ] {
            partner.domains = self.partner_domains(
                &partner.gene_symbol,
                partner.protein_id.as_deref(),
                partner.aa_breakpoint,
                assembly,
                role,
            );
        }

        let kinase = KinaseSummary::from_domains(&record.partner_a.domains, &record.partner_b.domains);
        record.has_kinase_domain = kinase.has_kinase_domain;
        record.kinase_retained = kinase.kinase_retained;
    }

    /// Exon-level view of a fusion. `None` when either partner's transcript is unresolved.
    pub fn transcript_view(&self, input: &FusionInput) -> Option<FusionTranscriptView> {
        let assembly = input.genome_build;
        let resolve = |descriptor: &PartnerDescriptor| {
            self.provider.resolve_transcript(
                assembly,
                &descriptor.gene_symbol,
                descriptor.transcript_id.as_deref(),
            )
        };
        let transcript_a = resolve(&input.partner_a)?;
        let transcript_b = resolve(&input.partner_b)?;

        let bp_a = &input.partner_a.breakpoint;
        let bp_b = &input.partner_b.breakpoint;
        let exons_a = exon_statuses(
            &transcript_a,
            bp_a.position,
            bp_a.strand,
            PartnerRole::FivePrime,
        );
        let exons_b = exon_statuses(
            &transcript_b,
            bp_b.position,
            bp_b.strand,
            PartnerRole::ThreePrime,
        );

        let transcript = build_fusion_transcript(
            &exons_a,
            &exons_b,
            bp_a.position,
            bp_b.position,
            bp_a.strand,
            bp_b.strand,
        );

        Some(FusionTranscriptView {
            fusion_name: input.fusion_name(),
            partner_a: PartnerExonView {
                transcript_id: transcript_a.id,
                location: breakpoint_location(
                    &exons_a,
                    bp_a.position,
                    bp_a.strand,
                    PartnerRole::FivePrime,
                ),
                exons: exons_a,
            },
            partner_b: PartnerExonView {
                transcript_id: transcript_b.id,
                location: breakpoint_location(
                    &exons_b,
                    bp_b.position,
                    bp_b.strand,
                    PartnerRole::ThreePrime,
                ),
                exons: exons_b,
            },
            transcript,
        })
    }
}
