//! Fusion input descriptors and the assembled fusion record.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chromosome;
use crate::domain::AnnotatedDomain;
use crate::error::Error;
use crate::genome_assembly::GenomeAssembly;
use crate::mapping::frame::FrameStatus;
use crate::partner::PartnerRole;
use crate::strand::Strand;

/// A genomic breakpoint. The chromosome is stored without its `chr` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    pub chromosome: String,
    pub position: i32,
    pub strand: Strand,
}

impl Breakpoint {
    /// Build a breakpoint, normalizing the chromosome name and rejecting positions below 1.
    pub fn new(chromosome: &str, position: i32, strand: Strand) -> Result<Self, Error> {
        let chromosome = chromosome::normalize(chromosome)?;
        if position < 1 {
            return Err(Error::Validation(format!(
                "breakpoint position must be >= 1, got {position}"
            )));
        }
        Ok(Self {
            chromosome,
            position,
            strand,
        })
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chr{}:{}:{}", self.chromosome, self.position, self.strand)
    }
}

/// One partner of a fusion call as it comes out of a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerDescriptor {
    pub gene_symbol: String,
    pub breakpoint: Breakpoint,
    pub transcript_id: Option<String>,
}

impl PartnerDescriptor {
    #[must_use]
    pub fn new(gene_symbol: &str, breakpoint: Breakpoint) -> Self {
        Self {
            gene_symbol: gene_symbol.trim().to_string(),
            breakpoint,
            transcript_id: None,
        }
    }

    #[must_use]
    pub fn with_transcript(mut self, transcript_id: &str) -> Self {
        self.transcript_id = Some(transcript_id.to_string());
        self
    }

    fn validate(&self, role: PartnerRole) -> Result<(), Error> {
        if self.gene_symbol.trim().is_empty() {
            return Err(Error::Validation(format!(
                "partner {}: gene symbol is empty",
                role.label()
            )));
        }
        if self.breakpoint.chromosome.is_empty() {
            return Err(Error::Validation(format!(
                "partner {}: chromosome is empty",
                role.label()
            )));
        }
        if self.breakpoint.position < 1 {
            return Err(Error::Validation(format!(
                "partner {}: breakpoint position must be >= 1, got {}",
                role.label(),
                self.breakpoint.position
            )));
        }
        Ok(())
    }
}

/// A parsed fusion call: partner A is the 5' gene, partner B the 3' gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FusionInput {
    pub partner_a: PartnerDescriptor,
    pub partner_b: PartnerDescriptor,
    pub junction_reads: Option<u32>,
    pub spanning_reads: Option<u32>,
    pub genome_build: GenomeAssembly,
}

impl FusionInput {
    #[must_use]
    pub fn new(partner_a: PartnerDescriptor, partner_b: PartnerDescriptor) -> Self {
        Self {
            partner_a,
            partner_b,
            junction_reads: None,
            spanning_reads: None,
            genome_build: GenomeAssembly::default(),
        }
    }

    #[must_use]
    pub fn with_reads(mut self, junction: u32, spanning: u32) -> Self {
        self.junction_reads = Some(junction);
        self.spanning_reads = Some(spanning);
        self
    }

    /// Junction plus spanning reads, missing counts taken as 0.
    #[must_use]
    pub fn total_reads(&self) -> u32 {
        self.junction_reads
            .unwrap_or(0)
            .saturating_add(self.spanning_reads.unwrap_or(0))
    }

    #[must_use]
    pub fn fusion_name(&self) -> String {
        format!(
            "{}--{}",
            self.partner_a.gene_symbol, self.partner_b.gene_symbol
        )
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.partner_a.validate(PartnerRole::FivePrime)?;
        self.partner_b.validate(PartnerRole::ThreePrime)
    }
}

/// Overall confidence in a fusion call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

/// Read-support cut-offs for [`Confidence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfidenceThresholds {
    pub high_min_reads: u32,
    pub medium_min_reads: u32,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high_min_reads: 10,
            medium_min_reads: 5,
        }
    }
}

impl ConfidenceThresholds {
    /// High needs both enough reads and a confirmed in-frame verdict; an unknown frame
    /// never counts as in frame.
    #[must_use]
    pub fn classify(&self, total_reads: u32, frame: FrameStatus) -> Confidence {
        if total_reads >= self.high_min_reads && frame.is_in_frame() {
            Confidence::High
        } else if total_reads >= self.medium_min_reads {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Per-partner half of a [`FusionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerAnnotation {
    pub gene_symbol: String,
    pub breakpoint: Breakpoint,
    pub transcript_id: Option<String>,
    pub protein_id: Option<String>,
    pub protein_length: Option<u32>,
    pub aa_breakpoint: Option<u32>,
    pub frame_phase: Option<u8>,
    pub domains: Vec<AnnotatedDomain>,
}

/// The assembled fusion. Built once; only [`refresh_domains`] changes it afterwards.
///
/// [`refresh_domains`]: crate::fusion::FusionAssembler::refresh_domains
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionRecord {
    pub partner_a: PartnerAnnotation,
    pub partner_b: PartnerAnnotation,
    pub genome_build: GenomeAssembly,
    pub junction_reads: Option<u32>,
    pub spanning_reads: Option<u32>,
    pub is_in_frame: FrameStatus,
    pub fusion_sequence: Option<String>,
    pub has_kinase_domain: bool,
    pub kinase_retained: Option<bool>,
    pub confidence: Confidence,
}

impl FusionRecord {
    #[must_use]
    pub fn fusion_name(&self) -> String {
        format!(
            "{}--{}",
            self.partner_a.gene_symbol, self.partner_b.gene_symbol
        )
    }
}
