//! Protein domain retention across a fusion breakpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::partner::PartnerRole;

/// Name fragments that mark a domain as a kinase domain (case-sensitive).
pub const KINASE_KEYWORDS: [&str; 6] = ["kinase", "Kinase", "Pkinase", "TyrKc", "S_TKc", "STYKc"];

/// A protein domain as reported by the domain-annotation provider.
///
/// Coordinates are protein-relative, 1-based inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainAnnotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source: String,
    #[serde(default)]
    pub accession: Option<String>,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub end: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Fate of a domain in the fusion protein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Retained,
    Truncated,
    Lost,
    Unknown,
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Retained => "retained",
            Self::Truncated => "truncated",
            Self::Lost => "lost",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A domain with its retention status for one fusion partner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedDomain {
    #[serde(flatten)]
    pub domain: DomainAnnotation,
    pub status: DomainStatus,
    pub is_kinase: bool,
}

/// Classify a domain against an amino-acid breakpoint.
///
/// Equality favours the retained side: a 5' domain ending exactly at the breakpoint and a
/// 3' domain starting exactly at it are both fully retained.
#[must_use]
pub fn domain_status(
    start: Option<u32>,
    end: Option<u32>,
    breakpoint_aa: Option<u32>,
    role: PartnerRole,
) -> DomainStatus {
    let (Some(start), Some(end), Some(bp)) = (start, end, breakpoint_aa) else {
        return DomainStatus::Unknown;
    };

    match role {
        PartnerRole::FivePrime => {
            if end <= bp {
                DomainStatus::Retained
            } else if start >= bp {
                DomainStatus::Lost
            } else {
                DomainStatus::Truncated
            }
        }
        PartnerRole::ThreePrime => {
            if start >= bp {
                DomainStatus::Retained
            } else if end <= bp {
                DomainStatus::Lost
            } else {
                DomainStatus::Truncated
            }
        }
    }
}

#[must_use]
pub fn is_kinase(name: &str) -> bool {
    KINASE_KEYWORDS.iter().any(|kw| name.contains(kw))
}

/// Classify every domain of one partner.
#[must_use]
pub fn annotate_domains(
    domains: Vec<DomainAnnotation>,
    breakpoint_aa: Option<u32>,
    role: PartnerRole,
) -> Vec<AnnotatedDomain> {
    domains
        .into_iter()
        .map(|domain| {
            let status = domain_status(domain.start, domain.end, breakpoint_aa, role);
            let is_kinase = is_kinase(&domain.name);
            AnnotatedDomain {
                domain,
                status,
                is_kinase,
            }
        })
        .collect()
}

/// Fusion-level kinase summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KinaseSummary {
    pub has_kinase_domain: bool,
    /// `None` when no kinase domain decided the question.
    pub kinase_retained: Option<bool>,
}

impl KinaseSummary {
    /// Scan partner A's domains, then partner B's, in order.
    ///
    /// A retained kinase sets `true`; a truncated kinase always sets `false`; a lost kinase
    /// sets `false` only while still undecided. The result therefore depends on domain
    /// order.
    #[must_use]
    pub fn from_domains(domains_a: &[AnnotatedDomain], domains_b: &[AnnotatedDomain]) -> Self {
        let mut summary = Self::default();

        for domain in domains_a.iter().chain(domains_b).filter(|d| d.is_kinase) {
            summary.has_kinase_domain = true;
            match domain.status {
                DomainStatus::Retained => summary.kinase_retained = Some(true),
                DomainStatus::Lost if summary.kinase_retained.is_none() => {
                    summary.kinase_retained = Some(false);
                }
                DomainStatus::Truncated => summary.kinase_retained = Some(false),
                _ => {}
            }
        }

        summary
    }
}
