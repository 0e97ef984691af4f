//! Reference-data collaborator: transcripts, proteins and domains.
//!
//! The fusion engine never fetches anything itself. It asks a [`ReferenceProvider`] for
//! already-resolved records and treats "nothing found" as missing data, not as an error.

pub mod store;

use crate::domain::DomainAnnotation;
use crate::genome_assembly::GenomeAssembly;
use crate::transcript::TranscriptModel;

pub use store::{AnnotationStore, GeneRecord};

/// Source of transcript models and domain annotations.
///
/// Implementations must be shareable across threads: batch assembly queries one provider
/// from several workers at once.
pub trait ReferenceProvider: Sync {
    /// Resolve the transcript to use for a fusion partner.
    ///
    /// An explicit `transcript_id` is looked up directly; otherwise the gene's canonical
    /// transcript is returned, falling back to its first protein-coding transcript.
    fn resolve_transcript(
        &self,
        assembly: GenomeAssembly,
        gene_symbol: &str,
        transcript_id: Option<&str>,
    ) -> Option<TranscriptModel>;

    /// Domains annotated on a protein, in provider order. Empty when none are known.
    fn domains(&self, assembly: GenomeAssembly, protein_id: &str) -> Vec<DomainAnnotation>;
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for &P {
    fn resolve_transcript(
        &self,
        assembly: GenomeAssembly,
        gene_symbol: &str,
        transcript_id: Option<&str>,
    ) -> Option<TranscriptModel> {
        (**self).resolve_transcript(assembly, gene_symbol, transcript_id)
    }

    fn domains(&self, assembly: GenomeAssembly, protein_id: &str) -> Vec<DomainAnnotation> {
        (**self).domains(assembly, protein_id)
    }
}
