//! File-backed reference provider built from a JSON annotation snapshot.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

use crate::domain::DomainAnnotation;
use crate::error::Error;
use crate::fasta::open_maybe_gz;
use crate::genome_assembly::GenomeAssembly;
use crate::sequence::{ProteinSequences, strip_version};
use crate::transcript::{ProteinRecord, TranscriptModel};

use super::ReferenceProvider;

/// A gene and its transcripts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneRecord {
    pub symbol: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub chromosome: Option<String>,
    #[serde(default)]
    pub transcripts: Vec<TranscriptModel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    genome_assembly: GenomeAssembly,
    #[serde(default)]
    genes: Vec<GeneRecord>,
    #[serde(default)]
    domains: HashMap<String, Vec<DomainAnnotation>>,
}

/// In-memory reference data for one genome assembly.
#[derive(Debug)]
pub struct AnnotationStore {
    assembly: GenomeAssembly,
    genes: Vec<GeneRecord>,
    /// Upper-cased symbol -> gene index.
    symbol_index: HashMap<String, usize>,
    /// Transcript ID -> (gene index, transcript index).
    transcript_index: HashMap<String, (usize, usize)>,
    domains: HashMap<String, Vec<DomainAnnotation>>,
}

impl AnnotationStore {
    #[must_use]
    pub fn new(assembly: GenomeAssembly) -> Self {
        Self {
            assembly,
            genes: Vec::new(),
            symbol_index: HashMap::new(),
            transcript_index: HashMap::new(),
            domains: HashMap::new(),
        }
    }

    /// Load a snapshot from a JSON file, plain or gzip-compressed.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let snapshot: Snapshot = serde_json::from_reader(open_maybe_gz(reader)?)?;

        let mut store = Self::new(snapshot.genome_assembly);
        for gene in snapshot.genes {
            store.add_gene(gene);
        }
        for (protein_id, domains) in snapshot.domains {
            store.add_domains(&protein_id, domains);
        }

        info!(
            "loaded {} genes, {} transcripts, {} annotated proteins ({})",
            store.num_genes(),
            store.num_transcripts(),
            store.domains.len(),
            store.assembly
        );
        Ok(store)
    }

    /// Add a gene. Transcripts that fail validation are dropped with a warning.
    pub fn add_gene(&mut self, mut gene: GeneRecord) {
        gene.transcripts.retain(|t| match t.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("{}: skipping transcript: {e}", gene.symbol);
                false
            }
        });
        for transcript in &mut gene.transcripts {
            if let Some(protein) = transcript.protein.as_mut()
                && protein.sequence.as_deref().is_some_and(|s| !s.is_ascii())
            {
                warn!(
                    "{}: dropping protein sequence of {} with non-ASCII residues",
                    gene.symbol, protein.id
                );
                protein.sequence = None;
            }
        }

        let gene_idx = self.genes.len();
        for (t_idx, transcript) in gene.transcripts.iter().enumerate() {
            self.transcript_index
                .insert(transcript.id.clone(), (gene_idx, t_idx));
            let unversioned = strip_version(&transcript.id);
            if unversioned != transcript.id {
                self.transcript_index
                    .entry(unversioned.to_string())
                    .or_insert((gene_idx, t_idx));
            }
        }
        self.symbol_index
            .insert(gene.symbol.to_uppercase(), gene_idx);
        self.genes.push(gene);
    }

    /// Register domains for a protein. Inverted ranges are dropped with a warning.
    pub fn add_domains(&mut self, protein_id: &str, domains: Vec<DomainAnnotation>) {
        let kept: Vec<DomainAnnotation> = domains
            .into_iter()
            .filter(|d| match (d.start, d.end) {
                (Some(start), Some(end)) if start > end => {
                    warn!(
                        "{protein_id}: skipping domain {} with inverted range {start}-{end}",
                        d.name
                    );
                    false
                }
                _ => true,
            })
            .collect();
        self.domains
            .entry(protein_id.to_string())
            .or_default()
            .extend(kept);
    }

    /// Fill missing protein sequences from a peptide FASTA dictionary.
    ///
    /// Returns the number of transcripts that received a sequence.
    pub fn attach_proteins(&mut self, proteins: &ProteinSequences) -> usize {
        let mut filled = 0;
        for transcript in self.genes.iter_mut().flat_map(|g| g.transcripts.iter_mut()) {
            if transcript.protein_sequence().is_some() {
                continue;
            }

            let protein_id = transcript
                .protein_id()
                .map(str::to_string)
                .or_else(|| {
                    proteins
                        .protein_id_for_transcript(&transcript.id)
                        .map(str::to_string)
                });
            let Some(protein_id) = protein_id else {
                continue;
            };
            let Some(sequence) = proteins.get_by_protein_id(&protein_id) else {
                continue;
            };
            if !sequence.is_ascii() {
                warn!("{protein_id}: skipping FASTA sequence with non-ASCII residues");
                continue;
            }

            let protein = transcript.protein.get_or_insert_with(|| ProteinRecord {
                id: protein_id.clone(),
                length: None,
                sequence: None,
            });
            protein.sequence = Some(sequence.to_string());
            filled += 1;
        }
        filled
    }

    #[must_use]
    pub fn assembly(&self) -> GenomeAssembly {
        self.assembly
    }

    #[must_use]
    pub fn gene(&self, symbol: &str) -> Option<&GeneRecord> {
        self.symbol_index
            .get(&symbol.trim().to_uppercase())
            .map(|&idx| &self.genes[idx])
    }

    #[must_use]
    pub fn transcript(&self, transcript_id: &str) -> Option<&TranscriptModel> {
        let (g, t) = self
            .transcript_index
            .get(transcript_id)
            .or_else(|| self.transcript_index.get(strip_version(transcript_id)))?;
        Some(&self.genes[*g].transcripts[*t])
    }

    #[must_use]
    pub fn num_genes(&self) -> usize {
        self.genes.len()
    }

    #[must_use]
    pub fn num_transcripts(&self) -> usize {
        self.genes.iter().map(|g| g.transcripts.len()).sum()
    }
}

fn default_transcript(gene: &GeneRecord) -> Option<&TranscriptModel> {
    gene.transcripts
        .iter()
        .find(|t| t.is_canonical)
        .or_else(|| {
            gene.transcripts
                .iter()
                .find(|t| t.biotype == "protein_coding")
        })
}

impl ReferenceProvider for AnnotationStore {
    fn resolve_transcript(
        &self,
        assembly: GenomeAssembly,
        gene_symbol: &str,
        transcript_id: Option<&str>,
    ) -> Option<TranscriptModel> {
        if assembly != self.assembly {
            return None;
        }
        match transcript_id {
            Some(id) => self.transcript(id).cloned(),
            None => self.gene(gene_symbol).and_then(default_transcript).cloned(),
        }
    }

    fn domains(&self, assembly: GenomeAssembly, protein_id: &str) -> Vec<DomainAnnotation> {
        if assembly != self.assembly {
            return Vec::new();
        }
        self.domains
            .get(protein_id)
            .or_else(|| self.domains.get(strip_version(protein_id)))
            .cloned()
            .unwrap_or_default()
    }
}
