//! Protein sequence dictionary for filling reference transcripts.

use std::collections::HashMap;
use std::io::Read;

use crate::error::Error;
use crate::fasta;

/// Protein sequences keyed by protein ID, with a transcript cross-reference.
#[derive(Debug, Default)]
pub struct ProteinSequences {
    sequences: HashMap<String, String>,
    /// Unversioned protein ID -> versioned key in `sequences`.
    unversioned: HashMap<String, String>,
    transcript_to_protein: HashMap<String, String>,
}

impl ProteinSequences {
    /// Build from an Ensembl peptide FASTA, plain or gzip-compressed.
    ///
    /// Headers carrying a ` transcript:<id>` token populate the transcript cross-reference.
    /// Trailing stop symbols are removed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let records = fasta::read_fasta(reader)?;
        let mut sequences = HashMap::with_capacity(records.len());
        let mut unversioned = HashMap::new();
        let mut transcript_to_protein = HashMap::new();

        for record in records {
            let protein_id = record.id;
            if sequences.contains_key(&protein_id) {
                return Err(Error::Validation(format!(
                    "duplicate protein ID in protein FASTA: {protein_id}"
                )));
            }

            if let Some(tid) = header_token(&record.header, "transcript:") {
                if transcript_to_protein.contains_key(tid) {
                    return Err(Error::Validation(format!(
                        "duplicate transcript ID in protein FASTA cross-reference: {tid}"
                    )));
                }
                transcript_to_protein.insert(tid.to_string(), protein_id.clone());
                let base = strip_version(tid);
                if base != tid {
                    transcript_to_protein
                        .entry(base.to_string())
                        .or_insert_with(|| protein_id.clone());
                }
            }

            let base = strip_version(&protein_id);
            if base != protein_id {
                unversioned
                    .entry(base.to_string())
                    .or_insert_with(|| protein_id.clone());
            }

            let mut seq = String::from_utf8_lossy(&record.sequence).into_owned();
            while seq.ends_with('*') {
                seq.pop();
            }
            sequences.insert(protein_id, seq);
        }

        Ok(Self {
            sequences,
            unversioned,
            transcript_to_protein,
        })
    }

    /// Look up a sequence by protein ID. Versioned and unversioned IDs match each other.
    #[must_use]
    pub fn get_by_protein_id(&self, protein_id: &str) -> Option<&str> {
        let base = strip_version(protein_id);
        self.sequences
            .get(protein_id)
            .or_else(|| self.sequences.get(base))
            .or_else(|| {
                self.unversioned
                    .get(base)
                    .and_then(|key| self.sequences.get(key))
            })
            .map(String::as_str)
    }

    #[must_use]
    pub fn protein_id_for_transcript(&self, transcript_id: &str) -> Option<&str> {
        self.transcript_to_protein
            .get(transcript_id)
            .or_else(|| self.transcript_to_protein.get(strip_version(transcript_id)))
            .map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

fn header_token<'a>(header: &'a str, key: &str) -> Option<&'a str> {
    header
        .split_whitespace()
        .find_map(|token| token.strip_prefix(key))
        .filter(|v| !v.is_empty())
}

/// `ENST00000305877.13` -> `ENST00000305877`.
#[must_use]
pub fn strip_version(id: &str) -> &str {
    match id.rsplit_once('.') {
        Some((base, version)) if !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) => {
            base
        }
        _ => id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_with_cross_reference() {
        let fasta = b">ENSP00000303507 pep chromosome:GRCh38:22:1:2:1 gene:ENSG00000186716 transcript:ENST00000305877 gene_biotype:protein_coding\nMVDPVGF\nGEAW*\n";
        let prot = ProteinSequences::from_reader(&fasta[..]).unwrap();
        assert_eq!(prot.len(), 1);
        assert_eq!(prot.get_by_protein_id("ENSP00000303507"), Some("MVDPVGFGEAW"));
        assert_eq!(
            prot.protein_id_for_transcript("ENST00000305877"),
            Some("ENSP00000303507")
        );
    }

    #[test]
    fn versioned_lookups_fall_back() {
        let fasta = b">ENSP1 pep transcript:ENST1\nMK\n";
        let prot = ProteinSequences::from_reader(&fasta[..]).unwrap();
        assert_eq!(prot.get_by_protein_id("ENSP1.3"), Some("MK"));
        assert_eq!(prot.protein_id_for_transcript("ENST1.7"), Some("ENSP1"));
    }

    #[test]
    fn versioned_fasta_matches_unversioned_ids() {
        let fasta = b">ENSP00000303507.4 pep transcript:ENST00000305877.13\nMKV\n";
        let prot = ProteinSequences::from_reader(&fasta[..]).unwrap();
        assert_eq!(prot.len(), 1);
        assert_eq!(prot.get_by_protein_id("ENSP00000303507"), Some("MKV"));
        assert_eq!(prot.get_by_protein_id("ENSP00000303507.2"), Some("MKV"));
        assert_eq!(
            prot.protein_id_for_transcript("ENST00000305877"),
            Some("ENSP00000303507.4")
        );
    }

    #[test]
    fn without_transcript_marker() {
        let fasta = b">NP_999.1 some protein\nMACK\n";
        let prot = ProteinSequences::from_reader(&fasta[..]).unwrap();
        assert_eq!(prot.get_by_protein_id("NP_999.1"), Some("MACK"));
        assert!(prot.protein_id_for_transcript("anything").is_none());
    }

    #[test]
    fn duplicate_protein_is_error() {
        let fasta = b">ENSP1 first\nMACK\n>ENSP1 second\nMMMM\n";
        assert!(ProteinSequences::from_reader(&fasta[..]).is_err());
    }

    #[test]
    fn strip_version_only_numeric_suffix() {
        assert_eq!(strip_version("ENST00000305877.13"), "ENST00000305877");
        assert_eq!(strip_version("ENST00000305877"), "ENST00000305877");
        assert_eq!(strip_version("weird.id"), "weird.id");
    }
}
