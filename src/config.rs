use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use md5::{Digest, Md5};
use serde::Deserialize;

use crate::fusion::ConfidenceThresholds;
use crate::genome_assembly::GenomeAssembly;

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub md5: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub genome_assembly: String,
    pub annotation: FileEntry,
    #[serde(default)]
    pub proteins: Option<FileEntry>,
    #[serde(default)]
    pub confidence: ConfidenceThresholds,
}

impl RunConfig {
    /// Load and validate a config file. Relative paths are resolved against the
    /// directory holding the config.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        let base = path.parent().unwrap_or(Path::new("."));
        config.annotation.path = base.join(&config.annotation.path);
        if let Some(proteins) = config.proteins.as_mut() {
            proteins.path = base.join(&proteins.path);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.assembly()?;

        for (name, entry) in self.file_entries() {
            if let Some(md5) = &entry.md5 {
                validate_md5(name, md5)?;
            }
        }

        if self.confidence.high_min_reads < self.confidence.medium_min_reads {
            bail!(
                "invalid confidence thresholds: highMinReads ({}) is below mediumMinReads ({})",
                self.confidence.high_min_reads,
                self.confidence.medium_min_reads
            );
        }

        Ok(())
    }

    pub fn assembly(&self) -> Result<GenomeAssembly> {
        self.genome_assembly
            .parse::<GenomeAssembly>()
            .with_context(|| format!("invalid genome assembly: '{}'", self.genome_assembly))
    }

    /// Iterate all file entries uniformly as (name, entry) pairs.
    pub fn file_entries(&self) -> impl Iterator<Item = (&str, &FileEntry)> {
        std::iter::once(("annotation", &self.annotation))
            .chain(self.proteins.as_ref().map(|e| ("proteins", e)))
    }

    /// Check every file that carries an MD5 against its contents.
    pub fn verify_checksums(&self) -> Result<()> {
        for (name, entry) in self.file_entries() {
            let Some(expected) = &entry.md5 else {
                continue;
            };
            let actual = file_md5(&entry.path)
                .with_context(|| format!("failed to checksum {name}: {}", entry.path.display()))?;
            if !actual.eq_ignore_ascii_case(expected) {
                bail!(
                    "MD5 mismatch for '{name}' ({}): expected {expected}, got {actual}",
                    entry.path.display()
                );
            }
        }
        Ok(())
    }
}

fn validate_md5(name: &str, md5: &str) -> Result<()> {
    if md5.len() != 32 || !md5.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid MD5 for '{name}': expected 32 hex characters, got '{md5}'");
    }
    Ok(())
}

fn file_md5(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Md5::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn write_config(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f
    }

    #[test]
    fn valid_config_all_fields() {
        let json = r#"{
            "genomeAssembly": "GRCh38",
            "annotation": { "path": "annotation.json.gz", "md5": "21f3ac4aa8245a99eb874082051b9dde" },
            "proteins": { "path": "/data/Homo_sapiens.GRCh38.pep.all.fa.gz" },
            "confidence": { "highMinReads": 20, "mediumMinReads": 8 }
        }"#;
        let f = write_config(json);
        let config = RunConfig::from_file(f.path()).unwrap();
        assert_eq!(config.assembly().unwrap(), GenomeAssembly::GRCh38);
        assert_eq!(config.file_entries().count(), 2);
        assert_eq!(config.confidence.high_min_reads, 20);
        assert_eq!(
            config.annotation.path,
            f.path().parent().unwrap().join("annotation.json.gz")
        );
        assert_eq!(
            config.proteins.unwrap().path,
            PathBuf::from("/data/Homo_sapiens.GRCh38.pep.all.fa.gz")
        );
    }

    #[test]
    fn valid_config_optional_fields_omitted() {
        let json = r#"{
            "genomeAssembly": "hg19",
            "annotation": { "path": "annotation.json" }
        }"#;
        let f = write_config(json);
        let config = RunConfig::from_file(f.path()).unwrap();
        assert_eq!(config.assembly().unwrap(), GenomeAssembly::GRCh37);
        assert!(config.proteins.is_none());
        assert_eq!(config.confidence, ConfidenceThresholds::default());
        assert_eq!(config.file_entries().count(), 1);
    }

    #[test]
    fn invalid_md5() {
        let json = r#"{
            "genomeAssembly": "GRCh38",
            "annotation": { "path": "annotation.json", "md5": "not_a_valid_md5" }
        }"#;
        let f = write_config(json);
        let err = RunConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("invalid MD5"));
    }

    #[test]
    fn invalid_assembly_name() {
        let json = r#"{
            "genomeAssembly": "mm10",
            "annotation": { "path": "annotation.json" }
        }"#;
        let f = write_config(json);
        let err = RunConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("invalid genome assembly"));
    }

    #[test]
    fn inverted_thresholds() {
        let json = r#"{
            "genomeAssembly": "GRCh38",
            "annotation": { "path": "annotation.json" },
            "confidence": { "highMinReads": 3, "mediumMinReads": 5 }
        }"#;
        let f = write_config(json);
        let err = RunConfig::from_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("confidence thresholds"));
    }

    #[test]
    fn verifies_checksums() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("annotation.json"), b"hello world").unwrap();

        let write = |md5: &str| {
            let path = dir.path().join("config.json");
            let json = format!(
                r#"{{ "genomeAssembly": "GRCh38", "annotation": {{ "path": "annotation.json", "md5": "{md5}" }} }}"#
            );
            std::fs::write(&path, json).unwrap();
            RunConfig::from_file(&path).unwrap()
        };

        write("5eb63bbbe01eeed093cb22bb8f5acdc3")
            .verify_checksums()
            .unwrap();

        let err = write("00000000000000000000000000000000")
            .verify_checksums()
            .unwrap_err();
        assert!(err.to_string().contains("MD5 mismatch"));
    }
}
