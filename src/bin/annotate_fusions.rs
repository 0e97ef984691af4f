use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::Level;
use serde::Serialize;
use simple_logger::init_with_level;

use juncture::cli;
use juncture::config::RunConfig;
use juncture::fasta::write_fasta;
use juncture::fusion::{Confidence, FusionAssembler, FusionInput, FusionRecord};
use juncture::input::{self, InputFormat, detect_format};
use juncture::reference::AnnotationStore;
use juncture::sequence::ProteinSequences;
use juncture::visualization::{FusionTranscriptView, ProteinLayout};

#[derive(Parser)]
#[command(
    name = "annotate_fusions",
    about = "Map gene-fusion breakpoints onto transcripts, proteins and domains"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Fusion calls (manual entry, STAR-Fusion or Arriba TSV)
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output JSON file
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Input format
    #[arg(long, value_enum, default_value = "auto")]
    format: FormatArg,

    /// Also write the fusion proteins to this FASTA file
    #[arg(long)]
    fasta: Option<PathBuf>,

    /// Include exon-level fusion transcript models in the output
    #[arg(long)]
    transcripts: bool,

    /// Log per-partner mapping details
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Auto,
    Manual,
    StarFusion,
    Arriba,
}

impl FormatArg {
    fn resolve(self, content: &str) -> InputFormat {
        match self {
            FormatArg::Auto => detect_format(content),
            FormatArg::Manual => InputFormat::Manual,
            FormatArg::StarFusion => InputFormat::StarFusion,
            FormatArg::Arriba => InputFormat::Arriba,
        }
    }
}

#[derive(Serialize)]
struct FusionEntry<'a> {
    line: usize,
    name: String,
    #[serde(flatten)]
    record: &'a FusionRecord,
    protein_layout: ProteinLayout,
}

#[derive(Serialize)]
struct Failure {
    line: usize,
    error: String,
}

#[derive(Serialize)]
struct Report<'a> {
    fusions: Vec<FusionEntry<'a>>,
    failures: Vec<Failure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcripts: Option<Vec<FusionTranscriptView>>,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();

    let level = if cli_args.verbose {
        Level::Debug
    } else {
        Level::Warn
    };
    init_with_level(level).context("failed to initialize logger")?;

    cli::banner("Annotate Fusions");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = RunConfig::from_file(&cli_args.config)?;
    let assembly = config.assembly()?;

    cli::kv("Config", &cli_args.config.display().to_string());
    cli::kv("Assembly", &assembly.to_string());
    cli::kv("Annotation", &config.annotation.path.display().to_string());
    if let Some(proteins) = &config.proteins {
        cli::kv("Proteins", &proteins.path.display().to_string());
    }
    cli::kv(
        "Confidence",
        &format!(
            "high >= {} reads (in frame), medium >= {} reads",
            config.confidence.high_min_reads, config.confidence.medium_min_reads
        ),
    );

    config.verify_checksums()?;
    if config.file_entries().any(|(_, e)| e.md5.is_some()) {
        cli::success("checksums verified");
    }

    eprintln!();

    // ── Reference Data ───────────────────────────────────
    cli::section("Reference Data");

    let mut store = AnnotationStore::from_path(&config.annotation.path).with_context(|| {
        format!(
            "failed to load annotation: {}",
            config.annotation.path.display()
        )
    })?;
    if store.assembly() != assembly {
        bail!(
            "annotation is for {} but the config requests {assembly}",
            store.assembly()
        );
    }
    cli::kv("Genes", &store.num_genes().to_string());
    cli::kv("Transcripts", &store.num_transcripts().to_string());

    if let Some(entry) = &config.proteins {
        let file = File::open(&entry.path)
            .with_context(|| format!("failed to open proteins: {}", entry.path.display()))?;
        let proteins = ProteinSequences::from_reader(file)
            .with_context(|| format!("failed to parse proteins: {}", entry.path.display()))?;
        let filled = store.attach_proteins(&proteins);
        cli::kv(
            "Proteins",
            &format!("{} sequences, {filled} attached", proteins.len()),
        );
    }

    eprintln!();

    // ── Parsing ──────────────────────────────────────────
    cli::section("Parsing");

    let content = std::fs::read_to_string(&cli_args.input)
        .with_context(|| format!("failed to read input: {}", cli_args.input.display()))?;
    let format = cli_args.format.resolve(&content);
    cli::kv("Input", &cli_args.input.display().to_string());
    cli::kv("Format", &format.to_string());

    let mut lines: Vec<usize> = Vec::new();
    let mut inputs: Vec<FusionInput> = Vec::new();
    let mut failures: Vec<Failure> = Vec::new();
    for item in input::parse(&content, format) {
        match item.result {
            Ok(fusion) => {
                lines.push(item.line);
                inputs.push(fusion);
            }
            Err(e) => {
                cli::warning(&format!("line {}: {e}", item.line));
                failures.push(Failure {
                    line: item.line,
                    error: e.to_string(),
                });
            }
        }
    }
    cli::kv("Fusions", &inputs.len().to_string());
    if !failures.is_empty() {
        cli::kv("Rejected", &format!("{} lines", failures.len()));
    }

    eprintln!();

    // ── Assembly ─────────────────────────────────────────
    cli::section("Assembly");

    let assembler = FusionAssembler::new(&store).with_thresholds(config.confidence);
    let results = assembler.build_batch(&inputs);

    let mut records: Vec<(usize, FusionRecord)> = Vec::with_capacity(results.len());
    for (&line, result) in lines.iter().zip(results) {
        match result {
            Ok(record) => records.push((line, record)),
            Err(e) => {
                cli::warning(&format!("line {line}: {e}"));
                failures.push(Failure {
                    line,
                    error: e.to_string(),
                });
            }
        }
    }
    failures.sort_by_key(|f| f.line);

    let count = |c: Confidence| records.iter().filter(|(_, r)| r.confidence == c).count();
    let in_frame = records
        .iter()
        .filter(|(_, r)| r.is_in_frame.is_in_frame())
        .count();
    cli::kv("Assembled", &records.len().to_string());
    cli::kv("In frame", &in_frame.to_string());
    cli::kv(
        "Confidence",
        &format!(
            "{} high, {} medium, {} low",
            count(Confidence::High).to_string().bold(),
            count(Confidence::Medium),
            count(Confidence::Low)
        ),
    );

    let transcripts = cli_args.transcripts.then(|| {
        inputs
            .iter()
            .filter_map(|fusion| assembler.transcript_view(fusion))
            .collect::<Vec<_>>()
    });
    if let Some(views) = &transcripts {
        cli::kv("Transcript models", &views.len().to_string());
    }

    eprintln!();

    // ── Writing ──────────────────────────────────────────
    cli::section("Writing");

    let report = Report {
        fusions: records
            .iter()
            .map(|(line, record)| FusionEntry {
                line: *line,
                name: record.fusion_name(),
                record,
                protein_layout: ProteinLayout::from_record(record),
            })
            .collect(),
        failures,
        transcripts,
    };

    let file = File::create(&cli_args.out)
        .with_context(|| format!("failed to create output: {}", cli_args.out.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &report).context("failed to write JSON")?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    cli::kv("Output", &cli_args.out.display().to_string());

    if let Some(path) = &cli_args.fasta {
        let file = File::create(path)
            .with_context(|| format!("failed to create FASTA: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        let mut written = 0;
        for (_, record) in &records {
            let Some(sequence) = &record.fusion_sequence else {
                continue;
            };
            let header = format!(
                "{} {}::{}",
                record.fusion_name(),
                record.partner_a.transcript_id.as_deref().unwrap_or("unknown"),
                record.partner_b.transcript_id.as_deref().unwrap_or("unknown")
            );
            write_fasta(&mut writer, &header, sequence.as_bytes())?;
            written += 1;
        }
        writer.flush()?;
        cli::kv("FASTA", &format!("{} ({written} proteins)", path.display()));
    }

    if report.failures.is_empty() {
        cli::success("all fusions annotated");
    } else {
        cli::warning(&format!("{} lines failed", report.failures.len()));
    }

    // ── Summary ──────────────────────────────────────────
    cli::print_summary(start);

    Ok(())
}
