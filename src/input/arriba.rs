//! Arriba `fusions.tsv` output.

use crate::error::Error;
use crate::fusion::{Breakpoint, FusionInput, PartnerDescriptor};
use crate::strand::Strand;

use super::{
    BatchItem, ColumnMap, is_skippable, parse_count, parse_position, split_header,
};

const MIN_COLUMNS: usize = 12;

fn is_header(line: &str) -> bool {
    line.starts_with("#gene1") || line.starts_with("gene1")
}

#[must_use]
pub fn parse(content: &str) -> Vec<BatchItem> {
    let (columns, lines) = split_header(content, is_header);
    lines
        .into_iter()
        .filter(|(_, line)| !is_skippable(line))
        .map(|(line_no, line)| BatchItem {
            line: line_no,
            result: parse_record(&columns, line),
        })
        .collect()
}

/// Strand of the fusion transcript from a `gene/fusion` pair such as `+/-`.
fn fusion_strand(field: &str) -> Result<Strand, Error> {
    let fusion = field.split_once('/').map_or(field, |(_, fusion)| fusion);
    match fusion.trim() {
        "+" => Ok(Strand::Forward),
        "-" => Ok(Strand::Reverse),
        other => Err(Error::Parse(format!("invalid strand '{other}' in '{field}'"))),
    }
}

fn breakpoint(field: &str, strand: Strand) -> Result<Breakpoint, Error> {
    let Some((chromosome, position)) = field.split_once(':') else {
        return Err(Error::Parse(format!(
            "invalid breakpoint '{field}': expected chr:position"
        )));
    };
    if position.contains(':') {
        return Err(Error::Parse(format!(
            "invalid breakpoint '{field}': expected chr:position"
        )));
    }
    Breakpoint::new(chromosome, parse_position(position, field)?, strand)
}

fn parse_record(columns: &ColumnMap, line: &str) -> Result<FusionInput, Error> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(Error::Parse(format!(
            "expected at least {MIN_COLUMNS} columns, found {}",
            fields.len()
        )));
    }

    let gene_a = columns.get(&fields, "gene1", 0)?;
    let gene_b = columns.get(&fields, "gene2", 1)?;
    let strand_a = fusion_strand(columns.get(&fields, "strand1(gene/fusion)", 2)?)?;
    let strand_b = fusion_strand(columns.get(&fields, "strand2(gene/fusion)", 3)?)?;
    let bp_a = breakpoint(columns.get(&fields, "breakpoint1", 4)?, strand_a)?;
    let bp_b = breakpoint(columns.get(&fields, "breakpoint2", 5)?, strand_b)?;

    let split1 = parse_count(columns.get(&fields, "split_reads1", 10)?, "split_reads1")?;
    let split2 = parse_count(columns.get(&fields, "split_reads2", 11)?, "split_reads2")?;
    let discordant = parse_count(
        columns.get(&fields, "discordant_mates", 12)?,
        "discordant_mates",
    )?;

    Ok(FusionInput::new(
        PartnerDescriptor::new(gene_a, bp_a),
        PartnerDescriptor::new(gene_b, bp_b),
    )
    .with_reads(split1.saturating_add(split2), discordant))
}
