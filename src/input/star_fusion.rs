//! STAR-Fusion `star-fusion.fusion_predictions.tsv` output.

use crate::error::Error;
use crate::fusion::{FusionInput, PartnerDescriptor};

use super::{BatchItem, ColumnMap, is_skippable, parse_breakpoint, parse_count, split_header};

const MIN_COLUMNS: usize = 7;

fn is_header(line: &str) -> bool {
    line.starts_with("#FusionName") || line.starts_with("FusionName")
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

fn parse_record(columns: &ColumnMap, line: &str) -> Result<FusionInput, Error> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(Error::Parse(format!(
            "expected at least {MIN_COLUMNS} columns, found {}",
            fields.len()
        )));
    }

    let name = columns.get(&fields, "FusionName", 0)?;
    let (gene_a, gene_b) = name
        .split_once("--")
        .filter(|(a, b)| !a.is_empty() && !b.is_empty())
        .ok_or_else(|| Error::Parse(format!("invalid fusion name '{name}'")))?;

    let junction = parse_count(
        columns.get(&fields, "JunctionReadCount", 1)?,
        "JunctionReadCount",
    )?;
    let spanning = parse_count(
        columns.get(&fields, "SpanningFragCount", 2)?,
        "SpanningFragCount",
    )?;

    let left = parse_breakpoint(columns.get(&fields, "LeftBreakpoint", 4)?)?;
    let right = parse_breakpoint(columns.get(&fields, "RightBreakpoint", 6)?)?;

    Ok(FusionInput::new(
        PartnerDescriptor::new(gene_a, left),
        PartnerDescriptor::new(gene_b, right),
    )
    .with_reads(junction, spanning))
}
