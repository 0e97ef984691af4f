//! Manual and batch entry, one fusion per line.
//!
//! Space separated: `GENE_A chrA:pos:strand GENE_B chrB:pos:strand [junction] [spanning]`
//!
//! Tab separated: `GENE_A::GENE_B<TAB>chrA:pos:strand<TAB>chrB:pos:strand[<TAB>build]`

use crate::error::Error;
use crate::fusion::{FusionInput, PartnerDescriptor};
use crate::genome_assembly::GenomeAssembly;

use super::{BatchItem, is_skippable, parse_breakpoint, parse_count};

#[must_use]
pub fn parse(content: &str) -> Vec<BatchItem> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !is_skippable(line))
        .map(|(i, line)| BatchItem {
            line: i + 1,
            result: parse_line(line),
        })
        .collect()
}

pub fn parse_line(line: &str) -> Result<FusionInput, Error> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.contains('\t') {
        parse_tab_separated(line)
    } else {
        parse_space_separated(line)
    }
}

fn parse_space_separated(line: &str) -> Result<FusionInput, Error> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(Error::Parse(format!(
            "expected GENE_A bpA GENE_B bpB [junction] [spanning], got '{line}'"
        )));
    }

    let partner_a = PartnerDescriptor::new(parts[0], parse_breakpoint(parts[1])?);
    let partner_b = PartnerDescriptor::new(parts[2], parse_breakpoint(parts[3])?);

    let mut input = FusionInput::new(partner_a, partner_b);
    input.junction_reads = parts
        .get(4)
        .map(|s| parse_count(s, "junction read count"))
        .transpose()?;
    input.spanning_reads = parts
        .get(5)
        .map(|s| parse_count(s, "spanning read count"))
        .transpose()?;
    Ok(input)
}

fn parse_tab_separated(line: &str) -> Result<FusionInput, Error> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 3 {
        return Err(Error::Parse(format!(
            "expected GENE_A::GENE_B, bpA and bpB separated by tabs, got '{line}'"
        )));
    }

    let Some((gene_a, gene_b)) = parts[0].split_once("::") else {
        return Err(Error::Parse(format!(
            "invalid gene pair '{}': expected GENE_A::GENE_B",
            parts[0]
        )));
    };

    let partner_a = PartnerDescriptor::new(gene_a, parse_breakpoint(parts[1])?);
    let partner_b = PartnerDescriptor::new(gene_b, parse_breakpoint(parts[2])?);

    let mut input = FusionInput::new(partner_a, partner_b);
    if let Some(build) = parts.get(3).map(|s| s.trim()).filter(|s| !s.is_empty()) {
        input.genome_build = build.parse::<GenomeAssembly>()?;
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strand::Strand;

    #[test]
    fn space_separated_without_reads() {
        let input = parse_line("BCR chr22:23632600:+ ABL1 chr9:130854064:-").unwrap();
        assert_eq!(input.partner_a.gene_symbol, "BCR");
        assert_eq!(input.partner_a.breakpoint.chromosome, "22");
        assert_eq!(input.partner_a.breakpoint.position, 23632600);
        assert_eq!(input.partner_b.gene_symbol, "ABL1");
        assert_eq!(input.partner_b.breakpoint.strand, Strand::Reverse);
        assert_eq!(input.junction_reads, None);
        assert_eq!(input.spanning_reads, None);
        assert_eq!(input.genome_build, GenomeAssembly::GRCh38);
    }

    #[test]
    fn space_separated_with_reads() {
        let input = parse_line("EML4 chr2:42492091:+ ALK chr2:29446394:- 50 30").unwrap();
        assert_eq!(input.junction_reads, Some(50));
        assert_eq!(input.spanning_reads, Some(30));
    }

    #[test]
    fn tab_separated_with_build() {
        let input = parse_line("BCR::ABL1\tchr22:23524427:+\tchr9:133729449:+\thg19").unwrap();
        assert_eq!(input.partner_a.gene_symbol, "BCR");
        assert_eq!(input.partner_b.gene_symbol, "ABL1");
        assert_eq!(input.partner_b.breakpoint.position, 133729449);
        assert_eq!(input.genome_build, GenomeAssembly::GRCh37);
    }

    #[test]
    fn tab_separated_defaults_to_grch38() {
        let input = parse_line("BCR::ABL1\tchr22:23524427:+\tchr9:133729449:+").unwrap();
        assert_eq!(input.genome_build, GenomeAssembly::GRCh38);
    }

    #[test]
    fn malformed_lines_fail() {
        assert!(parse_line("BCR chr22:23632600:+").is_err());
        assert!(parse_line("BCR chr22:abc:+ ABL1 chr9:130854064:-").is_err());
        assert!(parse_line("BCR chr22:1:+ ABL1 chr9:2:- many").is_err());
        assert!(parse_line("BCR-ABL1\tchr22:1:+\tchr9:2:-").is_err());
        assert!(parse_line("BCR::ABL1\tchr22:1:+\tchr9:2:-\tmm10").is_err());
    }

    #[test]
    fn batch_reports_every_line() {
        let content = "# comment\n\
                       BCR chr22:23632600:+ ABL1 chr9:130854064:-\n\
                       \n\
                       broken line\n\
                       EML4 chr2:42492091:+ ALK chr2:29446394:- 50 30\n";
        let items = parse(content);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].line, 2);
        assert!(items[0].result.is_ok());
        assert_eq!(items[1].line, 4);
        assert!(items[1].result.is_err());
        assert_eq!(items[2].line, 5);
        assert!(items[2].result.is_ok());
    }
}
