//! Chromosome name normalization.

use crate::error::Error;

/// Normalize a chromosome name to its Ensembl form.
///
/// Strips a leading `chr` (any case) and maps the UCSC mitochondrion `M` to `MT`.
pub fn normalize(name: &str) -> Result<String, Error> {
    let trimmed = name.trim();
    let stripped = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("chr") => &trimmed[3..],
        _ => trimmed,
    };

    if stripped.is_empty() {
        return Err(Error::Parse(format!("empty chromosome name: '{name}'")));
    }

    if stripped.eq_ignore_ascii_case("m") {
        return Ok("MT".to_string());
    }
    Ok(stripped.to_string())
}
