//! FASTA reading (plain or gzip) and writing.

use std::io::{BufRead, BufReader, Read, Write};

use flate2::read::MultiGzDecoder;

use crate::error::Error;

/// Residues per line when writing FASTA.
pub const LINE_WIDTH: usize = 60;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A single FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// First whitespace-delimited token of the header.
    pub id: String,
    /// Full header line without the leading `>`.
    pub header: String,
    pub sequence: Vec<u8>,
}

/// Wraps a reader, transparently decompressing it if it starts with the gzip magic bytes.
pub fn open_maybe_gz<'a, R: Read + 'a>(reader: R) -> Result<Box<dyn BufRead + 'a>, Error> {
    let mut buffered = BufReader::new(reader);
    let is_gz = buffered.fill_buf()?.starts_with(&GZIP_MAGIC);
    if is_gz {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(buffered))))
    } else {
        Ok(Box::new(buffered))
    }
}

/// Reads FASTA records, plain or gzip-compressed. Sequence residues are uppercased.
pub fn read_fasta<R: Read>(reader: R) -> Result<Vec<FastaRecord>, Error> {
    parse_fasta(open_maybe_gz(reader)?)
}

fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<FastaRecord>, Error> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for line in reader.lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            let header = header.trim().to_string();
            let id = header.split_whitespace().next().unwrap_or("").to_string();
            if id.is_empty() {
                return Err(Error::Parse(format!("empty FASTA header: >{header}")));
            }
            current = Some(FastaRecord {
                id,
                header,
                sequence: Vec::new(),
            });
        } else if let Some(record) = current.as_mut() {
            let start = record.sequence.len();
            record.sequence.extend_from_slice(line.trim().as_bytes());
            record.sequence[start..].make_ascii_uppercase();
        }
    }

    if let Some(record) = current {
        records.push(record);
    }
    Ok(records)
}

/// Writes one FASTA record with `LINE_WIDTH` residues per line.
pub fn write_fasta<W: Write>(writer: &mut W, header: &str, sequence: &[u8]) -> Result<(), Error> {
    writeln!(writer, ">{header}")?;
    for chunk in sequence.chunks(LINE_WIDTH) {
        writer.write_all(chunk)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn make_gz(content: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn parse_plain() {
        let fasta = b">ENSP1 pep transcript:ENST1\nmkv\nLLA\n>ENSP2\nGG\n";
        let records = read_fasta(&fasta[..]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "ENSP1");
        assert_eq!(records[0].header, "ENSP1 pep transcript:ENST1");
        assert_eq!(records[0].sequence, b"MKVLLA");
        assert_eq!(records[1].sequence, b"GG");
    }

    #[test]
    fn parse_gzip() {
        let gz = make_gz(b">seq1\nACGT\nTT\n");
        let records = read_fasta(std::io::Cursor::new(gz)).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sequence, b"ACGTTT");
    }

    #[test]
    fn empty_header_is_error() {
        assert!(read_fasta(&b">\nACGT\n"[..]).is_err());
    }

    #[test]
    fn empty_input() {
        assert!(read_fasta(&b""[..]).unwrap().is_empty());
    }

    #[test]
    fn write_wraps_lines() {
        let seq = vec![b'M'; 130];
        let mut out = Vec::new();
        write_fasta(&mut out, "BCR--ABL1", &seq).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], ">BCR--ABL1");
        assert_eq!(lines[1].len(), 60);
        assert_eq!(lines[2].len(), 60);
        assert_eq!(lines[3].len(), 10);
        assert_eq!(lines.len(), 4);
    }
}
