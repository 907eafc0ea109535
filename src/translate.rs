//! Header translation: rename input reads to fake PacBio-style headers.
//!
//! The Dazzler database builder only accepts reads whose headers look like
//! PacBio well identifiers, so every input read is renamed to
//! `reads/<n>/0_<len>` before the pipeline starts. The mapping back to the
//! original header is kept in memory and consulted once, when the scrubbed
//! output is restored.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::parsing::fastx::{FastxReader, FormatError};
use crate::utils::fmt::thousands;

/// Original header of one translated read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadMeta {
    pub name: String,
    pub comment: Option<String>,
}

/// Ordered mapping from synthetic read number back to the original header.
///
/// Built by [`translate_reads`] and owned by the caller; the restoration
/// step looks entries up by the read number embedded in each synthetic name.
#[derive(Debug, Default)]
pub struct ReadNameMap {
    entries: Vec<ReadMeta>,
}

impl ReadNameMap {
    #[must_use]
    pub fn get(&self, read_num: u64) -> Option<&ReadMeta> {
        usize::try_from(read_num).ok().and_then(|i| self.entries.get(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in translation order.
    pub fn iter(&self) -> impl Iterator<Item = &ReadMeta> {
        self.entries.iter()
    }

    pub(crate) fn push(&mut self, name: String, comment: Option<String>) {
        self.entries.push(ReadMeta { name, comment });
    }
}

/// Result of translating an input read set.
#[derive(Debug)]
pub struct TranslatedReads {
    pub map: ReadNameMap,
    pub total_bases: u64,
}

/// Synthetic header for read number `read_num` of length `seq_len`.
#[must_use]
pub fn synthetic_name(read_num: u64, seq_len: usize) -> String {
    format!("reads/{read_num}/0_{seq_len}")
}

/// Rename every input read and write the renamed set as FASTA to `output`.
///
/// Duplicate original names are allowed; each occurrence gets its own
/// synthetic name. Zero-length sequences are passed through with a warning.
/// An empty input produces an empty output file and an empty map.
///
/// # Errors
///
/// Returns a [`FormatError`] if the input cannot be read or parsed, or if a
/// read name contains `/` (which would make the restored
/// `name/<start>_<end>` headers ambiguous).
pub fn translate_reads(input: &Path, output: &Path) -> Result<TranslatedReads, FormatError> {
    let mut out = BufWriter::new(File::create(output)?);
    let mut map = ReadNameMap::default();
    let mut total_bases: u64 = 0;

    if let Some(reader) = FastxReader::open(input)? {
        for record in reader {
            let record = record?;
            if record.name.contains('/') {
                return Err(FormatError::SlashInName { name: record.name });
            }
            if record.sequence.is_empty() {
                warn!("read {} has a zero-length sequence", record.name);
            }

            let read_num = map.len() as u64;
            writeln!(out, ">{}", synthetic_name(read_num, record.sequence.len()))?;
            writeln!(out, "{}", record.sequence)?;

            total_bases += record.sequence.len() as u64;
            map.push(record.name, record.comment);
        }
    }
    out.flush()?;

    info!("Reads: {}", thousands(map.len() as u64));
    info!("Total bases: {}", thousands(total_bases));
    Ok(TranslatedReads { map, total_bases })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write as _;
    use tempfile::{tempdir, NamedTempFile};

    fn translate(content: &[u8]) -> (TranslatedReads, String) {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(content).unwrap();
        input.flush().unwrap();
        let dir = tempdir().unwrap();
        let output = dir.path().join("renamed_reads.fasta");

        let translated = translate_reads(input.path(), &output).unwrap();
        let written = fs::read_to_string(&output).unwrap();
        (translated, written)
    }

    #[test]
    fn test_translate_fasta() {
        let (translated, written) =
            translate(b">read1 first read\nACGT\nACGT\n>read2\nGG\n");

        assert_eq!(written, ">reads/0/0_8\nACGTACGT\n>reads/1/0_2\nGG\n");
        assert_eq!(translated.total_bases, 10);
        assert_eq!(translated.map.len(), 2);

        let first = translated.map.get(0).unwrap();
        assert_eq!(first.name, "read1");
        assert_eq!(first.comment.as_deref(), Some("first read"));
        let second = translated.map.get(1).unwrap();
        assert_eq!(second.name, "read2");
        assert_eq!(second.comment, None);
        assert!(translated.map.get(2).is_none());
    }

    #[test]
    fn test_translate_fastq() {
        let (translated, written) = translate(b"@read1\nACGT\n+\nIIII\n");
        assert_eq!(written, ">reads/0/0_4\nACGT\n");
        assert_eq!(translated.map.get(0).unwrap().name, "read1");
    }

    #[test]
    fn test_duplicate_names_get_distinct_synthetic_names() {
        let (translated, written) = translate(b">read1\nAC\n>read1\nGT\n");
        assert_eq!(written, ">reads/0/0_2\nAC\n>reads/1/0_2\nGT\n");
        assert_eq!(translated.map.get(0).unwrap().name, "read1");
        assert_eq!(translated.map.get(1).unwrap().name, "read1");
    }

    #[test]
    fn test_zero_length_sequence_passes_through() {
        let (translated, written) = translate(b">read1\n>read2\nACGT\n");
        assert_eq!(written, ">reads/0/0_0\n\n>reads/1/0_4\nACGT\n");
        assert_eq!(translated.total_bases, 4);
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        let (translated, written) = translate(b"");
        assert!(translated.map.is_empty());
        assert_eq!(translated.total_bases, 0);
        assert_eq!(written, "");
    }

    #[test]
    fn test_slash_in_name_rejected() {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(b">lib/read1\nACGT\n").unwrap();
        input.flush().unwrap();
        let dir = tempdir().unwrap();

        let result = translate_reads(input.path(), &dir.path().join("out.fasta"));
        assert!(matches!(
            result,
            Err(FormatError::SlashInName { name }) if name == "lib/read1"
        ));
    }

    #[test]
    fn test_map_iteration_is_ordered() {
        let (translated, _) = translate(b">b\nA\n>a\nC\n>c\nG\n");
        let names: Vec<_> = translated.map.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }
}
