//! Restoration of original read names on the scrubbed output.
//!
//! The extracted FASTA carries the synthetic `reads/<n>/<start>_<end>`
//! headers. Each record is mapped back to `original_name/<start>_<end>`
//! (plus the original comment, if any) and streamed out in extraction
//! order. A read may have been split into several segments or dropped
//! entirely, so the output order and count need not match the input.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use noodles::fasta;
use thiserror::Error;
use tracing::info;

use crate::parsing::scrubbed::parse_synthetic_name;
use crate::translate::ReadNameMap;
use crate::utils::fmt::thousands;

/// Restoration failures. The two name variants indicate a contract
/// violation between the header translation and the external toolchain
/// rather than bad user input.
#[derive(Error, Debug)]
pub enum RestoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse scrubbed FASTA record: {0}")]
    Fasta(String),

    #[error("scrubbed read name {name:?} is not in the expected reads/<n>/<start>_<end> form")]
    MalformedName { name: String },

    #[error("scrubbed read {name:?} does not correspond to any translated input read")]
    Unregistered { name: String },
}

/// Totals for the restored output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreStats {
    pub reads: u64,
    pub bases: u64,
}

/// Stream the scrubbed FASTA to `out` with original read names restored.
///
/// # Errors
///
/// Returns a [`RestoreError`] if the file cannot be read or if any record
/// carries a synthetic name that is malformed or was never registered
/// during translation; nothing is ever dropped silently.
pub fn restore_reads<W: Write>(
    scrubbed: &Path,
    map: &ReadNameMap,
    out: &mut W,
) -> Result<RestoreStats, RestoreError> {
    let file = File::open(scrubbed)?;
    let mut reader = fasta::io::Reader::new(BufReader::new(file));
    let mut stats = RestoreStats::default();

    for result in reader.records() {
        let record = result.map_err(|e| RestoreError::Fasta(e.to_string()))?;
        let name = String::from_utf8_lossy(record.name()).to_string();

        let parsed = parse_synthetic_name(&name)
            .ok_or_else(|| RestoreError::MalformedName { name: name.clone() })?;
        let meta = map
            .get(parsed.read_num)
            .ok_or_else(|| RestoreError::Unregistered { name: name.clone() })?;

        match &meta.comment {
            Some(comment) => writeln!(out, ">{}/{} {}", meta.name, parsed.range, comment)?,
            None => writeln!(out, ">{}/{}", meta.name, parsed.range)?,
        }
        out.write_all(record.sequence().as_ref())?;
        out.write_all(b"\n")?;

        stats.reads += 1;
        stats.bases += record.sequence().len() as u64;
    }

    info!("Reads: {}", thousands(stats.reads));
    info!("Total bases: {}", thousands(stats.bases));
    Ok(stats)
}
