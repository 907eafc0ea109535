//! Parsers for the read files flowing through the pipeline.
//!
//! - [`fastx`]: the user's input reads (FASTA or FASTQ, optionally gzipped)
//! - [`scrubbed`]: the synthetic `reads/<n>/<start>_<end>` headers on the
//!   FASTA the pipeline extracts at the end

pub mod fastx;
pub mod scrubbed;
