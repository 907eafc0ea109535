//! # dascrubber-wrapper
//!
//! A wrapper for the DASCRUBBER pipeline for scrubbing (trimming, chimera
//! removal and patching) of long read sets (PacBio or ONT reads).
//!
//! Scrubbing itself is carried out by twelve external executables from the
//! Dazzler/DASCRUBBER toolchain (`fasta2DB`, `DBsplit`, `daligner`,
//! `REPmask`, `datander`, `TANmask`, `DAScover`, `DASqv`, `DAStrim`,
//! `DASpatch`, `DASedit`, `DB2fasta`). This crate sequences them into a
//! single invocation and handles the bookkeeping around them:
//!
//! - renames input reads to the PacBio-style headers the toolchain expects,
//!   remembering the original names,
//! - derives the depth of coverage from the input size and a genome size
//!   estimate, which parameterizes repeat masking,
//! - runs the twelve tools in order inside a scoped temporary directory,
//!   stopping at the first failure,
//! - restores the original read names on the scrubbed output and streams it
//!   to stdout as FASTA.
//!
//! ## Modules
//!
//! - [`cli`]: command-line surface and end-to-end run
//! - [`config`]: argument validation and the immutable pipeline config
//! - [`depth`]: coverage depth and repeat threshold calculation
//! - [`parsing`]: FASTA/FASTQ input reading and scrubbed-header parsing
//! - [`translate`]: header translation and the read-name mapping
//! - [`pipeline`]: external tool orchestration
//! - [`restore`]: restoration of original read names on the output

pub mod cli;
pub mod config;
pub mod depth;
pub mod parsing;
pub mod pipeline;
pub mod restore;
pub mod translate;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{PipelineConfig, ToolOptions};
pub use depth::CoverageDepth;
pub use pipeline::{PipelineDriver, PipelineState};
pub use translate::ReadNameMap;
