//! Command-line interface for the DASCRUBBER wrapper.
//!
//! ## Usage
//!
//! ```text
//! # Scrub a read set against a ~5.5 Mbp genome
//! dascrubber_wrapper -i reads.fastq.gz -g 5.5M > scrubbed.fasta
//!
//! # Keep the working directory and pass extra memory to daligner
//! dascrubber_wrapper -i reads.fastq.gz -g 5.5M -k \
//!     --daligner_options="-M80" > scrubbed.fasta
//! ```
//!
//! Scrubbed reads are written to stdout as FASTA; all progress and
//! diagnostics go to stderr.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing::{info, warn};

use crate::config::{split_options, PipelineConfig, RawConfig, ToolOptions};
use crate::depth::CoverageDepth;
use crate::pipeline::{self, PipelineDriver, RENAMED_READS, SCRUBBED_READS};
use crate::restore::restore_reads;
use crate::translate::translate_reads;

#[derive(Parser)]
#[command(name = "dascrubber_wrapper")]
#[command(version)]
#[command(about = "A wrapper tool for the DASCRUBBER pipeline for scrubbing (trimming and \
                   chimera removal) of long read sets (PacBio or ONT reads)")]
pub struct Cli {
    /// Input set of long reads to be scrubbed (FASTA or FASTQ, optionally gzipped)
    #[arg(short = 'i', long = "input_reads")]
    pub input_reads: PathBuf,

    /// Approximate genome size (examples: 3G, 5.5M or 800k), used to determine depth of coverage
    #[arg(short = 'g', long = "genome_size")]
    pub genome_size: String,

    /// Path of directory for temporary files (default: a directory in the current location
    /// named dascrubber_temp_PID where PID is the process ID)
    #[arg(short = 'd', long)]
    pub tempdir: Option<PathBuf>,

    /// Keep the temporary directory (default: delete the temporary directory after scrubbing
    /// is complete)
    #[arg(short = 'k', long)]
    pub keep: bool,

    /// REPmask will be given a repeat threshold of this depth, relative to the overall depth
    /// (e.g. if 2, then regions with 2x the base depth are considered repeats)
    #[arg(short = 'r', long = "repeat_depth", default_value_t = 2.0)]
    pub repeat_depth: f64,

    /// Additional options for DBsplit
    #[arg(long = "dbsplit_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub dbsplit_options: Option<String>,

    /// Additional options for daligner (example: --daligner_options="-M80")
    #[arg(long = "daligner_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub daligner_options: Option<String>,

    /// Additional options for REPmask
    #[arg(long = "repmask_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub repmask_options: Option<String>,

    /// Additional options for datander
    #[arg(long = "datander_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub datander_options: Option<String>,

    /// Additional options for TANmask
    #[arg(long = "tanmask_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub tanmask_options: Option<String>,

    /// Additional options for DAScover
    #[arg(long = "dascover_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub dascover_options: Option<String>,

    /// Additional options for DASqv
    #[arg(long = "dasqv_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub dasqv_options: Option<String>,

    /// Additional options for DAStrim
    #[arg(long = "dastrim_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub dastrim_options: Option<String>,

    /// Additional options for DASpatch
    #[arg(long = "daspatch_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub daspatch_options: Option<String>,

    /// Additional options for DASedit
    #[arg(long = "dasedit_options", value_name = "OPTIONS", help_heading = "Command options")]
    pub dasedit_options: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    fn into_raw_config(self) -> RawConfig {
        RawConfig {
            input_reads: self.input_reads,
            genome_size: self.genome_size,
            tempdir: self.tempdir,
            keep_temp: self.keep,
            repeat_depth: self.repeat_depth,
            pid: std::process::id(),
            tool_options: ToolOptions {
                dbsplit: split_options(self.dbsplit_options.as_deref()),
                daligner: split_options(self.daligner_options.as_deref()),
                repmask: split_options(self.repmask_options.as_deref()),
                datander: split_options(self.datander_options.as_deref()),
                tanmask: split_options(self.tanmask_options.as_deref()),
                dascover: split_options(self.dascover_options.as_deref()),
                dasqv: split_options(self.dasqv_options.as_deref()),
                dastrim: split_options(self.dastrim_options.as_deref()),
                daspatch: split_options(self.daspatch_options.as_deref()),
                dasedit: split_options(self.dasedit_options.as_deref()),
            },
        }
    }
}

/// Execute a full scrubbing run.
///
/// # Errors
///
/// Returns an error for invalid arguments, unreadable or malformed input,
/// missing external tools, a failed external step, or an inconsistency
/// between the scrubbed output and the translated input.
pub fn run(args: Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::resolve(args.into_raw_config())?;
    pipeline::check_tools()?;

    info!("Creating temporary directory {}", config.tempdir.display());
    fs::create_dir_all(&config.tempdir)?;

    // From here on a failure leaves the temp directory in place so the
    // intermediate files can be inspected.
    info!("Processing and renaming reads");
    let translated = translate_reads(&config.input_reads, &config.tempdir.join(RENAMED_READS))?;

    if translated.map.is_empty() {
        warn!(
            "no reads found in {}, nothing to scrub",
            config.input_reads.display()
        );
        if !config.keep_temp {
            fs::remove_dir_all(&config.tempdir)?;
        }
        return Ok(());
    }

    let depth = CoverageDepth::estimate(translated.total_bases, config.genome_size, config.repeat_depth);
    info!("Depth of coverage: {:.1}x", depth.raw);

    let mut driver = PipelineDriver::new(&config, depth);
    if let Err(error) = driver.run() {
        warn!(
            "pipeline failed, keeping temporary directory {} for debugging",
            config.tempdir.display()
        );
        return Err(error.into());
    }

    info!("Outputting scrubbed reads to stdout");
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    restore_reads(&config.tempdir.join(SCRUBBED_READS), &translated.map, &mut out)?;
    out.flush()?;

    if !config.keep_temp {
        info!("Deleting temporary directory {}", config.tempdir.display());
        fs::remove_dir_all(&config.tempdir)?;
    }
    Ok(())
}
