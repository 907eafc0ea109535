//! Orchestration of the external Dazzler/DASCRUBBER tools.
//!
//! The driver runs the tools in a fixed order inside the temporary
//! directory, which is the only medium the steps communicate through. Each
//! step blocks until its process exits; the first non-zero exit aborts the
//! whole pipeline and the temporary directory is left in place for
//! inspection, whatever `--keep` says. There are no retries and no
//! timeouts: the tools are assumed deterministic, so rerunning a genuinely
//! failed step would fail the same way.

pub mod command;

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitStatus;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{has_flag, PipelineConfig};
use crate::depth::CoverageDepth;
use self::command::ExternalCommand;

/// The external executables the pipeline depends on, in order of first use.
pub const TOOLS: [&str; 12] = [
    "fasta2DB", "DBsplit", "daligner", "REPmask", "datander", "TANmask", "DAScover", "DASqv",
    "DAStrim", "DASpatch", "DASedit", "DB2fasta",
];

/// File the translated reads are written to inside the temp directory.
pub const RENAMED_READS: &str = "renamed_reads.fasta";
/// File the scrubbed reads end up in after extraction.
pub const SCRUBBED_READS: &str = "scrubbed_reads.fasta";

const SCRATCH_DIR: &str = "align_temp";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("could not find required tool(s): {}", .0.join(", "))]
    MissingExecutables(Vec<String>),

    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: &'static str,
        source: io::Error,
    },

    #[error("{tool} failed ({status}){}", format_stderr(.stderr))]
    ToolFailure {
        tool: &'static str,
        status: ExitStatus,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn format_stderr(stderr: &str) -> String {
    if stderr.trim().is_empty() {
        String::new()
    } else {
        format!(":\n{}", stderr.trim_end())
    }
}

/// Check that every required executable is on the search path.
///
/// # Errors
///
/// Returns `PipelineError::MissingExecutables` naming every missing tool.
pub fn check_tools() -> Result<(), PipelineError> {
    let missing: Vec<String> = TOOLS
        .iter()
        .filter(|tool| which::which(tool).is_err())
        .map(|tool| (*tool).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingExecutables(missing))
    }
}

/// Progress of a pipeline run. Transitions are strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    NotStarted,
    Running { step: usize, tool: &'static str },
    Succeeded,
    Failed { step: usize, tool: &'static str },
}

struct Step {
    title: &'static str,
    tool: &'static str,
    command: ExternalCommand,
    /// Create `align_temp` before the command and remove it after success.
    scratch_dir: bool,
    pre_moves: Vec<(&'static str, &'static str)>,
    post_moves: Vec<(&'static str, &'static str)>,
}

impl Step {
    fn new(title: &'static str, command: ExternalCommand) -> Self {
        Self {
            title,
            tool: command.program(),
            command,
            scratch_dir: false,
            pre_moves: Vec::new(),
            post_moves: Vec::new(),
        }
    }

    fn with_scratch_dir(mut self) -> Self {
        self.scratch_dir = true;
        self
    }

    fn with_pre_move(mut self, from: &'static str, to: &'static str) -> Self {
        self.pre_moves.push((from, to));
        self
    }

    fn with_post_move(mut self, from: &'static str, to: &'static str) -> Self {
        self.post_moves.push((from, to));
        self
    }
}

/// Runs the external scrubbing steps in order inside the temp directory.
pub struct PipelineDriver<'a> {
    config: &'a PipelineConfig,
    depth: CoverageDepth,
    state: PipelineState,
}

impl<'a> PipelineDriver<'a> {
    #[must_use]
    pub fn new(config: &'a PipelineConfig, depth: CoverageDepth) -> Self {
        Self {
            config,
            depth,
            state: PipelineState::NotStarted,
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// The full step sequence with every argument resolved.
    fn plan(&self) -> Vec<Step> {
        let opts = &self.config.tool_options;
        let mut steps = Vec::with_capacity(13);

        steps.push(Step::new(
            "Creating Dazzler database",
            ExternalCommand::new("fasta2DB")
                .arg("reads.db")
                .arg(RENAMED_READS),
        ));

        // The database must be split before DASedit can rebuild it later,
        // even when it would fit in a single block.
        let mut dbsplit = ExternalCommand::new("DBsplit");
        if !has_flag(&opts.dbsplit, "-s") {
            dbsplit = dbsplit.arg("-s100");
        }
        steps.push(Step::new(
            "Splitting database",
            dbsplit.args(&opts.dbsplit).arg("reads"),
        ));

        steps.push(
            Step::new(
                "Read overlap alignment with daligner",
                ExternalCommand::new("daligner")
                    .arg("-v")
                    .arg(format!("-P{SCRATCH_DIR}"))
                    .args(&opts.daligner)
                    .arg("reads")
                    .arg("reads"),
            )
            .with_scratch_dir(),
        );

        let mut repmask = ExternalCommand::new("REPmask").arg("-v");
        if !has_flag(&opts.repmask, "-c") {
            repmask = repmask.arg(format!("-c{}", self.depth.repeat_threshold));
        }
        steps.push(Step::new(
            "Masking repeats with REPmask",
            repmask.args(&opts.repmask).arg("reads").arg("reads.reads.las"),
        ));

        steps.push(
            Step::new(
                "Finding tandem repeats with datander",
                ExternalCommand::new("datander")
                    .arg("-v")
                    .arg(format!("-P{SCRATCH_DIR}"))
                    .args(&opts.datander)
                    .arg("reads"),
            )
            .with_scratch_dir(),
        );

        steps.push(Step::new(
            "Masking tandem repeats with TANmask",
            ExternalCommand::new("TANmask")
                .arg("-v")
                .args(&opts.tanmask)
                .arg("reads")
                .arg("TAN.reads"),
        ));

        steps.push(
            Step::new(
                "Read overlap alignment with daligner (with repeat masking)",
                ExternalCommand::new("daligner")
                    .arg("-v")
                    .arg(format!("-P{SCRATCH_DIR}"))
                    .arg("-mrep")
                    .arg("-mtan")
                    .args(&opts.daligner)
                    .arg("reads")
                    .arg("reads"),
            )
            .with_scratch_dir(),
        );

        steps.push(Step::new(
            "Computing estimated genome coverage with DAScover",
            ExternalCommand::new("DAScover")
                .arg("-v")
                .args(&opts.dascover)
                .arg("reads")
                .arg("reads.reads.las"),
        ));

        let mut dasqv = ExternalCommand::new("DASqv").arg("-v");
        if !has_flag(&opts.dasqv, "-c") {
            dasqv = dasqv.arg(format!("-c{}", self.depth.base_depth));
        }
        steps.push(Step::new(
            "Finding intrinsic quality values with DASqv",
            dasqv.args(&opts.dasqv).arg("reads").arg("reads.reads.las"),
        ));

        steps.push(Step::new(
            "Trimming reads and breaking chimeras with DAStrim",
            ExternalCommand::new("DAStrim")
                .arg("-v")
                .args(&opts.dastrim)
                .arg("reads")
                .arg("reads.reads.las"),
        ));

        steps.push(Step::new(
            "Patching low quality segments with DASpatch",
            ExternalCommand::new("DASpatch")
                .arg("-v")
                .args(&opts.daspatch)
                .arg("reads")
                .arg("reads.reads.las"),
        ));

        steps.push(Step::new(
            "Building new database of scrubbed reads with DASedit",
            ExternalCommand::new("DASedit")
                .arg("-v")
                .args(&opts.dasedit)
                .arg("reads")
                .arg("patched_reads"),
        ));

        // DB2fasta regenerates the database's source file name, which is the
        // translated input's name; the shuffle keeps both files around.
        steps.push(
            Step::new(
                "Extracting scrubbed reads",
                ExternalCommand::new("DB2fasta").arg("-vU").arg("patched_reads"),
            )
            .with_pre_move(RENAMED_READS, "temp.fasta")
            .with_post_move(RENAMED_READS, SCRUBBED_READS)
            .with_post_move("temp.fasta", RENAMED_READS),
        );

        steps
    }

    /// Run every step in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`]; no further steps are attempted
    /// and the temp directory is not cleaned up.
    pub fn run(&mut self) -> Result<(), PipelineError> {
        let dir = &self.config.tempdir;
        for (index, step) in self.plan().into_iter().enumerate() {
            self.state = PipelineState::Running {
                step: index,
                tool: step.tool,
            };
            info!("{}", step.title);

            let before = snapshot(dir)?;
            if let Err(error) = execute(&step, dir) {
                self.state = PipelineState::Failed {
                    step: index,
                    tool: step.tool,
                };
                return Err(error);
            }
            log_new_files(dir, &before)?;
        }
        self.state = PipelineState::Succeeded;
        Ok(())
    }
}

fn execute(step: &Step, dir: &Path) -> Result<(), PipelineError> {
    for (from, to) in &step.pre_moves {
        info!("mv {from} {to}");
        fs::rename(dir.join(from), dir.join(to))?;
    }
    if step.scratch_dir {
        info!("mkdir {SCRATCH_DIR}");
        fs::create_dir(dir.join(SCRATCH_DIR))?;
    }

    info!("{}", step.command);
    step.command.run_in(dir)?;

    if step.scratch_dir {
        info!("rm -r {SCRATCH_DIR}");
        fs::remove_dir_all(dir.join(SCRATCH_DIR))?;
    }
    for (from, to) in &step.post_moves {
        info!("mv {from} {to}");
        fs::rename(dir.join(from), dir.join(to))?;
    }
    Ok(())
}

fn snapshot(dir: &Path) -> io::Result<BTreeSet<String>> {
    dir.read_dir()?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect()
}

fn log_new_files(dir: &Path, before: &BTreeSet<String>) -> io::Result<()> {
    let after = snapshot(dir)?;
    let new_files: Vec<&str> = after.difference(before).map(String::as_str).collect();
    if !new_files.is_empty() {
        debug!("New files: {}", new_files.join(", "));
    }
    Ok(())
}
