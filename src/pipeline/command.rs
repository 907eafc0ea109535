//! Construction and execution of external tool invocations.

use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use super::PipelineError;

/// A fully resolved external command line.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    program: &'static str,
    args: Vec<String>,
}

impl ExternalCommand {
    #[must_use]
    pub fn new(program: &'static str) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn program(&self) -> &'static str {
        self.program
    }

    #[must_use]
    pub fn arg_list(&self) -> &[String] {
        &self.args
    }

    /// Run the command with `dir` as its working directory, blocking until
    /// it exits and capturing its output. Captured output is logged at
    /// debug level; the pipeline's own progress goes to stderr regardless.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Spawn` if the process cannot be started and
    /// `PipelineError::ToolFailure` (with the captured stderr) if it exits
    /// non-zero.
    pub fn run_in(&self, dir: &Path) -> Result<(), PipelineError> {
        let output = Command::new(self.program)
            .args(&self.args)
            .current_dir(dir)
            .output()
            .map_err(|source| PipelineError::Spawn {
                tool: self.program,
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!("  {line}");
        }
        let stderr_text = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stderr_text.lines() {
            debug!("  {line}");
        }

        if !output.status.success() {
            return Err(PipelineError::ToolFailure {
                tool: self.program,
                status: output.status,
                stderr: stderr_text,
            });
        }
        Ok(())
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_program_and_args() {
        let cmd = ExternalCommand::new("daligner")
            .arg("-v")
            .args(["-M80", "-e0.85"])
            .arg("reads")
            .arg("reads");
        assert_eq!(cmd.to_string(), "daligner -v -M80 -e0.85 reads reads");
    }

    #[cfg(unix)]
    #[test]
    fn test_run_in_captures_failure() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ExternalCommand::new("sh").arg("-c").arg("echo boom >&2; exit 3");
        let err = cmd.run_in(dir.path()).unwrap_err();
        match err {
            PipelineError::ToolFailure { tool, status, stderr } => {
                assert_eq!(tool, "sh");
                assert_eq!(status.code(), Some(3));
                assert!(stderr.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_in_reports_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = ExternalCommand::new("definitely-not-a-real-tool");
        assert!(matches!(
            cmd.run_in(dir.path()),
            Err(PipelineError::Spawn { .. })
        ));
    }
}
