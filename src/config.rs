//! Argument validation and the immutable pipeline configuration.
//!
//! The raw command-line values are gathered into a [`RawConfig`] and resolved
//! into a [`PipelineConfig`] exactly once, before anything touches the
//! filesystem. The resolved config is read-only for the rest of the run;
//! later stages never consult ambient state such as the working directory or
//! the process id.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::utils::fmt::thousands;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not parse genome size {0:?}")]
    BadGenomeSize(String),

    #[error("genome size must be a positive value")]
    NonPositiveGenomeSize,

    #[error("repeat depth must be a positive value (got {0})")]
    NonPositiveRepeatDepth(f64),

    #[error("input read file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("temporary directory already exists: {}", .0.display())]
    TempDirExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Extra options for each external tool, already split into argv form.
///
/// Each list is injected verbatim into that tool's argument list, after the
/// computed defaults. A user-supplied `-s` (for `DBsplit`) or `-c` (for
/// `REPmask`/`DASqv`) suppresses the corresponding computed default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOptions {
    pub dbsplit: Vec<String>,
    pub daligner: Vec<String>,
    pub repmask: Vec<String>,
    pub datander: Vec<String>,
    pub tanmask: Vec<String>,
    pub dascover: Vec<String>,
    pub dasqv: Vec<String>,
    pub dastrim: Vec<String>,
    pub daspatch: Vec<String>,
    pub dasedit: Vec<String>,
}

/// Split a user-supplied option string into individual arguments.
pub fn split_options(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Whether any of the options starts with the given flag prefix.
pub fn has_flag(options: &[String], prefix: &str) -> bool {
    options.iter().any(|opt| opt.starts_with(prefix))
}

/// Unvalidated settings gathered from the command line.
#[derive(Debug, Default)]
pub struct RawConfig {
    pub input_reads: PathBuf,
    pub genome_size: String,
    pub tempdir: Option<PathBuf>,
    pub keep_temp: bool,
    pub repeat_depth: f64,
    /// Process id, read once at startup; used only for the default temp
    /// directory name.
    pub pid: u32,
    pub tool_options: ToolOptions,
}

/// Immutable configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_reads: PathBuf,
    /// Genome size estimate, in bases.
    pub genome_size: u64,
    /// Repeat threshold multiplier relative to the base depth of coverage.
    pub repeat_depth: f64,
    pub tempdir: PathBuf,
    pub keep_temp: bool,
    pub tool_options: ToolOptions,
}

impl PipelineConfig {
    /// Validate the raw settings and resolve them into a usable config.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the genome size cannot be parsed or is
    /// not positive, if the repeat depth is not positive, if the input file
    /// does not exist, or if the temporary directory already exists.
    pub fn resolve(raw: RawConfig) -> Result<Self, ConfigError> {
        let genome_size = parse_genome_size(&raw.genome_size)?;

        if raw.repeat_depth <= 0.0 {
            return Err(ConfigError::NonPositiveRepeatDepth(raw.repeat_depth));
        }

        if !raw.input_reads.is_file() {
            return Err(ConfigError::MissingInput(raw.input_reads));
        }
        let input_reads = absolute(&raw.input_reads)?;

        let tempdir = raw
            .tempdir
            .unwrap_or_else(|| PathBuf::from(format!("dascrubber_temp_{}", raw.pid)));
        let tempdir = absolute(&tempdir)?;
        if tempdir.exists() {
            return Err(ConfigError::TempDirExists(tempdir));
        }

        Ok(Self {
            input_reads,
            genome_size,
            repeat_depth: raw.repeat_depth,
            tempdir,
            keep_temp: raw.keep_temp,
            tool_options: raw.tool_options,
        })
    }
}

/// Parse a genome size string with an optional `k`/`M`/`G` magnitude suffix
/// (case-insensitive) into a base count. Fractional values are rounded to
/// the nearest base.
///
/// # Errors
///
/// Returns `ConfigError::BadGenomeSize` if the string is not a number with
/// an optional suffix, or `ConfigError::NonPositiveGenomeSize` if it comes
/// out below one base.
pub fn parse_genome_size(s: &str) -> Result<u64, ConfigError> {
    let lower = s.trim().to_lowercase();
    let bad = || ConfigError::BadGenomeSize(s.to_string());

    let (value_str, multiplier) = if let Some(v) = lower.strip_suffix('g') {
        (v, 1_000_000_000)
    } else if let Some(v) = lower.strip_suffix('m') {
        (v, 1_000_000)
    } else if let Some(v) = lower.strip_suffix('k') {
        (v, 1_000)
    } else {
        (lower.as_str(), 1)
    };
    if value_str.is_empty() {
        return Err(bad());
    }

    let bases = if value_str.contains('.') {
        let value: f64 = value_str.parse().map_err(|_| bad())?;
        (value * multiplier as f64).round() as i64
    } else {
        let value: i64 = value_str.parse().map_err(|_| bad())?;
        value.saturating_mul(multiplier)
    };

    if bases < 1 {
        return Err(ConfigError::NonPositiveGenomeSize);
    }
    let bases = bases as u64;
    if bases < 100 {
        warn!(
            "genome size is very small ({} bases) - did you mean to use a suffix (G, M, k)?",
            thousands(bases)
        );
    } else if bases > 100_000_000_000 {
        warn!(
            "genome size is very large ({} bases) - is that a mistake?",
            thousands(bases)
        );
    }
    Ok(bases)
}

fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_parse_genome_size_suffixes() {
        assert_eq!(parse_genome_size("3G").unwrap(), 3_000_000_000);
        assert_eq!(parse_genome_size("5.5M").unwrap(), 5_500_000);
        assert_eq!(parse_genome_size("800k").unwrap(), 800_000);
        assert_eq!(parse_genome_size("1000000").unwrap(), 1_000_000);
    }

    #[test]
    fn test_parse_genome_size_case_insensitive() {
        assert_eq!(parse_genome_size("3g").unwrap(), 3_000_000_000);
        assert_eq!(parse_genome_size("800K").unwrap(), 800_000);
    }

    #[test]
    fn test_parse_genome_size_fractional_rounds() {
        assert_eq!(parse_genome_size("2.5k").unwrap(), 2_500);
        assert_eq!(parse_genome_size("2.25k").unwrap(), 2_250);
    }

    #[test]
    fn test_parse_genome_size_rejects_garbage() {
        assert!(matches!(
            parse_genome_size("banana"),
            Err(ConfigError::BadGenomeSize(_))
        ));
        assert!(matches!(
            parse_genome_size(""),
            Err(ConfigError::BadGenomeSize(_))
        ));
        assert!(matches!(
            parse_genome_size("M"),
            Err(ConfigError::BadGenomeSize(_))
        ));
        assert!(matches!(
            parse_genome_size("5.5.5M"),
            Err(ConfigError::BadGenomeSize(_))
        ));
    }

    #[test]
    fn test_parse_genome_size_rejects_non_positive() {
        assert!(matches!(
            parse_genome_size("0"),
            Err(ConfigError::NonPositiveGenomeSize)
        ));
        assert!(matches!(
            parse_genome_size("-5M"),
            Err(ConfigError::NonPositiveGenomeSize)
        ));
    }

    #[test]
    fn test_split_options() {
        assert!(split_options(None).is_empty());
        assert_eq!(
            split_options(Some("-M80 -e0.85")),
            vec!["-M80".to_string(), "-e0.85".to_string()]
        );
        assert_eq!(split_options(Some("  -s50  ")), vec!["-s50".to_string()]);
    }

    #[test]
    fn test_has_flag() {
        let opts = split_options(Some("-s50 -x1"));
        assert!(has_flag(&opts, "-s"));
        assert!(has_flag(&opts, "-x"));
        assert!(!has_flag(&opts, "-c"));
        assert!(!has_flag(&[], "-s"));
    }

    fn raw_with_input(input: &NamedTempFile) -> RawConfig {
        RawConfig {
            input_reads: input.path().to_path_buf(),
            genome_size: "5M".to_string(),
            repeat_depth: 2.0,
            pid: 4242,
            ..RawConfig::default()
        }
    }

    #[test]
    fn test_resolve_defaults_tempdir_from_pid() {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(b">r\nACGT\n").unwrap();

        let config = PipelineConfig::resolve(raw_with_input(&input)).unwrap();
        assert!(config.tempdir.is_absolute());
        assert!(config
            .tempdir
            .file_name()
            .unwrap()
            .to_string_lossy()
            .ends_with("dascrubber_temp_4242"));
        assert_eq!(config.genome_size, 5_000_000);
        assert!(!config.keep_temp);
    }

    #[test]
    fn test_resolve_rejects_missing_input() {
        let raw = RawConfig {
            input_reads: PathBuf::from("/no/such/reads.fastq"),
            genome_size: "5M".to_string(),
            repeat_depth: 2.0,
            ..RawConfig::default()
        };
        assert!(matches!(
            PipelineConfig::resolve(raw),
            Err(ConfigError::MissingInput(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_existing_tempdir() {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(b">r\nACGT\n").unwrap();
        let existing = tempdir().unwrap();

        let mut raw = raw_with_input(&input);
        raw.tempdir = Some(existing.path().to_path_buf());
        assert!(matches!(
            PipelineConfig::resolve(raw),
            Err(ConfigError::TempDirExists(_))
        ));
    }

    #[test]
    fn test_resolve_rejects_non_positive_repeat_depth() {
        let mut input = NamedTempFile::new().unwrap();
        input.write_all(b">r\nACGT\n").unwrap();

        let mut raw = raw_with_input(&input);
        raw.repeat_depth = 0.0;
        assert!(matches!(
            PipelineConfig::resolve(raw),
            Err(ConfigError::NonPositiveRepeatDepth(_))
        ));
    }
}
