//! Command-line validation tests. These never need the Dazzler toolchain:
//! every case fails (or exits) before any external tool would run.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::{tempdir, NamedTempFile};

fn wrapper() -> Command {
    Command::cargo_bin("dascrubber_wrapper").unwrap()
}

fn input_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b">read1\nACGTACGT\n").unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn help_prints_usage_and_exits_zero() {
    wrapper()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input_reads"))
        .stdout(predicate::str::contains("--genome_size"))
        .stdout(predicate::str::contains("--repeat_depth"))
        .stdout(predicate::str::contains("--daligner_options"));
}

#[test]
fn missing_required_arguments_is_an_error() {
    wrapper()
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn unparsable_genome_size_is_an_error() {
    let input = input_file();
    wrapper()
        .arg("-i")
        .arg(input.path())
        .args(["-g", "banana"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse genome size"));
}

#[test]
fn zero_genome_size_is_an_error() {
    let input = input_file();
    wrapper()
        .arg("-i")
        .arg(input.path())
        .args(["-g", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn non_positive_repeat_depth_is_an_error() {
    let input = input_file();
    wrapper()
        .arg("-i")
        .arg(input.path())
        .args(["-g", "5M", "-r", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("repeat depth"));
}

#[test]
fn missing_input_file_is_an_error() {
    wrapper()
        .args(["-i", "/no/such/reads.fastq", "-g", "5M"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn existing_tempdir_is_an_error() {
    let input = input_file();
    let existing = tempdir().unwrap();
    wrapper()
        .arg("-i")
        .arg(input.path())
        .args(["-g", "5M"])
        .arg("-d")
        .arg(existing.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn missing_toolchain_is_reported_before_running() {
    let input = input_file();
    let empty = tempdir().unwrap();
    wrapper()
        .env("PATH", empty.path())
        .arg("-i")
        .arg(input.path())
        .args(["-g", "5M"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find required tool"))
        .stderr(predicate::str::contains("fasta2DB"))
        .stderr(predicate::str::contains("DB2fasta"));
}
