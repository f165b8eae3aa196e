// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

fn binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_seqlocate")
}

/// Helper function to run seqlocate with given arguments and input via stdin
pub fn run_seqlocate_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    let mut cmd = Command::new(binary_path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start seqlocate");

    // Write input to stdin
    if let Some(stdin) = cmd.stdin.as_mut() {
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write to stdin");
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Helper function to run seqlocate with a temporary input file
pub fn run_seqlocate_with_file(args: &[&str], file_content: &str) -> (String, String, i32) {
    let temp_file = write_temp_file(file_content);
    let path = temp_file.path().to_str().unwrap().to_string();
    run_seqlocate_with_files(args, &[&path])
}

/// Helper function to run seqlocate with multiple input files
pub fn run_seqlocate_with_files(args: &[&str], files: &[&str]) -> (String, String, i32) {
    let mut full_args = args.to_vec();
    full_args.extend(files);

    let output = Command::new(binary_path())
        .args(&full_args)
        .stdin(Stdio::null())
        .output()
        .expect("Failed to execute seqlocate");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

pub fn write_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file
        .write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    temp_file.flush().expect("Failed to flush temp file");
    temp_file
}

/// Deterministic random nucleotide records as (id, sequence)
pub fn random_records(seed: u64, count: usize, max_len: usize) -> Vec<(String, String)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let len = rng.random_range(0..=max_len);
            let seq: String = (0..len)
                .map(|_| b"ACGT"[rng.random_range(0..4)] as char)
                .collect();
            (format!("seq{}", i), seq)
        })
        .collect()
}

/// Render records as FASTA, wrapping sequence lines at 60 columns
pub fn to_fasta(records: &[(String, String)]) -> String {
    let mut out = String::new();
    for (id, seq) in records {
        out.push('>');
        out.push_str(id);
        out.push_str(" synthetic\n");
        for line in seq.as_bytes().chunks(60) {
            out.push_str(std::str::from_utf8(line).unwrap());
            out.push('\n');
        }
    }
    out
}

/// Data rows of a result table, header removed
pub fn data_rows(stdout: &str) -> Vec<&str> {
    stdout.lines().skip(1).collect()
}
