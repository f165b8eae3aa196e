mod common;
use common::*;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};
use tempfile::TempDir;

const HEADER: &str = "seqID\tpatternName\tpattern\tstrand\tstart\tend\tmatched";

#[test]
fn test_basic_forward_and_reverse_rows() {
    let fasta = ">chr1 test sequence\nTTGAATTCAA\n>chr2\nAAACCCGGG\n";
    let (stdout, stderr, exit_code) = run_seqlocate_with_input(&["-p", "GAATTC,CCC"], fasta);

    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], HEADER);
    assert_eq!(
        &lines[1..],
        &[
            // GAATTC is its own reverse complement
            "chr1\tGAATTC\tGAATTC\t1\t3\t8\tGAATTC",
            "chr1\tGAATTC\tGAATTC\t-1\t3\t8\tGAATTC",
            "chr2\tCCC\tCCC\t1\t4\t6\tCCC",
            // GGG on the forward strand reads CCC on the reverse
            "chr2\tCCC\tCCC\t-1\t7\t9\tCCC",
        ]
    );
}

#[test]
fn test_only_positive_strand() {
    let fasta = ">chr2\nAAACCCGGG\n";
    let (stdout, _stderr, exit_code) = run_seqlocate_with_input(&["-P", "-p", "CCC"], fasta);
    assert_eq!(exit_code, 0);
    assert_eq!(data_rows(&stdout), vec!["chr2\tCCC\tCCC\t1\t4\t6\tCCC"]);
}

#[test]
fn test_degenerate_and_ignore_case() {
    let fasta = ">r1\nttacgtgg\n";
    let (stdout, stderr, exit_code) =
        run_seqlocate_with_input(&["-d", "-i", "-P", "-p", "ACNTR"], fasta);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(data_rows(&stdout), vec!["r1\tACNTR\tACNTR\t1\t3\t7\tacgtg"]);
}

#[test]
fn test_header_only_when_nothing_matches() {
    let (stdout, _stderr, exit_code) =
        run_seqlocate_with_file(&["-p", "GGGGGG"], ">r1\nACACACAC\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, format!("{}\n", HEADER));
}

#[test]
fn test_single_header_across_files_in_order() {
    let first = write_temp_file(">a1\nACGT\n>a2\nTTTT\n");
    let second = write_temp_file(">b1\nAACGTT\n");
    let (stdout, _stderr, exit_code) = run_seqlocate_with_files(
        &["-P", "-p", "ACG"],
        &[
            first.path().to_str().unwrap(),
            second.path().to_str().unwrap(),
        ],
    );

    assert_eq!(exit_code, 0);
    assert_eq!(stdout.matches("seqID").count(), 1);
    let ids: Vec<&str> = data_rows(&stdout)
        .iter()
        .map(|l| l.split('\t').next().unwrap())
        .collect();
    assert_eq!(ids, vec!["a1", "b1"]);
}

#[test]
fn test_thread_count_does_not_change_output() {
    let fasta = to_fasta(&random_records(42, 400, 300));
    let args = |threads: &'static str| vec!["-p", "ACGT,GG[AC]T", "-c", "7", "-j", threads];

    let (serial, _, code1) = run_seqlocate_with_file(&args("1"), &fasta);
    let (parallel, _, code8) = run_seqlocate_with_file(&args("8"), &fasta);

    assert_eq!(code1, 0);
    assert_eq!(code8, 0);
    assert!(data_rows(&serial).len() > 10);
    assert_eq!(serial, parallel);
}

#[test]
fn test_pattern_file_names() {
    let patterns = write_temp_file(">EcoRI site\nGAATTC\n>BamHI\nGGATCC\n");
    let (stdout, stderr, exit_code) = run_seqlocate_with_input(
        &["-P", "-f", patterns.path().to_str().unwrap()],
        ">r1\nGGATCCGAATTC\n",
    );
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(
        data_rows(&stdout),
        vec![
            "r1\tEcoRI\tGAATTC\t1\t7\t12\tGAATTC",
            "r1\tBamHI\tGGATCC\t1\t1\t6\tGGATCC",
        ]
    );
}

#[test]
fn test_fastq_input() {
    let fastq = "@read1 lane=1\nCCGATTACA\n+\nIIIIIIIII\n";
    let (stdout, _stderr, exit_code) = run_seqlocate_with_input(&["-P", "-p", "TTAC"], fastq);
    assert_eq!(exit_code, 0);
    assert_eq!(data_rows(&stdout), vec!["read1\tTTAC\tTTAC\t1\t5\t8\tTTAC"]);
}

#[test]
fn test_gzip_input_and_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.fa.gz");
    let output = dir.path().join("out.tsv.gz");

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(b">r1\nAAGGTTAA\n").unwrap();
    std::fs::write(&input, encoder.finish().unwrap()).unwrap();

    let (_stdout, stderr, exit_code) = run_seqlocate_with_files(
        &["-P", "-p", "GGTT", "-o", output.to_str().unwrap()],
        &[input.to_str().unwrap()],
    );
    assert_eq!(exit_code, 0, "stderr: {}", stderr);

    let mut text = String::new();
    GzDecoder::new(std::fs::File::open(&output).unwrap())
        .read_to_string(&mut text)
        .unwrap();
    assert_eq!(data_rows(&text), vec!["r1\tGGTT\tGGTT\t1\t3\t6\tGGTT"]);
}

#[test]
fn test_stats_json_on_stderr() {
    let (_stdout, stderr, exit_code) = run_seqlocate_with_input(
        &["-P", "-p", "AC", "--stats", "--stats-format", "json"],
        ">r1\nACAC\n>r2\nGG\n",
    );
    assert_eq!(exit_code, 0);
    let json_line = stderr
        .lines()
        .find(|l| l.starts_with('{'))
        .expect("stats line on stderr");
    let value: serde_json::Value = serde_json::from_str(json_line).unwrap();
    assert_eq!(value["records"], 2);
    assert_eq!(value["match_rows"], 2);
    assert_eq!(value["files"], 1);
}

#[test]
fn test_missing_pattern_is_usage_error() {
    let (_stdout, stderr, exit_code) = run_seqlocate_with_input(&[], ">r1\nACGT\n");
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("--pattern"));
}

#[test]
fn test_invalid_regex_is_usage_error() {
    let (_stdout, stderr, exit_code) = run_seqlocate_with_input(&["-p", "AC(GT"], ">r1\nACGT\n");
    assert_eq!(exit_code, 2);
    assert!(stderr.contains("AC(GT"));
}

#[test]
fn test_zero_threads_is_usage_error() {
    let (_stdout, _stderr, exit_code) =
        run_seqlocate_with_input(&["-j", "0", "-p", "A"], ">r1\nACGT\n");
    assert_eq!(exit_code, 2);
}

#[test]
fn test_unreadable_input_is_general_error() {
    let (stdout, stderr, exit_code) =
        run_seqlocate_with_files(&["-p", "ACGT"], &["/nonexistent/input.fa"]);
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("/nonexistent/input.fa"));
    // Header was already written before the failing input was opened
    assert_eq!(stdout, format!("{}\n", HEADER));
}

#[test]
fn test_malformed_input_is_general_error() {
    let (_stdout, stderr, exit_code) = run_seqlocate_with_input(&["-p", "ACGT"], "not a fasta file\n");
    assert_eq!(exit_code, 1);
    assert!(stderr.contains("unrecognized sequence format"));
}

#[test]
fn test_completions() {
    let (stdout, _stderr, exit_code) = run_seqlocate_with_input(&["--completions", "bash"], "");
    assert_eq!(exit_code, 0);
    assert!(stdout.contains("seqlocate"));
}
