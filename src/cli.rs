// CLI-specific types and structures
// This module contains the command-line interface definitions and parsing logic

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;

use crate::alphabet::SeqType;
use crate::sequence::DEFAULT_ID_REGEXP;
use crate::stats::StatsFormat;

// CLI structure - contains all command-line arguments and options
#[derive(Parser, Debug)]
#[command(name = "seqlocate")]
#[command(about = "Locate subsequences and motifs in FASTA/FASTQ sequences")]
#[command(
    long_about = "Locate subsequences and motifs in FASTA/FASTQ sequences\n\nPatterns are regular expressions matched against every record, on both strands unless -P is given. With -d they are sequences that may contain IUPAC degenerate bases.\n\nOutput is a tab-separated table with 1-based, end-inclusive coordinates, in input order regardless of the number of threads.\n\nCOMMON EXAMPLES:\n  seqlocate -p GAATTC genome.fa\n  seqlocate -d -p ACGNNR,TATAWAW -j 8 reads.fq.gz -o hits.tsv.gz\n  seqlocate -f enzymes.fa -i -P contigs.fa"
)]
#[command(version)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Input FASTA/FASTQ files, optionally gzip/zstd compressed (stdin if not specified, or use "-")
    pub files: Vec<String>,

    /// Pattern or motif to search for. Repeat the option or separate several with commas
    #[arg(
        short = 'p',
        long = "pattern",
        value_delimiter = ',',
        help_heading = "Pattern Options"
    )]
    pub patterns: Vec<String>,

    /// FASTA file of patterns; record IDs become pattern names
    #[arg(
        short = 'f',
        long = "pattern-file",
        conflicts_with = "patterns",
        help_heading = "Pattern Options"
    )]
    pub pattern_file: Option<PathBuf>,

    /// Patterns contain IUPAC degenerate bases instead of regular expressions
    #[arg(short = 'd', long = "degenerate", help_heading = "Pattern Options")]
    pub degenerate: bool,

    /// Match case-insensitively
    #[arg(short = 'i', long = "ignore-case", help_heading = "Pattern Options")]
    pub ignore_case: bool,

    /// Only search the positive strand
    #[arg(short = 'P', long = "only-positive-strand", help_heading = "Search Options")]
    pub only_positive_strand: bool,

    /// Sequence type, used for degenerate expansion
    #[arg(
        short = 't',
        long = "seq-type",
        value_enum,
        default_value_t = SeqType::Auto,
        help_heading = "Search Options"
    )]
    pub seq_type: SeqType,

    /// Regular expression with one capture group extracting record IDs from headers
    #[arg(
        long = "id-regexp",
        default_value = DEFAULT_ID_REGEXP,
        help_heading = "Search Options"
    )]
    pub id_regexp: String,

    /// Output file ("-" for stdout); a .gz suffix writes gzip
    #[arg(short = 'o', long = "out-file", help_heading = "Output Options")]
    pub out_file: Option<PathBuf>,

    /// Print a run summary to stderr
    #[arg(long = "stats", help_heading = "Output Options")]
    pub stats: bool,

    /// Format of the run summary
    #[arg(
        long = "stats-format",
        value_enum,
        default_value_t = StatsFormat::Table,
        help_heading = "Output Options"
    )]
    pub stats_format: StatsFormat,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short = 'j', long = "threads", help_heading = "Performance Options")]
    pub threads: Option<usize>,

    /// Records per batch
    #[arg(
        short = 'c',
        long = "chunk-size",
        default_value_t = 1000,
        help_heading = "Performance Options"
    )]
    pub chunk_size: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Logging Options")]
    pub verbose: u8,

    /// Only log errors
    #[arg(
        short = 'q',
        long = "quiet",
        conflicts_with = "verbose",
        help_heading = "Logging Options"
    )]
    pub quiet: bool,

    /// Print a shell completion script and exit
    #[arg(long = "completions", value_name = "SHELL", value_enum)]
    pub completions: Option<Shell>,
}

impl Cli {
    /// Log filter implied by -v/-q, used unless RUST_LOG is set
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Write a completion script for `shell` to stdout
    pub fn print_completions(shell: Shell) {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut io::stdout());
    }
}
