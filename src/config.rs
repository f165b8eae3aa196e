use std::path::PathBuf;

use crate::alphabet::SeqType;
use crate::error::{LocateError, Result};
use crate::parallel::ParallelConfig;
use crate::patterns::{PatternOptions, PatternSource};
use crate::sequence::{IdExtractor, DEFAULT_ID_REGEXP};
use crate::stats::StatsFormat;

/// Main configuration struct for a locate run
#[derive(Debug, Clone)]
pub struct LocateConfig {
    pub input: InputConfig,
    pub patterns: PatternConfig,
    pub search: SearchConfig,
    pub performance: PerformanceConfig,
    pub output: OutputConfig,
}

/// Input configuration
#[derive(Debug, Clone)]
pub struct InputConfig {
    /// Input files; empty means stdin
    pub files: Vec<String>,
    pub id_regexp: String,
}

/// Where patterns come from and how they are compiled
#[derive(Debug, Clone, Default)]
pub struct PatternConfig {
    pub literals: Vec<String>,
    pub file: Option<PathBuf>,
    pub degenerate: bool,
    pub ignore_case: bool,
}

/// Search configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub seq_type: SeqType,
    pub only_positive_strand: bool,
}

/// Performance configuration
#[derive(Debug, Clone)]
pub struct PerformanceConfig {
    /// Worker count; `None` means one per CPU
    pub threads: Option<usize>,
    pub chunk_size: usize,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// `None` or "-" for stdout
    pub out_file: Option<PathBuf>,
    pub stats: bool,
    pub stats_format: StatsFormat,
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                files: Vec::new(),
                id_regexp: DEFAULT_ID_REGEXP.to_string(),
            },
            patterns: PatternConfig::default(),
            search: SearchConfig {
                seq_type: SeqType::Auto,
                only_positive_strand: false,
            },
            performance: PerformanceConfig {
                threads: None,
                chunk_size: 1000,
            },
            output: OutputConfig {
                out_file: None,
                stats: false,
                stats_format: StatsFormat::Table,
            },
        }
    }
}

impl LocateConfig {
    /// Create configuration from CLI arguments
    pub fn from_cli(cli: &crate::cli::Cli) -> Self {
        Self {
            input: InputConfig {
                files: cli.files.clone(),
                id_regexp: cli.id_regexp.clone(),
            },
            patterns: PatternConfig {
                literals: cli.patterns.clone(),
                file: cli.pattern_file.clone(),
                degenerate: cli.degenerate,
                ignore_case: cli.ignore_case,
            },
            search: SearchConfig {
                seq_type: cli.seq_type,
                only_positive_strand: cli.only_positive_strand,
            },
            performance: PerformanceConfig {
                threads: cli.threads,
                chunk_size: cli.chunk_size,
            },
            output: OutputConfig {
                out_file: cli.out_file.clone(),
                stats: cli.stats,
                stats_format: cli.stats_format,
            },
        }
    }

    /// Reject configurations that cannot run. Called before any input is read.
    pub fn validate(&self) -> Result<()> {
        if self.performance.threads == Some(0) {
            return Err(LocateError::config("number of threads must be greater than 0"));
        }
        if self.performance.chunk_size == 0 {
            return Err(LocateError::config("chunk size must be greater than 0"));
        }

        let has_literals = !self.patterns.literals.is_empty();
        match (has_literals, &self.patterns.file) {
            (false, None) => {
                return Err(LocateError::config(
                    "one of --pattern or --pattern-file is required",
                ))
            }
            (true, Some(_)) => {
                return Err(LocateError::config(
                    "--pattern and --pattern-file cannot be used together",
                ))
            }
            _ => {}
        }

        self.id_extractor()?;
        Ok(())
    }

    pub fn id_extractor(&self) -> Result<IdExtractor> {
        IdExtractor::new(&self.input.id_regexp)
    }

    pub fn pattern_source(&self) -> PatternSource {
        match &self.patterns.file {
            Some(path) => PatternSource::File(path.clone()),
            None => PatternSource::Literals(self.patterns.literals.clone()),
        }
    }

    pub fn pattern_options(&self) -> PatternOptions {
        PatternOptions {
            degenerate: self.patterns.degenerate,
            ignore_case: self.patterns.ignore_case,
            seq_type: self.search.seq_type,
        }
    }

    /// Input paths, with stdin standing in when none were given
    pub fn input_files(&self) -> Vec<String> {
        if self.input.files.is_empty() {
            vec!["-".to_string()]
        } else {
            self.input.files.clone()
        }
    }

    pub fn parallel_config(&self) -> ParallelConfig {
        let defaults = ParallelConfig::default();
        ParallelConfig {
            num_workers: self.performance.threads.unwrap_or(defaults.num_workers),
            batch_size: self.performance.chunk_size,
            both_strands: !self.search.only_positive_strand,
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_patterns(patterns: &[&str]) -> LocateConfig {
        let mut config = LocateConfig::default();
        config.patterns.literals = patterns.iter().map(|p| p.to_string()).collect();
        config
    }

    #[test]
    fn test_valid_default_with_pattern() {
        let config = with_patterns(&["ACGT"]);
        assert!(config.validate().is_ok());
        assert_eq!(config.input_files(), vec!["-"]);
        let parallel = config.parallel_config();
        assert!(parallel.num_workers > 0);
        assert_eq!(parallel.batch_size, 1000);
        assert!(parallel.both_strands);
    }

    #[test]
    fn test_zero_threads_rejected() {
        let mut config = with_patterns(&["ACGT"]);
        config.performance.threads = Some(0);
        assert!(matches!(config.validate(), Err(LocateError::Config(_))));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = with_patterns(&["ACGT"]);
        config.performance.chunk_size = 0;
        assert!(matches!(config.validate(), Err(LocateError::Config(_))));
    }

    #[test]
    fn test_pattern_input_required() {
        let config = LocateConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("--pattern"));
    }

    #[test]
    fn test_both_pattern_inputs_rejected() {
        let mut config = with_patterns(&["ACGT"]);
        config.patterns.file = Some("patterns.fa".into());
        assert!(matches!(config.validate(), Err(LocateError::Config(_))));
    }

    #[test]
    fn test_id_regexp_without_group_rejected() {
        let mut config = with_patterns(&["ACGT"]);
        config.input.id_regexp = r"^\S+".to_string();
        assert!(matches!(config.validate(), Err(LocateError::Config(_))));
    }

    #[test]
    fn test_parallel_config_mapping() {
        let mut config = with_patterns(&["ACGT"]);
        config.performance.threads = Some(3);
        config.performance.chunk_size = 17;
        config.search.only_positive_strand = true;
        let parallel = config.parallel_config();
        assert_eq!(parallel.num_workers, 3);
        assert_eq!(parallel.batch_size, 17);
        assert!(!parallel.both_strands);
    }

    #[test]
    fn test_pattern_source_selection() {
        let config = with_patterns(&["A", "C"]);
        assert!(matches!(config.pattern_source(), PatternSource::Literals(ref p) if p.len() == 2));
        let mut config = LocateConfig::default();
        config.patterns.file = Some("p.fa".into());
        assert!(matches!(config.pattern_source(), PatternSource::File(_)));
    }
}
