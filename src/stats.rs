use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};

use crate::parallel::SinkSummary;

/// Statistics collected over a whole run (all input files)
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub files: usize,
    pub records: u64,
    pub batches: u64,
    pub patterns: usize,
    pub match_rows: u64,
    /// Largest reorder backlog seen on any file
    pub max_pending: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    #[serde(skip)]
    pub start_time: Option<Instant>,
}

fn serialize_secs<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// How `--stats` is rendered
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatsFormat {
    #[default]
    Table,
    Json,
}

impl RunStats {
    pub fn new(patterns: usize) -> Self {
        Self {
            patterns,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Fold in what the sink reported for one input file
    pub fn add_file(&mut self, summary: &SinkSummary) {
        self.files += 1;
        self.records += summary.records;
        self.batches += summary.batches;
        self.match_rows += summary.match_rows;
        self.max_pending = self.max_pending.max(summary.max_pending);
    }

    pub fn finish(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed = start.elapsed();
        }
    }

    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Records processed: {} in {} batches from {} file(s); {} pattern(s), {} match(es)",
            self.records, self.batches, self.files, self.patterns, self.match_rows
        );

        if self.max_pending > 0 {
            output.push_str(&format!(", max {} batch(es) held for ordering", self.max_pending));
        }

        // Millisecond resolution is plenty for a summary line
        let elapsed = Duration::from_millis(self.elapsed.as_millis() as u64);
        output.push_str(&format!(" in {}", humantime::format_duration(elapsed)));

        let millis = self.elapsed.as_millis();
        if millis > 0 && self.records > 0 {
            let per_sec = (self.records as f64 * 1000.0) / millis as f64;
            output.push_str(&format!(" ({:.0} records/s)", per_sec));
        }

        output
    }

    pub fn render(&self, format: StatsFormat) -> serde_json::Result<String> {
        match format {
            StatsFormat::Table => Ok(self.format_stats()),
            StatsFormat::Json => serde_json::to_string(self),
        }
    }
}
