//! Type definitions for parallel processing
//!
//! Contains batches, per-record results and the pipeline configuration.

use std::fmt;

use crate::sequence::SeqRecord;

/// Configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of concurrently running match workers (K)
    pub num_workers: usize,
    /// Records per batch
    pub batch_size: usize,
    /// Search the reverse complement as well as the forward strand
    pub both_strands: bool,
    /// Capacity of the unordered results channel, defaults to 4 x workers
    pub result_buffer_size: Option<usize>,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_workers: num_cpus::get(),
            batch_size: 1000,
            both_strands: true,
            result_buffer_size: None,
        }
    }
}

impl ParallelConfig {
    pub fn result_capacity(&self) -> usize {
        self.result_buffer_size
            .unwrap_or(self.num_workers.saturating_mul(4))
            .max(1)
    }
}

/// A batch of records to be matched together
#[derive(Debug, Clone)]
pub struct Batch {
    /// Zero-based, gap-free sequence number assigned by the chunk source
    pub id: u64,
    pub records: Vec<SeqRecord>,
}

/// Half-open, zero-based interval in forward-strand coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Map a span found on the reverse complement of a sequence of length
    /// `len` back to forward numbering: `[a, b)` becomes `[len - b, len - a)`.
    pub const fn to_forward(self, len: usize) -> Self {
        Self {
            start: len - self.end,
            end: len - self.start,
        }
    }

    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub const fn code(self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// All matches of one pattern on one strand of one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Position of the pattern in the pattern set
    pub pattern: usize,
    pub strand: Strand,
    /// Ascending on the searched strand, in forward-strand coordinates
    pub spans: Vec<Span>,
}

/// A record together with everything found on it. Records without matches
/// are kept so every input record is accounted for.
#[derive(Debug, Clone)]
pub struct RecordHits {
    pub record: SeqRecord,
    pub matches: Vec<Match>,
}

impl RecordHits {
    /// Number of output rows this record produces
    pub fn match_rows(&self) -> usize {
        self.matches.iter().map(|m| m.spans.len()).sum()
    }
}

/// Result of matching one batch
#[derive(Debug, Clone)]
pub struct ResultBatch {
    /// Copied from the source batch
    pub id: u64,
    pub hits: Vec<RecordHits>,
}

impl ResultBatch {
    pub fn match_rows(&self) -> usize {
        self.hits.iter().map(RecordHits::match_rows).sum()
    }
}
