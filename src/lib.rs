// Core library for seqlocate: parallel, order-preserving motif location in
// FASTA/FASTQ records

use std::io::Write;
use std::sync::Arc;

pub mod alphabet;
pub mod cli;
pub mod config;
pub mod decompression;
pub mod error;
pub mod formatters;
pub mod parallel;
pub mod patterns;
pub mod platform;
pub mod sequence;
pub mod stats;

pub use config::LocateConfig;
pub use error::{LocateError, Result};
pub use formatters::{BatchSink, TsvWriter, TSV_HEADER};
pub use parallel::{Coordinator, ParallelConfig};
pub use patterns::{PatternSet, PatternSetBuilder};
pub use platform::CancelToken;
pub use stats::RunStats;

use sequence::RecordChunker;

/// Locate every pattern in every input of `config`, writing one result table
/// to `output`.
///
/// Inputs are processed one after another through the same pipeline and the
/// same writer, so the header appears once and rows follow input order across
/// files. Returns the output (for the caller to finish) and the run summary.
pub fn run_locate<W>(config: &LocateConfig, output: W, cancel: CancelToken) -> Result<(W, RunStats)>
where
    W: Write + Send + 'static,
{
    config.validate()?;
    let ids = config.id_extractor()?;

    let patterns = Arc::new(
        PatternSetBuilder::new(config.pattern_options()).build(&config.pattern_source())?,
    );
    let mut stats = RunStats::new(patterns.len());

    let parallel = config.parallel_config();
    log::info!(
        "searching {} pattern(s) with {} worker(s), {} records per batch, {}",
        patterns.len(),
        parallel.num_workers,
        parallel.batch_size,
        if parallel.both_strands {
            "both strands"
        } else {
            "positive strand only"
        }
    );
    let chunk_size = parallel.batch_size;
    let coordinator = Coordinator::new(parallel).with_cancel_token(cancel);

    let mut writer = TsvWriter::new(output, Arc::clone(&patterns))?;

    for file in config.input_files() {
        let chunker = RecordChunker::from_path(&file, chunk_size, ids.clone())?;
        log::info!("processing {}", chunker.source_name());

        let (returned, summary) = coordinator.run(chunker, Arc::clone(&patterns), writer)?;
        writer = returned;

        log::info!(
            "finished {}: {} record(s), {} match(es)",
            file,
            summary.records,
            summary.match_rows
        );
        stats.add_file(&summary);
    }

    writer.flush()?;
    stats.finish();
    Ok((writer.into_inner(), stats))
}
