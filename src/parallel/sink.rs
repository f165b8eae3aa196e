//! Result sink thread for parallel processing
//!
//! Receives result batches in completion order and hands them to the output
//! in batch id order.

use crossbeam_channel::Receiver;

use crate::error::{LocateError, Result};
use crate::formatters::BatchSink;
use crate::platform::CancelToken;

use super::reorder::ReorderBuffer;
use super::types::ResultBatch;

/// What the sink emitted during one run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SinkSummary {
    pub batches: u64,
    pub records: u64,
    pub match_rows: u64,
    /// Largest number of results held back waiting for an earlier batch
    pub max_pending: usize,
}

fn emit<S: BatchSink>(sink: &mut S, batch: &ResultBatch, summary: &mut SinkSummary) -> Result<()> {
    let rows = sink.write_batch(batch)?;
    summary.batches += 1;
    summary.records += batch.hits.len() as u64;
    summary.match_rows += rows;
    Ok(())
}

fn fail<T>(cancel: &CancelToken, error: LocateError) -> Result<T> {
    cancel.cancel();
    Err(error)
}

/// Ordered result sink: emits each batch as soon as every lower id has been
/// emitted. After cancellation results are drained without being written so
/// workers never block on a full channel.
pub(crate) fn ordered_result_sink<S: BatchSink>(
    result_receiver: Receiver<ResultBatch>,
    mut sink: S,
    cancel: CancelToken,
) -> Result<(S, SinkSummary)> {
    let mut buffer = ReorderBuffer::new();
    let mut summary = SinkSummary::default();

    while let Ok(batch) = result_receiver.recv() {
        if cancel.is_cancelled() {
            continue;
        }

        let released = match buffer.push(batch.id, batch) {
            Ok(released) => released,
            Err(e) => return fail(&cancel, e),
        };

        for ready in released {
            if let Err(e) = emit(&mut sink, &ready, &mut summary) {
                return fail(&cancel, e);
            }
        }

        if !buffer.is_empty() {
            log::trace!(
                "holding {} result batch(es), waiting for batch {}",
                buffer.len(),
                buffer.next_expected()
            );
        }
    }

    summary.max_pending = buffer.max_pending();

    if cancel.is_cancelled() {
        log::debug!(
            "sink stopped after {} batch(es), discarding {} pending",
            summary.batches,
            buffer.len()
        );
    } else {
        // Channel closed: everything still held must now be contiguous
        let remaining = match buffer.finish() {
            Ok(remaining) => remaining,
            Err(e) => return fail(&cancel, e),
        };
        for ready in remaining {
            if let Err(e) = emit(&mut sink, &ready, &mut summary) {
                return fail(&cancel, e);
            }
        }
    }

    if let Err(e) = sink.flush() {
        return fail(&cancel, e.into());
    }
    Ok((sink, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::types::RecordHits;
    use crate::sequence::SeqRecord;
    use crossbeam_channel::unbounded;
    use std::io;

    /// Records the order batches are written in
    #[derive(Default)]
    struct RecordingSink {
        written: Vec<u64>,
        fail_on: Option<u64>,
    }

    impl BatchSink for RecordingSink {
        fn write_batch(&mut self, batch: &ResultBatch) -> io::Result<u64> {
            if self.fail_on == Some(batch.id) {
                return Err(io::Error::other("disk full"));
            }
            self.written.push(batch.id);
            Ok(0)
        }
    }

    fn result(id: u64) -> ResultBatch {
        ResultBatch {
            id,
            hits: vec![RecordHits {
                record: SeqRecord::new(format!("r{}", id), b"ACGT".to_vec()),
                matches: Vec::new(),
            }],
        }
    }

    fn run_sink(ids: &[u64], sink: RecordingSink) -> (Result<(RecordingSink, SinkSummary)>, CancelToken) {
        let (tx, rx) = unbounded();
        for &id in ids {
            tx.send(result(id)).unwrap();
        }
        drop(tx);
        let cancel = CancelToken::new();
        (ordered_result_sink(rx, sink, cancel.clone()), cancel)
    }

    #[test]
    fn test_out_of_order_arrival_is_written_in_order() -> Result<()> {
        let (outcome, _) = run_sink(&[2, 0, 1], RecordingSink::default());
        let (sink, summary) = outcome?;
        assert_eq!(sink.written, vec![0, 1, 2]);
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.records, 3);
        // Only batch 2 had to wait
        assert_eq!(summary.max_pending, 1);
        Ok(())
    }

    #[test]
    fn test_in_order_arrival_holds_nothing() -> Result<()> {
        let (outcome, _) = run_sink(&[0, 1, 2, 3], RecordingSink::default());
        let (sink, summary) = outcome?;
        assert_eq!(sink.written, vec![0, 1, 2, 3]);
        assert_eq!(summary.max_pending, 0);
        Ok(())
    }

    #[test]
    fn test_missing_batch_is_invariant_violation() {
        let (outcome, cancel) = run_sink(&[0, 2], RecordingSink::default());
        assert!(matches!(outcome, Err(LocateError::InvariantViolation(_))));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_duplicate_batch_is_invariant_violation() {
        let (outcome, _) = run_sink(&[0, 0], RecordingSink::default());
        assert!(matches!(outcome, Err(LocateError::InvariantViolation(_))));
    }

    #[test]
    fn test_write_error_cancels_run() {
        let sink = RecordingSink {
            fail_on: Some(1),
            ..Default::default()
        };
        let (outcome, cancel) = run_sink(&[0, 1, 2], sink);
        assert!(matches!(outcome, Err(LocateError::Io(_))));
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_cancelled_sink_drains_without_writing() -> Result<()> {
        let (tx, rx) = unbounded();
        for id in [1, 2, 3] {
            tx.send(result(id)).unwrap();
        }
        drop(tx);
        let cancel = CancelToken::new();
        cancel.cancel();

        let (sink, summary) = ordered_result_sink(rx, RecordingSink::default(), cancel)?;
        assert!(sink.written.is_empty());
        assert_eq!(summary.batches, 0);
        Ok(())
    }
}
