//! Worker thread for parallel processing
//!
//! Matches every pattern of the shared set against every record of a batch,
//! on the forward strand and optionally on the reverse complement.

use crossbeam_channel::{Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{LocateError, Result};
use crate::patterns::PatternSet;
use crate::platform::CancelToken;

use super::types::{Batch, Match, RecordHits, ResultBatch, Span, Strand};

/// Match one batch. Pure apart from allocation: the output depends only on
/// the batch contents and the pattern set.
pub fn match_batch(batch: Batch, patterns: &PatternSet, both_strands: bool) -> Result<ResultBatch> {
    let Batch { id, records } = batch;
    let mut hits = Vec::with_capacity(records.len());
    let mut spans = Vec::new();

    for record in records {
        let mut matches = Vec::new();
        let reverse = if both_strands && !record.is_empty() {
            Some(record.reverse_complement())
        } else {
            None
        };

        for (index, pattern) in patterns.iter().enumerate() {
            let fail = |e: crate::patterns::MatchFailure| LocateError::Worker {
                batch: id,
                message: format!(
                    "pattern '{}' failed on record '{}': {}",
                    pattern.name, record.id, e
                ),
            };

            spans.clear();
            pattern.matcher.find_spans(&record.seq, &mut spans).map_err(fail)?;
            if !spans.is_empty() {
                matches.push(Match {
                    pattern: index,
                    strand: Strand::Forward,
                    spans: spans.clone(),
                });
            }

            if let Some(reverse) = &reverse {
                spans.clear();
                pattern.matcher.find_spans(reverse, &mut spans).map_err(fail)?;
                if !spans.is_empty() {
                    let len = record.len();
                    matches.push(Match {
                        pattern: index,
                        strand: Strand::Reverse,
                        spans: spans.iter().map(|s| s.to_forward(len)).collect::<Vec<Span>>(),
                    });
                }
            }
        }

        hits.push(RecordHits { record, matches });
    }

    Ok(ResultBatch { id, hits })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("matcher panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("matcher panicked: {}", s)
    } else {
        "matcher panicked".to_string()
    }
}

/// Worker thread: takes batches until the work channel closes or the run is
/// cancelled. A failing or panicking batch cancels the run and is returned
/// as a worker error.
pub(crate) fn worker_thread(
    worker_id: usize,
    work_receiver: Receiver<Batch>,
    result_sender: Sender<ResultBatch>,
    patterns: Arc<PatternSet>,
    both_strands: bool,
    cancel: CancelToken,
) -> Result<()> {
    let mut processed = 0u64;

    while let Ok(batch) = work_receiver.recv() {
        if cancel.is_cancelled() {
            break;
        }

        let batch_id = batch.id;
        log::trace!("worker {} matching batch {}", worker_id, batch_id);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            match_batch(batch, &patterns, both_strands)
        }));

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                cancel.cancel();
                return Err(e);
            }
            Err(payload) => {
                cancel.cancel();
                return Err(LocateError::Worker {
                    batch: batch_id,
                    message: panic_message(payload.as_ref()),
                });
            }
        };

        if result_sender.send(result).is_err() {
            // Sink is gone, it already reported why
            cancel.cancel();
            break;
        }
        processed += 1;
    }

    log::debug!("worker {} finished after {} batch(es)", worker_id, processed);
    Ok(())
}
