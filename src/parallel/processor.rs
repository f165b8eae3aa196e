//! Main parallel processor
//!
//! Coordinates one run: the calling thread pulls batches from the chunk
//! source and admits them to K worker threads; a sink thread restores batch
//! order and writes results.

use crossbeam_channel::bounded;
use std::sync::Arc;
use std::thread;

use crate::error::{LocateError, Result};
use crate::formatters::BatchSink;
use crate::patterns::PatternSet;
use crate::platform::CancelToken;

use super::sink::{ordered_result_sink, SinkSummary};
use super::types::{Batch, ParallelConfig};
use super::worker::worker_thread;

/// Main parallel processor
pub struct Coordinator {
    config: ParallelConfig,
    cancel: CancelToken,
}

impl Coordinator {
    pub fn new(config: ParallelConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Share a cancellation token with the caller, e.g. the signal handler
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the pipeline over every batch of `source`, handing results to
    /// `sink` in batch order. Returns the sink so it can be reused for the
    /// next input.
    ///
    /// At most `num_workers` batches are being matched at any time: the work
    /// channel is a rendezvous channel, so the producer only advances when a
    /// worker is free to take the batch.
    pub fn run<I, S>(&self, source: I, patterns: Arc<PatternSet>, sink: S) -> Result<(S, SinkSummary)>
    where
        I: IntoIterator<Item = Result<Batch>>,
        S: BatchSink + Send + 'static,
    {
        let num_workers = self.config.num_workers;
        if num_workers == 0 {
            return Err(LocateError::config("number of workers must be greater than 0"));
        }
        if patterns.is_empty() {
            return Err(LocateError::config("no patterns given"));
        }

        let (work_sender, work_receiver) = bounded::<Batch>(0);
        let (result_sender, result_receiver) = bounded(self.config.result_capacity());

        // Start worker threads
        let mut worker_handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let work_receiver = work_receiver.clone();
            let result_sender = result_sender.clone();
            let patterns = Arc::clone(&patterns);
            let both_strands = self.config.both_strands;
            let cancel = self.cancel.clone();

            let handle = thread::Builder::new()
                .name(format!("locate-worker-{}", worker_id))
                .spawn(move || {
                    worker_thread(
                        worker_id,
                        work_receiver,
                        result_sender,
                        patterns,
                        both_strands,
                        cancel,
                    )
                })?;
            worker_handles.push(handle);
        }

        // Workers hold the only remaining handles: the results channel closes
        // once every worker has finished its last batch
        drop(work_receiver);
        drop(result_sender);

        // Start result sink thread
        let sink_handle = {
            let cancel = self.cancel.clone();
            thread::Builder::new()
                .name("locate-sink".to_string())
                .spawn(move || ordered_result_sink(result_receiver, sink, cancel))?
        };

        let mut errors = Vec::new();
        let mut dispatched = 0u64;

        for item in source {
            if self.cancel.is_cancelled() {
                break;
            }
            match item {
                Ok(batch) => {
                    let batch_id = batch.id;
                    if work_sender.send(batch).is_err() {
                        // Every worker has exited, which only happens on error
                        break;
                    }
                    log::trace!("dispatched batch {}", batch_id);
                    dispatched += 1;
                }
                Err(e) => {
                    self.cancel.cancel();
                    errors.push(e);
                    break;
                }
            }
        }
        drop(work_sender);
        log::debug!("dispatched {} batch(es) to {} worker(s)", dispatched, num_workers);

        // Wait for all threads to complete
        for (idx, handle) in worker_handles.into_iter().enumerate() {
            match handle.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => errors.push(e),
                Err(_) => {
                    self.cancel.cancel();
                    errors.push(LocateError::InvariantViolation(format!(
                        "worker thread {} panicked outside batch processing",
                        idx
                    )));
                }
            }
        }

        let sink_outcome = match sink_handle.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(LocateError::InvariantViolation(
                "sink thread panicked".to_string(),
            )),
        };

        let sink_result = match sink_outcome {
            Ok(done) => Some(done),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if let Some(error) = first_fatal(errors) {
            return Err(error);
        }

        match sink_result {
            Some(_) if self.cancel.is_cancelled() => Err(LocateError::Cancelled),
            Some(done) => Ok(done),
            None => Err(LocateError::InvariantViolation(
                "sink finished without a result".to_string(),
            )),
        }
    }
}

/// Pick the error to report when several threads failed. A worker failure
/// usually causes follow-up errors elsewhere, so the most specific one wins;
/// ties go to whichever was recorded first.
fn first_fatal(errors: Vec<LocateError>) -> Option<LocateError> {
    let mut chosen: Option<LocateError> = None;
    for error in errors {
        match &chosen {
            Some(current) if current.precedence() >= error.precedence() => {
                log::debug!("suppressing follow-up error: {}", error);
            }
            _ => chosen = Some(error),
        }
    }
    chosen
}
