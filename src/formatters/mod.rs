//! Output of ordered result batches.

mod tsv;

pub use tsv::{TsvWriter, TSV_HEADER};

use std::io;

use crate::parallel::ResultBatch;

/// Consumer of result batches, called by the sink thread in batch order
pub trait BatchSink {
    /// Write every row of `batch`, returning the number of rows written
    fn write_batch(&mut self, batch: &ResultBatch) -> io::Result<u64>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: BatchSink + ?Sized> BatchSink for Box<S> {
    fn write_batch(&mut self, batch: &ResultBatch) -> io::Result<u64> {
        (**self).write_batch(batch)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
