//! Sequence records and the batched record source feeding the pipeline.

mod reader;
mod record;

pub use reader::{read_all_records, RecordChunker, SeqFormat};
pub use record::{IdExtractor, SeqRecord, DEFAULT_ID_REGEXP};
