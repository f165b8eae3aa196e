//! Chunk source: decodes FASTA/FASTQ and groups records into numbered batches.
//!
//! Batch ids start at 0 and increase by one with no gaps, which is what the
//! ordered sink relies on to restore input order.

use std::io::BufRead;
use std::path::Path;

use is_terminal::IsTerminal;
use seq_io::fasta::Record as _;
use seq_io::fastq::Record as _;

use crate::decompression;
use crate::error::{LocateError, Result};
use crate::parallel::Batch;

use super::record::{IdExtractor, SeqRecord};

/// Record file format, detected from the first non-blank byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqFormat {
    Fasta,
    Fastq,
}

type BoxedInput = Box<dyn BufRead + Send>;

enum RecordReader {
    Fasta(seq_io::fasta::Reader<BoxedInput>),
    Fastq(seq_io::fastq::Reader<BoxedInput>),
    Empty,
}

/// Skip leading blank lines, then peek at the first byte to decide the
/// format. The record marker itself is left in the input.
fn detect_format(input: &mut BoxedInput, source_name: &str) -> Result<Option<SeqFormat>> {
    loop {
        let buf = input
            .fill_buf()
            .map_err(|e| LocateError::chunk_source(source_name, e))?;
        if buf.is_empty() {
            return Ok(None);
        }
        let blank = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
        if blank == buf.len() {
            input.consume(blank);
            continue;
        }
        let first = buf[blank];
        input.consume(blank);
        return match first {
            b'>' => Ok(Some(SeqFormat::Fasta)),
            b'@' => Ok(Some(SeqFormat::Fastq)),
            other => Err(LocateError::chunk_source(
                source_name,
                format!(
                    "unrecognized sequence format (first character '{}', expected '>' or '@')",
                    other.escape_ascii()
                ),
            )),
        };
    }
}

/// Iterator over numbered record batches of one input
pub struct RecordChunker {
    reader: RecordReader,
    source_name: String,
    chunk_size: usize,
    next_id: u64,
    ids: IdExtractor,
    finished: bool,
}

impl RecordChunker {
    /// Chunk an already-open input stream
    pub fn new(
        mut input: BoxedInput,
        source_name: impl Into<String>,
        chunk_size: usize,
        ids: IdExtractor,
    ) -> Result<Self> {
        let source_name = source_name.into();
        if chunk_size == 0 {
            return Err(LocateError::config("chunk size must be greater than 0"));
        }
        let reader = match detect_format(&mut input, &source_name)? {
            Some(SeqFormat::Fasta) => RecordReader::Fasta(seq_io::fasta::Reader::new(input)),
            Some(SeqFormat::Fastq) => RecordReader::Fastq(seq_io::fastq::Reader::new(input)),
            None => {
                log::warn!("{} contains no records", source_name);
                RecordReader::Empty
            }
        };
        Ok(Self {
            reader,
            source_name,
            chunk_size,
            next_id: 0,
            ids,
            finished: false,
        })
    }

    /// Open a file (or `-` for stdin) with compression auto-detection
    pub fn from_path<P: AsRef<Path>>(path: P, chunk_size: usize, ids: IdExtractor) -> Result<Self> {
        let path = path.as_ref();
        let source_name = if path.as_os_str() == "-" {
            if std::io::stdin().is_terminal() {
                log::warn!("reading sequences from an interactive terminal, press Ctrl-D to finish");
            }
            "stdin".to_string()
        } else {
            path.display().to_string()
        };
        let input = decompression::open_input(path)
            .map_err(|e| LocateError::chunk_source(source_name.clone(), e))?;
        Self::new(input, source_name, chunk_size, ids)
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Read the next record, `Ok(None)` at end of input
    fn next_record(&mut self) -> Result<Option<SeqRecord>> {
        let record = match &mut self.reader {
            RecordReader::Fasta(reader) => match reader.next() {
                None => None,
                Some(Err(e)) => return Err(LocateError::chunk_source(&self.source_name, e)),
                Some(Ok(rec)) => Some(SeqRecord::new(
                    self.ids.extract(rec.head()),
                    rec.full_seq().into_owned(),
                )),
            },
            RecordReader::Fastq(reader) => match reader.next() {
                None => None,
                Some(Err(e)) => return Err(LocateError::chunk_source(&self.source_name, e)),
                Some(Ok(rec)) => Some(SeqRecord::new(
                    self.ids.extract(rec.head()),
                    rec.seq().to_vec(),
                )),
            },
            RecordReader::Empty => None,
        };
        Ok(record)
    }
}

impl Iterator for RecordChunker {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let mut records = Vec::with_capacity(self.chunk_size.min(4096));
        while records.len() < self.chunk_size {
            match self.next_record() {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        if records.is_empty() {
            return None;
        }

        let batch = Batch {
            id: self.next_id,
            records,
        };
        self.next_id += 1;
        Some(Ok(batch))
    }
}

/// Read every record of a file, used for pattern files
pub fn read_all_records<P: AsRef<Path>>(path: P, ids: IdExtractor) -> Result<Vec<SeqRecord>> {
    let chunker = RecordChunker::from_path(path, 4096, ids)?;
    let mut records = Vec::new();
    for batch in chunker {
        records.extend(batch?.records);
    }
    Ok(records)
}
