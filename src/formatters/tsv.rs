use std::io::{self, Write};
use std::sync::Arc;

use crate::alphabet;
use crate::parallel::{RecordHits, ResultBatch, Strand};
use crate::patterns::PatternSet;

use super::BatchSink;

/// Column names of the result table
pub const TSV_HEADER: &str = "seqID\tpatternName\tpattern\tstrand\tstart\tend\tmatched";

/// Tab-separated result table with 1-based, end-inclusive coordinates.
///
/// The header is written when the writer is created, so sharing one writer
/// across several inputs produces a single header.
pub struct TsvWriter<W: Write> {
    output: W,
    patterns: Arc<PatternSet>,
}

impl<W: Write> TsvWriter<W> {
    pub fn new(mut output: W, patterns: Arc<PatternSet>) -> io::Result<Self> {
        writeln!(output, "{}", TSV_HEADER)?;
        Ok(Self { output, patterns })
    }

    pub fn into_inner(self) -> W {
        self.output
    }

    fn write_record(&mut self, hits: &RecordHits) -> io::Result<u64> {
        let seq = &hits.record.seq;
        let mut rows = 0;

        for found in &hits.matches {
            let Some(pattern) = self.patterns.get_index(found.pattern) else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("result refers to unknown pattern #{}", found.pattern),
                ));
            };

            for span in &found.spans {
                let forward = &seq[span.start..span.end];
                write!(
                    self.output,
                    "{}\t{}\t{}\t{}\t{}\t{}\t",
                    hits.record.id,
                    pattern.name,
                    pattern.raw_text(),
                    found.strand,
                    span.start + 1,
                    span.end
                )?;
                match found.strand {
                    Strand::Forward => self.output.write_all(forward)?,
                    Strand::Reverse => {
                        self.output.write_all(&alphabet::reverse_complement(forward))?
                    }
                }
                self.output.write_all(b"\n")?;
                rows += 1;
            }
        }
        Ok(rows)
    }
}

impl<W: Write> BatchSink for TsvWriter<W> {
    fn write_batch(&mut self, batch: &ResultBatch) -> io::Result<u64> {
        let mut rows = 0;
        for hits in &batch.hits {
            rows += self.write_record(hits)?;
        }
        Ok(rows)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
