#![no_main]

use std::io::{BufReader, Cursor};

use libfuzzer_sys::fuzz_target;
use seqlocate::sequence::{IdExtractor, RecordChunker};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks the chunk size, the rest is the record stream
    let chunk_size = (data[0] as usize % 16) + 1;
    let input = Box::new(BufReader::new(Cursor::new(data[1..].to_vec())));

    let chunker = match RecordChunker::new(input, "fuzz", chunk_size, IdExtractor::default()) {
        Ok(c) => c,
        Err(_) => return,
    };

    let mut expected_id = 0u64;
    for batch in chunker {
        let batch = match batch {
            Ok(b) => b,
            Err(_) => break,
        };
        assert_eq!(batch.id, expected_id, "batch ids must be contiguous");
        assert!(!batch.records.is_empty() && batch.records.len() <= chunk_size);
        expected_id += 1;
    }
});
