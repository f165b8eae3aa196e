#![no_main]

use libfuzzer_sys::fuzz_target;
use seqlocate::alphabet::SeqType;
use seqlocate::parallel::Span;
use seqlocate::patterns::{PatternOptions, PatternSetBuilder};

const MAX_PATTERN_LEN: usize = 64;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let seq_type = match data[0] % 4 {
        0 => SeqType::Auto,
        1 => SeqType::Dna,
        2 => SeqType::Rna,
        _ => SeqType::Protein,
    };
    let split = 2 + (data[1] as usize % MAX_PATTERN_LEN).min(data.len() - 2);
    let (raw, haystack) = data[2..].split_at(split - 2);

    let builder = PatternSetBuilder::new(PatternOptions {
        degenerate: true,
        ignore_case: data[1] & 0x80 != 0,
        seq_type,
    });

    // Invalid letters must be rejected, never panic
    let pattern = match builder.compile("fuzz".to_string(), raw.to_vec()) {
        Ok(p) => p,
        Err(_) => return,
    };

    let mut spans: Vec<Span> = Vec::new();
    if pattern.matcher.find_spans(haystack, &mut spans).is_ok() {
        for span in spans {
            assert!(span.start < span.end && span.end <= haystack.len());
        }
    }
});
