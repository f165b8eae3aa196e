use std::hint::black_box;
use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use seqlocate::parallel::{match_batch, Batch, Coordinator, ParallelConfig, ResultBatch};
use seqlocate::patterns::{PatternOptions, PatternSet, PatternSetBuilder, PatternSource};
use seqlocate::sequence::SeqRecord;
use seqlocate::BatchSink;

fn random_batch(id: u64, records: usize, len: usize, rng: &mut StdRng) -> Batch {
    Batch {
        id,
        records: (0..records)
            .map(|i| {
                let seq = (0..len).map(|_| b"ACGT"[rng.random_range(0..4)]).collect::<Vec<u8>>();
                SeqRecord::new(format!("r{}", i), seq)
            })
            .collect(),
    }
}

fn patterns(motifs: &[&str], degenerate: bool) -> PatternSet {
    let options = PatternOptions {
        degenerate,
        ..Default::default()
    };
    let source = PatternSource::Literals(motifs.iter().map(|m| m.to_string()).collect());
    PatternSetBuilder::new(options).build(&source).unwrap()
}

fn bench_match_batch_literal(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let batch = random_batch(0, 1000, 150, &mut rng);
    let set = patterns(&["GAATTC", "GGATCC", "AAGCTT"], false);

    let mut group = c.benchmark_group("match_batch");
    group.throughput(Throughput::Bytes(1000 * 150));
    group.bench_function("literal_both_strands", |b| {
        b.iter_batched(
            || batch.clone(),
            |batch| black_box(match_batch(batch, &set, true).unwrap()),
            BatchSize::SmallInput,
        );
    });
    group.bench_function("literal_forward_only", |b| {
        b.iter_batched(
            || batch.clone(),
            |batch| black_box(match_batch(batch, &set, false).unwrap()),
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_match_batch_degenerate(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let batch = random_batch(0, 1000, 150, &mut rng);
    let set = patterns(&["TATAWAWR", "CCAATNNNNR", "GCCRCCATGG"], true);

    c.bench_function("match_batch_degenerate", |b| {
        b.iter_batched(
            || batch.clone(),
            |batch| black_box(match_batch(batch, &set, true).unwrap()),
            BatchSize::SmallInput,
        );
    });
}

struct CountingSink(u64);

impl BatchSink for CountingSink {
    fn write_batch(&mut self, batch: &ResultBatch) -> std::io::Result<u64> {
        let rows = batch.match_rows() as u64;
        self.0 += rows;
        Ok(rows)
    }
}

fn bench_pipeline_workers(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let batches: Vec<Batch> = (0..64).map(|id| random_batch(id, 200, 150, &mut rng)).collect();
    let set = Arc::new(patterns(&["GAATTC", "ACGNNNCGT"], true));

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    for workers in [1usize, 4] {
        group.bench_function(format!("workers_{}", workers), |b| {
            let coordinator = Coordinator::new(ParallelConfig {
                num_workers: workers,
                ..Default::default()
            });
            b.iter_batched(
                || batches.iter().cloned().map(Ok).collect::<Vec<_>>(),
                |source| {
                    let (sink, _) = coordinator
                        .run(source, Arc::clone(&set), CountingSink(0))
                        .unwrap();
                    black_box(sink.0)
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_match_batch_literal,
    bench_match_batch_degenerate,
    bench_pipeline_workers
);
criterion_main!(benches);
