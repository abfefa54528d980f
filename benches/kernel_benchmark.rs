use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rssk::core::KernelConfig;
use rssk::data::Symbol;
use rssk::kernel::{gap_weighted_kernel, DpWorkspace, MatchMode, SumStringKernel};

/// Deterministic pseudo-random protein-like sequences
fn sequences(count: usize, length: usize) -> Vec<String> {
    const ALPHABET: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    (0..count)
        .map(|_| {
            (0..length)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    ALPHABET[(state % ALPHABET.len() as u64) as usize] as char
                })
                .collect()
        })
        .collect()
}

fn bench_pair(c: &mut Criterion) {
    let mut group = c.benchmark_group("pair");
    for length in [20, 100, 400] {
        let data = sequences(2, length);
        let s: Vec<Symbol> = data[0].bytes().map(Symbol::from).collect();
        let t: Vec<Symbol> = data[1].bytes().map(Symbol::from).collect();
        let mut workspace = DpWorkspace::<f64>::new();

        group.bench_with_input(BenchmarkId::new("lengths_1_to_5", length), &length, |b, _| {
            b.iter(|| {
                gap_weighted_kernel(
                    black_box(&s),
                    black_box(&t),
                    1,
                    5,
                    0.5,
                    &MatchMode::Hard,
                    &mut workspace,
                )
            })
        });
    }
    group.finish();
}

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix");
    group.sample_size(10);
    for count in [16, 64] {
        let data = sequences(count, 30);
        group.bench_with_input(BenchmarkId::new("f32", count), &data, |b, data| {
            b.iter(|| {
                let mut kernel =
                    SumStringKernel::<f32>::new(KernelConfig::with_lengths(1, 3)).unwrap();
                kernel.set_data(data).unwrap();
                kernel.compute_kernel().unwrap();
                black_box(kernel.into_values().unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pair, bench_matrix);
criterion_main!(benches);
