use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use mnist_arena::idx::{IMAGES_MAGIC, LABELS_MAGIC};
use mnist_arena::{filter_by_label, load, Arena, LabelSet};
use rand::{thread_rng, Rng};
use std::fs;
use std::hint::black_box;
use std::path::PathBuf;
use tempfile::TempDir;

const ROWS: usize = 28;
const COLS: usize = 28;

/// Write a random MNIST-shaped images/labels pair with `n` examples.
fn gen_files(dir: &TempDir, n: usize) -> (PathBuf, PathBuf) {
    let mut rng = thread_rng();

    let mut images = Vec::with_capacity(16 + n * ROWS * COLS);
    for field in [IMAGES_MAGIC, n as u32, ROWS as u32, COLS as u32] {
        images.extend_from_slice(&field.to_be_bytes());
    }
    images.extend((0..n * ROWS * COLS).map(|_| rng.gen::<u8>()));

    let mut labels = Vec::with_capacity(8 + n);
    for field in [LABELS_MAGIC, n as u32] {
        labels.extend_from_slice(&field.to_be_bytes());
    }
    labels.extend((0..n).map(|_| rng.gen_range(0..10u8)));

    let images_path = dir.path().join(format!("images-{n}"));
    let labels_path = dir.path().join(format!("labels-{n}"));
    fs::write(&images_path, images).expect("Failed to write images");
    fs::write(&labels_path, labels).expect("Failed to write labels");
    (images_path, labels_path)
}

fn load_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("IDX_Load");
    let dir = TempDir::new().expect("Failed to create temp dir");

    for n in [1_000, 10_000] {
        let (images, labels) = gen_files(&dir, n);
        group.throughput(Throughput::Bytes((n * (ROWS * COLS + 1)) as u64));

        group.bench_with_input(BenchmarkId::new("load", n), &n, |b, &n| {
            b.iter_batched(
                || Arena::new(n * (ROWS * COLS + 1)),
                |mut arena| load(&mut arena, n, black_box(&images), black_box(&labels)),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Subset_Filter");
    let dir = TempDir::new().expect("Failed to create temp dir");
    let n = 10_000;
    let (images, labels) = gen_files(&dir, n);
    let zeros_and_ones = LabelSet::new(&[0, 1]);

    group.throughput(Throughput::Elements(n as u64));
    group.bench_function("zeros_and_ones", |b| {
        b.iter_batched(
            || {
                // room for the source and a full copy of it
                let mut arena = Arena::new(2 * n * (ROWS * COLS + 1));
                let source = load(&mut arena, n, &images, &labels).expect("Failed to load");
                (arena, source)
            },
            |(mut arena, source)| {
                filter_by_label(&mut arena, black_box(&source), zeros_and_ones.predicate())
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, load_benchmark, filter_benchmark);
criterion_main!(benches);
