//! Encoding benchmarks using criterion.
//!
//! Compares the sequential and parallel backends across image sizes.
//!
//! Run with: cargo bench

use baseline_jpeg::{Backend, Encoder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Create a synthetic test image with gradient and noise.
fn create_test_image(width: usize, height: usize) -> Vec<u8> {
    let mut rgb = vec![0u8; width * height * 3];
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) * 3;
            let noise = ((x * 7 + y * 13) % 50) as u8;
            rgb[idx] = ((x * 255 / width) as u8).saturating_add(noise);
            rgb[idx + 1] = ((y * 255 / height) as u8).saturating_add(noise);
            rgb[idx + 2] = (((x + y) * 255 / (width + height)) as u8).saturating_add(noise);
        }
    }
    rgb
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [64usize, 256, 512] {
        let rgb = create_test_image(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));

        for (name, backend) in [
            ("sequential", Backend::Sequential),
            ("parallel", Backend::Parallel),
        ] {
            let encoder = Encoder::new().backend(backend);
            group.bench_with_input(BenchmarkId::new(name, size), &rgb, |b, rgb| {
                b.iter(|| encoder.encode_rgb(black_box(rgb), size, size).unwrap())
            });
        }
    }

    group.finish();
}

fn bench_no_subsampling(c: &mut Criterion) {
    let size = 256;
    let rgb = create_test_image(size, size);
    let encoder = Encoder::new().subsample_chroma(false);

    c.bench_function("encode_256_no_subsample", |b| {
        b.iter(|| encoder.encode_rgb(black_box(&rgb), size, size).unwrap())
    });
}

criterion_group!(benches, bench_encode, bench_no_subsampling);
criterion_main!(benches);
