//! Criterion benchmarks for the streaming DEFLATE/GZIP codecs.
//!
//! Run with:
//!   cargo bench --bench throughput

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use flatereg::{compress_to_vec, decompress_to_vec, DeflateMethod, GzipMethod, Options, Registry};

/// Compressible synthetic data of the given size, mirroring the
/// lorem-ipsum-repeated approach used for codec throughput measurement:
/// highly repetitive text exercises the codec rather than an entropy
/// source, giving numbers that reflect the implementation.
fn synthetic_data(size: usize) -> Vec<u8> {
    const LOREM: &[u8] = b"Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
        sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \
        Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris nisi \
        ut aliquip ex ea commodo consequat.";
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        let rem = size - out.len();
        let take = rem.min(LOREM.len());
        out.extend_from_slice(&LOREM[..take]);
    }
    out
}

fn registry() -> Registry {
    let r = Registry::new();
    r.register(std::sync::Arc::new(DeflateMethod)).unwrap();
    r.register(std::sync::Arc::new(GzipMethod)).unwrap();
    r
}

fn bench_compress_decompress(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("compress_decompress");

    for &chunk_size in &[64 * 1024usize, 256 * 1024] {
        let data = synthetic_data(chunk_size);

        for &level in &[1i64, 6, 9] {
            let mut opts = Options::new();
            opts.set_i64("deflate.level", level).unwrap();

            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("deflate_compress_level{level}"), chunk_size),
                &data,
                |b, data| {
                    b.iter(|| {
                        let mut out = Vec::new();
                        compress_to_vec(&registry, "deflate", &opts, data, &mut out).unwrap();
                        out
                    })
                },
            );

            let mut compressed = Vec::new();
            compress_to_vec(&registry, "deflate", &opts, &data, &mut compressed).unwrap();
            group.throughput(Throughput::Bytes(chunk_size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("deflate_decompress_level{level}"), chunk_size),
                &compressed,
                |b, compressed| {
                    b.iter(|| {
                        let mut out = Vec::new();
                        decompress_to_vec(&registry, "deflate", &Options::new(), compressed, &mut out).unwrap();
                        out
                    })
                },
            );
        }

        let gzip_opts = Options::new();
        let mut gzipped = Vec::new();
        compress_to_vec(&registry, "gzip", &gzip_opts, &data, &mut gzipped).unwrap();
        group.throughput(Throughput::Bytes(chunk_size as u64));
        group.bench_with_input(BenchmarkId::new("gzip_compress", chunk_size), &data, |b, data| {
            b.iter(|| {
                let mut out = Vec::new();
                compress_to_vec(&registry, "gzip", &gzip_opts, data, &mut out).unwrap();
                out
            })
        });
        group.bench_with_input(BenchmarkId::new("gzip_decompress", chunk_size), &gzipped, |b, gzipped| {
            b.iter(|| {
                let mut out = Vec::new();
                decompress_to_vec(&registry, "gzip", &Options::new(), gzipped, &mut out).unwrap();
                out
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compress_decompress);
criterion_main!(benches);
