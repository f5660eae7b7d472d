//! Round-trip fidelity across levels and input shapes, including the two
//! literal stored/compressible scenarios.

use flatereg::{compress_to_vec, decompress_to_vec, DeflateMethod, Options, Registry};

fn registry() -> Registry {
    let r = Registry::new();
    r.register(std::sync::Arc::new(DeflateMethod)).unwrap();
    r
}

fn roundtrip(data: &[u8], level: i64) -> Vec<u8> {
    let registry = registry();
    let mut opts = Options::new();
    opts.set_i64("deflate.level", level).unwrap();
    let mut compressed = Vec::new();
    compress_to_vec(&registry, "deflate", &opts, data, &mut compressed).unwrap();
    let mut decompressed = Vec::new();
    decompress_to_vec(&registry, "deflate", &Options::new(), &compressed, &mut decompressed).unwrap();
    decompressed
}

#[test]
fn round_trips_across_every_level_for_mixed_content() {
    let data = b"the quick brown fox jumps over the lazy dog 0123456789".repeat(37);
    for level in 0..=9 {
        assert_eq!(roundtrip(&data, level), data, "level {level} failed to round-trip");
    }
}

#[test]
fn round_trips_the_empty_input() {
    assert_eq!(roundtrip(b"", 6), b"");
}

// S1 — stored-only round-trip: 64 KiB of 0x00 at level 0, checking the
// framing overhead is exactly the stored-block byte count.
#[test]
fn stored_only_round_trip_has_expected_overhead() {
    let data = vec![0u8; 64 * 1024];
    let registry = registry();
    let mut opts = Options::new();
    opts.set_i64("deflate.level", 0).unwrap();
    let mut compressed = Vec::new();
    compress_to_vec(&registry, "deflate", &opts, &data, &mut compressed).unwrap();

    let mut decompressed = Vec::new();
    decompress_to_vec(&registry, "deflate", &Options::new(), &compressed, &mut decompressed).unwrap();
    assert_eq!(decompressed, data);

    // Each stored block pads its 3-bit BFINAL/BTYPE header out to a whole
    // byte, then carries a 4-byte LEN/NLEN pair: 5 bytes of overhead per
    // block, byte-aligned both before and after, so the total is exact.
    const BLOCK_SIZE: usize = 32 * 1024;
    let block_count = data.len() / BLOCK_SIZE;
    assert_eq!(compressed.len(), data.len() + block_count * 5);
}

// S2 — highly compressible input: 1 MiB of a 16-byte repeating pattern at
// level 6 must compress to well under 4 KiB.
#[test]
fn highly_compressible_input_shrinks_below_four_kib() {
    let pattern = b"ABCDEFGHIJKLMNOP";
    let data = pattern.repeat(65536);
    assert_eq!(data.len(), 1024 * 1024);

    let registry = registry();
    let mut opts = Options::new();
    opts.set_i64("deflate.level", 6).unwrap();
    let mut compressed = Vec::new();
    compress_to_vec(&registry, "deflate", &opts, &data, &mut compressed).unwrap();
    assert!(compressed.len() < 4096, "compressed to {} bytes", compressed.len());

    let mut decompressed = Vec::new();
    decompress_to_vec(&registry, "deflate", &Options::new(), &compressed, &mut decompressed).unwrap();
    assert_eq!(decompressed, data);
}

#[test]
fn round_trips_data_longer_than_the_window() {
    let mut data = Vec::new();
    for i in 0..200_000u32 {
        data.push((i % 251) as u8);
    }
    assert_eq!(roundtrip(&data, 6), data);
}
