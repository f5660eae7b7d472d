//! Resource-limit enforcement: output caps, expansion-ratio bomb
//! protection, and the literal decompression-bomb scenario.

use flatereg::{compress_to_vec, DeflateMethod, Decoder, ErrorKind, GzipMethod, InBuf, Options, OutBuf, Registry};

fn registry() -> Registry {
    let r = Registry::new();
    r.register(std::sync::Arc::new(DeflateMethod)).unwrap();
    r.register(std::sync::Arc::new(GzipMethod)).unwrap();
    r
}

#[test]
fn max_output_bytes_is_enforced_before_the_offending_byte() {
    let registry = registry();
    let data = vec![0xABu8; 100_000];
    let mut compressed = Vec::new();
    compress_to_vec(&registry, "deflate", &Options::new(), &data, &mut compressed).unwrap();

    let mut opts = Options::new();
    opts.set_u64("limits.max_output_bytes", 1_000).unwrap();
    let mut dec = Decoder::create(&registry, "deflate", &opts).unwrap();
    let mut input = InBuf::new(&compressed);
    let mut produced = 0usize;
    let mut hit_limit = false;
    loop {
        let mut out = [0u8; 256];
        let mut output = OutBuf::new(&mut out);
        match dec.update(&mut input, &mut output) {
            Ok(()) => {
                produced += output.used;
                if input.is_empty() && output.used < out.len() {
                    break;
                }
            }
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::Limit);
                hit_limit = true;
                break;
            }
        }
    }
    assert!(hit_limit, "expected a limit error before fully decoding");
    assert!(produced <= 1_000, "produced {produced} bytes, over the 1000-byte cap");
}

// S6 — bomb rejection: 10 MiB of zero bytes at level 9 compresses to a few
// KiB; with max_expansion_ratio=100 the decoder must stop with `limit`
// before producing 1 MiB+1 bytes.
#[test]
fn expansion_ratio_bomb_is_rejected_before_one_mebibyte() {
    let registry = registry();
    let data = vec![0u8; 10 * 1024 * 1024];
    let mut opts = Options::new();
    opts.set_i64("deflate.level", 9).unwrap();
    let mut compressed = Vec::new();
    compress_to_vec(&registry, "deflate", &opts, &data, &mut compressed).unwrap();
    assert!(compressed.len() < 10 * 1024, "compressed to {} bytes", compressed.len());

    let mut decode_opts = Options::new();
    decode_opts.set_u64("limits.max_expansion_ratio", 100).unwrap();
    let mut dec = Decoder::create(&registry, "deflate", &decode_opts).unwrap();
    let mut input = InBuf::new(&compressed);
    let mut produced = 0u64;
    let mut hit_limit = false;
    loop {
        let mut out = vec![0u8; 64 * 1024];
        let mut output = OutBuf::new(&mut out);
        match dec.update(&mut input, &mut output) {
            Ok(()) => {
                produced += output.used as u64;
                assert!(produced <= 1024 * 1024 + 1, "produced {produced} bytes without hitting the limit");
                if input.is_empty() && output.used < out.len() {
                    break;
                }
            }
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::Limit);
                hit_limit = true;
                break;
            }
        }
    }
    assert!(hit_limit, "expected the expansion-ratio limit to trip");
}

#[test]
fn gzip_cumulative_limits_persist_across_concatenated_members() {
    let registry = registry();
    let member = vec![0x42u8; 50_000];
    let mut opts = Options::new();
    opts.set_i64("deflate.level", 6).unwrap();
    let mut one_member = Vec::new();
    compress_to_vec(&registry, "gzip", &opts, &member, &mut one_member).unwrap();

    let mut stream = Vec::new();
    for _ in 0..5 {
        stream.extend_from_slice(&one_member);
    }

    let mut decode_opts = Options::new();
    decode_opts.set_bool("gzip.concat", true).unwrap();
    decode_opts.set_u64("limits.max_output_bytes", 120_000).unwrap();
    let mut dec = Decoder::create(&registry, "gzip", &decode_opts).unwrap();
    let mut input = InBuf::new(&stream);
    let mut hit_limit = false;
    loop {
        let mut out = [0u8; 64 * 1024];
        let mut output = OutBuf::new(&mut out);
        match dec.update(&mut input, &mut output) {
            Ok(()) => {
                if input.is_empty() && output.used < out.len() {
                    break;
                }
            }
            Err(e) => {
                assert_eq!(e.kind(), ErrorKind::Limit);
                hit_limit = true;
                break;
            }
        }
    }
    // 5 members of 50,000 bytes each cumulatively exceed 120,000 well
    // before the stream ends, even though each member's own CRC/ISIZE
    // reset at its boundary.
    assert!(hit_limit, "cumulative output across members should have tripped the limit");
}
