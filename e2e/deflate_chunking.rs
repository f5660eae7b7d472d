//! Chunk invariance and the update-loop safety properties: offsets never
//! go backwards, and a call that makes no progress must be at a genuine
//! wait point (empty input, full output, or a true sync boundary).

use flatereg::{compress_to_vec, DeflateMethod, InBuf, Options, OutBuf, Registry};

fn registry() -> Registry {
    let r = Registry::new();
    r.register(std::sync::Arc::new(DeflateMethod)).unwrap();
    r
}

fn encode(data: &[u8]) -> Vec<u8> {
    let registry = registry();
    let opts = Options::new();
    let mut out = Vec::new();
    compress_to_vec(&registry, "deflate", &opts, data, &mut out).unwrap();
    out
}

/// Decodes `compressed` by feeding it through `update` in pieces of
/// `chunk_size` bytes, with a small output buffer forcing multiple
/// `update` calls. Unconsumed bytes from one call are carried forward and
/// combined with the next piece, exactly as a caller streaming from a
/// socket or file would, since a single `update` call is never guaranteed
/// to consume everything it's handed.
fn decode_chunked(registry: &Registry, compressed: &[u8], chunk_size: usize, out_size: usize) -> Vec<u8> {
    use flatereg::Decoder;
    let mut dec = Decoder::create(registry, "deflate", &Options::new()).unwrap();
    let mut decoded = Vec::new();
    let mut out_buf = vec![0u8; out_size];
    let mut pending: Vec<u8> = Vec::new();

    for piece in compressed.chunks(chunk_size.max(1)) {
        pending.extend_from_slice(piece);
        loop {
            let mut input = InBuf::new(&pending);
            let mut output = OutBuf::new(&mut out_buf);
            dec.update(&mut input, &mut output).unwrap();
            let consumed = input.used;
            assert!(consumed <= pending.len());
            let used = output.used;
            decoded.extend_from_slice(&out_buf[..used]);
            pending.drain(0..consumed);
            if consumed == 0 && used == 0 {
                // No progress possible with what's buffered; wait for more.
                break;
            }
            if pending.is_empty() && used < out_buf.len() {
                break;
            }
        }
    }
    loop {
        let mut output = OutBuf::new(&mut out_buf);
        dec.finish(&mut output).unwrap();
        let used = output.used;
        decoded.extend_from_slice(&out_buf[..used]);
        if used == 0 {
            break;
        }
    }
    decoded
}

#[test]
fn chunk_invariance_across_many_chunk_shapes() {
    let data = "mississippi river basin data ".repeat(3000);
    let compressed = encode(data.as_bytes());
    let registry = registry();

    let one_shot = decode_chunked(&registry, &compressed, compressed.len(), 1 << 20);
    assert_eq!(one_shot, data.as_bytes());

    for chunk_size in [1, 3, 7, 64, 4096] {
        for out_size in [1, 2, 8, 4096] {
            let decoded = decode_chunked(&registry, &compressed, chunk_size, out_size);
            assert_eq!(
                decoded,
                data.as_bytes(),
                "mismatch at chunk_size={chunk_size} out_size={out_size}"
            );
        }
    }
}

#[test]
fn byte_at_a_time_encoder_matches_one_shot() {
    let data = b"one byte in, one byte might come out, or none at all".to_vec();
    let registry = registry();
    let opts = Options::new();

    let one_shot = encode(&data);

    use flatereg::{Encoder, FinishStatus};
    let mut enc = Encoder::create(&registry, "deflate", &opts).unwrap();
    let mut compressed = Vec::new();
    for &byte in &data {
        let mut input = InBuf::new(std::slice::from_ref(&byte));
        loop {
            let mut out = [0u8; 256];
            let mut output = OutBuf::new(&mut out);
            enc.update(&mut input, &mut output).unwrap();
            let used = output.used;
            compressed.extend_from_slice(&out[..used]);
            if input.is_empty() {
                break;
            }
        }
    }
    loop {
        let mut out = [0u8; 256];
        let mut output = OutBuf::new(&mut out);
        let status = enc.finish(&mut output).unwrap();
        let used = output.used;
        compressed.extend_from_slice(&out[..used]);
        if status == FinishStatus::Done {
            break;
        }
    }
    assert_eq!(compressed, one_shot);
}
