//! Cross-codec interop and instance-lifecycle hygiene: GZIP's compressed
//! body is exactly a raw DEFLATE stream, and repeated create/drop cycles
//! under a tight memory cap never leak tracked allocations across
//! instances.

use flatereg::{compress_to_vec, DeflateMethod, Encoder, GzipMethod, InBuf, Options, OutBuf, Registry};

fn registry() -> Registry {
    let r = Registry::new();
    r.register(std::sync::Arc::new(DeflateMethod)).unwrap();
    r.register(std::sync::Arc::new(GzipMethod)).unwrap();
    r
}

#[test]
fn gzip_body_is_a_plain_deflate_stream() {
    let registry = registry();
    let data = b"the gzip wrapper's body is exactly a raw deflate stream".repeat(20);

    let mut gzipped = Vec::new();
    compress_to_vec(&registry, "gzip", &Options::new(), &data, &mut gzipped).unwrap();

    // Default header (no FNAME/FEXTRA/FCOMMENT/FHCRC): 10 fixed bytes.
    // Trailer is always 8 bytes (CRC32 + ISIZE).
    let body = &gzipped[10..gzipped.len() - 8];

    let mut decoded = Vec::new();
    flatereg::decompress_to_vec(&registry, "deflate", &Options::new(), body, &mut decoded).unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn repeated_create_drop_cycles_do_not_leak_tracked_memory() {
    let registry = registry();
    let mut opts = Options::new();
    // Small enough that any leaked per-instance tracking across iterations
    // would eventually trip the limit; each instance's window allocation
    // alone must fit comfortably under this on its own.
    opts.set_u64("limits.max_memory_bytes", 1024 * 1024).unwrap();

    for _ in 0..500 {
        let mut enc = Encoder::create(&registry, "deflate", &opts).unwrap();
        let mut input = InBuf::new(b"short-lived encoder instance");
        let mut out = [0u8; 256];
        let mut output = OutBuf::new(&mut out);
        enc.update(&mut input, &mut output).unwrap();
        enc.finish(&mut output).unwrap();
        // enc drops here; its tracked allocation must not persist globally.
    }
}
