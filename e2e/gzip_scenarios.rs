//! Literal end-to-end GZIP scenarios: header fidelity, concatenated
//! members, and truncated-trailer error reporting.

use flatereg::{compress_to_vec, Decoder, ErrorKind, GzipMethod, InBuf, Options, OutBuf, Registry};

fn registry() -> Registry {
    let r = Registry::new();
    r.register(std::sync::Arc::new(GzipMethod)).unwrap();
    r
}

// S3 — GZIP header fidelity: name, mtime, and header CRC round-trip, and
// the trailer reports the expected CRC32/ISIZE for "hello".
#[test]
fn gzip_header_fidelity() {
    let registry = registry();
    let mut opts = Options::new();
    opts.set_str("gzip.name", "h.txt").unwrap();
    opts.set_u64("gzip.mtime", 1_700_000_000).unwrap();
    opts.set_bool("gzip.header_crc", true).unwrap();

    let mut compressed = Vec::new();
    compress_to_vec(&registry, "gzip", &opts, b"hello", &mut compressed).unwrap();

    // FNAME and FHCRC bits must both be set in FLG.
    assert_eq!(compressed[3] & 0x08, 0x08);
    assert_eq!(compressed[3] & 0x02, 0x02);
    assert_eq!(u32::from_le_bytes(compressed[4..8].try_into().unwrap()), 1_700_000_000);

    let mut dec = Decoder::create(&registry, "gzip", &Options::new()).unwrap();
    let mut input = InBuf::new(&compressed);
    let mut out = [0u8; 64];
    let mut output = OutBuf::new(&mut out);
    dec.update(&mut input, &mut output).unwrap();
    dec.finish(&mut output).unwrap();
    let used = output.used;
    assert_eq!(&out[..used], b"hello");

    let trailer = &compressed[compressed.len() - 8..];
    let crc32 = u32::from_le_bytes(trailer[0..4].try_into().unwrap());
    let isize_field = u32::from_le_bytes(trailer[4..8].try_into().unwrap());
    assert_eq!(crc32, 0x3610_A686);
    assert_eq!(isize_field, 5);
}

fn compress_one(registry: &Registry, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    compress_to_vec(registry, "gzip", &Options::new(), data, &mut out).unwrap();
    out
}

// S4 — concatenated members: gzip.concat=true merges "A" and "B" into
// "AB"; gzip.concat=false stops after "A" and leaves "B" unconsumed.
#[test]
fn concatenated_members_merge_when_concat_is_true() {
    let registry = registry();
    let mut stream = compress_one(&registry, b"A");
    stream.extend_from_slice(&compress_one(&registry, b"B"));

    let mut opts = Options::new();
    opts.set_bool("gzip.concat", true).unwrap();
    let mut dec = Decoder::create(&registry, "gzip", &opts).unwrap();
    let mut input = InBuf::new(&stream);
    let mut decoded = Vec::new();
    loop {
        let mut out = [0u8; 64];
        let mut output = OutBuf::new(&mut out);
        dec.update(&mut input, &mut output).unwrap();
        let used = output.used;
        decoded.extend_from_slice(&out[..used]);
        if input.is_empty() {
            break;
        }
    }
    let mut out = [0u8; 64];
    let mut output = OutBuf::new(&mut out);
    dec.finish(&mut output).unwrap();
    let used = output.used;
    decoded.extend_from_slice(&out[..used]);
    assert_eq!(decoded, b"AB");
}

#[test]
fn concatenated_members_stop_after_first_when_concat_is_false() {
    let registry = registry();
    let a = compress_one(&registry, b"A");
    let mut stream = a.clone();
    stream.extend_from_slice(&compress_one(&registry, b"B"));

    let mut opts = Options::new();
    opts.set_bool("gzip.concat", false).unwrap();
    let mut dec = Decoder::create(&registry, "gzip", &opts).unwrap();
    let mut input = InBuf::new(&stream);
    let mut out = [0u8; 64];
    let mut output = OutBuf::new(&mut out);
    dec.update(&mut input, &mut output).unwrap();
    dec.finish(&mut output).unwrap();

    let used = output.used;
    assert_eq!(&out[..used], b"A");
    assert_eq!(input.used, a.len());
    assert!(!input.is_empty());
}

// S5 — truncated trailer: dropping the last 4 bytes of a valid stream must
// surface as `corrupt` at `finish`, with "trailer" in the detail.
#[test]
fn truncated_trailer_reports_corrupt_with_trailer_in_detail() {
    let registry = registry();
    let mut stream = compress_one(&registry, b"truncate the trailer");
    let new_len = stream.len() - 4;
    stream.truncate(new_len);

    let mut dec = Decoder::create(&registry, "gzip", &Options::new()).unwrap();
    let mut input = InBuf::new(&stream);
    let mut out = [0u8; 64];
    let mut output = OutBuf::new(&mut out);
    dec.update(&mut input, &mut output).unwrap();
    let err = dec.finish(&mut output).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Corrupt);
    assert!(err.detail().contains("trailer"));
}
