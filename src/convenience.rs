//! A thin callback-streaming layer over the `update`/`finish` contract.
//!
//! Kept in scope only as what it says on the tin: one-shot `Vec<u8>` helpers
//! and a generic `Read`/`Write` pump. Mirrors the relationship between the
//! teacher crate's low-level `block::compress`/`block::decompress` functions
//! and its higher-level `io::compress_frame`/`io::decompress_frame` drivers,
//! minus the file-handling and multi-threading those drivers add (out of
//! scope per the non-goals).

use std::io::{self, Read, Write};

use crate::error::{err, ErrorKind, Result};
use crate::options::Options;
use crate::registry::Registry;
use crate::stream::{Decoder, Encoder};

const CHUNK_SIZE: usize = 64 * 1024;

fn io_err(e: io::Error) -> crate::error::CodecError {
    err(ErrorKind::Io, format_args!("{e}"))
}

/// Compresses the whole of `data` with `method` in one call, growing `out`
/// as needed. `out` is not cleared first; bytes are appended.
pub fn compress_to_vec(registry: &Registry, method: &str, options: &Options, data: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let mut encoder = Encoder::create(registry, method, options)?;
    let mut input = crate::buffer::InBuf::new(data);
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let mut output = crate::buffer::OutBuf::new(&mut chunk);
        encoder.update(&mut input, &mut output)?;
        let used = output.used;
        out.extend_from_slice(&chunk[..used]);
        if input.is_empty() {
            break;
        }
    }
    loop {
        let mut output = crate::buffer::OutBuf::new(&mut chunk);
        let status = encoder.finish(&mut output)?;
        let used = output.used;
        out.extend_from_slice(&chunk[..used]);
        if status == crate::method::FinishStatus::Done {
            break;
        }
    }
    Ok(())
}

/// Decompresses the whole of `data` with `method` in one call, growing `out`
/// as needed. `out` is not cleared first; bytes are appended.
pub fn decompress_to_vec(registry: &Registry, method: &str, options: &Options, data: &[u8], out: &mut Vec<u8>) -> Result<()> {
    let mut decoder = Decoder::create(registry, method, options)?;
    let mut input = crate::buffer::InBuf::new(data);
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let mut output = crate::buffer::OutBuf::new(&mut chunk);
        decoder.update(&mut input, &mut output)?;
        let used = output.used;
        out.extend_from_slice(&chunk[..used]);
        if input.is_empty() && used < chunk.len() {
            break;
        }
    }
    loop {
        let mut output = crate::buffer::OutBuf::new(&mut chunk);
        decoder.finish(&mut output)?;
        let used = output.used;
        out.extend_from_slice(&chunk[..used]);
        if used == 0 {
            break;
        }
    }
    Ok(())
}

/// Pumps bytes from `reader` through `method`'s encoder and into `writer`,
/// implementing the read/write callback contract directly on
/// `std::io::Read`/`Write` rather than the spec's raw function-pointer pair.
pub fn copy_with<R: Read, W: Write>(
    registry: &Registry,
    method: &str,
    options: &Options,
    encoding: bool,
    reader: &mut R,
    writer: &mut W,
) -> Result<()> {
    let mut in_buf = vec![0u8; CHUNK_SIZE];
    let mut out_buf = vec![0u8; CHUNK_SIZE];

    if encoding {
        let mut encoder = Encoder::create(registry, method, options)?;
        loop {
            let n = reader.read(&mut in_buf).map_err(io_err)?;
            let mut input = crate::buffer::InBuf::new(&in_buf[..n]);
            loop {
                let mut output = crate::buffer::OutBuf::new(&mut out_buf);
                encoder.update(&mut input, &mut output)?;
                let used = output.used;
                writer.write_all(&out_buf[..used]).map_err(io_err)?;
                if input.is_empty() {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        loop {
            let mut output = crate::buffer::OutBuf::new(&mut out_buf);
            let status = encoder.finish(&mut output)?;
            let used = output.used;
            writer.write_all(&out_buf[..used]).map_err(io_err)?;
            if status == crate::method::FinishStatus::Done {
                break;
            }
        }
    } else {
        let mut decoder = Decoder::create(registry, method, options)?;
        loop {
            let n = reader.read(&mut in_buf).map_err(io_err)?;
            let mut input = crate::buffer::InBuf::new(&in_buf[..n]);
            loop {
                let mut output = crate::buffer::OutBuf::new(&mut out_buf);
                decoder.update(&mut input, &mut output)?;
                let used = output.used;
                writer.write_all(&out_buf[..used]).map_err(io_err)?;
                if input.is_empty() && used < out_buf.len() {
                    break;
                }
            }
            if n == 0 {
                break;
            }
        }
        loop {
            let mut output = crate::buffer::OutBuf::new(&mut out_buf);
            decoder.finish(&mut output)?;
            let used = output.used;
            writer.write_all(&out_buf[..used]).map_err(io_err)?;
            if used == 0 {
                break;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let r = Registry::new();
        r.register(std::sync::Arc::new(crate::deflate::method::DeflateMethod)).unwrap();
        r.register(std::sync::Arc::new(crate::gzip::method::GzipMethod)).unwrap();
        r
    }

    #[test]
    fn compress_then_decompress_to_vec_deflate() {
        let registry = registry();
        let opts = Options::new();
        let data = b"convenience layer round trip via deflate";
        let mut compressed = Vec::new();
        compress_to_vec(&registry, "deflate", &opts, data, &mut compressed).unwrap();
        let mut decompressed = Vec::new();
        decompress_to_vec(&registry, "deflate", &opts, &compressed, &mut decompressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn copy_with_round_trips_through_gzip() {
        let registry = registry();
        let opts = Options::new();
        let data = b"copy_with pumps bytes through std::io::Read/Write".repeat(50);

        let mut compressed = Vec::new();
        copy_with(&registry, "gzip", &opts, true, &mut data.as_slice(), &mut compressed).unwrap();

        let mut decompressed = Vec::new();
        copy_with(&registry, "gzip", &opts, false, &mut compressed.as_slice(), &mut decompressed).unwrap();
        assert_eq!(decompressed, data);
    }
}
