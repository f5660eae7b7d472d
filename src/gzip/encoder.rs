//! The GZIP encoder: a minimal RFC 1952 header, a DEFLATE body delegated to
//! `DeflateEncoder`, and a CRC32 + ISIZE trailer. Always emits a single
//! member; a caller wanting a multi-member stream runs several instances
//! back to back and concatenates their output, mirroring how `gzip -9`
//! itself only ever appends whole members rather than splicing mid-stream.

use crate::buffer::{InBuf, OutBuf};
use crate::crc32;
use crate::deflate::encoder::DeflateEncoder;
use crate::deflate::tables::MAX_DISTANCE;
use crate::error::Result;
use crate::gzip::header::{CM_DEFLATE, FLG_FCOMMENT, FLG_FEXTRA, FLG_FHCRC, FLG_FNAME, ID1, ID2};
use crate::limits::Limits;
use crate::method::{EncoderImpl, FinishStatus};

/// RFC 1952 OS byte: 255 means "unknown". This is the default when the
/// caller doesn't set `gzip.os`.
pub const OS_UNKNOWN: u8 = 255;

/// The subset of RFC 1952 header fields callers can set.
#[derive(Clone, Default)]
pub struct GzipHeaderOptions {
    pub name: Option<String>,
    pub comment: Option<String>,
    pub extra: Option<Vec<u8>>,
    pub mtime: u32,
    pub os: u8,
    /// Explicit XFL override; `None` derives it from `deflate.level`.
    pub xfl: Option<u8>,
    pub header_crc: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    Header,
    Body,
    Trailer,
    Done,
}

pub struct GzipEncoder {
    level: u8,
    limits: Limits,
    header_opts: GzipHeaderOptions,
    stage: Stage,
    header: Vec<u8>,
    header_pos: usize,
    inner: DeflateEncoder,
    trailer: Vec<u8>,
    trailer_pos: usize,
    crc: u32,
    isize_bytes: u64,
}

fn derive_xfl(level: u8) -> u8 {
    if level >= crate::defaults::LEVEL_MAX_EFFORT_THRESHOLD {
        2
    } else if level <= crate::defaults::LEVEL_FASTEST_THRESHOLD {
        4
    } else {
        0
    }
}

fn build_header(level: u8, opts: &GzipHeaderOptions) -> Vec<u8> {
    let xfl = opts.xfl.unwrap_or_else(|| derive_xfl(level));
    let mut flg = 0u8;
    if opts.extra.is_some() {
        flg |= FLG_FEXTRA;
    }
    if opts.name.is_some() {
        flg |= FLG_FNAME;
    }
    if opts.comment.is_some() {
        flg |= FLG_FCOMMENT;
    }
    if opts.header_crc {
        flg |= FLG_FHCRC;
    }

    let mut h = vec![ID1, ID2, CM_DEFLATE, flg];
    h.extend_from_slice(&opts.mtime.to_le_bytes());
    h.push(xfl);
    h.push(opts.os);
    if let Some(extra) = &opts.extra {
        h.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        h.extend_from_slice(extra);
    }
    if let Some(name) = &opts.name {
        h.extend_from_slice(name.as_bytes());
        h.push(0);
    }
    if let Some(comment) = &opts.comment {
        h.extend_from_slice(comment.as_bytes());
        h.push(0);
    }
    if opts.header_crc {
        let crc16 = (crc32::crc32(&h) & 0xFFFF) as u16;
        h.extend_from_slice(&crc16.to_le_bytes());
    }
    h
}

impl GzipEncoder {
    pub fn new(level: u8, limits: Limits, header_opts: GzipHeaderOptions) -> Result<Self> {
        Ok(Self {
            level,
            limits,
            header: build_header(level, &header_opts),
            header_opts,
            stage: Stage::Header,
            header_pos: 0,
            inner: DeflateEncoder::new(level, limits)?,
            trailer: Vec::new(),
            trailer_pos: 0,
            crc: crc32::init(),
            isize_bytes: 0,
        })
    }

    /// Drains `buf[pos..]` into `output`, returning whether it's now fully
    /// delivered.
    fn drain(buf: &[u8], pos: &mut usize, output: &mut OutBuf<'_>) -> bool {
        if *pos < buf.len() {
            *pos += output.push_from(&buf[*pos..]);
        }
        *pos == buf.len()
    }

    fn build_trailer(&mut self) {
        let crc = crc32::finalize(self.crc);
        let size = (self.isize_bytes & 0xFFFF_FFFF) as u32;
        self.trailer.extend_from_slice(&crc.to_le_bytes());
        self.trailer.extend_from_slice(&size.to_le_bytes());
    }
}

impl EncoderImpl for GzipEncoder {
    fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        loop {
            match self.stage {
                Stage::Header => {
                    if !Self::drain(&self.header, &mut self.header_pos, output) {
                        return Ok(());
                    }
                    self.stage = Stage::Body;
                }
                Stage::Body => {
                    if output.is_full() || input.is_empty() {
                        return Ok(());
                    }
                    let used = input.used;
                    let start_used = used;
                    let snapshot = input.remaining();
                    self.inner.update(input, output)?;
                    let used = input.used;
                    let consumed = used - start_used;
                    let bytes = &snapshot[..consumed];
                    self.crc = crc32::update(self.crc, bytes);
                    self.isize_bytes = self.isize_bytes.wrapping_add(bytes.len() as u64);
                    if consumed == 0 {
                        return Ok(());
                    }
                }
                Stage::Trailer | Stage::Done => return Ok(()),
            }
        }
    }

    fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<FinishStatus> {
        loop {
            match self.stage {
                Stage::Header => {
                    if !Self::drain(&self.header, &mut self.header_pos, output) {
                        return Ok(FinishStatus::NeedMoreOutput);
                    }
                    self.stage = Stage::Body;
                }
                Stage::Body => match self.inner.finish(output)? {
                    FinishStatus::NeedMoreOutput => return Ok(FinishStatus::NeedMoreOutput),
                    FinishStatus::Done => {
                        self.build_trailer();
                        self.stage = Stage::Trailer;
                    }
                },
                Stage::Trailer => {
                    if !Self::drain(&self.trailer, &mut self.trailer_pos, output) {
                        return Ok(FinishStatus::NeedMoreOutput);
                    }
                    self.stage = Stage::Done;
                    return Ok(FinishStatus::Done);
                }
                Stage::Done => return Ok(FinishStatus::Done),
            }
        }
    }

    fn reset(&mut self) -> Result<()> {
        let level = self.level;
        let limits = self.limits;
        let header_opts = self.header_opts.clone();
        *self = Self::new(level, limits, header_opts)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gzip::decoder::GzipDecoder;
    use crate::method::DecoderImpl;

    fn limits() -> Limits {
        Limits::unlimited(MAX_DISTANCE as u64)
    }

    fn roundtrip(data: &[u8], level: u8) -> Vec<u8> {
        let mut enc = GzipEncoder::new(level, limits(), GzipHeaderOptions::default()).unwrap();
        let mut compressed = Vec::new();
        let mut pos = 0;
        loop {
            let mut input = InBuf::new(&data[pos..]);
            let mut out = [0u8; 128];
            let mut output = OutBuf::new(&mut out);
            enc.update(&mut input, &mut output).unwrap();
            let used = input.used;
            pos += used;
            let used = output.used;
            compressed.extend_from_slice(&out[..used]);
            if pos >= data.len() {
                break;
            }
        }
        loop {
            let mut out = [0u8; 128];
            let mut output = OutBuf::new(&mut out);
            let status = enc.finish(&mut output).unwrap();
            let used = output.used;
            compressed.extend_from_slice(&out[..used]);
            if status == FinishStatus::Done {
                break;
            }
        }

        let mut dec = GzipDecoder::new(limits()).unwrap();
        let mut decoded = Vec::new();
        let mut input = InBuf::new(&compressed);
        loop {
            let mut out = [0u8; 128];
            let mut output = OutBuf::new(&mut out);
            dec.update(&mut input, &mut output).unwrap();
            let used = output.used;
            decoded.extend_from_slice(&out[..used]);
            if input.is_empty() {
                break;
            }
        }
        let mut out = [0u8; 128];
        let mut output = OutBuf::new(&mut out);
        dec.finish(&mut output).unwrap();
        let used = output.used;
        decoded.extend_from_slice(&out[..used]);
        decoded
    }

    #[test]
    fn header_starts_with_magic_and_method() {
        let h = build_header(6, &GzipHeaderOptions::default());
        assert_eq!(&h[0..3], &[ID1, ID2, CM_DEFLATE]);
    }

    #[test]
    fn header_with_name_and_crc_sets_expected_flags() {
        let opts = GzipHeaderOptions {
            name: Some("h.txt".to_string()),
            mtime: 1_700_000_000,
            header_crc: true,
            os: OS_UNKNOWN,
            ..Default::default()
        };
        let h = build_header(6, &opts);
        assert_eq!(h[3], FLG_FNAME | FLG_FHCRC);
        assert_eq!(u32::from_le_bytes([h[4], h[5], h[6], h[7]]), 1_700_000_000);
        assert_eq!(&h[10..15], b"h.txt");
        assert_eq!(h[15], 0); // NUL terminator
        assert_eq!(h.len(), 18); // 10 fixed + 6 name bytes (incl. NUL) + 2 HCRC
    }

    #[test]
    fn header_with_extra_and_comment_sets_expected_flags_and_order() {
        let opts = GzipHeaderOptions {
            extra: Some(vec![1, 2, 3]),
            comment: Some("note".to_string()),
            os: OS_UNKNOWN,
            ..Default::default()
        };
        let h = build_header(6, &opts);
        assert_eq!(h[3], FLG_FEXTRA | FLG_FCOMMENT);
        // FEXTRA: XLEN (u16 LE) then the bytes, right after the 10-byte fixed header.
        assert_eq!(u16::from_le_bytes([h[10], h[11]]), 3);
        assert_eq!(&h[12..15], &[1, 2, 3]);
        // FCOMMENT follows, NUL-terminated.
        assert_eq!(&h[15..19], b"note");
        assert_eq!(h[19], 0);
    }

    #[test]
    fn explicit_xfl_and_os_override_derived_values() {
        let opts = GzipHeaderOptions { xfl: Some(9), os: 3, ..Default::default() };
        let h = build_header(6, &opts);
        assert_eq!(h[8], 9);
        assert_eq!(h[9], 3);
    }

    #[test]
    fn xfl_derives_from_level_when_not_overridden() {
        assert_eq!(derive_xfl(9), 2);
        assert_eq!(derive_xfl(6), 2);
        assert_eq!(derive_xfl(5), 0);
        assert_eq!(derive_xfl(2), 4);
        assert_eq!(derive_xfl(0), 4);
    }

    #[test]
    fn roundtrip_empty() {
        assert_eq!(roundtrip(b"", 6), b"");
    }

    #[test]
    fn roundtrip_small() {
        assert_eq!(roundtrip(b"hello, gzip world", 6), b"hello, gzip world");
    }

    #[test]
    fn roundtrip_repetitive() {
        let data = "mississippi river ".repeat(500);
        assert_eq!(roundtrip(data.as_bytes(), 6), data.as_bytes());
    }

    #[test]
    fn roundtrip_level_zero() {
        let data = vec![7u8; 10_000];
        assert_eq!(roundtrip(&data, 0), data);
    }

    #[test]
    fn roundtrip_with_name_and_header_crc() {
        let opts = GzipHeaderOptions {
            name: Some("h.txt".to_string()),
            mtime: 1_700_000_000,
            header_crc: true,
            os: OS_UNKNOWN,
            ..Default::default()
        };
        let mut enc = GzipEncoder::new(6, limits(), opts).unwrap();
        let mut compressed = Vec::new();
        let mut input = InBuf::new(b"hello");
        let mut out = [0u8; 64];
        {
            let mut output = OutBuf::new(&mut out);
            enc.update(&mut input, &mut output).unwrap();
            let used = output.used;
            compressed.extend_from_slice(&out[..used]);
        }
        loop {
            let mut output = OutBuf::new(&mut out);
            let status = enc.finish(&mut output).unwrap();
            let used = output.used;
            compressed.extend_from_slice(&out[..used]);
            if status == FinishStatus::Done {
                break;
            }
        }
        assert_eq!(crc32::crc32(b"hello"), 0x3610_A686);
        let trailer = &compressed[compressed.len() - 8..];
        assert_eq!(u32::from_le_bytes(trailer[0..4].try_into().unwrap()), 0x3610_A686);
        assert_eq!(u32::from_le_bytes(trailer[4..8].try_into().unwrap()), 5);

        let mut dec = GzipDecoder::new(limits()).unwrap();
        let mut dinput = InBuf::new(&compressed);
        let mut dout = [0u8; 64];
        let mut doutput = OutBuf::new(&mut dout);
        dec.update(&mut dinput, &mut doutput).unwrap();
        dec.finish(&mut doutput).unwrap();
        let used = doutput.used;
        assert_eq!(&dout[..used], b"hello");
    }
}
