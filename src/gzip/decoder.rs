//! The GZIP decoder: a byte-oriented header/trailer state machine wrapped
//! around one raw DEFLATE decoder per member, with concatenated-member
//! support (RFC 1952 §2.2's "a gzip file consists of a series of
//! 'members'").
//!
//! The header and trailer fields are always byte-aligned, so unlike
//! `deflate::decoder` this state machine reads straight from `InBuf`
//! rather than through a `BitReader` — only the compressed body is
//! bit-level, and that's delegated whole to a nested `DeflateDecoder`.

use crate::buffer::{InBuf, OutBuf};
use crate::crc32;
use crate::deflate::decoder::DeflateDecoder;
use crate::error::{err, ErrorKind, Result};
use crate::gzip::header::{CM_DEFLATE, FLG_FCOMMENT, FLG_FEXTRA, FLG_FHCRC, FLG_FNAME, ID1, ID2};
use crate::limits::Limits;
use crate::method::DecoderImpl;

#[derive(Clone, Copy)]
enum Stage {
    Id,
    Flg,
    Mtime,
    Xfl,
    Os,
    ExtraLen,
    ExtraData { remaining: u16 },
    Name,
    Comment,
    Hcrc,
    Body,
    TrailerCrc,
    TrailerIsize,
    /// Reached once a member has fully decoded and `concat` is false. Input
    /// bytes after this point are left unconsumed, per the adopted
    /// resolution of the "how to treat trailing data" open question.
    StreamDone,
}

/// Decoder-side safety caps on optional header fields, guarding against a
/// hostile or corrupt stream declaring an enormous FEXTRA/FNAME/FCOMMENT.
#[derive(Clone, Copy)]
pub struct GzipCaps {
    pub max_extra_bytes: u64,
    pub max_name_bytes: u64,
    pub max_comment_bytes: u64,
}

impl Default for GzipCaps {
    fn default() -> Self {
        Self { max_extra_bytes: 64 * 1024, max_name_bytes: 1024 * 1024, max_comment_bytes: 1024 * 1024 }
    }
}

enum Step {
    Continue,
    NeedInput,
    NeedOutput,
}

pub struct GzipDecoder {
    stage: Stage,
    flg: u8,
    collect_buf: [u8; 4],
    collect_idx: usize,
    /// Accumulates every header byte read so far in the current member
    /// (ID1..the byte just before FHCRC), for header-CRC verification.
    header_bytes: Vec<u8>,
    concat: bool,
    caps: GzipCaps,
    /// Running length of the Name/Comment field read so far in the current
    /// member, checked against `caps.max_name_bytes`/`max_comment_bytes`.
    field_len: u64,
    inner: DeflateDecoder,
    member_crc: u32,
    member_isize: u64,
    limits: Limits,
    any_member_done: bool,
    /// Cumulative bytes across the whole stream (all members, including
    /// header/trailer overhead on the input side), preserved across member
    /// boundaries unlike `member_crc`/`member_isize` — per the adopted
    /// resolution that limit counters are not reset per member.
    total_in: u64,
    total_out: u64,
}

impl GzipDecoder {
    pub fn new(limits: Limits) -> Result<Self> {
        Self::with_concat(limits, false)
    }

    pub fn with_concat(limits: Limits, concat: bool) -> Result<Self> {
        Self::with_options(limits, concat, GzipCaps::default())
    }

    pub fn with_options(limits: Limits, concat: bool, caps: GzipCaps) -> Result<Self> {
        Ok(Self {
            stage: Stage::Id,
            flg: 0,
            collect_buf: [0u8; 4],
            collect_idx: 0,
            header_bytes: Vec::new(),
            concat,
            caps,
            field_len: 0,
            inner: DeflateDecoder::new(limits)?,
            member_crc: crc32::init(),
            member_isize: 0,
            limits,
            any_member_done: false,
            total_in: 0,
            total_out: 0,
        })
    }

    /// Reads one byte, counting it toward the running header CRC.
    fn header_byte(&mut self, input: &mut InBuf<'_>) -> Option<u8> {
        let rem = input.remaining();
        if rem.is_empty() {
            return None;
        }
        let b = rem[0];
        let used = input.used;
        used += 1;
        self.header_bytes.push(b);
        Some(b)
    }

    /// Reads one byte without counting it toward the header CRC (trailer
    /// and FHCRC fields themselves are excluded from that checksum).
    fn plain_byte(input: &mut InBuf<'_>) -> Option<u8> {
        let rem = input.remaining();
        if rem.is_empty() {
            return None;
        }
        let b = rem[0];
        let used = input.used;
        used += 1;
        Some(b)
    }

    fn collect_header(&mut self, input: &mut InBuf<'_>, n: usize) -> Option<()> {
        while self.collect_idx < n {
            let b = self.header_byte(input)?;
            self.collect_buf[self.collect_idx] = b;
            self.collect_idx += 1;
        }
        Some(())
    }

    fn collect_plain(&mut self, input: &mut InBuf<'_>, n: usize) -> Option<()> {
        while self.collect_idx < n {
            let b = Self::plain_byte(input)?;
            self.collect_buf[self.collect_idx] = b;
            self.collect_idx += 1;
        }
        Some(())
    }

    fn after_extra(&mut self) {
        if self.flg & FLG_FNAME != 0 {
            self.field_len = 0;
            self.stage = Stage::Name;
        } else {
            self.after_name();
        }
    }

    fn after_name(&mut self) {
        if self.flg & FLG_FCOMMENT != 0 {
            self.field_len = 0;
            self.stage = Stage::Comment;
        } else {
            self.after_comment();
        }
    }

    fn after_comment(&mut self) {
        if self.flg & FLG_FHCRC != 0 {
            self.collect_idx = 0;
            self.stage = Stage::Hcrc;
        } else {
            self.start_body();
        }
    }

    fn start_body(&mut self) {
        self.member_crc = crc32::init();
        self.member_isize = 0;
        self.header_bytes.clear();
        self.stage = Stage::Body;
    }

    fn step(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<Step> {
        match self.stage {
            Stage::Id => {
                if self.collect_header(input, 3).is_none() {
                    return Ok(Step::NeedInput);
                }
                if self.collect_buf[0] != ID1 || self.collect_buf[1] != ID2 {
                    return Err(err(
                        ErrorKind::Corrupt,
                        format_args!("gzip: bad magic bytes {:#x} {:#x}", self.collect_buf[0], self.collect_buf[1]),
                    ));
                }
                if self.collect_buf[2] != CM_DEFLATE {
                    return Err(err(
                        ErrorKind::Unsupported,
                        format_args!("gzip: unsupported compression method {}", self.collect_buf[2]),
                    ));
                }
                self.collect_idx = 0;
                self.stage = Stage::Flg;
                Ok(Step::Continue)
            }
            Stage::Flg => match self.header_byte(input) {
                None => Ok(Step::NeedInput),
                Some(b) => {
                    self.flg = b;
                    self.collect_idx = 0;
                    self.stage = Stage::Mtime;
                    Ok(Step::Continue)
                }
            },
            Stage::Mtime => {
                if self.collect_header(input, 4).is_none() {
                    return Ok(Step::NeedInput);
                }
                self.collect_idx = 0;
                self.stage = Stage::Xfl;
                Ok(Step::Continue)
            }
            Stage::Xfl => match self.header_byte(input) {
                None => Ok(Step::NeedInput),
                Some(_) => {
                    self.stage = Stage::Os;
                    Ok(Step::Continue)
                }
            },
            Stage::Os => match self.header_byte(input) {
                None => Ok(Step::NeedInput),
                Some(_) => {
                    if self.flg & FLG_FEXTRA != 0 {
                        self.collect_idx = 0;
                        self.stage = Stage::ExtraLen;
                    } else {
                        self.after_extra();
                    }
                    Ok(Step::Continue)
                }
            },
            Stage::ExtraLen => {
                if self.collect_header(input, 2).is_none() {
                    return Ok(Step::NeedInput);
                }
                let xlen = u16::from_le_bytes([self.collect_buf[0], self.collect_buf[1]]);
                if xlen as u64 > self.caps.max_extra_bytes {
                    return Err(err(
                        ErrorKind::Limit,
                        format_args!(
                            "gzip: FEXTRA length {xlen} exceeds gzip.max_extra_bytes ({})",
                            self.caps.max_extra_bytes
                        ),
                    ));
                }
                self.stage = Stage::ExtraData { remaining: xlen };
                Ok(Step::Continue)
            }
            Stage::ExtraData { remaining } => {
                if remaining == 0 {
                    self.after_extra();
                    return Ok(Step::Continue);
                }
                match self.header_byte(input) {
                    None => Ok(Step::NeedInput),
                    Some(_) => {
                        self.stage = Stage::ExtraData { remaining: remaining - 1 };
                        Ok(Step::Continue)
                    }
                }
            }
            Stage::Name => match self.header_byte(input) {
                None => Ok(Step::NeedInput),
                Some(0) => {
                    self.after_name();
                    Ok(Step::Continue)
                }
                Some(_) => {
                    self.field_len += 1;
                    if self.field_len > self.caps.max_name_bytes {
                        return Err(err(
                            ErrorKind::Limit,
                            format_args!("gzip: FNAME exceeds gzip.max_name_bytes ({})", self.caps.max_name_bytes),
                        ));
                    }
                    Ok(Step::Continue)
                }
            },
            Stage::Comment => match self.header_byte(input) {
                None => Ok(Step::NeedInput),
                Some(0) => {
                    self.after_comment();
                    Ok(Step::Continue)
                }
                Some(_) => {
                    self.field_len += 1;
                    if self.field_len > self.caps.max_comment_bytes {
                        return Err(err(
                            ErrorKind::Limit,
                            format_args!(
                                "gzip: FCOMMENT exceeds gzip.max_comment_bytes ({})",
                                self.caps.max_comment_bytes
                            ),
                        ));
                    }
                    Ok(Step::Continue)
                }
            },
            Stage::Hcrc => {
                if self.collect_plain(input, 2).is_none() {
                    return Ok(Step::NeedInput);
                }
                let expected = u16::from_le_bytes([self.collect_buf[0], self.collect_buf[1]]);
                let actual = (crc32::crc32(&self.header_bytes) & 0xFFFF) as u16;
                if expected != actual {
                    return Err(err(
                        ErrorKind::Corrupt,
                        format_args!("gzip: header CRC16 mismatch: expected {expected:#06x}, got {actual:#06x}"),
                    ));
                }
                self.start_body();
                Ok(Step::Continue)
            }
            Stage::Body => {
                let used = output.used;
                let before = used;
                let mut inner_input = InBuf::new(input.remaining());
                self.inner.update(&mut inner_input, output)?;
                let used = inner_input.used;
                let mut consumed = used;
                // The inner decoder only advances its own input cursor by
                // whole bytes (`byte_pos()`), so a final block that ends
                // mid-byte leaves its last padding byte unconsumed from its
                // point of view even though `is_done()` is already true.
                // That byte belongs to the trailer's byte-aligned framing,
                // not to another symbol, so claim it here rather than
                // leaving the trailer fields to read it as CRC32's first
                // byte.
                if self.inner.is_done() && self.inner.bit_pos() != 0 {
                    consumed += 1;
                }
                let used = input.used;
                used += consumed;
                let used = output.used;
                let produced = &output.written()[before..used];
                self.member_crc = crc32::update(self.member_crc, produced);
                self.member_isize = self.member_isize.wrapping_add(produced.len() as u64);
                self.total_in = self.total_in.wrapping_add(consumed as u64);
                self.total_out = self.total_out.wrapping_add(produced.len() as u64);
                self.limits.check_output(self.total_out)?;
                self.limits.check_expansion(self.total_in, self.total_out)?;

                if self.inner.is_done() {
                    self.collect_idx = 0;
                    self.stage = Stage::TrailerCrc;
                    Ok(Step::Continue)
                } else if consumed == 0 {
                    if output.is_full() {
                        Ok(Step::NeedOutput)
                    } else {
                        Ok(Step::NeedInput)
                    }
                } else {
                    Ok(Step::Continue)
                }
            }
            Stage::TrailerCrc => {
                if self.collect_plain(input, 4).is_none() {
                    return Ok(Step::NeedInput);
                }
                let expected = u32::from_le_bytes(self.collect_buf);
                let actual = crc32::finalize(self.member_crc);
                if expected != actual {
                    return Err(err(
                        ErrorKind::Corrupt,
                        format_args!("gzip: trailer CRC32 mismatch: expected {expected:#010x}, got {actual:#010x}"),
                    ));
                }
                self.collect_idx = 0;
                self.stage = Stage::TrailerIsize;
                Ok(Step::Continue)
            }
            Stage::TrailerIsize => {
                if self.collect_plain(input, 4).is_none() {
                    return Ok(Step::NeedInput);
                }
                let expected = u32::from_le_bytes(self.collect_buf);
                let actual = (self.member_isize & 0xFFFF_FFFF) as u32;
                if expected != actual {
                    return Err(err(
                        ErrorKind::Corrupt,
                        format_args!("gzip: trailer ISIZE mismatch: expected {expected}, got {actual}"),
                    ));
                }
                self.any_member_done = true;
                if self.concat {
                    // Ready for a possible next concatenated member.
                    self.inner.reset()?;
                    self.collect_idx = 0;
                    self.stage = Stage::Id;
                } else {
                    self.stage = Stage::StreamDone;
                }
                Ok(Step::Continue)
            }
            Stage::StreamDone => Ok(Step::NeedInput),
        }
    }

    fn run(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        loop {
            match self.step(input, output)? {
                Step::Continue => continue,
                Step::NeedInput | Step::NeedOutput => return Ok(()),
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::StreamDone)
            || (self.any_member_done && matches!(self.stage, Stage::Id) && self.collect_idx == 0)
    }
}

impl DecoderImpl for GzipDecoder {
    fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        self.run(input, output)
    }

    fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<()> {
        if self.is_done() {
            return Ok(());
        }
        let mut empty = InBuf::new(&[]);
        self.run(&mut empty, output)?;
        if self.is_done() {
            return Ok(());
        }
        let where_ = match self.stage {
            Stage::TrailerCrc | Stage::TrailerIsize => "trailer",
            Stage::Body => "compressed body",
            Stage::StreamDone => unreachable!("is_done() would have returned true"),
            _ => "header",
        };
        Err(err(
            ErrorKind::Corrupt,
            format_args!("gzip: stream incomplete at finish (truncated {where_})"),
        ))
    }

    fn reset(&mut self) -> Result<()> {
        let limits = self.limits;
        let concat = self.concat;
        let caps = self.caps;
        *self = Self::with_options(limits, concat, caps)?;
        Ok(())
    }
}
