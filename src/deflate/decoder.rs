//! The restartable DEFLATE decoder state machine.
//!
//! Grounded on the teacher crate's `DecompressStage` (`dStage_t` in the
//! original LZ4 frame decoder): an explicit enum naming every point the
//! decoder can be suspended and resumed, rather than a recursive or
//! loop-until-EOF design. Every stage transition here either (a) fully
//! completes and advances to the next stage, or (b) makes no state change
//! at all and asks for more input or output space — this is what lets
//! `update` be called with arbitrarily small, arbitrarily chunked
//! `InBuf`/`OutBuf` slices and still produce byte-identical results to one
//! giant call.

use crate::buffer::{InBuf, OutBuf};
use crate::deflate::bitio::BitReader;
use crate::deflate::huffman::{self, HuffTable};
use crate::deflate::tables::{self, CL_ORDER, DIST_BASE, DIST_EXTRA, LENGTH_BASE, LENGTH_EXTRA};
use crate::deflate::window::SlidingWindow;
use crate::error::{err, ErrorKind, Result};
use crate::limits::{Limits, MemoryTracker};
use crate::method::DecoderImpl;

/// Every point the decoder can suspend at, and the minimal state needed to
/// resume there. Payload-bearing variants carry exactly what would
/// otherwise be lost by returning to the caller mid-decode.
#[derive(Clone)]
enum Stage {
    BlockHeader,
    StoredLen,
    StoredNlen { len: u16 },
    StoredCopy { remaining: u16 },
    DynCounts,
    DynClLengths,
    DynCodeLengths,
    ClRepeatExtra { kind: u8 },
    Symbol,
    LengthExtra { len_base: u16, extra: u8 },
    DistSymbol { length: u16 },
    DistExtra { length: u16, dist_base: u16, extra: u8 },
    Copy { length: u16, distance: u16 },
    BlockDone,
    Done,
}

enum Step {
    Continue,
    NeedInput,
    NeedOutput,
    Finished,
}

fn try_bits(reader: &mut BitReader<'_>, n: u32) -> Option<u32> {
    let v = reader.peek_bits(n)?;
    reader.advance(n);
    Some(v)
}

pub struct DeflateDecoder {
    stage: Stage,
    bit_pos: u8,
    final_block: bool,
    window: SlidingWindow,
    limits: Limits,
    memory: MemoryTracker,
    total_in: u64,
    total_out: u64,

    // Dynamic-block header state, live only between `DynCounts` and the
    // point `DynCodeLengths` finishes building the real tables.
    dyn_hlit: usize,
    dyn_hdist: usize,
    dyn_hclen: usize,
    dyn_cl_idx: usize,
    dyn_cl_raw: [u8; 19],
    dyn_lengths: Vec<u8>,
    dyn_prev_len: u8,
    cl_table: Option<HuffTable>,

    litlen_table: Option<HuffTable>,
    dist_table: Option<HuffTable>,
}

const WINDOW_BYTES: u64 = tables::MAX_DISTANCE as u64;

impl DeflateDecoder {
    pub fn new(limits: Limits) -> Result<Self> {
        let mut memory = MemoryTracker::default();
        memory.alloc(WINDOW_BYTES);
        memory.check(limits.max_memory_bytes)?;
        Ok(Self {
            stage: Stage::BlockHeader,
            bit_pos: 0,
            final_block: false,
            window: SlidingWindow::new(),
            limits,
            memory,
            total_in: 0,
            total_out: 0,
            dyn_hlit: 0,
            dyn_hdist: 0,
            dyn_hclen: 0,
            dyn_cl_idx: 0,
            dyn_cl_raw: [0u8; 19],
            dyn_lengths: Vec::new(),
            dyn_prev_len: 0,
            cl_table: None,
            litlen_table: None,
            dist_table: None,
        })
    }

    fn record_output_byte(&mut self) -> Result<()> {
        self.total_out += 1;
        self.limits.check_output(self.total_out)
    }

    fn step(&mut self, reader: &mut BitReader<'_>, output: &mut OutBuf<'_>) -> Result<Step> {
        match self.stage.clone() {
            Stage::BlockHeader => match try_bits(reader, 3) {
                None => Ok(Step::NeedInput),
                Some(v) => {
                    self.final_block = v & 1 != 0;
                    match (v >> 1) & 0b11 {
                        0 => {
                            reader.align_to_byte();
                            self.stage = Stage::StoredLen;
                        }
                        1 => {
                            self.litlen_table =
                                Some(huffman::build_decode_table(&tables::fixed_litlen_lengths(), 15)?);
                            self.dist_table =
                                Some(huffman::build_decode_table(&tables::fixed_dist_lengths(), 15)?);
                            self.stage = Stage::Symbol;
                        }
                        2 => self.stage = Stage::DynCounts,
                        _ => {
                            return Err(err(
                                ErrorKind::Corrupt,
                                format_args!("deflate: reserved block type 3"),
                            ))
                        }
                    }
                    Ok(Step::Continue)
                }
            },

            Stage::StoredLen => {
                reader.align_to_byte();
                match try_bits(reader, 16) {
                    None => Ok(Step::NeedInput),
                    Some(len) => {
                        self.stage = Stage::StoredNlen { len: len as u16 };
                        Ok(Step::Continue)
                    }
                }
            }
            Stage::StoredNlen { len } => match try_bits(reader, 16) {
                None => Ok(Step::NeedInput),
                Some(nlen) => {
                    if nlen as u16 != !len {
                        return Err(err(
                            ErrorKind::Corrupt,
                            format_args!("deflate: stored block LEN/NLEN mismatch"),
                        ));
                    }
                    self.stage = Stage::StoredCopy { remaining: len };
                    Ok(Step::Continue)
                }
            },
            Stage::StoredCopy { remaining } => {
                if remaining == 0 {
                    self.stage = Stage::BlockDone;
                    return Ok(Step::Continue);
                }
                if output.is_full() {
                    return Ok(Step::NeedOutput);
                }
                match try_bits(reader, 8) {
                    None => Ok(Step::NeedInput),
                    Some(b) => {
                        let byte = b as u8;
                        output.push_byte(byte);
                        self.window.push(byte);
                        self.record_output_byte()?;
                        self.stage = Stage::StoredCopy { remaining: remaining - 1 };
                        Ok(Step::Continue)
                    }
                }
            }

            Stage::DynCounts => match try_bits(reader, 14) {
                None => Ok(Step::NeedInput),
                Some(v) => {
                    self.dyn_hlit = ((v & 0x1F) + 257) as usize;
                    self.dyn_hdist = (((v >> 5) & 0x1F) + 1) as usize;
                    self.dyn_hclen = (((v >> 10) & 0x0F) + 4) as usize;
                    self.dyn_cl_idx = 0;
                    self.dyn_cl_raw = [0u8; 19];
                    self.stage = Stage::DynClLengths;
                    Ok(Step::Continue)
                }
            },
            Stage::DynClLengths => {
                if self.dyn_cl_idx >= self.dyn_hclen {
                    let table = huffman::build_decode_table(&self.dyn_cl_raw, 7)?;
                    self.cl_table = Some(table);
                    self.dyn_lengths = Vec::with_capacity(self.dyn_hlit + self.dyn_hdist);
                    self.dyn_prev_len = 0;
                    self.stage = Stage::DynCodeLengths;
                    Ok(Step::Continue)
                } else {
                    match try_bits(reader, 3) {
                        None => Ok(Step::NeedInput),
                        Some(v) => {
                            let order_idx = CL_ORDER[self.dyn_cl_idx] as usize;
                            self.dyn_cl_raw[order_idx] = v as u8;
                            self.dyn_cl_idx += 1;
                            Ok(Step::Continue)
                        }
                    }
                }
            }
            Stage::DynCodeLengths => {
                let target = self.dyn_hlit + self.dyn_hdist;
                if self.dyn_lengths.len() >= target {
                    let lit_lengths = &self.dyn_lengths[..self.dyn_hlit];
                    let dist_lengths = &self.dyn_lengths[self.dyn_hlit..];
                    self.litlen_table = Some(huffman::build_decode_table(lit_lengths, 15)?);
                    self.dist_table = Some(huffman::build_decode_table(dist_lengths, 15)?);
                    self.dyn_lengths = Vec::new();
                    self.cl_table = None;
                    self.stage = Stage::Symbol;
                    return Ok(Step::Continue);
                }
                let table = self.cl_table.as_ref().expect("cl table built before DynCodeLengths");
                match huffman::decode_symbol(table, reader)? {
                    None => Ok(Step::NeedInput),
                    Some((sym, nbits)) => {
                        reader.advance(nbits);
                        match sym {
                            0..=15 => {
                                self.dyn_lengths.push(sym as u8);
                                self.dyn_prev_len = sym as u8;
                                Ok(Step::Continue)
                            }
                            16 | 17 | 18 => {
                                self.stage = Stage::ClRepeatExtra { kind: sym as u8 };
                                Ok(Step::Continue)
                            }
                            _ => Err(err(
                                ErrorKind::Corrupt,
                                format_args!("deflate: invalid code-length symbol {sym}"),
                            )),
                        }
                    }
                }
            }
            Stage::ClRepeatExtra { kind } => {
                let (extra_bits, base) = match kind {
                    16 => (2, 3u16),
                    17 => (3, 3u16),
                    18 => (7, 11u16),
                    _ => unreachable!("ClRepeatExtra only holds 16/17/18"),
                };
                match try_bits(reader, extra_bits) {
                    None => Ok(Step::NeedInput),
                    Some(v) => {
                        let count = base + v as u16;
                        let fill = if kind == 16 { self.dyn_prev_len } else { 0 };
                        if kind == 16 && self.dyn_lengths.is_empty() {
                            return Err(err(
                                ErrorKind::Corrupt,
                                format_args!("deflate: repeat-previous code length with no previous entry"),
                            ));
                        }
                        let target = self.dyn_hlit + self.dyn_hdist;
                        if self.dyn_lengths.len() + count as usize > target {
                            return Err(err(
                                ErrorKind::Corrupt,
                                format_args!("deflate: code-length repeat overruns HLIT+HDIST"),
                            ));
                        }
                        for _ in 0..count {
                            self.dyn_lengths.push(fill);
                        }
                        self.stage = Stage::DynCodeLengths;
                        Ok(Step::Continue)
                    }
                }
            }

            Stage::Symbol => {
                let table = self.litlen_table.as_ref().expect("litlen table built before Symbol stage");
                match huffman::decode_symbol(table, reader)? {
                    None => Ok(Step::NeedInput),
                    Some((sym, nbits)) => {
                        if sym < 256 {
                            if output.is_full() {
                                return Ok(Step::NeedOutput);
                            }
                            reader.advance(nbits);
                            output.push_byte(sym as u8);
                            self.window.push(sym as u8);
                            self.record_output_byte()?;
                            Ok(Step::Continue)
                        } else if sym == tables::END_OF_BLOCK {
                            reader.advance(nbits);
                            self.stage = Stage::BlockDone;
                            Ok(Step::Continue)
                        } else {
                            let idx = (sym - tables::FIRST_LENGTH_SYMBOL) as usize;
                            if idx >= LENGTH_BASE.len() {
                                return Err(err(
                                    ErrorKind::Corrupt,
                                    format_args!("deflate: invalid length symbol {sym}"),
                                ));
                            }
                            reader.advance(nbits);
                            self.stage = Stage::LengthExtra {
                                len_base: LENGTH_BASE[idx],
                                extra: LENGTH_EXTRA[idx],
                            };
                            Ok(Step::Continue)
                        }
                    }
                }
            }
            Stage::LengthExtra { len_base, extra } => {
                if extra == 0 {
                    self.stage = Stage::DistSymbol { length: len_base };
                    Ok(Step::Continue)
                } else {
                    match try_bits(reader, extra as u32) {
                        None => Ok(Step::NeedInput),
                        Some(v) => {
                            self.stage = Stage::DistSymbol { length: len_base + v as u16 };
                            Ok(Step::Continue)
                        }
                    }
                }
            }
            Stage::DistSymbol { length } => {
                let table = self.dist_table.as_ref().expect("dist table built before DistSymbol stage");
                match huffman::decode_symbol(table, reader)? {
                    None => Ok(Step::NeedInput),
                    Some((dsym, nbits)) => {
                        if dsym as usize >= DIST_BASE.len() {
                            return Err(err(
                                ErrorKind::Corrupt,
                                format_args!("deflate: invalid distance symbol {dsym}"),
                            ));
                        }
                        reader.advance(nbits);
                        self.stage = Stage::DistExtra {
                            length,
                            dist_base: DIST_BASE[dsym as usize],
                            extra: DIST_EXTRA[dsym as usize],
                        };
                        Ok(Step::Continue)
                    }
                }
            }
            Stage::DistExtra { length, dist_base, extra } => {
                if extra == 0 {
                    self.stage = Stage::Copy { length, distance: dist_base };
                    Ok(Step::Continue)
                } else {
                    match try_bits(reader, extra as u32) {
                        None => Ok(Step::NeedInput),
                        Some(v) => {
                            self.stage =
                                Stage::Copy { length, distance: dist_base + v as u16 };
                            Ok(Step::Continue)
                        }
                    }
                }
            }
            Stage::Copy { length, distance } => {
                if length == 0 {
                    self.stage = Stage::Symbol;
                    return Ok(Step::Continue);
                }
                if output.is_full() {
                    return Ok(Step::NeedOutput);
                }
                let byte = self.window.copy_one(distance as usize)?;
                output.push_byte(byte);
                self.record_output_byte()?;
                self.stage = Stage::Copy { length: length - 1, distance };
                Ok(Step::Continue)
            }

            Stage::BlockDone => {
                if self.final_block {
                    self.stage = Stage::Done;
                    Ok(Step::Finished)
                } else {
                    self.stage = Stage::BlockHeader;
                    Ok(Step::Continue)
                }
            }
            Stage::Done => Ok(Step::Finished),
        }
    }

    fn run(&mut self, reader: &mut BitReader<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        loop {
            match self.step(reader, output)? {
                Step::Continue => continue,
                Step::NeedInput | Step::NeedOutput => return Ok(()),
                Step::Finished => return Ok(()),
            }
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.stage, Stage::Done)
    }

    /// Bit offset (0..7) the internal reader has consumed within the next
    /// unconsumed input byte. A wrapper like `gzip::decoder` that hands this
    /// decoder raw input slices needs this to know whether that byte's
    /// remaining bits were padding it can now claim, once `is_done()`.
    pub fn bit_pos(&self) -> u8 {
        self.bit_pos
    }
}

impl DecoderImpl for DeflateDecoder {
    fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        let mut reader = BitReader::with_bit_pos(input.remaining(), self.bit_pos);
        self.run(&mut reader, output)?;
        let consumed = reader.byte_pos();
        let new_bit_pos = reader.bit_pos();
        let used = input.used;
        used += consumed;
        self.bit_pos = new_bit_pos;
        self.total_in += consumed as u64;
        self.limits.check_expansion(self.total_in, self.total_out)?;
        self.memory.check(self.limits.max_memory_bytes)?;
        Ok(())
    }

    fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<()> {
        if self.is_done() {
            return Ok(());
        }
        let empty: [u8; 0] = [];
        let mut reader = BitReader::with_bit_pos(&empty, self.bit_pos);
        self.run(&mut reader, output)?;
        if self.is_done() {
            Ok(())
        } else {
            Err(err(
                ErrorKind::Corrupt,
                format_args!("deflate: stream incomplete at finish"),
            ))
        }
    }

    fn reset(&mut self) -> Result<()> {
        let limits = self.limits;
        let mut memory = MemoryTracker::default();
        memory.alloc(WINDOW_BYTES);
        memory.check(limits.max_memory_bytes)?;
        *self = Self {
            stage: Stage::BlockHeader,
            bit_pos: 0,
            final_block: false,
            window: SlidingWindow::new(),
            limits,
            memory,
            total_in: 0,
            total_out: 0,
            dyn_hlit: 0,
            dyn_hdist: 0,
            dyn_hclen: 0,
            dyn_cl_idx: 0,
            dyn_cl_raw: [0u8; 19],
            dyn_lengths: Vec::new(),
            dyn_prev_len: 0,
            cl_table: None,
            litlen_table: None,
            dist_table: None,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deflate::bitio::BitWriter;
    use crate::method::DecoderImpl;

    fn limits() -> Limits {
        Limits::unlimited(WINDOW_BYTES)
    }

    fn stored_block(payload: &[u8], is_final: bool) -> Vec<u8> {
        let mut buf = vec![0u8; payload.len() + 16];
        let n;
        {
            let mut w = BitWriter::new(&mut buf);
            w.write_bits(if is_final { 1 } else { 0 }, 1).unwrap();
            w.write_bits(0, 2).unwrap();
            w.flush_to_byte().unwrap();
            let len = payload.len() as u32;
            w.write_bits(len & 0xFFFF, 16).unwrap();
            w.write_bits((!len) & 0xFFFF, 16).unwrap();
            for &b in payload {
                w.write_bits(b as u32, 8).unwrap();
            }
            w.flush_to_byte().unwrap();
            n = w.bytes_written();
        }
        buf.truncate(n);
        buf
    }

    #[test]
    fn decodes_stored_block() {
        let payload = b"hello, deflate";
        let stream = stored_block(payload, true);
        let mut dec = DeflateDecoder::new(limits()).unwrap();
        let mut input = InBuf::new(&stream);
        let mut out = [0u8; 64];
        let mut output = OutBuf::new(&mut out);
        dec.update(&mut input, &mut output).unwrap();
        dec.finish(&mut output).unwrap();
        let used = output.used;
        assert_eq!(&out[..used], payload);
    }

    #[test]
    fn decodes_stored_block_one_byte_at_a_time() {
        let payload = b"chunked input exercise";
        let stream = stored_block(payload, true);
        let mut dec = DeflateDecoder::new(limits()).unwrap();
        let mut collected = Vec::new();
        let mut pos = 0;
        while pos < stream.len() {
            let mut input = InBuf::new(&stream[pos..pos + 1]);
            let mut out = [0u8; 64];
            let mut output = OutBuf::new(&mut out);
            dec.update(&mut input, &mut output).unwrap();
            let used = output.used;
            collected.extend_from_slice(&out[..used]);
            pos += 1;
        }
        let mut out = [0u8; 8];
        let mut output = OutBuf::new(&mut out);
        dec.finish(&mut output).unwrap();
        let used = output.used;
        collected.extend_from_slice(&out[..used]);
        assert_eq!(collected, payload);
    }

    #[test]
    fn decodes_with_tiny_output_buffer() {
        let payload = b"a longer payload that needs several output drains to finish";
        let stream = stored_block(payload, true);
        let mut dec = DeflateDecoder::new(limits()).unwrap();
        let mut input = InBuf::new(&stream);
        let mut collected = Vec::new();
        loop {
            let mut out = [0u8; 3];
            let mut output = OutBuf::new(&mut out);
            dec.update(&mut input, &mut output).unwrap();
            let used = output.used;
            collected.extend_from_slice(&out[..used]);
            let used = output.used;
            if input.is_empty() && used < out.len() {
                break;
            }
        }
        let mut out = [0u8; 8];
        let mut output = OutBuf::new(&mut out);
        dec.finish(&mut output).unwrap();
        let used = output.used;
        collected.extend_from_slice(&out[..used]);
        assert_eq!(collected, payload);
    }

    #[test]
    fn finish_before_done_is_corrupt() {
        let mut dec = DeflateDecoder::new(limits()).unwrap();
        let mut out = [0u8; 8];
        let mut output = OutBuf::new(&mut out);
        let e = dec.finish(&mut output).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn reserved_block_type_is_corrupt() {
        let mut buf = [0u8; 1];
        {
            let mut w = BitWriter::new(&mut buf);
            w.write_bits(1, 1).unwrap(); // final
            w.write_bits(0b11, 2).unwrap(); // reserved type
            w.flush_to_byte().unwrap();
        }
        let mut dec = DeflateDecoder::new(limits()).unwrap();
        let mut input = InBuf::new(&buf);
        let mut out = [0u8; 8];
        let mut output = OutBuf::new(&mut out);
        let e = dec.update(&mut input, &mut output).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Corrupt);
    }
}
