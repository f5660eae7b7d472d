//! The LZ77 + Huffman DEFLATE encoder.
//!
//! Trades some compression ratio for a tractable, clearly-correct
//! implementation: matches are found with a single-candidate (no hash
//! chain) table rather than the chained search a production encoder would
//! use. Each block independently picks whichever of stored, fixed-Huffman,
//! or dynamic-Huffman encodes smallest, by estimating the bit cost of all
//! three before committing any bits.

use crate::buffer::{InBuf, OutBuf};
use crate::deflate::bitio::BitWriterVec;
use crate::deflate::huffman::{self, bit_reverse, build_length_limited_lengths};
use crate::deflate::tables::{
    CL_ORDER, DIST_BASE, DIST_EXTRA, END_OF_BLOCK, LENGTH_BASE, LENGTH_EXTRA, MAX_CL_SYMBOLS,
    MAX_DISTANCE, MAX_DIST_SYMBOLS, MAX_LITLEN_SYMBOLS, MAX_MATCH_LEN, MIN_MATCH_LEN,
};
use crate::deflate::window::SlidingWindow;
use crate::error::Result;
use crate::limits::{Limits, MemoryTracker};
use crate::method::{EncoderImpl, FinishStatus};

const BLOCK_SIZE: usize = 32 * 1024;
const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;

fn hash3(b0: u8, b1: u8, b2: u8) -> usize {
    let seq = ((b0 as u32) << 16) | ((b1 as u32) << 8) | b2 as u32;
    ((seq.wrapping_mul(2_654_435_761)) >> (32 - HASH_BITS)) as usize
}

enum Token {
    Literal(u8),
    Match { length: u16, distance: u16 },
}

/// A fully-built dynamic-Huffman block candidate: code-length vectors for
/// both alphabets, the code-length sub-alphabet that transmits them, and
/// the exact bit cost of emitting the whole thing.
struct DynamicPlan {
    litlen_lengths: Vec<u8>,
    dist_lengths: Vec<u8>,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    cl_lengths: Vec<u8>,
    cl_codes: Vec<u16>,
    actions: Vec<(u8, u8, u16)>,
    bits: u64,
}

pub struct DeflateEncoder {
    level: u8,
    limits: Limits,
    memory: MemoryTracker,
    window: SlidingWindow,
    hash_table: Box<[Option<u64>]>,
    stream_pos: u64,
    pending_in: Vec<u8>,
    bitw: BitWriterVec,
    delivered: usize,
    total_in: u64,
    total_out: u64,
    finished: bool,
    final_emitted: bool,
}

const WINDOW_BYTES: u64 = MAX_DISTANCE as u64;
const HASH_TABLE_BYTES: u64 = (HASH_SIZE * std::mem::size_of::<Option<u64>>()) as u64;

impl DeflateEncoder {
    pub fn new(level: u8, limits: Limits) -> Result<Self> {
        let mut memory = MemoryTracker::default();
        memory.alloc(WINDOW_BYTES + HASH_TABLE_BYTES);
        memory.check(limits.max_memory_bytes)?;
        Ok(Self {
            level,
            limits,
            memory,
            window: SlidingWindow::new(),
            hash_table: vec![None; HASH_SIZE].into_boxed_slice(),
            stream_pos: 0,
            pending_in: Vec::with_capacity(BLOCK_SIZE),
            bitw: BitWriterVec::new(),
            delivered: 0,
            total_in: 0,
            total_out: 0,
            finished: false,
            final_emitted: false,
        })
    }

    fn match_length_at(&self, data: &[u8], i: usize, distance: usize) -> usize {
        let max_len = (data.len() - i).min(MAX_MATCH_LEN);
        let mut len = 0;
        while len < max_len {
            let byte = if len < distance {
                if distance > self.window.history_len() {
                    break;
                }
                self.window.peek_at_distance(distance - len)
            } else {
                data[i + len - distance]
            };
            if byte != data[i + len] {
                break;
            }
            len += 1;
        }
        len
    }

    fn tokenize(&mut self, data: &[u8]) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut i = 0usize;
        while i < data.len() {
            let mut matched = false;
            if i + 3 <= data.len() {
                let hash = hash3(data[i], data[i + 1], data[i + 2]);
                let candidate = self.hash_table[hash];
                self.hash_table[hash] = Some(self.stream_pos + i as u64);
                if let Some(q) = candidate {
                    let here = self.stream_pos + i as u64;
                    if here > q {
                        let distance = (here - q) as usize;
                        if distance >= 1 && distance <= MAX_DISTANCE && distance <= self.window.history_len() {
                            let len = self.match_length_at(data, i, distance);
                            if len >= MIN_MATCH_LEN {
                                tokens.push(Token::Match { length: len as u16, distance: distance as u16 });
                                self.window.push_slice(&data[i..i + len]);
                                i += len;
                                matched = true;
                            }
                        }
                    }
                }
            }
            if !matched {
                tokens.push(Token::Literal(data[i]));
                self.window.push(data[i]);
                i += 1;
            }
        }
        self.stream_pos += data.len() as u64;
        tokens
    }

    fn length_symbol(length: u16) -> (u16, u8, u16) {
        let length = length as usize;
        let mut idx = LENGTH_BASE.len() - 1;
        for (k, &base) in LENGTH_BASE.iter().enumerate() {
            if base as usize <= length {
                idx = k;
            } else {
                break;
            }
        }
        let extra = length as u16 - LENGTH_BASE[idx];
        (257 + idx as u16, LENGTH_EXTRA[idx], extra)
    }

    fn distance_symbol(distance: u16) -> (u16, u8, u16) {
        let distance = distance as usize;
        let mut idx = DIST_BASE.len() - 1;
        for (k, &base) in DIST_BASE.iter().enumerate() {
            if base as usize <= distance {
                idx = k;
            } else {
                break;
            }
        }
        let extra = distance as u16 - DIST_BASE[idx];
        (idx as u16, DIST_EXTRA[idx], extra)
    }

    /// Tallies literal/length and distance symbol frequencies for `tokens`,
    /// plus the total extra-bits cost (identical under every block type).
    fn tally(tokens: &[Token]) -> ([u64; MAX_LITLEN_SYMBOLS], [u64; MAX_DIST_SYMBOLS], u64) {
        let mut freq_litlen = [0u64; MAX_LITLEN_SYMBOLS];
        let mut freq_dist = [0u64; MAX_DIST_SYMBOLS];
        let mut extra_bits_total = 0u64;
        for token in tokens {
            match *token {
                Token::Literal(b) => freq_litlen[b as usize] += 1,
                Token::Match { length, distance } => {
                    let (lsym, lextra_bits, _) = Self::length_symbol(length);
                    freq_litlen[lsym as usize] += 1;
                    extra_bits_total += lextra_bits as u64;
                    let (dsym, dextra_bits, _) = Self::distance_symbol(distance);
                    freq_dist[dsym as usize] += 1;
                    extra_bits_total += dextra_bits as u64;
                }
            }
        }
        freq_litlen[END_OF_BLOCK as usize] += 1;
        (freq_litlen, freq_dist, extra_bits_total)
    }

    /// Exact bit cost of encoding `tokens` with the fixed Huffman tables.
    fn fixed_block_bits(
        freq_litlen: &[u64; MAX_LITLEN_SYMBOLS],
        freq_dist: &[u64; MAX_DIST_SYMBOLS],
        extra_bits_total: u64,
    ) -> u64 {
        let litlen_lengths = crate::deflate::tables::fixed_litlen_lengths();
        let dist_lengths = crate::deflate::tables::fixed_dist_lengths();
        let mut bits = extra_bits_total;
        for (sym, &f) in freq_litlen.iter().enumerate() {
            bits += f * litlen_lengths[sym] as u64;
        }
        for (sym, &f) in freq_dist.iter().enumerate() {
            bits += f * dist_lengths[sym] as u64;
        }
        bits
    }

    /// RFC 1951 §3.2.7 run-length encoding of a combined litlen+dist code
    /// length vector into code-length-alphabet actions: `(symbol,
    /// extra_bits, extra_value)`, where `symbol` in `0..=15` is a literal
    /// length and 16/17/18 are the repeat codes.
    fn rle_encode_lengths(lengths: &[u8]) -> Vec<(u8, u8, u16)> {
        let mut actions = Vec::new();
        let mut i = 0;
        while i < lengths.len() {
            let value = lengths[i];
            let mut run = 1;
            while i + run < lengths.len() && lengths[i + run] == value {
                run += 1;
            }
            if value == 0 {
                let mut remaining = run;
                while remaining >= 11 {
                    let take = remaining.min(138);
                    actions.push((18u8, 7u8, (take - 11) as u16));
                    remaining -= take;
                }
                while remaining >= 3 {
                    let take = remaining.min(10);
                    actions.push((17u8, 3u8, (take - 3) as u16));
                    remaining -= take;
                }
                while remaining > 0 {
                    actions.push((0u8, 0u8, 0u16));
                    remaining -= 1;
                }
            } else {
                actions.push((value, 0, 0));
                let mut remaining = run - 1;
                while remaining >= 3 {
                    let take = remaining.min(6);
                    actions.push((16u8, 2u8, (take - 3) as u16));
                    remaining -= take;
                }
                while remaining > 0 {
                    actions.push((value, 0, 0));
                    remaining -= 1;
                }
            }
            i += run;
        }
        actions
    }

    /// Builds a dynamic-Huffman block plan for `tokens`: code-length
    /// vectors for the litlen/dist alphabets, the code-length sub-alphabet
    /// that encodes them, and the total bit cost of emitting it all.
    fn plan_dynamic_block(
        freq_litlen: &[u64; MAX_LITLEN_SYMBOLS],
        freq_dist: &[u64; MAX_DIST_SYMBOLS],
        extra_bits_total: u64,
    ) -> DynamicPlan {
        let mut dist_freq_for_huffman = *freq_dist;
        if dist_freq_for_huffman.iter().all(|&f| f == 0) {
            // RFC 1951 requires at least one distance code even when no
            // match ever uses one; give symbol 0 a dummy count so the
            // length-limited builder still produces a valid single code.
            dist_freq_for_huffman[0] = 1;
        }
        let litlen_lengths = build_length_limited_lengths(freq_litlen, 15);
        let dist_lengths = build_length_limited_lengths(&dist_freq_for_huffman, 15);

        let hlit = litlen_lengths.iter().rposition(|&l| l != 0).map_or(257, |i| i + 1).max(257);
        let hdist = dist_lengths.iter().rposition(|&l| l != 0).map_or(1, |i| i + 1).max(1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let actions = Self::rle_encode_lengths(&combined);

        let mut cl_freq = [0u64; MAX_CL_SYMBOLS];
        for &(symbol, _, _) in &actions {
            cl_freq[symbol as usize] += 1;
        }
        let cl_lengths = build_length_limited_lengths(&cl_freq, 7);
        let hclen = CL_ORDER
            .iter()
            .rposition(|&sym| cl_lengths[sym as usize] != 0)
            .map_or(4, |i| i + 1)
            .max(4);
        let cl_codes = huffman::build_codes(&cl_lengths, 7);

        let mut bits = 14 + (hclen as u64) * 3;
        for &(symbol, extra_bits, _) in &actions {
            bits += cl_lengths[symbol as usize] as u64 + extra_bits as u64;
        }
        bits += extra_bits_total;
        for (sym, &f) in freq_litlen.iter().enumerate() {
            bits += f * litlen_lengths[sym] as u64;
        }
        for (sym, &f) in freq_dist.iter().enumerate() {
            bits += f * dist_lengths[sym] as u64;
        }

        DynamicPlan { litlen_lengths, dist_lengths, hlit, hdist, hclen, cl_lengths, cl_codes, actions, bits }
    }

    /// Number of zero-bits needed to realign to a byte boundary after
    /// writing `extra_bits` more bits from the current accumulator state.
    fn stored_padding_bits(&self, extra_bits: u32) -> u32 {
        (8 - ((self.bitw.acc_bits() as u32 + extra_bits) % 8)) % 8
    }

    /// Encodes `data` as one complete DEFLATE block, picking whichever of
    /// stored, fixed-Huffman, or dynamic-Huffman costs fewest bits (level 0
    /// always emits stored, per its "compress nothing" contract).
    fn emit_block(&mut self, data: &[u8], is_final: bool) {
        if self.level == 0 {
            self.emit_stored_block(data, is_final);
            return;
        }
        let tokens = self.tokenize(data);
        let (freq_litlen, freq_dist, extra_bits_total) = Self::tally(&tokens);
        let fixed_bits = Self::fixed_block_bits(&freq_litlen, &freq_dist, extra_bits_total);
        let dynamic_plan = Self::plan_dynamic_block(&freq_litlen, &freq_dist, extra_bits_total);
        let stored_bits = self.stored_padding_bits(3) as u64 + 32 + data.len() as u64 * 8;

        if stored_bits <= fixed_bits && stored_bits <= dynamic_plan.bits {
            self.write_stored_bits(data, is_final);
        } else if fixed_bits <= dynamic_plan.bits {
            self.write_fixed_block(&tokens, is_final);
        } else {
            self.write_dynamic_block(&tokens, &dynamic_plan, is_final);
        }
    }

    fn write_fixed_block(&mut self, tokens: &[Token], is_final: bool) {
        let litlen_lengths = crate::deflate::tables::fixed_litlen_lengths();
        let dist_lengths = crate::deflate::tables::fixed_dist_lengths();
        let litlen_codes = huffman::build_codes(&litlen_lengths, 9);
        let dist_codes = huffman::build_codes(&dist_lengths, 5);

        self.bitw.write_bits(is_final as u32, 1);
        self.bitw.write_bits(1, 2); // BTYPE = fixed Huffman

        let write_sym = |bitw: &mut BitWriterVec, sym: usize| {
            let len = litlen_lengths[sym] as u32;
            let code = litlen_codes[sym] as u32;
            bitw.write_bits(bit_reverse(code, len), len);
        };

        for token in tokens {
            match *token {
                Token::Literal(b) => write_sym(&mut self.bitw, b as usize),
                Token::Match { length, distance } => {
                    let (lsym, lextra_bits, lextra) = Self::length_symbol(length);
                    write_sym(&mut self.bitw, lsym as usize);
                    if lextra_bits > 0 {
                        self.bitw.write_bits(lextra as u32, lextra_bits as u32);
                    }
                    let (dsym, dextra_bits, dextra) = Self::distance_symbol(distance);
                    let dlen = dist_lengths[dsym as usize] as u32;
                    let dcode = dist_codes[dsym as usize] as u32;
                    self.bitw.write_bits(bit_reverse(dcode as u32, dlen), dlen);
                    if dextra_bits > 0 {
                        self.bitw.write_bits(dextra as u32, dextra_bits as u32);
                    }
                }
            }
        }
        write_sym(&mut self.bitw, END_OF_BLOCK as usize);
        if is_final {
            self.bitw.flush_to_byte();
        }
    }

    fn write_dynamic_block(&mut self, tokens: &[Token], plan: &DynamicPlan, is_final: bool) {
        let litlen_codes = huffman::build_codes(&plan.litlen_lengths, 15);
        let dist_codes = huffman::build_codes(&plan.dist_lengths, 15);

        self.bitw.write_bits(is_final as u32, 1);
        self.bitw.write_bits(2, 2); // BTYPE = dynamic Huffman

        self.bitw.write_bits(
            (plan.hlit as u32 - 257) | ((plan.hdist as u32 - 1) << 5) | ((plan.hclen as u32 - 4) << 10),
            14,
        );
        for i in 0..plan.hclen {
            let sym = CL_ORDER[i] as usize;
            self.bitw.write_bits(plan.cl_lengths[sym] as u32, 3);
        }
        for &(symbol, extra_bits, extra_val) in &plan.actions {
            let len = plan.cl_lengths[symbol as usize] as u32;
            let code = plan.cl_codes[symbol as usize] as u32;
            self.bitw.write_bits(bit_reverse(code, len), len);
            if extra_bits > 0 {
                self.bitw.write_bits(extra_val as u32, extra_bits as u32);
            }
        }

        let write_sym = |bitw: &mut BitWriterVec, sym: usize| {
            let len = plan.litlen_lengths[sym] as u32;
            let code = litlen_codes[sym] as u32;
            bitw.write_bits(bit_reverse(code, len), len);
        };
        for token in tokens {
            match *token {
                Token::Literal(b) => write_sym(&mut self.bitw, b as usize),
                Token::Match { length, distance } => {
                    let (lsym, lextra_bits, lextra) = Self::length_symbol(length);
                    write_sym(&mut self.bitw, lsym as usize);
                    if lextra_bits > 0 {
                        self.bitw.write_bits(lextra as u32, lextra_bits as u32);
                    }
                    let (dsym, dextra_bits, dextra) = Self::distance_symbol(distance);
                    let dlen = plan.dist_lengths[dsym as usize] as u32;
                    let dcode = dist_codes[dsym as usize] as u32;
                    self.bitw.write_bits(bit_reverse(dcode as u32, dlen), dlen);
                    if dextra_bits > 0 {
                        self.bitw.write_bits(dextra as u32, dextra_bits as u32);
                    }
                }
            }
        }
        write_sym(&mut self.bitw, END_OF_BLOCK as usize);
        if is_final {
            self.bitw.flush_to_byte();
        }
    }

    /// Writes a stored block's bits without touching `window`/`stream_pos`
    /// — used when `tokenize` (called to weigh it against fixed/dynamic
    /// candidates) has already advanced them for this data.
    fn write_stored_bits(&mut self, data: &[u8], is_final: bool) {
        // A stored block's payload is capped at 65535 bytes; BLOCK_SIZE is
        // well under that, so one call always covers a whole block.
        self.bitw.write_bits(is_final as u32, 1);
        self.bitw.write_bits(0, 2);
        self.bitw.flush_to_byte();
        let len = data.len() as u32;
        self.bitw.write_bits(len & 0xFFFF, 16);
        self.bitw.write_bits((!len) & 0xFFFF, 16);
        for &b in data {
            self.bitw.write_bits(b as u32, 8);
        }
        if is_final {
            self.bitw.flush_to_byte();
        }
    }

    fn emit_stored_block(&mut self, data: &[u8], is_final: bool) {
        self.write_stored_bits(data, is_final);
        self.window.push_slice(data);
        self.stream_pos += data.len() as u64;
    }

    fn drain(&mut self, output: &mut OutBuf<'_>) -> bool {
        if self.delivered < self.bitw.buf.len() {
            let n = output.push_from(&self.bitw.buf[self.delivered..]);
            self.delivered += n;
            self.total_out += n as u64;
        }
        if self.delivered == self.bitw.buf.len() {
            self.bitw.buf.clear();
            self.delivered = 0;
            true
        } else {
            false
        }
    }
}

impl EncoderImpl for DeflateEncoder {
    fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        loop {
            if !self.drain(output) {
                return Ok(());
            }
            if output.is_full() {
                return Ok(());
            }
            if input.is_empty() {
                return Ok(());
            }
            let avail = input.remaining();
            let take = (BLOCK_SIZE - self.pending_in.len()).min(avail.len());
            self.pending_in.extend_from_slice(&avail[..take]);
            input.used += take;
            self.total_in += take as u64;
            if self.pending_in.len() >= BLOCK_SIZE {
                let block = std::mem::replace(&mut self.pending_in, Vec::with_capacity(BLOCK_SIZE));
                self.emit_block(&block, false);
                self.limits.check_expansion(self.total_in, self.total_out + self.bitw.buf.len() as u64)?;
            }
        }
    }

    fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<FinishStatus> {
        if !self.final_emitted {
            let block = std::mem::take(&mut self.pending_in);
            self.emit_block(&block, true);
            self.final_emitted = true;
        }
        if self.drain(output) {
            self.finished = true;
            self.limits.check_output(self.total_out)?;
            Ok(FinishStatus::Done)
        } else {
            Ok(FinishStatus::NeedMoreOutput)
        }
    }

    fn reset(&mut self) -> Result<()> {
        let level = self.level;
        let limits = self.limits;
        *self = Self::new(level, limits)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deflate::decoder::DeflateDecoder;
    use crate::limits::Limits;

    fn limits() -> Limits {
        Limits::unlimited(MAX_DISTANCE as u64)
    }

    fn roundtrip(data: &[u8], level: u8) -> Vec<u8> {
        let mut enc = DeflateEncoder::new(level, limits()).unwrap();
        let mut compressed = Vec::new();
        let mut pos = 0;
        loop {
            let mut input = InBuf::new(&data[pos..]);
            let mut out = [0u8; 256];
            let mut output = OutBuf::new(&mut out);
            enc.update(&mut input, &mut output).unwrap();
            pos += input.used;
            compressed.extend_from_slice(&out[..output.used]);
            if pos >= data.len() {
                break;
            }
        }
        loop {
            let mut out = [0u8; 256];
            let mut output = OutBuf::new(&mut out);
            let status = enc.finish(&mut output).unwrap();
            compressed.extend_from_slice(&out[..output.used]);
            if status == FinishStatus::Done {
                break;
            }
        }

        let mut dec = DeflateDecoder::new(limits()).unwrap();
        let mut decoded = Vec::new();
        let mut input = InBuf::new(&compressed);
        loop {
            let mut out = [0u8; 256];
            let mut output = OutBuf::new(&mut out);
            dec.update(&mut input, &mut output).unwrap();
            decoded.extend_from_slice(&out[..output.used]);
            if input.is_empty() && output.used < out.len() {
                break;
            }
        }
        let mut out = [0u8; 256];
        let mut output = OutBuf::new(&mut out);
        dec.finish(&mut output).unwrap();
        decoded.extend_from_slice(&out[..output.used]);
        decoded
    }

    #[test]
    fn roundtrip_empty() {
        assert_eq!(roundtrip(b"", 6), b"");
    }

    #[test]
    fn roundtrip_small_literal_only() {
        assert_eq!(roundtrip(b"xyz", 6), b"xyz");
    }

    #[test]
    fn roundtrip_repetitive_text_compresses() {
        let data = "the quick brown fox jumps over the lazy dog. ".repeat(200);
        let decoded = roundtrip(data.as_bytes(), 6);
        assert_eq!(decoded, data.as_bytes());
    }

    #[test]
    fn roundtrip_level_zero_is_stored_only() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        assert_eq!(roundtrip(data, 0), data);
    }

    #[test]
    fn roundtrip_spans_multiple_blocks() {
        let data: Vec<u8> = (0..(BLOCK_SIZE * 3 + 123)).map(|i| (i % 251) as u8).collect();
        assert_eq!(roundtrip(&data, 6), data);
    }

    #[test]
    fn roundtrip_binary_with_runs() {
        let mut data = Vec::new();
        for i in 0..5000u32 {
            data.push((i % 7) as u8);
        }
        assert_eq!(roundtrip(&data, 9), data);
    }

    #[test]
    fn roundtrip_skewed_frequencies_selects_dynamic_block() {
        // 'a' overwhelmingly common, a handful of rare bytes scattered in —
        // dynamic Huffman's per-block code beats the fixed table here.
        let mut data = vec![b'a'; 4000];
        for (i, b) in data.iter_mut().enumerate().step_by(37) {
            *b = (i % 256) as u8;
        }
        let mut enc = DeflateEncoder::new(9, limits()).unwrap();
        let tokens = enc.tokenize(&data);
        let (freq_litlen, freq_dist, extra_bits_total) = DeflateEncoder::tally(&tokens);
        let fixed_bits = DeflateEncoder::fixed_block_bits(&freq_litlen, &freq_dist, extra_bits_total);
        let dynamic_plan = DeflateEncoder::plan_dynamic_block(&freq_litlen, &freq_dist, extra_bits_total);
        assert!(dynamic_plan.bits < fixed_bits, "dynamic {} should beat fixed {}", dynamic_plan.bits, fixed_bits);
        assert_eq!(roundtrip(&data, 9), data);
    }

    #[test]
    fn roundtrip_incompressible_data_may_select_stored() {
        let data: Vec<u8> = (0..200u32).map(|i| (i.wrapping_mul(167) % 256) as u8).collect();
        assert_eq!(roundtrip(&data, 6), data);
    }
}
