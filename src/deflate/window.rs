//! A 32 KiB ring buffer recording the most recently produced bytes.
//!
//! Both sides of DEFLATE need this: the encoder searches it for LZ77
//! matches against data it has already consumed, and the decoder replays
//! it to resolve length/distance back-references, including references
//! that reach into output already handed back to the caller in a prior
//! `update()` call.

use crate::deflate::tables::MAX_DISTANCE;
use crate::error::{err, ErrorKind, Result};

pub struct SlidingWindow {
    buf: Box<[u8; MAX_DISTANCE]>,
    write_pos: usize,
    filled: usize,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self { buf: Box::new([0u8; MAX_DISTANCE]), write_pos: 0, filled: 0 }
    }

    pub fn history_len(&self) -> usize {
        self.filled
    }

    pub fn push(&mut self, byte: u8) {
        self.buf[self.write_pos] = byte;
        self.write_pos = (self.write_pos + 1) % MAX_DISTANCE;
        if self.filled < MAX_DISTANCE {
            self.filled += 1;
        }
    }

    pub fn push_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// The byte `distance` positions before the write cursor (`distance ==
    /// 1` is the most recently pushed byte).
    fn byte_at_distance(&self, distance: usize) -> u8 {
        let idx = (self.write_pos + MAX_DISTANCE - distance) % MAX_DISTANCE;
        self.buf[idx]
    }

    /// Resolves and records a single back-referenced byte at `distance`.
    /// The building block `copy_match` and the decoder's byte-at-a-time
    /// `Copy` stage are both built on this.
    pub fn copy_one(&mut self, distance: usize) -> Result<u8> {
        if distance == 0 || distance > MAX_DISTANCE {
            return Err(err(
                ErrorKind::Corrupt,
                format_args!("deflate: back-reference distance {distance} out of range"),
            ));
        }
        if distance > self.filled {
            return Err(err(
                ErrorKind::Corrupt,
                format_args!(
                    "deflate: back-reference distance {distance} exceeds {} bytes of history",
                    self.filled
                ),
            ));
        }
        let b = self.byte_at_distance(distance);
        self.push(b);
        Ok(b)
    }

    /// Replays a length/distance back-reference, writing `length` bytes to
    /// `sink` (and recording them into the window as they're produced, so
    /// overlapping copies with `distance < length` reproduce the standard
    /// run-length behavior). `sink` receives one byte at a time via the
    /// supplied closure so callers can target either an `OutBuf` or a plain
    /// `Vec<u8>`.
    pub fn copy_match(
        &mut self,
        distance: usize,
        length: usize,
        mut sink: impl FnMut(u8) -> Result<()>,
    ) -> Result<()> {
        for _ in 0..length {
            let b = self.copy_one(distance)?;
            sink(b)?;
        }
        Ok(())
    }

    /// Search helper for the encoder: byte at absolute offset `distance`
    /// back from the cursor, without mutating anything. Panics if
    /// `distance` exceeds recorded history; callers are expected to bound
    /// `distance` by `history_len()` first.
    pub fn peek_at_distance(&self, distance: usize) -> u8 {
        debug_assert!(distance >= 1 && distance <= self.filled);
        self.byte_at_distance(distance)
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_match_overlapping_distance_one_is_run_length() {
        let mut w = SlidingWindow::new();
        w.push(b'A');
        let mut out = Vec::new();
        w.copy_match(1, 5, |b| {
            out.push(b);
            Ok(())
        })
        .unwrap();
        assert_eq!(out, b"AAAAA");
    }

    #[test]
    fn copy_match_non_overlapping_reproduces_slice() {
        let mut w = SlidingWindow::new();
        w.push_slice(b"abcdef");
        let mut out = Vec::new();
        w.copy_match(6, 3, |b| {
            out.push(b);
            Ok(())
        })
        .unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn distance_beyond_history_is_corrupt() {
        let mut w = SlidingWindow::new();
        w.push_slice(b"ab");
        let e = w.copy_match(5, 1, |_| Ok(())).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn wraps_around_ring_buffer() {
        let mut w = SlidingWindow::new();
        for i in 0..(MAX_DISTANCE + 10) {
            w.push((i % 256) as u8);
        }
        assert_eq!(w.history_len(), MAX_DISTANCE);
        // The most recent byte pushed was (MAX_DISTANCE + 9) % 256.
        assert_eq!(w.peek_at_distance(1), ((MAX_DISTANCE + 9) % 256) as u8);
    }
}
