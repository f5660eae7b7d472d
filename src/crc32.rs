//! Table-driven CRC32 (IEEE 802.3 polynomial, reflected form), used as the
//! GZIP trailer checksum. Plays the same role for GZIP that
//! `xxh32_oneshot`/`Xxh32State` play for the LZ4 frame format in the teacher
//! crate — a standalone checksum module used only by the wrapper format —
//! but is implemented directly rather than wrapping a crate, per the
//! component design's "table-driven" requirement.

const POLY: u32 = 0xEDB8_8320;

const fn build_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0usize;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLY ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

static TABLE: [u32; 256] = build_table();

/// Initial accumulator value, equivalent to the spec's `init`.
pub const fn init() -> u32 {
    0xFFFF_FFFF
}

/// Folds `buf` into a running (non-finalized) CRC accumulator. Associative
/// across chunking: `update(update(init(), a), b) == update(init(), a ++ b)`.
pub fn update(crc: u32, buf: &[u8]) -> u32 {
    let mut c = crc;
    for &b in buf {
        let idx = ((c ^ b as u32) & 0xFF) as usize;
        c = TABLE[idx] ^ (c >> 8);
    }
    c
}

/// Finalizes a running accumulator into the externally visible CRC32 value.
pub const fn finalize(crc: u32) -> u32 {
    crc ^ 0xFFFF_FFFF
}

/// One-shot CRC32 over a complete buffer.
pub fn crc32(buf: &[u8]) -> u32 {
    finalize(update(init(), buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn known_vector() {
        // Standard reference vector used throughout zlib/gzip test suites.
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn hello_matches_gzip_scenario_vector() {
        assert_eq!(crc32(b"hello"), 0x3610_A686);
    }

    #[test]
    fn incremental_update_is_associative() {
        let data = b"The quick brown fox jumps over the lazy dog";
        let whole = crc32(data);
        for split in 0..=data.len() {
            let (a, b) = data.split_at(split);
            let mut c = init();
            c = update(c, a);
            c = update(c, b);
            assert_eq!(finalize(c), whole, "split at {split}");
        }
    }
}
