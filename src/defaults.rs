// defaults.rs — compile-time configuration constants.
//
// Mirrors the provenance-commented style of the teacher crate's
// src/config.rs, collecting the "standard default" values referenced by
// option schemas and factory functions in one place instead of scattering
// bare literals across deflate::method and gzip::method.

/// Default `deflate.level` when the caller doesn't set one. RFC 1951
/// doesn't define levels; this mirrors zlib's Z_DEFAULT_COMPRESSION
/// convention of picking a mid-range effort rather than either extreme.
pub const LEVEL_DEFAULT: u8 = 6;

/// Compression effort at or above which the encoder reports XFL = 2
/// ("maximum compression, slowest algorithm") in a GZIP header, derived
/// from `deflate.level`, per RFC 1952 §2.3.1.
pub const LEVEL_MAX_EFFORT_THRESHOLD: u8 = 6;

/// Compression effort at or below which the encoder reports XFL = 4
/// ("fastest algorithm") in a GZIP header, derived from `deflate.level`,
/// per RFC 1952 §2.3.1.
pub const LEVEL_FASTEST_THRESHOLD: u8 = 2;

pub use crate::deflate::tables::MAX_DISTANCE as WINDOW_BYTES_DEFAULT;
pub use crate::limits::{
    DEFAULT_MAX_EXPANSION_RATIO, DEFAULT_MAX_MEMORY_BYTES, DEFAULT_MAX_OUTPUT_BYTES,
};
