//! RFC 1952 constants: the two magic bytes, the compression-method byte,
//! and the FLG bit layout.

pub const ID1: u8 = 0x1f;
pub const ID2: u8 = 0x8b;
/// The only compression method RFC 1952 defines: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

pub const FLG_FTEXT: u8 = 0x01;
pub const FLG_FHCRC: u8 = 0x02;
pub const FLG_FEXTRA: u8 = 0x04;
pub const FLG_FNAME: u8 = 0x08;
pub const FLG_FCOMMENT: u8 = 0x10;
/// Bits 5..7 of FLG are reserved and must be zero; a stricter reader could
/// reject a nonzero value here, but real-world encoders occasionally set
/// them, so this implementation ignores them like zlib does.
pub const FLG_RESERVED_MASK: u8 = 0xE0;
