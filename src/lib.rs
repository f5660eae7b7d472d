//! A streaming, in-process compression library: a pluggable codec registry
//! plus DEFLATE (RFC 1951) and its GZIP (RFC 1952) wrapper.
//!
//! Every encoder/decoder is driven through the same `update`/`finish`
//! lifecycle over paired `InBuf`/`OutBuf` cursors, regardless of how much
//! input or output space a single call is given — restartability is a
//! first-class property of every state machine in this crate, not a special
//! case.

pub mod buffer;
pub mod convenience;
pub mod crc32;
pub mod defaults;
pub mod deflate;
pub mod error;
pub mod gzip;
pub mod limits;
pub mod method;
pub mod options;
pub mod registry;
pub mod stream;

pub use buffer::{InBuf, OutBuf};
pub use convenience::{compress_to_vec, copy_with, decompress_to_vec};
pub use error::{CodecError, ErrorKind, Result};
pub use limits::Limits;
pub use method::{Capabilities, DecoderImpl, EncoderImpl, FinishStatus, Method};
pub use options::{OptionSpec, OptionType, OptionValue, Options};
pub use registry::Registry;
pub use stream::{Decoder, Encoder};

pub use deflate::method::DeflateMethod;
pub use gzip::method::GzipMethod;
