//! The method descriptor contract: a name-keyed, capability-bitted trait
//! implemented once per codec.
//!
//! The distilled spec models a method descriptor as a C vtable (function
//! pointers for encoder/decoder factories, destroy hooks, an optional schema
//! accessor). Design Notes §9 calls out that the idiomatic Rust realization
//! is a trait implemented per method rather than an enum of variants or a
//! struct of function pointers — that is what `Method` is here. Destroy
//! hooks are not part of the trait: `Box<dyn EncoderImpl>`/`Box<dyn
//! DecoderImpl>` release their resources via `Drop`, which is the idiomatic
//! substitute for an explicit destroy callback (see DESIGN.md).

use crate::buffer::{InBuf, OutBuf};
use crate::error::Result;
use crate::options::{MethodSchema, Options};
use crate::registry::Registry;

/// Which directions a method supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub encode: bool,
    pub decode: bool,
}

/// Outcome of a `finish` call on an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishStatus {
    /// All remaining bytes were flushed; the stream is complete.
    Done,
    /// The output buffer could not hold everything still pending; call
    /// `finish` again with more output space. This MUST be a supported
    /// path per the DEFLATE encoder's component design.
    NeedMoreOutput,
}

/// Method-private encoder state plus its `update`/`finish`/`reset` lifecycle.
pub trait EncoderImpl: Send {
    fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()>;
    fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<FinishStatus>;

    /// Returns the instance to its post-create state. Methods that don't
    /// support reset should return `Unsupported` (the default here is to
    /// report exactly that).
    fn reset(&mut self) -> Result<()> {
        Err(crate::error::err_bare(crate::error::ErrorKind::Unsupported))
    }
}

/// Method-private decoder state plus its `update`/`finish`/`reset` lifecycle.
pub trait DecoderImpl: Send {
    fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()>;

    /// Returns `Ok(())` iff the stream reached its terminal "done" state.
    /// Otherwise returns an error (typically `Corrupt`, for a truncated
    /// stream, or `Limit`). Implementations track completion with an
    /// explicit `is_done()`-style bit rather than a failing probe call (see
    /// DESIGN.md's resolution of the corresponding open question).
    fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<()>;

    fn reset(&mut self) -> Result<()> {
        Err(crate::error::err_bare(crate::error::ErrorKind::Unsupported))
    }
}

/// A registered compression method: a name, its capabilities, an optional
/// option schema, and factories that build encoder/decoder instances.
pub trait Method: Send + Sync {
    fn name(&self) -> &'static str;
    fn capabilities(&self) -> Capabilities;

    /// `None` means "no schema is enforced" (the unknown-key policy is moot).
    fn schema(&self) -> Option<&'static MethodSchema> {
        None
    }

    /// Builds a fully-initialized encoder. The distilled spec's "factory may
    /// substitute the caller-allocated base instance" ownership dance is
    /// replaced by simply returning the boxed instance (Design Notes §9's
    /// suggested re-architecture).
    fn new_encoder(&self, registry: &Registry, options: &Options) -> Result<Box<dyn EncoderImpl>>;

    /// Builds a fully-initialized decoder.
    fn new_decoder(&self, registry: &Registry, options: &Options) -> Result<Box<dyn DecoderImpl>>;
}
