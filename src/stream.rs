//! Stream core: encoder/decoder lifecycle, dispatch, and the error channel.
//!
//! Mirrors the relationship between the teacher's `block::stream::Lz4Stream`
//! (a thin owning wrapper with RAII cleanup standing in for
//! `LZ4_createStream`/`LZ4_freeStream`) and the method-specific state it
//! wraps, generalized from one fixed codec to any registered [`Method`].

use std::sync::Arc;

use crate::buffer::{InBuf, OutBuf};
use crate::error::{err, CodecError, ErrorKind, Result};
use crate::method::{DecoderImpl, EncoderImpl, FinishStatus, Method};
use crate::options::{validate, Options};
use crate::registry::Registry;

/// A live encoding stream bound to one method. `'r` ties the stream to the
/// registry it was created from, mirroring the spec's "back-pointer to
/// registry (for allocator access and for wrappers to resolve inner
/// methods)".
pub struct Encoder<'r> {
    registry: &'r Registry,
    method: Arc<dyn Method>,
    inner: Box<dyn EncoderImpl>,
    last_error: Option<CodecError>,
    done: bool,
}

impl<'r> std::fmt::Debug for Encoder<'r> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("method", &self.method.name())
            .field("has_error", &self.last_error.is_some())
            .field("done", &self.done)
            .finish()
    }
}

impl<'r> Encoder<'r> {
    /// Equivalent to `encoder_create`: looks up `name`, checks the `encode`
    /// capability, validates `options` against the method's schema (if any),
    /// and builds the method-private state.
    pub fn create(registry: &'r Registry, name: &str, options: &Options) -> Result<Self> {
        let method = registry.find(name).ok_or_else(|| {
            err(ErrorKind::Unsupported, format_args!("no such method: '{}'", name))
        })?;
        if !method.capabilities().encode {
            return Err(err(
                ErrorKind::Unsupported,
                format_args!("method '{}' does not support encoding", name),
            ));
        }
        if let Some(schema) = method.schema() {
            validate(options, schema)?;
        }
        let inner = method.new_encoder(registry, options)?;
        Ok(Self { registry, method, inner, last_error: None, done: false })
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    /// The detail of the last error this stream produced, if any.
    pub fn last_error(&self) -> Option<&CodecError> {
        self.last_error.as_ref()
    }

    fn terminal_error(&self) -> Option<CodecError> {
        self.last_error.clone()
    }

    /// Advances `input`/`output` via the method. A stream that already
    /// recorded a terminal error returns that same error again without
    /// touching the buffers or mutating any counters.
    pub fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        if let Some(e) = self.terminal_error() {
            return Err(e);
        }
        match self.inner.update(input, output) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Flushes remaining state to `output`. Monotone: once `Done` has been
    /// returned, subsequent calls are a no-op success.
    pub fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<FinishStatus> {
        if self.done {
            return Ok(FinishStatus::Done);
        }
        if let Some(e) = self.terminal_error() {
            return Err(e);
        }
        match self.inner.finish(output) {
            Ok(FinishStatus::Done) => {
                self.done = true;
                Ok(FinishStatus::Done)
            }
            Ok(FinishStatus::NeedMoreOutput) => Ok(FinishStatus::NeedMoreOutput),
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Clears the error channel and asks the method to reset. Returns
    /// `Unsupported` if the method has no reset hook.
    pub fn reset(&mut self) -> Result<()> {
        self.inner.reset()?;
        self.last_error = None;
        self.done = false;
        Ok(())
    }
}

/// A live decoding stream bound to one method. Symmetric to [`Encoder`].
pub struct Decoder<'r> {
    registry: &'r Registry,
    method: Arc<dyn Method>,
    inner: Box<dyn DecoderImpl>,
    last_error: Option<CodecError>,
    done: bool,
}

impl<'r> Decoder<'r> {
    pub fn create(registry: &'r Registry, name: &str, options: &Options) -> Result<Self> {
        let method = registry.find(name).ok_or_else(|| {
            err(ErrorKind::Unsupported, format_args!("no such method: '{}'", name))
        })?;
        if !method.capabilities().decode {
            return Err(err(
                ErrorKind::Unsupported,
                format_args!("method '{}' does not support decoding", name),
            ));
        }
        if let Some(schema) = method.schema() {
            validate(options, schema)?;
        }
        let inner = method.new_decoder(registry, options)?;
        Ok(Self { registry, method, inner, last_error: None, done: false })
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    pub fn last_error(&self) -> Option<&CodecError> {
        self.last_error.as_ref()
    }

    fn terminal_error(&self) -> Option<CodecError> {
        self.last_error.clone()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn update(&mut self, input: &mut InBuf<'_>, output: &mut OutBuf<'_>) -> Result<()> {
        if let Some(e) = self.terminal_error() {
            return Err(e);
        }
        match self.inner.update(input, output) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Monotone: once the stream has reached `Done`, subsequent calls are a
    /// no-op success.
    pub fn finish(&mut self, output: &mut OutBuf<'_>) -> Result<()> {
        if self.done {
            return Ok(());
        }
        if let Some(e) = self.terminal_error() {
            return Err(e);
        }
        match self.inner.finish(output) {
            Ok(()) => {
                self.done = true;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn reset(&mut self) -> Result<()> {
        self.inner.reset()?;
        self.last_error = None;
        self.done = false;
        Ok(())
    }
}
