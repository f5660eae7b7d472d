//! Name-keyed method registry.
//!
//! Grounded on the in-memory, name-keyed registry pattern used across the
//! retrieval pack (e.g. `hdds-schema-registry`'s `SchemaRegistry`: a
//! `HashMap` behind a small owning struct with `Display`/`Error`-impl
//! errors) generalized from a versioned-entry store to a single-entry,
//! idempotent-registration store as the spec requires.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::deflate::method::DeflateMethod;
use crate::error::{err, ErrorKind, Result};
use crate::gzip::method::GzipMethod;
use crate::method::Method;

/// A mapping from method name to method descriptor. Safe for concurrent
/// readers once all registrations have settled; registration itself
/// serializes through an internal lock (the spec only requires concurrent
/// *lookups* to be safe).
pub struct Registry {
    methods: RwLock<HashMap<String, Arc<dyn Method>>>,
}

impl Registry {
    /// An empty registry with no methods pre-registered. Equivalent to the
    /// spec's `create(allocator?)` minus the allocator parameter (the
    /// allocator abstraction is an excluded external collaborator).
    pub fn new() -> Self {
        Self { methods: RwLock::new(HashMap::new()) }
    }

    /// Registers `method`. Registering an already-present name is success
    /// with no replacement (idempotent), matching the spec exactly.
    pub fn register(&self, method: Arc<dyn Method>) -> Result<()> {
        let mut guard = self.methods.write().map_err(|_| {
            err(ErrorKind::Internal, format_args!("registry lock poisoned"))
        })?;
        guard.entry(method.name().to_string()).or_insert(method);
        Ok(())
    }

    /// Looks up a method by exact (byte-for-byte) name match.
    pub fn find(&self, name: &str) -> Option<Arc<dyn Method>> {
        self.methods.read().ok()?.get(name).cloned()
    }

    /// The process-global default registry, lazily populated on first
    /// access with the "deflate" and "gzip" methods. Never destroyed —
    /// the distilled spec's `destroy(registry)` is a documented no-op for
    /// the default registry; Rust's ownership model makes an explicit
    /// destroy call on a `&'static` singleton meaningless, so it is not
    /// exposed as a function here (see DESIGN.md).
    pub fn default() -> &'static Registry {
        static DEFAULT: OnceLock<Registry> = OnceLock::new();
        DEFAULT.get_or_init(|| {
            let registry = Registry::new();
            registry
                .register(Arc::new(DeflateMethod))
                .expect("registering the built-in deflate method cannot fail");
            registry
                .register(Arc::new(GzipMethod))
                .expect("registering the built-in gzip method cannot fail");
            registry
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::{Capabilities, DecoderImpl, EncoderImpl, FinishStatus};
    use crate::options::Options;

    struct NoopMethod;
    struct NoopEncoder;
    struct NoopDecoder;

    impl EncoderImpl for NoopEncoder {
        fn update(&mut self, _i: &mut crate::buffer::InBuf<'_>, _o: &mut crate::buffer::OutBuf<'_>) -> Result<()> {
            Ok(())
        }
        fn finish(&mut self, _o: &mut crate::buffer::OutBuf<'_>) -> Result<FinishStatus> {
            Ok(FinishStatus::Done)
        }
    }
    impl DecoderImpl for NoopDecoder {
        fn update(&mut self, _i: &mut crate::buffer::InBuf<'_>, _o: &mut crate::buffer::OutBuf<'_>) -> Result<()> {
            Ok(())
        }
        fn finish(&mut self, _o: &mut crate::buffer::OutBuf<'_>) -> Result<()> {
            Ok(())
        }
    }
    impl Method for NoopMethod {
        fn name(&self) -> &'static str {
            "noop"
        }
        fn capabilities(&self) -> Capabilities {
            Capabilities { encode: true, decode: true }
        }
        fn new_encoder(&self, _r: &Registry, _o: &Options) -> Result<Box<dyn EncoderImpl>> {
            Ok(Box::new(NoopEncoder))
        }
        fn new_decoder(&self, _r: &Registry, _o: &Options) -> Result<Box<dyn DecoderImpl>> {
            Ok(Box::new(NoopDecoder))
        }
    }

    #[test]
    fn find_missing_returns_none() {
        let r = Registry::new();
        assert!(r.find("nope").is_none());
    }

    #[test]
    fn duplicate_registration_is_idempotent() {
        let r = Registry::new();
        r.register(Arc::new(NoopMethod)).unwrap();
        r.register(Arc::new(NoopMethod)).unwrap();
        assert!(r.find("noop").is_some());
    }

    #[test]
    fn default_registry_has_deflate_and_gzip() {
        let r = Registry::default();
        assert!(r.find("deflate").is_some());
        assert!(r.find("gzip").is_some());
    }
}
