//! Registry-level behavior: idempotent registration, lookup, and the
//! process-global default registry.

use std::sync::Arc;

use flatereg::{DeflateMethod, GzipMethod, Registry};

#[test]
fn idempotent_registration_yields_a_single_entry() {
    let registry = Registry::new();
    registry.register(Arc::new(DeflateMethod)).unwrap();
    registry.register(Arc::new(DeflateMethod)).unwrap();
    assert!(registry.find("deflate").is_some());
}

#[test]
fn unknown_method_lookup_is_none() {
    let registry = Registry::new();
    assert!(registry.find("bzip2").is_none());
}

#[test]
fn default_registry_resolves_both_built_in_methods() {
    let registry = Registry::default();
    assert!(registry.find("deflate").is_some());
    assert!(registry.find("gzip").is_some());
}

#[test]
fn registering_two_methods_with_distinct_names_keeps_both() {
    let registry = Registry::new();
    registry.register(Arc::new(DeflateMethod)).unwrap();
    registry.register(Arc::new(GzipMethod)).unwrap();
    assert_eq!(registry.find("deflate").unwrap().name(), "deflate");
    assert_eq!(registry.find("gzip").unwrap().name(), "gzip");
}
