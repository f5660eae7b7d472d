//! Options-bag behavior: frozen immutability, schema validation, and
//! overflow-safe expansion-ratio arithmetic at the limits boundary.

use flatereg::{DeflateMethod, Encoder, ErrorKind, GzipMethod, Limits, Options, Registry};

fn registry() -> Registry {
    let r = Registry::new();
    r.register(std::sync::Arc::new(DeflateMethod)).unwrap();
    r.register(std::sync::Arc::new(GzipMethod)).unwrap();
    r
}

#[test]
fn setting_a_frozen_options_bag_is_rejected_and_leaves_it_unchanged() {
    let mut opts = Options::new();
    opts.set_i64("deflate.level", 3).unwrap();
    opts.freeze();
    let err = opts.set_i64("deflate.level", 9).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArg);
    assert_eq!(opts.get_i64("deflate.level").unwrap(), 3);
}

#[test]
fn unknown_key_rejected_at_create_for_both_methods() {
    let registry = registry();
    for method in ["deflate", "gzip"] {
        let mut opts = Options::new();
        opts.set_bool("not.a.real.key", true).unwrap();
        let err = Encoder::create(&registry, method, &opts).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArg);
    }
}

#[test]
fn out_of_range_level_rejected_at_create() {
    let registry = registry();
    let mut opts = Options::new();
    opts.set_i64("deflate.level", 10).unwrap();
    let err = Encoder::create(&registry, "deflate", &opts).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArg);
}

#[test]
fn expansion_ratio_overflow_is_safe_at_extreme_values() {
    // input = 1, ratio = 2^63: checked_mul must not wrap and must still
    // compare correctly against a huge output.
    let limits = Limits { max_output_bytes: 0, max_memory_bytes: 0, max_window_bytes: 0, max_expansion_ratio: 1u64 << 63 };
    limits.check_expansion(1, u64::MAX / 2).unwrap();
    limits.check_expansion(1, (1u64 << 63) + 1).unwrap_err();
}
