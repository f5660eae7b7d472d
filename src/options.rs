//! Typed key-value configuration with per-method schema validation.
//!
//! Grounded on the same shape the teacher crate uses for its frame
//! preferences (`frame::types::Preferences` / `FrameInfo`: a small set of
//! named, typed fields with defaults) generalized to an open, dotted-key map
//! since this crate's registry supports more than one method and methods are
//! added without touching a shared struct definition.

use std::fmt;

use crate::error::{err, ErrorKind, Result};

/// A tagged configuration value. Six kinds, matching the spec's option type
/// universe exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    I64(i64),
    U64(u64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    F64(f64),
}

impl OptionValue {
    pub fn type_of(&self) -> OptionType {
        match self {
            OptionValue::I64(_) => OptionType::I64,
            OptionValue::U64(_) => OptionType::U64,
            OptionValue::Bool(_) => OptionType::Bool,
            OptionValue::Str(_) => OptionType::Str,
            OptionValue::Bytes(_) => OptionType::Bytes,
            OptionValue::F64(_) => OptionType::F64,
        }
    }

    /// Widens an integer-ish value to `i128` for range comparisons. Returns
    /// `None` for non-numeric kinds.
    fn as_i128(&self) -> Option<i128> {
        match self {
            OptionValue::I64(v) => Some(*v as i128),
            OptionValue::U64(v) => Some(*v as i128),
            _ => None,
        }
    }
}

/// The six recognized option kinds, used by [`OptionSpec`] to describe an
/// expected type independent of any particular value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    I64,
    U64,
    Bool,
    Str,
    Bytes,
    F64,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OptionType::I64 => "i64",
            OptionType::U64 => "u64",
            OptionType::Bool => "bool",
            OptionType::Str => "string",
            OptionType::Bytes => "bytes",
            OptionType::F64 => "f64",
        };
        f.write_str(s)
    }
}

/// A typed, insertion-ordered configuration bag. Cheap to clone; string and
/// bytes payloads are owned copies, matching the spec's ownership rule.
#[derive(Debug, Clone, Default)]
pub struct Options {
    entries: Vec<(String, OptionValue)>,
    frozen: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Idempotent: freezing an already-frozen bag is a no-op.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Sets `key` to `value`. Rejects mutation of a frozen bag with
    /// `InvalidArg` and leaves the bag unchanged.
    pub fn set(&mut self, key: &str, value: OptionValue) -> Result<()> {
        if self.frozen {
            return Err(err(
                ErrorKind::InvalidArg,
                format_args!("options are frozen: cannot set '{}'", key),
            ));
        }
        match self.index_of(key) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
        Ok(())
    }

    pub fn set_i64(&mut self, key: &str, v: i64) -> Result<()> {
        self.set(key, OptionValue::I64(v))
    }
    pub fn set_u64(&mut self, key: &str, v: u64) -> Result<()> {
        self.set(key, OptionValue::U64(v))
    }
    pub fn set_bool(&mut self, key: &str, v: bool) -> Result<()> {
        self.set(key, OptionValue::Bool(v))
    }
    pub fn set_str(&mut self, key: &str, v: impl Into<String>) -> Result<()> {
        self.set(key, OptionValue::Str(v.into()))
    }
    pub fn set_bytes(&mut self, key: &str, v: impl Into<Vec<u8>>) -> Result<()> {
        self.set(key, OptionValue::Bytes(v.into()))
    }
    pub fn set_f64(&mut self, key: &str, v: f64) -> Result<()> {
        self.set(key, OptionValue::F64(v))
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.index_of(key).map(|i| &self.entries[i].1)
    }

    fn get_typed<'a, T>(
        &'a self,
        key: &str,
        extract: impl Fn(&'a OptionValue) -> Option<T>,
        type_name: OptionType,
    ) -> Result<T> {
        match self.get(key) {
            None => Err(err(
                ErrorKind::InvalidArg,
                format_args!("missing option key '{}'", key),
            )),
            Some(v) => extract(v).ok_or_else(|| {
                err(
                    ErrorKind::InvalidArg,
                    format_args!(
                        "option '{}' has type {}, expected {}",
                        key,
                        v.type_of(),
                        type_name
                    ),
                )
            }),
        }
    }

    pub fn get_i64(&self, key: &str) -> Result<i64> {
        self.get_typed(
            key,
            |v| if let OptionValue::I64(x) = v { Some(*x) } else { None },
            OptionType::I64,
        )
    }
    pub fn get_u64(&self, key: &str) -> Result<u64> {
        self.get_typed(
            key,
            |v| if let OptionValue::U64(x) = v { Some(*x) } else { None },
            OptionType::U64,
        )
    }
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        self.get_typed(
            key,
            |v| if let OptionValue::Bool(x) = v { Some(*x) } else { None },
            OptionType::Bool,
        )
    }
    pub fn get_str(&self, key: &str) -> Result<&str> {
        self.get_typed(
            key,
            |v| if let OptionValue::Str(x) = v { Some(x.as_str()) } else { None },
            OptionType::Str,
        )
    }
    pub fn get_bytes(&self, key: &str) -> Result<&[u8]> {
        self.get_typed(
            key,
            |v| if let OptionValue::Bytes(x) = v { Some(x.as_slice()) } else { None },
            OptionType::Bytes,
        )
    }
    pub fn get_f64(&self, key: &str) -> Result<f64> {
        self.get_typed(
            key,
            |v| if let OptionValue::F64(x) = v { Some(*x) } else { None },
            OptionType::F64,
        )
    }

    /// Returns `default` when the key is absent; propagates a type-mismatch
    /// error when present with the wrong type. Used throughout for the
    /// option-key table in the external-interfaces spec section, where every
    /// key has a standard default.
    pub fn get_u64_or(&self, key: &str, default: u64) -> Result<u64> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.get_u64(key),
        }
    }
    pub fn get_i64_or(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.get_i64(key),
        }
    }
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.get_bool(key),
        }
    }
    pub fn get_str_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str> {
        match self.get(key) {
            None => Ok(default),
            Some(_) => self.get_str(key),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Unknown-key handling policy for [`validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKeyPolicy {
    Error,
    Ignore,
}

/// One schema entry: a recognized key, its expected type, optional default,
/// and optional inclusive numeric bounds (meaningful only for `I64`/`U64`).
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub key: &'static str,
    pub ty: OptionType,
    pub min: Option<i128>,
    pub max: Option<i128>,
    pub help: &'static str,
}

impl OptionSpec {
    pub const fn new(key: &'static str, ty: OptionType, help: &'static str) -> Self {
        Self { key, ty, min: None, max: None, help }
    }

    pub const fn with_range(mut self, min: i128, max: i128) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

/// Per-method schema: an ordered list of recognized keys plus the policy for
/// keys the schema doesn't name.
pub struct MethodSchema {
    pub specs: &'static [OptionSpec],
    pub unknown_key_policy: UnknownKeyPolicy,
}

impl MethodSchema {
    fn find(&self, key: &str) -> Option<&OptionSpec> {
        self.specs.iter().find(|s| s.key == key)
    }
}

/// Validates a single `(key, value)` pair against `schema`, independent of
/// any options bag. Equivalent to the spec's `validate_key`.
pub fn validate_key(key: &str, value: &OptionValue, schema: &MethodSchema) -> Result<()> {
    let spec = match schema.find(key) {
        Some(s) => s,
        None => {
            return match schema.unknown_key_policy {
                UnknownKeyPolicy::Ignore => Ok(()),
                UnknownKeyPolicy::Error => Err(err(
                    ErrorKind::InvalidArg,
                    format_args!("unknown option key '{}'", key),
                )),
            };
        }
    };
    if value.type_of() != spec.ty {
        return Err(err(
            ErrorKind::InvalidArg,
            format_args!(
                "option '{}' has type {}, expected {}",
                key,
                value.type_of(),
                spec.ty
            ),
        ));
    }
    if let (Some(min), Some(max)) = (spec.min, spec.max) {
        if let Some(v) = value.as_i128() {
            if v < min || v > max {
                return Err(err(
                    ErrorKind::InvalidArg,
                    format_args!(
                        "option '{}' value {} out of range [{}, {}]",
                        key, v, min, max
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Walks every entry in `opts` against `schema`. Equivalent to the spec's
/// `validate(opts, method)`.
pub fn validate(opts: &Options, schema: &MethodSchema) -> Result<()> {
    for (key, value) in opts.iter() {
        validate_key(key, value, schema)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let mut o = Options::new();
        o.set_u64("limits.max_output_bytes", 42).unwrap();
        assert_eq!(o.get_u64("limits.max_output_bytes").unwrap(), 42);
    }

    #[test]
    fn type_mismatch_is_invalid_arg() {
        let mut o = Options::new();
        o.set_bool("gzip.header_crc", true).unwrap();
        let e = o.get_u64("gzip.header_crc").unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidArg);
    }

    #[test]
    fn missing_key_is_invalid_arg() {
        let o = Options::new();
        assert_eq!(o.get_u64("nope").unwrap_err().kind(), ErrorKind::InvalidArg);
        assert_eq!(o.get_u64_or("nope", 7).unwrap(), 7);
    }

    #[test]
    fn frozen_options_reject_set_without_mutation() {
        let mut o = Options::new();
        o.set_i64("deflate.level", 3).unwrap();
        o.freeze();
        let before = o.clone();
        let e = o.set_i64("deflate.level", 9).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidArg);
        assert_eq!(o.get_i64("deflate.level").unwrap(), before.get_i64("deflate.level").unwrap());
    }

    #[test]
    fn clone_preserves_frozen_bit() {
        let mut o = Options::new();
        o.freeze();
        let c = o.clone();
        assert!(c.is_frozen());
    }

    #[test]
    fn schema_validates_type_range_and_unknown_keys() {
        static SPECS: &[OptionSpec] = &[
            OptionSpec::new("deflate.level", OptionType::I64, "level").with_range(0, 9),
        ];
        let schema = MethodSchema { specs: SPECS, unknown_key_policy: UnknownKeyPolicy::Error };

        let mut ok = Options::new();
        ok.set_i64("deflate.level", 6).unwrap();
        validate(&ok, &schema).unwrap();

        let mut bad_range = Options::new();
        bad_range.set_i64("deflate.level", 42).unwrap();
        assert_eq!(validate(&bad_range, &schema).unwrap_err().kind(), ErrorKind::InvalidArg);

        let mut bad_type = Options::new();
        bad_type.set_bool("deflate.level", true).unwrap();
        assert_eq!(validate(&bad_type, &schema).unwrap_err().kind(), ErrorKind::InvalidArg);

        let mut unknown = Options::new();
        unknown.set_u64("deflate.mystery", 1).unwrap();
        assert_eq!(validate(&unknown, &schema).unwrap_err().kind(), ErrorKind::InvalidArg);

        let permissive = MethodSchema { specs: SPECS, unknown_key_policy: UnknownKeyPolicy::Ignore };
        validate(&unknown, &permissive).unwrap();
    }
}
