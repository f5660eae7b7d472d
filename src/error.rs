//! Error taxonomy and the fixed-size error-detail channel.
//!
//! Mirrors the shape of the teacher crate's `frame::types::Lz4FError` (a
//! plain enum with a hand-rolled `Display`/`Error` impl, no `thiserror`) but
//! adds a bounded detail string instead of a fixed lookup table of static
//! strings, since the kinds here are coarse (seven buckets) and the useful
//! information is the per-call detail (stage name, counters, expected vs.
//! actual checksum).

use std::fmt;

/// Coarse failure category. `Ok` is represented by `Result::Ok(_)`, not a
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Programmer error: null/missing argument, bad option type, out-of-range
    /// option, unsupported reset, missing key.
    InvalidArg,
    /// Allocation failure.
    Memory,
    /// A declared resource limit was exceeded.
    Limit,
    /// Malformed or truncated compressed input.
    Corrupt,
    /// Unknown method name or capability, or an unsupported wrapped method.
    Unsupported,
    /// Invariant violated; a bug in this crate.
    Internal,
    /// Callback-level I/O failure.
    Io,
}

impl ErrorKind {
    /// Short machine-stable name, used in `Display` output and by callers
    /// that want to match on a string across an FFI-ish boundary.
    pub const fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArg => "invalid-arg",
            ErrorKind::Memory => "memory",
            ErrorKind::Limit => "limit",
            ErrorKind::Corrupt => "corrupt",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::Internal => "internal",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed capacity of the error-detail buffer. Matches the "at least 256
/// bytes" requirement from the stream-core spec; kept as a compile-time
/// constant rather than dynamic allocation so a `Memory` failure can still
/// be reported with a populated detail string.
pub const DETAIL_CAPACITY: usize = 256;

/// A small `fmt::Write` sink over a fixed-size byte array. Truncates (does
/// not panic or allocate) when the formatted message would overflow.
struct FixedWriter {
    buf: [u8; DETAIL_CAPACITY],
    len: usize,
}

impl FixedWriter {
    fn new() -> Self {
        Self {
            buf: [0u8; DETAIL_CAPACITY],
            len: 0,
        }
    }
}

impl fmt::Write for FixedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let avail = DETAIL_CAPACITY - self.len;
        let n = s.len().min(avail);
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        Ok(())
    }
}

/// An error surfaced at the outermost API boundary: a coarse [`ErrorKind`]
/// plus a formatted detail string (stage name, counters, checksums) that
/// survives cloning and is preserved across subsequent queries until the
/// owning instance is destroyed or reset.
#[derive(Clone)]
pub struct CodecError {
    kind: ErrorKind,
    detail: [u8; DETAIL_CAPACITY],
    detail_len: usize,
}

impl CodecError {
    /// Construct an error with no detail text.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            detail: [0u8; DETAIL_CAPACITY],
            detail_len: 0,
        }
    }

    /// Construct an error, formatting `args` into the fixed detail buffer.
    /// Equivalent to the spec's `set_error(instance, status, fmt, ...)`.
    pub fn with_detail(kind: ErrorKind, args: fmt::Arguments<'_>) -> Self {
        use fmt::Write;
        let mut w = FixedWriter::new();
        // A formatting error here can only be an allocation-free sink
        // refusing more bytes, which FixedWriter never does; ignore it.
        let _ = w.write_fmt(args);
        Self {
            kind,
            detail: w.buf,
            detail_len: w.len,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        std::str::from_utf8(&self.detail[..self.detail_len]).unwrap_or("")
    }
}

impl fmt::Debug for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecError")
            .field("kind", &self.kind)
            .field("detail", &self.detail())
            .finish()
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.detail_len == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.detail())
        }
    }
}

impl std::error::Error for CodecError {}

impl PartialEq for CodecError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.detail() == other.detail()
    }
}

/// Convenience constructor used throughout the crate in place of a
/// printf-style variadic: `err(ErrorKind::Corrupt, format_args!("..."))`.
pub fn err(kind: ErrorKind, args: fmt::Arguments<'_>) -> CodecError {
    CodecError::with_detail(kind, args)
}

/// Convenience constructor for a bare kind with no detail.
pub fn err_bare(kind: ErrorKind) -> CodecError {
    CodecError::new(kind)
}

pub type Result<T> = std::result::Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_formats_and_truncates() {
        let e = err(ErrorKind::Corrupt, format_args!("stage={} expected={}", "trailer", 5));
        assert_eq!(e.kind(), ErrorKind::Corrupt);
        assert_eq!(e.detail(), "stage=trailer expected=5");
        assert!(e.to_string().contains("trailer"));

        let long = "x".repeat(DETAIL_CAPACITY + 50);
        let e2 = err(ErrorKind::Internal, format_args!("{}", long));
        assert_eq!(e2.detail().len(), DETAIL_CAPACITY);
    }

    #[test]
    fn bare_error_displays_kind_only() {
        let e = err_bare(ErrorKind::Unsupported);
        assert_eq!(e.to_string(), "unsupported");
    }
}
