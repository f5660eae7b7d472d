//! The `"gzip"` method descriptor: RFC 1952 GZIP framing around a DEFLATE
//! body.

use crate::deflate::tables::MAX_DISTANCE;
use crate::error::Result;
use crate::gzip::decoder::GzipDecoder;
use crate::gzip::encoder::{GzipEncoder, GzipHeaderOptions};
use crate::limits::Limits;
use crate::method::{Capabilities, DecoderImpl, EncoderImpl, Method};
use crate::options::{MethodSchema, OptionSpec, OptionType, OptionValue, Options, UnknownKeyPolicy};
use crate::registry::Registry;

static SCHEMA_SPECS: &[OptionSpec] = &[
    OptionSpec::new("deflate.level", OptionType::I64, "compression effort, 0 (stored only) to 9 (max); also drives XFL")
        .with_range(0, 9),
    OptionSpec::new("gzip.name", OptionType::Str, "original filename stored in FNAME; omitted if unset"),
    OptionSpec::new("gzip.comment", OptionType::Str, "free-text comment stored in FCOMMENT; omitted if unset"),
    OptionSpec::new("gzip.extra", OptionType::Bytes, "opaque FEXTRA payload; omitted if unset"),
    OptionSpec::new("gzip.mtime", OptionType::U64, "modification time stored in the MTIME field, Unix seconds"),
    OptionSpec::new("gzip.os", OptionType::U64, "OS byte stored in the header; 255 means unknown").with_range(0, 255),
    OptionSpec::new(
        "gzip.xfl",
        OptionType::U64,
        "explicit XFL byte; unset derives it from deflate.level (2 if >=6, 4 if <=2, else 0)",
    )
    .with_range(0, 255),
    OptionSpec::new("gzip.header_crc", OptionType::Bool, "emit and verify the FHCRC header CRC16"),
    OptionSpec::new(
        "gzip.concat",
        OptionType::Bool,
        "decode concatenated members back to back instead of stopping after the first",
    ),
    OptionSpec::new(
        "gzip.max_extra_bytes",
        OptionType::U64,
        "decoder safety cap on FEXTRA length in bytes",
    ),
    OptionSpec::new(
        "gzip.max_name_bytes",
        OptionType::U64,
        "decoder safety cap on FNAME length in bytes",
    ),
    OptionSpec::new(
        "gzip.max_comment_bytes",
        OptionType::U64,
        "decoder safety cap on FCOMMENT length in bytes",
    ),
    OptionSpec::new(
        "limits.max_output_bytes",
        OptionType::U64,
        "abort once total decoded/encoded output exceeds this many bytes (0 = unlimited)",
    ),
    OptionSpec::new(
        "limits.max_memory_bytes",
        OptionType::U64,
        "abort if this instance's tracked allocations exceed this many bytes (0 = unlimited)",
    ),
    OptionSpec::new(
        "limits.max_window_bytes",
        OptionType::U64,
        "advisory cap on the sliding window; raw DEFLATE always uses the full 32 KiB window",
    ),
    OptionSpec::new(
        "limits.max_expansion_ratio",
        OptionType::U64,
        "abort decoding if output exceeds this multiple of input consumed so far (0 = unlimited)",
    ),
];

/// RFC 1952 caps this implementation enforces when decoding: 64 KiB of
/// FEXTRA, 1 MiB each of FNAME/FCOMMENT, matching gzip's own practical
/// limits on what a "reasonable" header carries.
const DEFAULT_MAX_EXTRA_BYTES: u64 = 64 * 1024;
const DEFAULT_MAX_NAME_BYTES: u64 = 1024 * 1024;
const DEFAULT_MAX_COMMENT_BYTES: u64 = 1024 * 1024;

static SCHEMA: MethodSchema = MethodSchema { specs: SCHEMA_SPECS, unknown_key_policy: UnknownKeyPolicy::Error };

pub struct GzipMethod;

impl Method for GzipMethod {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities { encode: true, decode: true }
    }

    fn schema(&self) -> Option<&'static MethodSchema> {
        Some(&SCHEMA)
    }

    fn new_encoder(&self, _registry: &Registry, options: &Options) -> Result<Box<dyn EncoderImpl>> {
        let level = options
            .get_i64_or("deflate.level", crate::defaults::LEVEL_DEFAULT as i64)?
            .clamp(0, 9) as u8;
        let limits = Limits::from_options(options, MAX_DISTANCE as u64)?;
        let name = match options.get("gzip.name") {
            Some(OptionValue::Str(s)) => Some(s.clone()),
            _ => None,
        };
        let comment = match options.get("gzip.comment") {
            Some(OptionValue::Str(s)) => Some(s.clone()),
            _ => None,
        };
        let extra = match options.get("gzip.extra") {
            Some(OptionValue::Bytes(b)) => Some(b.clone()),
            _ => None,
        };
        let mtime = options.get_u64_or("gzip.mtime", 0)? as u32;
        let os = options.get_u64_or("gzip.os", crate::gzip::encoder::OS_UNKNOWN as u64)? as u8;
        let xfl = match options.get("gzip.xfl") {
            Some(OptionValue::U64(v)) => Some(*v as u8),
            _ => None,
        };
        let header_crc = options.get_bool_or("gzip.header_crc", false)?;
        let header_opts = GzipHeaderOptions { name, comment, extra, mtime, os, xfl, header_crc };
        Ok(Box::new(GzipEncoder::new(level, limits, header_opts)?))
    }

    fn new_decoder(&self, _registry: &Registry, options: &Options) -> Result<Box<dyn DecoderImpl>> {
        let limits = Limits::from_options(options, MAX_DISTANCE as u64)?;
        let concat = options.get_bool_or("gzip.concat", false)?;
        let max_extra_bytes = options.get_u64_or("gzip.max_extra_bytes", DEFAULT_MAX_EXTRA_BYTES)?;
        let max_name_bytes = options.get_u64_or("gzip.max_name_bytes", DEFAULT_MAX_NAME_BYTES)?;
        let max_comment_bytes = options.get_u64_or("gzip.max_comment_bytes", DEFAULT_MAX_COMMENT_BYTES)?;
        let caps = crate::gzip::decoder::GzipCaps { max_extra_bytes, max_name_bytes, max_comment_bytes };
        Ok(Box::new(GzipDecoder::with_options(limits, concat, caps)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{InBuf, OutBuf};
    use crate::registry::Registry;
    use crate::stream::{Decoder, Encoder};

    #[test]
    fn encode_then_decode_through_the_method_trait() {
        let registry = Registry::new();
        registry.register(std::sync::Arc::new(GzipMethod)).unwrap();
        let opts = Options::new();

        let mut enc = Encoder::create(&registry, "gzip", &opts).unwrap();
        let mut compressed = Vec::new();
        let data = b"roundtrip through the registered gzip method descriptor";
        let mut input = InBuf::new(data);
        let mut out = [0u8; 512];
        {
            let mut output = OutBuf::new(&mut out);
            enc.update(&mut input, &mut output).unwrap();
            enc.finish(&mut output).unwrap();
            let used = output.used;
            compressed.extend_from_slice(&out[..used]);
        }
        assert_eq!(&compressed[0..2], &[0x1f, 0x8b]);

        let mut dec = Decoder::create(&registry, "gzip", &opts).unwrap();
        let mut decoded = Vec::new();
        let mut cin = InBuf::new(&compressed);
        let mut dout = [0u8; 512];
        let mut doutput = OutBuf::new(&mut dout);
        dec.update(&mut cin, &mut doutput).unwrap();
        dec.finish(&mut doutput).unwrap();
        let used = doutput.used;
        decoded.extend_from_slice(&dout[..used]);

        assert_eq!(decoded, data);
    }

    #[test]
    fn name_and_header_crc_options_flow_through_to_the_wire() {
        let registry = Registry::new();
        registry.register(std::sync::Arc::new(GzipMethod)).unwrap();
        let mut opts = Options::new();
        opts.set_str("gzip.name", "hello.txt").unwrap();
        opts.set_u64("gzip.mtime", 1_700_000_000).unwrap();
        opts.set_bool("gzip.header_crc", true).unwrap();

        let mut enc = Encoder::create(&registry, "gzip", &opts).unwrap();
        let mut compressed = Vec::new();
        let mut input = InBuf::new(b"named stream");
        let mut out = [0u8; 512];
        let mut output = OutBuf::new(&mut out);
        enc.update(&mut input, &mut output).unwrap();
        enc.finish(&mut output).unwrap();
        let used = output.used;
        compressed.extend_from_slice(&out[..used]);

        assert_eq!(compressed[3] & 0x08, 0x08); // FLG_FNAME
        assert_eq!(compressed[3] & 0x02, 0x02); // FLG_FHCRC

        let mut dec = Decoder::create(&registry, "gzip", &opts).unwrap();
        let mut decoded = Vec::new();
        let mut cin = InBuf::new(&compressed);
        let mut dout = [0u8; 512];
        let mut doutput = OutBuf::new(&mut dout);
        dec.update(&mut cin, &mut doutput).unwrap();
        dec.finish(&mut doutput).unwrap();
        let used = doutput.used;
        decoded.extend_from_slice(&dout[..used]);
        assert_eq!(decoded, b"named stream");
    }

    #[test]
    fn unknown_option_key_is_rejected_at_create() {
        let registry = Registry::new();
        registry.register(std::sync::Arc::new(GzipMethod)).unwrap();
        let mut opts = Options::new();
        opts.set_u64("gzip.mystery", 1).unwrap();
        let e = Encoder::create(&registry, "gzip", &opts).unwrap_err();
        assert_eq!(e.kind(), crate::error::ErrorKind::InvalidArg);
    }
}
