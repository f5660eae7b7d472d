//! The `"deflate"` method descriptor: RFC 1951 raw DEFLATE, no wrapper
//! header or trailer.

use crate::deflate::decoder::DeflateDecoder;
use crate::deflate::encoder::DeflateEncoder;
use crate::deflate::tables::MAX_DISTANCE;
use crate::error::Result;
use crate::limits::Limits;
use crate::method::{Capabilities, DecoderImpl, EncoderImpl, Method};
use crate::options::{MethodSchema, OptionSpec, OptionType, Options, UnknownKeyPolicy};
use crate::registry::Registry;

static SCHEMA_SPECS: &[OptionSpec] = &[
    OptionSpec::new("deflate.level", OptionType::I64, "compression effort, 0 (stored only) to 9 (max)")
        .with_range(0, 9),
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

static SCHEMA: MethodSchema = MethodSchema { specs: SCHEMA_SPECS, unknown_key_policy: UnknownKeyPolicy::Error };

pub struct DeflateMethod;

impl Method for DeflateMethod {
    fn name(&self) -> &'static str {
        "deflate"
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
        Ok(Box::new(DeflateEncoder::new(level, limits)?))
    }

    fn new_decoder(&self, _registry: &Registry, options: &Options) -> Result<Box<dyn DecoderImpl>> {
        let limits = Limits::from_options(options, MAX_DISTANCE as u64)?;
        Ok(Box::new(DeflateDecoder::new(limits)?))
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
        registry.register(std::sync::Arc::new(DeflateMethod)).unwrap();
        let opts = Options::new();

        let mut enc = Encoder::create(&registry, "deflate", &opts).unwrap();
        let mut compressed = Vec::new();
        let data = b"roundtrip through the registered method descriptor";
        let mut input = InBuf::new(data);
        let mut out = [0u8; 512];
        {
            let mut output = OutBuf::new(&mut out);
            enc.update(&mut input, &mut output).unwrap();
            enc.finish(&mut output).unwrap();
            let used = output.used;
            compressed.extend_from_slice(&out[..used]);
        }

        let mut dec = Decoder::create(&registry, "deflate", &opts).unwrap();
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
    fn unknown_option_key_is_rejected_at_create() {
        let registry = Registry::new();
        registry.register(std::sync::Arc::new(DeflateMethod)).unwrap();
        let mut opts = Options::new();
        opts.set_u64("deflate.mystery", 1).unwrap();
        let e = Encoder::create(&registry, "deflate", &opts).unwrap_err();
        assert_eq!(e.kind(), crate::error::ErrorKind::InvalidArg);
    }
}
