//! # Call Frames
//!
//! A call is a compact header naming the function, followed by the flat
//! encoding of the argument tuple. There is no outer length.
//!
//! ## Header Format
//! The top two bits of the first byte are the version tag (`00`), the low six
//! bits hold the function number. Numbers below `ID_LIMIT` fit entirely in the
//! first byte; larger ones set the low bits to `ID_LIMIT` and follow with
//! `frame_uint(function - ID_LIMIT)`.
//!
//! ## Invariants
//! - **Canonical**: Every function number has exactly one header encoding.
//! - **Exhaustive**: A call decode consumes the whole input or fails.

use crate::codec;
use crate::codec::CodecConfig;
use crate::error::Error;
use crate::error::Result;
use crate::types::TypeNode;
use crate::value::Value;

use neorlp::Decoder;
use neorlp::Encoder;

use tracing::debug;
use tracing::trace;

/// Function numbers below this fit in the first header byte.
pub const ID_LIMIT: u8 = 63;

/// The only supported version tag.
pub const VERSION: u8 = 0b00;

const VERSION_SHIFT: u8 = 6;
const ID_MASK: u8 = 0b0011_1111;

/// The header preceding every call payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallHeader {
    pub function: u64,
}

impl CallHeader {
    pub const fn new(function: u64) -> Self {
        Self { function }
    }

    /// Exact size of the encoded header.
    pub const fn encoded_len(&self) -> usize {
        match self.extension() {
            None => 1,
            Some(ext) => 1 + neorlp::framed_uint_len(ext),
        }
    }

    const fn extension(&self) -> Option<u64> {
        if self.function < ID_LIMIT as u64 {
            None
        } else {
            Some(self.function - ID_LIMIT as u64)
        }
    }

    pub fn encode(&self, enc: &mut Encoder) {
        let version = VERSION << VERSION_SHIFT;
        match self.extension() {
            None => enc.byte(version | self.function as u8),
            Some(ext) => {
                enc.byte(version | ID_LIMIT);
                enc.frame_uint(ext);
            },
        }
    }

    /// Reads a header, leaving the cursor at the first payload byte.
    ///
    /// # Errors
    /// - `MalformedWireData` for empty input or a non-canonical extension.
    /// - `VersionMismatch` if the version tag is not `00`.
    pub fn decode(dec: &mut Decoder<'_>) -> Result<Self> {
        let lead = dec.read_byte()?;
        let version = lead >> VERSION_SHIFT;
        if version != VERSION {
            return Err(Error::VersionMismatch { found: version });
        }

        let id = lead & ID_MASK;
        if id < ID_LIMIT {
            trace!(function = id, "short call header");
            return Ok(Self::new(id as u64));
        }

        let offset = dec.pos();
        let ext = dec.unframe_uint()?;
        let function = ext
            .checked_add(ID_LIMIT as u64)
            .ok_or(neorlp::Error::IntegerOverflow { offset, len: neorlp::unsigned_len(ext) })?;
        trace!(function, "extended call header");
        Ok(Self::new(function))
    }
}

/// Reads only the function number of a call, without a schema.
///
/// Lets a receiver pick the schema for the payload before decoding it.
pub fn peek_function(bytes: &[u8]) -> Result<u64> {
    let mut dec = Decoder::new(bytes);
    Ok(CallHeader::decode(&mut dec)?.function)
}

/// Encodes a call to `function` with `values` as an instance of `schema`.
///
/// # Errors
/// - `SchemaNotTuple` if `schema` is not a tuple.
/// - Any encoding error of `codec::encode_value`.
pub fn encode_call(function: u64, schema: &TypeNode, values: &Value) -> Result<Vec<u8>> {
    encode_call_with(function, schema, values, &CodecConfig::default())
}

/// Like `encode_call`, and fails with `RecursionLimitExceeded` if `schema` is
/// nested deeper than `config.max_depth`.
pub fn encode_call_with(function: u64, schema: &TypeNode, values: &Value, config: &CodecConfig) -> Result<Vec<u8>> {
    ensure_tuple(schema)?;

    let header = CallHeader::new(function);
    let len = header.encoded_len() + codec::encoded_len_with(schema, values, config)?;

    let mut enc = Encoder::with_capacity(len);
    header.encode(&mut enc);
    codec::encode_into(&mut enc, schema, values, config)?;

    debug!(function, signature = %schema, len, "encoded call");
    Ok(enc.into_bytes())
}

/// Decodes a call, returning the function number and the argument tuple.
///
/// # Errors
/// - `SchemaNotTuple` if `schema` is not a tuple.
/// - `VersionMismatch` for an unknown header version.
/// - `MalformedWireData` (and the other malformed variants) for bad input.
/// - `TrailingData` if bytes remain after the tuple.
pub fn decode_call(schema: &TypeNode, bytes: &[u8]) -> Result<(u64, Value)> {
    decode_call_with(schema, bytes, &CodecConfig::default())
}

/// Like `decode_call`, and fails with `RecursionLimitExceeded` if `schema` is
/// nested deeper than `config.max_depth`.
pub fn decode_call_with(schema: &TypeNode, bytes: &[u8], config: &CodecConfig) -> Result<(u64, Value)> {
    ensure_tuple(schema)?;

    let mut dec = Decoder::new(bytes);
    let header = CallHeader::decode(&mut dec)?;
    let values = codec::decode_from(&mut dec, schema, config)?;
    codec::ensure_consumed(&dec)?;

    debug!(function = header.function, signature = %schema, len = bytes.len(), "decoded call");
    Ok((header.function, values))
}

fn ensure_tuple(schema: &TypeNode) -> Result<()> {
    match schema {
        TypeNode::Tuple(_) => Ok(()),
        other => Err(Error::SchemaNotTuple { found: other.canonical() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(function: u64) -> Vec<u8> {
        let mut enc = Encoder::new();
        CallHeader::new(function).encode(&mut enc);
        enc.into_bytes()
    }

    #[test]
    fn test_short_headers() {
        assert_eq!(header_bytes(0), vec![0x00]);
        assert_eq!(header_bytes(60), vec![0x3C]);
        assert_eq!(header_bytes(62), vec![0x3E]);
    }

    #[test]
    fn test_extended_headers() {
        assert_eq!(header_bytes(63), vec![0x3F, 0x80]);
        assert_eq!(header_bytes(64), vec![0x3F, 0x01]);
        assert_eq!(header_bytes(63 + 0x7F), vec![0x3F, 0x7F]);
        assert_eq!(header_bytes(63 + 0x80), vec![0x3F, 0x81, 0x80]);
        assert_eq!(header_bytes(63 + 0x1234), vec![0x3F, 0x82, 0x12, 0x34]);
    }

    #[test]
    fn test_encoded_len() {
        for f in [0, 62, 63, 64, 190, 191, 1 << 20, u64::MAX] {
            assert_eq!(CallHeader::new(f).encoded_len(), header_bytes(f).len(), "function {}", f);
        }
    }

    #[test]
    fn test_header_roundtrip_extremes() {
        for f in [0, 62, 63, 64, u64::MAX] {
            let bytes = header_bytes(f);
            assert_eq!(peek_function(&bytes).unwrap(), f);
        }
    }

    #[test]
    fn test_version_mismatch() {
        match peek_function(&[0x40]) {
            Err(Error::VersionMismatch { found: 0b01 }) => {},
            res => panic!("Expected VersionMismatch, got {:?}", res),
        }
        match peek_function(&[0xFF]) {
            Err(Error::VersionMismatch { found: 0b11 }) => {},
            res => panic!("Expected VersionMismatch, got {:?}", res),
        }
    }

    #[test]
    fn test_bad_extensions() {
        let cases: [&[u8]; 5] = [&[], &[0x3F], &[0x3F, 0x00], &[0x3F, 0xC0], &[0x3F, 0x81, 0x05]];
        for bytes in cases {
            match peek_function(bytes) {
                Err(Error::MalformedWireData(_)) => {},
                res => panic!("Expected MalformedWireData for {:02x?}, got {:?}", bytes, res),
            }
        }
    }

    #[test]
    fn test_extension_overflow() {
        // u64::MAX - 62 + 63 does not fit.
        let mut enc = Encoder::new();
        enc.byte(0x3F);
        enc.frame_uint(u64::MAX - 62);
        match peek_function(enc.as_bytes()) {
            Err(Error::MalformedWireData(neorlp::Error::IntegerOverflow { offset: 1, .. })) => {},
            res => panic!("Expected IntegerOverflow, got {:?}", res),
        }
    }

    #[test]
    fn test_schema_must_be_tuple() {
        match encode_call(0, &TypeNode::Bool, &Value::Bool(true)) {
            Err(Error::SchemaNotTuple { found }) => assert_eq!(found, "bool"),
            res => panic!("Expected SchemaNotTuple, got {:?}", res),
        }
        match decode_call(&TypeNode::String, &[0x00, 0x80]) {
            Err(Error::SchemaNotTuple { .. }) => {},
            res => panic!("Expected SchemaNotTuple, got {:?}", res),
        }
    }
}
