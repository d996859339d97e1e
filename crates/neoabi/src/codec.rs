//! # Codec
//!
//! The type-directed translation between `Value` trees and the flat wire format.
//!
//! ## Wire Format
//! Values are concatenated in schema order with no tags. Only dynamic
//! lengths carry framing:
//! - `bool`: one byte, `0x00` or `0x01`.
//! - Integers: exactly `bits / 8` bytes of big-endian two's complement.
//! - `bytesN` / `function`: `N` raw bytes.
//! - `bytes` / `string`: one `neorlp` framed string.
//! - `T[N]`: `N` elements, no prefix. `T[]`: framed element count, then elements.
//! - Arrays of `bool` are bit-packed, see `bits`.
//! - Tuples: fields in order.
//!
//! ## Invariants
//! - **Recursion Safety**: Every recursive walk follows the schema, never the
//!   input, so its depth is that of the schema. `CodecConfig::max_depth` caps it
//!   further for schemas built from untrusted text.
//! - **Bounded Allocation**: A wire-supplied count is checked against the remaining
//!   input before anything is allocated for it.
//! - **Canonical**: Exactly one byte string decodes to a given value.

use crate::bits;
use crate::error::Error;
use crate::error::Result;
use crate::types::ArrayType;
use crate::types::IntType;
use crate::types::TypeNode;
use crate::value::Value;

use neorlp::Decoder;
use neorlp::Encoder;

use num_bigint::BigInt;
use num_bigint::Sign;
use num_traits::Signed;

/// A nesting limit suited to schemas from untrusted sources, see `CodecConfig::bounded`.
pub const MAX_RECURSION_DEPTH: usize = 64;

/// The largest element count accepted for arrays whose elements occupy no bytes.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 65_536;

/// Resource limits applied while encoding and decoding.
///
/// The default leaves nesting unbounded, so every schema round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub max_depth: usize,
    /// Cap on the count of a dynamic array of zero-width elements such as `()[]`,
    /// which the remaining input length cannot bound.
    pub max_zero_width_elements: usize,
}

impl CodecConfig {
    /// The default, with nesting capped at `MAX_RECURSION_DEPTH`.
    pub const fn bounded() -> Self {
        Self {
            max_depth: MAX_RECURSION_DEPTH,
            max_zero_width_elements: MAX_ZERO_WIDTH_ELEMENTS,
        }
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: usize::MAX,
            max_zero_width_elements: MAX_ZERO_WIDTH_ELEMENTS,
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Encodes `value` as an instance of `ty` into a fresh, exactly sized buffer.
///
/// # Errors
/// - `ValueMismatch` if a value's variant does not fit the type's kind.
/// - `ArityMismatch` for a wrong element count in a fixed array, tuple or `bytesN`.
/// - `EncodingOverflow` if an integer does not fit its width.
pub fn encode_value(ty: &TypeNode, value: &Value) -> Result<Vec<u8>> {
    encode_value_with(ty, value, &CodecConfig::default())
}

/// Like `encode_value`, and fails with `RecursionLimitExceeded` if `ty` is
/// nested deeper than `config.max_depth`.
pub fn encode_value_with(ty: &TypeNode, value: &Value, config: &CodecConfig) -> Result<Vec<u8>> {
    let len = encoded_len_with(ty, value, config)?;
    let mut enc = Encoder::with_capacity(len);
    encode_into(&mut enc, ty, value, config)?;
    debug_assert_eq!(enc.len(), len);
    Ok(enc.into_bytes())
}

/// Appends the encoding of `value` to `enc`.
///
/// On error, `enc` may hold a partial encoding and should be discarded.
pub fn encode_into(enc: &mut Encoder, ty: &TypeNode, value: &Value, config: &CodecConfig) -> Result<()> {
    encode_impl(enc, ty, value, config, 0)
}

fn encode_impl(enc: &mut Encoder, ty: &TypeNode, value: &Value, config: &CodecConfig, depth: usize) -> Result<()> {
    if depth > config.max_depth {
        return Err(Error::RecursionLimitExceeded);
    }

    match (ty, value) {
        (TypeNode::Bool, Value::Bool(b)) => enc.byte(*b as u8),
        (TypeNode::Int(int), Value::Int(v)) => enc.raw(&int_to_bytes(int, v)?),
        (TypeNode::Bytes(b), Value::Bytes(data)) => match b.len() {
            Some(n) => {
                check_arity(n, data.len())?;
                enc.raw(data);
            },
            None => enc.frame(data),
        },
        (TypeNode::String, Value::Str(s)) => enc.frame(s.as_bytes()),
        (TypeNode::Array(arr), Value::Arr(items)) => {
            match arr.len() {
                Some(n) => check_arity(n, items.len())?,
                None => enc.frame_uint(items.len() as u64),
            }
            if let TypeNode::Bool = arr.element() {
                enc.raw(&bits::pack_bools(bools(items)?, items.len()));
            } else {
                for item in items {
                    encode_impl(enc, arr.element(), item, config, depth + 1)?;
                }
            }
        },
        (TypeNode::Tuple(tuple), Value::Tup(fields)) => {
            check_arity(tuple.arity(), fields.len())?;
            for (field_ty, field) in tuple.elements().iter().zip(fields) {
                encode_impl(enc, field_ty, field, config, depth + 1)?;
            }
        },
        _ => return Err(mismatch(ty, value)),
    }
    Ok(())
}

/// Renders an integer as exactly `byte_width` bytes of two's complement.
fn int_to_bytes(int: &IntType, v: &BigInt) -> Result<Vec<u8>> {
    let width = int.byte_width();
    let overflow = || Error::EncodingOverflow { ty: int.to_string(), value: v.clone() };

    let (minimal, fill) = if int.signed() {
        let fill = if v.is_negative() { 0xFF } else { 0x00 };
        (v.to_signed_bytes_be(), fill)
    } else {
        if v.is_negative() {
            return Err(overflow());
        }
        (v.to_bytes_be().1, 0x00)
    };

    if minimal.len() > width {
        return Err(overflow());
    }

    let mut out = vec![fill; width - minimal.len()];
    out.extend_from_slice(&minimal);
    Ok(out)
}

fn bools(items: &[Value]) -> Result<Vec<bool>> {
    items
        .iter()
        .map(|item| item.as_bool().ok_or_else(|| mismatch(&TypeNode::Bool, item)))
        .collect()
}

fn check_arity(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::ArityMismatch { expected, found });
    }
    Ok(())
}

fn mismatch(ty: &TypeNode, value: &Value) -> Error {
    Error::ValueMismatch { expected: ty.canonical(), found: value.kind() }
}

// ============================================================================
// Length
// ============================================================================

/// The exact number of bytes `encode_value` produces for `value`.
///
/// Checks kinds and arities like encoding does, but not integer ranges.
pub fn encoded_len(ty: &TypeNode, value: &Value) -> Result<usize> {
    encoded_len_with(ty, value, &CodecConfig::default())
}

pub fn encoded_len_with(ty: &TypeNode, value: &Value, config: &CodecConfig) -> Result<usize> {
    len_impl(ty, value, config, 0)
}

fn len_impl(ty: &TypeNode, value: &Value, config: &CodecConfig, depth: usize) -> Result<usize> {
    if depth > config.max_depth {
        return Err(Error::RecursionLimitExceeded);
    }

    let len = match (ty, value) {
        (TypeNode::Bool, Value::Bool(_)) => 1,
        (TypeNode::Int(int), Value::Int(_)) => int.byte_width(),
        (TypeNode::Bytes(b), Value::Bytes(data)) => match b.len() {
            Some(n) => {
                check_arity(n, data.len())?;
                n
            },
            None => neorlp::framed_len(data),
        },
        (TypeNode::String, Value::Str(s)) => neorlp::framed_len(s.as_bytes()),
        (TypeNode::Array(arr), Value::Arr(items)) => {
            let prefix = match arr.len() {
                Some(n) => {
                    check_arity(n, items.len())?;
                    0
                },
                None => neorlp::framed_uint_len(items.len() as u64),
            };
            let body = if let TypeNode::Bool = arr.element() {
                bools(items)?;
                bits::packed_len(items.len())
            } else {
                let mut sum = 0;
                for item in items {
                    sum += len_impl(arr.element(), item, config, depth + 1)?;
                }
                sum
            };
            prefix + body
        },
        (TypeNode::Tuple(tuple), Value::Tup(fields)) => {
            check_arity(tuple.arity(), fields.len())?;
            let mut sum = 0;
            for (field_ty, field) in tuple.elements().iter().zip(fields) {
                sum += len_impl(field_ty, field, config, depth + 1)?;
            }
            sum
        },
        _ => return Err(mismatch(ty, value)),
    };
    Ok(len)
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes exactly one value of type `ty` spanning all of `bytes`.
///
/// # Errors
/// - `MalformedWireData` (and the other malformed variants) for truncated or
///   non-canonical input.
/// - `TrailingData` if bytes remain after the value.
pub fn decode_value(ty: &TypeNode, bytes: &[u8]) -> Result<Value> {
    decode_value_with(ty, bytes, &CodecConfig::default())
}

/// Like `decode_value`, under the limits in `config`.
pub fn decode_value_with(ty: &TypeNode, bytes: &[u8], config: &CodecConfig) -> Result<Value> {
    let mut dec = Decoder::new(bytes);
    let value = decode_from(&mut dec, ty, config)?;
    ensure_consumed(&dec)?;
    Ok(value)
}

/// Reads one value of type `ty` from the cursor, leaving it after the value.
pub fn decode_from(dec: &mut Decoder<'_>, ty: &TypeNode, config: &CodecConfig) -> Result<Value> {
    decode_impl(dec, ty, config, 0)
}

pub(crate) fn ensure_consumed(dec: &Decoder<'_>) -> Result<()> {
    if !dec.is_empty() {
        return Err(Error::TrailingData { offset: dec.pos(), remaining: dec.remaining() });
    }
    Ok(())
}

fn decode_impl(dec: &mut Decoder<'_>, ty: &TypeNode, config: &CodecConfig, depth: usize) -> Result<Value> {
    if depth > config.max_depth {
        return Err(Error::RecursionLimitExceeded);
    }

    let value = match ty {
        TypeNode::Bool => {
            let offset = dec.pos();
            match dec.read_byte()? {
                0x00 => Value::Bool(false),
                0x01 => Value::Bool(true),
                byte => return Err(Error::IllegalBool { offset, byte }),
            }
        },
        TypeNode::Int(int) => {
            let raw = dec.read_bytes(int.byte_width())?;
            let v = if int.signed() {
                BigInt::from_signed_bytes_be(raw)
            } else {
                BigInt::from_bytes_be(Sign::Plus, raw)
            };
            Value::Int(v)
        },
        TypeNode::Bytes(b) => match b.len() {
            Some(n) => Value::Bytes(dec.read_bytes(n)?.to_vec()),
            None => Value::Bytes(dec.unframe()?.to_vec()),
        },
        TypeNode::String => {
            let offset = dec.pos();
            let raw = dec.unframe()?;
            let s = std::str::from_utf8(raw).map_err(|_| Error::InvalidUtf8 { offset })?;
            Value::Str(s.to_string())
        },
        TypeNode::Array(arr) => decode_array(dec, arr, config, depth)?,
        TypeNode::Tuple(tuple) => {
            let mut fields = Vec::with_capacity(tuple.arity());
            for field_ty in tuple.elements() {
                fields.push(decode_impl(dec, field_ty, config, depth + 1)?);
            }
            Value::Tup(fields)
        },
    };
    Ok(value)
}

fn decode_array(dec: &mut Decoder<'_>, arr: &ArrayType, config: &CodecConfig, depth: usize) -> Result<Value> {
    let count = match arr.len() {
        Some(n) => n,
        None => {
            let offset = dec.pos();
            let count = dec.unframe_len()?;
            if !count_fits(arr.element(), count, dec.remaining(), config) {
                return Err(Error::CountTooLarge { offset, count });
            }
            count
        },
    };

    if let TypeNode::Bool = arr.element() {
        let offset = dec.pos();
        let packed = dec.read_bytes(bits::packed_len(count))?;
        let items = bits::unpack_bools(packed, count, offset)?;
        return Ok(Value::Arr(items.into_iter().map(Value::Bool).collect()));
    }

    // Fixed counts come from the schema, so only reserve what the input could hold.
    let mut items = Vec::with_capacity(count.min(dec.remaining()));
    for _ in 0..count {
        items.push(decode_impl(dec, arr.element(), config, depth + 1)?);
    }
    Ok(Value::Arr(items))
}

/// Whether `count` elements of `element` could be read from `remaining` bytes.
fn count_fits(element: &TypeNode, count: usize, remaining: usize, config: &CodecConfig) -> bool {
    if let TypeNode::Bool = element {
        return bits::packed_len(count) <= remaining;
    }
    match element.min_encoded_len() {
        0 => count <= config.max_zero_width_elements,
        min => count.checked_mul(min).is_some_and(|need| need <= remaining),
    }
}
