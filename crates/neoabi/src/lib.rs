//! # Neoabi
//!
//! A strict, schema-driven call codec over `neorlp` framing.
//!
//! ## Architecture
//!
//! A textual type signature such as `(uint8,bool[],(string,bytes4))` is parsed
//! into a `TypeNode` tree. The codec walks that tree alongside a `Value` tree to
//! produce a flat, untagged byte string, and walks it again to read one back.
//! Calls prepend a one-byte header (extended for large function numbers) so that
//! many schemas can share one wire.
//!
//! ## Guarantees
//!
//! - **Deterministic**: Equal inputs produce identical bytes; there is one valid
//!   encoding per value.
//! - **Minimal**: No redundant length bytes, no padding beyond fixed widths.
//! - **Strict**: Truncated, non-canonical or over-long input is rejected, never
//!   silently repaired.

mod bits;
mod codec;
mod error;
mod header;
mod parser;
mod selector;
mod types;
mod value;


pub use crate::error::Error;
pub use crate::error::Result;

pub use crate::types::ArrayType;
pub use crate::types::BytesForm;
pub use crate::types::BytesType;
pub use crate::types::IntForm;
pub use crate::types::IntType;
pub use crate::types::TupleType;
pub use crate::types::TypeNode;
pub use crate::types::FUNCTION_LEN;
pub use crate::types::canonical_text;

pub use crate::parser::ParseConfig;
pub use crate::parser::MAX_FIXED_SCALE;
pub use crate::parser::parse_type;
pub use crate::parser::parse_type_with;

pub use crate::value::Value;

pub use crate::codec::CodecConfig;
pub use crate::codec::MAX_RECURSION_DEPTH;
pub use crate::codec::MAX_ZERO_WIDTH_ELEMENTS;
pub use crate::codec::decode_from;
pub use crate::codec::decode_value;
pub use crate::codec::decode_value_with;
pub use crate::codec::encode_into;
pub use crate::codec::encode_value;
pub use crate::codec::encode_value_with;
pub use crate::codec::encoded_len;
pub use crate::codec::encoded_len_with;

pub use crate::header::CallHeader;
pub use crate::header::ID_LIMIT;
pub use crate::header::VERSION;
pub use crate::header::decode_call;
pub use crate::header::decode_call_with;
pub use crate::header::encode_call;
pub use crate::header::encode_call_with;
pub use crate::header::peek_function;

pub use crate::selector::SELECTOR_LEN;
pub use crate::selector::selector;
pub use crate::selector::signature;
#[cfg(feature = "keccak")]
pub use crate::selector::keccak_selector;

pub use neorlp::Decoder;
pub use neorlp::Encoder;
pub use num_bigint::BigInt;
