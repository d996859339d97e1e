//! # Values
//!
//! A runtime value tree that mirrors the kinds of `TypeNode`.
//!
//! A `Value` is only meaningful relative to a schema; arity, kind and numeric
//! range are checked when it is encoded.

use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    /// Any integer kind, including `address` and fixed-point types.
    Int(BigInt),
    /// `bytesN`, `bytes` and `function`.
    Bytes(Vec<u8>),
    Str(String),
    /// Elements of a fixed or dynamic array.
    Arr(Vec<Value>),
    /// Fields of a tuple, in schema order.
    Tup(Vec<Value>),
}

impl Value {
    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Int(_) => "integer",
            Value::Bytes(_) => "bytes",
            Value::Str(_) => "string",
            Value::Arr(_) => "array",
            Value::Tup(_) => "tuple",
        }
    }

    pub fn int(v: impl Into<BigInt>) -> Self {
        Value::Int(v.into())
    }

    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of an array or fields of a tuple.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Arr(items) | Value::Tup(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(BigInt::from(v))
                }
            }
        )*
    };
}

impl_from_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl From<BigInt> for Value {
    fn from(v: BigInt) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

/// Builds a `Value::Tup` from a list of expressions convertible into `Value`.
///
/// ```
/// use neoabi::Value;
/// use neoabi::tup;
///
/// let args = tup![true, 254u8, "hi"];
/// assert_eq!(args, Value::Tup(vec![Value::Bool(true), Value::int(254), Value::Str("hi".into())]));
/// ```
#[macro_export]
macro_rules! tup {
    ($($v:expr),* $(,)?) => {
        $crate::Value::Tup(vec![$($crate::Value::from($v)),*])
    };
}

/// Builds a `Value::Arr` from a list of expressions convertible into `Value`.
#[macro_export]
macro_rules! arr {
    ($($v:expr),* $(,)?) => {
        $crate::Value::Arr(vec![$($crate::Value::from($v)),*])
    };
}
