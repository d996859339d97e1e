//! # Type Tree
//!
//! Immutable descriptors for every position in a schema.
//!
//! ## Invariants
//! - **Closed**: Each kind carries exactly the fields it needs; there is no way to
//!   build an array with a bit width or an integer with an element type.
//! - **Derived Names**: The canonical name is computed from the structure and can
//!   not be set independently.

use std::fmt;

/// How an integer type is spelled. The wire form is identical for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntForm {
    /// `intN` / `uintN`
    Plain,
    /// `address`, an unsigned 160-bit integer.
    Address,
    /// `fixedMxN` / `ufixedMxN`, an integer carrying a decimal scale.
    Fixed { scale: u8 },
}

/// A fixed-width two's-complement integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntType {
    bits: u16,
    signed: bool,
    form: IntForm,
}

impl IntType {
    /// Returns `None` unless `bits` is a multiple of 8 in `8..=256`.
    pub const fn new(bits: u16, signed: bool) -> Option<Self> {
        Self::with_form(bits, signed, IntForm::Plain)
    }

    pub const fn with_form(bits: u16, signed: bool, form: IntForm) -> Option<Self> {
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return None;
        }
        Some(Self { bits, signed, form })
    }

    pub const fn address() -> Self {
        Self { bits: 160, signed: false, form: IntForm::Address }
    }

    pub const fn bits(&self) -> u16 {
        self.bits
    }

    pub const fn byte_width(&self) -> usize {
        self.bits as usize / 8
    }

    pub const fn signed(&self) -> bool {
        self.signed
    }

    pub const fn form(&self) -> IntForm {
        self.form
    }
}

/// Spelling of a byte string type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BytesForm {
    Plain,
    /// `function`: a 24-byte address plus selector.
    Function,
}

/// Byte width of the `function` type.
pub const FUNCTION_LEN: usize = 24;

/// Raw bytes, fixed (`bytes1`..`bytes32`, `function`) or dynamic (`bytes`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BytesType {
    len: Option<usize>,
    form: BytesForm,
}

impl BytesType {
    /// The dynamic `bytes` type.
    pub const fn dynamic() -> Self {
        Self { len: None, form: BytesForm::Plain }
    }

    /// `bytesN`, `None` unless `len` is in `1..=32`.
    pub const fn fixed(len: usize) -> Option<Self> {
        if len == 0 || len > 32 {
            return None;
        }
        Some(Self { len: Some(len), form: BytesForm::Plain })
    }

    pub const fn function() -> Self {
        Self { len: Some(FUNCTION_LEN), form: BytesForm::Function }
    }

    /// Declared length, `None` when dynamic.
    pub const fn len(&self) -> Option<usize> {
        self.len
    }

    pub const fn form(&self) -> BytesForm {
        self.form
    }
}

/// A homogeneous sequence, fixed (`T[N]`) or dynamic (`T[]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: Box<TypeNode>,
    len: Option<usize>,
}

impl ArrayType {
    pub fn new(element: TypeNode, len: Option<usize>) -> Self {
        Self { element: Box::new(element), len }
    }

    pub fn element(&self) -> &TypeNode {
        &self.element
    }

    /// Declared length, `None` when dynamic.
    pub fn len(&self) -> Option<usize> {
        self.len
    }

    pub fn is_dynamic(&self) -> bool {
        self.len.is_none()
    }
}

/// An ordered, fixed-arity product of types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TupleType {
    elements: Vec<TypeNode>,
}

impl TupleType {
    pub fn new(elements: Vec<TypeNode>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[TypeNode] {
        &self.elements
    }

    pub fn arity(&self) -> usize {
        self.elements.len()
    }
}

/// One node of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeNode {
    Bool,
    Int(IntType),
    Bytes(BytesType),
    String,
    Array(ArrayType),
    Tuple(TupleType),
}

impl TypeNode {
    /// Shorthand for `intN` / `uintN`, `None` unless `bits` is a multiple of 8
    /// in `8..=256`.
    pub fn int(bits: u16, signed: bool) -> Option<Self> {
        IntType::new(bits, signed).map(TypeNode::Int)
    }

    pub fn array(element: TypeNode, len: Option<usize>) -> Self {
        TypeNode::Array(ArrayType::new(element, len))
    }

    pub fn tuple(elements: Vec<TypeNode>) -> Self {
        TypeNode::Tuple(TupleType::new(elements))
    }

    /// The minimal textual signature of this node.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    pub fn as_tuple(&self) -> Option<&TupleType> {
        match self {
            TypeNode::Tuple(t) => Some(t),
            _ => None,
        }
    }

    /// Short name of the node's kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            TypeNode::Bool => "bool",
            TypeNode::Int(_) => "integer",
            TypeNode::Bytes(_) => "bytes",
            TypeNode::String => "string",
            TypeNode::Array(_) => "array",
            TypeNode::Tuple(_) => "tuple",
        }
    }

    /// Nesting depth; scalars are 1.
    pub fn depth(&self) -> usize {
        match self {
            TypeNode::Array(a) => 1 + a.element().depth(),
            TypeNode::Tuple(t) => 1 + t.elements().iter().map(TypeNode::depth).max().unwrap_or(0),
            _ => 1,
        }
    }

    /// The fewest bytes any value of this type occupies on the wire.
    ///
    /// Used to bound wire-supplied counts before anything is allocated.
    pub fn min_encoded_len(&self) -> usize {
        match self {
            TypeNode::Bool => 1,
            TypeNode::Int(i) => i.byte_width(),
            TypeNode::Bytes(b) => b.len().unwrap_or(1),
            TypeNode::String => 1,
            TypeNode::Array(a) => match (a.len(), a.element()) {
                (None, _) => 1,
                (Some(n), TypeNode::Bool) => n.div_ceil(8),
                (Some(n), elem) => n.saturating_mul(elem.min_encoded_len()),
            },
            TypeNode::Tuple(t) => t
                .elements()
                .iter()
                .fold(0usize, |acc, e| acc.saturating_add(e.min_encoded_len())),
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let u = if self.signed { "" } else { "u" };
        match self.form {
            IntForm::Plain => write!(f, "{}int{}", u, self.bits),
            IntForm::Address => write!(f, "address"),
            IntForm::Fixed { scale } => write!(f, "{}fixed{}x{}", u, self.bits, scale),
        }
    }
}

impl fmt::Display for BytesType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.form, self.len) {
            (BytesForm::Function, _) => write!(f, "function"),
            (BytesForm::Plain, Some(n)) => write!(f, "bytes{}", n),
            (BytesForm::Plain, None) => write!(f, "bytes"),
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeNode::Bool => write!(f, "bool"),
            TypeNode::Int(i) => write!(f, "{}", i),
            TypeNode::Bytes(b) => write!(f, "{}", b),
            TypeNode::String => write!(f, "string"),
            TypeNode::Array(a) => match a.len() {
                Some(n) => write!(f, "{}[{}]", a.element(), n),
                None => write!(f, "{}[]", a.element()),
            },
            TypeNode::Tuple(t) => {
                write!(f, "(")?;
                for (i, e) in t.elements().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", e)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Renders the canonical signature of a type tree.
pub fn canonical_text(node: &TypeNode) -> String {
    node.canonical()
}
