//! # Type Parser
//!
//! Recursive descent from a textual signature such as `"(uint8,bool[],bytes32)"`
//! to a `TypeNode` tree.
//!
//! ## Invariants
//! - **Arrays First**: A trailing `[..]` suffix is always stripped before the
//!   remaining prefix is dispatched, so arrays of tuples and tuples of arrays both
//!   parse.
//! - **Opt-in Limits**: `parse_type` accepts any well-formed text. Callers
//!   parsing untrusted text bound its length and nesting with `ParseConfig`.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::codec::MAX_RECURSION_DEPTH;
use crate::error::Error;
use crate::error::Result;
use crate::types::BytesType;
use crate::types::IntForm;
use crate::types::IntType;
use crate::types::TypeNode;

/// Largest decimal scale accepted by `fixedMxN`.
pub const MAX_FIXED_SCALE: u16 = 80;

/// Limits applied while parsing untrusted schema text.
///
/// The default imposes none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Longest accepted input, in bytes.
    pub max_len: usize,
    /// Deepest accepted nesting of arrays and tuples.
    pub max_depth: usize,
}

impl ParseConfig {
    /// 2000 characters and `MAX_RECURSION_DEPTH` levels.
    pub const fn bounded() -> Self {
        Self { max_len: 2_000, max_depth: MAX_RECURSION_DEPTH }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self { max_len: usize::MAX, max_depth: usize::MAX }
    }
}

/// Parses a type signature without length or depth limits.
pub fn parse_type(text: &str) -> Result<TypeNode> {
    parse_type_with(text, &ParseConfig::default())
}

/// Parses a type signature.
///
/// # Errors
/// Returns `Error::TypeSyntax` for unmatched brackets or parentheses, empty tuple
/// fields, unknown base types, invalid numeric suffixes, trailing characters, or
/// input beyond the configured limits.
pub fn parse_type_with(text: &str, config: &ParseConfig) -> Result<TypeNode> {
    let text = text.trim();
    if text.len() > config.max_len {
        return Err(Error::syntax(text, format!("longer than {} characters", config.max_len)));
    }
    let parser = Parser { input: text, config };
    parser.parse(text, 0)
}

impl FromStr for TypeNode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_type(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    config: &'a ParseConfig,
}

impl Parser<'_> {
    fn error(&self, reason: impl Into<String>) -> Error {
        Error::syntax(self.input, reason)
    }

    fn parse(&self, raw: &str, depth: usize) -> Result<TypeNode> {
        if depth > self.config.max_depth {
            return Err(self.error(format!("nested deeper than {}", self.config.max_depth)));
        }

        if let Some(body) = raw.strip_suffix(']') {
            let open = body
                .rfind('[')
                .ok_or_else(|| self.error(format!("unmatched ']' in {:?}", raw)))?;
            let element = self.parse(&body[..open], depth + 1)?;
            let len = match &body[open + 1..] {
                "" => None,
                digits => Some(self.parse_len(digits)?),
            };
            return Ok(TypeNode::array(element, len));
        }

        if raw.starts_with('(') {
            return self.parse_tuple(raw, depth);
        }

        if let Some(ty) = builtins().get(raw) {
            return Ok(ty.clone());
        }

        match parse_fixed(raw) {
            Some(ty) => Ok(TypeNode::Int(ty)),
            None => Err(self.error(format!("unrecognized type {:?}", raw))),
        }
    }

    fn parse_len(&self, digits: &str) -> Result<usize> {
        let well_formed = digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'));
        if !well_formed {
            return Err(self.error(format!("bad array length {:?}", digits)));
        }
        digits
            .parse::<usize>()
            .map_err(|_| self.error(format!("array length {:?} out of range", digits)))
    }

    /// Assumes `raw` starts with `(`.
    fn parse_tuple(&self, raw: &str, depth: usize) -> Result<TypeNode> {
        if raw == "()" {
            return Ok(TypeNode::tuple(Vec::new()));
        }

        let mut elements = Vec::new();
        let mut start = 1;
        let mut nest = 0usize;

        for (i, c) in raw.bytes().enumerate().skip(1) {
            match c {
                b'(' => nest += 1,
                b')' if nest > 0 => nest -= 1,
                b',' | b')' if nest == 0 => {
                    let field = &raw[start..i];
                    if field.is_empty() {
                        return Err(self.error(format!("empty element {} in {:?}", elements.len(), raw)));
                    }
                    elements.push(self.parse(field, depth + 1)?);
                    start = i + 1;

                    if c == b')' {
                        if start != raw.len() {
                            return Err(self.error(format!("trailing characters after {:?}", &raw[..start])));
                        }
                        return Ok(TypeNode::tuple(elements));
                    }
                }
                _ => {}
            }
        }

        Err(self.error(format!("unterminated tuple {:?}", raw)))
    }
}

/// The read-only table of named base types, built on first use.
fn builtins() -> &'static HashMap<String, TypeNode> {
    static TABLE: OnceLock<HashMap<String, TypeNode>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map = HashMap::with_capacity(128);

        let ints = (8..=256u16)
            .step_by(8)
            .flat_map(|bits| [IntType::new(bits, true), IntType::new(bits, false)])
            .flatten();
        for ty in ints {
            map.insert(ty.to_string(), TypeNode::Int(ty));
        }

        for ty in (1..=32).filter_map(BytesType::fixed) {
            map.insert(ty.to_string(), TypeNode::Bytes(ty));
        }

        let named = [
            ("bool", TypeNode::Bool),
            ("string", TypeNode::String),
            ("bytes", TypeNode::Bytes(BytesType::dynamic())),
            ("function", TypeNode::Bytes(BytesType::function())),
            ("address", TypeNode::Int(IntType::address())),
        ];
        for (name, ty) in named {
            map.insert(name.to_string(), ty);
        }

        map
    })
}

/// Matches `fixedMxN` / `ufixedMxN`.
fn parse_fixed(raw: &str) -> Option<IntType> {
    let (signed, rest) = match raw.strip_prefix("ufixed") {
        Some(rest) => (false, rest),
        None => (true, raw.strip_prefix("fixed")?),
    };
    let (m, n) = rest.split_once('x')?;
    let bits = parse_positive(m)?;
    let scale = parse_positive(n)?;
    if scale > MAX_FIXED_SCALE {
        return None;
    }
    IntType::with_form(bits, signed, IntForm::Fixed { scale: scale as u8 })
}

/// Decimal digits with a lead digit of 1-9.
fn parse_positive(digits: &str) -> Option<u16> {
    let first = digits.bytes().next()?;
    if !(b'1'..=b'9').contains(&first) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArrayType;
    use crate::types::TupleType;

    fn assert_syntax_error(text: &str) {
        match parse_type(text) {
            Err(Error::TypeSyntax { .. }) => {},
            res => panic!("Expected TypeSyntax for {:?}, got {:?}", text, res),
        }
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_type("bool").unwrap(), TypeNode::Bool);
        assert_eq!(parse_type("uint8").unwrap(), TypeNode::int(8, false).unwrap());
        assert_eq!(parse_type("int256").unwrap(), TypeNode::int(256, true).unwrap());
        assert_eq!(parse_type("string").unwrap(), TypeNode::String);
        assert_eq!(parse_type("bytes").unwrap(), TypeNode::Bytes(BytesType::dynamic()));
        assert_eq!(parse_type("bytes32").unwrap(), TypeNode::Bytes(BytesType::fixed(32).unwrap()));
        assert_eq!(parse_type("function").unwrap(), TypeNode::Bytes(BytesType::function()));
    }

    #[test]
    fn test_parse_address_is_uint160() {
        let TypeNode::Int(ty) = parse_type("address").unwrap() else {
            panic!("Expected integer");
        };
        assert_eq!(ty.bits(), 160);
        assert!(!ty.signed());
        assert_eq!(ty.form(), IntForm::Address);
    }

    #[test]
    fn test_parse_fixed_point() {
        let ty = parse_type("ufixed256x80").unwrap();
        assert_eq!(ty.canonical(), "ufixed256x80");
        let TypeNode::Int(int) = ty else { panic!("Expected integer") };
        assert_eq!(int.byte_width(), 32);

        let TypeNode::Int(int) = parse_type("fixed168x10").unwrap() else { panic!("Expected integer") };
        assert!(int.signed());
        assert_eq!(int.form(), IntForm::Fixed { scale: 10 });
        assert_eq!(int.byte_width(), 21);
    }

    #[test]
    fn test_parse_fixed_point_rejects() {
        for text in ["fixed0x18", "fixed7x18", "fixed264x18", "fixed128x81", "fixed128x0", "fixed08x1", "fixed128x", "fixedx18", "ufixed128y18"] {
            assert_syntax_error(text);
        }
    }

    #[test]
    fn test_parse_arrays() {
        assert_eq!(
            parse_type("uint72[]").unwrap(),
            TypeNode::Array(ArrayType::new(TypeNode::int(72, false).unwrap(), None))
        );
        assert_eq!(parse_type("bool[0]").unwrap(), TypeNode::array(TypeNode::Bool, Some(0)));
        let ty = parse_type("string[][3]").unwrap();
        assert_eq!(ty, TypeNode::array(TypeNode::array(TypeNode::String, None), Some(3)));
        assert_eq!(ty.canonical(), "string[][3]");
    }

    #[test]
    fn test_parse_tuples() {
        assert_eq!(parse_type("()").unwrap(), TypeNode::Tuple(TupleType::default()));
        let ty = parse_type("(uint8,bool[],bytes32)").unwrap();
        assert_eq!(ty.as_tuple().unwrap().arity(), 3);
        assert_eq!(ty.canonical(), "(uint8,bool[],bytes32)");
    }

    #[test]
    fn test_parse_nested_tuples_and_arrays() {
        for text in [
            "(bool[])[]",
            "((function,bytes,(int16,bytes)),string)",
            "(string,bool,bool,int72)[2]",
            "(uint8,())",
            "((),((),()))[1][]",
            "(fixed128x3)[]",
        ] {
            let ty = parse_type(text).unwrap();
            assert_eq!(ty.canonical(), text);
        }
    }

    #[test]
    fn test_parse_fixed_point_in_tuple() {
        let ty = parse_type("(fixed128x18,fixed168x10[2])").unwrap();
        assert_eq!(ty.canonical(), "(fixed128x18,fixed168x10[2])");
        let reparsed = parse_type(&ty.canonical()).unwrap();
        assert_eq!(reparsed, ty);
    }

    #[test]
    fn test_parse_trims_outer_whitespace() {
        assert_eq!(parse_type("  (bool) ").unwrap().canonical(), "(bool)");
    }

    #[test]
    fn test_parse_rejects() {
        for text in [
            "", "[]", "[1]", "82]", "uint8]", "uint8[", "uint8[01]", "uint8[-1]", "uint8[ 1]",
            "uint8[1]]", "uint", "uint7", "int264", "bytes0", "bytes33", "Bool",
            "(", "(,)", "(uint8,)", "(,uint8)", "(uint8", "(uint8))", "(uint8)x", "((uint8)",
            "(uint8, bool)", "tuple", "fixed", "ufixed", "decimal",
        ] {
            assert_syntax_error(text);
        }
    }

    #[test]
    fn test_parse_array_length_overflow() {
        assert_syntax_error("bool[99999999999999999999999999]");
    }

    #[test]
    fn test_parse_long_schema_unbounded() {
        let fields = vec!["uint256"; 300].join(",");
        let text = format!("({})", fields);
        assert!(text.len() > 2_000);
        let ty = parse_type(&text).unwrap();
        assert_eq!(ty.as_tuple().unwrap().arity(), 300);

        match parse_type_with(&text, &ParseConfig::bounded()) {
            Err(Error::TypeSyntax { .. }) => {},
            res => panic!("Expected TypeSyntax, got {:?}", res),
        }
    }

    #[test]
    fn test_parse_deep_schema_unbounded() {
        let text = format!("{}bool{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_type(&text).unwrap().canonical(), text);
        assert!(matches!(parse_type_with(&text, &ParseConfig::bounded()), Err(Error::TypeSyntax { .. })));
    }

    #[test]
    fn test_parse_limits() {
        let config = ParseConfig { max_len: 10, max_depth: 64 };
        assert!(parse_type_with("(uint8)", &config).is_ok());
        assert!(matches!(parse_type_with("(uint8,uint8)", &config), Err(Error::TypeSyntax { .. })));

        let config = ParseConfig { max_len: 2_000, max_depth: 3 };
        assert!(parse_type_with("((bool))", &config).is_ok());
        assert!(matches!(parse_type_with("((((bool))))", &config), Err(Error::TypeSyntax { .. })));
        assert!(matches!(parse_type_with("bool[][][][]", &config), Err(Error::TypeSyntax { .. })));
    }

    #[test]
    fn test_from_str() {
        let ty: TypeNode = "(address,int16)".parse().unwrap();
        assert_eq!(ty.canonical(), "(address,int16)");
    }
}
