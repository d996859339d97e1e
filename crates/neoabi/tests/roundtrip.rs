//! Randomized round-trip tests over generated schemas and values.

use neoabi::BigInt;
use neoabi::BytesType;
use neoabi::IntForm;
use neoabi::IntType;
use neoabi::TypeNode;
use neoabi::Value;

use num_bigint::Sign;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

const CASES: u64 = 500;

fn random_int_type(rng: &mut StdRng) -> IntType {
    match rng.gen_range(0..10) {
        0 => IntType::address(),
        1 => {
            let scale = rng.gen_range(1..=80);
            IntType::with_form(8 * rng.gen_range(1..=32), rng.gen_bool(0.5), IntForm::Fixed { scale })
                .unwrap()
        },
        _ => IntType::new(8 * rng.gen_range(1..=32), rng.gen_bool(0.5)).unwrap(),
    }
}

fn random_type(rng: &mut StdRng, depth: usize) -> TypeNode {
    let leaf = depth >= 3 || rng.gen_bool(0.5);
    if leaf {
        return match rng.gen_range(0..6) {
            0 => TypeNode::Bool,
            1 | 2 => TypeNode::Int(random_int_type(rng)),
            3 => TypeNode::Bytes(BytesType::fixed(rng.gen_range(1..=32)).unwrap()),
            4 => TypeNode::Bytes(if rng.gen_bool(0.8) { BytesType::dynamic() } else { BytesType::function() }),
            _ => TypeNode::String,
        };
    }

    if rng.gen_bool(0.5) {
        let len = if rng.gen_bool(0.5) { None } else { Some(rng.gen_range(0..=4)) };
        TypeNode::array(random_type(rng, depth + 1), len)
    } else {
        random_tuple(rng, depth + 1)
    }
}

fn random_tuple(rng: &mut StdRng, depth: usize) -> TypeNode {
    let arity = rng.gen_range(0..=4);
    TypeNode::tuple((0..arity).map(|_| random_type(rng, depth)).collect())
}

fn random_int(rng: &mut StdRng, ty: &IntType) -> BigInt {
    let mut raw = vec![0u8; ty.byte_width()];
    match rng.gen_range(0..8) {
        // Zero
        0 => {},
        // All ones: the maximum, or -1 when signed.
        1 => raw.fill(0xFF),
        _ => rng.fill(&mut raw[..]),
    }
    if ty.signed() {
        BigInt::from_signed_bytes_be(&raw)
    } else {
        BigInt::from_bytes_be(Sign::Plus, &raw)
    }
}

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut out = vec![0u8; len];
    rng.fill(&mut out[..]);
    out
}

fn random_string(rng: &mut StdRng) -> String {
    const CHARS: &[char] = &['a', 'Z', '0', ' ', 'é', 'ß', '∑', '🦀'];
    let len = rng.gen_range(0..70);
    (0..len).map(|_| CHARS[rng.gen_range(0..CHARS.len())]).collect()
}

fn random_value(rng: &mut StdRng, ty: &TypeNode) -> Value {
    match ty {
        TypeNode::Bool => Value::Bool(rng.gen_bool(0.5)),
        TypeNode::Int(int) => Value::Int(random_int(rng, int)),
        TypeNode::Bytes(b) => {
            let len = b.len().unwrap_or_else(|| rng.gen_range(0..80));
            Value::Bytes(random_bytes(rng, len))
        },
        TypeNode::String => Value::Str(random_string(rng)),
        TypeNode::Array(arr) => {
            let len = arr.len().unwrap_or_else(|| rng.gen_range(0..12));
            Value::Arr((0..len).map(|_| random_value(rng, arr.element())).collect())
        },
        TypeNode::Tuple(tuple) => {
            Value::Tup(tuple.elements().iter().map(|e| random_value(rng, e)).collect())
        },
    }
}

fn random_function(rng: &mut StdRng) -> u64 {
    match rng.gen_range(0..4) {
        0 => rng.gen_range(0..63),
        1 => rng.gen_range(63..300),
        2 => rng.gen_range(300..u64::MAX),
        _ => u64::MAX,
    }
}

// --- Test 1: Calls Survive a Round Trip ---

#[test]
fn test_random_calls_roundtrip() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for _ in 0..CASES {
        let schema = random_tuple(&mut rng, 0);
        let values = random_value(&mut rng, &schema);
        let function = random_function(&mut rng);

        let bytes = neoabi::encode_call(function, &schema, &values)?;
        let (decoded_fn, decoded) = neoabi::decode_call(&schema, &bytes)?;

        assert_eq!(decoded_fn, function, "schema {}", schema);
        assert_eq!(decoded, values, "schema {}", schema);
        assert_eq!(neoabi::peek_function(&bytes)?, function);
    }
    Ok(())
}

// --- Test 2: Encoding Is Deterministic and Exactly Sized ---

#[test]
fn test_random_encoding_deterministic() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);

    for _ in 0..CASES {
        let ty = random_type(&mut rng, 0);
        let value = random_value(&mut rng, &ty);

        let first = neoabi::encode_value(&ty, &value)?;
        let second = neoabi::encode_value(&ty, &value)?;
        assert_eq!(first, second);
        assert_eq!(neoabi::encoded_len(&ty, &value)?, first.len());
        assert_eq!(neoabi::decode_value(&ty, &first)?, value);
    }
    Ok(())
}

// --- Test 3: Canonical Text Survives Parsing ---

#[test]
fn test_random_canonical_text() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..CASES {
        let ty = random_type(&mut rng, 0);
        let text = neoabi::canonical_text(&ty);
        let parsed = neoabi::parse_type(&text)?;

        assert_eq!(parsed, ty, "text {}", text);
        assert_eq!(neoabi::canonical_text(&parsed), text);
    }
    Ok(())
}

// --- Test 4: Truncation and Trailing Bytes Are Rejected ---

#[test]
fn test_random_prefixes_rejected() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(1234);

    for _ in 0..100 {
        let schema = random_tuple(&mut rng, 0);
        let values = random_value(&mut rng, &schema);
        let bytes = neoabi::encode_call(random_function(&mut rng), &schema, &values)?;

        for cut in 0..bytes.len() {
            match neoabi::decode_call(&schema, &bytes[..cut]) {
                Err(e) if e.is_malformed() => {},
                res => panic!("Expected malformed for {} cut at {}, got {:?}", schema, cut, res),
            }
        }

        let mut extended = bytes.clone();
        extended.push(rng.gen_range(0..=255));
        match neoabi::decode_call(&schema, &extended) {
            Err(neoabi::Error::TrailingData { offset, remaining: 1 }) => assert_eq!(offset, bytes.len()),
            res => panic!("Expected TrailingData for {}, got {:?}", schema, res),
        }
    }
    Ok(())
}
