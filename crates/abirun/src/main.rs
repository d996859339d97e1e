//! Abirun
//!
//! Encodes a fixed set of sample calls, prints the calldata, and checks that
//! each one decodes back to the same function number and arguments.

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use anyhow::ensure;

use neoabi::BigInt;
use neoabi::Value;
use neoabi::arr;
use neoabi::tup;

use rand::Rng;

use tracing::debug;
use tracing::info;

/// Function numbers for cases without a fixed one are drawn below this.
const RANDOM_FUNCTION_LIMIT: u64 = 260;

struct Case {
    function: Option<u64>,
    schema: &'static str,
    values: Value,
}

impl Case {
    fn new(function: Option<u64>, schema: &'static str, values: Value) -> Self {
        Self { function, schema, values }
    }
}

fn hex_int(digits: &str) -> Result<Value> {
    BigInt::parse_bytes(digits.as_bytes(), 16)
        .map(Value::Int)
        .ok_or_else(|| anyhow!("invalid hex integer {:?}", digits))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn cases() -> Result<Vec<Case>> {
    let addr0 = hex_int("e102030405060708090a0b0c0d0e0f0f0f0f0f0d")?;
    let addr1 = hex_int("b1b2b3b4b5b6b7b8b90a0b0c0d0e0c0c0c0c0c0c")?;

    let big_ints: Vec<Value> = [2u32, 0, 16_777_216, 16_777_217, 16_777_218, 16_777_219, 65_535]
        .into_iter()
        .map(Value::from)
        .collect();
    let flags = [false, false, false, false, false, true, true, true, true, true, true, true];

    Ok(vec![
        Case::new(Some(64), "(uint8)", tup![0xFEu8]),
        Case::new(Some(60), "(uint8,())", tup![0xFEu8, tup![]]),
        Case::new(Some(100), "(bytes,bytes1)", tup![vec![0u8; 3], vec![0u8]]),
        Case::new(None, "(uint72[])", tup![Value::Arr(big_ints)]),
        Case::new(None, "(bool[12])", tup![Value::Arr(flags.into_iter().map(Value::Bool).collect())]),
        Case::new(None, "(bool[8],bool[],bool[])", tup![
            arr![true, true, true, true, true, true, true, true],
            arr![],
            arr![false, false, true],
        ]),
        Case::new(None, "(uint72,uint72[])", tup![10u8, arr![2u8, 0u8]]),
        Case::new(None, "(string,string[][])", tup!["abcd", arr![arr!["abcd", "efg"]]]),
        Case::new(None, "(function)", tup![(0u8..24).collect::<Vec<u8>>()]),
        Case::new(None, "((bool[])[])", tup![arr![
            tup![arr![true, false, false]],
            tup![arr![true, true, true]],
        ]]),
        Case::new(None, "(fixed128x18,fixed128x18)", tup![10u8, 125_000u32]),
        Case::new(None, "((string,bool,bool,int72)[2],uint8)", tup![
            arr![tup!["A", false, true, 10u8], tup!["B", true, false, 1u8]],
            255u8,
        ]),
        Case::new(None, "((function,bytes,(int16,bytes)),string)", tup![
            tup![vec![0u8; 24], vec![0xFBu8, 0x04], tup![-10i16, vec![0u8, 1, 3, 5, 7, 10, 0xFF]]],
            "Oi!",
        ]),
        Case::new(None, "(address,int16)", tup![addr0.clone(), -2i16]),
        Case::new(None, "((address),(address,address))", tup![tup![addr0.clone()], tup![addr1, addr0]]),
    ])
}

fn run_case(index: usize, case: &Case, rng: &mut impl Rng) -> Result<()> {
    let schema = neoabi::parse_type(case.schema)
        .with_context(|| format!("case {}: bad schema {:?}", index, case.schema))?;
    let function = case.function.unwrap_or_else(|| rng.gen_range(0..RANDOM_FUNCTION_LIMIT));
    let signature = neoabi::signature("foo", &schema)?;

    let calldata = neoabi::encode_call(function, &schema, &case.values)
        .with_context(|| format!("case {}: encoding {}", index, signature))?;
    println!(
        "case{}:\t\t{}\t\t{} --> {}\t\t (len {})",
        index,
        function,
        signature,
        to_hex(&calldata),
        calldata.len()
    );

    let selector = neoabi::keccak_selector("foo", &schema)?;
    debug!(case = index, selector = %to_hex(&selector), "selector");

    let (decoded_fn, decoded) = neoabi::decode_call(&schema, &calldata)
        .with_context(|| format!("case {}: decoding {}", index, signature))?;
    ensure!(decoded_fn == function, "case {}: function {} != {}", index, decoded_fn, function);
    ensure!(decoded == case.values, "case {}: {:?} != {:?}", index, decoded, case.values);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("abirun=info".parse()?),
        )
        .init();

    let cases = cases()?;
    let mut rng = rand::thread_rng();

    println!("#\t\t\tfn#\t\tSignature\t\tCalldata example");
    for (index, case) in cases.iter().enumerate() {
        run_case(index, case, &mut rng)?;
    }

    info!(cases = cases.len(), "all cases round-tripped");
    Ok(())
}
