//! # Function Signatures and Selectors
//!
//! A signature is the function name followed by the canonical text of its
//! argument tuple, e.g. `transfer(address,uint256)`. A selector is four bytes
//! derived from a signature by a caller-supplied hash.

use crate::error::Error;
use crate::error::Result;
use crate::types::TypeNode;

/// Length of a selector in bytes.
pub const SELECTOR_LEN: usize = 4;

/// Renders `name` followed by the canonical text of `schema`.
///
/// # Errors
/// Returns `Error::SchemaNotTuple` if `schema` is not a tuple.
pub fn signature(name: &str, schema: &TypeNode) -> Result<String> {
    if schema.as_tuple().is_none() {
        return Err(Error::SchemaNotTuple { found: schema.canonical() });
    }
    Ok(format!("{}{}", name, schema))
}

/// Derives a selector by hashing the signature with its final `)` replaced by `0x00`.
pub fn selector<H>(name: &str, schema: &TypeNode, hash: H) -> Result<[u8; SELECTOR_LEN]>
where
    H: FnOnce(&[u8]) -> [u8; SELECTOR_LEN],
{
    let mut bytes = signature(name, schema)?.into_bytes();
    if let Some(last) = bytes.last_mut() {
        *last = 0;
    }
    Ok(hash(&bytes))
}

/// `selector` using the first four bytes of Keccak-256.
#[cfg(feature = "keccak")]
pub fn keccak_selector(name: &str, schema: &TypeNode) -> Result<[u8; SELECTOR_LEN]> {
    use sha3::Digest;
    use sha3::Keccak256;

    selector(name, schema, |bytes| {
        let digest = Keccak256::digest(bytes);
        let mut out = [0u8; SELECTOR_LEN];
        out.copy_from_slice(&digest[..SELECTOR_LEN]);
        out
    })
}
