use cads_types::Address;

use crate::multihash::{DigestFunction, Multihash};

/// Multihash content hasher.
///
/// Produces the bare content address (no store prefix) of a byte sequence.
/// Identical bytes always produce the identical address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    function: DigestFunction,
}

impl ContentHasher {
    /// SHA2-256 hasher. Addresses are IPFS-compatible `Qm…` strings.
    pub const SHA2_256: Self = Self {
        function: DigestFunction::Sha2_256,
    };
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self {
        function: DigestFunction::Blake3,
    };

    pub const fn new(function: DigestFunction) -> Self {
        Self { function }
    }

    pub fn function(&self) -> DigestFunction {
        self.function
    }

    /// Hash raw bytes to a content address.
    pub fn hash_bytes(&self, data: &[u8]) -> Address {
        Address::new(Multihash::compute(self.function, data).to_base58())
    }

    /// Hash a value's JSON encoding.
    ///
    /// Components must be passed in their object form; the JSON produced by
    /// `serde_json` is the canonical encoding.
    pub fn hash_json<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<Address, HashError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HashError::Serialization(e.to_string()))?;
        Ok(self.hash_bytes(&data))
    }

    /// Verify that `data` hashes to `address`.
    ///
    /// The digest function is read from the address tag, not from `self`, so
    /// any hasher verifies any supported address. `address` must be a bare
    /// hash, without store prefix or file segments.
    pub fn verify(data: &[u8], address: &str) -> Result<bool, HashError> {
        let expected = Multihash::from_base58(address)?;
        let actual = Multihash::compute(expected.function(), data);
        Ok(actual == expected)
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::SHA2_256
    }
}

/// Hash bytes with the default (SHA2-256) hasher.
pub fn hash_bytes(data: &[u8]) -> Address {
    ContentHasher::default().hash_bytes(data)
}

/// Hash a value's JSON encoding with the default hasher.
pub fn hash_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Address, HashError> {
    ContentHasher::default().hash_json(value)
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HashError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid multihash encoding: {0}")]
    InvalidEncoding(String),

    #[error("unknown digest function code: {0:#x}")]
    UnknownDigestFunction(u64),

    #[error("invalid digest length: expected {expected}, got {actual}")]
    DigestLength { expected: usize, actual: usize },
}
