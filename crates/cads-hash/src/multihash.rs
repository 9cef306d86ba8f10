use std::fmt;

use sha2::{Digest, Sha256};

use crate::hasher::HashError;

/// Digest function recorded in a multihash tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DigestFunction {
    /// SHA2-256, multihash code `0x12`.
    Sha2_256,
    /// BLAKE3 with a 32-byte output, multihash code `0x1e`.
    Blake3,
}

impl DigestFunction {
    /// Multihash code for this function.
    pub const fn code(self) -> u64 {
        match self {
            Self::Sha2_256 => 0x12,
            Self::Blake3 => 0x1e,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            0x12 => Some(Self::Sha2_256),
            0x1e => Some(Self::Blake3),
            _ => None,
        }
    }

    /// Digest length in bytes.
    pub const fn size(self) -> usize {
        32
    }

    pub fn digest(self, data: &[u8]) -> [u8; 32] {
        match self {
            Self::Sha2_256 => Sha256::digest(data).into(),
            Self::Blake3 => *blake3::hash(data).as_bytes(),
        }
    }
}

impl fmt::Display for DigestFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha2_256 => write!(f, "sha2-256"),
            Self::Blake3 => write!(f, "blake3"),
        }
    }
}

/// A digest tagged with the function that produced it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Multihash {
    function: DigestFunction,
    digest: Vec<u8>,
}

impl Multihash {
    /// Hash `data` with `function`.
    pub fn compute(function: DigestFunction, data: &[u8]) -> Self {
        Self {
            function,
            digest: function.digest(data).to_vec(),
        }
    }

    pub fn function(&self) -> DigestFunction {
        self.function
    }

    pub fn digest(&self) -> &[u8] {
        &self.digest
    }

    /// Hex of the bare digest, without the tag.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.digest)
    }

    /// Binary multihash: `varint(code) ++ varint(len) ++ digest`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.digest.len() + 2);
        encode_varint(&mut buf, self.function.code());
        encode_varint(&mut buf, self.digest.len() as u64);
        buf.extend_from_slice(&self.digest);
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, HashError> {
        let (code, consumed) = decode_varint(data)?;
        let rest = &data[consumed..];
        let function =
            DigestFunction::from_code(code).ok_or(HashError::UnknownDigestFunction(code))?;
        let (len, consumed) = decode_varint(rest)?;
        let digest = &rest[consumed..];
        if len as usize != function.size() || digest.len() != function.size() {
            return Err(HashError::DigestLength {
                expected: function.size(),
                actual: digest.len(),
            });
        }
        Ok(Self {
            function,
            digest: digest.to_vec(),
        })
    }

    /// Base58 rendering used as the textual content address.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.to_bytes()).into_string()
    }

    pub fn from_base58(s: &str) -> Result<Self, HashError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| HashError::InvalidEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Multihash({}:{})", self.function, &self.to_hex()[..8])
    }
}

impl fmt::Display for Multihash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// Encode a u64 as an unsigned LEB128 varint.
pub(crate) fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a varint. Returns (value, bytes_consumed).
pub(crate) fn decode_varint(data: &[u8]) -> Result<(u64, usize), HashError> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        if shift >= 64 {
            return Err(HashError::InvalidEncoding("varint overflow".into()));
        }
    }
    Err(HashError::InvalidEncoding("truncated varint".into()))
}
