//! Content hasher for content-addressed datasets.
//!
//! Addresses are base58-rendered multihashes: a varint digest-function code,
//! a varint digest length, then the digest itself. The tag travels with the
//! address, so an address can always be re-verified with the function that
//! produced it.

pub mod hasher;
pub mod multihash;

pub use hasher::{hash_bytes, hash_json, ContentHasher, HashError};
pub use multihash::{DigestFunction, Multihash};
