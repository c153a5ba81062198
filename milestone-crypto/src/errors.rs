//! # Errors
//! Errors raised while hashing, building paths or checking signatures

use thiserror::Error;

/// Everything that can go wrong before a verification result can be
/// produced. A signature that simply does not match is never an error, it
/// is reported as `Ok(false)`.
#[derive(Debug, Error)]
pub enum Error {
    /// The content or signature source could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A signature line is not valid hex. Lines are counted from 1.
    #[error("invalid hex on signature line {line}: {source}")]
    Hex {
        line: usize,
        #[source]
        source: hex::FromHexError,
    },
    /// The signature source ended before every security level was covered.
    #[error("expected {expected} signature fragment lines, found {found}")]
    MissingSignatureLine { expected: usize, found: usize },
    /// Content found after the optional authentication path line.
    #[error("unexpected content on signature line {line}")]
    TrailingSignatureLine { line: usize },
    /// A signature fragment does not have exactly one chunk per bundle value.
    #[error("invalid signature fragment size: {0}")]
    InvalidFragmentSize(usize),
    /// A private key is not a whole number of fragments.
    #[error("invalid key size: {0}")]
    InvalidKeySize(usize),
    /// The authentication path does not hold one sibling per tree level.
    #[error("invalid authentication path size {size} for depth {depth}")]
    InvalidPathSize { size: usize, depth: usize },
    /// The leaf index does not address a leaf of a tree of the given depth.
    #[error("leaf index {index} out of range for depth {depth}")]
    LeafIndexOutOfRange { index: u64, depth: usize },
    /// Security levels go from 1 to [`MAX_SECURITY_LEVEL`](crate::winternitz::MAX_SECURITY_LEVEL).
    #[error("invalid security level: {0}")]
    InvalidSecurityLevel(usize),
    /// The expected public key is not a hex encoded digest.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),
    /// A Merkle tree needs at least one leaf.
    #[error("merkle tree without leaves")]
    EmptyTree,
}
