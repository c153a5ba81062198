//! Strongly typed digests
//!
//! [`struct@Hash`] wraps a fixed size byte array and renders as lowercase
//! hex. Digests produced by the [`Sponge`](crate::sponge::Sponge)
//! primitives are [`HASH_LENGTH`] bytes long.
//!
//! # Example
//!
//! ```
//! use milestone_crypto::hash::Hash;
//!
//! let digest: Hash<32> = "d6ea8f9a1f22e1298e5a9506bd066f23cc56001f5d36582344a628649df53ae8"
//!     .parse()
//!     .unwrap();
//!
//! assert_eq!(digest, milestone_crypto::sponge::standard_hash(b"Hello world!"));
//! ```

#[allow(clippy::module_inception)]
mod hash;
mod serde;

pub use self::hash::Hash;

/// size in bytes of every digest squeezed by the sponge primitives
pub const HASH_LENGTH: usize = 32;

/// sentinel digest made of zeros, produced by hashing all-zero input
pub const NULL_HASH: Hash<HASH_LENGTH> = Hash::new([0; HASH_LENGTH]);
