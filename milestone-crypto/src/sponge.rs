//! Stateful sponge hashing
//!
//! A [`Sponge`] accumulates input with [`Sponge::absorb`] and extracts
//! digest material with [`Sponge::squeeze`]. The only mode shipped is
//! [`Sha3`], a SHA3-256 backed sponge. Higher layers are generic over the
//! mode so alternative primitives can be plugged in.

use sha3::{Digest, Sha3_256};

use crate::hash::{Hash, HASH_LENGTH};

/// A stateful hash primitive.
///
/// Absorbing is associative: several calls without an intervening squeeze
/// are equivalent to one call with the concatenated input.
pub trait Sponge {
    /// include `bytes` in the state
    fn absorb(&mut self, bytes: &[u8]);

    /// fill `out` with digest material derived from the current state
    ///
    /// Output is produced in [`HASH_LENGTH`] blocks, each block being the
    /// digest of the previous one. After squeezing, the state is seeded
    /// with the last block; call [`Sponge::reset`] to start over.
    fn squeeze(&mut self, out: &mut [u8]);

    /// drop any absorbed input
    fn reset(&mut self);

    /// convenience one-shot hash producing a single digest
    fn hash(bytes: &[u8]) -> Hash<HASH_LENGTH>
    where
        Self: Default,
    {
        let mut sponge = Self::default();
        sponge.absorb(bytes);

        let mut out = [0; HASH_LENGTH];
        sponge.squeeze(&mut out);
        Hash::new(out)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Input {
    #[default]
    Empty,
    Zeros,
    Data,
}

/// SHA3-256 sponge
///
/// Input made only of zero bytes squeezes to
/// [`NULL_HASH`](crate::hash::NULL_HASH), which keeps empty padded
/// messages and unused tree leaves at the well-known null digest.
///
/// ```
/// use milestone_crypto::sponge::{Sha3, Sponge};
///
/// let mut sponge = Sha3::default();
/// sponge.absorb(b"Hello ");
/// sponge.absorb(b"world!");
///
/// let mut digest = [0u8; 32];
/// sponge.squeeze(&mut digest);
/// # assert_eq!(
/// #   "d6ea8f9a1f22e1298e5a9506bd066f23cc56001f5d36582344a628649df53ae8",
/// #   hex::encode(digest)
/// # );
/// ```
#[derive(Clone, Default)]
pub struct Sha3 {
    state: Sha3_256,
    input: Input,
}

impl Sponge for Sha3 {
    fn absorb(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        let zeros = bytes.iter().all(|b| *b == 0);

        self.input = match self.input {
            Input::Empty | Input::Zeros if zeros => Input::Zeros,
            _ => Input::Data,
        };

        Digest::update(&mut self.state, bytes);
    }

    fn squeeze(&mut self, out: &mut [u8]) {
        for chunk in out.chunks_mut(HASH_LENGTH) {
            let mut block = [0u8; HASH_LENGTH];

            if self.input == Input::Zeros {
                Digest::reset(&mut self.state);
            } else {
                block.copy_from_slice(&self.state.finalize_reset());
            }

            chunk.copy_from_slice(&block[..chunk.len()]);

            self.input = Input::Empty;
            self.absorb(&block);
        }
    }

    fn reset(&mut self) {
        Digest::reset(&mut self.state);
        self.input = Input::Empty;
    }
}

/// hash `message` with the default [`Sha3`] sponge
#[inline]
pub fn standard_hash(message: &[u8]) -> Hash<HASH_LENGTH> {
    Sha3::hash(message)
}
