//! Hash-chain one-time signatures
//!
//! A message digest is read as signed nibbles, one per 32 byte chunk of a
//! key fragment. Signing a chunk reveals the key chunk hashed
//! `MAX_VALUE - v` times; verifying hashes the revealed chunk another
//! `v - MIN_VALUE` times, ending at the public chain head. Each security
//! level signs sixteen nibbles, normalized so that they sum to zero.

use crate::hash::{Hash, HASH_LENGTH};
use crate::sponge::Sponge;
use crate::Error;

pub const MIN_VALUE: i8 = -8;
pub const MAX_VALUE: i8 = 7;

/// number of bundle values, and key chunks, covered by one security level
pub const NORMALIZED_FRAGMENT_LENGTH: usize = 16;

/// size in bytes of a key or signature fragment
pub const FRAGMENT_LENGTH: usize = HASH_LENGTH * NORMALIZED_FRAGMENT_LENGTH;

/// total number of values in a normalized bundle
pub const BUNDLE_LENGTH: usize = HASH_LENGTH * 2;

pub const MAX_SECURITY_LEVEL: usize = BUNDLE_LENGTH / NORMALIZED_FRAGMENT_LENGTH;

pub type NormalizedBundle = [i8; BUNDLE_LENGTH];

const CHAIN_LENGTH: usize = (MAX_VALUE as i16 - MIN_VALUE as i16) as usize;

pub fn check_security(security: usize) -> Result<(), Error> {
    if (1..=MAX_SECURITY_LEVEL).contains(&security) {
        Ok(())
    } else {
        Err(Error::InvalidSecurityLevel(security))
    }
}

/// Split a digest into nibbles and balance each fragment around zero.
///
/// A fragment whose values sum to zero cannot be turned into a signature
/// for another message by hashing revealed chunks further, since raising
/// one value forces another one down.
pub fn normalized_bundle(digest: &Hash<HASH_LENGTH>) -> NormalizedBundle {
    let mut bundle = [0i8; BUNDLE_LENGTH];

    for (i, byte) in digest.iter().enumerate() {
        bundle[2 * i] = (byte >> 4) as i8 + MIN_VALUE;
        bundle[2 * i + 1] = (byte & 0x0f) as i8 + MIN_VALUE;
    }

    for fragment in bundle.chunks_exact_mut(NORMALIZED_FRAGMENT_LENGTH) {
        let mut sum: i32 = fragment.iter().map(|v| i32::from(*v)).sum();

        while sum > 0 {
            match fragment.iter_mut().find(|v| **v > MIN_VALUE) {
                Some(v) => {
                    *v -= 1;
                    sum -= 1;
                }
                None => break,
            }
        }

        while sum < 0 {
            match fragment.iter_mut().find(|v| **v < MAX_VALUE) {
                Some(v) => {
                    *v += 1;
                    sum += 1;
                }
                None => break,
            }
        }
    }

    bundle
}

fn clamp_steps(steps: i16) -> usize {
    steps.clamp(0, CHAIN_LENGTH as i16) as usize
}

fn hash_chunk<S: Sponge + Default>(sponge: &mut S, chunk: &mut [u8; HASH_LENGTH], times: usize) {
    for _ in 0..times {
        sponge.reset();
        sponge.absorb(chunk);
        sponge.squeeze(chunk);
    }
}

fn check_fragment(values: usize, fragment: &[u8]) -> Result<(), Error> {
    if values == 0 || fragment.len() != values * HASH_LENGTH {
        return Err(Error::InvalidFragmentSize(fragment.len()));
    }

    Ok(())
}

/// Public sub-digest of one signature fragment.
///
/// Each chunk of `signature` is hashed `value - MIN_VALUE` times, where
/// `value` is the matching entry of `bundle_fragment`, and the resulting
/// chain heads are hashed together.
pub fn fragment_digest<S: Sponge + Default>(
    bundle_fragment: &[i8],
    signature: &[u8],
) -> Result<Hash<HASH_LENGTH>, Error> {
    check_fragment(bundle_fragment.len(), signature)?;

    let mut chain = S::default();
    let mut digest = S::default();

    for (value, chunk) in bundle_fragment
        .iter()
        .zip(signature.chunks_exact(HASH_LENGTH))
    {
        let mut buffer = [0u8; HASH_LENGTH];
        buffer.copy_from_slice(chunk);

        let steps = i16::from(*value) - i16::from(MIN_VALUE);
        hash_chunk(&mut chain, &mut buffer, clamp_steps(steps));

        digest.absorb(&buffer);
    }

    let mut out = [0; HASH_LENGTH];
    digest.squeeze(&mut out);
    Ok(Hash::new(out))
}

/// public key fingerprint of the concatenated fragment digests
pub fn address<S: Sponge + Default>(digests: &[u8]) -> Hash<HASH_LENGTH> {
    S::hash(digests)
}

/// Derive the seed of the one-time key at `index`.
pub fn subseed<S: Sponge + Default>(seed: &[u8], index: u64) -> Hash<HASH_LENGTH> {
    let mut sponge = S::default();
    sponge.absorb(seed);
    sponge.absorb(&index.to_be_bytes());

    let mut out = [0; HASH_LENGTH];
    sponge.squeeze(&mut out);
    Hash::new(out)
}

/// Private key of `security` fragments. Every chunk is derived from the
/// subseed and its own position so revealing one chunk says nothing about
/// the others.
pub fn key<S: Sponge + Default>(
    subseed: &Hash<HASH_LENGTH>,
    security: usize,
) -> Result<Vec<u8>, Error> {
    check_security(security)?;

    let chunks = security * NORMALIZED_FRAGMENT_LENGTH;
    let mut key = Vec::with_capacity(chunks * HASH_LENGTH);

    for position in 0..chunks as u32 {
        let mut sponge = S::default();
        sponge.absorb(subseed.as_ref());
        sponge.absorb(&position.to_be_bytes());

        let mut chunk = [0; HASH_LENGTH];
        sponge.squeeze(&mut chunk);
        key.extend_from_slice(&chunk);
    }

    Ok(key)
}

fn security_of(key: &[u8]) -> Result<usize, Error> {
    if key.is_empty() || key.len() % FRAGMENT_LENGTH != 0 {
        return Err(Error::InvalidKeySize(key.len()));
    }

    let security = key.len() / FRAGMENT_LENGTH;
    check_security(security)?;
    Ok(security)
}

/// Concatenated public digests of every fragment of `key`.
pub fn key_digests<S: Sponge + Default>(key: &[u8]) -> Result<Vec<u8>, Error> {
    security_of(key)?;

    let heads = [MAX_VALUE; NORMALIZED_FRAGMENT_LENGTH];
    let mut digests = Vec::with_capacity(key.len() / NORMALIZED_FRAGMENT_LENGTH);

    for fragment in key.chunks_exact(FRAGMENT_LENGTH) {
        let digest = fragment_digest::<S>(&heads, fragment)?;
        digests.extend_from_slice(digest.as_ref());
    }

    Ok(digests)
}

/// Address committed by `key`, what a verifier compares against.
pub fn key_address<S: Sponge + Default>(key: &[u8]) -> Result<Hash<HASH_LENGTH>, Error> {
    key_digests::<S>(key).map(|digests| address::<S>(&digests))
}

/// Sign one fragment: each key chunk is hashed `MAX_VALUE - value` times.
pub fn signature_fragment<S: Sponge + Default>(
    bundle_fragment: &[i8],
    key_fragment: &[u8],
) -> Result<Vec<u8>, Error> {
    check_fragment(bundle_fragment.len(), key_fragment)?;

    let mut chain = S::default();
    let mut signature = Vec::with_capacity(key_fragment.len());

    for (value, chunk) in bundle_fragment
        .iter()
        .zip(key_fragment.chunks_exact(HASH_LENGTH))
    {
        let mut buffer = [0u8; HASH_LENGTH];
        buffer.copy_from_slice(chunk);

        let steps = i16::from(MAX_VALUE) - i16::from(*value);
        hash_chunk(&mut chain, &mut buffer, clamp_steps(steps));

        signature.extend_from_slice(&buffer);
    }

    Ok(signature)
}

/// Sign `digest` with every fragment of `key`, one signature fragment per
/// security level.
pub fn sign<S: Sponge + Default>(
    key: &[u8],
    digest: &Hash<HASH_LENGTH>,
) -> Result<Vec<Vec<u8>>, Error> {
    let security = security_of(key)?;
    let bundle = normalized_bundle(digest);

    bundle
        .chunks_exact(NORMALIZED_FRAGMENT_LENGTH)
        .zip(key.chunks_exact(FRAGMENT_LENGTH))
        .take(security)
        .map(|(values, fragment)| signature_fragment::<S>(values, fragment))
        .collect()
}
