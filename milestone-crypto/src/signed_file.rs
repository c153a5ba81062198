//! Detached signature files
//!
//! The signed content is read as text lines concatenated without
//! separators, right padded with zeros to a multiple of [`HASH_LENGTH`]
//! and hashed. An empty content hashes the [`NULL_HASH`] sentinel instead.
//!
//! The signature file holds one hex line per security level, each a
//! signature fragment, optionally followed by a hex line with the
//! concatenated Merkle authentication path of the one-time key.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use subtle::ConstantTimeEq;

use crate::hash::{Hash, HASH_LENGTH, NULL_HASH};
use crate::merkle::{merkle_root, MerklePath};
use crate::sponge::{Sha3, Sponge};
use crate::winternitz::{self, NORMALIZED_FRAGMENT_LENGTH};
use crate::Error;

/// Digest of a signed content source.
pub fn digest_content<S, R>(reader: R) -> Result<Hash<HASH_LENGTH>, Error>
where
    S: Sponge + Default,
    R: BufRead,
{
    let mut message = Vec::new();

    for line in reader.lines() {
        message.extend_from_slice(line?.as_bytes());
    }

    if message.is_empty() {
        message.extend_from_slice(NULL_HASH.as_ref());
    }

    let padded = message.len().div_ceil(HASH_LENGTH) * HASH_LENGTH;
    message.resize(padded, 0);

    Ok(S::hash(&message))
}

fn decode_line(line: &str, number: usize) -> Result<Vec<u8>, Error> {
    hex::decode(line.trim()).map_err(|source| Error::Hex {
        line: number,
        source,
    })
}

/// Check a signature source against `public_key` for a content `digest`.
///
/// Returns `Ok(false)` when the recomputed root differs from the public
/// key. Unreadable or malformed signatures are errors.
pub fn verify_signature<S, R>(
    signature: R,
    public_key: &Hash<HASH_LENGTH>,
    depth: usize,
    index: u64,
    security: usize,
    digest: &Hash<HASH_LENGTH>,
) -> Result<bool, Error>
where
    S: Sponge + Default,
    R: BufRead,
{
    winternitz::check_security(security)?;

    let bundle = winternitz::normalized_bundle(digest);
    let mut lines = signature.lines();
    let mut digests = Vec::with_capacity(security * HASH_LENGTH);

    for (level, values) in bundle
        .chunks_exact(NORMALIZED_FRAGMENT_LENGTH)
        .take(security)
        .enumerate()
    {
        let line = lines.next().transpose()?.ok_or(Error::MissingSignatureLine {
            expected: security,
            found: level,
        })?;

        let fragment = decode_line(&line, level + 1)?;
        let fragment_digest = winternitz::fragment_digest::<S>(values, &fragment)?;
        digests.extend_from_slice(fragment_digest.as_ref());
    }

    let address = winternitz::address::<S>(&digests);

    let root = match lines.next().transpose()? {
        Some(line) => {
            let path = decode_line(&line, security + 1)?;
            merkle_root::<S>(&address, &path, index, depth)?
        }
        None => address,
    };

    for (offset, line) in lines.enumerate() {
        if !line?.trim().is_empty() {
            return Err(Error::TrailingSignatureLine {
                line: security + 2 + offset,
            });
        }
    }

    Ok(bool::from(root.as_ref().ct_eq(public_key.as_ref())))
}

/// Verify a content file against its signature file with the default
/// [`Sha3`] sponge.
pub fn is_file_signature_valid(
    content: impl AsRef<Path>,
    signature: impl AsRef<Path>,
    public_key: &str,
    depth: usize,
    index: u64,
    security: usize,
) -> Result<bool, Error> {
    let public_key: Hash<HASH_LENGTH> = public_key
        .parse()
        .map_err(|_| Error::InvalidPublicKey(public_key.to_string()))?;

    let digest = digest_content::<Sha3, _>(BufReader::new(File::open(content)?))?;
    let signature = BufReader::new(File::open(signature)?);

    verify_signature::<Sha3, _>(signature, &public_key, depth, index, security, &digest)
}

/// Render signature fragments and an optional path in the text layout
/// read by [`verify_signature`].
pub fn render_signature(fragments: &[Vec<u8>], path: Option<&MerklePath>) -> String {
    let mut out = String::new();

    for fragment in fragments {
        let _ = writeln!(out, "{}", hex::encode(fragment));
    }

    if let Some(path) = path {
        let _ = writeln!(out, "{}", hex::encode(path.to_bytes()));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sponge::standard_hash;

    #[test]
    fn content_lines_are_concatenated_and_padded() {
        let digest = digest_content::<Sha3, _>("abc\ndef\r\n".as_bytes()).unwrap();

        let mut expected = b"abcdef".to_vec();
        expected.resize(HASH_LENGTH, 0);
        assert_eq!(digest, standard_hash(&expected));
    }

    #[test]
    fn exact_multiple_is_not_padded() {
        let line = "x".repeat(HASH_LENGTH * 2);
        let digest = digest_content::<Sha3, _>(line.as_bytes()).unwrap();

        assert_eq!(digest, standard_hash(line.as_bytes()));
    }

    #[test]
    fn empty_content_hashes_null_sentinel() {
        let digest = digest_content::<Sha3, _>("".as_bytes()).unwrap();
        assert_eq!(digest, NULL_HASH);
    }

    #[test]
    fn render_layout() {
        let path = MerklePath::new(vec![Hash::new([0xab; HASH_LENGTH])], 1).unwrap();
        let text = render_signature(&[vec![0x01, 0x02], vec![0xff]], Some(&path));

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0102");
        assert_eq!(lines[1], "ff");
        assert_eq!(lines[2], "ab".repeat(HASH_LENGTH));
    }
}
