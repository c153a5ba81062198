//! Merkle authentication paths
//!
//! A committee commits `2^depth` one-time public keys under a single root.
//! A signature carries the path from its key to that root, and the verifier
//! walks it back up with [`merkle_root`].

use std::marker::PhantomData;

use crate::hash::{Hash, HASH_LENGTH, NULL_HASH};
use crate::sponge::{Sha3, Sponge};
use crate::Error;

fn hash_pair<S: Sponge + Default>(left: &[u8], right: &[u8]) -> Hash<HASH_LENGTH> {
    let mut sponge = S::default();
    sponge.absorb(left);
    sponge.absorb(right);

    let mut out = [0; HASH_LENGTH];
    sponge.squeeze(&mut out);
    Hash::new(out)
}

fn check_index(index: u64, depth: usize) -> Result<(), Error> {
    let fits = match u32::try_from(depth) {
        Ok(bits) => index.checked_shr(bits).unwrap_or(0) == 0,
        Err(_) => true,
    };

    if fits {
        Ok(())
    } else {
        Err(Error::LeafIndexOutOfRange { index, depth })
    }
}

/// Recompute the root reached from `leaf` through the concatenated sibling
/// digests in `path`.
///
/// Bit `i` of `index` tells the side of the running digest at level `i`:
/// when clear the running digest is the left operand, otherwise the sibling
/// is. Whether the returned root is the expected one is up to the caller.
pub fn merkle_root<S: Sponge + Default>(
    leaf: &Hash<HASH_LENGTH>,
    path: &[u8],
    index: u64,
    depth: usize,
) -> Result<Hash<HASH_LENGTH>, Error> {
    if depth.checked_mul(HASH_LENGTH) != Some(path.len()) {
        return Err(Error::InvalidPathSize {
            size: path.len(),
            depth,
        });
    }

    check_index(index, depth)?;

    let mut running = *leaf;
    let mut position = index;

    for sibling in path.chunks_exact(HASH_LENGTH) {
        running = if position & 1 == 0 {
            hash_pair::<S>(running.as_ref(), sibling)
        } else {
            hash_pair::<S>(sibling, running.as_ref())
        };

        position >>= 1;
    }

    Ok(running)
}

/// Sibling digests from a leaf up to the root, plus the leaf position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerklePath {
    siblings: Vec<Hash<HASH_LENGTH>>,
    index: u64,
}

impl MerklePath {
    pub fn new(siblings: Vec<Hash<HASH_LENGTH>>, index: u64) -> Result<Self, Error> {
        check_index(index, siblings.len())?;
        Ok(Self { siblings, index })
    }

    /// parse concatenated sibling digests, the depth being implied by the size
    pub fn from_bytes(bytes: &[u8], index: u64) -> Result<Self, Error> {
        if bytes.len() % HASH_LENGTH != 0 {
            return Err(Error::InvalidPathSize {
                size: bytes.len(),
                depth: bytes.len() / HASH_LENGTH,
            });
        }

        let siblings = bytes
            .chunks_exact(HASH_LENGTH)
            .filter_map(Hash::from_slice)
            .collect();

        Self::new(siblings, index)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.siblings.iter().flat_map(|h| h.iter().copied()).collect()
    }

    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn siblings(&self) -> &[Hash<HASH_LENGTH>] {
        &self.siblings
    }

    pub fn root<S: Sponge + Default>(
        &self,
        leaf: &Hash<HASH_LENGTH>,
    ) -> Result<Hash<HASH_LENGTH>, Error> {
        merkle_root::<S>(leaf, &self.to_bytes(), self.index, self.depth())
    }
}

/// Complete binary tree over a set of leaves, padded with
/// [`NULL_HASH`] up to the next power of two.
///
/// ```
/// use milestone_crypto::hash::Hash;
/// use milestone_crypto::merkle::MerkleTree;
/// use milestone_crypto::sponge::{Sha3, Sponge};
///
/// let leaves: Vec<_> = (0u8..5).map(|i| Sha3::hash(&[i])).collect();
/// let tree = MerkleTree::<Sha3>::build(&leaves).unwrap();
///
/// assert_eq!(tree.depth(), 3);
///
/// let path = tree.path(3).unwrap();
/// assert_eq!(path.root::<Sha3>(&leaves[3]).unwrap(), tree.root());
/// ```
#[derive(Debug, Clone)]
pub struct MerkleTree<S = Sha3> {
    levels: Vec<Vec<Hash<HASH_LENGTH>>>,
    leaf_count: usize,
    _mode: PhantomData<S>,
}

impl<S: Sponge + Default> MerkleTree<S> {
    pub fn build(leaves: &[Hash<HASH_LENGTH>]) -> Result<Self, Error> {
        if leaves.is_empty() {
            return Err(Error::EmptyTree);
        }

        let width = leaves.len().next_power_of_two();
        let mut level = leaves.to_vec();
        level.resize(width, NULL_HASH);

        let mut levels = vec![level];

        while let Some(current) = levels.last().filter(|l| l.len() > 1) {
            let parents: Vec<_> = current
                .chunks_exact(2)
                .map(|pair| hash_pair::<S>(pair[0].as_ref(), pair[1].as_ref()))
                .collect();

            levels.push(parents);
        }

        Ok(Self {
            levels,
            leaf_count: leaves.len(),
            _mode: PhantomData,
        })
    }

    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn root(&self) -> Hash<HASH_LENGTH> {
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(NULL_HASH)
    }

    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// authentication path of the leaf at `index`
    pub fn path(&self, index: usize) -> Result<MerklePath, Error> {
        if index >= self.leaf_count {
            return Err(Error::LeafIndexOutOfRange {
                index: index as u64,
                depth: self.depth(),
            });
        }

        let mut position = index;
        let mut siblings = Vec::with_capacity(self.depth());

        for level in &self.levels[..self.depth()] {
            siblings.push(level[position ^ 1]);
            position >>= 1;
        }

        MerklePath::new(siblings, index as u64)
    }
}
