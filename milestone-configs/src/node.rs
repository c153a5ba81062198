use std::path::{Path, PathBuf};

use milestone_crypto::hash::Hash;
use milestone_crypto::signed_file;
use milestone_solidifier::SolidificationConfig;
use serde::{Deserialize, Serialize};

const CURATOR_ADDRESS: Hash<32> = Hash::new([
    0x2b, 0xeb, 0xfa, 0xee, 0x97, 0x8c, 0x03, 0xe3, 0x26, 0x3c, 0x3e, 0x54, 0x80, 0xb6, 0x02, 0xfb,
    0x04, 0x0a, 0x12, 0x07, 0x68, 0xc4, 0x1d, 0x8b, 0xfa, 0xe6, 0xc0, 0xc1, 0x24, 0xb8, 0xe8, 0x2a,
]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DbConfig {
    /// directory of the RocksDB round store
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("mainnetdb"),
        }
    }
}

/// Keys of the committee issuing milestones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommitteeConfig {
    /// Merkle root committing every one-time milestone key
    pub public_key: Hash<32>,
    /// depth of the milestone key tree
    pub key_depth: usize,
    pub security: usize,
    /// round signed with key index 0
    pub start_index: u64,
}

impl Default for CommitteeConfig {
    fn default() -> Self {
        Self {
            public_key: CURATOR_ADDRESS,
            key_depth: 10,
            security: 2,
            start_index: 0,
        }
    }
}

/// Signed snapshot the node bootstraps from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotConfig {
    /// relative paths resolve against the working directory
    pub file: PathBuf,
    pub signature_file: PathBuf,
    /// depth of the curator key tree signing snapshots
    pub key_depth: usize,
    pub key_index: u64,
    pub security: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("snapshotMainnet.txt"),
            signature_file: PathBuf::from("snapshotMainnet.sig"),
            key_depth: 15,
            key_index: 0,
            security: 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub db: DbConfig,
    pub committee: CommitteeConfig,
    pub solidification: SolidificationConfig,
    pub snapshot: SnapshotConfig,
}

impl NodeConfig {
    /// Check the snapshot file against its signature with the committee key.
    pub fn verify_snapshot(&self) -> Result<bool, milestone_crypto::Error> {
        signed_file::is_file_signature_valid(
            &self.snapshot.file,
            &self.snapshot.signature_file,
            &self.committee.public_key.to_string(),
            self.snapshot.key_depth,
            self.snapshot.key_index,
            self.snapshot.security,
        )
    }
}

pub fn from_file(path: &Path) -> Result<NodeConfig, std::io::Error> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let parsed: NodeConfig = serde_json::from_reader(reader)?;

    Ok(parsed)
}
