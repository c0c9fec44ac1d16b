//! Storage backends serving raw image bytes.

mod disk;
mod lazy;
#[cfg(feature = "lmdb")]
mod lmdb_store;

pub use disk::*;
pub use lazy::*;
#[cfg(feature = "lmdb")]
pub use lmdb_store::*;

use crate::common::*;

/// The logical partition of a backend that a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    Degraded,
    Reference,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Degraded => "degraded",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected storage backend.
pub trait StorageClient
where
    Self: Debug + Send,
{
    /// Fetch the raw bytes stored under `key` in `namespace`.
    fn get(&self, key: &str, namespace: Namespace) -> Result<Vec<u8>>;
}

/// The backend kind with its connection parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Keys are file paths on the local filesystem.
    Disk,
    /// Keys live in one LMDB environment per namespace.
    Lmdb {
        degraded_root: PathBuf,
        reference_root: PathBuf,
    },
}

impl Backend {
    /// Open the backend. This is where connections are made.
    pub fn connect(&self) -> Result<Box<dyn StorageClient>> {
        let client: Box<dyn StorageClient> = match self {
            Self::Disk => Box::new(DiskClient),
            #[cfg(feature = "lmdb")]
            Self::Lmdb {
                degraded_root,
                reference_root,
            } => Box::new(LmdbClient::open([
                (Namespace::Degraded, degraded_root.as_path()),
                (Namespace::Reference, reference_root.as_path()),
            ])?),
            #[cfg(not(feature = "lmdb"))]
            Self::Lmdb { .. } => {
                return Err(Error::config(
                    "the 'lmdb' feature must be enabled to use the lmdb backend",
                ))
            }
        };
        debug!("connected to {:?} storage backend", self);
        Ok(client)
    }
}
