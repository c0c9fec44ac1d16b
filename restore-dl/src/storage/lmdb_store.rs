use super::{Namespace, StorageClient};
use crate::common::*;
use lmdb::{Database, Environment, EnvironmentFlags, Transaction as _};
use std::collections::HashMap;

/// Serves keys from read-only LMDB environments, one per namespace.
pub struct LmdbClient {
    stores: HashMap<Namespace, (Environment, Database)>,
}

impl LmdbClient {
    pub fn open<'a>(roots: impl IntoIterator<Item = (Namespace, &'a Path)>) -> Result<Self> {
        let stores = roots
            .into_iter()
            .map(|(namespace, root)| -> Result<_> {
                let env = Environment::new()
                    .set_flags(
                        EnvironmentFlags::READ_ONLY
                            | EnvironmentFlags::NO_LOCK
                            | EnvironmentFlags::NO_READAHEAD,
                    )
                    .open(root)
                    .map_err(|err| {
                        Error::config(format!(
                            "unable to open lmdb '{}' for the {} namespace: {}",
                            root.display(),
                            namespace,
                            err
                        ))
                    })?;
                let db = env.open_db(None).map_err(|err| {
                    Error::config(format!(
                        "unable to open the main database of '{}': {}",
                        root.display(),
                        err
                    ))
                })?;
                Ok((namespace, (env, db)))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { stores })
    }
}

impl Debug for LmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LmdbClient")
            .field("namespaces", &self.stores.keys().collect_vec())
            .finish()
    }
}

impl StorageClient for LmdbClient {
    fn get(&self, key: &str, namespace: Namespace) -> Result<Vec<u8>> {
        let fetch_err = |reason: String| Error::Fetch {
            key: key.to_owned(),
            namespace,
            reason,
        };

        let (env, db) = self
            .stores
            .get(&namespace)
            .ok_or_else(|| fetch_err("namespace is not configured".into()))?;
        let txn = env
            .begin_ro_txn()
            .map_err(|err| fetch_err(err.to_string()))?;
        let bytes = txn
            .get(*db, &key)
            .map_err(|err| fetch_err(err.to_string()))?
            .to_vec();

        Ok(bytes)
    }
}
