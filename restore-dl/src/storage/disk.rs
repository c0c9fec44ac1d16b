use super::{Namespace, StorageClient};
use crate::common::*;

/// Reads keys as file paths. The namespace only tags errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskClient;

impl StorageClient for DiskClient {
    fn get(&self, key: &str, namespace: Namespace) -> Result<Vec<u8>> {
        fs::read(key).map_err(|err| Error::Fetch {
            key: key.to_owned(),
            namespace,
            reason: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_client_reads_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0001.png");
        fs::write(&path, b"bytes").unwrap();

        let client = DiskClient;
        let bytes = client
            .get(path.to_str().unwrap(), Namespace::Reference)
            .unwrap();
        assert_eq!(bytes, b"bytes");

        let missing = dir.path().join("0002.png");
        let err = client
            .get(missing.to_str().unwrap(), Namespace::Degraded)
            .unwrap_err();
        match err {
            Error::Fetch { namespace, .. } => assert_eq!(namespace, Namespace::Degraded),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
