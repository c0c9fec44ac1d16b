use super::{Backend, StorageClient};
use crate::common::*;

/// A storage client that connects on first use.
///
/// The lifecycle has two states. It starts `Uninitialized` holding the
/// backend parameters and moves to `Ready` the first time a client is
/// requested. The parameters are dropped once the transition happens.
#[derive(Debug)]
pub struct LazyStorage {
    state: StorageState,
}

#[derive(Debug)]
enum StorageState {
    Uninitialized(Backend),
    Ready(Box<dyn StorageClient>),
}

impl LazyStorage {
    pub fn new(backend: Backend) -> Self {
        Self {
            state: StorageState::Uninitialized(backend),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, StorageState::Ready(_))
    }

    /// Get the connected client, connecting if this is the first call.
    ///
    /// A failed connection leaves the storage uninitialized.
    pub fn client(&mut self) -> Result<&dyn StorageClient> {
        if let StorageState::Uninitialized(backend) = &self.state {
            let client = backend.connect()?;
            self.state = StorageState::Ready(client);
        }

        match &self.state {
            StorageState::Ready(client) => Ok(client.as_ref()),
            StorageState::Uninitialized(_) => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_storage_connects_once() {
        let mut storage = LazyStorage::new(Backend::Disk);
        assert!(!storage.is_ready());
        storage.client().unwrap();
        assert!(storage.is_ready());
        storage.client().unwrap();
        assert!(storage.is_ready());
    }
}
