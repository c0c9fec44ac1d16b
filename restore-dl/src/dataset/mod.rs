//! Pair indexes and the paired sample pipeline.

mod folder;
mod index;
mod lmdb_catalog;
mod meta_info;
mod paired;
mod record;
mod template;

pub use folder::*;
pub use index::*;
pub use lmdb_catalog::*;
pub use meta_info::*;
pub use paired::*;
pub use record::*;
pub use template::*;

use crate::common::*;

/// The dataset that can be random accessed.
pub trait RandomAccessDataset
where
    Self: Debug + Send,
{
    /// Get number of records in the dataset.
    fn num_records(&self) -> usize;

    /// Get the nth record in the dataset.
    fn nth(&mut self, index: usize) -> Result<SampleRecord>;
}
