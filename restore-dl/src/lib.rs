//! The paired sample pipeline for training image restoration models.

mod common;
pub mod config;
pub mod corpus;
pub mod dataset;
pub mod decode;
pub mod error;
pub mod loader;
pub mod processor;
pub mod profiling;
pub mod storage;
pub mod utils;

pub use config::{IndexModeKind, IoBackendConfig, PairedDatasetInit, Phase};
pub use dataset::{PairRecord, PairedImageDataset, RandomAccessDataset, SampleRecord};
pub use error::{Error, Result};
pub use loader::{PairBatch, PairLoader, PairLoaderInit};
pub use processor::{EntropySource, RandomSource, ScriptedSource, OUTPUT_SIZE};
pub use storage::Namespace;
