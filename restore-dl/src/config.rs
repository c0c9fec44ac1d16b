//! Dataset configuration format.

use crate::{
    common::*,
    dataset::{FilenameTemplate, IndexMode, PairedImageDataset},
    error::ensure_config,
    processor::{AugmentInit, EntropySource, Normalize, RandomSource},
    storage::Backend,
};

/// The paired dataset options as written in a configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedDatasetInit {
    /// The storage backend serving image bytes.
    pub io_backend: IoBackendConfig,
    /// The root of reference images.
    pub dataroot_gt: PathBuf,
    /// The root of degraded images.
    pub dataroot_lq: PathBuf,
    /// Maps a reference file stem to the degraded file stem. Contains one `{}`.
    #[serde(default = "default_filename_tmpl")]
    pub filename_tmpl: String,
    /// The list of reference names to pair.
    #[serde(default)]
    pub meta_info_file: Option<PathBuf>,
    /// Forces the pair index strategy instead of inferring it.
    #[serde(default)]
    pub index_mode: Option<IndexModeKind>,
    /// Per-channel mean subtracted from the reference tensor.
    #[serde(default)]
    pub mean: Option<Vec<R64>>,
    /// Per-channel std dividing the reference tensor.
    #[serde(default)]
    pub std: Option<Vec<R64>>,
    pub phase: Phase,
    #[serde(default)]
    pub use_hflip: bool,
    #[serde(default)]
    pub use_rot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IoBackendConfig {
    #[serde(alias = "folder")]
    Disk,
    #[serde(alias = "key-value-store")]
    Lmdb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexModeKind {
    Folder,
    #[serde(alias = "key-value-store")]
    Lmdb,
    #[serde(alias = "manifest")]
    MetaInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Train,
    #[serde(alias = "val", alias = "test")]
    Eval,
}

/// The validated pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub degraded_root: PathBuf,
    pub reference_root: PathBuf,
    pub index_mode: IndexMode,
    pub template: FilenameTemplate,
    pub backend: Backend,
    pub phase: Phase,
    pub augment: AugmentInit,
    /// Applied to the reference tensor only.
    pub normalize: Option<Normalize>,
}

impl PairedDatasetInit {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
        let config = json5::from_str(&text).map_err(|err| {
            Error::config(format!("unable to parse '{}': {}", path.display(), err))
        })?;
        Ok(config)
    }

    /// Validate the options without touching the filesystem.
    pub fn to_pipeline_config(&self) -> Result<PipelineConfig> {
        let Self {
            io_backend,
            ref dataroot_gt,
            ref dataroot_lq,
            ref filename_tmpl,
            ref meta_info_file,
            index_mode,
            ref mean,
            ref std,
            phase,
            use_hflip,
            use_rot,
        } = *self;

        let template: FilenameTemplate = filename_tmpl.parse()?;

        let kind = match (index_mode, io_backend, meta_info_file) {
            (Some(kind), _, _) => kind,
            (None, IoBackendConfig::Lmdb, _) => IndexModeKind::Lmdb,
            (None, IoBackendConfig::Disk, Some(_)) => IndexModeKind::MetaInfo,
            (None, IoBackendConfig::Disk, None) => IndexModeKind::Folder,
        };

        let index_mode = match kind {
            IndexModeKind::Lmdb => {
                ensure_config!(
                    io_backend == IoBackendConfig::Lmdb,
                    "the lmdb index mode requires the lmdb io backend"
                );
                if meta_info_file.is_some() {
                    warn!("meta_info_file is ignored by the lmdb index mode");
                }
                IndexMode::Lmdb
            }
            IndexModeKind::MetaInfo => {
                ensure_config!(
                    io_backend == IoBackendConfig::Disk,
                    "the meta_info index mode requires the disk io backend"
                );
                let meta_info_file = meta_info_file.clone().ok_or_else(|| {
                    Error::config("the meta_info index mode requires meta_info_file")
                })?;
                IndexMode::MetaInfo { meta_info_file }
            }
            IndexModeKind::Folder => {
                ensure_config!(
                    io_backend == IoBackendConfig::Disk,
                    "the folder index mode requires the disk io backend"
                );
                ensure_config!(
                    meta_info_file.is_none(),
                    "meta_info_file conflicts with the folder index mode"
                );
                IndexMode::Folder
            }
        };

        let backend = match io_backend {
            IoBackendConfig::Disk => Backend::Disk,
            IoBackendConfig::Lmdb => Backend::Lmdb {
                degraded_root: dataroot_lq.clone(),
                reference_root: dataroot_gt.clone(),
            },
        };

        let normalize = match (mean, std) {
            (None, None) => None,
            (Some(mean), Some(std)) => {
                ensure_config!(
                    mean.len() == 3,
                    "mean must have 3 channels, but get {}",
                    mean.len()
                );
                let to_f32 = |values: &[R64]| -> Vec<f32> {
                    values.iter().map(|value| value.raw() as f32).collect()
                };
                Some(Normalize::new(to_f32(mean), to_f32(std))?)
            }
            _ => {
                return Err(Error::config(
                    "mean and std must be specified together",
                ))
            }
        };

        Ok(PipelineConfig {
            degraded_root: dataroot_lq.clone(),
            reference_root: dataroot_gt.clone(),
            index_mode,
            template,
            backend,
            phase,
            augment: AugmentInit {
                horizontal_flip: use_hflip,
                rotation: use_rot,
            },
            normalize,
        })
    }

    /// Build the dataset with a random source seeded from entropy.
    pub fn build(&self) -> Result<PairedImageDataset<EntropySource>> {
        self.build_with_rng(EntropySource::new())
    }

    pub fn build_with_rng<R>(&self, rng: R) -> Result<PairedImageDataset<R>>
    where
        R: RandomSource,
    {
        PairedImageDataset::new(self.to_pipeline_config()?, rng)
    }
}

fn default_filename_tmpl() -> String {
    "{}".into()
}
