use super::{
    pairs_from_folder, pairs_from_lmdb, pairs_from_meta_info, FilenameTemplate, PairRecord,
};
use crate::common::*;

/// The strategy that builds the pair index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexMode {
    /// Scan both roots and match file names.
    Folder,
    /// Read the key catalogs of two LMDB directories.
    Lmdb,
    /// Read reference names from a meta info file.
    MetaInfo { meta_info_file: PathBuf },
}

impl IndexMode {
    pub fn resolve(
        &self,
        degraded_root: &Path,
        reference_root: &Path,
        template: &FilenameTemplate,
    ) -> Result<Vec<PairRecord>> {
        match self {
            Self::Folder => pairs_from_folder(degraded_root, reference_root, template),
            Self::Lmdb => pairs_from_lmdb(degraded_root, reference_root),
            Self::MetaInfo { meta_info_file } => {
                pairs_from_meta_info(degraded_root, reference_root, meta_info_file, template)
            }
        }
    }
}
