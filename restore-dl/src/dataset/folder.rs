use super::{FilenameTemplate, PairRecord};
use crate::{
    common::*,
    utils::{list_files, path_to_key},
};

/// Pair every reference file with its template-mapped degraded file.
///
/// Both roots are listed recursively. They must hold the same number of
/// files, and every reference file must have a degraded counterpart.
pub fn pairs_from_folder(
    degraded_root: impl AsRef<Path>,
    reference_root: impl AsRef<Path>,
    template: &FilenameTemplate,
) -> Result<Vec<PairRecord>> {
    let degraded_root = degraded_root.as_ref();
    let reference_root = reference_root.as_ref();

    let degraded_files = list_files(degraded_root)?;
    let reference_files = list_files(reference_root)?;

    if degraded_files.len() != reference_files.len() {
        return Err(Error::mismatch(format!(
            "'{}' has {} images but '{}' has {}",
            degraded_root.display(),
            degraded_files.len(),
            reference_root.display(),
            reference_files.len()
        )));
    }

    reference_files
        .iter()
        .map(|reference_file| {
            let degraded_file = template.apply_to_path(reference_file)?;
            if !degraded_files.contains(&degraded_file) {
                return Err(Error::mismatch(format!(
                    "'{}' has no counterpart '{}' under '{}'",
                    reference_file.display(),
                    degraded_file.display(),
                    degraded_root.display()
                )));
            }

            Ok(PairRecord {
                degraded_key: path_to_key(degraded_root.join(&degraded_file))?,
                reference_key: path_to_key(reference_root.join(reference_file))?,
            })
        })
        .collect()
}
