use super::{FilenameTemplate, PairRecord};
use crate::{common::*, utils::path_to_key};

/// Pair the reference names listed in a meta info file.
///
/// The first whitespace-separated token of every non-blank line names a
/// reference file relative to `reference_root`. The degraded counterpart is
/// the template-mapped file name placed directly under `degraded_root`, so
/// `sub/0001.png` pairs with `<degraded_root>/0001.png`. Files are not
/// checked for existence here.
pub fn pairs_from_meta_info(
    degraded_root: impl AsRef<Path>,
    reference_root: impl AsRef<Path>,
    meta_info_file: impl AsRef<Path>,
    template: &FilenameTemplate,
) -> Result<Vec<PairRecord>> {
    let degraded_root = degraded_root.as_ref();
    let reference_root = reference_root.as_ref();
    let meta_info_file = meta_info_file.as_ref();

    let text = fs::read_to_string(meta_info_file).map_err(|err| {
        Error::config(format!(
            "unable to read meta info file '{}': {}",
            meta_info_file.display(),
            err
        ))
    })?;

    text.lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(|reference_name| {
            let file_name = Path::new(reference_name).file_name().ok_or_else(|| {
                Error::config(format!(
                    "'{}' in '{}' has no file name",
                    reference_name,
                    meta_info_file.display()
                ))
            })?;
            let degraded_name = template.apply_to_path(file_name)?;
            Ok(PairRecord {
                degraded_key: path_to_key(degraded_root.join(degraded_name))?,
                reference_key: path_to_key(reference_root.join(reference_name))?,
            })
        })
        .collect()
}
