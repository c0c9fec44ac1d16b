use super::PairRecord;
use crate::common::*;

/// The key catalog stored inside every LMDB directory.
pub const CATALOG_FILE: &str = "meta_info.txt";

/// Read the keys listed in the catalog of an LMDB directory.
///
/// A key is the text before the first `.` of each non-blank line, so
/// `0001.png (512,512,3) 1` yields `0001`.
pub fn read_lmdb_catalog(root: impl AsRef<Path>) -> Result<BTreeSet<String>> {
    let root = root.as_ref();
    ensure_lmdb_dir(root)?;

    let catalog = root.join(CATALOG_FILE);
    let text = fs::read_to_string(&catalog).map_err(|err| {
        Error::config(format!(
            "unable to read lmdb catalog '{}': {}",
            catalog.display(),
            err
        ))
    })?;

    let keys = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split('.').next())
        .map(str::to_owned)
        .collect();
    Ok(keys)
}

/// Pair identical keys of the degraded and reference LMDB catalogs, in
/// sorted key order.
pub fn pairs_from_lmdb(
    degraded_root: impl AsRef<Path>,
    reference_root: impl AsRef<Path>,
) -> Result<Vec<PairRecord>> {
    let degraded_root = degraded_root.as_ref();
    let reference_root = reference_root.as_ref();

    let degraded_keys = read_lmdb_catalog(degraded_root)?;
    let reference_keys = read_lmdb_catalog(reference_root)?;

    if degraded_keys != reference_keys {
        let degraded_only = degraded_keys.difference(&reference_keys).take(5).collect_vec();
        let reference_only = reference_keys.difference(&degraded_keys).take(5).collect_vec();
        return Err(Error::mismatch(format!(
            "keys in '{}' and '{}' differ, e.g. {:?} and {:?}",
            degraded_root.display(),
            reference_root.display(),
            degraded_only,
            reference_only
        )));
    }

    let pairs = reference_keys
        .into_iter()
        .map(|key| PairRecord {
            degraded_key: key.clone(),
            reference_key: key,
        })
        .collect();
    Ok(pairs)
}

fn ensure_lmdb_dir(root: &Path) -> Result<()> {
    match root.extension().and_then(|ext| ext.to_str()) {
        Some("lmdb") => Ok(()),
        _ => Err(Error::config(format!(
            "'{}' must be an lmdb directory ending with '.lmdb'",
            root.display()
        ))),
    }
}
