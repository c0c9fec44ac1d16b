#![cfg(feature = "lmdb")]

mod common;

use anyhow::Result;
use common::{encode_png, pattern};
use lmdb::{Environment, Transaction as _, WriteFlags};
use restore_dl::{
    dataset::CATALOG_FILE, Error, IoBackendConfig, Namespace, PairedDatasetInit, Phase,
    RandomAccessDataset, OUTPUT_SIZE,
};
use std::{fs, path::Path};

fn write_lmdb(root: &Path, entries: &[(&str, Vec<u8>)]) -> Result<()> {
    fs::create_dir_all(root)?;
    let env = Environment::new().set_map_size(1 << 26).open(root)?;
    let db = env.open_db(None)?;

    let mut txn = env.begin_rw_txn()?;
    for (key, bytes) in entries {
        txn.put(db, key, bytes, WriteFlags::empty())?;
    }
    txn.commit()?;

    let catalog = entries
        .iter()
        .map(|(key, _)| format!("{}.png (30,40,3) 1\n", key))
        .collect::<String>();
    fs::write(root.join(CATALOG_FILE), catalog)?;
    Ok(())
}

fn lmdb_init(dir: &Path) -> PairedDatasetInit {
    PairedDatasetInit {
        io_backend: IoBackendConfig::Lmdb,
        dataroot_gt: dir.join("gt.lmdb"),
        dataroot_lq: dir.join("lq.lmdb"),
        filename_tmpl: "{}".into(),
        meta_info_file: None,
        index_mode: None,
        mean: None,
        std: None,
        phase: Phase::Train,
        use_hflip: true,
        use_rot: true,
    }
}

#[test]
fn load_pairs_from_lmdb() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let keys = ["b_0001", "a_0000", "c_0002"];
    let lq = keys
        .iter()
        .enumerate()
        .map(|(index, &key)| (key, encode_png(&pattern(40, 30, index as u32 + 100))))
        .collect::<Vec<_>>();
    let gt = keys
        .iter()
        .enumerate()
        .map(|(index, &key)| (key, encode_png(&pattern(40, 30, index as u32))))
        .collect::<Vec<_>>();
    write_lmdb(&dir.path().join("lq.lmdb"), &lq)?;
    write_lmdb(&dir.path().join("gt.lmdb"), &gt)?;

    let mut dataset = lmdb_init(dir.path()).build()?;
    assert_eq!(dataset.num_records(), 3);
    assert!(!dataset.is_storage_ready());

    let sample = dataset.nth(0)?;
    assert_eq!(sample.degraded_key, "a_0000");
    assert_eq!(sample.reference_key, "a_0000");
    assert_eq!(sample.degraded.dim(), (3, OUTPUT_SIZE, OUTPUT_SIZE));
    assert!(dataset.is_storage_ready());

    let mut forked = dataset.fork();
    assert_eq!(forked.nth(2)?.reference_key, "c_0002");
    Ok(())
}

#[test]
fn catalog_key_missing_from_the_store() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_lmdb(
        &dir.path().join("lq.lmdb"),
        &[("0000", encode_png(&pattern(40, 30, 1)))],
    )?;
    write_lmdb(
        &dir.path().join("gt.lmdb"),
        &[("0000", encode_png(&pattern(40, 30, 0)))],
    )?;
    fs::write(
        dir.path().join("lq.lmdb").join(CATALOG_FILE),
        "0000.png\n0001.png\n",
    )?;
    fs::write(
        dir.path().join("gt.lmdb").join(CATALOG_FILE),
        "0000.png\n0001.png\n",
    )?;

    let mut dataset = lmdb_init(dir.path()).build()?;
    assert!(dataset.nth(0).is_ok());
    assert!(matches!(
        dataset.nth(1),
        Err(Error::Fetch {
            namespace: Namespace::Reference,
            ..
        })
    ));
    Ok(())
}

#[test]
fn catalogs_must_agree() -> Result<()> {
    let dir = tempfile::tempdir()?;
    write_lmdb(
        &dir.path().join("lq.lmdb"),
        &[("0000", encode_png(&pattern(40, 30, 1)))],
    )?;
    write_lmdb(
        &dir.path().join("gt.lmdb"),
        &[("0001", encode_png(&pattern(40, 30, 0)))],
    )?;

    assert!(matches!(
        lmdb_init(dir.path()).build(),
        Err(Error::IndexMismatch(_))
    ));
    Ok(())
}
