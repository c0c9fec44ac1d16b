#![allow(dead_code)]

use image::{Rgb, RgbImage};
use noisy_float::types::r64;
use restore_dl::{IoBackendConfig, PairedDatasetInit, Phase};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A deterministic test pattern that differs along both axes and channels.
pub fn pattern(width: u32, height: u32, seed: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let value = |channel: u32| ((x * 7 + y * 13 + channel * 50 + seed * 31) % 256) as u8;
        Rgb([value(0), value(1), value(2)])
    })
}

pub fn encode_png(image: &RgbImage) -> Vec<u8> {
    let mut bytes = vec![];
    image::DynamicImage::ImageRgb8(image.clone())
        .write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageOutputFormat::Png,
        )
        .unwrap();
    bytes
}

pub struct PairedFolders {
    pub dir: tempfile::TempDir,
    pub lq: PathBuf,
    pub gt: PathBuf,
}

impl PairedFolders {
    /// Write `sizes.len()` pairs named `0000.png`, `0001.png` and so on.
    ///
    /// With `identical`, the degraded image equals the reference image.
    pub fn new(sizes: &[(u32, u32)], identical: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let lq = dir.path().join("lq");
        let gt = dir.path().join("gt");
        fs::create_dir_all(&lq).unwrap();
        fs::create_dir_all(&gt).unwrap();

        sizes
            .iter()
            .enumerate()
            .for_each(|(index, &(width, height))| {
                let name = format!("{:04}.png", index);
                let seed = index as u32;
                pattern(width, height, seed).save(gt.join(&name)).unwrap();
                let lq_seed = if identical { seed } else { seed + 100 };
                pattern(width, height, lq_seed).save(lq.join(&name)).unwrap();
            });

        Self { dir, lq, gt }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn init(&self) -> PairedDatasetInit {
        PairedDatasetInit {
            io_backend: IoBackendConfig::Disk,
            dataroot_gt: self.gt.clone(),
            dataroot_lq: self.lq.clone(),
            filename_tmpl: "{}".into(),
            meta_info_file: None,
            index_mode: None,
            mean: None,
            std: None,
            phase: Phase::Eval,
            use_hflip: false,
            use_rot: false,
        }
    }
}

pub fn with_normalization(mut init: PairedDatasetInit, mean: f64, std: f64) -> PairedDatasetInit {
    init.mean = Some(vec![r64(mean); 3]);
    init.std = Some(vec![r64(std); 3]);
    init
}
