use anyhow::{ensure, Context, Result};
use clap::Parser;
use image::{Rgb, RgbImage};
use itertools::Itertools as _;
use log::info;
use ndarray::Array3;
use prettytable::{cell, row, Table};
use restore_dl::{
    corpus::{self, SplitDirs, SplitRatios, DEFAULT_VAL_MULTIPLE},
    processor::Normalize,
    PairedDatasetInit, RandomAccessDataset, SampleRecord,
};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

#[derive(Debug, Clone, Parser)]
enum Opts {
    /// Load samples from a dataset and show their statistics.
    Inspect {
        /// configuration file
        config_file: PathBuf,
        /// number of samples to load
        #[clap(long, default_value = "4")]
        count: usize,
        /// directory to write side-by-side previews
        #[clap(long)]
        output_dir: Option<PathBuf>,
    },
    /// Copy randomly chosen files into another directory.
    Sample {
        source: PathBuf,
        dest: PathBuf,
        #[clap(long)]
        num_files: usize,
        #[clap(long)]
        preserve_structure: bool,
    },
    /// Split files into train, val and test directories.
    Split {
        source: PathBuf,
        train_dir: PathBuf,
        val_dir: PathBuf,
        test_dir: PathBuf,
        #[clap(long, default_value = "0.8")]
        train_ratio: f64,
        #[clap(long, default_value = "0.1")]
        val_ratio: f64,
        #[clap(long, default_value = "0.1")]
        test_ratio: f64,
        #[clap(long, default_value_t = DEFAULT_VAL_MULTIPLE)]
        val_multiple: usize,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    match Opts::parse() {
        Opts::Inspect {
            config_file,
            count,
            output_dir,
        } => {
            inspect(config_file, count, output_dir.as_deref())?;
        }
        Opts::Sample {
            source,
            dest,
            num_files,
            preserve_structure,
        } => {
            let summary = corpus::copy_random_files(&source, &dest, num_files, preserve_structure)
                .with_context(|| format!("unable to sample files from '{}'", source.display()))?;
            info!(
                "copied {} of {} files",
                summary.num_copied, summary.num_available
            );
        }
        Opts::Split {
            source,
            train_dir,
            val_dir,
            test_dir,
            train_ratio,
            val_ratio,
            test_ratio,
            val_multiple,
        } => {
            let dirs = SplitDirs {
                train: train_dir,
                val: val_dir,
                test: test_dir,
            };
            let ratios = SplitRatios {
                train: train_ratio,
                val: val_ratio,
                test: test_ratio,
            };
            let summary = corpus::split_dataset(&source, &dirs, ratios, val_multiple)
                .with_context(|| format!("unable to split '{}'", source.display()))?;
            info!(
                "split into {} train, {} val and {} test files",
                summary.num_train, summary.num_val, summary.num_test
            );
        }
    }

    Ok(())
}

fn inspect(config_file: impl AsRef<Path>, count: usize, output_dir: Option<&Path>) -> Result<()> {
    let config_file = config_file.as_ref();
    let init = PairedDatasetInit::open(config_file)
        .with_context(|| format!("unable to load '{}'", config_file.display()))?;
    let mut dataset = init.build()?;
    let normalize = dataset.normalize().cloned();

    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("unable to create '{}'", dir.display()))?;
    }

    let count = count.min(dataset.num_records());
    let mut table = Table::new();
    table.add_row(row![
        "index",
        "degraded key",
        "reference key",
        "shape",
        "degraded range",
        "reference range",
        "elapsed"
    ]);

    for index in 0..count {
        let since = Instant::now();
        let sample = dataset
            .nth(index)
            .with_context(|| format!("unable to load sample {}", index))?;
        let elapsed = since.elapsed();

        table.add_row(row![
            index,
            sample.degraded_key,
            sample.reference_key,
            format!("{:?}", sample.degraded.shape()),
            format_range(&sample.degraded),
            format_range(&sample.reference),
            format!("{:?}", elapsed),
        ]);

        if let Some(dir) = output_dir {
            let path = dir.join(format!("{:05}.png", index));
            preview(&sample, normalize.as_ref())?
                .save(&path)
                .with_context(|| format!("unable to write '{}'", path.display()))?;
        }
    }

    table.printstd();
    Ok(())
}

fn format_range(tensor: &Array3<f32>) -> String {
    let (min, max) = tensor
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
            (min.min(value), max.max(value))
        });
    format!("[{:.3}, {:.3}]", min, max)
}

/// Draw the degraded image on the left and the denormalized reference on
/// the right.
fn preview(sample: &SampleRecord, normalize: Option<&Normalize>) -> Result<RgbImage> {
    let (channels, height, width) = sample.degraded.dim();
    ensure!(channels == 3, "expect 3 channels, but get {}", channels);

    let reference = match normalize {
        Some(normalize) => {
            let mut reference = sample.reference.clone();
            reference
                .outer_iter_mut()
                .zip_eq(normalize.mean().iter().zip_eq(normalize.std()))
                .for_each(|(mut plane, (&mean, &std))| {
                    plane.mapv_inplace(|value| value * std + mean);
                });
            reference
        }
        None => sample.reference.clone(),
    };

    let to_u8 = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    let image = RgbImage::from_fn((width * 2) as u32, height as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let (tensor, x) = if x < width {
            (&sample.degraded, x)
        } else {
            (&reference, x - width)
        };
        Rgb([
            to_u8(tensor[[0, y, x]]),
            to_u8(tensor[[1, y, x]]),
            to_u8(tensor[[2, y, x]]),
        ])
    });

    Ok(image)
}
