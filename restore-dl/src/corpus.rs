//! Tools to sample and split image corpora on disk.

use crate::{common::*, error::ensure_config, utils::list_files};

/// The default granularity of the validation split.
pub const DEFAULT_VAL_MULTIPLE: usize = 32;

const RATIO_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleSummary {
    pub num_available: usize,
    pub num_copied: usize,
}

/// Copy `count` randomly chosen files from `source` into `dest`.
///
/// Files are searched recursively. With `preserve_structure`, copies keep
/// their path relative to `source`, otherwise they are stored by file name.
pub fn copy_random_files(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    count: usize,
    preserve_structure: bool,
) -> Result<SampleSummary> {
    copy_random_files_with(source, dest, count, preserve_structure, &mut rand::thread_rng())
}

pub fn copy_random_files_with<G>(
    source: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    count: usize,
    preserve_structure: bool,
    rng: &mut G,
) -> Result<SampleSummary>
where
    G: Rng + ?Sized,
{
    let source = source.as_ref();
    let dest = dest.as_ref();

    let files = list_files(source)?;
    if files.is_empty() {
        warn!("no files found in '{}'", source.display());
        return Ok(SampleSummary {
            num_available: 0,
            num_copied: 0,
        });
    }

    let files = files.into_iter().collect_vec();
    let num_copied = count.min(files.len());
    info!(
        "copying {} of {} files from '{}' to '{}'",
        num_copied,
        files.len(),
        source.display(),
        dest.display()
    );

    fs::create_dir_all(dest).map_err(|err| Error::io(dest, err))?;
    for relative in files.choose_multiple(rng, num_copied) {
        let target = if preserve_structure {
            dest.join(relative)
        } else {
            dest.join(file_name(relative)?)
        };
        copy_file(&source.join(relative), &target)?;
    }

    Ok(SampleSummary {
        num_available: files.len(),
        num_copied,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SplitDirs {
    pub train: PathBuf,
    pub val: PathBuf,
    pub test: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            train: 0.8,
            val: 0.1,
            test: 0.1,
        }
    }
}

impl SplitRatios {
    fn validate(&self) -> Result<()> {
        let Self { train, val, test } = *self;
        ensure_config!(
            [train, val, test].iter().all(|ratio| ratio.is_finite() && *ratio >= 0.0),
            "split ratios must be non-negative, but get {:?}",
            self
        );
        ensure_config!(
            (train + val + test - 1.0).abs() <= RATIO_TOLERANCE,
            "split ratios must sum to 1, but get {}",
            train + val + test
        );
        Ok(())
    }

    /// Compute the number of train, val and test files.
    ///
    /// The val count is rounded down to a multiple of `val_multiple` and the
    /// test split takes the remainder.
    pub fn counts(&self, total: usize, val_multiple: usize) -> Result<[usize; 3]> {
        self.validate()?;
        ensure_config!(val_multiple > 0, "val_multiple must be positive");

        let num_train = ((total as f64 * self.train).floor() as usize).min(total);
        let num_val = (total as f64 * self.val / val_multiple as f64).floor() as usize * val_multiple;
        let num_val = num_val.min(total - num_train);
        let num_test = total - num_train - num_val;
        Ok([num_train, num_val, num_test])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SplitSummary {
    pub num_train: usize,
    pub num_val: usize,
    pub num_test: usize,
}

/// Shuffle the files under `source` and copy them into train, val and test
/// directories.
pub fn split_dataset(
    source: impl AsRef<Path>,
    dirs: &SplitDirs,
    ratios: SplitRatios,
    val_multiple: usize,
) -> Result<SplitSummary> {
    split_dataset_with(source, dirs, ratios, val_multiple, &mut rand::thread_rng())
}

pub fn split_dataset_with<G>(
    source: impl AsRef<Path>,
    dirs: &SplitDirs,
    ratios: SplitRatios,
    val_multiple: usize,
    rng: &mut G,
) -> Result<SplitSummary>
where
    G: Rng + ?Sized,
{
    let source = source.as_ref();
    let mut files = list_files(source)?.into_iter().collect_vec();
    let [num_train, num_val, num_test] = ratios.counts(files.len(), val_multiple)?;
    files.shuffle(rng);

    info!(
        "splitting {} files from '{}' into {} train, {} val and {} test files",
        files.len(),
        source.display(),
        num_train,
        num_val,
        num_test
    );

    let mut remaining = files.as_slice();
    for (dir, count) in [
        (&dirs.train, num_train),
        (&dirs.val, num_val),
        (&dirs.test, num_test),
    ] {
        let (chunk, rest) = remaining.split_at(count);
        remaining = rest;

        fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;
        for relative in chunk {
            copy_file(&source.join(relative), &dir.join(file_name(relative)?))?;
        }
        debug!("copied {} files into '{}'", count, dir.display());
    }

    Ok(SplitSummary {
        num_train,
        num_val,
        num_test,
    })
}

fn file_name(path: &Path) -> Result<&Path> {
    path.file_name()
        .map(Path::new)
        .ok_or_else(|| Error::config(format!("'{}' has no file name", path.display())))
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
    }
    fs::copy(from, to).map_err(|err| Error::io(from, err))?;
    trace!("copied '{}' to '{}'", from.display(), to.display());
    Ok(())
}
