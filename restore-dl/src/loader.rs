//! Multi-worker batch loading over forked dataset instances.

use crate::{
    common::*,
    dataset::{PairedImageDataset, RandomAccessDataset, SampleRecord},
    error::ensure_config,
    processor::EntropySource,
};

/// A batch of samples stacked along a leading batch axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PairBatch {
    /// Shaped `(batch, channels, height, width)`.
    pub degraded: Array4<f32>,
    /// Shaped `(batch, channels, height, width)`.
    pub reference: Array4<f32>,
    pub degraded_keys: Vec<String>,
    pub reference_keys: Vec<String>,
    pub captions: Vec<String>,
}

impl PairBatch {
    pub fn collate(samples: Vec<SampleRecord>) -> Result<Self> {
        ensure_config!(!samples.is_empty(), "cannot collate an empty batch");

        let degraded = stack(&samples.iter().map(|sample| sample.degraded.view()).collect_vec())?;
        let reference =
            stack(&samples.iter().map(|sample| sample.reference.view()).collect_vec())?;

        let (degraded_keys, reference_keys, captions) = samples.into_iter().fold(
            (vec![], vec![], vec![]),
            |(mut degraded_keys, mut reference_keys, mut captions), sample| {
                degraded_keys.push(sample.degraded_key);
                reference_keys.push(sample.reference_key);
                captions.push(sample.caption);
                (degraded_keys, reference_keys, captions)
            },
        );

        Ok(Self {
            degraded,
            reference,
            degraded_keys,
            reference_keys,
            captions,
        })
    }

    pub fn len(&self) -> usize {
        self.degraded_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degraded_keys.is_empty()
    }

    #[cfg(feature = "with-tch")]
    pub fn to_tch(&self) -> (tch::Tensor, tch::Tensor) {
        let convert = |array: &Array4<f32>| {
            let (n, c, h, w) = array.dim();
            let values: Vec<f32> = array.iter().cloned().collect();
            tch::Tensor::of_slice(&values).view([n as i64, c as i64, h as i64, w as i64])
        };
        (convert(&self.degraded), convert(&self.reference))
    }
}

fn stack(tensors: &[ArrayView3<f32>]) -> Result<Array4<f32>> {
    ndarray::stack(Axis(0), tensors)
        .map_err(|err| Error::Loader(format!("unable to stack samples: {}", err)))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairLoaderInit {
    pub batch_size: usize,
    /// Defaults to the number of CPUs.
    pub num_workers: Option<usize>,
    pub shuffle: bool,
    /// Skip the last batch if it is smaller than `batch_size`.
    pub drop_last: bool,
    /// Seeds shuffling and the workers' random sources.
    pub seed: Option<u64>,
}

impl Default for PairLoaderInit {
    fn default() -> Self {
        Self {
            batch_size: 1,
            num_workers: None,
            shuffle: true,
            drop_last: false,
            seed: None,
        }
    }
}

impl PairLoaderInit {
    pub fn build(self, dataset: PairedImageDataset<EntropySource>) -> Result<PairLoader> {
        let Self {
            batch_size,
            num_workers,
            shuffle,
            drop_last,
            seed,
        } = self;

        ensure_config!(batch_size > 0, "batch_size must be positive");
        let num_workers = num_workers.unwrap_or_else(num_cpus::get);
        ensure_config!(num_workers > 0, "num_workers must be positive");

        Ok(PairLoader {
            dataset,
            batch_size,
            num_workers,
            shuffle,
            drop_last,
            seed,
        })
    }
}

/// Loads batches with a pool of worker threads.
///
/// Every worker owns a dataset instance forked from the one given at
/// construction, so no storage client is shared between threads.
#[derive(Debug)]
pub struct PairLoader {
    dataset: PairedImageDataset<EntropySource>,
    batch_size: usize,
    num_workers: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
}

impl PairLoader {
    pub fn num_batches(&self) -> usize {
        let num_records = self.dataset.num_records();
        if self.drop_last {
            num_records / self.batch_size
        } else {
            (num_records + self.batch_size - 1) / self.batch_size
        }
    }

    /// Start loading one pass over the dataset.
    ///
    /// Batches are yielded in order. The iteration stops after the first
    /// error. Dropping the iterator stops the workers after their current
    /// batch.
    pub fn epoch(&self, epoch: usize) -> PairBatchIter {
        let num_records = self.dataset.num_records();
        let seed = self.seed.map(|seed| seed.wrapping_add(epoch as u64));

        let mut indexes = (0..num_records).collect_vec();
        if self.shuffle {
            match seed {
                Some(seed) => indexes.shuffle(&mut StdRng::seed_from_u64(seed)),
                None => indexes.shuffle(&mut rand::thread_rng()),
            }
        }

        let batches = indexes
            .chunks(self.batch_size)
            .filter(|chunk| !self.drop_last || chunk.len() == self.batch_size)
            .map(<[usize]>::to_vec)
            .collect_vec();
        let num_batches = batches.len();
        debug!(
            "epoch {} has {} batches over {} workers",
            epoch, num_batches, self.num_workers
        );

        let (job_tx, job_rx) = flume::unbounded::<(usize, Vec<usize>)>();
        let (result_tx, result_rx) = flume::unbounded();

        (0..self.num_workers.min(num_batches)).for_each(|worker_index| {
            let rng = match seed {
                Some(seed) => EntropySource::seeded(
                    seed.wrapping_mul(1_000_003)
                        .wrapping_add(worker_index as u64),
                ),
                None => EntropySource::new(),
            };
            let mut dataset = self.dataset.fork_with(rng);
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();

            thread::spawn(move || {
                while let Ok((batch_index, indexes)) = job_rx.recv() {
                    let result = indexes
                        .into_iter()
                        .map(|index| dataset.nth(index))
                        .collect::<Result<Vec<_>>>()
                        .and_then(PairBatch::collate);

                    if result_tx.send((batch_index, result)).is_err() {
                        break;
                    }
                }
                trace!("loader worker {} finished", worker_index);
            });
        });
        drop(result_tx);

        let mut iter = PairBatchIter {
            jobs: batches.into_iter().enumerate().collect(),
            job_tx: Some(job_tx),
            result_rx,
            pending: BTreeMap::new(),
            window: self.window(),
            next_batch: 0,
            num_batches,
            failed: false,
        };
        (0..iter.window).for_each(|_| iter.dispatch());
        iter
    }

    /// The maximum number of batches dispatched but not yet yielded.
    pub fn window(&self) -> usize {
        self.num_workers * 2
    }
}

/// The ordered batch iterator of one epoch.
///
/// At most [PairLoader::window] batches are dispatched ahead of the batch
/// being waited for, so a stalled batch holds back the workers instead of
/// growing the reorder buffer.
#[derive(Debug)]
pub struct PairBatchIter {
    jobs: VecDeque<(usize, Vec<usize>)>,
    job_tx: Option<flume::Sender<(usize, Vec<usize>)>>,
    result_rx: flume::Receiver<(usize, Result<PairBatch>)>,
    pending: BTreeMap<usize, Result<PairBatch>>,
    window: usize,
    next_batch: usize,
    num_batches: usize,
    failed: bool,
}

impl PairBatchIter {
    /// The number of finished batches held back for reordering.
    pub fn num_buffered(&self) -> usize {
        self.pending.len()
    }

    fn dispatch(&mut self) {
        let job = match self.jobs.pop_front() {
            Some(job) => job,
            None => {
                self.stop_dispatch();
                return;
            }
        };
        if let Some(job_tx) = &self.job_tx {
            let _ = job_tx.send(job);
        }
    }

    /// Let the workers exit once the dispatched jobs are done.
    fn stop_dispatch(&mut self) {
        self.jobs.clear();
        self.job_tx = None;
    }
}

impl Iterator for PairBatchIter {
    type Item = Result<PairBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_batch >= self.num_batches {
            return None;
        }

        loop {
            if let Some(result) = self.pending.remove(&self.next_batch) {
                self.next_batch += 1;
                if result.is_ok() {
                    self.dispatch();
                } else {
                    self.failed = true;
                    self.stop_dispatch();
                }
                return Some(result);
            }

            match self.result_rx.recv() {
                Ok((batch_index, result)) => {
                    self.pending.insert(batch_index, result);
                }
                Err(_) => {
                    self.failed = true;
                    self.stop_dispatch();
                    return Some(Err(Error::Loader(format!(
                        "workers exited before delivering batch {}",
                        self.next_batch
                    ))));
                }
            }
        }
    }
}
