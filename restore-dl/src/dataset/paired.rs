use super::{PairRecord, RandomAccessDataset, SampleRecord};
use crate::{
    common::*,
    config::{Phase, PipelineConfig},
    decode::{decode_keyed, ChannelOrder},
    processor::{
        pack_chw, quantize_u8_, resize_linear, Augment, EntropySource, Normalize, RandomScaleCrop,
        RandomScaleCropInit, RandomSource, OUTPUT_SIZE,
    },
    profiling::Timing,
    storage::{Backend, LazyStorage, Namespace},
};

/// The immutable part of a pipeline, shared by forked instances.
#[derive(Debug)]
struct Settings {
    backend: Backend,
    phase: Phase,
    crop: RandomScaleCrop,
    augment: Augment,
    normalize: Option<Normalize>,
}

/// The paired degraded/reference image dataset.
///
/// Every sample is cropped at a random scale and position, resized to
/// [OUTPUT_SIZE] and, in the training phase, flipped and transposed. Both
/// images of a pair go through identical geometric transforms. The degraded
/// tensor is quantized to 8-bit levels and the reference tensor is
/// normalized when mean and std are configured.
///
/// The storage backend is connected on the first sample request.
#[derive(Debug, Getters)]
pub struct PairedImageDataset<R = EntropySource>
where
    R: RandomSource,
{
    /// The resolved pairs. Its order defines sample indexes.
    #[getset(get = "pub")]
    index: Arc<[PairRecord]>,
    settings: Arc<Settings>,
    storage: LazyStorage,
    rng: R,
}

impl<R> PairedImageDataset<R>
where
    R: RandomSource,
{
    /// Resolve the pair index and build the dataset.
    ///
    /// No storage connection is made here.
    pub fn new(config: PipelineConfig, rng: R) -> Result<Self> {
        let PipelineConfig {
            degraded_root,
            reference_root,
            index_mode,
            template,
            backend,
            phase,
            augment,
            normalize,
        } = config;

        let index = index_mode.resolve(&degraded_root, &reference_root, &template)?;
        info!(
            "resolved {} pairs from '{}' and '{}' using {:?} index",
            index.len(),
            degraded_root.display(),
            reference_root.display(),
            index_mode
        );
        if index.is_empty() {
            warn!("the paired dataset is empty");
        }

        let settings = Settings {
            backend: backend.clone(),
            phase,
            crop: RandomScaleCropInit::default().build()?,
            augment: augment.build(),
            normalize,
        };

        Ok(Self {
            index: index.into(),
            settings: Arc::new(settings),
            storage: LazyStorage::new(backend),
            rng,
        })
    }

    /// Create another instance sharing the index and settings.
    ///
    /// The new instance has its own random source and its own storage
    /// client, which is connected on its first sample request.
    pub fn fork_with<S>(&self, rng: S) -> PairedImageDataset<S>
    where
        S: RandomSource,
    {
        PairedImageDataset {
            index: self.index.clone(),
            settings: self.settings.clone(),
            storage: LazyStorage::new(self.settings.backend.clone()),
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.settings.phase
    }

    pub fn normalize(&self) -> Option<&Normalize> {
        self.settings.normalize.as_ref()
    }

    pub fn is_storage_ready(&self) -> bool {
        self.storage.is_ready()
    }

    pub fn random_source_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    fn load(&mut self, index: usize) -> Result<SampleRecord> {
        let len = self.index.len();
        let PairRecord {
            degraded_key,
            reference_key,
        } = self
            .index
            .get(index)
            .cloned()
            .ok_or(Error::OutOfRange { index, len })?;
        let mut timing = Timing::for_pair("paired sample", index);

        // fetch and decode
        let (reference, degraded) = {
            let client = self.storage.client()?;
            let reference_bytes = client.get(&reference_key, Namespace::Reference)?;
            let degraded_bytes = client.get(&degraded_key, Namespace::Degraded)?;
            timing.set_record("fetch");

            let reference = decode_keyed(&reference_key, &reference_bytes)?;
            let degraded = decode_keyed(&degraded_key, &degraded_bytes)?;
            timing.set_record("decode");
            (reference, degraded)
        };

        if reference.hw() != degraded.hw() || reference.channels() != degraded.channels() {
            return Err(Error::mismatch(format!(
                "'{}' has shape {:?} but '{}' has shape {:?}",
                degraded_key,
                degraded.pixels.dim(),
                reference_key,
                reference.pixels.dim()
            )));
        }
        let order = reference.order;

        // crop and resize
        let [height, width] = reference.hw();
        let rect = self.settings.crop.sample(&mut self.rng, height, width);
        let reference = resize_linear(&rect.apply(&reference.pixels), OUTPUT_SIZE, OUTPUT_SIZE);
        let degraded = resize_linear(&rect.apply(&degraded.pixels), OUTPUT_SIZE, OUTPUT_SIZE);
        timing.set_record("crop & resize");

        // flip and rotate
        let (reference, degraded) = match self.settings.phase {
            Phase::Train => {
                let transform = self.settings.augment.sample(&mut self.rng);
                (transform.apply(reference), transform.apply(degraded))
            }
            Phase::Eval => (reference, degraded),
        };
        timing.set_record("augment");

        // pack into tensors
        let mut reference = pack_chw(&reference, order, ChannelOrder::Rgb);
        let mut degraded = pack_chw(&degraded, order, ChannelOrder::Rgb);
        quantize_u8_(&mut degraded);
        if let Some(normalize) = &self.settings.normalize {
            normalize.forward_(&mut reference)?;
        }
        timing.set_record("pack");

        trace!(
            "loaded pair {} with crop {:?} from '{}'",
            index,
            rect,
            reference_key
        );
        timing.report();

        Ok(SampleRecord {
            degraded,
            reference,
            degraded_key,
            reference_key,
            caption: String::new(),
        })
    }
}

impl PairedImageDataset<EntropySource> {
    /// Fork with a fresh entropy-seeded random source.
    pub fn fork(&self) -> Self {
        self.fork_with(EntropySource::new())
    }
}

impl<R> RandomAccessDataset for PairedImageDataset<R>
where
    R: RandomSource,
{
    fn num_records(&self) -> usize {
        self.index.len()
    }

    fn nth(&mut self, index: usize) -> Result<SampleRecord> {
        self.load(index)
    }
}
