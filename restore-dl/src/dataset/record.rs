use crate::common::*;

/// The keys of one degraded/reference pair, without image data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairRecord {
    pub degraded_key: String,
    pub reference_key: String,
}

/// A loaded pair ready for a model.
///
/// Both tensors are laid out as `(channels, height, width)` in RGB order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    /// The quantized degraded tensor.
    pub degraded: Array3<f32>,
    /// The reference tensor, normalized if configured.
    pub reference: Array3<f32>,
    pub degraded_key: String,
    pub reference_key: String,
    /// Reserved for conditioning text. Always empty.
    pub caption: String,
}

#[cfg(feature = "with-tch")]
impl SampleRecord {
    /// Copy both tensors into `(degraded, reference)` torch tensors.
    pub fn to_tch(&self) -> (tch::Tensor, tch::Tensor) {
        (array3_to_tch(&self.degraded), array3_to_tch(&self.reference))
    }
}

#[cfg(feature = "with-tch")]
pub(crate) fn array3_to_tch(array: &Array3<f32>) -> tch::Tensor {
    let (c, h, w) = array.dim();
    let values: Vec<f32> = array.iter().cloned().collect();
    tch::Tensor::of_slice(&values).view([c as i64, h as i64, w as i64])
}
