//! Tensor packing and value finishing.

use crate::{common::*, decode::ChannelOrder, error::ensure_config};

/// Pack `(height, width, channels)` pixels in `from` order into a
/// `(channels, height, width)` tensor in `to` order.
pub fn pack_chw(pixels: &Array3<f32>, from: ChannelOrder, to: ChannelOrder) -> Array3<f32> {
    let (height, width, channels) = pixels.dim();
    let reorder = from != to && channels == 3;

    Array3::from_shape_fn((channels, height, width), |(c, y, x)| {
        let src_c = if reorder { channels - 1 - c } else { c };
        pixels[[y, x, src_c]]
    })
}

/// Simulate 8-bit storage: scale to `[0, 255]`, round half to even, clamp and
/// scale back.
pub fn quantize_u8_(tensor: &mut Array3<f32>) {
    tensor.mapv_inplace(|value| (value * 255.0).round_ties_even().clamp(0.0, 255.0) / 255.0);
}

/// Per-channel `(x - mean) / std` normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalize {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Normalize {
    pub fn new(mean: Vec<f32>, std: Vec<f32>) -> Result<Self> {
        ensure_config!(
            mean.len() == std.len(),
            "mean and std must have the same length, but get {} and {}",
            mean.len(),
            std.len()
        );
        ensure_config!(!mean.is_empty(), "mean and std must not be empty");
        ensure_config!(
            std.iter().all(|&value| value != 0.0 && value.is_finite()),
            "std must be finite and non-zero, but get {:?}",
            std
        );
        ensure_config!(
            mean.iter().all(|value| value.is_finite()),
            "mean must be finite, but get {:?}",
            mean
        );
        Ok(Self { mean, std })
    }

    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    pub fn std(&self) -> &[f32] {
        &self.std
    }

    pub fn channels(&self) -> usize {
        self.mean.len()
    }

    /// Normalize a `(channels, height, width)` tensor in place.
    pub fn forward_(&self, tensor: &mut Array3<f32>) -> Result<()> {
        let channels = tensor.dim().0;
        ensure_config!(
            channels == self.channels(),
            "normalization expects {} channels, but the tensor has {}",
            self.channels(),
            channels
        );

        izip!(tensor.outer_iter_mut(), &self.mean, &self.std).for_each(
            |(mut plane, &mean, &std)| {
                plane.mapv_inplace(|value| (value - mean) / std);
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pack_reorders_bgr_to_rgb() {
        let pixels = Array3::from_shape_fn((2, 2, 3), |(y, x, c)| (y * 100 + x * 10 + c) as f32);
        let tensor = pack_chw(&pixels, ChannelOrder::Bgr, ChannelOrder::Rgb);
        assert_eq!(tensor.dim(), (3, 2, 2));
        assert_eq!(tensor[[0, 1, 0]], 102.0);
        assert_eq!(tensor[[2, 1, 1]], 110.0);

        let same = pack_chw(&pixels, ChannelOrder::Rgb, ChannelOrder::Rgb);
        assert_eq!(same[[0, 1, 0]], 100.0);
    }

    #[test]
    fn quantized_values_are_multiples_of_one_255th() {
        let mut tensor = Array3::from_shape_fn((3, 4, 5), |(c, y, x)| {
            (c as f32 * 0.31 + y as f32 * 0.173 + x as f32 * 0.0571) - 0.2
        });
        quantize_u8_(&mut tensor);
        tensor.iter().for_each(|&value| {
            assert!((0.0..=1.0).contains(&value));
            let level = value * 255.0;
            assert_abs_diff_eq!(level, level.round(), epsilon = 1e-3);
        });
    }

    #[test]
    fn quantize_clamps_out_of_range_values() {
        let mut tensor = Array3::from_shape_vec((1, 1, 3), vec![-0.3, 1.7, 0.2]).unwrap();
        quantize_u8_(&mut tensor);
        assert_abs_diff_eq!(tensor[[0, 0, 0]], 0.0);
        assert_abs_diff_eq!(tensor[[0, 0, 1]], 1.0);
        assert_abs_diff_eq!(tensor[[0, 0, 2]], 51.0 / 255.0);
    }

    #[test]
    fn normalize_per_channel() {
        let normalize = Normalize::new(vec![0.5, 0.25, 0.0], vec![0.5, 0.25, 2.0]).unwrap();
        let mut tensor = Array3::from_elem((3, 2, 2), 1.0f32);
        normalize.forward_(&mut tensor).unwrap();
        assert_abs_diff_eq!(tensor[[0, 0, 0]], 1.0);
        assert_abs_diff_eq!(tensor[[1, 1, 1]], 3.0);
        assert_abs_diff_eq!(tensor[[2, 0, 1]], 0.5);

        let mut gray = Array3::from_elem((1, 2, 2), 1.0f32);
        assert!(normalize.forward_(&mut gray).is_err());
    }

    #[test]
    fn invalid_normalization_is_rejected() {
        assert!(Normalize::new(vec![0.5], vec![0.5, 0.5]).is_err());
        assert!(Normalize::new(vec![0.5], vec![0.0]).is_err());
        assert!(Normalize::new(vec![], vec![]).is_err());
    }
}
