//! The synchronized random scale crop.

use super::RandomSource;
use crate::{common::*, error::ensure_config};

/// The crop scales drawn from by default.
pub const CROP_SCALES: [f64; 3] = [0.75, 0.85, 0.95];

/// A crop rectangle in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub top: usize,
    pub left: usize,
    pub height: usize,
    pub width: usize,
}

impl CropRect {
    pub fn bottom(&self) -> usize {
        self.top + self.height
    }

    pub fn right(&self) -> usize {
        self.left + self.width
    }

    /// Cut the rectangle out of a `(height, width, channels)` array.
    pub fn apply(&self, pixels: &Array3<f32>) -> Array3<f32> {
        debug_assert!(self.bottom() <= pixels.shape()[0] && self.right() <= pixels.shape()[1]);
        pixels
            .slice(s![self.top..self.bottom(), self.left..self.right(), ..])
            .to_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RandomScaleCropInit {
    pub scales: Vec<R64>,
}

impl RandomScaleCropInit {
    pub fn build(self) -> Result<RandomScaleCrop> {
        let Self { scales } = self;
        ensure_config!(!scales.is_empty(), "at least one crop scale is required");
        let scales: Vec<_> = scales
            .into_iter()
            .map(|scale| {
                ensure_config!(
                    scale > 0.0 && scale <= 1.0,
                    "crop scale must be in (0, 1], but get {}",
                    scale
                );
                Ok(scale.raw())
            })
            .collect::<Result<_>>()?;
        Ok(RandomScaleCrop { scales })
    }
}

impl Default for RandomScaleCropInit {
    fn default() -> Self {
        Self {
            scales: CROP_SCALES.iter().cloned().map(r64).collect(),
        }
    }
}

/// Crops a randomly scaled rectangle at a random position.
#[derive(Debug, Clone)]
pub struct RandomScaleCrop {
    scales: Vec<f64>,
}

impl RandomScaleCrop {
    /// The crop size for `scale` on an image of `height` by `width`.
    ///
    /// Each side is floored and kept at least one pixel long.
    pub fn crop_size(scale: f64, height: usize, width: usize) -> [usize; 2] {
        let crop_h = ((height as f64 * scale) as usize).max(1);
        let crop_w = ((width as f64 * scale) as usize).max(1);
        [crop_h, crop_w]
    }

    /// Draw a crop rectangle for an image of `height` by `width`.
    ///
    /// The offset on an axis is drawn only when the crop is shorter than
    /// the image on that axis.
    pub fn sample<R>(&self, rng: &mut R, height: usize, width: usize) -> CropRect
    where
        R: RandomSource + ?Sized,
    {
        let scale = self.scales[rng.uniform_int(0, self.scales.len() - 1)];
        let [crop_h, crop_w] = Self::crop_size(scale, height, width);

        let top = if crop_h == height {
            0
        } else {
            rng.uniform_int(0, height - crop_h)
        };
        let left = if crop_w == width {
            0
        } else {
            rng.uniform_int(0, width - crop_w)
        };

        CropRect {
            top,
            left,
            height: crop_h,
            width: crop_w,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{EntropySource, ScriptedSource};

    #[test]
    fn scale_075_on_1000_by_800() {
        let crop = RandomScaleCropInit::default().build().unwrap();
        let mut rng = EntropySource::seeded(3);

        for _ in 0..64 {
            let offsets = vec![0, rng.uniform_int(0, 1000), rng.uniform_int(0, 1000)];
            let mut scripted = ScriptedSource::new(offsets, vec![]);
            let rect = crop.sample(&mut scripted, 1000, 800);
            assert_eq!((rect.height, rect.width), (750, 600));
            assert!(rect.top <= 250);
            assert!(rect.left <= 200);
            assert!(rect.bottom() <= 1000 && rect.right() <= 800);
        }
    }

    #[test]
    fn every_scale_crops_a_512_image() {
        let crop = RandomScaleCropInit::default().build().unwrap();
        let expect = [384, 435, 486];

        for (index, &side) in expect.iter().enumerate() {
            let mut rng = ScriptedSource::new(vec![index, 0, 0], vec![]);
            let rect = crop.sample(&mut rng, 512, 512);
            assert_eq!((rect.height, rect.width), (side, side));
            assert!(rect.height < 512);
        }
    }

    #[test]
    fn random_rects_stay_inside() {
        let crop = RandomScaleCropInit::default().build().unwrap();
        let mut rng = EntropySource::seeded(11);

        for _ in 0..256 {
            let height = rng.uniform_int(1, 300);
            let width = rng.uniform_int(1, 300);
            let rect = crop.sample(&mut rng, height, width);
            assert!(rect.height >= 1 && rect.width >= 1);
            assert!(rect.bottom() <= height && rect.right() <= width);
        }
    }

    #[test]
    fn apply_cuts_the_rectangle() {
        let pixels = Array3::from_shape_fn((6, 5, 3), |(y, x, c)| (y * 100 + x * 10 + c) as f32);
        let rect = CropRect {
            top: 2,
            left: 1,
            height: 3,
            width: 2,
        };
        let cropped = rect.apply(&pixels);
        assert_eq!(cropped.shape(), &[3, 2, 3]);
        assert_eq!(cropped[[0, 0, 0]], 210.0);
        assert_eq!(cropped[[2, 1, 2]], 422.0);
    }

    #[test]
    fn invalid_scales_are_rejected() {
        assert!(RandomScaleCropInit { scales: vec![] }.build().is_err());
        assert!(RandomScaleCropInit {
            scales: vec![r64(1.5)]
        }
        .build()
        .is_err());
    }
}
