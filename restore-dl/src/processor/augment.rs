//! The synchronized flip and rotation augmentation.

use super::RandomSource;
use crate::common::*;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AugmentInit {
    pub horizontal_flip: bool,
    pub rotation: bool,
}

impl AugmentInit {
    pub fn build(self) -> Augment {
        let Self {
            horizontal_flip,
            rotation,
        } = self;

        Augment {
            horizontal_flip,
            rotation,
        }
    }
}

/// Draws flips and transposes that are applied alike to every image of a pair.
#[derive(Debug, Clone)]
pub struct Augment {
    horizontal_flip: bool,
    rotation: bool,
}

impl Augment {
    /// Draw one transform.
    ///
    /// Each enabled operation takes one draw with probability 1/2. The
    /// rotation option covers a vertical flip and a transpose, which together
    /// with the horizontal flip reach every right-angle rotation and mirror.
    pub fn sample<R>(&self, rng: &mut R) -> FlipTransform
    where
        R: RandomSource + ?Sized,
    {
        let horizontal_flip = self.horizontal_flip && rng.uniform_unit() < 0.5;
        let vertical_flip = self.rotation && rng.uniform_unit() < 0.5;
        let transpose = self.rotation && rng.uniform_unit() < 0.5;

        FlipTransform {
            horizontal_flip,
            vertical_flip,
            transpose,
        }
    }
}

/// A composition of flips and a transpose, applied in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FlipTransform {
    pub horizontal_flip: bool,
    pub vertical_flip: bool,
    pub transpose: bool,
}

impl FlipTransform {
    pub fn is_identity(&self) -> bool {
        !(self.horizontal_flip || self.vertical_flip || self.transpose)
    }

    /// Apply the transform to a `(height, width, channels)` array.
    pub fn apply(&self, pixels: Array3<f32>) -> Array3<f32> {
        let pixels = if self.horizontal_flip {
            pixels.slice(s![.., ..;-1, ..]).to_owned()
        } else {
            pixels
        };
        let pixels = if self.vertical_flip {
            pixels.slice(s![..;-1, .., ..]).to_owned()
        } else {
            pixels
        };
        if self.transpose {
            pixels
                .permuted_axes([1, 0, 2])
                .as_standard_layout()
                .into_owned()
        } else {
            pixels
        }
    }
}
