//! Bilinear resizing with half-pixel centers.

use crate::common::*;

/// The interpolation taps of one axis.
#[derive(Debug, Clone)]
struct LinearTaps {
    lower: Vec<usize>,
    upper: Vec<usize>,
    weight: Vec<f32>,
}

impl LinearTaps {
    fn new(src_len: usize, dst_len: usize) -> Self {
        let scale = src_len as f64 / dst_len as f64;
        let last = src_len - 1;

        let mut lower = Vec::with_capacity(dst_len);
        let mut upper = Vec::with_capacity(dst_len);
        let mut weight = Vec::with_capacity(dst_len);

        for dst in 0..dst_len {
            let pos = (dst as f64 + 0.5) * scale - 0.5;
            let index = pos.floor();
            let (index, frac) = if index < 0.0 {
                (0, 0.0)
            } else if index as usize >= last {
                (last, 0.0)
            } else {
                (index as usize, pos - index)
            };
            lower.push(index);
            upper.push((index + 1).min(last));
            weight.push(frac as f32);
        }

        Self {
            lower,
            upper,
            weight,
        }
    }
}

/// Resize a `(height, width, channels)` array with linear interpolation.
///
/// Sample positions use half-pixel centers and are clamped at the borders.
/// No antialiasing is applied when shrinking.
pub fn resize_linear(pixels: &Array3<f32>, height: usize, width: usize) -> Array3<f32> {
    let (src_h, src_w, channels) = pixels.dim();
    assert!(src_h > 0 && src_w > 0, "cannot resize an empty image");

    if (src_h, src_w) == (height, width) {
        return pixels.clone();
    }

    let rows = LinearTaps::new(src_h, height);
    let cols = LinearTaps::new(src_w, width);

    Array3::from_shape_fn((height, width, channels), |(y, x, c)| {
        let (y0, y1, wy) = (rows.lower[y], rows.upper[y], rows.weight[y]);
        let (x0, x1, wx) = (cols.lower[x], cols.upper[x], cols.weight[x]);

        let top = pixels[[y0, x0, c]] * (1.0 - wx) + pixels[[y0, x1, c]] * wx;
        let bottom = pixels[[y1, x0, c]] * (1.0 - wx) + pixels[[y1, x1, c]] * wx;
        top * (1.0 - wy) + bottom * wy
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn row(values: &[f32]) -> Array3<f32> {
        Array3::from_shape_fn((1, values.len(), 1), |(_, x, _)| values[x])
    }

    #[test]
    fn upscale_row() {
        let output = resize_linear(&row(&[0.0, 1.0]), 1, 4);
        let values: Vec<_> = output.iter().cloned().collect();
        let expect = [0.0, 0.25, 0.75, 1.0];
        values
            .iter()
            .zip(expect)
            .for_each(|(&lhs, rhs)| assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-6));
    }

    #[test]
    fn downscale_row_averages_neighbors() {
        let output = resize_linear(&row(&[0.0, 1.0, 2.0, 5.0]), 1, 2);
        assert_abs_diff_eq!(output[[0, 0, 0]], 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(output[[0, 1, 0]], 3.5, epsilon = 1e-6);
    }

    #[test]
    fn constant_image_stays_constant() {
        let pixels = Array3::from_elem((37, 53, 3), 0.4f32);
        let output = resize_linear(&pixels, 512, 512);
        assert_eq!(output.dim(), (512, 512, 3));
        output
            .iter()
            .for_each(|&value| assert_abs_diff_eq!(value, 0.4, epsilon = 1e-6));
    }

    #[test]
    fn same_size_is_identity() {
        let pixels = Array3::from_shape_fn((5, 4, 2), |(y, x, c)| (y * 8 + x * 2 + c) as f32);
        assert_eq!(resize_linear(&pixels, 5, 4), pixels);
    }
}
