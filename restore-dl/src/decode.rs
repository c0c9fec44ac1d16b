//! Image decoding into floating point pixel arrays.

use crate::common::*;

/// The channel order of a pixel array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    Bgr,
    Rgb,
}

/// Decoded pixels laid out as `(height, width, channels)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub pixels: Array3<f32>,
    pub order: ChannelOrder,
}

impl RawImage {
    pub fn height(&self) -> usize {
        self.pixels.shape()[0]
    }

    pub fn width(&self) -> usize {
        self.pixels.shape()[1]
    }

    pub fn channels(&self) -> usize {
        self.pixels.shape()[2]
    }

    pub fn hw(&self) -> [usize; 2] {
        [self.height(), self.width()]
    }
}

/// Decode an encoded image into 3-channel BGR pixels.
///
/// Pixels are scaled into `[0, 1]` when `float32` is set, and otherwise keep
/// their 8-bit integer values.
pub fn decode_image(bytes: &[u8], float32: bool) -> Result<RawImage> {
    let image = image::load_from_memory(bytes)
        .map_err(|err| Error::Decode {
            key: String::new(),
            reason: err.to_string(),
        })?
        .to_rgb8();
    let (width, height) = image.dimensions();
    let (height, width) = (height as usize, width as usize);
    let scale = if float32 { 1.0 / 255.0 } else { 1.0 };

    let samples = image.into_raw();
    let pixels = Array3::from_shape_fn((height, width, 3), |(row, col, channel)| {
        // stored order is BGR
        let rgb_channel = 2 - channel;
        samples[(row * width + col) * 3 + rgb_channel] as f32 * scale
    });

    Ok(RawImage {
        pixels,
        order: ChannelOrder::Bgr,
    })
}

/// Decode the bytes fetched for `key`, naming the key in errors.
pub fn decode_keyed(key: &str, bytes: &[u8]) -> Result<RawImage> {
    decode_image(bytes, true).map_err(|err| match err {
        Error::Decode { reason, .. } => Error::Decode {
            key: key.to_owned(),
            reason,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut bytes = vec![];
        DynamicImage::ImageRgb8(image.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decode_png_into_bgr_floats() {
        let image = RgbImage::from_fn(4, 2, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 255]));
        let raw = decode_image(&encode_png(&image), true).unwrap();

        assert_eq!(raw.hw(), [2, 4]);
        assert_eq!(raw.channels(), 3);
        assert_eq!(raw.order, ChannelOrder::Bgr);
        assert_abs_diff_eq!(raw.pixels[[1, 3, 0]], 1.0);
        assert_abs_diff_eq!(raw.pixels[[1, 3, 1]], 20.0 / 255.0);
        assert_abs_diff_eq!(raw.pixels[[1, 3, 2]], 30.0 / 255.0);

        let raw = decode_image(&encode_png(&image), false).unwrap();
        assert_abs_diff_eq!(raw.pixels[[1, 3, 2]], 30.0);
    }

    #[test]
    fn malformed_bytes_are_decode_errors() {
        let err = decode_keyed("broken.png", b"not an image").unwrap_err();
        match err {
            Error::Decode { key, .. } => assert_eq!(key, "broken.png"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
