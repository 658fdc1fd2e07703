// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interoperability conversions between the image and matrix types.

use image::RgbImage;
use nalgebra::DMatrix;

use crate::core::image::Image;
use crate::misc::type_aliases::{Float, Map};

/// Convert an `RgbImage` into a three channels float `Image` with values in [0, 1].
///
/// Performs a transposition to accomodate for the
/// row major image into the column major matrices.
pub fn image_from_rgb(img: &RgbImage) -> Image {
    let (width, height) = img.dimensions();
    let channels = (0..3)
        .map(|c| {
            DMatrix::from_fn(height as usize, width as usize, |i, j| {
                Float::from(img.get_pixel(j as u32, i as u32)[c]) / 255.0
            })
        })
        .collect();
    Image::from_channels_unchecked(channels)
}

/// Convert a 16 bits row major buffer into a depth map with a given scaling.
///
/// A value of 0 (unknown depth) is kept as 0.
pub fn depth_from_u16(width: usize, height: usize, buffer: &[u16], scale: Float) -> Map {
    DMatrix::from_row_slice(height, width, buffer).map(|d| Float::from(d) / scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rgb_layout_is_row_major() {
        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([(10 * x + y) as u8, 0, 255]));
        let converted = image_from_rgb(&img);
        assert_eq!((2, 3, 3), converted.shape());
        approx::assert_relative_eq!(21.0 / 255.0, converted.channel(0)[(1, 2)]);
        approx::assert_relative_eq!(1.0, converted.channel(2)[(0, 0)]);
    }

    #[test]
    fn depth_scaling() {
        let depth = depth_from_u16(2, 1, &[0, 512], 256.0);
        assert_eq!(Map::from_row_slice(1, 2, &[0.0, 2.0]), depth);
    }
}
