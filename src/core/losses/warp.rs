// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image reconstruction by warping, for the stereo and temporal cases.

use crate::core::camera::Intrinsics;
use crate::core::image::{self, Image};
use crate::misc::type_aliases::{Float, Iso3, Map, Point2};

/// Convert a depth map into a disparity map (in pixels) for a rectified stereo rig.
pub fn disparity_from_depth(camera_baseline: Float, focal_length: Float, depth: &Map) -> Map {
    let factor = camera_baseline * focal_length;
    depth.map(|z| factor / z)
}

/// Sample `source` at positions shifted horizontally by `direction * disparity`.
///
/// A direction of -1 reconstructs the left view from the right one
/// (with the left disparity), +1 reconstructs the right view from the left one
/// (with the right disparity).
#[allow(clippy::cast_precision_loss)]
pub fn shift_horizontally(source: &Map, disparity: &Map, direction: Float) -> Map {
    Map::from_fn(disparity.nrows(), disparity.ncols(), |i, j| {
        let x = j as Float + direction * disparity[(i, j)];
        image::sample(source, x, i as Float)
    })
}

/// Shift every channel of an image with the same disparity map.
pub fn shift_image_horizontally(source: &Image, disparity: &Map, direction: Float) -> Image {
    source.map_channels(|_, channel| shift_horizontally(channel, disparity, direction))
}

/// Reconstruct a target view by sampling a source image at the reprojection
/// of every target pixel.
///
/// Each target pixel is back projected with its depth, moved by `motion`
/// (from target camera coordinates into source camera coordinates)
/// and projected into the source image.
#[allow(clippy::cast_precision_loss)]
pub fn reproject_image(
    intrinsics: &Intrinsics,
    target_depth: &Map,
    motion: &Iso3,
    source: &Image,
) -> Image {
    let (nb_rows, nb_cols) = target_depth.shape();
    let mut coordinates = Vec::with_capacity(nb_rows * nb_cols);
    // Column major order, matching the iteration order of Map::from_iterator.
    for j in 0..nb_cols {
        for i in 0..nb_rows {
            let point = intrinsics.back_project(
                Point2::new(j as Float, i as Float),
                target_depth[(i, j)],
            );
            let uvz = intrinsics.project(motion * point);
            coordinates.push((uvz.x / uvz.z, uvz.y / uvz.z));
        }
    }
    source.map_channels(|_, channel| {
        Map::from_iterator(
            nb_rows,
            nb_cols,
            coordinates.iter().map(|&(u, v)| image::sample(channel, u, v)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::type_aliases::Vec3;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    fn intrinsics() -> Intrinsics {
        Intrinsics {
            principal_point: (3.5, 2.5),
            focal: (10.0, 10.0),
            skew: 0.0,
        }
    }

    fn ramp() -> Map {
        Map::from_fn(6, 8, |i, j| (i as Float) * 0.1 + (j as Float) * 0.01)
    }

    #[test]
    fn disparity_is_inverse_of_depth() {
        let depth = Map::from_row_slice(1, 3, &[1.0, 2.0, 4.0]);
        let disparity = disparity_from_depth(0.5, 8.0, &depth);
        assert_eq!(Map::from_row_slice(1, 3, &[4.0, 2.0, 1.0]), disparity);
    }

    #[test]
    fn shift_by_one_pixel() {
        let source = ramp();
        let disparity = Map::from_element(6, 8, 1.0);
        let left = shift_horizontally(&source, &disparity, -1.0);
        assert_relative_eq!(source[(2, 3)], left[(2, 4)]);
        // Clamped at the left border.
        assert_relative_eq!(source[(2, 0)], left[(2, 0)]);
        let right = shift_horizontally(&source, &disparity, 1.0);
        assert_relative_eq!(source[(2, 5)], right[(2, 4)]);
    }

    #[test]
    fn identity_motion_reconstructs_source() {
        let source = Image::gray(ramp());
        let depth = Map::from_element(6, 8, 3.0);
        let rec = reproject_image(&intrinsics(), &depth, &Iso3::identity(), &source);
        for (a, b) in rec.channel(0).iter().zip(source.channel(0).iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-5);
        }
    }

    #[test]
    fn lateral_motion_shifts_image() {
        // A translation of depth / focal along x moves every pixel by one column.
        let source = Image::gray(ramp());
        let depth = Map::from_element(6, 8, 2.0);
        let motion = Iso3::from_parts(
            Translation3::from(Vec3::new(0.2, 0.0, 0.0)),
            UnitQuaternion::identity(),
        );
        let rec = reproject_image(&intrinsics(), &depth, &motion, &source);
        assert_relative_eq!(source.channel(0)[(3, 5)], rec.channel(0)[(3, 4)], epsilon = 1e-5);
    }
}
