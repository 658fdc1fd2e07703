// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Photometric consistency between two consecutive timesteps of each camera.

use crate::core::camera::Intrinsics;
use crate::core::error::{self, LossError};
use crate::core::losses::{photometric, warp, TemporalLosses};
use crate::core::result::ResultDataPoint;
use crate::misc::type_aliases::{Float, Mat3};

/// Temporal image losses.
///
/// For each camera, the current image is reconstructed from the next one
/// with the current depth and current to next motion, and vice versa.
/// The loss is the sum of the four photometric errors.
#[derive(Clone, Debug, PartialEq)]
pub struct TemporalImageLosses {
    left_intrinsics: Intrinsics,
    right_intrinsics: Intrinsics,
    lambda_s: Float,
}

impl TemporalImageLosses {
    pub fn new(left_camera_matrix: &Mat3, right_camera_matrix: &Mat3, lambda_s: Float) -> Self {
        Self {
            left_intrinsics: Intrinsics::from_matrix(left_camera_matrix),
            right_intrinsics: Intrinsics::from_matrix(right_camera_matrix),
            lambda_s,
        }
    }

    pub fn lambda_s(&self) -> Float {
        self.lambda_s
    }

    /// Photometric error of `target` reconstructed from the image of `source`.
    fn reconstruction_error(
        &self,
        intrinsics: &Intrinsics,
        target: &ResultDataPoint,
        source: &ResultDataPoint,
    ) -> Result<Float, LossError> {
        let reconstructed = warp::reproject_image(
            intrinsics,
            &target.depth,
            &target.motion(),
            &source.input_image,
        );
        photometric::photometric_error(self.lambda_s, &target.input_image, &reconstructed)
    }

    /// Both reconstruction directions for one camera.
    /// Each direction uses the same routine so that the sum is symmetric in time.
    fn camera_error(
        &self,
        intrinsics: &Intrinsics,
        current: &ResultDataPoint,
        next: &ResultDataPoint,
    ) -> Result<Float, LossError> {
        let current_error = self.reconstruction_error(intrinsics, current, next)?;
        let next_error = self.reconstruction_error(intrinsics, next, current)?;
        Ok(current_error + next_error)
    }
}

impl TemporalLosses for TemporalImageLosses {
    fn evaluate(
        &self,
        left_current: &ResultDataPoint,
        right_current: &ResultDataPoint,
        left_next: &ResultDataPoint,
        right_next: &ResultDataPoint,
    ) -> Result<Float, LossError> {
        let reference = &left_current.input_image;
        let size = reference.size();
        for &(context, other) in &[
            ("right current image", right_current),
            ("left next image", left_next),
            ("right next image", right_next),
        ] {
            reference.check_same_shape(context, &other.input_image)?;
        }
        for &(context, point) in &[
            ("left current depth", left_current),
            ("right current depth", right_current),
            ("left next depth", left_next),
            ("right next depth", right_next),
        ] {
            error::check_shape(context, size, point.depth.shape())?;
        }
        let left = self.camera_error(&self.left_intrinsics, left_current, left_next)?;
        let right = self.camera_error(&self.right_intrinsics, right_current, right_next)?;
        Ok(left + right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::image::Image;
    use crate::misc::type_aliases::{Map, Vec3};
    use approx::assert_relative_eq;

    fn camera_matrix() -> Mat3 {
        Intrinsics {
            principal_point: (5.5, 3.5),
            focal: (12.0, 12.0),
            skew: 0.0,
        }
        .matrix()
    }

    fn textured() -> Image {
        Image::gray(Map::from_fn(8, 12, |i, j| {
            ((i * 5 + j * 3) % 7) as Float / 7.0
        }))
    }

    fn point(image: Image, translation: Vec3) -> ResultDataPoint {
        let (h, w) = image.size();
        ResultDataPoint::new(image, Map::from_element(h, w, 2.0), translation, Vec3::zeros())
    }

    #[test]
    fn static_scene_has_no_temporal_loss() {
        let losses = TemporalImageLosses::new(&camera_matrix(), &camera_matrix(), 0.85);
        let p = point(textured(), Vec3::zeros());
        let loss = losses.evaluate(&p, &p, &p, &p).unwrap();
        assert_relative_eq!(0.0, loss, epsilon = 1e-4);
    }

    #[test]
    fn wrong_motion_is_penalized() {
        let losses = TemporalImageLosses::new(&camera_matrix(), &camera_matrix(), 0.85);
        let still = point(textured(), Vec3::zeros());
        let moving = point(textured(), Vec3::new(0.5, 0.0, 0.0));
        let loss = losses.evaluate(&moving, &still, &still, &still).unwrap();
        assert!(loss > 0.01);
    }

    #[test]
    fn symmetric_under_time_reversal() {
        let losses = TemporalImageLosses::new(&camera_matrix(), &camera_matrix(), 0.5);
        let lc = point(textured(), Vec3::new(0.1, 0.0, 0.0));
        let rc = point(textured(), Vec3::new(0.0, 0.2, 0.0));
        let ln = point(Image::zeros(8, 12, 1), Vec3::new(-0.1, 0.0, 0.3));
        let rn = point(textured(), Vec3::zeros());
        let forward = losses.evaluate(&lc, &rc, &ln, &rn).unwrap();
        let backward = losses.evaluate(&ln, &rn, &lc, &rc).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn channel_mismatch_is_an_error() {
        let losses = TemporalImageLosses::new(&camera_matrix(), &camera_matrix(), 0.85);
        let gray = point(textured(), Vec3::zeros());
        let rgb = point(Image::zeros(8, 12, 3), Vec3::zeros());
        let err = losses.evaluate(&gray, &gray, &rgb, &gray).unwrap_err();
        assert_eq!(
            LossError::ChannelMismatch {
                context: "left next image",
                expected: 1,
                found: 3
            },
            err
        );
    }
}
