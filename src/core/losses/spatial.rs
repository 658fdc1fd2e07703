// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Stereo consistency losses of one timestep.

use crate::core::calibration::CamerasCalibration;
use crate::core::error::{self, LossError};
use crate::core::losses::{photometric, warp, SpatialLosses, SpatialTerms};
use crate::core::result::ResultDataPoint;
use crate::math::so3;
use crate::misc::type_aliases::{Float, Iso3, Vec3};

/// Weights of the loss terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LossWeights {
    /// Weight of the translation consistency.
    pub lambda_position: Float,
    /// Weight of the rotation consistency.
    pub lambda_angle: Float,
    /// Share of SSIM in the photometric error (the rest goes to L1).
    pub lambda_s: Float,
    /// Weight of the disparity consistency.
    pub lambda_disparity: Float,
}

impl LossWeights {
    pub const DEFAULT_LAMBDA_DISPARITY: Float = 1.0;

    /// Weights with the default disparity weight.
    pub fn new(lambda_position: Float, lambda_angle: Float, lambda_s: Float) -> Self {
        Self {
            lambda_position,
            lambda_angle,
            lambda_s,
            lambda_disparity: Self::DEFAULT_LAMBDA_DISPARITY,
        }
    }
}

/// Stereo losses computed from the predicted depths and motions of the two cameras.
///
/// * photometric: each view is reconstructed from the other one
///   by shifting it with the disparity derived from its depth;
/// * disparity: left and right disparity maps must agree once warped;
/// * pose: the right camera motion, expressed in the left camera frame,
///   must match the left camera motion.
#[derive(Clone, Debug, PartialEq)]
pub struct StereoSpatialLosses {
    camera_baseline: Float,
    focal_length: Float,
    transform_from_left_to_right: Iso3,
    weights: LossWeights,
}

impl StereoSpatialLosses {
    pub fn new(calibration: &CamerasCalibration, weights: LossWeights) -> Self {
        Self {
            camera_baseline: calibration.camera_baseline,
            focal_length: calibration.focal_length,
            transform_from_left_to_right: calibration.transform_from_left_to_right,
            weights,
        }
    }

    pub fn weights(&self) -> &LossWeights {
        &self.weights
    }

    /// Pose consistency between the left motion and the right motion
    /// brought into the left camera frame.
    #[allow(clippy::similar_names)]
    pub fn pose_loss(&self, left: &ResultDataPoint, right: &ResultDataPoint) -> Float {
        let to_right = &self.transform_from_left_to_right;
        let right_in_left = to_right.inverse() * right.motion() * to_right;
        let left_motion = left.motion();
        let position = mean_abs(left_motion.translation.vector - right_in_left.translation.vector);
        let angle = mean_abs(so3::log(left_motion.rotation) - so3::log(right_in_left.rotation));
        self.weights.lambda_position * position + self.weights.lambda_angle * angle
    }
}

impl SpatialLosses for StereoSpatialLosses {
    fn evaluate(
        &self,
        left: &ResultDataPoint,
        right: &ResultDataPoint,
    ) -> Result<SpatialTerms, LossError> {
        let size = left.input_image.size();
        left.input_image
            .check_same_shape("stereo images", &right.input_image)?;
        error::check_shape("left depth", size, left.depth.shape())?;
        error::check_shape("right depth", size, right.depth.shape())?;

        let left_disparity =
            warp::disparity_from_depth(self.camera_baseline, self.focal_length, &left.depth);
        let right_disparity =
            warp::disparity_from_depth(self.camera_baseline, self.focal_length, &right.depth);

        // Photometric consistency.
        let left_rec = warp::shift_image_horizontally(&right.input_image, &left_disparity, -1.0);
        let right_rec = warp::shift_image_horizontally(&left.input_image, &right_disparity, 1.0);
        let lambda_s = self.weights.lambda_s;
        let photometric = photometric::photometric_error(lambda_s, &left.input_image, &left_rec)?
            + photometric::photometric_error(lambda_s, &right.input_image, &right_rec)?;

        // Disparity consistency.
        let left_disparity_rec = warp::shift_horizontally(&right_disparity, &left_disparity, -1.0);
        let right_disparity_rec = warp::shift_horizontally(&left_disparity, &right_disparity, 1.0);
        let disparity = self.weights.lambda_disparity
            * (photometric::mean_abs_diff(&left_disparity, &left_disparity_rec)
                + photometric::mean_abs_diff(&right_disparity, &right_disparity_rec));

        let pose = self.pose_loss(left, right);

        Ok(SpatialTerms {
            spatial: photometric + disparity + pose,
            photometric,
            disparity,
            pose,
        })
    }
}

fn mean_abs(v: Vec3) -> Float {
    (v.x.abs() + v.y.abs() + v.z.abs()) / 3.0
}
