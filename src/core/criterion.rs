// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Aggregate unsupervised loss of a training example.
//!
//! A training example is made of two consecutive stereo pairs.
//! The spatial losses are evaluated on each pair,
//! the temporal losses once on the two pairs, and everything is summed.

use crate::core::calibration::CamerasCalibration;
use crate::core::error::LossError;
use crate::core::losses::spatial::LossWeights;
use crate::core::losses::{
    SpatialLosses, StereoSpatialLosses, TemporalImageLosses, TemporalLosses,
};
use crate::core::result::ResultDataPoint;
use crate::misc::type_aliases::Float;

/// Loss values of one criterion evaluation.
///
/// Only `total` is meant to be minimized.
/// The other terms are there for monitoring.
/// Beware that `temporal` is already included in `total`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CriterionOutput {
    /// Spatial losses of both timesteps plus temporal loss.
    pub total: Float,
    /// Photometric losses of both timesteps.
    pub photometric: Float,
    /// Disparity losses of both timesteps.
    pub disparity: Float,
    /// Pose losses of both timesteps.
    pub pose: Float,
    /// Temporal loss.
    pub temporal: Float,
}

impl CriterionOutput {
    /// `(total, photometric, disparity, pose, temporal)`.
    pub fn into_tuple(self) -> (Float, Float, Float, Float, Float) {
        (
            self.total,
            self.photometric,
            self.disparity,
            self.pose,
            self.temporal,
        )
    }
}

/// Unsupervised criterion combining spatial and temporal losses.
///
/// The same spatial losses are used for both timesteps.
/// Evaluation holds no state so it can be repeated freely.
#[derive(Clone, Debug)]
pub struct UnsupervisedCriterion<S = StereoSpatialLosses, T = TemporalImageLosses> {
    spatial_losses: S,
    temporal_losses: T,
}

impl UnsupervisedCriterion {
    /// Build the stereo and temporal losses from the calibration and weights.
    ///
    /// Temporal losses only receive the camera matrices and `lambda_s`.
    pub fn new(
        cameras_calibration: &CamerasCalibration,
        lambda_position: Float,
        lambda_angle: Float,
        lambda_s: Float,
        lambda_disparity: Float,
    ) -> Self {
        Self::with_weights(
            cameras_calibration,
            LossWeights {
                lambda_position,
                lambda_angle,
                lambda_s,
                lambda_disparity,
            },
        )
    }

    /// Same as `new` with the default disparity weight (1.0).
    pub fn with_default_disparity(
        cameras_calibration: &CamerasCalibration,
        lambda_position: Float,
        lambda_angle: Float,
        lambda_s: Float,
    ) -> Self {
        Self::with_weights(
            cameras_calibration,
            LossWeights::new(lambda_position, lambda_angle, lambda_s),
        )
    }

    pub fn with_weights(cameras_calibration: &CamerasCalibration, weights: LossWeights) -> Self {
        let spatial_losses = StereoSpatialLosses::new(cameras_calibration, weights);
        let temporal_losses = TemporalImageLosses::new(
            &cameras_calibration.left_camera_matrix,
            &cameras_calibration.right_camera_matrix,
            weights.lambda_s,
        );
        Self::from_parts(spatial_losses, temporal_losses)
    }
}

impl<S: SpatialLosses, T: TemporalLosses> UnsupervisedCriterion<S, T> {
    /// Criterion with any spatial and temporal losses.
    pub fn from_parts(spatial_losses: S, temporal_losses: T) -> Self {
        Self {
            spatial_losses,
            temporal_losses,
        }
    }

    pub fn spatial_losses(&self) -> &S {
        &self.spatial_losses
    }

    pub fn temporal_losses(&self) -> &T {
        &self.temporal_losses
    }

    /// Evaluate all losses of a training example.
    ///
    /// Errors of the underlying losses are returned unchanged.
    pub fn evaluate(
        &self,
        left_current: &ResultDataPoint,
        right_current: &ResultDataPoint,
        left_next: &ResultDataPoint,
        right_next: &ResultDataPoint,
    ) -> Result<CriterionOutput, LossError> {
        let current = self.spatial_losses.evaluate(left_current, right_current)?;
        let next = self.spatial_losses.evaluate(left_next, right_next)?;
        let temporal =
            self.temporal_losses
                .evaluate(left_current, right_current, left_next, right_next)?;
        Ok(CriterionOutput {
            total: current.spatial + next.spatial + temporal,
            photometric: current.photometric + next.photometric,
            disparity: current.disparity + next.disparity,
            pose: current.pose + next.pose,
            temporal,
        })
    }
}
