// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration of the stereo rig.

use nalgebra::Translation3;

use crate::core::camera::Intrinsics;
use crate::misc::type_aliases::{Float, Iso3, Mat3, Vec3};

/// Calibration data of the two cameras of a stereo rig.
///
/// Built once per experiment and only read afterwards.
#[derive(PartialEq, Debug, Clone)]
pub struct CamerasCalibration {
    /// Distance between the two optical centers.
    pub camera_baseline: Float,
    /// Focal length (in pixels) used to convert depth into disparity.
    pub focal_length: Float,
    /// Camera matrix of the left camera.
    pub left_camera_matrix: Mat3,
    /// Camera matrix of the right camera.
    pub right_camera_matrix: Mat3,
    /// Rigid transform mapping left camera coordinates into right camera coordinates.
    pub transform_from_left_to_right: Iso3,
}

impl CamerasCalibration {
    /// Calibration of a rectified rig where both cameras share the same intrinsics
    /// and the right camera sits `baseline` along the x axis of the left one.
    pub fn rectified(camera_baseline: Float, intrinsics: Intrinsics) -> Self {
        let matrix = intrinsics.matrix();
        Self {
            camera_baseline,
            focal_length: intrinsics.focal.0,
            left_camera_matrix: matrix,
            right_camera_matrix: matrix,
            transform_from_left_to_right: Iso3::from_parts(
                Translation3::from(Vec3::new(-camera_baseline, 0.0, 0.0)),
                nalgebra::UnitQuaternion::identity(),
            ),
        }
    }
}
