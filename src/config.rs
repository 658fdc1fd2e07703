// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! JSON configuration of an experiment: loss weights, rig calibration and datasets.
//!
//! Matrices are written row by row:
//!
//! ```json
//! {
//!   "weights": { "lambda_position": 0.01, "lambda_angle": 0.1, "lambda_s": 0.85 },
//!   "calibration": {
//!     "camera_baseline": 0.54,
//!     "focal_length": 718.856,
//!     "left_camera_matrix": [[718.856, 0, 607.19], [0, 718.856, 185.22], [0, 0, 1]],
//!     "right_camera_matrix": [[718.856, 0, 607.19], [0, 718.856, 185.22], [0, 0, 1]],
//!     "transform_from_left_to_right":
//!       [[1, 0, 0, -0.54], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]
//!   },
//!   "dataset": { "lengths": [80, 10, 10], "transform_params": { "filters": true } }
//! }
//! ```

use nalgebra::{Rotation3, Translation3, UnitQuaternion};
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path};
use thiserror::Error;

use crate::core::calibration::CamerasCalibration;
use crate::core::losses::spatial::LossWeights;
use crate::dataset::ground_truth::DEPTH_SCALE_KITTI;
use crate::dataset::manager::ManagerConfig;
use crate::misc::type_aliases::{Float, Iso3, Mat3, Mat4};

/// Errors while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Full configuration of an experiment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub weights: WeightsConfig,
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub dataset: ManagerConfig,
    /// Scale of the 16 bits depth images.
    #[serde(default = "default_depth_scale")]
    pub depth_scale: Float,
}

impl Config {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Loss weights.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WeightsConfig {
    pub lambda_position: Float,
    pub lambda_angle: Float,
    pub lambda_s: Float,
    #[serde(default = "default_lambda_disparity")]
    pub lambda_disparity: Float,
}

impl From<WeightsConfig> for LossWeights {
    fn from(config: WeightsConfig) -> Self {
        Self {
            lambda_position: config.lambda_position,
            lambda_angle: config.lambda_angle,
            lambda_s: config.lambda_s,
            lambda_disparity: config.lambda_disparity,
        }
    }
}

/// Calibration of the stereo rig, with row major matrices.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalibrationConfig {
    pub camera_baseline: Float,
    pub focal_length: Float,
    pub left_camera_matrix: [[Float; 3]; 3],
    pub right_camera_matrix: [[Float; 3]; 3],
    pub transform_from_left_to_right: [[Float; 4]; 4],
}

impl From<&CalibrationConfig> for CamerasCalibration {
    fn from(config: &CalibrationConfig) -> Self {
        Self {
            camera_baseline: config.camera_baseline,
            focal_length: config.focal_length,
            left_camera_matrix: mat3(&config.left_camera_matrix),
            right_camera_matrix: mat3(&config.right_camera_matrix),
            transform_from_left_to_right: isometry(&mat4(&config.transform_from_left_to_right)),
        }
    }
}

fn default_lambda_disparity() -> Float {
    LossWeights::DEFAULT_LAMBDA_DISPARITY
}

fn default_depth_scale() -> Float {
    DEPTH_SCALE_KITTI
}

fn mat3(rows: &[[Float; 3]; 3]) -> Mat3 {
    Mat3::from_fn(|i, j| rows[i][j])
}

fn mat4(rows: &[[Float; 4]; 4]) -> Mat4 {
    Mat4::from_fn(|i, j| rows[i][j])
}

/// Rigid body motion of a homogeneous matrix.
/// The rotation part is projected onto the closest rotation.
fn isometry(mat: &Mat4) -> Iso3 {
    let rotation = Rotation3::from_matrix(&mat.fixed_view::<3, 3>(0, 0).into_owned());
    let translation = Translation3::new(mat.m14, mat.m24, mat.m34);
    Iso3::from_parts(translation, UnitQuaternion::from_rotation_matrix(&rotation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::misc::type_aliases::{Point3, Vec3};
    use approx::assert_relative_eq;

    const JSON: &str = r#"{
        "weights": { "lambda_position": 0.01, "lambda_angle": 0.1, "lambda_s": 0.85 },
        "calibration": {
            "camera_baseline": 0.54,
            "focal_length": 718.856,
            "left_camera_matrix": [[718.856, 0, 607.19], [0, 718.856, 185.22], [0, 0, 1]],
            "right_camera_matrix": [[718.856, 0, 607.19], [0, 718.856, 185.22], [0, 0, 1]],
            "transform_from_left_to_right": [[0, -1, 0, -0.54], [1, 0, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]
        },
        "dataset": { "lengths": [60, 20, 20], "transform_params": { "normalize": true } }
    }"#;

    #[test]
    fn parse_full_config() {
        let config = Config::from_json_str(JSON).unwrap();
        let weights = LossWeights::from(config.weights);
        assert_eq!(1.0, weights.lambda_disparity);
        assert_eq!(DEPTH_SCALE_KITTI, config.depth_scale);
        assert_eq!((60, 20, 20), config.dataset.lengths);
        assert_eq!(4, config.dataset.num_workers);
        assert!(config.dataset.transform_params.filters);
        assert!(config.dataset.transform_params.normalize);
    }

    #[test]
    fn calibration_matrices_are_row_major() {
        let config = Config::from_json_str(JSON).unwrap();
        let calibration = CamerasCalibration::from(&config.calibration);
        assert_eq!(607.19, calibration.left_camera_matrix.m13);
        let moved = calibration.transform_from_left_to_right * Point3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(Vec3::new(-0.54, 1.0, 0.0), moved.coords, epsilon = 1e-6);
    }

    #[test]
    fn missing_weights_is_an_error() {
        assert!(matches!(
            Config::from_json_str("{}"),
            Err(ConfigError::Json(_))
        ));
    }
}
