// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Network predictions for one camera at one timestep.

use crate::core::image::Image;
use crate::math::so3;
use crate::misc::type_aliases::{Iso3, Map, Mat3, Vec3};

/// Prediction bundle of one camera at one timestep.
///
/// `translation` and `rotation` describe the rigid motion mapping points expressed
/// in this camera frame at this timestep into the same camera frame
/// at the other timestep of the pair.
/// So it is the current to next motion for bundles of the current timestep,
/// and the next to current motion for bundles of the next timestep.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultDataPoint {
    /// Input image, `H x W x C`.
    pub input_image: Image,
    /// Predicted depth map, `H x W`, expected positive.
    pub depth: Map,
    /// Predicted translation.
    pub translation: Vec3,
    /// Predicted rotation in its so3 (axis-angle) form.
    pub rotation: Vec3,
}

impl ResultDataPoint {
    pub fn new(input_image: Image, depth: Map, translation: Vec3, rotation: Vec3) -> Self {
        Self {
            input_image,
            depth,
            translation,
            rotation,
        }
    }

    /// Rotation as a 3x3 matrix.
    pub fn rotation_matrix(&self) -> Mat3 {
        so3::exp_matrix(self.rotation)
    }

    /// Predicted motion as a rigid body motion.
    pub fn motion(&self) -> Iso3 {
        so3::rigid_motion(self.translation, self.rotation)
    }
}
