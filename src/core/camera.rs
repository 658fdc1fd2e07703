// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pinhole camera intrinsics.

use crate::misc::type_aliases::{Float, Mat3, Point2, Point3, Vec3};

/// Intrinsic parameters of a pinhole camera.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Intrinsics {
    /// Principal point (in the optical center axis) of the camera.
    pub principal_point: (Float, Float),
    /// Focal length in pixels along the columns and the rows.
    pub focal: (Float, Float),
    /// Skew factor.
    pub skew: Float,
}

impl Intrinsics {
    /// Read the parameters of an upper triangular camera matrix.
    #[allow(clippy::similar_names)]
    pub fn from_matrix(mat: &Mat3) -> Self {
        Self {
            principal_point: (mat.m13, mat.m23),
            focal: (mat.m11, mat.m22),
            skew: mat.m12,
        }
    }

    /// Camera matrix of the intrinsics.
    #[rustfmt::skip]
    pub fn matrix(&self) -> Mat3 {
        Mat3::new(
            self.focal.0,  self.skew,     self.principal_point.0,
            0.0,           self.focal.1,  self.principal_point.1,
            0.0,           0.0,           1.0,
        )
    }

    /// Project a 3D point into homogeneous image coordinates.
    pub fn project(&self, point: Point3) -> Vec3 {
        Vec3::new(
            self.focal.0 * point[0] + self.skew * point[1] + self.principal_point.0 * point[2],
            self.focal.1 * point[1] + self.principal_point.1 * point[2],
            point[2],
        )
    }

    /// Back project a pixel with a known depth to a 3D point.
    pub fn back_project(&self, point: Point2, depth: Float) -> Point3 {
        let z = depth;
        let y = (point[1] - self.principal_point.1) * z / self.focal.1;
        let x = ((point[0] - self.principal_point.0) * z - self.skew * y) / self.focal.0;
        Point3::new(x, y, z)
    }
}
