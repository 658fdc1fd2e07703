// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Spatial (stereo) and temporal (sequential) consistency losses.
//!
//! The criterion only depends on the two traits of this module,
//! so any implementation can be substituted, for example in tests.

pub mod photometric;
pub mod spatial;
pub mod temporal;
pub mod warp;

pub use self::spatial::StereoSpatialLosses;
pub use self::temporal::TemporalImageLosses;

use crate::core::error::LossError;
use crate::core::result::ResultDataPoint;
use crate::misc::type_aliases::Float;

/// The four terms produced by a spatial loss evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SpatialTerms {
    /// Full stereo consistency loss, the one contributing to the total loss.
    pub spatial: Float,
    pub photometric: Float,
    pub disparity: Float,
    pub pose: Float,
}

/// Consistency losses between the left and right cameras of one timestep.
pub trait SpatialLosses {
    fn evaluate(
        &self,
        left: &ResultDataPoint,
        right: &ResultDataPoint,
    ) -> Result<SpatialTerms, LossError>;
}

/// Consistency loss between two consecutive stereo pairs.
pub trait TemporalLosses {
    fn evaluate(
        &self,
        left_current: &ResultDataPoint,
        right_current: &ResultDataPoint,
        left_next: &ResultDataPoint,
        right_next: &ResultDataPoint,
    ) -> Result<Float, LossError>;
}
