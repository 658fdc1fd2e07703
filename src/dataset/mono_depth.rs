// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Monocular image and depth pairs for supervised depth learning.

use crate::core::image::Image;
use crate::dataset::ground_truth::GroundTruthDataset;
use crate::dataset::{Dataset, DatasetError};
use crate::misc::type_aliases::Map;

/// A left image and its ground truth depth map.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoDepthSample {
    pub image: Image,
    /// Depth in meters, 0 where unknown.
    pub depth: Map,
}

/// Left images and depth maps of a ground truth sequence.
#[derive(Debug, Clone)]
pub struct MonoDepthDataset {
    dataset: GroundTruthDataset,
}

impl MonoDepthDataset {
    pub fn new(dataset: GroundTruthDataset) -> Self {
        Self { dataset }
    }

    /// `(height, width)` of the images.
    pub fn get_image_size(&self) -> (usize, usize) {
        self.dataset.get_image_size()
    }
}

impl Dataset for MonoDepthDataset {
    type Item = MonoDepthSample;

    fn len(&self) -> usize {
        self.dataset.len()
    }

    fn get(&self, index: usize) -> Result<MonoDepthSample, DatasetError> {
        let image = self.dataset.read_left_image(index)?;
        let depth = self.dataset.read_depth(index)?;
        if image.size() != depth.shape() {
            return Err(DatasetError::DepthSize {
                expected: image.size(),
                found: depth.shape(),
            });
        }
        Ok(MonoDepthSample { image, depth })
    }
}
