// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image transforms applied to samples when loading them.
//!
//! Training samples are resized and randomly color filtered.
//! Validation and test samples are only resized, and optionally normalized.

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;

use crate::core::image::{self, Image};
use crate::dataset::mono_depth::MonoDepthSample;
use crate::dataset::{Dataset, DatasetError};
use crate::misc::type_aliases::{Float, Map};

/// ImageNet channel means, used for normalization.
pub const NORMALIZE_MEAN: [Float; 3] = [0.485, 0.456, 0.406];
/// ImageNet channel standard deviations, used for normalization.
pub const NORMALIZE_STD: [Float; 3] = [0.229, 0.224, 0.225];

/// Maximum relative change of the random color filters.
pub const FILTERS_STRENGTH: Float = 0.2;

/// Which optional transforms are used.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    /// Random color filters on training images.
    pub filters: bool,
    /// Normalization of training images.
    pub normalize: bool,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            filters: true,
            normalize: false,
        }
    }
}

/// A single transform of a sample.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Bilinear resize of the image, nearest neighbor resize of the depth.
    Resize { height: usize, width: usize },
    /// Random brightness, contrast and saturation changes,
    /// each factor drawn uniformly in `[1 - strength, 1 + strength]`.
    ColorFilters { strength: Float },
    /// Per channel `(x - mean) / std`.
    /// Channels beyond the third reuse the last statistics.
    Normalize { mean: [Float; 3], std: [Float; 3] },
}

impl Transform {
    pub fn apply<R: Rng>(&self, sample: MonoDepthSample, rng: &mut R) -> MonoDepthSample {
        match self {
            Transform::Resize { height, width } => MonoDepthSample {
                image: resize_image(&sample.image, *height, *width),
                depth: resize_nearest(&sample.depth, *height, *width),
            },
            Transform::ColorFilters { strength } => {
                let mut factor = || 1.0 + rng.gen_range(-*strength..=*strength);
                let (brightness, contrast, saturation) = (factor(), factor(), factor());
                MonoDepthSample {
                    image: color_filters(&sample.image, brightness, contrast, saturation),
                    ..sample
                }
            }
            Transform::Normalize { mean, std } => MonoDepthSample {
                image: sample.image.map_channels(|c, channel| {
                    let c = c.min(2);
                    channel.map(|x| (x - mean[c]) / std[c])
                }),
                ..sample
            },
        }
    }
}

/// A sequence of transforms.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pipeline {
    transforms: Vec<Transform>,
}

impl Pipeline {
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn apply<R: Rng>(&self, sample: MonoDepthSample, rng: &mut R) -> MonoDepthSample {
        self.transforms
            .iter()
            .fold(sample, |sample, transform| transform.apply(sample, rng))
    }
}

/// Builds the transform pipelines of each split.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTransformManager {
    image_size: (usize, usize),
    final_img_size: (usize, usize),
    params: TransformParams,
}

impl DataTransformManager {
    /// Sizes are `(height, width)`.
    pub fn new(
        image_size: (usize, usize),
        final_img_size: (usize, usize),
        params: TransformParams,
    ) -> Self {
        debug!(
            "Transforms from {:?} to {:?} with {:?}",
            image_size, final_img_size, params
        );
        Self {
            image_size,
            final_img_size,
            params,
        }
    }

    pub fn get_train_transform(&self) -> Pipeline {
        let mut transforms = self.resize();
        if self.params.filters {
            transforms.push(Transform::ColorFilters {
                strength: FILTERS_STRENGTH,
            });
        }
        if self.params.normalize {
            transforms.push(normalize());
        }
        Pipeline::new(transforms)
    }

    pub fn get_validation_transform(&self, with_normalize: bool) -> Pipeline {
        self.deterministic(with_normalize)
    }

    pub fn get_test_transform(&self, with_normalize: bool) -> Pipeline {
        self.deterministic(with_normalize)
    }

    fn deterministic(&self, with_normalize: bool) -> Pipeline {
        let mut transforms = self.resize();
        if with_normalize {
            transforms.push(normalize());
        }
        Pipeline::new(transforms)
    }

    fn resize(&self) -> Vec<Transform> {
        if self.image_size == self.final_img_size {
            Vec::new()
        } else {
            let (height, width) = self.final_img_size;
            vec![Transform::Resize { height, width }]
        }
    }
}

fn normalize() -> Transform {
    Transform::Normalize {
        mean: NORMALIZE_MEAN,
        std: NORMALIZE_STD,
    }
}

/// A dataset whose samples go through a transform pipeline.
///
/// Random transforms of the item at `index` are seeded with `seed + index`,
/// so reading the same item twice gives the same sample.
#[derive(Debug, Clone)]
pub struct Transformed<D> {
    dataset: D,
    pipeline: Pipeline,
    seed: u64,
}

impl<D> Transformed<D> {
    pub fn new(dataset: D, pipeline: Pipeline, seed: u64) -> Self {
        Self {
            dataset,
            pipeline,
            seed,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

impl<D: Dataset<Item = MonoDepthSample>> Dataset for Transformed<D> {
    type Item = MonoDepthSample;

    fn len(&self) -> usize {
        self.dataset.len()
    }

    fn get(&self, index: usize) -> Result<MonoDepthSample, DatasetError> {
        let sample = self.dataset.get(index)?;
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index as u64));
        Ok(self.pipeline.apply(sample, &mut rng))
    }
}

// Image operations ############################################################

/// Bilinear resize of every channel, with pixel centers aligned.
#[allow(clippy::cast_precision_loss)]
pub fn resize_image(img: &Image, height: usize, width: usize) -> Image {
    let (h, w) = img.size();
    let scale_y = h as Float / height as Float;
    let scale_x = w as Float / width as Float;
    img.map_channels(|_, channel| {
        Map::from_fn(height, width, |i, j| {
            let y = (i as Float + 0.5) * scale_y - 0.5;
            let x = (j as Float + 0.5) * scale_x - 0.5;
            image::sample(channel, x, y)
        })
    })
}

/// Nearest neighbor resize, which does not mix known and unknown depths.
/// An empty map resizes to zeros.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_precision_loss)]
pub fn resize_nearest(map: &Map, height: usize, width: usize) -> Map {
    let (h, w) = map.shape();
    if h == 0 || w == 0 {
        return Map::zeros(height, width);
    }
    let scale_y = h as Float / height as Float;
    let scale_x = w as Float / width as Float;
    Map::from_fn(height, width, |i, j| {
        let src_i = (((i as Float + 0.5) * scale_y) as usize).min(h - 1);
        let src_j = (((j as Float + 0.5) * scale_x) as usize).min(w - 1);
        map[(src_i, src_j)]
    })
}

/// Change brightness, contrast and saturation of an image with values in [0, 1].
#[allow(clippy::cast_precision_loss)]
pub fn color_filters(img: &Image, brightness: Float, contrast: Float, saturation: Float) -> Image {
    let gray = luminance(img);
    let gray_mean = gray.mean();
    img.map_channels(|_, channel| {
        channel.zip_map(&gray, |x, g| {
            let x = x * brightness;
            let g = g * brightness;
            let x = g + saturation * (x - g);
            let x = brightness * gray_mean + contrast * (x - brightness * gray_mean);
            x.max(0.0).min(1.0)
        })
    })
}

/// Luminance of an RGB image, or the first channel of other images.
fn luminance(img: &Image) -> Map {
    if img.nb_channels() == 3 {
        0.299 * img.channel(0) + 0.587 * img.channel(1) + 0.114 * img.channel(2)
    } else {
        img.channel(0).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample(height: usize, width: usize) -> MonoDepthSample {
        MonoDepthSample {
            image: Image::from_channels(vec![
                Map::from_fn(height, width, |i, j| ((i + j) % 4) as Float / 4.0),
                Map::from_element(height, width, 0.5),
                Map::from_element(height, width, 0.25),
            ])
            .unwrap(),
            depth: Map::from_fn(height, width, |i, _| i as Float),
        }
    }

    #[test]
    fn train_pipeline_depends_on_params() {
        let manager = DataTransformManager::new((8, 16), (4, 8), TransformParams::default());
        assert_eq!(
            &[
                Transform::Resize {
                    height: 4,
                    width: 8
                },
                Transform::ColorFilters {
                    strength: FILTERS_STRENGTH
                }
            ],
            manager.get_train_transform().transforms()
        );
        let params = TransformParams {
            filters: false,
            normalize: true,
        };
        let manager = DataTransformManager::new((4, 8), (4, 8), params);
        assert_eq!(&[normalize()], manager.get_train_transform().transforms());
    }

    #[test]
    fn validation_and_test_are_deterministic() {
        let manager = DataTransformManager::new((8, 16), (4, 8), TransformParams::default());
        let validation = manager.get_validation_transform(false);
        assert_eq!(1, validation.transforms().len());
        assert_eq!(2, manager.get_test_transform(true).transforms().len());
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);
        assert_eq!(
            validation.apply(sample(8, 16), &mut rng_a),
            validation.apply(sample(8, 16), &mut rng_b)
        );
    }

    #[test]
    fn resize_empty_sample() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = MonoDepthSample {
            image: Image::zeros(0, 6, 3),
            depth: Map::zeros(0, 6),
        };
        let resize = Transform::Resize {
            height: 2,
            width: 3,
        };
        let resized = resize.apply(empty, &mut rng);
        assert_eq!((2, 3, 3), resized.image.shape());
        assert_eq!(Map::zeros(2, 3), resized.depth);
    }

    #[test]
    fn resize_shapes_and_values() {
        let mut rng = StdRng::seed_from_u64(0);
        let resize = Transform::Resize {
            height: 4,
            width: 8,
        };
        let resized = resize.apply(sample(8, 16), &mut rng);
        assert_eq!((4, 8, 3), resized.image.shape());
        assert_eq!((4, 8), resized.depth.shape());
        // Depth rows 1, 3, 5, 7 are picked.
        assert_eq!(3.0, resized.depth[(1, 0)]);
        assert_relative_eq!(0.5, resized.image.channel(1)[(2, 3)]);
    }

    #[test]
    fn normalize_uses_channel_statistics() {
        let mut rng = StdRng::seed_from_u64(0);
        let normalized = normalize().apply(sample(2, 2), &mut rng);
        assert_relative_eq!(
            (0.5 - NORMALIZE_MEAN[1]) / NORMALIZE_STD[1],
            normalized.image.channel(1)[(0, 0)]
        );
    }

    #[test]
    fn neutral_filters_keep_image() {
        let img = sample(4, 4).image;
        let filtered = color_filters(&img, 1.0, 1.0, 1.0);
        for (a, b) in img.channels().iter().zip(filtered.channels()) {
            for (x, y) in a.iter().zip(b.iter()) {
                assert_relative_eq!(x, y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn filters_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let filters = Transform::ColorFilters { strength: 0.9 };
        let filtered = filters.apply(sample(4, 4), &mut rng);
        assert!(filtered
            .image
            .channels()
            .iter()
            .all(|c| c.iter().all(|&x| (0.0..=1.0).contains(&x))));
    }
}
