// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Train, validation and test batches of a ground truth dataset.

use log::info;
use serde::Deserialize;
use std::sync::Arc;

use crate::dataset::ground_truth::GroundTruthDataset;
use crate::dataset::loader::Batches;
use crate::dataset::mono_depth::MonoDepthDataset;
use crate::dataset::split;
use crate::dataset::transform::{DataTransformManager, Pipeline, TransformParams, Transformed};
use crate::dataset::{DatasetError, Subset};

/// A split of the dataset with its transforms attached.
pub type SplitDataset = Transformed<Subset<MonoDepthDataset>>;

/// Configuration of the dataset manager.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Number of threads loading the items of a batch.
    pub num_workers: usize,
    /// Number of items in the train, validation and test splits.
    pub lengths: (usize, usize, usize),
    /// `(height, width)` of the images given to the network.
    pub final_img_size: (usize, usize),
    pub transform_params: TransformParams,
    /// Seed of the split, of the shuffling and of the random transforms.
    pub seed: u64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            lengths: (80, 10, 10),
            final_img_size: (128, 384),
            transform_params: TransformParams::default(),
            seed: 0,
        }
    }
}

/// Splits a ground truth dataset and serves batches of each split.
#[derive(Debug)]
pub struct SupervisedDatasetManager {
    train_dataset: Subset<MonoDepthDataset>,
    validation_dataset: Subset<MonoDepthDataset>,
    test_dataset: Subset<MonoDepthDataset>,
    transform: DataTransformManager,
    num_workers: usize,
    seed: u64,
    epoch: u64,
}

impl SupervisedDatasetManager {
    pub fn new(dataset: GroundTruthDataset, config: ManagerConfig) -> Result<Self, DatasetError> {
        let dataset = Arc::new(MonoDepthDataset::new(dataset));
        let image_size = dataset.get_image_size();
        let (train, val, test) = config.lengths;
        let mut splits = split::random_split(dataset, &[train, val, test], config.seed)?;
        let test_dataset = splits.remove(2);
        let validation_dataset = splits.remove(1);
        let train_dataset = splits.remove(0);
        info!(
            "Dataset split into {} train, {} validation and {} test items",
            train, val, test
        );
        Ok(Self {
            train_dataset,
            validation_dataset,
            test_dataset,
            transform: DataTransformManager::new(
                image_size,
                config.final_img_size,
                config.transform_params,
            ),
            num_workers: config.num_workers,
            seed: config.seed,
            epoch: 0,
        })
    }

    /// Shuffled batches of the training split with the training transforms.
    /// Each call starts a new epoch with a new shuffling and new random transforms.
    pub fn get_train_batches(
        &mut self,
        batch_size: usize,
    ) -> Result<Batches<SplitDataset>, DatasetError> {
        self.epoch += 1;
        let epoch_seed = self.seed.wrapping_add(self.epoch.wrapping_mul(1_000_003));
        let dataset = Transformed::new(
            self.train_dataset.clone(),
            self.transform.get_train_transform(),
            epoch_seed,
        );
        Batches::new(dataset, batch_size, Some(epoch_seed), self.num_workers)
    }

    /// Ordered batches of the validation split.
    pub fn get_validation_batches(
        &self,
        batch_size: usize,
        with_normalize: bool,
    ) -> Result<Batches<SplitDataset>, DatasetError> {
        let dataset = self.get_validation_dataset(with_normalize);
        Batches::new(dataset, batch_size, None, self.num_workers)
    }

    /// Ordered batches of the test split.
    pub fn get_test_batches(
        &self,
        batch_size: usize,
        with_normalize: bool,
    ) -> Result<Batches<SplitDataset>, DatasetError> {
        let dataset = self.with_pipeline(
            &self.test_dataset,
            self.transform.get_test_transform(with_normalize),
        );
        Batches::new(dataset, batch_size, None, self.num_workers)
    }

    /// Validation split with the validation transforms.
    pub fn get_validation_dataset(&self, with_normalize: bool) -> SplitDataset {
        self.with_pipeline(
            &self.validation_dataset,
            self.transform.get_validation_transform(with_normalize),
        )
    }

    pub fn train_dataset(&self) -> &Subset<MonoDepthDataset> {
        &self.train_dataset
    }

    pub fn validation_dataset(&self) -> &Subset<MonoDepthDataset> {
        &self.validation_dataset
    }

    pub fn test_dataset(&self) -> &Subset<MonoDepthDataset> {
        &self.test_dataset
    }

    fn with_pipeline(&self, subset: &Subset<MonoDepthDataset>, pipeline: Pipeline) -> SplitDataset {
        Transformed::new(subset.clone(), pipeline, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ground_truth::{Frame, DEPTH_SCALE_KITTI};
    use crate::dataset::transform::Transform;
    use crate::dataset::Dataset;
    use crate::misc::type_aliases::Iso3;
    use image::{ImageBuffer, Luma, Rgb, RgbImage};
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};

    fn fake_frames(n: usize) -> Vec<Frame> {
        (0..n)
            .map(|i| Frame {
                timestamp: i as f64,
                left_image: PathBuf::from(format!("left/{}.png", i)),
                right_image: PathBuf::from(format!("right/{}.png", i)),
                depth_image: PathBuf::from(format!("depth/{}.png", i)),
                pose: Iso3::identity(),
            })
            .collect()
    }

    fn fake_dataset(n: usize) -> GroundTruthDataset {
        GroundTruthDataset::from_frames(fake_frames(n), DEPTH_SCALE_KITTI, (375, 1242))
    }

    #[test]
    fn splits_are_disjoint_and_complete() {
        let manager = SupervisedDatasetManager::new(fake_dataset(100), ManagerConfig::default())
            .unwrap();
        let train: HashSet<usize> = manager.train_dataset().indices().iter().cloned().collect();
        let val: HashSet<usize> = manager.validation_dataset().indices().iter().cloned().collect();
        let test: HashSet<usize> = manager.test_dataset().indices().iter().cloned().collect();
        assert_eq!((80, 10, 10), (train.len(), val.len(), test.len()));
        assert!(train.is_disjoint(&val));
        assert!(train.is_disjoint(&test));
        assert!(val.is_disjoint(&test));
        let union: HashSet<usize> = train.union(&val).chain(test.iter()).cloned().collect();
        assert_eq!(100, union.len());
    }

    #[test]
    fn wrong_lengths_fail() {
        let result = SupervisedDatasetManager::new(fake_dataset(90), ManagerConfig::default());
        assert!(matches!(
            result,
            Err(DatasetError::SplitLengths {
                expected: 90,
                found: 100
            })
        ));
    }

    #[test]
    fn split_transforms() {
        let mut manager =
            SupervisedDatasetManager::new(fake_dataset(100), ManagerConfig::default()).unwrap();
        let validation = manager.get_validation_dataset(true);
        assert_eq!(10, validation.len());
        assert_eq!(2, validation.pipeline().transforms().len());
        let train = manager.get_train_batches(16).unwrap();
        assert_eq!(5, train.nb_batches());
        assert!(train
            .dataset()
            .pipeline()
            .transforms()
            .iter()
            .any(|t| matches!(t, Transform::ColorFilters { .. })));
        let test = manager.get_test_batches(4, false).unwrap();
        assert_eq!(3, test.nb_batches());
        assert_eq!(manager.test_dataset().indices().len(), test.order().len());
    }

    #[test]
    fn train_epochs_reshuffle() {
        let mut manager =
            SupervisedDatasetManager::new(fake_dataset(100), ManagerConfig::default()).unwrap();
        let first = manager.get_train_batches(8).unwrap().order().to_vec();
        let second = manager.get_train_batches(8).unwrap().order().to_vec();
        assert_ne!(first, second);
    }

    fn write_frame(dir: &Path, i: usize) {
        let left = RgbImage::from_fn(8, 6, |x, y| Rgb([(x * 30) as u8, (y * 40) as u8, 128]));
        left.save(dir.join(format!("left/{}.png", i))).unwrap();
        left.save(dir.join(format!("right/{}.png", i))).unwrap();
        let depth: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_fn(8, 6, |_, _| Luma([256 * (i as u16 + 1)]));
        depth.save(dir.join(format!("depth/{}.png", i))).unwrap();
    }

    #[test]
    fn batches_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        for sub in &["left", "right", "depth"] {
            std::fs::create_dir(dir.path().join(sub)).unwrap();
        }
        let mut index = String::from("# test sequence\n");
        for i in 0..10 {
            write_frame(dir.path(), i);
            index.push_str(&format!(
                "{} left/{i}.png right/{i}.png depth/{i}.png 0 0 0 0 0 0 1\n",
                i as f64 * 0.1,
                i = i
            ));
        }
        let index_path = dir.path().join("index.txt");
        std::fs::write(&index_path, index).unwrap();
        let dataset = GroundTruthDataset::open(&index_path, DEPTH_SCALE_KITTI).unwrap();
        let config = ManagerConfig {
            num_workers: 2,
            lengths: (6, 2, 2),
            final_img_size: (3, 4),
            ..ManagerConfig::default()
        };
        let mut manager = SupervisedDatasetManager::new(dataset, config).unwrap();

        let batches: Vec<_> = manager
            .get_train_batches(4)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(vec![4, 2], batches.iter().map(Vec::len).collect::<Vec<_>>());
        assert_eq!((3, 4, 3), batches[0][0].image.shape());

        let test: Vec<_> = manager
            .get_test_batches(2, false)
            .unwrap()
            .map(Result::unwrap)
            .collect();
        let expected_depth = (manager.test_dataset().indices()[1] + 1) as f32;
        assert_eq!(expected_depth, test[0][1].depth[(2, 3)]);
    }
}
