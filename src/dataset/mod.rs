// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Datasets, splits, transforms and batch loading for supervised depth learning.

pub mod ground_truth;
pub mod loader;
pub mod manager;
pub mod mono_depth;
pub mod split;
pub mod transform;

use std::sync::Arc;
use thiserror::Error;

/// Errors happening while reading or splitting datasets.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG decoding error: {0}")]
    Png(#[from] png::DecodingError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("parsing error at line {line}")]
    Parse { line: usize },

    #[error("split lengths sum to {found} but the dataset has {expected} items")]
    SplitLengths { expected: usize, found: usize },

    #[error("index {index} out of bounds for a dataset of {len} items")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("batch size must be positive")]
    InvalidBatchSize,

    #[error("depth map of {found:?} does not match the {expected:?} image")]
    DepthSize {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

/// An indexable collection of items, loaded on demand.
pub trait Dataset: Send + Sync {
    type Item: Send;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Result<Self::Item, DatasetError>;
}

/// A view of a shared dataset restricted to some indices.
#[derive(Debug)]
pub struct Subset<D> {
    dataset: Arc<D>,
    indices: Vec<usize>,
}

impl<D> Clone for Subset<D> {
    fn clone(&self) -> Self {
        Self {
            dataset: Arc::clone(&self.dataset),
            indices: self.indices.clone(),
        }
    }
}

impl<D: Dataset> Subset<D> {
    pub fn new(dataset: Arc<D>, indices: Vec<usize>) -> Self {
        Self { dataset, indices }
    }

    /// Indices of the items of this subset in the underlying dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The dataset this subset is a view of.
    pub fn dataset(&self) -> &D {
        &self.dataset
    }
}

impl<D: Dataset> Dataset for Subset<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<Self::Item, DatasetError> {
        let inner = self
            .indices
            .get(index)
            .ok_or(DatasetError::IndexOutOfBounds {
                index,
                len: self.indices.len(),
            })?;
        self.dataset.get(*inner)
    }
}
