// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Batched iteration over a dataset.

use log::debug;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::dataset::{Dataset, DatasetError};
use crate::misc::helper;

/// Iterator over batches of a dataset.
///
/// Items of a batch are loaded by a pool of `num_workers` threads,
/// or in the calling thread if `num_workers` is 0.
/// The last batch may be smaller than the batch size.
pub struct Batches<D> {
    dataset: D,
    order: Vec<usize>,
    batch_size: usize,
    position: usize,
    pool: Option<ThreadPool>,
}

impl<D: Dataset> Batches<D> {
    /// Batches in the dataset order, or shuffled with the given seed.
    pub fn new(
        dataset: D,
        batch_size: usize,
        shuffle_seed: Option<u64>,
        num_workers: usize,
    ) -> Result<Self, DatasetError> {
        if batch_size == 0 {
            return Err(DatasetError::InvalidBatchSize);
        }
        let mut order: Vec<usize> = (0..dataset.len()).collect();
        if let Some(seed) = shuffle_seed {
            order.shuffle(&mut StdRng::seed_from_u64(seed));
        }
        let pool = if num_workers > 0 {
            Some(ThreadPoolBuilder::new().num_threads(num_workers).build()?)
        } else {
            None
        };
        debug!(
            "{} items in batches of {} with {} workers",
            order.len(),
            batch_size,
            num_workers
        );
        Ok(Self {
            dataset,
            order,
            batch_size,
            position: 0,
            pool,
        })
    }

    /// Total number of batches, including a last incomplete one.
    pub fn nb_batches(&self) -> usize {
        let (full, rest) = helper::div_rem(self.order.len(), self.batch_size);
        if rest == 0 {
            full
        } else {
            full + 1
        }
    }

    /// Order in which the dataset items are visited.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    fn load(&self, indices: &[usize]) -> Result<Vec<D::Item>, DatasetError> {
        match &self.pool {
            Some(pool) => pool.install(|| {
                indices
                    .par_iter()
                    .map(|&index| self.dataset.get(index))
                    .collect()
            }),
            None => indices
                .iter()
                .map(|&index| self.dataset.get(index))
                .collect(),
        }
    }
}

impl<D: Dataset> Iterator for Batches<D> {
    type Item = Result<Vec<D::Item>, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.order.len());
        let batch = self.load(&self.order[self.position..end]);
        self.position = end;
        Some(batch)
    }
}
