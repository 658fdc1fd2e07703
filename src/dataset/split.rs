// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Random splitting of a dataset into disjoint subsets.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::sync::Arc;

use crate::dataset::{Dataset, DatasetError, Subset};

/// Randomly partition the indices `0..len` into groups of the given lengths.
///
/// The lengths must sum to `len`.
/// A sum overflowing `usize` is reported with `found: usize::MAX`.
/// The same seed always produces the same partition.
pub fn random_indices(
    len: usize,
    lengths: &[usize],
    seed: u64,
) -> Result<Vec<Vec<usize>>, DatasetError> {
    let total = lengths
        .iter()
        .try_fold(0_usize, |acc, &length| acc.checked_add(length))
        .unwrap_or(usize::MAX);
    if total != len {
        return Err(DatasetError::SplitLengths {
            expected: len,
            found: total,
        });
    }
    let mut permutation: Vec<usize> = (0..len).collect();
    permutation.shuffle(&mut StdRng::seed_from_u64(seed));
    let mut start = 0;
    Ok(lengths
        .iter()
        .map(|&length| {
            let group = permutation[start..start + length].to_vec();
            start += length;
            group
        })
        .collect())
}

/// Randomly split a dataset into non-overlapping subsets of the given lengths.
pub fn random_split<D: Dataset>(
    dataset: Arc<D>,
    lengths: &[usize],
    seed: u64,
) -> Result<Vec<Subset<D>>, DatasetError> {
    let groups = random_indices(dataset.len(), lengths, seed)?;
    Ok(groups
        .into_iter()
        .map(|indices| Subset::new(Arc::clone(&dataset), indices))
        .collect())
}
