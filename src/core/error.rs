// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised while evaluating losses.

use thiserror::Error;

/// Errors of the loss computations.
///
/// Only structural problems are reported here.
/// Numerical problems (non-positive depth, NaN weights) propagate in the loss values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LossError {
    /// Two maps or images that must be aligned pixel to pixel have different shapes.
    #[error("shape mismatch in {context}: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Which input was checked.
        context: &'static str,
        /// `(rows, cols)` of the reference.
        expected: (usize, usize),
        /// `(rows, cols)` of the faulty input.
        found: (usize, usize),
    },
    /// Two images have a different number of channels.
    #[error("channel mismatch in {context}: expected {expected}, found {found}")]
    ChannelMismatch {
        /// Which input was checked.
        context: &'static str,
        /// Number of channels of the reference.
        expected: usize,
        /// Number of channels of the faulty input.
        found: usize,
    },
    /// An image needs at least one channel.
    #[error("an image needs at least one channel")]
    NoChannel,
}

/// Check that a map has the expected `(rows, cols)` shape.
pub fn check_shape(
    context: &'static str,
    expected: (usize, usize),
    found: (usize, usize),
) -> Result<(), LossError> {
    if expected == found {
        Ok(())
    } else {
        Err(LossError::ShapeMismatch {
            context,
            expected,
            found,
        })
    }
}
