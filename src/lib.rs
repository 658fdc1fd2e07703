// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Unsupervised losses for stereo visual odometry networks,
//! and the datasets used to train and evaluate them.
//!
//! The [`core::criterion::UnsupervisedCriterion`] combines stereo and temporal
//! consistency losses of two consecutive stereo pairs of predictions.
//! The [`dataset::manager::SupervisedDatasetManager`] splits a ground truth sequence
//! into train, validation and test sets and provides their batches.

pub mod config;
pub mod core;
pub mod dataset;
pub mod math;
pub mod misc;
