// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Core functionalities: camera model, predictions and unsupervised losses.

pub mod calibration;
pub mod camera;
pub mod criterion;
pub mod error;
pub mod image;
pub mod losses;
pub mod result;
