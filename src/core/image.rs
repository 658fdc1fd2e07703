// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Multi-channel float images and sub-pixel sampling.

use crate::core::error::{self, LossError};
use crate::misc::type_aliases::{Float, Map};

/// An `H x W x C` image, stored as one `H x W` matrix per channel.
///
/// All channels are guaranteed to share the same shape.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    channels: Vec<Map>,
}

impl Image {
    /// Build an image from its channels, checking that they all have the same shape.
    pub fn from_channels(channels: Vec<Map>) -> Result<Self, LossError> {
        let first = channels.first().ok_or(LossError::NoChannel)?;
        let expected = first.shape();
        for channel in &channels[1..] {
            error::check_shape("image channels", expected, channel.shape())?;
        }
        Ok(Self { channels })
    }

    /// Build an image from channels already known to be consistent.
    pub(crate) fn from_channels_unchecked(channels: Vec<Map>) -> Self {
        Self { channels }
    }

    /// Single channel image.
    pub fn gray(map: Map) -> Self {
        Self {
            channels: vec![map],
        }
    }

    /// Image filled with zeros.
    pub fn zeros(nb_rows: usize, nb_cols: usize, nb_channels: usize) -> Self {
        Self {
            channels: vec![Map::zeros(nb_rows, nb_cols); nb_channels.max(1)],
        }
    }

    /// `(height, width, channels)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        let (h, w) = self.channels[0].shape();
        (h, w, self.channels.len())
    }

    /// `(height, width)`.
    pub fn size(&self) -> (usize, usize) {
        self.channels[0].shape()
    }

    pub fn nb_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, c: usize) -> &Map {
        &self.channels[c]
    }

    pub fn channels(&self) -> &[Map] {
        &self.channels
    }

    /// Apply a function to every channel, given its index.
    /// The function must keep all channels with the same shape.
    pub fn map_channels<F>(&self, mut f: F) -> Self
    where
        F: FnMut(usize, &Map) -> Map,
    {
        Self {
            channels: self
                .channels
                .iter()
                .enumerate()
                .map(|(c, m)| f(c, m))
                .collect(),
        }
    }

    /// Check that two images can be compared pixel to pixel.
    pub fn check_same_shape(&self, context: &'static str, other: &Self) -> Result<(), LossError> {
        error::check_shape(context, self.size(), other.size())?;
        if self.nb_channels() == other.nb_channels() {
            Ok(())
        } else {
            Err(LossError::ChannelMismatch {
                context,
                expected: self.nb_channels(),
                found: other.nb_channels(),
            })
        }
    }
}

/// Bilinear interpolation of a map at sub-pixel position `(x, y)`
/// where `x` is the column and `y` the row.
///
/// Coordinates outside of the map are clamped to its border.
/// An empty map samples to 0.
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_precision_loss)]
pub fn sample(map: &Map, x: Float, y: Float) -> Float {
    let (nb_rows, nb_cols) = map.shape();
    if nb_rows == 0 || nb_cols == 0 {
        return 0.0;
    }
    let x = x.max(0.0).min((nb_cols - 1) as Float);
    let y = y.max(0.0).min((nb_rows - 1) as Float);
    let u = x.floor() as usize;
    let v = y.floor() as usize;
    let u1 = (u + 1).min(nb_cols - 1);
    let v1 = (v + 1).min(nb_rows - 1);
    let a = x - u as Float;
    let b = y - v as Float;
    let _a = 1.0 - a;
    let _b = 1.0 - b;
    _a * _b * map[(v, u)] + _a * b * map[(v1, u)] + a * _b * map[(v, u1)] + a * b * map[(v1, u1)]
}
