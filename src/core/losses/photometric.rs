// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Photometric error between an image and its reconstruction.
//!
//! The error mixes a structural dissimilarity term (SSIM over 3x3 windows)
//! and a plain L1 term, weighted by `lambda_s`:
//!
//! `lambda_s * mean((1 - SSIM) / 2) + (1 - lambda_s) * mean(|a - b|)`

use itertools::izip;

use crate::core::error::LossError;
use crate::core::image::Image;
use crate::misc::type_aliases::{Float, Map};

/// SSIM stabilization constant of the means.
pub const SSIM_C1: Float = 0.01 * 0.01;
/// SSIM stabilization constant of the variances.
pub const SSIM_C2: Float = 0.03 * 0.03;

/// Photometric error of two images of identical shape, averaged over channels.
#[allow(clippy::cast_precision_loss)]
pub fn photometric_error(lambda_s: Float, image: &Image, reconstructed: &Image) -> Result<Float, LossError> {
    image.check_same_shape("photometric error", reconstructed)?;
    let sum: Float = izip!(image.channels(), reconstructed.channels())
        .map(|(a, b)| {
            lambda_s * mean_ssim_dissimilarity(a, b) + (1.0 - lambda_s) * mean_abs_diff(a, b)
        })
        .sum();
    Ok(sum / image.nb_channels() as Float)
}

/// Mean absolute difference of two maps of identical shape.
#[allow(clippy::cast_precision_loss)]
pub fn mean_abs_diff(a: &Map, b: &Map) -> Float {
    let sum: Float = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum();
    sum / a.len() as Float
}

/// Mean of `(1 - SSIM) / 2`, clamped to [0, 1] per pixel.
#[allow(clippy::cast_precision_loss)]
pub fn mean_ssim_dissimilarity(a: &Map, b: &Map) -> Float {
    let sum: Float = ssim(a, b)
        .iter()
        .map(|s| ((1.0 - s) / 2.0).max(0.0).min(1.0))
        .sum();
    sum / a.len() as Float
}

/// Structural similarity index at each pixel, computed on 3x3 windows.
#[allow(clippy::similar_names)]
pub fn ssim(a: &Map, b: &Map) -> Map {
    let mu_a = box_filter_3x3(a);
    let mu_b = box_filter_3x3(b);
    let sigma_a = box_filter_3x3(&a.component_mul(a)) - mu_a.component_mul(&mu_a);
    let sigma_b = box_filter_3x3(&b.component_mul(b)) - mu_b.component_mul(&mu_b);
    let sigma_ab = box_filter_3x3(&a.component_mul(b)) - mu_a.component_mul(&mu_b);
    Map::from_fn(a.nrows(), a.ncols(), |i, j| {
        let (ma, mb) = (mu_a[(i, j)], mu_b[(i, j)]);
        let numerator = (2.0 * ma * mb + SSIM_C1) * (2.0 * sigma_ab[(i, j)] + SSIM_C2);
        let denominator =
            (ma * ma + mb * mb + SSIM_C1) * (sigma_a[(i, j)] + sigma_b[(i, j)] + SSIM_C2);
        numerator / denominator
    })
}

/// Mean over each 3x3 neighborhood, with indices clamped at the borders.
#[allow(clippy::cast_possible_wrap)]
#[allow(clippy::cast_sign_loss)]
fn box_filter_3x3(map: &Map) -> Map {
    let (nb_rows, nb_cols) = map.shape();
    let clamp = |x: isize, len: usize| x.max(0).min(len as isize - 1) as usize;
    Map::from_fn(nb_rows, nb_cols, |i, j| {
        let mut sum = 0.0;
        for di in -1..=1 {
            for dj in -1..=1 {
                let r = clamp(i as isize + di, nb_rows);
                let c = clamp(j as isize + dj, nb_cols);
                sum += map[(r, c)];
            }
        }
        sum / 9.0
    })
}
