//! Goodness-of-fit scoring for fitted circles.
//!
// BSD 3-Clause License
//
// Copyright (c) 2026, Dar Dahlen
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use itertools::Itertools;
use nalgebra::Vector2;

use crate::errors::{Error, FitResult};
use crate::fitting::Circle;

/// Score how circle-like a point set is against a fitted circle.
///
/// The points are translated onto the circle center and scaled by the
/// radius, mapping the fit onto the unit circle. Three penalties are then
/// combined:
///
/// * `d_mass` - distance of the transformed centroid from the origin,
/// * `d_radius` - mean absolute deviation of the point norms from 1,
/// * `d_angle` - largest gap between consecutive ascending-sorted angle
///   proxies `dot(p / |p|, (0, 1)) / 2`, an approximation of the widest
///   angular interval left uncovered by the sample.
///
/// The score is `(1 - d_angle) * exp(-(d_mass + d_radius))`. A dense, exact
/// sample of the circle approaches 1; the value is not clamped to `[0, 1]`.
/// Because the angle proxy is measured against a fixed direction, scores of
/// sparse samples shift slightly under rotation; dense samples do not.
///
/// A single point yields `d_angle = 0` and means over one element. That is
/// well defined, but not meaningful as a roundness measure.
///
/// # Errors
/// [`Error::DivisionByZero`] when the circle radius is zero, and
/// [`Error::InvalidInput`] when the point set is empty.
pub fn score_circle(points: &[Vector2<f64>], circle: &Circle) -> FitResult<f64> {
    if points.is_empty() {
        Err(Error::InvalidInput("Cannot score an empty point set.".into()))?;
    }
    if circle.radius == 0.0 {
        Err(Error::DivisionByZero(
            "Fitted radius is zero, cannot normalize the point set.".into(),
        ))?;
    }

    let transformed: Vec<Vector2<f64>> = points
        .iter()
        .map(|p| (p - circle.center) / circle.radius)
        .collect();
    let n = transformed.len() as f64;

    let mut center_of_mass = Vector2::zeros();
    for point in &transformed {
        center_of_mass += point;
    }
    center_of_mass /= n;
    let d_mass = center_of_mass.norm();

    let d_radius = transformed
        .iter()
        .map(|p| (p.norm() - 1.0).abs())
        .sum::<f64>()
        / n;

    let base = Vector2::new(0.0, 1.0);
    let mut angles: Vec<f64> = transformed
        .iter()
        .map(|p| (p / p.norm()).dot(&base) / 2.0)
        .collect();
    angles.sort_by(f64::total_cmp);

    let d_angle = angles
        .iter()
        .tuple_windows()
        .map(|(low, high)| (high - low).abs())
        .fold(0.0, f64::max);

    Ok((1.0 - d_angle) * (-(d_mass + d_radius)).exp())
}

#[cfg(test)]
mod tests {
    use std::f64::consts::TAU;

    use super::*;

    fn dense_circle(
        radius: f64,
        center: Vector2<f64>,
        count: usize,
        rotation: f64,
    ) -> Vec<Vector2<f64>> {
        (0..count)
            .map(|i| {
                let angle = TAU * i as f64 / count as f64 + rotation;
                center + radius * Vector2::new(angle.cos(), angle.sin())
            })
            .collect()
    }

    #[test]
    fn test_dense_exact_sample_scores_high() {
        let center = Vector2::new(1.0, -1.0);
        let points = dense_circle(2.0, center, 512, 0.0);
        let circle = Circle {
            radius: 2.0,
            center,
        };

        let score = score_circle(&points, &circle).unwrap();
        assert!(score > 0.99);
        assert!(score <= 1.0);
    }

    #[test]
    fn test_four_point_sample_scores_half() {
        // evenly spaced points leave a 0.5 gap in the angle proxies, so even
        // an exact sparse fit scores 0.5
        let points = dense_circle(1.0, Vector2::zeros(), 4, 0.0);
        let circle = Circle {
            radius: 1.0,
            center: Vector2::zeros(),
        };

        let score = score_circle(&points, &circle).unwrap();
        assert!((score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_translation_invariance() {
        let points = dense_circle(1.5, Vector2::zeros(), 37, 0.2);
        let circle = Circle {
            radius: 1.5,
            center: Vector2::zeros(),
        };
        let score = score_circle(&points, &circle).unwrap();

        let shift = Vector2::new(3.7, -1.2);
        let moved: Vec<_> = points.iter().map(|p| p + shift).collect();
        let moved_circle = Circle {
            radius: 1.5,
            center: shift,
        };
        let moved_score = score_circle(&moved, &moved_circle).unwrap();

        assert!((score - moved_score).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_invariance_dense() {
        let circle = Circle {
            radius: 2.0,
            center: Vector2::zeros(),
        };
        let score = score_circle(&dense_circle(2.0, Vector2::zeros(), 512, 0.0), &circle).unwrap();
        let rotated =
            score_circle(&dense_circle(2.0, Vector2::zeros(), 512, 0.7), &circle).unwrap();

        assert!((score - rotated).abs() < 0.02);
    }

    #[test]
    fn test_radial_noise_lowers_score() {
        let center = Vector2::zeros();
        let circle = Circle {
            radius: 2.0,
            center,
        };
        let clean = dense_circle(2.0, center, 256, 0.0);
        let noisy: Vec<_> = (0..256)
            .map(|i| {
                let angle = TAU * i as f64 / 256.0;
                let radius = 2.0 + 0.3 * (5.0 * angle).sin();
                center + radius * Vector2::new(angle.cos(), angle.sin())
            })
            .collect();

        let clean_score = score_circle(&clean, &circle).unwrap();
        let noisy_score = score_circle(&noisy, &circle).unwrap();
        assert!(noisy_score < clean_score);
    }

    #[test]
    fn test_zero_radius_rejected() {
        let points = dense_circle(1.0, Vector2::zeros(), 8, 0.0);
        let circle = Circle {
            radius: 0.0,
            center: Vector2::zeros(),
        };
        let result = score_circle(&points, &circle);
        assert!(matches!(result, Err(Error::DivisionByZero(_))));
    }

    #[test]
    fn test_empty_points_rejected() {
        let circle = Circle {
            radius: 1.0,
            center: Vector2::zeros(),
        };
        let result = score_circle(&[], &circle);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_single_point_boundary() {
        // one point on the unit circle: no angular gap, no radial deviance,
        // but the center of mass sits on the point itself
        let circle = Circle {
            radius: 1.0,
            center: Vector2::zeros(),
        };
        let score = score_circle(&[Vector2::new(0.0, 1.0)], &circle).unwrap();
        assert!((score - (-1.0_f64).exp()).abs() < 1e-12);
    }
}
