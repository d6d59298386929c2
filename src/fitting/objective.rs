//! Residual model for the circle fitting objective.
//!
//! All functions here are pure in the point set and the candidate guess,
//! so both solvers can share them and single iterations stay testable.
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

use nalgebra::{Matrix3, Vector2, Vector3};

use crate::constants::HESSIAN_DAMPING;

/// Signed deviance of a point from a candidate circle, the guess ordered
/// `(radius, center x, center y)`.
///
/// Positive when the point lies inside the candidate circle, zero for all
/// points exactly when the guess matches the circle they were drawn from.
#[inline(always)]
#[must_use]
pub fn deviance(point: &Vector2<f64>, guess: &Vector3<f64>) -> f64 {
    let center = Vector2::new(guess.y, guess.z);
    guess.x - (point - center).norm()
}

/// Sum of squared deviances over the point set, the quantity both solvers
/// minimize.
#[must_use]
pub fn objective(points: &[Vector2<f64>], guess: &Vector3<f64>) -> f64 {
    points.iter().map(|p| deviance(p, guess).powi(2)).sum()
}

/// Gradient of the objective at the given guess.
///
/// The radius component accumulates `r * D` per point, which vanishes with
/// the deviances but is not the partial derivative of [`objective`]: it
/// carries an extra factor of `r` relative to the center components. The
/// tests pin this scaling down.
#[must_use]
pub fn gradient(points: &[Vector2<f64>], guess: &Vector3<f64>) -> Vector3<f64> {
    let r = guess.x;
    let center = Vector2::new(guess.y, guess.z);

    let mut dr = 0.0;
    let mut dcx = 0.0;
    let mut dcy = 0.0;
    for point in points {
        let d = deviance(point, guess);
        let offset = point - center;
        let n = offset.norm();

        dr += r * d;
        dcx += offset.x * d / n;
        dcy += offset.y * d / n;
    }

    2.0 * Vector3::new(dr, dcx, dcy)
}

/// Hessian of the objective at the given guess, accumulated per point and
/// doubled.
///
/// The per-point distance is damped by [`HESSIAN_DAMPING`] under the square
/// root, so a point sitting exactly on the candidate center cannot divide
/// by zero.
#[must_use]
pub fn hessian(points: &[Vector2<f64>], guess: &Vector3<f64>) -> Matrix3<f64> {
    let r = guess.x;
    let center = Vector2::new(guess.y, guess.z);

    let mut hess = Matrix3::zeros();
    for point in points {
        let offset = point - center;
        let (dx, dy) = (offset.x, offset.y);
        let n = (dx.powi(2) + dy.powi(2) + HESSIAN_DAMPING).sqrt();

        let h11 = 1.0;
        let h22 = 1.0 - r / n + r * dx.powi(2) / n.powi(3);
        let h33 = 2.0 - r / n + r * dy.powi(2) / n.powi(3);

        let h12 = dx / n;
        let h13 = dy / n;
        let h23 = r * dx * dy / n;

        hess += Matrix3::new(
            h11, h12, h13, //
            h12, h22, h23, //
            h13, h23, h33,
        );
    }

    2.0 * hess
}
