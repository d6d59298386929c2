//! # Fitting
//! Circle fitting session, initial guess estimation, and the two solvers.
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

mod newton;
mod objective;
mod quasi_newton;

pub use self::newton::{FitObserver, LogObserver, NewtonOutcome, newton_step};
pub use self::objective::{deviance, gradient, hessian, objective};

use nalgebra::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{CENTROID_NUDGE, MAX_POINTS};
use crate::errors::{Error, FitResult};

/// A circle described by its radius and center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Radius of the circle.
    pub radius: f64,

    /// Center of the circle.
    pub center: Vector2<f64>,
}

impl Circle {
    /// Parameter vector ordered `(radius, center x, center y)`.
    #[must_use]
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.radius, self.center.x, self.center.y)
    }

    /// Build a circle from a `(radius, center x, center y)` parameter vector.
    #[must_use]
    pub fn from_vector(params: &Vector3<f64>) -> Self {
        Self {
            radius: params.x,
            center: Vector2::new(params.y, params.z),
        }
    }
}

/// A fitting session binding a point set to its initial guess, the current
/// working guess, and the committed fit.
///
/// The fitted circle starts out equal to the initial guess and is only
/// overwritten when the Newton solver converges. The quasi-Newton solver
/// updates the working guess alone, so after [`CircleFit::run_quasi_newton`]
/// the fitted circle and the best guess may differ; check
/// [`CircleFit::converged`] before trusting the committed fit.
#[derive(Debug, Clone)]
pub struct CircleFit {
    points: Box<[Vector2<f64>]>,
    initial_guess: Vector3<f64>,
    best_guess: Vector3<f64>,
    fitted_circle: Vector3<f64>,
    converged: bool,
    iterations: usize,
    score: Option<f64>,
}

impl CircleFit {
    /// Create a new fitting session from a sequence of `(x, y)` points.
    ///
    /// The initial guess places the center on the centroid of the points,
    /// nudged by [`CENTROID_NUDGE`] in both axes, and takes the mean distance
    /// from the points to that center as the radius. The initial guess also
    /// seeds the working guess and the fitted circle.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] when the point set is empty, larger than
    /// [`MAX_POINTS`], or consists of a single repeated point.
    pub fn new(points: impl Into<Vec<Vector2<f64>>>) -> FitResult<Self> {
        let points: Box<[Vector2<f64>]> = points.into().into();
        if points.is_empty() {
            Err(Error::InvalidInput("Point set is empty.".into()))?;
        }
        if points.len() > MAX_POINTS {
            Err(Error::InvalidInput(format!(
                "Point set has {} points, the limit is {MAX_POINTS}.",
                points.len()
            )))?;
        }
        if points.len() > 1 && points.iter().all(|p| *p == points[0]) {
            Err(Error::InvalidInput(
                "All points are identical, no circle fits them.".into(),
            ))?;
        }

        let n = points.len() as f64;
        let mut centroid = Vector2::zeros();
        for point in &points {
            centroid += point;
        }
        centroid /= n;
        centroid += Vector2::new(CENTROID_NUDGE, CENTROID_NUDGE);

        let mut radius = 0.0;
        for point in &points {
            radius += (point - centroid).norm();
        }
        radius /= n;

        let initial = Vector3::new(radius, centroid.x, centroid.y);
        Ok(Self {
            points,
            initial_guess: initial,
            best_guess: initial,
            fitted_circle: initial,
            converged: false,
            iterations: 0,
            score: None,
        })
    }

    /// The point set bound to this session.
    #[must_use]
    pub fn points(&self) -> &[Vector2<f64>] {
        &self.points
    }

    /// Initial guess estimated from the centroid and mean point distance.
    #[must_use]
    pub fn initial_guess(&self) -> Circle {
        Circle::from_vector(&self.initial_guess)
    }

    /// Current working guess, updated by both solvers.
    #[must_use]
    pub fn best_guess(&self) -> Circle {
        Circle::from_vector(&self.best_guess)
    }

    /// The committed fit.
    ///
    /// Equal to the initial guess until the Newton solver converges; the
    /// quasi-Newton path never writes here.
    #[must_use]
    pub fn fitted_circle(&self) -> Circle {
        Circle::from_vector(&self.fitted_circle)
    }

    /// True once the Newton solver has converged on this session.
    #[must_use]
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Number of Newton iterations consumed by the most recent run,
    /// restarts included.
    #[must_use]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Score computed by the most recent call to [`Self::score`], if any.
    #[must_use]
    pub fn last_score(&self) -> Option<f64> {
        self.score
    }

    /// Objective value at the initial guess.
    #[must_use]
    pub fn initial_objective(&self) -> f64 {
        objective(&self.points, &self.initial_guess)
    }

    /// Objective value at the current working guess.
    #[must_use]
    pub fn current_objective(&self) -> f64 {
        objective(&self.points, &self.best_guess)
    }

    /// Score the committed fit against the point set.
    ///
    /// See [`crate::scoring::score_circle`] for the definition. The result is
    /// cached on the session and readable through [`Self::last_score`].
    ///
    /// # Errors
    /// [`Error::DivisionByZero`] when the fitted radius is zero.
    pub fn score(&mut self) -> FitResult<f64> {
        let score = crate::scoring::score_circle(&self.points, &self.fitted_circle())?;
        self.score = Some(score);
        Ok(score)
    }
}
