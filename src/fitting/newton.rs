//! Newton's method over the circle fitting objective, with divergence
//! detection and randomized restarts.
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

use log::{debug, info, warn};
use nalgebra::{Vector2, Vector3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Circle, CircleFit, gradient, hessian};
use crate::constants::{DIVERGENCE_RADIUS_FLOOR, DIVERGENCE_STEP_LIMIT};
use crate::errors::{Error, FitResult};

/// Terminal state of a Newton run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NewtonOutcome {
    /// The step norm dropped below tolerance and the fit was committed.
    Converged(Circle),

    /// The iteration budget ran out; carries the last working guess, which
    /// was not committed as a fit.
    NotConverged(Circle),
}

/// Per-iteration observer for the Newton solver.
///
/// All hooks default to doing nothing; [`LogObserver`] forwards them to the
/// [`log`] macros. Implement this to capture iteration traces in tests or to
/// drive progress reporting without coupling the solver to a console.
pub trait FitObserver {
    /// Called after every applied step with the updated guess.
    fn iteration(&mut self, _iteration: usize, _guess: &Circle, _step_norm: f64) {}

    /// Called when a diverging guess is replaced by a random restart.
    fn diverged(&mut self, _iteration: usize, _restart: &Circle) {}

    /// Called once on convergence with the committed circle.
    fn converged(&mut self, _iteration: usize, _fitted: &Circle) {}

    /// Called when the iteration budget runs out without convergence.
    fn exhausted(&mut self, _max_iterations: usize) {}
}

/// Forwards Newton iteration events to the [`log`] macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl FitObserver for LogObserver {
    fn iteration(&mut self, iteration: usize, guess: &Circle, step_norm: f64) {
        debug!(
            "newton iteration {iteration}: r={:.6} center=({:.6}, {:.6}) step={step_norm:.6}",
            guess.radius, guess.center.x, guess.center.y
        );
    }

    fn diverged(&mut self, iteration: usize, restart: &Circle) {
        warn!(
            "newton diverged at iteration {iteration}, restarting from r={:.6} center=({:.6}, {:.6})",
            restart.radius, restart.center.x, restart.center.y
        );
    }

    fn converged(&mut self, iteration: usize, fitted: &Circle) {
        info!(
            "newton converged at iteration {iteration}: r={:.6} center=({:.6}, {:.6})",
            fitted.radius, fitted.center.x, fitted.center.y
        );
    }

    fn exhausted(&mut self, max_iterations: usize) {
        warn!("newton did not converge within {max_iterations} iterations");
    }
}

/// Compute a single Newton step at the given guess and apply it.
///
/// Solves the linear system `H * step = -gradient` by LU decomposition and
/// returns the updated guess together with the step norm.
///
/// # Errors
/// [`Error::SingularSystem`] when the Hessian cannot be inverted, as happens
/// for collinear or duplicate point sets.
pub fn newton_step(
    points: &[Vector2<f64>],
    guess: &Vector3<f64>,
) -> FitResult<(Vector3<f64>, f64)> {
    let hess = hessian(points, guess);
    let rhs = -gradient(points, guess);
    let step = hess.lu().solve(&rhs).ok_or_else(|| {
        Error::SingularSystem("Hessian is not invertible, the points may be collinear.".into())
    })?;
    Ok((guess + step, step.norm()))
}

/// Uniform sample between `low` and `high`.
///
/// Written as `low + (high - low) * u` so an inverted range still yields
/// values between the two bounds, which matters when a restart component of
/// the initial guess is negative.
#[inline(always)]
fn uniform(rng: &mut impl Rng, low: f64, high: f64) -> f64 {
    low + (high - low) * rng.random::<f64>()
}

/// Draw a fresh restart guess, each component `v` of the initial guess
/// sampled uniformly from `[v / 2, 1.5 * v]`.
fn restart_guess(rng: &mut impl Rng, initial: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(
        uniform(rng, initial.x / 2.0, 1.5 * initial.x),
        uniform(rng, initial.y / 2.0, 1.5 * initial.y),
        uniform(rng, initial.z / 2.0, 1.5 * initial.z),
    )
}

impl CircleFit {
    /// Run Newton's method from the current working guess.
    ///
    /// Each iteration solves `H * step = -gradient` and applies the step.
    /// The run stops as soon as the step norm drops below `tolerance`, at
    /// which point the guess is committed as the fitted circle. A step norm
    /// above [`DIVERGENCE_STEP_LIMIT`] or a radius below
    /// [`DIVERGENCE_RADIUS_FLOOR`] instead triggers a randomized restart
    /// around the initial guess; restarts do not reset the iteration
    /// counter, so the total number of iterations never exceeds
    /// `max_iterations`.
    ///
    /// Progress is reported through [`LogObserver`]; use
    /// [`Self::run_newton_observed`] to supply a custom observer or a seeded
    /// random source.
    ///
    /// # Errors
    /// [`Error::SingularSystem`] when the Hessian is not invertible during
    /// a step. This propagates immediately, only divergence is recovered.
    pub fn run_newton(
        &mut self,
        max_iterations: usize,
        tolerance: f64,
    ) -> FitResult<NewtonOutcome> {
        self.run_newton_observed(max_iterations, tolerance, &mut rand::rng(), &mut LogObserver)
    }

    /// Run Newton's method with a caller-supplied random source and observer.
    ///
    /// Semantics are identical to [`Self::run_newton`].
    ///
    /// # Errors
    /// [`Error::SingularSystem`] when the Hessian is not invertible during
    /// a step.
    pub fn run_newton_observed(
        &mut self,
        max_iterations: usize,
        tolerance: f64,
        rng: &mut impl Rng,
        observer: &mut dyn FitObserver,
    ) -> FitResult<NewtonOutcome> {
        self.converged = false;
        let mut guess = self.best_guess;

        for iteration in 0..max_iterations {
            let (next, step_norm) = newton_step(&self.points, &guess)?;
            guess = next;
            self.iterations = iteration + 1;
            observer.iteration(iteration, &Circle::from_vector(&guess), step_norm);

            if step_norm < tolerance {
                self.best_guess = guess;
                self.fitted_circle = guess;
                self.converged = true;
                let fitted = Circle::from_vector(&guess);
                observer.converged(iteration, &fitted);
                return Ok(NewtonOutcome::Converged(fitted));
            } else if step_norm > DIVERGENCE_STEP_LIMIT || guess.x < DIVERGENCE_RADIUS_FLOOR {
                guess = restart_guess(rng, &self.initial_guess);
                observer.diverged(iteration, &Circle::from_vector(&guess));
            }
        }

        self.best_guess = guess;
        observer.exhausted(max_iterations);
        Ok(NewtonOutcome::NotConverged(Circle::from_vector(&guess)))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[derive(Default)]
    struct CountingObserver {
        iterations: usize,
        restarts: usize,
    }

    impl FitObserver for CountingObserver {
        fn iteration(&mut self, _iteration: usize, _guess: &Circle, _step_norm: f64) {
            self.iterations += 1;
        }

        fn diverged(&mut self, _iteration: usize, _restart: &Circle) {
            self.restarts += 1;
        }
    }

    fn unit_circle_points() -> Vec<Vector2<f64>> {
        vec![
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, -1.0),
        ]
    }

    #[test]
    fn test_newton_unit_circle() {
        let mut fit = CircleFit::new(unit_circle_points()).unwrap();
        let outcome = fit.run_newton(50, 0.1).unwrap();

        let fitted = match outcome {
            NewtonOutcome::Converged(fitted) => fitted,
            NewtonOutcome::NotConverged(_) => panic!("expected convergence"),
        };
        assert!((fitted.radius - 1.0).abs() < 0.05);
        assert!(fitted.center.norm() < 0.05);
        assert!(fit.converged());
        assert!(fit.iterations() <= 50);
        assert!(fit.fitted_circle() == fitted);
    }

    #[test]
    fn test_newton_three_point_circle() {
        // three points on the circle of radius 1 centered at (1, 1)
        let points = vec![
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 1.0),
        ];
        let mut fit = CircleFit::new(points).unwrap();
        let outcome = fit.run_newton(200, 1e-5).unwrap();

        assert!(matches!(outcome, NewtonOutcome::Converged(_)));
        let fitted = fit.fitted_circle();
        assert!((fitted.radius - 1.0).abs() < 1e-3);
        assert!((fitted.center.x - 1.0).abs() < 1e-3);
        assert!((fitted.center.y - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_newton_exhaustion_leaves_fit_uncommitted() {
        let mut fit = CircleFit::new(unit_circle_points()).unwrap();
        let initial = fit.initial_guess();

        // zero tolerance can never be met
        let outcome = fit.run_newton(2, 0.0).unwrap();
        assert!(matches!(outcome, NewtonOutcome::NotConverged(_)));
        assert!(!fit.converged());
        assert!(fit.iterations() == 2);
        assert!(fit.fitted_circle() == initial);
        // the working guess did move
        assert!(fit.best_guess() != initial);
    }

    #[test]
    fn test_divergence_restart_recovers() {
        let mut fit = CircleFit::new(unit_circle_points()).unwrap();
        // force the first step to blow past the divergence limit
        fit.best_guess = Vector3::new(-50.0, 0.0, 0.0);

        let mut rng = StdRng::seed_from_u64(7);
        let mut counter = CountingObserver::default();
        let outcome = fit
            .run_newton_observed(50, 0.1, &mut rng, &mut counter)
            .unwrap();

        assert!(counter.restarts >= 1);
        assert!(counter.iterations <= 50);
        assert!(counter.iterations == fit.iterations());
        assert!(matches!(outcome, NewtonOutcome::Converged(_)));
        assert!((fit.fitted_circle().radius - 1.0).abs() < 0.1);
    }

    #[test]
    fn test_restart_budget_never_exceeded() {
        let mut fit = CircleFit::new(unit_circle_points()).unwrap();
        fit.best_guess = Vector3::new(-50.0, 0.0, 0.0);

        let mut rng = StdRng::seed_from_u64(11);
        let mut counter = CountingObserver::default();
        // unreachable tolerance, so the loop runs through every restart
        let result = fit.run_newton_observed(30, 0.0, &mut rng, &mut counter);

        assert!(result.is_ok());
        assert!(counter.iterations <= 30);
    }

    #[test]
    fn test_restart_guess_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let initial = Vector3::new(2.0, 3.0, -4.0);

        for _ in 0..100 {
            let sample = restart_guess(&mut rng, &initial);
            assert!(sample.x >= 1.0 && sample.x <= 3.0);
            assert!(sample.y >= 1.5 && sample.y <= 4.5);
            // a negative component inverts the range but stays bounded
            assert!(sample.z >= -6.0 && sample.z <= -2.0);
        }
    }

    #[test]
    fn test_newton_step_matches_loop() {
        let points = unit_circle_points();
        let fit = CircleFit::new(points.clone()).unwrap();
        let (next, step_norm) = newton_step(&points, &fit.best_guess).unwrap();

        assert!(step_norm > 0.0);
        assert!(((next - fit.best_guess).norm() - step_norm).abs() < 1e-12);
    }
}
