//! BFGS minimization of the circle objective, delegated to [`argmin`].
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

use argmin::core::{CostFunction, Executor, Gradient, State};
use argmin::solver::linesearch::MoreThuenteLineSearch;
use argmin::solver::quasinewton::BFGS;
use log::debug;
use nalgebra::{Matrix3, Vector2, Vector3};

use super::{Circle, CircleFit, gradient, objective};
use crate::constants::QUASI_NEWTON_MAX_ITERATIONS;
use crate::errors::{Error, FitResult};

/// The circle objective bound to a point set, in the shape [`argmin`]
/// expects of a problem.
struct CircleProblem<'a> {
    points: &'a [Vector2<f64>],
}

impl CostFunction for CircleProblem<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(objective(self.points, &Vector3::from_column_slice(param)))
    }
}

impl Gradient for CircleProblem<'_> {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, param: &Self::Param) -> Result<Self::Gradient, argmin::core::Error> {
        Ok(gradient(self.points, &Vector3::from_column_slice(param))
            .as_slice()
            .to_vec())
    }
}

impl CircleFit {
    /// Minimize the objective with BFGS, delegated to [`argmin`].
    ///
    /// The objective and gradient are handed to a
    /// [`BFGS`] solver with a More-Thuente line search, started from the
    /// current working guess with an identity initial inverse Hessian. The
    /// minimizer runs until its own convergence criterion is met or
    /// [`QUASI_NEWTON_MAX_ITERATIONS`] iterations pass, and the best
    /// parameter found overwrites the working guess.
    ///
    /// Unlike the Newton path this never commits a fitted circle:
    /// [`Self::fitted_circle`] is written by Newton convergence only.
    ///
    /// # Errors
    /// [`Error::Convergence`] when the minimizer reports a failure or yields
    /// no parameter vector. There is no retry.
    pub fn run_quasi_newton(&mut self) -> FitResult<Circle> {
        let problem = CircleProblem {
            points: &self.points,
        };
        let linesearch = MoreThuenteLineSearch::new();
        let solver = BFGS::new(linesearch);

        let init = self.best_guess.as_slice().to_vec();
        let inv_hessian: Vec<Vec<f64>> = Matrix3::<f64>::identity()
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        let result = Executor::new(problem, solver)
            .configure(|state| {
                state
                    .param(init)
                    .inv_hessian(inv_hessian)
                    .max_iters(QUASI_NEWTON_MAX_ITERATIONS)
            })
            .run()
            .map_err(|err| Error::Convergence(format!("BFGS minimization failed: {err}")))?;

        debug!(
            "quasi-newton terminated: {:?}",
            result.state().get_termination_status()
        );

        let best = result
            .state()
            .get_best_param()
            .map(|param| Vector3::from_column_slice(param))
            .ok_or_else(|| Error::Convergence("BFGS yielded no parameter vector.".into()))?;

        self.best_guess = best;
        Ok(Circle::from_vector(&best))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quasi_newton_unit_circle() {
        let points = vec![
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, -1.0),
        ];
        let mut fit = CircleFit::new(points).unwrap();
        let initial = fit.initial_guess();

        // start a little off the solution so the minimizer has work to do
        fit.best_guess = Vector3::new(1.1, 0.05, -0.05);
        let best = fit.run_quasi_newton().unwrap();

        assert!((best.radius - 1.0).abs() < 0.1);
        assert!(best.center.norm() < 0.1);

        // only the working guess moves, the committed fit stays put
        assert!(fit.best_guess() == best);
        assert!(fit.fitted_circle() == initial);
        assert!(!fit.converged());
    }

    #[test]
    fn test_quasi_newton_improves_objective() {
        let points = vec![
            Vector2::new(2.0, 1.0),
            Vector2::new(1.0, 2.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.7, 1.7),
        ];
        let mut fit = CircleFit::new(points).unwrap();
        fit.best_guess = Vector3::new(0.5, 0.0, 0.0);

        let before = fit.current_objective();
        let _ = fit.run_quasi_newton().unwrap();
        assert!(fit.current_objective() < before);
    }
}
