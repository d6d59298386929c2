//! # bestcircle
//! Nonlinear least-squares fitting of a circle to a set of 2D points, with a
//! composite score describing how circle-like the points actually are.
//!
//! A [`fitting::CircleFit`] session owns the point set and the current state
//! of the fit. Two solvers minimize the same sum-of-squared-deviances
//! objective: a Newton iteration with analytic gradient and Hessian,
//! divergence detection, and randomized restarts, and a BFGS minimizer
//! delegated to [`argmin`]. Only the Newton path commits a fitted circle,
//! which [`fitting::CircleFit::score`] then evaluates against the points.
//!
//! ```
//!     use bestcircle::prelude::*;
//!     use bestcircle::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
//!     use nalgebra::Vector2;
//!
//!     let points = vec![
//!         Vector2::new(1.0, 0.0),
//!         Vector2::new(0.0, 1.0),
//!         Vector2::new(-1.0, 0.0),
//!         Vector2::new(0.0, -1.0),
//!     ];
//!     let mut fit = CircleFit::new(points).unwrap();
//!     let outcome = fit.run_newton(DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE).unwrap();
//!     assert!(matches!(outcome, NewtonOutcome::Converged(_)));
//!     assert!((fit.fitted_circle().radius - 1.0).abs() < 0.05);
//! ```
//!

pub mod constants;
pub mod errors;
pub mod fitting;
pub mod scoring;

/// Common useful imports
pub mod prelude {
    pub use crate::errors::{Error, FitResult};
    pub use crate::fitting::{Circle, CircleFit, FitObserver, LogObserver, NewtonOutcome};
    pub use crate::scoring::score_circle;
}
