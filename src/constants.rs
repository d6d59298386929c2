//! Numerical constants used by the fitting and scoring routines.
//!

/// Offset added to both components of the centroid when building the initial
/// guess, so the starting center never lands exactly on a point.
pub const CENTROID_NUDGE: f64 = 0.001;

/// Damping added under the square root of the per-point distance inside the
/// Hessian, so a point sitting on the candidate center cannot divide by zero.
pub const HESSIAN_DAMPING: f64 = 1e-4;

/// Step norm above which a Newton iterate is considered diverging.
pub const DIVERGENCE_STEP_LIMIT: f64 = 1000.0;

/// Radius below which a Newton iterate is considered diverging.
pub const DIVERGENCE_RADIUS_FLOOR: f64 = -1.0;

/// Default iteration budget for the Newton solver.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Default convergence tolerance on the Newton step norm.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Iteration cap handed to the delegated quasi-Newton minimizer.
pub const QUASI_NEWTON_MAX_ITERATIONS: u64 = 100;

/// Largest accepted point set size.
pub const MAX_POINTS: usize = 10_000;
