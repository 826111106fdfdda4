//! Poisson-disk sampling over a square region.
//!
//! Samples grow outward from the region centre: an active sample is picked at
//! random and candidates are thrown into the annulus `[r, 2r)` around it. The
//! first candidate that keeps every accepted sample at least `r` away is kept
//! and becomes active itself; a pick whose candidates all fail is retired from
//! the active list. A [`SampleGrid`] keeps the spacing check to a fixed 5×5
//! block of cells.

#![warn(missing_docs)]

use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::NavigationError;
use crate::map::point_types::{Point2D, distance};
use crate::map::sample_grid::SampleGrid;

/// Cells searched on each side of a candidate's cell.
const SEARCH_REACH: usize = 2;

/// Upper bound on the number of active picks in one sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IterationBudget {
    /// At most this many picks.
    Limited(u64),
    /// Run until the active list drains.
    Unbounded,
}

impl IterationBudget {
    /// Interprets a configured iteration count.
    ///
    /// Negative counts and counts at or above `i32::MAX` are treated as unbounded.
    pub fn from_configured(iterations: i64) -> Self {
        if iterations < 0 || iterations >= i64::from(i32::MAX) {
            IterationBudget::Unbounded
        } else {
            IterationBudget::Limited(iterations as u64)
        }
    }

    fn allows(&self, completed: u64) -> bool {
        match self {
            IterationBudget::Limited(limit) => completed < *limit,
            IterationBudget::Unbounded => true,
        }
    }
}

/// Output of one sampling run.
#[derive(Debug, Clone)]
pub struct SampleSet {
    /// Accepted samples in acceptance order. The region centre is always first.
    pub points: Vec<Point2D>,
    /// Grid holding the 1-based index of every accepted sample.
    pub grid: SampleGrid,
    /// Number of active picks performed.
    pub iterations: u64,
    /// Number of accepted pairs found closer than the minimum radius.
    pub spacing_violations: usize,
}

/// Poisson-disk sampler for a square region `[0, extent) × [0, extent)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonSampler {
    extent: f64,
    min_radius: f64,
    attempts_per_point: u32,
    budget: IterationBudget,
}

impl PoissonSampler {
    /// Creates a sampler.
    ///
    /// # Arguments
    /// * `extent` - Side length of the square region
    /// * `min_radius` - Minimum distance between two accepted samples
    /// * `attempts_per_point` - Candidates tried around each active pick
    /// * `budget` - Maximum number of active picks
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The sampler or an error if parameters are invalid
    pub fn new(
        extent: f64,
        min_radius: f64,
        attempts_per_point: u32,
        budget: IterationBudget,
    ) -> Result<Self, NavigationError> {
        if !extent.is_finite() || extent <= 0.0 {
            return Err(NavigationError::InvalidParameter(
                "region extent must be positive and finite",
            ));
        }
        if !min_radius.is_finite() || min_radius <= 0.0 {
            return Err(NavigationError::InvalidParameter(
                "minimum radius must be positive and finite",
            ));
        }
        if attempts_per_point == 0 {
            return Err(NavigationError::InvalidParameter(
                "at least one attempt per point is required",
            ));
        }

        Ok(Self {
            extent,
            min_radius,
            attempts_per_point,
            budget,
        })
    }

    /// Runs the sampler with a fresh random stream seeded from `seed`.
    pub fn generate(&self, seed: u64) -> Result<SampleSet, NavigationError> {
        self.run(seed, None)
    }

    /// Like [`PoissonSampler::generate`], but checks `cancel` before every pick
    /// and returns [`NavigationError::Cancelled`] once it is raised.
    pub fn generate_with_cancel(
        &self,
        seed: u64,
        cancel: &AtomicBool,
    ) -> Result<SampleSet, NavigationError> {
        self.run(seed, Some(cancel))
    }

    fn run(&self, seed: u64, cancel: Option<&AtomicBool>) -> Result<SampleSet, NavigationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = SampleGrid::new(self.extent, self.min_radius)?;
        let mut points: Vec<Point2D> = Vec::new();

        let centre = Point2D::new(self.extent / 2.0, self.extent / 2.0);
        self.accept(centre, &mut points, &mut grid)?;
        let mut active: Vec<Point2D> = vec![centre];

        let mut iterations = 0u64;
        while !active.is_empty() && self.budget.allows(iterations) {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                debug!(iterations, accepted = points.len(), "Sampling cancelled");
                return Err(NavigationError::Cancelled);
            }
            iterations += 1;

            let pick = rng.random_range(0..active.len());
            let origin = active[pick];

            let mut accepted = false;
            for _ in 0..self.attempts_per_point {
                let angle = rng.random_range(0.0..TAU);
                let radius = rng.random_range(self.min_radius..2.0 * self.min_radius);
                let candidate = Point2D::new(
                    origin.x + radius * angle.cos(),
                    origin.y + radius * angle.sin(),
                );

                if self.is_candidate_valid(&candidate, &points, &grid) {
                    self.accept(candidate, &mut points, &mut grid)?;
                    active.push(candidate);
                    accepted = true;
                    break;
                }
            }

            if !accepted {
                active.swap_remove(pick);
            }
        }

        let spacing_violations = self.report_spacing_violations(&points);
        debug!(
            seed,
            iterations,
            accepted = points.len(),
            remaining_active = active.len(),
            "Poisson-disk sampling finished"
        );

        Ok(SampleSet {
            points,
            grid,
            iterations,
            spacing_violations,
        })
    }

    fn accept(
        &self,
        point: Point2D,
        points: &mut Vec<Point2D>,
        grid: &mut SampleGrid,
    ) -> Result<(), NavigationError> {
        let cell = grid
            .world_to_grid(&point)
            .ok_or(NavigationError::OutOfBounds("accepted sample outside the grid"))?;
        points.push(point);
        let sample = u32::try_from(points.len())
            .map_err(|_| NavigationError::OutOfBounds("too many samples for the grid index"))?;
        grid.set(&cell, sample)
    }

    fn is_candidate_valid(&self, candidate: &Point2D, points: &[Point2D], grid: &SampleGrid) -> bool {
        if candidate.x < 0.0
            || candidate.x >= self.extent
            || candidate.y < 0.0
            || candidate.y >= self.extent
        {
            return false;
        }

        let Some(cell) = grid.world_to_grid(candidate) else {
            return false;
        };

        grid.neighborhood(&cell, SEARCH_REACH).iter().all(|&sample| {
            points
                .get(sample as usize - 1)
                .is_some_and(|other| distance(candidate, other) >= self.min_radius)
        })
    }

    fn report_spacing_violations(&self, points: &[Point2D]) -> usize {
        let mut violations = 0;
        for (i, a) in points.iter().enumerate() {
            for (j, b) in points.iter().enumerate().skip(i + 1) {
                let d = distance(a, b);
                if d < self.min_radius {
                    violations += 1;
                    warn!(
                        first = i,
                        second = j,
                        distance = d,
                        min_radius = self.min_radius,
                        "Accepted samples closer than the minimum radius"
                    );
                }
            }
        }
        violations
    }
}
