//! Acceleration grid for Poisson-disk sampling.
//!
//! The region is covered by square cells of side `min_radius / √2`, so each cell
//! can hold at most one accepted sample. A cell stores `0` when empty, otherwise
//! the 1-based index of the sample occupying it. Neighbourhood queries therefore
//! only need to inspect a fixed block of cells around a candidate.

#![warn(missing_docs)]

use crate::error::NavigationError;
use crate::map::point_types::{GridPoint, Point2D};
use nalgebra::SVector;

/// Value stored in a cell that holds no sample.
pub const EMPTY_CELL: u32 = 0;

/// Largest grid side, in cells, that [`SampleGrid::new`] will allocate.
pub const MAX_CELLS_PER_AXIS: usize = 4096;

/// Uniform grid over a square sampling region.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleGrid {
    /// Size in cells along each axis (x, y).
    dims: SVector<usize, 2>,
    /// Side length of one cell in world units.
    cell_size: f64,
    /// Flat cell storage, row-major.
    data: Vec<u32>,
}

impl SampleGrid {
    /// Creates an empty grid covering `[0, extent) × [0, extent)` for samples
    /// separated by at least `min_radius`.
    ///
    /// # Arguments
    /// * `extent` - Side length of the square region
    /// * `min_radius` - Minimum separation between samples
    ///
    /// # Returns
    /// * `Result<Self, NavigationError>` - The grid or an error if parameters are invalid
    pub fn new(extent: f64, min_radius: f64) -> Result<Self, NavigationError> {
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

        let cell_size = min_radius / std::f64::consts::SQRT_2;
        let cells = (extent / cell_size).ceil();
        if !cells.is_finite() || cells > MAX_CELLS_PER_AXIS as f64 {
            return Err(NavigationError::InvalidParameter(
                "grid dimensions too large for the extent to radius ratio",
            ));
        }
        // In 1..=MAX_CELLS_PER_AXIS after the check above
        let cells_per_axis = cells as usize;
        let total_cells = cells_per_axis * cells_per_axis;

        Ok(SampleGrid {
            dims: SVector::<usize, 2>::new(cells_per_axis, cells_per_axis),
            cell_size,
            data: vec![EMPTY_CELL; total_cells],
        })
    }

    /// Gets the dimensions of the grid.
    pub fn get_dims(&self) -> &SVector<usize, 2> {
        &self.dims
    }

    /// Gets the side length of one cell.
    pub fn get_cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Calculates the flat index of a cell, or `None` if it is outside the grid.
    fn get_index(&self, cell: &GridPoint) -> Option<usize> {
        if cell.x >= self.dims[0] || cell.y >= self.dims[1] {
            return None;
        }
        let index = cell.y * self.dims[0] + cell.x;
        (index < self.data.len()).then_some(index)
    }

    /// Converts a world position to the cell containing it.
    /// Returns None if the position is outside the grid.
    pub fn world_to_grid(&self, position: &Point2D) -> Option<GridPoint> {
        let gx = position.x / self.cell_size;
        let gy = position.y / self.cell_size;

        if !gx.is_finite() || !gy.is_finite() || gx < 0.0 || gy < 0.0 {
            return None;
        }

        let cell = GridPoint::new(gx.floor() as usize, gy.floor() as usize);
        self.get_index(&cell).map(|_| cell)
    }

    /// Gets the value stored in a cell.
    pub fn get(&self, cell: &GridPoint) -> Result<u32, NavigationError> {
        self.get_index(cell)
            .map(|index| self.data[index])
            .ok_or(NavigationError::OutOfBounds("cell outside the sample grid"))
    }

    /// Stores a 1-based sample index in a cell.
    pub fn set(&mut self, cell: &GridPoint, sample: u32) -> Result<(), NavigationError> {
        let index = self
            .get_index(cell)
            .ok_or(NavigationError::OutOfBounds("cell outside the sample grid"))?;
        self.data[index] = sample;
        Ok(())
    }

    /// Collects the occupants of the `(2 * reach + 1)²` block of cells centred
    /// on `center`.
    ///
    /// Cells of the block that fall outside the grid hold no sample and are
    /// skipped; every index is bounds-checked before the storage is read.
    pub fn neighborhood(&self, center: &GridPoint, reach: usize) -> Vec<u32> {
        let min_x = center.x.saturating_sub(reach);
        let min_y = center.y.saturating_sub(reach);
        let max_x = center.x.saturating_add(reach).min(self.dims[0].saturating_sub(1));
        let max_y = center.y.saturating_add(reach).min(self.dims[1].saturating_sub(1));

        let mut occupants = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let Some(index) = self.get_index(&GridPoint::new(x, y)) else {
                    continue;
                };
                let value = self.data[index];
                if value != EMPTY_CELL {
                    occupants.push(value);
                }
            }
        }
        occupants
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> usize {
        self.data.iter().filter(|&&v| v != EMPTY_CELL).count()
    }
}
