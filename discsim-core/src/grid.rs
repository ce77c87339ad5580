//! Uniform grid broad phase
//!
//! The viewport is split into `rows x cols` cells whose size is the viewport
//! ceil-divided by the cell count, so the grid always covers the viewport.
//! A particle is registered in every cell its bounding square touches, which
//! makes the mapping many-to-many; see `PairSet` for how duplicate candidates
//! are collapsed.
//!
//! Integration can push a disc past a wall by a fraction of a step before the
//! wall bounce catches it. Indices up to one cell outside the grid are folded
//! into the edge cell; anything further out means a particle escaped the
//! domain and is reported as `GridError::CellOutOfRange`.

use crate::collision::PairSet;
use crate::config::OutOfRangePolicy;
use crate::engine::{Particle, Viewport};
use glam::Vec2;
use thiserror::Error;

/// How many cells past the edge still count as transient overshoot
const EDGE_MARGIN: i64 = 1;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error(
        "particle {particle} at ({x}, {y}) maps to cell ({row}, {col}) outside the {rows}x{cols} grid"
    )]
    CellOutOfRange {
        particle: usize,
        x: f32,
        y: f32,
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },
}

/// Inclusive block of cells covered by one bounding square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub row_min: usize,
    pub row_max: usize,
    pub col_min: usize,
    pub col_max: usize,
}

impl CellRange {
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.col_min..=self.col_max;
        (self.row_min..=self.row_max).flat_map(move |row| cols.clone().map(move |col| (row, col)))
    }

    pub fn cell_count(&self) -> usize {
        (self.row_max - self.row_min + 1) * (self.col_max - self.col_min + 1)
    }
}

#[derive(Debug, Clone)]
pub struct UniformGrid {
    rows: usize,
    cols: usize,
    cell_size: Vec2,
    /// Row-major membership lists, cleared in place on every rebuild
    cells: Vec<Vec<usize>>,
}

impl UniformGrid {
    pub fn new(rows: usize, cols: usize, viewport: Viewport) -> Self {
        assert!(rows > 0 && cols > 0, "grid needs at least one cell");
        Self {
            rows,
            cols,
            cell_size: cell_size_for(rows, cols, viewport),
            cells: vec![Vec::new(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Width and height of one cell
    pub fn cell_size(&self) -> Vec2 {
        self.cell_size
    }

    /// Particle indices registered in a cell
    pub fn cell(&self, row: usize, col: usize) -> &[usize] {
        &self.cells[row * self.cols + col]
    }

    /// Recompute cell dimensions for a new viewport. Membership is dropped;
    /// call `rebuild` afterwards.
    pub fn resize(&mut self, viewport: Viewport) {
        self.cell_size = cell_size_for(self.rows, self.cols, viewport);
        self.clear();
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Cells touched by the particle's bounding square
    pub fn cells_for(&self, index: usize, particle: &Particle) -> Result<CellRange, GridError> {
        let (lo, hi) = self.raw_span(particle);
        let rows = self.rows as i64;
        let cols = self.cols as i64;
        let in_margin = |v: i64, count: i64| (-EDGE_MARGIN..count + EDGE_MARGIN).contains(&v);

        let finite = particle.pos.is_finite();
        for (row, col) in [lo, hi] {
            if !finite || !in_margin(row, rows) || !in_margin(col, cols) {
                return Err(GridError::CellOutOfRange {
                    particle: index,
                    x: particle.pos.x,
                    y: particle.pos.y,
                    row,
                    col,
                    rows: self.rows,
                    cols: self.cols,
                });
            }
        }

        Ok(self.clamp_span(lo, hi))
    }

    /// Like `cells_for`, but folds any index into the grid
    pub fn clamped_cells_for(&self, particle: &Particle) -> CellRange {
        let (lo, hi) = self.raw_span(particle);
        self.clamp_span(lo, hi)
    }

    /// Clear every cell and register each particle in the cells it touches.
    ///
    /// Returns how many particles had to be clamped. Under
    /// `OutOfRangePolicy::Fail` the first escaped particle aborts the rebuild
    /// and leaves the grid empty.
    pub fn rebuild(
        &mut self,
        particles: &[Particle],
        policy: OutOfRangePolicy,
    ) -> Result<usize, GridError> {
        self.clear();
        let mut clamped = 0;

        for (index, particle) in particles.iter().enumerate() {
            let range = match self.cells_for(index, particle) {
                Ok(range) => range,
                Err(err) => match policy {
                    OutOfRangePolicy::Fail => {
                        tracing::error!(%err, "particle escaped the grid");
                        self.clear();
                        return Err(err);
                    }
                    OutOfRangePolicy::Clamp => {
                        tracing::warn!(%err, "clamping particle into the grid");
                        clamped += 1;
                        self.clamped_cells_for(particle)
                    }
                },
            };
            for (row, col) in range.iter() {
                self.cells[row * self.cols + col].push(index);
            }
        }

        Ok(clamped)
    }

    /// Add every pair of particles sharing a cell to `pairs`
    pub fn candidate_pairs(&self, pairs: &mut PairSet) {
        for members in &self.cells {
            for (n, &a) in members.iter().enumerate() {
                for &b in &members[n + 1..] {
                    pairs.insert(a, b);
                }
            }
        }
    }

    fn raw_span(&self, particle: &Particle) -> ((i64, i64), (i64, i64)) {
        let (min, max) = particle.bounds();
        let to_cell = |v: Vec2| {
            let cell = (v / self.cell_size).floor();
            (cell.y as i64, cell.x as i64)
        };
        (to_cell(min), to_cell(max))
    }

    fn clamp_span(&self, lo: (i64, i64), hi: (i64, i64)) -> CellRange {
        let clamp = |v: i64, count: usize| v.clamp(0, count as i64 - 1) as usize;
        CellRange {
            row_min: clamp(lo.0, self.rows),
            row_max: clamp(hi.0, self.rows),
            col_min: clamp(lo.1, self.cols),
            col_max: clamp(hi.1, self.cols),
        }
    }
}

fn cell_size_for(rows: usize, cols: usize, viewport: Viewport) -> Vec2 {
    let width = (viewport.width as usize).div_ceil(cols).max(1);
    let height = (viewport.height as usize).div_ceil(rows).max(1);
    Vec2::new(width as f32, height as f32)
}
