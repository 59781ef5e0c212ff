//! Discretised persistence landscapes.
//!
//! A [`Landscape`] stores its depth levels as samples on an evenly spaced [`Grid`].
//! Level `0` is the largest landscape function, level `1` the second largest and so on.
//! Two landscapes can only be combined pointwise when they share the same grid, see
//! [`snap`](crate::ops::snap) for bringing landscapes onto a common grid.

use ordered_float::OrderedFloat;

use crate::{diagram::PersistenceDiagram, PlstatError, Result};

/// `num_steps` evenly spaced sample positions covering `[start, stop]`, both ends included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    start: f64,
    stop: f64,
    num_steps: usize,
}

impl Grid {
    pub fn new(start: f64, stop: f64, num_steps: usize) -> Result<Self> {
        if !start.is_finite() || !stop.is_finite() || start >= stop || num_steps == 0 {
            return Err(PlstatError::InvalidGrid {
                start,
                stop,
                num_steps,
            });
        }
        Ok(Self {
            start,
            stop,
            num_steps,
        })
    }

    /// Grid running from the earliest birth to the latest death in the diagram.
    /// Essential pairs only contribute their birth.
    pub fn spanning(diagram: &PersistenceDiagram, num_steps: usize) -> Result<Self> {
        if diagram.is_empty() {
            return Err(PlstatError::EmptyInputSet);
        }
        let start = diagram
            .pairs()
            .iter()
            .map(|pair| pair.birth)
            .min()
            .map_or(0.0, |birth| birth.into_inner());
        let stop = diagram
            .pairs()
            .iter()
            .map(|pair| {
                if pair.is_essential() {
                    pair.birth
                } else {
                    pair.death
                }
            })
            .max()
            .map_or(0.0, |death| death.into_inner());
        Self::new(start, stop, num_steps)
    }

    /// Smallest grid covering every input grid at the finest resolution among them.
    /// Returns `None` when there are no grids.
    pub fn union<'a>(grids: impl IntoIterator<Item = &'a Grid>) -> Option<Self> {
        grids.into_iter().copied().reduce(|acc, grid| Self {
            start: acc.start.min(grid.start),
            stop: acc.stop.max(grid.stop),
            num_steps: acc.num_steps.max(grid.num_steps),
        })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn stop(&self) -> f64 {
        self.stop
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Spacing between consecutive samples.
    /// A single-sample grid is treated as one cell spanning the whole domain.
    pub fn step(&self) -> f64 {
        if self.num_steps > 1 {
            (self.stop - self.start) / (self.num_steps - 1) as f64
        } else {
            self.stop - self.start
        }
    }

    /// Sample positions, the final one being exactly `stop`.
    pub fn points(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        let step = self.step();
        let last = self.num_steps - 1;
        (0..self.num_steps).map(move |i| {
            if i == last && last > 0 {
                self.stop
            } else {
                self.start + i as f64 * step
            }
        })
    }
}

/// How to choose the grid when building a landscape from a diagram.
/// Bounds left as `None` are taken from the diagram, see [`Grid::spanning`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Discretization {
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub num_steps: usize,
}

impl Default for Discretization {
    fn default() -> Self {
        Self {
            start: None,
            stop: None,
            num_steps: 500,
        }
    }
}

impl Discretization {
    pub fn grid_for(&self, diagram: &PersistenceDiagram) -> Result<Grid> {
        match (self.start, self.stop) {
            (Some(start), Some(stop)) => Grid::new(start, stop, self.num_steps),
            (start, stop) => {
                let span = Grid::spanning(diagram, self.num_steps)?;
                Grid::new(
                    start.unwrap_or(span.start),
                    stop.unwrap_or(span.stop),
                    self.num_steps,
                )
            }
        }
    }

    pub fn landscape(&self, diagram: &PersistenceDiagram, hom_deg: usize) -> Result<Landscape> {
        Ok(Landscape::from_diagram(diagram, hom_deg, self.grid_for(diagram)?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Landscape {
    grid: Grid,
    hom_deg: usize,
    values: Vec<Vec<f64>>,
}

impl Landscape {
    /// Every level must have exactly `grid.num_steps()` samples.
    pub fn new(grid: Grid, hom_deg: usize, values: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((depth, level)) = values
            .iter()
            .enumerate()
            .find(|(_, level)| level.len() != grid.num_steps)
        {
            return Err(PlstatError::RaggedLevel {
                depth,
                expected: grid.num_steps,
                found: level.len(),
            });
        }
        Ok(Self::from_raw(grid, hom_deg, values))
    }

    /// Landscape with no depth levels, i.e. identically zero.
    pub fn zero(grid: Grid, hom_deg: usize) -> Self {
        Self::from_raw(grid, hom_deg, vec![])
    }

    pub(crate) fn from_raw(grid: Grid, hom_deg: usize, values: Vec<Vec<f64>>) -> Self {
        Self {
            grid,
            hom_deg,
            values,
        }
    }

    /// Samples the landscape of `diagram` on `grid`.
    ///
    /// Each pair contributes the tent `min(x - birth, death - x)` at every sample `x` where it is
    /// positive, essential classes dying at the end of the grid. At every sample the tent heights
    /// are sorted in decreasing order, the `k`-th largest forming depth level `k`.
    pub fn from_diagram(diagram: &PersistenceDiagram, hom_deg: usize, grid: Grid) -> Self {
        let points: Vec<f64> = grid.points().collect();
        let mut heights: Vec<Vec<OrderedFloat<f64>>> = vec![vec![]; grid.num_steps];

        for pair in diagram.pairs() {
            let birth = pair.birth.into_inner();
            let death = pair.death.into_inner().min(grid.stop);
            for (column, &x) in heights.iter_mut().zip(&points) {
                let height = (x - birth).min(death - x);
                if height > 0.0 {
                    column.push(OrderedFloat(height));
                }
            }
        }

        let max_depth = heights.iter().map(Vec::len).max().unwrap_or(0);
        let mut values = vec![vec![0.0; grid.num_steps]; max_depth];
        for (i, column) in heights.iter_mut().enumerate() {
            column.sort_unstable_by(|a, b| b.cmp(a));
            for (depth, height) in column.iter().enumerate() {
                values[depth][i] = height.into_inner();
            }
        }
        log::trace!(
            "Built landscape from {} pairs with depth {max_depth}",
            diagram.len()
        );

        Self::from_raw(grid, hom_deg, values)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn hom_deg(&self) -> usize {
        self.hom_deg
    }

    pub fn num_steps(&self) -> usize {
        self.grid.num_steps
    }

    pub fn max_depth(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Vec<f64>> {
        self.values
    }

    pub fn level(&self, depth: usize) -> Option<&[f64]> {
        self.values.get(depth).map(Vec::as_slice)
    }

    /// True when the two landscapes can be combined pointwise.
    pub fn shares_grid(&self, other: &Landscape) -> bool {
        self.grid == other.grid
    }

    /// Largest absolute sample over all levels, `0.0` for a landscape with no levels.
    pub fn sup_norm(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .map(|value| OrderedFloat(value.abs()))
            .max()
            .map_or(0.0, OrderedFloat::into_inner)
    }

    /// Discrete `L^p` norm, treating each sample as a cell of width [`Grid::step`].
    pub fn p_norm(&self, p: f64) -> f64 {
        if p.is_infinite() {
            return self.sup_norm();
        }
        let total: f64 = self
            .values
            .iter()
            .flatten()
            .map(|value| value.abs().powf(p))
            .sum();
        (total * self.grid.step()).powf(1.0 / p)
    }

    /// Pointwise difference `self - other`. The shallower landscape is extended with zero levels.
    pub fn try_sub(&self, other: &Landscape) -> Result<Landscape> {
        if !self.shares_grid(other) {
            return Err(PlstatError::IncompatibleGrid);
        }
        if self.hom_deg != other.hom_deg {
            return Err(PlstatError::HomDegreeMismatch {
                expected: self.hom_deg,
                found: other.hom_deg,
            });
        }
        let depth = self.max_depth().max(other.max_depth());
        let lhs = self.padded_to_depth(depth);
        let rhs = other.padded_to_depth(depth);
        let values = lhs
            .values
            .iter()
            .zip(&rhs.values)
            .map(|(l, r)| l.iter().zip(r).map(|(l, r)| l - r).collect())
            .collect();
        Ok(Self::from_raw(self.grid, self.hom_deg, values))
    }

    pub fn scaled(mut self, factor: f64) -> Landscape {
        self.values
            .iter_mut()
            .flatten()
            .for_each(|value| *value *= factor);
        self
    }

    /// Appends zero levels until the landscape has `depth` levels. Never removes levels.
    pub fn padded_to_depth(&self, depth: usize) -> Landscape {
        let mut padded = self.clone();
        if depth > padded.values.len() {
            padded
                .values
                .resize(depth, vec![0.0; self.grid.num_steps]);
        }
        padded
    }

    /// Concatenates the levels, depth-major.
    pub fn flatten(&self) -> Vec<f64> {
        self.values.concat()
    }

    /// Each level as `(x, value)` pairs along the grid.
    pub fn values_to_pairs(&self) -> Vec<Vec<(f64, f64)>> {
        self.values
            .iter()
            .map(|level| self.grid.points().zip(level.iter().copied()).collect())
            .collect()
    }
}
