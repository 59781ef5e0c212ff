use crate::{
    landscape::{Grid, Landscape},
    PlstatError, Result,
};

/// Resamples landscapes onto one common grid and depth so that they can be combined pointwise.
///
/// The common grid spans from the smallest `start` to the largest `stop` at the largest
/// `num_steps` among the inputs (see [`Grid::union`]). Samples are linearly interpolated and
/// taken to be zero outside a landscape's original domain. Every output is then padded with
/// zero levels to the largest depth among the inputs.
///
/// Snapping an already snapped set returns it unchanged.
pub fn snap<'a>(landscapes: impl IntoIterator<Item = &'a Landscape>) -> Result<Vec<Landscape>> {
    let landscapes: Vec<&Landscape> = landscapes.into_iter().collect();
    let grid = Grid::union(landscapes.iter().map(|landscape| landscape.grid()))
        .ok_or(PlstatError::EmptyInputSet)?;
    Ok(snap_to(landscapes, grid))
}

/// As [`snap`] but onto a caller-chosen grid.
pub fn snap_to<'a>(
    landscapes: impl IntoIterator<Item = &'a Landscape>,
    grid: Grid,
) -> Vec<Landscape> {
    let resampled: Vec<Landscape> = landscapes
        .into_iter()
        .map(|landscape| resample(landscape, &grid))
        .collect();
    let max_depth = resampled
        .iter()
        .map(Landscape::max_depth)
        .max()
        .unwrap_or(0);
    resampled
        .into_iter()
        .map(|landscape| {
            if landscape.max_depth() == max_depth {
                landscape
            } else {
                landscape.padded_to_depth(max_depth)
            }
        })
        .collect()
}

fn resample(landscape: &Landscape, grid: &Grid) -> Landscape {
    if landscape.grid() == grid {
        return landscape.clone();
    }
    let source: Vec<f64> = landscape.grid().points().collect();
    let target: Vec<f64> = grid.points().collect();
    let values = landscape
        .values()
        .iter()
        .map(|level| {
            target
                .iter()
                .map(|&x| interpolate(x, &source, level))
                .collect()
        })
        .collect();
    Landscape::from_raw(*grid, landscape.hom_deg(), values)
}

/// Piecewise linear interpolation of the samples `(xs[i], ys[i])` at `x`, zero outside `xs`.
/// `xs` must be strictly increasing.
fn interpolate(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    // Number of sample positions at or left of x
    let right = xs.partition_point(|&p| p <= x);
    if right == 0 {
        return 0.0;
    }
    let left = right - 1;
    if xs[left] == x {
        return ys[left];
    }
    if right == xs.len() {
        return 0.0;
    }
    let slope = (ys[right] - ys[left]) / (xs[right] - xs[left]);
    ys[left] + slope * (x - xs[left])
}
