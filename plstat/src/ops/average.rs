use crate::{landscape::Landscape, PlstatError, Result};

/// Pointwise mean of a set of landscapes sharing one grid and homological degree.
///
/// Level `k` of the result is the mean of level `k` across the inputs, where a landscape with
/// fewer than `k + 1` levels contributes zeros. The result has the depth of the deepest input.
pub fn average<'a>(landscapes: impl IntoIterator<Item = &'a Landscape>) -> Result<Landscape> {
    let mut landscapes = landscapes.into_iter();
    let first = landscapes.next().ok_or(PlstatError::EmptyInputSet)?;
    let grid = *first.grid();
    let hom_deg = first.hom_deg();

    let mut sums = first.values().to_vec();
    let mut count = 1_usize;
    for landscape in landscapes {
        if !landscape.shares_grid(first) {
            return Err(PlstatError::IncompatibleGrid);
        }
        if landscape.hom_deg() != hom_deg {
            return Err(PlstatError::HomDegreeMismatch {
                expected: hom_deg,
                found: landscape.hom_deg(),
            });
        }
        if landscape.max_depth() > sums.len() {
            sums.resize(landscape.max_depth(), vec![0.0; grid.num_steps()]);
        }
        for (sum, level) in sums.iter_mut().zip(landscape.values()) {
            for (total, value) in sum.iter_mut().zip(level) {
                *total += value;
            }
        }
        count += 1;
    }

    Ok(Landscape::from_raw(grid, hom_deg, sums).scaled(1.0 / count as f64))
}
