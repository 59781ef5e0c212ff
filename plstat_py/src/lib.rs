use plstat::{
    Discretization, Grid, Landscape, PermutationConfig, PersistenceDiagram, PlstatError,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// A landscape as seen from Python: `(start, stop, num_steps, hom_deg, values)`.
type PyLandscape = (f64, f64, usize, usize, Vec<Vec<f64>>);

fn to_py_err(err: PlstatError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn to_landscapes(landscapes: Vec<PyLandscape>) -> PyResult<Vec<Landscape>> {
    landscapes
        .into_iter()
        .map(|(start, stop, num_steps, hom_deg, values)| {
            let grid = Grid::new(start, stop, num_steps)?;
            Landscape::new(grid, hom_deg, values)
        })
        .collect::<Result<_, _>>()
        .map_err(to_py_err)
}

fn to_py_landscape(landscape: Landscape) -> PyLandscape {
    let grid = *landscape.grid();
    (
        grid.start(),
        grid.stop(),
        grid.num_steps(),
        landscape.hom_deg(),
        landscape.into_values(),
    )
}

#[pyfunction]
#[pyo3(signature = (pairs, hom_deg=0, start=None, stop=None, num_steps=500))]
fn landscape_from_diagram(
    pairs: Vec<(f64, f64)>,
    hom_deg: usize,
    start: Option<f64>,
    stop: Option<f64>,
    num_steps: usize,
) -> PyResult<PyLandscape> {
    let diagram = PersistenceDiagram::from_pairs(pairs).map_err(to_py_err)?;
    let discretization = Discretization {
        start,
        stop,
        num_steps,
    };
    let landscape = discretization
        .landscape(&diagram, hom_deg)
        .map_err(to_py_err)?;
    Ok(to_py_landscape(landscape))
}

#[pyfunction]
fn pad_flatten(landscapes: Vec<PyLandscape>) -> PyResult<Vec<Vec<f64>>> {
    let landscapes = to_landscapes(landscapes)?;
    plstat::pad_flatten(&landscapes).map_err(to_py_err)
}

#[pyfunction]
fn average(landscapes: Vec<PyLandscape>) -> PyResult<PyLandscape> {
    let landscapes = to_landscapes(landscapes)?;
    let snapped = plstat::snap(&landscapes).map_err(to_py_err)?;
    let mean = plstat::average(&snapped).map_err(to_py_err)?;
    Ok(to_py_landscape(mean))
}

/// Returns the p-value of the permutation test contrasting `contrast[0]` against `contrast[1]`.
#[pyfunction]
#[pyo3(signature = (landscapes, truth, contrast, num_perms=1500, seed=42, parallel=false))]
fn permutation_test(
    py: Python<'_>,
    landscapes: Vec<PyLandscape>,
    truth: Vec<String>,
    contrast: (String, String),
    num_perms: usize,
    seed: u64,
    parallel: bool,
) -> PyResult<f64> {
    let landscapes = to_landscapes(landscapes)?;
    let config = PermutationConfig { num_perms, seed };
    let contrast = (&contrast.0, &contrast.1);
    let outcome = py
        .allow_threads(|| {
            if parallel {
                plstat::par_permutation_test(&landscapes, &truth, contrast, &config)
            } else {
                plstat::permutation_test(&landscapes, &truth, contrast, &config)
            }
        })
        .map_err(to_py_err)?;
    log::debug!("Permutation test finished: {outcome:?}");
    Ok(outcome.p_value)
}

#[pymodule]
fn plstat_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(landscape_from_diagram, m)?)?;
    m.add_function(wrap_pyfunction!(pad_flatten, m)?)?;
    m.add_function(wrap_pyfunction!(average, m)?)?;
    m.add_function(wrap_pyfunction!(permutation_test, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use plstat::{Grid, Landscape};

    use crate::{to_landscapes, to_py_landscape};

    #[test]
    fn test_landscape_keeps_hom_deg() {
        let grid = Grid::new(0.0, 2.0, 3).unwrap();
        let landscape = Landscape::new(grid, 1, vec![vec![0.0, 1.0, 0.0]]).unwrap();
        let py_landscape = to_py_landscape(landscape.clone());
        assert_eq!(py_landscape.3, 1);

        let back = to_landscapes(vec![py_landscape]).unwrap();
        assert_eq!(back, vec![landscape]);
    }
}
