use std::fmt::Display;

use crate::{labels::select_present, landscape::Landscape, PlstatError, Result};

use super::snap;

/// Flattens a batch of landscapes into vectors of one common length.
///
/// The batch is first [`snap`]ped onto a common grid. Each landscape is then flattened
/// depth-major and zero-padded up to `max_depth * num_steps`, where `max_depth` is the
/// largest depth in the batch.
pub fn pad_flatten<'a>(
    landscapes: impl IntoIterator<Item = &'a Landscape>,
) -> Result<Vec<Vec<f64>>> {
    let snapped = snap(landscapes)?;
    let max_depth = snapped
        .iter()
        .map(Landscape::max_depth)
        .max()
        .ok_or(PlstatError::EmptyInputSet)?;
    let num_steps = snapped[0].num_steps();
    let length = max_depth * num_steps;
    log::debug!(
        "Flattening {} landscapes to length {length} ({max_depth} x {num_steps})",
        snapped.len()
    );

    Ok(snapped
        .iter()
        .map(|landscape| {
            let mut flat = landscape.flatten();
            if landscape.max_depth() < max_depth {
                flat.resize(length, 0.0);
            }
            flat
        })
        .collect())
}

/// Flattened vectors paired 1:1 with their labels, ready for a vector-space classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelledBatch<L> {
    pub vectors: Vec<Vec<f64>>,
    pub labels: Vec<L>,
}

impl<L> LabelledBatch<L> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Length shared by every vector in the batch.
    pub fn dimension(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }
}

/// Gathers the landscapes labelled with each of `targets` (in `targets` order), flattens them
/// together with [`pad_flatten`] and returns the vectors alongside their labels.
pub fn labelled_batch<L>(
    landscapes: &[Landscape],
    truth: &[L],
    targets: &[L],
) -> Result<LabelledBatch<L>>
where
    L: PartialEq + Clone + Display,
{
    let mut selected = vec![];
    let mut labels = vec![];
    for target in targets {
        let group = select_present(landscapes, truth, target)?;
        labels.extend(std::iter::repeat(target.clone()).take(group.len()));
        selected.extend(group);
    }
    let vectors = pad_flatten(selected)?;
    Ok(LabelledBatch { vectors, labels })
}

#[cfg(test)]
mod tests {
    use super::{labelled_batch, pad_flatten};
    use crate::{
        landscape::{Grid, Landscape},
        test_utils::{assert_close, landscape},
        PlstatError,
    };

    #[test]
    fn test_pad_flatten() {
        let p = landscape(
            0.0,
            5.0,
            vec![
                vec![0.0, 1.0, 2.0, 2.0, 1.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
            ],
        );
        let q = landscape(0.0, 4.0, vec![vec![0.0, 1.0, 1.0, 0.0]]);
        let flat = pad_flatten([&p, &q]).unwrap();
        assert_eq!(flat.len(), 2);
        assert_close(
            &flat[0],
            &[0.0, 1.0, 2.0, 2.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
        );
        assert_close(
            &flat[1],
            &[0.0, 0.75, 1.0, 0.75, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        );
    }

    #[test]
    fn test_pad_flatten_equal_lengths() {
        let grid = Grid::new(0.0, 10.0, 11).unwrap();
        let batch = vec![
            Landscape::zero(grid, 0),
            landscape(0.0, 3.0, vec![vec![0.0, 1.0, 1.0, 0.0]; 3]),
            landscape(2.0, 12.0, vec![vec![0.0, 2.0, 0.0]]),
        ];
        let flat = pad_flatten(&batch).unwrap();
        // Common grid is [0, 12] with 11 samples, deepest landscape has 3 levels
        assert!(flat.iter().all(|v| v.len() == 3 * 11));
        assert!(flat[0].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_pad_flatten_empty() {
        assert_eq!(
            pad_flatten(Vec::<&Landscape>::new()),
            Err(PlstatError::EmptyInputSet)
        );
    }

    #[test]
    fn test_labelled_batch() {
        let grid = Grid::new(0.0, 2.0, 3).unwrap();
        let make = |height: f64| Landscape::new(grid, 0, vec![vec![0.0, height, 0.0]]).unwrap();
        let landscapes = vec![make(1.0), make(2.0), make(3.0), make(4.0)];
        let truth = ["rest", "beat", "rest", "random"];

        let batch = labelled_batch(&landscapes, &truth, &["beat", "rest"]).unwrap();
        assert_eq!(batch.labels, vec!["beat", "rest", "rest"]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.dimension(), 3);
        assert_close(&batch.vectors[0], &[0.0, 2.0, 0.0]);
        assert_close(&batch.vectors[1], &[0.0, 1.0, 0.0]);
        assert_close(&batch.vectors[2], &[0.0, 3.0, 0.0]);

        assert_eq!(
            labelled_batch(&landscapes, &truth, &["rest", "sleep"]),
            Err(PlstatError::UnknownLabel("sleep".to_owned()))
        );
        assert!(matches!(
            labelled_batch(&landscapes, &truth[..3], &["rest"]),
            Err(PlstatError::LengthMismatch { .. })
        ));
    }
}
