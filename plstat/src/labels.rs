//! Label sequences and selection of labelled landscapes.

use std::fmt::Display;
use std::ops::Deref;

use rustc_hash::FxHashSet;

use crate::{PlstatError, Result};

/// Picks the entries of `items` whose parallel label equals `target`, keeping their order.
///
/// Fails with [`PlstatError::LengthMismatch`] unless there is exactly one label per item.
/// A label without matches simply yields an empty selection.
pub fn select<'a, T, L>(items: &'a [T], labels: &[L], target: &L) -> Result<Vec<&'a T>>
where
    L: PartialEq,
{
    if items.len() != labels.len() {
        return Err(PlstatError::LengthMismatch {
            items: items.len(),
            labels: labels.len(),
        });
    }
    Ok(items
        .iter()
        .zip(labels)
        .filter(|(_, label)| *label == target)
        .map(|(item, _)| item)
        .collect())
}

/// As [`select`], but a `target` with no matches is reported as [`PlstatError::UnknownLabel`].
pub fn select_present<'a, T, L>(items: &'a [T], labels: &[L], target: &L) -> Result<Vec<&'a T>>
where
    L: PartialEq + Display,
{
    let selected = select(items, labels, target)?;
    if selected.is_empty() {
        return Err(PlstatError::UnknownLabel(target.to_string()));
    }
    Ok(selected)
}

/// A ground-truth labelling, one tag per time index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSequence(Vec<String>);

impl LabelSequence {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    /// Builds a schedule from consecutive runs, e.g. `[("rest", 3), ("beat", 13)]`.
    pub fn from_blocks<S: AsRef<str>>(blocks: &[(S, usize)]) -> Self {
        Self(
            blocks
                .iter()
                .flat_map(|(label, count)| {
                    std::iter::repeat(label.as_ref().to_owned()).take(*count)
                })
                .collect(),
        )
    }

    /// The sequence tiled `times` times, for series built by concatenating several runs.
    pub fn repeat(&self, times: usize) -> Self {
        Self(
            std::iter::repeat(self.0.iter().cloned())
                .take(times)
                .flatten()
                .collect(),
        )
    }

    pub fn vocabulary(&self) -> FxHashSet<&str> {
        self.0.iter().map(String::as_str).collect()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|l| l == label)
    }

    pub fn count(&self, label: &str) -> usize {
        self.0.iter().filter(|l| *l == label).count()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// [`select_present`] against this labelling.
    pub fn select<'a, T>(&self, items: &'a [T], target: &str) -> Result<Vec<&'a T>> {
        select_present(items, &self.0, &target.to_owned())
    }
}

impl Deref for LabelSequence {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for LabelSequence {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
