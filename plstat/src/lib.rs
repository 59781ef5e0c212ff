//! Statistics on persistence landscapes.
//!
//! A [`Landscape`](landscape::Landscape) is a stack of depth levels, each sampled on a shared
//! [`Grid`](landscape::Grid). This crate provides the operations needed to compare two labelled
//! groups of landscapes:
//! * [`select`](labels::select) picks the landscapes carrying a given label;
//! * [`average`](ops::average) computes the mean landscape of a group;
//! * [`snap`](ops::snap) resamples landscapes onto a common grid so they can be subtracted;
//! * [`pad_flatten`](ops::pad_flatten) turns a batch into equal-length vectors for a classifier;
//! * [`permutation_test`](permutation::permutation_test) produces an empirical p-value for the
//!   sup-norm distance between the group averages.
//!
//! Persistence diagrams are taken as input; computing persistent homology is left to other crates.

use thiserror::Error;

pub mod diagram;
pub mod labels;
pub mod landscape;
pub mod ops;
pub mod permutation;

pub use diagram::PersistenceDiagram;
pub use labels::{select, LabelSequence};
pub use landscape::{Discretization, Grid, Landscape};
pub use ops::{average, labelled_batch, pad_flatten, snap};
pub use permutation::{
    par_permutation_test, permutation_test, permutation_test_with_rng, PermutationConfig,
    PermutationOutcome,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlstatError {
    #[error("found {items} items but {labels} labels, lengths must agree")]
    LengthMismatch { items: usize, labels: usize },
    #[error("operation requires at least one landscape")]
    EmptyInputSet,
    #[error("landscapes are sampled on different grids, snap them first")]
    IncompatibleGrid,
    #[error("expected landscapes in homological degree {expected}, found {found}")]
    HomDegreeMismatch { expected: usize, found: usize },
    #[error("label {0:?} does not occur in the ground-truth sequence")]
    UnknownLabel(String),
    #[error("invalid grid: start={start}, stop={stop}, num_steps={num_steps}")]
    InvalidGrid {
        start: f64,
        stop: f64,
        num_steps: usize,
    },
    #[error("depth level {depth} has {found} samples, grid has {expected}")]
    RaggedLevel {
        depth: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid persistence pair ({birth}, {death})")]
    InvalidPair { birth: f64, death: f64 },
    #[error("a permutation test needs at least one permutation")]
    NoPermutations,
}

pub type Result<T> = std::result::Result<T, PlstatError>;
