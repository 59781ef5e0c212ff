//! Permutation test for a difference between two groups of landscapes.
//!
//! The observed statistic is the sup-norm of the difference between the two group averages.
//! The null distribution comes from repeatedly pooling both groups, drawing a random half
//! (rounded down) as the first group and the remainder as the second, and recomputing the
//! statistic. The p-value is the fraction of shuffles whose statistic is at least the observed one.
//!
//! Three entry points share this procedure:
//! * [`permutation_test`] seeds a [`ChaCha8Rng`] once and draws every shuffle from it;
//! * [`permutation_test_with_rng`] does the same with a caller-supplied random source;
//! * [`par_permutation_test`] gives shuffle `i` its own stream `i` of a [`ChaCha8Rng`] seeded
//!   with the master seed, so the result does not depend on the number of rayon workers.

use std::fmt::Display;

use itertools::{Either, Itertools};
use log::{debug, info, trace};
use rand::{seq::index, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::{
    labels::select_present,
    landscape::Landscape,
    ops::{average, snap},
    PlstatError, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationConfig {
    pub num_perms: usize,
    pub seed: u64,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            num_perms: 1500,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermutationOutcome {
    /// `exceed_count / num_perms`, always in `[0, 1]`.
    pub p_value: f64,
    /// Sup-norm distance between the averages under the true labelling.
    pub significance: f64,
    /// Number of shuffles whose statistic was `>= significance`.
    pub exceed_count: usize,
    pub num_perms: usize,
}

impl PermutationOutcome {
    fn new(significance: f64, exceed_count: usize, num_perms: usize) -> Self {
        Self {
            p_value: exceed_count as f64 / num_perms as f64,
            significance,
            exceed_count,
            num_perms,
        }
    }
}

/// Tests whether the landscapes labelled `contrast.0` differ from those labelled `contrast.1`.
///
/// `truth` holds one label per landscape. Both contrast labels must occur in `truth`,
/// otherwise [`PlstatError::UnknownLabel`] is returned.
pub fn permutation_test<L>(
    landscapes: &[Landscape],
    truth: &[L],
    contrast: (&L, &L),
    config: &PermutationConfig,
) -> Result<PermutationOutcome>
where
    L: PartialEq + Display,
{
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    permutation_test_with_rng(landscapes, truth, contrast, config.num_perms, &mut rng)
}

/// As [`permutation_test`], drawing every shuffle in turn from `rng`.
pub fn permutation_test_with_rng<L, R>(
    landscapes: &[Landscape],
    truth: &[L],
    contrast: (&L, &L),
    num_perms: usize,
    rng: &mut R,
) -> Result<PermutationOutcome>
where
    L: PartialEq + Display,
    R: Rng + ?Sized,
{
    if num_perms == 0 {
        return Err(PlstatError::NoPermutations);
    }
    let groups = Groups::select(landscapes, truth, contrast)?;
    let significance = groups.observed_separation()?;

    let mut exceed_count = 0;
    for perm in 0..num_perms {
        let shuffled = groups.shuffled_separation(rng)?;
        trace!("Permutation {perm}: separation {shuffled}");
        if shuffled >= significance {
            exceed_count += 1;
        }
    }

    let outcome = PermutationOutcome::new(significance, exceed_count, num_perms);
    info!(
        "{} vs {}: p={} ({exceed_count}/{num_perms})",
        contrast.0, contrast.1, outcome.p_value
    );
    Ok(outcome)
}

/// Parallel [`permutation_test`], reproducible for a given seed regardless of thread count.
///
/// Shuffle `i` draws from stream `i` of a [`ChaCha8Rng`] seeded with `config.seed`, so the
/// shuffles (and the p-value) differ from those of the sequential [`permutation_test`].
pub fn par_permutation_test<L>(
    landscapes: &[Landscape],
    truth: &[L],
    contrast: (&L, &L),
    config: &PermutationConfig,
) -> Result<PermutationOutcome>
where
    L: PartialEq + Display,
{
    if config.num_perms == 0 {
        return Err(PlstatError::NoPermutations);
    }
    let groups = Groups::select(landscapes, truth, contrast)?;
    let significance = groups.observed_separation()?;

    let exceed_count = (0..config.num_perms)
        .into_par_iter()
        .map(|perm| {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            rng.set_stream(perm as u64);
            let shuffled = groups.shuffled_separation(&mut rng)?;
            Ok(usize::from(shuffled >= significance))
        })
        .sum::<Result<usize>>()?;

    let outcome = PermutationOutcome::new(significance, exceed_count, config.num_perms);
    info!(
        "{} vs {}: p={} ({exceed_count}/{}, parallel)",
        contrast.0, contrast.1, outcome.p_value, config.num_perms
    );
    Ok(outcome)
}

/// Both groups pooled onto one grid; the first `split` landscapes carry the first label.
struct Groups {
    pooled: Vec<Landscape>,
    split: usize,
}

impl Groups {
    fn select<L>(landscapes: &[Landscape], truth: &[L], contrast: (&L, &L)) -> Result<Self>
    where
        L: PartialEq + Display,
    {
        let group_a = select_present(landscapes, truth, contrast.0)?;
        let group_b = select_present(landscapes, truth, contrast.1)?;
        debug!(
            "Contrasting {} landscapes labelled {} against {} labelled {}",
            group_a.len(),
            contrast.0,
            group_b.len(),
            contrast.1
        );
        let split = group_a.len();
        // Averages of arbitrary subsets must be defined, so put everything on one grid up front
        let pooled = snap(group_a.into_iter().chain(group_b))?;
        Ok(Self { pooled, split })
    }

    fn observed_separation(&self) -> Result<f64> {
        let (group_a, group_b) = self.pooled.split_at(self.split);
        let significance = separation(group_a, group_b)?;
        info!("Observed separation {significance}");
        Ok(significance)
    }

    fn shuffled_separation<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        let in_a = draw_split(self.pooled.len(), rng);
        let (group_a, group_b): (Vec<&Landscape>, Vec<&Landscape>) = self
            .pooled
            .iter()
            .zip(in_a)
            .partition_map(|(landscape, in_a)| {
                if in_a {
                    Either::Left(landscape)
                } else {
                    Either::Right(landscape)
                }
            });
        separation(group_a, group_b)
    }
}

/// Membership mask for a uniformly random subset of size `n / 2`.
/// For odd `n` the second group receives the extra element.
fn draw_split<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<bool> {
    let mut in_a = vec![false; n];
    for i in index::sample(rng, n, n / 2) {
        in_a[i] = true;
    }
    in_a
}

/// Sup-norm of the difference between the averages of two groups.
fn separation<'a>(
    group_a: impl IntoIterator<Item = &'a Landscape>,
    group_b: impl IntoIterator<Item = &'a Landscape>,
) -> Result<f64> {
    let avg_a = average(group_a)?;
    let avg_b = average(group_b)?;
    let snapped = snap([&avg_a, &avg_b])?;
    Ok(snapped[0].try_sub(&snapped[1])?.sup_norm())
}

#[cfg(test)]
mod tests;
