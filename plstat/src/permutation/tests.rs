// ======== Tests ==============================================

use rand::{rngs::StdRng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::diagram::PersistenceDiagram;
use crate::landscape::{Grid, Landscape};
use crate::labels::LabelSequence;
use crate::PlstatError;

use super::{
    draw_split, par_permutation_test, permutation_test, permutation_test_with_rng,
    PermutationConfig,
};

fn tent(height: f64) -> Landscape {
    let grid = Grid::new(0.0, 4.0, 5).unwrap();
    let values = vec![vec![0.0, height / 2.0, height, height / 2.0, 0.0]];
    Landscape::new(grid, 0, values).unwrap()
}

/// Landscapes built from small diagrams, each on the grid spanning its own diagram.
fn diagram_series(n: usize) -> Vec<Landscape> {
    (0..n)
        .map(|i| {
            let wobble = (i % 5) as f64 * 0.3;
            let diagram = PersistenceDiagram::from_pairs(vec![
                (0.0, 3.0 + wobble),
                (1.0, 2.0 + (i % 3) as f64),
                (0.5, f64::INFINITY),
            ])
            .unwrap();
            let grid = Grid::spanning(&diagram, 20 + i % 4).unwrap();
            Landscape::from_diagram(&diagram, 1, grid)
        })
        .collect()
}

fn alternating_truth(n: usize) -> LabelSequence {
    (0..n)
        .map(|i| if i % 3 == 0 { "beat" } else { "rest" })
        .collect()
}

#[test]
fn test_permutation_test_is_reproducible() {
    let landscapes = diagram_series(18);
    let truth = alternating_truth(18);
    let contrast = (&"rest".to_owned(), &"beat".to_owned());
    let config = PermutationConfig {
        num_perms: 150,
        seed: 42,
    };

    let first = permutation_test(&landscapes, &truth, contrast, &config).unwrap();
    let second = permutation_test(&landscapes, &truth, contrast, &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.num_perms, 150);
    assert!((0.0..=1.0).contains(&first.p_value));
    assert_eq!(first.p_value, first.exceed_count as f64 / 150.0);

    let other_seed = PermutationConfig { seed: 7, ..config };
    let other = permutation_test(&landscapes, &truth, contrast, &other_seed).unwrap();
    assert!((0.0..=1.0).contains(&other.p_value));
    // The observed statistic does not depend on the seed
    assert_eq!(other.significance, first.significance);
}

#[test]
fn test_default_config() {
    let config = PermutationConfig::default();
    assert_eq!(config.num_perms, 1500);
    assert_eq!(config.seed, 42);
}

#[test]
fn test_seeded_run_matches_injected_rng() {
    let landscapes = diagram_series(12);
    let truth = alternating_truth(12);
    let contrast = (&"rest".to_owned(), &"beat".to_owned());
    let config = PermutationConfig {
        num_perms: 60,
        seed: 3,
    };

    let seeded = permutation_test(&landscapes, &truth, contrast, &config).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let injected =
        permutation_test_with_rng(&landscapes, &truth, contrast, 60, &mut rng).unwrap();
    assert_eq!(seeded, injected);

    // Any random source can be injected
    let mut std_a = StdRng::seed_from_u64(11);
    let mut std_b = StdRng::seed_from_u64(11);
    let a = permutation_test_with_rng(&landscapes, &truth, contrast, 60, &mut std_a).unwrap();
    let b = permutation_test_with_rng(&landscapes, &truth, contrast, 60, &mut std_b).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_identical_groups_never_significant() {
    let group = [tent(1.0), tent(2.5), tent(4.0)];
    let landscapes: Vec<_> = group.iter().chain(group.iter()).cloned().collect();
    let truth = ["a", "a", "a", "b", "b", "b"];

    let outcome = permutation_test(
        &landscapes,
        &truth,
        (&"a", &"b"),
        &PermutationConfig {
            num_perms: 100,
            seed: 42,
        },
    )
    .unwrap();
    assert_eq!(outcome.significance, 0.0);
    // Ties count against significance
    assert_eq!(outcome.exceed_count, 100);
    assert_eq!(outcome.p_value, 1.0);
}

#[test]
fn test_exchangeable_groups_not_significant() {
    // Both parities hit every (i % 3, i % 5) combination once, in a different order
    let landscapes: Vec<_> = (0..30)
        .map(|i| tent(1.0 + (i % 3) as f64 + 0.1 * (i % 5) as f64))
        .collect();
    let truth: Vec<_> = (0..30)
        .map(|i| if i % 2 == 0 { "even" } else { "odd" })
        .collect();

    let outcome = permutation_test(
        &landscapes,
        &truth,
        (&"even", &"odd"),
        &PermutationConfig {
            num_perms: 300,
            seed: 42,
        },
    )
    .unwrap();
    assert!(outcome.significance < 1e-9);
    assert!(outcome.p_value > 0.9, "p = {}", outcome.p_value);
}

#[test]
fn test_separated_groups_are_significant() {
    let mut landscapes = vec![];
    let mut truth = vec![];
    for i in 0..8 {
        let jitter = i as f64 * 0.05;
        landscapes.push(tent(10.0 + jitter));
        truth.push("beat");
        landscapes.push(tent(1.0 + jitter));
        truth.push("rest");
    }

    let config = PermutationConfig {
        num_perms: 200,
        seed: 42,
    };
    let outcome = permutation_test(&landscapes, &truth, (&"beat", &"rest"), &config).unwrap();
    assert!((outcome.significance - 9.0).abs() < 1e-9);
    assert!(outcome.p_value < 0.05, "p={}", outcome.p_value);

    let parallel =
        par_permutation_test(&landscapes, &truth, (&"beat", &"rest"), &config).unwrap();
    assert_eq!(parallel.significance, outcome.significance);
    assert!(parallel.p_value < 0.05, "p={}", parallel.p_value);
}

#[test]
fn test_parallel_independent_of_thread_count() {
    let landscapes = diagram_series(15);
    let truth = alternating_truth(15);
    let contrast = (&"rest".to_owned(), &"beat".to_owned());
    let config = PermutationConfig {
        num_perms: 120,
        seed: 42,
    };

    let run_with_threads = |threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap()
            .install(|| par_permutation_test(&landscapes, &truth, contrast, &config).unwrap())
    };
    let single = run_with_threads(1);
    let several = run_with_threads(4);
    assert_eq!(single, several);
    assert!((0.0..=1.0).contains(&single.p_value));
}

#[test]
fn test_zero_permutations_rejected() {
    let landscapes = [tent(1.0), tent(2.0)];
    let truth = ["a", "b"];
    let config = PermutationConfig {
        num_perms: 0,
        seed: 42,
    };
    assert_eq!(
        permutation_test(&landscapes, &truth, (&"a", &"b"), &config),
        Err(PlstatError::NoPermutations)
    );
    assert_eq!(
        par_permutation_test(&landscapes, &truth, (&"a", &"b"), &config),
        Err(PlstatError::NoPermutations)
    );
}

#[test]
fn test_bad_labels_rejected() {
    let landscapes = [tent(1.0), tent(2.0), tent(3.0)];
    let config = PermutationConfig::default();

    assert_eq!(
        permutation_test(&landscapes, &["a", "b", "a"], (&"a", &"c"), &config),
        Err(PlstatError::UnknownLabel("c".to_owned()))
    );
    assert_eq!(
        permutation_test(&landscapes, &["a", "b"], (&"a", &"b"), &config),
        Err(PlstatError::LengthMismatch {
            items: 3,
            labels: 2
        })
    );
}

#[test]
fn test_draw_split_sizes() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for n in [1, 2, 5, 6, 11] {
        let in_a = draw_split(n, &mut rng);
        assert_eq!(in_a.len(), n);
        assert_eq!(in_a.iter().filter(|in_a| **in_a).count(), n / 2);
    }
}
