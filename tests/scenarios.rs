//! End-to-end editing scenarios with hand-checked outcomes.

use std::collections::HashSet;

use dropreg::{
    Dataset, DropEngine, EditError, Instance, InstanceSelector, Phase, SelectorConfig, Variant,
};
use rand::prelude::*;

/// x = 2^i - 1: every gap is larger than all gaps before it, so no ties.
fn doubling_line(targets: &[f64]) -> Dataset {
    targets
        .iter()
        .enumerate()
        .map(|(i, &y)| Instance::new(vec![(1u64 << i) as f64 - 1.0, 0.0], y))
        .collect()
}

fn random_dataset(n: usize, dim: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let features: Vec<f64> = (0..dim).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let target = features.iter().sum::<f64>() + rng.gen_range(-0.1..0.1);
            Instance::new(features, target)
        })
        .collect()
}

fn assert_subset_without_duplicates(indices: &[usize], n: usize) {
    let unique: HashSet<_> = indices.iter().collect();
    assert_eq!(unique.len(), indices.len(), "duplicate output index");
    assert!(indices.iter().all(|&i| i < n), "index out of range");
}

// =============================================================================
// Hand-checked scenarios
// =============================================================================

#[test]
fn outlier_is_removed_by_threshold_drop() {
    let mut targets: Vec<f64> = (0..10).map(|i| 1.0 + 0.01 * i as f64).collect();
    targets[0] = 100.0;

    let mut engine = DropEngine::new(Variant::DropThreshold);
    engine.reset_with_identity(doubling_line(&targets)).unwrap();
    engine.all_steps().unwrap();

    assert!(!engine.output_indices().contains(&0));
    assert_subset_without_duplicates(engine.output_indices(), 10);
}

#[test]
fn error_drop_reaches_a_fixed_point() {
    // a(0, y=0), b(1, y=0), c(3, y=10): c is explained by nobody's loss.
    let data: Dataset = [(0.0, 0.0), (1.0, 0.0), (3.0, 10.0)]
        .iter()
        .map(|&(x, y)| Instance::new(vec![x], y))
        .collect();

    let mut engine = DropEngine::new(Variant::DropError);
    engine.set_alpha(0.0).unwrap();
    engine.reset_with_identity(data).unwrap();
    engine.all_steps().unwrap();
    assert_eq!(engine.output_indices(), &[0, 1]);

    let edited = engine.solution_set().clone();
    let indices = engine.output_indices().to_vec();
    engine.reset(edited, indices).unwrap();
    engine.all_steps().unwrap();
    assert_eq!(engine.output_indices(), &[0, 1]);
}

#[test]
fn second_pass_can_remove_more() {
    // In the first pass index 3 is kept because removed index 1 still votes
    // for it; on the edited set nobody depends on it any more.
    let data: Dataset = [(3.0, 3.0), (15.0, 0.0), (0.0, 3.0), (12.0, 2.0)]
        .iter()
        .map(|&(x, y)| Instance::new(vec![x], y))
        .collect();

    let mut engine = DropEngine::new(Variant::DropError);
    engine.set_alpha(0.0).unwrap();
    engine.reset_with_identity(data).unwrap();
    engine.all_steps().unwrap();
    assert_eq!(engine.output_indices(), &[0, 2, 3]);

    let edited = engine.solution_set().clone();
    let indices = engine.output_indices().to_vec();
    engine.reset(edited, indices).unwrap();
    engine.all_steps().unwrap();
    assert_eq!(engine.output_indices(), &[0, 2]);
}

#[test]
fn short_neighbour_lists_with_large_k() {
    // Four points and k = 3: every list holds only the three others.
    let data: Dataset = [(0.0, 3.0), (1.0, 2.0), (3.0, 3.0), (7.0, 0.0)]
        .iter()
        .map(|&(x, y)| Instance::new(vec![x], y))
        .collect();

    let mut engine = DropEngine::new(Variant::DropThreshold);
    engine.set_num_neighbors(3).unwrap();
    engine.reset_with_identity(data).unwrap();
    engine.step().unwrap();
    assert_eq!(engine.neighbors(0).len(), 3);

    // Associate 2 is predicted within θ only while index 0 is a neighbour.
    engine.step().unwrap();
    assert!(engine.is_retained(0));

    engine.all_steps().unwrap();
    assert_eq!(engine.output_indices(), &[0, 1, 2]);
}

#[test]
fn two_distinct_instances_have_single_neighbours() {
    let mut engine = DropEngine::new(Variant::Drop2Error);
    engine
        .reset_with_identity(doubling_line(&[1.0, 2.0]))
        .unwrap();
    assert!(engine.step().unwrap());
    assert_eq!(engine.neighbors(0).len(), 1);
    assert_eq!(engine.neighbors(1).len(), 1);
}

#[test]
fn copies_collapse_to_one_and_stop() {
    let data: Dataset = (0..6).map(|_| Instance::new(vec![2.0, 2.0], 5.0)).collect();
    let mut engine = DropEngine::new(Variant::DropError);
    engine.reset_with_identity(data).unwrap();

    assert_eq!(
        engine.step(),
        Err(EditError::NotEnoughInstances { remaining: 1 })
    );
    assert_eq!(engine.solution_set().len(), 1);
    assert_eq!(engine.output_indices(), &[0]);
}

#[test]
fn duplicates_keep_first_occurrence() {
    let a = Instance::new(vec![0.0], 1.0);
    let b = Instance::new(vec![1.0], 2.0);
    let c = Instance::new(vec![3.0], 3.0);
    let data: Dataset = vec![a.clone(), a.clone(), b, a, c].into_iter().collect();

    let mut engine = DropEngine::new(Variant::DropThreshold);
    engine.reset_with_identity(data).unwrap();
    engine.step().unwrap();
    assert_eq!(engine.working_indices(), &[0, 2, 4]);
}

#[test]
fn drop3_filters_noise_before_editing() {
    let mut targets = vec![1.0; 10];
    targets[9] = 50.0;

    let mut engine = DropEngine::new(Variant::Drop3Threshold);
    engine.reset_with_identity(doubling_line(&targets)).unwrap();
    assert!(engine.step().unwrap());

    assert_eq!(engine.state().phase, Phase::Iterating);
    assert_eq!(engine.working_set().len(), 9);
    assert!(!engine.working_indices().contains(&9));
}

#[test]
fn ordered_variants_visit_enemy_free_points_first() {
    // Two flat plateaus; points next to the jump have enemies.
    let targets = [0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0];
    let mut engine = DropEngine::new(Variant::Drop2Threshold);
    engine.set_beta(0.0).unwrap();
    engine.reset_with_identity(doubling_line(&targets)).unwrap();
    engine.step().unwrap();

    let order = engine.working_indices().to_vec();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..8).collect::<Vec<_>>());
    // Index 4 has index 3 (target 0) as its nearest neighbour: closest enemy.
    assert_eq!(order.last(), Some(&4));
}

// =============================================================================
// Every variant on generated data
// =============================================================================

#[test]
fn every_variant_yields_consistent_output() {
    let data = random_dataset(60, 3, 42);
    for variant in Variant::ALL {
        let mut engine = DropEngine::new(variant);
        engine.reset_with_identity(data.clone()).unwrap();
        engine.all_steps().unwrap();

        let out = engine.output_indices();
        assert_subset_without_duplicates(out, data.len());
        assert_eq!(out.len(), engine.solution_set().len(), "{variant}");
        for (instance, &i) in engine.solution_set().iter().zip(out) {
            assert_eq!(instance, &data[i], "{variant}: solution/index mismatch");
        }
        assert!(
            engine
                .graph()
                .inverse_violations(engine.retained())
                .is_empty(),
            "{variant}: associate lists out of sync"
        );
        assert!(out.len() < data.len(), "{variant} removed nothing");
    }
}

#[test]
fn selector_matches_engine() {
    let data = random_dataset(40, 2, 7);
    let config = SelectorConfig {
        variant: Variant::Drop3Error,
        ..SelectorConfig::default()
    };
    let selection = InstanceSelector::new(config.clone())
        .unwrap()
        .select(&data)
        .unwrap();

    let mut engine = DropEngine::new(config.variant);
    engine.reset_with_identity(data).unwrap();
    engine.all_steps().unwrap();

    assert!(selection.reduced);
    assert_eq!(selection.indices, engine.output_indices());
    assert_eq!(&selection.dataset, engine.solution_set());
}

#[test]
fn runs_are_deterministic() {
    let data = random_dataset(50, 4, 3);
    let run = |variant| {
        let mut engine = DropEngine::new(variant);
        engine.reset_with_identity(data.clone()).unwrap();
        engine.all_steps().unwrap();
        engine.output_indices().to_vec()
    };
    for variant in Variant::ALL {
        assert_eq!(run(variant), run(variant), "{variant}");
    }
}
