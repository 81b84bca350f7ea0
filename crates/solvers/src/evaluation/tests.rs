use std::sync::{
    Arc, Barrier,
    atomic::{AtomicUsize, Ordering},
};

use approx::assert_relative_eq;
use proptest::prelude::*;
use skein_core::Objective;

use super::{Evaluator, Policy};

fn sphere() -> Objective {
    Objective::new(2, |x| x.iter().map(|v| v * v).sum()).unwrap()
}

/// An objective that counts how often it is actually called.
fn counting_sphere() -> (Objective, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let objective = Objective::new(2, move |x: &[f64]| {
        counter.fetch_add(1, Ordering::SeqCst);
        x.iter().map(|v| v * v).sum()
    })
    .unwrap();
    (objective, calls)
}

#[test]
fn cached_repeat_counts_one_distinct_evaluation() {
    let (objective, calls) = counting_sphere();
    let evaluator = Evaluator::new(objective, Policy::default());

    let first = evaluator.evaluate(&[1.0, 2.0]);
    let second = evaluator.evaluate(&[1.0, 2.0]);

    assert_relative_eq!(first, 5.0);
    assert_relative_eq!(second, first);
    assert_eq!(evaluator.number_of_evaluations(), 2);
    assert_eq!(evaluator.number_of_distinct_evaluations(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn uncached_repeats_are_all_distinct() {
    let (objective, calls) = counting_sphere();
    let evaluator = Evaluator::new(objective, Policy::default().with_caching(false));

    for _ in 0..5 {
        assert_relative_eq!(evaluator.evaluate(&[1.0, 1.0]), 2.0);
    }

    assert_eq!(evaluator.number_of_evaluations(), 5);
    assert_eq!(evaluator.number_of_distinct_evaluations(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert!(evaluator.cached_samples().is_empty());
}

#[test]
fn cache_stores_soft_constraints() {
    let objective = sphere().with_soft_constraints(|x| (x[0] - 1.0).max(0.0));
    let evaluator = Evaluator::new(objective, Policy::default());

    let sample = evaluator.sample(&[3.0, 0.0]);
    assert_relative_eq!(sample.objective_value, 9.0);
    assert_relative_eq!(sample.soft_constraints_value, 2.0);

    let cached = evaluator.cached_samples();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0], sample);
    assert!(evaluator.is_cached(&[3.0, 0.0]));
    assert!(!evaluator.is_cached(&[3.0, -0.0]));
}

#[test]
fn reset_clears_cache_history_and_counters() {
    let mut evaluator = Evaluator::new(sphere(), Policy::new(true, true));
    evaluator.evaluate(&[1.0, 2.0]);
    evaluator.evaluate(&[2.0, 1.0]);
    evaluator.evaluate(&[1.0, 2.0]);

    evaluator.reset();

    assert!(evaluator.cached_samples().is_empty());
    assert!(evaluator.sampling_history().is_empty());
    assert_eq!(evaluator.number_of_evaluations(), 0);
    assert_eq!(evaluator.number_of_distinct_evaluations(), 0);

    evaluator.evaluate(&[1.0, 2.0]);
    assert_eq!(evaluator.number_of_distinct_evaluations(), 1);
}

#[test]
fn history_records_every_call_in_order() {
    let evaluator = Evaluator::new(sphere(), Policy::default().with_recording(true));

    evaluator.evaluate(&[1.0, 0.0]);
    evaluator.evaluate(&[0.0, 2.0]);
    evaluator.evaluate(&[1.0, 0.0]);

    let history = evaluator.sampling_history();
    let parameters: Vec<_> = history.iter().map(|s| s.parameter.clone()).collect();
    assert_eq!(
        parameters,
        vec![vec![1.0, 0.0], vec![0.0, 2.0], vec![1.0, 0.0]]
    );
    assert_relative_eq!(history[1].objective_value, 4.0);
    assert_eq!(evaluator.cached_samples().len(), 2);
}

#[test]
fn history_is_off_by_default() {
    let evaluator = Evaluator::new(sphere(), Policy::default());
    evaluator.evaluate(&[1.0, 0.0]);
    assert!(evaluator.sampling_history().is_empty());
}

#[test]
fn non_finite_values_are_cached_unchanged() {
    let objective = Objective::new(1, |x| if x[0] < 0.0 { f64::NAN } else { x[0] }).unwrap();
    let evaluator = Evaluator::new(objective, Policy::default());

    assert!(evaluator.evaluate(&[-1.0]).is_nan());
    assert!(evaluator.evaluate(&[-1.0]).is_nan());
    assert_eq!(evaluator.number_of_distinct_evaluations(), 1);
}

#[test]
fn concurrent_race_counts_one_distinct_evaluation() {
    let evaluator = Evaluator::new(sphere(), Policy::default());
    let threads = 8;
    let calls_per_thread = 50;

    std::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                for i in 0..calls_per_thread {
                    // Every thread walks the same sequence of parameters.
                    let x = (i % 10) as f64;
                    evaluator.evaluate(&[x, -x]);
                    assert!(
                        evaluator.number_of_distinct_evaluations()
                            <= evaluator.number_of_evaluations()
                    );
                }
            });
        }
    });

    assert_eq!(evaluator.number_of_evaluations(), threads * calls_per_thread);
    assert_eq!(evaluator.number_of_distinct_evaluations(), 10);
    assert_eq!(evaluator.cached_samples().len(), 10);
}

#[test]
fn racing_computations_count_only_the_insertion() {
    let (objective, calls) = counting_sphere();
    let evaluator = Evaluator::new(objective, Policy::default());
    let threads = 8;
    let barrier = Barrier::new(threads);

    std::thread::scope(|scope| {
        for _ in 0..threads {
            scope.spawn(|| {
                barrier.wait();
                evaluator.evaluate(&[1.5, -2.5]);
            });
        }
    });

    let computed = calls.load(Ordering::SeqCst);
    assert!((1..=threads).contains(&computed));
    assert_eq!(evaluator.number_of_evaluations(), threads);
    assert_eq!(evaluator.number_of_distinct_evaluations(), 1);
    assert_eq!(evaluator.cached_samples().len(), 1);
}

proptest! {
    #[test]
    fn distinct_never_exceeds_total(
        calls in prop::collection::vec((-3i32..3, -3i32..3), 0..60),
        caching in any::<bool>(),
    ) {
        let evaluator = Evaluator::new(sphere(), Policy::default().with_caching(caching));
        let mut unique = std::collections::HashSet::new();

        for (a, b) in calls.iter().copied() {
            let before = evaluator.number_of_evaluations();
            evaluator.evaluate(&[f64::from(a), f64::from(b)]);
            unique.insert((a, b));

            prop_assert_eq!(evaluator.number_of_evaluations(), before + 1);
            prop_assert!(
                evaluator.number_of_distinct_evaluations() <= evaluator.number_of_evaluations()
            );
        }

        let expected_distinct = if caching { unique.len() } else { calls.len() };
        prop_assert_eq!(evaluator.number_of_distinct_evaluations(), expected_distinct);
    }
}
