use hll_distinct::exact::relative_error;
use hll_distinct::{CardinalityEstimator, EstimationPolicy, ExactCounter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use test_case::test_case;

#[test_case(12, 1_000)]
#[test_case(12, 10_000)]
#[test_case(14, 100_000)]
#[test_case(16, 1_000_000)]
fn estimate_tracks_exact_count(precision: u8, n: usize) {
    let mut estimator = CardinalityEstimator::with_precision(precision).unwrap();
    let mut exact = ExactCounter::new();
    for i in 0..n {
        let item = i.to_string();
        estimator.insert(&item);
        exact.insert(&item);
    }

    assert_eq!(exact.size(), n);
    let error = relative_error(estimator.estimate(), exact.size());
    let bound = 400.0 * estimator.standard_error();
    assert!(
        error <= bound,
        "p = {precision}, n = {n}: error {error:.4} % exceeds {bound:.4} %"
    );
}

#[test]
fn estimate_tracks_exact_count_with_duplicates() {
    // values drawn from [0, 100_000] with heavy repetition, like the generated input files
    let mut rng = StdRng::seed_from_u64(1337);
    let mut estimator = CardinalityEstimator::with_precision(14).unwrap();
    let mut exact = ExactCounter::new();
    for _ in 0..300_000 {
        let item = rng.gen_range(0..=100_000u32).to_string();
        estimator.insert(&item);
        exact.insert(&item);
    }

    let error = relative_error(estimator.estimate(), exact.size());
    assert!(
        error <= 400.0 * estimator.standard_error(),
        "exact = {}, estimate = {:.1}",
        exact.size(),
        estimator.estimate()
    );
}

#[test]
fn average_error_within_theoretical_bound() {
    // average over independent trials is much tighter than a single run
    let trials = 20;
    let n = 20_000;
    let mut total = 0.0;
    for trial in 0..trials {
        let mut estimator = CardinalityEstimator::new(10, EstimationPolicy::raw()).unwrap();
        for i in 0..n {
            estimator.insert(&format!("{}-{}", trial, i));
        }
        total += relative_error(estimator.estimate(), n) / 100.0;
    }
    let average = total / f64::from(trials);
    let standard_error = 1.04 / 32.0;
    assert!(
        average <= 1.5 * standard_error,
        "average relative error = {average:.4}"
    );
}

#[test]
fn estimate_grows_with_cardinality() {
    let mut estimator = CardinalityEstimator::with_precision(12).unwrap();
    let mut previous = estimator.estimate();
    for step in 1..=6 {
        for i in 0..20_000 {
            estimator.insert(&format!("{}:{}", step, i));
        }
        let estimate = estimator.estimate();
        assert!(estimate > previous, "step {step}: {estimate} <= {previous}");
        previous = estimate;
    }
}
