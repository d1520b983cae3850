#![no_main]

use hll_distinct::{CardinalityEstimator, CorrectionDomain, EstimationPolicy};
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);

    let mut estimator1 = CardinalityEstimator::with_precision(12).unwrap();
    for chunk in first_half.chunks(4) {
        estimator1.insert_bytes(chunk);
        assert!(estimator1.estimate() > 0.0);
    }

    let mut estimator2 = CardinalityEstimator::with_precision(12).unwrap();
    for chunk in second_half.chunks(4) {
        estimator2.insert_bytes(chunk);
        assert!(estimator2.estimate() > 0.0);
    }

    let mut direct = CardinalityEstimator::with_precision(12).unwrap();
    for chunk in first_half.chunks(4).chain(second_half.chunks(4)) {
        direct.insert_bytes(chunk);
    }

    estimator1.merge(&estimator2).unwrap();
    assert_eq!(estimator1.registers(), direct.registers());

    for policy in [
        EstimationPolicy::raw(),
        EstimationPolicy::corrected(CorrectionDomain::Hash32),
        EstimationPolicy::corrected(CorrectionDomain::Hash64),
    ] {
        let estimate = estimator1.estimate_with(&policy);
        assert!(estimate.is_finite() && estimate > 0.0);
    }
});
