#![no_main]

use hll_distinct::CardinalityEstimator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut estimator) = serde_json::from_slice::<CardinalityEstimator>(data) {
        estimator.insert("1");
        assert!(estimator.estimate() > 0.0);
        assert!(estimator.estimate().is_finite());
    }
});
