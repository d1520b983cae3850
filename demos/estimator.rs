use hll_distinct::{CardinalityEstimator, EstimationPolicy};

fn main() {
    let mut estimator1 = CardinalityEstimator::with_precision(12).unwrap();
    for i in 0..10 {
        estimator1.insert(&i.to_string());
    }
    println!("estimator1 estimate = {:.2}", estimator1.estimate());

    let mut estimator2 = CardinalityEstimator::with_precision(12).unwrap();
    for i in 10..15 {
        estimator2.insert(&i.to_string());
    }
    println!("estimator2 estimate = {:.2}", estimator2.estimate());

    estimator1.merge(&estimator2).unwrap();
    println!("merged estimate = {:.2}", estimator1.estimate());
    println!(
        "merged raw estimate = {:.2}",
        estimator1.estimate_with(&EstimationPolicy::raw())
    );
    println!("{:?}", estimator1);
}
