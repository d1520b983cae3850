use hll_distinct::estimator::{estimate_partitioned, precision_for_error};
use hll_distinct::{EstimationPolicy, ExactCounter};

fn main() {
    let items: Vec<String> = (0..200_000).map(|i| (i % 150_000).to_string()).collect();
    let partitions: Vec<&[String]> = items.chunks(50_000).collect();

    let precision = precision_for_error(0.01).unwrap();
    let estimator =
        estimate_partitioned(&partitions, precision, EstimationPolicy::default()).unwrap();
    let exact: ExactCounter = items.iter().collect();

    println!(
        "partitions = {}, precision = {}, estimate = {:.0}, exact = {}",
        partitions.len(),
        precision,
        estimator.estimate(),
        exact.size()
    );
}
