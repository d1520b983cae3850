//! Side-by-side comparison of exact and estimated distinct counts over a line-oriented input.
//!
//! Lines are split on `\n` and kept as raw bytes, so input that isn't valid UTF-8 is counted
//! like any other value.
//!
//! Each run is timed, and process memory is sampled after the run through a
//! [`MemoryProbe`]. The probe is a diagnostic hook only; estimators never depend on it.

use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::time::{Duration, Instant};

use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use tracing::{info, warn};

use crate::error::Result;
use crate::estimator::CardinalityEstimator;
use crate::exact::{relative_error, ExactCounter};
use crate::policy::EstimationPolicy;

/// Source of process memory usage
pub trait MemoryProbe {
    /// Current memory usage in KiB, if available
    fn memory_kb(&self) -> Option<usize>;
}

/// Physical memory of the current process
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessMemory;

impl MemoryProbe for ProcessMemory {
    fn memory_kb(&self) -> Option<usize> {
        match memory_stats::memory_stats() {
            Some(usage) => Some(usage.physical_mem / 1024),
            None => {
                warn!("process memory stats are not available on this platform");
                None
            }
        }
    }
}

/// Probe that never reports memory usage
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMemory;

impl MemoryProbe for NoMemory {
    fn memory_kb(&self) -> Option<usize> {
        None
    }
}

/// Result of a single counting run
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    /// Distinct count, exact or estimated
    pub count: f64,
    /// Wall time spent reading and counting
    pub elapsed: Duration,
    /// Process memory after the run
    pub memory_kb: Option<usize>,
}

/// Count distinct lines exactly
pub fn measure_exact<R: BufRead>(input: R, probe: &dyn MemoryProbe) -> Result<Measurement> {
    let start = Instant::now();
    let mut counter = ExactCounter::new();
    for line in input.split(b'\n') {
        counter.insert_bytes(&line?);
    }
    let elapsed = start.elapsed();
    let count = counter.size();
    info!(count, elapsed_ms = elapsed.as_millis() as u64, "exact count finished");

    Ok(Measurement {
        count: count as f64,
        elapsed,
        memory_kb: probe.memory_kb(),
    })
}

/// Estimate distinct lines with a `CardinalityEstimator`
pub fn measure_estimate<R: BufRead>(
    input: R,
    precision: u8,
    policy: EstimationPolicy,
    probe: &dyn MemoryProbe,
) -> Result<Measurement> {
    let start = Instant::now();
    let mut estimator = CardinalityEstimator::new(precision, policy)?;
    for line in input.split(b'\n') {
        estimator.insert_bytes(&line?);
    }
    let count = estimator.estimate();
    let elapsed = start.elapsed();
    info!(
        estimate = count,
        registers_size = estimator.size_of(),
        elapsed_ms = elapsed.as_millis() as u64,
        "estimate finished"
    );

    Ok(Measurement {
        count,
        elapsed,
        memory_kb: probe.memory_kb(),
    })
}

/// Exact and estimated runs over the same input
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    pub exact: Measurement,
    pub estimate: Measurement,
}

impl Comparison {
    /// Relative error of the estimate in percent
    pub fn accuracy(&self) -> f64 {
        relative_error(self.estimate.count, self.exact.count as usize)
    }
}

#[derive(Tabled)]
struct Row {
    method: &'static str,
    count: String,
    error: String,
    time: String,
    memory: String,
}

impl Row {
    fn new(method: &'static str, measurement: &Measurement, count: String, error: String) -> Self {
        Self {
            method,
            count,
            error,
            time: format!("{} ms", measurement.elapsed.as_millis()),
            memory: match measurement.memory_kb {
                Some(kb) => format!("{} KB", kb),
                None => "n/a".to_string(),
            },
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rows = [
            Row::new(
                "exact",
                &self.exact,
                format!("{}", self.exact.count as usize),
                "-".to_string(),
            ),
            Row::new(
                "hyperloglog",
                &self.estimate,
                // whole-number report truncates the estimate
                format!("{}", self.estimate.count as u64),
                format!("{:.4} %", self.accuracy()),
            ),
        ];
        let table_config = Settings::default().with(Style::markdown());
        write!(f, "{}", Table::new(rows).with(table_config))
    }
}
