//! Exact distinct counter used as a reference for estimator accuracy.
//!
//! Values are compared byte for byte, input doesn't have to be valid UTF-8.

use std::collections::HashSet;

/// Set of every distinct value seen so far, keyed on raw bytes
#[derive(Clone, Debug, Default)]
pub struct ExactCounter {
    seen: HashSet<Vec<u8>>,
}

impl ExactCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert value, returns whether it was seen for the first time
    #[inline]
    pub fn insert(&mut self, item: &str) -> bool {
        self.insert_bytes(item.as_bytes())
    }

    /// Insert raw bytes, returns whether they were seen for the first time
    #[inline]
    pub fn insert_bytes(&mut self, item: &[u8]) -> bool {
        if self.seen.contains(item) {
            return false;
        }
        self.seen.insert(item.to_vec())
    }

    /// Number of distinct values
    #[inline]
    pub fn size(&self) -> usize {
        self.seen.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    #[inline]
    pub fn contains(&self, item: &str) -> bool {
        self.seen.contains(item.as_bytes())
    }
}

impl<S: AsRef<str>> Extend<S> for ExactCounter {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExactCounter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut counter = Self::new();
        counter.extend(iter);
        counter
    }
}

/// Relative error of `estimate` against `exact`, in percent: `|estimate - exact| / exact * 100`.
///
/// An empty exact count yields 0 for a zero estimate and infinity otherwise.
pub fn relative_error(estimate: f64, exact: usize) -> f64 {
    if exact == 0 {
        return if estimate == 0.0 { 0.0 } else { f64::INFINITY };
    }
    let exact = exact as f64;
    (estimate - exact).abs() / exact * 100.0
}
