use std::collections::{BTreeMap, HashMap};

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// A named decision variable with its fixed position in the split order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictor {
    pub name: String,
    pub level: usize,
    pub range: Interval,
}

impl Predictor {
    pub fn new(name: impl Into<String>, level: usize, range: Interval) -> Self {
        Self {
            name: name.into(),
            level,
            range,
        }
    }

    /// Predictors in the given order, all spanning the whole real line.
    pub fn unbounded<S: AsRef<str>>(names: &[S]) -> Vec<Predictor> {
        names
            .iter()
            .enumerate()
            .map(|(level, name)| Predictor::new(name.as_ref(), level, Interval::FULL))
            .collect()
    }
}

/// Source of predictor values for one observation.
///
/// Lookups receive both the level and the name so that positional sources
/// (rows of a matrix) and named sources (maps) share one classifier.
pub trait PredictorValues {
    fn value(&self, level: usize, name: &str) -> Option<f64>;
}

impl PredictorValues for HashMap<String, f64> {
    fn value(&self, _level: usize, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl PredictorValues for HashMap<&str, f64> {
    fn value(&self, _level: usize, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl PredictorValues for BTreeMap<String, f64> {
    fn value(&self, _level: usize, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl PredictorValues for [f64] {
    fn value(&self, level: usize, _name: &str) -> Option<f64> {
        self.get(level).copied()
    }
}

impl PredictorValues for ArrayView1<'_, f64> {
    fn value(&self, level: usize, _name: &str) -> Option<f64> {
        self.get(level).copied()
    }
}
