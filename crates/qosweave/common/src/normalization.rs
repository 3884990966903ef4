// QoSWeave
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Value normalization
//!
//! Maps raw attribute values into [0, 1] so heterogeneous attributes can be
//! blended into one score. Two methods: min-max normalization
//! `(x - min) / (max - min)` and max scaling `x / max`, both direction aware.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Running (min, max) tracker over observed values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMax {
    min: f64,
    max: f64,
}

impl MinMax {
    pub fn new() -> Self {
        Self { min: f64::INFINITY, max: f64::NEG_INFINITY }
    }

    pub fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Default for MinMax {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<f64> for MinMax {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut minmax = MinMax::new();
        for value in iter {
            minmax.observe(value);
        }
        minmax
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizationMethod {
    MinMax,
    Max,
}

/// A (min, max) bound pair for one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Normalization {
    min: f64,
    max: f64,
}

impl Normalization {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Min-max normalization. A zero-width range normalizes to 1 regardless
    /// of input; minimizing attributes invert the numerator.
    pub fn min_max(&self, x: f64, to_minimize: bool) -> f64 {
        let denominator = self.max - self.min;
        if denominator == 0.0 {
            return 1.0;
        }
        let numerator = if to_minimize { self.max - x } else { x - self.min };
        numerator / denominator
    }

    /// Max scaling. A zero max normalizes to 1; minimizing attributes are
    /// complemented after scaling.
    pub fn scaling(&self, x: f64, to_minimize: bool) -> f64 {
        let scaled = if self.max == 0.0 { 1.0 } else { x / self.max };
        if to_minimize { 1.0 - scaled } else { scaled }
    }

    pub fn normalize(&self, x: f64, to_minimize: bool, method: NormalizationMethod) -> f64 {
        match method {
            NormalizationMethod::MinMax => self.min_max(x, to_minimize),
            NormalizationMethod::Max => self.scaling(x, to_minimize),
        }
    }
}

impl From<MinMax> for Normalization {
    fn from(minmax: MinMax) -> Self {
        Normalization::new(minmax.min(), minmax.max())
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minmax_tracker() {
        let minmax: MinMax = [3.0, -1.0, 7.0, 2.0].into_iter().collect();
        assert_eq!(minmax.min(), -1.0);
        assert_eq!(minmax.max(), 7.0);
    }

    #[test]
    fn test_min_max_maximizing_bounds() {
        let norm = Normalization::new(10.0, 20.0);
        assert_eq!(norm.min_max(10.0, false), 0.0);
        assert_eq!(norm.min_max(20.0, false), 1.0);
        assert_eq!(norm.min_max(15.0, false), 0.5);
    }

    #[test]
    fn test_min_max_minimizing_inverts() {
        let norm = Normalization::new(1.0, 5.0);
        assert_eq!(norm.min_max(1.0, true), 1.0);
        assert_eq!(norm.min_max(5.0, true), 0.0);
    }

    #[test]
    fn test_zero_width_range_normalizes_to_one() {
        let norm = Normalization::new(4.0, 4.0);
        assert_eq!(norm.min_max(4.0, false), 1.0);
        assert_eq!(norm.min_max(4.0, true), 1.0);
        assert_eq!(norm.min_max(100.0, true), 1.0);
    }

    #[test]
    fn test_max_scaling() {
        let norm = Normalization::new(0.0, 10.0);
        assert_eq!(norm.scaling(5.0, false), 0.5);
        assert_eq!(norm.scaling(5.0, true), 0.5);
        assert_eq!(norm.scaling(10.0, true), 0.0);
        let degenerate = Normalization::new(0.0, 0.0);
        assert_eq!(degenerate.scaling(3.0, false), 1.0);
    }

    #[test]
    fn test_method_dispatch() {
        let norm = Normalization::new(0.0, 4.0);
        assert_eq!(norm.normalize(1.0, false, NormalizationMethod::MinMax), 0.25);
        assert_eq!(norm.normalize(1.0, false, NormalizationMethod::Max), 0.25);
    }

    proptest::proptest! {
        #[test]
        fn test_min_max_stays_in_unit_interval(
            a in -1e6f64..1e6,
            b in -1e6f64..1e6,
            t in 0.0f64..=1.0,
            to_minimize: bool,
        ) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            let norm = Normalization::new(min, max);
            let x = min + t * (max - min);
            let normalized = norm.min_max(x, to_minimize);
            proptest::prop_assert!((-1e-9..=1.0 + 1e-9).contains(&normalized));
        }
    }
}
