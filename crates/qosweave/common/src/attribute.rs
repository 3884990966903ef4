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

//! QoS attribute taxonomy
//!
//! Each attribute carries an optimization direction and a transform applied
//! to aggregated values. Channel attributes depend on the execution-graph
//! topology and are evaluated by the propagation engine, not by the
//! architecture tree; they order before provider attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Optimization direction of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Objective {
    Minimize,
    Maximize,
}

/// Transform applied to an aggregated attribute value at each composite.
///
/// `NthRoot` counteracts the over-penalization of multiplicative attributes
/// in large sub-trees; the root degree is the composite's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transform {
    Identity,
    Log10,
    Sigmoid,
    NthRoot,
}

impl Transform {
    /// Apply the transform to `x`. `power` is the composite weight for the
    /// n-th-root variant and is ignored by the others.
    pub fn apply(self, x: f64, power: f64) -> f64 {
        match self {
            Transform::Identity => x,
            Transform::Log10 => x.log10(),
            Transform::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Transform::NthRoot => x.powf(1.0 / power),
        }
    }
}

/// A measurable quality attribute of a provider or of a whole composition.
///
/// The declaration order is the canonical evaluation order: channel
/// attributes (`Throughput`, `Latency`) first, provider attributes after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Attribute {
    Throughput,
    Latency,
    ResponseTime,
    Cost,
    Availability,
    Reliability,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Throughput,
        Attribute::Latency,
        Attribute::ResponseTime,
        Attribute::Cost,
        Attribute::Availability,
        Attribute::Reliability,
    ];

    pub fn objective(self) -> Objective {
        match self {
            Attribute::Throughput | Attribute::Availability | Attribute::Reliability => Objective::Maximize,
            Attribute::Latency | Attribute::ResponseTime | Attribute::Cost => Objective::Minimize,
        }
    }

    pub fn transform(self) -> Transform {
        match self {
            Attribute::Availability | Attribute::Reliability => Transform::NthRoot,
            _ => Transform::Identity,
        }
    }

    /// Channel attributes propagate end-to-end through the execution graph
    /// instead of aggregating over the architecture tree.
    pub fn is_channel(self) -> bool {
        matches!(self, Attribute::Throughput | Attribute::Latency)
    }

    pub fn to_minimize(self) -> bool {
        self.objective() == Objective::Minimize
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Throughput => "THROUGHPUT",
            Attribute::Latency => "LATENCY",
            Attribute::ResponseTime => "RESPONSE_TIME",
            Attribute::Cost => "COST",
            Attribute::Availability => "AVAILABILITY",
            Attribute::Reliability => "RELIABILITY",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objectives() {
        assert_eq!(Attribute::Cost.objective(), Objective::Minimize);
        assert_eq!(Attribute::ResponseTime.objective(), Objective::Minimize);
        assert_eq!(Attribute::Latency.objective(), Objective::Minimize);
        assert_eq!(Attribute::Availability.objective(), Objective::Maximize);
        assert_eq!(Attribute::Reliability.objective(), Objective::Maximize);
        assert_eq!(Attribute::Throughput.objective(), Objective::Maximize);
    }

    #[test]
    fn test_channel_attributes_order_first() {
        let mut attrs = vec![Attribute::Cost, Attribute::Throughput, Attribute::Availability, Attribute::Latency];
        attrs.sort();
        assert_eq!(attrs[0], Attribute::Throughput);
        assert_eq!(attrs[1], Attribute::Latency);
        assert!(attrs[0].is_channel() && attrs[1].is_channel());
        assert!(!attrs[2].is_channel() && !attrs[3].is_channel());
    }

    #[test]
    fn test_transform_identity() {
        assert_eq!(Transform::Identity.apply(0.42, 7.0), 0.42);
    }

    #[test]
    fn test_transform_nth_root() {
        let x: f64 = 0.9_f64.powi(4);
        let recovered = Transform::NthRoot.apply(x, 4.0);
        assert!((recovered - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_transform_log_and_sigmoid() {
        assert!((Transform::Log10.apply(1000.0, 1.0) - 3.0).abs() < 1e-12);
        assert!((Transform::Sigmoid.apply(0.0, 1.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reliability_class_uses_nth_root() {
        assert_eq!(Attribute::Availability.transform(), Transform::NthRoot);
        assert_eq!(Attribute::Reliability.transform(), Transform::NthRoot);
        assert_eq!(Attribute::Cost.transform(), Transform::Identity);
    }
}
