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

//! Feasibility constraints over raw attribute values
//!
//! A violated hard constraint zeroes the fitness of a whole composition; a
//! violated soft constraint accumulates into a penalty ratio. Violations are
//! data, never errors: the search keeps scoring infeasible assignments.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConstraintError {
    #[error("in-range constraint requires an upper reference value")]
    MissingUpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintOp {
    LessThan,
    GreaterThan,
    InRange,
}

/// A constraint on the raw (non-normalized) value of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    op: ConstraintOp,
    reference: f64,
    upper: Option<f64>,
}

impl Constraint {
    /// Build a constraint, rejecting an in-range operator without its upper
    /// reference. Configuration errors surface here, before any evaluation.
    pub fn new(op: ConstraintOp, reference: f64, upper: Option<f64>) -> Result<Self, ConstraintError> {
        if op == ConstraintOp::InRange && upper.is_none() {
            return Err(ConstraintError::MissingUpperBound);
        }
        Ok(Self { op, reference, upper })
    }

    pub fn less_than(reference: f64) -> Self {
        Self { op: ConstraintOp::LessThan, reference, upper: None }
    }

    pub fn greater_than(reference: f64) -> Self {
        Self { op: ConstraintOp::GreaterThan, reference, upper: None }
    }

    pub fn in_range(lower: f64, upper: f64) -> Self {
        Self { op: ConstraintOp::InRange, reference: lower, upper: Some(upper) }
    }

    pub fn op(&self) -> ConstraintOp {
        self.op
    }

    pub fn reference(&self) -> f64 {
        self.reference
    }

    pub fn is_satisfied(&self, value: f64) -> bool {
        match self.op {
            ConstraintOp::LessThan => value < self.reference,
            ConstraintOp::GreaterThan => value > self.reference,
            // Construction guarantees the upper bound is present.
            ConstraintOp::InRange => self.reference < value && value < self.upper.unwrap_or(f64::NEG_INFINITY),
        }
    }

    pub fn is_violated(&self, value: f64) -> bool {
        !self.is_satisfied(value)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            ConstraintOp::LessThan => write!(f, "x < {}", self.reference),
            ConstraintOp::GreaterThan => write!(f, "x > {}", self.reference),
            ConstraintOp::InRange => write!(f, "{} < x < {}", self.reference, self.upper.unwrap_or(f64::NAN)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_less_than() {
        let c = Constraint::less_than(15.0);
        assert!(c.is_satisfied(10.0));
        assert!(c.is_violated(15.0));
        assert!(c.is_violated(20.0));
    }

    #[test]
    fn test_greater_than() {
        let c = Constraint::greater_than(0.9);
        assert!(c.is_satisfied(0.95));
        assert!(c.is_violated(0.9));
    }

    #[test]
    fn test_in_range_is_exclusive() {
        let c = Constraint::in_range(1.0, 2.0);
        assert!(c.is_satisfied(1.5));
        assert!(c.is_violated(1.0));
        assert!(c.is_violated(2.0));
    }

    #[test]
    fn test_in_range_requires_upper_bound() {
        let err = Constraint::new(ConstraintOp::InRange, 1.0, None).unwrap_err();
        assert_eq!(err, ConstraintError::MissingUpperBound);
        assert!(Constraint::new(ConstraintOp::InRange, 1.0, Some(2.0)).is_ok());
        assert!(Constraint::new(ConstraintOp::LessThan, 1.0, None).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(Constraint::less_than(5.0).to_string(), "x < 5");
        assert_eq!(Constraint::in_range(1.0, 2.0).to_string(), "1 < x < 2");
    }
}
