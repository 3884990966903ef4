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

//! Shared value types for the QoSWeave composition engine
//!
//! Attribute taxonomy, constraints, normalization, geographic model,
//! bandwidth classes and time budgets. No engine logic lives here.

pub mod attribute;
pub mod bandwidth;
pub mod constraint;
pub mod geo;
pub mod normalization;
pub mod range;
pub mod time_limit;

pub use attribute::{Attribute, Objective, Transform};
pub use bandwidth::BandwidthClass;
pub use constraint::{Constraint, ConstraintError, ConstraintOp};
pub use geo::GeoPoint;
pub use normalization::{MinMax, Normalization, NormalizationMethod};
pub use range::Range;
pub use time_limit::TimeLimit;
