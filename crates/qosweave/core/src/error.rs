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

//! Model-level errors shared across the engine
//!
//! These are configuration and data defects: a catalog referencing providers
//! that do not exist, a provider missing an attribute the evaluation needs, a
//! channel attribute requested from a pattern that cannot carry it. Constraint
//! violations are NOT errors; they are feasibility data handled by the fitness
//! function.

use qosweave_common::{Attribute, ConstraintError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("slot '{slot}' references candidate provider {candidate}, but the catalog only holds {providers} providers")]
    CandidateOutOfRange { slot: String, candidate: usize, providers: usize },

    #[error("slot '{slot}' has no candidate providers")]
    EmptyCandidates { slot: String },

    #[error("attribute {attribute} is not supported by the {pattern} pattern")]
    UnsupportedAttribute { attribute: Attribute, pattern: &'static str },

    #[error("provider '{provider}' does not expose attribute {attribute}")]
    MissingAttribute { provider: String, attribute: Attribute },

    #[error("provider '{provider}' has no location, required for latency propagation")]
    MissingLocation { provider: String },

    #[error("provider '{provider}' has no bandwidth class, required for throughput propagation")]
    MissingBandwidth { provider: String },

    #[error("channel attribute {attribute} requires application input and output points")]
    MissingBoundaryPoint { attribute: Attribute },

    #[error("selected candidate position {position} is out of range for slot '{slot}' ({candidates} candidates)")]
    CandidatePositionOutOfRange { slot: String, position: usize, candidates: usize },

    #[error("selected candidate position {position} is out of range for gate {gate} ({candidates} candidates)")]
    GatePositionOutOfRange { gate: usize, position: usize, candidates: usize },

    #[error("attribute {attribute} carries no weight in this application")]
    UnknownAttribute { attribute: Attribute },

    #[error("model inconsistency: {detail}")]
    Inconsistent { detail: &'static str },

    #[error(transparent)]
    Constraint(#[from] ConstraintError),
}
