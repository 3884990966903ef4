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

//! QoS-aware service composition engine
//!
//! Given a catalog of candidate providers and an architecture tree of
//! sequential, parallel, conditional and iterative patterns, the engine
//! searches for the provider assignment maximizing a weighted quality score
//! under hard and soft constraints. Large problems are partitioned along the
//! architecture into sub-problems sized for a pluggable optimizer; weight-one
//! fragments are resolved by exact scan and oversized parallel composites by
//! a critical-path strategy.
//!
//! The building blocks, bottom up: [`catalog`] holds providers and task
//! slots, [`architecture`] the pattern tree and its attribute aggregation,
//! [`graph`] the execution graph propagating channel attributes over
//! geography and bandwidth, [`application`] the full problem with its fitness
//! function, [`optimizer`] the search interface with the genetic default, and
//! [`resolver`] the partition-and-resolve engine assembling [`composition`]s.

pub mod application;
pub mod architecture;
pub mod catalog;
pub mod composition;
pub mod error;
pub mod export;
pub mod graph;
pub mod optimizer;
pub mod resolver;

pub use application::{Application, ApplicationBuilder, Evaluation, Gate, Selection};
pub use architecture::{Architecture, ArchitectureError, ComponentId, Pattern};
pub use catalog::{Catalog, Provider, TaskSlot};
pub use composition::Composition;
pub use error::ModelError;
pub use export::ExportRecord;
pub use graph::ExecutionGraph;
pub use optimizer::genetic::{GeneticConfig, GeneticOptimizer};
pub use optimizer::{CompositionProblem, GenerationStats, Optimizer, OptimizerError, OptimizerRun};
pub use resolver::{PartitionResolver, Resolution, ResolverConfig, ResolverError};
