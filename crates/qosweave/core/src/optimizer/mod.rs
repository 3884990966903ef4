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

//! Optimizer interface
//!
//! The resolver hands an opaque search problem to a pluggable optimizer: a
//! genome of bounded integer genes (one candidate position per explored slot
//! or gate), a fitness callable from any thread, and a wall-clock budget.
//! Implementations return the best genotype seen plus per-generation
//! statistics; the resolver decodes the genotype back into a composition.

pub mod genetic;

use crate::application::{Application, Selection};
use crate::composition::Composition;
use crate::error::ModelError;
use qosweave_common::Range;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum OptimizerError {
    #[error("cannot optimize a problem with an empty genome")]
    EmptyGenome,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// One composition problem as the optimizer sees it.
pub struct CompositionProblem<'a> {
    app: &'a Application,
    budget: Duration,
    seeds: Vec<Vec<usize>>,
}

impl<'a> CompositionProblem<'a> {
    pub fn new(app: &'a Application, budget: Duration) -> Self {
        Self { app, budget, seeds: Vec::new() }
    }

    /// Genotypes injected into the initial population, e.g. solutions of
    /// related problems.
    pub fn with_seeds(mut self, seeds: Vec<Vec<usize>>) -> Self {
        self.seeds = seeds;
        self
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn seeds(&self) -> &[Vec<usize>] {
        &self.seeds
    }

    pub fn genome_len(&self) -> usize {
        self.app.explored_len()
    }

    /// Inclusive candidate-position range per gene.
    pub fn gene_ranges(&self) -> Vec<Range<usize>> {
        self.app
            .candidate_counts()
            .into_iter()
            .map(|count| Range::new(0, count.saturating_sub(1)))
            .collect()
    }

    /// Weighted fitness of one genotype; safe to call from many threads.
    pub fn fitness(&self, genes: &[usize]) -> Result<f64, ModelError> {
        self.app.fitness(&Selection::Genotype(genes))
    }

    pub fn decode(&self, genes: &[usize]) -> Result<Composition, ModelError> {
        self.app.decode_genotype(genes)
    }
}

/// Fitness statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationStats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
}

/// Result of one optimizer invocation.
#[derive(Debug, Clone)]
pub struct OptimizerRun {
    pub best_genotype: Vec<usize>,
    pub best_fitness: f64,
    pub generations: usize,
    pub stats: Vec<GenerationStats>,
}

/// A search strategy over composition problems. `Sync` so the resolver can
/// fan sub-problems out across threads against one optimizer instance.
pub trait Optimizer: Sync {
    fn optimize(&self, problem: &CompositionProblem<'_>) -> Result<OptimizerRun, OptimizerError>;
}
