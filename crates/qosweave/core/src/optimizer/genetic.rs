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

//! Genetic optimizer
//!
//! Integer-gene GA with uniform crossover, per-gene mutation and truncation
//! selection. A generation is evaluated in parallel; breeding is sequential
//! so a fixed seed reproduces a run exactly. The search stops at the
//! wall-clock budget or when the population converges (best and mean fitness
//! within epsilon of each other).

use crate::optimizer::{CompositionProblem, GenerationStats, Optimizer, OptimizerError, OptimizerRun};
use qosweave_common::Range;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub survivors: usize,
    pub mutation_probability: f64,
    pub convergence_epsilon: f64,
    /// Fixed RNG seed for reproducible runs; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            survivors: 10,
            mutation_probability: 0.03,
            convergence_epsilon: 0.001,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneticOptimizer {
    config: GeneticConfig,
}

impl GeneticOptimizer {
    pub fn new(config: GeneticConfig) -> Self {
        Self { config }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { config: GeneticConfig { seed: Some(seed), ..GeneticConfig::default() } }
    }

    fn random_genotype(ranges: &[Range<usize>], rng: &mut StdRng) -> Vec<usize> {
        ranges.iter().map(|range| rng.gen_range(range.from()..=range.to())).collect()
    }

    fn breed(&self, ranges: &[Range<usize>], survivors: &[Vec<usize>], rng: &mut StdRng) -> Vec<usize> {
        let a = &survivors[rng.gen_range(0..survivors.len())];
        let b = &survivors[rng.gen_range(0..survivors.len())];
        let mut child: Vec<usize> = a
            .iter()
            .zip(b.iter())
            .map(|(&ga, &gb)| if rng.gen_bool(0.5) { ga } else { gb })
            .collect();
        for (gene, range) in child.iter_mut().zip(ranges) {
            if rng.gen_bool(self.config.mutation_probability) {
                *gene = rng.gen_range(range.from()..=range.to());
            }
        }
        child
    }
}

impl Optimizer for GeneticOptimizer {
    fn optimize(&self, problem: &CompositionProblem<'_>) -> Result<OptimizerRun, OptimizerError> {
        let ranges = problem.gene_ranges();
        if ranges.is_empty() {
            return Err(OptimizerError::EmptyGenome);
        }
        let population_size = self.config.population_size.max(2);
        let survivors_size = self.config.survivors.clamp(1, population_size);
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut population: Vec<Vec<usize>> = problem.seeds().iter().cloned().take(population_size).collect();
        while population.len() < population_size {
            population.push(Self::random_genotype(&ranges, &mut rng));
        }

        let deadline = Instant::now() + problem.budget();
        let mut stats = Vec::new();
        let mut best_genotype: Vec<usize> = Vec::new();
        let mut best_fitness = f64::NEG_INFINITY;
        let mut generations = 0usize;

        loop {
            let scores: Vec<f64> = population
                .par_iter()
                .map(|genes| problem.fitness(genes))
                .collect::<Result<_, _>>()?;
            generations += 1;

            let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = scores.iter().sum::<f64>() / scores.len() as f64;
            stats.push(GenerationStats { min, mean, max });
            trace!(generation = generations, min, mean, max, "generation evaluated");

            // Strict comparison keeps the first-seen genotype on ties.
            for (genes, &score) in population.iter().zip(&scores) {
                if score > best_fitness {
                    best_fitness = score;
                    best_genotype = genes.clone();
                }
            }

            if Instant::now() >= deadline {
                debug!(generations, best_fitness, "budget exhausted");
                break;
            }
            if (max - mean).abs() <= self.config.convergence_epsilon * mean.abs().max(1.0) {
                debug!(generations, best_fitness, "population converged");
                break;
            }

            // Truncation selection: the fittest survive and breed.
            let mut order: Vec<usize> = (0..population.len()).collect();
            order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
            let survivors: Vec<Vec<usize>> = order.iter().take(survivors_size).map(|&i| population[i].clone()).collect();

            let mut next = survivors.clone();
            while next.len() < population_size {
                next.push(self.breed(&ranges, &survivors, &mut rng));
            }
            population = next;
        }

        Ok(OptimizerRun { best_genotype, best_fitness, generations, stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationBuilder;
    use crate::architecture::Architecture;
    use crate::catalog::{Provider, TaskSlot};
    use qosweave_common::Attribute;
    use std::collections::HashMap;
    use std::time::Duration;

    fn sample_app() -> crate::application::Application {
        let providers = vec![
            Provider::new("p0", HashMap::from([(Attribute::Cost, 10.0)])),
            Provider::new("p1", HashMap::from([(Attribute::Cost, 5.0)])),
        ];
        let slots = vec![TaskSlot::new("s0", vec![0, 1]), TaskSlot::new("s1", vec![0, 1])];
        let architecture = Architecture::sequential(vec![Architecture::task(0), Architecture::task(1)]).unwrap();
        ApplicationBuilder::new(providers, slots, architecture)
            .weight(Attribute::Cost, 1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_seeded_population_contains_optimum() {
        let app = sample_app();
        // Seed the full 2×2 search space so the optimum is guaranteed to be
        // scored in generation one regardless of evolution.
        let problem = CompositionProblem::new(&app, Duration::from_millis(50))
            .with_seeds(vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
        let run = GeneticOptimizer::seeded(7).optimize(&problem).unwrap();
        // Cheapest providers everywhere maximize the cost fitness.
        assert_eq!(run.best_genotype, vec![1, 1]);
        assert!((run.best_fitness - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_budget_runs_one_generation() {
        let app = sample_app();
        let problem = CompositionProblem::new(&app, Duration::ZERO);
        let run = GeneticOptimizer::seeded(1).optimize(&problem).unwrap();
        assert_eq!(run.generations, 1);
        assert_eq!(run.stats.len(), 1);
        assert_eq!(run.best_genotype.len(), 2);
    }

    #[test]
    fn test_stats_track_generations() {
        let app = sample_app();
        let problem = CompositionProblem::new(&app, Duration::from_millis(20));
        let run = GeneticOptimizer::seeded(42).optimize(&problem).unwrap();
        assert_eq!(run.stats.len(), run.generations);
        for generation in &run.stats {
            assert!(generation.min <= generation.mean && generation.mean <= generation.max);
        }
    }

    #[test]
    fn test_single_gene_problem() {
        let app = sample_app();
        let sub = app.sub_problem(app.architecture().narrowed(app.architecture().leaf_ids()[0]));
        assert_eq!(sub.explored_len(), 1);
        let problem = CompositionProblem::new(&sub, Duration::ZERO).with_seeds(vec![vec![0], vec![1]]);
        let run = GeneticOptimizer::seeded(0).optimize(&problem).unwrap();
        assert_eq!(run.best_genotype, vec![1]);
    }
}
