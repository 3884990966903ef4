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

//! Partition-and-resolve engine
//!
//! Recursively splits an application along its architecture tree into
//! sub-problems small enough for the optimizer (or, at weight one, an exact
//! scan), then merges the partial compositions. Batching follows a greedy
//! packing of root children up to the batch size, with a tail-merge rule
//! that keeps the last fragments from degenerating into tiny problems.
//! Parallel composites above a slack threshold go through the critical-path
//! strategy instead.
//!
//! Slot assignments from different sub-problems are disjoint by
//! construction; a clash is a fatal consistency error. Gate assignments are
//! shared across sub-problems and the last resolution wins.

mod exact;
mod parallel;

use crate::application::Application;
use crate::architecture::{ComponentId, Pattern};
use crate::composition::Composition;
use crate::error::ModelError;
use crate::optimizer::{CompositionProblem, Optimizer, OptimizerError};
use qosweave_common::TimeLimit;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("sub-problem compositions overlap at slot index {index}")]
    CompositionOverlap { index: usize },

    #[error("resolution left explored slots unassigned: {missing:?}")]
    IncompleteComposition { missing: Vec<usize> },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Optimizer(#[from] OptimizerError),
}

/// Tuning knobs of the partitioning strategy.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Target sub-problem weight. 1 resolves every slot exactly; 0 never
    /// splits and hands the whole problem to the optimizer.
    pub batch_size: usize,
    /// Route oversized parallel composites through the critical path
    /// strategy instead of the optimizer.
    pub split_parallels: bool,
    /// Optimizer budget per sub-problem.
    pub time_limit: TimeLimit,
    /// Remainder fraction of the batch size below which the tail is merged
    /// into the running batch.
    pub tail_merge_ratio: f64,
    /// Slack multiplier under which a sub-tree goes to the optimizer whole.
    pub packed_slack: f64,
    /// Slack multiplier for parallel composites.
    pub parallel_slack: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            batch_size: 1,
            split_parallels: true,
            time_limit: TimeLimit::fixed_secs(60),
            tail_merge_ratio: 0.6,
            packed_slack: 1.6,
            parallel_slack: 3.0,
        }
    }
}

/// Outcome of a resolution: the assembled composition plus how much work
/// the search did.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub generations: usize,
    pub sub_problems: usize,
    pub composition: Composition,
}

impl Resolution {
    fn empty() -> Self {
        Self { generations: 0, sub_problems: 0, composition: Composition::new() }
    }

    /// Weighted fitness of the assembled composition under `app`.
    pub fn fitness(&self, app: &Application) -> Result<f64, ModelError> {
        app.fitness_of(&self.composition)
    }
}

pub struct PartitionResolver<O> {
    config: ResolverConfig,
    optimizer: O,
}

impl<O: Optimizer> PartitionResolver<O> {
    pub fn new(config: ResolverConfig, optimizer: O) -> Self {
        Self { config, optimizer }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve the whole application and verify the assembled composition
    /// covers every explored slot.
    pub fn resolve(&self, app: &Application) -> Result<Resolution, ResolverError> {
        info!(weight = app.architecture().weight(), batch_size = self.config.batch_size, "resolving application");
        let resolution = self.resolve_app(app)?;

        let missing: Vec<usize> = app
            .slots_to_explore()
            .keys()
            .copied()
            .filter(|slot| !resolution.composition.contains_key(slot))
            .collect();
        if !missing.is_empty() {
            return Err(ResolverError::IncompleteComposition { missing });
        }
        Ok(resolution)
    }

    fn resolve_app(&self, app: &Application) -> Result<Resolution, ResolverError> {
        if self.config.batch_size == 0 {
            return self.optimize(app);
        }

        let weight = app.architecture().weight();
        if weight == 1 {
            return exact::resolve(app);
        }

        let (packed_lazy, parallel_lazy) = if self.config.batch_size <= 1 {
            (1, 1)
        } else {
            (
                (self.config.batch_size as f64 * self.config.packed_slack) as usize,
                (self.config.batch_size as f64 * self.config.parallel_slack) as usize,
            )
        };

        let root = app.architecture().root();
        let is_parallel = matches!(app.architecture().pattern(root), Some(Pattern::Parallel));

        if is_parallel && weight > parallel_lazy {
            if self.config.split_parallels {
                return parallel::resolve(self, app);
            }
            return self.optimize(app);
        }
        if is_parallel || weight <= packed_lazy {
            return self.optimize(app);
        }
        self.pack(app)
    }

    /// Greedy packing of the root's children into batches of at most
    /// `batch_size` leaves each.
    fn pack(&self, app: &Application) -> Result<Resolution, ResolverError> {
        let arch = app.architecture();
        let root = arch.root();
        let arch_weight = arch.weight();
        let batch_size = self.config.batch_size;
        let tail_lazy = (batch_size as f64 * self.config.tail_merge_ratio).floor() as usize;

        let mut children: Vec<ComponentId> = arch.children(root).to_vec();
        // Heterogeneous children pack better largest-first; a flat run of
        // leaves is already as sorted as it gets.
        if children.len() != arch_weight {
            children.sort_by(|&a, &b| arch.component_weight(b).cmp(&arch.component_weight(a)));
        }

        let mut resolution = Resolution::empty();
        let mut batch: Vec<ComponentId> = Vec::new();
        let mut batch_weight = 0usize;
        let mut processed = 0usize;

        for index in 0..children.len() {
            let child = children[index];
            let child_weight = arch.component_weight(child);

            if child_weight >= batch_size {
                // Big enough to stand on its own.
                let sub = app.sub_problem(arch.narrowed(child));
                let partial = self.resolve_app(&sub)?;
                self.merge(app, &mut resolution, partial)?;
            } else if arch_weight - processed <= tail_lazy {
                if batch_weight >= tail_lazy && arch_weight - processed >= tail_lazy {
                    // Both halves are substantial: resolve them separately.
                    let partial = self.resolve_regrouped(app, &batch)?;
                    self.merge(app, &mut resolution, partial)?;
                    let tail: Vec<ComponentId> = children[index..].to_vec();
                    let partial = self.resolve_regrouped(app, &tail)?;
                    self.merge(app, &mut resolution, partial)?;
                } else {
                    // Fold the small remainder into the pending batch.
                    let mut merged_batch = batch.clone();
                    merged_batch.extend_from_slice(&children[index..]);
                    let partial = self.resolve_regrouped(app, &merged_batch)?;
                    self.merge(app, &mut resolution, partial)?;
                }
                batch.clear();
                break;
            } else if child_weight + batch_weight <= batch_size {
                batch.push(child);
                batch_weight += child_weight;
            } else {
                // Batch is full: resolve it and start a new one.
                let partial = self.resolve_regrouped(app, &batch)?;
                self.merge(app, &mut resolution, partial)?;
                batch = vec![child];
                batch_weight = child_weight;
            }

            processed += child_weight;
        }

        if !batch.is_empty() {
            let partial = self.resolve_regrouped(app, &batch)?;
            self.merge(app, &mut resolution, partial)?;
        }
        Ok(resolution)
    }

    /// Regroup a batch of root children into its own sub-problem. Children
    /// of a conditional root keep their branch probabilities, renormalized
    /// over the batch; everything else regroups sequentially.
    fn resolve_regrouped(&self, app: &Application, batch: &[ComponentId]) -> Result<Resolution, ResolverError> {
        let arch = app.architecture();
        let root = arch.root();

        let regrouped = if let Some(Pattern::Conditional { probabilities }) = arch.pattern(root) {
            let renormalized = if batch.len() > 1 {
                let root_children = arch.children(root);
                let mut subset = Vec::with_capacity(batch.len());
                for &child in batch {
                    let position = root_children
                        .iter()
                        .position(|&c| c == child)
                        .ok_or(ModelError::Inconsistent { detail: "batch component is not a child of the root composite" })?;
                    subset.push(probabilities[position]);
                }
                let sum: f64 = subset.iter().sum();
                for probability in &mut subset {
                    *probability /= sum;
                }
                subset
            } else {
                // A one-branch conditional keeps the pattern with a certain
                // branch rather than degrading to a sequential.
                vec![1.0]
            };
            arch.regroup_conditional(batch, renormalized)
        } else {
            arch.regroup_sequential(batch)
        };

        let sub = app.sub_problem(regrouped);
        self.resolve_app(&sub)
    }

    fn optimize(&self, app: &Application) -> Result<Resolution, ResolverError> {
        let budget = self.config.time_limit.duration_for(app.explored_len());
        debug!(explored = app.explored_len(), budget_ms = budget.as_millis() as u64, "delegating to optimizer");
        let problem = CompositionProblem::new(app, budget);
        let run = self.optimizer.optimize(&problem)?;
        let composition = app.decode_genotype(&run.best_genotype).map_err(ModelError::from)?;
        Ok(Resolution { generations: run.generations, sub_problems: 1, composition })
    }

    /// Accumulate a partial resolution. Slot keys must be disjoint; gate
    /// keys are shared by design and the latest assignment wins.
    fn merge(&self, app: &Application, into: &mut Resolution, partial: Resolution) -> Result<(), ResolverError> {
        let slot_count = app.catalog().slots().len();
        into.generations += partial.generations;
        into.sub_problems += partial.sub_problems;
        for (key, provider) in partial.composition {
            if key < slot_count && into.composition.contains_key(&key) {
                return Err(ResolverError::CompositionOverlap { index: key });
            }
            into.composition.insert(key, provider);
        }
        Ok(())
    }
}
