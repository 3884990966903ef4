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

//! Critical-path resolution of parallel composites
//!
//! The response time of a parallel composite is the response time of its
//! slowest branch. Each branch is first resolved on its own; the slowest
//! result fixes the critical path. The remaining branches are then resolved
//! again with the critical time as a hard response-time ceiling and the
//! response-time weight redistributed over the other objectives, since
//! finishing earlier than the critical branch buys nothing.

use crate::application::Application;
use crate::optimizer::Optimizer;
use crate::resolver::{PartitionResolver, Resolution, ResolverError};
use qosweave_common::{Attribute, Constraint};
use rayon::prelude::*;
use tracing::debug;

pub(super) fn resolve<O: Optimizer>(
    resolver: &PartitionResolver<O>,
    app: &Application,
) -> Result<Resolution, ResolverError> {
    // Without a response-time objective there is no critical path to trade
    // against; the composite goes to the optimizer whole.
    let Some(&time_weight) = app.weights().get(&Attribute::ResponseTime) else {
        return resolver.optimize(app);
    };

    let arch = app.architecture();
    let mut branches: Vec<Application> = Vec::new();
    for &child in arch.children(arch.root()) {
        let mut branch = app.sub_problem(arch.narrowed(child));
        branch.refresh_bounds()?;
        branches.push(branch);
    }

    // First pass: every branch resolved independently.
    let first_pass: Vec<(Resolution, f64)> = branches
        .par_iter()
        .map(|branch| {
            let partial = resolver.resolve_app(branch)?;
            let aggregate = branch.to_provider(&partial.composition)?;
            let time = aggregate.require_attribute(Attribute::ResponseTime)?;
            Ok((partial, time))
        })
        .collect::<Result<_, ResolverError>>()?;

    let mut critical = 0usize;
    let mut critical_time = f64::NEG_INFINITY;
    for (index, (_, time)) in first_pass.iter().enumerate() {
        if *time > critical_time {
            critical_time = *time;
            critical = index;
        }
    }
    debug!(branch = critical, time = critical_time, "critical path selected");

    let mut resolution = Resolution::empty();
    for (index, (partial, _)) in first_pass.into_iter().enumerate() {
        if index == critical {
            resolver.merge(app, &mut resolution, partial)?;
        } else {
            // The assignment is superseded by the second pass, but the
            // search effort already happened.
            resolution.generations += partial.generations;
            resolution.sub_problems += partial.sub_problems;
        }
    }

    // Second pass: non-critical branches race the critical one. Response
    // time turns from objective into hard ceiling.
    let scale = 1.0 - time_weight;
    let second_pass: Vec<Resolution> = branches
        .into_par_iter()
        .enumerate()
        .filter(|(index, _)| *index != critical)
        .map(|(_, mut branch)| {
            branch.set_hard_constraint(Attribute::ResponseTime, Constraint::less_than(critical_time));
            if scale > 0.0 {
                let rescaled: Vec<(Attribute, f64)> = branch
                    .weights()
                    .iter()
                    .filter(|&(&attribute, _)| attribute != Attribute::ResponseTime)
                    .map(|(&attribute, &weight)| (attribute, weight / scale))
                    .collect();
                for (attribute, weight) in rescaled {
                    branch.set_weight(attribute, weight);
                }
            }
            branch.set_weight(Attribute::ResponseTime, 0.0);
            resolver.resolve_app(&branch)
        })
        .collect::<Result<_, _>>()?;

    for partial in second_pass {
        resolver.merge(app, &mut resolution, partial)?;
    }
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationBuilder;
    use crate::architecture::Architecture;
    use crate::catalog::{Provider, TaskSlot};
    use crate::composition::Composition;
    use crate::optimizer::testing::ExhaustiveOptimizer;
    use crate::resolver::ResolverConfig;
    use std::collections::HashMap;

    fn provider(name: &str, time: f64, cost: f64) -> Provider {
        Provider::new(name, HashMap::from([(Attribute::ResponseTime, time), (Attribute::Cost, cost)]))
    }

    fn two_branch_app() -> Application {
        let providers = vec![
            provider("a", 2.0, 2.0),
            provider("b", 6.0, 6.0),
            provider("c", 1.0, 1.0),
            provider("d", 9.0, 9.0),
        ];
        let slots = vec![
            TaskSlot::new("s0", vec![0, 1]),
            TaskSlot::new("s1", vec![0, 1]),
            TaskSlot::new("s2", vec![2, 3]),
            TaskSlot::new("s3", vec![2, 3]),
        ];
        let architecture = Architecture::parallel(vec![
            Architecture::sequential(vec![Architecture::task(0), Architecture::task(1)]).unwrap(),
            Architecture::sequential(vec![Architecture::task(2), Architecture::task(3)]).unwrap(),
        ])
        .unwrap();
        ApplicationBuilder::new(providers, slots, architecture)
            .weight(Attribute::ResponseTime, 0.5)
            .weight(Attribute::Cost, 0.5)
            .build()
            .unwrap()
    }

    fn resolver(batch_size: usize) -> PartitionResolver<ExhaustiveOptimizer> {
        let config = ResolverConfig { batch_size, ..ResolverConfig::default() };
        PartitionResolver::new(config, ExhaustiveOptimizer)
    }

    #[test]
    fn test_critical_branch_keeps_first_pass_solution() {
        let app = two_branch_app();
        let resolution = resolver(1).resolve(&app).unwrap();
        // Branch s0/s1 resolves to a+a (time 4) and is critical over c+c
        // (time 2); the non-critical branch still picks c under the ceiling.
        assert_eq!(resolution.composition, Composition::from([(0, 0), (1, 0), (2, 2), (3, 2)]));
        // Two exact scans per branch in the first pass, two more for the
        // re-resolved non-critical branch.
        assert_eq!(resolution.sub_problems, 6);
        assert_eq!(resolution.generations, 6);
    }

    #[test]
    fn test_ceiling_rules_out_slow_providers() {
        let app = two_branch_app();
        let resolution = resolver(1).resolve(&app).unwrap();
        // Provider d would violate the strict ceiling of 4 on its own.
        assert!(!resolution.composition.values().any(|&p| p == 3));
        assert!((resolution.fitness(&app).unwrap() - app.fitness_of(&resolution.composition).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_without_time_objective_delegates_to_optimizer() {
        let providers = vec![provider("a", 2.0, 2.0), provider("b", 6.0, 6.0)];
        let slots = (0..4).map(|i| TaskSlot::new(format!("s{i}"), vec![0, 1])).collect();
        let architecture = Architecture::parallel(vec![
            Architecture::sequential(vec![Architecture::task(0), Architecture::task(1)]).unwrap(),
            Architecture::sequential(vec![Architecture::task(2), Architecture::task(3)]).unwrap(),
        ])
        .unwrap();
        let app = ApplicationBuilder::new(providers, slots, architecture)
            .weight(Attribute::Cost, 1.0)
            .build()
            .unwrap();

        let resolution = resolver(1).resolve(&app).unwrap();
        assert_eq!(resolution.sub_problems, 1);
        assert!(resolution.composition.values().all(|&p| p == 0));
    }
}
