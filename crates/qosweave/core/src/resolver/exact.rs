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

//! Exact resolution of weight-one problems
//!
//! A single explored slot is scored candidate by candidate with the full
//! weighted fitness, hard and soft constraints included. The scan is
//! embarrassingly parallel; the winner is the first-seen maximum, so ties
//! deterministically go to the lowest candidate position.

use crate::application::{Application, Selection};
use crate::composition::Composition;
use crate::error::ModelError;
use crate::resolver::{Resolution, ResolverError};
use rayon::prelude::*;

pub(super) fn resolve(app: &Application) -> Result<Resolution, ResolverError> {
    let (&slot, _) = app
        .slots_to_explore()
        .iter()
        .next()
        .ok_or(ModelError::Inconsistent { detail: "exact method on a problem with no explored slots" })?;
    let candidates = app.catalog().slot(slot).candidates();

    let scores: Vec<f64> = (0..candidates.len())
        .into_par_iter()
        .map(|position| {
            let genes = [position];
            app.fitness(&Selection::Genotype(&genes))
        })
        .collect::<Result<_, _>>()?;

    let mut best_position = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for (position, &score) in scores.iter().enumerate() {
        if score > best_score {
            best_score = score;
            best_position = position;
        }
    }

    Ok(Resolution {
        generations: 1,
        sub_problems: 1,
        composition: Composition::from([(slot, candidates[best_position])]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationBuilder;
    use crate::architecture::Architecture;
    use crate::catalog::{Provider, TaskSlot};
    use qosweave_common::{Attribute, Constraint};
    use std::collections::HashMap;

    fn single_slot_app(costs: &[f64]) -> Application {
        let providers = costs
            .iter()
            .enumerate()
            .map(|(i, &cost)| Provider::new(format!("p{i}"), HashMap::from([(Attribute::Cost, cost)])))
            .collect();
        let candidates = (0..costs.len()).collect();
        let slots = vec![TaskSlot::new("s0", candidates)];
        ApplicationBuilder::new(providers, slots, Architecture::task(0)).weight(Attribute::Cost, 1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_picks_best_candidate() {
        let app = single_slot_app(&[10.0, 5.0, 8.0]);
        let resolution = resolve(&app).unwrap();
        assert_eq!(resolution.composition, Composition::from([(0, 1)]));
        assert_eq!(resolution.generations, 1);
        assert_eq!(resolution.sub_problems, 1);
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        // Identical providers score identically; the scan keeps the first.
        let app = single_slot_app(&[7.0, 7.0]);
        let resolution = resolve(&app).unwrap();
        assert_eq!(resolution.composition, Composition::from([(0, 0)]));
    }

    #[test]
    fn test_hard_constraint_eliminates_candidate() {
        let providers = vec![
            Provider::new("p0", HashMap::from([(Attribute::Cost, 10.0)])),
            Provider::new("p1", HashMap::from([(Attribute::Cost, 20.0)])),
        ];
        let slots = vec![TaskSlot::new("s0", vec![1, 0])];
        // Candidate order puts the expensive provider first, so without the
        // constraint its violation score of zero would still lose; with the
        // constraint the scan must skip past a zero-scored first candidate.
        let app = ApplicationBuilder::new(providers, slots, Architecture::task(0))
            .weight(Attribute::Cost, 1.0)
            .hard_constraint(Attribute::Cost, Constraint::less_than(15.0))
            .build()
            .unwrap();
        let resolution = resolve(&app).unwrap();
        assert_eq!(resolution.composition, Composition::from([(0, 0)]));
    }
}
