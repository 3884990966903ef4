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

//! End-to-end latency propagation
//!
//! Latency accumulates along graph edges as `factor × (link_latency + f(next))`,
//! where link latency comes from the great-circle distance between the two
//! endpoint locations. Parallel fan-out nodes take the slowest successor;
//! every other node sums its successors. The memo table is scoped to one
//! evaluation, so two selections never share stale sub-results.

use crate::application::{Application, Selection};
use crate::error::ModelError;
use crate::graph::{ExecutionGraph, GraphNodeKind, NodeId};
use qosweave_common::GeoPoint;
use std::collections::HashMap;

/// Latency in seconds of one concrete selection.
pub(crate) fn value(graph: &ExecutionGraph, app: &Application, selection: &Selection<'_>) -> Result<f64, ModelError> {
    let mut cache = HashMap::new();
    eval(graph, app, selection, graph.root(), &mut cache)
}

fn eval<'a>(
    graph: &'a ExecutionGraph,
    app: &'a Application,
    selection: &Selection<'a>,
    id: NodeId,
    cache: &mut HashMap<NodeId, f64>,
) -> Result<f64, ModelError> {
    let node = graph.node(id);
    if node.next.is_empty() {
        return Ok(0.0);
    }

    let here = location(graph, app, selection, id)?.clone();
    let mut total = 0.0;
    let mut slowest = 0.0f64;
    for &(next, factor) in &node.next {
        let there = location(graph, app, selection, next)?;
        let link = here.latency_to(there);
        let f_next = match cache.get(&next) {
            Some(&cached) => cached,
            None => {
                let computed = eval(graph, app, selection, next, cache)?;
                cache.insert(next, computed);
                computed
            }
        };
        let contribution = factor * (link + f_next);
        total += contribution;
        slowest = slowest.max(contribution);
    }
    Ok(if node.parallel { slowest } else { total })
}

fn location<'a>(
    graph: &'a ExecutionGraph,
    app: &'a Application,
    selection: &Selection<'a>,
    id: NodeId,
) -> Result<&'a GeoPoint, ModelError> {
    match &graph.node(id).kind {
        GraphNodeKind::Boundary(point) => Ok(point),
        GraphNodeKind::Slot(slot) => app.selected_provider(*slot, selection)?.require_location(),
        GraphNodeKind::Gate(gate) => app.selected_gate_provider(*gate, selection)?.require_location(),
    }
}

/// Best- and worst-case latency over all candidate locations, used to bound
/// the normalization range without enumerating selections.
pub(crate) fn bounds(graph: &ExecutionGraph, app: &Application) -> Result<(f64, f64), ModelError> {
    let mut cache = HashMap::new();
    minmax(graph, app, graph.root(), &mut cache)
}

fn minmax(
    graph: &ExecutionGraph,
    app: &Application,
    id: NodeId,
    cache: &mut HashMap<NodeId, (f64, f64)>,
) -> Result<(f64, f64), ModelError> {
    let node = graph.node(id);
    if node.next.is_empty() {
        return Ok((0.0, 0.0));
    }

    let here = locations(graph, app, id)?;
    let mut combined = (0.0f64, 0.0f64);
    for &(next, factor) in &node.next {
        let there = locations(graph, app, next)?;
        let mut link_min = f64::INFINITY;
        let mut link_max = f64::NEG_INFINITY;
        for a in &here {
            for b in &there {
                let link = a.latency_to(b);
                link_min = link_min.min(link);
                link_max = link_max.max(link);
            }
        }
        if here.is_empty() || there.is_empty() {
            return Err(ModelError::Inconsistent { detail: "graph node with no candidate locations" });
        }

        let f_next = match cache.get(&next) {
            Some(&cached) => cached,
            None => {
                let computed = minmax(graph, app, next, cache)?;
                cache.insert(next, computed);
                computed
            }
        };
        let pair = (factor * (link_min + f_next.0), factor * (link_max + f_next.1));
        combined = if node.parallel {
            (combined.0.max(pair.0), combined.1.max(pair.1))
        } else {
            (combined.0 + pair.0, combined.1 + pair.1)
        };
    }
    Ok(combined)
}

fn locations<'a>(graph: &'a ExecutionGraph, app: &'a Application, id: NodeId) -> Result<Vec<&'a GeoPoint>, ModelError> {
    match &graph.node(id).kind {
        GraphNodeKind::Boundary(point) => Ok(vec![point]),
        GraphNodeKind::Slot(slot) => app
            .catalog()
            .slot(*slot)
            .candidates()
            .iter()
            .map(|&p| app.catalog().provider(p).require_location())
            .collect(),
        GraphNodeKind::Gate(gate) => app
            .gate(*gate)
            .candidates()
            .iter()
            .map(|&p| app.catalog().provider(p).require_location())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationBuilder;
    use crate::architecture::Architecture;
    use crate::catalog::{Provider, TaskSlot};
    use crate::composition::Composition;
    use qosweave_common::Attribute;
    use std::collections::HashMap;

    fn madrid() -> GeoPoint {
        GeoPoint::new("Madrid", 40.4168, -3.7038)
    }

    fn paris() -> GeoPoint {
        GeoPoint::new("Paris", 48.8566, 2.3522)
    }

    fn located(name: &str, point: GeoPoint) -> Provider {
        Provider::new(name, HashMap::from([(Attribute::Cost, 1.0)])).with_location(point)
    }

    #[test]
    fn test_chain_sums_link_latencies() {
        let providers = vec![located("p0", madrid()), located("p1", paris())];
        let slots = vec![TaskSlot::new("s0", vec![0]), TaskSlot::new("s1", vec![1])];
        let architecture = Architecture::sequential(vec![Architecture::task(0), Architecture::task(1)]).unwrap();
        let app = ApplicationBuilder::new(providers, slots, architecture)
            .weight(Attribute::Latency, 1.0)
            .boundary(madrid(), paris())
            .build()
            .unwrap();

        // Madrid→Madrid and Paris→Paris links are free; only the Madrid→Paris
        // hop between the two slots remains.
        let composition = Composition::new();
        let latency = value(app.graph().unwrap(), &app, &Selection::Providers(&composition)).unwrap();
        assert!((latency - madrid().latency_to(&paris())).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_takes_slowest_branch() {
        let providers = vec![located("near", madrid()), located("far", paris())];
        let slots = vec![TaskSlot::new("s0", vec![0]), TaskSlot::new("s1", vec![1])];
        let architecture = Architecture::parallel(vec![Architecture::task(0), Architecture::task(1)]).unwrap();
        let app = ApplicationBuilder::new(providers, slots, architecture)
            .weight(Attribute::Latency, 1.0)
            .boundary(madrid(), madrid())
            .build()
            .unwrap();

        // Both gates resolve to the Madrid provider, so the near branch is
        // free and the far branch pays the round trip to Paris.
        let composition = Composition::new();
        let latency = value(app.graph().unwrap(), &app, &Selection::Providers(&composition)).unwrap();
        assert!((latency - 2.0 * madrid().latency_to(&paris())).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_cover_candidate_locations() {
        let providers = vec![located("home", madrid()), located("away", paris())];
        let slots = vec![TaskSlot::new("s0", vec![0, 1])];
        let app = ApplicationBuilder::new(providers, slots, Architecture::task(0))
            .weight(Attribute::Latency, 1.0)
            .boundary(madrid(), madrid())
            .build()
            .unwrap();

        let (min, max) = bounds(app.graph().unwrap(), &app).unwrap();
        assert!(min.abs() < 1e-12);
        assert!((max - 2.0 * madrid().latency_to(&paris())).abs() < 1e-12);
    }
}
