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

//! End-to-end throughput propagation
//!
//! Throughput is a bottleneck measure: the capacity of a path is the smallest
//! link capacity along it, and a link's capacity is the lower bandwidth class
//! of its two endpoints. Boundary nodes impose no limit, so an edge touching
//! a boundary takes the other endpoint's capacity, and the sink contributes
//! an infinite floor. Edge factors play no role here; a branch taken rarely
//! still bottlenecks the channel.

use crate::application::{Application, Selection};
use crate::catalog::Provider;
use crate::error::ModelError;
use crate::graph::{ExecutionGraph, GraphNodeKind, NodeId};
use qosweave_common::BandwidthClass;
use std::collections::HashMap;

/// Throughput in Mbps of one concrete selection.
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
        return Ok(f64::INFINITY);
    }

    let here = provider_of(graph, app, selection, id)?;
    let mut bottleneck = f64::INFINITY;
    for &(next, _) in &node.next {
        let there = provider_of(graph, app, selection, next)?;
        let link = match (here, there) {
            (None, Some(p)) | (Some(p), None) => p.require_bandwidth()?.capacity(),
            (Some(a), Some(b)) => a.require_bandwidth()?.link_capacity(b.require_bandwidth()?),
            (None, None) => return Err(ModelError::Inconsistent { detail: "link between two boundary nodes" }),
        };
        let f_next = match cache.get(&next) {
            Some(&cached) => cached,
            None => {
                let computed = eval(graph, app, selection, next, cache)?;
                cache.insert(next, computed);
                computed
            }
        };
        bottleneck = bottleneck.min(link.min(f_next));
    }
    Ok(bottleneck)
}

fn provider_of<'a>(
    graph: &'a ExecutionGraph,
    app: &'a Application,
    selection: &Selection<'a>,
    id: NodeId,
) -> Result<Option<&'a Provider>, ModelError> {
    match &graph.node(id).kind {
        GraphNodeKind::Boundary(_) => Ok(None),
        GraphNodeKind::Slot(slot) => app.selected_provider(*slot, selection).map(Some),
        GraphNodeKind::Gate(gate) => app.selected_gate_provider(*gate, selection).map(Some),
    }
}

/// Best- and worst-case throughput over all candidate bandwidth classes.
/// Bounds are computed in class-level space first and converted to
/// capacities at the end.
pub(crate) fn bounds(graph: &ExecutionGraph, app: &Application) -> Result<(f64, f64), ModelError> {
    let mut cache = HashMap::new();
    let levels = minmax(graph, app, graph.root(), &mut cache)?
        .ok_or(ModelError::Inconsistent { detail: "throughput bounds over a graph with no bandwidth-carrying nodes" })?;
    let to_capacity = |level: u32| {
        BandwidthClass::from_level(level)
            .map(BandwidthClass::capacity)
            .ok_or(ModelError::Inconsistent { detail: "bandwidth level out of range" })
    };
    Ok((to_capacity(levels.0)?, to_capacity(levels.1)?))
}

fn minmax(
    graph: &ExecutionGraph,
    app: &Application,
    id: NodeId,
    cache: &mut HashMap<NodeId, Option<(u32, u32)>>,
) -> Result<Option<(u32, u32)>, ModelError> {
    let node = graph.node(id);
    if node.next.is_empty() {
        return Ok(None);
    }

    let here = levels_of(graph, app, id)?;
    let mut combined: Option<(u32, u32)> = None;
    for &(next, _) in &node.next {
        let there = levels_of(graph, app, next)?;
        let link = match (here.is_empty(), there.is_empty()) {
            (true, false) => extremes(&there),
            (false, true) => extremes(&here),
            (false, false) => {
                let mut low = u32::MAX;
                let mut high = u32::MIN;
                for &a in &here {
                    for &b in &there {
                        let level = a.min(b);
                        low = low.min(level);
                        high = high.max(level);
                    }
                }
                Some((low, high))
            }
            (true, true) => None,
        };

        let f_next = match cache.get(&next) {
            Some(&cached) => cached,
            None => {
                let computed = minmax(graph, app, next, cache)?;
                cache.insert(next, computed);
                computed
            }
        };

        let edge = merge(link, f_next, |a, b| (a.0.min(b.0), a.1.max(b.1)));
        combined = merge(combined, edge, |a, b| (a.0.min(b.0), a.1.max(b.1)));
    }
    Ok(combined)
}

fn extremes(levels: &[u32]) -> Option<(u32, u32)> {
    let low = levels.iter().copied().min()?;
    let high = levels.iter().copied().max()?;
    Some((low, high))
}

fn merge(a: Option<(u32, u32)>, b: Option<(u32, u32)>, fold: impl Fn((u32, u32), (u32, u32)) -> (u32, u32)) -> Option<(u32, u32)> {
    match (a, b) {
        (Some(a), Some(b)) => Some(fold(a, b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn levels_of(graph: &ExecutionGraph, app: &Application, id: NodeId) -> Result<Vec<u32>, ModelError> {
    let candidates: &[usize] = match &graph.node(id).kind {
        GraphNodeKind::Boundary(_) => return Ok(Vec::new()),
        GraphNodeKind::Slot(slot) => app.catalog().slot(*slot).candidates(),
        GraphNodeKind::Gate(gate) => app.gate(*gate).candidates(),
    };
    let mut levels: Vec<u32> = candidates
        .iter()
        .map(|&p| app.catalog().provider(p).require_bandwidth().map(BandwidthClass::level))
        .collect::<Result<_, _>>()?;
    levels.sort_unstable();
    levels.dedup();
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationBuilder;
    use crate::architecture::Architecture;
    use crate::catalog::TaskSlot;
    use crate::composition::Composition;
    use qosweave_common::{Attribute, GeoPoint};
    use std::collections::HashMap;

    fn classed(name: &str, class: BandwidthClass) -> Provider {
        Provider::new(name, HashMap::from([(Attribute::Cost, 1.0)])).with_bandwidth(class)
    }

    fn boundary() -> (GeoPoint, GeoPoint) {
        (GeoPoint::new("in", 0.0, 0.0), GeoPoint::new("out", 0.0, 1.0))
    }

    #[test]
    fn test_chain_bottlenecks_on_weakest_link() {
        let providers = vec![classed("fast", BandwidthClass::L2), classed("slow", BandwidthClass::L1)];
        let slots = vec![TaskSlot::new("s0", vec![0]), TaskSlot::new("s1", vec![1])];
        let architecture = Architecture::sequential(vec![Architecture::task(0), Architecture::task(1)]).unwrap();
        let (input, output) = boundary();
        let app = ApplicationBuilder::new(providers, slots, architecture)
            .weight(Attribute::Throughput, 1.0)
            .boundary(input, output)
            .build()
            .unwrap();

        let composition = Composition::new();
        let throughput = value(app.graph().unwrap(), &app, &Selection::Providers(&composition)).unwrap();
        assert_eq!(throughput, BandwidthClass::L1.capacity());
    }

    #[test]
    fn test_rare_branch_still_bottlenecks() {
        let providers = vec![classed("fast", BandwidthClass::L2), classed("weak", BandwidthClass::L0)];
        let slots = vec![TaskSlot::new("s0", vec![0]), TaskSlot::new("s1", vec![1])];
        let architecture =
            Architecture::conditional(vec![Architecture::task(0), Architecture::task(1)], vec![0.9, 0.1]).unwrap();
        let (input, output) = boundary();
        let app = ApplicationBuilder::new(providers, slots, architecture)
            .weight(Attribute::Throughput, 1.0)
            .boundary(input, output)
            .build()
            .unwrap();

        // Branch probabilities never soften the bottleneck.
        let composition = Composition::new();
        let throughput = value(app.graph().unwrap(), &app, &Selection::Providers(&composition)).unwrap();
        assert_eq!(throughput, BandwidthClass::L0.capacity());
    }

    #[test]
    fn test_bounds_span_candidate_classes() {
        let providers = vec![classed("low", BandwidthClass::L0), classed("high", BandwidthClass::L3)];
        let slots = vec![TaskSlot::new("s0", vec![0, 1])];
        let (input, output) = boundary();
        let app = ApplicationBuilder::new(providers, slots, Architecture::task(0))
            .weight(Attribute::Throughput, 1.0)
            .boundary(input, output)
            .build()
            .unwrap();

        let (min, max) = bounds(app.graph().unwrap(), &app).unwrap();
        assert_eq!(min, BandwidthClass::L0.capacity());
        assert_eq!(max, BandwidthClass::L3.capacity());
    }
}
