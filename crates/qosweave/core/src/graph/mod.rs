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

//! Execution graph
//!
//! A weighted DAG derived from the architecture tree, modelling the physical
//! flow of a request: synthetic boundary nodes at the application's input and
//! output points, one node per task slot and one gate node per composite
//! boundary. Edge factors encode expected traversal counts (loop repetitions,
//! branch probabilities); fan-out nodes of a parallel composite are flagged so
//! latency propagation takes the slowest branch instead of the sum.
//!
//! Channel attributes (latency, throughput) are evaluated over this graph by
//! the `latency` and `throughput` submodules, never over the tree.

pub mod latency;
pub mod throughput;

use crate::architecture::{Architecture, ComponentId, ComponentKind, Pattern};
use qosweave_common::GeoPoint;
use std::collections::BTreeSet;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum GraphNodeKind {
    /// Synthetic entry or exit point with a fixed location.
    Boundary(GeoPoint),
    /// A task slot, located wherever its selected provider is.
    Slot(usize),
    /// A composite boundary; hosts routing middleware selected like any
    /// other provider. The id indexes the application's gate table.
    Gate(usize),
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub kind: GraphNodeKind,
    /// Fan-out of a parallel composite: successors race instead of chaining.
    pub parallel: bool,
    /// Outgoing edges with their traversal factors.
    pub next: Vec<(NodeId, f64)>,
}

#[derive(Debug, Clone)]
pub struct ExecutionGraph {
    nodes: Vec<GraphNode>,
    root: NodeId,
    gate_count: usize,
}

struct GraphBuilder {
    nodes: Vec<GraphNode>,
    gate_count: usize,
}

impl GraphBuilder {
    fn push(&mut self, kind: GraphNodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(GraphNode { kind, parallel: false, next: Vec::new() });
        id
    }

    fn push_gate(&mut self) -> NodeId {
        let gate = self.gate_count;
        self.gate_count += 1;
        self.push(GraphNodeKind::Gate(gate))
    }

    fn link(&mut self, from: NodeId, to: NodeId, factor: f64) {
        self.nodes[from].next.push((to, factor));
    }

    /// Build the sub-graph for one component and return its (entry, exit).
    fn component(&mut self, arch: &Architecture, id: ComponentId) -> (NodeId, NodeId) {
        match &arch.node(id).kind {
            ComponentKind::Task { slot } => {
                let node = self.push(GraphNodeKind::Slot(*slot));
                (node, node)
            }
            ComponentKind::Composite { pattern, children } => match pattern {
                Pattern::Sequential => self.sequential(arch, children),
                Pattern::Parallel => self.parallel(arch, children),
                Pattern::Conditional { probabilities } => self.conditional(arch, children, probabilities),
                Pattern::Iterative { continue_probability } => self.iterative(arch, children, *continue_probability),
            },
        }
    }

    fn sequential(&mut self, arch: &Architecture, children: &[ComponentId]) -> (NodeId, NodeId) {
        let (start, mut last) = self.component(arch, children[0]);
        for &child in &children[1..] {
            let (entry, exit) = self.component(arch, child);
            self.link(last, entry, 1.0);
            last = exit;
        }
        (start, last)
    }

    fn parallel(&mut self, arch: &Architecture, children: &[ComponentId]) -> (NodeId, NodeId) {
        let start = self.push_gate();
        let end = self.push_gate();
        self.nodes[start].parallel = true;
        for &child in children {
            let (entry, exit) = self.component(arch, child);
            self.link(start, entry, 1.0);
            self.link(exit, end, 1.0);
        }
        (start, end)
    }

    fn conditional(&mut self, arch: &Architecture, children: &[ComponentId], probabilities: &[f64]) -> (NodeId, NodeId) {
        let start = self.push_gate();
        let end = self.push_gate();
        for (&child, &probability) in children.iter().zip(probabilities) {
            let (entry, exit) = self.component(arch, child);
            self.link(start, entry, probability);
            // A bare slot branch keeps its probability on the closing edge;
            // a composite branch already scaled it internally.
            let closing = if arch.slot(child).is_some() { probability } else { 1.0 };
            self.link(exit, end, closing);
        }
        (start, end)
    }

    fn iterative(&mut self, arch: &Architecture, children: &[ComponentId], continue_probability: f64) -> (NodeId, NodeId) {
        let start = self.push_gate();
        let end = self.push_gate();
        let q = 1.0 - continue_probability;
        let mut last = start;
        for &child in children {
            let (entry, exit) = self.component(arch, child);
            // Each slot in the body runs an expected 1/q times; a nested
            // composite accounts for its own repetitions.
            let factor = if arch.slot(child).is_some() { 1.0 / q } else { 1.0 };
            self.link(last, entry, factor);
            last = exit;
        }
        self.link(last, end, continue_probability / q);
        (start, end)
    }
}

impl ExecutionGraph {
    /// Build the graph for `arch` between the application's boundary points.
    pub fn build(arch: &Architecture, input: GeoPoint, output: GeoPoint) -> Self {
        let mut builder = GraphBuilder { nodes: Vec::new(), gate_count: 0 };
        let root = builder.push(GraphNodeKind::Boundary(input));
        let sink = builder.push(GraphNodeKind::Boundary(output));
        let (entry, exit) = builder.component(arch, arch.root());
        builder.link(root, entry, 1.0);
        builder.link(exit, sink, 1.0);
        Self { nodes: builder.nodes, root, gate_count: builder.gate_count }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn gate_count(&self) -> usize {
        self.gate_count
    }

    /// Nodes in a topological order starting from the root.
    fn topological_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        self.post_order(self.root, &mut visited, &mut order);
        order.reverse();
        order
    }

    fn post_order(&self, id: NodeId, visited: &mut [bool], order: &mut Vec<NodeId>) {
        if visited[id] {
            return;
        }
        visited[id] = true;
        for &(next, _) in &self.nodes[id].next {
            self.post_order(next, visited, order);
        }
        order.push(id);
    }

    /// Candidate provider sets for each gate: the union of the provider sets
    /// of all predecessor nodes, accumulated in topological order so gates
    /// feeding gates cascade. A gate fed only by a boundary falls back to
    /// the union of its successors' sets so every gate stays selectable.
    pub(crate) fn gate_candidates(&self, slot_candidates: impl Fn(usize) -> Vec<usize>) -> Vec<Vec<usize>> {
        let mut sets: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); self.gate_count];
        let order = self.topological_order();

        let set_of = |id: NodeId, sets: &[BTreeSet<usize>]| -> BTreeSet<usize> {
            match &self.nodes[id].kind {
                GraphNodeKind::Boundary(_) => BTreeSet::new(),
                GraphNodeKind::Slot(slot) => slot_candidates(*slot).into_iter().collect(),
                GraphNodeKind::Gate(gate) => sets[*gate].clone(),
            }
        };

        for &id in &order {
            let contribution = set_of(id, &sets);
            for &(next, _) in &self.nodes[id].next {
                if let GraphNodeKind::Gate(gate) = self.nodes[next].kind {
                    sets[gate].extend(contribution.iter().copied());
                }
            }
        }

        // Fallback pass in reverse order so a successor gate is settled
        // before any empty gate borrows from it.
        for &id in order.iter().rev() {
            if let GraphNodeKind::Gate(gate) = self.nodes[id].kind {
                if sets[gate].is_empty() {
                    let mut union = BTreeSet::new();
                    for &(next, _) in &self.nodes[id].next {
                        union.extend(set_of(next, &sets));
                    }
                    sets[gate] = union;
                }
            }
        }

        sets.into_iter().map(|set| set.into_iter().collect()).collect()
    }
}
