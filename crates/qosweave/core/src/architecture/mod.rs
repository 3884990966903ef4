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

//! Architecture tree
//!
//! The composition structure of an application: task leaves referencing
//! catalog slots, grouped under `Sequential`, `Parallel`, `Conditional` and
//! `Iterative` composites. Nodes live in a flat arena indexed by
//! `ComponentId`; sub-trees are shared by index instead of deep-copied, so
//! the resolver can cheaply narrow an architecture to one child or regroup a
//! batch of children without touching the rest of the arena.
//!
//! Weights (leaf counts) are computed once at construction and cached on each
//! node. Nested sequentials flatten into their parent at construction, so a
//! sequential child of a sequential composite never survives.

mod value;

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ComponentId = usize;

#[derive(Error, Debug, PartialEq)]
pub enum ArchitectureError {
    #[error("a {pattern} composite needs at least 2 children, got {children}")]
    TooFewChildren { pattern: &'static str, children: usize },

    #[error("a conditional composite over {children} children got {probabilities} branch probabilities")]
    ProbabilityArity { children: usize, probabilities: usize },

    #[error("branch probabilities must sum to 1, got {sum}")]
    ProbabilitySum { sum: f64 },

    #[error("branch probability {probability} is outside [0, 1]")]
    ProbabilityRange { probability: f64 },

    #[error("iteration continue-probability {probability} must lie strictly inside (0, 1)")]
    ContinueProbabilityRange { probability: f64 },
}

/// Composition pattern of a composite node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Sequential,
    Parallel,
    /// Exactly one branch executes; `probabilities[i]` is the chance of
    /// branch `i` and the list sums to 1.
    Conditional { probabilities: Vec<f64> },
    /// The body repeats with probability `continue_probability` after each
    /// pass, a geometric number of executions.
    Iterative { continue_probability: f64 },
}

impl Pattern {
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Sequential => "SEQUENTIAL",
            Pattern::Parallel => "PARALLEL",
            Pattern::Conditional { .. } => "CONDITIONAL",
            Pattern::Iterative { .. } => "ITERATIVE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Leaf bound to a catalog task slot (global slot index).
    Task { slot: usize },
    Composite { pattern: Pattern, children: Vec<ComponentId> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentNode {
    pub kind: ComponentKind,
    /// Number of task leaves under this node, inclusive.
    pub weight: usize,
    pub parent: Option<ComponentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Architecture {
    nodes: Vec<ComponentNode>,
    root: ComponentId,
}

impl Architecture {
    /// A single task leaf.
    pub fn task(slot: usize) -> Self {
        Self {
            nodes: vec![ComponentNode { kind: ComponentKind::Task { slot }, weight: 1, parent: None }],
            root: 0,
        }
    }

    pub fn sequential(children: Vec<Architecture>) -> Result<Self, ArchitectureError> {
        if children.len() < 2 {
            return Err(ArchitectureError::TooFewChildren { pattern: "SEQUENTIAL", children: children.len() });
        }
        Ok(Self::compose(Pattern::Sequential, children))
    }

    pub fn parallel(children: Vec<Architecture>) -> Result<Self, ArchitectureError> {
        if children.len() < 2 {
            return Err(ArchitectureError::TooFewChildren { pattern: "PARALLEL", children: children.len() });
        }
        Ok(Self::compose(Pattern::Parallel, children))
    }

    pub fn conditional(children: Vec<Architecture>, probabilities: Vec<f64>) -> Result<Self, ArchitectureError> {
        if children.len() < 2 {
            return Err(ArchitectureError::TooFewChildren { pattern: "CONDITIONAL", children: children.len() });
        }
        if probabilities.len() != children.len() {
            return Err(ArchitectureError::ProbabilityArity { children: children.len(), probabilities: probabilities.len() });
        }
        for &p in &probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ArchitectureError::ProbabilityRange { probability: p });
            }
        }
        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(ArchitectureError::ProbabilitySum { sum });
        }
        Ok(Self::compose(Pattern::Conditional { probabilities }, children))
    }

    pub fn iterative(children: Vec<Architecture>, continue_probability: f64) -> Result<Self, ArchitectureError> {
        if children.len() < 2 {
            return Err(ArchitectureError::TooFewChildren { pattern: "ITERATIVE", children: children.len() });
        }
        if continue_probability <= 0.0 || continue_probability >= 1.0 {
            return Err(ArchitectureError::ContinueProbabilityRange { probability: continue_probability });
        }
        Ok(Self::compose(Pattern::Iterative { continue_probability }, children))
    }

    /// Merge child arenas into one and push the new composite root last.
    /// Sequential children of a sequential parent are flattened away.
    fn compose(pattern: Pattern, children: Vec<Architecture>) -> Self {
        let flatten = pattern == Pattern::Sequential;
        let mut nodes: Vec<ComponentNode> = Vec::new();
        let mut child_ids: Vec<ComponentId> = Vec::new();

        for child in children {
            let offset = nodes.len();
            let child_root = child.root;
            // Constructors always push the root last, which lets us drop a
            // flattened sequential root without leaving a hole in the arena.
            let strip_root = flatten && child_root == child.nodes.len() - 1 && matches!(&child.nodes[child_root].kind, ComponentKind::Composite { pattern: Pattern::Sequential, .. });

            let kept = if strip_root { child.nodes.len() - 1 } else { child.nodes.len() };
            let mut grandchildren: Vec<ComponentId> = Vec::new();
            if strip_root {
                if let ComponentKind::Composite { children: inner, .. } = &child.nodes[child_root].kind {
                    grandchildren = inner.iter().map(|&id| id + offset).collect();
                }
            }

            for (index, mut node) in child.nodes.into_iter().enumerate() {
                if index >= kept {
                    break;
                }
                if let ComponentKind::Composite { children, .. } = &mut node.kind {
                    for id in children.iter_mut() {
                        *id += offset;
                    }
                }
                node.parent = node.parent.map(|p| p + offset);
                nodes.push(node);
            }

            if strip_root {
                child_ids.extend(grandchildren);
            } else {
                child_ids.push(child_root + offset);
            }
        }

        let weight = child_ids.iter().map(|&id| nodes[id].weight).sum();
        let root = nodes.len();
        for &id in &child_ids {
            nodes[id].parent = Some(root);
        }
        nodes.push(ComponentNode { kind: ComponentKind::Composite { pattern, children: child_ids }, weight, parent: None });
        Self { nodes, root }
    }

    pub fn root(&self) -> ComponentId {
        self.root
    }

    pub fn node(&self, id: ComponentId) -> &ComponentNode {
        &self.nodes[id]
    }

    /// Total number of task leaves.
    pub fn weight(&self) -> usize {
        self.nodes[self.root].weight
    }

    pub fn component_weight(&self, id: ComponentId) -> usize {
        self.nodes[id].weight
    }

    pub fn pattern(&self, id: ComponentId) -> Option<&Pattern> {
        match &self.nodes[id].kind {
            ComponentKind::Composite { pattern, .. } => Some(pattern),
            ComponentKind::Task { .. } => None,
        }
    }

    /// Direct children of a composite; empty for a task leaf.
    pub fn children(&self, id: ComponentId) -> &[ComponentId] {
        match &self.nodes[id].kind {
            ComponentKind::Composite { children, .. } => children,
            ComponentKind::Task { .. } => &[],
        }
    }

    pub fn slot(&self, id: ComponentId) -> Option<usize> {
        match &self.nodes[id].kind {
            ComponentKind::Task { slot } => Some(*slot),
            ComponentKind::Composite { .. } => None,
        }
    }

    /// Catalog slot indices of all leaves under `id`, left to right.
    pub fn leaf_slots_under(&self, id: ComponentId) -> Vec<usize> {
        let mut slots = Vec::with_capacity(self.nodes[id].weight);
        self.collect_leaves(id, &mut slots);
        slots
    }

    /// Catalog slot indices of all leaves, left to right.
    pub fn leaf_slots(&self) -> Vec<usize> {
        self.leaf_slots_under(self.root)
    }

    fn collect_leaves(&self, id: ComponentId, out: &mut Vec<usize>) {
        match &self.nodes[id].kind {
            ComponentKind::Task { slot } => out.push(*slot),
            ComponentKind::Composite { children, .. } => {
                for &child in children {
                    self.collect_leaves(child, out);
                }
            }
        }
    }

    /// View of this architecture rooted at `id`. The arena is shared by
    /// clone; only the root pointer moves.
    pub fn narrowed(&self, id: ComponentId) -> Architecture {
        Architecture { nodes: self.nodes.clone(), root: id }
    }

    /// Regroup existing children under a fresh sequential composite. Used by
    /// the resolver to turn a packed batch into its own sub-problem.
    pub fn regroup_sequential(&self, children: &[ComponentId]) -> Architecture {
        self.regroup(Pattern::Sequential, children)
    }

    /// Regroup existing children under a fresh conditional composite with
    /// renormalized branch probabilities.
    pub fn regroup_conditional(&self, children: &[ComponentId], probabilities: Vec<f64>) -> Architecture {
        self.regroup(Pattern::Conditional { probabilities }, children)
    }

    fn regroup(&self, pattern: Pattern, children: &[ComponentId]) -> Architecture {
        let mut nodes = self.nodes.clone();
        let root = nodes.len();
        let weight = children.iter().map(|&id| nodes[id].weight).sum();
        for &id in children {
            nodes[id].parent = Some(root);
        }
        nodes.push(ComponentNode { kind: ComponentKind::Composite { pattern, children: children.to_vec() }, weight, parent: None });
        Architecture { nodes, root }
    }

    /// Pattern names from the root down to (excluding) `leaf`, then the leaf
    /// itself is identified by its slot. Used for export paths.
    pub fn path_to(&self, leaf: ComponentId) -> Vec<&'static str> {
        let mut labels = Vec::new();
        let mut cursor = self.nodes[leaf].parent;
        while let Some(id) = cursor {
            if let ComponentKind::Composite { pattern, .. } = &self.nodes[id].kind {
                labels.push(pattern.name());
            }
            if id == self.root {
                break;
            }
            cursor = self.nodes[id].parent;
        }
        labels.reverse();
        labels
    }

    /// Leaf component ids under the root, left to right.
    pub fn leaf_ids(&self) -> Vec<ComponentId> {
        let mut out = Vec::with_capacity(self.weight());
        self.collect_leaf_ids(self.root, &mut out);
        out
    }

    fn collect_leaf_ids(&self, id: ComponentId, out: &mut Vec<ComponentId>) {
        match &self.nodes[id].kind {
            ComponentKind::Task { .. } => out.push(id),
            ComponentKind::Composite { children, .. } => {
                for &child in children {
                    self.collect_leaf_ids(child, out);
                }
            }
        }
    }

    pub(crate) fn unsupported(&self, id: ComponentId, attribute: qosweave_common::Attribute) -> ModelError {
        let pattern = self.pattern(id).map(Pattern::name).unwrap_or("TASK");
        ModelError::UnsupportedAttribute { attribute, pattern }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(slots: &[usize]) -> Architecture {
        Architecture::sequential(slots.iter().map(|&s| Architecture::task(s)).collect()).unwrap()
    }

    #[test]
    fn test_weight_counts_leaves() {
        let arch = Architecture::parallel(vec![chain(&[0, 1]), chain(&[2, 3, 4])]).unwrap();
        assert_eq!(arch.weight(), 5);
        let children = arch.children(arch.root()).to_vec();
        assert_eq!(arch.component_weight(children[0]), 2);
        assert_eq!(arch.component_weight(children[1]), 3);
    }

    #[test]
    fn test_nested_sequentials_flatten() {
        let inner = chain(&[1, 2]);
        let arch = Architecture::sequential(vec![Architecture::task(0), inner, Architecture::task(3)]).unwrap();
        // One composite over four direct leaves, no surviving inner sequential.
        assert_eq!(arch.children(arch.root()).len(), 4);
        assert_eq!(arch.leaf_slots(), vec![0, 1, 2, 3]);
        for &child in arch.children(arch.root()) {
            assert!(arch.slot(child).is_some());
        }
    }

    #[test]
    fn test_parallel_does_not_flatten() {
        let arch = Architecture::parallel(vec![chain(&[0, 1]), chain(&[2, 3])]).unwrap();
        assert_eq!(arch.children(arch.root()).len(), 2);
        assert_eq!(arch.leaf_slots(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_conditional_validation() {
        let branches = || vec![Architecture::task(0), Architecture::task(1)];
        assert!(Architecture::conditional(branches(), vec![0.5, 0.5]).is_ok());
        assert_eq!(
            Architecture::conditional(branches(), vec![0.5]).unwrap_err(),
            ArchitectureError::ProbabilityArity { children: 2, probabilities: 1 }
        );
        assert!(matches!(
            Architecture::conditional(branches(), vec![0.7, 0.7]).unwrap_err(),
            ArchitectureError::ProbabilitySum { .. }
        ));
        assert!(matches!(
            Architecture::conditional(branches(), vec![1.3, -0.3]).unwrap_err(),
            ArchitectureError::ProbabilityRange { .. }
        ));
    }

    #[test]
    fn test_iterative_probability_is_exclusive() {
        let body = || vec![Architecture::task(0), Architecture::task(1)];
        assert!(Architecture::iterative(body(), 0.3).is_ok());
        assert!(Architecture::iterative(body(), 0.0).is_err());
        assert!(Architecture::iterative(body(), 1.0).is_err());
    }

    #[test]
    fn test_too_few_children() {
        assert_eq!(
            Architecture::sequential(vec![Architecture::task(0)]).unwrap_err(),
            ArchitectureError::TooFewChildren { pattern: "SEQUENTIAL", children: 1 }
        );
    }

    #[test]
    fn test_narrowed_shares_arena() {
        let arch = Architecture::parallel(vec![chain(&[0, 1]), chain(&[2, 3])]).unwrap();
        let branch = arch.children(arch.root())[1];
        let view = arch.narrowed(branch);
        assert_eq!(view.weight(), 2);
        assert_eq!(view.leaf_slots(), vec![2, 3]);
    }

    #[test]
    fn test_regroup_conditional() {
        let arch = Architecture::conditional(
            vec![Architecture::task(0), Architecture::task(1), Architecture::task(2)],
            vec![0.2, 0.3, 0.5],
        )
        .unwrap();
        let children = arch.children(arch.root()).to_vec();
        let batch = arch.regroup_conditional(&children[..2], vec![0.4, 0.6]);
        assert_eq!(batch.weight(), 2);
        assert_eq!(batch.leaf_slots(), vec![0, 1]);
        assert_eq!(batch.pattern(batch.root()), Some(&Pattern::Conditional { probabilities: vec![0.4, 0.6] }));
    }

    #[test]
    fn test_path_to_leaf() {
        let arch = Architecture::sequential(vec![
            Architecture::task(0),
            Architecture::parallel(vec![Architecture::task(1), Architecture::task(2)]).unwrap(),
        ])
        .unwrap();
        let leaves = arch.leaf_ids();
        assert_eq!(arch.path_to(leaves[0]), vec!["SEQUENTIAL"]);
        assert_eq!(arch.path_to(leaves[1]), vec!["SEQUENTIAL", "PARALLEL"]);
    }
}
