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

//! Application: the optimization problem
//!
//! An application ties together the catalog, the architecture tree, the
//! execution graph (when channel attributes are in play), attribute weights,
//! constraints and normalization state. It owns the fitness function.
//!
//! Evaluation is stateless with respect to the candidate being scored: the
//! provider assignment travels as an explicit [`Selection`] parameter, so any
//! number of threads can score selections against one shared application.
//! Sub-problems are cheap narrowed clones; the catalog, gate table and graph
//! are shared behind `Arc`s.

use crate::architecture::Architecture;
use crate::catalog::{Catalog, Provider, TaskSlot};
use crate::composition::Composition;
use crate::error::ModelError;
use crate::graph::{latency, throughput, ExecutionGraph};
use qosweave_common::{Attribute, Constraint, GeoPoint, MinMax, Normalization, NormalizationMethod};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// A provider assignment under evaluation, passed by parameter so evaluation
/// never mutates shared state.
#[derive(Debug, Clone, Copy)]
pub enum Selection<'a> {
    /// Candidate positions per explored index, as produced by an optimizer.
    Genotype(&'a [usize]),
    /// Explored index → global provider index, as produced by the resolver.
    Providers(&'a Composition),
    /// Every slot and gate resolves to the same provider. Used for
    /// normalization bounds.
    Uniform(&'a Provider),
}

/// Outcome of scoring one selection. A violated hard constraint is not an
/// error; it is a feasibility verdict with score zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Feasible(f64),
    HardViolation,
}

impl Evaluation {
    pub fn score(&self) -> f64 {
        match self {
            Evaluation::Feasible(score) => *score,
            Evaluation::HardViolation => 0.0,
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self, Evaluation::Feasible(_))
    }
}

/// Routing middleware point at a composite boundary. Candidates are the
/// union of the provider sets flowing into the gate.
#[derive(Debug, Clone)]
pub struct Gate {
    id: usize,
    candidates: Vec<usize>,
}

impl Gate {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    pub fn candidate(&self, position: usize) -> Option<usize> {
        self.candidates.get(position).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Application {
    catalog: Arc<Catalog>,
    architecture: Architecture,
    gates: Arc<Vec<Gate>>,
    graph: Option<Arc<ExecutionGraph>>,
    weights: BTreeMap<Attribute, f64>,
    hard_constraints: BTreeMap<Attribute, Constraint>,
    soft_constraints: BTreeMap<Attribute, Constraint>,
    soft_penalty_weight: f64,
    method: NormalizationMethod,
    provider_norm: HashMap<Attribute, Normalization>,
    app_norm: HashMap<Attribute, Normalization>,
    /// Global slot index → genotype position, in leaf order.
    slots_to_explore: BTreeMap<usize, usize>,
    /// Gate id → genotype position, offset past the explored slots.
    gates_to_explore: BTreeMap<usize, usize>,
}

pub struct ApplicationBuilder {
    providers: Vec<Provider>,
    slots: Vec<TaskSlot>,
    architecture: Architecture,
    weights: BTreeMap<Attribute, f64>,
    hard_constraints: BTreeMap<Attribute, Constraint>,
    soft_constraints: BTreeMap<Attribute, Constraint>,
    soft_penalty_weight: f64,
    method: NormalizationMethod,
    boundary: Option<(GeoPoint, GeoPoint)>,
}

impl ApplicationBuilder {
    pub fn new(providers: Vec<Provider>, slots: Vec<TaskSlot>, architecture: Architecture) -> Self {
        Self {
            providers,
            slots,
            architecture,
            weights: BTreeMap::new(),
            hard_constraints: BTreeMap::new(),
            soft_constraints: BTreeMap::new(),
            soft_penalty_weight: 0.0,
            method: NormalizationMethod::MinMax,
            boundary: None,
        }
    }

    pub fn weights(mut self, weights: BTreeMap<Attribute, f64>) -> Self {
        self.weights = weights;
        self
    }

    pub fn weight(mut self, attribute: Attribute, weight: f64) -> Self {
        self.weights.insert(attribute, weight);
        self
    }

    pub fn hard_constraint(mut self, attribute: Attribute, constraint: Constraint) -> Self {
        self.hard_constraints.insert(attribute, constraint);
        self
    }

    pub fn soft_constraint(mut self, attribute: Attribute, constraint: Constraint) -> Self {
        self.soft_constraints.insert(attribute, constraint);
        self
    }

    /// Blend factor between the soft-violation ratio and the weighted score.
    pub fn soft_penalty_weight(mut self, weight: f64) -> Self {
        self.soft_penalty_weight = weight;
        self
    }

    pub fn normalization_method(mut self, method: NormalizationMethod) -> Self {
        self.method = method;
        self
    }

    /// Entry and exit points of the request flow, required as soon as a
    /// channel attribute carries weight.
    pub fn boundary(mut self, input: GeoPoint, output: GeoPoint) -> Self {
        self.boundary = Some((input, output));
        self
    }

    pub fn build(self) -> Result<Application, ModelError> {
        let provider_attributes: Vec<Attribute> = self.weights.keys().copied().filter(|a| !a.is_channel()).collect();
        let channel_attributes: Vec<Attribute> = self.weights.keys().copied().filter(|a| a.is_channel()).collect();

        let mut catalog = Catalog::new(self.providers, self.slots)?;
        let provider_norm = catalog.normalize_providers(&provider_attributes, self.method)?;
        let catalog = Arc::new(catalog);

        let slots_to_explore: BTreeMap<usize, usize> =
            self.architecture.leaf_slots().into_iter().enumerate().map(|(position, slot)| (slot, position)).collect();

        let (graph, gates, gates_to_explore) = if channel_attributes.is_empty() {
            (None, Arc::new(Vec::new()), BTreeMap::new())
        } else {
            let (input, output) = self
                .boundary
                .ok_or(ModelError::MissingBoundaryPoint { attribute: channel_attributes[0] })?;
            let graph = ExecutionGraph::build(&self.architecture, input, output);
            let gates: Vec<Gate> = graph
                .gate_candidates(|slot| catalog.slot(slot).candidates().to_vec())
                .into_iter()
                .enumerate()
                .map(|(id, candidates)| Gate { id, candidates })
                .collect();
            let offset = slots_to_explore.len();
            let gates_to_explore = gates.iter().map(|gate| (gate.id, offset + gate.id)).collect();
            (Some(Arc::new(graph)), Arc::new(gates), gates_to_explore)
        };

        let mut app = Application {
            catalog,
            architecture: self.architecture,
            gates,
            graph,
            weights: self.weights,
            hard_constraints: self.hard_constraints,
            soft_constraints: self.soft_constraints,
            soft_penalty_weight: self.soft_penalty_weight,
            method: self.method,
            provider_norm,
            app_norm: HashMap::new(),
            slots_to_explore,
            gates_to_explore,
        };
        app.refresh_bounds()?;
        Ok(app)
    }
}

impl Application {
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    pub fn graph(&self) -> Option<&ExecutionGraph> {
        self.graph.as_deref()
    }

    pub fn gate(&self, id: usize) -> &Gate {
        &self.gates[id]
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn weights(&self) -> &BTreeMap<Attribute, f64> {
        &self.weights
    }

    pub fn slots_to_explore(&self) -> &BTreeMap<usize, usize> {
        &self.slots_to_explore
    }

    pub fn gates_to_explore(&self) -> &BTreeMap<usize, usize> {
        &self.gates_to_explore
    }

    /// Genotype length: explored slots plus explored gates.
    pub fn explored_len(&self) -> usize {
        self.slots_to_explore.len() + self.gates_to_explore.len()
    }

    pub fn normalization_method(&self) -> NormalizationMethod {
        self.method
    }

    pub fn app_normalization(&self, attribute: Attribute) -> Option<Normalization> {
        self.app_norm.get(&attribute).copied()
    }

    /// Composition key of a gate in the flat slot-then-gate index space.
    pub fn gate_key(&self, gate: usize) -> usize {
        self.catalog.slots().len() + gate
    }

    pub fn set_weight(&mut self, attribute: Attribute, weight: f64) {
        self.weights.insert(attribute, weight);
    }

    pub fn set_hard_constraint(&mut self, attribute: Attribute, constraint: Constraint) {
        self.hard_constraints.insert(attribute, constraint);
    }

    pub fn set_soft_constraint(&mut self, attribute: Attribute, constraint: Constraint) {
        self.soft_constraints.insert(attribute, constraint);
    }

    /// Provider answering for `slot` under `selection`. An index missing
    /// from the selection falls back to the slot's first candidate. The
    /// returned borrow lives as long as both the application and the
    /// selection's own provider reference.
    pub fn selected_provider<'a>(&'a self, slot: usize, selection: &Selection<'a>) -> Result<&'a Provider, ModelError> {
        match selection {
            Selection::Uniform(provider) => Ok(provider),
            Selection::Genotype(genes) => {
                let position = self
                    .slots_to_explore
                    .get(&slot)
                    .and_then(|&p| genes.get(p).copied())
                    .unwrap_or(0);
                let slot_ref = self.catalog.slot(slot);
                let provider = slot_ref.candidate(position).ok_or_else(|| ModelError::CandidatePositionOutOfRange {
                    slot: slot_ref.name().to_string(),
                    position,
                    candidates: slot_ref.candidates().len(),
                })?;
                Ok(self.catalog.provider(provider))
            }
            Selection::Providers(composition) => {
                let slot_ref = self.catalog.slot(slot);
                let provider = match composition.get(&slot) {
                    Some(&provider) => {
                        if provider >= self.catalog.providers().len() {
                            return Err(ModelError::CandidateOutOfRange {
                                slot: slot_ref.name().to_string(),
                                candidate: provider,
                                providers: self.catalog.providers().len(),
                            });
                        }
                        provider
                    }
                    None => slot_ref.candidates()[0],
                };
                Ok(self.catalog.provider(provider))
            }
        }
    }

    /// Provider answering for gate `gate` under `selection`.
    pub fn selected_gate_provider<'a>(&'a self, gate: usize, selection: &Selection<'a>) -> Result<&'a Provider, ModelError> {
        match selection {
            Selection::Uniform(provider) => Ok(provider),
            Selection::Genotype(genes) => {
                let position = self
                    .gates_to_explore
                    .get(&gate)
                    .and_then(|&p| genes.get(p).copied())
                    .unwrap_or(0);
                let gate_ref = &self.gates[gate];
                let provider = gate_ref.candidate(position).ok_or(ModelError::GatePositionOutOfRange {
                    gate,
                    position,
                    candidates: gate_ref.candidates().len(),
                })?;
                Ok(self.catalog.provider(provider))
            }
            Selection::Providers(composition) => {
                let gate_ref = &self.gates[gate];
                let provider = match composition.get(&self.gate_key(gate)) {
                    Some(&provider) => provider,
                    None => gate_ref.candidates()[0],
                };
                Ok(self.catalog.provider(provider))
            }
        }
    }

    /// Raw end-to-end value of one attribute: channel attributes propagate
    /// over the graph, provider attributes aggregate over the tree.
    pub fn value_of(&self, attribute: Attribute, selection: &Selection<'_>) -> Result<f64, ModelError> {
        match attribute {
            Attribute::Latency => {
                let graph = self.graph.as_deref().ok_or(ModelError::MissingBoundaryPoint { attribute })?;
                latency::value(graph, self, selection)
            }
            Attribute::Throughput => {
                let graph = self.graph.as_deref().ok_or(ModelError::MissingBoundaryPoint { attribute })?;
                throughput::value(graph, self, selection)
            }
            _ => self.architecture.value(self, attribute, selection),
        }
    }

    /// Score a selection: hard constraints short-circuit to a zero-score
    /// verdict, soft violations dilute the weighted sum.
    pub fn evaluate(&self, selection: &Selection<'_>) -> Result<Evaluation, ModelError> {
        let constrained = !self.hard_constraints.is_empty() || !self.soft_constraints.is_empty();
        let mut fitness = 0.0;
        let mut soft_failed = 0usize;

        for (&attribute, &weight) in &self.weights {
            let value = self.value_of(attribute, selection)?;

            if constrained {
                if let Some(hard) = self.hard_constraints.get(&attribute) {
                    if hard.is_violated(value) {
                        return Ok(Evaluation::HardViolation);
                    }
                }
                if let Some(soft) = self.soft_constraints.get(&attribute) {
                    if soft.is_violated(value) {
                        soft_failed += 1;
                    }
                }
            }

            let norm = self.app_norm.get(&attribute).ok_or(ModelError::UnknownAttribute { attribute })?;
            fitness += norm.normalize(value, attribute.to_minimize(), self.method) * weight;
        }

        if constrained {
            let n = 1.0 - soft_failed as f64 / (self.soft_constraints.len().max(1)) as f64;
            fitness = n * self.soft_penalty_weight + (1.0 - self.soft_penalty_weight) * fitness;
        }
        Ok(Evaluation::Feasible(fitness))
    }

    pub fn fitness(&self, selection: &Selection<'_>) -> Result<f64, ModelError> {
        self.evaluate(selection).map(|evaluation| evaluation.score())
    }

    /// Recompute the application-level normalization bounds: provider
    /// attributes via uniform best/worst synthetic providers, channel
    /// attributes via graph propagation bounds, and the multiplicative
    /// attributes pinned to [0, 1].
    pub fn refresh_bounds(&mut self) -> Result<(), ModelError> {
        let bounds = self.compute_bounds()?;
        debug!(bounds = bounds.len(), "application normalization refreshed");
        self.app_norm = bounds;
        Ok(())
    }

    fn compute_bounds(&self) -> Result<HashMap<Attribute, Normalization>, ModelError> {
        let mut high_attrs = HashMap::new();
        let mut low_attrs = HashMap::new();
        for (&attribute, norm) in &self.provider_norm {
            high_attrs.insert(attribute, norm.max());
            low_attrs.insert(attribute, norm.min());
        }
        let higher = Provider::synthetic("higher", high_attrs.clone(), high_attrs);
        let lower = Provider::synthetic("lower", low_attrs.clone(), low_attrs);

        let mut bounds = HashMap::new();
        for &attribute in self.weights.keys() {
            if attribute.is_channel() {
                continue;
            }
            let norm = match attribute {
                // Products of values in [0, 1] stay in [0, 1].
                Attribute::Availability | Attribute::Reliability => Normalization::new(0.0, 1.0),
                _ => {
                    let mut minmax = MinMax::new();
                    minmax.observe(self.architecture.value(self, attribute, &Selection::Uniform(&higher))?);
                    minmax.observe(self.architecture.value(self, attribute, &Selection::Uniform(&lower))?);
                    Normalization::from(minmax)
                }
            };
            bounds.insert(attribute, norm);
        }

        if let Some(graph) = self.graph.as_deref() {
            if self.weights.contains_key(&Attribute::Latency) {
                let (min, max) = latency::bounds(graph, self)?;
                bounds.insert(Attribute::Latency, Normalization::new(min, max));
            }
            if self.weights.contains_key(&Attribute::Throughput) {
                let (min, max) = throughput::bounds(graph, self)?;
                bounds.insert(Attribute::Throughput, Normalization::new(min, max));
            }
        }
        Ok(bounds)
    }

    /// Narrow this problem to `architecture`, re-enumerating genotype
    /// positions over its leaves. Normalization bounds are inherited; callers
    /// that need branch-local bounds refresh them explicitly.
    pub fn sub_problem(&self, architecture: Architecture) -> Application {
        let slots_to_explore: BTreeMap<usize, usize> =
            architecture.leaf_slots().into_iter().enumerate().map(|(position, slot)| (slot, position)).collect();
        let offset = slots_to_explore.len();
        let gates_to_explore = self.gates.iter().map(|gate| (gate.id, offset + gate.id)).collect();

        let mut sub = self.clone();
        sub.architecture = architecture;
        sub.slots_to_explore = slots_to_explore;
        sub.gates_to_explore = gates_to_explore;
        sub
    }

    /// Decode an optimizer genotype into a composition over this problem's
    /// explored indices.
    pub fn decode_genotype(&self, genes: &[usize]) -> Result<Composition, ModelError> {
        let mut composition = Composition::new();
        for (&slot, &position) in &self.slots_to_explore {
            let gene = genes.get(position).copied().unwrap_or(0);
            let slot_ref = self.catalog.slot(slot);
            let provider = slot_ref.candidate(gene).ok_or_else(|| ModelError::CandidatePositionOutOfRange {
                slot: slot_ref.name().to_string(),
                position: gene,
                candidates: slot_ref.candidates().len(),
            })?;
            composition.insert(slot, provider);
        }
        for (&gate, &position) in &self.gates_to_explore {
            let gene = genes.get(position).copied().unwrap_or(0);
            let gate_ref = &self.gates[gate];
            let provider = gate_ref.candidate(gene).ok_or(ModelError::GatePositionOutOfRange {
                gate,
                position: gene,
                candidates: gate_ref.candidates().len(),
            })?;
            composition.insert(self.gate_key(gate), provider);
        }
        Ok(composition)
    }

    /// Number of candidates at each genotype position, the optimizer's gene
    /// ranges.
    pub fn candidate_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.explored_len()];
        for (&slot, &position) in &self.slots_to_explore {
            counts[position] = self.catalog.slot(slot).candidates().len();
        }
        for (&gate, &position) in &self.gates_to_explore {
            counts[position] = self.gates[gate].candidates().len();
        }
        counts
    }

    /// Collapse a resolved sub-architecture into one synthetic provider
    /// carrying its aggregate attribute values, so a parent problem can
    /// treat the whole branch as a single candidate.
    pub fn to_provider(&self, composition: &Composition) -> Result<Provider, ModelError> {
        let selection = Selection::Providers(composition);
        let mut attributes = HashMap::new();
        let mut normalized = HashMap::new();
        for &attribute in self.weights.keys() {
            if attribute.is_channel() {
                continue;
            }
            attributes.insert(attribute, self.architecture.value(self, attribute, &selection)?);
            normalized.insert(attribute, self.architecture.normalized_value(self, attribute, &selection)?);
        }
        Ok(Provider::synthetic("aggregate", attributes, normalized))
    }

    /// Weighted fitness of a composition, convenience over
    /// [`Selection::Providers`].
    pub fn fitness_of(&self, composition: &Composition) -> Result<f64, ModelError> {
        self.fitness(&Selection::Providers(composition))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qosweave_common::Constraint;

    fn provider(name: &str, time: f64, cost: f64) -> Provider {
        Provider::new(name, HashMap::from([(Attribute::ResponseTime, time), (Attribute::Cost, cost)]))
    }

    fn chain(slots: &[usize]) -> Architecture {
        Architecture::sequential(slots.iter().map(|&s| Architecture::task(s)).collect()).unwrap()
    }

    fn builder() -> ApplicationBuilder {
        let providers = vec![provider("p0", 2.0, 10.0), provider("p1", 4.0, 5.0)];
        let slots = vec![TaskSlot::new("s0", vec![0, 1]), TaskSlot::new("s1", vec![0, 1])];
        ApplicationBuilder::new(providers, slots, chain(&[0, 1]))
            .weight(Attribute::ResponseTime, 0.5)
            .weight(Attribute::Cost, 0.5)
    }

    #[test]
    fn test_bounds_from_uniform_extremes() {
        let app = builder().build().unwrap();
        // Response time: sum of two slots, all-best 2+2=4 to all-worst 4+4=8.
        let rt = app.app_normalization(Attribute::ResponseTime).unwrap();
        assert_eq!((rt.min(), rt.max()), (4.0, 8.0));
        let cost = app.app_normalization(Attribute::Cost).unwrap();
        assert_eq!((cost.min(), cost.max()), (10.0, 20.0));
    }

    #[test]
    fn test_multiplicative_bounds_are_unit_interval() {
        let providers = vec![
            Provider::new("p0", HashMap::from([(Attribute::Availability, 0.9)])),
            Provider::new("p1", HashMap::from([(Attribute::Availability, 0.99)])),
        ];
        let slots = vec![TaskSlot::new("s0", vec![0, 1]), TaskSlot::new("s1", vec![0, 1])];
        let app = ApplicationBuilder::new(providers, slots, chain(&[0, 1]))
            .weight(Attribute::Availability, 1.0)
            .build()
            .unwrap();
        let norm = app.app_normalization(Attribute::Availability).unwrap();
        assert_eq!((norm.min(), norm.max()), (0.0, 1.0));
    }

    #[test]
    fn test_fitness_weighted_sum() {
        let app = builder().build().unwrap();
        // p0 then p1: response time 6 of [4, 8] → 0.5, cost 15 of [10, 20] → 0.5.
        let genes = [0usize, 1];
        let fitness = app.fitness(&Selection::Genotype(&genes)).unwrap();
        assert!((fitness - 0.5).abs() < 1e-12);
        // All-fast providers: response time 4 → 1.0, cost 20 → 0.0.
        let genes = [0usize, 0];
        assert!((app.fitness(&Selection::Genotype(&genes)).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_hard_constraint_short_circuits() {
        let app = builder().hard_constraint(Attribute::Cost, Constraint::less_than(15.0)).build().unwrap();
        let genes = [0usize, 1];
        // Cost 15 is not strictly below 15.
        assert_eq!(app.evaluate(&Selection::Genotype(&genes)).unwrap(), Evaluation::HardViolation);
        let genes = [1usize, 1];
        assert!(app.evaluate(&Selection::Genotype(&genes)).unwrap().is_feasible());
    }

    #[test]
    fn test_soft_constraint_dilutes_fitness() {
        let app = builder()
            .soft_constraint(Attribute::Cost, Constraint::less_than(12.0))
            .soft_penalty_weight(0.5)
            .build()
            .unwrap();
        // Violating selection: base fitness 0.5, ratio n = 0.
        let genes = [0usize, 1];
        assert!((app.fitness(&Selection::Genotype(&genes)).unwrap() - 0.25).abs() < 1e-12);
        // Satisfying selection: cost 10 → base 0.5 · 0.5 + 1 · 0.5 = 0.75.
        let genes = [1usize, 1];
        assert!((app.fitness(&Selection::Genotype(&genes)).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_selection_borrows_from_its_provider() {
        let app = builder().build().unwrap();
        let uniform = provider("fixed", 1.0, 1.0);
        // The returned borrow must outlive the Selection value itself, since
        // it points at the uniform provider, not into the selection.
        let selected = {
            let selection = Selection::Uniform(&uniform);
            app.selected_provider(0, &selection).unwrap()
        };
        assert_eq!(selected.name(), "fixed");
        assert_eq!(selected.attribute(Attribute::Cost), Some(1.0));
    }

    #[test]
    fn test_composition_selection_falls_back_to_first_candidate() {
        let app = builder().build().unwrap();
        let composition = Composition::from([(0usize, 1usize)]);
        // Slot 1 is missing from the composition and defaults to candidate 0.
        let p0 = app.selected_provider(0, &Selection::Providers(&composition)).unwrap();
        let p1 = app.selected_provider(1, &Selection::Providers(&composition)).unwrap();
        assert_eq!(p0.name(), "p1");
        assert_eq!(p1.name(), "p0");
    }

    #[test]
    fn test_sub_problem_renumbers_positions() {
        let providers = vec![provider("p0", 2.0, 10.0), provider("p1", 4.0, 5.0)];
        let slots = (0..3).map(|i| TaskSlot::new(format!("s{i}"), vec![0, 1])).collect();
        let app = ApplicationBuilder::new(providers, slots, chain(&[0, 1, 2]))
            .weight(Attribute::Cost, 1.0)
            .build()
            .unwrap();
        assert_eq!(app.explored_len(), 3);

        let branch = app.architecture().children(app.architecture().root())[2];
        let sub = app.sub_problem(app.architecture().narrowed(branch));
        assert_eq!(sub.explored_len(), 1);
        assert_eq!(sub.slots_to_explore().get(&2), Some(&0));
    }

    #[test]
    fn test_decode_genotype_maps_to_global_providers() {
        let app = builder().build().unwrap();
        let composition = app.decode_genotype(&[1, 0]).unwrap();
        assert_eq!(composition, Composition::from([(0, 1), (1, 0)]));
        assert!(app.decode_genotype(&[5, 0]).is_err());
    }

    #[test]
    fn test_to_provider_summarizes_branch() {
        let app = builder().build().unwrap();
        let composition = Composition::from([(0, 0), (1, 1)]);
        let aggregate = app.to_provider(&composition).unwrap();
        assert_eq!(aggregate.attribute(Attribute::ResponseTime), Some(6.0));
        assert_eq!(aggregate.attribute(Attribute::Cost), Some(15.0));
    }

    #[test]
    fn test_candidate_counts() {
        let app = builder().build().unwrap();
        assert_eq!(app.candidate_counts(), vec![2, 2]);
    }
}
