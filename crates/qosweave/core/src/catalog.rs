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

//! Provider catalog
//!
//! The catalog is the shared, read-only market: the global provider pool and
//! the task slots with their candidate lists. Candidates reference providers
//! by global index; every cross-reference is validated at construction so the
//! hot evaluation path never re-checks them. After an application seals its
//! catalog behind an `Arc`, no further mutation happens.

use crate::error::ModelError;
use qosweave_common::{Attribute, BandwidthClass, GeoPoint, MinMax, Normalization, NormalizationMethod};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A concrete service offering with its advertised QoS attributes.
///
/// Raw attribute values live in `attributes`; `normalized` is filled once per
/// catalog when the owning application fixes its normalization method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    name: String,
    attributes: HashMap<Attribute, f64>,
    normalized: HashMap<Attribute, f64>,
    location: Option<GeoPoint>,
    bandwidth: Option<BandwidthClass>,
}

impl Provider {
    pub fn new(name: impl Into<String>, attributes: HashMap<Attribute, f64>) -> Self {
        Self {
            name: name.into(),
            normalized: attributes.clone(),
            attributes,
            location: None,
            bandwidth: None,
        }
    }

    pub fn with_location(mut self, location: GeoPoint) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_bandwidth(mut self, bandwidth: BandwidthClass) -> Self {
        self.bandwidth = Some(bandwidth);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, attribute: Attribute) -> Option<f64> {
        self.attributes.get(&attribute).copied()
    }

    pub fn require_attribute(&self, attribute: Attribute) -> Result<f64, ModelError> {
        self.attribute(attribute).ok_or_else(|| ModelError::MissingAttribute {
            provider: self.name.clone(),
            attribute,
        })
    }

    pub fn normalized(&self, attribute: Attribute) -> Option<f64> {
        self.normalized.get(&attribute).copied()
    }

    pub fn require_normalized(&self, attribute: Attribute) -> Result<f64, ModelError> {
        self.normalized(attribute).ok_or_else(|| ModelError::MissingAttribute {
            provider: self.name.clone(),
            attribute,
        })
    }

    pub fn location(&self) -> Option<&GeoPoint> {
        self.location.as_ref()
    }

    pub fn require_location(&self) -> Result<&GeoPoint, ModelError> {
        self.location.as_ref().ok_or_else(|| ModelError::MissingLocation { provider: self.name.clone() })
    }

    pub fn bandwidth(&self) -> Option<BandwidthClass> {
        self.bandwidth
    }

    pub fn require_bandwidth(&self) -> Result<BandwidthClass, ModelError> {
        self.bandwidth.ok_or_else(|| ModelError::MissingBandwidth { provider: self.name.clone() })
    }

    pub(crate) fn set_normalized(&mut self, attribute: Attribute, value: f64) {
        self.normalized.insert(attribute, value);
    }

    /// Synthetic provider used for normalization bounds and for summarizing a
    /// resolved sub-architecture as a single candidate.
    pub(crate) fn synthetic(name: impl Into<String>, attributes: HashMap<Attribute, f64>, normalized: HashMap<Attribute, f64>) -> Self {
        Self {
            name: name.into(),
            attributes,
            normalized,
            location: None,
            bandwidth: None,
        }
    }
}

/// An abstract task of the application with its candidate provider indices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSlot {
    name: String,
    candidates: Vec<usize>,
}

impl TaskSlot {
    pub fn new(name: impl Into<String>, candidates: Vec<usize>) -> Self {
        Self { name: name.into(), candidates }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Global provider index of the candidate at `position`.
    pub fn candidate(&self, position: usize) -> Option<usize> {
        self.candidates.get(position).copied()
    }
}

/// The validated provider market shared by an application and all of its
/// sub-problems.
#[derive(Debug, Clone)]
pub struct Catalog {
    providers: Vec<Provider>,
    slots: Vec<TaskSlot>,
}

impl Catalog {
    pub fn new(providers: Vec<Provider>, slots: Vec<TaskSlot>) -> Result<Self, ModelError> {
        for slot in &slots {
            if slot.candidates.is_empty() {
                return Err(ModelError::EmptyCandidates { slot: slot.name.clone() });
            }
            for &candidate in &slot.candidates {
                if candidate >= providers.len() {
                    return Err(ModelError::CandidateOutOfRange {
                        slot: slot.name.clone(),
                        candidate,
                        providers: providers.len(),
                    });
                }
            }
        }
        Ok(Self { providers, slots })
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn provider(&self, index: usize) -> &Provider {
        &self.providers[index]
    }

    pub fn slots(&self) -> &[TaskSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> &TaskSlot {
        &self.slots[index]
    }

    /// Compute the provider-level normalization table for `attributes` and
    /// fill every provider's normalized cache. Called once, before the
    /// catalog is sealed behind an `Arc`.
    pub(crate) fn normalize_providers(
        &mut self,
        attributes: &[Attribute],
        method: NormalizationMethod,
    ) -> Result<HashMap<Attribute, Normalization>, ModelError> {
        let mut table = HashMap::new();
        for &attribute in attributes {
            let mut minmax = MinMax::new();
            for provider in &self.providers {
                minmax.observe(provider.require_attribute(attribute)?);
            }
            let norm = Normalization::from(minmax);
            for provider in &mut self.providers {
                let raw = provider.attribute(attribute).unwrap_or_default();
                provider.set_normalized(attribute, norm.normalize(raw, attribute.to_minimize(), method));
            }
            table.insert(attribute, norm);
        }
        Ok(table)
    }
}
