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

//! Bottom-up aggregation of provider attributes over the architecture tree
//!
//! Each composite folds its children's values according to its pattern, then
//! applies the attribute's transform with the composite weight as power. The
//! conditional pattern is the exception: a probability-weighted mean needs no
//! de-biasing transform. Channel attributes never reach this module; the
//! application routes them to the propagation engine and a channel attribute
//! arriving here is an `UnsupportedAttribute` error.

use crate::application::{Application, Selection};
use crate::architecture::{Architecture, ComponentId, ComponentKind, Pattern};
use crate::error::ModelError;
use qosweave_common::Attribute;

/// Whether leaves contribute raw attribute values or the normalized ones
/// from the provider cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSpace {
    Raw,
    Normalized,
}

impl Architecture {
    /// Raw aggregated value of `attribute` under `selection`.
    pub fn value(&self, app: &Application, attribute: Attribute, selection: &Selection<'_>) -> Result<f64, ModelError> {
        self.value_at(self.root(), ValueSpace::Raw, app, attribute, selection)
    }

    /// Aggregated value over provider-normalized leaf values.
    pub fn normalized_value(&self, app: &Application, attribute: Attribute, selection: &Selection<'_>) -> Result<f64, ModelError> {
        self.value_at(self.root(), ValueSpace::Normalized, app, attribute, selection)
    }

    fn value_at(
        &self,
        id: ComponentId,
        space: ValueSpace,
        app: &Application,
        attribute: Attribute,
        selection: &Selection<'_>,
    ) -> Result<f64, ModelError> {
        match &self.node(id).kind {
            ComponentKind::Task { slot } => {
                let provider = app.selected_provider(*slot, selection)?;
                match space {
                    ValueSpace::Raw => provider.require_attribute(attribute),
                    ValueSpace::Normalized => provider.require_normalized(attribute),
                }
            }
            ComponentKind::Composite { pattern, children } => {
                let weight = self.component_weight(id) as f64;
                let fold = |this: &Self| -> Result<Vec<f64>, ModelError> {
                    children.iter().map(|&child| this.value_at(child, space, app, attribute, selection)).collect()
                };
                match pattern {
                    Pattern::Sequential => {
                        let values = fold(self)?;
                        let value = match attribute {
                            Attribute::Availability | Attribute::Reliability => values.iter().product(),
                            Attribute::Cost | Attribute::ResponseTime => values.iter().sum(),
                            _ => return Err(self.unsupported(id, attribute)),
                        };
                        Ok(attribute.transform().apply(value, weight))
                    }
                    Pattern::Parallel => {
                        let values = fold(self)?;
                        let value = match attribute {
                            Attribute::ResponseTime => values.iter().copied().fold(0.0, f64::max),
                            Attribute::Availability | Attribute::Reliability => values.iter().product(),
                            Attribute::Cost => values.iter().sum(),
                            _ => return Err(self.unsupported(id, attribute)),
                        };
                        Ok(attribute.transform().apply(value, weight))
                    }
                    Pattern::Conditional { probabilities } => {
                        let values = fold(self)?;
                        Ok(values.iter().zip(probabilities).map(|(v, p)| v * p).sum())
                    }
                    Pattern::Iterative { continue_probability } => {
                        let values = fold(self)?;
                        let q = 1.0 - continue_probability;
                        let value = match attribute {
                            Attribute::Cost | Attribute::ResponseTime => values.iter().sum::<f64>() / q,
                            Attribute::Availability | Attribute::Reliability => {
                                let product: f64 = values.iter().product();
                                (q * product) / (1.0 - continue_probability * product)
                            }
                            _ => return Err(self.unsupported(id, attribute)),
                        };
                        Ok(attribute.transform().apply(value, weight))
                    }
                }
            }
        }
    }
}
