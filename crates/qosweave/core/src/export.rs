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

//! Composition reports
//!
//! Flattens a resolved composition into per-slot records carrying the slot's
//! position in the architecture tree, serializable to JSON or CSV.

use crate::application::{Application, Selection};
use crate::composition::Composition;
use crate::error::ModelError;
use serde::Serialize;

/// One resolved slot: where it sits in the tree and who serves it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExportRecord {
    /// Pattern labels from the root down to the slot, slash-separated.
    pub path: String,
    pub slot: String,
    pub provider: String,
}

/// One record per leaf slot, in architecture order.
pub fn records(app: &Application, composition: &Composition) -> Result<Vec<ExportRecord>, ModelError> {
    let arch = app.architecture();
    let selection = Selection::Providers(composition);
    let mut out = Vec::new();
    for leaf in arch.leaf_ids() {
        let slot = arch
            .slot(leaf)
            .ok_or(ModelError::Inconsistent { detail: "leaf component without a slot binding" })?;
        let provider = app.selected_provider(slot, &selection)?;
        out.push(ExportRecord {
            path: arch.path_to(leaf).join("/"),
            slot: app.catalog().slot(slot).name().to_string(),
            provider: provider.name().to_string(),
        });
    }
    Ok(out)
}

pub fn to_json(app: &Application, composition: &Composition) -> Result<String, ModelError> {
    let records = records(app, composition)?;
    serde_json::to_string_pretty(&records)
        .map_err(|_| ModelError::Inconsistent { detail: "composition report is not serializable" })
}

pub fn to_csv(app: &Application, composition: &Composition) -> Result<String, ModelError> {
    let mut out = String::from("path,slot,provider\n");
    for record in records(app, composition)? {
        out.push_str(&record.path);
        out.push(',');
        out.push_str(&record.slot);
        out.push(',');
        out.push_str(&record.provider);
        out.push('\n');
    }
    Ok(out)
}
