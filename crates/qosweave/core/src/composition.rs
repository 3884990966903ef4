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

//! Concrete assignments of providers to slots and gates
//!
//! A composition maps explored indices to global provider indices. The index
//! space is flat: slot indices come first, then gates offset by the total
//! slot count, so compositions from disjoint sub-problems merge without key
//! clashes. An ordered map keeps merging and reporting deterministic.

use std::collections::BTreeMap;

/// Explored index → global provider index.
pub type Composition = BTreeMap<usize, usize>;

/// Flatten a composition with contiguous keys `0..n` into a dense vector.
///
/// The caller guarantees contiguity; this is the full-problem round-trip
/// used when handing a composition to systems that expect a genotype-like
/// list.
pub fn to_list(composition: &Composition) -> Vec<usize> {
    let mut list = vec![0; composition.len()];
    for (&index, &provider) in composition {
        list[index] = provider;
    }
    list
}

/// Rebuild a composition from a dense vector.
pub fn to_map(list: &[usize]) -> Composition {
    list.iter().copied().enumerate().collect()
}
