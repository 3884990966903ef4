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

//! Inclusive numeric ranges used by configuration surfaces and gene layouts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range<N> {
    from: N,
    to: N,
}

impl<N: Copy + PartialOrd> Range<N> {
    pub fn new(from: N, to: N) -> Self {
        Self { from, to }
    }

    pub fn single(value: N) -> Self {
        Self { from: value, to: value }
    }

    pub fn from(&self) -> N {
        self.from
    }

    pub fn to(&self) -> N {
        self.to
    }

    pub fn has_span(&self) -> bool {
        self.from < self.to
    }

    pub fn contains(&self, value: N) -> bool {
        self.from <= value && value <= self.to
    }
}
