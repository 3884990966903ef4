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

//! Discrete bandwidth classes
//!
//! Providers expose one of six connection classes. Throughput along a link is
//! bounded by the lower of the two endpoint classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection capacity class of a provider, ordered by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BandwidthClass {
    /// Bluetooth v5.0 data rate.
    L0,
    /// WiFi 2.4GHz data rate.
    L1,
    /// WiFi 5GHz data rate.
    L2,
    /// Ethernet Cat. 7 data rate.
    L3,
    /// Ethernet Cat. 8 data rate.
    L4,
    /// Optic fiber data rate.
    L5,
}

impl BandwidthClass {
    pub fn level(self) -> u32 {
        match self {
            BandwidthClass::L0 => 0,
            BandwidthClass::L1 => 1,
            BandwidthClass::L2 => 2,
            BandwidthClass::L3 => 3,
            BandwidthClass::L4 => 4,
            BandwidthClass::L5 => 5,
        }
    }

    /// Capacity in Mbps.
    pub fn capacity(self) -> f64 {
        match self {
            BandwidthClass::L0 => 50.0,
            BandwidthClass::L1 => 600.0,
            BandwidthClass::L2 => 1_300.0,
            BandwidthClass::L3 => 10_000.0,
            BandwidthClass::L4 => 40_000.0,
            BandwidthClass::L5 => 160_000.0,
        }
    }

    /// Capacity of a link between two endpoints: the lower class dominates.
    pub fn link_capacity(self, other: BandwidthClass) -> f64 {
        self.min(other).capacity()
    }

    pub fn from_level(level: u32) -> Option<BandwidthClass> {
        match level {
            0 => Some(BandwidthClass::L0),
            1 => Some(BandwidthClass::L1),
            2 => Some(BandwidthClass::L2),
            3 => Some(BandwidthClass::L3),
            4 => Some(BandwidthClass::L4),
            5 => Some(BandwidthClass::L5),
            _ => None,
        }
    }
}

impl fmt::Display for BandwidthClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_round_trip() {
        for level in 0..6 {
            let class = BandwidthClass::from_level(level).unwrap();
            assert_eq!(class.level(), level);
        }
        assert!(BandwidthClass::from_level(6).is_none());
    }

    #[test]
    fn test_link_capacity_takes_lower_class() {
        assert_eq!(BandwidthClass::L5.link_capacity(BandwidthClass::L1), 600.0);
        assert_eq!(BandwidthClass::L1.link_capacity(BandwidthClass::L5), 600.0);
        assert_eq!(BandwidthClass::L3.link_capacity(BandwidthClass::L3), 10_000.0);
    }

    #[test]
    fn test_capacity_grows_with_level() {
        let mut previous = 0.0;
        for level in 0..6 {
            let capacity = BandwidthClass::from_level(level).unwrap().capacity();
            assert!(capacity > previous);
            previous = capacity;
        }
    }
}
