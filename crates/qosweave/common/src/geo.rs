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

//! Geographic model
//!
//! Great-circle distances between provider locations and the linear
//! distance→latency model used by the propagation engine.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Light travels roughly 1.5 times slower through optical fiber than in a
/// vacuum, which yields about 5 microseconds of latency per kilometer.
const LATENCY_PER_KM: f64 = 5e-6;

/// Latency in seconds for a distance in kilometers.
pub fn latency(distance_km: f64) -> f64 {
    LATENCY_PER_KM * distance_km
}

fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * (std::f64::consts::PI / 180.0)
}

/// A named geographic point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }

    /// Haversine great-circle distance in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = degrees_to_radians(other.latitude - self.latitude);
        let d_lon = degrees_to_radians(other.longitude - self.longitude);

        let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
            + degrees_to_radians(self.latitude).cos() * degrees_to_radians(other.latitude).cos() * (d_lon / 2.0).sin() * (d_lon / 2.0).sin();

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Latency in seconds between two points.
    pub fn latency_to(&self, other: &GeoPoint) -> f64 {
        latency(self.distance_km(other))
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
