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

//! Wall-clock budgets for optimizer invocations
//!
//! A budget is either a fixed duration or adaptive in the size of the
//! sub-problem being resolved: `intercept + slope × n` milliseconds, where
//! the intercept is the minimum time the optimizer needs to do useful work.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeLimit {
    Fixed(Duration),
    Adaptive { slope_ms: u64, intercept_ms: u64 },
}

impl TimeLimit {
    pub fn fixed_secs(secs: u64) -> Self {
        TimeLimit::Fixed(Duration::from_secs(secs))
    }

    pub fn adaptive(slope_ms: u64, intercept_ms: u64) -> Self {
        TimeLimit::Adaptive { slope_ms, intercept_ms }
    }

    pub fn is_adaptive(&self) -> bool {
        matches!(self, TimeLimit::Adaptive { .. })
    }

    /// Budget for a problem of `size` explored slots and gates.
    pub fn duration_for(&self, size: usize) -> Duration {
        match *self {
            TimeLimit::Fixed(duration) => duration,
            TimeLimit::Adaptive { slope_ms, intercept_ms } => Duration::from_millis(intercept_ms + slope_ms * size as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ignores_size() {
        let limit = TimeLimit::fixed_secs(60);
        assert_eq!(limit.duration_for(1), Duration::from_secs(60));
        assert_eq!(limit.duration_for(1000), Duration::from_secs(60));
        assert!(!limit.is_adaptive());
    }

    #[test]
    fn test_adaptive_scales_with_size() {
        let limit = TimeLimit::adaptive(50, 200);
        assert_eq!(limit.duration_for(0), Duration::from_millis(200));
        assert_eq!(limit.duration_for(10), Duration::from_millis(700));
        assert!(limit.is_adaptive());
    }
}
