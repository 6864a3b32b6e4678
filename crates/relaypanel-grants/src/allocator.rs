//! Port-range proposal for newly created grants.
//!
//! Ports are a scarce per-server resource: a proposal must sit strictly above
//! every port already granted on the target server so it cannot collide with
//! an existing grant. The caller supplies the server's observed high-water
//! mark (see [`crate::ports::max_ports_by_server`]); recomputing a proposal is
//! pure, so changing the target server or the requested count just means
//! calling [`PortAllocator::propose`] again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PORT_MAX;

/// Inclusive port range proposed for a new grant, rendered as `"start-end"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Allocation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    /// The range would run past the top of the port space.
    #[error("port range {start}-{end} exceeds 65535")]
    Exhausted { start: u32, end: u32 },
}

/// Proposes contiguous port ranges above a server's high-water mark.
#[derive(Debug, Clone, Copy)]
pub struct PortAllocator {
    floor: u16,
}

impl PortAllocator {
    /// Starting point for servers that have no grants yet.
    pub const DEFAULT_FLOOR: u16 = 10_000;

    pub fn new(floor: u16) -> Self {
        Self { floor }
    }

    pub fn floor(&self) -> u16 {
        self.floor
    }

    /// Propose a range for `count` new proxies on a server whose highest
    /// granted port is `max_port` (`None` when the server has no grants, in
    /// which case the configured floor stands in).
    ///
    /// `count == 0` yields no proposal: the operator enters ports manually.
    /// The proposal starts at `max + 1` and spans to `start + count`,
    /// matching the width the console has always suggested.
    pub fn propose(&self, max_port: Option<u16>, count: u16) -> Result<Option<PortRange>, AllocError> {
        if count == 0 {
            return Ok(None);
        }
        let base = u32::from(max_port.unwrap_or(self.floor));
        let start = base + 1;
        let end = start + u32::from(count);
        if end > u32::from(PORT_MAX) {
            return Err(AllocError::Exhausted { start, end });
        }
        Ok(Some(PortRange {
            start: start as u16,
            end: end as u16,
        }))
    }
}

impl Default for PortAllocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposes_above_high_water_mark() {
        let alloc = PortAllocator::new(0);
        let range = alloc.propose(Some(100), 5).unwrap().unwrap();
        assert_eq!(range.to_string(), "101-106");
    }

    #[test]
    fn falls_back_to_floor_when_server_is_empty() {
        let alloc = PortAllocator::new(0);
        let range = alloc.propose(None, 5).unwrap().unwrap();
        assert_eq!(range.to_string(), "1-6");

        let alloc = PortAllocator::default();
        let range = alloc.propose(None, 3).unwrap().unwrap();
        assert_eq!(range.to_string(), "10001-10004");
    }

    #[test]
    fn zero_count_yields_no_proposal() {
        let alloc = PortAllocator::default();
        assert_eq!(alloc.propose(Some(100), 0).unwrap(), None);
    }

    #[test]
    fn recomputation_is_pure() {
        let alloc = PortAllocator::default();
        let first = alloc.propose(Some(20000), 10).unwrap();
        let second = alloc.propose(Some(20000), 10).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let alloc = PortAllocator::default();
        assert_eq!(
            alloc.propose(Some(65530), 10),
            Err(AllocError::Exhausted { start: 65531, end: 65541 })
        );
    }
}
