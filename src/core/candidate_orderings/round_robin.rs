//! Round Robin ordering.

use std::cell::Cell;

use crate::core::candidate_ordering::CandidateOrdering;
use crate::core::config::{parse_options, ConfigError};
use crate::core::resource_pool::HostPool;
use crate::core::vm::VmSpec;

/// Rotates the starting host across calls, spreading VMs over the pool.
///
/// Each call returns all hosts (so a single call still sees every candidate)
/// and advances the starting position by one.
#[derive(Clone, Default)]
pub struct RoundRobin {
    next: Cell<usize>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates ordering starting from the given host position.
    pub fn with_start(start: usize) -> Self {
        Self { next: Cell::new(start) }
    }

    pub fn from_options(options_str: Option<&str>) -> Result<Self, ConfigError> {
        let Some(options_str) = options_str else {
            return Ok(Self::new());
        };
        let options = parse_options(options_str);
        match options.get("start") {
            Some(value) => {
                let start = value
                    .parse::<usize>()
                    .map_err(|_| ConfigError::Invalid(format!("bad RoundRobin start option: {}", value)))?;
                Ok(Self::with_start(start))
            }
            None => Ok(Self::new()),
        }
    }
}

impl CandidateOrdering for RoundRobin {
    fn candidates(&self, _vm: &VmSpec, pool: &HostPool) -> Vec<u32> {
        let mut hosts = pool.host_ids();
        if hosts.is_empty() {
            return hosts;
        }
        let start = self.next.get() % hosts.len();
        self.next.set(start + 1);
        hosts.rotate_left(start);
        hosts
    }
}
