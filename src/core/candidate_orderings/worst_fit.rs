//! Worst Fit ordering.

use std::cmp::Reverse;

use crate::core::candidate_ordering::CandidateOrdering;
use crate::core::resource_pool::HostPool;
use crate::core::vm::VmSpec;

/// Tries the least loaded hosts (by free PEs) first, ties broken by ascending
/// host id.
#[derive(Clone, Default)]
pub struct WorstFit;

impl WorstFit {
    pub fn new() -> Self {
        Default::default()
    }
}

impl CandidateOrdering for WorstFit {
    fn candidates(&self, _vm: &VmSpec, pool: &HostPool) -> Vec<u32> {
        let mut hosts = pool.host_ids();
        hosts.sort_by_key(|&host_id| (Reverse(pool.free_pes(host_id)), host_id));
        hosts
    }
}
