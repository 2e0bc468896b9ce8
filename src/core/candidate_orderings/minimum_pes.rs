//! Minimum PEs ordering.

use crate::core::candidate_ordering::CandidateOrdering;
use crate::core::resource_pool::HostPool;
use crate::core::vm::VmSpec;

/// Tries hosts in ascending order of their PE count, so that hosts with
/// just-enough capacity are preferred over over-provisioned ones.
///
/// Ties are broken by ascending host id for determinism. This is the reference
/// ordering.
#[derive(Clone, Default)]
pub struct MinimumPes;

impl MinimumPes {
    pub fn new() -> Self {
        Default::default()
    }
}

impl CandidateOrdering for MinimumPes {
    fn candidates(&self, _vm: &VmSpec, pool: &HostPool) -> Vec<u32> {
        let mut hosts = pool.host_ids();
        hosts.sort_by_key(|&host_id| (pool.pe_count(host_id), host_id));
        hosts
    }
}
