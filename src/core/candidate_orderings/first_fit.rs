//! First Fit ordering.

use crate::core::candidate_ordering::CandidateOrdering;
use crate::core::resource_pool::HostPool;
use crate::core::vm::VmSpec;

/// Tries hosts in ascending id order.
#[derive(Clone, Default)]
pub struct FirstFit;

impl FirstFit {
    pub fn new() -> Self {
        Default::default()
    }
}

impl CandidateOrdering for FirstFit {
    fn candidates(&self, _vm: &VmSpec, pool: &HostPool) -> Vec<u32> {
        pool.host_ids()
    }
}
