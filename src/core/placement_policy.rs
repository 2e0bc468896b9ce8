//! The placement policy deciding which host runs each VM.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::candidate_ordering::{candidate_ordering_resolver, CandidateOrdering};
use crate::core::common::RegistryError;
use crate::core::config::{build_host_pool, ConfigError, PoolConfig};
use crate::core::events::{FailureReason, VmAllocated, VmAllocationFailed};
use crate::core::logger::Logger;
use crate::core::resource_pool::HostPool;
use crate::core::vm::{VmSpec, VmUid};

/// Errors returned by the placement policy.
#[derive(Debug)]
pub enum PlacementError {
    /// No host in the pool can accept the VM. Recoverable: the caller decides
    /// whether to retry later, queue or drop the request.
    NoHostAvailable { vm: VmUid },
    /// The assignment table and the host pool have diverged. This indicates an
    /// internal consistency bug and must be treated as fatal by the caller.
    PoolOutOfSync { source: RegistryError },
}

impl Display for PlacementError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            PlacementError::NoHostAvailable { vm } => write!(f, "no host available for vm {}", vm),
            PlacementError::PoolOutOfSync { source } => {
                write!(f, "assignment table and host pool diverged: {}", source)
            }
        }
    }
}

impl std::error::Error for PlacementError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlacementError::PoolOutOfSync { source } => Some(source),
            _ => None,
        }
    }
}

/// Decides the host for each VM and maintains the authoritative VM to host
/// assignment table.
///
/// The table changes only through [`allocate`](PlacementPolicy::allocate) and
/// [`deallocate`](PlacementPolicy::deallocate); the policy owns both the table
/// and the host pool, so no other mutation path exists. The surrounding
/// simulation delivers events one at a time, so the check-then-commit sequence
/// inside `allocate` is never interleaved with another placement.
pub struct PlacementPolicy {
    datacenter_id: u32,
    pool: HostPool,
    ordering: Box<dyn CandidateOrdering>,
    vm_table: IndexMap<VmUid, u32>,
    logger: Rc<RefCell<dyn Logger>>,
}

impl PlacementPolicy {
    /// Creates policy with the specified host pool and candidate ordering.
    pub fn new(
        datacenter_id: u32,
        pool: HostPool,
        ordering: Box<dyn CandidateOrdering>,
        logger: Rc<RefCell<dyn Logger>>,
    ) -> Self {
        Self {
            datacenter_id,
            pool,
            ordering,
            vm_table: IndexMap::new(),
            logger,
        }
    }

    /// Creates policy from the pool config, building the host pool and
    /// resolving the configured candidate ordering.
    pub fn from_config(config: &PoolConfig, logger: Rc<RefCell<dyn Logger>>) -> Result<Self, ConfigError> {
        let pool = build_host_pool(config)?;
        let ordering = candidate_ordering_resolver(&config.ordering)?;
        Ok(Self::new(config.datacenter_id, pool, ordering, logger))
    }

    /// Returns the host pool.
    pub fn pool(&self) -> &HostPool {
        &self.pool
    }

    /// Returns the number of currently placed VMs.
    pub fn placed_vm_count(&self) -> usize {
        self.vm_table.len()
    }

    /// Selects a host for the VM and commits its resources there.
    ///
    /// Idempotent: re-allocating an already placed VM returns its current host
    /// without touching any counters. Otherwise the candidate ordering is
    /// consulted and the first fitting host is committed, with no backtracking.
    /// Each host is tried at most once per call, which bounds the search by the
    /// pool size even for a buggy ordering.
    ///
    /// `time` is the current simulated time, stamped into the emitted event.
    pub fn allocate(&mut self, vm: &VmSpec, time: f64) -> Result<u32, PlacementError> {
        if let Some(&host_id) = self.vm_table.get(&vm.uid()) {
            return Ok(host_id);
        }

        let mut candidates = self.ordering.candidates(vm, &self.pool);
        let mut seen = HashSet::new();
        candidates.retain(|&host_id| self.pool.contains_host(host_id) && seen.insert(host_id));

        match self.pool.select(&candidates, vm) {
            Some(host_id) => {
                self.pool.commit(host_id, vm).map_err(|source| {
                    log::error!("failed to commit vm {} on selected host {}: {}", vm.uid(), host_id, source);
                    PlacementError::PoolOutOfSync { source }
                })?;
                self.vm_table.insert(vm.uid(), host_id);
                self.logger.borrow_mut().log_allocation(&VmAllocated {
                    time,
                    vm_id: vm.id,
                    user_id: vm.user_id,
                    host_id,
                    datacenter_id: self.datacenter_id,
                });
                Ok(host_id)
            }
            None => {
                self.logger.borrow_mut().log_allocation_failed(&VmAllocationFailed {
                    time,
                    vm_id: vm.id,
                    user_id: vm.user_id,
                    reason: FailureReason::NoHostAvailable,
                });
                Err(PlacementError::NoHostAvailable { vm: vm.uid() })
            }
        }
    }

    /// Releases the VM's resources and removes its assignment table entry.
    ///
    /// Calling this for a VM that is not placed is a no-op. A release rejected
    /// by the pool means the table and the pool have diverged and is surfaced
    /// as [`PlacementError::PoolOutOfSync`].
    pub fn deallocate(&mut self, vm: &VmSpec, time: f64) -> Result<(), PlacementError> {
        let Some(&host_id) = self.vm_table.get(&vm.uid()) else {
            return Ok(());
        };
        self.pool.release(host_id, vm).map_err(|source| {
            log::error!("failed to release vm {} from host {}: {}", vm.uid(), host_id, source);
            PlacementError::PoolOutOfSync { source }
        })?;
        self.vm_table.swap_remove(&vm.uid());
        log::debug!("{:.4}: vm {} released from host {}", time, vm.uid(), host_id);
        Ok(())
    }

    /// Returns the host currently running the VM, if any.
    pub fn locate(&self, vm: VmUid) -> Option<u32> {
        self.vm_table.get(&vm).copied()
    }
}
