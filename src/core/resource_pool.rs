//! Host registry with fitness queries and resource commitments.

use std::collections::BTreeMap;

use crate::core::common::{AllocationVerdict, RegistryError};
use crate::core::host::{HostState, Pe};
use crate::core::vm::VmSpec;

/// Owns the set of physical hosts and applies/undoes resource commitments.
///
/// The registry is policy-agnostic: the order in which hosts are tried is
/// supplied by the caller through [`select`](HostPool::select), which returns
/// the first host from the given sequence that fits the VM.
#[derive(Clone, Default)]
pub struct HostPool {
    hosts: BTreeMap<u32, HostState>,
}

impl HostPool {
    /// Creates empty host pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds host to the pool.
    pub fn add_host(
        &mut self,
        id: u32,
        pes: Vec<Pe>,
        ram_total: u64,
        bandwidth_total: u64,
        storage_total: u64,
    ) -> Result<(), RegistryError> {
        if self.hosts.contains_key(&id) {
            return Err(RegistryError::DuplicateHost { host_id: id });
        }
        self.hosts
            .insert(id, HostState::new(pes, ram_total, bandwidth_total, storage_total));
        Ok(())
    }

    /// Returns ids of all hosts in ascending order.
    pub fn host_ids(&self) -> Vec<u32> {
        self.hosts.keys().cloned().collect()
    }

    /// Returns the number of hosts.
    pub fn host_count(&self) -> u32 {
        self.hosts.len() as u32
    }

    /// Returns the state of the specified host.
    pub fn host(&self, host_id: u32) -> Option<&HostState> {
        self.hosts.get(&host_id)
    }

    pub fn contains_host(&self, host_id: u32) -> bool {
        self.hosts.contains_key(&host_id)
    }

    /// Checks whether the specified host can currently accept the VM.
    ///
    /// Pure predicate, no side effects.
    pub fn can_host(&self, host_id: u32, vm: &VmSpec) -> AllocationVerdict {
        let host = match self.hosts.get(&host_id) {
            Some(host) => host,
            None => return AllocationVerdict::HostNotFound,
        };
        if host.pes_free < vm.pes {
            return AllocationVerdict::NotEnoughPes;
        }
        if host.ram_free < vm.ram {
            return AllocationVerdict::NotEnoughRam;
        }
        if host.bandwidth_free < vm.bandwidth {
            return AllocationVerdict::NotEnoughBandwidth;
        }
        if host.storage_free < vm.storage {
            return AllocationVerdict::NotEnoughStorage;
        }
        AllocationVerdict::Success
    }

    /// Commits the VM's resources on the specified host and records it as resident.
    ///
    /// Re-committing a VM already resident on the host is a no-op success.
    /// Fails without mutating anything if the host cannot fit the VM; callers
    /// that check [`can_host`](HostPool::can_host) first never hit this path.
    pub fn commit(&mut self, host_id: u32, vm: &VmSpec) -> Result<(), RegistryError> {
        let verdict = self.can_host(host_id, vm);
        let host = self
            .hosts
            .get_mut(&host_id)
            .ok_or(RegistryError::HostNotFound { host_id })?;
        if host.resident_vms.contains_key(&vm.uid()) {
            return Ok(());
        }
        if verdict != AllocationVerdict::Success {
            return Err(RegistryError::ResourceExhausted {
                host_id,
                vm: vm.uid(),
                verdict,
            });
        }
        host.pes_free -= vm.pes;
        host.ram_free -= vm.ram;
        host.bandwidth_free -= vm.bandwidth;
        host.storage_free -= vm.storage;
        host.resident_vms.insert(vm.uid(), vm.clone());
        Ok(())
    }

    /// Releases the VM's resources on the specified host and removes it from
    /// the resident set.
    ///
    /// The free counters are restored from the demands recorded at commit
    /// time, so a round trip returns them exactly to their prior values.
    pub fn release(&mut self, host_id: u32, vm: &VmSpec) -> Result<(), RegistryError> {
        let host = self
            .hosts
            .get_mut(&host_id)
            .ok_or(RegistryError::HostNotFound { host_id })?;
        let resident = host
            .resident_vms
            .remove(&vm.uid())
            .ok_or(RegistryError::NotResident {
                host_id,
                vm: vm.uid(),
            })?;
        host.pes_free += resident.pes;
        host.ram_free += resident.ram;
        host.bandwidth_free += resident.bandwidth;
        host.storage_free += resident.storage;
        Ok(())
    }

    /// Returns the first host from the candidate sequence that fits the VM.
    pub fn select(&self, candidates: &[u32], vm: &VmSpec) -> Option<u32> {
        candidates
            .iter()
            .copied()
            .find(|&host_id| self.can_host(host_id, vm) == AllocationVerdict::Success)
    }

    /// Returns the number of PEs of the specified host.
    pub fn pe_count(&self, host_id: u32) -> u32 {
        self.hosts[&host_id].pe_count()
    }

    /// Returns the number of free PEs on the specified host.
    pub fn free_pes(&self, host_id: u32) -> u32 {
        self.hosts[&host_id].pes_free
    }

    /// Returns the total memory capacity of the specified host.
    pub fn total_ram(&self, host_id: u32) -> u64 {
        self.hosts[&host_id].ram_total
    }

    /// Returns the amount of free memory on the specified host.
    pub fn free_ram(&self, host_id: u32) -> u64 {
        self.hosts[&host_id].ram_free
    }

    /// Returns the total bandwidth capacity of the specified host.
    pub fn total_bandwidth(&self, host_id: u32) -> u64 {
        self.hosts[&host_id].bandwidth_total
    }

    /// Returns the amount of free bandwidth on the specified host.
    pub fn free_bandwidth(&self, host_id: u32) -> u64 {
        self.hosts[&host_id].bandwidth_free
    }

    /// Returns the total storage capacity of the specified host.
    pub fn total_storage(&self, host_id: u32) -> u64 {
        self.hosts[&host_id].storage_total
    }

    /// Returns the amount of free storage on the specified host.
    pub fn free_storage(&self, host_id: u32) -> u64 {
        self.hosts[&host_id].storage_free
    }

    /// Returns the PE allocation rate (ratio of allocated to total PEs) of the specified host.
    pub fn pe_load(&self, host_id: u32) -> f64 {
        let host = &self.hosts[&host_id];
        1. - host.pes_free as f64 / host.pe_count() as f64
    }

    /// Returns the memory allocation rate (ratio of allocated to total memory) of the specified host.
    pub fn ram_load(&self, host_id: u32) -> f64 {
        let host = &self.hosts[&host_id];
        1. - host.ram_free as f64 / host.ram_total as f64
    }
}
