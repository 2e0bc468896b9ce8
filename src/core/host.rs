//! Host properties and mutable resource state.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::vm::{VmSpec, VmUid};

/// Processing element with a fixed processing rate (in MIPS).
///
/// PEs are immutable and owned exclusively by their host; the id is unique
/// within the host.
#[derive(Clone, Debug, Serialize)]
pub struct Pe {
    pub id: u32,
    pub mips: u32,
}

impl Pe {
    pub fn new(id: u32, mips: u32) -> Self {
        Self { id, mips }
    }
}

/// Stores host capacity and state (free resources, resident VMs).
///
/// Invariant: for every resource dimension `free = total - sum over resident
/// VMs`, and `free >= 0`. The PE set is fixed at creation.
#[derive(Clone)]
pub struct HostState {
    pes: Vec<Pe>,

    pub ram_total: u64,
    pub bandwidth_total: u64,
    pub storage_total: u64,

    pub pes_free: u32,
    pub ram_free: u64,
    pub bandwidth_free: u64,
    pub storage_free: u64,

    pub resident_vms: BTreeMap<VmUid, VmSpec>,
}

impl HostState {
    /// Creates host state with the whole capacity free.
    pub fn new(pes: Vec<Pe>, ram_total: u64, bandwidth_total: u64, storage_total: u64) -> Self {
        let pes_free = pes.len() as u32;
        Self {
            pes,
            ram_total,
            bandwidth_total,
            storage_total,
            pes_free,
            ram_free: ram_total,
            bandwidth_free: bandwidth_total,
            storage_free: storage_total,
            resident_vms: BTreeMap::new(),
        }
    }

    /// Returns the number of PEs owned by this host.
    pub fn pe_count(&self) -> u32 {
        self.pes.len() as u32
    }

    /// Returns the PEs of this host in creation order.
    pub fn pes(&self) -> &[Pe] {
        &self.pes
    }

    /// Returns the total processing rate of this host.
    pub fn total_mips(&self) -> u64 {
        self.pes.iter().map(|pe| pe.mips as u64).sum()
    }
}
