//! Common verdict and error types.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::core::vm::VmUid;

/// Result of checking whether a host can accept a VM.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum AllocationVerdict {
    Success,
    NotEnoughPes,
    NotEnoughRam,
    NotEnoughBandwidth,
    NotEnoughStorage,
    HostNotFound,
}

impl Display for AllocationVerdict {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            AllocationVerdict::Success => write!(f, "success"),
            AllocationVerdict::NotEnoughPes => write!(f, "not enough PEs"),
            AllocationVerdict::NotEnoughRam => write!(f, "not enough RAM"),
            AllocationVerdict::NotEnoughBandwidth => write!(f, "not enough bandwidth"),
            AllocationVerdict::NotEnoughStorage => write!(f, "not enough storage"),
            AllocationVerdict::HostNotFound => write!(f, "host not found"),
        }
    }
}

/// Errors reported by the host registry.
///
/// `ResourceExhausted` and `NotResident` should never occur when commits are
/// preceded by a passing fitness check and releases target the recorded host;
/// observing them means the caller's state and the registry have diverged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Commit was attempted on a host that cannot fit the VM.
    ResourceExhausted {
        host_id: u32,
        vm: VmUid,
        verdict: AllocationVerdict,
    },
    /// Release was attempted for a VM not resident on the host.
    NotResident { host_id: u32, vm: VmUid },
    /// The referenced host does not exist in the registry.
    HostNotFound { host_id: u32 },
    /// A host with the same id is already registered.
    DuplicateHost { host_id: u32 },
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            RegistryError::ResourceExhausted { host_id, vm, verdict } => {
                write!(f, "cannot commit vm {} on host {}: {}", vm, host_id, verdict)
            }
            RegistryError::NotResident { host_id, vm } => {
                write!(f, "vm {} is not resident on host {}", vm, host_id)
            }
            RegistryError::HostNotFound { host_id } => write!(f, "host {} not found", host_id),
            RegistryError::DuplicateHost { host_id } => write!(f, "host {} already exists", host_id),
        }
    }
}

impl std::error::Error for RegistryError {}
