//! Structured placement events emitted for external observers.

use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Emitted on each successful allocation.
#[derive(Clone, Debug, Serialize)]
pub struct VmAllocated {
    pub time: f64,
    pub vm_id: u32,
    pub user_id: u32,
    pub host_id: u32,
    pub datacenter_id: u32,
}

/// Emitted when no host can accept the VM.
#[derive(Clone, Debug, Serialize)]
pub struct VmAllocationFailed {
    pub time: f64,
    pub vm_id: u32,
    pub user_id: u32,
    pub reason: FailureReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    NoHostAvailable,
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            FailureReason::NoHostAvailable => write!(f, "no host available"),
        }
    }
}
