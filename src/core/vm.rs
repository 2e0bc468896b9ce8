//! Representation of virtual machine placement requests.

use std::fmt::{Display, Formatter};

use serde::Serialize;

/// Identifies a VM within the whole simulation.
///
/// VM ids are unique only within the scope of the owning user (broker), so the
/// pair of user id and VM id is used wherever a globally unique key is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VmUid {
    pub user_id: u32,
    pub vm_id: u32,
}

impl VmUid {
    pub fn new(user_id: u32, vm_id: u32) -> Self {
        Self { user_id, vm_id }
    }
}

impl Display for VmUid {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}-{}", self.user_id, self.vm_id)
    }
}

/// Resource demands of a single VM placement request.
///
/// The policy treats the request as read-only; the only state a VM acquires on
/// successful placement is the assignment table entry linking it to a host.
#[derive(Clone, Debug, Serialize)]
pub struct VmSpec {
    pub id: u32,
    pub user_id: u32,
    /// Requested number of PEs.
    pub pes: u32,
    /// Requested memory in MB.
    pub ram: u64,
    /// Requested bandwidth.
    pub bandwidth: u64,
    /// Requested image size in MB.
    pub storage: u64,
}

impl VmSpec {
    /// Creates VM spec with specified resource demands.
    pub fn new(id: u32, user_id: u32, pes: u32, ram: u64, bandwidth: u64, storage: u64) -> Self {
        Self {
            id,
            user_id,
            pes,
            ram,
            bandwidth,
            storage,
        }
    }

    /// Returns the user-scoped unique id of this VM.
    pub fn uid(&self) -> VmUid {
        VmUid::new(self.user_id, self.id)
    }
}
