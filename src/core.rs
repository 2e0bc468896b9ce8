//! Core components of the VM placement policy.

pub mod candidate_ordering;
pub mod candidate_orderings;
pub mod common;
pub mod config;
pub mod events;
pub mod host;
pub mod logger;
pub mod placement_policy;
pub mod resource_pool;
pub mod vm;
