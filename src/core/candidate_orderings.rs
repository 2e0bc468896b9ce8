//! Implementations of candidate ordering strategies.

pub mod first_fit;
pub mod minimum_pes;
pub mod round_robin;
pub mod worst_fit;
