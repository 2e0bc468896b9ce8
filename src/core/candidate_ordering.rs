//! Candidate ordering strategies for host selection.

use dyn_clone::{clone_trait_object, DynClone};

use crate::core::candidate_orderings::first_fit::FirstFit;
use crate::core::candidate_orderings::minimum_pes::MinimumPes;
use crate::core::candidate_orderings::round_robin::RoundRobin;
use crate::core::candidate_orderings::worst_fit::WorstFit;
use crate::core::config::{parse_config_value, ConfigError};
use crate::core::resource_pool::HostPool;
use crate::core::vm::VmSpec;

/// Trait for implementation of candidate ordering strategies.
///
/// A strategy is a pure function from the current host pool and a VM request to
/// the sequence of host ids to try, most preferred first. The placement policy
/// performs a greedy first-fit over this sequence, so the strategy decides the
/// preference order but not the fitness check itself.
pub trait CandidateOrdering: DynClone {
    fn candidates(&self, vm: &VmSpec, pool: &HostPool) -> Vec<u32>;
}

clone_trait_object!(CandidateOrdering);

/// Resolves candidate ordering from config string, e.g. `RoundRobin[start=1]`.
pub fn candidate_ordering_resolver(config_str: &str) -> Result<Box<dyn CandidateOrdering>, ConfigError> {
    let (name, options) = parse_config_value(config_str);
    match name.as_str() {
        "FirstFit" => Ok(Box::new(FirstFit::new())),
        "MinimumPes" => Ok(Box::new(MinimumPes::new())),
        "RoundRobin" => Ok(Box::new(RoundRobin::from_options(options.as_deref())?)),
        "WorstFit" => Ok(Box::new(WorstFit::new())),
        _ => Err(ConfigError::Invalid(format!(
            "unknown candidate ordering: {}",
            config_str
        ))),
    }
}
