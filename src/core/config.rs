//! Pool configuration loaded from YAML.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::core::common::RegistryError;
use crate::core::host::Pe;
use crate::core::resource_pool::HostPool;

const DEFAULT_PE_MIPS: u32 = 1000;

/// Errors raised while loading or applying configuration.
///
/// Any of these fails the whole setup; a partially built pool is never
/// returned.
#[derive(Debug)]
pub enum ConfigError {
    Io(String, std::io::Error),
    Parse(String, serde_yaml::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "cannot read config file {}: {}", path, err),
            ConfigError::Parse(path, err) => write!(f, "cannot parse YAML from file {}: {}", path, err),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<RegistryError> for ConfigError {
    fn from(err: RegistryError) -> Self {
        ConfigError::Invalid(err.to_string())
    }
}

/// Host template from the config.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostConfig {
    /// Number of PEs.
    pub pe_count: u32,
    /// Processing rate of each PE in MIPS.
    pub pe_mips: Option<u32>,
    /// Memory capacity in MB.
    pub ram: u64,
    /// Bandwidth capacity.
    pub bandwidth: u64,
    /// Storage capacity in MB.
    pub storage: u64,
    /// Number of such hosts.
    pub count: Option<u32>,
}

#[derive(Deserialize)]
struct RawPoolConfig {
    pub datacenter_id: Option<u32>,
    pub ordering: Option<String>,
    pub hosts: Option<Vec<HostConfig>>,
}

/// Represents pool configuration.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Id of the datacenter served by the policy, stamped into events.
    pub datacenter_id: u32,
    /// Candidate ordering config string, e.g. `MinimumPes` or `RoundRobin[start=1]`.
    pub ordering: String,
    /// Host templates.
    pub hosts: Vec<HostConfig>,
}

impl PoolConfig {
    /// Loads configuration from the specified YAML file.
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(file_name).map_err(|err| ConfigError::Io(file_name.to_string(), err))?;
        let raw: RawPoolConfig =
            serde_yaml::from_str(&content).map_err(|err| ConfigError::Parse(file_name.to_string(), err))?;
        let config = Self {
            datacenter_id: raw.datacenter_id.unwrap_or(0),
            ordering: raw.ordering.unwrap_or_else(|| "MinimumPes".to_string()),
            hosts: raw.hosts.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for host in &self.hosts {
            if host.pe_count == 0 {
                return Err(ConfigError::Invalid("host with zero PEs".to_string()));
            }
        }
        Ok(())
    }

    /// Returns total hosts count.
    pub fn number_of_hosts(&self) -> u32 {
        self.hosts.iter().map(|host| host.count.unwrap_or(1)).sum()
    }
}

/// Builds host pool from the config, expanding host templates with `count > 1`
/// and assigning sequential host ids.
pub fn build_host_pool(config: &PoolConfig) -> Result<HostPool, ConfigError> {
    let mut pool = HostPool::new();
    let mut host_id = 0;
    for host in &config.hosts {
        let mips = host.pe_mips.unwrap_or(DEFAULT_PE_MIPS);
        for _ in 0..host.count.unwrap_or(1) {
            let pes = (0..host.pe_count).map(|pe_id| Pe::new(pe_id, mips)).collect();
            pool.add_host(host_id, pes, host.ram, host.bandwidth, host.storage)?;
            host_id += 1;
        }
    }
    Ok(pool)
}

/// Parses config value string, which consists of two parts - name and options.
/// Example: `RoundRobin[start=1]` parts are name `RoundRobin` and options string `start=1`.
pub fn parse_config_value(config_str: &str) -> (String, Option<String>) {
    match config_str.split_once('[') {
        Some((l, r)) => (l.to_string(), Some(r.to_string().replace(']', ""))),
        None => (config_str.to_string(), None),
    }
}

/// Parses options string from config value, returns map with option names and values.
pub fn parse_options(options_str: &str) -> HashMap<String, String> {
    let mut options = HashMap::new();
    for option_str in options_str.split(',') {
        if let Some((name, value)) = option_str.split_once('=') {
            options.insert(name.to_string(), value.to_string());
        }
    }
    options
}
