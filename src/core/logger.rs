/// Logging facilities to record placement events.
use std::fs::File;

use serde::Serialize;

use crate::core::events::{VmAllocated, VmAllocationFailed};

pub trait Logger {
    fn log_allocation(&mut self, event: &VmAllocated);

    fn log_allocation_failed(&mut self, event: &VmAllocationFailed);

    fn save_log(&self, _path: &str) -> Result<(), std::io::Error>;
}

/// Forwards placement events to the console via the `log` crate.
#[derive(Default)]
pub struct StdoutLogger {}

impl StdoutLogger {
    pub fn new() -> Self {
        Self {}
    }
}

impl Logger for StdoutLogger {
    fn log_allocation(&mut self, event: &VmAllocated) {
        log::info!(
            "{:.4}: vm {} allocated to host {} in datacenter {}",
            event.time,
            event.vm_id,
            event.host_id,
            event.datacenter_id
        );
    }

    fn log_allocation_failed(&mut self, event: &VmAllocationFailed) {
        log::warn!("{:.4}: vm {} not allocated: {}", event.time, event.vm_id, event.reason);
    }

    fn save_log(&self, _path: &str) -> Result<(), std::io::Error> {
        Ok(())
    }
}

#[derive(Serialize)]
struct LogEntry {
    time: f64,
    kind: &'static str,
    vm_id: u32,
    user_id: u32,
    host_id: Option<u32>,
    datacenter_id: Option<u32>,
    reason: Option<String>,
}

/// Buffers placement events in memory and saves them to a CSV file.
#[derive(Default)]
pub struct FileLogger {
    log: Vec<LogEntry>,
}

impl FileLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of buffered entries.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

impl Logger for FileLogger {
    fn log_allocation(&mut self, event: &VmAllocated) {
        self.log.push(LogEntry {
            time: event.time,
            kind: "allocated",
            vm_id: event.vm_id,
            user_id: event.user_id,
            host_id: Some(event.host_id),
            datacenter_id: Some(event.datacenter_id),
            reason: None,
        });
    }

    fn log_allocation_failed(&mut self, event: &VmAllocationFailed) {
        self.log.push(LogEntry {
            time: event.time,
            kind: "failed",
            vm_id: event.vm_id,
            user_id: event.user_id,
            host_id: None,
            datacenter_id: None,
            reason: Some(event.reason.to_string()),
        });
    }

    fn save_log(&self, path: &str) -> Result<(), std::io::Error> {
        let file = File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for entry in &self.log {
            wtr.serialize(entry)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
