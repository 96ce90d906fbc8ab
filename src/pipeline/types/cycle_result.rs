use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StreamCheckRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineResult {
    pub machine_id: String,
    pub machine_name: String,
    pub timestamp: DateTime<Utc>,
    pub streams: Vec<StreamCheckRecord>,
}

impl MachineResult {
    pub fn new(machine_id: impl Into<String>, machine_name: impl Into<String>) -> Self {
        Self {
            machine_id: machine_id.into(),
            machine_name: machine_name.into(),
            timestamp: Utc::now(),
            streams: Vec::new(),
        }
    }
}

/// Result of one sweep, in configured machine and stream order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub sweep: u64,
    pub timestamp: DateTime<Utc>,
    pub machines: Vec<MachineResult>,
}

impl CycleResult {
    pub fn new(sweep: u64) -> Self {
        Self {
            sweep,
            timestamp: Utc::now(),
            machines: Vec::new(),
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &StreamCheckRecord> {
        self.machines.iter().flat_map(|m| m.streams.iter())
    }

    pub fn failure_count(&self) -> usize {
        self.records().filter(|r| r.verdict.is_failure()).count()
    }
}
