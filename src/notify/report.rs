use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::types::{CycleResult, ErrorType, MachineResult, StreamCheckRecord, Verdict};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamLine {
    pub stream_id: String,
    pub stream_name: String,
    pub verdict: Verdict,
    pub error_type: Option<ErrorType>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSummary {
    pub machine_id: String,
    pub machine_name: String,
    pub total_streams: usize,
    pub active_streams: usize,
    pub error_streams: usize,
    pub disabled_streams: usize,
    /// Enabled streams only.
    pub details: Vec<StreamLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub sweep: u64,
    pub timestamp: DateTime<Utc>,
    pub total_machines: usize,
    pub total_streams: usize,
    pub active_streams: usize,
    pub error_streams: usize,
    pub disabled_streams: usize,
    pub machines: Vec<MachineSummary>,
}

impl CycleSummary {
    pub fn has_errors(&self) -> bool {
        self.error_streams > 0
    }
}

/// Failing streams of one machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineErrors {
    pub machine_id: String,
    pub machine_name: String,
    pub error_streams: Vec<StreamLine>,
}

pub fn summarize_machine(machine: &MachineResult) -> MachineSummary {
    let mut summary = MachineSummary {
        machine_id: machine.machine_id.clone(),
        machine_name: machine.machine_name.clone(),
        total_streams: machine.streams.len(),
        active_streams: 0,
        error_streams: 0,
        disabled_streams: 0,
        details: Vec::new(),
    };

    for record in &machine.streams {
        if !record.enabled {
            summary.disabled_streams += 1;
            continue;
        }
        if record.is_ok() {
            summary.active_streams += 1;
        } else {
            summary.error_streams += 1;
        }
        summary.details.push(stream_line(record));
    }

    summary
}

pub fn summarize(cycle: &CycleResult) -> CycleSummary {
    let machines: Vec<MachineSummary> = cycle.machines.iter().map(summarize_machine).collect();

    CycleSummary {
        sweep: cycle.sweep,
        timestamp: cycle.timestamp,
        total_machines: machines.len(),
        total_streams: machines.iter().map(|m| m.total_streams).sum(),
        active_streams: machines.iter().map(|m| m.active_streams).sum(),
        error_streams: machines.iter().map(|m| m.error_streams).sum(),
        disabled_streams: machines.iter().map(|m| m.disabled_streams).sum(),
        machines,
    }
}

/// Machines with at least one enabled stream that is not OK.
pub fn filter_errors(cycle: &CycleResult) -> Vec<MachineErrors> {
    cycle
        .machines
        .iter()
        .filter_map(|machine| {
            let error_streams: Vec<StreamLine> = machine
                .streams
                .iter()
                .filter(|r| r.enabled && !r.is_ok())
                .map(stream_line)
                .collect();

            (!error_streams.is_empty()).then(|| MachineErrors {
                machine_id: machine.machine_id.clone(),
                machine_name: machine.machine_name.clone(),
                error_streams,
            })
        })
        .collect()
}

/// Plain-text report, one line per enabled stream.
pub fn render_report(summary: &CycleSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "System status, sweep #{} at {}\n",
        summary.sweep,
        summary.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "machines: {} streams: {} active: {} failing: {} disabled: {}\n",
        summary.total_machines,
        summary.total_streams,
        summary.active_streams,
        summary.error_streams,
        summary.disabled_streams
    ));

    for machine in &summary.machines {
        out.push_str(&format!(
            "{} (id {})\n",
            machine.machine_name, machine.machine_id
        ));
        for line in &machine.details {
            out.push_str(&format!(
                "  stream {} {}: {}",
                line.stream_id, line.stream_name, line.verdict
            ));
            if line.verdict != Verdict::Ok {
                out.push_str(&format!(" - {}", line.message));
            }
            out.push('\n');
        }
    }

    out
}

fn stream_line(record: &StreamCheckRecord) -> StreamLine {
    StreamLine {
        stream_id: record.stream_id.clone(),
        stream_name: record.stream_name.clone(),
        verdict: record.verdict,
        error_type: record.error_type,
        message: record.message.clone(),
    }
}
