use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ErrorType, MachineConfig, MatchResult, PatternCategory, StreamConfig, Verdict};

/// Everything known about one stream after a check, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamCheckRecord {
    pub machine_id: String,
    pub stream_id: String,
    pub stream_name: String,
    pub url: String,
    pub category: PatternCategory,
    pub enabled: bool,
    pub verdict: Verdict,
    pub error_type: Option<ErrorType>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub details: Option<MatchResult>,
}

impl StreamCheckRecord {
    fn base(stream: &StreamConfig, machine: &MachineConfig, verdict: Verdict, message: String) -> Self {
        Self {
            machine_id: machine.id.clone(),
            stream_id: stream.id.clone(),
            stream_name: stream.name.clone(),
            url: stream.url.clone(),
            category: stream.category,
            enabled: stream.enabled,
            verdict,
            error_type: verdict.error_type(),
            message,
            timestamp: Utc::now(),
            details: None,
        }
    }

    pub fn disabled(stream: &StreamConfig, machine: &MachineConfig) -> Self {
        Self::base(stream, machine, Verdict::Disabled, "Stream is disabled".to_string())
    }

    pub fn system_error(
        stream: &StreamConfig,
        machine: &MachineConfig,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::base(
            stream,
            machine,
            Verdict::SystemError,
            format!("System error: {cause}"),
        )
    }

    pub fn from_match(stream: &StreamConfig, machine: &MachineConfig, result: MatchResult) -> Self {
        let mut record = Self::base(stream, machine, result.verdict, result.message.clone());
        record.details = Some(result);
        record
    }

    pub fn is_ok(&self) -> bool {
        self.verdict == Verdict::Ok
    }
}
