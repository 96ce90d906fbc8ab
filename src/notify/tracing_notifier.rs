use async_trait::async_trait;
use tracing::{error, info, warn};

use super::channel::NotificationChannel;
use super::report::{render_report, summarize, MachineErrors};
use crate::error::NotifyError;
use crate::pipeline::types::CycleResult;

/// Writes reports to the log instead of an external service.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationChannel for TracingNotifier {
    async fn send_summary_report(
        &self,
        cycle: &CycleResult,
        errors: &[MachineErrors],
    ) -> Result<(), NotifyError> {
        let summary = summarize(cycle);
        for line in render_report(&summary).lines() {
            info!("{}", line);
        }

        for machine in errors {
            for stream in &machine.error_streams {
                warn!(
                    "{} stream {} ({}): {} - {}",
                    machine.machine_name,
                    stream.stream_id,
                    stream.stream_name,
                    stream.verdict,
                    stream.message
                );
            }
        }
        Ok(())
    }

    async fn send_critical_error(&self, message: &str) -> Result<(), NotifyError> {
        error!("Critical: {}", message);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}
