use async_trait::async_trait;

use super::report::MachineErrors;
use crate::error::NotifyError;
use crate::pipeline::types::CycleResult;

/// Where sweep reports and critical errors are delivered.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn send_summary_report(
        &self,
        cycle: &CycleResult,
        errors: &[MachineErrors],
    ) -> Result<(), NotifyError>;

    async fn send_critical_error(&self, message: &str) -> Result<(), NotifyError>;

    fn name(&self) -> &'static str;
}
