pub mod channel;
pub mod report;
pub mod tracing_notifier;

pub use channel::NotificationChannel;
pub use report::{filter_errors, summarize, CycleSummary, MachineErrors, MachineSummary};
pub use tracing_notifier::TracingNotifier;
