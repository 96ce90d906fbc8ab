use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{watch, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{
    config::Configuration,
    error::{AppError, ConfigError},
    notify::{filter_errors, NotificationChannel, TracingNotifier},
    pipeline::{
        services::{image::PatternMatcher, stream_checker::StreamChecker},
        types::{CycleResult, Fleet, MachineResult, StreamCheckRecord},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone)]
struct ScheduleSettings {
    check_interval: Duration,
    inter_stream_delay: Duration,
    always_notify: bool,
}

struct Lifecycle {
    state: MonitorState,
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

/// Sweeps every configured stream on a fixed interval and reports the outcome.
pub struct Monitor {
    inner: Arc<MonitorInner>,
    lifecycle: Mutex<Lifecycle>,
}

struct MonitorInner {
    fleet: Fleet,
    checker: StreamChecker,
    notifier: Arc<dyn NotificationChannel>,
    settings: ScheduleSettings,
    sweeps: AtomicU64,
    results_tx: watch::Sender<Option<CycleResult>>,
    // Held for the whole of a sweep or manual check; at most one renderer session at a time.
    busy: AsyncMutex<()>,
}

impl Monitor {
    pub fn builder(configuration: &Configuration) -> SchedulerBuilder {
        SchedulerBuilder::new(configuration)
    }

    /// Spawns the sweep loop. The first sweep runs immediately. Returns
    /// `false` when the loop is already running.
    pub fn start(&self) -> bool {
        let mut lifecycle = self.lifecycle();
        if lifecycle.state == MonitorState::Running {
            tracing::debug!("Monitor already running");
            return false;
        }

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(Self::run_loop(self.inner.clone(), cancel_token.clone()));
        lifecycle.running = Some((cancel_token, handle));
        lifecycle.state = MonitorState::Running;

        tracing::info!(
            "Monitor started: {} machines, {} streams, every {:?}",
            self.inner.fleet.machines.len(),
            self.inner.fleet.stream_count(),
            self.inner.settings.check_interval
        );
        true
    }

    /// Prevents further sweeps. A sweep already in progress runs to completion.
    pub fn stop(&self) {
        self.halt();
    }

    /// Like [`Monitor::stop`], but waits for the loop to exit.
    pub async fn shutdown(&self) {
        if let Some(handle) = self.halt() {
            if let Err(e) = handle.await {
                tracing::error!("Monitor task ended abnormally: {}", e);
            }
        }
    }

    fn halt(&self) -> Option<JoinHandle<()>> {
        let mut lifecycle = self.lifecycle();
        let (cancel_token, handle) = lifecycle.running.take()?;
        cancel_token.cancel();
        lifecycle.state = MonitorState::Stopped;
        tracing::info!("Monitor stopped");
        Some(handle)
    }

    pub fn state(&self) -> MonitorState {
        self.lifecycle().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    /// Number of sweeps started so far.
    pub fn sweep_count(&self) -> u64 {
        self.inner.sweeps.load(Ordering::SeqCst)
    }

    /// Receives every completed sweep. Holds `None` until the first one.
    pub fn subscribe(&self) -> watch::Receiver<Option<CycleResult>> {
        self.inner.results_tx.subscribe()
    }

    pub fn latest(&self) -> Option<CycleResult> {
        self.inner.results_tx.borrow().clone()
    }

    pub fn matcher(&self) -> &PatternMatcher {
        self.inner.checker.matcher()
    }

    /// One full sweep outside the schedule, including notification.
    pub async fn run_sweep(&self) -> Result<CycleResult, AppError> {
        self.inner.sweep().await
    }

    /// Checks a single stream on demand. Nothing is published or notified.
    pub async fn check_one(
        &self,
        machine_id: &str,
        stream_id: &str,
    ) -> Result<StreamCheckRecord, AppError> {
        let machine = self
            .inner
            .fleet
            .find_machine(machine_id)
            .ok_or_else(|| AppError::MachineNotFound(machine_id.to_string()))?;
        let stream = machine
            .find_stream(stream_id)
            .ok_or_else(|| AppError::StreamNotFound {
                machine: machine_id.to_string(),
                stream: stream_id.to_string(),
            })?;

        let _busy = self.inner.busy.lock().await;
        tracing::info!("Manual check of {} - {}", machine.name, stream.name);
        Ok(self.inner.checker.check_stream(stream, machine).await)
    }

    async fn run_loop(inner: Arc<MonitorInner>, cancel_token: CancellationToken) {
        let mut interval = tokio::time::interval(inner.settings.check_interval);
        // A sweep longer than the interval delays the next one instead of stacking.
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => inner.sweep_and_report().await,
            }
        }
        tracing::debug!("Sweep loop exited");
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.halt();
    }
}

impl MonitorInner {
    async fn sweep_and_report(&self) {
        if let Err(e) = self.sweep().await {
            tracing::error!("Sweep failed: {}", e);
            let message = format!("Monitoring sweep failed: {e}");
            if let Err(notify_err) = self.notifier.send_critical_error(&message).await {
                tracing::error!("Failed to deliver critical error: {}", notify_err);
            }
        }
    }

    async fn sweep(&self) -> Result<CycleResult, AppError> {
        let _busy = self.busy.lock().await;
        let sweep = self.sweeps.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Sweep #{} started", sweep);

        let mut cycle = CycleResult::new(sweep);
        let mut checked = 0usize;

        for machine in &self.fleet.machines {
            let mut result = MachineResult::new(machine.id.clone(), machine.name.clone());

            for stream in &machine.streams {
                let record = self.checker.check_stream(stream, machine).await;
                if stream.enabled {
                    checked += 1;
                }
                result.streams.push(record);

                // Paces the renderer; applies after every stream, disabled ones included.
                if !self.settings.inter_stream_delay.is_zero() {
                    tokio::time::sleep(self.settings.inter_stream_delay).await;
                }
            }

            cycle.machines.push(result);
        }

        let failures = cycle.failure_count();
        tracing::info!(
            "Sweep #{} finished: {} streams checked, {} failing",
            sweep,
            checked,
            failures
        );
        self.results_tx.send_replace(Some(cycle.clone()));

        let errors = filter_errors(&cycle);
        if !errors.is_empty() || self.settings.always_notify {
            self.notifier.send_summary_report(&cycle, &errors).await?;
            tracing::debug!("Report sent via {}", self.notifier.name());
        }

        Ok(cycle)
    }
}

pub struct SchedulerBuilder {
    settings: ScheduleSettings,
    fleet: Option<Fleet>,
    checker: Option<StreamChecker>,
    notifier: Option<Arc<dyn NotificationChannel>>,
}

impl SchedulerBuilder {
    pub fn new(configuration: &Configuration) -> Self {
        Self {
            settings: ScheduleSettings {
                check_interval: configuration.check_interval(),
                inter_stream_delay: configuration.inter_stream_delay(),
                always_notify: configuration.monitoring.always_notify,
            },
            fleet: None,
            checker: None,
            notifier: None,
        }
    }

    // Overrides monitoring.check_interval_ms.
    pub fn check_interval(mut self, check_interval: Duration) -> Self {
        self.settings.check_interval = check_interval;
        self
    }

    // Overrides monitoring.inter_stream_delay_ms.
    pub fn inter_stream_delay(mut self, inter_stream_delay: Duration) -> Self {
        self.settings.inter_stream_delay = inter_stream_delay;
        self
    }

    // Overrides monitoring.always_notify.
    pub fn always_notify(mut self, always_notify: bool) -> Self {
        self.settings.always_notify = always_notify;
        self
    }

    pub fn fleet(mut self, fleet: Fleet) -> Self {
        self.fleet = Some(fleet);
        self
    }

    pub fn checker(mut self, checker: StreamChecker) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Defaults to [`TracingNotifier`].
    pub fn notifier(mut self, notifier: Arc<dyn NotificationChannel>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<Monitor, AppError> {
        if self.settings.check_interval.is_zero() {
            return Err(ConfigError::Invalid("Check interval must be greater than 0".to_string()).into());
        }
        let fleet = self
            .fleet
            .ok_or_else(|| ConfigError::Invalid("Fleet not set".to_string()))?;
        let checker = self
            .checker
            .ok_or_else(|| ConfigError::Invalid("Stream checker not set".to_string()))?;
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier::new()));

        let (results_tx, _) = watch::channel(None);
        Ok(Monitor {
            inner: Arc::new(MonitorInner {
                fleet,
                checker,
                notifier,
                settings: self.settings,
                sweeps: AtomicU64::new(0),
                results_tx,
                busy: AsyncMutex::new(()),
            }),
            lifecycle: Mutex::new(Lifecycle {
                state: MonitorState::Idle,
                running: None,
            }),
        })
    }
}
