//! Recurring multi-source scan scheduler.
//!
//! [`ScanOrchestrator`] is a two-state machine (stopped / running) over a
//! [`JobScheduler`]. While running it owns exactly one repeated job at the
//! configured interval. Ticks never overlap: a fire that finds a tick in
//! flight is skipped.

mod tick;

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use leadscan_core::{Clock, ConfigError, ScanResult, ScanTargets, ScanTrigger, TargetsUpdate};
use leadscan_qualify::LeadQualifier;
use leadscan_sources::ContentSource;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

use crate::scan_log::ScanLog;
use crate::sink::LeadSink;

pub const DEFAULT_PANIC_BACKOFF: Duration = Duration::from_secs(5);

/// Collaborators a tick needs. All are shared and reentrant.
pub struct ScanDeps {
    pub qualifier: Arc<LeadQualifier>,
    pub sources: Vec<Arc<dyn ContentSource>>,
    pub sink: Arc<dyn LeadSink>,
    pub scan_log: Arc<ScanLog>,
    pub clock: Arc<dyn Clock>,
    /// Bound on one source's collector fetch.
    pub source_timeout: Duration,
    /// Pause before ticks resume after one panicked.
    pub panic_backoff: Duration,
}

/// The only state shared between the control surface and the tick loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanConfig {
    pub targets: ScanTargets,
    pub interval_minutes: u32,
}

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("interval must be at least 1 minute, got {0}")]
    InvalidInterval(i64),

    #[error(transparent)]
    InvalidTargets(#[from] ConfigError),

    #[error("a scan is already in progress")]
    ScanInProgress,

    #[error("scan tick failed before completing")]
    TickFailed,

    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

#[derive(Debug, Clone, Serialize)]
pub struct LastScan {
    pub id: Uuid,
    pub trigger: ScanTrigger,
    pub finished_at: DateTime<Utc>,
    pub total_leads: usize,
}

/// Read-only snapshot returned by [`ScanOrchestrator::status`].
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub interval_minutes: u32,
    pub next_run: Option<DateTime<Utc>>,
    pub scan_in_progress: bool,
    pub last_scan: Option<LastScan>,
    pub config: ScanTargets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Stopped,
    Running { job_id: Uuid },
}

struct Control {
    run: RunState,
    next_run: Option<DateTime<Utc>>,
}

struct Inner {
    deps: ScanDeps,
    scheduler: JobScheduler,
    config: RwLock<ScanConfig>,
    control: Mutex<Control>,
    tick_guard: Arc<Mutex<()>>,
}

/// Cheap-to-clone handle; all clones drive the same scheduler.
#[derive(Clone)]
pub struct ScanOrchestrator {
    inner: Arc<Inner>,
}

impl ScanOrchestrator {
    /// Build a stopped orchestrator and start its underlying job scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidInterval`] for a zero interval, or
    /// [`ControlError::Scheduler`] if the job scheduler cannot start.
    pub async fn new(deps: ScanDeps, config: ScanConfig) -> Result<Self, ControlError> {
        if config.interval_minutes == 0 {
            return Err(ControlError::InvalidInterval(0));
        }
        let scheduler = JobScheduler::new().await?;
        scheduler.start().await?;

        Ok(Self {
            inner: Arc::new(Inner {
                deps,
                scheduler,
                config: RwLock::new(config),
                control: Mutex::new(Control {
                    run: RunState::Stopped,
                    next_run: None,
                }),
                tick_guard: Arc::new(Mutex::new(())),
            }),
        })
    }

    /// Register the recurring tick and run one scan immediately.
    ///
    /// Returns `false` (with a warning) when already running.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Scheduler`] if the job cannot be registered.
    pub async fn start(&self) -> Result<bool, ControlError> {
        {
            let mut control = self.inner.control.lock().await;
            if control.run != RunState::Stopped {
                tracing::warn!("scheduler: start requested but already running");
                return Ok(false);
            }
            let minutes = self.inner.config.read().await.interval_minutes;
            let job_id = self.register_job(minutes).await?;
            control.run = RunState::Running { job_id };
            control.next_run = Some(self.next_run_after(minutes));
            tracing::info!(interval_minutes = minutes, "scheduler: started");
        }

        if let Err(e) = self.run_exclusive(ScanTrigger::Initial).await {
            tracing::warn!(error = %e, "scheduler: initial scan did not run");
        }
        Ok(true)
    }

    /// Cancel the recurring tick. A tick already in flight runs to completion.
    ///
    /// Returns `false` (with a warning) when already stopped.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::Scheduler`] if the job cannot be removed.
    pub async fn stop(&self) -> Result<bool, ControlError> {
        let mut control = self.inner.control.lock().await;
        let RunState::Running { job_id } = control.run else {
            tracing::warn!("scheduler: stop requested but not running");
            return Ok(false);
        };
        self.inner.scheduler.remove(&job_id).await?;
        control.run = RunState::Stopped;
        control.next_run = None;
        tracing::info!("scheduler: stopped");
        Ok(true)
    }

    /// Change the cadence. When running, the job is re-registered at the new
    /// interval without an extra scan.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidInterval`] for values below 1, leaving
    /// all state untouched, or [`ControlError::Scheduler`] if re-registration
    /// fails (the scheduler is then stopped).
    pub async fn set_interval(&self, minutes: i64) -> Result<(), ControlError> {
        let validated = u32::try_from(minutes)
            .ok()
            .filter(|m| *m >= 1)
            .ok_or(ControlError::InvalidInterval(minutes))?;

        let mut control = self.inner.control.lock().await;
        if let RunState::Running { job_id } = control.run {
            self.inner.scheduler.remove(&job_id).await?;
            match self.register_job(validated).await {
                Ok(new_job) => {
                    control.run = RunState::Running { job_id: new_job };
                    control.next_run = Some(self.next_run_after(validated));
                }
                Err(e) => {
                    control.run = RunState::Stopped;
                    control.next_run = None;
                    tracing::error!(
                        error = %e,
                        "scheduler: failed to re-register scan job; stopped"
                    );
                    return Err(e);
                }
            }
        }
        self.inner.config.write().await.interval_minutes = validated;
        tracing::info!(interval_minutes = validated, "scheduler: scan interval updated");
        Ok(())
    }

    /// Apply a partial target update. Every entry is validated before
    /// anything changes.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::InvalidTargets`] naming the first bad entry.
    pub async fn set_config(&self, update: &TargetsUpdate) -> Result<ScanTargets, ControlError> {
        let mut config = self.inner.config.write().await;
        let updated = config.targets.with_update(update)?;
        config.targets = updated.clone();
        tracing::info!(
            hashtags = updated.hashtags.len(),
            facebook_groups = updated.facebook_groups.len(),
            youtube_videos = updated.youtube_videos.len(),
            "scheduler: scan targets updated"
        );
        Ok(updated)
    }

    pub async fn status(&self) -> SchedulerStatus {
        let (running, next_run) = {
            let control = self.inner.control.lock().await;
            (control.run != RunState::Stopped, control.next_run)
        };
        let config = self.inner.config.read().await.clone();
        let last_scan = self.inner.deps.scan_log.latest().await.map(|r| LastScan {
            id: r.id,
            trigger: r.trigger,
            finished_at: r.finished_at,
            total_leads: r.total_leads,
        });

        SchedulerStatus {
            running,
            interval_minutes: config.interval_minutes,
            next_run,
            scan_in_progress: self.inner.tick_guard.try_lock().is_err(),
            last_scan,
            config: config.targets,
        }
    }

    /// Run one scan now, outside the schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::ScanInProgress`] when a tick is already
    /// running, or [`ControlError::TickFailed`] if the tick panicked.
    pub async fn scan_now(&self) -> Result<ScanResult, ControlError> {
        self.run_exclusive(ScanTrigger::Manual).await
    }

    pub async fn history(&self, limit: usize) -> Vec<ScanResult> {
        self.inner.deps.scan_log.history(limit).await
    }

    fn next_run_after(&self, minutes: u32) -> DateTime<Utc> {
        self.inner.deps.clock.now() + chrono::Duration::minutes(i64::from(minutes))
    }

    async fn register_job(&self, minutes: u32) -> Result<Uuid, ControlError> {
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let period = Duration::from_secs(u64::from(minutes) * 60);

        let job = Job::new_repeated_async(period, move |job_id, _lock| {
            let weak = weak.clone();
            Box::pin(async move {
                if let Some(inner) = weak.upgrade() {
                    ScanOrchestrator { inner }.scheduled_fire(job_id).await;
                }
            })
        })?;

        Ok(self.inner.scheduler.add(job).await?)
    }

    async fn scheduled_fire(&self, job_id: Uuid) {
        {
            let mut control = self.inner.control.lock().await;
            if control.run != (RunState::Running { job_id }) {
                tracing::debug!(
                    %job_id,
                    "scheduler: ignoring fire from a replaced or removed job"
                );
                return;
            }
            let minutes = self.inner.config.read().await.interval_minutes;
            control.next_run = Some(self.next_run_after(minutes));
        }

        match self.run_exclusive(ScanTrigger::Scheduled).await {
            Ok(_) => {}
            Err(ControlError::ScanInProgress) => {
                tracing::warn!("scheduler: previous scan still running; skipping this fire");
            }
            Err(e) => tracing::error!(error = %e, "scheduler: scheduled scan failed"),
        }
    }

    /// Run a tick under the non-blocking guard. The tick runs in its own task
    /// so a panic is contained; the guard is then held through the back-off.
    async fn run_exclusive(&self, trigger: ScanTrigger) -> Result<ScanResult, ControlError> {
        let guard = Arc::clone(&self.inner.tick_guard)
            .try_lock_owned()
            .map_err(|_| ControlError::ScanInProgress)?;

        let this = self.clone();
        let backoff = self.inner.deps.panic_backoff;
        let supervisor = tokio::spawn(async move {
            let _guard = guard;
            let worker = tokio::spawn(async move { this.tick(trigger).await });
            match worker.await {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        ?trigger,
                        "scheduler: scan tick panicked; backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    None
                }
            }
        });

        match supervisor.await {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Err(ControlError::TickFailed),
            Err(e) => {
                tracing::error!(error = %e, "scheduler: scan supervisor task failed");
                Err(ControlError::TickFailed)
            }
        }
    }

    async fn tick(&self, trigger: ScanTrigger) -> ScanResult {
        let targets = self.inner.config.read().await.targets.clone();
        tick::run_scan(&self.inner.deps, &targets, trigger).await
    }
}
