//! Periodic task driver and the shared runtime status it maintains.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use logger::{now_iso, EventLogger, PollStatusEvent};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Outcome of one successful tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Records returned by the upstream.
    pub items: usize,
    pub emitted: usize,
    /// State entries held after the tick.
    pub retained: usize,
    /// Set when the task is unconfigured and did nothing.
    pub skipped: Option<&'static str>,
}

impl TickReport {
    pub fn skipped(reason: &'static str) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::default()
        }
    }
}

/// A poll task owns its state; only its own driver loop calls `tick`.
#[async_trait]
pub trait PollTask: Send {
    fn name(&self) -> &'static str;
    async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport>;
}

// ====================================================================
// Runtime status (/state, heartbeat)
// ====================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskStatus {
    pub ticks: u64,
    pub failures: u64,
    pub skipped: u64,
    pub last_tick_at: Option<DateTime<Utc>>,
    pub last_ok_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub last_items: usize,
    pub emitted_total: u64,
    pub retained: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStatus {
    pub instance_id: String,
    pub started_at: DateTime<Utc>,
    pub tasks: BTreeMap<String, TaskStatus>,
}

impl RuntimeStatus {
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            started_at: Utc::now(),
            tasks: BTreeMap::new(),
        }
    }

    pub fn task(&self, name: &str) -> TaskStatus {
        self.tasks.get(name).cloned().unwrap_or_default()
    }

    pub fn failed_ticks(&self) -> u64 {
        self.tasks.values().map(|t| t.failures).sum()
    }
}

pub type SharedStatus = Arc<RwLock<RuntimeStatus>>;

pub fn shared_status(instance_id: impl Into<String>) -> SharedStatus {
    Arc::new(RwLock::new(RuntimeStatus::new(instance_id)))
}

// ====================================================================
// Driver
// ====================================================================

/// Run one tick and absorb its failure. Returns whether it succeeded.
pub async fn run_once<T: PollTask>(
    task: &mut T,
    now: DateTime<Utc>,
    status: &SharedStatus,
    logger: &EventLogger,
) -> bool {
    let name = task.name();
    let result = task.tick(now).await;

    let event = match &result {
        Ok(report) => {
            match report.skipped {
                Some(reason) => debug!("[{}] skipped: {}", name, reason),
                None if report.emitted > 0 => {
                    info!("[{}] {} items, {} alerts", name, report.items, report.emitted)
                }
                None => debug!("[{}] {} items, nothing new", name, report.items),
            }
            PollStatusEvent {
                ts: now_iso(),
                event: "POLL_STATUS",
                task: name.to_string(),
                ok: true,
                skipped: report.skipped.is_some(),
                items: report.items,
                emitted: report.emitted,
                message: report.skipped.unwrap_or("").to_string(),
            }
        }
        Err(e) => {
            warn!("[{}] tick failed: {:#}", name, e);
            PollStatusEvent {
                ts: now_iso(),
                event: "POLL_STATUS",
                task: name.to_string(),
                ok: false,
                skipped: false,
                items: 0,
                emitted: 0,
                message: format!("{e:#}"),
            }
        }
    };

    {
        let mut st = status.write().await;
        let entry = st.tasks.entry(name.to_string()).or_default();
        entry.ticks += 1;
        entry.last_tick_at = Some(now);
        match &result {
            Ok(report) => {
                if report.skipped.is_some() {
                    entry.skipped += 1;
                } else {
                    entry.last_ok_at = Some(now);
                    entry.last_error = None;
                    entry.last_items = report.items;
                    entry.emitted_total += report.emitted as u64;
                    entry.retained = report.retained;
                }
            }
            Err(e) => {
                entry.failures += 1;
                entry.last_error = Some(format!("{e:#}"));
            }
        }
    }

    // Skipped ticks are not worth a line every period.
    if !event.skipped {
        if let Err(e) = logger.log(&event) {
            warn!("poll status log failed: {:#}", e);
        }
    }
    result.is_ok()
}

/// Tick forever on a fixed period. A tick that overruns its period makes
/// the driver skip the missed slots instead of running back-to-back, so a
/// task never overlaps itself.
pub async fn run_periodic<T: PollTask>(
    mut task: T,
    period: Duration,
    status: SharedStatus,
    logger: Arc<EventLogger>,
) {
    info!("[{}] polling every {}s", task.name(), period.as_secs());
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        run_once(&mut task, Utc::now(), &status, &logger).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at, temp_logger};

    struct Flaky {
        calls: usize,
    }

    #[async_trait]
    impl PollTask for Flaky {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn tick(&mut self, _now: DateTime<Utc>) -> Result<TickReport> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                anyhow::bail!("upstream 503");
            }
            Ok(TickReport {
                items: 3,
                emitted: 1,
                retained: 3,
                skipped: None,
            })
        }
    }

    #[tokio::test]
    async fn failures_are_counted_and_do_not_stop_the_task() {
        let (logger, dir) = temp_logger("sched");
        let status = shared_status("test");
        let mut task = Flaky { calls: 0 };

        assert!(run_once(&mut task, at(12, 0, 0), &status, &logger).await);
        assert!(!run_once(&mut task, at(12, 0, 30), &status, &logger).await);
        assert!(run_once(&mut task, at(12, 1, 0), &status, &logger).await);

        let st = status.read().await;
        let t = st.task("flaky");
        assert_eq!(t.ticks, 3);
        assert_eq!(t.failures, 1);
        assert_eq!(t.emitted_total, 2);
        assert_eq!(t.last_ok_at, Some(at(12, 1, 0)));
        assert_eq!(t.last_error, None);
        assert_eq!(st.failed_ticks(), 1);
        std::fs::remove_dir_all(dir).ok();
    }

    struct Idle;

    #[async_trait]
    impl PollTask for Idle {
        fn name(&self) -> &'static str {
            "idle"
        }

        async fn tick(&mut self, _now: DateTime<Utc>) -> Result<TickReport> {
            Ok(TickReport::skipped("not configured"))
        }
    }

    #[tokio::test]
    async fn skipped_ticks_are_counted_separately() {
        let (logger, dir) = temp_logger("sched-skip");
        let status = shared_status("test");
        let mut task = Idle;
        assert!(run_once(&mut task, at(12, 0, 0), &status, &logger).await);
        let t = status.read().await.task("idle");
        assert_eq!(t.ticks, 1);
        assert_eq!(t.skipped, 1);
        assert_eq!(t.last_ok_at, None);
        std::fs::remove_dir_all(dir).ok();
    }
}
