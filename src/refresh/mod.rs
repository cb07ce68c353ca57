// src/refresh/mod.rs
//! Keeps the registrant list fresh: one driver task runs fetch cycles on a
//! fixed interval and on demand, and publishes every state change to subscribers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::fetch::Source;
use crate::parse::{parse_registrants, Registrant};

/// Outcome of the most recent fetch cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum FetchStatus {
    Loading,
    Success {
        records: Arc<[Registrant]>,
        at: DateTime<Local>,
    },
    Error {
        message: String,
        at: DateTime<Local>,
    },
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchStatus::Error { message, .. } => Some(message.as_str()),
            _ => None,
        }
    }
}

/// What subscribers see: the current status plus the last good roster.
///
/// A failed cycle only replaces `status`; `records` keeps the previous
/// successful sequence until another cycle succeeds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub status: FetchStatus,
    pub records: Arc<[Registrant]>,
    pub last_updated: Option<DateTime<Local>>,
}

impl Snapshot {
    fn initial() -> Self {
        Self {
            status: FetchStatus::Loading,
            records: Arc::from(Vec::new()),
            last_updated: None,
        }
    }

    pub fn registered(&self) -> usize {
        self.records.len()
    }

    /// The print trigger is offered only with data on hand and no fetch in flight.
    pub fn can_export(&self) -> bool {
        !self.status.is_loading() && !self.records.is_empty()
    }
}

/// Shortest polling period; anything below it (zero included) is raised to it.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum Command {
    Refresh,
}

/// Owns the polling task.
///
/// Both dropping the controller and [`shutdown`](Self::shutdown) cancel the
/// timer and stop the driver before its next state change. A drop does not
/// wait, so a driver running on another worker can still be mid-publish at
/// that instant; only once `shutdown` returns is it certain that nothing
/// further will be published.
pub struct RefreshController {
    status: watch::Receiver<Snapshot>,
    commands: mpsc::Sender<Command>,
    closed: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl RefreshController {
    /// Spawn the driver. The first cycle starts immediately, then every
    /// `interval`, raised to [`MIN_INTERVAL`] when shorter.
    pub fn spawn<S: Source>(source: S, interval: Duration) -> Self {
        let interval = if interval < MIN_INTERVAL {
            warn!(requested = ?interval, "refresh interval too short, using {:?}", MIN_INTERVAL);
            MIN_INTERVAL
        } else {
            interval
        };
        let (status_tx, status_rx) = watch::channel(Snapshot::initial());
        // A single slot: one queued manual request is as good as many.
        let (cmd_tx, cmd_rx) = mpsc::channel(1);
        let closed = Arc::new(AtomicBool::new(false));
        let driver = Driver {
            source,
            status: status_tx,
            commands: cmd_rx,
            closed: Arc::clone(&closed),
        };
        let task = tokio::spawn(driver.run(interval));
        info!(interval_secs = interval.as_secs(), "refresh controller started");
        Self {
            status: status_rx,
            commands: cmd_tx,
            closed,
            task: Some(task),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.status.clone()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.status.borrow().clone()
    }

    /// Ask for an immediate cycle. `true` means a cycle will start after this
    /// call. `false` means the request was collapsed into a fetch already in
    /// flight or already queued, or the controller is stopped.
    pub fn refresh(&self) -> bool {
        if self.task.is_none() || self.status.borrow().status.is_loading() {
            debug!("refresh ignored, fetch already in flight");
            return false;
        }
        self.commands.try_send(Command::Refresh).is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and wait for the driver to be gone. Safe to call twice.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            self.closed.store(true, Ordering::Release);
            task.abort();
            let _ = task.await;
            info!("refresh controller stopped");
        }
    }
}

impl Drop for RefreshController {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            self.closed.store(true, Ordering::Release);
            task.abort();
        }
    }
}

struct Driver<S> {
    source: S,
    status: watch::Sender<Snapshot>,
    commands: mpsc::Receiver<Command>,
    closed: Arc<AtomicBool>,
}

impl<S: Source> Driver<S> {
    async fn run(mut self, interval: Duration) {
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                cmd = self.commands.recv() => match cmd {
                    Some(Command::Refresh) => debug!("manual refresh"),
                    None => break,
                },
            }
            // Anything queued so far is satisfied by the cycle about to start.
            // Requests made once it is running stay queued for the next one.
            while self.commands.try_recv().is_ok() {}
            self.cycle().await;
        }
    }

    /// Apply a state change unless the controller has let go.
    fn publish(&self, change: impl FnOnce(&mut Snapshot)) -> bool {
        if self.closed.load(Ordering::Acquire) {
            debug!("controller closed, state change dropped");
            return false;
        }
        self.status.send_modify(change);
        true
    }

    async fn cycle(&mut self) {
        if !self.publish(|snap| snap.status = FetchStatus::Loading) {
            return;
        }

        let outcome = match self.source.fetch().await {
            Ok(body) => parse_registrants(&body),
            Err(e) => Err(e),
        };
        let at = Local::now();

        match outcome {
            Ok(records) => {
                info!(records = records.len(), "roster refreshed");
                let records: Arc<[Registrant]> = records.into();
                self.publish(|snap| {
                    *snap = Snapshot {
                        status: FetchStatus::Success {
                            records: Arc::clone(&records),
                            at,
                        },
                        records,
                        last_updated: Some(at),
                    }
                });
            }
            Err(e) => {
                if e.is_transport() {
                    warn!(error = %e, "roster refresh failed, source unreachable");
                } else {
                    error!(error = %e, "roster refresh failed, sheet unusable");
                }
                self.publish(|snap| {
                    snap.status = FetchStatus::Error {
                        message: e.to_string(),
                        at,
                    };
                    snap.last_updated = Some(at);
                });
            }
        }
    }
}
