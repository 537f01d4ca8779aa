//! A team's live dashboard.
//!
//! Two schedules run per session: the reconciliation poll, which re-fetches the
//! authoritative participation list, and the countdown towards the current
//! participation's end. Readers observe both through one [`DashboardSnapshot`]
//! published on a `watch` channel, so a reader never sees a half-applied fetch.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use api::{ApiError, HackathonApi};
use common::config::DashboardAppConfig;
use common::time::format_remaining;
use common::{Participation, SolutionForm};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::countdown::{CountdownEngine, CountdownEvent};
use crate::error::{DashboardError, Result, SubmitError};
use crate::lifecycle::{ResolvedLifecycle, resolve};

const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownDisplay {
    /// Nothing is running.
    Idle,
    /// `HH:MM:SS` left on the current participation.
    Running(String),
    /// The last running participation reached its end.
    Expired,
}

/// A dismissible message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The last poll failed. The data shown is from the previous fetch.
    FetchFailed { message: String },
    /// The server rejected the token. Polling has stopped.
    SessionExpired,
}

#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    /// The list as last fetched, with local expiry demotions applied.
    pub participations: Arc<Vec<Participation>>,
    pub lifecycle: Arc<ResolvedLifecycle>,
    pub countdown: CountdownDisplay,
    pub notice: Option<Notice>,
    /// Whether any fetch has been applied yet.
    pub loaded: bool,
}

impl DashboardSnapshot {
    fn initial(lifecycle: ResolvedLifecycle) -> Self {
        Self {
            participations: Arc::new(Vec::new()),
            lifecycle: Arc::new(lifecycle),
            countdown: CountdownDisplay::Idle,
            notice: None,
            loaded: false,
        }
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Applied,
    /// The response arrived after teardown or after a newer fetch was applied.
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Fetch,
    Expiry,
}

#[derive(Debug, Default)]
struct Gate {
    /// Bumped on teardown.
    generation: u64,
    closed: bool,
    /// Ticket of the most recently started fetch.
    issued: u64,
    /// Ticket of the most recently applied fetch.
    applied: u64,
}

struct Inner {
    api: Arc<dyn HackathonApi>,
    clock: Arc<dyn Clock>,
    countdown: CountdownEngine,
    state: watch::Sender<DashboardSnapshot>,
    gate: Mutex<Gate>,
}

impl Inner {
    fn lock_gate(&self) -> MutexGuard<'_, Gate> {
        self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn refresh(&self) -> Result<Refresh> {
        let (generation, ticket) = {
            let mut gate = self.lock_gate();
            if gate.closed {
                return Err(DashboardError::TornDown);
            }
            gate.issued += 1;
            (gate.generation, gate.issued)
        };

        let fetched = self.api.fetch_participations().await;

        let mut gate = self.lock_gate();
        if gate.generation != generation || ticket <= gate.applied {
            debug!(ticket, applied = gate.applied, "Discarding stale participation fetch");
            return Ok(Refresh::Discarded);
        }

        match fetched {
            Ok(participations) => {
                gate.applied = ticket;
                let lifecycle = resolve(&participations, self.clock.now());
                for anomaly in &lifecycle.anomalies {
                    warn!(%anomaly, "Inconsistent participation data");
                }
                self.publish(participations, lifecycle, Origin::Fetch);
                Ok(Refresh::Applied)
            }
            Err(e) => {
                let notice = match &e {
                    ApiError::Unauthorized => Notice::SessionExpired,
                    other => Notice::FetchFailed {
                        message: other.to_string(),
                    },
                };
                self.state.send_modify(|s| s.notice = Some(notice));
                Err(e.into())
            }
        }
    }

    /// Replace the snapshot in one step, then retarget the countdown.
    fn publish(
        &self,
        participations: Vec<Participation>,
        lifecycle: ResolvedLifecycle,
        origin: Origin,
    ) {
        let now = self.clock.now();
        let target = lifecycle.current_end();

        self.state.send_modify(|s| {
            s.participations = Arc::new(participations);
            s.lifecycle = Arc::new(lifecycle);
            s.loaded = true;
            if origin == Origin::Fetch && matches!(s.notice, Some(Notice::FetchFailed { .. })) {
                s.notice = None;
            }
            s.countdown = match (target, origin) {
                (Some(end), _) => CountdownDisplay::Running(format_remaining(end - now)),
                (None, Origin::Expiry) => CountdownDisplay::Expired,
                (None, Origin::Fetch) => match &s.countdown {
                    CountdownDisplay::Running(_) => CountdownDisplay::Idle,
                    kept => kept.clone(),
                },
            };
        });

        match target {
            Some(end) if self.countdown.target() != Some(end) => self.countdown.start(end),
            Some(_) => {}
            None => self.countdown.stop(),
        }
    }

    fn show_tick(&self) {
        let now = self.clock.now();
        self.state.send_if_modified(|s| {
            let Some(remaining) = s.lifecycle.remaining(now) else {
                return false;
            };
            let display = CountdownDisplay::Running(format_remaining(remaining));
            if s.countdown == display {
                return false;
            }
            s.countdown = display;
            true
        });
    }

    /// Demote the current participation once its end has passed.
    fn expire_current(&self) {
        let gate = self.lock_gate();
        if gate.closed {
            return;
        }

        let now = self.clock.now();
        let snapshot = self.state.borrow().clone();
        let Some(current) = snapshot.lifecycle.current.as_ref() else {
            return;
        };
        if current.window.end > now {
            return;
        }

        let hackathon_id = current.participation.hackathon_id.clone();
        let mut participations = snapshot.participations.as_ref().clone();
        for p in participations
            .iter_mut()
            .filter(|p| p.hackathon_id == hackathon_id)
        {
            p.active = false;
        }

        info!(hackathon_id = %hackathon_id, "Hackathon time elapsed");
        let lifecycle = resolve(&participations, now);
        self.publish(participations, lifecycle, Origin::Expiry);
        drop(gate);
    }
}

/// Handle to a running dashboard. Dropping it tears the session down.
pub struct DashboardSession {
    inner: Arc<Inner>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DashboardSession {
    /// Spawn the poll and countdown schedules. The first fetch starts immediately.
    pub fn start(
        api: Arc<dyn HackathonApi>,
        clock: Arc<dyn Clock>,
        config: &DashboardAppConfig,
    ) -> Self {
        let (countdown, events) = CountdownEngine::new(Arc::clone(&clock), TICK_PERIOD);
        let (state, _) = watch::channel(DashboardSnapshot::initial(ResolvedLifecycle::empty(
            clock.now(),
        )));

        let inner = Arc::new(Inner {
            api,
            clock,
            countdown,
            state,
            gate: Mutex::new(Gate::default()),
        });

        let tasks = vec![
            tokio::spawn(poll_loop(Arc::clone(&inner), config.poll_interval())),
            tokio::spawn(forward_countdown(Arc::clone(&inner), events)),
        ];

        info!(
            poll_interval_secs = config.poll_interval().as_secs(),
            "Dashboard session started"
        );

        Self {
            inner,
            tasks: Mutex::new(tasks),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.inner.state.borrow().clone()
    }

    /// Reconcile now instead of waiting for the next poll.
    pub async fn refresh(&self) -> Result<Refresh> {
        self.inner.refresh().await
    }

    /// Submit a solution for the current participation and reconcile at once.
    ///
    /// Input is validated before any request is made.
    pub async fn submit_solution(&self, form: &SolutionForm) -> std::result::Result<(), SubmitError> {
        let solution = form.validate()?;
        let hackathon_id = self
            .snapshot()
            .lifecycle
            .current_id()
            .map(str::to_owned)
            .ok_or(SubmitError::NoActiveHackathon)?;

        self.inner
            .api
            .submit_solution(&hackathon_id, &solution)
            .await?;
        info!(hackathon_id = %hackathon_id, "Solution submitted");

        if let Err(e) = self.inner.refresh().await {
            warn!(error = %e, "Reconciliation after submission failed");
        }
        Ok(())
    }

    pub fn dismiss_notice(&self) {
        self.inner.state.send_if_modified(|s| s.notice.take().is_some());
    }

    /// Stop both schedules. Fetches still in flight are discarded when they land.
    pub fn teardown(&self) {
        {
            let mut gate = self.inner.lock_gate();
            if gate.closed {
                return;
            }
            gate.closed = true;
            gate.generation += 1;
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for task in tasks.drain(..) {
            task.abort();
        }
        self.inner.countdown.stop();
        info!("Dashboard session torn down");
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn poll_loop(inner: Arc<Inner>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match inner.refresh().await {
            Ok(_) => {}
            Err(DashboardError::TornDown) => return,
            Err(e) if e.is_unauthorized() => {
                warn!("Session token rejected, stopping reconciliation");
                return;
            }
            Err(e) => warn!(error = %e, "Participation fetch failed, keeping last known state"),
        }
    }
}

async fn forward_countdown(inner: Arc<Inner>, mut events: mpsc::UnboundedReceiver<CountdownEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            CountdownEvent::Tick { .. } => inner.show_tick(),
            CountdownEvent::Expired => inner.expire_current(),
        }
    }
}
