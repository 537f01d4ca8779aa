//! Per-second countdown towards a target instant.
//!
//! Remaining time is recomputed from the clock on every tick rather than
//! decremented, so scheduling jitter never accumulates and a suspended process
//! catches up on its first tick after resuming.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use common::time::format_remaining;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::clock::Clock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Time left, always positive.
    Tick { remaining: TimeDelta },
    /// The target was reached. Sent once per `start`.
    Expired,
}

impl CountdownEvent {
    /// `HH:MM:SS` for ticks, `None` once expired.
    pub fn display(&self) -> Option<String> {
        match self {
            CountdownEvent::Tick { remaining } => Some(format_remaining(*remaining)),
            CountdownEvent::Expired => None,
        }
    }
}

struct Run {
    end: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Ticks towards one target at a time.
///
/// Events are delivered on the receiver returned by [`CountdownEngine::new`].
/// Once [`stop`](Self::stop) or a replacing [`start`](Self::start) returns, no
/// event from the previous schedule is delivered.
pub struct CountdownEngine {
    clock: Arc<dyn Clock>,
    period: Duration,
    events: mpsc::UnboundedSender<CountdownEvent>,
    /// Generation of the schedule allowed to emit. Held while sending.
    gate: Arc<Mutex<u64>>,
    run: Mutex<Option<Run>>,
}

impl CountdownEngine {
    pub fn new(
        clock: Arc<dyn Clock>,
        period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<CountdownEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let engine = Self {
            clock,
            period,
            events,
            gate: Arc::new(Mutex::new(0)),
            run: Mutex::new(None),
        };
        (engine, rx)
    }

    /// Begin counting down to `end`, replacing any running schedule.
    ///
    /// The first tick fires immediately. Must be called inside a tokio runtime.
    pub fn start(&self, end: DateTime<Utc>) {
        let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.retire(&mut run);

        debug!(%end, generation, "Countdown started");
        let handle = tokio::spawn(tick_loop(
            generation,
            Arc::clone(&self.gate),
            Arc::clone(&self.clock),
            end,
            self.period,
            self.events.clone(),
        ));
        *run = Some(Run { end, handle });
    }

    /// Halt ticking. Safe to call when nothing is running.
    pub fn stop(&self) {
        let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        if run.is_some() {
            self.retire(&mut run);
            debug!("Countdown stopped");
        }
    }

    /// Target of the schedule that is still ticking, if any.
    pub fn target(&self) -> Option<DateTime<Utc>> {
        let run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        run.as_ref()
            .filter(|r| !r.handle.is_finished())
            .map(|r| r.end)
    }

    pub fn is_running(&self) -> bool {
        self.target().is_some()
    }

    /// Silence and abort the current schedule. Returns the next generation.
    fn retire(&self, run: &mut Option<Run>) -> u64 {
        let next = {
            let mut current = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            *current += 1;
            *current
        };
        if let Some(old) = run.take() {
            old.handle.abort();
        }
        next
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn tick_loop(
    generation: u64,
    gate: Arc<Mutex<u64>>,
    clock: Arc<dyn Clock>,
    end: DateTime<Utc>,
    period: Duration,
    events: mpsc::UnboundedSender<CountdownEvent>,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let remaining = end - clock.now();
        let expired = remaining <= TimeDelta::zero();
        let event = if expired {
            CountdownEvent::Expired
        } else {
            CountdownEvent::Tick { remaining }
        };

        {
            let current = gate.lock().unwrap_or_else(PoisonError::into_inner);
            if *current != generation || events.send(event).is_err() {
                return;
            }
        }

        if expired {
            debug!(%end, generation, "Countdown expired");
            return;
        }
    }
}
