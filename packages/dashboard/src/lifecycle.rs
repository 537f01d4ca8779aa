//! Classify a team's participations into the single current one and history.
//!
//! The server's `active` flag is a hint. A participation whose end has passed, or
//! which already carries a solution, is over whatever the flag says.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use common::participation::{Participation, TimestampError, Window};

/// Why a participation is not the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Timestamps unusable.
    Malformed,
    /// A solution has been recorded.
    Submitted,
    /// The end instant is at or before now.
    TimeElapsed,
    /// The server flag is off.
    ServerClosed,
    /// Eligible, but another eligible participation started later.
    Superseded,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::Submitted => "submitted",
            Self::TimeElapsed => "time elapsed",
            Self::ServerClosed => "closed",
            Self::Superseded => "superseded",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndedParticipation {
    pub participation: Participation,
    pub reason: EndReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentParticipation {
    pub participation: Participation,
    pub window: Window,
}

/// Server data the resolver had to work around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// More than one participation qualified as current.
    MultipleActive {
        chosen: String,
        others: Vec<String>,
    },
    MalformedTimestamp {
        hackathon_id: String,
        error: TimestampError,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MultipleActive { chosen, others } => write!(
                f,
                "server reports {} active hackathons; showing {chosen}, treating {} as ended",
                others.len() + 1,
                others.join(", ")
            ),
            Anomaly::MalformedTimestamp {
                hackathon_id,
                error,
            } => write!(f, "hackathon {hackathon_id} has {error}"),
        }
    }
}

/// Partition of a participation list at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLifecycle {
    pub current: Option<CurrentParticipation>,
    /// Everything not current, in input order.
    pub ended: Vec<EndedParticipation>,
    pub anomalies: Vec<Anomaly>,
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedLifecycle {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            current: None,
            ended: Vec::new(),
            anomalies: Vec::new(),
            resolved_at: now,
        }
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current
            .as_ref()
            .map(|c| c.participation.hackathon_id.as_str())
    }

    pub fn current_end(&self) -> Option<DateTime<Utc>> {
        self.current.as_ref().map(|c| c.window.end)
    }

    /// Time left on the current participation, floored at zero.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.current_end()
            .map(|end| (end - now).max(TimeDelta::zero()))
    }
}

/// Resolve which participation, if any, is current at `now`.
///
/// Pure: the same inputs always produce the same output.
pub fn resolve(participations: &[Participation], now: DateTime<Utc>) -> ResolvedLifecycle {
    let mut anomalies = Vec::new();
    let mut classified: Vec<(usize, Result<Window, EndReason>)> =
        Vec::with_capacity(participations.len());

    for (idx, p) in participations.iter().enumerate() {
        let verdict = match p.window() {
            Err(error) => {
                anomalies.push(Anomaly::MalformedTimestamp {
                    hackathon_id: p.hackathon_id.clone(),
                    error,
                });
                Err(EndReason::Malformed)
            }
            Ok(_) if p.has_solution() => Err(EndReason::Submitted),
            Ok(window) if window.end <= now => Err(EndReason::TimeElapsed),
            Ok(_) if !p.active => Err(EndReason::ServerClosed),
            Ok(window) => Ok(window),
        };
        classified.push((idx, verdict));
    }

    let chosen = classified
        .iter()
        .filter_map(|(idx, v)| v.as_ref().ok().map(|w| (*idx, *w)))
        .max_by(|(a_idx, a), (b_idx, b)| {
            a.start.cmp(&b.start).then_with(|| {
                participations[*a_idx]
                    .hackathon_id
                    .cmp(&participations[*b_idx].hackathon_id)
            })
        });

    let mut current = None;
    let mut superseded = Vec::new();
    let mut ended = Vec::new();

    for (idx, verdict) in classified {
        let participation = participations[idx].clone();
        match verdict {
            Ok(window) if chosen.is_some_and(|(c, _)| c == idx) => {
                current = Some(CurrentParticipation {
                    participation,
                    window,
                });
            }
            Ok(_) => {
                superseded.push(participation.hackathon_id.clone());
                ended.push(EndedParticipation {
                    participation,
                    reason: EndReason::Superseded,
                });
            }
            Err(reason) => ended.push(EndedParticipation {
                participation,
                reason,
            }),
        }
    }

    if let (Some(c), false) = (&current, superseded.is_empty()) {
        anomalies.push(Anomaly::MultipleActive {
            chosen: c.participation.hackathon_id.clone(),
            others: superseded,
        });
    }

    ResolvedLifecycle {
        current,
        ended,
        anomalies,
        resolved_at: now,
    }
}
