use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{EntityRef, EventName, HostAction};

/// Why a delivery was dropped instead of reaching a handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// No entity with this reference exists in the level
    UnknownTarget,
    /// The target has no script to handle events
    BareEntity,
    /// The target's script has no handler for the event
    NoHandler,
    /// The target has retired and no longer accepts events
    Retired,
    /// The session has already ended
    SessionEnded,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DropReason::UnknownTarget => "unknown target",
            DropReason::BareEntity => "target has no script",
            DropReason::NoHandler => "no handler",
            DropReason::Retired => "target retired",
            DropReason::SessionEnded => "session ended",
        };
        f.write_str(reason)
    }
}

/// Observations emitted by the event router while a session runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// The session started and `init` was queued for every scripted entity
    Started { entities: usize },
    /// An event reached a handler
    Delivered { target: EntityRef, event: EventName },
    /// An event was dropped without effect
    Dropped {
        target: EntityRef,
        event: EventName,
        reason: DropReason,
    },
    /// A script variable changed value
    VariableChanged {
        entity: EntityRef,
        name: String,
        from: String,
        to: String,
    },
    /// A delayed continuation was scheduled
    TimerScheduled {
        owner: EntityRef,
        timer_id: u64,
        fire_at: Duration,
    },
    /// A delayed continuation ran
    TimerFired { owner: EntityRef, timer_id: u64 },
    /// An entity stopped accepting events
    Retired { entity: EntityRef },
    /// A request for the host engine
    Host(HostAction),
    /// The session is over; nothing is delivered afterwards
    Ended,
}

/// Complete event envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event: SessionEvent,
    /// Position of this event in the session's event stream
    pub sequence: u64,
    /// Session clock when the event was emitted
    pub at: Duration,
}

impl EventEnvelope {
    pub fn new(event: SessionEvent, sequence: u64, at: Duration) -> Self {
        Self {
            event,
            sequence,
            at,
        }
    }
}
