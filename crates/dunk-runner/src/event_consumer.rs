use tracing::{debug, info, trace};

use dunk_events::{EventEnvelope, HostAction, SessionEvent};

// Re-export EventConsumer from dunk-events
pub use dunk_events::EventConsumer;

/// Event consumer that logs session events to the console
#[derive(Debug, Default)]
pub struct LoggingConsumer;

impl LoggingConsumer {
    pub fn new() -> Self {
        Self
    }
}

impl EventConsumer for LoggingConsumer {
    fn handle_event(&mut self, envelope: EventEnvelope) {
        let at = envelope.at.as_millis();
        match envelope.event {
            SessionEvent::Started { entities } => {
                info!(target: "events", "[{at}ms] Session started ({entities} entities)");
            }
            SessionEvent::Delivered { target, event } => {
                debug!(target: "events", "[{at}ms] {target} handled {event}");
            }
            SessionEvent::Dropped {
                target,
                event,
                reason,
            } => {
                debug!(target: "events", "[{at}ms] {event} -> {target} dropped: {reason}");
            }
            SessionEvent::VariableChanged {
                entity,
                name,
                from,
                to,
            } => {
                info!(target: "events", "[{at}ms] {entity}.{name}: {from} -> {to}");
            }
            SessionEvent::TimerScheduled {
                owner,
                timer_id,
                fire_at,
            } => {
                trace!(
                    target: "events",
                    "[{at}ms] {owner} timer {timer_id} due at {}ms",
                    fire_at.as_millis()
                );
            }
            SessionEvent::TimerFired { owner, timer_id } => {
                trace!(target: "events", "[{at}ms] {owner} timer {timer_id} fired");
            }
            SessionEvent::Retired { entity } => {
                info!(target: "events", "[{at}ms] {entity} retired");
            }
            SessionEvent::Host(action) => match action {
                HostAction::PlaySound { source, cue } => {
                    info!(target: "events", "[{at}ms] SOUND {cue} from {source}");
                }
                HostAction::HeroSay { text, .. } => {
                    info!(target: "events", "[{at}ms] HERO SAYS: {text}");
                }
                HostAction::PlayerControls { enabled } => {
                    let state = if enabled { "enabled" } else { "disabled" };
                    info!(target: "events", "[{at}ms] Player controls {state}");
                }
                HostAction::EndSession { source } => {
                    info!(target: "events", "[{at}ms] {source} ended the session");
                }
            },
            SessionEvent::Ended => {
                info!(target: "events", "[{at}ms] Session ended");
            }
        }
    }
}
