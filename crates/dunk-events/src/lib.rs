/// Core event types for the dunk course
///
/// This crate provides the vocabulary shared by the scripting core, the level
/// and the session runner: entity references, event names, host actions and
/// the session event stream consumed by observers.
use tokio::sync::mpsc::UnboundedSender;

mod entity_ref;
mod event_name;
mod host_actions;
mod session_events;

pub use entity_ref::{EntityRef, EntityRefAllocator};
pub use event_name::EventName;
pub use host_actions::{HostAction, SoundCue, SoundFlags};
pub use session_events::{DropReason, EventEnvelope, SessionEvent};

// ============================================================================
// Event Consumer
// ============================================================================

/// Trait for consuming session events - allows different implementations for
/// logging, recording or forwarding to a host engine
pub trait EventConsumer: Send + 'static {
    /// Handle a session event
    fn handle_event(&mut self, envelope: EventEnvelope);
}

/// Channel end the router publishes session events on
pub type EventSender = UnboundedSender<EventEnvelope>;
