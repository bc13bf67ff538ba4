use std::time::Duration;

use glam::Vec3;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info};

use dunk_events::{EntityRef, EventEnvelope, EventName, HostAction, SessionEvent};
use dunk_level::{Level, LevelError};
use dunk_scripting::Dispatcher;

use crate::event_consumer::EventConsumer;
use crate::trajectory::Trajectory;
use crate::zone_tracker::ZoneTracker;

/// Input fed into a running session
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    /// The controlled object moved to a position in zone space
    BallAt(Vec3),
    /// Raise an event on an entity directly
    Raise { target: EntityRef, event: EventName },
}

/// What happened during a session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    /// Whether a script ended the session
    pub ended: bool,
    /// Session clock when the runner stopped
    pub elapsed: Duration,
    pub delivered: usize,
    pub dropped: usize,
    pub host_actions: Vec<HostAction>,
}

impl SessionSummary {
    fn record(&mut self, envelope: &EventEnvelope) {
        match &envelope.event {
            SessionEvent::Delivered { .. } => self.delivered += 1,
            SessionEvent::Dropped { .. } => self.dropped += 1,
            SessionEvent::Host(action) => self.host_actions.push(action.clone()),
            _ => {}
        }
    }

    /// File names of every sound played, in order
    pub fn sounds(&self) -> Vec<&str> {
        self.host_actions
            .iter()
            .filter_map(|action| match action {
                HostAction::PlaySound { cue, .. } => Some(cue.file.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Drives a level in real time.
///
/// Stimuli and timer deadlines are fed into the router as they come due;
/// tokio time since [`SessionRunner::run`] was called is the session clock.
/// Every session event is forwarded to each registered consumer.
pub struct SessionRunner {
    dispatcher: Dispatcher,
    tracker: ZoneTracker,
    event_rx: mpsc::UnboundedReceiver<EventEnvelope>,
    consumers: Vec<Box<dyn EventConsumer>>,
    summary: SessionSummary,
}

impl SessionRunner {
    pub fn new(level: &Level) -> Result<Self, LevelError> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Ok(Self {
            dispatcher: level.dispatcher(event_tx)?,
            tracker: ZoneTracker::from_level(level),
            event_rx,
            consumers: Vec::new(),
            summary: SessionSummary::default(),
        })
    }

    pub fn with_consumer(mut self, consumer: Box<dyn EventConsumer>) -> Self {
        self.consumers.push(consumer);
        self
    }

    /// Run until a script ends the session, the stimuli channel closes with no
    /// timers left, or shutdown is signalled. Without a shutdown channel,
    /// Ctrl+C stops the session.
    pub async fn run(
        mut self,
        mut stimuli: mpsc::UnboundedReceiver<Stimulus>,
        mut shutdown_rx: Option<watch::Receiver<bool>>,
    ) -> SessionSummary {
        let origin = Instant::now();
        self.dispatcher.start();
        self.forward();

        let mut stimuli_open = true;
        while !self.dispatcher.is_ended() {
            if !stimuli_open && self.dispatcher.next_deadline().is_none() {
                info!(target: "session", "Input finished and no timers pending");
                break;
            }
            let deadline = self.dispatcher.next_deadline().map(|at| origin + at);

            tokio::select! {
                stimulus = stimuli.recv(), if stimuli_open => {
                    match stimulus {
                        Some(stimulus) => {
                            self.dispatcher.advance_to(origin.elapsed());
                            self.apply(stimulus);
                        }
                        None => {
                            debug!(target: "session", "Stimuli channel closed");
                            stimuli_open = false;
                        }
                    }
                }
                _ = async {
                    match deadline {
                        Some(deadline) => tokio::time::sleep_until(deadline).await,
                        None => std::future::pending().await,
                    }
                } => {
                    self.dispatcher.advance_to(origin.elapsed());
                }
                _ = async {
                    if let Some(ref mut rx) = shutdown_rx {
                        rx.changed().await
                    } else {
                        std::future::pending().await
                    }
                } => {
                    info!(target: "session", "Session received shutdown signal");
                    break;
                }
                _ = tokio::signal::ctrl_c(), if shutdown_rx.is_none() => {
                    info!(target: "session", "Received Ctrl+C, stopping session");
                    break;
                }
            }

            self.forward();
        }

        self.forward();
        self.summary.ended = self.dispatcher.is_ended();
        self.summary.elapsed = self.dispatcher.now();
        info!(
            target: "session",
            "Session stopped at {}ms: {} delivered, {} dropped, {} host actions",
            self.summary.elapsed.as_millis(),
            self.summary.delivered,
            self.summary.dropped,
            self.summary.host_actions.len()
        );
        self.summary
    }

    fn apply(&mut self, stimulus: Stimulus) {
        match stimulus {
            Stimulus::BallAt(position) => {
                for crossing in self.tracker.update(position) {
                    self.dispatcher.send(crossing.detector, crossing.event);
                }
                self.dispatcher.run_until_idle();
            }
            Stimulus::Raise { target, event } => self.dispatcher.raise(target, event),
        }
    }

    fn forward(&mut self) {
        while let Ok(envelope) = self.event_rx.try_recv() {
            self.summary.record(&envelope);
            for consumer in &mut self.consumers {
                consumer.handle_event(envelope.clone());
            }
        }
    }
}

/// Feed each sample of `trajectory` as a [`Stimulus::BallAt`] when it comes
/// due. Stops early if the session has gone away.
pub async fn play_trajectory(trajectory: Trajectory, stimuli: mpsc::UnboundedSender<Stimulus>) {
    let origin = Instant::now();
    for sample in trajectory.samples {
        tokio::time::sleep_until(origin + sample.at()).await;
        if stimuli.send(Stimulus::BallAt(sample.position)).is_err() {
            debug!(target: "session", "Session closed, trajectory stopped");
            return;
        }
    }
    debug!(target: "session", "Trajectory finished");
}
