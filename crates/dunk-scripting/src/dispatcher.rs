use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use tracing::{debug, info, trace, warn};

use dunk_events::{
    DropReason, EntityRef, EventEnvelope, EventName, EventSender, HostAction, SessionEvent,
};

use crate::entity::Entity;
use crate::reaction::{Effect, Reaction};
use crate::script::Handler;
use crate::timer::TimerManager;
use crate::variable::{VarValue, VariableError, Variables};

/// Subroutines may invoke subroutines, but not without bound
const MAX_SUBROUTINE_DEPTH: usize = 16;

/// Errors raised while populating the router
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("entity {0} is already registered")]
    DuplicateEntity(String),
    #[error("subroutine '{0}' is already defined")]
    DuplicateSubroutine(String),
}

struct Slot {
    entity: Entity,
    retired: bool,
}

/// Routes addressed events to entity scripts on a single-threaded run loop.
///
/// Sends are queued and delivered in FIFO order; each delivery runs the
/// target's handler and executes the whole reaction before the next delivery.
/// Delayed continuations wait on a [`TimerManager`] keyed on the session
/// clock, which only moves forward through [`Dispatcher::advance_to`].
pub struct Dispatcher {
    entities: HashMap<EntityRef, Slot>,
    /// Spawn order, used for `init` delivery
    order: Vec<EntityRef>,
    /// Level-wide subroutine table
    subroutines: HashMap<String, Handler>,
    queue: VecDeque<(EntityRef, EventName)>,
    timers: TimerManager,
    clock: Duration,
    event_tx: EventSender,
    sequence: u64,
    started: bool,
    ended: bool,
}

impl Dispatcher {
    /// Create an empty router publishing session events on `event_tx`
    pub fn new(event_tx: EventSender) -> Self {
        Self {
            entities: HashMap::new(),
            order: Vec::new(),
            subroutines: HashMap::new(),
            queue: VecDeque::new(),
            timers: TimerManager::new(),
            clock: Duration::ZERO,
            event_tx,
            sequence: 0,
            started: false,
            ended: false,
        }
    }

    /// Register an entity and the subroutines its script defines
    pub fn spawn(&mut self, entity: Entity) -> Result<(), DispatchError> {
        let reference = entity.reference().clone();
        if self.entities.contains_key(&reference) {
            return Err(DispatchError::DuplicateEntity(reference.to_string()));
        }

        let subroutines = entity
            .script()
            .map(|script| script.subroutines().to_vec())
            .unwrap_or_default();
        for (idx, subroutine) in subroutines.iter().enumerate() {
            let name = subroutine.name();
            let repeated = subroutines[..idx].iter().any(|s| s.name() == name);
            if repeated || self.subroutines.contains_key(name) {
                return Err(DispatchError::DuplicateSubroutine(name.to_string()));
            }
        }
        for subroutine in subroutines {
            self.subroutines
                .insert(subroutine.name().to_string(), subroutine.body().clone());
        }

        debug!(target: "dispatch", "Spawned {} ({})", reference, entity.src());
        self.order.push(reference.clone());
        self.entities.insert(
            reference,
            Slot {
                entity,
                retired: false,
            },
        );
        Ok(())
    }

    /// Start the session: deliver `init` to every scripted entity in spawn order
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        info!(target: "dispatch", "Session started with {} entities", self.entities.len());
        self.emit(SessionEvent::Started {
            entities: self.entities.len(),
        });

        for reference in self.order.clone() {
            let scripted = self
                .entities
                .get(&reference)
                .is_some_and(|slot| slot.entity.script().is_some());
            if scripted {
                self.queue.push_back((reference, EventName::INIT));
            }
        }

        self.run_until_idle();
    }

    /// Queue `event` for `target`. Never fails; bad targets are dropped on delivery.
    pub fn send(&mut self, target: EntityRef, event: EventName) {
        trace!(target: "dispatch", "Queued {} -> {}", event, target);
        self.queue.push_back((target, event));
    }

    /// Queue `event` for `target` and process the queue
    pub fn raise(&mut self, target: EntityRef, event: EventName) {
        self.send(target, event);
        self.run_until_idle();
    }

    /// Deliver queued events until the queue is empty
    pub fn run_until_idle(&mut self) {
        while let Some((target, event)) = self.queue.pop_front() {
            self.deliver(target, event);
        }
    }

    /// Move the session clock to `now`, firing every timer due on the way
    pub fn advance_to(&mut self, now: Duration) {
        self.run_until_idle();

        while !self.ended {
            let Some(task) = self.timers.pop_due(now) else {
                break;
            };

            self.clock = self.clock.max(task.fire_at);
            debug!(target: "timers", "Timer {} fired for {}", task.id.get(), task.owner);
            self.emit(SessionEvent::TimerFired {
                owner: task.owner.clone(),
                timer_id: task.id.get(),
            });
            self.execute(&task.owner, task.then, 0);
            self.run_until_idle();
        }

        self.clock = self.clock.max(now);
    }

    /// Fire timers until none are pending or the session has ended
    pub fn run_to_completion(&mut self) {
        self.run_until_idle();
        while !self.ended {
            let Some(deadline) = self.timers.next_deadline() else {
                break;
            };
            self.advance_to(deadline);
        }
    }

    pub fn now(&self) -> Duration {
        self.clock
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Deadline of the next pending continuation
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.ended {
            return None;
        }
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.active_count()
    }

    pub fn entity(&self, reference: &EntityRef) -> Option<&Entity> {
        self.entities.get(reference).map(|slot| &slot.entity)
    }

    pub fn is_retired(&self, reference: &EntityRef) -> bool {
        self.entities
            .get(reference)
            .is_some_and(|slot| slot.retired)
    }

    /// Current value of a variable on an entity's script
    pub fn variable(&self, reference: &EntityRef, name: &str) -> Option<VarValue> {
        self.entity(reference)?.script()?.variables().get(name)
    }

    fn deliver(&mut self, target: EntityRef, event: EventName) {
        if self.ended {
            self.drop_delivery(target, event, DropReason::SessionEnded);
            return;
        }

        let outcome = match self.entities.get(&target) {
            None => Err(DropReason::UnknownTarget),
            Some(slot) if slot.retired => Err(DropReason::Retired),
            Some(slot) => match slot.entity.script() {
                None => Err(DropReason::BareEntity),
                Some(script) => script
                    .handler(event.as_str())
                    .map(|handler| handler(script.variables()))
                    .ok_or(DropReason::NoHandler),
            },
        };

        match outcome {
            Ok(reaction) => {
                debug!(target: "dispatch", "{} <- {}", target, event);
                self.emit(SessionEvent::Delivered {
                    target: target.clone(),
                    event,
                });
                self.execute(&target, reaction, 0);
            }
            Err(reason) => self.drop_delivery(target, event, reason),
        }
    }

    fn drop_delivery(&mut self, target: EntityRef, event: EventName, reason: DropReason) {
        debug!(target: "dispatch", "Dropped {} -> {}: {}", event, target, reason);
        self.emit(SessionEvent::Dropped {
            target,
            event,
            reason,
        });
    }

    fn execute(&mut self, owner: &EntityRef, reaction: Reaction, depth: usize) {
        for effect in reaction {
            if self.ended {
                break;
            }

            match effect {
                Effect::Set { var, value } => {
                    self.mutate(owner, &var, |vars| vars.set(&var, value));
                }
                Effect::Add { var, delta } => {
                    self.mutate(owner, &var, |vars| vars.add(&var, delta));
                }
                Effect::Send { target, event } => self.send(target, event),
                Effect::Invoke(name) => {
                    if depth >= MAX_SUBROUTINE_DEPTH {
                        warn!(
                            target: "dispatch",
                            "{} exceeded subroutine depth invoking '{}'",
                            owner,
                            name
                        );
                        continue;
                    }
                    let Some(body) = self.subroutines.get(&name).cloned() else {
                        warn!(
                            target: "dispatch",
                            "{} invoked unknown subroutine '{}'",
                            owner,
                            name
                        );
                        continue;
                    };
                    let Some(nested) = self
                        .entities
                        .get(owner)
                        .and_then(|slot| slot.entity.script())
                        .map(|script| body(script.variables()))
                    else {
                        continue;
                    };
                    trace!(target: "dispatch", "{} invoking '{}'", owner, name);
                    self.execute(owner, nested, depth + 1);
                }
                Effect::PlaySound(cue) => self.emit(SessionEvent::Host(HostAction::PlaySound {
                    source: owner.clone(),
                    cue,
                })),
                Effect::HeroSay(text) => self.emit(SessionEvent::Host(HostAction::HeroSay {
                    source: owner.clone(),
                    text,
                })),
                Effect::PlayerControls(enabled) => {
                    self.emit(SessionEvent::Host(HostAction::PlayerControls { enabled }))
                }
                Effect::Delay { after, then } => {
                    let fire_at = self.clock + after;
                    let id = self.timers.schedule(fire_at, owner.clone(), then);
                    debug!(
                        target: "timers",
                        "{} scheduled timer {} at {:?}",
                        owner,
                        id.get(),
                        fire_at
                    );
                    self.emit(SessionEvent::TimerScheduled {
                        owner: owner.clone(),
                        timer_id: id.get(),
                        fire_at,
                    });
                }
                Effect::Retire => {
                    let newly_retired = match self.entities.get_mut(owner) {
                        Some(slot) if !slot.retired => {
                            slot.retired = true;
                            true
                        }
                        _ => false,
                    };
                    if newly_retired {
                        debug!(target: "dispatch", "{} retired", owner);
                        self.emit(SessionEvent::Retired {
                            entity: owner.clone(),
                        });
                    }
                }
                Effect::EndSession => {
                    info!(target: "dispatch", "Session ended by {} at {:?}", owner, self.clock);
                    self.emit(SessionEvent::Host(HostAction::EndSession {
                        source: owner.clone(),
                    }));
                    self.ended = true;
                    self.emit(SessionEvent::Ended);
                }
            }
        }
    }

    fn mutate<F>(&mut self, owner: &EntityRef, var: &str, op: F)
    where
        F: FnOnce(&mut Variables) -> Result<VarValue, VariableError>,
    {
        let result = match self
            .entities
            .get_mut(owner)
            .and_then(|slot| slot.entity.script_mut())
        {
            Some(script) => {
                let vars = script.variables_mut();
                op(&mut *vars).map(|previous| (previous, vars.get(var)))
            }
            None => {
                warn!(target: "dispatch", "{} has no script to mutate '{}'", owner, var);
                return;
            }
        };

        match result {
            Ok((previous, Some(current))) if previous != current => {
                trace!(target: "dispatch", "{}.{}: {} -> {}", owner, var, previous, current);
                self.emit(SessionEvent::VariableChanged {
                    entity: owner.clone(),
                    name: var.to_string(),
                    from: previous.to_string(),
                    to: current.to_string(),
                });
            }
            Ok(_) => {}
            Err(err) => {
                warn!(target: "dispatch", "{} skipped mutation: {}", owner, err);
            }
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        let envelope = EventEnvelope::new(event, self.sequence, self.clock);
        self.sequence += 1;
        let _ = self.event_tx.send(envelope);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Subroutine;
    use crate::variable::Variable;
    use dunk_events::{SoundCue, SoundFlags};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn drain(rx: &mut UnboundedReceiver<EventEnvelope>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            events.push(envelope.event);
        }
        events
    }

    fn counter(reference: EntityRef) -> Entity {
        let mut entity = Entity::marker(reference).with_script();
        let script = entity.scripted().unwrap();
        script.declare(Variable::int("count", 0)).unwrap();
        script.on("bump", |_| Reaction::new().inc("count", 1));
        entity
    }

    #[test]
    fn test_send_is_queued_until_run() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        dispatcher.spawn(counter(id.clone())).unwrap();

        dispatcher.send(id.clone(), "bump".into());
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(0)));

        dispatcher.run_until_idle();
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(1)));
    }

    #[test]
    fn test_missing_handler_is_noop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        dispatcher.spawn(counter(id.clone())).unwrap();

        dispatcher.raise(id.clone(), "unheard_of".into());

        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(0)));
        assert_eq!(
            drain(&mut rx),
            vec![SessionEvent::Dropped {
                target: id,
                event: "unheard_of".into(),
                reason: DropReason::NoHandler,
            }]
        );
    }

    #[test]
    fn test_unknown_and_bare_targets_are_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let chest = EntityRef::new("little_chest", 1);
        dispatcher
            .spawn(Entity::new(chest.clone(), "items/movable/little_chest"))
            .unwrap();

        dispatcher.raise(chest.clone(), "damage".into());
        dispatcher.raise(EntityRef::new("marker", 99), "damage".into());

        let reasons: Vec<DropReason> = drain(&mut rx)
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Dropped { reason, .. } => Some(reason),
                _ => None,
            })
            .collect();
        assert_eq!(reasons, vec![DropReason::BareEntity, DropReason::UnknownTarget]);
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        dispatcher.spawn(counter(id.clone())).unwrap();

        assert_eq!(
            dispatcher.spawn(counter(id)),
            Err(DispatchError::DuplicateEntity("marker_0001".to_string()))
        );
    }

    #[test]
    fn test_subroutines_are_level_wide() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);

        let owner = EntityRef::new("marker", 1);
        let mut defines = counter(owner.clone());
        defines
            .scripted()
            .unwrap()
            .add_subroutine(Subroutine::new("bump_twice", |_| {
                Reaction::new().inc("count", 2)
            }));

        let caller = EntityRef::new("marker", 2);
        let mut invokes = counter(caller.clone());
        invokes
            .scripted()
            .unwrap()
            .on("go", |_| Reaction::new().invoke("bump_twice"));

        dispatcher.spawn(defines).unwrap();
        dispatcher.spawn(invokes).unwrap();
        dispatcher.raise(caller.clone(), "go".into());

        // Body runs against the invoking entity's variables
        assert_eq!(dispatcher.variable(&caller, "count"), Some(VarValue::Int(2)));
        assert_eq!(dispatcher.variable(&owner, "count"), Some(VarValue::Int(0)));
    }

    #[test]
    fn test_duplicate_subroutine_rejected() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);

        let mut first = counter(EntityRef::new("marker", 1));
        first
            .scripted()
            .unwrap()
            .add_subroutine(Subroutine::new("shared", |_| Reaction::none()));
        let mut second = counter(EntityRef::new("marker", 2));
        second
            .scripted()
            .unwrap()
            .add_subroutine(Subroutine::new("shared", |_| Reaction::none()));

        dispatcher.spawn(first).unwrap();
        assert_eq!(
            dispatcher.spawn(second),
            Err(DispatchError::DuplicateSubroutine("shared".to_string()))
        );
        assert!(dispatcher.entity(&EntityRef::new("marker", 2)).is_none());
    }

    #[test]
    fn test_recursive_subroutine_stops_at_depth_limit() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity
            .scripted()
            .unwrap()
            .on("go", |_| Reaction::new().invoke("again"))
            .add_subroutine(Subroutine::new("again", |_| {
                Reaction::new().inc("count", 1).invoke("again")
            }));
        dispatcher.spawn(entity).unwrap();

        dispatcher.raise(id.clone(), "go".into());
        assert_eq!(
            dispatcher.variable(&id, "count"),
            Some(VarValue::Int(MAX_SUBROUTINE_DEPTH as i64))
        );

        // The entity keeps handling events afterwards
        dispatcher.raise(id.clone(), "bump".into());
        assert_eq!(
            dispatcher.variable(&id, "count"),
            Some(VarValue::Int(MAX_SUBROUTINE_DEPTH as i64 + 1))
        );
    }

    #[test]
    fn test_unknown_subroutine_is_skipped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity
            .scripted()
            .unwrap()
            .on("go", |_| Reaction::new().invoke("missing").inc("count", 1));
        dispatcher.spawn(entity).unwrap();

        dispatcher.raise(id.clone(), "go".into());
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(1)));
    }

    #[test]
    fn test_delay_does_not_block_other_events() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity.scripted().unwrap().on("later", |_| {
            Reaction::new().delay(Duration::from_millis(1000), Reaction::new().inc("count", 10))
        });
        dispatcher.spawn(entity).unwrap();

        dispatcher.raise(id.clone(), "later".into());
        dispatcher.raise(id.clone(), "bump".into());
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(1)));
        assert_eq!(dispatcher.next_deadline(), Some(Duration::from_millis(1000)));

        dispatcher.advance_to(Duration::from_millis(999));
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(1)));

        dispatcher.advance_to(Duration::from_millis(1000));
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(11)));
        assert_eq!(dispatcher.pending_timers(), 0);
    }

    #[test]
    fn test_delay_is_relative_to_scheduling_time() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity.scripted().unwrap().on("later", |_| {
            Reaction::new().delay(Duration::from_millis(500), Reaction::new().inc("count", 1))
        });
        dispatcher.spawn(entity).unwrap();

        dispatcher.advance_to(Duration::from_millis(2000));
        dispatcher.raise(id, "later".into());
        assert_eq!(dispatcher.next_deadline(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_retired_entity_drops_events_but_timers_fire() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity.scripted().unwrap().on("die", |_| {
            Reaction::new()
                .retire()
                .delay(Duration::from_millis(10), Reaction::new().inc("count", 5))
        });
        dispatcher.spawn(entity).unwrap();

        dispatcher.raise(id.clone(), "die".into());
        dispatcher.raise(id.clone(), "bump".into());
        assert!(dispatcher.is_retired(&id));
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(0)));

        dispatcher.run_to_completion();
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(5)));

        assert!(drain(&mut rx).contains(&SessionEvent::Dropped {
            target: id,
            event: "bump".into(),
            reason: DropReason::Retired,
        }));
    }

    #[test]
    fn test_end_session_stops_reaction_and_delivery() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity
            .scripted()
            .unwrap()
            .on("quit", |_| Reaction::new().end_session().inc("count", 1));
        dispatcher.spawn(entity).unwrap();

        dispatcher.raise(id.clone(), "quit".into());
        dispatcher.raise(id.clone(), "bump".into());

        assert!(dispatcher.is_ended());
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(0)));

        let events = drain(&mut rx);
        assert!(events.contains(&SessionEvent::Host(HostAction::EndSession {
            source: id.clone()
        })));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Dropped {
                target: id,
                event: "bump".into(),
                reason: DropReason::SessionEnded,
            })
        );
    }

    #[test]
    fn test_start_delivers_init_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity.scripted().unwrap().on(EventName::INIT, |_| {
            Reaction::new().play(SoundCue::new("system.wav", SoundFlags::EmitFromPlayer))
        });
        dispatcher.spawn(entity).unwrap();
        dispatcher
            .spawn(Entity::new(
                EntityRef::new("little_chest", 1),
                "items/movable/little_chest",
            ))
            .unwrap();

        dispatcher.start();
        dispatcher.start();

        let sounds = drain(&mut rx)
            .into_iter()
            .filter(|event| matches!(event, SessionEvent::Host(HostAction::PlaySound { .. })))
            .count();
        assert_eq!(sounds, 1);
    }

    #[test]
    fn test_type_mismatch_is_skipped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut dispatcher = Dispatcher::new(tx);
        let id = EntityRef::new("marker", 1);
        let mut entity = counter(id.clone());
        entity
            .scripted()
            .unwrap()
            .on("bad", |_| Reaction::new().set_bool("count", true).inc("count", 3));
        dispatcher.spawn(entity).unwrap();

        dispatcher.raise(id.clone(), "bad".into());
        assert_eq!(dispatcher.variable(&id, "count"), Some(VarValue::Int(3)));
    }
}
