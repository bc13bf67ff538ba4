use std::collections::BTreeMap;
use std::time::Duration;

use dunk_events::EntityRef;

use crate::reaction::Reaction;

/// Unique identifier for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A continuation waiting for its deadline
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub id: TimerId,
    pub owner: EntityRef,
    pub fire_at: Duration,
    pub then: Reaction,
}

/// Single-shot timers keyed on the session clock.
///
/// Timers fire in deadline order; timers sharing a deadline fire in the
/// order they were scheduled. Once scheduled a timer always fires.
pub struct TimerManager {
    timers: BTreeMap<(Duration, TimerId), ScheduledTask>,
    next_id: u64,
}

impl TimerManager {
    /// Create a new timer manager
    pub fn new() -> Self {
        Self {
            timers: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Schedule `then` to run for `owner` at `fire_at` on the session clock
    pub fn schedule(&mut self, fire_at: Duration, owner: EntityRef, then: Reaction) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let task = ScheduledTask {
            id,
            owner,
            fire_at,
            then,
        };

        self.timers.insert((fire_at, id), task);
        id
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.keys().next().map(|(fire_at, _)| *fire_at)
    }

    /// Remove and return the earliest timer if it is due at `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledTask> {
        let key = *self.timers.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.timers.remove(&key)
    }

    /// Get the number of active timers
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> EntityRef {
        EntityRef::new("marker", 1)
    }

    #[test]
    fn test_one_shot_timer() {
        let mut manager = TimerManager::new();
        let id = manager.schedule(Duration::from_millis(50), owner(), Reaction::none());

        // Should not fire early
        assert!(manager.pop_due(Duration::from_millis(49)).is_none());

        let task = manager.pop_due(Duration::from_millis(50)).unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.owner, owner());

        // Should be removed after firing
        assert_eq!(manager.active_count(), 0);
        assert!(manager.pop_due(Duration::from_secs(60)).is_none());
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut manager = TimerManager::new();
        let late = manager.schedule(Duration::from_millis(4000), owner(), Reaction::none());
        let early = manager.schedule(Duration::from_millis(1000), owner(), Reaction::none());

        assert_eq!(manager.next_deadline(), Some(Duration::from_millis(1000)));

        let now = Duration::from_secs(10);
        assert_eq!(manager.pop_due(now).unwrap().id, early);
        assert_eq!(manager.pop_due(now).unwrap().id, late);
        assert!(manager.next_deadline().is_none());
    }

    #[test]
    fn test_same_deadline_keeps_schedule_order() {
        let mut manager = TimerManager::new();
        let at = Duration::from_millis(500);
        let first = manager.schedule(at, owner(), Reaction::none());
        let second = manager.schedule(at, EntityRef::new("marker", 2), Reaction::none());

        assert_eq!(manager.pop_due(at).unwrap().id, first);
        assert_eq!(manager.pop_due(at).unwrap().id, second);
    }
}
