use std::time::Duration;

use dunk_events::{EntityRef, EventName};
use dunk_scripting::{Entity, Reaction, ScriptError, Subroutine, Variable};

use crate::config::TutorialConfig;
use crate::fake_enemy::DAMAGE;
use crate::sounds::CourseSounds;

/// The ball entered the volume just above the rim
pub const ABOVE_RING: EventName = EventName::from_static("above_ring");
/// The ball entered the volume just below the rim
pub const BELOW_RING: EventName = EventName::from_static("below_ring");
/// The ball landed
pub const TOUCHED_THE_FLOOR: EventName = EventName::from_static("touched_the_floor");

/// Set while the last rim crossing was above the ring
pub const WAS_ABOVE_RING: &str = "was_above_ring";

pub const TUTORIAL_WELCOME: &str = "tutorial_welcome";
pub const SCORED_A_POINT: &str = "scored_a_point";

/// The scoring state machine.
///
/// A point is scored when the ball passes below the ring after passing
/// above it, without touching the floor in between. Each point sends
/// `damage` to `fake_enemy`.
pub fn dunk_detector(
    reference: EntityRef,
    fake_enemy: EntityRef,
    tutorial: &TutorialConfig,
    sounds: &CourseSounds,
) -> Result<Entity, ScriptError> {
    let mut entity = Entity::marker(reference).with_script();
    let script = entity.scripted()?;

    let cue = sounds.tutorial.clone();
    let text = tutorial.text.clone();
    script.add_subroutine(Subroutine::new(TUTORIAL_WELCOME, move |_| {
        Reaction::new().play(cue.clone()).hero_say(text.clone())
    }));

    let welcome_delay = Duration::from_millis(tutorial.delay_ms);
    script.on(EventName::INIT, move |_| {
        Reaction::new().delay(welcome_delay, Reaction::new().invoke(TUTORIAL_WELCOME))
    });

    script.declare(Variable::bool(WAS_ABOVE_RING, false))?;
    script.add_subroutine(Subroutine::new(SCORED_A_POINT, move |_| {
        Reaction::new().send(fake_enemy.clone(), DAMAGE)
    }));

    script
        .on(ABOVE_RING, |_| Reaction::new().set_bool(WAS_ABOVE_RING, true))
        .on(BELOW_RING, |vars| {
            if vars.bool(WAS_ABOVE_RING) {
                Reaction::new().invoke(SCORED_A_POINT)
            } else {
                Reaction::none()
            }
        })
        .on(TOUCHED_THE_FLOOR, |_| {
            Reaction::new().set_bool(WAS_ABOVE_RING, false)
        });

    Ok(entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dunk_scripting::{VarValue, Variables};

    fn detector() -> Entity {
        dunk_detector(
            EntityRef::new("marker", 2),
            EntityRef::new("marker", 1),
            &TutorialConfig::default(),
            &CourseSounds::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_starts_below_ring() {
        let entity = detector();
        let script = entity.script().unwrap();
        assert_eq!(script.variables().get(WAS_ABOVE_RING), Some(VarValue::Bool(false)));
        assert_eq!(script.subroutines().len(), 2);
    }

    #[test]
    fn test_below_ring_depends_on_flag() {
        let entity = detector();
        let script = entity.script().unwrap();
        let below = script.handler(BELOW_RING.as_str()).unwrap();

        assert!(below(script.variables()).is_empty());

        let mut above = Variables::new();
        above.declare(Variable::bool(WAS_ABOVE_RING, true));
        assert_eq!(below(&above), Reaction::new().invoke(SCORED_A_POINT));
    }
}
