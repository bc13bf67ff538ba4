use std::time::Duration;

use dunk_events::{EntityRef, EventName};
use dunk_scripting::{Entity, Reaction, ScriptError, Variable};

use crate::config::EnemyConfig;
use crate::sounds::CourseSounds;

/// Raised on the fake enemy for every point scored
pub const DAMAGE: EventName = EventName::from_static("damage");
pub const FAKE_ENEMY_HEALTH: &str = "fake_enemy_health";

/// Which reaction the enemy shows after taking a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyReaction {
    Ok,
    Ouch,
    Death,
}

impl EnemyReaction {
    /// Pick the reaction for the health left after a hit
    pub fn for_health(health: i64) -> Self {
        if health > 3 {
            EnemyReaction::Ok
        } else if health >= 1 {
            EnemyReaction::Ouch
        } else {
            EnemyReaction::Death
        }
    }
}

/// The decoy opponent: loses one health per `damage` and ends the session
/// once it runs out.
pub fn fake_enemy(
    reference: EntityRef,
    config: &EnemyConfig,
    sounds: &CourseSounds,
) -> Result<Entity, ScriptError> {
    let mut entity = Entity::marker(reference).at(config.position).with_script();
    let script = entity.scripted()?;

    script.declare(Variable::int(FAKE_ENEMY_HEALTH, config.health))?;

    let sounds = sounds.clone();
    let death_delay = Duration::from_millis(config.death_delay_ms);
    script.on(DAMAGE, move |vars| {
        let health = vars.int(FAKE_ENEMY_HEALTH).saturating_sub(1);
        let reaction = Reaction::new().dec(FAKE_ENEMY_HEALTH, 1);

        match EnemyReaction::for_health(health) {
            EnemyReaction::Ok => reaction.play(sounds.enemy_ok.clone()),
            EnemyReaction::Ouch => reaction.play(sounds.enemy_ouch.clone()),
            EnemyReaction::Death => reaction
                .player_controls(false)
                .play(sounds.enemy_dead.clone())
                .retire()
                .delay(death_delay, Reaction::new().end_session()),
        }
    });

    Ok(entity)
}
