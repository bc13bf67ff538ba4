use std::collections::HashMap;

use glam::Vec3;
use tracing::{debug, info};

use dunk_events::{EntityRef, EntityRefAllocator, EventSender};
use dunk_scripting::{DispatchError, Dispatcher, Entity, ScriptError};

use crate::config::CourseConfig;
use crate::detectors::zone_relay;
use crate::dunk_detector::{dunk_detector, TOUCHED_THE_FLOOR};
use crate::fake_enemy::fake_enemy;
use crate::hoop::{create_hoop, MeshPart};
use crate::sounds::CourseSounds;
use crate::zone::{create_zone, Zone};

pub const FLOOR_ZONE: &str = "on_the_floor";
pub const CHEST_SRC: &str = "items/movable/little_chest";

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("zone '{0}' is defined more than once")]
    DuplicateZone(String),
    #[error("zone '{zone}' is bound by both {first} and {second}")]
    ZoneBoundTwice {
        zone: String,
        first: String,
        second: String,
    },
    #[error("zone '{0}' has no detector")]
    UnboundZone(String),
    #[error("{entity} binds unknown zone '{zone}'")]
    UnknownZone { entity: String, zone: String },
}

/// References of the entities that play a part in the course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRoles {
    pub player: EntityRef,
    pub chest: EntityRef,
    pub fake_enemy: EntityRef,
    pub dunk_detector: EntityRef,
    pub floor_detector: EntityRef,
    pub above_ring_detector: EntityRef,
    pub below_ring_detector: EntityRef,
}

/// A fully composed level: entities, trigger zones and mesh descriptors
#[derive(Debug, Clone)]
pub struct Level {
    pub entities: Vec<Entity>,
    pub zones: Vec<Zone>,
    pub meshes: Vec<MeshPart>,
    pub roles: CourseRoles,
}

impl Level {
    /// Check that every zone has exactly one detector and every binding names
    /// an existing zone
    pub fn validate(&self) -> Result<(), LevelError> {
        let mut owners: HashMap<&str, Option<&EntityRef>> = HashMap::new();
        for zone in &self.zones {
            if owners.insert(zone.name(), None).is_some() {
                return Err(LevelError::DuplicateZone(zone.name().to_string()));
            }
        }

        for entity in &self.entities {
            let Some(zone) = entity.script().and_then(|script| script.control_zone()) else {
                continue;
            };
            match owners.get_mut(zone) {
                None => {
                    return Err(LevelError::UnknownZone {
                        entity: entity.reference().to_string(),
                        zone: zone.to_string(),
                    });
                }
                Some(Some(first)) => {
                    return Err(LevelError::ZoneBoundTwice {
                        zone: zone.to_string(),
                        first: first.to_string(),
                        second: entity.reference().to_string(),
                    });
                }
                Some(owner) => *owner = Some(entity.reference()),
            }
        }

        if let Some(zone) = self
            .zones
            .iter()
            .find(|zone| owners.get(zone.name()).is_some_and(Option::is_none))
        {
            return Err(LevelError::UnboundZone(zone.name().to_string()));
        }

        Ok(())
    }

    /// Each zone with the detector bound to it
    pub fn zone_bindings(&self) -> Vec<(Zone, EntityRef)> {
        self.zones
            .iter()
            .filter_map(|zone| {
                self.entities
                    .iter()
                    .find(|entity| {
                        entity.script().and_then(|script| script.control_zone())
                            == Some(zone.name())
                    })
                    .map(|entity| (zone.clone(), entity.reference().clone()))
            })
            .collect()
    }

    /// Spawn every entity into a fresh router
    pub fn dispatcher(&self, event_tx: EventSender) -> Result<Dispatcher, LevelError> {
        let mut dispatcher = Dispatcher::new(event_tx);
        for entity in &self.entities {
            dispatcher.spawn(entity.clone())?;
        }
        Ok(dispatcher)
    }
}

/// Compose the basketball course described by `config`
pub fn build_course(config: &CourseConfig) -> Result<Level, LevelError> {
    let sounds = CourseSounds::default();
    let layout = &config.layout;
    let mut ids = EntityRefAllocator::new();

    let player = Entity::new(EntityRef::player(), "player").with_script();
    let chest = Entity::new(ids.allocate("little_chest"), CHEST_SRC).at(layout.chest_position);

    let enemy_ref = ids.allocate("marker");
    let enemy = fake_enemy(enemy_ref.clone(), &config.enemy, &sounds)?;

    let detector_ref = ids.allocate("marker");
    let detector = dunk_detector(
        detector_ref.clone(),
        enemy_ref.clone(),
        &config.tutorial,
        &sounds,
    )?;

    let floor_zone = create_zone(FLOOR_ZONE, Vec3::ZERO, layout.floor_size);
    let floor_ref = ids.allocate("marker");
    let floor_detector = zone_relay(
        floor_ref.clone(),
        &floor_zone,
        detector_ref.clone(),
        TOUCHED_THE_FLOOR,
    )?;

    let hoop = create_hoop(layout.hoop_position, &detector_ref, &mut ids)?;

    let roles = CourseRoles {
        player: player.reference().clone(),
        chest: chest.reference().clone(),
        fake_enemy: enemy_ref,
        dunk_detector: detector_ref,
        floor_detector: floor_ref,
        above_ring_detector: hoop.above_detector.reference().clone(),
        below_ring_detector: hoop.below_detector.reference().clone(),
    };

    let meshes = hoop
        .meshes
        .into_iter()
        .map(|mesh| mesh.translated(layout.map_offset))
        .collect();

    let level = Level {
        entities: vec![
            player,
            chest,
            enemy,
            detector,
            floor_detector,
            hoop.above_detector,
            hoop.below_detector,
        ],
        zones: vec![floor_zone, hoop.above_zone, hoop.below_zone],
        meshes,
        roles,
    };

    level.validate()?;

    for entity in &level.entities {
        debug!(
            target: "level",
            "{} ({}) at {}",
            entity.reference(),
            entity.src(),
            entity.position()
        );
    }
    info!(
        target: "level",
        "Built course: {} entities, {} zones, {} meshes",
        level.entities.len(),
        level.zones.len(),
        level.meshes.len()
    );

    Ok(level)
}
