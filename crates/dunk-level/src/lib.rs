/// The basketball course
///
/// Composes the level's entities and trigger zones: a dunk detector scoring
/// points against a fake enemy, relays turning zone entries into scoring
/// events, and the hoop assembly that carries the rim zones.
pub mod config;
pub mod detectors;
pub mod dunk_detector;
pub mod fake_enemy;
pub mod hoop;
pub mod level;
pub mod sounds;
pub mod zone;

pub use config::{ConfigError, CourseConfig};
pub use dunk_detector::{
    ABOVE_RING, BELOW_RING, SCORED_A_POINT, TOUCHED_THE_FLOOR, TUTORIAL_WELCOME, WAS_ABOVE_RING,
};
pub use fake_enemy::{EnemyReaction, DAMAGE, FAKE_ENEMY_HEALTH};
pub use hoop::{create_hoop, Hoop, MeshPart, MeshShape};
pub use level::{build_course, CourseRoles, Level, LevelError, FLOOR_ZONE};
pub use sounds::CourseSounds;
pub use zone::{create_zone, Zone};
