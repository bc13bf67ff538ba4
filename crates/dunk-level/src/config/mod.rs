pub mod course_config;
pub mod paths;

pub use course_config::{
    ConfigError, CourseConfig, EnemyConfig, LayoutConfig, LoggingConfig, TutorialConfig, APP_NAME,
};
pub use paths::ProjectPaths;
