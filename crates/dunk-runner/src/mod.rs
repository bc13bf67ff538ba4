mod event_consumer;
pub mod logging;
mod session_runner;
pub mod trajectory;
mod zone_tracker;

pub use event_consumer::{EventConsumer, LoggingConsumer};
pub use logging::init_logging;
pub use session_runner::{play_trajectory, SessionRunner, SessionSummary, Stimulus};
pub use trajectory::{Sample, Trajectory, TrajectoryError};
pub use zone_tracker::{ZoneCrossing, ZoneTracker};
