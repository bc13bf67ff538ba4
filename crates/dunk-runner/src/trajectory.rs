use std::fs;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Distance between generated samples, in world units
const STEP: f32 = 10.0;
/// How far beside the rim a generated dunk starts and ends
const RUN_UP: f32 = 300.0;
/// How far above the rim a generated dunk peaks
const CLEARANCE: f32 = 100.0;

#[derive(Debug, thiserror::Error)]
pub enum TrajectoryError {
    #[error("IO error reading trajectory: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse trajectory: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("sample {index} at {at_ms}ms comes before the previous sample")]
    Unordered { index: usize, at_ms: u64 },
    #[error("speed must be positive, got {0}")]
    InvalidSpeed(f64),
}

/// Position of the controlled object at a point in session time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub at_ms: u64,
    /// Zone space coordinates
    pub position: Vec3,
}

impl Sample {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

/// Timed path of the controlled object through the level.
///
/// Stored as TOML:
///
/// ```toml
/// [[samples]]
/// at_ms = 0
/// position = [300.0, 0.0, 500.0]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub samples: Vec<Sample>,
}

impl Trajectory {
    pub fn load(path: &Path) -> Result<Self, TrajectoryError> {
        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn from_toml(content: &str) -> Result<Self, TrajectoryError> {
        let trajectory: Trajectory = toml::from_str(content)?;
        trajectory.validate()?;
        Ok(trajectory)
    }

    /// Sample times must never go backwards
    pub fn validate(&self) -> Result<(), TrajectoryError> {
        for (index, pair) in self.samples.windows(2).enumerate() {
            if pair[1].at_ms < pair[0].at_ms {
                return Err(TrajectoryError::Unordered {
                    index: index + 1,
                    at_ms: pair[1].at_ms,
                });
            }
        }
        Ok(())
    }

    /// `count` dunk attempts on the rim at `rim`: each lifts the object beside
    /// the hoop, carries it over the rim, drops it through onto the floor and
    /// walks back. Samples are `interval` apart.
    pub fn dunks(count: usize, rim: Vec3, interval: Duration) -> Self {
        let start = Vec3::new(rim.x + RUN_UP, 0.0, rim.z);
        let top = rim.y + CLEARANCE;

        let mut points = vec![start];
        for _ in 0..count {
            let mut leg = |to: Vec3| {
                let from = points.last().copied().unwrap_or(start);
                let direction = (to - from).normalize_or_zero();
                let steps = (from.distance(to) / STEP).ceil() as u32;
                for step in 1..steps {
                    points.push(from + direction * (STEP * step as f32));
                }
                points.push(to);
            };
            leg(Vec3::new(start.x, top, start.z));
            leg(Vec3::new(rim.x, top, rim.z));
            leg(Vec3::new(rim.x, 0.0, rim.z));
            leg(start);
        }

        let interval_ms = interval.as_millis() as u64;
        let samples = points
            .into_iter()
            .enumerate()
            .map(|(idx, position)| Sample {
                at_ms: idx as u64 * interval_ms,
                position,
            })
            .collect();
        Self { samples }
    }

    /// Replay `speed` times faster
    pub fn scaled(mut self, speed: f64) -> Result<Self, TrajectoryError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(TrajectoryError::InvalidSpeed(speed));
        }
        for sample in &mut self.samples {
            sample.at_ms = (sample.at_ms as f64 / speed).round() as u64;
        }
        Ok(self)
    }

    pub fn duration(&self) -> Duration {
        self.samples.last().map(Sample::at).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
