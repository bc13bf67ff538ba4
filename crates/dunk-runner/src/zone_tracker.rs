use glam::Vec3;
use tracing::debug;

use dunk_events::{EntityRef, EventName};
use dunk_level::{Level, Zone};

/// The controlled object crossed a zone boundary
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCrossing {
    pub zone: String,
    pub detector: EntityRef,
    /// `controlledzone_enter` or `controlledzone_leave`
    pub event: EventName,
}

struct TrackedZone {
    zone: Zone,
    detector: EntityRef,
    inside: bool,
}

/// Turns successive positions of the controlled object into zone lifecycle
/// events for each zone's bound detector.
///
/// Crossings are only seen at sample points, so an object that passes
/// through a zone between two samples never enters it.
pub struct ZoneTracker {
    zones: Vec<TrackedZone>,
}

impl ZoneTracker {
    pub fn new(bindings: Vec<(Zone, EntityRef)>) -> Self {
        let zones = bindings
            .into_iter()
            .map(|(zone, detector)| TrackedZone {
                zone,
                detector,
                inside: false,
            })
            .collect();
        Self { zones }
    }

    pub fn from_level(level: &Level) -> Self {
        Self::new(level.zone_bindings())
    }

    /// Move the object to `position`. Leaves are reported before enters, each
    /// group in zone order.
    pub fn update(&mut self, position: Vec3) -> Vec<ZoneCrossing> {
        let mut leaves = Vec::new();
        let mut enters = Vec::new();

        for tracked in &mut self.zones {
            let inside = tracked.zone.contains(position);
            if inside == tracked.inside {
                continue;
            }
            tracked.inside = inside;

            let (event, crossings) = if inside {
                (EventName::CONTROLLEDZONE_ENTER, &mut enters)
            } else {
                (EventName::CONTROLLEDZONE_LEAVE, &mut leaves)
            };
            debug!(target: "session", "{} at {} -> {}", event, position, tracked.zone.name());
            crossings.push(ZoneCrossing {
                zone: tracked.zone.name().to_string(),
                detector: tracked.detector.clone(),
                event,
            });
        }

        leaves.extend(enters);
        leaves
    }

    /// Names of the zones the object is currently in
    pub fn occupied(&self) -> impl Iterator<Item = &str> {
        self.zones
            .iter()
            .filter(|tracked| tracked.inside)
            .map(|tracked| tracked.zone.name())
    }
}
