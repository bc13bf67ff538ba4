use dunk_events::{EntityRef, EntityRefAllocator};
use dunk_scripting::{Entity, ScriptError};
use glam::Vec3;

use crate::detectors::zone_relay;
use crate::dunk_detector::{ABOVE_RING, BELOW_RING};
use crate::zone::{create_zone, Zone};

pub const HOOP_TEXTURE: &str = "ITEM_GOLD_RING.jpg";
pub const BACK_PLATE_TEXTURE: &str = "[WOOD]_ALICIAROOM_LAMBRIS01.jpg";
pub const BEAM_TEXTURE: &str = "L7_DWARF_[METAL]_PLATE10.jpg";

pub const ABOVE_RING_ZONE: &str = "above_ring";
pub const BELOW_RING_ZONE: &str = "below_ring";
pub const RING_ZONE_SIZE: Vec3 = Vec3::new(130.0, 20.0, 130.0);

/// Zones use a Y-down convention relative to meshes
const ZONE_SPACE: Vec3 = Vec3::new(1.0, -1.0, 1.0);

/// Geometry primitive handed to the mesh builder
#[derive(Debug, Clone, PartialEq)]
pub enum MeshShape {
    Torus {
        radius: f32,
        tube: f32,
        radial_segments: u32,
        tubular_segments: u32,
    },
    Box {
        size: Vec3,
    },
}

/// A textured, placed mesh primitive
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPart {
    pub name: &'static str,
    pub shape: MeshShape,
    pub position: Vec3,
    /// Euler rotation in degrees, applied Z first then X
    pub rotation_deg: Vec3,
    pub texture: &'static str,
}

impl MeshPart {
    pub fn translated(mut self, offset: Vec3) -> Self {
        self.position += offset;
        self
    }
}

/// The hoop: ring, backplate and beam meshes plus the two rim zones and
/// their detectors
#[derive(Debug, Clone)]
pub struct Hoop {
    pub meshes: Vec<MeshPart>,
    pub above_zone: Zone,
    pub below_zone: Zone,
    pub above_detector: Entity,
    pub below_detector: Entity,
}

fn create_ring(position: Vec3) -> MeshPart {
    MeshPart {
        name: "ring",
        shape: MeshShape::Torus {
            radius: 100.0,
            tube: 10.0,
            radial_segments: 5,
            tubular_segments: 4,
        },
        position,
        rotation_deg: Vec3::new(-90.0, 0.0, 45.0),
        texture: HOOP_TEXTURE,
    }
}

fn create_box(name: &'static str, position: Vec3, size: Vec3, texture: &'static str) -> MeshPart {
    MeshPart {
        name,
        shape: MeshShape::Box { size },
        position,
        rotation_deg: Vec3::ZERO,
        texture,
    }
}

/// Assemble a hoop at `position` whose rim detectors report to `dunk_detector`
pub fn create_hoop(
    position: Vec3,
    dunk_detector: &EntityRef,
    ids: &mut EntityRefAllocator,
) -> Result<Hoop, ScriptError> {
    let ring = create_ring(position);
    let back_plate = create_box(
        "back_plate",
        position + Vec3::new(0.0, -50.0, 80.0),
        Vec3::new(200.0, 150.0, 10.0),
        BACK_PLATE_TEXTURE,
    );
    let beam = create_box(
        "beam",
        position + Vec3::new(0.0, 75.0, 95.0),
        Vec3::new(20.0, 250.0, 20.0),
        BEAM_TEXTURE,
    );

    let above_zone = create_zone(
        ABOVE_RING_ZONE,
        (position + Vec3::new(0.0, -10.0, 0.0)) * ZONE_SPACE,
        RING_ZONE_SIZE,
    );
    let below_zone = create_zone(
        BELOW_RING_ZONE,
        (position + Vec3::new(0.0, 30.0, 0.0)) * ZONE_SPACE,
        RING_ZONE_SIZE,
    );

    let above_detector = zone_relay(
        ids.allocate("marker"),
        &above_zone,
        dunk_detector.clone(),
        ABOVE_RING,
    )?;
    let below_detector = zone_relay(
        ids.allocate("marker"),
        &below_zone,
        dunk_detector.clone(),
        BELOW_RING,
    )?;

    Ok(Hoop {
        meshes: vec![ring, back_plate, beam],
        above_zone,
        below_zone,
        above_detector,
        below_detector,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rim_zones_are_flipped_and_stacked() {
        let mut ids = EntityRefAllocator::new();
        let hoop = create_hoop(
            Vec3::new(0.0, -200.0, 500.0),
            &EntityRef::new("marker", 1),
            &mut ids,
        )
        .unwrap();

        assert_eq!(hoop.above_zone.position(), Vec3::new(0.0, 210.0, 500.0));
        assert_eq!(hoop.below_zone.position(), Vec3::new(0.0, 170.0, 500.0));
        // The above zone sits higher than the below zone in zone space
        assert!(hoop.below_zone.max().y < hoop.above_zone.min().y);
    }

    #[test]
    fn test_detectors_bind_their_zones() {
        let mut ids = EntityRefAllocator::new();
        let hoop = create_hoop(Vec3::ZERO, &EntityRef::new("marker", 1), &mut ids).unwrap();

        assert_eq!(
            hoop.above_detector.script().unwrap().control_zone(),
            Some(ABOVE_RING_ZONE)
        );
        assert_eq!(
            hoop.below_detector.script().unwrap().control_zone(),
            Some(BELOW_RING_ZONE)
        );
        assert_ne!(hoop.above_detector.reference(), hoop.below_detector.reference());
    }

    #[test]
    fn test_mesh_parts() {
        let mut ids = EntityRefAllocator::new();
        let hoop = create_hoop(
            Vec3::new(0.0, -200.0, 500.0),
            &EntityRef::new("marker", 1),
            &mut ids,
        )
            .unwrap();

        let names: Vec<_> = hoop.meshes.iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["ring", "back_plate", "beam"]);
        assert_eq!(hoop.meshes[1].position, Vec3::new(0.0, -250.0, 580.0));
        assert_eq!(hoop.meshes[2].texture, BEAM_TEXTURE);
    }
}
