use glam::Vec3;

/// Named axis-aligned trigger volume.
///
/// `position` is the centre of the box in zone space, which has its Y axis
/// flipped relative to mesh space.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    name: String,
    position: Vec3,
    size: Vec3,
}

/// Create a zone from its centre and extents
pub fn create_zone(name: impl Into<String>, position: Vec3, size: Vec3) -> Zone {
    Zone {
        name: name.into(),
        position,
        size,
    }
}

impl Zone {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn min(&self) -> Vec3 {
        self.position - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.position + self.size * 0.5
    }

    /// Whether `point` lies inside the zone, boundary included
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.position).abs().cmple(self.size * 0.5).all()
    }
}
