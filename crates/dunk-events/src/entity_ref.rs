use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;

/// Stable, addressable reference to an entity for the lifetime of a session.
///
/// Rendered the way the engine names entity instances: `<class>_<instance>`
/// with the instance zero-padded to four digits (`marker_0002`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    class: Cow<'static, str>,
    instance: u32,
}

impl EntityRef {
    pub fn new(class: impl Into<Cow<'static, str>>, instance: u32) -> Self {
        Self {
            class: class.into(),
            instance,
        }
    }

    /// The level's player. There is exactly one, so it has no instance suffix.
    pub fn player() -> Self {
        Self::new("player", 0)
    }

    pub fn is_player(&self) -> bool {
        self.class == "player"
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_player() {
            write!(f, "player")
        } else {
            write!(f, "{}_{:04}", self.class, self.instance)
        }
    }
}

/// Hands out entity references, numbering instances per class starting at 1.
#[derive(Debug, Default)]
pub struct EntityRefAllocator {
    next: HashMap<String, u32>,
}

impl EntityRefAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next reference for `class`.
    pub fn allocate(&mut self, class: &'static str) -> EntityRef {
        let counter = self.next.entry(class.to_string()).or_insert(0);
        *counter += 1;
        EntityRef::new(class, *counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_instance() {
        assert_eq!(EntityRef::new("marker", 2).to_string(), "marker_0002");
        assert_eq!(EntityRef::new("little_chest", 12).to_string(), "little_chest_0012");
    }

    #[test]
    fn test_player_has_no_suffix() {
        assert_eq!(EntityRef::player().to_string(), "player");
        assert!(EntityRef::player().is_player());
    }

    #[test]
    fn test_allocator_counts_per_class() {
        let mut ids = EntityRefAllocator::new();
        assert_eq!(ids.allocate("marker"), EntityRef::new("marker", 1));
        assert_eq!(ids.allocate("marker"), EntityRef::new("marker", 2));
        assert_eq!(ids.allocate("little_chest"), EntityRef::new("little_chest", 1));
        assert_eq!(ids.allocate("marker"), EntityRef::new("marker", 3));
    }
}
