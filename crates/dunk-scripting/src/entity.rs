use dunk_events::EntityRef;
use glam::Vec3;

use crate::script::{Script, ScriptError};

/// Whether an entity carries a script
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// Plain object; events addressed to it are dropped
    Bare,
    /// Scripted object with variables and handlers
    Scripted(Script),
}

/// An addressable game object
#[derive(Debug, Clone)]
pub struct Entity {
    reference: EntityRef,
    src: String,
    position: Vec3,
    kind: EntityKind,
}

impl Entity {
    /// A bare entity of the given source class
    pub fn new(reference: EntityRef, src: impl Into<String>) -> Self {
        Self {
            reference,
            src: src.into(),
            position: Vec3::ZERO,
            kind: EntityKind::Bare,
        }
    }

    /// An invisible marker entity, the usual host for level logic
    pub fn marker(reference: EntityRef) -> Self {
        Self::new(reference, "system/marker")
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Attach an empty script if the entity has none
    pub fn with_script(mut self) -> Self {
        if matches!(self.kind, EntityKind::Bare) {
            self.kind = EntityKind::Scripted(Script::new());
        }
        self
    }

    pub fn reference(&self) -> &EntityRef {
        &self.reference
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn script(&self) -> Option<&Script> {
        match &self.kind {
            EntityKind::Scripted(script) => Some(script),
            EntityKind::Bare => None,
        }
    }

    pub fn script_mut(&mut self) -> Option<&mut Script> {
        match &mut self.kind {
            EntityKind::Scripted(script) => Some(script),
            EntityKind::Bare => None,
        }
    }

    /// Mutable access to the script, failing on bare entities
    pub fn scripted(&mut self) -> Result<&mut Script, ScriptError> {
        let reference = self.reference.to_string();
        self.script_mut().ok_or(ScriptError::NoScript(reference))
    }
}
