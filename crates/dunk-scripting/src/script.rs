use std::collections::HashMap;
use std::sync::Arc;

use dunk_events::EventName;

use crate::reaction::Reaction;
use crate::variable::{Variable, Variables};

/// Handler body: a pure function of the script's variables to a reaction
pub type Handler = Arc<dyn Fn(&Variables) -> Reaction + Send + Sync>;

/// Errors raised while authoring a script
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error("variable '{0}' is already declared")]
    DuplicateVariable(String),
    #[error("script is already bound to zone '{bound}', cannot bind '{requested}'")]
    ZoneAlreadyBound { bound: String, requested: String },
    #[error("entity {0} has no script")]
    NoScript(String),
}

/// A named, parameterless reusable block of effects.
///
/// Subroutine names are visible level-wide: any script may invoke any
/// subroutine, and the body runs against the invoking entity's variables.
#[derive(Clone)]
pub struct Subroutine {
    name: String,
    body: Handler,
}

impl Subroutine {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Variables) -> Reaction + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Arc::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> &Handler {
        &self.body
    }
}

impl std::fmt::Debug for Subroutine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subroutine").field("name", &self.name).finish()
    }
}

/// Script owned by an entity: variables, event handlers and subroutines
#[derive(Clone, Default)]
pub struct Script {
    variables: Variables,
    handlers: HashMap<EventName, Handler>,
    subroutines: Vec<Subroutine>,
    control_zone: Option<String>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable on this script
    pub fn declare(&mut self, variable: Variable) -> Result<&mut Self, ScriptError> {
        let name = variable.name().to_string();
        if !self.variables.declare(variable) {
            return Err(ScriptError::DuplicateVariable(name));
        }
        Ok(self)
    }

    /// Register the handler for `event`, replacing any previous one
    pub fn on<F>(&mut self, event: impl Into<EventName>, body: F) -> &mut Self
    where
        F: Fn(&Variables) -> Reaction + Send + Sync + 'static,
    {
        self.handlers.insert(event.into(), Arc::new(body));
        self
    }

    pub fn add_subroutine(&mut self, subroutine: Subroutine) -> &mut Self {
        self.subroutines.push(subroutine);
        self
    }

    /// Bind the zone whose lifecycle events this script receives
    pub fn bind_zone(&mut self, zone: impl Into<String>) -> Result<&mut Self, ScriptError> {
        let zone = zone.into();
        if let Some(bound) = &self.control_zone {
            return Err(ScriptError::ZoneAlreadyBound {
                bound: bound.clone(),
                requested: zone,
            });
        }
        self.control_zone = Some(zone);
        Ok(self)
    }

    pub fn handler(&self, event: &str) -> Option<&Handler> {
        self.handlers.get(event)
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// Event names with a registered handler, sorted
    pub fn handled_events(&self) -> Vec<&EventName> {
        let mut events: Vec<_> = self.handlers.keys().collect();
        events.sort();
        events
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub(crate) fn variables_mut(&mut self) -> &mut Variables {
        &mut self.variables
    }

    pub fn subroutines(&self) -> &[Subroutine] {
        &self.subroutines
    }

    pub fn control_zone(&self) -> Option<&str> {
        self.control_zone.as_deref()
    }
}

impl std::fmt::Debug for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Script")
            .field("variables", &self.variables)
            .field("handlers", &self.handled_events())
            .field("subroutines", &self.subroutines)
            .field("control_zone", &self.control_zone)
            .finish()
    }
}
