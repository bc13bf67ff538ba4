use std::time::Duration;

use dunk_events::{EntityRef, EventName, SoundCue};

use crate::variable::VarValue;

/// A single step of a reaction
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Overwrite one of the owner's variables
    Set { var: String, value: VarValue },
    /// Add to one of the owner's int variables
    Add { var: String, delta: i64 },
    /// Queue `event` for delivery to `target`
    Send { target: EntityRef, event: EventName },
    /// Run a level-wide subroutine in the owner's context
    Invoke(String),
    /// Ask the host to play a sound
    PlaySound(SoundCue),
    /// Ask the host to show hero text
    HeroSay(String),
    /// Enable or disable player input
    PlayerControls(bool),
    /// Run `then` in the owner's context once `after` has elapsed
    Delay { after: Duration, then: Reaction },
    /// Stop accepting events; pending delays still fire
    Retire,
    /// End the game session
    EndSession,
}

/// The ordered effects a handler produces in response to one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reaction {
    effects: Vec<Effect>,
}

impl Reaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// A reaction that does nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn push(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn set(self, var: impl Into<String>, value: VarValue) -> Self {
        self.push(Effect::Set {
            var: var.into(),
            value,
        })
    }

    pub fn set_bool(self, var: impl Into<String>, value: bool) -> Self {
        self.set(var, VarValue::Bool(value))
    }

    pub fn inc(self, var: impl Into<String>, delta: i64) -> Self {
        self.push(Effect::Add {
            var: var.into(),
            delta,
        })
    }

    pub fn dec(self, var: impl Into<String>, delta: i64) -> Self {
        self.inc(var, -delta)
    }

    pub fn send(self, target: EntityRef, event: EventName) -> Self {
        self.push(Effect::Send { target, event })
    }

    pub fn invoke(self, subroutine: impl Into<String>) -> Self {
        self.push(Effect::Invoke(subroutine.into()))
    }

    pub fn play(self, cue: SoundCue) -> Self {
        self.push(Effect::PlaySound(cue))
    }

    pub fn hero_say(self, text: impl Into<String>) -> Self {
        self.push(Effect::HeroSay(text.into()))
    }

    pub fn player_controls(self, enabled: bool) -> Self {
        self.push(Effect::PlayerControls(enabled))
    }

    pub fn delay(self, after: Duration, then: Reaction) -> Self {
        self.push(Effect::Delay { after, then })
    }

    pub fn retire(self) -> Self {
        self.push(Effect::Retire)
    }

    pub fn end_session(self) -> Self {
        self.push(Effect::EndSession)
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl IntoIterator for Reaction {
    type Item = Effect;
    type IntoIter = std::vec::IntoIter<Effect>;

    fn into_iter(self) -> Self::IntoIter {
        self.effects.into_iter()
    }
}
