use serde::{Deserialize, Serialize};

use crate::EntityRef;

/// How the engine should play a sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundFlags {
    /// Play at the player's position instead of the emitting entity's
    EmitFromPlayer,
    /// Randomize pitch slightly on every play
    VaryPitch,
}

/// A sound the engine can play, by file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundCue {
    pub file: String,
    pub flags: SoundFlags,
}

impl SoundCue {
    pub fn new(file: impl Into<String>, flags: SoundFlags) -> Self {
        Self {
            file: file.into(),
            flags,
        }
    }
}

impl std::fmt::Display for SoundCue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.file, self.flags)
    }
}

/// Fire-and-forget requests from scripts to the host engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostAction {
    /// Play a sound on behalf of `source`
    PlaySound { source: EntityRef, cue: SoundCue },
    /// Show a line of text spoken by the hero
    HeroSay { source: EntityRef, text: String },
    /// Enable or disable player input
    PlayerControls { enabled: bool },
    /// End the game session
    EndSession { source: EntityRef },
}
