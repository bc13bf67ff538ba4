use dunk_events::{SoundCue, SoundFlags};

/// Sound cues played by the course scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSounds {
    /// Played from the player when the tutorial text appears
    pub tutorial: SoundCue,
    /// Enemy took a hit and is still healthy
    pub enemy_ok: SoundCue,
    /// Enemy took a hit and is nearly dead
    pub enemy_ouch: SoundCue,
    /// Enemy died
    pub enemy_dead: SoundCue,
}

impl Default for CourseSounds {
    fn default() -> Self {
        Self {
            tutorial: SoundCue::new("system.wav", SoundFlags::EmitFromPlayer),
            enemy_ok: SoundCue::new("demon_ouch.wav", SoundFlags::VaryPitch),
            enemy_ouch: SoundCue::new("demon_scream.wav", SoundFlags::VaryPitch),
            enemy_dead: SoundCue::new("demon_die.wav", SoundFlags::VaryPitch),
        }
    }
}
