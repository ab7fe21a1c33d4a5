//! Audio system for handing sound effects to the host.
//!
//! Gameplay systems only write [`AudioEvent`]s. The [`audio_system`] drains them once per tick and
//! forwards them to whatever [`SoundService`] the host installed, stored as a non-send resource
//! since real audio backends are usually tied to the main thread.

use bevy_ecs::{
    event::{Event, EventReader},
    resource::Resource,
    system::{NonSendMut, ResMut},
};
use strum_macros::{EnumIter, IntoStaticStr};
use tracing::{debug, trace};

/// Fire-and-forget sound effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Sound {
    Shoot,
    Hit,
    Reload,
    Jump,
    Damage,
}

/// Playback backend provided by the host.
pub trait SoundService {
    fn play(&mut self, sound: Sound);

    fn stop_all(&mut self) {}
}

/// A backend that plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl SoundService for SilentAudio {
    fn play(&mut self, sound: Sound) {
        trace!(sound = <&'static str>::from(sound), "Silently dropping sound");
    }
}

/// Resource for tracking audio state
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioState {
    /// Whether audio is currently muted
    pub muted: bool,
    /// Sounds handed to the backend so far
    pub played: u64,
}

/// Events for triggering audio playback
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioEvent {
    /// Play a specific sound effect
    PlaySound(Sound),
    /// Stop all currently playing sounds
    StopAll,
}

/// Non-send resource wrapper for the host's sound backend.
pub struct AudioResource(pub Box<dyn SoundService>);

/// System that processes audio events and plays sounds
pub fn audio_system(mut audio: NonSendMut<AudioResource>, mut state: ResMut<AudioState>, mut events: EventReader<AudioEvent>) {
    for event in events.read() {
        match event {
            AudioEvent::PlaySound(sound) => {
                if state.muted {
                    debug!(?sound, "Skipping sound while muted");
                    continue;
                }
                trace!(?sound, "Playing sound");
                audio.0.play(*sound);
                state.played += 1;
            }
            AudioEvent::StopAll => {
                debug!("Stopping all audio");
                audio.0.stop_all();
            }
        }
    }
}
