use std::collections::VecDeque;

use bevy_ecs::{
    event::{EventReader, EventWriter},
    resource::Resource,
    system::{NonSendMut, Res, ResMut},
};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::events::GameCommand;
use crate::systems::audio::{AudioEvent, AudioState, Sound};
use crate::systems::camera::CameraRig;
use crate::systems::combat::Weapon;
use crate::systems::components::GlobalState;
use crate::systems::level::LevelState;
use crate::systems::player::PlayerState;
use crate::systems::profiling::Timing;
use crate::systems::scene::SceneGeometry;

/// Commands delivered by an input source in a single tick.
pub type CommandBatch = SmallVec<[GameCommand; 8]>;

/// Device-agnostic source of player intents, polled once per tick.
pub trait InputSource {
    fn poll(&mut self, tick: u64) -> CommandBatch;
}

/// Non-send resource wrapper for the host's input source.
pub struct InputSourceResource(pub Box<dyn InputSource>);

/// Replays a fixed list of `(tick, command)` pairs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    script: VecDeque<(u64, GameCommand)>,
}

impl ScriptedInput {
    /// Entries must be ordered by tick; anything scheduled for a tick already polled is delivered late.
    pub fn new(script: impl IntoIterator<Item = (u64, GameCommand)>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, tick: u64) -> CommandBatch {
        let mut batch = CommandBatch::new();
        while let Some((at, command)) = self.script.front().copied() {
            if at > tick {
                break;
            }
            self.script.pop_front();
            batch.push(command);
        }
        batch
    }
}

/// Buttons currently held down.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub firing: bool,
    pub aiming: bool,
    pub jump_held: bool,
}

/// Polls the host's input source, if there is one, and forwards its commands as events.
pub fn input_system(
    timing: Res<Timing>,
    source: Option<NonSendMut<InputSourceResource>>,
    mut writer: EventWriter<GameCommand>,
) {
    let Some(mut source) = source else {
        return;
    };

    let batch = source.0.poll(timing.get_current_tick());
    if !batch.is_empty() {
        trace!(count = batch.len(), "Polled input commands");
    }
    writer.write_batch(batch);
}

/// Applies the tick's commands to the player, weapon and camera.
///
/// Once the game is over only [`GameCommand::Exit`] and [`GameCommand::ToggleMute`] are honoured.
#[allow(clippy::too_many_arguments)]
pub fn player_control_system(
    level: Res<LevelState>,
    scene: Res<SceneGeometry>,
    mut commands: EventReader<GameCommand>,
    mut state: ResMut<GlobalState>,
    mut input: ResMut<InputState>,
    mut player: ResMut<PlayerState>,
    mut weapon: ResMut<Weapon>,
    mut rig: ResMut<CameraRig>,
    mut sound: ResMut<AudioState>,
    mut audio: EventWriter<AudioEvent>,
) {
    for command in commands.read() {
        match *command {
            GameCommand::Exit => {
                debug!("Exit requested");
                state.exit = true;
            }
            GameCommand::ToggleMute => {
                sound.muted = !sound.muted;
                debug!(muted = sound.muted, "Audio mute toggled");
            }
            _ if level.is_over() => {
                trace!(?command, "Ignoring command after game over");
            }
            GameCommand::Move(direction) => {
                player.request_move(direction, |x, z| scene.blocks(x, z));
            }
            GameCommand::Turn(direction) => player.turn(direction),
            GameCommand::JumpPressed => {
                input.jump_held = true;
                if player.request_jump() {
                    audio.write(AudioEvent::PlaySound(Sound::Jump));
                }
            }
            GameCommand::JumpReleased => input.jump_held = false,
            GameCommand::FirePressed => input.firing = true,
            GameCommand::FireReleased => input.firing = false,
            GameCommand::AimPressed => input.aiming = true,
            GameCommand::AimReleased => {
                input.aiming = false;
                player.pitch = 0.0;
            }
            GameCommand::Reload => {
                if weapon.start_reload() {
                    audio.write(AudioEvent::PlaySound(Sound::Reload));
                }
            }
            GameCommand::Look { dx, dy } => {
                if input.aiming {
                    player.look(dx, dy);
                }
            }
            GameCommand::SetView(view) => {
                debug!(?view, "Camera view changed");
                rig.view = view;
            }
        }
    }
}
