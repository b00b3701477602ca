use std::path::PathBuf;

use clap::Parser;
use glam::Vec3;
use tracing::info;

// Import from the library crate
use slipper_rig::{
    logging,
    controller::{InputEvent, InputState, input::MouseButton},
    model::{Capabilities, CarryableItem, Collidable, Handle, Transform},
    world::{Anchor, CharacterMotor},
    world::sandbox::{BoxCollider, RecordingAnimator, SandboxMotor, SandboxWorld},
    ConfigError, FrameClock, Rig, RigConfig,
};

const SLIPPER: Handle = Handle(1);
const WALL: Handle = Handle(2);
/// How close the actor must get before its pickup trigger fires
const TRIGGER_RADIUS: f32 = 1.0;

/// Headless scripted session: walk, jump, pick up a slipper, aim and throw it
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,
    /// JSON rig config; defaults are used for anything left out
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the throw spread
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Approach,
    Carry,
    Throw,
    Watch,
}

fn main() -> Result<(), ConfigError> {
    let args = Args::parse();
    logging::init();

    let mut config = match &args.config {
        Some(path) => RigConfig::load(path)?,
        None => RigConfig::default(),
    };
    if args.seed.is_some() {
        config.interaction.seed = args.seed;
    }
    let config = config.validated()?;

    let animator = RecordingAnimator::with_clips(&config.clips);
    let mut rig = Rig::new(config, Some(Box::new(animator)));
    rig.register_item(CarryableItem::new("Slipper", SLIPPER).with_mass(0.3));

    let mut world = SandboxWorld::new().with_humanoid_anchors();
    world.spawn_object(SLIPPER, Transform::from_position(Vec3::new(0.0, 0.0, 3.0)));
    world.add_collider(BoxCollider {
        handle: WALL,
        center: Vec3::new(0.0, 2.0, 15.0),
        half_extents: Vec3::new(6.0, 2.0, 0.25),
        layer: 1,
    });

    let mut motor = SandboxMotor::new(Vec3::ZERO);
    let mut input = InputState::new();
    let mut clock = FrameClock::new();
    let mut phase = Phase::Approach;

    input.process_event(&InputEvent::KeyDown("w".to_string()));
    for tick in 0..args.ticks {
        let time = clock.tick(args.dt);

        match phase {
            Phase::Approach => {
                if tick == 20 {
                    input.process_event(&InputEvent::KeyDown(" ".to_string()));
                } else if tick == 21 {
                    input.process_event(&InputEvent::KeyUp(" ".to_string()));
                }
                let near = world
                    .object_transform(SLIPPER)
                    .is_some_and(|t| t.position.distance(motor.transform().position) < TRIGGER_RADIUS);
                if near && motor.is_grounded() {
                    input.process_event(&InputEvent::KeyUp("w".to_string()));
                    let slipper = Collidable::new(SLIPPER, Capabilities::CARRYABLE);
                    if rig.on_trigger_enter(&slipper, time.now, &mut world).is_ok() {
                        phase = Phase::Carry;
                    }
                }
            }
            Phase::Carry => {
                if !rig.gate().is_busy() {
                    // look slightly up toward the wall, then press to throw
                    input.process_event(&InputEvent::MouseMove { dx: 2.0, dy: -3.0 });
                    input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: true });
                    phase = Phase::Throw;
                }
            }
            Phase::Throw => {
                if rig.interaction().held().is_none() && !rig.gate().is_busy() {
                    input.process_event(&InputEvent::MouseButton { button: MouseButton::Left, is_down: false });
                    let (has_target, point) = rig.try_get_aim_point();
                    info!(has_target, ?point, "throw finished");
                    phase = Phase::Watch;
                }
            }
            Phase::Watch => {}
        }

        rig.tick(&mut input, time, &mut world, &mut motor);

        world.set_actor(motor.transform());
        let camera = rig.camera();
        world.set_world_anchor(Anchor::MainCamera, Transform::new(camera.position(), camera.rotation()));
        world.step(time.delta);
    }

    info!(
        phase = ?phase,
        actor = ?motor.transform().position,
        slipper = ?world.object_transform(SLIPPER).map(|t| t.position),
        held = ?rig.interaction().held(),
        state = ?rig.locomotion().state(),
        "session over"
    );
    rig.shutdown();
    Ok(())
}
