#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line launcher for the dungeon crawler.
//!
//! Generates a dungeon, prints it, and optionally simulates a number of
//! frames through the text backend while logging what happens.

mod report;
mod text_backend;

use std::{
    fs,
    ops::ControlFlow,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use delve_core::{FireDirection, FrameInput, SceneRequest, SoundCue};
use delve_rendering::{
    dispatch_sounds, render_ascii, AudioSink, Color, Presentation, RenderingBackend,
    ResourceCache, Scene,
};
use delve_system_play_scene::{requested_scene, GameConfig, PlayScene};
use delve_system_procgen::parse_level;
use delve_world::query;
use glam::Vec2;
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::text_backend::TextBackend;

const FRAME: Duration = Duration::from_millis(16);
const WANDER_LEG_FRAMES: u64 = 45;

/// Headless dungeon crawler simulation.
#[derive(Parser, Debug)]
#[command(name = "delve", version, about = "Generate and simulate a dungeon run")]
struct Args {
    /// TOML game configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for every random stream; overrides the configuration.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rooms to generate; overrides the configuration.
    #[arg(long)]
    rooms: Option<usize>,

    /// Frames to simulate after generation.
    #[arg(long, default_value_t = 0)]
    ticks: u64,

    /// Summarise an ASCII level file instead of generating a dungeon.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Drive the player with a seeded random walk instead of idling.
    #[arg(long)]
    wander: bool,

    /// Sprite manifest resolved by the text backend.
    #[arg(long)]
    sprites: Option<PathBuf>,
}

/// Entry point for the dungeon crawler command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.level {
        return describe_level(path);
    }

    let config = load_config(&args)?;
    let scene = PlayScene::bootstrap(&config);
    println!("{}", scene.welcome_banner());

    let world = scene.world();
    let dungeon = query::dungeon(world);
    println!("{}", report::dungeon_summary(dungeon));
    println!("{}", render_ascii(&dungeon.grid));
    println!(
        "{}",
        report::room_table(dungeon, |room| {
            query::room_state(world, room.id).unwrap_or(room.state)
        })
    );

    if args.ticks == 0 {
        return Ok(());
    }

    let sprites = match &args.sprites {
        Some(path) => load_sprites(path)?,
        None => ResourceCache::empty(),
    };
    let walk_seed = config.dungeon.seed.unwrap_or_else(rand::random);
    let backend = if args.wander {
        TextBackend::new(args.ticks, FRAME, wander(walk_seed), sprites)
    } else {
        TextBackend::new(args.ticks, FRAME, |_| FrameInput::idle(), sprites)
    };
    let presentation = Presentation::new("delve", Color::from_rgb_u8(0, 0, 0), compose(&scene));
    backend.run(presentation, simulate(scene))
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load game config {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(rooms) = args.rooms {
        config.dungeon.rooms = rooms;
    }
    config
        .validate()
        .context("command-line overrides produced an invalid configuration")?;
    Ok(config)
}

fn load_sprites(path: &Path) -> Result<ResourceCache<PathBuf>> {
    ResourceCache::from_manifest_path(path, |_, sprite| {
        let _ = fs::metadata(sprite)
            .with_context(|| format!("sprite file {} is missing", sprite.display()))?;
        Ok(sprite.to_path_buf())
    })
    .with_context(|| format!("failed to load sprite manifest {}", path.display()))
}

fn describe_level(path: &Path) -> Result<()> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    let layout =
        parse_level(&text).with_context(|| format!("failed to parse level {}", path.display()))?;
    println!("{}", report::level_summary(&layout));
    println!("{}", render_ascii(&layout.grid));
    Ok(())
}

fn compose(scene: &PlayScene) -> Scene {
    let world = scene.world();
    Scene::compose(
        &query::dungeon(world).grid,
        query::blockers(world),
        &query::player(world),
        &query::enemies(world),
        &query::projectiles(world),
    )
}

/// Frame callback that advances the session, prints its events and stops at the end of the run.
fn simulate(
    mut scene: PlayScene,
) -> impl FnMut(Duration, FrameInput, &mut Scene) -> ControlFlow<()> + 'static {
    let mut audio = LoggedAudio;
    move |dt, input, frame| {
        let events = scene.update(dt, input);
        let tick = query::tick_index(scene.world());
        for line in events.iter().filter_map(report::describe_event) {
            println!("[{tick:>5}] {line}");
        }
        let _ = dispatch_sounds(&events, query::muted(scene.world()), &mut audio);
        *frame = compose(&scene);

        match requested_scene(&events) {
            Some(SceneRequest::GameOver(_) | SceneRequest::YouWin(_)) => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

/// Seeded random walk that changes heading and fire direction every leg.
fn wander(seed: u64) -> impl FnMut(u64) -> FrameInput + 'static {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut current = FrameInput::idle();
    move |frame| {
        if frame % WANDER_LEG_FRAMES == 0 {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            current = FrameInput {
                movement: Vec2::from_angle(angle),
                fire: FireDirection::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1)),
            };
        }
        current
    }
}

struct LoggedAudio;

impl AudioSink for LoggedAudio {
    fn play(&mut self, cue: SoundCue) {
        info!("sound cue {cue:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let args = Args::try_parse_from(["delve", "--seed", "7", "--rooms", "4", "--ticks", "30"])
            .expect("arguments parse");

        let config = load_config(&args).expect("overrides are valid");

        assert_eq!(config.dungeon.seed, Some(7));
        assert_eq!(config.dungeon.rooms, 4);
        assert_eq!(args.ticks, 30);
        assert!(!args.wander);
    }

    #[test]
    fn zero_rooms_is_rejected() {
        let args = Args::try_parse_from(["delve", "--rooms", "0"]).expect("arguments parse");

        assert!(load_config(&args).is_err());
    }

    #[test]
    fn wander_is_reproducible() {
        let mut first = wander(5);
        let mut second = wander(5);

        for frame in 0..200 {
            assert_eq!(first(frame), second(frame));
        }
    }

    #[test]
    fn a_short_idle_run_keeps_the_session_alive() {
        let scene = PlayScene::bootstrap(&GameConfig::default().with_seed(1));
        let mut step = simulate(scene);
        let mut frame = Scene::default();

        for _ in 0..10 {
            assert_eq!(
                step(FRAME, FrameInput::idle(), &mut frame),
                ControlFlow::Continue(())
            );
        }
        assert!(!frame.primitives.is_empty(), "each frame recomposes the scene");
    }
}
