#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Frame driver that runs one play session of the dungeon crawler.
//!
//! Each update advances the world by one tick, then lets the progression and
//! spawning systems react to the resulting events in that fixed order. The
//! commands they emit are applied and the events those produce are fed back
//! until the systems fall quiet.

mod config;

use std::time::Duration;

use delve_core::{Command, Dungeon, Event, FrameInput, SceneRequest};
use delve_system_procgen::generate;
use delve_system_progression::Progression;
use delve_system_spawning::Spawning;
use delve_world::{self as world, query, World};
use log::info;

pub use config::{
    ConfigError, DungeonSection, GameConfig, ProgressionSection, SpawningSection, WorldSection,
};

/// Owns the world and the systems that drive it.
#[derive(Debug)]
pub struct PlayScene {
    world: World,
    progression: Progression,
    spawning: Spawning,
}

impl PlayScene {
    /// Generates a dungeon from the configuration and starts a session in it.
    #[must_use]
    pub fn bootstrap(config: &GameConfig) -> Self {
        let dungeon = generate(&config.dungeon_config());
        info!(
            "bootstrapped dungeon with {} rooms on a {}x{} grid",
            dungeon.rooms.len(),
            dungeon.grid.width(),
            dungeon.grid.height()
        );
        Self::with_dungeon(dungeon, config)
    }

    /// Starts a session in an already built dungeon.
    #[must_use]
    pub fn with_dungeon(dungeon: Dungeon, config: &GameConfig) -> Self {
        let world_seed = config.world.seed.unwrap_or_else(rand::random);
        Self {
            world: World::new(dungeon, world_seed),
            progression: Progression::new(config.progression_config()),
            spawning: Spawning::new(config.spawning_config()),
        }
    }

    /// Advances the session by one frame and returns every event it produced.
    pub fn update(&mut self, dt: Duration, input: FrameInput) -> Vec<Event> {
        self.submit(Command::Tick { dt, input })
    }

    /// Applies an adapter command, such as a pause request, and lets the
    /// systems react to it.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut log = Vec::new();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events, &mut log);
        log
    }

    fn pump(&mut self, mut events: Vec<Event>, log: &mut Vec<Event>) {
        loop {
            if events.is_empty() {
                break;
            }
            log.extend_from_slice(&events);

            let view = query::progression_view(&self.world);
            let mut commands = Vec::new();
            self.progression.handle(&events, &view, &mut commands);
            self.spawning.handle(&events, &view, &mut commands);

            if commands.is_empty() {
                break;
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    /// Read-only access to the simulated world for renderers and queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Banner shown when the session starts.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }
}

/// Last scene transition requested by a batch of events.
#[must_use]
pub fn requested_scene(events: &[Event]) -> Option<SceneRequest> {
    events.iter().rev().find_map(|event| match event {
        Event::SceneRequested { request } => Some(*request),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::RoomState;

    #[test]
    fn bootstrap_starts_in_the_cleared_start_room() {
        let scene = PlayScene::bootstrap(&GameConfig::default().with_seed(3));
        let dungeon = query::dungeon(scene.world());

        assert_eq!(
            query::room_state(scene.world(), dungeon.start_room),
            Some(RoomState::Cleared)
        );
        assert!(query::run_is_live(scene.world()));
    }

    #[test]
    fn idle_frames_only_advance_time() {
        let mut scene = PlayScene::bootstrap(&GameConfig::default().with_seed(3));

        let events = scene.update(Duration::from_millis(16), FrameInput::idle());

        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            }]
        );
    }
}
