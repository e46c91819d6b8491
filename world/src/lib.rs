#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative play state for Delve.
//!
//! The world owns the dungeon, the door open/closed map, the player, every
//! live enemy and projectile. It mutates only through [`apply`] and reports
//! every change as an [`Event`]. Commands that do not fit the current state
//! are ignored, so systems may re-issue them every tick without effect.

mod doors;

use delve_core::{
    Command, Dungeon, EndParams, EnemyId, EnemyKind, Event, FrameInput, PauseParams, RoomId,
    RoomState, SceneRequest, SoundCue, Team, WELCOME_BANNER,
};
use delve_system_actors::{
    spawn_enemy, update_enemy, ActorEvent, Enemy, Player, Projectile, Senses,
};
use delve_system_collision::{
    move_axis_separated, resolve_overlaps, Arena, Body, SEPARATION_ITERATIONS,
};
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use doors::DoorStates;

/// Live enemy together with the bookkeeping the world attaches to it.
#[derive(Debug)]
struct EnemyEntry {
    id: EnemyId,
    room: RoomId,
    body: Box<dyn Enemy>,
}

/// Represents the authoritative Delve world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    dungeon: Dungeon,
    doors: DoorStates,
    player: Player,
    enemies: Vec<EnemyEntry>,
    projectiles: Vec<Projectile>,
    rng: ChaCha8Rng,
    next_enemy_id: u32,
    muted: bool,
    dungeon_cleared: bool,
    game_over: bool,
    tick_index: u64,
}

impl World {
    /// Creates a world for the provided dungeon with the player at its spawn point.
    ///
    /// `seed` drives enemy decisions such as strafe sides and roll jitter.
    #[must_use]
    pub fn new(dungeon: Dungeon, seed: u64) -> Self {
        Self {
            banner: WELCOME_BANNER,
            doors: DoorStates::new(&dungeon),
            player: Player::spawn(dungeon.spawn),
            dungeon,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_enemy_id: 0,
            muted: false,
            dungeon_cleared: false,
            game_over: false,
            tick_index: 0,
        }
    }

    fn room_state(&self, room: RoomId) -> Option<RoomState> {
        self.dungeon.room(room).map(|meta| meta.state)
    }

    /// Moves a room from `from` to `to`, returning whether the transition happened.
    fn transition(&mut self, room: RoomId, from: RoomState, to: RoomState) -> bool {
        match self.dungeon.rooms.get_mut(room.get() as usize) {
            Some(meta) if meta.state == from => {
                meta.state = to;
                debug!("room {} {:?} -> {:?}", room.get(), from, to);
                true
            }
            _ => false,
        }
    }

    fn live_enemies_in(&self, room: RoomId) -> usize {
        self.enemies
            .iter()
            .filter(|entry| entry.room == room && entry.body.vitals().is_alive())
            .count()
    }

    fn run_is_live(&self) -> bool {
        !self.game_over && !self.dungeon_cleared
    }

    /// Opens or closes every door of `room`.
    ///
    /// A door shared with another locked room stays closed when opening.
    fn set_room_doors(&mut self, room: RoomId, open: bool, out_events: &mut Vec<Event>) {
        let Some(meta) = self.dungeon.room(room) else {
            return;
        };
        let keys = meta.door_keys.clone();

        for key in keys {
            if open {
                let Some(door) = self.dungeon.doors.get(&key) else {
                    continue;
                };
                let other = if door.rooms.0 == room {
                    door.rooms.1
                } else {
                    door.rooms.0
                };
                if self.room_state(other) == Some(RoomState::Locked) {
                    continue;
                }
            }
            if self.doors.set(&self.dungeon, key, open) {
                out_events.push(Event::DoorStateChanged { door: key, open });
            }
        }
    }

    fn tick(&mut self, dt: f32, input: &FrameInput, out_events: &mut Vec<Event>) {
        let arena = Arena::new(&self.dungeon.grid, self.doors.blockers());

        if let Some(shot) = self.player.update(dt, input, &arena) {
            self.projectiles.push(shot);
            out_events.push(Event::ProjectileFired { team: Team::Player });
            out_events.push(Event::Sound {
                cue: SoundCue::PlayerShot,
            });
        }

        for index in 0..self.enemies.len() {
            let room = self.enemies[index].room;
            let neighbours: Vec<_> = self
                .enemies
                .iter()
                .enumerate()
                .filter(|(other, entry)| {
                    *other != index && entry.room == room && entry.body.vitals().is_alive()
                })
                .map(|(_, entry)| entry.body.vitals().rect)
                .collect();
            let senses = Senses {
                player: self.player.rect(),
                neighbours: &neighbours,
                arena,
            };

            match update_enemy(self.enemies[index].body.as_mut(), dt, &senses, &mut self.rng) {
                Some(ActorEvent::HitPlayer { damage }) => {
                    hurt_player(&mut self.player, damage, out_events);
                }
                Some(ActorEvent::SpawnProjectile(projectile)) => {
                    self.projectiles.push(projectile);
                    out_events.push(Event::ProjectileFired { team: Team::Enemy });
                    out_events.push(Event::Sound {
                        cue: SoundCue::EnemyShot,
                    });
                }
                None => {}
            }
        }

        let mut bodies: Vec<Body> = std::iter::once(Body {
            rect: self.player.rect(),
            pushable: true,
        })
        .chain(self.enemies.iter().map(|entry| Body {
            rect: entry.body.vitals().rect,
            pushable: entry.body.pushable(),
        }))
        .collect();
        resolve_overlaps(&arena, &mut bodies, SEPARATION_ITERATIONS);
        self.player.set_rect(bodies[0].rect);
        for (entry, body) in self.enemies.iter_mut().zip(&bodies[1..]) {
            entry.body.vitals_mut().rect = body.rect;
        }

        for projectile in &mut self.projectiles {
            if !projectile.is_alive() {
                continue;
            }
            let motion =
                move_axis_separated(&arena, projectile.rect(), projectile.displacement(dt));
            let rect = motion.rect;
            projectile.relocate(rect);
            projectile.burn(dt);
            if motion.blocked() || arena.blockers().iter().any(|door| door.intersects(&rect)) {
                projectile.expire();
                continue;
            }
            if !projectile.is_alive() {
                continue;
            }
            match projectile.team() {
                Team::Player => {
                    let target = self.enemies.iter_mut().find(|entry| {
                        entry.body.vitals().is_alive() && entry.body.vitals().rect.intersects(&rect)
                    });
                    if let Some(entry) = target {
                        projectile.expire();
                        damage_enemy(entry, projectile.damage(), out_events);
                    }
                }
                Team::Enemy => {
                    if self.player.is_alive() && self.player.rect().intersects(&rect) {
                        projectile.expire();
                        hurt_player(&mut self.player, projectile.damage(), out_events);
                    }
                }
            }
        }
        self.projectiles.retain(Projectile::is_alive);

        self.reap_defeated(out_events);
    }

    fn reap_defeated(&mut self, out_events: &mut Vec<Event>) {
        self.enemies.retain(|entry| {
            if entry.body.vitals().is_alive() {
                return true;
            }
            out_events.push(Event::EnemyDefeated {
                enemy: entry.id,
                room: entry.room,
            });
            out_events.push(Event::Sound {
                cue: SoundCue::EnemyDefeated,
            });
            false
        });
    }

    fn spawn(
        &mut self,
        room: RoomId,
        kind: EnemyKind,
        body: Box<dyn Enemy>,
        out_events: &mut Vec<Event>,
    ) {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.saturating_add(1);
        self.enemies.push(EnemyEntry { id, room, body });
        out_events.push(Event::EnemySpawned {
            enemy: id,
            room,
            kind,
        });
    }
}

fn hurt_player(player: &mut Player, damage: u32, out_events: &mut Vec<Event>) {
    if let Some(amount) = player.take_damage(damage) {
        out_events.push(Event::PlayerDamaged {
            amount,
            hp: player.hp(),
        });
        out_events.push(Event::Sound {
            cue: SoundCue::PlayerHurt,
        });
    }
}

fn damage_enemy(entry: &mut EnemyEntry, amount: u32, out_events: &mut Vec<Event>) {
    if !entry.body.vitals().is_alive() || amount == 0 {
        return;
    }
    let hp = entry.body.vitals_mut().take_damage(amount);
    out_events.push(Event::EnemyDamaged {
        enemy: entry.id,
        hp,
    });
    out_events.push(Event::Sound {
        cue: SoundCue::EnemyHit,
    });
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt, input } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.tick(dt.as_secs_f32(), &input, out_events);
        }
        Command::ArmRoom { room } => {
            if world.transition(room, RoomState::Unvisited, RoomState::Arming) {
                out_events.push(Event::RoomArmed { room });
            }
        }
        Command::DisarmRoom { room } => {
            if world.transition(room, RoomState::Arming, RoomState::Unvisited) {
                out_events.push(Event::RoomDisarmed { room });
            }
        }
        Command::LockRoom { room } => {
            if world.transition(room, RoomState::Arming, RoomState::Locked) {
                world.set_room_doors(room, false, out_events);
                out_events.push(Event::RoomLocked { room });
                out_events.push(Event::Sound {
                    cue: SoundCue::DoorsClosed,
                });
            }
        }
        Command::ClearRoom { room } => {
            if world.live_enemies_in(room) > 0 {
                return;
            }
            if world.transition(room, RoomState::Locked, RoomState::Cleared) {
                world.set_room_doors(room, true, out_events);
                out_events.push(Event::RoomCleared { room });
                out_events.push(Event::Sound {
                    cue: SoundCue::DoorsOpened,
                });
            }
        }
        Command::SpawnEnemy {
            room,
            kind,
            origin,
            facing,
        } => {
            if world.room_state(room) != Some(RoomState::Locked) {
                debug!("ignoring {} spawn outside a locked room", kind.name());
                return;
            }
            let body = spawn_enemy(kind, origin, facing, &mut world.rng);
            world.spawn(room, kind, body, out_events);
        }
        Command::DamageEnemy { enemy, amount } => {
            let Some(entry) = world.enemies.iter_mut().find(|entry| entry.id == enemy) else {
                return;
            };
            damage_enemy(entry, amount, out_events);
            world.reap_defeated(out_events);
        }
        Command::DeclareDungeonCleared => {
            let all_cleared = world
                .dungeon
                .rooms
                .iter()
                .all(|room| room.state == RoomState::Cleared);
            if all_cleared && world.run_is_live() {
                world.dungeon_cleared = true;
                out_events.push(Event::DungeonCleared);
                out_events.push(Event::SceneRequested {
                    request: SceneRequest::YouWin(EndParams {
                        muted: world.muted,
                    }),
                });
            }
        }
        Command::DeclareGameOver => {
            if !world.player.is_alive() && !world.game_over {
                world.game_over = true;
                out_events.push(Event::GameOver);
                out_events.push(Event::SceneRequested {
                    request: SceneRequest::GameOver(EndParams {
                        muted: world.muted,
                    }),
                });
            }
        }
        Command::RequestPause => {
            if world.run_is_live() {
                out_events.push(Event::SceneRequested {
                    request: SceneRequest::Pause(PauseParams {
                        muted: world.muted,
                    }),
                });
            }
        }
        Command::SetAudioMuted { muted } => {
            world.muted = muted;
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use delve_core::{
        DoorKey, Dungeon, EnemySnapshot, PlayerSnapshot, ProgressionView, ProjectileSnapshot,
        Rect, RoomId, RoomProgress, RoomState,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the dungeon layout and room metadata.
    #[must_use]
    pub fn dungeon(world: &World) -> &Dungeon {
        &world.dungeon
    }

    /// Captures the player's presentation state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        world.player.snapshot()
    }

    /// Captures every live enemy in spawn order.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world
            .enemies
            .iter()
            .map(|entry| {
                let vitals = entry.body.vitals();
                EnemySnapshot {
                    id: entry.id,
                    kind: entry.body.kind(),
                    room: entry.room,
                    rect: vitals.rect,
                    hp: vitals.hp,
                    max_hp: vitals.max_hp,
                    facing: entry.body.facing(),
                    frame: entry.body.frame(),
                    attacking: entry.body.attacking(),
                }
            })
            .collect()
    }

    /// Captures every projectile in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|projectile| ProjectileSnapshot {
                rect: projectile.rect(),
                team: projectile.team(),
            })
            .collect()
    }

    /// Builds the view consumed by the room progression system.
    #[must_use]
    pub fn progression_view(world: &World) -> ProgressionView {
        let rooms = world
            .dungeon
            .rooms
            .iter()
            .map(|room| RoomProgress {
                id: room.id,
                state: room.state,
                interior: room.rect_inner.to_pixels(),
                doors: world.dungeon.doors_of(room.id).map(|door| door.rect).collect(),
                live_enemies: world.live_enemies_in(room.id),
            })
            .collect();
        ProgressionView::new(world.player.rect(), world.player.is_alive(), rooms)
    }

    /// Reports whether a door is open; `None` for unknown keys.
    #[must_use]
    pub fn door_open(world: &World, door: &DoorKey) -> Option<bool> {
        world.doors.is_open(door)
    }

    /// Collision rectangles of every closed door.
    #[must_use]
    pub fn blockers(world: &World) -> &[Rect] {
        world.doors.blockers()
    }

    /// Current state of a room.
    #[must_use]
    pub fn room_state(world: &World, room: RoomId) -> Option<RoomState> {
        world.room_state(room)
    }

    /// Number of live enemies spawned for a room.
    #[must_use]
    pub fn live_enemies_in(world: &World, room: RoomId) -> usize {
        world.live_enemies_in(room)
    }

    /// Whether audio is muted.
    #[must_use]
    pub fn muted(world: &World) -> bool {
        world.muted
    }

    /// Whether the run has neither been won nor lost.
    #[must_use]
    pub fn run_is_live(world: &World) -> bool {
        world.run_is_live()
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_system_procgen::{generate, Config};
    use glam::Vec2;

    fn world() -> World {
        World::new(generate(&Config::new(Some(42), 6, (20, 15), 15, 30)), 7)
    }

    #[test]
    fn out_of_order_room_commands_are_ignored() {
        let mut world = world();
        let room = RoomId::new(1);
        let mut events = Vec::new();

        apply(&mut world, Command::LockRoom { room }, &mut events);
        apply(&mut world, Command::ClearRoom { room }, &mut events);
        apply(&mut world, Command::DisarmRoom { room }, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::room_state(&world, room), Some(RoomState::Unvisited));
    }

    #[test]
    fn spawns_are_rejected_outside_locked_rooms() {
        let mut world = world();
        let room = RoomId::new(1);
        let origin = world.dungeon.rooms[1].center;
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                room,
                kind: EnemyKind::Chaser,
                origin,
                facing: delve_core::Direction::South,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::enemies(&world).is_empty());
        assert_ne!(origin, Vec2::ZERO);
    }

    #[test]
    fn pause_is_only_requested_while_the_run_is_live() {
        let mut world = world();
        let mut events = Vec::new();

        apply(&mut world, Command::SetAudioMuted { muted: true }, &mut events);
        apply(&mut world, Command::RequestPause, &mut events);

        assert_eq!(
            events,
            vec![Event::SceneRequested {
                request: SceneRequest::Pause(PauseParams { muted: true }),
            }]
        );
    }
}
