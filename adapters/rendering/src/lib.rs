#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering and audio contracts for dungeon crawler adapters.
//!
//! The simulation never draws. Adapters turn world snapshots into a [`Scene`]
//! of [`DrawPrimitive`]s keyed by logical sprite identifiers, resolve those
//! identifiers through a [`ResourceCache`], and forward sound cues to an
//! [`AudioSink`].

mod ascii;
mod audio;
mod cache;

use std::{ops::ControlFlow, time::Duration};

use anyhow::Result as AnyResult;
use delve_core::{
    Direction, EnemyKind, EnemySnapshot, FrameInput, PlayerSnapshot, ProjectileSnapshot, Rect,
    Team, Tile, TileGrid, TILE_SIZE,
};
use glam::Vec2;

pub use ascii::render_ascii;
pub use audio::{dispatch_sounds, AudioSink};
pub use cache::{ManifestError, Resolved, ResourceCache, SUPPORTED_MANIFEST_VERSION};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white, the neutral sprite tint.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Logical sprite families a renderer must be able to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpriteKey {
    /// Walkable room floor.
    Floor,
    /// Room wall.
    Wall,
    /// Open door half.
    Door,
    /// Corridor floor between two door halves.
    Hall,
    /// Door passage sealed by a locked room.
    ClosedDoor,
    /// The player character.
    Player,
    /// Melee chaser enemy.
    Chaser,
    /// Rolling enemy.
    Roller,
    /// Stationary spitting enemy.
    Turret,
    /// Shot fired by the player.
    PlayerShot,
    /// Projectile fired by an enemy.
    EnemyShot,
}

impl SpriteKey {
    /// Every sprite key in a stable order.
    pub const ALL: [SpriteKey; 11] = [
        SpriteKey::Floor,
        SpriteKey::Wall,
        SpriteKey::Door,
        SpriteKey::Hall,
        SpriteKey::ClosedDoor,
        SpriteKey::Player,
        SpriteKey::Chaser,
        SpriteKey::Roller,
        SpriteKey::Turret,
        SpriteKey::PlayerShot,
        SpriteKey::EnemyShot,
    ];

    /// Manifest name of the key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Hall => "hall",
            Self::ClosedDoor => "closed_door",
            Self::Player => "player",
            Self::Chaser => "chaser",
            Self::Roller => "roller",
            Self::Turret => "turret",
            Self::PlayerShot => "player_shot",
            Self::EnemyShot => "enemy_shot",
        }
    }

    /// Parses a manifest name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Sprite used for a tile, or `None` for void which is never drawn.
    #[must_use]
    pub const fn for_tile(tile: Tile) -> Option<Self> {
        match tile {
            Tile::Floor => Some(Self::Floor),
            Tile::Wall => Some(Self::Wall),
            Tile::Door => Some(Self::Door),
            Tile::Hall => Some(Self::Hall),
            Tile::Void => None,
        }
    }

    /// Sprite used for an enemy kind.
    #[must_use]
    pub const fn for_enemy(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Chaser => Self::Chaser,
            EnemyKind::Roller => Self::Roller,
            EnemyKind::Turret => Self::Turret,
        }
    }

    /// Neutral color drawn when the sprite could not be loaded.
    #[must_use]
    pub const fn placeholder(self) -> Color {
        let (red, green, blue) = match self {
            Self::Floor => Tile::Floor.fallback_rgb(),
            Self::Wall => Tile::Wall.fallback_rgb(),
            Self::Door => Tile::Door.fallback_rgb(),
            Self::Hall => Tile::Hall.fallback_rgb(),
            Self::ClosedDoor => (120, 80, 40),
            Self::Player => (200, 200, 200),
            Self::Chaser | Self::Roller | Self::Turret => (170, 60, 60),
            Self::PlayerShot | Self::EnemyShot => (240, 220, 120),
        };
        Color::from_rgb_u8(red, green, blue)
    }
}

/// Sprite family plus the logical animation frame to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteId {
    /// Sprite family.
    pub key: SpriteKey,
    /// Logical frame index; renderers wrap it to their sheet length.
    pub frame: usize,
}

impl SpriteId {
    /// Creates a sprite identifier.
    #[must_use]
    pub const fn new(key: SpriteKey, frame: usize) -> Self {
        Self { key, frame }
    }
}

/// One element of a frame, in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawPrimitive {
    /// Draws a sprite stretched over a rectangle.
    Sprite {
        /// Sprite and frame to draw.
        sprite: SpriteId,
        /// Destination rectangle.
        rect: Rect,
        /// Direction the drawn entity faces.
        facing: Direction,
        /// Multiplicative tint.
        tint: Color,
    },
    /// Draws a health bar filled to `hp / max_hp`.
    HealthBar {
        /// Full extent of the bar.
        rect: Rect,
        /// Remaining health.
        hp: u32,
        /// Maximum health.
        max_hp: u32,
    },
}

const HEALTH_BAR_HEIGHT: f32 = 4.0;
const HEALTH_BAR_GAP: f32 = 3.0;

/// Everything a backend needs to draw one frame, back to front.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Width of the drawable area in pixels.
    pub width: f32,
    /// Height of the drawable area in pixels.
    pub height: f32,
    /// Primitives in painter's order.
    pub primitives: Vec<DrawPrimitive>,
}

impl Scene {
    /// Composes a frame from the grid, closed door blockers and entity snapshots.
    #[must_use]
    pub fn compose(
        grid: &TileGrid,
        closed_doors: &[Rect],
        player: &PlayerSnapshot,
        enemies: &[EnemySnapshot],
        projectiles: &[ProjectileSnapshot],
    ) -> Self {
        let mut primitives = Vec::new();

        for (row, tiles) in grid.rows().enumerate() {
            for (column, tile) in tiles.iter().enumerate() {
                let Some(key) = SpriteKey::for_tile(*tile) else {
                    continue;
                };
                let origin = Vec2::new(column as f32, row as f32) * TILE_SIZE;
                primitives.push(still(
                    key,
                    Rect::new(origin.x, origin.y, TILE_SIZE, TILE_SIZE),
                ));
            }
        }

        primitives.extend(
            closed_doors
                .iter()
                .map(|rect| still(SpriteKey::ClosedDoor, *rect)),
        );

        for enemy in enemies {
            primitives.push(DrawPrimitive::Sprite {
                sprite: SpriteId::new(SpriteKey::for_enemy(enemy.kind), enemy.frame),
                rect: enemy.rect,
                facing: enemy.facing,
                tint: Color::WHITE,
            });
            if enemy.hp < enemy.max_hp {
                primitives.push(health_bar(&enemy.rect, enemy.hp, enemy.max_hp));
            }
        }

        primitives.push(DrawPrimitive::Sprite {
            sprite: SpriteId::new(SpriteKey::Player, player.frame),
            rect: player.rect,
            facing: player.facing,
            tint: if player.invulnerable {
                Color::WHITE.with_alpha(0.5)
            } else {
                Color::WHITE
            },
        });

        primitives.extend(projectiles.iter().map(|projectile| {
            let key = match projectile.team {
                Team::Player => SpriteKey::PlayerShot,
                Team::Enemy => SpriteKey::EnemyShot,
            };
            still(key, projectile.rect)
        }));

        Self {
            width: grid.pixel_width(),
            height: grid.pixel_height(),
            primitives,
        }
    }

    /// Number of sprites of the given family in the frame.
    #[must_use]
    pub fn count(&self, key: SpriteKey) -> usize {
        self.primitives
            .iter()
            .filter(|primitive| {
                matches!(primitive, DrawPrimitive::Sprite { sprite, .. } if sprite.key == key)
            })
            .count()
    }
}

fn still(key: SpriteKey, rect: Rect) -> DrawPrimitive {
    DrawPrimitive::Sprite {
        sprite: SpriteId::new(key, 0),
        rect,
        facing: Direction::South,
        tint: Color::WHITE,
    }
}

fn health_bar(owner: &Rect, hp: u32, max_hp: u32) -> DrawPrimitive {
    DrawPrimitive::HealthBar {
        rect: Rect::new(
            owner.left(),
            owner.top() - HEALTH_BAR_GAP - HEALTH_BAR_HEIGHT,
            owner.width(),
            HEALTH_BAR_HEIGHT,
        ),
        hp,
        max_hp,
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting dungeon scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta
    /// and the input captured by the adapter, and rebuilds the scene before it
    /// is rendered. Returning [`ControlFlow::Break`] ends the run.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> ControlFlow<()> + 'static;
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::EnemyId;
    use delve_core::RoomId;

    fn player() -> PlayerSnapshot {
        PlayerSnapshot {
            rect: Rect::from_center(Vec2::new(48.0, 48.0), Vec2::splat(28.0)),
            hp: 6,
            max_hp: 6,
            facing: Direction::East,
            moving: false,
            frame: 2,
            invulnerable: true,
        }
    }

    #[test]
    fn sprite_names_round_trip_through_the_manifest_vocabulary() {
        for key in SpriteKey::ALL {
            assert_eq!(SpriteKey::from_name(key.name()), Some(key));
        }
        assert_eq!(SpriteKey::from_name("dragon"), None);
    }

    #[test]
    fn compose_skips_void_and_layers_entities_over_tiles() {
        let mut grid = TileGrid::filled(4, 3, Tile::Void);
        let _ = grid.set(1, 1, Tile::Floor);
        let _ = grid.set(2, 1, Tile::Wall);
        let enemy = EnemySnapshot {
            id: EnemyId::new(0),
            kind: EnemyKind::Roller,
            room: RoomId::new(1),
            rect: Rect::new(32.0, 32.0, 22.0, 22.0),
            hp: 4,
            max_hp: 10,
            facing: Direction::West,
            frame: 3,
            attacking: false,
        };

        let scene = Scene::compose(&grid, &[], &player(), &[enemy], &[]);

        assert_eq!(scene.primitives.len(), 5);
        assert_eq!(scene.count(SpriteKey::Floor), 1);
        assert_eq!(scene.count(SpriteKey::Wall), 1);
        assert_eq!(scene.width, 128.0);
        assert!(matches!(
            scene.primitives[3],
            DrawPrimitive::HealthBar {
                hp: 4,
                max_hp: 10,
                ..
            }
        ));
        match scene.primitives[4] {
            DrawPrimitive::Sprite { sprite, tint, .. } => {
                assert_eq!(sprite, SpriteId::new(SpriteKey::Player, 2));
                assert_eq!(tint.alpha, 0.5, "invulnerable players are drawn translucent");
            }
            other => panic!("expected the player sprite last, got {other:?}"),
        }
    }
}
