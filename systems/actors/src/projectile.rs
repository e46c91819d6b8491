use delve_core::{EnemyKind, Rect, Team};
use glam::Vec2;

/// Entity that fired a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileOwner {
    /// Fired by the player.
    Player,
    /// Spat by an enemy of the given kind.
    Enemy(EnemyKind),
}

/// Straight-flying shot with a limited lifetime.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projectile {
    rect: Rect,
    velocity: Vec2,
    ttl: f32,
    damage: u32,
    team: Team,
    owner: ProjectileOwner,
    alive: bool,
}

impl Projectile {
    /// Creates a projectile centred on `center`.
    #[must_use]
    pub fn new(
        center: Vec2,
        size: Vec2,
        velocity: Vec2,
        ttl: f32,
        damage: u32,
        owner: ProjectileOwner,
    ) -> Self {
        let team = match owner {
            ProjectileOwner::Player => Team::Player,
            ProjectileOwner::Enemy(_) => Team::Enemy,
        };
        Self {
            rect: Rect::from_center(center, size),
            velocity,
            ttl,
            damage,
            team,
            owner,
            alive: true,
        }
    }

    /// Integrates position and burns lifetime; the projectile dies once `ttl` reaches zero.
    ///
    /// This is free flight. Callers that collide the shot move it with
    /// [`Projectile::displacement`] and [`Projectile::relocate`] and then
    /// call [`Projectile::burn`].
    pub fn advance(&mut self, dt: f32) {
        if !self.alive {
            return;
        }
        self.rect = self.rect.translated(self.displacement(dt));
        self.burn(dt);
    }

    /// Distance the projectile wants to travel in `dt`.
    #[must_use]
    pub fn displacement(&self, dt: f32) -> Vec2 {
        self.velocity * dt
    }

    /// Places the projectile at a collision-resolved rectangle.
    pub fn relocate(&mut self, rect: Rect) {
        self.rect = rect;
    }

    /// Burns lifetime without moving; the projectile dies once `ttl` reaches zero.
    pub fn burn(&mut self, dt: f32) {
        self.ttl -= dt;
        if self.ttl <= 0.0 {
            self.alive = false;
        }
    }

    /// Removes the projectile after it hit a wall or a target.
    pub fn expire(&mut self) {
        self.alive = false;
    }

    /// Collision rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Velocity in pixels per second.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Remaining lifetime in seconds.
    #[must_use]
    pub const fn ttl(&self) -> f32 {
        self.ttl
    }

    /// Damage dealt on hit.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Team the projectile belongs to.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Entity that fired the projectile.
    #[must_use]
    pub const fn owner(&self) -> ProjectileOwner {
        self.owner
    }

    /// Whether the projectile is still in flight.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projectile_dies_when_ttl_runs_out() {
        let mut shot = Projectile::new(
            Vec2::new(50.0, 50.0),
            Vec2::splat(6.0),
            Vec2::new(300.0, 0.0),
            0.2,
            1,
            ProjectileOwner::Player,
        );

        shot.advance(0.1);
        assert!(shot.is_alive());
        assert!((shot.rect().center().x - 80.0).abs() < 1e-3);

        shot.advance(0.1);
        assert!(!shot.is_alive());
        assert_eq!(shot.team(), Team::Player);
    }

    #[test]
    fn burning_lifetime_leaves_the_position_alone() {
        let mut shot = Projectile::new(
            Vec2::new(50.0, 50.0),
            Vec2::splat(6.0),
            Vec2::new(0.0, -230.0),
            2.0,
            1,
            ProjectileOwner::Enemy(EnemyKind::Turret),
        );
        let start = shot.rect();

        assert_eq!(shot.displacement(0.5), Vec2::new(0.0, -115.0));
        shot.burn(0.5);
        assert_eq!(shot.rect(), start);
        assert!((shot.ttl() - 1.5).abs() < 1e-6);

        let stopped = start.translated(Vec2::new(0.0, -20.0));
        shot.relocate(stopped);
        shot.burn(1.5);
        assert_eq!(shot.rect(), stopped);
        assert!(!shot.is_alive());
    }
}
