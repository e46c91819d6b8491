use delve_core::Direction;

/// Looping frame clock advancing at a fixed rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    frame_count: usize,
    frame_time: f32,
    elapsed: f32,
    frame: usize,
}

impl Animation {
    /// Creates a clock cycling through `frame_count` frames at `fps` frames per second.
    #[must_use]
    pub fn new(frame_count: usize, fps: f32) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_time: 1.0 / fps.max(1.0),
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Advances the clock, wrapping back to the first frame.
    pub fn update(&mut self, dt: f32) {
        if self.frame_count <= 1 {
            return;
        }
        self.elapsed += dt;
        while self.elapsed >= self.frame_time {
            self.elapsed -= self.frame_time;
            self.frame = (self.frame + 1) % self.frame_count;
        }
    }

    /// Rewinds to the first frame.
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.frame = 0;
    }

    /// Current frame index.
    #[must_use]
    pub const fn frame(&self) -> usize {
        self.frame
    }

    /// Number of frames in the loop.
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count
    }
}

/// One animation clock per facing direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalAnimation {
    clips: [Animation; 4],
    direction: Direction,
}

impl DirectionalAnimation {
    /// Uses the same clip shape for every direction.
    #[must_use]
    pub fn uniform(clip: Animation, direction: Direction) -> Self {
        Self {
            clips: [clip; 4],
            direction,
        }
    }

    /// Switches the active direction; the clip keeps its own progress.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    /// Active direction.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Advances the active clip when `playing`, otherwise holds it on the first frame.
    pub fn update(&mut self, dt: f32, playing: bool) {
        let clip = self.current_mut();
        if playing {
            clip.update(dt);
        } else {
            clip.reset();
        }
    }

    /// Rewinds the active clip.
    pub fn reset(&mut self) {
        self.current_mut().reset();
    }

    /// Frame index of the active clip.
    #[must_use]
    pub fn frame(&self) -> usize {
        self.clips[slot(self.direction)].frame()
    }

    fn current_mut(&mut self) -> &mut Animation {
        &mut self.clips[slot(self.direction)]
    }
}

const fn slot(direction: Direction) -> usize {
    match direction {
        Direction::North => 0,
        Direction::East => 1,
        Direction::South => 2,
        Direction::West => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn animation_wraps_after_last_frame() {
        let mut clip = Animation::new(3, 10.0);
        clip.update(0.25);
        assert_eq!(clip.frame(), 2);
        clip.update(0.1);
        assert_eq!(clip.frame(), 0);
    }

    #[test]
    fn directions_keep_independent_progress() {
        let mut anim = DirectionalAnimation::uniform(Animation::new(6, 10.0), Direction::South);
        anim.update(0.35, true);
        assert_eq!(anim.frame(), 3);

        anim.set_direction(Direction::East);
        assert_eq!(anim.frame(), 0);
        anim.update(0.1, false);
        anim.set_direction(Direction::South);
        assert_eq!(anim.frame(), 3);
    }
}
