use std::{ops::ControlFlow, path::PathBuf, time::Duration};

use anyhow::Result;
use delve_core::FrameInput;
use delve_rendering::{DrawPrimitive, Presentation, RenderingBackend, Resolved, ResourceCache, Scene};

/// Headless backend that runs a fixed number of frames and reports on the last one.
pub(crate) struct TextBackend {
    frames: u64,
    dt: Duration,
    input: Box<dyn FnMut(u64) -> FrameInput>,
    sprites: ResourceCache<PathBuf>,
}

impl TextBackend {
    pub(crate) fn new(
        frames: u64,
        dt: Duration,
        input: impl FnMut(u64) -> FrameInput + 'static,
        sprites: ResourceCache<PathBuf>,
    ) -> Self {
        Self {
            frames,
            dt,
            input: Box::new(input),
            sprites,
        }
    }

    fn placeholders(&self, scene: &Scene) -> usize {
        scene
            .primitives
            .iter()
            .filter(|primitive| match primitive {
                DrawPrimitive::Sprite { sprite, .. } => {
                    matches!(self.sprites.lookup(sprite.key), Resolved::Placeholder(_))
                }
                DrawPrimitive::HealthBar { .. } => false,
            })
            .count()
    }
}

impl RenderingBackend for TextBackend {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> ControlFlow<()> + 'static,
    {
        println!("== {} ==", presentation.window_title);
        let mut scene = presentation.scene;
        let mut frame = 0;
        while frame < self.frames {
            let input = (self.input)(frame);
            frame += 1;
            if update_scene(self.dt, input, &mut scene).is_break() {
                break;
            }
        }

        println!(
            "ran {frame} frames; last frame holds {} primitives, {} drawn as placeholders",
            scene.primitives.len(),
            self.placeholders(&scene)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use delve_rendering::Color;

    #[test]
    fn stops_when_the_scene_asks_to() {
        let backend = TextBackend::new(
            100,
            Duration::from_millis(16),
            |_| FrameInput::idle(),
            ResourceCache::empty(),
        );
        let presentation = Presentation::new("test", Color::from_rgb_u8(0, 0, 0), Scene::default());
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        backend
            .run(presentation, move |_, _, _| {
                counter.set(counter.get() + 1);
                if counter.get() == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .expect("text backend never fails");

        assert_eq!(calls.get(), 3, "the run ends on the first break");
    }
}
