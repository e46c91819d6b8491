use delve_core::{Event, SoundCue};

/// Consumer of the discrete sound cues emitted by the simulation.
pub trait AudioSink {
    /// Plays a single cue.
    fn play(&mut self, cue: SoundCue);
}

/// Forwards every sound cue in `events` to the sink unless audio is muted.
///
/// Returns the number of cues played.
pub fn dispatch_sounds(events: &[Event], muted: bool, sink: &mut dyn AudioSink) -> usize {
    if muted {
        return 0;
    }
    let mut played = 0;
    for event in events {
        if let Event::Sound { cue } = event {
            sink.play(*cue);
            played += 1;
        }
    }
    played
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<SoundCue>);

    impl AudioSink for Recorder {
        fn play(&mut self, cue: SoundCue) {
            self.0.push(cue);
        }
    }

    #[test]
    fn only_sound_events_reach_the_sink() {
        let events = [
            Event::Sound {
                cue: SoundCue::DoorsClosed,
            },
            Event::DungeonCleared,
            Event::Sound {
                cue: SoundCue::EnemyHit,
            },
        ];
        let mut recorder = Recorder::default();

        assert_eq!(dispatch_sounds(&events, false, &mut recorder), 2);
        assert_eq!(recorder.0, vec![SoundCue::DoorsClosed, SoundCue::EnemyHit]);

        assert_eq!(dispatch_sounds(&events, true, &mut recorder), 0);
        assert_eq!(recorder.0.len(), 2, "muted audio plays nothing");
    }
}
