use std::time::Duration;

use crate::{raster::Bitmap, sequence::FrameSequence};

/// Preview scheduler: Stopped → play → Playing → stop → Stopped.
///
/// The cadence itself lives in the host event loop (a GUI timer, a test
/// loop); this type owns the state machine. The host arms a timer at
/// [`Playback::tick_interval`] and calls [`Playback::tick`] on each firing.
/// Every returned bitmap is an independent copy to load straight into the
/// surface, bypassing commit and history, so playback can never mutate
/// committed frame content or push undo entries. Each tick is a complete,
/// self-contained frame load; stopping at a tick boundary needs no
/// reconciliation.
#[derive(Clone, Debug, Default)]
pub struct Playback {
    state: State,
}

#[derive(Clone, Debug, Default)]
enum State {
    #[default]
    Stopped,
    Playing {
        /// Selection to restore when playback stops.
        resume_index: usize,
        playback_index: usize,
    },
}

impl Playback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, State::Playing { .. })
    }

    /// Timer period for a given frame rate: 1000/fps milliseconds.
    pub fn tick_interval(fps: u32) -> Duration {
        Duration::from_millis(1000 / u64::from(fps.max(1)))
    }

    /// Enter Playing and return the first frame to show, `(index, bitmap)`.
    /// Silently refuses (returns `None`) when already playing or the
    /// sequence has no frames.
    pub fn play(&mut self, sequence: &FrameSequence) -> Option<(usize, Bitmap)> {
        if self.is_playing() || sequence.is_empty() {
            return None;
        }
        self.state = State::Playing {
            resume_index: sequence.current_index(),
            playback_index: 0,
        };
        Some((0, sequence.frame(0)?.clone()))
    }

    /// Advance one frame, wrapping at the end of the sequence. Returns the
    /// newly shown `(index, bitmap)`, or `None` when not playing.
    pub fn tick(&mut self, sequence: &FrameSequence) -> Option<(usize, Bitmap)> {
        let State::Playing { playback_index, .. } = &mut self.state else {
            return None;
        };
        *playback_index = (*playback_index + 1) % sequence.len().max(1);
        let index = *playback_index;
        Some((index, sequence.frame(index)?.clone()))
    }

    /// Cancel playback and return the originally selected frame to restore,
    /// `(index, bitmap)`. `None` when not playing.
    pub fn stop(&mut self, sequence: &FrameSequence) -> Option<(usize, Bitmap)> {
        let State::Playing { resume_index, .. } = self.state else {
            return None;
        };
        self.state = State::Stopped;
        let index = resume_index.min(sequence.len().saturating_sub(1));
        Some((index, sequence.frame(index)?.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Rgba8;

    fn shade(v: u8) -> Bitmap {
        Bitmap::new(4, 4, Rgba8::opaque(v, v, v)).unwrap()
    }

    fn three_frame_seq() -> FrameSequence {
        let mut seq = FrameSequence::new(4, 4, 12).unwrap();
        seq.commit_current(&shade(0));
        seq.add_frame(&shade(0)).unwrap();
        seq.commit_current(&shade(1));
        seq.add_frame(&shade(1)).unwrap();
        seq.commit_current(&shade(2));
        seq
    }

    #[test]
    fn play_shows_frame_zero_and_ticks_wrap() {
        let seq = three_frame_seq();
        let mut playback = Playback::new();

        let (index, frame) = playback.play(&seq).unwrap();
        assert_eq!(index, 0);
        assert_eq!(frame, shade(0));

        let shown: Vec<usize> = (0..6).map(|_| playback.tick(&seq).unwrap().0).collect();
        assert_eq!(shown, vec![1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn play_while_playing_is_refused() {
        let seq = three_frame_seq();
        let mut playback = Playback::new();
        assert!(playback.play(&seq).is_some());
        assert!(playback.play(&seq).is_none());
    }

    #[test]
    fn tick_and_stop_require_playing() {
        let seq = three_frame_seq();
        let mut playback = Playback::new();
        assert!(playback.tick(&seq).is_none());
        assert!(playback.stop(&seq).is_none());
    }

    #[test]
    fn stop_restores_the_selection_in_place_at_play_time() {
        let mut seq = three_frame_seq();
        seq.select(1, &shade(2)).unwrap();
        let mut playback = Playback::new();

        playback.play(&seq).unwrap();
        for _ in 0..7 {
            playback.tick(&seq).unwrap();
        }
        let (index, frame) = playback.stop(&seq).unwrap();
        assert_eq!(index, 1);
        assert_eq!(frame, shade(1));
        assert!(!playback.is_playing());
    }

    #[test]
    fn single_frame_sequence_just_re_shows_that_frame() {
        let seq = FrameSequence::new(4, 4, 12).unwrap();
        let mut playback = Playback::new();
        playback.play(&seq).unwrap();
        assert_eq!(playback.tick(&seq).unwrap().0, 0);
        assert_eq!(playback.tick(&seq).unwrap().0, 0);
    }

    #[test]
    fn tick_interval_is_1000_over_fps_millis() {
        assert_eq!(Playback::tick_interval(12), Duration::from_millis(83));
        assert_eq!(Playback::tick_interval(60), Duration::from_millis(16));
        assert_eq!(Playback::tick_interval(1), Duration::from_millis(1000));
    }
}
