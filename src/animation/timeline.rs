//! Playback clock
//!
//! The editor core only needs two facts from playback: the current frame and
//! whether the user is scrubbing (paused) or playing. [`AnimationClock`] is
//! that contract; [`Timeline`] is the default implementation driven by the
//! editor's tick.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Stop (and pause) on the last frame.
    Once,
    /// Wrap back to the start frame.
    #[default]
    Loop,
}

/// Source of the current frame for sampling and keyframe authoring.
pub trait AnimationClock {
    fn current_frame(&self) -> f32;

    fn is_paused(&self) -> bool;

    /// Integer frame that edits are keyed at.
    fn key_frame(&self) -> u32 {
        self.current_frame().max(0.0) as u32
    }
}

#[derive(Debug, Clone)]
pub struct Timeline {
    pub start_frame: f32,
    pub end_frame: f32,
    pub fps: f32,
    pub loop_mode: LoopMode,
    current_frame: f32,
    playing: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(0.0, 120.0, 30.0)
    }
}

impl Timeline {
    #[must_use]
    pub fn new(start_frame: f32, end_frame: f32, fps: f32) -> Self {
        Self {
            start_frame,
            end_frame: end_frame.max(start_frame),
            fps,
            loop_mode: LoopMode::default(),
            current_frame: start_frame,
            playing: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        if self.loop_mode == LoopMode::Once && self.current_frame >= self.end_frame {
            self.current_frame = self.start_frame;
        }
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Pauses and rewinds to the start frame.
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_frame = self.start_frame;
    }

    /// Jumps to `frame`, clamped to the timeline range.
    pub fn seek(&mut self, frame: f32) {
        self.current_frame = frame.clamp(self.start_frame, self.end_frame);
    }

    /// Advances playback by `dt` seconds.
    ///
    /// Returns `true` if the current frame moved.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.playing {
            return false;
        }

        let previous = self.current_frame;
        self.current_frame += dt * self.fps;

        match self.loop_mode {
            LoopMode::Once => {
                if self.current_frame >= self.end_frame {
                    self.current_frame = self.end_frame;
                    self.playing = false;
                }
            }
            LoopMode::Loop => {
                let span = self.end_frame - self.start_frame;
                if span <= 0.0 {
                    self.current_frame = self.start_frame;
                } else if self.current_frame > self.end_frame {
                    self.current_frame =
                        self.start_frame + (self.current_frame - self.start_frame) % span;
                }
            }
        }

        self.current_frame != previous
    }
}

impl AnimationClock for Timeline {
    fn current_frame(&self) -> f32 {
        self.current_frame
    }

    fn is_paused(&self) -> bool {
        !self.playing
    }
}
