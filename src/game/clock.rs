//! Host frame clock
//!
//! Accumulates the deltas the host passes to each tick into a millisecond
//! timestamp for the AR session. Unlike the world clock it keeps running
//! while the game is paused, so camera tracking continues.

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameClock {
    elapsed_ms: f64,
    frames: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt` seconds and return the new timestamp in ms
    ///
    /// Negative or non-finite deltas count as a zero-length frame.
    pub fn tick(&mut self, dt: f32) -> f64 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed_ms += f64::from(dt) * 1000.0;
        }
        self.frames += 1;
        self.elapsed_ms
    }

    #[inline]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
