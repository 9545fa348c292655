//! Frame timing.
//!
//! [`Time`] is a world resource advanced once per frame by
//! [`Game::step`](crate::game::Game::step). It is driven by the raw delta the
//! host loop hands in rather than by a wall clock, so a headless run is
//! deterministic.

use std::time::Duration;

/// Frame timing resource.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// Scaled duration of the current frame.
    delta: Duration,
    /// Sum of all scaled deltas so far.
    elapsed: Duration,
    frame_count: u64,
    /// Multiplier applied to every raw delta (slow motion, pause at 0.0).
    time_scale: f32,
}

impl Time {
    pub fn new(time_scale: f32) -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            time_scale: sanitize_scale(time_scale),
        }
    }

    /// Start a new frame that lasted `raw_delta` on the host clock.
    pub fn advance(&mut self, raw_delta: Duration) {
        self.delta = if self.time_scale == 1.0 {
            raw_delta
        } else {
            let secs = raw_delta.as_secs_f64() * f64::from(self.time_scale);
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
        };
        self.elapsed = self.elapsed.saturating_add(self.delta);
        self.frame_count += 1;
    }

    /// Scaled duration of the current frame.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Frames advanced so far. The first frame is frame 1.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Takes effect from the next `advance`.
    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = sanitize_scale(time_scale);
    }
}

/// Negative, NaN and infinite scales pause the clock.
fn sanitize_scale(time_scale: f32) -> f32 {
    if time_scale.is_finite() && time_scale >= 0.0 {
        time_scale
    } else {
        log::warn!("time_scale {time_scale} is not finite and non-negative, pausing");
        0.0
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates() {
        let mut time = Time::default();
        time.advance(Duration::from_millis(16));
        time.advance(Duration::from_millis(16));
        assert_eq!(time.frame_count(), 2);
        assert_eq!(time.delta(), Duration::from_millis(16));
        assert_eq!(time.elapsed(), Duration::from_millis(32));
    }

    #[test]
    fn time_scale_stretches_delta() {
        let mut time = Time::new(0.5);
        time.advance(Duration::from_millis(20));
        assert!((time.delta_secs() - 0.010).abs() < 1e-6);

        time.set_time_scale(0.0);
        time.advance(Duration::from_millis(20));
        assert_eq!(time.delta(), Duration::ZERO);
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn negative_scale_clamps_to_pause() {
        let mut time = Time::default();
        time.set_time_scale(-2.0);
        assert_eq!(time.time_scale(), 0.0);
    }

    #[test]
    fn non_finite_scale_pauses_instead_of_panicking() {
        let mut time = Time::new(f32::INFINITY);
        assert_eq!(time.time_scale(), 0.0);
        time.advance(Duration::from_millis(16));
        assert_eq!(time.delta(), Duration::ZERO);

        time.set_time_scale(f32::NAN);
        assert_eq!(time.time_scale(), 0.0);
    }

    #[test]
    fn huge_scale_saturates() {
        let mut time = Time::new(f32::MAX);
        time.advance(Duration::from_secs(1));
        time.advance(Duration::from_secs(1));
        assert_eq!(time.delta(), Duration::MAX);
        assert_eq!(time.elapsed(), Duration::MAX);
    }
}
