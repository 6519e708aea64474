//! Reveal animation for newly positioned windows.
//!
//! A window fades in from opacity 0 in steps of 0.1 while sliding from an
//! initial offset toward its target; the offset decays by a factor of 0.7 on
//! every tick. Once opacity reaches 1 the window snaps onto the target.
//!
//! [`RevealTween`] is a pure state machine. The owner drives it from a
//! repeating timer and applies each [`TweenFrame`] to the native window, so
//! cancelling the animation is just stopping that timer.

use std::time::Duration;

use crate::geometry::Rect;

/// Number of ticks from fully transparent to fully opaque.
const OPACITY_STEPS: u32 = 10;

/// Per-tick decay of the positional offset.
const OFFSET_DECAY: f64 = 0.7;

/// Default tick interval.
pub const DEFAULT_TICK: Duration = Duration::from_millis(16);

/// Default starting offset (x, y).
pub const DEFAULT_OFFSET: (i32, i32) = (0, -50);

/// A single animation frame to apply to the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenFrame {
    /// Bounds for this frame. When the tween does not resize, only the
    /// position is meaningful.
    pub bounds: Rect,
    /// Opacity in `0.0..=1.0`.
    pub opacity: f32,
    /// Whether this is the final frame.
    pub finished: bool,
}

/// In-progress reveal animation.
#[derive(Debug, Clone)]
pub struct RevealTween {
    target: Rect,
    resize: bool,
    interval: Duration,
    step: u32,
    offset_x: f64,
    offset_y: f64,
}

impl RevealTween {
    /// Create a tween toward `target`, starting `offset` away from it.
    ///
    /// When `resize` is set each frame carries the full target size and the
    /// owner should apply full bounds; otherwise only the position moves.
    pub fn new(target: Rect, offset: (i32, i32), interval: Duration, resize: bool) -> Self {
        Self {
            target,
            resize,
            interval,
            step: 0,
            offset_x: f64::from(offset.0),
            offset_y: f64::from(offset.1),
        }
    }

    /// The final bounds.
    pub fn target(&self) -> Rect {
        self.target
    }

    /// The tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether frames should be applied as full bounds.
    pub fn resizes(&self) -> bool {
        self.resize
    }

    /// The frame to apply before the first tick.
    pub fn initial_frame(&self) -> TweenFrame {
        self.frame()
    }

    /// Advance one tick.
    pub fn tick(&mut self) -> TweenFrame {
        if self.step < OPACITY_STEPS {
            self.step += 1;
        }
        self.offset_x *= OFFSET_DECAY;
        self.offset_y *= OFFSET_DECAY;
        if self.is_finished() {
            crate::shell_trace!(bounds = ?self.target, "reveal finished");
        }
        self.frame()
    }

    /// Whether the tween has reached its target.
    pub fn is_finished(&self) -> bool {
        self.step >= OPACITY_STEPS
    }

    fn frame(&self) -> TweenFrame {
        if self.is_finished() {
            return TweenFrame {
                bounds: self.target,
                opacity: 1.0,
                finished: true,
            };
        }
        TweenFrame {
            bounds: self
                .target
                .translated(self.offset_x.round() as i32, self.offset_y.round() as i32),
            opacity: self.step as f32 / OPACITY_STEPS as f32,
            finished: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_frame_is_transparent_and_offset() {
        let tween = RevealTween::new(Rect::new(100, 100, 50, 50), DEFAULT_OFFSET, DEFAULT_TICK, false);
        let frame = tween.initial_frame();
        assert_eq!(frame.opacity, 0.0);
        assert_eq!(frame.bounds, Rect::new(100, 50, 50, 50));
        assert!(!frame.finished);
    }

    #[test]
    fn test_offset_decays_each_tick() {
        let mut tween = RevealTween::new(Rect::new(0, 100, 10, 10), (0, -100), DEFAULT_TICK, false);
        let frame = tween.tick();
        // -100 * 0.7 = -70
        assert_eq!(frame.bounds.y, 30);
        assert!((frame.opacity - 0.1).abs() < f32::EPSILON);
        let frame = tween.tick();
        // -70 * 0.7 = -49
        assert_eq!(frame.bounds.y, 51);
    }

    #[test]
    fn test_finishes_after_ten_ticks_on_target() {
        let target = Rect::new(10, 20, 30, 40);
        let mut tween = RevealTween::new(target, (5, -50), DEFAULT_TICK, true);
        let mut last = tween.initial_frame();
        for _ in 0..10 {
            last = tween.tick();
        }
        assert!(last.finished);
        assert_eq!(last.bounds, target);
        assert_eq!(last.opacity, 1.0);
        assert!(tween.is_finished());
        assert!(tween.resizes());
    }

    #[test]
    fn test_ninth_tick_is_not_finished() {
        let mut tween = RevealTween::new(Rect::new(0, 0, 1, 1), DEFAULT_OFFSET, DEFAULT_TICK, false);
        for _ in 0..9 {
            assert!(!tween.tick().finished);
        }
    }
}
