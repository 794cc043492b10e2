//! Opacity fade between fully visible and fully hidden.
//!
//! The animation is an explicit timed tween (start value, end value,
//! duration, start instant) evaluated from elapsed time, rather than a
//! toolkit-bound property binding. The controller has exactly two targets
//! and no queue: a trigger while an interpolation is in flight restarts it
//! from whatever the opacity is at trigger time.

use std::time::{Duration, Instant};

/// The two resting states of the bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    /// Opacity the bar trends toward in this state.
    pub fn target_opacity(self) -> f32 {
        match self {
            Visibility::Visible => 1.0,
            Visibility::Hidden => 0.0,
        }
    }
}

/// Two-endpoint interpolation over a fixed duration.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    start: f32,
    end: f32,
    duration: Duration,
    started_at: Instant,
}

impl Tween {
    pub fn new(start: f32, end: f32, duration: Duration, started_at: Instant) -> Self {
        Self {
            start,
            end,
            duration,
            started_at,
        }
    }

    /// Interpolated value at `now`, clamped to the endpoint once elapsed
    /// time meets the duration.
    pub fn value_at(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return self.end;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        if elapsed >= self.duration {
            return self.end;
        }
        let t = elapsed.as_secs_f32() / self.duration.as_secs_f32();
        self.start + (self.end - self.start) * t
    }

    pub fn finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }
}

/// Drives the bar's opacity toward the current visibility target.
pub struct FadeController {
    opacity: f32,
    target: Visibility,
    tween: Option<Tween>,
    duration: Duration,
}

impl FadeController {
    /// The bar starts fully visible and at rest.
    pub fn new(duration: Duration) -> Self {
        Self {
            opacity: 1.0,
            target: Visibility::Visible,
            tween: None,
            duration,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn target(&self) -> Visibility {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    /// Trigger a transition toward `target`.
    ///
    /// A no-op when the opacity already rests at the target extreme.
    /// Otherwise (re)starts the interpolation from the current opacity,
    /// discarding any tween in flight.
    pub fn set_target(&mut self, target: Visibility, now: Instant) {
        self.target = target;
        let end = target.target_opacity();
        if (self.opacity - end).abs() < f32::EPSILON {
            self.tween = None;
            return;
        }
        self.tween = Some(Tween::new(self.opacity, end, self.duration, now));
    }

    /// Advance the animation and return the current opacity.
    pub fn tick(&mut self, now: Instant) -> f32 {
        if let Some(tween) = self.tween {
            self.opacity = tween.value_at(now);
            if tween.finished(now) {
                self.tween = None;
            }
        }
        self.opacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE: Duration = Duration::from_millis(500);

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn visible_trigger_at_full_opacity_is_a_noop() {
        let mut fade = FadeController::new(FADE);
        fade.set_target(Visibility::Visible, Instant::now());
        assert!(!fade.is_animating());
        assert!(approx(fade.opacity(), 1.0));
    }

    #[test]
    fn hidden_trigger_at_zero_opacity_is_a_noop() {
        let mut fade = FadeController::new(FADE);
        let t0 = Instant::now();
        fade.set_target(Visibility::Hidden, t0);
        fade.tick(t0 + FADE);
        assert!(approx(fade.opacity(), 0.0));
        assert!(!fade.is_animating());

        // Re-trigger at the extreme: nothing scheduled
        fade.set_target(Visibility::Hidden, t0 + FADE);
        assert!(!fade.is_animating());
    }

    #[test]
    fn opposite_trigger_always_schedules_a_fade() {
        let mut fade = FadeController::new(FADE);
        let t0 = Instant::now();

        fade.set_target(Visibility::Hidden, t0);
        assert!(fade.is_animating());

        assert!(approx(fade.tick(t0 + Duration::from_millis(250)), 0.5));
        assert!(approx(fade.tick(t0 + FADE), 0.0));
        assert!(!fade.is_animating());
    }

    #[test]
    fn retrigger_mid_fade_restarts_from_current_opacity() {
        let mut fade = FadeController::new(FADE);
        let t0 = Instant::now();

        fade.set_target(Visibility::Hidden, t0);
        let mid = t0 + Duration::from_millis(250);
        assert!(approx(fade.tick(mid), 0.5));

        // Reverse while half-way: new tween runs 0.5 -> 1.0 over the full duration
        fade.set_target(Visibility::Visible, mid);
        assert!(approx(fade.tick(mid + Duration::from_millis(250)), 0.75));
        assert!(approx(fade.tick(mid + FADE), 1.0));
        assert!(!fade.is_animating());
    }

    #[test]
    fn zero_duration_snaps_to_target() {
        let mut fade = FadeController::new(Duration::ZERO);
        let t0 = Instant::now();
        fade.set_target(Visibility::Hidden, t0);
        assert!(approx(fade.tick(t0), 0.0));
    }

    /// Watcher-driven sequence: fullscreen gained, held, then lost.
    #[test]
    fn watcher_sequence_reaches_both_extremes_within_the_fade_duration() {
        let mut fade = FadeController::new(FADE);
        let t0 = Instant::now();
        let watch = Duration::from_millis(1000);

        // Tick 1: fullscreen window in front
        fade.set_target(Visibility::Hidden, t0);
        assert!(approx(fade.tick(t0 + FADE), 0.0));

        // Tick 2: still fullscreen, bar already hidden
        fade.set_target(Visibility::Hidden, t0 + watch);
        assert!(!fade.is_animating());

        // Tick 3: focus moved to a normal window
        fade.set_target(Visibility::Visible, t0 + 2 * watch);
        assert!(approx(fade.tick(t0 + 2 * watch + FADE), 1.0));
    }
}
