//! Switch state and tap-driven transitions.
//!
//! `SwitchView` owns the toggle state and the four animated scene properties.
//! Every property assignment goes through a setter that marks the view dirty;
//! the host paints whenever `take_dirty` reports a pending redraw.

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::anim::{Animation, Easing};
use crate::geometry::SceneMetrics;
use crate::theme::{self, Color};

pub type ChangeCallback = Box<dyn FnMut(bool)>;

/// Durations and tap policy for transitions.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub duration: Duration,
    pub color_duration: Duration,
    /// Ignore taps while a transition is still running.
    pub guard_retap: bool,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            duration: Duration::from_millis(500),
            color_duration: Duration::from_millis(500),
            guard_retap: false,
        }
    }
}

/// The four animations started by one tap.
#[derive(Debug)]
struct Transition {
    sun: Animation<f32>,
    stars: Animation<f32>,
    clouds: Animation<f32>,
    color: Animation<Color>,
    /// Toggle state right after the tap that started this transition.
    new_state: bool,
    /// View size the targets were computed for.
    size: (f32, f32),
}

impl Transition {
    fn is_finished(&self, now: Instant) -> bool {
        self.sun.is_finished(now)
            && self.stars.is_finished(now)
            && self.clouds.is_finished(now)
            && self.color.is_finished(now)
    }
}

pub struct SwitchView {
    size: Option<(f32, f32)>,
    selected: bool,
    sun_offset: f32,
    stars_offset: f32,
    clouds_offset: f32,
    surface_color: Color,
    timing: Timing,
    transitions: Vec<Transition>,
    change_callback: ChangeCallback,
    dirty: bool,
    redraw_requests: u64,
}

impl SwitchView {
    pub fn new(timing: Timing) -> Self {
        SwitchView {
            size: None,
            selected: false,
            sun_offset: 0.0,
            stars_offset: 0.0,
            clouds_offset: 0.0,
            surface_color: theme::DAY_SURFACE,
            timing,
            transitions: Vec::new(),
            change_callback: Box::new(|_| {}),
            dirty: true,
            redraw_requests: 0,
        }
    }

    pub fn set_change_callback(&mut self, callback: ChangeCallback) {
        self.change_callback = callback;
    }

    /// Record the laid-out size. While idle, the scene snaps to the resting
    /// layout of the current state for that size; otherwise it snaps once the
    /// last transition in flight has finished.
    pub fn resize(&mut self, width: f32, height: f32) {
        if self.size == Some((width, height)) {
            return;
        }
        debug!("switch resized to {width}x{height}");
        self.size = Some((width, height));
        if self.transitions.is_empty() {
            let (sun, stars, clouds) = SceneMetrics::new(width, height).resting_offsets(self.selected);
            self.set_sun_offset(sun);
            self.set_stars_offset(stars);
            self.set_clouds_offset(clouds);
        } else {
            self.invalidate();
        }
    }

    /// Tap anywhere on the switch. Returns whether a transition started.
    pub fn tap(&mut self, now: Instant) -> bool {
        let Some((width, height)) = self.size else {
            warn!("tap before the switch was laid out; ignoring");
            return false;
        };
        if self.timing.guard_retap && self.is_animating() {
            debug!("tap ignored, transition in flight");
            return false;
        }

        let target = !self.selected;
        let metrics = SceneMetrics::new(width, height);
        let (sun, stars, clouds) = metrics.resting_offsets(target);
        let Timing { duration, color_duration, .. } = self.timing;

        self.transitions.push(Transition {
            sun: Animation::start(self.sun_offset, sun, now, duration, Easing::FastOutSlowIn),
            stars: Animation::start(self.stars_offset, stars, now, duration, Easing::Linear),
            clouds: Animation::start(self.clouds_offset, clouds, now, duration, Easing::Linear),
            color: Animation::start(
                self.surface_color,
                theme::surface_for(target),
                now,
                color_duration,
                Easing::Linear,
            ),
            new_state: target,
            size: (width, height),
        });
        self.selected = target;
        debug!("toggled to {}", if target { "night" } else { "day" });
        true
    }

    /// Tap at view-local coordinates; only hits inside the pill count.
    pub fn tap_at(&mut self, x: f32, y: f32, now: Instant) -> bool {
        if !self.hit_test(x, y) {
            return false;
        }
        self.tap(now)
    }

    pub fn hit_test(&self, x: f32, y: f32) -> bool {
        let Some((w, h)) = self.size else {
            return false;
        };
        if x < 0.0 || y < 0.0 || x > w || y > h {
            return false;
        }
        let r = (h / 2.0).min(w / 2.0);
        let cx = x.clamp(r, w - r);
        let cy = y.clamp(r, h - r);
        let (dx, dy) = (x - cx, y - cy);
        dx * dx + dy * dy <= r * r
    }

    /// Advance every in-flight transition to `now`.
    pub fn tick(&mut self, now: Instant) {
        if self.transitions.is_empty() {
            return;
        }

        // The newest transition overrides every older one on the same tick.
        if let Some(t) = self.transitions.last() {
            let (sun, stars, clouds, color) =
                (t.sun.sample(now), t.stars.sample(now), t.clouds.sample(now), t.color.sample(now));
            self.set_sun_offset(sun);
            self.set_stars_offset(stars);
            self.set_clouds_offset(clouds);
            self.set_surface_color(color);
        }

        let mut finished = Vec::new();
        let mut stale_size = false;
        let current = self.size;
        self.transitions.retain(|t| {
            if t.is_finished(now) {
                finished.push(t.new_state);
                stale_size |= Some(t.size) != current;
                false
            } else {
                true
            }
        });

        // Resized mid-flight: land on the resting layout of the current size.
        if stale_size && self.transitions.is_empty() {
            if let Some((width, height)) = self.size {
                let (sun, stars, clouds) = SceneMetrics::new(width, height).resting_offsets(self.selected);
                debug!("transition ended after a resize, snapping to {width}x{height} layout");
                self.set_sun_offset(sun);
                self.set_stars_offset(stars);
                self.set_clouds_offset(clouds);
            }
        }

        for state in finished {
            (self.change_callback)(state);
        }
    }

    pub fn is_animating(&self) -> bool {
        !self.transitions.is_empty()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn size(&self) -> Option<(f32, f32)> {
        self.size
    }

    pub fn sun_offset(&self) -> f32 {
        self.sun_offset
    }

    pub fn stars_offset(&self) -> f32 {
        self.stars_offset
    }

    pub fn clouds_offset(&self) -> f32 {
        self.clouds_offset
    }

    pub fn surface_color(&self) -> Color {
        self.surface_color
    }

    pub fn redraw_requests(&self) -> u64 {
        self.redraw_requests
    }

    /// Returns whether a redraw was requested since the last call, and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn set_sun_offset(&mut self, value: f32) {
        self.sun_offset = value;
        self.invalidate();
    }

    fn set_stars_offset(&mut self, value: f32) {
        self.stars_offset = value;
        self.invalidate();
    }

    fn set_clouds_offset(&mut self, value: f32) {
        self.clouds_offset = value;
        self.invalidate();
    }

    fn set_surface_color(&mut self, value: Color) {
        self.surface_color = value;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.dirty = true;
        self.redraw_requests += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn laid_out(timing: Timing) -> SwitchView {
        let mut view = SwitchView::new(timing);
        view.resize(300.0, 120.0);
        view
    }

    fn recorder(view: &mut SwitchView) -> Rc<RefCell<Vec<bool>>> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        view.set_change_callback(Box::new(move |state| sink.borrow_mut().push(state)));
        calls
    }

    #[test]
    fn resize_snaps_to_day_layout() {
        let view = laid_out(Timing::default());
        assert!(!view.is_selected());
        assert_eq!(view.sun_offset(), 0.0);
        assert_eq!(view.stars_offset(), 120.0);
        assert_eq!(view.clouds_offset(), 0.0);
        assert_eq!(view.surface_color(), theme::DAY_SURFACE);
    }

    #[test]
    fn day_to_night_settles_on_night_targets() {
        let mut view = laid_out(Timing::default());
        let t0 = Instant::now();
        assert!(view.tap(t0));
        // State flips at tap time, before any frame.
        assert!(view.is_selected());
        assert_eq!(view.sun_offset(), 0.0);

        view.tick(t0 + ms(500));
        assert!(!view.is_animating());
        assert!((view.sun_offset() - 168.0).abs() < 1e-3);
        assert_eq!(view.stars_offset(), 0.0);
        assert_eq!(view.clouds_offset(), 120.0);
        assert_eq!(view.surface_color(), theme::NIGHT_SURFACE);
    }

    #[test]
    fn midway_values_follow_their_curves() {
        let mut view = laid_out(Timing::default());
        let t0 = Instant::now();
        view.tap(t0);
        view.tick(t0 + ms(250));

        assert!((view.stars_offset() - 60.0).abs() < 0.01);
        assert!((view.clouds_offset() - 60.0).abs() < 0.01);
        assert_eq!(view.surface_color(), Color::rgb(40, 73, 115));
        // Eased: well past the linear midpoint of 84.
        assert!(view.sun_offset() > 100.0 && view.sun_offset() < 168.0);
        assert!(view.is_animating());
    }

    #[test]
    fn callback_fires_once_with_post_tap_state() {
        let mut view = laid_out(Timing::default());
        let calls = recorder(&mut view);
        let t0 = Instant::now();

        view.tap(t0);
        view.tick(t0 + ms(100));
        assert!(calls.borrow().is_empty());
        view.tick(t0 + ms(600));
        view.tick(t0 + ms(700));
        assert_eq!(*calls.borrow(), vec![true]);

        let t1 = t0 + ms(1000);
        view.tap(t1);
        view.tick(t1 + ms(500));
        assert_eq!(*calls.borrow(), vec![true, false]);
    }

    #[test]
    fn round_trip_restores_day_values() {
        let mut view = laid_out(Timing::default());
        let t0 = Instant::now();
        let day = (view.sun_offset(), view.stars_offset(), view.clouds_offset(), view.surface_color());

        view.tap(t0);
        view.tick(t0 + ms(500));
        let t1 = t0 + ms(800);
        view.tap(t1);
        view.tick(t1 + ms(500));

        assert!(!view.is_selected());
        assert_eq!(
            (view.sun_offset(), view.stars_offset(), view.clouds_offset(), view.surface_color()),
            day
        );
    }

    #[test]
    fn overlapping_taps_layer_transitions() {
        let mut view = laid_out(Timing::default());
        let calls = recorder(&mut view);
        let t0 = Instant::now();

        view.tap(t0);
        view.tick(t0 + ms(200));
        let mid_sun = view.sun_offset();
        assert!(mid_sun > 0.0);

        let t1 = t0 + ms(200);
        assert!(view.tap(t1));
        assert!(!view.is_selected());

        // The newer transition starts from the mid-flight value and wins each tick.
        view.tick(t1);
        assert_eq!(view.sun_offset(), mid_sun);

        view.tick(t0 + ms(500));
        assert_eq!(*calls.borrow(), vec![true]);
        assert!(view.is_animating());

        view.tick(t1 + ms(500));
        assert_eq!(*calls.borrow(), vec![true, false]);
        assert_eq!(view.sun_offset(), 0.0);
        assert_eq!(view.stars_offset(), 120.0);
        assert_eq!(view.surface_color(), theme::DAY_SURFACE);
    }

    #[test]
    fn guard_ignores_taps_while_animating() {
        let mut view = laid_out(Timing { guard_retap: true, ..Timing::default() });
        let t0 = Instant::now();
        assert!(view.tap(t0));
        assert!(!view.tap(t0 + ms(100)));
        assert!(view.is_selected());
        view.tick(t0 + ms(500));
        assert!(view.tap(t0 + ms(600)));
        assert!(!view.is_selected());
    }

    #[test]
    fn tap_without_size_is_ignored() {
        let mut view = SwitchView::new(Timing::default());
        assert!(!view.tap(Instant::now()));
        assert!(!view.is_selected());
    }

    #[test]
    fn every_assignment_requests_a_redraw() {
        let mut view = laid_out(Timing::default());
        assert!(view.take_dirty());
        assert!(!view.take_dirty());

        let before = view.redraw_requests();
        let t0 = Instant::now();
        view.tap(t0);
        view.tick(t0 + ms(16));
        assert_eq!(view.redraw_requests(), before + 4);
        assert!(view.take_dirty());

        // Idle ticks change nothing.
        view.tick(t0 + ms(600));
        let settled = view.redraw_requests();
        view.tick(t0 + ms(700));
        assert_eq!(view.redraw_requests(), settled);
    }

    #[test]
    fn hit_test_respects_rounded_ends() {
        let view = laid_out(Timing::default());
        assert!(view.hit_test(150.0, 60.0));
        assert!(view.hit_test(2.0, 60.0));
        assert!(!view.hit_test(2.0, 2.0));
        assert!(!view.hit_test(-1.0, 60.0));
        assert!(!view.hit_test(150.0, 121.0));
    }

    #[test]
    fn tap_at_outside_does_nothing() {
        let mut view = laid_out(Timing::default());
        assert!(!view.tap_at(299.0, 1.0, Instant::now()));
        assert!(!view.is_selected());
        assert!(view.tap_at(150.0, 60.0, Instant::now()));
    }

    #[test]
    fn resize_at_night_uses_new_width() {
        let mut view = laid_out(Timing::default());
        let t0 = Instant::now();
        view.tap(t0);
        view.tick(t0 + ms(500));
        view.resize(600.0, 120.0);
        assert!((view.sun_offset() - 468.0).abs() < 1e-3);
        assert_eq!(view.clouds_offset(), 120.0);
    }

    #[test]
    fn resize_mid_flight_settles_on_new_layout() {
        let mut view = laid_out(Timing::default());
        let calls = recorder(&mut view);
        let t0 = Instant::now();
        view.tap(t0);
        view.tick(t0 + ms(100));
        view.resize(600.0, 240.0);

        view.tick(t0 + ms(600));
        assert!(!view.is_animating());
        assert!((view.sun_offset() - 336.0).abs() < 1e-3);
        assert_eq!(view.stars_offset(), 0.0);
        assert_eq!(view.clouds_offset(), 240.0);
        assert_eq!(view.surface_color(), theme::NIGHT_SURFACE);
        assert_eq!(*calls.borrow(), vec![true]);
    }

    #[test]
    fn overlapping_transitions_write_each_property_once_per_tick() {
        let mut view = laid_out(Timing::default());
        let t0 = Instant::now();
        view.tap(t0);
        view.tap(t0 + ms(100));

        let before = view.redraw_requests();
        view.tick(t0 + ms(200));
        assert_eq!(view.redraw_requests(), before + 4);
    }
}
