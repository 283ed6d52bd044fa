//! Host screen around the switch.
//!
//! The host listens to the switch's change callback and cross-fades its own
//! backdrop: white to black when the switch turns to night, black to white
//! when it returns to day.

use std::time::{Duration, Instant};

use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::anim::{Animation, Easing};
use crate::theme::Color;

pub struct Backdrop {
    anim: Animation<Color>,
    flash: Duration,
}

impl Backdrop {
    pub fn new(flash: Duration) -> Self {
        Backdrop { anim: Animation::Idle(Color::WHITE), flash }
    }

    /// React to a finished switch transition. The fade always runs between
    /// the two fixed endpoints, whatever the backdrop currently shows.
    pub fn on_change(&mut self, night: bool, now: Instant) {
        let (from, to) = if night {
            (Color::WHITE, Color::BLACK)
        } else {
            (Color::BLACK, Color::WHITE)
        };
        self.anim = Animation::start(from, to, now, self.flash, Easing::Linear);
    }

    pub fn color(&self, now: Instant) -> Color {
        self.anim.sample(now)
    }

    pub fn is_fading(&self, now: Instant) -> bool {
        !self.anim.is_finished(now)
    }
}

/// Lay a switch frame over a solid backdrop with `margin` pixels on each side.
pub fn compose(backdrop: Color, frame: &Pixmap, margin: u32) -> Option<Pixmap> {
    let mut out = Pixmap::new(frame.width() + margin * 2, frame.height() + margin * 2)?;
    out.fill(backdrop.to_skia());
    out.draw_pixmap(
        margin as i32,
        margin as i32,
        frame.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Some(out)
}

/// Window size for a switch with `margin` on every side, or `None` when it
/// does not fit the 16-bit X11 dimensions.
pub fn window_size(width: u16, height: u16, margin: u16) -> Option<(u16, u16)> {
    let border = margin.checked_mul(2)?;
    Some((width.checked_add(border)?, height.checked_add(border)?))
}
