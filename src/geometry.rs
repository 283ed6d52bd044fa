//! Size-derived scene layout.
//!
//! Everything here is a pure function of the view size; only the animated
//! offsets change between frames.

/// A circle as `(cx, cy, radius)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

impl Circle {
    fn new(cx: f32, cy: f32, radius: f32) -> Self {
        Circle { cx, cy, radius }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarSize {
    Large,
    Medium,
    Small,
}

/// One star sprite at its untranslated position (top-left corner).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarPlacement {
    pub size: StarSize,
    pub x: f32,
    pub y: f32,
}

// Vertical steps of the cloud staircase, in units of `H / 9.5`.
const CLOUD_STEPS: [f32; 6] = [0.0, 1.0, 2.0, 1.8, 3.0, 5.0];

/// Alpha of the three ambient rings around the disc.
pub const RING_ALPHA: u8 = 73; // round(255 / 3.5)
/// Alpha of the far cloud layer.
pub const FAR_CLOUD_ALPHA: u8 = 127; // 255 / 2

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMetrics {
    pub width: f32,
    pub height: f32,
    pub disc_radius: f32,
    pub spacing: f32,
    pub cloud_radius: f32,
    pub star_spacing: f32,
}

impl SceneMetrics {
    pub fn new(width: f32, height: f32) -> Self {
        let disc_radius = height / 2.5;
        SceneMetrics {
            width,
            height,
            disc_radius,
            spacing: (height - disc_radius) / 4.0,
            cloud_radius: width / 6.0,
            star_spacing: width / 14.0,
        }
    }

    pub fn disc_width(&self) -> f32 {
        self.disc_radius * 2.0
    }

    /// Sun/moon offset at the right (night) resting slot.
    pub fn night_offset(&self) -> f32 {
        self.width - self.disc_width() - self.spacing * 2.0
    }

    pub fn disc_center(&self, sun_offset: f32) -> (f32, f32) {
        (sun_offset + self.disc_radius + self.spacing, self.height / 2.0)
    }

    pub fn moon_center(&self) -> (f32, f32) {
        self.disc_center(self.night_offset())
    }

    pub fn clip_radius(&self) -> f32 {
        self.height / 2.0
    }

    pub fn ring_radii(&self) -> [f32; 3] {
        let base = self.disc_radius / 1.5;
        [1.0, 2.0, 3.0].map(|k| base + k * self.disc_radius)
    }

    /// Craters relative to the moon's resting center.
    pub fn craters(&self) -> [Circle; 3] {
        let (mx, my) = self.moon_center();
        let bx = mx - self.disc_radius / 2.0;
        let s = self.disc_radius / 2.8;
        [
            Circle::new(bx, my + s * 0.2, s),
            Circle::new(bx + s * 1.8, my - s * 1.5, s / 1.5),
            Circle::new(bx + s * 2.5, my + s, s / 1.5),
        ]
    }

    /// Six overlapping circles climbing from the bottom-left, untranslated.
    pub fn cloud_circles(&self) -> [Circle; 6] {
        let r = self.cloud_radius;
        let x0 = r + self.spacing;
        let step = self.height / 9.5;
        let y0 = self.height + r - step;
        let mut out = [Circle::new(0.0, 0.0, r); 6];
        for (k, (circle, m)) in out.iter_mut().zip(CLOUD_STEPS).enumerate() {
            circle.cx = x0 + k as f32 * r;
            circle.cy = y0 - m * step;
        }
        out
    }

    /// Square sprite side for each star size, never below one pixel.
    pub fn star_sprite_px(&self, size: StarSize) -> u32 {
        let large = (self.height as u32 / 4).max(1);
        match size {
            StarSize::Large => large,
            StarSize::Medium => (large / 2).max(1),
            StarSize::Small => (large / 3).max(1),
        }
    }

    pub fn star_placements(&self) -> [StarPlacement; 7] {
        let s = self.star_spacing;
        let at = |size, x, y| StarPlacement { size, x, y };
        [
            at(StarSize::Medium, s, s),
            at(StarSize::Large, s * 3.0, s / 2.0),
            at(StarSize::Small, s * 5.0, s),
            at(StarSize::Large, s * 5.0, s * 2.0),
            at(StarSize::Large, s * 1.8, s * 3.0),
            at(StarSize::Small, s / 1.5, s * 4.0),
            at(StarSize::Small, s * 3.0, s * 5.0),
        ]
    }

    /// Resting values `(sun, stars, clouds)` for a toggle state.
    pub fn resting_offsets(&self, night: bool) -> (f32, f32, f32) {
        if night {
            (self.night_offset(), 0.0, self.height)
        } else {
            (0.0, self.height, 0.0)
        }
    }
}
