//! Scene renderer for the day/night switch.
//!
//! Paints one frame from the current `SwitchView` values into a tiny-skia
//! pixmap. Everything that depends only on the view size (pill clip, cloud
//! path, star sprites) is built once per size and reused across frames.

use log::debug;
use tiny_skia::*;

use crate::geometry::{Circle, SceneMetrics, FAR_CLOUD_ALPHA, RING_ALPHA};
use crate::stars::{StarIcon, StarSprites};
use crate::switch::SwitchView;
use crate::theme::{self, Color as Argb};

// Drop shadow under the disc: x offset, y offset, growth, opacity
const DISC_SHADOW_LAYERS: [(f32, f32, f32, u8); 3] = [
    (20.0, 10.0, 10.0, 18), // ambient
    (20.0, 10.0, 5.0, 26),  // medium
    (20.0, 10.0, 0.0, 36),  // tight
];

/// Immutable per-layer paint description.
#[derive(Debug, Clone, Copy)]
struct LayerStyle {
    color: Argb,
    alpha: u8,
}

impl LayerStyle {
    const fn new(color: Argb, alpha: u8) -> Self {
        LayerStyle { color, alpha }
    }

    fn color(self) -> Argb {
        self.color.with_alpha(self.alpha)
    }
}

const RINGS: LayerStyle = LayerStyle::new(theme::HAZE, RING_ALPHA);
const FAR_CLOUDS: LayerStyle = LayerStyle::new(theme::HAZE, FAR_CLOUD_ALPHA);
const NEAR_CLOUDS: LayerStyle = LayerStyle::new(theme::HAZE, 255);
const SUN: LayerStyle = LayerStyle::new(theme::SUN, 255);
const MOON: LayerStyle = LayerStyle::new(theme::MOON, 255);
const CRATERS: LayerStyle = LayerStyle::new(theme::CRATER, 255);

/// Size-derived state, valid for exactly one `(width, height)`.
struct SceneCache {
    width: f32,
    height: f32,
    metrics: SceneMetrics,
    clip: Mask,
    clouds: Path,
    stars: StarSprites,
}

pub struct SwitchRenderer {
    icon: StarIcon,
    cache: Option<SceneCache>,
    geometry_builds: u32,
}

impl SwitchRenderer {
    pub fn new(icon: StarIcon) -> Self {
        SwitchRenderer { icon, cache: None, geometry_builds: 0 }
    }

    /// How many times the size-derived caches have been built.
    pub fn geometry_builds(&self) -> u32 {
        self.geometry_builds
    }

    /// Build the clip, cloud path and star sprites unless they already exist
    /// for this exact size.
    pub fn ensure_geometry(&mut self, width: f32, height: f32) -> Result<(), String> {
        if let Some(cache) = &self.cache {
            if cache.width == width && cache.height == height {
                return Ok(());
            }
        }

        let (pw, ph) = pixel_size(width, height);
        let metrics = SceneMetrics::new(width, height);

        let mut clip = Mask::new(pw, ph).ok_or_else(|| format!("invalid view size {width}x{height}"))?;
        let pill = rounded_rect_path(0.0, 0.0, width, height, metrics.clip_radius())
            .ok_or_else(|| format!("invalid view size {width}x{height}"))?;
        clip.fill_path(&pill, FillRule::Winding, true, Transform::identity());

        let clouds = cloud_path(&metrics.cloud_circles()).ok_or("empty cloud path")?;
        let stars = StarSprites::rasterize(&self.icon, &metrics)?;

        self.cache = Some(SceneCache { width, height, metrics, clip, clouds, stars });
        self.geometry_builds += 1;
        debug!("scene geometry built for {width}x{height}");
        Ok(())
    }

    /// Paint one frame of the switch at its laid-out size.
    pub fn render(&mut self, view: &SwitchView) -> Result<Pixmap, String> {
        let (width, height) = view.size().ok_or("switch has not been laid out")?;
        self.ensure_geometry(width, height)?;
        let cache = self.cache.as_ref().ok_or("scene geometry missing")?;

        let (pw, ph) = pixel_size(width, height);
        let mut pixmap = Pixmap::new(pw, ph).ok_or_else(|| format!("invalid view size {width}x{height}"))?;

        draw_background(&mut pixmap, cache, view.surface_color());
        draw_rings(&mut pixmap, cache, view.sun_offset());
        draw_clouds(&mut pixmap, cache, view.clouds_offset(), true);
        draw_sun_and_moon(&mut pixmap, cache, view.sun_offset());
        draw_clouds(&mut pixmap, cache, view.clouds_offset(), false);
        draw_stars(&mut pixmap, cache, view.stars_offset());

        Ok(pixmap)
    }
}

fn pixel_size(width: f32, height: f32) -> (u32, u32) {
    (width.max(0.0).ceil() as u32, height.max(0.0).ceil() as u32)
}

// ── Layers ──────────────────────────────────────────────────

fn draw_background(pixmap: &mut Pixmap, cache: &SceneCache, color: Argb) {
    if let Some(rect) = Rect::from_xywh(0.0, 0.0, cache.width, cache.height) {
        pixmap.fill_rect(rect, &solid(color), Transform::identity(), Some(&cache.clip));
    }
}

fn draw_rings(pixmap: &mut Pixmap, cache: &SceneCache, sun_offset: f32) {
    let (cx, cy) = cache.metrics.disc_center(sun_offset);
    for radius in cache.metrics.ring_radii() {
        draw_circle(pixmap, cx, cy, radius, RINGS.color(), Some(&cache.clip));
    }
}

fn draw_clouds(pixmap: &mut Pixmap, cache: &SceneCache, clouds_offset: f32, far: bool) {
    let (style, lift) = if far {
        (FAR_CLOUDS, cache.metrics.cloud_radius / 2.0)
    } else {
        (NEAR_CLOUDS, 0.0)
    };
    pixmap.fill_path(
        &cache.clouds,
        &solid(style.color()),
        FillRule::Winding,
        Transform::from_translate(0.0, clouds_offset - lift),
        Some(&cache.clip),
    );
}

fn draw_sun_and_moon(pixmap: &mut Pixmap, cache: &SceneCache, sun_offset: f32) {
    let metrics = &cache.metrics;
    let radius = metrics.disc_radius;
    let (cx, cy) = metrics.disc_center(sun_offset);

    for &(dx, dy, grow, alpha) in &DISC_SHADOW_LAYERS {
        draw_circle(pixmap, cx + dx, cy + dy, radius + grow, theme::DISC_SHADOW.with_alpha(alpha), Some(&cache.clip));
    }

    // Both bodies are painted through the current disc, so the moon slides in
    // from the right edge as the disc travels.
    let Some(disc) = circle_path(cx, cy, radius) else { return };
    let mut disc_clip = cache.clip.clone();
    disc_clip.intersect_path(&disc, FillRule::Winding, true, Transform::identity());

    draw_circle(pixmap, cx, cy, radius, SUN.color(), Some(&disc_clip));

    let (mx, my) = metrics.moon_center();
    draw_circle(pixmap, mx, my, radius, MOON.color(), Some(&disc_clip));
    for Circle { cx, cy, radius } in metrics.craters() {
        draw_circle(pixmap, cx, cy, radius, CRATERS.color(), Some(&disc_clip));
    }
}

fn draw_stars(pixmap: &mut Pixmap, cache: &SceneCache, stars_offset: f32) {
    let spacing = cache.metrics.star_spacing;
    let paint = PixmapPaint::default();
    for star in cache.metrics.star_placements() {
        let sprite = cache.stars.get(star.size);
        let transform = Transform::from_translate(star.x + spacing, star.y - stars_offset);
        pixmap.draw_pixmap(0, 0, sprite.as_ref(), &paint, transform, Some(&cache.clip));
    }
}

// ── Shared drawing helpers ──────────────────────────────────

fn solid(c: Argb) -> Paint<'static> {
    Paint {
        shader: Shader::SolidColor(c.to_skia()),
        anti_alias: true,
        ..Paint::default()
    }
}

fn rounded_rect_path(x: f32, y: f32, w: f32, h: f32, radius: f32) -> Option<Path> {
    if w <= 0.0 || h <= 0.0 { return None; }
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    // Cubic corners so the pill ends are round
    let kr = KAPPA * r;
    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(x + w - r, y);
    pb.cubic_to(x + w - r + kr, y, x + w, y + r - kr, x + w, y + r);
    pb.line_to(x + w, y + h - r);
    pb.cubic_to(x + w, y + h - r + kr, x + w - r + kr, y + h, x + w - r, y + h);
    pb.line_to(x + r, y + h);
    pb.cubic_to(x + r - kr, y + h, x, y + h - r + kr, x, y + h - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - kr, x + r - kr, y, x + r, y);
    pb.close();
    pb.finish()
}

const KAPPA: f32 = 0.5522847498;

fn push_circle(pb: &mut PathBuilder, cx: f32, cy: f32, radius: f32) {
    let kr = KAPPA * radius;
    pb.move_to(cx, cy - radius);
    pb.cubic_to(cx + kr, cy - radius, cx + radius, cy - kr, cx + radius, cy);
    pb.cubic_to(cx + radius, cy + kr, cx + kr, cy + radius, cx, cy + radius);
    pb.cubic_to(cx - kr, cy + radius, cx - radius, cy + kr, cx - radius, cy);
    pb.cubic_to(cx - radius, cy - kr, cx - kr, cy - radius, cx, cy - radius);
    pb.close();
}

fn circle_path(cx: f32, cy: f32, radius: f32) -> Option<Path> {
    if radius <= 0.0 { return None; }
    let mut pb = PathBuilder::new();
    push_circle(&mut pb, cx, cy, radius);
    pb.finish()
}

/// Union of the cloud circles; all wind the same way so overlaps fill once.
fn cloud_path(circles: &[Circle]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for c in circles.iter().filter(|c| c.radius > 0.0) {
        push_circle(&mut pb, c.cx, c.cy, c.radius);
    }
    pb.finish()
}

fn draw_circle(pixmap: &mut Pixmap, cx: f32, cy: f32, radius: f32, c: Argb, mask: Option<&Mask>) {
    if c.a == 0 { return; }
    if let Some(path) = circle_path(cx, cy, radius) {
        pixmap.fill_path(&path, &solid(c), FillRule::Winding, Transform::identity(), mask);
    }
}

/// Pack a frame as premultiplied `0xAARRGGBB` rows, as the X11 visual expects.
pub fn pixmap_to_argb(pixmap: &Pixmap) -> Vec<u32> {
    let data = pixmap.data();
    let mut argb = Vec::with_capacity(data.len() / 4);
    for chunk in data.chunks_exact(4) {
        argb.push((chunk[3] as u32) << 24 | (chunk[0] as u32) << 16 | (chunk[1] as u32) << 8 | chunk[2] as u32);
    }
    argb
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::switch::Timing;
    use std::time::{Duration, Instant};

    fn view(width: f32, height: f32) -> SwitchView {
        let mut view = SwitchView::new(Timing::default());
        view.resize(width, height);
        view
    }

    fn rgba(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let px = pixmap.pixel(x, y).unwrap().demultiply();
        (px.red(), px.green(), px.blue(), px.alpha())
    }

    fn assert_rgb_near(actual: (u8, u8, u8, u8), expected: (u8, u8, u8)) {
        let (r, g, b, a) = actual;
        assert_eq!(a, 255, "pixel {actual:?} not opaque");
        for (got, want) in [(r, expected.0), (g, expected.1), (b, expected.2)] {
            assert!(got.abs_diff(want) <= 2, "pixel {actual:?}, expected about {expected:?}");
        }
    }

    fn settle_at_night(view: &mut SwitchView) {
        let t0 = Instant::now();
        view.tap(t0);
        view.tick(t0 + Duration::from_millis(500));
    }

    #[test]
    fn day_frame_paints_sun_at_left_slot() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let frame = rend.render(&view(300.0, 120.0)).unwrap();
        assert_eq!((frame.width(), frame.height()), (300, 120));
        assert_eq!(rgba(&frame, 66, 60), (0xFD, 0xB8, 0x30, 255));
    }

    #[test]
    fn night_frame_paints_moon_and_stars() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let mut v = view(300.0, 120.0);
        settle_at_night(&mut v);
        let frame = rend.render(&v).unwrap();

        assert_eq!(rgba(&frame, 234, 60), (0xBD, 0xC1, 0xCC, 255));
        // Inside the first crater, left of the moon center.
        assert_eq!(rgba(&frame, 210, 63), (0x88, 0x97, 0xAC, 255));
        // Center of the large star at (3s + s, s/2).
        let (r, g, b, a) = rgba(&frame, 100, 25);
        assert!(r > 250 && g > 250 && b > 250 && a == 255);
    }

    #[test]
    fn pill_corners_stay_transparent() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let frame = rend.render(&view(300.0, 120.0)).unwrap();
        assert_eq!(frame.pixel(0, 0).unwrap().alpha(), 0);
        assert_eq!(frame.pixel(299, 119).unwrap().alpha(), 0);
        assert!(frame.pixel(150, 0).unwrap().alpha() > 250);
        assert_eq!(frame.pixel(150, 60).unwrap().alpha(), 255);
    }

    #[test]
    fn geometry_is_built_once_per_size() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let mut v = view(300.0, 120.0);
        for _ in 0..5 {
            rend.render(&v).unwrap();
        }
        assert_eq!(rend.geometry_builds(), 1);

        let t0 = Instant::now();
        v.tap(t0);
        for i in 1..=10 {
            v.tick(t0 + Duration::from_millis(i * 50));
            rend.render(&v).unwrap();
        }
        assert_eq!(rend.geometry_builds(), 1);

        v.resize(400.0, 160.0);
        let frame = rend.render(&v).unwrap();
        assert_eq!(rend.geometry_builds(), 2);
        assert_eq!((frame.width(), frame.height()), (400, 160));
    }

    #[test]
    fn broken_icon_fails_the_frame() {
        let mut rend = SwitchRenderer::new(StarIcon::from_bytes(Vec::new()));
        assert!(rend.render(&view(300.0, 120.0)).is_err());
        assert_eq!(rend.geometry_builds(), 0);
    }

    #[test]
    fn unsized_view_is_an_error() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let v = SwitchView::new(Timing::default());
        assert!(rend.render(&v).is_err());
    }

    #[test]
    fn argb_packing_keeps_channel_order() {
        let mut pixmap = Pixmap::new(1, 1).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(0x12, 0x34, 0x56, 0xFF));
        assert_eq!(pixmap_to_argb(&pixmap), vec![0xFF12_3456]);
    }

    #[test]
    fn outer_ring_tints_the_surface() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let frame = rend.render(&view(300.0, 120.0)).unwrap();
        // Only the outermost ring (radius 176 around (66, 60)) covers this pixel:
        // #3875B7 under white at 73/255.
        assert_rgb_near(rgba(&frame, 200, 20), (113, 157, 204));
        // All three rings stack closer to the disc.
        let (r, _, _, _) = rgba(&frame, 120, 20);
        assert!(r > 170, "inner rings should stack, got red {r}");
    }

    #[test]
    fn far_clouds_are_lifted_and_translucent() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let frame = rend.render(&view(300.0, 120.0)).unwrap();
        // Inside the fifth cloud lifted by c/2 = 25, outside its near copy
        // and beyond every ring: #3875B7 under white at 127/255.
        assert_rgb_near(rgba(&frame, 255, 50), (155, 186, 219));
    }

    #[test]
    fn near_clouds_cover_the_disc_shadow() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let frame = rend.render(&view(300.0, 120.0)).unwrap();
        // Under the tight shadow layer centered at (86, 70) and inside the
        // second near cloud at (118, 144.7).
        assert_eq!(rgba(&frame, 110, 100), (255, 255, 255, 255));
        assert_eq!(rgba(&frame, 150, 115), (255, 255, 255, 255));
    }

    #[test]
    fn night_clouds_leave_the_view() {
        let mut rend = SwitchRenderer::new(StarIcon::bundled());
        let mut v = view(300.0, 120.0);
        settle_at_night(&mut v);
        let frame = rend.render(&v).unwrap();
        let (r, g, b, _) = rgba(&frame, 150, 115);
        assert!(r < 200 && g < 200 && b < 200, "cloud still visible: {r},{g},{b}");
    }
}
