//! Headless preview: plays a scripted tap sequence and saves frames as PNG.
//! No X11 needed; runs on macOS/Linux/Windows.
//!
//! Usage: cargo run --bin preview [-- --out DIR]
//!
//! Outputs:
//!   preview-output/day-to-night-*.png   frames across the first transition
//!   preview-output/night-to-day-*.png   frames across the way back
//!   preview-output/retap-*.png          a second tap landing mid-flight
//!   preview-output/atlas.png            single tiled overview

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use tiny_skia::{Pixmap, PixmapPaint, Transform};

use daynight_switch::config::AppConfig;
use daynight_switch::host::{self, Backdrop};
use daynight_switch::renderer::SwitchRenderer;
use daynight_switch::stars::StarIcon;
use daynight_switch::switch::{SwitchView, Timing};
use daynight_switch::theme::Color;

const STEPS: u64 = 6;

/// Scripted session state shared between sequences.
struct Session {
    view: SwitchView,
    rend: SwitchRenderer,
    backdrop: Backdrop,
    changes_rx: mpsc::Receiver<bool>,
    /// Every change the switch reported, in order.
    changes: Vec<bool>,
    margin: u32,
    clock: Instant,
    frames: Vec<(String, Pixmap)>,
}

impl Session {
    fn new(timing: Timing, size: (f32, f32), icon: StarIcon, flash: Duration, margin: u32) -> Self {
        let (tx, changes_rx) = mpsc::channel();
        let mut view = SwitchView::new(timing);
        view.resize(size.0, size.1);
        view.set_change_callback(Box::new(move |night| {
            let _ = tx.send(night);
        }));

        Session {
            view,
            rend: SwitchRenderer::new(icon),
            backdrop: Backdrop::new(flash),
            changes_rx,
            changes: Vec::new(),
            margin,
            clock: Instant::now(),
            frames: Vec::new(),
        }
    }

    fn advance(&mut self, by: Duration) {
        self.clock += by;
        self.view.tick(self.clock);
        while let Ok(night) = self.changes_rx.try_recv() {
            self.backdrop.on_change(night, self.clock);
            self.changes.push(night);
        }
    }

    fn capture(&mut self, label: String) -> Result<(), String> {
        let frame = self.rend.render(&self.view)?;
        let screen = host::compose(self.backdrop.color(self.clock), &frame, self.margin)
            .ok_or("compose frame")?;
        self.frames.push((label, screen));
        Ok(())
    }

    /// Tap, then capture evenly spaced frames until the transition settles.
    fn transition(&mut self, name: &str, duration: Duration) -> Result<(), String> {
        self.view.tap(self.clock);
        self.capture(format!("{name}-0"))?;
        for step in 1..=STEPS {
            self.advance(duration / STEPS as u32);
            self.capture(format!("{name}-{step}"))?;
        }
        Ok(())
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let out = std::env::args()
        .skip_while(|a| a != "--out")
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("preview-output"));

    if let Err(e) = run(&out) {
        eprintln!("preview failed: {e}");
        std::process::exit(1);
    }
}

fn run(out: &Path) -> Result<(), String> {
    let config = AppConfig::find_and_load();
    let sw = &config.switch;
    let timing = sw.timing();

    let mut session = Session::new(
        timing,
        (sw.width as f32, sw.height as f32),
        sw.star_icon()?,
        Duration::from_millis(config.host.flash_ms),
        config.host.margin as u32,
    );

    std::fs::create_dir_all(out).map_err(|e| format!("create {}: {e}", out.display()))?;

    let duration = timing.duration.max(timing.color_duration);
    session.transition("day-to-night", duration)?;
    session.advance(Duration::from_millis(config.host.flash_ms));
    session.capture("night-settled".into())?;
    session.transition("night-to-day", duration)?;
    session.advance(Duration::from_millis(config.host.flash_ms));

    // Second tap while the first is halfway through
    session.view.tap(session.clock);
    session.advance(duration / 2);
    session.capture("retap-0".into())?;
    session.transition("retap", duration)?;

    for (label, frame) in &session.frames {
        save_png(&out.join(format!("{label}.png")), frame)?;
    }
    println!(
        "rendered {} frames, {} geometry builds, {} changes",
        session.frames.len(),
        session.rend.geometry_builds(),
        session.changes.len()
    );

    let atlas = build_atlas(&session.frames).ok_or("atlas is empty")?;
    let atlas_path = out.join("atlas.png");
    save_png(&atlas_path, &atlas)?;
    println!("atlas: {} ({}x{})", atlas_path.display(), atlas.width(), atlas.height());

    #[cfg(target_os = "macos")]
    {
        let _ = std::process::Command::new("open").arg(&atlas_path).spawn();
    }
    Ok(())
}

/// Tile every frame, seven per row, on a dark canvas.
fn build_atlas(frames: &[(String, Pixmap)]) -> Option<Pixmap> {
    let (_, first) = frames.first()?;
    let cols = (STEPS as u32 + 1).min(frames.len() as u32);
    let rows = (frames.len() as u32 + cols - 1) / cols;
    let (tile_w, tile_h) = (first.width(), first.height());
    let pad = 8_u32;

    let mut atlas = Pixmap::new(cols * (tile_w + pad) + pad, rows * (tile_h + pad) + pad)?;
    atlas.fill(Color::rgb(30, 30, 46).to_skia());

    for (idx, (_, frame)) in frames.iter().enumerate() {
        let col = idx as u32 % cols;
        let row = idx as u32 / cols;
        let x = pad + col * (tile_w + pad);
        let y = pad + row * (tile_h + pad);
        atlas.draw_pixmap(x as i32, y as i32, frame.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    }
    Some(atlas)
}

fn save_png(path: &Path, pixmap: &Pixmap) -> Result<(), String> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let file = std::fs::File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
    let buf = std::io::BufWriter::new(file);
    let mut encoder = png::Encoder::new(buf, pixmap.width(), pixmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(|e| format!("png header: {e}"))?;
    writer.write_image_data(&rgba).map_err(|e| format!("png data: {e}"))
}
