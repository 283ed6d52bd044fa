//! daynight-switch: interactive host for the day/night toggle switch (X11)
//!
//! Shows the switch centered on a backdrop. Clicking the switch toggles it;
//! when a transition finishes, the backdrop flashes between white and black.

mod window;

use std::sync::mpsc;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use daynight_switch::config::AppConfig;
use daynight_switch::host::{self, Backdrop};
use daynight_switch::renderer::{pixmap_to_argb, SwitchRenderer};
use daynight_switch::switch::SwitchView;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::find_and_load();
    let sw = &config.switch;
    info!("Switch {}x{}, transition {}ms", sw.width, sw.height, sw.duration_ms);

    // The star icon must resolve before anything is drawn
    let icon = match sw.star_icon() {
        Ok(icon) => icon,
        Err(e) => {
            error!("Failed to load star icon: {e}");
            std::process::exit(1);
        }
    };

    let margin = config.host.margin;
    let Some((win_w, win_h)) = host::window_size(sw.width, sw.height, margin) else {
        error!("Switch {}x{} with margin {margin} exceeds the X11 window size limit", sw.width, sw.height);
        std::process::exit(1);
    };
    let win = match window::HostWindow::new(win_w, win_h, "daynight-switch") {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create X11 window: {e}");
            std::process::exit(1);
        }
    };
    info!("X11 window created");

    // Change notifications from the switch, drained once per frame
    let (tx, rx) = mpsc::channel::<bool>();

    let mut view = SwitchView::new(sw.timing());
    view.resize(sw.width as f32, sw.height as f32);
    view.set_change_callback(Box::new(move |night| {
        let _ = tx.send(night);
    }));

    let mut rend = SwitchRenderer::new(icon);
    let mut backdrop = Backdrop::new(Duration::from_millis(config.host.flash_ms));
    let frame_duration = Duration::from_millis(config.host.frame_ms);
    let mut force_paint = true;
    let mut was_fading = false;

    loop {
        let frame_start = Instant::now();

        for event in win.poll_events() {
            match event {
                window::WindowEvent::Press { x, y } => {
                    let (lx, ly) = (x as f32 - margin as f32, y as f32 - margin as f32);
                    if view.tap_at(lx, ly, frame_start) {
                        info!("Switch tapped, now {}", if view.is_selected() { "night" } else { "day" });
                    }
                }
                window::WindowEvent::Exposed => force_paint = true,
                window::WindowEvent::Close => {
                    info!("Window closed");
                    return;
                }
            }
        }

        view.tick(frame_start);

        while let Ok(night) = rx.try_recv() {
            debug!("Transition finished, night={night}");
            backdrop.on_change(night, frame_start);
        }

        // One extra paint after a fade ends lands the backdrop on its endpoint
        let fading = backdrop.is_fading(frame_start);
        if view.take_dirty() || fading || was_fading || force_paint {
            force_paint = false;
            let frame = match rend.render(&view) {
                Ok(frame) => frame,
                Err(e) => {
                    error!("Render failed: {e}");
                    std::process::exit(1);
                }
            };
            if let Some(screen) = host::compose(backdrop.color(frame_start), &frame, margin as u32) {
                let (w, h) = (screen.width() as u16, screen.height() as u16);
                win.update_pixels(&pixmap_to_argb(&screen), w, h);
            }
        }

        was_fading = fading;

        // Frame timing
        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }
}
