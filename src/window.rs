//! X11 host window for the switch.
//! Uses a 32-bit ARGB visual when the server offers one and reports pointer
//! presses and close requests back to the frame loop.

use x11rb::connection::Connection;
use x11rb::protocol::xproto::*;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;

use log::debug;

// Escape on the usual evdev/xkb keymaps
const KEYCODE_ESCAPE: u8 = 9;
const BUTTON_LEFT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    Press { x: i16, y: i16 },
    Exposed,
    Close,
}

pub struct HostWindow {
    conn: RustConnection,
    window: Window,
    gc: Gcontext,
    depth: u8,
    wm_delete: Atom,
}

impl HostWindow {
    pub fn new(width: u16, height: u16, title: &str) -> Result<Self, String> {
        let (conn, screen_num) = RustConnection::connect(None).map_err(|e| format!("X11 connect: {e}"))?;
        let screen = &conn.setup().roots[screen_num];

        let (visual, depth) = find_argb_visual(screen).unwrap_or((screen.root_visual, screen.root_depth));

        let colormap = conn.generate_id().map_err(|e| e.to_string())?;
        conn.create_colormap(ColormapAlloc::NONE, colormap, screen.root, visual)
            .map_err(|e| e.to_string())?;

        let window = conn.generate_id().map_err(|e| e.to_string())?;
        let values = CreateWindowAux::new()
            .background_pixel(0)
            .border_pixel(0)
            .colormap(colormap)
            .event_mask(EventMask::EXPOSURE | EventMask::BUTTON_PRESS | EventMask::KEY_PRESS);

        conn.create_window(depth, window, screen.root, 0, 0, width, height, 0, WindowClass::INPUT_OUTPUT, visual, &values)
            .map_err(|e| format!("create_window: {e}"))?;

        conn.change_property8(PropMode::REPLACE, window, AtomEnum::WM_NAME, AtomEnum::STRING, title.as_bytes())
            .map_err(|e| e.to_string())?;

        let wm_protocols = intern_atom(&conn, "WM_PROTOCOLS")?;
        let wm_delete = intern_atom(&conn, "WM_DELETE_WINDOW")?;
        conn.change_property32(PropMode::REPLACE, window, wm_protocols, AtomEnum::ATOM, &[wm_delete])
            .map_err(|e| e.to_string())?;

        let gc = conn.generate_id().map_err(|e| e.to_string())?;
        conn.create_gc(gc, window, &CreateGCAux::new()).map_err(|e| e.to_string())?;
        conn.map_window(window).map_err(|e| e.to_string())?;
        conn.flush().map_err(|e| e.to_string())?;

        debug!("Window created: {width}x{height}, depth={depth}");

        Ok(HostWindow { conn, window, gc, depth, wm_delete })
    }

    /// Upload a full frame of packed `0xAARRGGBB` pixels.
    pub fn update_pixels(&self, pixels: &[u32], width: u16, height: u16) {
        let mut data = Vec::with_capacity(pixels.len() * 4);
        for &px in pixels {
            data.extend_from_slice(&px.to_le_bytes());
        }

        let _ = self.conn.put_image(ImageFormat::Z_PIXMAP, self.window, self.gc, width, height, 0, 0, 0, self.depth, &data);
        let _ = self.conn.flush();
    }

    /// Drain pending X11 events without blocking.
    pub fn poll_events(&self) -> Vec<WindowEvent> {
        let mut out = Vec::new();
        while let Ok(Some(event)) = self.conn.poll_for_event() {
            match event {
                Event::Expose(_) => out.push(WindowEvent::Exposed),
                Event::ButtonPress(ev) if ev.detail == BUTTON_LEFT => {
                    out.push(WindowEvent::Press { x: ev.event_x, y: ev.event_y });
                }
                Event::KeyPress(ev) if ev.detail == KEYCODE_ESCAPE => out.push(WindowEvent::Close),
                Event::ClientMessage(ev) if ev.data.as_data32()[0] == self.wm_delete => {
                    out.push(WindowEvent::Close);
                }
                _ => {}
            }
        }
        out
    }
}

fn find_argb_visual(screen: &Screen) -> Option<(Visualid, u8)> {
    for depth_info in &screen.allowed_depths {
        if depth_info.depth == 32 {
            for visual in &depth_info.visuals {
                if visual.class == VisualClass::TRUE_COLOR {
                    return Some((visual.visual_id, 32));
                }
            }
        }
    }
    None
}

fn intern_atom(conn: &RustConnection, name: &str) -> Result<Atom, String> {
    conn.intern_atom(false, name.as_bytes())
        .map_err(|e| e.to_string())?
        .reply()
        .map(|r| r.atom)
        .map_err(|e| e.to_string())
}
