//! Colors and the two hardcoded scene palettes.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.a, self.r, self.g, self.b)
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    /// Parses `RRGGBB` or `AARRGGBB`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Color { r: channel(0)?, g: channel(2)?, b: channel(4)?, a: 255 }),
            8 => Some(Color { a: channel(0)?, r: channel(2)?, g: channel(4)?, b: channel(6)? }),
            _ => None,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Component-wise blend of every ARGB channel, rounded to the nearest value.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let mix = |a: u8, b: u8| -> u8 {
            (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
        };
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    pub fn as_argb_u32(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

// Track surface
pub const DAY_SURFACE: Color = Color::rgb(0x38, 0x75, 0xB7);
pub const NIGHT_SURFACE: Color = Color::rgb(0x17, 0x1D, 0x2E);

// Disc
pub const SUN: Color = Color::rgb(0xFD, 0xB8, 0x30);
pub const MOON: Color = Color::rgb(0xBD, 0xC1, 0xCC);
pub const CRATER: Color = Color::rgb(0x88, 0x97, 0xAC);
pub const DISC_SHADOW: Color = Color::rgb(0x80, 0x80, 0x80);

// Rings and clouds share one white
pub const HAZE: Color = Color::WHITE;

/// Surface color at rest for the given toggle state.
pub fn surface_for(night: bool) -> Color {
    if night {
        NIGHT_SURFACE
    } else {
        DAY_SURFACE
    }
}
