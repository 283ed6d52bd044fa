//! Shared modules for the day/night switch.
//! Used by the interactive X11 host and the headless preview binary.

pub mod anim;
pub mod config;
pub mod geometry;
pub mod host;
pub mod renderer;
pub mod stars;
pub mod switch;
pub mod theme;
