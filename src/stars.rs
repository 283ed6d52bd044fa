//! Star icon loading and rasterization.
//!
//! The icon is an SVG, rasterized once per view height into three square
//! sprites and reused for every frame after that.

use std::path::Path;

use tiny_skia::Pixmap;

use crate::geometry::{SceneMetrics, StarSize};

/// Bundled star icon.
pub const BUNDLED_STAR_SVG: &[u8] = include_bytes!("../assets/star.svg");

/// Raw SVG source of the star icon.
#[derive(Debug, Clone)]
pub struct StarIcon {
    svg: Vec<u8>,
}

impl StarIcon {
    pub fn bundled() -> Self {
        StarIcon { svg: BUNDLED_STAR_SVG.to_vec() }
    }

    pub fn from_bytes(svg: Vec<u8>) -> Self {
        StarIcon { svg }
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let svg = std::fs::read(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        Ok(StarIcon { svg })
    }
}

pub struct StarSprites {
    large: Pixmap,
    medium: Pixmap,
    small: Pixmap,
}

impl StarSprites {
    /// Rasterize the three sprite sizes for a view. Any failure is fatal for
    /// the star layer and is reported to the caller.
    pub fn rasterize(icon: &StarIcon, metrics: &SceneMetrics) -> Result<Self, String> {
        let opts = resvg::usvg::Options::default();
        let tree = resvg::usvg::Tree::from_data(&icon.svg, &opts)
            .map_err(|e| format!("parse star icon: {e}"))?;

        let render = |size: StarSize| -> Result<Pixmap, String> {
            let px = metrics.star_sprite_px(size);
            rasterize_square(&tree, px).ok_or_else(|| format!("rasterize star icon at {px}px"))
        };

        Ok(StarSprites {
            large: render(StarSize::Large)?,
            medium: render(StarSize::Medium)?,
            small: render(StarSize::Small)?,
        })
    }

    pub fn get(&self, size: StarSize) -> &Pixmap {
        match size {
            StarSize::Large => &self.large,
            StarSize::Medium => &self.medium,
            StarSize::Small => &self.small,
        }
    }
}

/// Fit the tree into a `size`×`size` pixmap, centered, aspect preserved.
fn rasterize_square(tree: &resvg::usvg::Tree, size: u32) -> Option<Pixmap> {
    let svg_size = tree.size();
    let sx = size as f32 / svg_size.width();
    let sy = size as f32 / svg_size.height();
    let scale = sx.min(sy);
    let dx = (size as f32 - svg_size.width() * scale) / 2.0;
    let dy = (size as f32 - svg_size.height() * scale) / 2.0;

    let mut pixmap = Pixmap::new(size, size)?;
    let transform = tiny_skia::Transform::from_scale(scale, scale).post_translate(dx, dy);
    resvg::render(tree, transform, &mut pixmap.as_mut());
    Some(pixmap)
}
