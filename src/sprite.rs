//! Turtle sprite loading
//!
//! The sprite is drawn facing "up" (heading 0). A missing or unreadable
//! image is not fatal: a generated arrowhead glyph takes its place.

use crate::shapes::rasterize_polygon;
use crate::surface::Raster;
use image::{Rgba, RgbaImage};
use std::path::Path;
use thiserror::Error;

/// Default sprite asset name, looked up relative to the working directory.
pub const DEFAULT_SPRITE: &str = "turtle.png";

/// Edge length of the generated placeholder glyph.
pub const PLACEHOLDER_SIZE: u32 = 15;

const GLYPH_FILL: Rgba<u8> = Rgba([40, 200, 90, 255]);

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("cannot load sprite '{path}': {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite '{0}' has zero width or height")]
    Empty(String),
}

/// Load a sprite image from disk.
pub fn load_sprite(path: &Path) -> Result<Raster, SpriteError> {
    let image = image::open(path)
        .map_err(|source| SpriteError::Load {
            path: path.display().to_string(),
            source,
        })?
        .to_rgba8();

    if image.width() == 0 || image.height() == 0 {
        return Err(SpriteError::Empty(path.display().to_string()));
    }

    Ok(Raster::from_image(image))
}

/// Load `path` if given, otherwise fall back to the placeholder glyph.
///
/// Load failures are logged and never propagated.
pub fn load_or_placeholder(path: Option<&Path>) -> Raster {
    let Some(path) = path else {
        return placeholder_glyph(PLACEHOLDER_SIZE);
    };

    match load_sprite(path) {
        Ok(sprite) => {
            tracing::debug!("loaded sprite {}", path.display());
            sprite
        }
        Err(e) => {
            tracing::warn!("{}; using placeholder glyph", e);
            placeholder_glyph(PLACEHOLDER_SIZE)
        }
    }
}

/// A filled arrowhead pointing up, `size` pixels square.
pub fn placeholder_glyph(size: u32) -> Raster {
    let size = size.max(3);
    let max = size as i32 - 1;
    let mid = max / 2;
    let notch = max * 2 / 3;

    let outline = [(mid, 0), (max, max), (mid, notch), (0, max)];
    let mut image = RgbaImage::new(size, size);
    for (x, y) in rasterize_polygon(&outline) {
        if let Some(pixel) = image.get_pixel_mut_checked(x as u32, y as u32) {
            *pixel = GLYPH_FILL;
        }
    }

    Raster::from_image(image)
}
