//! Drawing surfaces
//!
//! [`Surface`] is the contract the compositor and turtles draw through:
//! allocate, fill, blit, rotate, stroke. [`Raster`] implements it on an
//! in-memory `RgbaImage`, which the terminal presenter later downsamples.

use crate::shapes::rasterize_thick_line;
use image::{Rgb, Rgba, RgbaImage};

/// Operations the turtle core needs from a drawing surface.
pub trait Surface: Sized {
    /// Allocate a surface of the given pixel dimensions, fully transparent.
    fn new(width: u32, height: u32) -> Self;

    /// Pixel dimensions as `(width, height)`.
    fn size(&self) -> (u32, u32);

    /// Fill every pixel with a solid, opaque color.
    fn fill(&mut self, color: Rgb<u8>);

    /// Draw `src` onto this surface with its top-left corner at `(x, y)`.
    ///
    /// Transparent pixels and pixels matching `src`'s color key are skipped.
    /// Offsets may be negative or run past the edge; the overlap is clipped.
    fn blit(&mut self, src: &Self, x: i32, y: i32);

    /// A copy rotated clockwise by `degrees` about its center.
    ///
    /// The result is sized to the rotated bounding box; corners outside the
    /// original image are transparent.
    fn rotated(&self, degrees: f64) -> Self;

    /// Stroke a straight segment of `width` pixels.
    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: u32, color: Rgb<u8>);

    /// Pixels of this color are treated as transparent when blitted.
    fn set_colorkey(&mut self, key: Option<Rgb<u8>>);
}

/// `RgbaImage`-backed surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: RgbaImage,
    colorkey: Option<Rgb<u8>>,
}

impl Raster {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image, colorkey: None }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn colorkey(&self) -> Option<Rgb<u8>> {
        self.colorkey
    }

    /// The pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if x < 0 || y < 0 {
            return None;
        }
        self.image.get_pixel_checked(x as u32, y as u32).copied()
    }

    /// The RGB at `(x, y)`, ignoring alpha.
    pub fn rgb_at(&self, x: i32, y: i32) -> Option<Rgb<u8>> {
        self.pixel(x, y).map(|p| Rgb([p[0], p[1], p[2]]))
    }

    fn is_keyed(&self, pixel: &Rgba<u8>) -> bool {
        pixel[3] == 0 || self.colorkey.is_some_and(|key| key.0 == [pixel[0], pixel[1], pixel[2]])
    }
}

impl Surface for Raster {
    fn new(width: u32, height: u32) -> Self {
        Self::from_image(RgbaImage::new(width, height))
    }

    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn fill(&mut self, color: Rgb<u8>) {
        let opaque = Rgba([color[0], color[1], color[2], 255]);
        for pixel in self.image.pixels_mut() {
            *pixel = opaque;
        }
    }

    fn blit(&mut self, src: &Self, x: i32, y: i32) {
        let (width, height) = self.size();

        for (sy, row) in src.image.rows().enumerate() {
            let dest_y = y + sy as i32;
            if dest_y < 0 {
                continue;
            }
            if dest_y >= height as i32 {
                break;
            }

            for (sx, pixel) in row.enumerate() {
                let dest_x = x + sx as i32;
                if dest_x < 0 {
                    continue;
                }
                if dest_x >= width as i32 {
                    break;
                }
                if src.is_keyed(pixel) {
                    continue;
                }

                let dst = self.image.get_pixel_mut(dest_x as u32, dest_y as u32);
                *dst = source_over(pixel, dst);
            }
        }
    }

    fn rotated(&self, degrees: f64) -> Self {
        let quarter = degrees.rem_euclid(360.0);
        let image = if quarter == 0.0 {
            self.image.clone()
        } else if quarter == 90.0 {
            image::imageops::rotate90(&self.image)
        } else if quarter == 180.0 {
            image::imageops::rotate180(&self.image)
        } else if quarter == 270.0 {
            image::imageops::rotate270(&self.image)
        } else {
            rotate_nearest(&self.image, quarter)
        };

        Self { image, colorkey: self.colorkey }
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: u32, color: Rgb<u8>) {
        let (w, h) = self.size();
        let opaque = Rgba([color[0], color[1], color[2], 255]);
        let p0 = (from.0.round() as i32, from.1.round() as i32);
        let p1 = (to.0.round() as i32, to.1.round() as i32);

        for (x, y) in rasterize_thick_line(p0, p1, width) {
            if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
                self.image.put_pixel(x as u32, y as u32, opaque);
            }
        }
    }

    fn set_colorkey(&mut self, key: Option<Rgb<u8>>) {
        self.colorkey = key;
    }
}

/// Porter-Duff "source over" for one pixel.
fn source_over(src: &Rgba<u8>, dst: &Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 {
        return *src;
    }

    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let out = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (out.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Arbitrary-angle clockwise rotation by inverse nearest-neighbor mapping.
fn rotate_nearest(image: &RgbaImage, degrees: f64) -> RgbaImage {
    let (w, h) = image.dimensions();
    let (sin, cos) = degrees.to_radians().sin_cos();

    let out_w = (w as f64 * cos.abs() + h as f64 * sin.abs()).ceil().max(1.0) as u32;
    let out_h = (w as f64 * sin.abs() + h as f64 * cos.abs()).ceil().max(1.0) as u32;
    let mut out = RgbaImage::new(out_w, out_h);

    let (src_cx, src_cy) = (w as f64 / 2.0, h as f64 / 2.0);
    let (dst_cx, dst_cy) = (out_w as f64 / 2.0, out_h as f64 / 2.0);

    for (x, y, pixel) in out.enumerate_pixels_mut() {
        // Sample at pixel centers; y grows downward so this is a clockwise turn
        let dx = x as f64 + 0.5 - dst_cx;
        let dy = y as f64 + 0.5 - dst_cy;
        let sx = dx * cos + dy * sin + src_cx;
        let sy = -dx * sin + dy * cos + src_cy;

        if sx >= 0.0 && sy >= 0.0 && sx < w as f64 && sy < h as f64 {
            *pixel = *image.get_pixel(sx as u32, sy as u32);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    const KEY: Rgb<u8> = Rgb([1, 2, 3]);

    #[test]
    fn test_new_is_transparent() {
        let surface = Raster::new(4, 3);
        assert_eq!(surface.size(), (4, 3));
        assert_eq!(surface.pixel(0, 0), Some(Rgba([0, 0, 0, 0])));
        assert_eq!(surface.pixel(4, 0), None);
        assert_eq!(surface.pixel(-1, 0), None);
    }

    #[test]
    fn test_fill() {
        let mut surface = Raster::new(2, 2);
        surface.fill(BLUE);
        assert_eq!(surface.pixel(1, 1), Some(Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn test_blit_skips_colorkey() {
        let mut layer = Raster::new(3, 1);
        layer.fill(KEY);
        layer.set_colorkey(Some(KEY));
        layer.draw_line((1.0, 0.0), (1.0, 0.0), 1, RED);

        let mut frame = Raster::new(3, 1);
        frame.fill(BLUE);
        frame.blit(&layer, 0, 0);

        assert_eq!(frame.rgb_at(0, 0), Some(BLUE));
        assert_eq!(frame.rgb_at(1, 0), Some(RED));
        assert_eq!(frame.rgb_at(2, 0), Some(BLUE));
    }

    #[test]
    fn test_blit_clips_negative_offset() {
        let mut sprite = Raster::new(3, 3);
        sprite.fill(RED);

        let mut frame = Raster::new(4, 4);
        frame.fill(BLUE);
        frame.blit(&sprite, -2, -2);

        assert_eq!(frame.rgb_at(0, 0), Some(RED));
        assert_eq!(frame.rgb_at(1, 0), Some(BLUE));
        assert_eq!(frame.rgb_at(0, 1), Some(BLUE));
    }

    #[test]
    fn test_blit_clips_past_edge() {
        let mut sprite = Raster::new(3, 3);
        sprite.fill(RED);

        let mut frame = Raster::new(4, 4);
        frame.blit(&sprite, 3, 3);
        assert_eq!(frame.rgb_at(3, 3), Some(RED));
        assert_eq!(frame.rgb_at(2, 2), Some(Rgb([0, 0, 0])));
    }

    #[test]
    fn test_blit_half_alpha_blends() {
        let mut frame = Raster::new(1, 1);
        frame.fill(Rgb([0, 0, 0]));
        let sprite = Raster::from_image(RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128])));
        frame.blit(&sprite, 0, 0);
        let p = frame.pixel(0, 0).unwrap_or(Rgba([0, 0, 0, 0]));
        assert!(p[0] > 100 && p[0] < 156);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_rotated_quarter_turns_swap_dimensions() {
        let surface = Raster::new(10, 4);
        assert_eq!(surface.rotated(90.0).size(), (4, 10));
        assert_eq!(surface.rotated(-90.0).size(), (4, 10));
        assert_eq!(surface.rotated(180.0).size(), (10, 4));
        assert_eq!(surface.rotated(360.0).size(), (10, 4));
    }

    #[test]
    fn test_rotated_90_is_clockwise() {
        // Marker at the top-center should end up at the right-center
        let mut surface = Raster::new(5, 5);
        surface.draw_line((2.0, 0.0), (2.0, 0.0), 1, RED);
        let turned = surface.rotated(90.0);
        assert_eq!(turned.rgb_at(4, 2), Some(RED));
    }

    #[test]
    fn test_rotated_45_grows_bounding_box() {
        let mut surface = Raster::new(10, 10);
        surface.fill(RED);
        let turned = surface.rotated(45.0);
        let (w, h) = turned.size();
        assert_eq!((w, h), (15, 15));
        // Corners of the bounding box lie outside the original square
        assert_eq!(turned.pixel(0, 0).map(|p| p[3]), Some(0));
        assert_eq!(turned.rgb_at(7, 7), Some(RED));
    }

    #[test]
    fn test_rotated_keeps_colorkey() {
        let mut surface = Raster::new(4, 4);
        surface.set_colorkey(Some(KEY));
        assert_eq!(surface.rotated(30.0).colorkey(), Some(KEY));
    }

    #[test]
    fn test_draw_line_clips_to_surface() {
        let mut surface = Raster::new(5, 5);
        surface.draw_line((-10.0, 2.0), (10.0, 2.0), 1, RED);
        for x in 0..5 {
            assert_eq!(surface.rgb_at(x, 2), Some(RED));
        }
        assert_eq!(surface.pixel(0, 1).map(|p| p[3]), Some(0));
    }
}
