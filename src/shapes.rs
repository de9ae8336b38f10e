//! Shape rasterization primitives for pen strokes and sprite glyphs.
//!
//! Converts geometric shapes into sets of integer pixel coordinates. Pen
//! strokes use [`rasterize_thick_line`]; the placeholder turtle glyph is a
//! filled polygon.

use std::collections::HashSet;

/// Rasterize a line using Bresenham's line algorithm.
///
/// Returns all pixels that form a line between two points, endpoints included.
///
/// # Examples
///
/// ```
/// use pixelturtle::shapes::rasterize_line;
///
/// let pixels = rasterize_line((0, 0), (3, 3));
/// assert_eq!(pixels.len(), 4);
/// assert!(pixels.contains(&(0, 0)));
/// assert!(pixels.contains(&(3, 3)));
/// ```
pub fn rasterize_line(p0: (i32, i32), p1: (i32, i32)) -> HashSet<(i32, i32)> {
    let mut pixels = HashSet::new();

    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        pixels.insert((x0, y0));

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }

    pixels
}

/// Offsets of a round pen tip exactly `thickness` pixels across.
///
/// Odd tips are centered on the origin. Even tips have no center pixel, so
/// they cover `-(thickness / 2)..thickness / 2` on each axis.
pub fn brush_offsets(thickness: u32) -> Vec<(i32, i32)> {
    let t = thickness.max(1) as i32;
    let lo = -(t / 2);
    let hi = lo + t - 1;
    // Doubled coordinates keep even tips centered on a pixel corner; the -1
    // rounds the rim outward so small tips look round, not diamond-shaped
    let shift = (t + 1) % 2;
    let limit = t * t - 1;
    let mut offsets = Vec::with_capacity((t * t) as usize);
    for dy in lo..=hi {
        for dx in lo..=hi {
            let (u, v) = (2 * dx + shift, 2 * dy + shift);
            if u * u + v * v <= limit {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Rasterize a pen stroke of `thickness` pixels between two points.
///
/// Thickness 1 is a plain Bresenham line. Wider strokes stamp a
/// [`brush_offsets`] tip at every pixel of the center line, which also
/// rounds the stroke ends so consecutive segments join without gaps.
///
/// # Examples
///
/// ```
/// use pixelturtle::shapes::rasterize_thick_line;
///
/// let thin = rasterize_thick_line((0, 0), (10, 0), 1);
/// assert_eq!(thin.len(), 11);
///
/// let thick = rasterize_thick_line((0, 0), (10, 0), 3);
/// assert!(thick.contains(&(5, 1)));
/// assert!(thick.contains(&(5, -1)));
/// ```
pub fn rasterize_thick_line(p0: (i32, i32), p1: (i32, i32), thickness: u32) -> HashSet<(i32, i32)> {
    let center = rasterize_line(p0, p1);
    if thickness <= 1 {
        return center;
    }

    let tip = brush_offsets(thickness);
    let mut pixels = HashSet::with_capacity(center.len() * thickness as usize);
    for (x, y) in center {
        pixels.extend(tip.iter().map(|(dx, dy)| (x + dx, y + dy)));
    }
    pixels
}

/// Rasterize a filled polygon using scanline fill algorithm.
///
/// Returns all pixels within a polygon defined by a list of vertices.
/// Uses an even-odd fill rule.
///
/// # Examples
///
/// ```
/// use pixelturtle::shapes::rasterize_polygon;
///
/// let triangle = vec![(0, 0), (4, 0), (2, 3)];
/// let pixels = rasterize_polygon(&triangle);
/// assert!(pixels.len() > 0);
/// assert!(pixels.contains(&(2, 1)));
/// ```
pub fn rasterize_polygon(vertices: &[(i32, i32)]) -> HashSet<(i32, i32)> {
    let mut pixels = HashSet::new();

    if vertices.len() < 3 {
        return pixels;
    }

    let min_y = vertices.iter().map(|(_, y)| *y).min().unwrap_or(0);
    let max_y = vertices.iter().map(|(_, y)| *y).max().unwrap_or(0);

    for y in min_y..=max_y {
        let mut intersections = Vec::new();

        for i in 0..vertices.len() {
            let j = (i + 1) % vertices.len();
            let (x1, y1) = vertices[i];
            let (x2, y2) = vertices[j];

            // Horizontal edges never cross a scanline
            if y1 == y2 {
                continue;
            }

            // Half-open on the upper end so shared vertices are counted once
            let y_min = y1.min(y2);
            let y_max = y1.max(y2);
            if y >= y_min && (y < y_max || (y == max_y && y == y_max)) {
                let x = x1 + (y - y1) * (x2 - x1) / (y2 - y1);
                intersections.push(x);
            }
        }

        intersections.sort_unstable();

        for chunk in intersections.chunks(2) {
            if let [x_start, x_end] = chunk {
                for x in *x_start..=*x_end {
                    pixels.insert((x, y));
                }
            }
        }
    }

    pixels
}
