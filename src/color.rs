//! Named color registry and color string parsing
//!
//! The registry maps case-sensitive color names to RGB triples. Lookups
//! never fail: an unknown name resolves to the designated default color.
//! Registration clamps every channel into `[0, 255]` and logs when it had to.
//!
//! Color strings from `turtle.toml` may use any of these formats:
//! - Hex: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`
//! - Functional: `rgb()`, `hsl()`, `hwb()`, `oklch()`
//! - Named CSS colors: `orange`, `teal`, ...

use crate::clamp::{clamp_channel, Clamped};
use image::{Rgb, Rgba};
use lightningcss::traits::Parse;
use lightningcss::values::color::CssColor;
use std::collections::BTreeMap;
use thiserror::Error;

/// Name of the color that unknown lookups fall back to.
pub const DEFAULT_COLOR: &str = "white";

/// RGB used when even the designated default has been removed from the registry.
const FALLBACK_RGB: Rgb<u8> = Rgb([255, 255, 255]);

/// Colors every registry starts with.
pub const BUILTIN_COLORS: [(&str, [u8; 3]); 9] = [
    ("red", [255, 0, 0]),
    ("green", [0, 255, 0]),
    ("blue", [0, 0, 255]),
    ("yellow", [255, 255, 0]),
    ("magenta", [255, 0, 255]),
    ("cyan", [0, 255, 255]),
    ("purple", [204, 0, 255]),
    ("white", [255, 255, 255]),
    ("black", [0, 0, 0]),
];

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
    /// CSS parsing error from lightningcss
    #[error("CSS parse error: {0}")]
    CssParse(String),
}

/// Outcome of a registry lookup.
///
/// A miss is not an error; it resolves to the default color and says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLookup {
    /// The name was registered
    Found(Rgb<u8>),
    /// The name was unknown; this is the designated default
    Fallback(Rgb<u8>),
}

impl ColorLookup {
    /// The resolved RGB value, whichever way it was obtained.
    pub fn rgb(&self) -> Rgb<u8> {
        match self {
            ColorLookup::Found(rgb) | ColorLookup::Fallback(rgb) => *rgb,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ColorLookup::Fallback(_))
    }
}

/// Mutable mapping from color name to RGB.
///
/// Names are kept sorted, which fixes the order used by [`ColorRegistry::cycle`].
#[derive(Debug, Clone)]
pub struct ColorRegistry {
    colors: BTreeMap<String, Rgb<u8>>,
    default_name: String,
}

impl Default for ColorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        for (name, rgb) in BUILTIN_COLORS {
            registry.colors.insert(name.to_string(), Rgb(rgb));
        }
        registry
    }
}

impl ColorRegistry {
    /// Registry pre-populated with [`BUILTIN_COLORS`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with no entries; every lookup falls back.
    pub fn empty() -> Self {
        Self {
            colors: BTreeMap::new(),
            default_name: DEFAULT_COLOR.to_string(),
        }
    }

    /// Exact-match lookup with fallback to the designated default.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixelturtle::color::{ColorLookup, ColorRegistry};
    /// use image::Rgb;
    ///
    /// let colors = ColorRegistry::new();
    /// assert_eq!(colors.lookup("red"), ColorLookup::Found(Rgb([255, 0, 0])));
    /// assert!(colors.lookup("Red").is_fallback());
    /// ```
    pub fn lookup(&self, name: &str) -> ColorLookup {
        match self.colors.get(name) {
            Some(rgb) => ColorLookup::Found(*rgb),
            None => ColorLookup::Fallback(self.default_rgb()),
        }
    }

    /// Shorthand for `lookup(name).rgb()`.
    pub fn rgb(&self, name: &str) -> Rgb<u8> {
        self.lookup(name).rgb()
    }

    /// The RGB that unknown names resolve to.
    pub fn default_rgb(&self) -> Rgb<u8> {
        self.colors.get(&self.default_name).copied().unwrap_or(FALLBACK_RGB)
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Designate which registered name unknown lookups resolve to.
    pub fn set_default(&mut self, name: impl Into<String>) {
        self.default_name = name.into();
    }

    /// Insert or overwrite a color, clamping each channel into `[0, 255]`.
    ///
    /// Returns the stored triple; `clamped` is set when any channel moved.
    pub fn register(&mut self, name: impl Into<String>, rgb: (i32, i32, i32)) -> Clamped<Rgb<u8>> {
        let name = name.into();
        let (r, g, b) = (clamp_channel(rgb.0), clamp_channel(rgb.1), clamp_channel(rgb.2));
        let clamped = r.clamped || g.clamped || b.clamped;
        let stored = Rgb([r.value, g.value, b.value]);

        if clamped {
            tracing::warn!(
                "color '{}' channels ({}, {}, {}) clamped to ({}, {}, {})",
                name,
                rgb.0,
                rgb.1,
                rgb.2,
                stored[0],
                stored[1],
                stored[2]
            );
        }

        self.colors.insert(name, stored);
        Clamped { value: stored, clamped }
    }

    /// Register a color given as a hex or CSS color string. Alpha is dropped.
    pub fn register_str(&mut self, name: impl Into<String>, color: &str) -> Result<Rgb<u8>, ColorError> {
        let rgba = parse_color(color)?;
        let rgb = Rgb([rgba[0], rgba[1], rgba[2]]);
        self.colors.insert(name.into(), rgb);
        Ok(rgb)
    }

    /// The name following `name` in sorted order, wrapping past the last.
    ///
    /// An unregistered `name` cycles to the first registered name. An empty
    /// registry returns `name` unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use pixelturtle::color::ColorRegistry;
    ///
    /// let colors = ColorRegistry::new();
    /// assert_eq!(colors.cycle("black"), "blue");
    /// assert_eq!(colors.cycle("yellow"), "black");
    /// ```
    pub fn cycle(&self, name: &str) -> String {
        use std::ops::Bound::{Excluded, Unbounded};

        if !self.colors.contains_key(name) {
            return self.first_name().unwrap_or(name).to_string();
        }

        self.colors
            .range::<str, _>((Excluded(name), Unbounded))
            .next()
            .map(|(next, _)| next.as_str())
            .or_else(|| self.first_name())
            .unwrap_or(name)
            .to_string()
    }

    fn first_name(&self) -> Option<&str> {
        self.colors.keys().next().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Registered names in cycle order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.colors.keys().map(String::as_str)
    }

    /// Registered entries in cycle order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Rgb<u8>)> {
        self.colors.iter().map(|(name, rgb)| (name.as_str(), *rgb))
    }
}

/// Parse a color string into an RGBA color.
///
/// Hex strings take a fast path; everything else goes through lightningcss.
///
/// # Examples
///
/// ```
/// use pixelturtle::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("rgb(0, 255, 0)").unwrap(), image::Rgba([0, 255, 0, 255]));
/// assert_eq!(parse_color("orange").unwrap(), image::Rgba([255, 165, 0, 255]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    parse_css_color(s)
}

/// Parse the digits of a hex color (without the leading '#')
fn parse_hex_color(hex: &str) -> Result<Rgba<u8>, ColorError> {
    let digits = hex
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8).ok_or(ColorError::InvalidHex(c)))
        .collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // #RGB / #RGBA: each digit is doubled
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 255])),
        [r1, r0, g1, g0, b1, b0, a1, a0] => {
            Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, a1 * 16 + a0]))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Parse a CSS color using lightningcss (rgb, hsl, hwb, oklch, named colors)
fn parse_css_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    use lightningcss::values::color::FloatColor;

    let css_color = CssColor::parse_string(s).map_err(|e| ColorError::CssParse(e.to_string()))?;
    let rgb_color = css_color
        .to_rgb()
        .map_err(|_| ColorError::CssParse("cannot convert color to RGB".to_string()))?;

    match rgb_color {
        CssColor::RGBA(rgba) => Ok(Rgba([rgba.red, rgba.green, rgba.blue, rgba.alpha])),
        CssColor::Float(float_color) => match float_color.as_ref() {
            FloatColor::RGB(rgb) => {
                let channel = |v: f32| (v * 255.0).round() as u8;
                Ok(Rgba([channel(rgb.r), channel(rgb.g), channel(rgb.b), channel(rgb.alpha)]))
            }
            _ => Err(ColorError::CssParse("unexpected float color format".to_string())),
        },
        _ => Err(ColorError::CssParse("color conversion did not produce RGB".to_string())),
    }
}
