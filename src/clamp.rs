//! Lenient value coercion
//!
//! Out-of-range inputs (color channels, pen thickness, polygon side counts)
//! are coerced into range instead of rejected. [`Clamped`] carries the
//! coerced value together with a flag saying whether coercion happened, so
//! callers can log it without treating it as an error.

/// A value that may have been pulled into its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clamped<T> {
    /// The in-range value that was actually stored/used
    pub value: T,
    /// True when the requested value was outside the range
    pub clamped: bool,
}

impl<T> Clamped<T> {
    /// A value that was already in range.
    pub fn exact(value: T) -> Self {
        Self { value, clamped: false }
    }
}

/// Clamp `value` into `[min, max]`, recording whether it moved.
///
/// # Examples
///
/// ```
/// use pixelturtle::clamp::clamp_range;
///
/// assert_eq!(clamp_range(25, 1, 20).value, 20);
/// assert!(clamp_range(25, 1, 20).clamped);
/// assert!(!clamp_range(5, 1, 20).clamped);
/// ```
pub fn clamp_range<T: PartialOrd + Copy>(value: T, min: T, max: T) -> Clamped<T> {
    if value < min {
        Clamped { value: min, clamped: true }
    } else if value > max {
        Clamped { value: max, clamped: true }
    } else {
        Clamped::exact(value)
    }
}

/// Clamp an integer color channel into `[0, 255]`.
pub fn clamp_channel(value: i32) -> Clamped<u8> {
    let c = clamp_range(value, 0, 255);
    Clamped { value: c.value as u8, clamped: c.clamped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_range_inside() {
        let c = clamp_range(7, 3, 72);
        assert_eq!(c, Clamped::exact(7));
    }

    #[test]
    fn test_clamp_range_low_and_high() {
        assert_eq!(clamp_range(1, 3, 72), Clamped { value: 3, clamped: true });
        assert_eq!(clamp_range(100, 3, 72), Clamped { value: 72, clamped: true });
    }

    #[test]
    fn test_clamp_channel() {
        assert_eq!(clamp_channel(300).value, 255);
        assert_eq!(clamp_channel(-5).value, 0);
        assert_eq!(clamp_channel(128), Clamped::exact(128));
    }
}
