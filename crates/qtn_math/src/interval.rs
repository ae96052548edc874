/// A closed range of `f64` values.
///
/// The bounds may be given in either order; `lerp` walks from `min` to `max`
/// regardless, which lets flipped ranges (such as negated vertical angles)
/// be sampled without reordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f64 {
        self.max - self.min
    }

    /// Returns the midpoint of the interval.
    pub fn center(&self) -> f64 {
        0.5 * (self.min + self.max)
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f64) -> bool {
        self.min <= x && x <= self.max
    }

    /// Linear interpolation: `min` at t = 0, `max` at t = 1.
    #[inline]
    pub fn lerp(&self, t: f64) -> f64 {
        self.min + (self.max - self.min) * t
    }

    /// Same interval with `min <= max`.
    pub fn ordered(&self) -> Interval {
        if self.min <= self.max {
            *self
        } else {
            Interval::new(self.max, self.min)
        }
    }
}
