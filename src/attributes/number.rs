//! Numeric types an attribute can hold.

use std::fmt::{Debug, Display};

/// A scalar attribute value.
///
/// Modifiers fold in `f64` and convert back after every step, so integer
/// attributes lose their fractional part (and wrap to their width) on each
/// fold step, exactly like a narrowing cast would.
pub trait AttributeNumber: Copy + PartialOrd + Debug + Display + 'static {
    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Narrow from `f64`, truncating toward zero for integer types.
    fn from_f64(value: f64) -> Self;
}

impl AttributeNumber for i8 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as i32 as i8
    }
}

impl AttributeNumber for i16 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as i32 as i16
    }
}

impl AttributeNumber for i32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as i32
    }
}

impl AttributeNumber for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value as i64
    }
}

impl AttributeNumber for f32 {
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl AttributeNumber for f64 {
    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}
