//! Ganymede linear-transformation routines
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.

/// A structure for mapping raw ADC counts into engineering units.
#[derive(serde::Serialize, serde::Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct LinearTransformation {
    slope: f32,
    offset: f32,
}

impl LinearTransformation {
    /// Construct a new linear transformation.
    ///
    /// # Args
    /// * `slope` - The slope of the y = mx + b equation.
    /// * `offset` - The y-intercept. Equals the b portion of y = mx + b.
    pub const fn new(slope: f32, offset: f32) -> Self {
        LinearTransformation { slope, offset }
    }

    /// Map a value from the X-domain into the Y-domain using a linear equation.
    ///
    /// # Note
    /// This is accomplished by using the equation y=mx + b.
    ///
    /// # Args
    /// * `horizontal` - The X-axis value to map into the Y-axis.
    pub fn map(&self, horizontal: f32) -> f32 {
        horizontal * self.slope + self.offset
    }
}
