//! Conversion of raw ADC samples into engineering units.
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
//!
//! # Design
//! Heatsink temperature is recovered from a piecewise-linear thermistor curve using integer
//! arithmetic only. The interpolation fraction between two breakpoints is computed with a x128
//! fixed-point scale and truncated toward zero, and the final rescale uses an arithmetic right
//! shift. Current and PSU voltage are simple linear scalings, while RF power uses a square law
//! because the directional coupler detectors produce a voltage proportional to RF amplitude.
use heapless::Vec;

use crate::{linear_transformation::LinearTransformation, Error};

/// The largest sample the 10-bit converter can produce.
pub const ADC_FULL_SCALE: RawSample = 1023;

/// The maximum number of breakpoints a calibration table may hold.
pub const MAX_BREAKPOINTS: usize = 16;

/// Shift applied to the interpolation fraction.
const FRACTION_BITS: u32 = 7;

/// A raw ADC conversion result in the range `0..=ADC_FULL_SCALE`.
pub type RawSample = u16;

/// A single point on the thermistor calibration curve.
#[derive(serde::Serialize, serde::Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Breakpoint {
    /// The raw ADC sample at this point.
    pub raw: RawSample,

    /// The heatsink temperature at this point in tenths of a degree Celsius.
    pub temperature: i16,
}

impl Breakpoint {
    pub const fn new(raw: RawSample, temperature: i16) -> Self {
        Self { raw, temperature }
    }
}

/// The thermistor curve fitted for the heatsink sensor divider.
const HEATSINK_CURVE: [Breakpoint; 9] = [
    Breakpoint::new(0, -200),
    Breakpoint::new(100, 50),
    Breakpoint::new(182, 200),
    Breakpoint::new(300, 380),
    Breakpoint::new(450, 580),
    Breakpoint::new(600, 790),
    Breakpoint::new(750, 1030),
    Breakpoint::new(880, 1340),
    Breakpoint::new(ADC_FULL_SCALE, 2000),
];

const _: () = assert!(HEATSINK_CURVE.len() <= MAX_BREAKPOINTS);

/// A validated piecewise-linear map from raw samples to temperature.
///
/// # Note
/// Breakpoints are sorted by strictly increasing raw value, the first breakpoint sits at raw 0
/// and the last at [ADC_FULL_SCALE], so every valid sample falls inside the table.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    points: Vec<Breakpoint, MAX_BREAKPOINTS>,
}

impl CalibrationTable {
    /// Construct a calibration table.
    ///
    /// # Args
    /// * `points` - The breakpoints of the curve, ordered by raw sample.
    ///
    /// # Returns
    /// The table, or [Error::Bounds] if there are too few or too many breakpoints, or
    /// [Error::Invalid] if the breakpoints do not span the converter range in increasing order.
    pub fn new(points: &[Breakpoint]) -> Result<Self, Error> {
        if points.len() < 2 {
            return Err(Error::Bounds);
        }

        let points: Vec<Breakpoint, MAX_BREAKPOINTS> =
            Vec::from_slice(points).map_err(|_| Error::Bounds)?;

        if points[0].raw != 0 || points[points.len() - 1].raw != ADC_FULL_SCALE {
            return Err(Error::Invalid);
        }

        if points.windows(2).any(|pair| pair[0].raw >= pair[1].raw) {
            return Err(Error::Invalid);
        }

        Ok(Self { points })
    }

    /// The reference curve for the heatsink thermistor.
    pub fn heatsink() -> Self {
        Self {
            points: HEATSINK_CURVE.into_iter().collect(),
        }
    }

    /// Get the breakpoints of the table.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.points
    }

    /// Convert a raw sample into a temperature.
    ///
    /// # Args
    /// * `sample` - The raw sample. Must not exceed [ADC_FULL_SCALE].
    ///
    /// # Returns
    /// The temperature in tenths of a degree Celsius.
    pub fn interpolate(&self, sample: RawSample) -> i16 {
        debug_assert!(sample <= ADC_FULL_SCALE, "ADC sample out of range");

        let upper = match self.points.iter().position(|point| point.raw >= sample) {
            Some(index) => index,
            None => return self.points[self.points.len() - 1].temperature,
        };

        let high = self.points[upper];
        if high.raw == sample || upper == 0 {
            return high.temperature;
        }

        let low = self.points[upper - 1];

        let span = i32::from(high.raw - low.raw);
        let fraction = (i32::from(sample - low.raw) << FRACTION_BITS) / span;
        let rise = i32::from(high.temperature) - i32::from(low.temperature);

        (i32::from(low.temperature) + ((rise * fraction) >> FRACTION_BITS)) as i16
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        Self::heatsink()
    }
}

/// Convert a sample with a linear scale factor.
///
/// # Args
/// * `counts` - The sample, after any zero-offset has been removed. May be negative.
/// * `scale` - The transformation from counts into tenths of the engineering unit.
///
/// # Returns
/// The scaled value in tenths, clamped to the representable non-negative range.
pub fn scale_linear(counts: i32, scale: &LinearTransformation) -> u16 {
    scale.map(counts as f32).clamp(0.0, u16::MAX as f32) as u16
}

/// Convert a sample with a square-law scale factor.
///
/// # Args
/// * `sample` - The raw detector sample.
/// * `scale` - The power represented by a squared count.
///
/// # Returns
/// The power in Watts.
pub fn scale_square_law(sample: RawSample, scale: f32) -> u16 {
    let sample = f32::from(sample);
    (sample * sample * scale).clamp(0.0, u16::MAX as f32) as u16
}

/// The square-law conversion of an RF power detector.
#[derive(serde::Serialize, serde::Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct SquareLaw {
    /// The RF voltage represented by one detector count.
    pub volts_per_count: f32,

    /// The reciprocal of the load impedance in Siemens.
    pub conductance: f32,
}

impl SquareLaw {
    /// The detector law for the directional couplers into a 50 Ohm load.
    pub const fn coupler() -> Self {
        Self {
            volts_per_count: 0.1953,
            conductance: 0.02,
        }
    }

    /// Get the power represented by a squared detector count.
    pub fn scale(&self) -> f32 {
        self.volts_per_count * self.volts_per_count * self.conductance
    }

    /// Convert a detector sample into Watts.
    pub fn map(&self, sample: RawSample) -> u16 {
        scale_square_law(sample, self.scale())
    }
}

impl Default for SquareLaw {
    fn default() -> Self {
        Self::coupler()
    }
}
