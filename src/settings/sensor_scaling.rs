//! Conversion factors of the sensing front end
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.

use crate::{
    calibration::{CalibrationTable, SquareLaw},
    linear_transformation::LinearTransformation,
};

/// The per-channel conversions from raw samples to engineering units.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorScaling {
    pub temperature: CalibrationTable,

    /// Drain current counts to tenths of an Ampere.
    pub current: LinearTransformation,

    /// PSU rail counts to tenths of a Volt.
    pub psu_voltage: LinearTransformation,

    pub forward_power: SquareLaw,
    pub reverse_power: SquareLaw,
}

impl Default for SensorScaling {
    fn default() -> Self {
        Self {
            temperature: CalibrationTable::heatsink(),
            // 19.5 mA per count
            current: LinearTransformation::new(0.195, 0.0),
            // 58.6 mV per count
            psu_voltage: LinearTransformation::new(0.586, 0.0),
            forward_power: SquareLaw::coupler(),
            reverse_power: SquareLaw::coupler(),
        }
    }
}
