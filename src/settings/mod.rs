//! Ganymede protection controller configuration
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.

pub mod runtime_settings;
pub mod sensor_scaling;

use fugit::MillisDurationU32;

use crate::hardware::ThresholdDac;

pub use runtime_settings::ProtectionSettings;
pub use sensor_scaling::SensorScaling;

/// The period at which the protection tick must be serviced.
pub const TICK_PERIOD: MillisDurationU32 = MillisDurationU32::from_ticks(10);

/// The time the rails are given to settle after power-on before the amplifier is enabled.
pub const SETTLE_TIME: MillisDurationU32 = MillisDurationU32::from_ticks(5_500);

/// PWM duty cycles of the hardware comparator threshold DACs.
///
/// # Note
/// Duty cycles are 8-bit values of a 5 V PWM. The comparators are the primary protection, so
/// these are written once at startup only.
#[derive(serde::Serialize, serde::Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ComparatorThresholds {
    pub current: u8,
    pub voltage: u8,
    pub reverse_power: u8,
}

impl ComparatorThresholds {
    /// Get the duty cycle of a threshold DAC.
    pub fn duty(&self, dac: ThresholdDac) -> u8 {
        match dac {
            ThresholdDac::Current => self.current,
            ThresholdDac::Voltage => self.voltage,
            ThresholdDac::ReversePower => self.reverse_power,
        }
    }
}

impl Default for ComparatorThresholds {
    fn default() -> Self {
        Self {
            // 2.0 V
            current: 102,
            // 3.0 V
            voltage: 156,
            // 3.0 V
            reverse_power: 156,
        }
    }
}

/// The complete configuration of an amplifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmplifierSettings {
    pub protection: ProtectionSettings,
    pub scaling: SensorScaling,
    pub thresholds: ComparatorThresholds,
}
