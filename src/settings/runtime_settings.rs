//! Ganymede runtime protection settings
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.

use fugit::MillisDurationU32;

use super::{SETTLE_TIME, TICK_PERIOD};

/// Software trip thresholds and their re-enable hysteresis.
#[derive(serde::Serialize, serde::Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ProtectionSettings {
    /// Heatsink temperature that trips the amplifier, in tenths of a degree Celsius.
    pub trip_temperature: i16,

    /// Heatsink temperature below which an over-temperature trip may be reset.
    pub temperature_reenable: i16,

    pub fan_on_temperature: i16,
    pub fan_off_temperature: i16,

    /// Forward power that trips the amplifier, in Watts.
    pub trip_forward_power: u16,

    /// Forward power below which a forward power trip may be reset.
    pub forward_power_reenable: u16,

    /// Whether excessive forward power trips the amplifier. When false, forward power only feeds
    /// the reset condition.
    pub trip_on_forward_power: bool,

    /// The number of protection ticks to wait after startup before enabling the amplifier.
    pub settle_ticks: u16,
}

impl Default for ProtectionSettings {
    fn default() -> Self {
        Self {
            trip_temperature: 900,
            temperature_reenable: 500,
            fan_on_temperature: 400,
            fan_off_temperature: 300,
            trip_forward_power: 600,
            forward_power_reenable: 40,
            trip_on_forward_power: false,
            settle_ticks: (SETTLE_TIME.ticks() / TICK_PERIOD.ticks()) as u16,
        }
    }
}

impl ProtectionSettings {
    pub fn handle_update(settings: &mut Self, new_settings: &Self) -> Result<(), &'static str> {
        // Each hysteresis band must be non-empty or the controller could never re-arm.
        if new_settings.temperature_reenable >= new_settings.trip_temperature {
            return Err("Temperature re-enable must be below the trip temperature");
        }

        if new_settings.fan_off_temperature >= new_settings.fan_on_temperature {
            return Err("Fan off temperature must be below the fan on temperature");
        }

        if new_settings.forward_power_reenable >= new_settings.trip_forward_power {
            return Err("Forward power re-enable must be below the trip power");
        }

        if new_settings.settle_ticks == 0 {
            return Err("Settle time must be at least one tick");
        }

        *settings = *new_settings;
        Ok(())
    }

    /// Get the startup settle time.
    pub fn settle_time(&self) -> MillisDurationU32 {
        MillisDurationU32::from_ticks(u32::from(self.settle_ticks) * TICK_PERIOD.ticks())
    }
}
