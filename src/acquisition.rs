//! Periodic sampling of the amplifier sensors.
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
use serde::Serialize;

use crate::{
    calibration::{scale_linear, RawSample},
    fault::FaultMonitor,
    hardware::{AdcChannel, HardwareIo},
    settings::SensorScaling,
};

/// The most recent converted readings.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Readings {
    /// Heatsink temperature in tenths of a degree Celsius.
    pub temperature: i16,

    /// PSU rail in tenths of a Volt.
    pub psu_voltage: u16,

    /// Drain current in tenths of an Ampere.
    pub current: u16,

    /// Forward power in Watts.
    pub forward_power: u16,

    /// Reverse power in Watts.
    pub reverse_power: u16,
}

/// Peak-hold RF power readings in Watts.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PeakPower {
    pub forward: u16,
    pub reverse: u16,
}

/// Samples every sensor channel and maintains the peak-hold registers.
pub struct SensorAcquisition {
    scaling: SensorScaling,
    zero_offset: RawSample,
    readings: Readings,
    peaks: PeakPower,
}

impl SensorAcquisition {
    pub fn new(scaling: SensorScaling) -> Self {
        Self {
            scaling,
            zero_offset: 0,
            readings: Readings::default(),
            peaks: PeakPower::default(),
        }
    }

    /// Sample and convert every channel, then run the software threshold checks.
    ///
    /// # Args
    /// * `io` - The amplifier I/O.
    /// * `monitor` - The monitor that receives the temperature and forward power readings.
    ///
    /// # Returns
    /// The new readings.
    pub fn tick(&mut self, io: &mut impl HardwareIo, monitor: &mut FaultMonitor) -> Readings {
        let current = io.read_raw(AdcChannel::Current);
        let temperature = io.read_raw(AdcChannel::Temperature);
        let psu_voltage = io.read_raw(AdcChannel::PsuVoltage);
        let forward_power = io.read_raw(AdcChannel::ForwardPower);
        let reverse_power = io.read_raw(AdcChannel::ReversePower);

        self.readings = Readings {
            temperature: self.scaling.temperature.interpolate(temperature),
            psu_voltage: scale_linear(i32::from(psu_voltage), &self.scaling.psu_voltage),
            current: scale_linear(
                i32::from(current) - i32::from(self.zero_offset),
                &self.scaling.current,
            ),
            forward_power: self.scaling.forward_power.map(forward_power),
            reverse_power: self.scaling.reverse_power.map(reverse_power),
        };

        self.peaks.forward = self.peaks.forward.max(self.readings.forward_power);
        self.peaks.reverse = self.peaks.reverse.max(self.readings.reverse_power);

        monitor.check_temperature(self.readings.temperature, io);
        monitor.check_forward_power(self.readings.forward_power, io);

        self.readings
    }

    /// Record the drain current zero offset.
    ///
    /// # Note
    /// This must only be called while the PSU rail is de-energized, otherwise real drain current
    /// would be nulled out of every later reading.
    ///
    /// # Returns
    /// The captured offset.
    pub fn calibrate_zero(&mut self, io: &mut impl HardwareIo) -> RawSample {
        self.zero_offset = io.read_raw(AdcChannel::Current);
        debug!("Current zero offset: {}", self.zero_offset);
        self.zero_offset
    }

    /// Reset both peak-hold registers.
    pub fn clear_peaks(&mut self) {
        self.peaks = PeakPower::default();
    }

    pub fn readings(&self) -> Readings {
        self.readings
    }

    pub fn peaks(&self) -> PeakPower {
        self.peaks
    }

    /// Get the peak forward power.
    ///
    /// # Args
    /// * `clear` - Reset the forward peak-hold register after reading it.
    pub fn peak_forward_power(&mut self, clear: bool) -> u16 {
        let peak = self.peaks.forward;
        if clear {
            self.peaks.forward = 0;
        }
        peak
    }

    /// Get the peak reverse power.
    ///
    /// # Args
    /// * `clear` - Reset the reverse peak-hold register after reading it.
    pub fn peak_reverse_power(&mut self, clear: bool) -> u16 {
        let peak = self.peaks.reverse;
        if clear {
            self.peaks.reverse = 0;
        }
        peak
    }

    pub fn zero_offset(&self) -> RawSample {
        self.zero_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fault::{FaultLatch, TripCause},
        hardware::{InputLine, OutputLine, ThresholdDac},
        settings::ProtectionSettings,
    };

    #[derive(Default)]
    struct Io {
        samples: [RawSample; 5],
        enabled: bool,
    }

    impl HardwareIo for Io {
        fn read_raw(&mut self, channel: AdcChannel) -> RawSample {
            self.samples[channel as usize]
        }

        fn read_discrete(&mut self, _line: InputLine) -> bool {
            false
        }

        fn write_enable(&mut self, line: OutputLine, high: bool) {
            if line == OutputLine::PsuEnable {
                self.enabled = high;
            }
        }

        fn write_threshold(&mut self, _dac: ThresholdDac, _duty: u8) {}

        fn enable_fault_interrupts(&mut self) {}
    }

    fn sample(io: &mut Io, channel: AdcChannel, value: RawSample) {
        io.samples[channel as usize] = value;
    }

    #[test]
    fn converts_every_channel() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut acquisition = SensorAcquisition::new(SensorScaling::default());
        let mut io = Io::default();

        sample(&mut io, AdcChannel::Temperature, 150);
        sample(&mut io, AdcChannel::Current, 1003);
        sample(&mut io, AdcChannel::PsuVoltage, 1003);
        sample(&mut io, AdcChannel::ForwardPower, 1023);
        sample(&mut io, AdcChannel::ReversePower, 0);

        let readings = acquisition.tick(&mut io, &mut monitor);
        assert_eq!(
            readings,
            Readings {
                temperature: 141,
                psu_voltage: 587,
                current: 195,
                forward_power: 798,
                reverse_power: 0,
            }
        );
        assert_eq!(acquisition.readings(), readings);
    }

    #[test]
    fn current_is_nulled_and_clamped() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut acquisition = SensorAcquisition::new(SensorScaling::default());
        let mut io = Io::default();

        sample(&mut io, AdcChannel::Current, 20);
        assert_eq!(acquisition.calibrate_zero(&mut io), 20);

        sample(&mut io, AdcChannel::Current, 10);
        assert_eq!(acquisition.tick(&mut io, &mut monitor).current, 0);

        sample(&mut io, AdcChannel::Current, 1023);
        assert_eq!(acquisition.tick(&mut io, &mut monitor).current, 195);

        // Recalibration overwrites unconditionally.
        sample(&mut io, AdcChannel::Current, 0);
        acquisition.calibrate_zero(&mut io);
        assert_eq!(acquisition.zero_offset(), 0);
    }

    #[test]
    fn peaks_hold_until_cleared() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut acquisition = SensorAcquisition::new(SensorScaling::default());
        let mut io = Io::default();

        sample(&mut io, AdcChannel::ForwardPower, 800);
        sample(&mut io, AdcChannel::ReversePower, 200);
        acquisition.tick(&mut io, &mut monitor);

        sample(&mut io, AdcChannel::ForwardPower, 100);
        sample(&mut io, AdcChannel::ReversePower, 50);
        acquisition.tick(&mut io, &mut monitor);

        let peaks = acquisition.peaks();
        assert!(peaks.forward > acquisition.readings().forward_power);
        assert!(peaks.reverse > acquisition.readings().reverse_power);

        assert_eq!(acquisition.peak_forward_power(true), peaks.forward);
        assert_eq!(acquisition.peak_forward_power(false), 0);
        assert_eq!(acquisition.peak_reverse_power(false), peaks.reverse);

        acquisition.clear_peaks();
        assert_eq!(acquisition.peaks(), PeakPower::default());
    }

    #[test]
    fn readings_feed_the_monitor() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut acquisition = SensorAcquisition::new(SensorScaling::default());
        let mut io = Io {
            enabled: true,
            ..Default::default()
        };

        // 1000 counts is above 90 degrees on the heatsink curve.
        sample(&mut io, AdcChannel::Temperature, 1000);
        acquisition.tick(&mut io, &mut monitor);

        assert_eq!(latch.cause(), TripCause::OverTemperature);
        assert!(!io.enabled);
    }
}
