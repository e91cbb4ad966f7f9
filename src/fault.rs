//! Trip cause latching and software threshold supervision.
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
//!
//! # Design
//! The [FaultLatch] holds the single authoritative trip cause. Any context may report a cause,
//! but only the first report after a clear is kept, so an interrupt and the polling task racing
//! each other can never overwrite the original cause. Only the [FaultMonitor] can clear the
//! latch, and only once an operator reset has been validated.
use core::sync::atomic::{AtomicU8, Ordering};

use enum_iterator::Sequence;
use serde::Serialize;

use crate::{
    hardware::{HardwareIo, InputLine, OutputLine},
    settings::ProtectionSettings,
};

/// The reason the amplifier was shut down.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Sequence, Serialize)]
#[repr(u8)]
pub enum TripCause {
    None = 0,
    OverCurrent = 1,
    OverVoltage = 2,
    OverTemperature = 3,
    OverForwardPower = 4,
    OverReversePower = 5,
}

impl TripCause {
    /// Check if the cause represents a tripped amplifier.
    pub fn is_tripped(self) -> bool {
        self != TripCause::None
    }
}

impl From<u8> for TripCause {
    fn from(value: u8) -> Self {
        match value {
            1 => TripCause::OverCurrent,
            2 => TripCause::OverVoltage,
            3 => TripCause::OverTemperature,
            4 => TripCause::OverForwardPower,
            5 => TripCause::OverReversePower,
            _ => TripCause::None,
        }
    }
}

/// A first-fault-wins register of the trip cause.
///
/// # Note
/// This may be placed in a `static` and shared between interrupt handlers and the protection
/// tick.
pub struct FaultLatch {
    cause: AtomicU8,
}

impl FaultLatch {
    pub const fn new() -> Self {
        Self {
            cause: AtomicU8::new(TripCause::None as u8),
        }
    }

    /// Latch a trip cause.
    ///
    /// # Args
    /// * `cause` - The detected cause.
    ///
    /// # Returns
    /// True if the cause was latched. False if another cause was already latched or `cause` is
    /// [TripCause::None].
    pub fn report(&self, cause: TripCause) -> bool {
        if !cause.is_tripped() {
            return false;
        }

        self.cause
            .compare_exchange(
                TripCause::None as u8,
                cause as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Get the latched trip cause.
    pub fn cause(&self) -> TripCause {
        TripCause::from(self.cause.load(Ordering::Acquire))
    }

    /// Get a report-only handle to the latch.
    pub fn reporter(&self) -> FaultReporter<'_> {
        FaultReporter { latch: self }
    }

    fn clear(&self) {
        self.cause.store(TripCause::None as u8, Ordering::Release);
    }
}

impl Default for FaultLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// A handle that can latch, but never clear, a trip cause.
#[derive(Copy, Clone)]
pub struct FaultReporter<'a> {
    latch: &'a FaultLatch,
}

impl FaultReporter<'_> {
    /// Latch a trip cause. See [FaultLatch::report].
    pub fn report(&self, cause: TripCause) -> bool {
        self.latch.report(cause)
    }
}

/// A snapshot of the hardware fault lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ComparatorStatus {
    pub over_current: bool,
    pub over_voltage: bool,
    pub reverse_power: bool,
}

impl ComparatorStatus {
    /// Sample the fault lines.
    pub fn sample(io: &mut impl HardwareIo) -> Self {
        Self {
            over_current: io.is_asserted(InputLine::CurrentComparator),
            over_voltage: io.is_asserted(InputLine::VoltageComparator),
            reverse_power: io.is_asserted(InputLine::ReversePowerLatch),
        }
    }

    /// Check if no fault line is asserted.
    pub fn is_clear(&self) -> bool {
        !(self.over_current || self.over_voltage || self.reverse_power)
    }

    /// Get the cause of the highest priority asserted line.
    pub fn cause(&self) -> TripCause {
        if self.over_current {
            TripCause::OverCurrent
        } else if self.over_voltage {
            TripCause::OverVoltage
        } else if self.reverse_power {
            TripCause::OverReversePower
        } else {
            TripCause::None
        }
    }
}

/// Re-arm the reverse power SR latch.
///
/// # Note
/// The latch only clears if the reverse power comparator is no longer tripped.
pub fn rearm_reverse_power_latch(io: &mut impl HardwareIo) {
    io.write_enable(OutputLine::LatchReset, true);
    io.write_enable(OutputLine::LatchReset, false);
}

/// Software threshold supervision with re-enable hysteresis.
pub struct FaultMonitor<'a> {
    latch: &'a FaultLatch,
    settings: ProtectionSettings,
    temperature_resettable: bool,
    forward_power_resettable: bool,
    resettable: bool,
    fan_on: bool,
}

impl<'a> FaultMonitor<'a> {
    /// Construct the monitor.
    ///
    /// # Note
    /// Both re-enable conditions start unsatisfied until the first readings have been checked.
    pub fn new(latch: &'a FaultLatch, settings: ProtectionSettings) -> Self {
        Self {
            latch,
            settings,
            temperature_resettable: false,
            forward_power_resettable: false,
            resettable: false,
            fan_on: false,
        }
    }

    /// Latch a trip cause detected in the polling context.
    pub fn report_fault(&self, cause: TripCause) -> bool {
        let latched = self.latch.report(cause);
        if latched {
            warn!("Trip latched: {:?}", cause);
        }
        latched
    }

    /// Get the latched trip cause.
    pub fn trip_cause(&self) -> TripCause {
        self.latch.cause()
    }

    /// Check heatsink temperature against the fan and trip thresholds.
    ///
    /// # Args
    /// * `temperature` - The heatsink temperature in tenths of a degree Celsius.
    /// * `io` - The amplifier I/O. The fan is driven here, and the enables are removed on a trip.
    pub fn check_temperature(&mut self, temperature: i16, io: &mut impl HardwareIo) {
        if temperature > self.settings.fan_on_temperature && !self.fan_on {
            info!("Heatsink fan on");
            self.fan_on = true;
            io.write_enable(OutputLine::Fan, true);
        } else if temperature < self.settings.fan_off_temperature && self.fan_on {
            info!("Heatsink fan off");
            self.fan_on = false;
            io.write_enable(OutputLine::Fan, false);
        }

        if temperature > self.settings.trip_temperature {
            io.deassert_enables();
            self.report_fault(TripCause::OverTemperature);
            self.temperature_resettable = false;
        } else if temperature < self.settings.temperature_reenable {
            self.temperature_resettable = true;
        }
    }

    /// Check forward power against the trip threshold.
    ///
    /// # Args
    /// * `power` - The forward power in Watts.
    /// * `io` - The amplifier I/O. The enables are removed on a trip.
    pub fn check_forward_power(&mut self, power: u16, io: &mut impl HardwareIo) {
        if self.settings.trip_on_forward_power && power > self.settings.trip_forward_power {
            io.deassert_enables();
            self.report_fault(TripCause::OverForwardPower);
            self.forward_power_resettable = false;
        } else if power < self.settings.forward_power_reenable {
            self.forward_power_resettable = true;
        }
    }

    /// Determine whether an operator reset would be accepted given the current conditions.
    ///
    /// # Args
    /// * `comparators` - The current state of the hardware fault lines.
    /// * `ptt_asserted` - Whether the transceiver is requesting transmit.
    pub fn is_resettable_with(&self, comparators: ComparatorStatus, ptt_asserted: bool) -> bool {
        comparators.is_clear()
            && !ptt_asserted
            && self.temperature_resettable
            && self.forward_power_resettable
    }

    /// Evaluate and record whether an operator reset would be accepted.
    ///
    /// # Note
    /// The reverse power latch is re-armed before the fault lines are sampled, so a latch that
    /// tripped on a transient reports clear once reverse power has gone away.
    ///
    /// # Args
    /// * `io` - The amplifier I/O.
    /// * `ptt_asserted` - Whether the transceiver is requesting transmit.
    pub fn evaluate_resettable(&mut self, io: &mut impl HardwareIo, ptt_asserted: bool) -> bool {
        rearm_reverse_power_latch(io);
        let comparators = ComparatorStatus::sample(io);
        self.resettable = self.is_resettable_with(comparators, ptt_asserted);
        self.resettable
    }

    /// Clear the latched trip cause following a validated operator reset.
    ///
    /// # Returns
    /// True if the cause was cleared. False if the last evaluation did not permit a reset.
    pub fn accept_reset(&mut self) -> bool {
        if !self.resettable {
            return false;
        }

        info!("Clearing trip: {:?}", self.latch.cause());
        self.latch.clear();
        self.resettable = false;
        true
    }

    /// Get the result of the last reset evaluation.
    pub fn is_resettable(&self) -> bool {
        self.resettable
    }

    pub fn temperature_resettable(&self) -> bool {
        self.temperature_resettable
    }

    pub fn forward_power_resettable(&self) -> bool {
        self.forward_power_resettable
    }

    pub fn fan_on(&self) -> bool {
        self.fan_on
    }

    pub fn settings(&self) -> &ProtectionSettings {
        &self.settings
    }

    /// Replace the software thresholds. Current flags are retained and follow the new thresholds
    /// from the next check.
    pub fn update_settings(&mut self, settings: ProtectionSettings) {
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        calibration::RawSample,
        hardware::{AdcChannel, ThresholdDac},
    };

    #[derive(Default)]
    struct Io {
        fan: bool,
        bias: bool,
        psu: bool,
        latch_pulses: usize,
        levels: [bool; 4],
    }

    impl Io {
        fn energized() -> Self {
            Self {
                bias: true,
                psu: true,
                // Reverse power latch idles high.
                levels: [false, false, true, false],
                ..Default::default()
            }
        }
    }

    impl HardwareIo for Io {
        fn read_raw(&mut self, _channel: AdcChannel) -> RawSample {
            0
        }

        fn read_discrete(&mut self, line: InputLine) -> bool {
            self.levels[line as usize]
        }

        fn write_enable(&mut self, line: OutputLine, high: bool) {
            match line {
                OutputLine::BiasEnable => self.bias = high,
                OutputLine::PsuEnable => self.psu = high,
                OutputLine::Fan => self.fan = high,
                OutputLine::LatchReset => {
                    if high {
                        self.latch_pulses += 1;
                    }
                }
            }
        }

        fn write_threshold(&mut self, _dac: ThresholdDac, _duty: u8) {}

        fn enable_fault_interrupts(&mut self) {}
    }

    #[test]
    fn first_fault_wins() {
        let latch = FaultLatch::new();
        assert!(latch.report(TripCause::OverCurrent));
        assert!(!latch.report(TripCause::OverVoltage));
        assert!(!latch.reporter().report(TripCause::OverTemperature));
        assert_eq!(latch.cause(), TripCause::OverCurrent);
    }

    #[test]
    fn reporting_none_is_ignored() {
        let latch = FaultLatch::new();
        assert!(!latch.report(TripCause::None));
        assert!(latch.report(TripCause::OverVoltage));
    }

    #[test]
    fn cause_round_trips_through_storage() {
        for cause in enum_iterator::all::<TripCause>() {
            assert_eq!(TripCause::from(cause as u8), cause);
        }
    }

    #[test]
    fn temperature_hysteresis() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut io = Io::energized();

        monitor.check_temperature(250, &mut io);
        assert!(monitor.temperature_resettable());
        assert!(!io.fan);

        monitor.check_temperature(910, &mut io);
        assert_eq!(latch.cause(), TripCause::OverTemperature);
        assert!(!monitor.temperature_resettable());
        assert!(io.fan);
        assert!(!io.bias && !io.psu);

        // Inside the hysteresis band nothing changes.
        monitor.check_temperature(700, &mut io);
        assert!(!monitor.temperature_resettable());

        monitor.check_temperature(490, &mut io);
        assert!(monitor.temperature_resettable());
        assert!(io.fan);

        monitor.check_temperature(350, &mut io);
        assert!(io.fan);
        monitor.check_temperature(290, &mut io);
        assert!(!io.fan);
    }

    #[test]
    fn forward_power_only_trips_when_enabled() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut io = Io::energized();

        monitor.check_forward_power(700, &mut io);
        assert_eq!(latch.cause(), TripCause::None);
        assert!(io.bias && io.psu);

        monitor.update_settings(ProtectionSettings {
            trip_on_forward_power: true,
            ..Default::default()
        });
        monitor.check_forward_power(30, &mut io);
        assert!(monitor.forward_power_resettable());

        monitor.check_forward_power(700, &mut io);
        assert_eq!(latch.cause(), TripCause::OverForwardPower);
        assert!(!monitor.forward_power_resettable());
        assert!(!io.bias && !io.psu);
    }

    #[test]
    fn reset_requires_every_condition() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut io = Io::energized();

        // Flags start unsatisfied.
        assert!(!monitor.evaluate_resettable(&mut io, false));

        monitor.check_temperature(200, &mut io);
        monitor.check_forward_power(0, &mut io);

        assert!(!monitor.is_resettable_with(
            ComparatorStatus {
                over_voltage: true,
                ..Default::default()
            },
            false
        ));
        assert!(!monitor.is_resettable_with(ComparatorStatus::default(), true));
        assert!(monitor.is_resettable_with(ComparatorStatus::default(), false));

        io.levels[InputLine::ReversePowerLatch as usize] = false;
        assert!(!monitor.evaluate_resettable(&mut io, false));
        assert_eq!(io.latch_pulses, 2);

        io.levels[InputLine::ReversePowerLatch as usize] = true;
        assert!(monitor.evaluate_resettable(&mut io, false));
    }

    #[test]
    fn forward_power_flag_alone_blocks_reset() {
        let latch = FaultLatch::new();
        let settings = ProtectionSettings {
            trip_on_forward_power: true,
            ..Default::default()
        };
        let mut monitor = FaultMonitor::new(&latch, settings);
        let mut io = Io::energized();

        monitor.check_temperature(200, &mut io);
        monitor.check_forward_power(700, &mut io);
        assert_eq!(monitor.trip_cause(), TripCause::OverForwardPower);

        // Still above the re-enable point.
        monitor.check_temperature(200, &mut io);
        monitor.check_forward_power(700, &mut io);
        assert!(monitor.temperature_resettable());
        assert!(!monitor.forward_power_resettable());

        assert!(!monitor.is_resettable_with(ComparatorStatus::default(), false));
        assert!(!monitor.evaluate_resettable(&mut io, false));
        assert!(!monitor.accept_reset());
        assert_eq!(monitor.trip_cause(), TripCause::OverForwardPower);

        monitor.check_forward_power(39, &mut io);
        assert!(monitor.evaluate_resettable(&mut io, false));
        assert!(monitor.accept_reset());
    }

    #[test]
    fn reset_is_only_accepted_after_positive_evaluation() {
        let latch = FaultLatch::new();
        let mut monitor = FaultMonitor::new(&latch, ProtectionSettings::default());
        let mut io = Io::energized();
        latch.report(TripCause::OverCurrent);

        assert!(!monitor.accept_reset());
        assert_eq!(monitor.trip_cause(), TripCause::OverCurrent);

        monitor.check_temperature(200, &mut io);
        monitor.check_forward_power(0, &mut io);
        assert!(monitor.evaluate_resettable(&mut io, false));
        assert!(monitor.accept_reset());
        assert_eq!(monitor.trip_cause(), TripCause::None);

        // Flags are retained across the reset.
        assert!(monitor.temperature_resettable());
        assert!(monitor.forward_power_resettable());
    }

    #[test]
    fn comparator_priority() {
        let status = ComparatorStatus {
            over_current: false,
            over_voltage: true,
            reverse_power: true,
        };
        assert_eq!(status.cause(), TripCause::OverVoltage);
        assert_eq!(ComparatorStatus::default().cause(), TripCause::None);
    }
}
