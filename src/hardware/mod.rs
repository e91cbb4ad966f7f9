//! Ganymede hardware-level definitions
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
//!
//! The controller never touches registers directly. All sampling, discrete line reads and output
//! drives go through [HardwareIo], which is implemented for embedded-hal pins by
//! [amplifier_pins::AmplifierPins].
use enum_iterator::Sequence;
use serde::Serialize;

use crate::calibration::RawSample;

pub mod amplifier_pins;

/// The analog inputs sampled every tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Sequence, Serialize)]
pub enum AdcChannel {
    /// Drain current sense amplifier.
    Current,
    /// Heatsink thermistor divider.
    Temperature,
    /// PSU rail voltage divider.
    PsuVoltage,
    ForwardPower,
    ReversePower,
}

/// The digital inputs read by the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Sequence, Serialize)]
pub enum InputLine {
    /// Drain over-current comparator. Driven high when tripped.
    CurrentComparator,
    /// PSU over-voltage comparator. Driven high when tripped.
    VoltageComparator,
    /// Reverse power SR latch output. Driven low when tripped.
    ReversePowerLatch,
    /// Push-to-talk from the transceiver. Driven high for transmit.
    Ptt,
}

impl InputLine {
    /// Get the electrical level that represents the asserted condition of the line.
    pub fn active_level(self) -> bool {
        !matches!(self, InputLine::ReversePowerLatch)
    }

    /// Check if an electrical level represents the asserted condition.
    pub fn is_asserted(self, level: bool) -> bool {
        level == self.active_level()
    }
}

/// The digital outputs driven by the controller. All are active-high.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Sequence, Serialize)]
pub enum OutputLine {
    BiasEnable,
    PsuEnable,
    Fan,
    /// Re-arm strobe for the reverse power SR latch.
    LatchReset,
}

/// The PWM-filtered DACs that set the hardware comparator thresholds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Sequence, Serialize)]
pub enum ThresholdDac {
    Current,
    Voltage,
    ReversePower,
}

/// Physical I/O required by the protection controller.
///
/// # Note
/// Implementations are expected to be fail-safe: a failed read reports the tripped or unsafe
/// condition and a failed enable write leaves the output de-asserted where possible.
pub trait HardwareIo {
    /// Sample an analog channel.
    fn read_raw(&mut self, channel: AdcChannel) -> RawSample;

    /// Read the electrical level of a discrete input. `true` is high.
    fn read_discrete(&mut self, line: InputLine) -> bool;

    /// Drive a discrete output. `true` is high.
    fn write_enable(&mut self, line: OutputLine, high: bool);

    /// Program a comparator threshold DAC with an 8-bit PWM duty cycle.
    fn write_threshold(&mut self, dac: ThresholdDac, duty: u8);

    /// Arm the edge interrupts of the hardware comparator lines.
    fn enable_fault_interrupts(&mut self);

    /// Check if a discrete input is in its asserted condition.
    fn is_asserted(&mut self, line: InputLine) -> bool {
        let level = self.read_discrete(line);
        line.is_asserted(level)
    }

    /// Remove drain bias and the PSU rail together.
    fn deassert_enables(&mut self) {
        self.write_enable(OutputLine::BiasEnable, false);
        self.write_enable(OutputLine::PsuEnable, false);
    }
}

/// The only output capability available from interrupt context.
pub trait Shutdown {
    /// Immediately de-assert drain bias and the PSU rail.
    fn shutdown(&mut self);
}
