//! embedded-hal bindings of the amplifier control lines.
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
use embedded_hal::digital::{InputPin, OutputPin};

use super::{AdcChannel, HardwareIo, InputLine, OutputLine, Shutdown, ThresholdDac};
use crate::{
    calibration::{RawSample, ADC_FULL_SCALE},
    interrupt::{Edge, FaultLine},
};

/// The converter side of the board: ADC, threshold PWM and the edge interrupt controller.
pub trait AnalogFrontEnd {
    /// Perform a single conversion.
    ///
    /// # Returns
    /// The sample, or None if the conversion failed.
    fn convert(&mut self, channel: AdcChannel) -> Option<RawSample>;

    /// Set the PWM duty cycle feeding a threshold DAC filter.
    fn set_duty(&mut self, dac: ThresholdDac, duty: u8);

    /// Arm an edge interrupt on a discrete input.
    fn arm_edge(&mut self, line: InputLine, edge: Edge);
}

/// The discrete inputs of the amplifier.
pub struct InputPins<I> {
    pub current_comparator: I,
    pub voltage_comparator: I,
    pub reverse_power_latch: I,
    pub ptt: I,
}

/// The discrete outputs of the amplifier.
pub struct OutputPins<O> {
    pub bias_enable: O,
    pub psu_enable: O,
    pub fan: O,
    pub latch_reset: O,
}

/// All physical I/O of an amplifier.
pub struct AmplifierPins<A, I, O> {
    front_end: A,
    inputs: InputPins<I>,
    outputs: OutputPins<O>,
}

impl<A, I, O> AmplifierPins<A, I, O>
where
    A: AnalogFrontEnd,
    I: InputPin,
    O: OutputPin,
{
    /// Construct the amplifier I/O.
    ///
    /// # Note
    /// All outputs are driven low, leaving the amplifier unbiased and unpowered.
    ///
    /// # Args
    /// * `front_end` - The ADC, PWM and interrupt controller.
    /// * `inputs` - The comparator, latch and PTT inputs.
    /// * `outputs` - The enable, fan and latch re-arm outputs.
    pub fn new(front_end: A, inputs: InputPins<I>, outputs: OutputPins<O>) -> Self {
        let mut pins = Self {
            front_end,
            inputs,
            outputs,
        };

        for line in enum_iterator::all::<OutputLine>() {
            pins.write_enable(line, false);
        }

        pins
    }

    /// Get the analog front end.
    pub fn front_end(&self) -> &A {
        &self.front_end
    }

    fn input(&mut self, line: InputLine) -> &mut I {
        match line {
            InputLine::CurrentComparator => &mut self.inputs.current_comparator,
            InputLine::VoltageComparator => &mut self.inputs.voltage_comparator,
            InputLine::ReversePowerLatch => &mut self.inputs.reverse_power_latch,
            InputLine::Ptt => &mut self.inputs.ptt,
        }
    }

    fn output(&mut self, line: OutputLine) -> &mut O {
        match line {
            OutputLine::BiasEnable => &mut self.outputs.bias_enable,
            OutputLine::PsuEnable => &mut self.outputs.psu_enable,
            OutputLine::Fan => &mut self.outputs.fan,
            OutputLine::LatchReset => &mut self.outputs.latch_reset,
        }
    }
}

impl<A, I, O> HardwareIo for AmplifierPins<A, I, O>
where
    A: AnalogFrontEnd,
    I: InputPin,
    O: OutputPin,
{
    fn read_raw(&mut self, channel: AdcChannel) -> RawSample {
        match self.front_end.convert(channel) {
            Some(sample) => sample.min(ADC_FULL_SCALE),
            None => {
                // A full-scale reading errs towards tripping.
                warn!("Conversion failed on {:?}", channel);
                ADC_FULL_SCALE
            }
        }
    }

    fn read_discrete(&mut self, line: InputLine) -> bool {
        self.input(line).is_high().unwrap_or_else(|_| {
            warn!("Failed to read {:?}", line);
            line.active_level()
        })
    }

    fn write_enable(&mut self, line: OutputLine, high: bool) {
        let pin = self.output(line);
        let result = if high { pin.set_high() } else { pin.set_low() };
        if result.is_err() {
            error!("Failed to drive {:?}", line);
        }
    }

    fn write_threshold(&mut self, dac: ThresholdDac, duty: u8) {
        self.front_end.set_duty(dac, duty);
    }

    fn enable_fault_interrupts(&mut self) {
        for line in enum_iterator::all::<FaultLine>() {
            self.front_end.arm_edge(line.input(), line.edge());
        }
    }
}

impl<A, I, O> Shutdown for AmplifierPins<A, I, O>
where
    A: AnalogFrontEnd,
    I: InputPin,
    O: OutputPin,
{
    fn shutdown(&mut self) {
        self.deassert_enables();
    }
}
