//! Recording collaborators for driving the protection controller on the host.
#![allow(dead_code)]

use ganymede::{
    calibration::RawSample,
    fault::{FaultLatch, TripCause},
    hardware::{AdcChannel, HardwareIo, InputLine, OutputLine, Shutdown, ThresholdDac},
    protection::{Amplifier, AmplifierMachine, Page, PageDisplay, TripReporter},
    settings::AmplifierSettings,
};

/// Raw heatsink sample for 14.1 degrees.
pub const COOL_HEATSINK: RawSample = 150;

/// I/O that records every output write and returns test-controlled inputs.
pub struct MockIo {
    samples: [RawSample; 5],
    levels: [bool; 4],
    outputs: [bool; 4],
    pub writes: Vec<(OutputLine, bool)>,
    pub thresholds: Vec<(ThresholdDac, u8)>,
    pub interrupts_enabled: bool,
}

impl MockIo {
    /// A cool, idle amplifier with every fault line clear.
    pub fn quiescent() -> Self {
        let mut io = Self {
            samples: [0; 5],
            levels: [false; 4],
            outputs: [false; 4],
            writes: Vec::new(),
            thresholds: Vec::new(),
            interrupts_enabled: false,
        };

        io.set_sample(AdcChannel::Temperature, COOL_HEATSINK);
        for line in enum_iterator::all::<InputLine>() {
            io.set_asserted(line, false);
        }

        io
    }

    pub fn set_sample(&mut self, channel: AdcChannel, sample: RawSample) {
        self.samples[channel as usize] = sample;
    }

    /// Drive an input into or out of its asserted condition.
    pub fn set_asserted(&mut self, line: InputLine, asserted: bool) {
        self.levels[line as usize] = if asserted {
            line.active_level()
        } else {
            !line.active_level()
        };
    }

    pub fn output(&self, line: OutputLine) -> bool {
        self.outputs[line as usize]
    }

    /// Count the writes that drove an output to a level.
    pub fn writes_of(&self, line: OutputLine, high: bool) -> usize {
        self.writes
            .iter()
            .filter(|write| **write == (line, high))
            .count()
    }
}

impl HardwareIo for MockIo {
    fn read_raw(&mut self, channel: AdcChannel) -> RawSample {
        self.samples[channel as usize]
    }

    fn read_discrete(&mut self, line: InputLine) -> bool {
        self.levels[line as usize]
    }

    fn write_enable(&mut self, line: OutputLine, high: bool) {
        self.outputs[line as usize] = high;
        self.writes.push((line, high));
    }

    fn write_threshold(&mut self, dac: ThresholdDac, duty: u8) {
        self.thresholds.push((dac, duty));
    }

    fn enable_fault_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub causes: Vec<TripCause>,
}

impl TripReporter for RecordingReporter {
    fn report_trip_cause(&mut self, cause: TripCause) {
        self.causes.push(cause);
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    pub pages: Vec<Page>,
    pub reset_activations: usize,
}

impl PageDisplay for RecordingDisplay {
    fn set_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    fn activate_reset(&mut self) {
        self.reset_activations += 1;
    }
}

/// Enable outputs as seen from an interrupt handler.
#[derive(Default)]
pub struct IsrOutputs {
    pub shutdowns: usize,
}

impl Shutdown for IsrOutputs {
    fn shutdown(&mut self) {
        self.shutdowns += 1;
    }
}

pub type TestMachine<'a> = AmplifierMachine<'a, MockIo, RecordingReporter, RecordingDisplay>;

/// Construct and start a controller.
///
/// # Args
/// * `latch` - The trip cause latch.
/// * `settle_ticks` - The startup settle time in ticks.
/// * `io` - The initial I/O conditions.
pub fn start_with(latch: &FaultLatch, settle_ticks: u16, io: MockIo) -> TestMachine<'_> {
    let mut settings = AmplifierSettings::default();
    settings.protection.settle_ticks = settle_ticks;

    let mut machine = TestMachine::new(Amplifier::new(
        io,
        RecordingReporter::default(),
        RecordingDisplay::default(),
        latch,
        settings,
    ));
    machine.start();
    machine
}

pub fn start(latch: &FaultLatch, settle_ticks: u16) -> TestMachine<'_> {
    start_with(latch, settle_ticks, MockIo::quiescent())
}

pub fn io_mut<'m>(machine: &'m mut TestMachine<'_>) -> &'m mut MockIo {
    machine.context_mut().io_mut()
}

pub fn io<'m>(machine: &'m TestMachine<'_>) -> &'m MockIo {
    machine.context().io()
}
