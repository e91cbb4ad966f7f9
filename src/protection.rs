//! The amplifier protection state machine.
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
//!
//! # Design
//! The machine is serviced once per [crate::settings::TICK_PERIOD] from a single polling context.
//! Each tick samples every sensor, runs the software threshold checks, and then advances the state
//! machine. Trip causes latched by the comparator interrupts between ticks are noticed at the start
//! of the next tick, which moves the machine to `Tripped` from any other state.
//!
//! Leaving `Tripped` requires an operator reset. The request is only honoured when the previous
//! evaluation found every fault condition clear, and it takes effect over two ticks: the first
//! clears the latched cause and the second restores power.
use serde::Serialize;

use crate::{
    acquisition::{PeakPower, Readings, SensorAcquisition},
    calibration::RawSample,
    fault::{rearm_reverse_power_latch, ComparatorStatus, FaultLatch, FaultMonitor, TripCause},
    hardware::{HardwareIo, InputLine, OutputLine, ThresholdDac},
    settings::{AmplifierSettings, ComparatorThresholds, ProtectionSettings},
    Error,
};

/// The consumer of trip cause reports, such as the CAT link.
pub trait TripReporter {
    /// Report a trip cause. [TripCause::None] is reported when a trip has been cleared.
    fn report_trip_cause(&mut self, cause: TripCause);
}

/// The display pages selected by the controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Page {
    Splash,
    Receive,
    Transmit,
    Tripped,
}

/// The front panel display.
pub trait PageDisplay {
    /// Show a page.
    fn set_page(&mut self, page: Page);

    /// Offer the operator reset control on the trip page.
    fn activate_reset(&mut self) {}
}

/// The externally visible state of the protection machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ProtectionState {
    Uninitialized,
    Receiving,
    Transmitting,
    Tripped,
    ResetPending,
}

/// A snapshot of the controller for telemetry.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct Telemetry {
    pub state: ProtectionState,
    pub trip_cause: TripCause,
    pub readings: Readings,
    pub peaks: PeakPower,
    pub resettable: bool,
    pub fan_on: bool,
    pub rail_energized: bool,
}

/// The resources controlled by the protection machine.
pub struct Amplifier<'a, IO, R, D> {
    io: IO,
    reporter: R,
    display: D,
    acquisition: SensorAcquisition,
    monitor: FaultMonitor<'a>,
    thresholds: ComparatorThresholds,
    settle_ticks: u16,
    comparators_armed: bool,
    ptt_asserted: bool,
    rail_energized: bool,
    reset_requested: bool,
    reset_activated: bool,
}

impl<'a, IO, R, D> Amplifier<'a, IO, R, D>
where
    IO: HardwareIo,
    R: TripReporter,
    D: PageDisplay,
{
    /// Construct the amplifier.
    ///
    /// # Args
    /// * `io` - The amplifier I/O.
    /// * `reporter` - The consumer of trip cause reports.
    /// * `display` - The front panel display.
    /// * `latch` - The trip cause latch shared with the interrupt handlers.
    /// * `settings` - The amplifier configuration.
    pub fn new(
        io: IO,
        reporter: R,
        display: D,
        latch: &'a FaultLatch,
        settings: AmplifierSettings,
    ) -> Self {
        Self {
            io,
            reporter,
            display,
            acquisition: SensorAcquisition::new(settings.scaling),
            monitor: FaultMonitor::new(latch, settings.protection),
            thresholds: settings.thresholds,
            settle_ticks: settings.protection.settle_ticks,
            comparators_armed: false,
            ptt_asserted: false,
            rail_energized: false,
            reset_requested: false,
            reset_activated: false,
        }
    }

    /// Null the drain current reading.
    ///
    /// # Returns
    /// The captured zero offset, or [Error::InvalidState] if the PSU rail is energized.
    pub fn calibrate_zero(&mut self) -> Result<RawSample, Error> {
        if self.rail_energized {
            return Err(Error::InvalidState);
        }

        Ok(self.acquisition.calibrate_zero(&mut self.io))
    }

    pub fn io(&self) -> &IO {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn acquisition(&self) -> &SensorAcquisition {
        &self.acquisition
    }

    pub fn monitor(&self) -> &FaultMonitor<'a> {
        &self.monitor
    }

    /// Check if the PSU rail and bias are enabled.
    pub fn rail_energized(&self) -> bool {
        self.rail_energized
    }

    fn start(&mut self) {
        self.disable_outputs();

        for dac in enum_iterator::all::<ThresholdDac>() {
            self.io.write_threshold(dac, self.thresholds.duty(dac));
        }

        self.acquisition.calibrate_zero(&mut self.io);
        self.display.set_page(Page::Splash);
    }

    /// Latch comparators that are already faulted and arm the fault interrupts.
    ///
    /// # Note
    /// The comparator thresholds are filtered PWM outputs, so this must not run until they have
    /// settled. Later calls have no effect.
    fn arm_comparators(&mut self) {
        if self.comparators_armed {
            return;
        }

        // Comparators that are already tripped never produce an edge.
        rearm_reverse_power_latch(&mut self.io);
        let comparators = ComparatorStatus::sample(&mut self.io);
        if !comparators.is_clear() {
            self.monitor.report_fault(comparators.cause());
        }

        self.io.enable_fault_interrupts();
        self.comparators_armed = true;
    }

    fn sample(&mut self) {
        self.acquisition.tick(&mut self.io, &mut self.monitor);
        self.ptt_asserted = self.io.is_asserted(InputLine::Ptt);
    }

    fn enable_outputs(&mut self) {
        self.io.write_enable(OutputLine::PsuEnable, true);
        self.io.write_enable(OutputLine::BiasEnable, true);
        self.rail_energized = true;
    }

    fn disable_outputs(&mut self) {
        self.io.deassert_enables();
        self.rail_energized = false;
    }

    /// Advance the startup settle countdown.
    ///
    /// # Note
    /// The comparators are armed when the countdown expires.
    ///
    /// # Returns
    /// True once the countdown has expired, no cause is latched and the transceiver is not
    /// transmitting.
    fn settle(&mut self) -> bool {
        self.settle_ticks = self.settle_ticks.saturating_sub(1);
        if self.settle_ticks > 0 {
            return false;
        }

        self.arm_comparators();
        !self.monitor.trip_cause().is_tripped() && !self.ptt_asserted
    }

    fn enter_tripped(&mut self, cause: TripCause) {
        self.disable_outputs();
        self.arm_comparators();
        warn!("Amplifier tripped: {:?}", cause);
        self.reporter.report_trip_cause(cause);
        self.display.set_page(Page::Tripped);
        self.reset_requested = false;
        self.reset_activated = false;
    }

    /// Evaluate the reset conditions and act on a pending operator reset.
    ///
    /// # Returns
    /// True if the latched cause was cleared.
    fn service_trip(&mut self) -> bool {
        let resettable = self
            .monitor
            .evaluate_resettable(&mut self.io, self.ptt_asserted);

        if resettable && !self.reset_activated {
            self.reset_activated = true;
            self.display.activate_reset();
        }

        if !core::mem::take(&mut self.reset_requested) {
            return false;
        }

        if !resettable {
            info!("Reset rejected: fault conditions returned");
            return false;
        }

        // The rail is off while tripped, so the offset is captured without drain current.
        if self.calibrate_zero().is_err() {
            return false;
        }

        self.monitor.accept_reset()
    }

    fn enter_receiving(&mut self) {
        self.enable_outputs();
        self.display.set_page(Page::Receive);
    }

    fn restore(&mut self) {
        self.enable_outputs();
        info!("Amplifier restored");
        self.reporter.report_trip_cause(self.monitor.trip_cause());
        self.display.set_page(Page::Receive);
    }
}

mod sm {
    use smlang::statemachine;

    statemachine! {
        transitions: {
            *Uninitialized + Settled = Receiving,
            Uninitialized + Trip = Tripped,

            Receiving + PttAsserted = Transmitting,
            Receiving + Trip = Tripped,

            Transmitting + PttReleased = Receiving,
            Transmitting + Trip = Tripped,

            Tripped + Reset = ResetPending,

            ResetPending + Restore = Receiving,
            ResetPending + Trip = Tripped,
        }
    }
}

impl<IO, R, D> sm::StateMachineContext for Amplifier<'_, IO, R, D> {}

impl From<&sm::States> for ProtectionState {
    fn from(state: &sm::States) -> Self {
        match state {
            sm::States::Uninitialized => ProtectionState::Uninitialized,
            sm::States::Receiving => ProtectionState::Receiving,
            sm::States::Transmitting => ProtectionState::Transmitting,
            sm::States::Tripped => ProtectionState::Tripped,
            sm::States::ResetPending => ProtectionState::ResetPending,
        }
    }
}

pub type AmplifierMachine<'a, IO, R, D> = sm::StateMachine<Amplifier<'a, IO, R, D>>;

impl<'a, IO, R, D> sm::StateMachine<Amplifier<'a, IO, R, D>>
where
    IO: HardwareIo,
    R: TripReporter,
    D: PageDisplay,
{
    /// Bring the hardware into a known state.
    ///
    /// # Note
    /// Both enables are removed, the comparator thresholds are programmed and the current zero
    /// offset is captured. Once the settle time expires, [Self::update] latches comparators that
    /// are already tripped, arms the fault interrupts and enables the amplifier.
    pub fn start(&mut self) {
        info!("Ganymede v{} starting", crate::build_info::PKG_VERSION);
        self.context_mut().start();
    }

    /// Periodically called to service the protection machine.
    ///
    /// # Returns
    /// The state after the tick.
    pub fn update(&mut self) -> ProtectionState {
        self.context_mut().sample();

        // Pick up causes latched by interrupts or by the software checks.
        let cause = self.context().monitor.trip_cause();
        if cause.is_tripped()
            && !matches!(self.state(), &sm::States::Tripped)
            && self.process_event(sm::Events::Trip).is_ok()
        {
            self.context_mut().enter_tripped(cause);
        }

        let ptt_asserted = self.context().ptt_asserted;

        match ProtectionState::from(self.state()) {
            ProtectionState::Uninitialized => {
                if self.context_mut().settle() && self.process_event(sm::Events::Settled).is_ok()
                {
                    info!("Settle time elapsed, enabling amplifier");
                    self.context_mut().enter_receiving();
                }
            }

            ProtectionState::Receiving => {
                if ptt_asserted && self.process_event(sm::Events::PttAsserted).is_ok() {
                    let amplifier = self.context_mut();
                    amplifier.acquisition.clear_peaks();
                    amplifier.display.set_page(Page::Transmit);
                }
            }

            ProtectionState::Transmitting => {
                if !ptt_asserted && self.process_event(sm::Events::PttReleased).is_ok() {
                    self.context_mut().display.set_page(Page::Receive);
                }
            }

            ProtectionState::Tripped => {
                if self.context_mut().service_trip() {
                    self.process_event(sm::Events::Reset).ok();
                }
            }

            ProtectionState::ResetPending => {
                if self.process_event(sm::Events::Restore).is_ok() {
                    self.context_mut().restore();
                }
            }
        }

        self.protection_state()
    }

    /// Handle the operator pressing the reset control.
    ///
    /// # Note
    /// The request is ignored unless the amplifier is tripped and the last evaluation found every
    /// fault condition clear. An accepted request is acted on at the next tick.
    pub fn request_reset(&mut self) {
        let tripped = matches!(self.state(), &sm::States::Tripped);
        let amplifier = self.context_mut();
        if tripped && amplifier.monitor.is_resettable() {
            amplifier.reset_requested = true;
        } else {
            debug!("Ignoring reset request");
        }
    }

    /// Handle an update to the software protection thresholds.
    pub fn handle_settings(&mut self, settings: &ProtectionSettings) -> Result<(), &'static str> {
        let monitor = &mut self.context_mut().monitor;
        let mut current = *monitor.settings();
        ProtectionSettings::handle_update(&mut current, settings)?;
        monitor.update_settings(current);
        Ok(())
    }

    /// Get the peak-hold RF power readings.
    ///
    /// # Args
    /// * `clear` - Reset the peak-hold registers after reading them.
    pub fn peak_power(&mut self, clear: bool) -> PeakPower {
        let acquisition = &mut self.context_mut().acquisition;
        PeakPower {
            forward: acquisition.peak_forward_power(clear),
            reverse: acquisition.peak_reverse_power(clear),
        }
    }

    pub fn protection_state(&self) -> ProtectionState {
        ProtectionState::from(self.state())
    }

    /// Get the latched trip cause.
    pub fn trip_cause(&self) -> TripCause {
        self.context().monitor.trip_cause()
    }

    /// Get status information about the amplifier.
    pub fn status(&self) -> Telemetry {
        let amplifier = self.context();
        Telemetry {
            state: self.protection_state(),
            trip_cause: amplifier.monitor.trip_cause(),
            readings: amplifier.acquisition.readings(),
            peaks: amplifier.acquisition.peaks(),
            resettable: amplifier.monitor.is_resettable(),
            fan_on: amplifier.monitor.fan_on(),
            rail_energized: amplifier.rail_energized,
        }
    }
}
