//! Hardware comparator interrupt handling.
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
//!
//! # Design
//! The comparator interrupt handlers run asynchronously to the protection tick. They are given an
//! [InterruptBridge], which can only latch a trip cause and force the outputs off. The state
//! machine notices the latched cause on its next tick.
use enum_iterator::Sequence;

use crate::{fault::FaultReporter, fault::TripCause, hardware::InputLine, hardware::Shutdown};

/// The edge on which a fault line interrupt fires.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Edge {
    Rising,
    Falling,
}

/// Discrete lines that raise a fault interrupt.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Sequence)]
pub enum FaultLine {
    OverCurrent,
    OverVoltage,
    ReversePower,
}

impl FaultLine {
    /// Get the trip cause signalled by the line.
    pub fn cause(self) -> TripCause {
        match self {
            FaultLine::OverCurrent => TripCause::OverCurrent,
            FaultLine::OverVoltage => TripCause::OverVoltage,
            FaultLine::ReversePower => TripCause::OverReversePower,
        }
    }

    /// Get the discrete input the line is wired to.
    pub fn input(self) -> InputLine {
        match self {
            FaultLine::OverCurrent => InputLine::CurrentComparator,
            FaultLine::OverVoltage => InputLine::VoltageComparator,
            FaultLine::ReversePower => InputLine::ReversePowerLatch,
        }
    }

    /// Get the edge on which the line enters the tripped condition.
    pub fn edge(self) -> Edge {
        if self.input().active_level() {
            Edge::Rising
        } else {
            Edge::Falling
        }
    }
}

/// The interrupt-context view of the protection controller.
pub struct InterruptBridge<'a, S> {
    reporter: FaultReporter<'a>,
    outputs: S,
}

impl<'a, S: Shutdown> InterruptBridge<'a, S> {
    /// Construct the bridge.
    ///
    /// # Args
    /// * `reporter` - The handle used to latch trip causes.
    /// * `outputs` - The enable outputs that are forced off on any fault edge.
    pub fn new(reporter: FaultReporter<'a>, outputs: S) -> Self {
        Self { reporter, outputs }
    }

    /// Handle a fault edge.
    ///
    /// # Note
    /// This performs no logging and no blocking, and is safe to call from an interrupt handler.
    pub fn on_edge(&mut self, line: FaultLine) {
        self.reporter.report(line.cause());
        self.outputs.shutdown();
    }

    /// Get the enable outputs.
    pub fn outputs(&self) -> &S {
        &self.outputs
    }
}
