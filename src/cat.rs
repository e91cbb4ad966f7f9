//! Encoding of controller state for the CAT serial link.
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
//!
//! # Note
//! Trip causes are exchanged as single-bit flags on the link. The mapping below is the only place
//! this encoding exists, and internal logic always uses [TripCause].
use bit_field::BitField;

use crate::{fault::TripCause, protection::TripReporter};

/// Product identifier reported in the version number.
pub const PRODUCT_ID: u32 = 3;

pub const HARDWARE_VERSION: u32 = 1;

pub const SOFTWARE_VERSION: u32 = 5;

/// The trip command parameter that requests an operator reset.
pub const RESET_TRIP_PARAMETER: i32 = 32;

/// Link bit positions of each trip cause.
const TRIP_BITS: [(TripCause, usize); 5] = [
    (TripCause::OverReversePower, 0),
    (TripCause::OverCurrent, 1),
    (TripCause::OverVoltage, 2),
    (TripCause::OverTemperature, 3),
    (TripCause::OverForwardPower, 4),
];

/// Messages sent on the link.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatMessage {
    /// Amplifier trip status.
    AmplifierTrip(u8),
    /// Software version.
    Version(u32),
}

/// The transmit side of the CAT link.
pub trait CatSink {
    fn send(&mut self, message: CatMessage);
}

/// Requests received from the link.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatRequest {
    ResetTrip,
}

/// Encode a trip cause for the link.
pub fn trip_code(cause: TripCause) -> u8 {
    let mut code = 0u8;
    if let Some((_, bit)) = TRIP_BITS.iter().find(|(tripped, _)| *tripped == cause) {
        code.set_bit(*bit, true);
    }

    code
}

/// Decode a trip code received from the link.
///
/// # Returns
/// The cause, or None if the code does not encode exactly one known cause.
pub fn trip_cause_from_code(code: u8) -> Option<TripCause> {
    if code == 0 {
        return Some(TripCause::None);
    }

    if code.count_ones() != 1 {
        return None;
    }

    TRIP_BITS
        .iter()
        .find(|(_, bit)| code.get_bit(*bit))
        .map(|(cause, _)| *cause)
}

/// Decode the parameter of a trip command.
pub fn decode_trip_command(parameter: i32) -> Option<CatRequest> {
    if parameter == RESET_TRIP_PARAMETER {
        Some(CatRequest::ResetTrip)
    } else {
        debug!("Ignoring trip command parameter {}", parameter);
        None
    }
}

/// Get the version number reported on the link.
pub fn version_number() -> u32 {
    PRODUCT_ID * 100_000 + HARDWARE_VERSION * 1_000 + SOFTWARE_VERSION
}

/// Reports trip causes onto the CAT link.
pub struct CatReporter<S> {
    sink: S,
}

impl<S: CatSink> CatReporter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Send the version number.
    pub fn report_version(&mut self) {
        self.sink.send(CatMessage::Version(version_number()));
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

impl<S: CatSink> TripReporter for CatReporter<S> {
    fn report_trip_cause(&mut self, cause: TripCause) {
        self.sink.send(CatMessage::AmplifierTrip(trip_code(cause)));
    }
}
