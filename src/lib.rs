//! Ganymede LDMOS amplifier protection controller
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.
//!
//! The controller continuously measures drain current, PSU voltage, heatsink temperature and
//! forward/reverse RF power, latches the first trip cause that occurs and sequences the operator
//! reset once every fault condition has cleared with hysteresis.
//!
//! # Structure
//! * [calibration] - Raw ADC sample to engineering unit conversions.
//! * [acquisition] - Sampling of all channels, zero-offset nulling and peak-hold.
//! * [fault] - The trip-cause latch and the threshold/hysteresis bookkeeping.
//! * [interrupt] - The restricted capability used by the hardware comparator interrupts.
//! * [protection] - The periodic protection state machine.
//! * [cat] - Trip cause encoding for the CAT reporting link.
//!
//! The controller owns no timer and no pins. It is driven by calling
//! [protection::AmplifierMachine::update] every [settings::TICK_PERIOD], and all physical I/O
//! passes through the [hardware::HardwareIo] trait.
#![cfg_attr(not(test), no_std)]

#[macro_use]
extern crate log;

pub mod acquisition;
pub mod calibration;
pub mod cat;
mod error;
pub mod fault;
pub mod hardware;
pub mod interrupt;
pub mod linear_transformation;
pub mod logger;
pub mod protection;
pub mod settings;

pub use error::Error;

/// Build-time package information.
pub mod build_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
