//! Error type definitions for the Ganymede protection controller
//!
//! # Copyright
//! Copyright (C) 2026 Ganymede developers
//! Licensed under either of the MIT or Apache-2.0 licenses, at your option.

/// An enumeration of possible configuration errors.
///
/// # Note
/// Trip conditions are not errors. They are reported through [crate::fault::TripCause].
#[derive(Debug, Copy, Clone, PartialEq, serde::Serialize)]
pub enum Error {
    /// A provided value violates an ordering or range requirement.
    Invalid,
    /// The operation is not permitted in the current hardware state.
    InvalidState,
    /// A fixed-capacity container would overflow.
    Bounds,
}
