// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Error type shared by every clock operation.

use core::fmt;

/// Errors returned by the clock tree engine.
///
/// Configuration errors are reported before any register is written. Errors raised while the
/// clock tree is being brought up are fatal: [crate::clocks::Clocks::init] stops at the first one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(usize)]
pub enum ClockError {
    /// A configuration value is out of range or structurally invalid
    InvalidParameter = 1,
    /// Hardware state does not match any defined clock tree node, or the requested transition is
    /// illegal from the current oscillator state
    InvalidState = 2,
    /// The requested frequency or precision cannot be known for this source
    NotAvailable = 3,
    /// The feature is absent on the running part
    NotSupported = 4,
    /// The oscillator identity is not recognized on the running part
    InvalidOscillator = 5,
    /// A bounded busy-wait ran out of polls before hardware confirmed completion
    Timeout = 6,
    /// The secure element rejected or failed a command
    Mailbox = 7,
}

impl From<ClockError> for usize {
    fn from(err: ClockError) -> usize {
        err as usize
    }
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ClockError::InvalidParameter => "invalid parameter",
            ClockError::InvalidState => "invalid clock tree state",
            ClockError::NotAvailable => "value not available",
            ClockError::NotSupported => "not supported on this part",
            ClockError::InvalidOscillator => "invalid oscillator",
            ClockError::Timeout => "hardware did not become ready",
            ClockError::Mailbox => "secure element command failed",
        };
        f.write_str(text)
    }
}
