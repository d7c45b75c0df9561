// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock tree configuration and resolution for the SIXG3xx family.
//!
//! Brings up the oscillators and PLLs of the clock management unit, programs the branch
//! multiplexers, and resolves the frequency and precision of any branch from the live register
//! state. Start from [clocks::Clocks].

#![crate_name = "sixg3xx"]
#![crate_type = "rlib"]
#![no_std]

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod chip_specific;
pub mod clocks;
pub mod critical_section;
pub mod devinfo;
pub mod error;
pub mod hardware;
pub mod registers;
pub mod se_manager;

#[cfg(test)]
mod testing;

pub use crate::error::ClockError;
