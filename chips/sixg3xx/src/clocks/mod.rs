// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

pub mod branch;
pub mod calibration;
pub mod clocks;
pub mod cmu;
pub mod config;
pub mod dpll;
pub mod flpll;
pub mod hfrco;
pub mod hfxo;
pub mod init;
pub mod lfrco;
pub mod lfxo;
pub mod oscillator;
pub mod socpll;

pub use crate::clocks::clocks::Clocks;
