// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Factory and provisioning data consumed by the clock tree.
//!
//! Calibration values come from three places, in order of precedence: the factory-programmed
//! device information page, manufacturing tokens written at provisioning time, and the static
//! [ClockConfig](crate::clocks::config::ClockConfig).

use crate::error::ClockError;

/// Temperature grade of the flash, which bounds the external flash clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TemperatureGrade {
    /// Industrial, up to 104 MHz
    I,
    /// General, up to 133 MHz
    G,
}

/// Device information page.
pub trait DeviceInfo {
    /// Factory HFXO CTUNE. Zero when the part was not trimmed.
    fn hfxo_ctune(&self) -> u32;

    /// HFRCODPLL CAL register value for a band
    fn hfrcodpll_calibration(&self, frequency_hz: u32) -> Option<u32>;

    /// HFRCOEM23 CAL register value for a band
    fn hfrcoem23_calibration(&self, frequency_hz: u32) -> Option<u32>;

    fn flash_temperature_grade(&self) -> Option<TemperatureGrade>;
}

/// Manufacturing tokens. `None` when the token was never written.
pub trait ManufacturingTokens {
    fn mfg_ctune(&self) -> Option<u16>;

    fn mfg_lfxo_tune(&self) -> Option<u8>;
}

/// Persistent storage of a user HFXO CTUNE override.
pub trait CalibrationStore {
    fn read_hfxo_ctune(&self) -> Option<u32>;

    fn write_hfxo_ctune(&self, ctune: u32) -> Result<(), ClockError>;

    fn delete_hfxo_ctune(&self) -> Result<(), ClockError>;
}
