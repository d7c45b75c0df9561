// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! External flash PLL and the QSPI clock selection.
//!
//! The QSPI clock and its harmonics must stay out of the 2.4 GHz radio band. The highest
//! frequency the flash accepts is lowered to the middle of the widest gap between two
//! consecutive harmonics straddling the band, then the FLPLL dividers are derived from it with
//! HFXO as reference. The secure element owns the FLPLL: every change goes through its mailbox.

use core::cell::Cell;

use log::debug;

use crate::clocks::config::{ExtFlashConfig, FlashMaxFrequency};
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::devinfo::{DeviceInfo, TemperatureGrade};
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::se_manager::{
    ClkPerPresc, FlpllConfig, PllClkFreqSel, QspiRefClock, SecureElementMailbox,
};

/// Lower edge of the 2.4 GHz radio band
pub const RADIO_BAND_LOW_HZ: u64 = 2_400_000_000;
/// Upper edge of the 2.4 GHz radio band
pub const RADIO_BAND_HIGH_HZ: u64 = 2_483_500_000;

const INT_DIV_MIN: u64 = 6;
const INT_DIV_MAX: u64 = u8::MAX as u64;
const FRACTION: u64 = 2048;
const RANGE_BASE_HZ: u64 = 140_000_000;
const RANGE_STEP_HZ: u64 = 20_000_000;

/// Highest QSPI frequency not above `max_hz` whose harmonics all avoid the radio band.
///
/// # Errors
///
/// + [Err]\([ClockError::InvalidParameter]\): `max_hz` is zero or too high to leave a gap
///   between two harmonics
pub fn qspi_frequency_scale(max_hz: u32) -> Result<u32, ClockError> {
    let max = max_hz as u64;
    if max == 0 {
        return Err(ClockError::InvalidParameter);
    }

    let mut min_harmonic = RADIO_BAND_LOW_HZ / max;
    let mut max_harmonic = min_harmonic + 1;
    let factored_max = max * max_harmonic;
    if factored_max > RADIO_BAND_LOW_HZ && factored_max < RADIO_BAND_HIGH_HZ {
        min_harmonic += 1;
        max_harmonic += 1;
    }
    if min_harmonic == 0 {
        return Err(ClockError::InvalidParameter);
    }

    let max_boundary = RADIO_BAND_LOW_HZ / min_harmonic;
    let min_boundary = RADIO_BAND_HIGH_HZ / max_harmonic;
    if min_boundary >= max_boundary {
        return Err(ClockError::InvalidParameter);
    }

    let scaled = (max_boundary + min_boundary) / 2;
    if scaled > max {
        return Err(ClockError::InvalidParameter);
    }
    Ok(scaled as u32)
}

/// FLPLL settings producing `target_hz` from HFXO.
///
/// # Errors
///
/// + [Err]\([ClockError::InvalidParameter]\): `hfxo_hz` is zero or the dividers do not fit
pub fn derive_config(target_hz: u32, hfxo_hz: u32) -> Result<FlpllConfig, ClockError> {
    if hfxo_hz == 0 {
        return Err(ClockError::InvalidParameter);
    }
    let target = target_hz as u64;
    let hfxo = hfxo_hz as u64;

    let mut presc = ClkPerPresc::Div1;
    let mut int_div = target * 2 * presc.divisor() as u64 / hfxo;
    if int_div < INT_DIV_MIN {
        presc = ClkPerPresc::Div2;
        int_div = target * 2 * presc.divisor() as u64 / hfxo;
    }
    if int_div > INT_DIV_MAX {
        return Err(ClockError::InvalidParameter);
    }

    let remainder = target * 2 * presc.divisor() as u64 % hfxo;
    let frac_div = FRACTION * remainder / hfxo;

    let sclk = target * presc.divisor() as u64;
    let range = if sclk < RANGE_BASE_HZ {
        PllClkFreqSel::Sclk120Mhz
    } else {
        PllClkFreqSel::from_index(((sclk - RANGE_BASE_HZ) / RANGE_STEP_HZ + 1) as u32)
    };

    Ok(FlpllConfig {
        ref_clock: QspiRefClock::Hfxo,
        int_div: int_div as u8,
        frac_div: frac_div as u16,
        range,
        presc,
    })
}

/// QSPI clock produced by `config` with an HFXO reference at `hfxo_hz`
pub fn output_frequency(config: &FlpllConfig, hfxo_hz: u32) -> u32 {
    let multiplier = config.int_div as u64 * FRACTION + config.frac_div as u64;
    let divider = FRACTION * 2 * config.presc.divisor() as u64;
    (hfxo_hz as u64 * multiplier / divider) as u32
}

/// QSPI clock the FLPLL should produce for `config`.
///
/// # Errors
///
/// + [Err]\([ClockError::InvalidParameter]\): the maximum frequency is zero, the custom
///   frequency is zero or not below the maximum, or the maximum cannot be scaled
/// + [Err]\([ClockError::NotAvailable]\): the maximum comes from the part grade and the device
///   information carries none
pub fn target_frequency(
    config: &ExtFlashConfig,
    devinfo: &dyn DeviceInfo,
) -> Result<u32, ClockError> {
    let max_hz = match config.max_frequency {
        FlashMaxFrequency::Hz(0) => return Err(ClockError::InvalidParameter),
        FlashMaxFrequency::Hz(hz) => hz,
        FlashMaxFrequency::PartGrade => match devinfo.flash_temperature_grade() {
            Some(TemperatureGrade::I) => 104_000_000,
            Some(TemperatureGrade::G) => 133_000_000,
            None => return Err(ClockError::NotAvailable),
        },
    };

    match config.custom_frequency_hz {
        // Custom frequencies are used as is.
        Some(custom) if custom == 0 || custom >= max_hz => Err(ClockError::InvalidParameter),
        Some(custom) => Ok(custom),
        None => qspi_frequency_scale(max_hz),
    }
}

/// QSPI clock source tracking, shared by every [ExtFlash] view
pub struct ExtFlashState {
    current: Cell<Option<OscillatorId>>,
    se_version: Cell<u32>,
}

impl ExtFlashState {
    pub const fn new() -> Self {
        Self {
            current: Cell::new(None),
            se_version: Cell::new(0),
        }
    }

    pub fn se_version(&self) -> u32 {
        self.se_version.get()
    }
}

impl Default for ExtFlashState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ExtFlash<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
    se: &'a dyn SecureElementMailbox,
    state: &'a ExtFlashState,
}

impl<'a> ExtFlash<'a> {
    pub(in crate::clocks) fn new(
        hw: Hardware<'a>,
        oscillators: &'a Oscillators<'a>,
        se: &'a dyn SecureElementMailbox,
        state: &'a ExtFlashState,
    ) -> Self {
        Self {
            hw,
            oscillators,
            se,
            state,
        }
    }

    fn se_supports_flpll(&self) -> bool {
        self.state.se_version.get() >= self.hw.capabilities().flpll_min_se_version
    }

    /// Query and remember the secure element firmware version.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::Mailbox]\): the secure element did not answer
    pub fn read_se_version(&self) -> Result<u32, ClockError> {
        let version = self.se.firmware_version()?;
        self.state.se_version.set(version);
        debug!("SE firmware version {:#08x}", version);
        Ok(version)
    }

    /// Derive the FLPLL settings for `config` and latch them. Does nothing when the secure
    /// element firmware cannot drive the FLPLL.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotAvailable]\): HFXO is not configured
    /// + [Err]\([ClockError::InvalidParameter]\): see [target_frequency] and [derive_config]
    pub fn configure(
        &self,
        config: &ExtFlashConfig,
        devinfo: &dyn DeviceInfo,
    ) -> Result<(), ClockError> {
        if !self.se_supports_flpll() {
            return Ok(());
        }

        let hfxo_hz = self.oscillators.frequency(OscillatorId::Hfxo)?;
        let target_hz = target_frequency(config, devinfo)?;
        let flpll = derive_config(target_hz, hfxo_hz)?;
        self.oscillators.latch_flpll(flpll);

        debug!(
            "FLPLL: {} Hz -> INT {} FRAC {} {:?} {:?}",
            target_hz, flpll.int_div, flpll.frac_div, flpll.range, flpll.presc
        );
        Ok(())
    }

    /// Adopt the FLPLL settings latched by the secure element.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::Mailbox]\): the secure element rejected the request
    pub fn read_back(&self) -> Result<FlpllConfig, ClockError> {
        let config = self.se.flpll_config()?;
        self.oscillators.latch_flpll(config);
        Ok(config)
    }

    /// Clock the QSPI controller from `oscillator`.
    ///
    /// Secure element firmware too old to drive the FLPLL keeps its own setting and the call
    /// succeeds without effect.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotSupported]\): the running part has no FLPLL
    /// + [Err]\([ClockError::NotAvailable]\): no FLPLL settings with an HFXO reference
    /// + [Err]\([ClockError::InvalidParameter]\): `oscillator` is neither FLPLL nor FSRCO
    /// + [Err]\([ClockError::Mailbox]\): the secure element rejected the command
    pub fn set(&self, oscillator: OscillatorId) -> Result<(), ClockError> {
        if !self.hw.capabilities().has_flpll {
            return Err(ClockError::NotSupported);
        }
        if self.state.current.get() == Some(oscillator) {
            return Ok(());
        }
        if !self.se_supports_flpll() {
            return Ok(());
        }

        match oscillator {
            OscillatorId::Flpll => match self.oscillators.flpll_config() {
                Some(config) if config.ref_clock == QspiRefClock::Hfxo => self
                    .hw
                    .atomic(|| self.se.configure_qspi_clock_flpll(&config))?,
                _ => return Err(ClockError::NotAvailable),
            },
            OscillatorId::Fsrco => self.hw.atomic(|| self.se.configure_qspi_clock_fsrco())?,
            _ => return Err(ClockError::InvalidParameter),
        }

        self.state.current.set(Some(oscillator));
        debug!("QSPI clock source: {:?}", oscillator);
        Ok(())
    }

    /// Current QSPI clock source.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotSupported]\): the running part has no FLPLL
    /// + [Err]\([ClockError::NotAvailable]\): the source was never set
    pub fn get(&self) -> Result<OscillatorId, ClockError> {
        if !self.hw.capabilities().has_flpll {
            return Err(ClockError::NotSupported);
        }
        self.state.current.get().ok_or(ClockError::NotAvailable)
    }

    /// Run `f` with the QSPI controller on FSRCO, then switch back to the previous source.
    ///
    /// The previous source is restored even when `f` fails. The first error wins.
    pub fn with_fsrco<F, R>(&self, f: F) -> Result<R, ClockError>
    where
        F: FnOnce() -> Result<R, ClockError>,
    {
        let previous = match self.state.current.get() {
            Some(previous) if self.hw.capabilities().has_flpll => previous,
            _ => return f(),
        };

        self.set(OscillatorId::Fsrco)?;
        let result = f();
        let restored = self.set(previous);
        let value = result?;
        restored?;
        Ok(value)
    }
}
