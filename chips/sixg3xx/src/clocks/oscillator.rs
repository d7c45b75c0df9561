// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Oscillator descriptor store.
//!
//! Fixed-frequency sources report constants. Sources configured by bring-up (HFXO, HFRCODPLL,
//! HFRCOEM23, CLKIN0) report the value latched when they were configured. PLL outputs are
//! recomputed from their divider registers on every query.

use core::cell::Cell;

use crate::clocks::flpll;
use crate::clocks::socpll::{SocpllDividers, SocpllReference};
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::lfrco::CFG;
use crate::registers::socpll::{CTRL, CTRL1};
use crate::se_manager::FlpllConfig;

/// Precision value meaning "not available / not deterministic"
pub const PRECISION_NOT_AVAILABLE: u16 = 0xFFFF;

pub const FSRCO_FREQUENCY_HZ: u32 = 20_000_000;
pub const LFXO_FREQUENCY_HZ: u32 = 32_768;
pub const LFRCO_FREQUENCY_HZ: u32 = 32_768;
pub const ULFRCO_FREQUENCY_HZ: u32 = 1_000;

pub const SOCPLL_PRECISION_PPM: u16 = 41;
pub const LFRCO_HIGH_PRECISION_PPM: u16 = 500;

/// Clock sources of the tree
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum OscillatorId {
    Fsrco = 0,
    Hfxo = 1,
    Hfrcodpll = 2,
    Hfrcoem23 = 3,
    Lfxo = 4,
    Lfrco = 5,
    Ulfrco = 6,
    Socpll0 = 7,
    Clkin0 = 8,
    Flpll = 9,
}

impl TryFrom<u32> for OscillatorId {
    type Error = ClockError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OscillatorId::Fsrco),
            1 => Ok(OscillatorId::Hfxo),
            2 => Ok(OscillatorId::Hfrcodpll),
            3 => Ok(OscillatorId::Hfrcoem23),
            4 => Ok(OscillatorId::Lfxo),
            5 => Ok(OscillatorId::Lfrco),
            6 => Ok(OscillatorId::Ulfrco),
            7 => Ok(OscillatorId::Socpll0),
            8 => Ok(OscillatorId::Clkin0),
            9 => Ok(OscillatorId::Flpll),
            _ => Err(ClockError::InvalidOscillator),
        }
    }
}

/// Values latched when an oscillator is configured
pub struct Oscillators<'a> {
    hw: Hardware<'a>,
    hfxo_frequency_hz: Cell<Option<u32>>,
    hfxo_precision_ppm: Cell<Option<u16>>,
    lfxo_precision_ppm: Cell<Option<u16>>,
    hfrcodpll_frequency_hz: Cell<Option<u32>>,
    hfrcoem23_frequency_hz: Cell<Option<u32>>,
    clkin0_frequency_hz: Cell<Option<u32>>,
    socpll_enabled: Cell<bool>,
    flpll_config: Cell<Option<FlpllConfig>>,
}

impl<'a> Oscillators<'a> {
    pub fn new(hw: Hardware<'a>) -> Self {
        Self {
            hw,
            hfxo_frequency_hz: Cell::new(None),
            hfxo_precision_ppm: Cell::new(None),
            lfxo_precision_ppm: Cell::new(None),
            hfrcodpll_frequency_hz: Cell::new(None),
            hfrcoem23_frequency_hz: Cell::new(None),
            clkin0_frequency_hz: Cell::new(None),
            socpll_enabled: Cell::new(false),
            flpll_config: Cell::new(None),
        }
    }

    /// Frequency of `oscillator` in Hz.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidOscillator]\): the running part has no such oscillator
    /// + [Err]\([ClockError::NotAvailable]\): the oscillator was never configured
    pub fn frequency(&self, oscillator: OscillatorId) -> Result<u32, ClockError> {
        if !self.hw.capabilities().has_oscillator(oscillator) {
            return Err(ClockError::InvalidOscillator);
        }

        let frequency = match oscillator {
            OscillatorId::Fsrco => Some(FSRCO_FREQUENCY_HZ),
            OscillatorId::Hfxo => self.hfxo_frequency_hz.get(),
            OscillatorId::Hfrcodpll => self.hfrcodpll_frequency_hz.get(),
            OscillatorId::Hfrcoem23 => self.hfrcoem23_frequency_hz.get(),
            OscillatorId::Lfxo => self.lfxo_precision_ppm.get().map(|_| LFXO_FREQUENCY_HZ),
            OscillatorId::Lfrco => Some(LFRCO_FREQUENCY_HZ),
            OscillatorId::Ulfrco => Some(ULFRCO_FREQUENCY_HZ),
            OscillatorId::Clkin0 => self.clkin0_frequency_hz.get(),
            OscillatorId::Socpll0 => return self.socpll_frequency(),
            OscillatorId::Flpll => match (self.flpll_config.get(), self.hfxo_frequency_hz.get()) {
                (Some(config), Some(hfxo)) => Some(flpll::output_frequency(&config, hfxo)),
                _ => None,
            },
        };

        frequency.ok_or(ClockError::NotAvailable)
    }

    /// Precision of `oscillator` in ppm.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidOscillator]\): the running part has no such oscillator
    /// + [Err]\([ClockError::NotAvailable]\): the oscillator is free-running, or it is a crystal
    ///   that was never configured
    pub fn precision(&self, oscillator: OscillatorId) -> Result<u16, ClockError> {
        if !self.hw.capabilities().has_oscillator(oscillator) {
            return Err(ClockError::InvalidOscillator);
        }

        match oscillator {
            OscillatorId::Hfxo => self.hfxo_precision_ppm.get().ok_or(ClockError::NotAvailable),
            OscillatorId::Lfxo => self.lfxo_precision_ppm.get().ok_or(ClockError::NotAvailable),
            OscillatorId::Lfrco => {
                if self.hw.lfrco().cfg.is_set(CFG::HIGHPRECEN) {
                    Ok(LFRCO_HIGH_PRECISION_PPM)
                } else {
                    Err(ClockError::NotAvailable)
                }
            }
            OscillatorId::Socpll0 => Ok(SOCPLL_PRECISION_PPM),
            OscillatorId::Fsrco
            | OscillatorId::Hfrcodpll
            | OscillatorId::Hfrcoem23
            | OscillatorId::Ulfrco
            | OscillatorId::Clkin0
            | OscillatorId::Flpll => Err(ClockError::NotAvailable),
        }
    }

    fn socpll_frequency(&self) -> Result<u32, ClockError> {
        if !self.socpll_enabled.get() {
            return Err(ClockError::NotAvailable);
        }

        let socpll = self.hw.socpll();
        let ctrl = socpll.ctrl.extract();
        let reference = match ctrl.read_as_enum(CTRL::REFCLKSEL) {
            Some(CTRL::REFCLKSEL::Value::REF_HFXO) => SocpllReference::Hfxo,
            Some(CTRL::REFCLKSEL::Value::REF_HFRCO) => SocpllReference::Hfrco,
            Some(CTRL::REFCLKSEL::Value::REF_EXTCLK) => SocpllReference::Clkin0,
            None => return Err(ClockError::InvalidState),
        };
        let reference_hz = self.frequency(reference.oscillator())?;

        let ctrl1 = socpll.ctrl1.extract();
        let dividers = SocpllDividers {
            divn: ctrl1.read(CTRL1::DIVN),
            divf: ctrl1.read(CTRL1::DIVF),
        };
        Ok(dividers.output_frequency(reference_hz, ctrl.is_set(CTRL::ENFRACN)))
    }

    pub(in crate::clocks) fn latch_hfxo(&self, frequency_hz: u32, precision_ppm: u16) {
        self.hfxo_frequency_hz.set(Some(frequency_hz));
        self.hfxo_precision_ppm.set(Some(precision_ppm));
    }

    pub(in crate::clocks) fn latch_lfxo(&self, precision_ppm: u16) {
        self.lfxo_precision_ppm.set(Some(precision_ppm));
    }

    pub(in crate::clocks) fn latch_hfrcodpll(&self, frequency_hz: u32) {
        self.hfrcodpll_frequency_hz.set(Some(frequency_hz));
    }

    pub(in crate::clocks) fn latch_hfrcoem23(&self, frequency_hz: u32) {
        self.hfrcoem23_frequency_hz.set(Some(frequency_hz));
    }

    pub(in crate::clocks) fn latch_clkin0(&self, frequency_hz: u32) {
        self.clkin0_frequency_hz.set(Some(frequency_hz));
    }

    pub(in crate::clocks) fn latch_socpll(&self) {
        self.socpll_enabled.set(true);
    }

    pub(in crate::clocks) fn latch_flpll(&self, config: FlpllConfig) {
        self.flpll_config.set(Some(config));
    }

    pub fn flpll_config(&self) -> Option<FlpllConfig> {
        self.flpll_config.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_specific::{SERIES2_BUFOUT, SIXG301};
    use crate::hardware::PollPolicy;
    use crate::registers::lfrco::LfrcoRegisters;
    use crate::testing::{CountingMask, FakeChip};

    #[test]
    fn raw_identities_convert() {
        assert_eq!(OscillatorId::try_from(1), Ok(OscillatorId::Hfxo));
        assert_eq!(OscillatorId::try_from(9), Ok(OscillatorId::Flpll));
        assert_eq!(
            OscillatorId::try_from(42),
            Err(ClockError::InvalidOscillator)
        );
    }

    #[test]
    fn crystals_are_unavailable_until_configured() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);

        assert_eq!(
            oscillators.frequency(OscillatorId::Hfxo),
            Err(ClockError::NotAvailable)
        );
        assert_eq!(
            oscillators.precision(OscillatorId::Hfxo),
            Err(ClockError::NotAvailable)
        );

        oscillators.latch_hfxo(38_400_000, 50);
        assert_eq!(oscillators.frequency(OscillatorId::Hfxo), Ok(38_400_000));
        assert_eq!(oscillators.precision(OscillatorId::Hfxo), Ok(50));

        assert_eq!(
            oscillators.frequency(OscillatorId::Fsrco),
            Ok(FSRCO_FREQUENCY_HZ)
        );
        assert_eq!(
            oscillators.precision(OscillatorId::Fsrco),
            Err(ClockError::NotAvailable)
        );
        assert_eq!(
            oscillators.precision(OscillatorId::Socpll0),
            Ok(SOCPLL_PRECISION_PPM)
        );
    }

    #[test]
    fn lfrco_precision_follows_high_precision_mode() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);

        assert_eq!(
            oscillators.precision(OscillatorId::Lfrco),
            Err(ClockError::NotAvailable)
        );
        LfrcoRegisters::new(&chip, SIXG301.addresses.lfrco)
            .cfg
            .write(CFG::HIGHPRECEN::SET);
        assert_eq!(
            oscillators.precision(OscillatorId::Lfrco),
            Ok(LFRCO_HIGH_PRECISION_PPM)
        );
    }

    #[test]
    fn absent_plls_are_invalid_oscillators() {
        let chip = FakeChip::with_capabilities(&SERIES2_BUFOUT);
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SERIES2_BUFOUT, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);

        assert_eq!(
            oscillators.frequency(OscillatorId::Socpll0),
            Err(ClockError::InvalidOscillator)
        );
        assert_eq!(
            oscillators.precision(OscillatorId::Flpll),
            Err(ClockError::InvalidOscillator)
        );
    }
}
