// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Fractional system PLL (SOCPLL0).
//!
//! The output frequency is `f_ref * (DIVN + 2 + DIVF / 1024) / 6`. In Integer-N mode the
//! fractional part is ignored and DIVF is written as zero.
//!
//! # Usage
//!
//! ```rust,ignore
//! let dividers = SocpllDividers::compute(150_000_000, 38_000_000);
//! dividers.validate(true)?;
//! assert_eq!((dividers.divn, dividers.divf), (21, 701));
//! ```

use log::debug;

use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::socpll::{CTRL, CTRL1, LOCK, STATUS, UNLOCK_KEY};

const DIVN_MAX: u32 = 0x7F;
const DIVF_MAX: u32 = 0x3FF;
const FRACTION: u64 = 1024;
const POST_DIVIDER: u64 = 6;

/// Reference of the SOCPLL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SocpllReference {
    Hfxo = 0,
    Hfrco = 1,
    Clkin0 = 2,
}

impl SocpllReference {
    pub fn oscillator(self) -> OscillatorId {
        match self {
            SocpllReference::Hfxo => OscillatorId::Hfxo,
            SocpllReference::Hfrco => OscillatorId::Hfrcodpll,
            SocpllReference::Clkin0 => OscillatorId::Clkin0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SocpllDividers {
    pub divn: u32,
    pub divf: u32,
}

impl SocpllDividers {
    /// Dividers bringing `reference_hz` closest to `target_hz`, clamped to the field widths
    pub fn compute(target_hz: u32, reference_hz: u32) -> Self {
        if reference_hz == 0 {
            return Self { divn: 0, divf: 0 };
        }
        let reference = reference_hz as u64;
        let scaled = POST_DIVIDER * target_hz as u64;

        let divn = (scaled / reference).saturating_sub(2).min(DIVN_MAX as u64);
        let fraction = (scaled * FRACTION + reference / 2) / reference;
        let divf = fraction
            .saturating_sub(FRACTION * (divn + 2))
            .min(DIVF_MAX as u64);

        Self {
            divn: divn as u32,
            divf: divf as u32,
        }
    }

    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): a divider overflows its field, DIVN is zero in
    ///   Integer-N mode or DIVF is zero in Fractional-N mode
    pub fn validate(&self, fractional: bool) -> Result<(), ClockError> {
        if self.divn > DIVN_MAX || self.divf > DIVF_MAX {
            return Err(ClockError::InvalidParameter);
        }
        if (fractional && self.divf == 0) || (!fractional && self.divn == 0) {
            return Err(ClockError::InvalidParameter);
        }
        Ok(())
    }

    pub fn output_frequency(&self, reference_hz: u32, fractional: bool) -> u32 {
        let divf = if fractional { self.divf as u64 } else { 0 };
        let numerator = reference_hz as u64 * ((self.divn as u64 + 2) * FRACTION + divf);
        (numerator / (POST_DIVIDER * FRACTION)) as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SocpllConfig {
    pub frequency_hz: u32,
    pub reference: SocpllReference,
    pub fractional: bool,
    /// Explicit dividers. Computed from `frequency_hz` when absent.
    pub dividers: Option<SocpllDividers>,
}

impl Default for SocpllConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 150_000_000,
            reference: SocpllReference::Hfrco,
            fractional: true,
            dividers: None,
        }
    }
}

pub struct Socpll<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
}

impl<'a> Socpll<'a> {
    pub(in crate::clocks) fn new(hw: Hardware<'a>, oscillators: &'a Oscillators<'a>) -> Self {
        Self { hw, oscillators }
    }

    /// Configure and lock the PLL, then leave it running on demand.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotSupported]\): the running part has no SOCPLL
    /// + [Err]\([ClockError::NotAvailable]\): the reference oscillator is not configured
    /// + [Err]\([ClockError::InvalidParameter]\): invalid dividers
    /// + [Err]\([ClockError::Timeout]\): the PLL did not lock under a bounded poll policy
    pub fn init(&self, config: &SocpllConfig) -> Result<(), ClockError> {
        if !self.hw.capabilities().has_socpll {
            return Err(ClockError::NotSupported);
        }

        let reference_hz = self.oscillators.frequency(config.reference.oscillator())?;
        let dividers = config
            .dividers
            .unwrap_or_else(|| SocpllDividers::compute(config.frequency_hz, reference_hz));
        dividers.validate(config.fractional)?;

        Cmu::new(self.hw).enable_bus_clock(BusClock::Socpll0)?;
        let socpll = self.hw.socpll();
        socpll.lock.write(LOCK::LOCKKEY.val(UNLOCK_KEY));

        socpll.ctrl.set_bits(CTRL::DISONDEMAND::SET);
        socpll.ctrl.clear_bits(CTRL::FORCEEN::SET);
        self.hw.wait_until(|| !socpll.status.is_set(STATUS::ENS))?;

        let divf = if config.fractional { dividers.divf } else { 0 };
        self.hw.atomic(|| {
            socpll.ctrl.modify(
                CTRL::ENFRACN.val(config.fractional as u32)
                    + CTRL::REFCLKSEL.val(config.reference as u32),
            );
            socpll
                .ctrl1
                .modify(CTRL1::DIVN.val(dividers.divn) + CTRL1::DIVF.val(divf));
        });

        // A software request is needed to update the analog part.
        socpll.ctrl.set_bits(CTRL::FORCEEN::SET);
        self.hw.wait_until(|| {
            socpll
                .status
                .matches_all(STATUS::RDY::SET + STATUS::PLLLOCK::SET + STATUS::ENS::SET)
        })?;
        self.oscillators.latch_socpll();

        socpll.ctrl.clear_bits(CTRL::DISONDEMAND::SET);
        socpll.ctrl.clear_bits(CTRL::FORCEEN::SET);

        debug!(
            "SOCPLL locked: DIVN {} DIVF {} -> {} Hz",
            dividers.divn,
            divf,
            dividers.output_frequency(reference_hz, config.fractional)
        );
        Ok(())
    }
}
