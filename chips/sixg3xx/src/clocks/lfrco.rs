// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Low-frequency RC oscillator (LFRCO).
//!
//! In high-precision mode the LFRCO is periodically recalibrated against HFXO. The hardware needs
//! the nominal number of HFXO cycles in 5 LFRCO periods (`NOMCAL`) and its scaled inverse
//! (`NOMCALINV`).

use log::debug;

use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::lfrco::{CAL, CFG, CTRL, NOMCAL, NOMCALINV, STATUS};

/// Widest `CAL.FREQTRIM` code
pub const FREQTRIM_MAX: u32 = 0xFF;

const HFXO_38M4: u32 = 38_400_000;
const HFXO_39M: u32 = 39_000_000;

/// `(NOMCAL, NOMCALINV)` for an HFXO running at `hfxo_hz`.
///
/// 38.4 MHz matches the register reset values, 39 MHz has factory-tuned constants.
pub fn nominal_calibration(hfxo_hz: u32) -> (u32, u32) {
    match hfxo_hz {
        HFXO_38M4 => (0x5B8D8, 0x597A),
        HFXO_39M => (0x5CFBB, 0x581A),
        _ => {
            let nomcal = ((5 * hfxo_hz as u64) >> 9) as u32;
            let nomcalinv = (((1u32 << 31) / 5) << 2) / (hfxo_hz >> 9).max(1);
            (nomcal, nomcalinv)
        }
    }
}

pub struct Lfrco<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
}

impl<'a> Lfrco<'a> {
    pub(in crate::clocks) fn new(hw: Hardware<'a>, oscillators: &'a Oscillators<'a>) -> Self {
        Self { hw, oscillators }
    }

    /// Select free-running or high-precision mode. The oscillator is stopped for the switch and
    /// left on demand.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotSupported]\): high precision requested on a part without it
    /// + [Err]\([ClockError::InvalidState]\): high precision requested before HFXO was
    ///   configured
    /// + [Err]\([ClockError::Timeout]\): the oscillator did not stop under a bounded poll policy
    pub fn init(&self, high_precision: bool) -> Result<(), ClockError> {
        let hfxo_hz = if high_precision {
            if !self.hw.capabilities().has_lfrco_high_precision {
                return Err(ClockError::NotSupported);
            }
            Some(
                self.oscillators
                    .frequency(OscillatorId::Hfxo)
                    .map_err(|_| ClockError::InvalidState)?,
            )
        } else {
            None
        };

        Cmu::new(self.hw).enable_bus_clock(BusClock::Lfrco)?;
        let lfrco = self.hw.lfrco();
        lfrco.ctrl.set_bits(CTRL::DISONDEMAND::SET);
        lfrco.ctrl.clear_bits(CTRL::FORCEEN::SET);
        self.hw.wait_until(|| !lfrco.status.is_set(STATUS::ENS))?;

        match hfxo_hz {
            Some(hfxo_hz) => {
                let (nomcal, nomcalinv) = nominal_calibration(hfxo_hz);
                lfrco.nomcal.write(NOMCAL::NOMCALCNT.val(nomcal));
                lfrco.nomcalinv.write(NOMCALINV::NOMCALCNTINV.val(nomcalinv));
                lfrco.cfg.set_bits(CFG::HIGHPRECEN::SET);
                debug!(
                    "LFRCO high precision: NOMCAL {:#x} NOMCALINV {:#x}",
                    nomcal, nomcalinv
                );
            }
            None => lfrco.cfg.clear_bits(CFG::HIGHPRECEN::SET),
        }

        lfrco.ctrl.clear_bits(CTRL::DISONDEMAND::SET);
        Ok(())
    }

    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `trim` does not fit `CAL.FREQTRIM`
    /// + [Err]\([ClockError::Timeout]\): synchronization never finished under a bounded poll
    ///   policy
    pub fn set_trim(&self, trim: u32) -> Result<(), ClockError> {
        if trim > FREQTRIM_MAX {
            return Err(ClockError::InvalidParameter);
        }
        Cmu::new(self.hw).enable_bus_clock(BusClock::Lfrco)?;

        let lfrco = self.hw.lfrco();
        self.hw.wait_until(|| lfrco.syncbusy.get() == 0)?;
        lfrco.cal.modify(CAL::FREQTRIM.val(trim));
        self.hw.wait_until(|| lfrco.syncbusy.get() == 0)
    }

    pub fn trim(&self) -> Result<u32, ClockError> {
        Cmu::new(self.hw).enable_bus_clock(BusClock::Lfrco)?;
        Ok(self.hw.lfrco().cal.read(CAL::FREQTRIM))
    }
}
