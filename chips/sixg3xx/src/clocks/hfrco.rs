// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! High-frequency RC oscillators: HFRCODPLL (HFRCO0) and HFRCOEM23.
//!
//! Both share one register layout. A band is selected by writing the complete CAL word taken
//! from the device information page; `CAL.TUNING` can then be trimmed at runtime.

use log::debug;
use tock_registers::LocalRegisterCopy;

use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::devinfo::DeviceInfo;
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::dpll::EN;
use crate::registers::hfrco::{HfrcoRegisters, CAL, STATUS};

/// Widest `CAL.TUNING` code
pub const TUNING_MAX: u32 = 0x7F;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HfrcoInstance {
    /// HFRCO0, the DPLL-controlled oscillator
    Dpll,
    Em23,
}

impl HfrcoInstance {
    pub fn oscillator(self) -> OscillatorId {
        match self {
            HfrcoInstance::Dpll => OscillatorId::Hfrcodpll,
            HfrcoInstance::Em23 => OscillatorId::Hfrcoem23,
        }
    }

    fn bus_clock(self) -> BusClock {
        match self {
            HfrcoInstance::Dpll => BusClock::Hfrco0,
            HfrcoInstance::Em23 => BusClock::Hfrcoem23,
        }
    }
}

/// Factory CAL word of a band. Erased words read as all zeros or all ones.
pub(in crate::clocks) fn band_calibration(
    devinfo: &dyn DeviceInfo,
    instance: HfrcoInstance,
    band_hz: u32,
) -> Result<u32, ClockError> {
    let calibration = match instance {
        HfrcoInstance::Dpll => devinfo.hfrcodpll_calibration(band_hz),
        HfrcoInstance::Em23 => devinfo.hfrcoem23_calibration(band_hz),
    };
    calibration
        .filter(|cal| *cal != 0 && *cal != u32::MAX)
        .ok_or(ClockError::InvalidParameter)
}

pub struct Hfrco<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
    instance: HfrcoInstance,
}

impl<'a> Hfrco<'a> {
    pub(in crate::clocks) fn new(
        hw: Hardware<'a>,
        oscillators: &'a Oscillators<'a>,
        instance: HfrcoInstance,
    ) -> Self {
        Self {
            hw,
            oscillators,
            instance,
        }
    }

    fn registers(&self) -> HfrcoRegisters<'a> {
        match self.instance {
            HfrcoInstance::Dpll => self.hw.hfrcodpll(),
            HfrcoInstance::Em23 => self.hw.hfrcoem23(),
        }
    }

    /// Writes to CAL are deferred while SYNCBUSY or FREQBSY is high.
    fn wait_idle(&self) -> Result<(), ClockError> {
        let hfrco = self.registers();
        self.hw.wait_until(|| {
            let status = hfrco.status.extract();
            !status.is_set(STATUS::SYNCBUSY) && !status.is_set(STATUS::FREQBSY)
        })
    }

    /// Commit a complete CAL word once no band switch is pending.
    pub(in crate::clocks) fn write_calibration(&self, calibration: u32) -> Result<(), ClockError> {
        self.wait_idle()?;
        self.registers().cal.set(calibration);
        Ok(())
    }

    /// Select `band_hz` with the factory calibration. The DPLL must be off.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): the device information has no calibration for
    ///   `band_hz`
    /// + [Err]\([ClockError::InvalidState]\): the DPLL is running on HFRCODPLL
    pub fn init_band(&self, band_hz: u32, devinfo: &dyn DeviceInfo) -> Result<(), ClockError> {
        let mut calibration = band_calibration(devinfo, self.instance, band_hz)?;
        let cmu = Cmu::new(self.hw);
        cmu.enable_bus_clock(self.instance.bus_clock())?;

        match self.instance {
            HfrcoInstance::Dpll => {
                cmu.enable_bus_clock(BusClock::Dpll0)?;
                let dpll_running = self.hw.dpll().en.is_set(EN::EN);
                cmu.disable_bus_clock(BusClock::Dpll0)?;
                if dpll_running {
                    return Err(ClockError::InvalidState);
                }
            }
            HfrcoInstance::Em23 => {
                // The 1 and 2 MHz bands run the 4 MHz oscillator through the output divider.
                let mut cal = LocalRegisterCopy::<u32, CAL::Register>::new(calibration);
                match band_hz {
                    1_000_000 => cal.modify(CAL::CLKDIV::DIV4),
                    2_000_000 => cal.modify(CAL::CLKDIV::DIV2),
                    _ => cal.modify(CAL::CLKDIV::DIV1),
                }
                calibration = cal.get();
            }
        }

        self.write_calibration(calibration)?;
        match self.instance {
            HfrcoInstance::Dpll => self.oscillators.latch_hfrcodpll(band_hz),
            HfrcoInstance::Em23 => self.oscillators.latch_hfrcoem23(band_hz),
        }
        debug!("{:?} band {} Hz, CAL {:#010x}", self.instance, band_hz, calibration);
        Ok(())
    }

    /// Trim `CAL.TUNING`.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `tuning` does not fit the field
    /// + [Err]\([ClockError::Timeout]\): synchronization or a band switch never finished under
    ///   a bounded poll policy
    pub fn set_tuning(&self, tuning: u32) -> Result<(), ClockError> {
        if tuning > TUNING_MAX {
            return Err(ClockError::InvalidParameter);
        }
        Cmu::new(self.hw).enable_bus_clock(self.instance.bus_clock())?;

        let hfrco = self.registers();
        self.wait_idle()?;
        self.hw.atomic(|| hfrco.cal.modify(CAL::TUNING.val(tuning)));
        self.hw
            .wait_until(|| !hfrco.status.is_set(STATUS::SYNCBUSY))
    }

    pub fn tuning(&self) -> Result<u32, ClockError> {
        Cmu::new(self.hw).enable_bus_clock(self.instance.bus_clock())?;
        Ok(self.registers().cal.read(CAL::TUNING))
    }
}
