// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! CMU calibration counter.
//!
//! The down-counter is loaded with `CALTOP` and counts cycles of the reference clock while the
//! up-counter counts cycles of the clock under test. Once the down-counter expires, `CALCNT`
//! holds the up-count and `STATUS.CALRDY` is raised.

use tock_registers::fields::FieldValue;

use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::cmu::{CALCMD, CALCNT, CALCTRL, CALTOP, STATUS};

/// Widest `CALTOP` value
pub const CALTOP_MAX: u32 = 0xF_FFFF;

/// Clocks the calibration counters can count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationClock {
    /// Down-counter only
    Hclk,
    Prs,
    Hfxo,
    Lfxo,
    Hfrcodpll,
    Hfrcoem23,
    Fsrco,
    Lfrco,
    Ulfrco,
}

impl CalibrationClock {
    fn down_select(self) -> FieldValue<u32, CALCTRL::Register> {
        match self {
            CalibrationClock::Hclk => CALCTRL::DOWNSEL::HCLK,
            CalibrationClock::Prs => CALCTRL::DOWNSEL::PRS,
            CalibrationClock::Hfxo => CALCTRL::DOWNSEL::HFXO,
            CalibrationClock::Lfxo => CALCTRL::DOWNSEL::LFXO,
            CalibrationClock::Hfrcodpll => CALCTRL::DOWNSEL::HFRCODPLL,
            CalibrationClock::Hfrcoem23 => CALCTRL::DOWNSEL::HFRCOEM23,
            CalibrationClock::Fsrco => CALCTRL::DOWNSEL::FSRCO,
            CalibrationClock::Lfrco => CALCTRL::DOWNSEL::LFRCO,
            CalibrationClock::Ulfrco => CALCTRL::DOWNSEL::ULFRCO,
        }
    }

    fn up_select(self) -> Result<FieldValue<u32, CALCTRL::Register>, ClockError> {
        match self {
            CalibrationClock::Hclk => Err(ClockError::NotSupported),
            CalibrationClock::Prs => Ok(CALCTRL::UPSEL::PRS),
            CalibrationClock::Hfxo => Ok(CALCTRL::UPSEL::HFXO),
            CalibrationClock::Lfxo => Ok(CALCTRL::UPSEL::LFXO),
            CalibrationClock::Hfrcodpll => Ok(CALCTRL::UPSEL::HFRCODPLL),
            CalibrationClock::Hfrcoem23 => Ok(CALCTRL::UPSEL::HFRCOEM23),
            CalibrationClock::Fsrco => Ok(CALCTRL::UPSEL::FSRCO),
            CalibrationClock::Lfrco => Ok(CALCTRL::UPSEL::LFRCO),
            CalibrationClock::Ulfrco => Ok(CALCTRL::UPSEL::ULFRCO),
        }
    }
}

pub struct RcoCalibration<'a> {
    hw: Hardware<'a>,
}

impl<'a> RcoCalibration<'a> {
    pub fn new(hw: Hardware<'a>) -> Self {
        Self { hw }
    }

    /// Count `up` against `cycles` periods of `down`. Other CALCTRL settings are kept.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `cycles` does not fit `CALTOP`
    /// + [Err]\([ClockError::NotSupported]\): HCLK selected as up-counter
    pub fn configure(
        &self,
        cycles: u32,
        down: CalibrationClock,
        up: CalibrationClock,
        continuous: bool,
    ) -> Result<(), ClockError> {
        if cycles > CALTOP_MAX {
            return Err(ClockError::InvalidParameter);
        }
        let up = up.up_select()?;
        let down = down.down_select();

        let cmu = self.hw.cmu();
        self.hw.atomic(|| {
            cmu.caltop.write(CALTOP::CALTOP.val(cycles));
            cmu.calctrl
                .modify(up + down + CALCTRL::CONT.val(continuous as u32));
        });
        Ok(())
    }

    pub fn start(&self) {
        self.hw.cmu().calcmd.write(CALCMD::CALSTART::SET);
    }

    pub fn stop(&self) {
        self.hw.cmu().calcmd.write(CALCMD::CALSTOP::SET);
    }

    /// Block until a single-shot calibration completes. Returns immediately in continuous mode.
    pub fn wait(&self) -> Result<(), ClockError> {
        let cmu = self.hw.cmu();
        if cmu.calctrl.is_set(CALCTRL::CONT) {
            return Ok(());
        }
        self.hw.wait_until(|| cmu.status.is_set(STATUS::CALRDY))
    }

    pub fn count(&self) -> u32 {
        self.hw.cmu().calcnt.read(CALCNT::CALCNT)
    }
}
