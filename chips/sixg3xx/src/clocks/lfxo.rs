// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Low-frequency crystal oscillator (LFXO).

use log::debug;

use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::config::{LfxoConfig, LfxoMode, LFXO_CAPTUNE_FIELD_MAX};
use crate::clocks::oscillator::Oscillators;
use crate::devinfo::ManufacturingTokens;
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::lfxo::{CAL, CFG, CTRL, LOCK, STATUS, SYNCBUSY, UNLOCK_KEY};

pub struct Lfxo<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
}

impl<'a> Lfxo<'a> {
    pub(in crate::clocks) fn new(hw: Hardware<'a>, oscillators: &'a Oscillators<'a>) -> Self {
        Self { hw, oscillators }
    }

    /// Largest CAPTUNE the running part accepts
    fn clamp_captune(&self, captune: u32) -> u32 {
        captune.min(self.hw.capabilities().lfxo_captune_max)
    }

    /// Configure the crystal and leave it on demand. Returns the CAPTUNE written.
    ///
    /// The manufacturing token takes precedence over `config.ctune`.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::Timeout]\): the oscillator did not stop under a bounded poll policy
    pub fn init(
        &self,
        config: &LfxoConfig,
        tokens: &dyn ManufacturingTokens,
    ) -> Result<u32, ClockError> {
        let gain = if config.mode == LfxoMode::Xtal { 1 } else { 0 };
        let captune = tokens
            .mfg_lfxo_tune()
            .map(u32::from)
            .filter(|tune| *tune <= LFXO_CAPTUNE_FIELD_MAX)
            .unwrap_or(config.ctune);
        let captune = self.clamp_captune(captune);

        Cmu::new(self.hw).enable_bus_clock(BusClock::Lfxo)?;
        let lfxo = self.hw.lfxo();
        lfxo.lock.write(LOCK::LOCKKEY.val(UNLOCK_KEY));

        lfxo.ctrl.set_bits(CTRL::DISONDEMAND::SET);
        lfxo.ctrl.clear_bits(CTRL::FORCEEN::SET);
        self.hw.wait_until(|| !lfxo.status.is_set(STATUS::ENS))?;

        self.hw.atomic(|| {
            lfxo.cal.modify(CAL::GAIN.val(gain) + CAL::CAPTUNE.val(captune));
            lfxo.cfg.modify(
                CFG::MODE.val(config.mode as u32) + CFG::TIMEOUT.val(config.timeout as u32),
            );
        });
        lfxo.ctrl.clear_bits(CTRL::DISONDEMAND::SET);
        self.oscillators.latch_lfxo(config.precision_ppm);

        debug!(
            "LFXO {:?}: CAPTUNE {}, gain {}, timeout {:?}",
            config.mode, captune, gain, config.timeout
        );
        Ok(captune)
    }

    /// Write the load capacitance, clamped to the largest code of the running part.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `captune` does not fit the field
    /// + [Err]\([ClockError::Timeout]\): a previous write is still synchronizing under a bounded
    ///   poll policy
    pub fn set_calibration(&self, captune: u32) -> Result<(), ClockError> {
        if captune > LFXO_CAPTUNE_FIELD_MAX {
            return Err(ClockError::InvalidParameter);
        }
        let captune = self.clamp_captune(captune);

        self.hw.atomic(|| {
            Cmu::new(self.hw).enable_bus_clock(BusClock::Lfxo)?;
            let lfxo = self.hw.lfxo();

            let was_locked = lfxo.status.is_set(STATUS::LOCK);
            if was_locked {
                lfxo.lock.write(LOCK::LOCKKEY.val(UNLOCK_KEY));
            }
            let written = self
                .hw
                .wait_until(|| !lfxo.syncbusy.is_set(SYNCBUSY::CAL))
                .map(|()| lfxo.cal.modify(CAL::CAPTUNE.val(captune)));
            if was_locked {
                lfxo.lock.write(LOCK::LOCKKEY.val(!UNLOCK_KEY));
            }
            written
        })
    }

    pub fn get_calibration(&self) -> Result<u32, ClockError> {
        Cmu::new(self.hw).enable_bus_clock(BusClock::Lfxo)?;
        Ok(self.hw.lfxo().cal.read(CAL::CAPTUNE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_specific::SIXG301;
    use crate::clocks::config::LfxoTimeout;
    use crate::clocks::oscillator::{OscillatorId, LFXO_FREQUENCY_HZ};
    use crate::hardware::PollPolicy;
    use crate::registers::lfxo::LfxoRegisters;
    use crate::testing::{CountingMask, FakeChip, FakeTokens};

    #[test]
    fn token_wins_and_is_clamped() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let lfxo = Lfxo::new(hw, &oscillators);
        let tokens = FakeTokens::new();

        assert_eq!(lfxo.init(&LfxoConfig::default(), &tokens), Ok(63));
        tokens.set_lfxo_tune(Some(0x70));
        assert_eq!(lfxo.init(&LfxoConfig::default(), &tokens), Ok(0x59));

        let registers = LfxoRegisters::new(&chip, SIXG301.addresses.lfxo);
        assert_eq!(registers.cal.read(CAL::GAIN), 1);
        assert!(registers
            .cfg
            .matches_all(CFG::MODE::XTAL + CFG::TIMEOUT::CYCLES4K));
        assert!(!registers.ctrl.is_set(CTRL::DISONDEMAND));

        assert_eq!(
            oscillators.frequency(OscillatorId::Lfxo),
            Ok(LFXO_FREQUENCY_HZ)
        );
        assert_eq!(oscillators.precision(OscillatorId::Lfxo), Ok(50));
    }

    #[test]
    fn external_clock_runs_without_gain() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let config = LfxoConfig {
            mode: LfxoMode::DigExtClk,
            timeout: LfxoTimeout::Cycles2,
            ..LfxoConfig::default()
        };
        Lfxo::new(hw, &oscillators)
            .init(&config, &FakeTokens::new())
            .unwrap();

        let registers = LfxoRegisters::new(&chip, SIXG301.addresses.lfxo);
        assert_eq!(registers.cal.read(CAL::GAIN), 0);
        assert!(registers
            .cfg
            .matches_all(CFG::MODE::DIGEXTCLK + CFG::TIMEOUT::CYCLES2));
    }

    #[test]
    fn runtime_calibration_keeps_the_lock() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let lfxo = Lfxo::new(hw, &oscillators);
        let registers = LfxoRegisters::new(&chip, SIXG301.addresses.lfxo);
        registers.lock.write(LOCK::LOCKKEY.val(0));

        assert_eq!(lfxo.set_calibration(0x30), Ok(()));
        assert_eq!(lfxo.get_calibration(), Ok(0x30));
        assert!(registers.status.is_set(STATUS::LOCK));

        assert_eq!(lfxo.set_calibration(0x7F), Ok(()));
        assert_eq!(lfxo.get_calibration(), Ok(0x59));
        assert_eq!(
            lfxo.set_calibration(0x80),
            Err(ClockError::InvalidParameter)
        );
        assert!(!mask.is_masked());
    }

    #[test]
    fn stuck_synchronization_times_out_and_relocks() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(4));
        let oscillators = Oscillators::new(hw);
        let registers = LfxoRegisters::new(&chip, SIXG301.addresses.lfxo);
        registers.lock.write(LOCK::LOCKKEY.val(0));
        registers.syncbusy.write(SYNCBUSY::CAL::SET);

        assert_eq!(
            Lfxo::new(hw, &oscillators).set_calibration(0x20),
            Err(ClockError::Timeout)
        );
        assert_eq!(registers.cal.read(CAL::CAPTUNE), 0);
        assert!(registers.status.is_set(STATUS::LOCK));
        assert!(!mask.is_masked());
    }
}
