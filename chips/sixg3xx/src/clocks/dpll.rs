// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Digital PLL locking HFRCODPLL to a reference: `f_out = f_ref * (N + 1) / (M + 1)`.

use log::debug;

use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::config::{DpllConfig, DpllEdge, DpllMode, DpllReference};
use crate::clocks::hfrco::{self, Hfrco, HfrcoInstance};
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::devinfo::DeviceInfo;
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::cmu::DPLLREFCLKCTRL;
use crate::registers::dpll::{CFG, CFG1, EN, INTERRUPT};

pub const N_MIN: u32 = 300;
pub const DIVIDER_MAX: u32 = 0xFFF;

/// Output frequency for `reference_hz`
pub fn output_frequency(reference_hz: u32, n: u32, m: u32) -> u32 {
    (reference_hz as u64 * (n as u64 + 1) / (m as u64 + 1)) as u32
}

/// # Errors
///
/// + [Err]\([ClockError::InvalidParameter]\): N or M overflows its field, or N is below 300
pub fn validate_dividers(n: u32, m: u32) -> Result<(), ClockError> {
    if !(N_MIN..=DIVIDER_MAX).contains(&n) || m > DIVIDER_MAX {
        return Err(ClockError::InvalidParameter);
    }
    Ok(())
}

pub struct Dpll<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
}

impl<'a> Dpll<'a> {
    pub(in crate::clocks) fn new(hw: Hardware<'a>, oscillators: &'a Oscillators<'a>) -> Self {
        Self { hw, oscillators }
    }

    /// Select the HFRCODPLL band of `config.frequency_hz`, then lock the DPLL on it.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): invalid dividers, or no factory calibration
    ///   for the band
    /// + [Err]\([ClockError::NotAvailable]\): the reference oscillator is not configured
    /// + [Err]\([ClockError::InvalidState]\): SYSCLK runs from HFRCODPLL, or the DPLL reported a
    ///   lock failure
    pub fn init(&self, config: &DpllConfig, devinfo: &dyn DeviceInfo) -> Result<u32, ClockError> {
        validate_dividers(config.n, config.m)?;
        let cmu = Cmu::new(self.hw);
        if cmu.get_sysclk_source() == Ok(OscillatorId::Hfrcodpll) {
            return Err(ClockError::InvalidState);
        }
        let calibration =
            hfrco::band_calibration(devinfo, HfrcoInstance::Dpll, config.frequency_hz)?;
        let reference_hz = self.oscillators.frequency(config.reference.oscillator())?;

        cmu.enable_bus_clock(BusClock::Hfrco0)?;
        cmu.enable_bus_clock(BusClock::Dpll0)?;
        let dpll = self.hw.dpll();
        dpll.en.clear_bits(EN::EN::SET);
        self.hw.wait_until(|| !dpll.en.is_set(EN::DISABLING))?;

        Hfrco::new(self.hw, self.oscillators, HfrcoInstance::Dpll).write_calibration(calibration)?;

        let reference = match config.reference {
            DpllReference::Hfxo => DPLLREFCLKCTRL::CLKSEL::HFXO,
            DpllReference::Lfxo => DPLLREFCLKCTRL::CLKSEL::LFXO,
            DpllReference::Clkin0 => DPLLREFCLKCTRL::CLKSEL::CLKIN0,
        };
        let mode = match config.mode {
            DpllMode::Fll => CFG::MODE::FLL,
            DpllMode::Pll => CFG::MODE::PLL,
        };
        let edge = match config.edge {
            DpllEdge::Fall => CFG::EDGESEL::FALL,
            DpllEdge::Rise => CFG::EDGESEL::RISE,
        };
        self.hw.atomic(|| {
            dpll.cfg1
                .modify(CFG1::N.val(config.n) + CFG1::M.val(config.m));
            self.hw.cmu().dpllrefclkctrl.modify(reference);
            dpll.cfg.modify(
                mode + edge
                    + CFG::AUTORECOVER.val(config.autorecover as u32)
                    + CFG::DITHEN.val(config.dither as u32),
            );
        });

        dpll.if_.clear_bits(
            INTERRUPT::LOCK::SET + INTERRUPT::LOCKFAILLOW::SET + INTERRUPT::LOCKFAILHIGH::SET,
        );
        dpll.en.set_bits(EN::EN::SET);
        self.hw.wait_until(|| dpll.if_.get() != 0)?;

        let flags = dpll.if_.extract();
        if flags.is_set(INTERRUPT::LOCKFAILLOW) || flags.is_set(INTERRUPT::LOCKFAILHIGH) {
            return Err(ClockError::InvalidState);
        }

        let frequency = output_frequency(reference_hz, config.n, config.m);
        self.oscillators.latch_hfrcodpll(frequency);
        debug!(
            "DPLL locked on {:?}: N {} M {} -> {} Hz",
            config.reference, config.n, config.m, frequency
        );
        Ok(frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_specific::SIXG301;
    use crate::hardware::PollPolicy;
    use crate::registers::cmu::{CmuRegisters, SYSCLKCTRL};
    use crate::registers::dpll::DpllRegisters;
    use crate::testing::{CountingMask, FakeChip, FakeDeviceInfo};

    #[test]
    fn divider_limits() {
        assert_eq!(validate_dividers(3839, 1919), Ok(()));
        assert_eq!(validate_dividers(299, 10), Err(ClockError::InvalidParameter));
        assert_eq!(validate_dividers(4096, 10), Err(ClockError::InvalidParameter));
        assert_eq!(validate_dividers(300, 4096), Err(ClockError::InvalidParameter));
        assert_eq!(output_frequency(38_400_000, 3839, 1919), 76_800_000);
    }

    #[test]
    fn lock_on_hfxo() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        oscillators.latch_hfxo(38_400_000, 50);

        let config = DpllConfig {
            frequency_hz: 80_000_000,
            n: 3999,
            m: 1919,
            ..DpllConfig::default()
        };
        let dpll = Dpll::new(hw, &oscillators);
        assert_eq!(dpll.init(&config, &FakeDeviceInfo::new()), Ok(80_000_000));

        let registers = DpllRegisters::new(&chip, SIXG301.addresses.dpll);
        assert_eq!(registers.cfg1.read(CFG1::N), 3999);
        assert_eq!(registers.cfg1.read(CFG1::M), 1919);
        assert!(registers
            .cfg
            .matches_all(CFG::MODE::PLL + CFG::EDGESEL::FALL + CFG::AUTORECOVER::SET));
        assert!(registers.en.is_set(EN::EN));
        assert!(CmuRegisters::new(&chip, SIXG301.addresses.cmu)
            .dpllrefclkctrl
            .matches_all(DPLLREFCLKCTRL::CLKSEL::HFXO));
        assert_eq!(
            hw.hfrcodpll().cal.get(),
            FakeDeviceInfo::band_calibration(80_000_000)
        );
        assert_eq!(
            oscillators.frequency(OscillatorId::Hfrcodpll),
            Ok(80_000_000)
        );
    }

    #[test]
    fn lock_failure_is_an_invalid_state() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        oscillators.latch_hfxo(38_400_000, 50);
        chip.fail_dpll_lock(true);

        assert_eq!(
            Dpll::new(hw, &oscillators).init(&DpllConfig::default(), &FakeDeviceInfo::new()),
            Err(ClockError::InvalidState)
        );
        assert_eq!(
            oscillators.frequency(OscillatorId::Hfrcodpll),
            Err(ClockError::NotAvailable)
        );
    }

    #[test]
    fn missing_band_calibration_is_rejected() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        oscillators.latch_hfxo(38_400_000, 50);
        let devinfo = FakeDeviceInfo::new();
        devinfo.erase_bands();

        assert_eq!(
            Dpll::new(hw, &oscillators).init(&DpllConfig::default(), &devinfo),
            Err(ClockError::InvalidParameter)
        );
        assert!(chip.write_log().is_empty());
    }

    #[test]
    fn preconditions_are_checked_before_any_write() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let devinfo = FakeDeviceInfo::new();
        let config = DpllConfig {
            frequency_hz: 80_000_000,
            ..DpllConfig::default()
        };

        // No HFXO yet.
        assert_eq!(
            Dpll::new(hw, &oscillators).init(&config, &devinfo),
            Err(ClockError::NotAvailable)
        );
        assert!(chip.write_log().is_empty());

        oscillators.latch_hfxo(38_400_000, 50);
        CmuRegisters::new(&chip, SIXG301.addresses.cmu)
            .sysclkctrl
            .write(SYSCLKCTRL::CLKSEL::HFRCODPLL);
        assert_eq!(
            Dpll::new(hw, &oscillators).init(&config, &devinfo),
            Err(ClockError::InvalidState)
        );
        assert_eq!(chip.write_log().len(), 1);
    }
}
