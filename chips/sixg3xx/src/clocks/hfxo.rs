// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! High-frequency crystal oscillator (HFXO0).
//!
//! Bring-up walks the oscillator through
//!
//! ```text
//! Disabled -> ForcedEnable -> AwaitingLockAndCoreBiasReady -> Locked -> SteadyOnDemand
//! ```
//!
//! In crystal mode the first start runs the core bias optimization with long timeouts. Once it
//! converged the result is kept (`SKIPCOREBIASOPT`) and later starts use the short steady-state
//! timeout. External clock modes skip the optimization and use zero tuning.
//!
//! The CTUNE load capacitance comes from, in order: the factory value of the device
//! information page, the manufacturing token, the static configuration.

use log::debug;

use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::config::{HfxoConfig, HfxoMode, HFXO_CTUNE_MAX};
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::devinfo::{DeviceInfo, ManufacturingTokens};
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::hfxo::{
    CFG, CMD, CTRL, INTERRUPT, LOCK, STATUS, UNLOCK_KEY, XTALCFG, XTALCTRL,
};

/// Core bias current used for the first start of a crystal
const XTAL_COREBIAS_STARTUP: u32 = 60;

/// Where the CTUNE written at bring-up came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CtuneSource {
    /// Device information page
    Factory,
    /// Manufacturing token
    Token,
    Config,
}

/// Resolved CTUNE pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ctune {
    pub source: CtuneSource,
    pub xi: u32,
    pub xo: u32,
}

/// Pick the CTUNE pair used at bring-up.
///
/// CTUNEXOANA is CTUNEXIANA plus the load imbalance `delta` of the running part, unless the
/// configuration is the source and carries its own XO value.
pub fn resolve_ctune(
    config: &HfxoConfig,
    devinfo: &dyn DeviceInfo,
    tokens: &dyn ManufacturingTokens,
    delta: u32,
) -> Ctune {
    let factory = devinfo.hfxo_ctune();
    let (source, xi) = if factory != 0 && factory <= HFXO_CTUNE_MAX {
        (CtuneSource::Factory, factory)
    } else if let Some(token) = tokens
        .mfg_ctune()
        .map(u32::from)
        .filter(|token| *token <= HFXO_CTUNE_MAX)
    {
        (CtuneSource::Token, token)
    } else {
        (CtuneSource::Config, config.ctune)
    };

    let xo = match (source, config.ctune_xo) {
        (CtuneSource::Config, Some(xo)) => xo,
        _ => (xi + delta).min(HFXO_CTUNE_MAX),
    };
    Ctune { source, xi, xo }
}

/// Observable state of the oscillator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HfxoState {
    Disabled,
    /// Forced on, not yet enabled
    ForcedEnable,
    /// Enabled, waiting for the ready and core bias flags
    AwaitingLockAndCoreBiasReady,
    /// Forced on and ready
    Locked,
    /// Converged, started by hardware requests only
    SteadyOnDemand,
}

/// Receives the HFXO ready notification.
pub trait HfxoClient {
    fn hfxo_ready(&self);
}

pub struct Hfxo<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
}

impl<'a> Hfxo<'a> {
    pub(in crate::clocks) fn new(hw: Hardware<'a>, oscillators: &'a Oscillators<'a>) -> Self {
        Self { hw, oscillators }
    }

    pub fn state(&self) -> HfxoState {
        let hfxo = self.hw.hfxo();
        let forced = hfxo.ctrl.is_set(CTRL::FORCEEN);
        let status = hfxo.status.extract();
        let converged = hfxo.xtalctrl.is_set(XTALCTRL::SKIPCOREBIASOPT);
        // External clocks never run the optimization, so a latched frequency marks them ready.
        let external_ready = !hfxo.cfg.matches_all(CFG::MODE::XTAL)
            && self.oscillators.frequency(OscillatorId::Hfxo).is_ok();

        match (forced, status.is_set(STATUS::ENS)) {
            (false, _) if converged || external_ready => HfxoState::SteadyOnDemand,
            (false, _) => HfxoState::Disabled,
            (true, false) => HfxoState::ForcedEnable,
            (true, true) => {
                if status.matches_all(STATUS::RDY::SET + STATUS::COREBIASOPTRDY::SET) {
                    HfxoState::Locked
                } else {
                    HfxoState::AwaitingLockAndCoreBiasReady
                }
            }
        }
    }

    /// Configure the crystal, run the first core bias optimization and leave the oscillator
    /// on demand. Returns the CTUNE pair that was written.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidState]\): SYSCLK runs from HFXO
    /// + [Err]\([ClockError::Timeout]\): the crystal did not start under a bounded poll policy
    pub fn init(
        &self,
        config: &HfxoConfig,
        devinfo: &dyn DeviceInfo,
        tokens: &dyn ManufacturingTokens,
    ) -> Result<Ctune, ClockError> {
        let cmu = Cmu::new(self.hw);
        if cmu.get_sysclk_source() == Ok(OscillatorId::Hfxo) {
            return Err(ClockError::InvalidState);
        }
        cmu.enable_bus_clock(BusClock::Hfxo0)?;

        let hfxo = self.hw.hfxo();
        let xtal = config.mode == HfxoMode::Xtal;
        let (timeout_cblsb, timeout_steady, mut core_bias) = if xtal {
            (
                XTALCFG::TIMEOUTCBLSB::T416US,
                XTALCFG::TIMEOUTSTEADY::T833US,
                XTAL_COREBIAS_STARTUP,
            )
        } else {
            (XTALCFG::TIMEOUTCBLSB::T8US, XTALCFG::TIMEOUTSTEADY::T4US, 0)
        };
        // Keep the result of an earlier optimization.
        if hfxo.xtalctrl.is_set(XTALCTRL::SKIPCOREBIASOPT) {
            core_bias = hfxo.xtalctrl.read(XTALCTRL::COREBIASANA);
        }

        hfxo.lock.write(LOCK::LOCKKEY.val(UNLOCK_KEY));
        hfxo.ctrl.set_bits(CTRL::DISONDEMAND::SET);
        hfxo.ctrl.clear_bits(CTRL::FORCEEN::SET);
        self.hw.wait_until(|| {
            let status = hfxo.status.extract();
            !status.is_set(STATUS::ENS) && !status.is_set(STATUS::SYNCBUSY)
        })?;

        let ctune = if xtal {
            resolve_ctune(
                config,
                devinfo,
                tokens,
                self.hw.capabilities().hfxo_ctune_delta,
            )
        } else {
            Ctune {
                source: CtuneSource::Config,
                xi: 0,
                xo: 0,
            }
        };

        self.hw.atomic(|| {
            hfxo.xtalcfg.modify(
                timeout_cblsb
                    + timeout_steady
                    + XTALCFG::CTUNEXOSTARTUP.val(0)
                    + XTALCFG::CTUNEXISTARTUP.val(0),
            );
            hfxo.xtalctrl.modify(
                XTALCTRL::CTUNEXOANA.val(ctune.xo)
                    + XTALCTRL::CTUNEXIANA.val(ctune.xi)
                    + XTALCTRL::COREBIASANA.val(core_bias),
            );
            hfxo.cfg
                .modify(CFG::ENXIDCBIASANA::CLEAR + CFG::MODE.val(config.mode as u32));
        });

        if xtal {
            // Run the core bias optimization once.
            hfxo.ctrl.set_bits(CTRL::FORCEEN::SET);
            self.hw.wait_until(|| {
                hfxo.status.matches_all(
                    STATUS::RDY::SET + STATUS::COREBIASOPTRDY::SET + STATUS::ENS::SET,
                )
            })?;
            self.hw.atomic(|| {
                hfxo.xtalcfg.modify(XTALCFG::TIMEOUTSTEADY::T83US);
                hfxo.xtalctrl.modify(XTALCTRL::SKIPCOREBIASOPT::SET);
            });
            hfxo.ctrl.clear_bits(CTRL::FORCEEN::SET);
        }

        hfxo.ctrl.clear_bits(CTRL::DISONDEMAND::SET);
        self.oscillators
            .latch_hfxo(config.frequency_hz, config.precision_ppm);

        debug!(
            "HFXO {:?}: {} Hz, CTUNE XI {} XO {} ({:?}), core bias {}",
            config.mode, config.frequency_hz, ctune.xi, ctune.xo, ctune.source, core_bias
        );
        Ok(ctune)
    }

    /// Write CTUNEXIANA and the matching CTUNEXOANA.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `ctune` does not fit the field
    pub fn set_ctune(&self, ctune: u32) -> Result<(), ClockError> {
        if ctune > HFXO_CTUNE_MAX {
            return Err(ClockError::InvalidParameter);
        }
        let xo = (ctune + self.hw.capabilities().hfxo_ctune_delta).min(HFXO_CTUNE_MAX);

        let hfxo = self.hw.hfxo();
        self.hw.atomic(|| {
            let was_locked = hfxo.status.is_set(STATUS::LOCK);
            hfxo.lock.write(LOCK::LOCKKEY.val(UNLOCK_KEY));
            hfxo.xtalctrl
                .modify(XTALCTRL::CTUNEXOANA.val(xo) + XTALCTRL::CTUNEXIANA.val(ctune));
            if was_locked {
                hfxo.lock.write(LOCK::LOCKKEY.val(!UNLOCK_KEY));
            }
        });
        Ok(())
    }

    pub fn get_ctune(&self) -> u32 {
        self.hw.hfxo().xtalctrl.read(XTALCTRL::CTUNEXIANA)
    }

    /// Write `ctune` and rerun the core bias optimization for it.
    ///
    /// The FORCEEN and DISONDEMAND bits found on entry are restored before returning, whether
    /// the sequence succeeded or not.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `ctune` does not fit the field
    /// + [Err]\([ClockError::Timeout]\): the crystal did not restart under a bounded poll policy
    pub fn calibrate_ctune(&self, ctune: u32) -> Result<(), ClockError> {
        if ctune > HFXO_CTUNE_MAX {
            return Err(ClockError::InvalidParameter);
        }

        let hfxo = self.hw.hfxo();
        let saved = hfxo.ctrl.extract();
        let result = self.optimize_core_bias(ctune);

        self.hw.atomic(|| {
            hfxo.ctrl.modify(
                CTRL::FORCEEN.val(saved.read(CTRL::FORCEEN))
                    + CTRL::DISONDEMAND.val(saved.read(CTRL::DISONDEMAND)),
            )
        });
        result
    }

    fn optimize_core_bias(&self, ctune: u32) -> Result<(), ClockError> {
        let hfxo = self.hw.hfxo();

        hfxo.ctrl.set_bits(CTRL::FORCEEN::SET);
        self.hw.wait_until(|| {
            hfxo.status
                .matches_all(STATUS::COREBIASOPTRDY::SET + STATUS::RDY::SET)
        })?;
        hfxo.ctrl.set_bits(CTRL::DISONDEMAND::SET);
        self.hw.wait_until(|| {
            hfxo.status.matches_all(
                STATUS::COREBIASOPTRDY::SET + STATUS::RDY::SET + STATUS::ENS::SET,
            )
        })?;

        self.set_ctune(ctune)?;

        hfxo.cmd.write(CMD::COREBIASOPT::SET);
        self.hw
            .wait_until(|| !hfxo.status.is_set(STATUS::COREBIASOPTRDY))?;
        self.hw
            .wait_until(|| hfxo.status.is_set(STATUS::COREBIASOPTRDY))?;

        debug!(
            "HFXO CTUNE {} calibrated, core bias {}",
            ctune,
            hfxo.xtalctrl.read(XTALCTRL::COREBIASANA)
        );
        Ok(())
    }

    /// Force the core bias current and disable its optimization.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `core_bias` does not fit the field
    /// + [Err]\([ClockError::InvalidState]\): the oscillator is running
    pub fn set_core_bias(&self, core_bias: u32) -> Result<(), ClockError> {
        Cmu::new(self.hw).enable_bus_clock(BusClock::Hfxo0)?;
        if core_bias > 0xFF {
            return Err(ClockError::InvalidParameter);
        }

        let hfxo = self.hw.hfxo();
        if hfxo.status.is_set(STATUS::ENS) {
            return Err(ClockError::InvalidState);
        }

        self.hw.atomic(|| {
            let on_demand = !hfxo.ctrl.is_set(CTRL::DISONDEMAND);
            if on_demand {
                hfxo.ctrl.set_bits(CTRL::DISONDEMAND::SET);
            }
            hfxo.xtalctrl.modify(
                XTALCTRL::COREBIASANA.val(core_bias) + XTALCTRL::SKIPCOREBIASOPT::SET,
            );
            if on_demand {
                hfxo.ctrl.clear_bits(CTRL::DISONDEMAND::SET);
            }
        });
        Ok(())
    }

    pub fn get_core_bias(&self) -> Result<u32, ClockError> {
        Cmu::new(self.hw).enable_bus_clock(BusClock::Hfxo0)?;
        Ok(self.hw.hfxo().xtalctrl.read(XTALCTRL::COREBIASANA))
    }

    /// Arm the ready interrupt, dropping any stale flag.
    pub fn enable_ready_interrupt(&self) {
        let hfxo = self.hw.hfxo();
        hfxo.ien.clear_bits(INTERRUPT::RDY::SET);
        hfxo.if_.clear_bits(INTERRUPT::RDY::SET);
        hfxo.ien.set_bits(INTERRUPT::RDY::SET);
    }

    /// Acknowledge a pending ready interrupt. Returns whether one was pending.
    pub fn handle_interrupt(&self) -> bool {
        let hfxo = self.hw.hfxo();
        if hfxo.if_.is_set(INTERRUPT::RDY) {
            hfxo.if_.clear_bits(INTERRUPT::RDY::SET);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_specific::{SERIES2_BUFOUT, SIXG301};
    use crate::hardware::PollPolicy;
    use crate::registers::cmu::{CmuRegisters, SYSCLKCTRL};
    use crate::registers::hfxo::HfxoRegisters;
    use crate::testing::{CountingMask, FakeChip, FakeDeviceInfo, FakeTokens};

    #[test]
    fn ctune_precedence() {
        let config = HfxoConfig {
            ctune: 100,
            ctune_xo: Some(110),
            ..HfxoConfig::default()
        };
        let devinfo = FakeDeviceInfo::new();
        let tokens = FakeTokens::new();

        let ctune = resolve_ctune(&config, &devinfo, &tokens, 0);
        assert_eq!(
            ctune,
            Ctune {
                source: CtuneSource::Config,
                xi: 100,
                xo: 110
            }
        );

        // Out of range tokens are ignored.
        tokens.set_ctune(Some(0x1FF));
        assert_eq!(
            resolve_ctune(&config, &devinfo, &tokens, 0).source,
            CtuneSource::Config
        );

        tokens.set_ctune(Some(140));
        assert_eq!(
            resolve_ctune(&config, &devinfo, &tokens, 40),
            Ctune {
                source: CtuneSource::Token,
                xi: 140,
                xo: 180
            }
        );

        devinfo.set_hfxo_ctune(250);
        assert_eq!(
            resolve_ctune(&config, &devinfo, &tokens, 40),
            Ctune {
                source: CtuneSource::Factory,
                xi: 250,
                xo: 255
            }
        );
    }

    #[test]
    fn crystal_bring_up_converges_and_releases_the_oscillator() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let hfxo = Hfxo::new(hw, &oscillators);
        assert_eq!(hfxo.state(), HfxoState::Disabled);

        let ctune = hfxo
            .init(
                &HfxoConfig::default(),
                &FakeDeviceInfo::new(),
                &FakeTokens::new(),
            )
            .unwrap();
        assert_eq!(ctune.xi, 170);
        assert_eq!(hfxo.state(), HfxoState::SteadyOnDemand);

        let registers = HfxoRegisters::new(&chip, SIXG301.addresses.hfxo);
        assert_eq!(registers.xtalctrl.read(XTALCTRL::CTUNEXIANA), 170);
        assert_eq!(registers.xtalctrl.read(XTALCTRL::CTUNEXOANA), 170);
        assert_eq!(
            registers.xtalctrl.read(XTALCTRL::COREBIASANA),
            XTAL_COREBIAS_STARTUP
        );
        assert!(registers
            .xtalcfg
            .matches_all(XTALCFG::TIMEOUTSTEADY::T83US + XTALCFG::TIMEOUTCBLSB::T416US));
        assert!(!registers.ctrl.is_set(CTRL::DISONDEMAND));
        assert!(!registers.ctrl.is_set(CTRL::FORCEEN));

        assert_eq!(oscillators.frequency(OscillatorId::Hfxo), Ok(38_400_000));
        assert_eq!(oscillators.precision(OscillatorId::Hfxo), Ok(50));
    }

    #[test]
    fn external_clock_uses_zero_tuning() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let hfxo = Hfxo::new(hw, &oscillators);

        let config = HfxoConfig {
            mode: HfxoMode::ExtClk,
            ..HfxoConfig::default()
        };
        let ctune = hfxo
            .init(&config, &FakeDeviceInfo::new(), &FakeTokens::new())
            .unwrap();
        assert_eq!((ctune.xi, ctune.xo), (0, 0));

        let registers = HfxoRegisters::new(&chip, SIXG301.addresses.hfxo);
        assert!(registers.cfg.matches_all(CFG::MODE::EXTCLK));
        assert!(!registers.xtalctrl.is_set(XTALCTRL::SKIPCOREBIASOPT));
        assert_eq!(hfxo.state(), HfxoState::SteadyOnDemand);
    }

    #[test]
    fn external_clock_before_bring_up_is_disabled() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let hfxo = Hfxo::new(hw, &oscillators);

        HfxoRegisters::new(&chip, SIXG301.addresses.hfxo)
            .cfg
            .write(CFG::MODE::EXTCLK);
        assert_eq!(hfxo.state(), HfxoState::Disabled);
    }

    #[test]
    fn running_from_hfxo_blocks_reconfiguration() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        CmuRegisters::new(&chip, SIXG301.addresses.cmu)
            .sysclkctrl
            .write(SYSCLKCTRL::CLKSEL::HFXO);

        let result = Hfxo::new(hw, &oscillators).init(
            &HfxoConfig::default(),
            &FakeDeviceInfo::new(),
            &FakeTokens::new(),
        );
        assert_eq!(result, Err(ClockError::InvalidState));
        // Only the SYSCLK write above reached the bus.
        assert_eq!(chip.write_log().len(), 1);
    }

    #[test]
    fn set_ctune_applies_the_part_delta_and_relocks() {
        let chip = FakeChip::with_capabilities(&SERIES2_BUFOUT);
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SERIES2_BUFOUT, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let hfxo = Hfxo::new(hw, &oscillators);
        let registers = HfxoRegisters::new(&chip, SERIES2_BUFOUT.addresses.hfxo);
        registers.lock.write(LOCK::LOCKKEY.val(0));
        assert!(registers.status.is_set(STATUS::LOCK));

        assert_eq!(hfxo.set_ctune(230), Ok(()));
        assert_eq!(hfxo.get_ctune(), 230);
        assert_eq!(registers.xtalctrl.read(XTALCTRL::CTUNEXOANA), 255);
        assert!(registers.status.is_set(STATUS::LOCK));

        assert_eq!(hfxo.set_ctune(256), Err(ClockError::InvalidParameter));
        assert_eq!(hfxo.get_ctune(), 230);
    }

    #[test]
    fn calibration_restores_the_enable_bits() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let hfxo = Hfxo::new(hw, &oscillators);
        let registers = HfxoRegisters::new(&chip, SIXG301.addresses.hfxo);

        assert_eq!(hfxo.calibrate_ctune(120), Ok(()));
        assert_eq!(hfxo.get_ctune(), 120);
        assert!(!registers.ctrl.is_set(CTRL::FORCEEN));
        assert!(!registers.ctrl.is_set(CTRL::DISONDEMAND));
        assert_eq!(
            chip.writes_to(SIXG301.addresses.hfxo + 0x050),
            [CMD::COREBIASOPT::SET.value]
        );

        registers.ctrl.write(CTRL::DISONDEMAND::SET);
        assert_eq!(hfxo.calibrate_ctune(300), Err(ClockError::InvalidParameter));
        assert!(registers.ctrl.is_set(CTRL::DISONDEMAND));
        assert!(!registers.ctrl.is_set(CTRL::FORCEEN));
    }

    #[test]
    fn core_bias_needs_a_stopped_oscillator() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let hfxo = Hfxo::new(hw, &oscillators);
        let registers = HfxoRegisters::new(&chip, SIXG301.addresses.hfxo);

        assert_eq!(hfxo.set_core_bias(0x1_00), Err(ClockError::InvalidParameter));
        assert_eq!(hfxo.set_core_bias(42), Ok(()));
        assert_eq!(hfxo.get_core_bias(), Ok(42));
        assert!(registers.xtalctrl.is_set(XTALCTRL::SKIPCOREBIASOPT));
        assert!(!registers.ctrl.is_set(CTRL::DISONDEMAND));

        registers.ctrl.set_bits(CTRL::FORCEEN::SET);
        assert_eq!(hfxo.set_core_bias(50), Err(ClockError::InvalidState));
        assert_eq!(hfxo.get_core_bias(), Ok(42));
    }

    #[test]
    fn ready_interrupt_is_acknowledged_once() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let oscillators = Oscillators::new(hw);
        let hfxo = Hfxo::new(hw, &oscillators);
        let registers = HfxoRegisters::new(&chip, SIXG301.addresses.hfxo);

        hfxo.enable_ready_interrupt();
        assert!(registers.ien.is_set(INTERRUPT::RDY));
        assert!(!hfxo.handle_interrupt());

        registers.ctrl.set_bits(CTRL::FORCEEN::SET);
        assert!(hfxo.handle_interrupt());
        assert!(!hfxo.handle_interrupt());
    }
}
