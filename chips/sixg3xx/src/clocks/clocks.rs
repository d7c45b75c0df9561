// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! SIXG3xx clock tree
//!
//! [Clocks] owns the oscillator store and is the single entry point of the clock tree: bring-up,
//! frequency and precision queries, SYSCLK and external flash clock switching, and the runtime
//! calibration of every oscillator. Drivers of the individual oscillators are short-lived views
//! built on demand over the same [Hardware].
//!
//! # Features
//!
//! - [x] Bring-up of every oscillator and PLL from a static [ClockConfig]
//! - [x] Live frequency and precision resolution of every branch
//! - [x] RC oscillator trimming and crystal capacitance tuning
//! - [x] CTUNE override persisted by the board
//! - [x] Low-power helpers for the power manager
//!
//! # Limitations
//!
//! - [ ] No DPLL reconfiguration after bring-up
//! - [ ] PRS inputs of the calibration counters are not routed
//!
//! # Usage
//!
//! ```rust,ignore
//! let clocks = static_init!(
//!     Clocks<'static>,
//!     Clocks::new(hw, ClockConfig::default(), &DEVINFO, &TOKENS, &SE_MAILBOX)
//! );
//! clocks.init()?;
//! clocks.runtime_init()?;
//!
//! let hclk = clocks.get_clock_branch_frequency(ClockBranch::Hclk)?;
//! debug!("HCLK runs at {} Hz", hclk);
//! ```
//!
//! ## Trim an RC oscillator
//!
//! ```rust,ignore
//! let tuning = clocks.get_rc_oscillator_calibration(OscillatorId::Hfrcoem23)?;
//! clocks.set_rc_oscillator_calibration(OscillatorId::Hfrcoem23, tuning + 1)?;
//! ```
//!
//! ## Power manager hooks
//!
//! ```rust,ignore
//! clocks.prepare_sleep()?;
//! // enter EM1/EM2
//! clocks.restore_after_wake()?;
//! ```

use core::cell::Cell;

use log::debug;

use crate::clocks::branch::{ClockBranch, ClockTree};
use crate::clocks::calibration::{CalibrationClock, RcoCalibration};
use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::config::{ClockConfig, HFXO_CTUNE_MAX};
use crate::clocks::flpll::{ExtFlash, ExtFlashState};
use crate::clocks::hfrco::{Hfrco, HfrcoInstance};
use crate::clocks::hfxo::{Hfxo, HfxoClient, HfxoState};
use crate::clocks::lfrco::Lfrco;
use crate::clocks::lfxo::Lfxo;
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::devinfo::{CalibrationStore, DeviceInfo, ManufacturingTokens};
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::se_manager::SecureElementMailbox;

pub struct Clocks<'a> {
    pub(in crate::clocks) hw: Hardware<'a>,
    pub(in crate::clocks) config: ClockConfig,
    pub(in crate::clocks) devinfo: &'a dyn DeviceInfo,
    pub(in crate::clocks) tokens: &'a dyn ManufacturingTokens,
    pub(in crate::clocks) se: &'a dyn SecureElementMailbox,
    pub(in crate::clocks) oscillators: Oscillators<'a>,
    pub(in crate::clocks) ext_flash: ExtFlashState,
    store: Cell<Option<&'a dyn CalibrationStore>>,
    hfxo_client: Cell<Option<&'a dyn HfxoClient>>,
    // Sources to restore after sleep
    sleep_sysclk: Cell<Option<OscillatorId>>,
    sleep_ext_flash: Cell<Option<OscillatorId>>,
}

impl<'a> Clocks<'a> {
    pub fn new(
        hw: Hardware<'a>,
        config: ClockConfig,
        devinfo: &'a dyn DeviceInfo,
        tokens: &'a dyn ManufacturingTokens,
        se: &'a dyn SecureElementMailbox,
    ) -> Self {
        Self {
            hw,
            config,
            devinfo,
            tokens,
            se,
            oscillators: Oscillators::new(hw),
            ext_flash: ExtFlashState::new(),
            store: Cell::new(None),
            hfxo_client: Cell::new(None),
            sleep_sysclk: Cell::new(None),
            sleep_ext_flash: Cell::new(None),
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn oscillators(&self) -> &Oscillators<'a> {
        &self.oscillators
    }

    pub(in crate::clocks) fn tree(&self) -> ClockTree<'_> {
        ClockTree::new(self.hw, &self.oscillators)
    }

    pub(in crate::clocks) fn flash(&self) -> ExtFlash<'_> {
        ExtFlash::new(self.hw, &self.oscillators, self.se, &self.ext_flash)
    }

    pub(in crate::clocks) fn hfxo(&self) -> Hfxo<'_> {
        Hfxo::new(self.hw, &self.oscillators)
    }

    pub fn get_clock_branch_frequency(&self, branch: ClockBranch) -> Result<u32, ClockError> {
        self.tree().frequency(branch)
    }

    pub fn get_clock_branch_precision(&self, branch: ClockBranch) -> Result<u16, ClockError> {
        self.tree().precision(branch)
    }

    pub fn get_oscillator_frequency(&self, oscillator: OscillatorId) -> Result<u32, ClockError> {
        self.oscillators.frequency(oscillator)
    }

    pub fn get_oscillator_precision(&self, oscillator: OscillatorId) -> Result<u16, ClockError> {
        self.oscillators.precision(oscillator)
    }

    pub fn set_sysclk_source(&self, source: OscillatorId) -> Result<(), ClockError> {
        Cmu::new(self.hw).set_sysclk_source(source)
    }

    pub fn get_sysclk_source(&self) -> Result<OscillatorId, ClockError> {
        Cmu::new(self.hw).get_sysclk_source()
    }

    /// Clock the external flash controller from FLPLL or FSRCO.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotSupported]\): the running part has no FLPLL
    /// + [Err]\([ClockError::InvalidParameter]\): `oscillator` is neither FLPLL nor FSRCO
    pub fn set_ext_flash_clock(&self, oscillator: OscillatorId) -> Result<(), ClockError> {
        self.flash().set(oscillator)
    }

    pub fn get_ext_flash_clock(&self) -> Result<OscillatorId, ClockError> {
        self.flash().get()
    }

    pub fn enable_bus_clock(&self, clock: BusClock) -> Result<(), ClockError> {
        Cmu::new(self.hw).enable_bus_clock(clock)
    }

    pub fn disable_bus_clock(&self, clock: BusClock) -> Result<(), ClockError> {
        Cmu::new(self.hw).disable_bus_clock(clock)
    }

    /// Write the tuning code of an RC oscillator.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `oscillator` is not HFRCODPLL, HFRCOEM23 or
    ///   LFRCO, or `value` does not fit its tuning field
    pub fn set_rc_oscillator_calibration(
        &self,
        oscillator: OscillatorId,
        value: u32,
    ) -> Result<(), ClockError> {
        match oscillator {
            OscillatorId::Hfrcodpll => {
                Hfrco::new(self.hw, &self.oscillators, HfrcoInstance::Dpll).set_tuning(value)
            }
            OscillatorId::Hfrcoem23 => {
                Hfrco::new(self.hw, &self.oscillators, HfrcoInstance::Em23).set_tuning(value)
            }
            OscillatorId::Lfrco => Lfrco::new(self.hw, &self.oscillators).set_trim(value),
            _ => Err(ClockError::InvalidParameter),
        }?;
        debug!("{:?} tuning set to {}", oscillator, value);
        Ok(())
    }

    pub fn get_rc_oscillator_calibration(
        &self,
        oscillator: OscillatorId,
    ) -> Result<u32, ClockError> {
        match oscillator {
            OscillatorId::Hfrcodpll => {
                Hfrco::new(self.hw, &self.oscillators, HfrcoInstance::Dpll).tuning()
            }
            OscillatorId::Hfrcoem23 => {
                Hfrco::new(self.hw, &self.oscillators, HfrcoInstance::Em23).tuning()
            }
            OscillatorId::Lfrco => Lfrco::new(self.hw, &self.oscillators).trim(),
            _ => Err(ClockError::InvalidParameter),
        }
    }

    /// Force the HFXO core bias current. HFXO must be stopped. The external flash runs from FSRCO
    /// during the change.
    pub fn set_hfxo_calibration(&self, core_bias: u32) -> Result<(), ClockError> {
        self.flash()
            .with_fsrco(|| self.hfxo().set_core_bias(core_bias))?;
        debug!("HFXO core bias set to {}", core_bias);
        Ok(())
    }

    pub fn get_hfxo_calibration(&self) -> Result<u32, ClockError> {
        self.hfxo().get_core_bias()
    }

    pub fn hfxo_state(&self) -> HfxoState {
        self.hfxo().state()
    }

    /// Change the HFXO load capacitance. The FLPLL derives from HFXO, so the external flash runs
    /// from FSRCO during the change.
    pub fn hfxo_set_ctune(&self, ctune: u32) -> Result<(), ClockError> {
        self.flash().with_fsrco(|| self.hfxo().set_ctune(ctune))?;
        debug!("HFXO CTUNE set to {}", ctune);
        Ok(())
    }

    pub fn hfxo_get_ctune(&self) -> u32 {
        self.hfxo().get_ctune()
    }

    /// Change the HFXO load capacitance and rerun the core bias optimization for it.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `ctune` does not fit the field
    /// + [Err]\([ClockError::Timeout]\): the crystal did not restart under a bounded poll policy
    pub fn hfxo_calibrate_ctune(&self, ctune: u32) -> Result<(), ClockError> {
        self.flash()
            .with_fsrco(|| self.hfxo().calibrate_ctune(ctune))
    }

    pub fn set_lfxo_calibration(&self, captune: u32) -> Result<(), ClockError> {
        Lfxo::new(self.hw, &self.oscillators).set_calibration(captune)?;
        debug!("LFXO CAPTUNE set to {}", captune);
        Ok(())
    }

    pub fn get_lfxo_calibration(&self) -> Result<u32, ClockError> {
        Lfxo::new(self.hw, &self.oscillators).get_calibration()
    }

    pub fn configure_rco_calibration(
        &self,
        cycles: u32,
        down: CalibrationClock,
        up: CalibrationClock,
        continuous: bool,
    ) -> Result<(), ClockError> {
        RcoCalibration::new(self.hw).configure(cycles, down, up, continuous)
    }

    pub fn start_rco_calibration(&self) {
        RcoCalibration::new(self.hw).start()
    }

    pub fn stop_rco_calibration(&self) {
        RcoCalibration::new(self.hw).stop()
    }

    pub fn wait_rco_calibration(&self) -> Result<(), ClockError> {
        RcoCalibration::new(self.hw).wait()
    }

    pub fn get_rco_calibration_count(&self) -> u32 {
        RcoCalibration::new(self.hw).count()
    }

    pub fn set_calibration_store(&self, store: &'a dyn CalibrationStore) {
        self.store.set(Some(store));
    }

    fn calibration_store(&self) -> Result<&'a dyn CalibrationStore, ClockError> {
        self.store.get().ok_or(ClockError::NotSupported)
    }

    /// Persist a CTUNE override. It takes effect on the next
    /// [Clocks::apply_hfxo_ctune_override].
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `ctune` does not fit the field
    /// + [Err]\([ClockError::NotSupported]\): no store was registered
    pub fn write_hfxo_ctune_override(&self, ctune: u32) -> Result<(), ClockError> {
        if ctune > HFXO_CTUNE_MAX {
            return Err(ClockError::InvalidParameter);
        }
        self.calibration_store()?.write_hfxo_ctune(ctune)
    }

    /// # Errors
    ///
    /// + [Err]\([ClockError::NotSupported]\): no store was registered
    /// + [Err]\([ClockError::NotAvailable]\): no override was written
    pub fn read_hfxo_ctune_override(&self) -> Result<u32, ClockError> {
        self.calibration_store()?
            .read_hfxo_ctune()
            .ok_or(ClockError::NotAvailable)
    }

    pub fn delete_hfxo_ctune_override(&self) -> Result<(), ClockError> {
        self.calibration_store()?.delete_hfxo_ctune()
    }

    /// Calibrate HFXO with the persisted CTUNE override.
    pub fn apply_hfxo_ctune_override(&self) -> Result<(), ClockError> {
        let ctune = self.read_hfxo_ctune_override()?;
        self.hfxo_calibrate_ctune(ctune)?;
        debug!("HFXO CTUNE override {} applied", ctune);
        Ok(())
    }

    pub fn set_hfxo_client(&self, client: &'a dyn HfxoClient) {
        self.hfxo_client.set(Some(client));
    }

    /// Enable the services needed once the kernel runs: HFXO register access, the external
    /// flash on FLPLL, and the HFXO ready interrupt.
    pub fn runtime_init(&self) -> Result<(), ClockError> {
        Cmu::new(self.hw).enable_bus_clock(BusClock::Hfxo0)?;
        if self.hw.capabilities().has_flpll && self.oscillators.flpll_config().is_some() {
            self.flash().set(OscillatorId::Flpll)?;
        }
        self.hfxo().enable_ready_interrupt();
        Ok(())
    }

    /// HFXO interrupt handler.
    pub fn handle_hfxo_interrupt(&self) {
        if self.hfxo().handle_interrupt() {
            if let Some(client) = self.hfxo_client.get() {
                client.hfxo_ready();
            }
        }
    }

    /// Move SYSCLK from SOCPLL to HFXO and the external flash to FSRCO before sleep.
    pub fn prepare_sleep(&self) -> Result<(), ClockError> {
        if self.get_sysclk_source()? == OscillatorId::Socpll0 {
            self.set_sysclk_source(OscillatorId::Hfxo)?;
            self.sleep_sysclk.set(Some(OscillatorId::Socpll0));
        }

        if let Ok(flash) = self.get_ext_flash_clock() {
            self.set_ext_flash_clock(OscillatorId::Fsrco)?;
            self.sleep_ext_flash.set(Some(flash));
        }
        Ok(())
    }

    /// Undo [Clocks::prepare_sleep].
    pub fn restore_after_wake(&self) -> Result<(), ClockError> {
        if let Some(sysclk) = self.sleep_sysclk.take() {
            self.set_sysclk_source(sysclk)?;
        }
        if let Some(flash) = self.sleep_ext_flash.take() {
            self.set_ext_flash_clock(flash)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_specific::SIXG301;
    use crate::hardware::PollPolicy;
    use crate::registers::hfxo::{HfxoRegisters, CTRL, INTERRUPT};
    use crate::testing::{
        CountingMask, FakeChip, FakeDeviceInfo, FakeSe, FakeStore, FakeTokens, SeCommand,
    };

    struct ReadyCounter(Cell<usize>);

    impl HfxoClient for ReadyCounter {
        fn hfxo_ready(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn rc_calibration_is_routed_by_oscillator() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let (devinfo, tokens, se) = (FakeDeviceInfo::new(), FakeTokens::new(), FakeSe::new(0x202));
        let clocks = Clocks::new(hw, ClockConfig::default(), &devinfo, &tokens, &se);

        assert_eq!(clocks.set_rc_oscillator_calibration(OscillatorId::Hfrcodpll, 0x11), Ok(()));
        assert_eq!(clocks.set_rc_oscillator_calibration(OscillatorId::Hfrcoem23, 0x22), Ok(()));
        assert_eq!(clocks.set_rc_oscillator_calibration(OscillatorId::Lfrco, 0xC3), Ok(()));
        assert_eq!(clocks.get_rc_oscillator_calibration(OscillatorId::Hfrcodpll), Ok(0x11));
        assert_eq!(clocks.get_rc_oscillator_calibration(OscillatorId::Hfrcoem23), Ok(0x22));
        assert_eq!(clocks.get_rc_oscillator_calibration(OscillatorId::Lfrco), Ok(0xC3));

        assert_eq!(
            clocks.set_rc_oscillator_calibration(OscillatorId::Hfxo, 1),
            Err(ClockError::InvalidParameter)
        );
        assert_eq!(
            clocks.get_rc_oscillator_calibration(OscillatorId::Fsrco),
            Err(ClockError::InvalidParameter)
        );
        assert_eq!(
            clocks.set_rc_oscillator_calibration(OscillatorId::Hfrcoem23, 0x80),
            Err(ClockError::InvalidParameter)
        );
    }

    #[test]
    fn override_store() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let (devinfo, tokens, se) = (FakeDeviceInfo::new(), FakeTokens::new(), FakeSe::new(0x202));
        let clocks = Clocks::new(hw, ClockConfig::default(), &devinfo, &tokens, &se);

        assert_eq!(clocks.read_hfxo_ctune_override(), Err(ClockError::NotSupported));
        assert_eq!(clocks.apply_hfxo_ctune_override(), Err(ClockError::NotSupported));

        let store = FakeStore::new();
        clocks.set_calibration_store(&store);
        assert_eq!(clocks.read_hfxo_ctune_override(), Err(ClockError::NotAvailable));
        assert_eq!(
            clocks.write_hfxo_ctune_override(256),
            Err(ClockError::InvalidParameter)
        );
        assert_eq!(clocks.write_hfxo_ctune_override(140), Ok(()));
        assert_eq!(clocks.read_hfxo_ctune_override(), Ok(140));

        assert_eq!(clocks.apply_hfxo_ctune_override(), Ok(()));
        assert_eq!(clocks.hfxo_get_ctune(), 140);

        assert_eq!(clocks.delete_hfxo_ctune_override(), Ok(()));
        assert_eq!(clocks.read_hfxo_ctune_override(), Err(ClockError::NotAvailable));
    }

    #[test]
    fn ready_interrupt_reaches_the_client() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let (devinfo, tokens, se) = (FakeDeviceInfo::new(), FakeTokens::new(), FakeSe::new(0x202));
        let clocks = Clocks::new(hw, ClockConfig::default(), &devinfo, &tokens, &se);
        let counter = ReadyCounter(Cell::new(0));

        assert_eq!(clocks.runtime_init(), Ok(()));
        let hfxo = HfxoRegisters::new(&chip, SIXG301.addresses.hfxo);
        assert!(hfxo.ien.is_set(INTERRUPT::RDY));

        // Spurious interrupt with no client.
        hfxo.if_.set_bits(INTERRUPT::RDY::SET);
        clocks.handle_hfxo_interrupt();
        assert!(!hfxo.if_.is_set(INTERRUPT::RDY));

        clocks.set_hfxo_client(&counter);
        clocks.handle_hfxo_interrupt();
        assert_eq!(counter.0.get(), 0);
        hfxo.if_.set_bits(INTERRUPT::RDY::SET);
        clocks.handle_hfxo_interrupt();
        assert_eq!(counter.0.get(), 1);
    }

    #[test]
    fn core_bias_needs_a_stopped_crystal() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let (devinfo, tokens, se) = (FakeDeviceInfo::new(), FakeTokens::new(), FakeSe::new(0x202));
        let clocks = Clocks::new(hw, ClockConfig::default(), &devinfo, &tokens, &se);

        assert_eq!(clocks.set_hfxo_calibration(0x2A), Ok(()));
        assert_eq!(clocks.get_hfxo_calibration(), Ok(0x2A));
        assert_eq!(
            clocks.set_hfxo_calibration(0x100),
            Err(ClockError::InvalidParameter)
        );

        HfxoRegisters::new(&chip, SIXG301.addresses.hfxo)
            .ctrl
            .set_bits(CTRL::FORCEEN::SET);
        assert_eq!(
            clocks.set_hfxo_calibration(0x10),
            Err(ClockError::InvalidState)
        );
        assert_eq!(clocks.get_hfxo_calibration(), Ok(0x2A));
    }

    #[test]
    fn core_bias_change_parks_the_flash_clock() {
        let chip = FakeChip::new();
        let mask = CountingMask::new();
        let hw = Hardware::new(&chip, &mask, &SIXG301, PollPolicy::Bounded(16));
        let (devinfo, tokens, se) = (FakeDeviceInfo::new(), FakeTokens::new(), FakeSe::new(0x202));
        let config = ClockConfig {
            socpll: None,
            ..ClockConfig::default()
        };
        let clocks = Clocks::new(hw, config, &devinfo, &tokens, &se);
        clocks.init().unwrap();
        assert_eq!(clocks.get_ext_flash_clock(), Ok(OscillatorId::Flpll));
        assert_eq!(se.commands().len(), 2);

        assert_eq!(clocks.set_hfxo_calibration(0x30), Ok(()));
        assert_eq!(clocks.get_hfxo_calibration(), Ok(0x30));
        let commands = se.commands();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[2], SeCommand::Fsrco);
        assert!(matches!(commands[3], SeCommand::Flpll(_)));
        assert_eq!(clocks.get_ext_flash_clock(), Ok(OscillatorId::Flpll));

        // A rejected value still hands the flash clock back.
        assert_eq!(
            clocks.set_hfxo_calibration(0x100),
            Err(ClockError::InvalidParameter)
        );
        let commands = se.commands();
        assert_eq!(commands.len(), 6);
        assert_eq!(commands[4], SeCommand::Fsrco);
        assert!(matches!(commands[5], SeCommand::Flpll(_)));
    }
}
