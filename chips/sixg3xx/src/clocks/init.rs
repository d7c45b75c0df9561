// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock tree bring-up.
//!
//! Oscillators come up first, then the PLLs that reference them, then the branch multiplexers.
//! SYSCLK and the external flash controller are parked on FSRCO while their sources are
//! reconfigured.

use log::{debug, error, info};

use crate::clocks::branch::ClockBranch;
use crate::clocks::clocks::Clocks;
use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::dpll::Dpll;
use crate::clocks::hfrco::{Hfrco, HfrcoInstance};
use crate::clocks::lfrco::Lfrco;
use crate::clocks::lfxo::Lfxo;
use crate::clocks::oscillator::OscillatorId;
use crate::clocks::socpll::Socpll;
use crate::error::ClockError;

/// Oscillator control blocks opened before bring-up
const OSCILLATOR_BUS_CLOCKS: [BusClock; 8] = [
    BusClock::Fsrco,
    BusClock::Hfxo0,
    BusClock::Hfrco0,
    BusClock::Hfrcoem23,
    BusClock::Dpll0,
    BusClock::Lfxo,
    BusClock::Lfrco,
    BusClock::Ulfrco,
];

/// Branches reported once bring-up completes
const REPORTED_BRANCHES: [ClockBranch; 10] = [
    ClockBranch::Sysclk,
    ClockBranch::Hclk,
    ClockBranch::Pclk,
    ClockBranch::Lspclk,
    ClockBranch::Em01grpaclk,
    ClockBranch::Em01grpcclk,
    ClockBranch::Em23grpaclk,
    ClockBranch::Em4grpaclk,
    ClockBranch::Systickclk,
    ClockBranch::Qspisysclk,
];

impl Clocks<'_> {
    /// Bring up the clock tree from the configuration given to [Clocks::new].
    ///
    /// Bring-up stops at the first failing step.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): the configuration is invalid for the running
    ///   part, or a factory calibration is missing
    /// + [Err]\([ClockError::NotSupported]\): the configuration requests a PLL or feature the
    ///   running part lacks
    /// + [Err]\([ClockError::Timeout]\): an oscillator did not start under a bounded poll policy
    /// + [Err]\([ClockError::Mailbox]\): the secure element rejected a command
    pub fn init(&self) -> Result<(), ClockError> {
        if let Err(err) = self.bring_up() {
            error!("clock tree bring-up failed: {}", err);
            return Err(err);
        }
        self.report();
        Ok(())
    }

    fn bring_up(&self) -> Result<(), ClockError> {
        let config = &self.config;
        let capabilities = self.hw.capabilities();
        config.validate(capabilities)?;

        let cmu = Cmu::new(self.hw);
        cmu.set_sysclk_source(OscillatorId::Fsrco)?;
        for clock in OSCILLATOR_BUS_CLOCKS {
            cmu.enable_bus_clock(clock)?;
        }
        if capabilities.has_socpll {
            cmu.enable_bus_clock(BusClock::Socpll0)?;
        }

        if let Some(lfxo) = &config.lfxo {
            Lfxo::new(self.hw, &self.oscillators).init(lfxo, self.tokens)?;
        }

        // The FLPLL derives from HFXO.
        let flash = self.flash();
        if capabilities.has_flpll {
            flash.read_se_version()?;
            flash.set(OscillatorId::Fsrco)?;
        }
        if let Some(hfxo) = &config.hfxo {
            self.hfxo().init(hfxo, self.devinfo, self.tokens)?;
            if capabilities.has_flpll {
                flash.configure(&config.ext_flash, self.devinfo)?;
                flash.set(OscillatorId::Flpll)?;
            }
        }

        self.oscillators.latch_clkin0(config.clkin0_frequency_hz);

        match &config.hfrcodpll.dpll {
            Some(dpll) => {
                Dpll::new(self.hw, &self.oscillators).init(dpll, self.devinfo)?;
            }
            None => Hfrco::new(self.hw, &self.oscillators, HfrcoInstance::Dpll)
                .init_band(config.hfrcodpll.band_hz, self.devinfo)?,
        }

        if let Some(socpll) = &config.socpll {
            Socpll::new(self.hw, &self.oscillators).init(socpll)?;
        }

        Hfrco::new(self.hw, &self.oscillators, HfrcoInstance::Em23)
            .init_band(config.hfrcoem23_band_hz, self.devinfo)?;
        Lfrco::new(self.hw, &self.oscillators).init(config.lfrco_high_precision)?;

        self.tree().assign(&config.branches)?;
        debug!("clock tree bring-up complete on {}", capabilities.name);
        Ok(())
    }

    fn report(&self) {
        let tree = self.tree();
        for branch in REPORTED_BRANCHES {
            match (tree.frequency(branch), tree.precision(branch)) {
                (Ok(frequency), Ok(ppm)) => info!("{:?}: {} Hz, {} ppm", branch, frequency, ppm),
                (Ok(frequency), Err(_)) => info!("{:?}: {} Hz", branch, frequency),
                (Err(err), _) => info!("{:?}: {}", branch, err),
            }
        }
    }
}
