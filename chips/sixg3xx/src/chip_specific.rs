// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Chip-specific descriptors.
//!
//! Parts sharing this clock management unit differ in which PLLs and peripheral clock branches
//! they carry, where their oscillator blocks live and how the crystal load capacitance is
//! balanced. Instead of compiling one driver per part, every driver consults a
//! [ChipCapabilities] descriptor at runtime.

use crate::clocks::branch::ClockBranch;
use crate::clocks::oscillator::OscillatorId;

/// Base addresses of the blocks driven by the clock tree engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeripheralAddresses {
    pub cmu: usize,
    pub hfxo: usize,
    pub hfrcodpll: usize,
    pub hfrcoem23: usize,
    pub dpll: usize,
    pub lfxo: usize,
    pub lfrco: usize,
    pub socpll: usize,
    pub syscfg: usize,
    pub systick: usize,
}

/// What the running part provides
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipCapabilities {
    pub name: &'static str,
    pub addresses: PeripheralAddresses,
    /// Fractional system PLL
    pub has_socpll: bool,
    /// External flash PLL driven by the secure element, together with the QSPISYSCLK and
    /// FLPLLREFCLK branches
    pub has_flpll: bool,
    pub has_pixelrz: bool,
    pub has_lfrco_high_precision: bool,
    /// Added to CTUNEXIANA to obtain CTUNEXOANA. Compensates the load imbalance of parts with a
    /// buffered HFXO output.
    pub hfxo_ctune_delta: u32,
    /// Largest internal LFXO load capacitance code (29.1 pF)
    pub lfxo_captune_max: u32,
    /// Oldest secure element firmware able to drive the FLPLL
    pub flpll_min_se_version: u32,
}

const SERIES3_ADDRESSES: PeripheralAddresses = PeripheralAddresses {
    cmu: 0x5000_8000,
    hfxo: 0x5A00_4000,
    hfrcodpll: 0x5001_0000,
    hfrcoem23: 0x4001_4000,
    dpll: 0x4001_C000,
    lfxo: 0x4002_0000,
    lfrco: 0x4002_4000,
    socpll: 0x5A00_8000,
    syscfg: 0x4007_C000,
    systick: 0xE000_E010,
};

pub const SIXG301: ChipCapabilities = ChipCapabilities {
    name: "SIXG301",
    addresses: SERIES3_ADDRESSES,
    has_socpll: true,
    has_flpll: true,
    has_pixelrz: true,
    has_lfrco_high_precision: true,
    hfxo_ctune_delta: 0,
    lfxo_captune_max: 0x59,
    flpll_min_se_version: 0x0000_0202,
};

/// Reduced profile: a part with a buffered HFXO output and neither SOCPLL, FLPLL, QSPI nor
/// PIXELRZ.
pub const SERIES2_BUFOUT: ChipCapabilities = ChipCapabilities {
    name: "SERIES2-BUFOUT",
    addresses: SERIES3_ADDRESSES,
    has_socpll: false,
    has_flpll: false,
    has_pixelrz: false,
    has_lfrco_high_precision: true,
    hfxo_ctune_delta: 40,
    lfxo_captune_max: 0x59,
    flpll_min_se_version: 0x0000_0202,
};

impl ChipCapabilities {
    pub fn has_oscillator(&self, oscillator: OscillatorId) -> bool {
        match oscillator {
            OscillatorId::Socpll0 => self.has_socpll,
            OscillatorId::Flpll => self.has_flpll,
            _ => true,
        }
    }

    pub fn has_branch(&self, branch: ClockBranch) -> bool {
        match branch {
            ClockBranch::Pixelrzclk => self.has_pixelrz,
            ClockBranch::Qspisysclk | ClockBranch::Flpllrefclk => self.has_flpll,
            _ => true,
        }
    }
}
