// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Static clock tree configuration.
//!
//! `Default` gives the SIXG301 board setup: SYSCLK on a 38.4 MHz crystal, HFRCODPLL on its
//! 38 MHz band feeding the SOCPLL at 150 MHz, and the low-frequency domain on LFRCO.
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = ClockConfig {
//!     lfxo: Some(LfxoConfig::default()),
//!     hfrcodpll: HfrcodpllConfig {
//!         dpll: Some(DpllConfig::default()),
//!         ..HfrcodpllConfig::default()
//!     },
//!     ..ClockConfig::default()
//! };
//! ```

use crate::chip_specific::ChipCapabilities;
use crate::clocks::branch::{
    AdcSource, Em01grpSource, Em01grpdSource, Eusart0Source, HclkDivider, I2c0Source, LfSource,
    PclkDivider, Pcnt0Source, PixelrzSource, SystickSource, TraceclkDivider, TraceclkSource,
    Wdog0Source,
};
use crate::clocks::oscillator::OscillatorId;
use crate::clocks::socpll::SocpllConfig;
use crate::error::ClockError;

const HFXO_FREQUENCY_MIN_HZ: u32 = 38_000_000;
const HFXO_FREQUENCY_MAX_HZ: u32 = 40_000_000;
/// Widest HFXO CTUNE code
pub const HFXO_CTUNE_MAX: u32 = 0xFF;
/// Widest LFXO CAPTUNE code
pub const LFXO_CAPTUNE_FIELD_MAX: u32 = 0x7F;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum HfxoMode {
    Xtal = 0,
    ExtClk = 1,
    ExtClkPkDet = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HfxoConfig {
    pub mode: HfxoMode,
    pub frequency_hz: u32,
    /// CTUNEXIANA used when neither the factory value nor a token exists
    pub ctune: u32,
    /// CTUNEXOANA. Derived from `ctune` when absent.
    pub ctune_xo: Option<u32>,
    pub precision_ppm: u16,
}

impl Default for HfxoConfig {
    fn default() -> Self {
        Self {
            mode: HfxoMode::Xtal,
            frequency_hz: 38_400_000,
            ctune: 170,
            ctune_xo: None,
            precision_ppm: 50,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum LfxoMode {
    Xtal = 0,
    BufExtClk = 1,
    DigExtClk = 2,
}

/// Cycles the LFXO waits before reporting ready
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum LfxoTimeout {
    Cycles2 = 0,
    Cycles256 = 1,
    Cycles1K = 2,
    Cycles2K = 3,
    Cycles4K = 4,
    Cycles8K = 5,
    Cycles16K = 6,
    Cycles32K = 7,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LfxoConfig {
    pub mode: LfxoMode,
    pub ctune: u32,
    pub precision_ppm: u16,
    pub timeout: LfxoTimeout,
}

impl Default for LfxoConfig {
    fn default() -> Self {
        Self {
            mode: LfxoMode::Xtal,
            ctune: 63,
            precision_ppm: 50,
            timeout: LfxoTimeout::Cycles4K,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DpllReference {
    Hfxo,
    Lfxo,
    Clkin0,
}

impl DpllReference {
    pub fn oscillator(self) -> OscillatorId {
        match self {
            DpllReference::Hfxo => OscillatorId::Hfxo,
            DpllReference::Lfxo => OscillatorId::Lfxo,
            DpllReference::Clkin0 => OscillatorId::Clkin0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DpllMode {
    /// Frequency-locked loop
    Fll,
    /// Phase-locked loop
    Pll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DpllEdge {
    Fall,
    Rise,
}

/// DPLL locking HFRCODPLL to `reference * (n + 1) / (m + 1)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DpllConfig {
    /// Target frequency. Selects the HFRCODPLL band.
    pub frequency_hz: u32,
    pub n: u32,
    pub m: u32,
    pub reference: DpllReference,
    pub mode: DpllMode,
    pub edge: DpllEdge,
    pub autorecover: bool,
    pub dither: bool,
}

impl Default for DpllConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 76_800_000,
            n: 3839,
            m: 1919,
            reference: DpllReference::Hfxo,
            mode: DpllMode::Pll,
            edge: DpllEdge::Fall,
            autorecover: true,
            dither: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HfrcodpllConfig {
    /// Band used when the DPLL is off
    pub band_hz: u32,
    pub dpll: Option<DpllConfig>,
}

impl Default for HfrcodpllConfig {
    fn default() -> Self {
        Self {
            band_hz: 38_000_000,
            dpll: None,
        }
    }
}

/// Highest frequency the external flash accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashMaxFrequency {
    Hz(u32),
    /// Derived from the temperature grade of the co-packaged flash
    PartGrade,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtFlashConfig {
    pub max_frequency: FlashMaxFrequency,
    /// Used as is, without radio band avoidance. Must be below the maximum.
    pub custom_frequency_hz: Option<u32>,
}

impl Default for ExtFlashConfig {
    fn default() -> Self {
        Self {
            max_frequency: FlashMaxFrequency::Hz(150_000_000),
            custom_frequency_hz: None,
        }
    }
}

/// Multiplexer and divider of every configurable branch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchConfig {
    pub sysclk: OscillatorId,
    pub hclk_divider: HclkDivider,
    pub pclk_divider: PclkDivider,
    pub traceclk: TraceclkSource,
    pub traceclk_divider: TraceclkDivider,
    pub em01grpaclk: Em01grpSource,
    pub em01grpcclk: Em01grpSource,
    pub em01grpdclk: Em01grpdSource,
    pub em23grpaclk: LfSource,
    pub em4grpaclk: LfSource,
    pub sysrtcclk: LfSource,
    pub wdog0clk: Wdog0Source,
    pub eusart0clk: Eusart0Source,
    pub i2c0clk: I2c0Source,
    pub pcnt0clk: Pcnt0Source,
    pub adcclk: AdcSource,
    pub pixelrzclk: PixelrzSource,
    /// 1 to 4
    pub pixelrzclk_divider: u32,
    pub systickclk: SystickSource,
}

impl Default for BranchConfig {
    fn default() -> Self {
        Self {
            sysclk: OscillatorId::Hfxo,
            hclk_divider: HclkDivider::Div1,
            pclk_divider: PclkDivider::Div2,
            traceclk: TraceclkSource::Sysclk,
            traceclk_divider: TraceclkDivider::Div1,
            em01grpaclk: Em01grpSource::Hfxo,
            em01grpcclk: Em01grpSource::Hfxo,
            em01grpdclk: Em01grpdSource::Hfxo,
            em23grpaclk: LfSource::Lfrco,
            em4grpaclk: LfSource::Lfrco,
            sysrtcclk: LfSource::Lfrco,
            wdog0clk: Wdog0Source::Lfrco,
            eusart0clk: Eusart0Source::Em01grpcclk,
            i2c0clk: I2c0Source::Em01grpdclk,
            pcnt0clk: Pcnt0Source::Em23grpaclk,
            adcclk: AdcSource::Em01grpaclk,
            pixelrzclk: PixelrzSource::Hfxo,
            pixelrzclk_divider: 1,
            systickclk: SystickSource::Hclk,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    pub hfxo: Option<HfxoConfig>,
    pub lfxo: Option<LfxoConfig>,
    pub hfrcodpll: HfrcodpllConfig,
    pub hfrcoem23_band_hz: u32,
    pub lfrco_high_precision: bool,
    pub socpll: Option<SocpllConfig>,
    pub clkin0_frequency_hz: u32,
    pub ext_flash: ExtFlashConfig,
    pub branches: BranchConfig,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            hfxo: Some(HfxoConfig::default()),
            lfxo: None,
            hfrcodpll: HfrcodpllConfig::default(),
            hfrcoem23_band_hz: 20_000_000,
            lfrco_high_precision: false,
            socpll: Some(SocpllConfig::default()),
            clkin0_frequency_hz: 38_000_000,
            ext_flash: ExtFlashConfig::default(),
            branches: BranchConfig::default(),
        }
    }
}

impl ClockConfig {
    /// Check the configuration against the running part before touching any register.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): a value is out of range, or a branch or PLL
    ///   refers to an oscillator that is not configured
    /// + [Err]\([ClockError::NotSupported]\): a PLL or feature the running part lacks is
    ///   requested
    pub fn validate(&self, capabilities: &ChipCapabilities) -> Result<(), ClockError> {
        if let Some(hfxo) = &self.hfxo {
            if hfxo.frequency_hz < HFXO_FREQUENCY_MIN_HZ || hfxo.frequency_hz > HFXO_FREQUENCY_MAX_HZ
            {
                return Err(ClockError::InvalidParameter);
            }
            if hfxo.ctune > HFXO_CTUNE_MAX || hfxo.ctune_xo.is_some_and(|xo| xo > HFXO_CTUNE_MAX)
            {
                return Err(ClockError::InvalidParameter);
            }
        }
        if let Some(lfxo) = &self.lfxo {
            if lfxo.ctune > LFXO_CAPTUNE_FIELD_MAX {
                return Err(ClockError::InvalidParameter);
            }
        }

        if let Some(dpll) = &self.hfrcodpll.dpll {
            let reference_configured = match dpll.reference {
                DpllReference::Hfxo => self.hfxo.is_some(),
                DpllReference::Lfxo => self.lfxo.is_some(),
                DpllReference::Clkin0 => true,
            };
            if !reference_configured {
                return Err(ClockError::InvalidParameter);
            }
        }

        if self.socpll.is_some() && !capabilities.has_socpll {
            return Err(ClockError::NotSupported);
        }
        if self.lfrco_high_precision {
            if !capabilities.has_lfrco_high_precision {
                return Err(ClockError::NotSupported);
            }
            if self.hfxo.is_none() {
                return Err(ClockError::InvalidParameter);
            }
        }

        let sysclk_configured = match self.branches.sysclk {
            OscillatorId::Fsrco | OscillatorId::Hfrcodpll | OscillatorId::Clkin0 => true,
            OscillatorId::Hfxo => self.hfxo.is_some(),
            OscillatorId::Socpll0 => self.socpll.is_some(),
            _ => false,
        };
        if !sysclk_configured || !(1..=4).contains(&self.branches.pixelrzclk_divider) {
            return Err(ClockError::InvalidParameter);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip_specific::{SERIES2_BUFOUT, SIXG301};

    #[test]
    fn board_defaults_are_valid() {
        assert_eq!(ClockConfig::default().validate(&SIXG301), Ok(()));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let slow_crystal = ClockConfig {
            hfxo: Some(HfxoConfig {
                frequency_hz: 32_000_000,
                ..HfxoConfig::default()
            }),
            ..ClockConfig::default()
        };
        assert_eq!(
            slow_crystal.validate(&SIXG301),
            Err(ClockError::InvalidParameter)
        );

        let wide_ctune = ClockConfig {
            lfxo: Some(LfxoConfig {
                ctune: 0x80,
                ..LfxoConfig::default()
            }),
            ..ClockConfig::default()
        };
        assert_eq!(
            wide_ctune.validate(&SIXG301),
            Err(ClockError::InvalidParameter)
        );
    }

    #[test]
    fn sources_must_be_configured() {
        let no_crystal = ClockConfig {
            hfxo: None,
            ..ClockConfig::default()
        };
        assert_eq!(
            no_crystal.validate(&SIXG301),
            Err(ClockError::InvalidParameter)
        );

        let lfxo_reference = ClockConfig {
            hfrcodpll: HfrcodpllConfig {
                dpll: Some(DpllConfig {
                    reference: DpllReference::Lfxo,
                    ..DpllConfig::default()
                }),
                ..HfrcodpllConfig::default()
            },
            ..ClockConfig::default()
        };
        assert_eq!(
            lfxo_reference.validate(&SIXG301),
            Err(ClockError::InvalidParameter)
        );
    }

    #[test]
    fn reduced_profile_needs_a_reduced_configuration() {
        assert_eq!(
            ClockConfig::default().validate(&SERIES2_BUFOUT),
            Err(ClockError::NotSupported)
        );

        let reduced = ClockConfig {
            socpll: None,
            ..ClockConfig::default()
        };
        assert_eq!(reduced.validate(&SERIES2_BUFOUT), Ok(()));
    }
}
