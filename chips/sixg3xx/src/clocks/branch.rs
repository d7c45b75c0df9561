// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock branches and the tree resolver.
//!
//! A branch picks one upstream source through a multiplexer and optionally divides it. The
//! resolver decodes the live multiplexer state on every query and walks up the tree until it
//! reaches an oscillator, so the answer always reflects the current hardware configuration.
//!
//! ```text
//!   oscillators ──► SYSCLK ──► HCLK ──► PCLK ──► LSPCLK
//!        │             └──► TRACECLK, EXPORTCLK   └──► WDOGxCLK (HCLK / 1024)
//!        ├──► EM01GRPA/C/DCLK ──► ADCCLK, EUSART0CLK, I2C0CLK
//!        └──► EM23GRPACLK ──► PCNT0CLK, SYSTICKCLK
//! ```

use log::debug;

use crate::clocks::cmu::{BusClock, Cmu};
use crate::clocks::config::BranchConfig;
use crate::clocks::oscillator::{OscillatorId, Oscillators};
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::cmu::{
    ADCCLKCTRL, DPLLREFCLKCTRL, EM01GRPACLKCTRL, EM01GRPCCLKCTRL, EM01GRPDCLKCTRL,
    EM23GRPACLKCTRL, EM4GRPACLKCTRL, EUSART0CLKCTRL, EXPORTCLKCTRL, FLPLLREFCLKCTRL,
    I2C0CLKCTRL, PCNT0CLKCTRL, PIXELRZCLKCTRL, QSPISYSCLKCTRL, SYSCLKCTRL, SYSRTC0CLKCTRL,
    TRACECLKCTRL, WDOG0CLKCTRL,
};
use crate::registers::syscfg::CFGSYSTIC;
use crate::registers::systick::CSR;

/// Longest chain of branches the resolver follows
const MAX_DEPTH: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockBranch {
    Sysclk,
    Hclk,
    Pclk,
    Lspclk,
    Traceclk,
    Exportclk,
    Em01grpaclk,
    Em01grpcclk,
    Em01grpdclk,
    Em23grpaclk,
    Em4grpaclk,
    Sysrtcclk,
    Wdog0clk,
    Wdog1clk,
    Eusart0clk,
    I2c0clk,
    Pcnt0clk,
    Adcclk,
    Pixelrzclk,
    Systickclk,
    Dpllrefclk,
    Qspisysclk,
    Flpllrefclk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum HclkDivider {
    Div1 = 0,
    Div2 = 1,
    Div4 = 3,
    Div8 = 7,
    Div16 = 15,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PclkDivider {
    Div1 = 0,
    Div2 = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum TraceclkSource {
    Sysclk = 1,
    Hfrcoem23 = 2,
    HfrcodpllRt = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum TraceclkDivider {
    Div1 = 0,
    Div2 = 1,
    Div4 = 3,
}

/// Source of EM01GRPACLK and EM01GRPCCLK
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Em01grpSource {
    Hfrcodpll = 1,
    Hfxo = 2,
    Hfrcoem23 = 3,
    Fsrco = 4,
    HfrcodpllRt = 5,
    HfxoRt = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Em01grpdSource {
    Hfrcodpll = 1,
    Hfxo = 2,
    Hfrcoem23 = 3,
    Fsrco = 4,
}

/// Source of EM23GRPACLK, EM4GRPACLK and SYSRTCCLK
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum LfSource {
    Lfrco = 1,
    Lfxo = 2,
    Ulfrco = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Wdog0Source {
    Lfrco = 1,
    Lfxo = 2,
    Ulfrco = 3,
    HclkDiv1024 = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Eusart0Source {
    Em01grpcclk = 1,
    Hfrcoem23 = 2,
    Lfrco = 3,
    Lfxo = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum I2c0Source {
    Em01grpdclk = 1,
    Hfrcoem23 = 2,
    Lfrco = 3,
    Lfxo = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Pcnt0Source {
    Em23grpaclk = 1,
    /// External pin
    Pcnts0 = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum AdcSource {
    Em01grpaclk = 1,
    Fsrco = 2,
    Hfrcoem23 = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PixelrzSource {
    Hfrcodpll = 1,
    Hfxo = 2,
    Fsrco = 3,
    Hfrcoem23 = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SystickSource {
    /// Processor clock
    Hclk,
    /// External reference, routed by SYSCFG
    Em23grpaclk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Oscillator(OscillatorId),
    Branch(ClockBranch),
}

/// Decoded multiplexer and divider of a branch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Selection {
    source: Source,
    divider: u32,
}

impl Selection {
    fn oscillator(oscillator: OscillatorId) -> Self {
        Self::divided(Source::Oscillator(oscillator), 1)
    }

    fn branch(branch: ClockBranch) -> Self {
        Self::divided(Source::Branch(branch), 1)
    }

    fn divided(source: Source, divider: u32) -> Self {
        Self { source, divider }
    }
}

/// Read-only view of the branch multiplexers, plus the bring-up assignment
pub struct ClockTree<'a> {
    hw: Hardware<'a>,
    oscillators: &'a Oscillators<'a>,
}

impl<'a> ClockTree<'a> {
    pub(in crate::clocks) fn new(hw: Hardware<'a>, oscillators: &'a Oscillators<'a>) -> Self {
        Self { hw, oscillators }
    }

    /// Frequency of `branch` in Hz, resolved from the live multiplexer state.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotSupported]\): the running part has no such branch, or the branch
    ///   is clocked from an external pin
    /// + [Err]\([ClockError::InvalidState]\): a multiplexer holds a reserved or disabled
    ///   encoding, or the chain is too long
    /// + [Err]\([ClockError::NotAvailable]\): the source oscillator is not configured
    pub fn frequency(&self, branch: ClockBranch) -> Result<u32, ClockError> {
        self.hw.atomic(|| self.resolve_frequency(branch, 0))
    }

    /// Precision of `branch` in ppm.
    ///
    /// # Errors
    ///
    /// Same as [ClockTree::frequency]. In addition,
    /// [Err]\([ClockError::NotAvailable]\) as soon as the chain reaches an oscillator without a
    /// guaranteed precision.
    pub fn precision(&self, branch: ClockBranch) -> Result<u16, ClockError> {
        self.hw.atomic(|| self.resolve_precision(branch, 0))
    }

    fn resolve_frequency(&self, branch: ClockBranch, depth: usize) -> Result<u32, ClockError> {
        let selection = self.selection(branch, depth)?;
        let upstream = match selection.source {
            Source::Oscillator(oscillator) => self.oscillators.frequency(oscillator)?,
            Source::Branch(parent) => self.resolve_frequency(parent, depth + 1)?,
        };
        Ok(upstream / selection.divider)
    }

    fn resolve_precision(&self, branch: ClockBranch, depth: usize) -> Result<u16, ClockError> {
        match self.selection(branch, depth)?.source {
            Source::Oscillator(oscillator) => self.oscillators.precision(oscillator),
            Source::Branch(parent) => self.resolve_precision(parent, depth + 1),
        }
    }

    fn selection(&self, branch: ClockBranch, depth: usize) -> Result<Selection, ClockError> {
        if depth >= MAX_DEPTH {
            return Err(ClockError::InvalidState);
        }
        if !self.hw.capabilities().has_branch(branch) {
            return Err(ClockError::NotSupported);
        }
        self.decode(branch)
    }

    fn decode(&self, branch: ClockBranch) -> Result<Selection, ClockError> {
        let cmu = self.hw.cmu();
        let reserved = Err(ClockError::InvalidState);

        match branch {
            ClockBranch::Sysclk => Cmu::new(self.hw)
                .get_sysclk_source()
                .map(Selection::oscillator),
            ClockBranch::Hclk => {
                let presc = cmu.sysclkctrl.read(SYSCLKCTRL::HCLKPRESC);
                Ok(Selection::divided(
                    Source::Branch(ClockBranch::Sysclk),
                    presc + 1,
                ))
            }
            ClockBranch::Pclk => {
                let presc = cmu.sysclkctrl.read(SYSCLKCTRL::PCLKPRESC);
                Ok(Selection::divided(Source::Branch(ClockBranch::Hclk), presc + 1))
            }
            ClockBranch::Lspclk => Ok(Selection::divided(Source::Branch(ClockBranch::Pclk), 2)),
            ClockBranch::Traceclk => {
                use TRACECLKCTRL::CLKSEL::Value;
                let ctrl = cmu.traceclkctrl.extract();
                let divider = ctrl.read(TRACECLKCTRL::PRESC) + 1;
                let source = match ctrl.read_as_enum(TRACECLKCTRL::CLKSEL) {
                    Some(Value::SYSCLK) => Source::Branch(ClockBranch::Sysclk),
                    Some(Value::HFRCOEM23) => Source::Oscillator(OscillatorId::Hfrcoem23),
                    Some(Value::HFRCODPLLRT) => Source::Oscillator(OscillatorId::Hfrcodpll),
                    Some(Value::DISABLE) | None => return reserved,
                };
                Ok(Selection::divided(source, divider))
            }
            ClockBranch::Exportclk => {
                let presc = cmu.exportclkctrl.read(EXPORTCLKCTRL::PRESC);
                Ok(Selection::divided(
                    Source::Branch(ClockBranch::Sysclk),
                    presc + 1,
                ))
            }
            ClockBranch::Em01grpaclk => {
                use EM01GRPACLKCTRL::CLKSEL::Value;
                match cmu.em01grpaclkctrl.read_as_enum(EM01GRPACLKCTRL::CLKSEL) {
                    Some(Value::HFRCODPLL) | Some(Value::HFRCODPLLRT) => {
                        Ok(Selection::oscillator(OscillatorId::Hfrcodpll))
                    }
                    Some(Value::HFXO) | Some(Value::HFXORT) => {
                        Ok(Selection::oscillator(OscillatorId::Hfxo))
                    }
                    Some(Value::HFRCOEM23) => Ok(Selection::oscillator(OscillatorId::Hfrcoem23)),
                    Some(Value::FSRCO) => Ok(Selection::oscillator(OscillatorId::Fsrco)),
                    None => reserved,
                }
            }
            ClockBranch::Em01grpcclk => {
                use EM01GRPCCLKCTRL::CLKSEL::Value;
                match cmu.em01grpcclkctrl.read_as_enum(EM01GRPCCLKCTRL::CLKSEL) {
                    Some(Value::HFRCODPLL) | Some(Value::HFRCODPLLRT) => {
                        Ok(Selection::oscillator(OscillatorId::Hfrcodpll))
                    }
                    Some(Value::HFXO) | Some(Value::HFXORT) => {
                        Ok(Selection::oscillator(OscillatorId::Hfxo))
                    }
                    Some(Value::HFRCOEM23) => Ok(Selection::oscillator(OscillatorId::Hfrcoem23)),
                    Some(Value::FSRCO) => Ok(Selection::oscillator(OscillatorId::Fsrco)),
                    None => reserved,
                }
            }
            ClockBranch::Em01grpdclk => {
                use EM01GRPDCLKCTRL::CLKSEL::Value;
                match cmu.em01grpdclkctrl.read_as_enum(EM01GRPDCLKCTRL::CLKSEL) {
                    Some(Value::HFRCODPLL) => Ok(Selection::oscillator(OscillatorId::Hfrcodpll)),
                    Some(Value::HFXO) => Ok(Selection::oscillator(OscillatorId::Hfxo)),
                    Some(Value::HFRCOEM23) => Ok(Selection::oscillator(OscillatorId::Hfrcoem23)),
                    Some(Value::FSRCO) => Ok(Selection::oscillator(OscillatorId::Fsrco)),
                    None => reserved,
                }
            }
            ClockBranch::Em23grpaclk => {
                use EM23GRPACLKCTRL::CLKSEL::Value;
                match cmu.em23grpaclkctrl.read_as_enum(EM23GRPACLKCTRL::CLKSEL) {
                    Some(Value::LFRCO) => Ok(Selection::oscillator(OscillatorId::Lfrco)),
                    Some(Value::LFXO) => Ok(Selection::oscillator(OscillatorId::Lfxo)),
                    Some(Value::ULFRCO) => Ok(Selection::oscillator(OscillatorId::Ulfrco)),
                    None => reserved,
                }
            }
            ClockBranch::Em4grpaclk => {
                use EM4GRPACLKCTRL::CLKSEL::Value;
                match cmu.em4grpaclkctrl.read_as_enum(EM4GRPACLKCTRL::CLKSEL) {
                    Some(Value::LFRCO) => Ok(Selection::oscillator(OscillatorId::Lfrco)),
                    Some(Value::LFXO) => Ok(Selection::oscillator(OscillatorId::Lfxo)),
                    Some(Value::ULFRCO) => Ok(Selection::oscillator(OscillatorId::Ulfrco)),
                    None => reserved,
                }
            }
            ClockBranch::Sysrtcclk => {
                use SYSRTC0CLKCTRL::CLKSEL::Value;
                match cmu.sysrtc0clkctrl.read_as_enum(SYSRTC0CLKCTRL::CLKSEL) {
                    Some(Value::LFRCO) => Ok(Selection::oscillator(OscillatorId::Lfrco)),
                    Some(Value::LFXO) => Ok(Selection::oscillator(OscillatorId::Lfxo)),
                    Some(Value::ULFRCO) => Ok(Selection::oscillator(OscillatorId::Ulfrco)),
                    None => reserved,
                }
            }
            ClockBranch::Wdog0clk => {
                use WDOG0CLKCTRL::CLKSEL::Value;
                match cmu.wdog0clkctrl.read_as_enum(WDOG0CLKCTRL::CLKSEL) {
                    Some(Value::LFRCO) => Ok(Selection::oscillator(OscillatorId::Lfrco)),
                    Some(Value::LFXO) => Ok(Selection::oscillator(OscillatorId::Lfxo)),
                    Some(Value::ULFRCO) => Ok(Selection::oscillator(OscillatorId::Ulfrco)),
                    Some(Value::HCLKDIV1024) => Ok(Selection::divided(
                        Source::Branch(ClockBranch::Hclk),
                        1024,
                    )),
                    None => reserved,
                }
            }
            ClockBranch::Wdog1clk => Ok(Selection::divided(
                Source::Branch(ClockBranch::Hclk),
                1024,
            )),
            ClockBranch::Eusart0clk => {
                use EUSART0CLKCTRL::CLKSEL::Value;
                match cmu.eusart0clkctrl.read_as_enum(EUSART0CLKCTRL::CLKSEL) {
                    Some(Value::EM01GRPCCLK) => Ok(Selection::branch(ClockBranch::Em01grpcclk)),
                    Some(Value::HFRCOEM23) => Ok(Selection::oscillator(OscillatorId::Hfrcoem23)),
                    Some(Value::LFRCO) => Ok(Selection::oscillator(OscillatorId::Lfrco)),
                    Some(Value::LFXO) => Ok(Selection::oscillator(OscillatorId::Lfxo)),
                    None => reserved,
                }
            }
            ClockBranch::I2c0clk => {
                use I2C0CLKCTRL::CLKSEL::Value;
                match cmu.i2c0clkctrl.read_as_enum(I2C0CLKCTRL::CLKSEL) {
                    Some(Value::EM01GRPDCLK) => Ok(Selection::branch(ClockBranch::Em01grpdclk)),
                    Some(Value::HFRCOEM23) => Ok(Selection::oscillator(OscillatorId::Hfrcoem23)),
                    Some(Value::LFRCO) => Ok(Selection::oscillator(OscillatorId::Lfrco)),
                    Some(Value::LFXO) => Ok(Selection::oscillator(OscillatorId::Lfxo)),
                    None => reserved,
                }
            }
            ClockBranch::Pcnt0clk => {
                use PCNT0CLKCTRL::CLKSEL::Value;
                match cmu.pcnt0clkctrl.read_as_enum(PCNT0CLKCTRL::CLKSEL) {
                    Some(Value::EM23GRPACLK) => Ok(Selection::branch(ClockBranch::Em23grpaclk)),
                    Some(Value::PCNTS0) => Err(ClockError::NotSupported),
                    None => reserved,
                }
            }
            ClockBranch::Adcclk => {
                use ADCCLKCTRL::CLKSEL::Value;
                match cmu.adcclkctrl.read_as_enum(ADCCLKCTRL::CLKSEL) {
                    Some(Value::EM01GRPACLK) => Ok(Selection::branch(ClockBranch::Em01grpaclk)),
                    Some(Value::FSRCO) => Ok(Selection::oscillator(OscillatorId::Fsrco)),
                    Some(Value::HFRCOEM23) => Ok(Selection::oscillator(OscillatorId::Hfrcoem23)),
                    None => reserved,
                }
            }
            ClockBranch::Pixelrzclk => {
                use PIXELRZCLKCTRL::CLKSEL::Value;
                let ctrl = cmu.pixelrzclkctrl.extract();
                let oscillator = match ctrl.read_as_enum(PIXELRZCLKCTRL::CLKSEL) {
                    Some(Value::HFRCODPLL) => OscillatorId::Hfrcodpll,
                    Some(Value::HFXO) => OscillatorId::Hfxo,
                    Some(Value::FSRCO) => OscillatorId::Fsrco,
                    Some(Value::HFRCOEM23) => OscillatorId::Hfrcoem23,
                    None => return reserved,
                };
                Ok(Selection::divided(
                    Source::Oscillator(oscillator),
                    ctrl.read(PIXELRZCLKCTRL::PRESC) + 1,
                ))
            }
            ClockBranch::Systickclk => {
                if self.hw.systick().csr.is_set(CSR::CLKSOURCE) {
                    Ok(Selection::branch(ClockBranch::Hclk))
                } else {
                    Ok(Selection::branch(ClockBranch::Em23grpaclk))
                }
            }
            ClockBranch::Dpllrefclk => {
                use DPLLREFCLKCTRL::CLKSEL::Value;
                match cmu.dpllrefclkctrl.read_as_enum(DPLLREFCLKCTRL::CLKSEL) {
                    Some(Value::HFXO) => Ok(Selection::oscillator(OscillatorId::Hfxo)),
                    Some(Value::LFXO) => Ok(Selection::oscillator(OscillatorId::Lfxo)),
                    Some(Value::CLKIN0) => Ok(Selection::oscillator(OscillatorId::Clkin0)),
                    Some(Value::DISABLED) | None => reserved,
                }
            }
            ClockBranch::Qspisysclk => {
                use QSPISYSCLKCTRL::CLKSEL::Value;
                let ctrl = cmu.qspisysclkctrl.extract();
                let oscillator = match ctrl.read_as_enum(QSPISYSCLKCTRL::CLKSEL) {
                    Some(Value::HFRCODPLL) => OscillatorId::Hfrcodpll,
                    Some(Value::HFXO) => OscillatorId::Hfxo,
                    Some(Value::SOCPLL) => OscillatorId::Socpll0,
                    None => return reserved,
                };
                Ok(Selection::divided(
                    Source::Oscillator(oscillator),
                    ctrl.read(QSPISYSCLKCTRL::PRESC) + 1,
                ))
            }
            ClockBranch::Flpllrefclk => {
                use FLPLLREFCLKCTRL::CLKSEL::Value;
                let ctrl = cmu.flpllrefclkctrl.extract();
                let oscillator = match ctrl.read_as_enum(FLPLLREFCLKCTRL::CLKSEL) {
                    Some(Value::HFRCODPLLRT) => OscillatorId::Hfrcodpll,
                    Some(Value::CLKIN0) => OscillatorId::Clkin0,
                    None => return reserved,
                };
                Ok(Selection::divided(
                    Source::Oscillator(oscillator),
                    ctrl.read(FLPLLREFCLKCTRL::PRESC) + 1,
                ))
            }
        }
    }

    /// Program every branch multiplexer and divider from `config`. Branches the running part
    /// lacks are skipped.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): the SYSCLK source or the PIXELRZ divider is
    ///   invalid for the running part
    pub fn assign(&self, config: &BranchConfig) -> Result<(), ClockError> {
        let capabilities = self.hw.capabilities();
        let cmu = self.hw.cmu();
        if !(1..=4).contains(&config.pixelrzclk_divider) {
            return Err(ClockError::InvalidParameter);
        }

        Cmu::new(self.hw).set_sysclk_source(config.sysclk)?;
        self.hw.atomic(|| {
            cmu.sysclkctrl.modify(
                SYSCLKCTRL::HCLKPRESC.val(config.hclk_divider as u32)
                    + SYSCLKCTRL::PCLKPRESC.val(config.pclk_divider as u32),
            );
            cmu.traceclkctrl.modify(
                TRACECLKCTRL::CLKSEL.val(config.traceclk as u32)
                    + TRACECLKCTRL::PRESC.val(config.traceclk_divider as u32),
            );
            cmu.em01grpaclkctrl
                .modify(EM01GRPACLKCTRL::CLKSEL.val(config.em01grpaclk as u32));
            cmu.em01grpcclkctrl
                .modify(EM01GRPCCLKCTRL::CLKSEL.val(config.em01grpcclk as u32));
            cmu.em01grpdclkctrl
                .modify(EM01GRPDCLKCTRL::CLKSEL.val(config.em01grpdclk as u32));
            cmu.em23grpaclkctrl
                .modify(EM23GRPACLKCTRL::CLKSEL.val(config.em23grpaclk as u32));
            cmu.em4grpaclkctrl
                .modify(EM4GRPACLKCTRL::CLKSEL.val(config.em4grpaclk as u32));
            cmu.adcclkctrl
                .modify(ADCCLKCTRL::CLKSEL.val(config.adcclk as u32));
            if capabilities.has_pixelrz {
                cmu.pixelrzclkctrl.modify(
                    PIXELRZCLKCTRL::CLKSEL.val(config.pixelrzclk as u32)
                        + PIXELRZCLKCTRL::PRESC.val(config.pixelrzclk_divider - 1),
                );
            }
            cmu.sysrtc0clkctrl
                .modify(SYSRTC0CLKCTRL::CLKSEL.val(config.sysrtcclk as u32));
            cmu.wdog0clkctrl
                .modify(WDOG0CLKCTRL::CLKSEL.val(config.wdog0clk as u32));
            cmu.pcnt0clkctrl
                .modify(PCNT0CLKCTRL::CLKSEL.val(config.pcnt0clk as u32));
            cmu.eusart0clkctrl
                .modify(EUSART0CLKCTRL::CLKSEL.val(config.eusart0clk as u32));
            cmu.i2c0clkctrl
                .modify(I2C0CLKCTRL::CLKSEL.val(config.i2c0clk as u32));
        });

        self.assign_systick(config.systickclk)?;
        debug!("clock branches assigned");
        Ok(())
    }

    fn assign_systick(&self, source: SystickSource) -> Result<(), ClockError> {
        Cmu::new(self.hw).enable_bus_clock(BusClock::Syscfg)?;
        let syscfg = self.hw.syscfg();
        let csr = self.hw.systick().csr;

        // CSR lives in the private peripheral bus and has no set/clear aliases.
        self.hw.atomic(|| match source {
            SystickSource::Em23grpaclk => {
                syscfg.cfgsystic.set_bits(CFGSYSTIC::SYSTICEXTCLKEN::SET);
                csr.modify(CSR::CLKSOURCE::CLEAR);
            }
            SystickSource::Hclk => {
                syscfg.cfgsystic.clear_bits(CFGSYSTIC::SYSTICEXTCLKEN::SET);
                csr.modify(CSR::CLKSOURCE::SET);
            }
        });
        Ok(())
    }
}
