// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Secure element mailbox commands used by the clock tree.
//!
//! The external flash PLL sits behind the secure element. The clock engine never touches its
//! registers; it hands a [FlpllConfig] to the mailbox and reads back what the secure element
//! latched.

use crate::error::ClockError;

/// Failure status returned by the secure element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MailboxError(pub u32);

impl From<MailboxError> for ClockError {
    fn from(_: MailboxError) -> Self {
        ClockError::Mailbox
    }
}

/// Reference clock of the FLPLL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum QspiRefClock {
    Hfxo = 0,
    Hfrcodpll = 2,
}

/// Frequency range of the FLPLL VCO, selected on the prescaled output frequency
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum PllClkFreqSel {
    Sclk120Mhz = 0,
    Sclk140Mhz = 1,
    Sclk160Mhz = 2,
    Sclk180Mhz = 3,
    Sclk200Mhz = 4,
    Sclk220Mhz = 5,
}

impl PllClkFreqSel {
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => PllClkFreqSel::Sclk120Mhz,
            1 => PllClkFreqSel::Sclk140Mhz,
            2 => PllClkFreqSel::Sclk160Mhz,
            3 => PllClkFreqSel::Sclk180Mhz,
            4 => PllClkFreqSel::Sclk200Mhz,
            _ => PllClkFreqSel::Sclk220Mhz,
        }
    }
}

/// Output prescaler of the FLPLL
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum ClkPerPresc {
    Div1 = 0,
    Div2 = 1,
    Div3 = 2,
    Div4 = 3,
}

impl ClkPerPresc {
    /// Division ratio
    pub fn divisor(self) -> u32 {
        self as u32 + 1
    }
}

/// FLPLL settings exchanged with the secure element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlpllConfig {
    pub ref_clock: QspiRefClock,
    pub int_div: u8,
    /// 11-bit fractional divider
    pub frac_div: u16,
    pub range: PllClkFreqSel,
    pub presc: ClkPerPresc,
}

/// Mailbox of the secure element.
pub trait SecureElementMailbox {
    /// Firmware version, `0x00MMmmpp`
    fn firmware_version(&self) -> Result<u32, MailboxError>;

    /// Clock the QSPI controller from the FLPLL
    fn configure_qspi_clock_flpll(&self, config: &FlpllConfig) -> Result<(), MailboxError>;

    /// Clock the QSPI controller from FSRCO
    fn configure_qspi_clock_fsrco(&self) -> Result<(), MailboxError>;

    /// FLPLL settings currently latched by the secure element
    fn flpll_config(&self) -> Result<FlpllConfig, MailboxError>;
}
