// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Clock management unit: bus clock gates and the SYSCLK multiplexer.

use log::debug;
use tock_registers::fields::FieldValue;

use crate::clocks::oscillator::OscillatorId;
use crate::error::ClockError;
use crate::hardware::Hardware;
use crate::registers::cmu::{CLKEN0, CLKEN1, SYSCLKCTRL};

/// Bus clock gate of a peripheral register interface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusClock {
    Ldma,
    Gpcrc0,
    Timer0,
    Iadc0,
    Wdog0,
    I2c0,
    Syscfg,
    Dpll0,
    Hfrco0,
    Hfrcoem23,
    Hfxo0,
    Fsrco,
    Lfrco,
    Lfxo,
    Ulfrco,
    Eusart0,
    Pcnt0,
    Sysrtc0,
    Wdog1,
    Socpll0,
    Qspi0,
    Pixelrz0,
}

enum Gate {
    Clken0(FieldValue<u32, CLKEN0::Register>),
    Clken1(FieldValue<u32, CLKEN1::Register>),
}

impl BusClock {
    fn gate(self) -> Gate {
        match self {
            BusClock::Ldma => Gate::Clken0(CLKEN0::LDMA::SET),
            BusClock::Gpcrc0 => Gate::Clken0(CLKEN0::GPCRC0::SET),
            BusClock::Timer0 => Gate::Clken0(CLKEN0::TIMER0::SET),
            BusClock::Iadc0 => Gate::Clken0(CLKEN0::IADC0::SET),
            BusClock::Wdog0 => Gate::Clken0(CLKEN0::WDOG0::SET),
            BusClock::I2c0 => Gate::Clken0(CLKEN0::I2C0::SET),
            BusClock::Syscfg => Gate::Clken0(CLKEN0::SYSCFG::SET),
            BusClock::Dpll0 => Gate::Clken0(CLKEN0::DPLL0::SET),
            BusClock::Hfrco0 => Gate::Clken0(CLKEN0::HFRCO0::SET),
            BusClock::Hfrcoem23 => Gate::Clken0(CLKEN0::HFRCOEM23::SET),
            BusClock::Hfxo0 => Gate::Clken0(CLKEN0::HFXO0::SET),
            BusClock::Fsrco => Gate::Clken0(CLKEN0::FSRCO::SET),
            BusClock::Lfrco => Gate::Clken0(CLKEN0::LFRCO::SET),
            BusClock::Lfxo => Gate::Clken0(CLKEN0::LFXO::SET),
            BusClock::Ulfrco => Gate::Clken0(CLKEN0::ULFRCO::SET),
            BusClock::Eusart0 => Gate::Clken0(CLKEN0::EUSART0::SET),
            BusClock::Pcnt0 => Gate::Clken0(CLKEN0::PCNT0::SET),
            BusClock::Sysrtc0 => Gate::Clken1(CLKEN1::SYSRTC0::SET),
            BusClock::Wdog1 => Gate::Clken1(CLKEN1::WDOG1::SET),
            BusClock::Socpll0 => Gate::Clken1(CLKEN1::SOCPLL0::SET),
            BusClock::Qspi0 => Gate::Clken1(CLKEN1::QSPI0::SET),
            BusClock::Pixelrz0 => Gate::Clken1(CLKEN1::PIXELRZ0::SET),
        }
    }
}

pub struct Cmu<'a> {
    hw: Hardware<'a>,
}

impl<'a> Cmu<'a> {
    pub fn new(hw: Hardware<'a>) -> Self {
        Self { hw }
    }

    fn is_present(&self, clock: BusClock) -> bool {
        let capabilities = self.hw.capabilities();
        match clock {
            BusClock::Socpll0 => capabilities.has_socpll,
            BusClock::Qspi0 => capabilities.has_flpll,
            BusClock::Pixelrz0 => capabilities.has_pixelrz,
            _ => true,
        }
    }

    fn set_bus_clock(&self, clock: BusClock, enable: bool) -> Result<(), ClockError> {
        if !self.is_present(clock) {
            return Err(ClockError::NotAvailable);
        }

        let cmu = self.hw.cmu();
        match (clock.gate(), enable) {
            (Gate::Clken0(bit), true) => cmu.clken0.set_bits(bit),
            (Gate::Clken0(bit), false) => cmu.clken0.clear_bits(bit),
            (Gate::Clken1(bit), true) => cmu.clken1.set_bits(bit),
            (Gate::Clken1(bit), false) => cmu.clken1.clear_bits(bit),
        }
        Ok(())
    }

    /// Open the bus clock gate of a peripheral.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotAvailable]\): the peripheral is absent on the running part
    pub fn enable_bus_clock(&self, clock: BusClock) -> Result<(), ClockError> {
        self.set_bus_clock(clock, true)
    }

    /// Close the bus clock gate of a peripheral.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::NotAvailable]\): the peripheral is absent on the running part
    pub fn disable_bus_clock(&self, clock: BusClock) -> Result<(), ClockError> {
        self.set_bus_clock(clock, false)
    }

    pub fn is_enabled_bus_clock(&self, clock: BusClock) -> bool {
        let cmu = self.hw.cmu();
        match clock.gate() {
            Gate::Clken0(bit) => cmu.clken0.matches_all(bit),
            Gate::Clken1(bit) => cmu.clken1.matches_all(bit),
        }
    }

    /// Route SYSCLK to `source`. The source must already be running.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidParameter]\): `source` cannot drive SYSCLK on the running
    ///   part
    pub fn set_sysclk_source(&self, source: OscillatorId) -> Result<(), ClockError> {
        let select = match source {
            OscillatorId::Fsrco => SYSCLKCTRL::CLKSEL::FSRCO,
            OscillatorId::Hfrcodpll => SYSCLKCTRL::CLKSEL::HFRCODPLL,
            OscillatorId::Hfxo => SYSCLKCTRL::CLKSEL::HFXO,
            OscillatorId::Clkin0 => SYSCLKCTRL::CLKSEL::CLKIN0,
            OscillatorId::Socpll0 if self.hw.capabilities().has_socpll => {
                SYSCLKCTRL::CLKSEL::SOCPLL
            }
            _ => return Err(ClockError::InvalidParameter),
        };

        self.hw
            .atomic(|| self.hw.cmu().sysclkctrl.modify(select));
        debug!("SYSCLK source: {:?}", source);
        Ok(())
    }

    /// Current SYSCLK source.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::InvalidState]\): the multiplexer holds a reserved encoding
    pub fn get_sysclk_source(&self) -> Result<OscillatorId, ClockError> {
        use SYSCLKCTRL::CLKSEL::Value;

        self.hw.atomic(|| {
            match self.hw.cmu().sysclkctrl.read_as_enum(SYSCLKCTRL::CLKSEL) {
                Some(Value::FSRCO) => Ok(OscillatorId::Fsrco),
                Some(Value::HFRCODPLL) => Ok(OscillatorId::Hfrcodpll),
                Some(Value::HFXO) => Ok(OscillatorId::Hfxo),
                Some(Value::CLKIN0) => Ok(OscillatorId::Clkin0),
                Some(Value::SOCPLL) if self.hw.capabilities().has_socpll => {
                    Ok(OscillatorId::Socpll0)
                }
                _ => Err(ClockError::InvalidState),
            }
        })
    }
}
