// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Everything a clock driver needs to reach the silicon.
//!
//! [Hardware] bundles the register bus, the interrupt mask, the capability descriptor of the
//! running part and the busy-wait policy. It is `Copy`, so each driver keeps its own copy.

use crate::bus::RegisterBus;
use crate::chip_specific::ChipCapabilities;
use crate::critical_section::{self, CriticalSection, InterruptMask};
use crate::error::ClockError;
use crate::registers::cmu::CmuRegisters;
use crate::registers::dpll::DpllRegisters;
use crate::registers::hfrco::HfrcoRegisters;
use crate::registers::hfxo::HfxoRegisters;
use crate::registers::lfrco::LfrcoRegisters;
use crate::registers::lfxo::LfxoRegisters;
use crate::registers::socpll::SocpllRegisters;
use crate::registers::syscfg::SyscfgRegisters;
use crate::registers::systick::SysTickRegisters;

/// How long to wait for a hardware status flag.
///
/// The hardware guarantees that every flag polled by this crate eventually flips, so
/// [PollPolicy::Unbounded] is the production setting. [PollPolicy::Bounded] gives up after the
/// given number of unsuccessful polls and reports [ClockError::Timeout]; it is meant for
/// simulation and for boards that would rather fail than hang on a dead crystal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollPolicy {
    #[default]
    Unbounded,
    Bounded(usize),
}

#[derive(Clone, Copy)]
pub struct Hardware<'a> {
    bus: &'a dyn RegisterBus,
    interrupts: &'a dyn InterruptMask,
    capabilities: &'a ChipCapabilities,
    poll: PollPolicy,
}

impl<'a> Hardware<'a> {
    pub fn new(
        bus: &'a dyn RegisterBus,
        interrupts: &'a dyn InterruptMask,
        capabilities: &'a ChipCapabilities,
        poll: PollPolicy,
    ) -> Self {
        Self {
            bus,
            interrupts,
            capabilities,
            poll,
        }
    }

    pub fn capabilities(&self) -> &'a ChipCapabilities {
        self.capabilities
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn cmu(&self) -> CmuRegisters<'a> {
        CmuRegisters::new(self.bus, self.capabilities.addresses.cmu)
    }

    pub fn hfxo(&self) -> HfxoRegisters<'a> {
        HfxoRegisters::new(self.bus, self.capabilities.addresses.hfxo)
    }

    pub fn hfrcodpll(&self) -> HfrcoRegisters<'a> {
        HfrcoRegisters::new(self.bus, self.capabilities.addresses.hfrcodpll)
    }

    pub fn hfrcoem23(&self) -> HfrcoRegisters<'a> {
        HfrcoRegisters::new(self.bus, self.capabilities.addresses.hfrcoem23)
    }

    pub fn dpll(&self) -> DpllRegisters<'a> {
        DpllRegisters::new(self.bus, self.capabilities.addresses.dpll)
    }

    pub fn lfxo(&self) -> LfxoRegisters<'a> {
        LfxoRegisters::new(self.bus, self.capabilities.addresses.lfxo)
    }

    pub fn lfrco(&self) -> LfrcoRegisters<'a> {
        LfrcoRegisters::new(self.bus, self.capabilities.addresses.lfrco)
    }

    pub fn socpll(&self) -> SocpllRegisters<'a> {
        SocpllRegisters::new(self.bus, self.capabilities.addresses.socpll)
    }

    pub fn syscfg(&self) -> SyscfgRegisters<'a> {
        SyscfgRegisters::new(self.bus, self.capabilities.addresses.syscfg)
    }

    pub fn systick(&self) -> SysTickRegisters<'a> {
        SysTickRegisters::new(self.bus, self.capabilities.addresses.systick)
    }

    pub fn critical_section(&self) -> CriticalSection<'a> {
        CriticalSection::enter(self.interrupts)
    }

    /// Run `f` with interrupts masked
    pub fn atomic<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        critical_section::atomic(self.interrupts, f)
    }

    /// Poll `condition` until it holds.
    ///
    /// # Errors
    ///
    /// + [Err]\([ClockError::Timeout]\): the poll policy is bounded and `condition` never held
    pub fn wait_until<F>(&self, mut condition: F) -> Result<(), ClockError>
    where
        F: FnMut() -> bool,
    {
        match self.poll {
            PollPolicy::Unbounded => {
                while !condition() {
                    core::hint::spin_loop();
                }
                Ok(())
            }
            PollPolicy::Bounded(polls) => {
                for _ in 0..polls {
                    if condition() {
                        return Ok(());
                    }
                    core::hint::spin_loop();
                }
                Err(ClockError::Timeout)
            }
        }
    }
}
