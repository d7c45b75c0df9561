// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Simulated silicon for unit tests.
//!
//! [FakeChip] is a register file that reacts to the enable, command and lock writes the drivers
//! issue, so the busy-waits of the drivers complete the way they do on hardware. Every register
//! starts at zero.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::vec::Vec;

use crate::bus::RegisterBus;
use crate::chip_specific::{ChipCapabilities, SIXG301};
use crate::critical_section::InterruptMask;
use crate::devinfo::{CalibrationStore, DeviceInfo, ManufacturingTokens, TemperatureGrade};
use crate::error::ClockError;
use crate::se_manager::{FlpllConfig, MailboxError, SecureElementMailbox};

const HFXO_CTRL: usize = 0x028;
const HFXO_CMD: usize = 0x050;
const HFXO_STATUS: usize = 0x058;
const HFXO_IF: usize = 0x070;
const HFXO_LOCK: usize = 0x080;
const HFXO_FORCEEN: u32 = 1 << 16;
const HFXO_RDY: u32 = 1 << 0;
const HFXO_COREBIASOPTRDY: u32 = 1 << 1;
const HFXO_ENS: u32 = 1 << 16;
const HFXO_UNLOCK_KEY: u32 = 0x580E;

const LFXO_CTRL: usize = 0x004;
const LFXO_STATUS: usize = 0x010;
const LFXO_LOCK: usize = 0x024;
const LFXO_UNLOCK_KEY: u32 = 0x1A20;

const LFRCO_CTRL: usize = 0x004;
const LFRCO_STATUS: usize = 0x008;

const SOCPLL_CTRL: usize = 0x004;
const SOCPLL_STATUS: usize = 0x010;

const DPLL_EN: usize = 0x004;
const DPLL_IF: usize = 0x010;

const CMU_STATUS: usize = 0x008;
const CMU_CALCMD: usize = 0x050;

const LOCK_STATUS: u32 = 1 << 31;
/// Polls of a status register before a delayed flag shows up
const SETTLE_POLLS: usize = 2;

struct Pending {
    address: usize,
    bits: u32,
    polls_left: usize,
}

/// Register file of a simulated part
pub struct FakeChip {
    capabilities: &'static ChipCapabilities,
    registers: RefCell<BTreeMap<usize, u32>>,
    writes: RefCell<Vec<(usize, u32)>>,
    pending: RefCell<Vec<Pending>>,
    dpll_lock_fails: Cell<bool>,
}

impl FakeChip {
    pub fn new() -> Self {
        Self::with_capabilities(&SIXG301)
    }

    pub fn with_capabilities(capabilities: &'static ChipCapabilities) -> Self {
        Self {
            capabilities,
            registers: RefCell::new(BTreeMap::new()),
            writes: RefCell::new(Vec::new()),
            pending: RefCell::new(Vec::new()),
            dpll_lock_fails: Cell::new(false),
        }
    }

    /// Every bus write, in order
    pub fn write_log(&self) -> Vec<(usize, u32)> {
        self.writes.borrow().clone()
    }

    /// Values written to one register, in order
    pub fn writes_to(&self, address: usize) -> Vec<u32> {
        self.writes
            .borrow()
            .iter()
            .filter(|(written, _)| *written == address)
            .map(|(_, value)| *value)
            .collect()
    }

    /// Make the next DPLL enable report a lock failure
    pub fn fail_dpll_lock(&self, fail: bool) {
        self.dpll_lock_fails.set(fail);
    }

    fn peek(&self, address: usize) -> u32 {
        self.registers.borrow().get(&address).copied().unwrap_or(0)
    }

    fn poke(&self, address: usize, value: u32) {
        self.registers.borrow_mut().insert(address, value);
    }

    fn update(&self, address: usize, set: u32, clear: u32) {
        let value = (self.peek(address) & !clear) | set;
        self.poke(address, value);
    }

    fn schedule(&self, address: usize, bits: u32) {
        self.pending.borrow_mut().push(Pending {
            address,
            bits,
            polls_left: SETTLE_POLLS,
        });
    }

    fn settle(&self, address: usize) {
        let mut due = 0;
        self.pending.borrow_mut().retain_mut(|pending| {
            if pending.address != address {
                return true;
            }
            pending.polls_left -= 1;
            if pending.polls_left == 0 {
                due |= pending.bits;
                false
            } else {
                true
            }
        });
        if due != 0 {
            self.update(address, due, 0);
        }
    }

    /// Enable bit at `enable` drives the ready flags at `status`
    fn follow_enable(
        &self,
        written: u32,
        enable: u32,
        status: usize,
        ready: u32,
    ) {
        if written & enable != 0 {
            self.update(status, ready, 0);
        } else {
            self.update(status, 0, ready);
        }
    }

    fn react(&self, address: usize, old: u32, new: u32) {
        let addresses = &self.capabilities.addresses;
        let rising = new & !old;

        if address == addresses.hfxo + HFXO_CTRL {
            if rising & HFXO_FORCEEN != 0 {
                self.update(
                    addresses.hfxo + HFXO_STATUS,
                    HFXO_RDY | HFXO_COREBIASOPTRDY | HFXO_ENS,
                    0,
                );
                self.update(addresses.hfxo + HFXO_IF, HFXO_RDY, 0);
            } else if new & HFXO_FORCEEN == 0 {
                self.update(addresses.hfxo + HFXO_STATUS, 0, HFXO_RDY | HFXO_ENS);
            }
        } else if address == addresses.hfxo + HFXO_CMD && new & 1 != 0 {
            self.update(addresses.hfxo + HFXO_STATUS, 0, HFXO_COREBIASOPTRDY);
            self.schedule(addresses.hfxo + HFXO_STATUS, HFXO_COREBIASOPTRDY);
        } else if address == addresses.hfxo + HFXO_LOCK {
            self.follow_lock(new, HFXO_UNLOCK_KEY, addresses.hfxo + HFXO_STATUS);
        } else if address == addresses.lfxo + LFXO_CTRL {
            self.follow_enable(new, 1, addresses.lfxo + LFXO_STATUS, 1 | (1 << 16));
        } else if address == addresses.lfxo + LFXO_LOCK {
            self.follow_lock(new, LFXO_UNLOCK_KEY, addresses.lfxo + LFXO_STATUS);
        } else if address == addresses.lfrco + LFRCO_CTRL {
            self.follow_enable(new, 1, addresses.lfrco + LFRCO_STATUS, 1 | (1 << 16));
        } else if address == addresses.socpll + SOCPLL_CTRL {
            self.follow_enable(
                new,
                1,
                addresses.socpll + SOCPLL_STATUS,
                0b11 | (1 << 16),
            );
        } else if address == addresses.dpll + DPLL_EN && rising & 1 != 0 {
            let flag = if self.dpll_lock_fails.get() { 1 << 1 } else { 1 };
            self.update(addresses.dpll + DPLL_IF, flag, 0);
        } else if address == addresses.cmu + CMU_CALCMD && new & 1 != 0 {
            self.update(addresses.cmu + CMU_STATUS, 0, 1);
            self.schedule(addresses.cmu + CMU_STATUS, 1);
        }
    }

    fn follow_lock(&self, written: u32, key: u32, status: usize) {
        if written == key {
            self.update(status, 0, LOCK_STATUS);
        } else {
            self.update(status, LOCK_STATUS, 0);
        }
    }
}

impl RegisterBus for FakeChip {
    fn read(&self, address: usize) -> u32 {
        self.settle(address);
        self.peek(address)
    }

    fn write(&self, address: usize, value: u32) {
        self.writes.borrow_mut().push((address, value));
        let old = self.peek(address);
        self.poke(address, value);
        self.react(address, old, value);
    }
}

/// Interrupt mask that records how often and how deep it was taken
pub struct CountingMask {
    depth: Cell<usize>,
    entries: Cell<usize>,
}

impl CountingMask {
    pub fn new() -> Self {
        Self {
            depth: Cell::new(0),
            entries: Cell::new(0),
        }
    }

    pub fn is_masked(&self) -> bool {
        self.depth.get() > 0
    }

    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    pub fn entries(&self) -> usize {
        self.entries.get()
    }
}

impl InterruptMask for CountingMask {
    fn disable(&self) -> bool {
        let was_enabled = self.depth.get() == 0;
        self.depth.set(self.depth.get() + 1);
        self.entries.set(self.entries.get() + 1);
        was_enabled
    }

    fn restore(&self, _was_enabled: bool) {
        self.depth.set(self.depth.get() - 1);
    }
}

pub struct FakeDeviceInfo {
    hfxo_ctune: Cell<u32>,
    grade: Cell<Option<TemperatureGrade>>,
    missing_bands: Cell<bool>,
}

impl FakeDeviceInfo {
    pub fn new() -> Self {
        Self {
            hfxo_ctune: Cell::new(0),
            grade: Cell::new(Some(TemperatureGrade::G)),
            missing_bands: Cell::new(false),
        }
    }

    pub fn set_hfxo_ctune(&self, ctune: u32) {
        self.hfxo_ctune.set(ctune);
    }

    pub fn set_grade(&self, grade: Option<TemperatureGrade>) {
        self.grade.set(grade);
    }

    /// Erase every RC band calibration
    pub fn erase_bands(&self) {
        self.missing_bands.set(true);
    }

    /// CAL value of a band: the upper edge in MHz in FREQRANGE, TUNING at mid-scale
    pub fn band_calibration(band_hz: u32) -> u32 {
        ((band_hz / 1_000_000) << 16) | 0x40
    }

    /// Bands are `(lowest, highest)` frequencies served by one CAL word.
    fn band(&self, frequency_hz: u32, bands: &[(u32, u32)]) -> Option<u32> {
        if self.missing_bands.get() {
            return None;
        }
        bands
            .iter()
            .find(|(low, high)| (*low..=*high).contains(&frequency_hz))
            .map(|(_, high)| Self::band_calibration(*high))
    }
}

const fn fixed(band_hz: u32) -> (u32, u32) {
    (band_hz, band_hz)
}

impl DeviceInfo for FakeDeviceInfo {
    fn hfxo_ctune(&self) -> u32 {
        self.hfxo_ctune.get()
    }

    fn hfrcodpll_calibration(&self, frequency_hz: u32) -> Option<u32> {
        self.band(
            frequency_hz,
            &[
                fixed(1_000_000),
                fixed(2_000_000),
                fixed(4_000_000),
                fixed(7_000_000),
                fixed(13_000_000),
                fixed(16_000_000),
                fixed(19_000_000),
                fixed(26_000_000),
                fixed(32_000_000),
                fixed(38_000_000),
                (40_000_000, 48_000_000),
                (48_000_001, 64_000_000),
                (64_000_001, 80_000_000),
                (80_000_001, 100_000_000),
            ],
        )
    }

    fn hfrcoem23_calibration(&self, frequency_hz: u32) -> Option<u32> {
        self.band(
            frequency_hz,
            &[
                fixed(1_000_000),
                fixed(2_000_000),
                fixed(4_000_000),
                fixed(13_000_000),
                fixed(16_000_000),
                fixed(19_000_000),
                fixed(20_000_000),
                fixed(26_000_000),
                fixed(32_000_000),
                fixed(40_000_000),
            ],
        )
    }

    fn flash_temperature_grade(&self) -> Option<TemperatureGrade> {
        self.grade.get()
    }
}

pub struct FakeTokens {
    ctune: Cell<Option<u16>>,
    lfxo_tune: Cell<Option<u8>>,
}

impl FakeTokens {
    pub fn new() -> Self {
        Self {
            ctune: Cell::new(None),
            lfxo_tune: Cell::new(None),
        }
    }

    pub fn set_ctune(&self, ctune: Option<u16>) {
        self.ctune.set(ctune);
    }

    pub fn set_lfxo_tune(&self, tune: Option<u8>) {
        self.lfxo_tune.set(tune);
    }
}

impl ManufacturingTokens for FakeTokens {
    fn mfg_ctune(&self) -> Option<u16> {
        self.ctune.get()
    }

    fn mfg_lfxo_tune(&self) -> Option<u8> {
        self.lfxo_tune.get()
    }
}

/// Command received by [FakeSe]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeCommand {
    Fsrco,
    Flpll(FlpllConfig),
}

pub struct FakeSe {
    version: u32,
    commands: RefCell<Vec<SeCommand>>,
    latched: Cell<Option<FlpllConfig>>,
}

impl FakeSe {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            commands: RefCell::new(Vec::new()),
            latched: Cell::new(None),
        }
    }

    pub fn commands(&self) -> Vec<SeCommand> {
        self.commands.borrow().clone()
    }
}

impl SecureElementMailbox for FakeSe {
    fn firmware_version(&self) -> Result<u32, MailboxError> {
        Ok(self.version)
    }

    fn configure_qspi_clock_flpll(&self, config: &FlpllConfig) -> Result<(), MailboxError> {
        self.commands.borrow_mut().push(SeCommand::Flpll(*config));
        self.latched.set(Some(*config));
        Ok(())
    }

    fn configure_qspi_clock_fsrco(&self) -> Result<(), MailboxError> {
        self.commands.borrow_mut().push(SeCommand::Fsrco);
        Ok(())
    }

    fn flpll_config(&self) -> Result<FlpllConfig, MailboxError> {
        self.latched.get().ok_or(MailboxError(0xE2))
    }
}

/// In-memory CTUNE override store
pub struct FakeStore {
    ctune: Cell<Option<u32>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self {
            ctune: Cell::new(None),
        }
    }
}

impl CalibrationStore for FakeStore {
    fn read_hfxo_ctune(&self) -> Option<u32> {
        self.ctune.get()
    }

    fn write_hfxo_ctune(&self, ctune: u32) -> Result<(), ClockError> {
        self.ctune.set(Some(ctune));
        Ok(())
    }

    fn delete_hfxo_ctune(&self) -> Result<(), ClockError> {
        self.ctune.set(None);
        Ok(())
    }
}
