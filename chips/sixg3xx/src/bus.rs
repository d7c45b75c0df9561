// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Register access used by every clock driver.
//!
//! Drivers never dereference peripheral addresses directly. They go through a [RegisterBus],
//! which is [MmioBus] on silicon and a simulated register file in unit tests. On top of the bus,
//! [Register] gives the same typed field API as `tock-registers` (`read`, `is_set`, `modify`,
//! `write`, `matches_all`) so driver code reads like any other register driver:
//!
//! ```rust,ignore
//! let status = Register::<STATUS::Register>::new(bus, HFXO0_BASE + 0x58);
//! if status.matches_all(STATUS::RDY::SET + STATUS::COREBIASOPTRDY::SET) {
//!     /* Do something */
//! }
//! ```

use core::marker::PhantomData;

use tock_registers::fields::{Field, FieldValue, TryFromValue};
use tock_registers::{LocalRegisterCopy, RegisterLongName};

/// Offset of the bit-set alias of every peripheral register
pub const SET_ALIAS_OFFSET: usize = 0x1000;
/// Offset of the bit-clear alias of every peripheral register
pub const CLR_ALIAS_OFFSET: usize = 0x2000;

/// 32-bit register access.
///
/// `set_bits` and `clear_bits` must behave as a single write from the point of view of the
/// hardware. The default implementations are read-modify-write and are only correct when the
/// caller holds a critical section; [MmioBus] overrides them with the SET/CLR aliases.
pub trait RegisterBus {
    fn read(&self, address: usize) -> u32;

    fn write(&self, address: usize, value: u32);

    fn set_bits(&self, address: usize, mask: u32) {
        self.write(address, self.read(address) | mask);
    }

    fn clear_bits(&self, address: usize, mask: u32) {
        self.write(address, self.read(address) & !mask);
    }
}

/// Memory-mapped register bus.
pub struct MmioBus {
    _private: (),
}

impl MmioBus {
    /// Create the bus.
    ///
    /// # Safety
    ///
    /// Every address later passed to the bus must be a valid, 4-byte aligned peripheral register
    /// of the running part, together with its SET/CLR aliases.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for MmioBus {
    fn read(&self, address: usize) -> u32 {
        // SAFETY: `MmioBus::new` requires every address to be a valid peripheral register.
        unsafe { core::ptr::read_volatile(address as *const u32) }
    }

    fn write(&self, address: usize, value: u32) {
        // SAFETY: `MmioBus::new` requires every address to be a valid peripheral register.
        unsafe { core::ptr::write_volatile(address as *mut u32, value) }
    }

    fn set_bits(&self, address: usize, mask: u32) {
        self.write(address + SET_ALIAS_OFFSET, mask);
    }

    fn clear_bits(&self, address: usize, mask: u32) {
        self.write(address + CLR_ALIAS_OFFSET, mask);
    }
}

/// A typed 32-bit register reached through a [RegisterBus].
pub struct Register<'a, R: RegisterLongName> {
    bus: &'a dyn RegisterBus,
    address: usize,
    associated_register: PhantomData<R>,
}

impl<'a, R: RegisterLongName> Register<'a, R> {
    pub fn new(bus: &'a dyn RegisterBus, address: usize) -> Self {
        Self {
            bus,
            address,
            associated_register: PhantomData,
        }
    }

    pub fn address(&self) -> usize {
        self.address
    }

    /// Raw value of the register
    pub fn get(&self) -> u32 {
        self.bus.read(self.address)
    }

    /// Overwrite the register with a raw value
    pub fn set(&self, value: u32) {
        self.bus.write(self.address, value);
    }

    /// Snapshot the register so several fields can be decoded from a single read
    pub fn extract(&self) -> LocalRegisterCopy<u32, R> {
        LocalRegisterCopy::new(self.get())
    }

    pub fn read(&self, field: Field<u32, R>) -> u32 {
        field.read(self.get())
    }

    pub fn is_set(&self, field: Field<u32, R>) -> bool {
        field.is_set(self.get())
    }

    pub fn read_as_enum<E: TryFromValue<u32, EnumType = E>>(
        &self,
        field: Field<u32, R>,
    ) -> Option<E> {
        field.read_as_enum(self.get())
    }

    pub fn matches_all(&self, value: FieldValue<u32, R>) -> bool {
        value.matches_all(self.get())
    }

    /// Write the given fields, zeroing every other bit
    pub fn write(&self, value: FieldValue<u32, R>) {
        self.set(value.value);
    }

    /// Read-modify-write of the given fields, keeping every other bit
    pub fn modify(&self, value: FieldValue<u32, R>) {
        self.set(value.modify(self.get()));
    }

    /// Set the bits of `value` in one bus write
    pub fn set_bits(&self, value: FieldValue<u32, R>) {
        self.bus.set_bits(self.address, value.value);
    }

    /// Clear every bit covered by the mask of `value` in one bus write
    pub fn clear_bits(&self, value: FieldValue<u32, R>) {
        self.bus.clear_bits(self.address, value.mask());
    }
}
