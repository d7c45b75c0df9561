// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2022.

//! Interrupt masking around read-modify-write sequences.
//!
//! Mux selects, dividers and oscillator enable bits are shared between bring-up, runtime
//! calibration and the branch resolver. Every sequence that rewrites one of them holds a
//! [CriticalSection] for its whole duration so no other caller observes a half-written tree.

/// Global interrupt mask of the running core.
pub trait InterruptMask {
    /// Mask interrupts. Returns `true` if they were enabled before the call.
    fn disable(&self) -> bool;

    /// Undo a previous [InterruptMask::disable].
    fn restore(&self, was_enabled: bool);
}

/// RAII guard: interrupts stay masked until the guard is dropped.
///
/// Guards nest. Only the outermost one re-enables interrupts.
#[must_use]
pub struct CriticalSection<'a> {
    mask: &'a dyn InterruptMask,
    was_enabled: bool,
}

impl<'a> CriticalSection<'a> {
    pub fn enter(mask: &'a dyn InterruptMask) -> Self {
        let was_enabled = mask.disable();
        Self { mask, was_enabled }
    }
}

impl Drop for CriticalSection<'_> {
    fn drop(&mut self) {
        self.mask.restore(self.was_enabled);
    }
}

/// Run `f` with interrupts masked.
pub fn atomic<F, R>(mask: &dyn InterruptMask, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = CriticalSection::enter(mask);
    f()
}

/// PRIMASK based interrupt mask for Cortex-M cores.
#[cfg(all(target_arch = "arm", target_os = "none"))]
pub struct CortexMInterrupts;

#[cfg(all(target_arch = "arm", target_os = "none"))]
impl InterruptMask for CortexMInterrupts {
    fn disable(&self) -> bool {
        let was_enabled = cortex_m::register::primask::read().is_active();
        cortex_m::interrupt::disable();
        // `interrupt::disable` does not order memory accesses on its own.
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
        was_enabled
    }

    fn restore(&self, was_enabled: bool) {
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
        if was_enabled {
            // SAFETY: interrupts were enabled when the matching `disable` ran, so re-enabling them
            // cannot break an enclosing critical section.
            unsafe { cortex_m::interrupt::enable() };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingMask;

    #[test]
    fn nested_guards_restore_outermost_state() {
        let mask = CountingMask::new();
        {
            let _outer = CriticalSection::enter(&mask);
            assert!(mask.is_masked());
            {
                let _inner = CriticalSection::enter(&mask);
                assert_eq!(mask.depth(), 2);
            }
            assert!(mask.is_masked());
        }
        assert!(!mask.is_masked());
        assert_eq!(mask.entries(), 2);
    }

    #[test]
    fn atomic_returns_closure_value() {
        let mask = CountingMask::new();
        let value = atomic(&mask, || {
            assert!(mask.is_masked());
            42
        });
        assert_eq!(value, 42);
        assert!(!mask.is_masked());
    }
}
