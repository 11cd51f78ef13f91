/*
 * Interrupt Management Module
 *
 * This module provides the x86_64 implementation of `InterruptControl`. It
 * wraps the x86_64 interrupt flag instructions and keeps two pieces of state
 * the CPU does not track for us:
 *
 * - the interrupt nesting depth, maintained by `enter_interrupt` /
 *   `leave_interrupt` around external interrupt handlers
 * - the pending yield-on-return request, consumed by the interrupt exit path
 *   through `take_yield_request`
 *
 * Why this is important:
 * - Masking interrupts is how the timer core makes the tick counter read and
 *   the sleep-queue insertion atomic against the timer interrupt
 * - Sleeping from inside a handler must be caught, which needs the depth
 * - The context switch happens on interrupt return, outside the timer core
 */

use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ::x86_64::instructions::interrupts;

use crate::arch::InterruptControl;

/// Nesting depth of external interrupt handlers
static INTERRUPT_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Set when a handler asked for a reschedule on return
static YIELD_ON_RETURN: AtomicBool = AtomicBool::new(false);

/// Mark entry into an external interrupt handler
pub fn enter_interrupt() {
    INTERRUPT_DEPTH.fetch_add(1, Ordering::SeqCst);
}

/// Mark exit from an external interrupt handler
pub fn leave_interrupt() {
    let previous = INTERRUPT_DEPTH.fetch_sub(1, Ordering::SeqCst);
    assert!(previous > 0, "leave_interrupt without matching enter_interrupt");
}

/// Consume the pending yield-on-return request
///
/// Called by the interrupt exit path; returns true if the scheduler should
/// switch threads before returning to the interrupted code.
pub fn take_yield_request() -> bool {
    YIELD_ON_RETURN.swap(false, Ordering::SeqCst)
}

/// Interrupt control backed by the CPU's interrupt flag
#[derive(Debug, Default, Copy, Clone)]
pub struct HardwareInterrupts;

impl InterruptControl for HardwareInterrupts {
    /// Check if interrupts are enabled
    fn are_enabled(&self) -> bool {
        interrupts::are_enabled()
    }

    /// Enable interrupts globally
    ///
    /// Should only be called after the IDT has been properly initialized.
    fn enable(&self) {
        interrupts::enable();
    }

    /// Disable interrupts globally
    fn disable(&self) {
        interrupts::disable();
    }

    fn in_interrupt_context(&self) -> bool {
        INTERRUPT_DEPTH.load(Ordering::SeqCst) > 0
    }

    fn yield_on_return(&self) {
        YIELD_ON_RETURN.store(true, Ordering::SeqCst);
    }
}
