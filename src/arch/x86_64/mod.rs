/*
 * x86_64 Architecture Support Module
 *
 * This module contains the x86_64 implementations of the traits the timer
 * core consumes from the hardware layer.
 *
 * Submodules:
 * - interrupts: interrupt flag control, interrupt-context tracking and the
 *   yield-on-return request
 * - delay: calibrated busy-wait loop for sub-tick delays
 */

pub mod delay;
pub mod interrupts;

pub use delay::CalibratedDelay;
pub use interrupts::HardwareInterrupts;
