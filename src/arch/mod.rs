/*
 * Architecture Abstraction Layer
 *
 * The timer core never touches the CPU directly. Everything it needs from the
 * hardware/interrupt layer is expressed by two small traits:
 *
 * - `InterruptControl`: mask/unmask interrupts, query the interrupt flag,
 *   tell whether we are running inside an interrupt handler, and ask for a
 *   reschedule when the current interrupt returns
 * - `BusyWait`: spin for a sub-tick duration using the calibrated loop count
 *
 * The x86_64 implementations live in `x86_64`. Host tests provide their own
 * implementations so no privileged instruction ever executes outside ring 0.
 *
 * Why this is important:
 * - Masking interrupts is the only synchronization discipline the timer core
 *   uses: the single writer of the tick counter and the sleep queue is the
 *   timer interrupt itself
 * - Keeping the CPU behind a trait lets the whole tick path run under test
 */

#[cfg(target_arch = "x86_64")]
pub mod x86_64;

/// Interrupt control as seen by the timer core.
pub trait InterruptControl {
    /// Whether maskable interrupts are currently enabled.
    fn are_enabled(&self) -> bool;

    /// Enable interrupts.
    fn enable(&self);

    /// Disable interrupts.
    fn disable(&self);

    /// Whether we are executing inside an external interrupt handler.
    fn in_interrupt_context(&self) -> bool;

    /// Request a reschedule when the current interrupt returns.
    fn yield_on_return(&self);

    /// Run `f` with interrupts disabled, restoring the previous state after.
    fn without_interrupts<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
        Self: Sized,
    {
        let _guard = InterruptGuard::new(self);
        f()
    }
}

/// Sub-tick busy waiting.
pub trait BusyWait {
    /// Spin for approximately `num / denom` seconds. `denom` is a multiple
    /// of 1000.
    fn busy_delay(&self, num: i64, denom: i32);
}

/// RAII guard that disables interrupts for its lifetime
///
/// Interrupts are disabled when this guard is created and restored when it's
/// dropped, but only if they were enabled before. Nested guards therefore
/// compose: the innermost guard never re-enables interrupts an outer guard
/// turned off.
///
/// # Example
/// ```ignore
/// let _guard = InterruptGuard::new(&intr);
/// // Critical section - interrupts are disabled
/// // Interrupts restored when _guard is dropped
/// ```
pub struct InterruptGuard<'a, I: InterruptControl> {
    intr: &'a I,
    were_enabled: bool,
}

impl<'a, I: InterruptControl> InterruptGuard<'a, I> {
    /// Create a new interrupt guard, disabling interrupts
    pub fn new(intr: &'a I) -> Self {
        let were_enabled = intr.are_enabled();
        if were_enabled {
            intr.disable();
        }
        Self { intr, were_enabled }
    }
}

impl<I: InterruptControl> Drop for InterruptGuard<'_, I> {
    fn drop(&mut self) {
        // Only re-enable if they were enabled before
        if self.were_enabled {
            self.intr.enable();
        }
    }
}

/// Number of busy-wait loop iterations for `num / denom` seconds, given the
/// calibrated `loops_per_tick` and the tick frequency.
///
/// Numerator and denominator are scaled down by 1000 first so the product
/// does not overflow for realistic delays; longer ones saturate.
pub fn delay_loops(loops_per_tick: u64, num: i64, denom: i32, freq: u32) -> i64 {
    assert!(denom % 1000 == 0, "delay denominator {} not a multiple of 1000", denom);
    let loops = i64::try_from(loops_per_tick).unwrap_or(i64::MAX);
    (loops.saturating_mul(num) / 1000).saturating_mul(freq as i64) / (denom / 1000) as i64
}
