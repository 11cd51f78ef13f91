/*
 * Tick Counter
 *
 * Counts timer interrupts since boot. The only writer is the timer interrupt
 * handler (`advance`); readers in task context mask interrupts around the
 * read so they never observe a half-written 64-bit value, the same way the
 * rest of the kernel protects state it shares with an interrupt handler.
 *
 * The counter starts at zero and increases by exactly one per interrupt.
 */

use crate::arch::InterruptControl;
use crate::types::Ticks;

/// Monotonic tick counter
#[derive(Debug, Default)]
pub struct TickCounter {
    ticks: Ticks,
}

impl TickCounter {
    pub const fn new() -> Self {
        Self { ticks: 0 }
    }

    /// Current tick count, read with interrupts masked.
    pub fn now<I: InterruptControl>(&self, intr: &I) -> Ticks {
        intr.without_interrupts(|| self.ticks)
    }

    /// Ticks elapsed since `since`, which must be a value once returned by
    /// `now`.
    pub fn elapsed<I: InterruptControl>(&self, intr: &I, since: Ticks) -> Ticks {
        let now = self.now(intr);
        assert!(since <= now, "elapsed: tick {} is in the future (now {})", since, now);
        now - since
    }

    /// Count one timer interrupt. Only the interrupt handler calls this.
    pub(crate) fn advance(&mut self) -> Ticks {
        self.ticks += 1;
        self.ticks
    }

    /// Unmasked read for code already running with interrupts off.
    pub(crate) fn get(&self) -> Ticks {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mock::MockInterrupts;

    #[test]
    fn test_starts_at_zero_and_advances_by_one() {
        let intr = MockInterrupts::new();
        let mut clock = TickCounter::new();
        assert_eq!(clock.now(&intr), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.now(&intr), 2);
    }

    #[test]
    fn test_read_masks_interrupts() {
        let intr = MockInterrupts::new();
        let clock = TickCounter::new();
        clock.now(&intr);
        assert_eq!(intr.disable_count(), 1);
        assert!(intr.are_enabled());
    }

    #[test]
    fn test_elapsed() {
        let intr = MockInterrupts::new();
        let mut clock = TickCounter::new();
        clock.advance();
        let start = clock.now(&intr);
        for _ in 0..7 {
            clock.advance();
        }
        assert_eq!(clock.elapsed(&intr, start), 7);
        assert_eq!(clock.elapsed(&intr, clock.now(&intr)), 0);
    }

    #[test]
    #[should_panic(expected = "in the future")]
    fn test_elapsed_rejects_future_tick() {
        let intr = MockInterrupts::new();
        let clock = TickCounter::new();
        clock.elapsed(&intr, 5);
    }
}
