/*
 * Timer Manager
 *
 * This module provides the TimerManager ZST which owns the kernel's single
 * `TimerCore` instance and exposes it to the rest of the kernel:
 *
 * - the IRQ0 handler calls `TimerManager::on_timer_interrupt`
 * - threads call `sleep_ticks` / `msleep` / `usleep` / `nsleep`
 * - anyone can read `ticks` and `elapsed`
 *
 * ## Locking discipline
 *
 * The instance sits behind a spin lock, and every task-context access
 * disables interrupts *before* taking the lock. The timer interrupt is the
 * only other user, so it can never find the lock held: whoever holds it has
 * interrupts off. A sleeping thread releases the lock before it blocks, with
 * interrupts still off, so the next thread and the next tick both find it
 * free.
 */

use core::sync::atomic::{AtomicBool, Ordering};

use spin::Mutex;

use crate::arch::x86_64::delay::{self, CalibratedDelay};
use crate::arch::x86_64::interrupts::{self, HardwareInterrupts};
use crate::arch::{BusyWait, InterruptControl};
use crate::config::TimerConfig;
use crate::error::TimerError;
use crate::events::TickReport;
use crate::timer::{duration_to_ticks, TimerCore, TimerStats};
use crate::traits::{IrqThreadOps, ThreadOps};
use crate::types::Ticks;

/// The kernel's timer state
static TIMER: Mutex<Option<TimerCore>> = Mutex::new(None);

/// Set once `init` has stored the instance
static TIMER_READY: AtomicBool = AtomicBool::new(false);

/// Run `f` on the timer instance with interrupts disabled
///
/// Fails with `NotInitialized` before `init` without touching the interrupt
/// flag.
fn with_timer<F, R>(f: F) -> Result<R, TimerError>
where
    F: FnOnce(&mut TimerCore) -> R,
{
    if !TIMER_READY.load(Ordering::SeqCst) {
        return Err(TimerError::NotInitialized);
    }
    HardwareInterrupts.without_interrupts(|| {
        let mut guard = TIMER.lock();
        guard.as_mut().map(f).ok_or(TimerError::NotInitialized)
    })
}

/// Timer control and time services
///
/// TimerManager is a Zero-Sized Type (ZST) that groups the timer operations
/// under one namespace. All methods access the global instance.
///
/// # Examples
///
/// ```ignore
/// // Boot: select MLFQS at the default frequency
/// TimerManager::init(TimerConfig::mlfqs())?;
///
/// // IRQ0 handler
/// TimerManager::on_timer_interrupt(&mut thread_table);
///
/// // Sleep for 100ms
/// TimerManager::msleep(&mut thread_table, 100)?;
/// ```
pub struct TimerManager;

impl TimerManager {
    /// Create the timer instance
    ///
    /// Must run before the PIT starts firing. The hardware itself (PIT
    /// channel 0, IRQ0 vector) is configured by the kernel's interrupt
    /// setup, not here.
    pub fn init(config: TimerConfig) -> Result<(), TimerError> {
        // Validate even if the caller built the struct by hand
        let config = TimerConfig::new(config.freq, config.policy)?;

        HardwareInterrupts.without_interrupts(|| {
            let mut guard = TIMER.lock();
            if guard.is_some() {
                return Err(TimerError::AlreadyInitialized);
            }
            *guard = Some(TimerCore::new(config));
            Ok(())
        })?;

        TIMER_READY.store(true, Ordering::SeqCst);
        log::info!(
            "Timer initialized: {} Hz, policy {:?}",
            config.freq,
            config.policy
        );
        Ok(())
    }

    /// Check if the timer has been initialized
    pub fn is_initialized() -> bool {
        TIMER_READY.load(Ordering::SeqCst)
    }

    /// Record the busy-wait calibration result used for sub-tick delays
    pub fn set_loops_per_tick(loops: u64) {
        delay::set_loops_per_tick(loops);
    }

    /// Ticks since boot (0 before initialization)
    pub fn ticks() -> Ticks {
        with_timer(|timer| timer.stats().ticks).unwrap_or(0)
    }

    /// Ticks elapsed since `since`, a value once returned by `ticks`
    pub fn elapsed(since: Ticks) -> Result<Ticks, TimerError> {
        with_timer(|timer| timer.elapsed(&HardwareInterrupts, since))
    }

    /// Timer interrupt entry point, called by the IRQ0 handler
    ///
    /// Returns `None` if a tick arrives before `init`.
    pub fn on_timer_interrupt<T>(threads: &mut T) -> Option<TickReport>
    where
        T: IrqThreadOps + ?Sized,
    {
        if !Self::is_initialized() {
            return None;
        }

        interrupts::enter_interrupt();
        let report = TIMER
            .lock()
            .as_mut()
            .map(|timer| timer.on_timer_interrupt(&HardwareInterrupts, threads));
        interrupts::leave_interrupt();

        report
    }

    /// Sleep the current thread for approximately `ticks` timer ticks
    ///
    /// Blocks the thread; it consumes no CPU until the timer interrupt
    /// releases it.
    pub fn sleep_ticks<T>(threads: &mut T, ticks: i64) -> Result<(), TimerError>
    where
        T: ThreadOps + ?Sized,
    {
        if !Self::is_initialized() {
            return Err(TimerError::NotInitialized);
        }

        let intr = HardwareInterrupts;
        assert!(
            !intr.in_interrupt_context(),
            "sleep_ticks called from interrupt context"
        );
        assert!(intr.are_enabled(), "sleep_ticks called with interrupts disabled");

        intr.without_interrupts(|| {
            {
                let mut guard = TIMER.lock();
                let timer = guard.as_mut().ok_or(TimerError::NotInitialized)?;
                timer.enqueue_current(&intr, threads, ticks);
            }
            // Lock released, interrupts still off until we run again
            threads.block_current();
            Ok(())
        })
    }

    /// Sleep for approximately `ms` milliseconds
    pub fn msleep<T: ThreadOps + ?Sized>(threads: &mut T, ms: i64) -> Result<(), TimerError> {
        Self::real_time_sleep(threads, ms, 1000)
    }

    /// Sleep for approximately `us` microseconds
    pub fn usleep<T: ThreadOps + ?Sized>(threads: &mut T, us: i64) -> Result<(), TimerError> {
        Self::real_time_sleep(threads, us, 1000 * 1000)
    }

    /// Sleep for approximately `ns` nanoseconds
    pub fn nsleep<T: ThreadOps + ?Sized>(threads: &mut T, ns: i64) -> Result<(), TimerError> {
        Self::real_time_sleep(threads, ns, 1000 * 1000 * 1000)
    }

    fn real_time_sleep<T>(threads: &mut T, num: i64, denom: i32) -> Result<(), TimerError>
    where
        T: ThreadOps + ?Sized,
    {
        let freq = with_timer(|timer| timer.config().freq)?;
        let ticks = duration_to_ticks(num, denom, freq);
        if ticks > 0 {
            Self::sleep_ticks(threads, ticks)
        } else {
            CalibratedDelay::new(freq).busy_delay(num, denom);
            Ok(())
        }
    }

    /// Snapshot of the timer state
    pub fn stats() -> Result<TimerStats, TimerError> {
        with_timer(|timer| timer.stats())
    }

    /// Log the tick count
    pub fn print_stats() {
        match with_timer(|timer| timer.print_stats(&HardwareInterrupts)) {
            Ok(()) => {}
            Err(err) => log::warn!("print_stats: {}", err),
        }
    }
}
