/*
 * Timer Core
 *
 * `TimerCore` owns all state the timer interrupt maintains: the tick
 * counter, the sleep queue and, when the MLFQS policy is selected, the load
 * average. It is a plain value; the kernel keeps exactly one instance (see
 * `manager`) and passes it by exclusive reference into the interrupt handler
 * and the task-context entry points.
 *
 * ## Interrupt handler
 *
 * `on_timer_interrupt` runs once per tick with interrupts masked:
 *
 * 1. advance the tick counter
 * 2. let the thread subsystem do its own per-tick bookkeeping
 * 3. release every sleeper whose wake tick has been reached
 * 4. MLFQS (if enabled): charge the running thread, update load average and
 *    recent CPU once per second, recompute priorities every 4 ticks
 * 5. request a reschedule on interrupt return
 *
 * It never blocks and never allocates. It only accepts `IrqThreadOps`, so
 * it cannot reach `block_current`.
 *
 * ## Sleeping
 *
 * `sleep_ticks` is the task-context side: with interrupts masked it inserts
 * the current thread into the sleep queue and blocks it. The thread runs
 * again on the first tick at or after its wake tick. A non-positive tick
 * count still sleeps until the next tick boundary.
 *
 * The millisecond/microsecond/nanosecond variants convert to whole ticks,
 * rounding down, and spin instead when the duration is shorter than a tick.
 */

use crate::arch::{BusyWait, InterruptControl};
use crate::clock::TickCounter;
use crate::config::{SchedPolicy, TimerConfig, PRIORITY_RECALC_INTERVAL};
use crate::events::{TickReport, TickWork};
use crate::fixed_point::Fixed;
use crate::mlfqs::{self, Mlfqs};
use crate::sleep_queue::{SleepQueue, Sleeper};
use crate::traits::{IrqThreadOps, ThreadOps};
use crate::types::Ticks;

/// Snapshot of the timer state for diagnostics
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerStats {
    pub ticks: Ticks,
    pub sleeping: usize,
    pub next_wake: Option<Ticks>,
    pub load_avg: Option<Fixed>,
}

/// All state driven by the timer interrupt
#[derive(Debug)]
pub struct TimerCore {
    config: TimerConfig,
    clock: TickCounter,
    sleepers: SleepQueue,
    mlfqs: Option<Mlfqs>,
}

impl TimerCore {
    pub const fn new(config: TimerConfig) -> Self {
        let mlfqs = match config.policy {
            SchedPolicy::Mlfqs => Some(Mlfqs::new()),
            SchedPolicy::RoundRobin => None,
        };
        Self {
            config,
            clock: TickCounter::new(),
            sleepers: SleepQueue::new(),
            mlfqs,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Ticks since boot.
    pub fn now<I: InterruptControl>(&self, intr: &I) -> Ticks {
        self.clock.now(intr)
    }

    /// Ticks elapsed since `since`, a value once returned by `now`.
    pub fn elapsed<I: InterruptControl>(&self, intr: &I, since: Ticks) -> Ticks {
        self.clock.elapsed(intr, since)
    }

    pub fn sleepers(&self) -> &SleepQueue {
        &self.sleepers
    }

    /// Current load average, `None` unless the MLFQS policy is active.
    pub fn load_avg(&self) -> Option<Fixed> {
        self.mlfqs.as_ref().map(Mlfqs::load_avg)
    }

    pub fn stats(&self) -> TimerStats {
        TimerStats {
            ticks: self.clock.get(),
            sleeping: self.sleepers.len(),
            next_wake: self.sleepers.next_wake(),
            load_avg: self.load_avg(),
        }
    }

    /// Log the tick count.
    pub fn print_stats<I: InterruptControl>(&self, intr: &I) {
        log::info!("Timer: {} ticks", self.now(intr));
    }

    /// Put the current thread in the sleep queue, due `ticks` ticks from
    /// now, without blocking it. Returns the wake tick.
    ///
    /// Must be called with interrupts disabled, and the caller must block the
    /// thread before interrupts are enabled again.
    pub fn enqueue_current<I, T>(&mut self, intr: &I, threads: &mut T, ticks: i64) -> Ticks
    where
        I: InterruptControl,
        T: IrqThreadOps + ?Sized,
    {
        assert!(!intr.are_enabled(), "enqueue_current: interrupts must be disabled");

        let current = threads.current_thread();
        if threads.is_idle(current) {
            panic!("Cannot put the idle thread to sleep");
        }
        let priority = match threads.sched_fields(current) {
            Some(fields) => fields.priority,
            None => panic!("enqueue_current: thread {} does not exist", current.0),
        };

        let wake_at = self.clock.get().saturating_add_signed(ticks);
        self.sleepers.insert(Sleeper {
            tid: current,
            wake_at,
            priority,
        });
        log::debug!(
            "Thread {} sleeping until tick {} (now {})",
            current.0,
            wake_at,
            self.clock.get()
        );
        wake_at
    }

    /// Sleep the current thread for approximately `ticks` timer ticks.
    ///
    /// Interrupts must be enabled and the caller must not be an interrupt
    /// handler.
    pub fn sleep_ticks<I, T>(&mut self, intr: &I, threads: &mut T, ticks: i64)
    where
        I: InterruptControl,
        T: ThreadOps + ?Sized,
    {
        assert!(
            !intr.in_interrupt_context(),
            "sleep_ticks called from interrupt context"
        );
        assert!(intr.are_enabled(), "sleep_ticks called with interrupts disabled");

        intr.without_interrupts(|| {
            self.enqueue_current(intr, threads, ticks);
            threads.block_current();
        });
    }

    /// Sleep for approximately `ms` milliseconds.
    pub fn msleep<I, D, T>(&mut self, intr: &I, delay: &D, threads: &mut T, ms: i64)
    where
        I: InterruptControl,
        D: BusyWait,
        T: ThreadOps + ?Sized,
    {
        self.real_time_sleep(intr, delay, threads, ms, 1000);
    }

    /// Sleep for approximately `us` microseconds.
    pub fn usleep<I, D, T>(&mut self, intr: &I, delay: &D, threads: &mut T, us: i64)
    where
        I: InterruptControl,
        D: BusyWait,
        T: ThreadOps + ?Sized,
    {
        self.real_time_sleep(intr, delay, threads, us, 1000 * 1000);
    }

    /// Sleep for approximately `ns` nanoseconds.
    pub fn nsleep<I, D, T>(&mut self, intr: &I, delay: &D, threads: &mut T, ns: i64)
    where
        I: InterruptControl,
        D: BusyWait,
        T: ThreadOps + ?Sized,
    {
        self.real_time_sleep(intr, delay, threads, ns, 1000 * 1000 * 1000);
    }

    /// Sleep for `num / denom` seconds: block when that is at least one full
    /// tick, otherwise spin for sub-tick accuracy.
    fn real_time_sleep<I, D, T>(
        &mut self,
        intr: &I,
        delay: &D,
        threads: &mut T,
        num: i64,
        denom: i32,
    ) where
        I: InterruptControl,
        D: BusyWait,
        T: ThreadOps + ?Sized,
    {
        assert!(intr.are_enabled(), "sleep called with interrupts disabled");

        let ticks = duration_to_ticks(num, denom, self.config.freq);
        if ticks > 0 {
            self.sleep_ticks(intr, threads, ticks);
        } else {
            delay.busy_delay(num, denom);
        }
    }

    /// Timer interrupt entry point. Runs with interrupts masked, never
    /// blocks.
    pub fn on_timer_interrupt<I, T>(&mut self, intr: &I, threads: &mut T) -> TickReport
    where
        I: InterruptControl,
        T: IrqThreadOps + ?Sized,
    {
        intr.without_interrupts(|| {
            let now = self.clock.advance();
            threads.tick_bookkeeping();

            let mut report = TickReport::new(now);

            report.woken = self.sleepers.drain_due(now, |sleeper| {
                log::debug!("Waking thread {} at tick {}", sleeper.tid.0, now);
                threads.resume(sleeper.tid);
            });
            if report.woken > 0 {
                report.work |= TickWork::WOKE_SLEEPERS;
            }

            let freq = self.config.freq as Ticks;
            if let Some(engine) = self.mlfqs.as_mut() {
                if engine.charge_running(threads) {
                    report.work |= TickWork::CHARGED_RECENT_CPU;
                }

                if now % freq == 0 {
                    let ready = mlfqs::ready_threads(&*threads);
                    let load_avg = engine.update_load_avg(ready);
                    engine.refresh_recent_cpu(threads);
                    report.work |= TickWork::LOAD_AVG;
                    log::trace!("Tick {}: load_avg {} ({} ready)", now, load_avg, ready);
                }

                if now % PRIORITY_RECALC_INTERVAL == 0 {
                    engine.refresh_priorities(threads);
                    report.work |= TickWork::PRIORITIES;
                }

                report.load_avg = Some(engine.load_avg());
            }

            intr.yield_on_return();
            report.work |= TickWork::YIELD_REQUESTED;

            report
        })
    }
}

impl Default for TimerCore {
    fn default() -> Self {
        Self::new(TimerConfig::DEFAULT)
    }
}

/// Convert `num / denom` seconds to timer ticks, rounding down.
///
/// Saturates instead of overflowing for absurdly long durations.
///
/// ```text
///   (num / denom) s
/// ------------------- = num * freq / denom ticks
///  1 s / freq ticks
/// ```
pub fn duration_to_ticks(num: i64, denom: i32, freq: u32) -> i64 {
    num.saturating_mul(freq as i64) / denom as i64
}

/// Busy-wait for approximately `ms` milliseconds. Interrupts need not be on.
pub fn mdelay<D: BusyWait>(delay: &D, ms: i64) {
    delay.busy_delay(ms, 1000);
}

/// Busy-wait for approximately `us` microseconds. Interrupts need not be on.
pub fn udelay<D: BusyWait>(delay: &D, us: i64) {
    delay.busy_delay(us, 1000 * 1000);
}

/// Busy-wait for approximately `ns` nanoseconds. Interrupts need not be on.
pub fn ndelay<D: BusyWait>(delay: &D, ns: i64) {
    delay.busy_delay(ns, 1000 * 1000 * 1000);
}
