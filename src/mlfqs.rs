/*
 * MLFQS Recalculation Engine
 *
 * Multi-level feedback queue scheduling lowers the priority of threads that
 * recently used a lot of CPU and lets it recover as they stay idle. The
 * timer interrupt drives three passes:
 *
 * 1. every tick: the running thread (unless idle) is charged one tick of
 *    `recent_cpu`
 * 2. every second (`freq` ticks): the system load average is updated from
 *    the number of runnable threads, then every thread's `recent_cpu` decays
 *    by a factor that depends on the load average
 * 3. every 4 ticks: every thread's priority is recomputed from its
 *    `recent_cpu` and `nice`
 *
 * ## Formulas (all in 17.14 fixed point)
 *
 * ```text
 * load_avg   = (59/60) * load_avg + (1/60) * ready_threads
 * recent_cpu = (2*load_avg) / (2*load_avg + 1) * recent_cpu + nice
 * priority   = clamp(round(PRI_MAX - recent_cpu/4 - nice*2), PRI_MIN, PRI_MAX)
 * ```
 *
 * `ready_threads` counts the threads waiting in the ready queue plus the
 * running thread when it is not the idle thread. The idle thread is never
 * charged and never recomputed.
 *
 * With 59/60 weighting the load average tracks ready-queue pressure with
 * roughly a one-minute time constant. The decay factor approaches 1 as load
 * grows, so on a busy system CPU-bound threads keep their history longer
 * while I/O-bound threads, which accumulate little `recent_cpu`, regain
 * priority quickly.
 */

use crate::config::PRI_MAX;
use crate::fixed_point::Fixed;
use crate::traits::IrqThreadOps;
use crate::types::{Nice, Priority, SchedFields};

/// MLFQS state: the system load average
#[derive(Debug, Default)]
pub struct Mlfqs {
    load_avg: Fixed,
}

impl Mlfqs {
    pub const fn new() -> Self {
        Self {
            load_avg: Fixed::ZERO,
        }
    }

    pub fn load_avg(&self) -> Fixed {
        self.load_avg
    }

    /// Load average times 100, rounded to nearest.
    pub fn load_avg_x100(&self) -> i64 {
        self.load_avg.to_int_nearest_scaled(100)
    }

    /// Charge one tick of CPU to the running thread. Returns false when the
    /// idle thread is running.
    pub fn charge_running<T: IrqThreadOps + ?Sized>(&self, threads: &mut T) -> bool {
        let current = threads.current_thread();
        if threads.is_idle(current) {
            return false;
        }
        match threads.sched_fields(current) {
            Some(fields) => fields.recent_cpu += 1,
            None => panic!("mlfqs: running thread {} does not exist", current.0),
        }
        true
    }

    /// Update the load average from the number of runnable threads.
    pub fn update_load_avg(&mut self, ready_threads: usize) -> Fixed {
        let decay = Fixed::from_int(59) / 60;
        let weight = Fixed::ONE / 60;
        self.load_avg = decay * self.load_avg + weight * ready_threads as i32;
        self.load_avg
    }

    /// Decay `recent_cpu` of every thread except the idle thread.
    pub fn refresh_recent_cpu<T: IrqThreadOps + ?Sized>(&self, threads: &mut T) {
        let load_avg = self.load_avg;
        let idle = threads.idle_thread();
        threads.for_each_thread(&mut |tid, fields| {
            if Some(tid) != idle {
                fields.recent_cpu = decay_recent_cpu(load_avg, fields.recent_cpu, fields.nice);
            }
        });
    }

    /// Recompute the priority of every thread except the idle thread.
    pub fn refresh_priorities<T: IrqThreadOps + ?Sized>(&self, threads: &mut T) {
        let idle = threads.idle_thread();
        threads.for_each_thread(&mut |tid, fields| {
            if Some(tid) != idle {
                fields.priority = compute_priority(fields.recent_cpu, fields.nice);
            }
        });
    }
}

/// Threads competing for the CPU: the ready queue plus the running thread
/// unless it is the idle thread.
pub fn ready_threads<T: IrqThreadOps + ?Sized>(threads: &T) -> usize {
    let running = if threads.is_idle(threads.current_thread()) { 0 } else { 1 };
    threads.ready_count() + running
}

/// `(2*load_avg) / (2*load_avg + 1) * recent_cpu + nice`
pub fn decay_recent_cpu(load_avg: Fixed, recent_cpu: Fixed, nice: Nice) -> Fixed {
    let twice_load = load_avg * 2;
    let coefficient = twice_load / (twice_load + 1);
    coefficient * recent_cpu + nice.get()
}

/// `PRI_MAX - recent_cpu/4 - nice*2`, rounded to nearest and clamped.
pub fn compute_priority(recent_cpu: Fixed, nice: Nice) -> Priority {
    let raw = Fixed::from_int(PRI_MAX as i32) - recent_cpu / 4 - nice.get() * 2;
    Priority::clamped(raw.to_int_nearest())
}

/// `recent_cpu` times 100, rounded to nearest.
pub fn recent_cpu_x100(fields: &SchedFields) -> i64 {
    fields.recent_cpu.to_int_nearest_scaled(100)
}
