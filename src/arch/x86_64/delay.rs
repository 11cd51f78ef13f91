/*
 * Calibrated Busy-Wait
 *
 * Sub-tick delays cannot use the sleep queue, so they spin. The number of
 * loop iterations per tick is measured once at boot by the kernel's
 * calibration routine and handed to `set_loops_per_tick`; this module only
 * turns a duration into a loop count and spins.
 */

use core::sync::atomic::{compiler_fence, AtomicU64, Ordering};

use crate::arch::{delay_loops, BusyWait};

/// Loop iterations per timer tick, set once by the calibration routine
static LOOPS_PER_TICK: AtomicU64 = AtomicU64::new(0);

/// Record the calibrated loop count
pub fn set_loops_per_tick(loops: u64) {
    LOOPS_PER_TICK.store(loops, Ordering::SeqCst);
    log::info!("Busy-wait calibrated: {} loops/tick", loops);
}

/// Get the calibrated loop count (0 before calibration)
pub fn loops_per_tick() -> u64 {
    LOOPS_PER_TICK.load(Ordering::SeqCst)
}

/// Busy-wait delay using the calibrated loop count
#[derive(Debug, Copy, Clone)]
pub struct CalibratedDelay {
    /// Timer frequency the calibration was taken at
    pub freq: u32,
}

impl CalibratedDelay {
    pub const fn new(freq: u32) -> Self {
        Self { freq }
    }
}

impl BusyWait for CalibratedDelay {
    fn busy_delay(&self, num: i64, denom: i32) {
        let mut loops = delay_loops(loops_per_tick(), num, denom, self.freq);
        while loops > 0 {
            // Keep the loop from being optimized away
            compiler_fence(Ordering::SeqCst);
            core::hint::spin_loop();
            loops -= 1;
        }
    }
}
