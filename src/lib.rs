/*
 * CLUU Timer Core
 *
 * This crate is the timer-interrupt-driven core of the CLUU preemptive
 * scheduler. It turns the periodic hardware tick into:
 *
 * - a monotonic tick clock (`clock`)
 * - a sleep/wake queue that parks threads until a given tick (`sleep_queue`)
 * - the MLFQS engine that recomputes load average, recent CPU and priority
 *   from CPU-usage history in 17.14 fixed point (`mlfqs`, `fixed_point`)
 *
 * Everything is orchestrated by `TimerCore::on_timer_interrupt`, which runs
 * once per tick with interrupts masked and never blocks or allocates.
 *
 * ## Layering
 *
 * ```text
 * ┌──────────────────────────────────────────────┐
 * │  TimerManager (global instance, x86_64 glue)  │
 * ├──────────────────────────────────────────────┤
 * │  TimerCore: on_timer_interrupt / sleep_ticks  │
 * ├───────────┬───────────────┬──────────────────┤
 * │   clock   │  sleep_queue  │  mlfqs           │
 * ├───────────┴───────────────┴──────────────────┤
 * │  fixed_point · types · config · events        │
 * ├──────────────────────────────────────────────┤
 * │  traits (thread subsystem) · arch (IRQ ctrl)  │
 * └──────────────────────────────────────────────┘
 * ```
 *
 * The thread subsystem (creation, context switch, ready queue) and the
 * hardware (PIT programming, IDT registration) are consumed through the
 * traits in `traits` and `arch`; they are not implemented here.
 */

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod fixed_point;
#[cfg(target_arch = "x86_64")]
pub mod manager;
pub mod mlfqs;
pub mod sleep_queue;
pub mod timer;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tests;

pub use arch::{BusyWait, InterruptControl, InterruptGuard};
pub use clock::TickCounter;
pub use config::{SchedPolicy, TimerConfig, TIMER_FREQ};
pub use error::TimerError;
pub use events::{TickReport, TickWork};
pub use fixed_point::Fixed;
#[cfg(target_arch = "x86_64")]
pub use manager::TimerManager;
pub use mlfqs::Mlfqs;
pub use sleep_queue::{SleepQueue, Sleeper};
pub use timer::{TimerCore, TimerStats};
pub use traits::{IrqThreadOps, ThreadOps};
pub use types::{Nice, Priority, SchedFields, ThreadId, Ticks};
