/*
 * Thread Subsystem Interface
 *
 * This module defines the only way the timer core touches threads. The
 * thread subsystem (creation, context switch, ready queue, idle thread)
 * implements these traits; the timer core never sees a thread structure.
 *
 * The interface is split in two:
 *
 * - `IrqThreadOps`: operations that never suspend the caller. This is all
 *   the timer interrupt handler is allowed to use, and it is the only bound
 *   `TimerCore::on_timer_interrupt` accepts.
 * - `ThreadOps`: adds `block_current`, which suspends the calling thread.
 *   Only task-context entry points (`sleep_ticks` and friends) require it.
 *
 * Because the handler is generic over `IrqThreadOps` alone, a suspending
 * call from interrupt context does not type-check.
 */

use crate::types::{SchedFields, ThreadId};

/// Non-suspending thread operations, safe to call from the timer interrupt
pub trait IrqThreadOps {
    /// The thread currently running on the CPU.
    fn current_thread(&self) -> ThreadId;

    /// The idle thread, if it has been created yet.
    fn idle_thread(&self) -> Option<ThreadId>;

    /// Whether `tid` is the idle thread.
    fn is_idle(&self, tid: ThreadId) -> bool {
        self.idle_thread() == Some(tid)
    }

    /// Number of threads waiting in the ready queue, excluding the running
    /// thread and the idle thread.
    fn ready_count(&self) -> usize;

    /// Per-tick bookkeeping of the thread subsystem (time-slice accounting).
    fn tick_bookkeeping(&mut self);

    /// Move a blocked thread to the ready queue.
    fn resume(&mut self, tid: ThreadId);

    /// Scheduling fields of `tid`, or `None` if no such thread exists.
    fn sched_fields(&mut self, tid: ThreadId) -> Option<&mut SchedFields>;

    /// Visit every live thread, including the idle thread.
    ///
    /// The snapshot must be finite and must not allocate; it is called from
    /// the timer interrupt.
    fn for_each_thread(&mut self, visit: &mut dyn FnMut(ThreadId, &mut SchedFields));
}

/// Thread operations available in task context
pub trait ThreadOps: IrqThreadOps {
    /// Block the current thread until another context calls `resume` on it.
    ///
    /// Called with interrupts disabled; the thread subsystem switches to the
    /// next ready thread and returns once this thread runs again.
    fn block_current(&mut self);
}
