/*
 * Test Suite for the Timer Core
 *
 * Host-side scenarios that drive `TimerCore` tick by tick against mock
 * implementations of the hardware and thread-subsystem interfaces.
 *
 * ## Modules
 *
 * - `mock`: `MockInterrupts` (interrupt flag, interrupt context, yield and
 *   busy-wait recording) and `MockThreads` (a tiny thread table with an idle
 *   thread and a ready/running/blocked state per thread)
 * - `sleep_wake`: sleep lower bound, release order, drain completeness,
 *   duration conversion and the fatal sleep preconditions
 * - `mlfqs_ticks`: load average / recent CPU / priority trajectories over
 *   whole seconds, policy switch, determinism
 */

pub mod mock;

mod mlfqs_ticks;
