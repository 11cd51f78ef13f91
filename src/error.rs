/*
 * Timer Core Errors
 *
 * The tick path itself has no recoverable errors: a broken invariant there
 * means the scheduler state can no longer be trusted, so it panics. The only
 * recoverable failures are at setup time (bad configuration, double init)
 * and when the kernel glue is used before `TimerManager::init`.
 */

use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Requested frequency is outside what the PIT supports.
    InvalidFrequency(u32),

    /// `TimerManager::init` was called twice.
    AlreadyInitialized,

    /// The global timer has not been initialized yet.
    NotInitialized,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::InvalidFrequency(freq) => write!(
                f,
                "timer frequency {} Hz outside supported range {}..={} Hz",
                freq,
                crate::config::TIMER_FREQ_MIN,
                crate::config::TIMER_FREQ_MAX
            ),
            TimerError::AlreadyInitialized => f.write_str("timer already initialized"),
            TimerError::NotInitialized => f.write_str("timer not initialized"),
        }
    }
}
