/*
 * Timer Core Configuration
 *
 * Compile-time limits for the tick core plus the small runtime configuration
 * chosen at boot: the PIT frequency and whether the MLFQS engine owns thread
 * priorities.
 *
 * The 8254 PIT cannot be programmed below 19 Hz (the 16-bit divisor would
 * overflow), and above 1000 Hz the interrupt overhead starts to dominate, so
 * `TimerConfig::new` rejects frequencies outside that window.
 */

use crate::error::TimerError;

/// Default timer interrupt frequency in Hz (10ms per tick).
pub const TIMER_FREQ: u32 = 100;

/// Lowest frequency the PIT can produce.
pub const TIMER_FREQ_MIN: u32 = 19;

/// Highest frequency we allow.
pub const TIMER_FREQ_MAX: u32 = 1000;

/// Lowest thread priority.
pub const PRI_MIN: u8 = 0;

/// Highest thread priority.
pub const PRI_MAX: u8 = 63;

/// Most favorable nice value.
pub const NICE_MIN: i8 = -20;

/// Least favorable nice value.
pub const NICE_MAX: i8 = 20;

/// MLFQS priorities are recomputed every this many ticks.
pub const PRIORITY_RECALC_INTERVAL: u64 = 4;

/// Maximum number of threads that can sleep at the same time.
/// Bounds the sleep queue so neither insert nor drain allocates.
pub const MAX_SLEEPERS: usize = 64;

/// Who owns thread priorities.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SchedPolicy {
    /// Priorities are managed by the thread subsystem; the MLFQS engine
    /// never runs.
    #[default]
    RoundRobin,

    /// The MLFQS engine recomputes load average, recent CPU and priority.
    Mlfqs,
}

/// Runtime timer configuration, fixed at boot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    /// Timer interrupts per second.
    pub freq: u32,

    /// Scheduling policy.
    pub policy: SchedPolicy,
}

impl TimerConfig {
    /// `TIMER_FREQ` with round-robin priorities.
    pub const DEFAULT: TimerConfig = TimerConfig {
        freq: TIMER_FREQ,
        policy: SchedPolicy::RoundRobin,
    };

    /// Validate and build a configuration.
    pub const fn new(freq: u32, policy: SchedPolicy) -> Result<Self, TimerError> {
        if freq < TIMER_FREQ_MIN || freq > TIMER_FREQ_MAX {
            return Err(TimerError::InvalidFrequency(freq));
        }
        Ok(Self { freq, policy })
    }

    /// Shorthand for `TIMER_FREQ` with the MLFQS policy.
    pub const fn mlfqs() -> Self {
        TimerConfig {
            freq: TIMER_FREQ,
            policy: SchedPolicy::Mlfqs,
        }
    }

    pub const fn is_mlfqs(&self) -> bool {
        matches!(self.policy, SchedPolicy::Mlfqs)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_bounds() {
        assert!(TimerConfig::new(19, SchedPolicy::RoundRobin).is_ok());
        assert!(TimerConfig::new(1000, SchedPolicy::Mlfqs).is_ok());
        assert_eq!(
            TimerConfig::new(18, SchedPolicy::RoundRobin),
            Err(TimerError::InvalidFrequency(18))
        );
        assert_eq!(
            TimerConfig::new(1001, SchedPolicy::RoundRobin),
            Err(TimerError::InvalidFrequency(1001))
        );
    }

    #[test]
    fn test_default_is_round_robin() {
        let config = TimerConfig::default();
        assert_eq!(config.freq, TIMER_FREQ);
        assert!(!config.is_mlfqs());
        assert!(TimerConfig::mlfqs().is_mlfqs());
    }
}
