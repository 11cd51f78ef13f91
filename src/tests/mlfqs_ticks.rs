/*
 * MLFQS Tick Scenarios
 *
 * Run an MLFQS `TimerCore` for whole seconds and check the load average,
 * recent CPU and priority trajectories against hand-computed 17.14 values:
 *
 * - test_first_second_single_busy_thread
 * - test_busy_thread_with_niced_waiter: ready count includes the running
 *   thread, nice feeds both formulas
 * - test_idle_system_stays_cold
 * - test_pass_cadence: per-second and every-4-ticks passes
 * - test_second_length_follows_frequency
 * - test_reports_at_highest_frequency: x100 reporting past 1310.72
 * - test_round_robin_leaves_fields_alone
 * - test_trajectory_is_deterministic
 */

use super::mock::{MockInterrupts, MockState, MockThreads};
use crate::config::{SchedPolicy, TimerConfig};
use crate::events::{TickReport, TickWork};
use crate::fixed_point::Fixed;
use crate::mlfqs::recent_cpu_x100;
use crate::timer::TimerCore;
use crate::traits::IrqThreadOps;
use crate::types::{Nice, Priority, SchedFields, ThreadId};

fn run_ticks(
    core: &mut TimerCore,
    intr: &MockInterrupts,
    threads: &mut MockThreads,
    n: usize,
) -> Vec<TickReport> {
    (0..n).map(|_| core.on_timer_interrupt(intr, threads)).collect()
}

fn idle_untouched(threads: &MockThreads) -> bool {
    threads.fields(ThreadId(0)) == SchedFields::new(Priority::MIN, Nice::ZERO)
}

#[test]
fn test_first_second_single_busy_thread() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let mut core = TimerCore::new(TimerConfig::mlfqs());
    let a = threads.spawn(31, 0);
    threads.run(a);

    run_ticks(&mut core, &intr, &mut threads, 4);
    // 63 - 4/4
    assert_eq!(threads.fields(a).priority.get(), 62);

    run_ticks(&mut core, &intr, &mut threads, 92);
    assert_eq!(threads.fields(a).recent_cpu, Fixed::from_int(96));
    assert_eq!(threads.fields(a).priority.get(), 39);
    assert_eq!(core.load_avg(), Some(Fixed::ZERO));

    run_ticks(&mut core, &intr, &mut threads, 4);
    // load_avg = 1/60; recent_cpu = 528/16384 * 100; priority = 62.19
    assert_eq!(core.load_avg().map(Fixed::raw), Some(273));
    assert_eq!(threads.fields(a).recent_cpu.raw(), 52_800);
    assert_eq!(threads.fields(a).priority.get(), 62);
    assert_eq!(core.stats().load_avg, Some(Fixed::from_raw(273)));

    assert!(idle_untouched(&threads));
}

#[test]
fn test_busy_thread_with_niced_waiter() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let mut core = TimerCore::new(TimerConfig::mlfqs());
    let a = threads.spawn(31, 0);
    let b = threads.spawn(31, 5);
    threads.run(a);

    assert_eq!(crate::mlfqs::ready_threads(&threads), 2);

    run_ticks(&mut core, &intr, &mut threads, 96);
    // 63 - 0/4 - 5*2
    assert_eq!(threads.fields(b).priority.get(), 53);
    assert_eq!(threads.fields(b).recent_cpu, Fixed::ZERO);

    run_ticks(&mut core, &intr, &mut threads, 4);
    assert_eq!(core.load_avg().map(Fixed::raw), Some(546));

    // coefficient = 1092 * 16384 / 17476 = 1023
    assert_eq!(threads.fields(a).recent_cpu.raw(), 1023 * 100);
    assert_eq!(threads.fields(a).priority.get(), 61);

    // Never ran, but nice is added on every decay
    assert_eq!(threads.fields(b).recent_cpu, Fixed::from_int(5));
    // 63 - 1.25 - 10 = 51.75
    assert_eq!(threads.fields(b).priority.get(), 52);

    assert!(idle_untouched(&threads));
}

#[test]
fn test_idle_system_stays_cold() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let mut core = TimerCore::new(TimerConfig::mlfqs());

    let reports = run_ticks(&mut core, &intr, &mut threads, 300);
    assert!(reports.iter().all(|r| !r.ran(TickWork::CHARGED_RECENT_CPU)));
    assert_eq!(core.load_avg(), Some(Fixed::ZERO));
    assert!(idle_untouched(&threads));
}

#[test]
fn test_sleeping_thread_does_not_count_as_ready() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let mut core = TimerCore::new(TimerConfig::mlfqs());
    let a = threads.spawn(31, 0);
    threads.run(a);
    core.sleep_ticks(&intr, &mut threads, 150);
    assert_eq!(crate::mlfqs::ready_threads(&threads), 0);

    run_ticks(&mut core, &intr, &mut threads, 100);
    assert_eq!(core.load_avg(), Some(Fixed::ZERO));
    assert_eq!(threads.thread(a).state, MockState::Blocked);

    run_ticks(&mut core, &intr, &mut threads, 50);
    assert_eq!(threads.resumed, [a]);
}

#[test]
fn test_pass_cadence() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let mut core = TimerCore::new(TimerConfig::mlfqs());
    let a = threads.spawn(31, 0);
    threads.run(a);

    for report in run_ticks(&mut core, &intr, &mut threads, 300) {
        let n = report.tick;
        assert_eq!(report.ran(TickWork::LOAD_AVG), n % 100 == 0, "tick {}", n);
        assert_eq!(report.ran(TickWork::PRIORITIES), n % 4 == 0, "tick {}", n);
        assert!(report.ran(TickWork::CHARGED_RECENT_CPU | TickWork::YIELD_REQUESTED));
        assert!(report.load_avg.is_some());
    }
}

#[test]
fn test_second_length_follows_frequency() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let config = TimerConfig::new(20, SchedPolicy::Mlfqs).unwrap();
    let mut core = TimerCore::new(config);
    let a = threads.spawn(31, 0);
    threads.run(a);

    let reports = run_ticks(&mut core, &intr, &mut threads, 20);
    assert!(reports[..19].iter().all(|r| !r.ran(TickWork::LOAD_AVG)));
    assert!(reports[19].ran(TickWork::LOAD_AVG | TickWork::PRIORITIES));
    assert_eq!(core.load_avg().map(Fixed::raw), Some(273));
}

#[test]
fn test_reports_at_highest_frequency() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let config = TimerConfig::new(1000, SchedPolicy::Mlfqs).unwrap();
    let mut core = TimerCore::new(config);
    let a = threads.spawn(31, 0);
    threads.run(a);

    let mut peak = 0;
    for _ in 0..120 {
        run_ticks(&mut core, &intr, &mut threads, 1000);

        let fields = threads.fields(a);
        let x100 = recent_cpu_x100(&fields);
        let whole = fields.recent_cpu.to_int_trunc() as i64;
        assert!(x100 >= whole * 100 && x100 <= whole * 100 + 100);
        assert_eq!(
            format!("{}", fields.recent_cpu),
            format!("{}.{:02}", x100 / 100, x100 % 100)
        );
        peak = peak.max(x100);
    }

    // Past 1310.72, where the hundredths no longer fit a scaled i32
    assert!(peak > 131_072, "peak recent_cpu x100 {}", peak);
    assert_eq!(threads.fields(a).priority, Priority::MIN);
}

#[test]
fn test_round_robin_leaves_fields_alone() {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let mut core = TimerCore::default();
    let a = threads.spawn(31, 7);
    threads.run(a);
    let before = threads.fields(a);

    for report in run_ticks(&mut core, &intr, &mut threads, 200) {
        assert_eq!(report.work, TickWork::YIELD_REQUESTED);
        assert_eq!(report.load_avg, None);
    }
    assert_eq!(threads.fields(a), before);
    assert_eq!(core.load_avg(), None);
}

/// Load average and per-thread (recent_cpu, priority) after every tick
type Trajectory = Vec<(i32, Vec<(i32, u8)>)>;

fn simulate() -> Trajectory {
    let intr = MockInterrupts::new();
    let mut threads = MockThreads::with_idle();
    let mut core = TimerCore::new(TimerConfig::mlfqs());
    let workers = [
        threads.spawn(31, 0),
        threads.spawn(31, 5),
        threads.spawn(31, -3),
    ];
    let sleeper = workers[2];

    let mut trajectory = Vec::new();
    for n in 1..=450usize {
        if n % 7 == 1 {
            let next = workers[(n / 7) % workers.len()];
            if next != threads.current_thread() && threads.thread(next).state == MockState::Ready {
                threads.run(next);
            }
        }
        if n == 50 {
            if sleeper != threads.current_thread() {
                threads.run(sleeper);
            }
            core.sleep_ticks(&intr, &mut threads, 30);
        }

        core.on_timer_interrupt(&intr, &mut threads);
        assert!(idle_untouched(&threads));

        let load_avg = core.load_avg().map(Fixed::raw).unwrap_or_default();
        let fields = threads
            .threads
            .iter()
            .map(|t| (t.fields.recent_cpu.raw(), t.fields.priority.get()))
            .collect();
        trajectory.push((load_avg, fields));
    }
    trajectory
}

#[test]
fn test_trajectory_is_deterministic() {
    let first = simulate();
    let second = simulate();
    assert_eq!(first, second);

    let (load_avg, fields) = first.last().unwrap();
    assert!(*load_avg > 0);
    assert!(fields.iter().all(|&(_, priority)| priority <= Priority::MAX.get()));
}
