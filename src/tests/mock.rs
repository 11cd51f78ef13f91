/*
 * Test Doubles
 *
 * `MockInterrupts` stands in for the CPU interrupt flag and the interrupt
 * exit path; `MockThreads` stands in for the thread subsystem. Blocking the
 * current thread switches the mock CPU to the idle thread, and `resume`
 * puts a blocked thread back in the ready state, which is all the timer
 * core can observe.
 */

use core::cell::{Cell, RefCell};

use crate::arch::{BusyWait, InterruptControl};
use crate::traits::{IrqThreadOps, ThreadOps};
use crate::types::{Nice, Priority, SchedFields, ThreadId};

pub struct MockInterrupts {
    enabled: Cell<bool>,
    in_interrupt: Cell<bool>,
    disables: Cell<usize>,
    yields: Cell<usize>,
    delays: RefCell<Vec<(i64, i32)>>,
}

impl MockInterrupts {
    pub fn new() -> Self {
        Self {
            enabled: Cell::new(true),
            in_interrupt: Cell::new(false),
            disables: Cell::new(0),
            yields: Cell::new(0),
            delays: RefCell::new(Vec::new()),
        }
    }

    pub fn set_in_interrupt(&self, value: bool) {
        self.in_interrupt.set(value);
    }

    pub fn disable_count(&self) -> usize {
        self.disables.get()
    }

    pub fn yield_count(&self) -> usize {
        self.yields.get()
    }

    pub fn delays(&self) -> Vec<(i64, i32)> {
        self.delays.borrow().clone()
    }
}

impl InterruptControl for MockInterrupts {
    fn are_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn enable(&self) {
        self.enabled.set(true);
    }

    fn disable(&self) {
        self.disables.set(self.disables.get() + 1);
        self.enabled.set(false);
    }

    fn in_interrupt_context(&self) -> bool {
        self.in_interrupt.get()
    }

    fn yield_on_return(&self) {
        self.yields.set(self.yields.get() + 1);
    }
}

impl BusyWait for MockInterrupts {
    fn busy_delay(&self, num: i64, denom: i32) {
        self.delays.borrow_mut().push((num, denom));
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MockState {
    Running,
    Ready,
    Blocked,
}

#[derive(Debug, Clone)]
pub struct MockThread {
    pub tid: ThreadId,
    pub fields: SchedFields,
    pub state: MockState,
}

/// Thread table with thread 0 as the idle thread
pub struct MockThreads {
    pub threads: Vec<MockThread>,
    pub current: ThreadId,
    pub idle: Option<ThreadId>,
    pub resumed: Vec<ThreadId>,
    pub bookkeeping: usize,
}

impl MockThreads {
    /// Only the idle thread, currently running.
    pub fn with_idle() -> Self {
        let idle = ThreadId(0);
        Self {
            threads: vec![MockThread {
                tid: idle,
                fields: SchedFields::new(Priority::MIN, Nice::ZERO),
                state: MockState::Running,
            }],
            current: idle,
            idle: Some(idle),
            resumed: Vec::new(),
            bookkeeping: 0,
        }
    }

    /// Add a ready thread.
    pub fn spawn(&mut self, priority: i32, nice: i32) -> ThreadId {
        let tid = ThreadId(self.threads.len());
        self.threads.push(MockThread {
            tid,
            fields: SchedFields::new(Priority::clamped(priority), Nice::clamped(nice)),
            state: MockState::Ready,
        });
        tid
    }

    /// Switch the CPU to `tid`.
    pub fn run(&mut self, tid: ThreadId) {
        let previous = self.current;
        if self.thread(previous).state == MockState::Running {
            self.thread_mut(previous).state = MockState::Ready;
        }
        assert_eq!(self.thread(tid).state, MockState::Ready, "thread {} not ready", tid.0);
        self.thread_mut(tid).state = MockState::Running;
        self.current = tid;
    }

    pub fn thread(&self, tid: ThreadId) -> &MockThread {
        &self.threads[tid.0]
    }

    pub fn thread_mut(&mut self, tid: ThreadId) -> &mut MockThread {
        &mut self.threads[tid.0]
    }

    pub fn fields(&self, tid: ThreadId) -> SchedFields {
        self.thread(tid).fields
    }
}

impl IrqThreadOps for MockThreads {
    fn current_thread(&self) -> ThreadId {
        self.current
    }

    fn idle_thread(&self) -> Option<ThreadId> {
        self.idle
    }

    fn ready_count(&self) -> usize {
        self.threads
            .iter()
            .filter(|t| t.state == MockState::Ready && Some(t.tid) != self.idle)
            .count()
    }

    fn tick_bookkeeping(&mut self) {
        self.bookkeeping += 1;
    }

    fn resume(&mut self, tid: ThreadId) {
        let thread = self.thread_mut(tid);
        assert_eq!(thread.state, MockState::Blocked, "resume of unblocked thread {}", tid.0);
        thread.state = MockState::Ready;
        self.resumed.push(tid);
    }

    fn sched_fields(&mut self, tid: ThreadId) -> Option<&mut SchedFields> {
        self.threads.get_mut(tid.0).map(|t| &mut t.fields)
    }

    fn for_each_thread(&mut self, visit: &mut dyn FnMut(ThreadId, &mut SchedFields)) {
        for thread in self.threads.iter_mut() {
            visit(thread.tid, &mut thread.fields);
        }
    }
}

impl ThreadOps for MockThreads {
    fn block_current(&mut self) {
        let current = self.current;
        self.thread_mut(current).state = MockState::Blocked;

        // The CPU falls back to the idle thread until someone runs another
        if let Some(idle) = self.idle {
            self.thread_mut(idle).state = MockState::Running;
            self.current = idle;
        }
    }
}
