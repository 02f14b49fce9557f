//! Timer sequencing layer.
//!
//! Every deferred effect on the page (typing ticks, ripple cleanup,
//! notification expiry, navbar idle reset) goes through a [`Scheduler`].
//! Two implementations exist:
//! - [`ManualScheduler`]: a virtual clock advanced explicitly (tests, CLI replay)
//! - `web::BrowserScheduler`: backed by `gloo-timers` (wasm32 only)
//!
//! ## Guarantees
//!
//! - A task fires at most once.
//! - Cancelling a pending task prevents its callback from ever running.
//! - Cancelling a fired or already-cancelled task is a no-op.
//! - Callbacks never run while another callback is running, and no internal
//!   borrow is held while a callback runs, so callbacks may freely schedule
//!   or cancel other tasks.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};

/// Opaque identifier for a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub fn from_raw(id: u64) -> Self {
        TaskHandle(id)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

pub type Callback = Box<dyn FnOnce()>;

/// One-shot, cancellable delayed execution.
pub trait Scheduler {
    /// Run `callback` once after `delay_ms`.
    fn schedule(&self, delay_ms: u32, callback: Callback) -> TaskHandle;

    /// Cancel a pending task. Returns `true` only if the task was still pending.
    fn cancel(&self, handle: TaskHandle) -> bool;

    /// Whether the task is still waiting to fire.
    fn is_pending(&self, handle: TaskHandle) -> bool;

    /// Milliseconds since the scheduler's epoch.
    fn now_ms(&self) -> u64;
}

// ----------------------------------------------------------------------------
// Virtual clock
// ----------------------------------------------------------------------------

/// Upper bound on tasks drained by [`ManualScheduler::run_until_idle`].
/// Guards against repeating tasks that would otherwise never let it return.
pub const MAX_IDLE_STEPS: usize = 100_000;

#[derive(Default)]
struct ManualInner {
    now: u64,
    next_id: u64,
    /// (due time, id) keeps FIFO order among tasks due at the same instant.
    queue: BTreeMap<(u64, u64), Callback>,
    due: HashMap<u64, u64>,
}

/// Deterministic scheduler driven by an explicit clock.
///
/// ```
/// use folio::scheduler::{ManualScheduler, Scheduler};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let sched = ManualScheduler::new();
/// let hits = Rc::new(Cell::new(0));
/// let h = hits.clone();
/// sched.schedule(50, Box::new(move || h.set(h.get() + 1)));
///
/// sched.advance(49);
/// assert_eq!(hits.get(), 0);
/// sched.advance(1);
/// assert_eq!(hits.get(), 1);
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    inner: RefCell<ManualInner>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle, ready to be coerced into `Rc<dyn Scheduler>`.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    /// Number of tasks still waiting.
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Due time of the earliest pending task.
    pub fn next_due(&self) -> Option<u64> {
        self.inner.borrow().queue.keys().next().map(|(due, _)| *due)
    }

    /// Fire the earliest task due at or before `target`.
    ///
    /// Moves the clock to the task's due time and returns it, or returns
    /// `None` (clock untouched) when nothing is due yet.
    pub fn run_next_until(&self, target: u64) -> Option<u64> {
        let (due, callback) = {
            let mut inner = self.inner.borrow_mut();
            let key = *inner.queue.keys().next()?;
            if key.0 > target {
                return None;
            }
            let callback = inner.queue.remove(&key)?;
            inner.due.remove(&key.1);
            inner.now = inner.now.max(key.0);
            (key.0, callback)
        };
        callback();
        Some(due)
    }

    /// Advance the clock by `ms`, firing everything that comes due on the way.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms().saturating_add(ms);
        self.advance_to(target);
    }

    /// Advance the clock to the absolute time `target` (never backwards).
    pub fn advance_to(&self, target: u64) {
        while self.run_next_until(target).is_some() {}
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(target);
    }

    /// Fire tasks in due order until the queue is empty.
    ///
    /// Returns the number of tasks fired. Stops after [`MAX_IDLE_STEPS`] so a
    /// repeating task cannot hang the caller.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        while fired < MAX_IDLE_STEPS {
            if self.run_next_until(u64::MAX).is_none() {
                return fired;
            }
            fired += 1;
        }
        log::warn!("[scheduler] run_until_idle stopped after {MAX_IDLE_STEPS} tasks");
        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay_ms: u32, callback: Callback) -> TaskHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        let due = inner.now + u64::from(delay_ms);
        inner.queue.insert((due, id), callback);
        inner.due.insert(id, due);
        TaskHandle(id)
    }

    fn cancel(&self, handle: TaskHandle) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.due.remove(&handle.0) {
            Some(due) => inner.queue.remove(&(due, handle.0)).is_some(),
            None => false,
        }
    }

    fn is_pending(&self, handle: TaskHandle) -> bool {
        self.inner.borrow().due.contains_key(&handle.0)
    }

    fn now_ms(&self) -> u64 {
        self.inner.borrow().now
    }
}

// ----------------------------------------------------------------------------
// Single-slot task (idle detection, restartable timers)
// ----------------------------------------------------------------------------

/// Holds at most one pending task; arming it again replaces the old one.
///
/// This is the idle-detection primitive: each event on a busy stream calls
/// [`TaskSlot::arm`], and the callback fires once the stream has been quiet
/// for the whole delay.
pub struct TaskSlot {
    sched: Rc<dyn Scheduler>,
    pending: Rc<Cell<Option<TaskHandle>>>,
}

impl TaskSlot {
    pub fn new(sched: Rc<dyn Scheduler>) -> Self {
        Self {
            sched,
            pending: Rc::new(Cell::new(None)),
        }
    }

    /// Cancel whatever is pending and schedule `callback` after `delay_ms`.
    pub fn arm(&self, delay_ms: u32, callback: impl FnOnce() + 'static) {
        self.cancel();
        let slot = Rc::downgrade(&self.pending);
        let handle = self.sched.schedule(
            delay_ms,
            Box::new(move || {
                if let Some(slot) = slot.upgrade() {
                    slot.set(None);
                }
                callback();
            }),
        );
        self.pending.set(Some(handle));
    }

    /// Drop the pending task, if any. Returns `true` if one was cancelled.
    pub fn cancel(&self) -> bool {
        match self.pending.take() {
            Some(handle) => self.sched.cancel(handle),
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending.get().is_some()
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

// ----------------------------------------------------------------------------
// Repeating tasks
// ----------------------------------------------------------------------------

struct RepeatState {
    current: Cell<Option<TaskHandle>>,
    stopped: Cell<bool>,
}

/// Handle for a task created by [`schedule_repeating`].
#[derive(Clone)]
pub struct RepeatingHandle {
    sched: Weak<dyn Scheduler>,
    state: Rc<RepeatState>,
}

impl RepeatingHandle {
    /// Stop the repetition. Safe to call from inside the task itself and
    /// safe to call more than once.
    pub fn cancel(&self) {
        self.state.stopped.set(true);
        if let (Some(handle), Some(sched)) = (self.state.current.take(), self.sched.upgrade()) {
            sched.cancel(handle);
        }
    }

    pub fn is_active(&self) -> bool {
        !self.state.stopped.get()
    }
}

/// Run `callback` every `interval_ms` until the returned handle is cancelled.
///
/// The next run is armed only after the current one returns, so runs never
/// overlap. An interval of 0 is treated as 1 ms.
pub fn schedule_repeating(
    sched: &Rc<dyn Scheduler>,
    interval_ms: u32,
    callback: impl FnMut() + 'static,
) -> RepeatingHandle {
    let state = Rc::new(RepeatState {
        current: Cell::new(None),
        stopped: Cell::new(false),
    });
    let callback: Rc<RefCell<dyn FnMut()>> = Rc::new(RefCell::new(callback));
    arm_repeat(sched, interval_ms.max(1), callback, state.clone());
    RepeatingHandle {
        sched: Rc::downgrade(sched),
        state,
    }
}

fn arm_repeat(
    sched: &Rc<dyn Scheduler>,
    interval_ms: u32,
    callback: Rc<RefCell<dyn FnMut()>>,
    state: Rc<RepeatState>,
) {
    let weak_sched = Rc::downgrade(sched);
    let task_state = state.clone();
    let handle = sched.schedule(
        interval_ms,
        Box::new(move || {
            task_state.current.set(None);
            if task_state.stopped.get() {
                return;
            }
            (callback.borrow_mut())();
            if task_state.stopped.get() {
                return;
            }
            if let Some(sched) = weak_sched.upgrade() {
                arm_repeat(&sched, interval_ms, callback, task_state);
            }
        }),
    );
    state.current.set(Some(handle));
}
