//! Debounce and throttle wrappers for high-frequency handlers.
//!
//! Both wrappers are driven by a [`Scheduler`], so they behave identically
//! under the browser timer and the virtual clock. Clones share state.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::scheduler::{Scheduler, TaskHandle};

struct DebounceShared<A> {
    sched: Rc<dyn Scheduler>,
    wait_ms: u32,
    func: RefCell<Box<dyn FnMut(A)>>,
    args: RefCell<Option<A>>,
    timer: Cell<Option<TaskHandle>>,
}

/// Trailing-edge debounce: `func` runs once the wrapper has been quiet for
/// `wait_ms`, with the arguments of the last call.
pub struct Debounce<A: 'static> {
    shared: Rc<DebounceShared<A>>,
}

impl<A: 'static> Clone for Debounce<A> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

pub fn debounce<A: 'static>(
    sched: Rc<dyn Scheduler>,
    wait_ms: u32,
    func: impl FnMut(A) + 'static,
) -> Debounce<A> {
    Debounce {
        shared: Rc::new(DebounceShared {
            sched,
            wait_ms,
            func: RefCell::new(Box::new(func)),
            args: RefCell::new(None),
            timer: Cell::new(None),
        }),
    }
}

impl<A: 'static> Debounce<A> {
    pub fn call(&self, args: A) {
        *self.shared.args.borrow_mut() = Some(args);
        Self::arm(&self.shared, self.shared.wait_ms);
    }

    /// Drop the pending call without running it.
    pub fn cancel(&self) {
        if let Some(timer) = self.shared.timer.take() {
            self.shared.sched.cancel(timer);
        }
        self.shared.args.borrow_mut().take();
    }

    /// Run the pending call now, if there is one.
    ///
    /// From inside `func` itself the call cannot run in place, so it is
    /// deferred to a zero-delay task instead.
    pub fn flush(&self) {
        if let Some(timer) = self.shared.timer.take() {
            self.shared.sched.cancel(timer);
            Self::fire(&self.shared);
        }
    }

    pub fn is_pending(&self) -> bool {
        self.shared.timer.get().is_some()
    }

    fn arm(shared: &Rc<DebounceShared<A>>, delay_ms: u32) {
        if let Some(timer) = shared.timer.take() {
            shared.sched.cancel(timer);
        }
        let weak = Rc::downgrade(shared);
        let timer = shared.sched.schedule(
            delay_ms,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.timer.set(None);
                    Self::fire(&shared);
                }
            }),
        );
        shared.timer.set(Some(timer));
    }

    fn fire(shared: &Rc<DebounceShared<A>>) {
        let Ok(mut func) = shared.func.try_borrow_mut() else {
            Self::arm(shared, 0);
            return;
        };
        let args = shared.args.borrow_mut().take();
        if let Some(args) = args {
            func(args);
        }
    }
}

struct ThrottleShared<A> {
    sched: Rc<dyn Scheduler>,
    limit_ms: u32,
    func: RefCell<Box<dyn FnMut(A)>>,
    cooldown: Cell<Option<TaskHandle>>,
}

/// Leading-edge throttle: the first call in a window runs immediately, the
/// rest of the window is dropped.
pub struct Throttle<A: 'static> {
    shared: Rc<ThrottleShared<A>>,
}

impl<A: 'static> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

pub fn throttle<A: 'static>(
    sched: Rc<dyn Scheduler>,
    limit_ms: u32,
    func: impl FnMut(A) + 'static,
) -> Throttle<A> {
    Throttle {
        shared: Rc::new(ThrottleShared {
            sched,
            limit_ms,
            func: RefCell::new(Box::new(func)),
            cooldown: Cell::new(None),
        }),
    }
}

impl<A: 'static> Throttle<A> {
    /// Returns `true` if the call went through.
    pub fn call(&self, args: A) -> bool {
        let shared = &self.shared;
        if shared.cooldown.get().is_some() {
            return false;
        }
        // Cooldown starts before `func` runs so a reentrant call is dropped.
        let weak: Weak<ThrottleShared<A>> = Rc::downgrade(shared);
        let cooldown = shared.sched.schedule(
            shared.limit_ms,
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.cooldown.set(None);
                }
            }),
        );
        shared.cooldown.set(Some(cooldown));
        (shared.func.borrow_mut())(args);
        true
    }

    /// End the current cooldown early.
    pub fn cancel(&self) {
        if let Some(cooldown) = self.shared.cooldown.take() {
            self.shared.sched.cancel(cooldown);
        }
    }

    pub fn is_cooling_down(&self) -> bool {
        self.shared.cooldown.get().is_some()
    }
}
