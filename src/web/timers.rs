//! `Scheduler` backed by browser timers (gloo-timers).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use web_time::Instant;

use crate::scheduler::{Callback, Scheduler, TaskHandle};

/// Pending timeouts live in the map until they fire or are cancelled.
/// Dropping a `Timeout` clears it, so cancelling is just a removal.
pub struct BrowserScheduler {
    epoch: Instant,
    next_id: Cell<u64>,
    timers: Rc<RefCell<HashMap<u64, Timeout>>>,
}

impl BrowserScheduler {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            next_id: Cell::new(1),
            timers: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.timers.borrow().len()
    }
}

impl Default for BrowserScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for BrowserScheduler {
    fn schedule(&self, delay_ms: u32, callback: Callback) -> TaskHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let timers = Rc::downgrade(&self.timers);
        let timeout = Timeout::new(delay_ms, move || {
            // Keep our own entry alive until the callback returns.
            let _own = timers.upgrade().and_then(|t| t.borrow_mut().remove(&id));
            callback();
        });
        self.timers.borrow_mut().insert(id, timeout);
        TaskHandle::from_raw(id)
    }

    fn cancel(&self, handle: TaskHandle) -> bool {
        let removed = self.timers.borrow_mut().remove(&handle.raw());
        removed.is_some()
    }

    fn is_pending(&self, handle: TaskHandle) -> bool {
        self.timers.borrow().contains_key(&handle.raw())
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}
