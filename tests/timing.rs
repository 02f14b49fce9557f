//! Scheduler, debounce and throttle behaviour on the virtual clock

use std::cell::RefCell;
use std::rc::Rc;

use folio::ratelimit::{debounce, throttle};
use folio::scheduler::{
    schedule_repeating, ManualScheduler, RepeatingHandle, Scheduler, TaskSlot,
};

type Log = Rc<RefCell<Vec<(u64, u32)>>>;

fn recorder(sched: &Rc<ManualScheduler>) -> (Log, impl FnMut(u32) + 'static) {
    let log: Log = Rc::default();
    let sink = log.clone();
    let clock = sched.clone();
    (log, move |arg| sink.borrow_mut().push((clock.now_ms(), arg)))
}

#[test]
fn cancel_twice_is_harmless() {
    let sched = ManualScheduler::shared();
    let fired = Rc::new(RefCell::new(false));
    let f = fired.clone();
    let handle = sched.schedule(10, Box::new(move || *f.borrow_mut() = true));

    assert!(sched.cancel(handle));
    assert!(!sched.cancel(handle));
    sched.advance(100);
    assert!(!*fired.borrow());
}

#[test]
fn debounced_resize_sees_only_final_width() {
    let sched = ManualScheduler::shared();
    let (log, func) = recorder(&sched);
    let on_resize = debounce(sched.clone(), 100, func);

    for width in [1200, 1100, 900, 760] {
        on_resize.call(width);
        sched.advance(30);
    }
    assert!(on_resize.is_pending());
    sched.run_until_idle();

    assert_eq!(*log.borrow(), vec![(190, 760)]);
}

#[test]
fn throttled_clicks_reopen_after_window() {
    let sched = ManualScheduler::shared();
    let (log, func) = recorder(&sched);
    let clicks = throttle(sched.clone(), 500, func);

    let accepted: Vec<bool> = (0..6)
        .map(|i| {
            let ok = clicks.call(i);
            sched.advance(200);
            ok
        })
        .collect();

    assert_eq!(accepted, vec![true, false, false, true, false, false]);
    assert_eq!(*log.borrow(), vec![(0, 0), (600, 3)]);
}

#[test]
fn idle_slot_fires_once_per_quiet_period() {
    let sched = ManualScheduler::shared();
    let dyn_sched: Rc<dyn Scheduler> = sched.clone();
    let slot = TaskSlot::new(dyn_sched);
    let hits = Rc::new(RefCell::new(Vec::new()));

    for burst_start in [0u64, 5000] {
        sched.advance_to(burst_start);
        for _ in 0..10 {
            let h = hits.clone();
            let clock = sched.clone();
            slot.arm(1000, move || h.borrow_mut().push(clock.now_ms()));
            sched.advance(100);
        }
    }
    sched.run_until_idle();
    assert_eq!(*hits.borrow(), vec![1900, 6900]);
}

#[test]
fn repeating_task_stops_from_inside() {
    let sched = ManualScheduler::shared();
    let dyn_sched: Rc<dyn Scheduler> = sched.clone();
    let runs = Rc::new(RefCell::new(0));
    let handle_cell = Rc::new(RefCell::new(None::<RepeatingHandle>));

    let r = runs.clone();
    let hc = handle_cell.clone();
    let handle = schedule_repeating(&dyn_sched, 50, move || {
        *r.borrow_mut() += 1;
        if *r.borrow() == 3 {
            if let Some(h) = hc.borrow().as_ref() {
                h.cancel();
            }
        }
    });
    *handle_cell.borrow_mut() = Some(handle.clone());

    sched.run_until_idle();
    assert_eq!(*runs.borrow(), 3);
    assert!(!handle.is_active());
    assert_eq!(sched.now_ms(), 150);
}
