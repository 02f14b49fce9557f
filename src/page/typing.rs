//! Hero title typing effect.
//!
//! One character per tick, then a caret that disappears after a while. The
//! chain is driven by scheduler tasks; a generation counter makes every task
//! from a previous run a no-op, so a restart can never interleave with the
//! chain it replaced.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::PageContext;
use crate::debug::{self, cat};
use crate::port::{ElementRef, Overlay, OverlayId};
use crate::scheduler::TaskHandle;

const CURSOR: char = '|';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingPhase {
    /// Waiting for the first character.
    Idle,
    /// This many characters are on screen.
    Typing(usize),
    /// Text complete, caret showing.
    Cursoring,
    Done,
}

struct State {
    ctx: PageContext,
    el: ElementRef,
    text: Vec<char>,
    phase: Cell<TypingPhase>,
    generation: Cell<u64>,
    pending: Cell<Option<TaskHandle>>,
    cursor: RefCell<Option<OverlayId>>,
}

pub struct Typewriter {
    state: Rc<State>,
}

impl Typewriter {
    pub fn new(ctx: PageContext, el: ElementRef, text: &str) -> Self {
        Self {
            state: Rc::new(State {
                ctx,
                el,
                text: text.chars().collect(),
                phase: Cell::new(TypingPhase::Idle),
                generation: Cell::new(0),
                pending: Cell::new(None),
                cursor: RefCell::new(None),
            }),
        }
    }

    /// Clear the title and type it again from the beginning after `delay_ms`.
    /// Anything still running from an earlier start is abandoned.
    pub fn start(&self, delay_ms: u32) {
        let s = &self.state;
        if let Some(handle) = s.pending.take() {
            s.ctx.sched.cancel(handle);
        }
        s.remove_cursor();

        let generation = s.generation.get() + 1;
        s.generation.set(generation);
        s.phase.set(TypingPhase::Idle);
        s.ctx.port.set_text(&s.el, "");
        debug::log(cat::TIMER, format!("typing run {generation} in {delay_ms}ms"));

        State::schedule_tick(s, delay_ms, generation, 0);
    }

    pub fn phase(&self) -> TypingPhase {
        self.state.phase.get()
    }

    pub fn text(&self) -> String {
        self.state.text.iter().collect()
    }
}

impl State {
    fn schedule_tick(this: &Rc<State>, delay_ms: u32, generation: u64, index: usize) {
        let weak = Rc::downgrade(this);
        let handle = this.ctx.sched.schedule(
            delay_ms,
            Box::new(move || State::tick(&weak, generation, index)),
        );
        this.pending.set(Some(handle));
    }

    fn tick(weak: &Weak<State>, generation: u64, index: usize) {
        let Some(this) = weak.upgrade() else { return };
        if this.generation.get() != generation {
            return;
        }
        this.pending.set(None);

        let char_ms = this.ctx.config.timing.typing_char_ms;
        match this.text.get(index) {
            Some(c) => {
                this.ctx.port.append_text(&this.el, c.encode_utf8(&mut [0; 4]));
                this.phase.set(TypingPhase::Typing(index + 1));
                State::schedule_tick(&this, char_ms, generation, index + 1);
            }
            None => this.show_cursor(generation),
        }
    }

    fn show_cursor(self: &Rc<Self>, generation: u64) {
        let id = self
            .ctx
            .port
            .append_overlay(&self.el, Overlay::Cursor { glyph: CURSOR });
        *self.cursor.borrow_mut() = Some(id);
        self.phase.set(TypingPhase::Cursoring);

        let weak = Rc::downgrade(self);
        let handle = self.ctx.sched.schedule(
            self.ctx.config.timing.cursor_ms,
            Box::new(move || {
                let Some(this) = weak.upgrade() else { return };
                if this.generation.get() != generation {
                    return;
                }
                this.pending.set(None);
                this.remove_cursor();
                this.phase.set(TypingPhase::Done);
                debug::log(cat::TIMER, format!("typing run {generation} done"));
            }),
        );
        self.pending.set(Some(handle));
    }

    fn remove_cursor(&self) {
        let cursor = self.cursor.borrow_mut().take();
        if let Some(id) = cursor {
            self.ctx.port.remove_overlay(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::PortCall;
    use crate::test_support::Harness;

    fn hero(h: &Harness, text: &str) -> Typewriter {
        Typewriter::new(h.ctx(), ".hero-title".into(), text)
    }

    #[test]
    fn types_one_char_per_tick_then_shows_cursor() {
        let h = Harness::new();
        let t = hero(&h, "Hi");
        let el = ElementRef::from(".hero-title");
        t.start(1000);
        assert_eq!(h.port.text_of(&el), "");

        h.sched.advance(1000);
        assert_eq!(h.port.text_of(&el), "H");
        assert_eq!(t.phase(), TypingPhase::Typing(1));
        h.sched.advance(50);
        assert_eq!(h.port.text_of(&el), "Hi");
        h.sched.advance(50);
        assert_eq!(t.phase(), TypingPhase::Cursoring);
        assert!(h.port.calls().iter().any(|c| matches!(
            c,
            PortCall::AppendOverlay { overlay: Overlay::Cursor { glyph: '|' }, .. }
        )));

        h.sched.advance(3000);
        assert_eq!(t.phase(), TypingPhase::Done);
        assert!(matches!(h.port.calls().last(), Some(PortCall::RemoveOverlay { .. })));
        assert_eq!(h.sched.pending_count(), 0);
    }

    #[test]
    fn multibyte_text_is_typed_by_scalar() {
        let h = Harness::new();
        let t = hero(&h, "Zoë ✓");
        t.start(0);
        h.sched.run_until_idle();
        assert_eq!(h.port.text_of(&".hero-title".into()), "Zoë ✓");
        assert_eq!(t.phase(), TypingPhase::Done);
    }

    #[test]
    fn restart_mid_chain_does_not_interleave() {
        let h = Harness::new();
        let t = hero(&h, "Hello");
        t.start(0);
        h.sched.advance(100);
        assert_eq!(h.port.text_of(&".hero-title".into()), "Hel");

        t.start(0);
        h.sched.run_until_idle();
        assert_eq!(h.port.text_of(&".hero-title".into()), "Hello");
        assert_eq!(t.phase(), TypingPhase::Done);
    }

    #[test]
    fn restart_while_cursoring_removes_old_cursor() {
        let h = Harness::new();
        let t = hero(&h, "A");
        t.start(0);
        h.sched.advance(50);
        assert_eq!(t.phase(), TypingPhase::Cursoring);

        t.start(10);
        assert!(matches!(
            h.port.calls().iter().rev().nth(1),
            Some(PortCall::RemoveOverlay { .. })
        ));
        h.sched.run_until_idle();
        assert_eq!(h.port.text_of(&".hero-title".into()), "A");
        let cursors = h
            .port
            .calls()
            .iter()
            .filter(|c| matches!(c, PortCall::AppendOverlay { .. }))
            .count();
        let removed = h
            .port
            .calls()
            .iter()
            .filter(|c| matches!(c, PortCall::RemoveOverlay { .. }))
            .count();
        assert_eq!((cursors, removed), (2, 2));
    }
}
