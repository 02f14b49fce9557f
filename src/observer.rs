//! Observation layer: one-shot "reveal on first scroll into view".
//!
//! An [`Observer`] tracks a set of watched elements. Visibility reports come
//! either from the browser's IntersectionObserver (via the web adapter) or
//! from plain geometry ([`Observer::check_geometry`]). The first time an
//! element is reported as entering the viewport its `on_enter` callback runs
//! exactly once and the element is untracked.
//!
//! When the host has no visibility primitive at all, observation degrades to
//! an immediate reveal of every element: content is never left hidden.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::debug::{self, cat};
use crate::port::ElementRef;
use crate::scheduler::Scheduler;

/// Whether the host can report viewport intersections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilitySupport {
    Available,
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserveOptions {
    /// Visible-area fraction (0..=1) that counts as "entered".
    pub threshold: f64,
    /// Adjustment to the viewport's bottom edge in px; negative shrinks it.
    pub margin_bottom_px: f64,
    /// Delay between consecutive reveals in the same batch.
    pub stagger_ms: u32,
}

impl ObserveOptions {
    pub fn new(threshold: f64, margin_bottom_px: f64, stagger_ms: u32) -> Self {
        let clamped = if threshold.is_nan() { 0.0 } else { threshold.clamp(0.0, 1.0) };
        if clamped != threshold {
            log::warn!("[observer] threshold {threshold} out of range, using {clamped}");
        }
        Self {
            threshold: clamped,
            margin_bottom_px,
            stagger_ms,
        }
    }

    /// CSS `rootMargin` string for the browser primitive.
    pub fn root_margin(&self) -> String {
        format!("0px 0px {}px 0px", self.margin_bottom_px)
    }
}

/// One visibility report for one element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub element: ElementRef,
    #[serde(default)]
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Viewport-relative bounding box (px), as from `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub left: f64,
    pub top: f64,
    #[serde(default)]
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Fraction of `rect` inside a viewport of `viewport_height`, whose bottom
/// edge is moved by `margin_bottom_px`.
pub fn visible_fraction(rect: &Rect, viewport_height: f64, margin_bottom_px: f64) -> f64 {
    let view_bottom = (viewport_height + margin_bottom_px).max(0.0);
    if rect.height <= 0.0 {
        return if rect.top >= 0.0 && rect.top <= view_bottom { 1.0 } else { 0.0 };
    }
    let visible = rect.bottom().min(view_bottom) - rect.top.max(0.0);
    (visible / rect.height).clamp(0.0, 1.0)
}

/// A tracked element and its one-shot flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchedElement {
    pub element: ElementRef,
    pub triggered: bool,
}

struct ObserverShared {
    name: &'static str,
    options: ObserveOptions,
    sched: Rc<dyn Scheduler>,
    watched: RefCell<Vec<WatchedElement>>,
    on_enter: Rc<dyn Fn(&ElementRef)>,
}

#[derive(Clone)]
pub struct Observer {
    shared: Rc<ObserverShared>,
}

impl Observer {
    /// Start watching `elements`.
    ///
    /// With [`VisibilitySupport::Unavailable`], `on_enter` runs right away for
    /// every element and nothing is tracked.
    pub fn observe(
        name: &'static str,
        elements: impl IntoIterator<Item = ElementRef>,
        options: ObserveOptions,
        support: VisibilitySupport,
        sched: Rc<dyn Scheduler>,
        on_enter: impl Fn(&ElementRef) + 'static,
    ) -> Self {
        let on_enter: Rc<dyn Fn(&ElementRef)> = Rc::new(on_enter);
        let mut watched = Vec::new();

        match support {
            VisibilitySupport::Available => {
                for element in elements {
                    if watched.iter().any(|w: &WatchedElement| w.element == element) {
                        continue;
                    }
                    watched.push(WatchedElement {
                        element,
                        triggered: false,
                    });
                }
                debug::log(cat::REVEAL, format!("{name}: watching {}", watched.len()));
            }
            VisibilitySupport::Unavailable => {
                log::info!("[observer] {name}: no visibility primitive, revealing immediately");
                for element in elements {
                    on_enter(&element);
                }
            }
        }

        Self {
            shared: Rc::new(ObserverShared {
                name,
                options,
                sched,
                watched: RefCell::new(watched),
                on_enter,
            }),
        }
    }

    pub fn options(&self) -> ObserveOptions {
        self.shared.options
    }

    /// Feed a batch of visibility reports.
    ///
    /// Each element entering for the first time is untracked and its reveal
    /// is scheduled at `batch index × stagger`. Returns how many fired.
    pub fn handle_entries(&self, entries: &[Intersection]) -> usize {
        let shared = &self.shared;
        let mut entered = Vec::new();
        {
            let mut watched = shared.watched.borrow_mut();
            for (index, entry) in entries.iter().enumerate() {
                if !entry.is_intersecting {
                    continue;
                }
                let Some(pos) = watched
                    .iter()
                    .position(|w| w.element == entry.element && !w.triggered)
                else {
                    continue;
                };
                let mut w = watched.remove(pos);
                w.triggered = true;
                entered.push((index, w.element));
            }
        }

        let fired = entered.len();
        for (index, element) in entered {
            let delay = (index as u32).saturating_mul(shared.options.stagger_ms);
            debug::log(
                cat::REVEAL,
                format!("{}: enter {element} (+{delay}ms)", shared.name),
            );
            if delay == 0 {
                (shared.on_enter)(&element);
            } else {
                let on_enter = shared.on_enter.clone();
                shared
                    .sched
                    .schedule(delay, Box::new(move || on_enter(&element)));
            }
        }
        fired
    }

    /// Compute intersections from bounding boxes and feed them in.
    pub fn check_geometry(&self, rects: &[(ElementRef, Rect)], viewport_height: f64) -> usize {
        let opts = self.shared.options;
        let entries: Vec<Intersection> = rects
            .iter()
            .map(|(element, rect)| {
                let ratio = visible_fraction(rect, viewport_height, opts.margin_bottom_px);
                Intersection {
                    element: element.clone(),
                    ratio,
                    is_intersecting: ratio > 0.0 && ratio >= opts.threshold,
                }
            })
            .collect();
        self.handle_entries(&entries)
    }

    pub fn is_watching(&self, element: &ElementRef) -> bool {
        self.shared
            .watched
            .borrow()
            .iter()
            .any(|w| &w.element == element)
    }

    pub fn watched_count(&self) -> usize {
        self.shared.watched.borrow().len()
    }

    pub fn watched(&self) -> Vec<ElementRef> {
        self.shared
            .watched
            .borrow()
            .iter()
            .map(|w| w.element.clone())
            .collect()
    }
}
