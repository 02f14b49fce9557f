//! Scroll-triggered reveals: skill bars, section fade-ins, lazy images.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::PageContext;
use crate::observer::{ObserveOptions, Observer, Rect, VisibilitySupport};
use crate::port::ElementRef;

/// A skill bar and the fill width (percent) it animates to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBar {
    pub element: ElementRef,
    /// Raw `data-width` value; bars without one are left alone.
    #[serde(default)]
    pub width: Option<String>,
}

pub struct SkillBars {
    observer: Observer,
}

impl SkillBars {
    pub fn observe(ctx: &PageContext, bars: Vec<SkillBar>, support: VisibilitySupport) -> Self {
        let reveal = &ctx.config.reveal;
        let options = ObserveOptions::new(reveal.skill_threshold, reveal.margin_bottom_px, 0);
        let widths: HashMap<ElementRef, String> = bars
            .iter()
            .filter_map(|b| {
                let width = b.width.as_deref()?.trim();
                (!width.is_empty()).then(|| (b.element.clone(), width.to_string()))
            })
            .collect();

        let port = ctx.port.clone();
        let sched = ctx.sched.clone();
        let delay = ctx.config.timing.skill_bar_delay_ms;
        let observer = Observer::observe(
            "skill-bars",
            bars.into_iter().map(|b| b.element),
            options,
            support,
            ctx.sched.clone(),
            move |el| {
                let Some(width) = widths.get(el) else { return };
                let port = port.clone();
                let el = el.clone();
                let value = format!("{width}%");
                sched.schedule(
                    delay,
                    Box::new(move || port.set_style(&el, "width", &value)),
                );
            },
        );
        Self { observer }
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

const HIDDEN_OFFSET: &str = "translateY(30px)";
const TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";

/// Staggered fade-in of content blocks.
pub struct SectionReveal {
    observer: Observer,
}

impl SectionReveal {
    pub fn observe(ctx: &PageContext, items: Vec<ElementRef>, support: VisibilitySupport) -> Self {
        let reveal = &ctx.config.reveal;
        let options = ObserveOptions::new(
            reveal.section_threshold,
            reveal.margin_bottom_px,
            ctx.config.timing.reveal_stagger_ms,
        );

        for el in &items {
            ctx.port.set_style(el, "opacity", "0");
            ctx.port.set_style(el, "transform", HIDDEN_OFFSET);
            ctx.port.set_style(el, "transition", TRANSITION);
        }

        let port = ctx.port.clone();
        let observer = Observer::observe(
            "sections",
            items,
            options,
            support,
            ctx.sched.clone(),
            move |el| {
                port.set_style(el, "opacity", "1");
                port.set_style(el, "transform", "translateY(0)");
            },
        );
        Self { observer }
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

pub struct LazyImages {
    observer: Observer,
}

impl LazyImages {
    pub fn observe(ctx: &PageContext, images: Vec<ElementRef>, support: VisibilitySupport) -> Self {
        let reveal = &ctx.config.reveal;
        let options = ObserveOptions::new(reveal.lazy_threshold, 0.0, 0);
        let port = ctx.port.clone();
        let observer = Observer::observe(
            "lazy-images",
            images,
            options,
            support,
            ctx.sched.clone(),
            move |el| {
                port.load_image(el);
                port.set_class(el, "lazy", false);
            },
        );
        Self { observer }
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }
}

/// Geometry-driven check for hosts without an intersection primitive feed.
pub(crate) fn feed_geometry(
    observer: &Observer,
    rects: &[(ElementRef, Rect)],
    viewport_height: f64,
) -> usize {
    let watched = observer.watched();
    let relevant: Vec<(ElementRef, Rect)> = rects
        .iter()
        .filter(|(el, _)| watched.contains(el))
        .cloned()
        .collect();
    if relevant.is_empty() {
        return 0;
    }
    observer.check_geometry(&relevant, viewport_height)
}
