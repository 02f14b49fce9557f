//! Headless replay of a scripted page session.
//!
//! A scenario describes the page (inventory, viewport) and a list of events
//! stamped with virtual times. Replay drives a [`Site`] on the
//! [`ManualScheduler`] and collects every port call with the virtual time it
//! happened at.

use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::SiteConfig;
use crate::flags::PageFlags;
use crate::observer::VisibilitySupport;
use crate::page::PageContext;
use crate::port::{PortCall, RecordingPort};
use crate::scheduler::{ManualScheduler, Scheduler};
use crate::site::{PageEvent, PageInventory, Site, StartOptions};

fn default_viewport_width() -> u32 {
    1280
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: PageEvent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,
    #[serde(default = "default_true")]
    pub observer_available: bool,
    #[serde(default)]
    pub flags: PageFlags,
    #[serde(default)]
    pub inventory: PageInventory,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(s).context("invalid scenario")?;
        scenario.check()?;
        Ok(scenario)
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(s).context("invalid scenario")?;
        scenario.check()?;
        Ok(scenario)
    }

    /// Load by extension: `.json` is JSON, anything else TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_toml_str(&raw)
        };
        parsed.with_context(|| format!("in {}", path.display()))
    }

    fn check(&self) -> Result<()> {
        if self.viewport_width == 0 {
            bail!("viewport_width must be positive");
        }
        for pair in self.steps.windows(2) {
            if pair[1].at_ms < pair[0].at_ms {
                bail!(
                    "steps must be in time order ({}ms listed after {}ms)",
                    pair[1].at_ms,
                    pair[0].at_ms
                );
            }
        }
        Ok(())
    }
}

/// One port call and when it happened.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimedCall {
    pub at_ms: u64,
    #[serde(flatten)]
    pub call: PortCall,
}

#[derive(Clone, Copy, Debug)]
pub struct ReplayOptions {
    /// Run pending timers after the last step until nothing is left.
    pub drain: bool,
    /// Override the scenario and pretend the page has no intersection feed.
    pub force_no_observer: bool,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            drain: true,
            force_no_observer: false,
        }
    }
}

struct Recorder {
    sched: Rc<ManualScheduler>,
    port: Rc<RecordingPort>,
    out: Vec<TimedCall>,
}

impl Recorder {
    fn collect(&mut self) {
        let at_ms = self.sched.now_ms();
        self.out.extend(
            self.port
                .take_calls()
                .into_iter()
                .map(|call| TimedCall { at_ms, call }),
        );
    }

    /// Advance to `target`, stamping calls with the time of the task that made them.
    fn run_until(&mut self, target: u64) {
        while self.sched.run_next_until(target).is_some() {
            self.collect();
        }
        self.sched.advance_to(target);
    }
}

pub fn replay(
    scenario: &Scenario,
    config: SiteConfig,
    options: ReplayOptions,
) -> Result<Vec<TimedCall>> {
    config.validate()?;
    let sched = ManualScheduler::shared();
    let port = Rc::new(RecordingPort::new());
    let ctx = PageContext::new(
        port.clone(),
        port.clone(),
        sched.clone(),
        Rc::new(config),
        scenario.viewport_width,
    );
    let support = if scenario.observer_available && !options.force_no_observer {
        VisibilitySupport::Available
    } else {
        VisibilitySupport::Unavailable
    };

    let mut rec = Recorder {
        sched: sched.clone(),
        port: port.clone(),
        out: Vec::new(),
    };

    let site = Site::start(
        ctx,
        scenario.inventory.clone(),
        StartOptions {
            flags: scenario.flags,
            support,
            viewport_width: scenario.viewport_width,
            scroll_y: 0.0,
        },
    );
    rec.collect();

    for step in &scenario.steps {
        rec.run_until(step.at_ms);
        log::debug!("t={}ms {:?}", step.at_ms, step.event);
        site.handle(step.event.clone());
        rec.collect();
    }

    if options.drain {
        let mut steps = 0;
        while let Some(due) = sched.next_due() {
            steps += 1;
            if steps > crate::scheduler::MAX_IDLE_STEPS {
                bail!("scenario never goes idle (still running at {due}ms)");
            }
            rec.run_until(due);
        }
    }
    Ok(rec.out)
}

/// One line per call, for terminal output.
pub fn format_text(calls: &[TimedCall]) -> String {
    let mut out = String::new();
    for call in calls {
        let body = serde_json::to_string(&call.call).unwrap_or_else(|_| format!("{:?}", call.call));
        out.push_str(&format!("{:>7}ms  {body}\n", call.at_ms));
    }
    out
}
