//! Shared fixtures for unit tests.

use std::rc::Rc;

use crate::config::SiteConfig;
use crate::page::PageContext;
use crate::port::RecordingPort;
use crate::scheduler::ManualScheduler;

pub(crate) struct Harness {
    pub sched: Rc<ManualScheduler>,
    pub port: Rc<RecordingPort>,
    pub config: Rc<SiteConfig>,
    ctx: PageContext,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SiteConfig::default(), 1280)
    }

    pub fn with_config(config: SiteConfig, viewport_width: u32) -> Self {
        let sched = ManualScheduler::shared();
        let port = Rc::new(RecordingPort::new());
        let config = Rc::new(config);
        let ctx = PageContext::new(
            port.clone(),
            port.clone(),
            sched.clone(),
            config.clone(),
            viewport_width,
        );
        Self {
            sched,
            port,
            config,
            ctx,
        }
    }

    pub fn ctx(&self) -> PageContext {
        self.ctx.clone()
    }
}
