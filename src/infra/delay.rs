use log::trace;
use std::thread;
use std::time::Duration;

/// Host steps that are followed by a pause so the explorer view can catch up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStep {
    Focus,
    SelectAll,
    Collapse,
    Reveal,
    Expand,
}

pub trait DelayPolicy {
    fn pause(&self, after: HostStep);
}

/// Sleeps for a fixed time after each step.
#[derive(Debug, Clone)]
pub struct FixedDelays {
    focus: Duration,
    select_all: Duration,
    collapse: Duration,
    reveal: Duration,
    expand: Duration,
}

impl Default for FixedDelays {
    fn default() -> Self {
        Self {
            focus: Duration::from_millis(200),
            select_all: Duration::from_millis(100),
            collapse: Duration::from_millis(100),
            reveal: Duration::from_millis(100),
            expand: Duration::from_millis(50),
        }
    }
}

impl FixedDelays {
    pub fn scaled(factor: f64) -> Self {
        let base = Self::default();
        let scale = |d: Duration| d.mul_f64(factor.max(0.0));
        Self {
            focus: scale(base.focus),
            select_all: scale(base.select_all),
            collapse: scale(base.collapse),
            reveal: scale(base.reveal),
            expand: scale(base.expand),
        }
    }

    pub fn duration_for(&self, step: HostStep) -> Duration {
        match step {
            HostStep::Focus => self.focus,
            HostStep::SelectAll => self.select_all,
            HostStep::Collapse => self.collapse,
            HostStep::Reveal => self.reveal,
            HostStep::Expand => self.expand,
        }
    }
}

impl DelayPolicy for FixedDelays {
    fn pause(&self, after: HostStep) {
        let duration = self.duration_for(after);
        if duration.is_zero() {
            return;
        }
        trace!("Pausing {:?} after {:?}", duration, after);
        thread::sleep(duration);
    }
}

pub struct NoDelay;

impl DelayPolicy for NoDelay {
    fn pause(&self, _after: HostStep) {}
}

pub fn create_delay_policy(no_delay: bool, scale: f64) -> Box<dyn DelayPolicy> {
    if no_delay {
        Box::new(NoDelay)
    } else {
        Box::new(FixedDelays::scaled(scale))
    }
}
