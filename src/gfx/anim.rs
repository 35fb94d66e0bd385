use std::fmt;
use std::rc::Rc;

pub fn ease_in_out(t: f64) -> f64 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Maps linear progress in `[0,1]` to visual position in `[0,1]`.
#[derive(Clone)]
pub enum Easing {
    Linear,
    InOut,
    Curve(Rc<dyn Fn(f64) -> f64>),
}

impl Easing {
    pub fn curve(f: impl Fn(f64) -> f64 + 'static) -> Self {
        Easing::Curve(Rc::new(f))
    }

    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Easing::Linear => t,
            Easing::InOut => ease_in_out(t),
            Easing::Curve(f) => f(t),
        }
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => write!(f, "Linear"),
            Easing::InOut => write!(f, "InOut"),
            Easing::Curve(_) => write!(f, "Curve(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayState {
    Running,
    Paused { at: f64 },
    Finished,
    Stopped,
}

/// A fixed-duration animation driven by an external clock.
///
/// Cues are progress fractions that fire once each, in order, the first time
/// `update` observes progress at or past them. A cue skipped over by a long
/// frame still fires; several may fire from one `update`.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub start_time: f64,
    pub duration: f64,
    pub current_time: f64,
    easing: Easing,
    state: PlayState,
    cues: Vec<f64>,
    next_cue: usize,
}

impl Timeline {
    pub fn new(duration: f64) -> Self {
        Self {
            start_time: 0.0,
            duration,
            current_time: 0.0,
            easing: Easing::Linear,
            state: PlayState::Running,
            cues: Vec::new(),
            next_cue: 0,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Schedule `steps + 1` cues at `0, 1/steps, ..., 1`.
    pub fn with_cues(mut self, steps: u32) -> Self {
        let steps = steps.max(1);
        self.cues = (0..=steps).map(|k| k as f64 / steps as f64).collect();
        self.next_cue = 0;
        self
    }

    pub fn start(&mut self, now: f64) {
        self.start_time = now;
        self.current_time = now;
        self.state = PlayState::Running;
        self.next_cue = 0;
    }

    /// Advance to `now`, returning the indices of the cues crossed.
    pub fn update(&mut self, now: f64) -> Vec<usize> {
        if self.state != PlayState::Running {
            return Vec::new();
        }
        self.current_time = now.max(self.start_time);

        let progress = self.progress();
        let mut fired = Vec::new();
        while self.next_cue < self.cues.len() && self.cues[self.next_cue] <= progress {
            fired.push(self.next_cue);
            self.next_cue += 1;
        }
        if progress >= 1.0 {
            self.state = PlayState::Finished;
        }
        fired
    }

    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        let elapsed = self.current_time - self.start_time;
        (elapsed / self.duration).min(1.0).max(0.0)
    }

    pub fn eased_progress(&self) -> f64 {
        self.easing.apply(self.progress())
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Wall-clock instant at which progress reaches 1.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        matches!(self.state, PlayState::Paused { .. })
    }

    /// Returns false when the pause was not applicable.
    pub fn pause(&mut self, now: f64) -> bool {
        if self.state != PlayState::Running || self.is_complete() {
            return false;
        }
        self.state = PlayState::Paused { at: now };
        true
    }

    /// Shift the timeline forward by the time spent paused.
    pub fn resume(&mut self, now: f64) -> bool {
        let PlayState::Paused { at } = self.state else {
            return false;
        };
        if self.is_complete() {
            return false;
        }
        let paused_for = (now - at).max(0.0);
        self.start_time += paused_for;
        self.current_time += paused_for;
        self.state = PlayState::Running;
        true
    }

    /// Halt for good; pending cues are discarded.
    pub fn stop(&mut self) {
        self.state = PlayState::Stopped;
        self.next_cue = self.cues.len();
    }
}
