pub mod host;
pub mod trial;

use crate::physics::Body;
use host::{HostChannel, StudentWork};
use log::{debug, warn};
use trial::Trial;

/// Accumulates samples into the trial and forwards it to the host.
pub struct TrialReporter {
    trial: Trial,
    host: Box<dyn HostChannel>,
}

impl TrialReporter {
    pub fn new(host: Box<dyn HostChannel>) -> Self {
        Self::with_trial(Trial::new(), host)
    }

    pub fn with_trial(trial: Trial, host: Box<dyn HostChannel>) -> Self {
        Self { trial, host }
    }

    pub fn initialize(&mut self) {
        self.trial.initialize();
    }

    /// Append one sample per body, in `Body::ALL` order, then post the trial.
    pub fn record(&mut self, time: u32, readings: [f64; 2]) {
        for body in Body::ALL {
            self.trial.add_point(body, time, readings[body.index()]);
        }
        debug!("t={} hot={:.2} cold={:.2}", time, readings[0], readings[1]);

        if let Err(e) = self.host.post(&StudentWork::new(&self.trial)) {
            warn!("Dropped trial update at t={}: {}", time, e);
        }
    }

    pub fn trial(&self) -> &Trial {
        &self.trial
    }
}

#[cfg(test)]
mod tests {
    use super::host::testing::RecordingHost;
    use super::*;

    #[test]
    fn test_record_posts_accumulated_series() {
        let host = RecordingHost::default();
        let mut reporter = TrialReporter::with_trial(Trial::with_id(5), Box::new(host.clone()));
        reporter.record(0, [100.0, 5.0]);
        reporter.record(1, [90.0, 8.0]);

        assert_eq!(host.count(), 2);
        let last = host.last().unwrap();
        let hot = &last["studentData"]["trials"][0]["series"][0]["data"];
        assert_eq!(hot.as_array().unwrap().len(), 2);
        assert_eq!(hot[1]["x"], 1);
        assert_eq!(hot[1]["y"], 90.0);
    }

    #[test]
    fn test_host_failure_is_swallowed() {
        let host = RecordingHost {
            fail: true,
            ..Default::default()
        };
        let mut reporter = TrialReporter::with_trial(Trial::with_id(5), Box::new(host.clone()));
        reporter.record(0, [100.0, 5.0]);
        assert_eq!(host.count(), 0);
        assert_eq!(reporter.trial().series(Body::Hot).data.len(), 1);
    }
}
