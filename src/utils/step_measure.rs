use log::{debug, log_enabled, Level};
use std::time::{Duration, Instant};

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let secs = duration.as_secs();
    let millis_rem = duration.subsec_millis();

    if millis < 1_000 {
        format!("{millis} ms")
    } else {
        format!("{secs}.{millis_rem:03} s")
    }
}

/// Logs the duration of consecutive load steps on debug level.
pub struct StepMeasure {
    enabled: bool,
    step: String,
    start: Instant,
}

impl StepMeasure {
    pub fn new(step: &str) -> Self {
        Self {
            enabled: log_enabled!(Level::Debug),
            step: step.to_string(),
            start: Instant::now(),
        }
    }

    pub fn tick(&mut self, next_step: &str) {
        if self.enabled {
            debug!("{} took {}", self.step, format_duration(self.start.elapsed()));
            self.step = next_step.to_string();
            self.start = Instant::now();
        }
    }

    pub fn stop(&mut self) {
        if self.enabled {
            debug!("{} took {}", self.step, format_duration(self.start.elapsed()));
            self.enabled = false;
        }
    }
}

impl Drop for StepMeasure {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::utils::step_measure::format_duration;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(15)), "15 ms");
        assert_eq!(format_duration(Duration::from_millis(2_045)), "2.045 s");
    }
}
