use crate::config::TimeSteppingConfig;
use crate::error::{Error, Result};
use crate::utils::units::{seconds_to_years, years_to_seconds};

/// Uniform partition of [0, end_time] into `num_steps` steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSchedule {
    end_time: f64,
    num_steps: usize,
}

impl TimeSchedule {
    /// # Arguments
    /// * `end_time` - Final time (seconds)
    /// * `num_steps` - Number of equal steps
    pub fn new(end_time: f64, num_steps: usize) -> Result<Self> {
        if !(end_time > 0.0) || !end_time.is_finite() {
            return Err(Error::config(format!("end time must be positive, got {}", end_time)));
        }
        if num_steps == 0 {
            return Err(Error::config("number of time steps must be positive"));
        }
        Ok(Self { end_time, num_steps })
    }

    pub fn from_config(config: &TimeSteppingConfig) -> Result<Self> {
        Self::new(config.end_time_seconds(), config.num_steps)
    }

    pub fn end_time(&self) -> f64 {
        self.end_time
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn dt(&self) -> f64 {
        self.end_time / self.num_steps as f64
    }

    /// Time at the end of step `k` (1-based); `time_at(num_steps)` is exactly `end_time`
    pub fn time_at(&self, k: usize) -> f64 {
        if k >= self.num_steps {
            self.end_time
        } else {
            self.end_time * k as f64 / self.num_steps as f64
        }
    }

    /// End times of steps 1..=num_steps
    pub fn step_times(&self) -> impl Iterator<Item = f64> + '_ {
        (1..=self.num_steps).map(move |k| self.time_at(k))
    }

    pub fn end_time_years(&self) -> f64 {
        seconds_to_years(self.end_time)
    }
}

impl Default for TimeSchedule {
    /// 10 years in 10 steps
    fn default() -> Self {
        Self { end_time: years_to_seconds(10.0), num_steps: 10 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::units::SECONDS_PER_YEAR;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_schedule() {
        let schedule = TimeSchedule::default();
        assert_eq!(schedule.num_steps(), 10);
        assert_relative_eq!(schedule.dt(), SECONDS_PER_YEAR);
        assert_relative_eq!(schedule.end_time_years(), 10.0);
        assert_eq!(schedule, TimeSchedule::from_config(&TimeSteppingConfig::default()).unwrap());
    }

    #[test]
    fn test_step_times_end_exactly() {
        let schedule = TimeSchedule::new(1.0, 3).unwrap();
        let times: Vec<f64> = schedule.step_times().collect();
        assert_eq!(times.len(), 3);
        assert_relative_eq!(times[0], 1.0 / 3.0);
        assert_eq!(*times.last().unwrap(), 1.0);
    }

    #[test]
    fn test_invalid_schedules() {
        assert!(TimeSchedule::new(0.0, 10).is_err());
        assert!(TimeSchedule::new(-1.0, 10).is_err());
        assert!(TimeSchedule::new(f64::NAN, 10).is_err());
        assert!(TimeSchedule::new(1.0, 0).is_err());
    }
}
