use crate::math::{between, clamp_vec};
use crate::types::CalibrationValues;
use glam::Vec3;
use std::time::Instant;

/// Length of the sampling window and of the completion cool-down.
pub const CALIBRATION_WINDOW_MS: u64 = 1000;

/// Millisecond wall clock used for calibration timing.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Monotonic clock measured from its own creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalibrationState {
    #[default]
    Inactive,
    Active,
    Complete,
}

/// Sample accumulator for one calibration run.
#[derive(Debug, Clone, Default)]
pub struct Calibration {
    state: CalibrationState,
    start_time: u64,
    finish_time: u64,
    accel_count: u32,
    gyro_count: u32,
    accel_sum: f32,
    gyro_sum: Vec3,
}

/// What a poll did to the calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationEvent {
    /// Nothing changed.
    None,
    /// Sampling window closed. Carries the new values when any samples arrived.
    Finished(Option<CalibrationValues>),
    /// Cool-down over, back to inactive.
    Reset,
}

impl Calibration {
    pub fn state(&self) -> CalibrationState {
        self.state
    }

    /// Whether incoming samples should be accumulated.
    pub fn is_sampling(&self) -> bool {
        self.state == CalibrationState::Active
    }

    /// Begin a new run. Only valid from `Inactive`; returns whether it started.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.state != CalibrationState::Inactive {
            return false;
        }
        *self = Self {
            state: CalibrationState::Active,
            start_time: now_ms,
            ..Self::default()
        };
        true
    }

    pub fn add_accel(&mut self, accel: Vec3) {
        self.accel_count += 1;
        self.accel_sum += accel.length();
    }

    pub fn add_gyro(&mut self, gyro: Vec3) {
        self.gyro_count += 1;
        self.gyro_sum += gyro;
    }

    /// Averages of the collected samples, clamped to sane bounds.
    pub fn result(&self) -> Option<CalibrationValues> {
        if self.accel_count == 0 || self.gyro_count == 0 {
            return None;
        }
        let accel_magnitude = between(0.0, 2.0, self.accel_sum / self.accel_count as f32);
        let gyro_offset = clamp_vec(-1.0, 1.0, self.gyro_sum / self.gyro_count as f32);
        Some(CalibrationValues {
            accel_magnitude,
            gyro_offset,
        })
    }

    /// Advance the timers.
    pub fn poll(&mut self, now_ms: u64) -> CalibrationEvent {
        match self.state {
            CalibrationState::Inactive => CalibrationEvent::None,
            CalibrationState::Active => {
                if now_ms.saturating_sub(self.start_time) > CALIBRATION_WINDOW_MS {
                    let values = self.result();
                    self.state = CalibrationState::Complete;
                    self.finish_time = now_ms;
                    tracing::debug!(
                        accel_count = self.accel_count,
                        gyro_count = self.gyro_count,
                        "Calibration window closed"
                    );
                    CalibrationEvent::Finished(values)
                } else {
                    CalibrationEvent::None
                }
            }
            CalibrationState::Complete => {
                if now_ms.saturating_sub(self.finish_time) > CALIBRATION_WINDOW_MS {
                    self.state = CalibrationState::Inactive;
                    CalibrationEvent::Reset
                } else {
                    CalibrationEvent::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_tracks_elapsed_time() {
        let clock = SystemClock::new();
        let clock: &dyn Clock = &clock;
        let before = clock.now_ms();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let after = clock.now_ms();
        assert!(after >= before + 20);
    }

    #[test]
    fn full_cycle_timing() {
        let mut cal = Calibration::default();
        assert!(cal.start(0));
        assert!(!cal.start(5));

        let mut t = 0;
        while t <= 1000 {
            cal.add_gyro(Vec3::new(0.01, 0.0, 0.0));
            cal.add_accel(Vec3::new(0.0, 1.0, 0.0));
            assert_eq!(cal.poll(t), CalibrationEvent::None);
            t += 10;
        }
        assert_eq!(cal.state(), CalibrationState::Active);

        match cal.poll(1010) {
            CalibrationEvent::Finished(Some(values)) => {
                assert!((values.accel_magnitude - 1.0).abs() < 1e-5);
                assert!((values.gyro_offset.x - 0.01).abs() < 1e-5);
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(cal.state(), CalibrationState::Complete);
        assert!(!cal.is_sampling());

        assert_eq!(cal.poll(2010), CalibrationEvent::None);
        assert_eq!(cal.poll(2011), CalibrationEvent::Reset);
        assert_eq!(cal.state(), CalibrationState::Inactive);
    }

    #[test]
    fn empty_window_yields_no_values() {
        let mut cal = Calibration::default();
        cal.start(100);
        cal.add_accel(Vec3::Y);
        assert_eq!(cal.poll(1101), CalibrationEvent::Finished(None));
    }

    #[test]
    fn results_are_clamped() {
        let mut cal = Calibration::default();
        cal.start(0);
        cal.add_accel(Vec3::new(0.0, 5.0, 0.0));
        cal.add_gyro(Vec3::new(3.0, -3.0, 0.5));
        let values = cal.result().unwrap();
        assert_eq!(values.accel_magnitude, 2.0);
        assert_eq!(values.gyro_offset, Vec3::new(1.0, -1.0, 0.5));
    }
}
