//! Smoothing, tightening and acceleration of the (pitch, yaw) signal.
//!
//! Each stage is picked once per settings refresh. The `Skip` variants are
//! what a disabled stage runs per sample.
//!
//! Based on the gyro write-up by Julian "Jibb" Smart:
//! <http://gyrowiki.jibbsmart.com/blog:good-gyro-controls-part-1:the-gyro-is-a-mouse>

use crate::math::{between, ramp};
use glam::Vec2;

/// Capacity of the smoothing history.
pub const NUM_SAMPLES: usize = 256;

/// Ring buffer of to-be-smoothed (pitch, yaw) contributions.
#[derive(Debug, Clone)]
pub struct SampleHistory {
    samples: [Vec2; NUM_SAMPLES],
    index: usize,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self {
            samples: [Vec2::ZERO; NUM_SAMPLES],
            index: 0,
        }
    }
}

impl SampleHistory {
    /// Push the newest value and average the last `window` values.
    ///
    /// The newest sample sits at `index`; older ones follow it.
    pub fn push_and_average(&mut self, value: Vec2, window: usize) -> Vec2 {
        self.index = (self.index + NUM_SAMPLES - 1) % NUM_SAMPLES;
        self.samples[self.index] = value;

        let window = window.clamp(1, NUM_SAMPLES);
        let sum: Vec2 = (0..window)
            .map(|i| self.samples[(self.index + i) % NUM_SAMPLES])
            .sum();
        sum / window as f32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Smoothing {
    #[default]
    Skip,
    Full {
        /// Below this speed everything is smoothed (rad/s).
        lower: f32,
        /// Above this speed nothing is smoothed (rad/s).
        upper: f32,
        /// Averaging window (s).
        time: f32,
    },
}

impl Smoothing {
    /// Build from an upper threshold (rad/s) and window (s).
    ///
    /// The stage only runs when both are positive.
    pub fn new(upper: f32, time: f32) -> Self {
        if upper > 0.0 && time > 0.0 {
            Smoothing::Full {
                lower: upper * 0.5,
                upper,
                time,
            }
        } else {
            Smoothing::Skip
        }
    }

    pub fn apply(&self, input: Vec2, delta_time: f32, history: &mut SampleHistory) -> Vec2 {
        let Smoothing::Full { lower, upper, time } = *self else {
            return input;
        };

        let raw_factor = ramp(lower, upper, input.length());
        let raw = input * raw_factor;

        let delta_time = between(1.0e-6, time, delta_time);
        let window = (time / delta_time).round() as usize;
        let smooth = history.push_and_average(input * (1.0 - raw_factor), window);

        raw + smooth
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Tightening {
    #[default]
    Skip,
    Full { threshold: f32 },
}

impl Tightening {
    pub fn new(threshold: f32) -> Self {
        if threshold > 0.0 {
            Tightening::Full { threshold }
        } else {
            Tightening::Skip
        }
    }

    /// Scale factor applied to a signal of the given magnitude.
    pub fn factor(&self, magnitude: f32) -> f32 {
        match *self {
            Tightening::Full { threshold } if magnitude < threshold => magnitude / threshold,
            _ => 1.0,
        }
    }

    pub fn apply(&self, input: Vec2) -> Vec2 {
        match self {
            Tightening::Skip => input,
            Tightening::Full { .. } => input * self.factor(input.length()),
        }
    }
}

/// Sensitivity curve. `Skip` still applies the base sensitivity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Acceleration {
    Skip {
        /// (pitch, yaw) multipliers.
        sensitivity: Vec2,
    },
    Full {
        min_sensitivity: Vec2,
        max_sensitivity: Vec2,
        min_thresh: f32,
        max_thresh: f32,
    },
}

impl Default for Acceleration {
    fn default() -> Self {
        Acceleration::Skip {
            sensitivity: Vec2::ONE,
        }
    }
}

impl Acceleration {
    pub fn apply(&self, input: Vec2) -> Vec2 {
        match *self {
            Acceleration::Skip { sensitivity } => input * sensitivity,
            Acceleration::Full {
                min_sensitivity,
                max_sensitivity,
                min_thresh,
                max_thresh,
            } => {
                let magnitude = (input.length() - min_thresh).max(0.0);
                let denom = max_thresh - min_thresh;
                let accel = if denom <= 0.0 {
                    if magnitude > 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                } else {
                    between(0.0, 1.0, magnitude / denom)
                };
                input * (min_sensitivity * (1.0 - accel) + max_sensitivity * accel)
            }
        }
    }
}
