pub mod calibration;
pub mod fusion;
pub mod gate;
pub mod math;
pub mod settings;
pub mod shaping;
pub mod space;
pub mod types;

use calibration::{Calibration, CalibrationEvent, CalibrationState, Clock};
use fusion::GravityState;
use gate::InputQuery;
use glam::Vec3;
use settings::{GyroSettings, Stages};
use shaping::SampleHistory;
use types::{CalibrationValues, GyroAxes, GyroSample, ViewOptions};

/// Look is stretched on the corrected 4:3 display.
const ASPECT_RATIO_CORRECTION: f32 = 1.2;

/// Latest sensor readings and filter state.
#[derive(Debug, Clone, Default)]
struct MotionState {
    accel: Vec3,
    calibration: CalibrationValues,
    gravity: GravityState,
    history: SampleHistory,
    stick_moving: bool,
}

/// Gyro aiming pipeline.
///
/// Feed it gyro and accelerometer samples as they arrive, resolve the axes
/// once per frame, and read the turn and look deltas.
#[derive(Debug, Clone, Default)]
pub struct GyroMotion {
    enabled: bool,
    motion: MotionState,
    stages: Stages,
    calibration: Calibration,
    axes: GyroAxes,
}

impl GyroMotion {
    pub fn new(settings: &GyroSettings) -> Self {
        let mut gyro = Self::default();
        gyro.refresh_settings(settings);
        gyro
    }

    /// Re-derive every stage from `settings`. Call whenever settings change.
    pub fn refresh_settings(&mut self, settings: &GyroSettings) {
        self.enabled = settings.enable;
        self.stages = Stages::from_settings(settings);
        self.motion.calibration = settings.calibration;

        tracing::debug!(
            space = ?self.stages.space,
            smoothing = ?self.stages.smoothing,
            tightening = ?self.stages.tightening,
            acceleration = ?self.stages.acceleration,
            "Gyro settings refreshed"
        );
        tracing::debug!(
            a = self.motion.calibration.accel_magnitude,
            x = self.motion.calibration.gyro_offset.x,
            y = self.motion.calibration.gyro_offset.y,
            z = self.motion.calibration.gyro_offset.z,
            "Gyro calibration loaded"
        );
    }

    /// Whether gyro motion is integrated at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Process one gyro sample and integrate it into the axes.
    pub fn update_gyro(&mut self, sample: GyroSample) {
        if self.calibration.is_sampling() {
            self.calibration.add_gyro(sample.gyro);
        }

        if !self.enabled {
            return;
        }

        let delta_time = sample.delta_time;
        let gyro = sample.gyro - self.motion.calibration.gyro_offset;

        self.stages.gravity.update(
            &mut self.motion.gravity,
            gyro,
            self.motion.accel,
            self.motion.calibration.accel_magnitude,
            delta_time,
        );
        let gyro = self.stages.space.apply(gyro, self.motion.gravity.gravity);

        let pitch_yaw = self
            .stages
            .smoothing
            .apply(gyro.truncate(), delta_time, &mut self.motion.history);
        let pitch_yaw = self.stages.tightening.apply(pitch_yaw);
        let pitch_yaw = self.stages.acceleration.apply(pitch_yaw);

        self.axes.look += pitch_yaw.x * delta_time;
        self.axes.turn += pitch_yaw.y * delta_time;
    }

    /// Record the latest accelerometer sample.
    pub fn update_accel(&mut self, accel: Vec3) {
        self.motion.accel = accel;

        if self.calibration.is_sampling() {
            self.calibration.add_accel(accel);
        }
    }

    /// Camera stick deflection, consulted by the activation gate.
    pub fn set_stick_moving(&mut self, moving: bool) {
        self.motion.stick_moving = moving;
    }

    /// Resolve the accumulated axes for this frame and return them.
    ///
    /// A closed gate zeroes both axes. Otherwise turn is dropped while
    /// strafing and look follows the view options.
    pub fn calc_axes<I: InputQuery + ?Sized>(
        &mut self,
        input: &I,
        view: ViewOptions,
        strafe: bool,
    ) -> GyroAxes {
        if self.stages.gate.is_open(self.motion.stick_moving, input) {
            if strafe {
                self.axes.turn = 0.0;
            }
            if !view.look_enabled {
                self.axes.look = 0.0;
            } else if view.correct_aspect_ratio {
                self.axes.look /= ASPECT_RATIO_CORRECTION;
            }
        } else {
            self.axes = GyroAxes::default();
        }
        self.axes
    }

    /// Turn and look accumulated since the last reset.
    pub fn axes(&self) -> GyroAxes {
        self.axes
    }

    /// Zero the axes after the consumer has applied them.
    pub fn reset_axes(&mut self) {
        self.axes = GyroAxes::default();
    }

    /// Zero all transient state. Calibration and settings are kept.
    pub fn reset(&mut self) {
        self.reset_axes();
        let calibration = self.motion.calibration;
        self.motion = MotionState {
            calibration,
            ..MotionState::default()
        };
    }

    /// Current gravity estimate in device-local space.
    pub fn gravity(&self) -> Vec3 {
        self.motion.gravity.gravity
    }

    /// Recent accelerometer volatility seen by the gravity filter.
    pub fn shakiness(&self) -> f32 {
        self.motion.gravity.shakiness
    }

    /// Phase of the current calibration run.
    pub fn calibration_state(&self) -> CalibrationState {
        self.calibration.state()
    }

    /// Offsets currently applied to incoming samples.
    pub fn calibration_values(&self) -> CalibrationValues {
        self.motion.calibration
    }

    /// True when no calibration offsets are applied.
    pub fn is_default_calibration(&self) -> bool {
        self.motion.calibration.is_default()
    }

    /// Drop the current offsets and any run in progress.
    pub fn clear_calibration(&mut self) {
        self.calibration = Calibration::default();
        self.motion.calibration = CalibrationValues::default();
    }

    /// Start sampling for a new calibration. Ignored unless inactive.
    pub fn start_calibration<C: Clock + ?Sized>(&mut self, clock: &C) -> bool {
        if self.calibration.state() != CalibrationState::Inactive {
            return false;
        }
        self.clear_calibration();
        let started = self.calibration.start(clock.now_ms());
        if started {
            tracing::info!("Gyro calibration started");
        }
        started
    }

    /// Advance calibration timers. Poll once per frame.
    ///
    /// Returns the new values when a run finished with samples; they are
    /// already applied and should be persisted by the caller.
    pub fn update_calibration<C: Clock + ?Sized>(
        &mut self,
        clock: &C,
    ) -> Option<CalibrationValues> {
        match self.calibration.poll(clock.now_ms()) {
            CalibrationEvent::Finished(Some(values)) => {
                self.motion.calibration = values;
                tracing::info!(
                    a = values.accel_magnitude,
                    x = values.gyro_offset.x,
                    y = values.gyro_offset.y,
                    z = values.gyro_offset.z,
                    "Gyro calibration updated"
                );
                Some(values)
            }
            CalibrationEvent::Finished(None) => {
                tracing::warn!("Gyro calibration collected no samples");
                None
            }
            CalibrationEvent::Reset => {
                tracing::debug!("Gyro calibration idle");
                None
            }
            CalibrationEvent::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate::GyroAction;
    use space::GyroSpace;
    use std::cell::Cell;

    struct FakeClock(Cell<u64>);

    impl Clock for FakeClock {
        fn now_ms(&self) -> u64 {
            self.0.get()
        }
    }

    /// Player Turn with every shaping stage off and 1.0x sensitivity.
    fn plain_settings(space: GyroSpace) -> GyroSettings {
        GyroSettings {
            enable: true,
            space,
            button_action: GyroAction::None,
            stick_action: GyroAction::None,
            turn_sensitivity: 10,
            look_sensitivity: 10,
            acceleration: 10,
            smooth_threshold: 0,
            smooth_time: 0,
            tightening: 0,
            ..Default::default()
        }
    }

    #[test]
    fn player_turn_flat_yaw_integrates() {
        let mut gyro = GyroMotion::new(&plain_settings(GyroSpace::PlayerTurn));
        gyro.motion.gravity.gravity = Vec3::NEG_Y;
        gyro.update_gyro(GyroSample::new(0.1, 0.0, 1.0, 0.0));
        assert!((gyro.axes().turn - 0.1).abs() < 1e-6);
        assert_eq!(gyro.axes().look, 0.0);
    }

    #[test]
    fn player_turn_upright_yaw_has_no_world_component() {
        let mut gyro = GyroMotion::new(&plain_settings(GyroSpace::PlayerTurn));
        gyro.motion.gravity.gravity = Vec3::NEG_Z;
        gyro.update_gyro(GyroSample::new(0.1, 0.0, 1.0, 0.0));
        assert_eq!(gyro.axes().turn, 0.0);
    }

    #[test]
    fn player_lean_flat_roll_turns() {
        let roll = GyroSample::new(0.1, 0.0, 0.0, 1.0);

        let mut lean = GyroMotion::new(&plain_settings(GyroSpace::PlayerLean));
        lean.motion.gravity.gravity = Vec3::NEG_Y;
        lean.update_gyro(roll);
        assert!((lean.axes().turn - 0.1).abs() < 1e-5);
        assert_eq!(lean.axes().look, 0.0);

        // Player Turn ignores the same roll when flat.
        let mut turn = GyroMotion::new(&plain_settings(GyroSpace::PlayerTurn));
        turn.motion.gravity.gravity = Vec3::NEG_Y;
        turn.update_gyro(roll);
        assert!(turn.axes().turn.abs() < 1e-6);
    }

    #[test]
    fn local_space_never_touches_gravity() {
        let mut gyro = GyroMotion::new(&plain_settings(GyroSpace::LocalTurn));
        gyro.update_accel(Vec3::new(0.0, 1.0, 0.0));
        for _ in 0..100 {
            gyro.update_gyro(GyroSample::new(0.01, 0.3, 0.2, 0.1));
        }
        assert_eq!(gyro.gravity(), Vec3::ZERO);
        assert!((gyro.axes().turn - 0.2).abs() < 1e-4);
        assert!((gyro.axes().look - 0.3).abs() < 1e-4);
    }

    #[test]
    fn offset_is_subtracted_before_shaping() {
        let mut settings = plain_settings(GyroSpace::LocalTurn);
        settings.calibration.gyro_offset = Vec3::new(0.1, 0.1, 0.0);
        let mut gyro = GyroMotion::new(&settings);
        gyro.update_gyro(GyroSample::new(0.5, 0.1, 0.1, 0.0));
        assert_eq!(gyro.axes(), GyroAxes::default());
    }

    #[test]
    fn closed_gate_zeroes_axes() {
        let mut settings = plain_settings(GyroSpace::LocalTurn);
        settings.button_action = GyroAction::Enable;
        let mut gyro = GyroMotion::new(&settings);
        for _ in 0..10 {
            gyro.update_gyro(GyroSample::new(0.01, 2.0, -3.0, 0.0));
        }
        let axes = gyro.calc_axes(&false, ViewOptions::default(), false);
        assert_eq!(axes, GyroAxes::default());
        assert_eq!(gyro.axes(), GyroAxes::default());
    }

    #[test]
    fn open_gate_applies_view_options() {
        let mut gyro = GyroMotion::new(&plain_settings(GyroSpace::LocalTurn));
        gyro.update_gyro(GyroSample::new(0.1, 1.2, 1.0, 0.0));

        let axes = gyro.calc_axes(&false, ViewOptions::default(), true);
        assert_eq!(axes.turn, 0.0);
        assert!((axes.look - 0.1).abs() < 1e-6);

        gyro.reset_axes();
        gyro.update_gyro(GyroSample::new(0.1, 1.0, 1.0, 0.0));
        let view = ViewOptions {
            look_enabled: false,
            correct_aspect_ratio: true,
        };
        let axes = gyro.calc_axes(&false, view, false);
        assert!((axes.turn - 0.1).abs() < 1e-6);
        assert_eq!(axes.look, 0.0);
    }

    #[test]
    fn disabled_gyro_still_feeds_calibration() {
        let mut settings = plain_settings(GyroSpace::LocalTurn);
        settings.enable = false;
        let mut gyro = GyroMotion::new(&settings);
        let clock = FakeClock(Cell::new(0));
        assert!(gyro.start_calibration(&clock));

        for t in (0..=1000).step_by(10) {
            clock.0.set(t);
            gyro.update_accel(Vec3::new(0.0, 0.98, 0.0));
            gyro.update_gyro(GyroSample::new(0.01, 0.02, -0.01, 0.005));
            assert_eq!(gyro.update_calibration(&clock), None);
        }
        assert_eq!(gyro.axes(), GyroAxes::default());
        assert!(gyro.is_default_calibration());

        clock.0.set(1010);
        let values = gyro.update_calibration(&clock).unwrap();
        assert_eq!(gyro.calibration_state(), CalibrationState::Complete);
        assert!((values.accel_magnitude - 0.98).abs() < 1e-5);
        assert!((values.gyro_offset - Vec3::new(0.02, -0.01, 0.005)).length() < 1e-5);
        assert_eq!(gyro.calibration_values(), values);
        assert!(!gyro.is_default_calibration());

        clock.0.set(2011);
        assert_eq!(gyro.update_calibration(&clock), None);
        assert_eq!(gyro.calibration_state(), CalibrationState::Inactive);
    }

    #[test]
    fn start_is_ignored_while_running() {
        let mut gyro = GyroMotion::new(&GyroSettings::default());
        let clock = FakeClock(Cell::new(0));
        assert!(gyro.start_calibration(&clock));
        assert!(!gyro.start_calibration(&clock));
        gyro.clear_calibration();
        assert_eq!(gyro.calibration_state(), CalibrationState::Inactive);
        assert!(gyro.is_default_calibration());
    }

    #[test]
    fn reset_clears_transient_state_but_keeps_calibration() {
        let mut settings = plain_settings(GyroSpace::PlayerTurn);
        settings.calibration.accel_magnitude = 0.9;
        let mut gyro = GyroMotion::new(&settings);
        gyro.update_accel(Vec3::Y);
        gyro.set_stick_moving(true);
        for _ in 0..10 {
            gyro.update_gyro(GyroSample::new(0.01, 0.5, 0.5, 0.5));
        }
        gyro.reset();
        assert_eq!(gyro.axes(), GyroAxes::default());
        assert_eq!(gyro.gravity(), Vec3::ZERO);
        assert_eq!(gyro.shakiness(), 0.0);
        assert!(!gyro.motion.stick_moving);
        assert_eq!(gyro.calibration_values().accel_magnitude, 0.9);
    }
}
