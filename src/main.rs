mod camera;
mod trace;

use anyhow::{anyhow, Result};
use camera::Camera;
use gyroaim_config::{AppConfig, CalibrationConfig};
use gyroaim_motion::calibration::Clock;
use gyroaim_motion::types::ViewOptions;
use gyroaim_motion::GyroMotion;
use std::cell::Cell;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use trace::TraceEvent;

/// Clock driven by the timestamps recorded in the trace.
#[derive(Default)]
struct ReplayClock {
    now_ms: Cell<u64>,
}

impl ReplayClock {
    fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }
}

impl Clock for ReplayClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

/// Replay state: the pipeline plus the collaborators it expects around it.
struct Replay {
    config: AppConfig,
    config_path: PathBuf,
    gyro: GyroMotion,
    camera: Camera,
    clock: ReplayClock,
    view: ViewOptions,
    button_held: bool,
    frame_count: u64,
}

impl Replay {
    fn new(config: AppConfig, config_path: PathBuf) -> Self {
        let gyro = GyroMotion::new(&config.gyro.settings());
        let view = config.view.options();
        Self {
            config,
            config_path,
            gyro,
            camera: Camera::new(),
            clock: ReplayClock::default(),
            view,
            button_held: false,
            frame_count: 0,
        }
    }

    fn handle(&mut self, event: TraceEvent) {
        match event {
            TraceEvent::Gyro(sample) => self.gyro.update_gyro(sample),
            TraceEvent::Accel(accel) => self.gyro.update_accel(accel),
            TraceEvent::Stick(moving) => self.gyro.set_stick_moving(moving),
            TraceEvent::Button(held) => self.button_held = held,
            TraceEvent::Calibrate(now_ms) => {
                self.clock.set(now_ms);
                if self.gyro.start_calibration(&self.clock) {
                    // The core dropped its offsets; the stored ones go too.
                    self.config.gyro.calibration.clear();
                    self.save_config();
                } else {
                    warn!(now_ms, "Calibration already running, request ignored");
                }
            }
            TraceEvent::Frame(now_ms) => self.frame(now_ms),
        }
    }

    fn save_config(&self) {
        if let Err(e) = gyroaim_config::save_config_to(&self.config, &self.config_path) {
            error!(?e, path = ?self.config_path, "Failed to save config");
        }
    }

    fn frame(&mut self, now_ms: u64) {
        self.clock.set(now_ms);

        if let Some(values) = self.gyro.update_calibration(&self.clock) {
            self.config.gyro.calibration = CalibrationConfig::from_values(&values);
            self.save_config();
        }

        let axes = self.gyro.calc_axes(&self.button_held, self.view, false);
        self.camera.apply(axes);
        self.gyro.reset_axes();

        self.frame_count += 1;
        if self.frame_count % 300 == 0 {
            debug!(
                frames = self.frame_count,
                yaw = self.camera.yaw,
                pitch = self.camera.pitch,
                "Replay heartbeat"
            );
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gyroaim=info,gyroaim_motion=info,gyroaim_config=info".into()
            }),
        )
        .init();

    let path = std::env::args_os()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: gyroaim <trace-file>"))?;

    info!(?path, "Gyro replay starting");

    let config_path = gyroaim_config::config_path()?;
    let config = gyroaim_config::load_config_from(&config_path).unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let mut replay = Replay::new(config, config_path);
    if !replay.gyro.is_enabled() {
        warn!("Gyro aiming is disabled in config, only calibration will run");
    }

    let text = std::fs::read_to_string(&path)?;
    for event in trace::parse_trace(&text) {
        replay.handle(event?);
    }

    let orientation = replay.camera.orientation();
    info!(
        frames = replay.frame_count,
        yaw_deg = replay.camera.yaw.to_degrees(),
        pitch_deg = replay.camera.pitch.to_degrees(),
        ?orientation,
        default_calibration = replay.gyro.is_default_calibration(),
        "Replay finished"
    );

    Ok(())
}
