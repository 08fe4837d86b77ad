use glam::Vec3;
use gyroaim_motion::types::GyroSample;
use thiserror::Error;

/// One recorded input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TraceEvent {
    Gyro(GyroSample),
    Accel(Vec3),
    /// Camera stick moving or not.
    Stick(bool),
    /// Gyro button held or not.
    Button(bool),
    /// Calibration requested at the given time (ms).
    Calibrate(u64),
    /// Frame boundary at the given time (ms).
    Frame(u64),
}

#[derive(Debug, Error, PartialEq)]
pub enum TraceError {
    #[error("line {line}: unknown event `{kind}`")]
    UnknownEvent { line: usize, kind: String },
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid number `{value}`")]
    InvalidNumber { line: usize, value: String },
}

/// Parse a whole trace. Blank lines and `#` comments are skipped.
pub fn parse_trace(text: &str) -> impl Iterator<Item = Result<TraceEvent, TraceError>> + '_ {
    text.lines().enumerate().filter_map(|(i, line)| {
        let line_no = i + 1;
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            tracing::trace!(line = line_no, "Skipping empty trace line");
            return None;
        }
        Some(parse_line(line_no, line))
    })
}

fn parse_line(line: usize, text: &str) -> Result<TraceEvent, TraceError> {
    let mut fields = text.split_whitespace();
    let kind = fields.next().unwrap_or_default();
    let args: Vec<&str> = fields.collect();

    let expect = |expected: usize| -> Result<(), TraceError> {
        if args.len() == expected {
            Ok(())
        } else {
            Err(TraceError::FieldCount {
                line,
                expected,
                found: args.len(),
            })
        }
    };
    let float = |value: &str| -> Result<f32, TraceError> {
        value.parse().map_err(|_| TraceError::InvalidNumber {
            line,
            value: value.to_string(),
        })
    };
    let int = |value: &str| -> Result<u64, TraceError> {
        value.parse().map_err(|_| TraceError::InvalidNumber {
            line,
            value: value.to_string(),
        })
    };

    match kind {
        "gyro" => {
            expect(4)?;
            Ok(TraceEvent::Gyro(GyroSample::new(
                float(args[0])?,
                float(args[1])?,
                float(args[2])?,
                float(args[3])?,
            )))
        }
        "accel" => {
            expect(3)?;
            Ok(TraceEvent::Accel(Vec3::new(
                float(args[0])?,
                float(args[1])?,
                float(args[2])?,
            )))
        }
        "stick" => {
            expect(1)?;
            Ok(TraceEvent::Stick(int(args[0])? != 0))
        }
        "button" => {
            expect(1)?;
            Ok(TraceEvent::Button(int(args[0])? != 0))
        }
        "calibrate" => {
            expect(1)?;
            Ok(TraceEvent::Calibrate(int(args[0])?))
        }
        "frame" => {
            expect(1)?;
            Ok(TraceEvent::Frame(int(args[0])?))
        }
        other => Err(TraceError::UnknownEvent {
            line,
            kind: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_event_kinds() {
        let text = "\
# recorded on a desk
accel 0 1 0
gyro 0.01 0.1 -0.2 0.3

stick 1
button 0
calibrate 500
frame 516 # end of first frame
";
        let events: Vec<_> = parse_trace(text).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            events,
            vec![
                TraceEvent::Accel(Vec3::new(0.0, 1.0, 0.0)),
                TraceEvent::Gyro(GyroSample::new(0.01, 0.1, -0.2, 0.3)),
                TraceEvent::Stick(true),
                TraceEvent::Button(false),
                TraceEvent::Calibrate(500),
                TraceEvent::Frame(516),
            ]
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        let mut events = parse_trace("frame 1\njump 3\naccel 1 2\ngyro 0.1 a 0 0\n");
        assert_eq!(events.next(), Some(Ok(TraceEvent::Frame(1))));
        assert_eq!(
            events.next(),
            Some(Err(TraceError::UnknownEvent {
                line: 2,
                kind: "jump".into()
            }))
        );
        assert_eq!(
            events.next(),
            Some(Err(TraceError::FieldCount {
                line: 3,
                expected: 3,
                found: 2
            }))
        );
        assert_eq!(
            events.next(),
            Some(Err(TraceError::InvalidNumber {
                line: 4,
                value: "a".into()
            }))
        );
        assert!(events.next().is_none());
    }
}
