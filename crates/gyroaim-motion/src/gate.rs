/// What holding an input does to gyro aiming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GyroAction {
    /// Input has no effect.
    #[default]
    None,
    /// Gyro is off while held.
    Disable,
    /// Gyro is on only while held.
    Enable,
}

impl GyroAction {
    /// Decode a stored index. Unknown values mean `None`.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => GyroAction::Disable,
            2 => GyroAction::Enable,
            _ => GyroAction::None,
        }
    }
}

/// Live input-device state the gate consults.
pub trait InputQuery {
    /// Is the logical gyro button held right now?
    fn gyro_button_held(&self) -> bool;
}

impl InputQuery for bool {
    fn gyro_button_held(&self) -> bool {
        *self
    }
}

/// Decides whether gyro motion reaches the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivationGate {
    pub button: GyroAction,
    pub stick: GyroAction,
}

impl ActivationGate {
    pub fn new(button: GyroAction, stick: GyroAction) -> Self {
        Self { button, stick }
    }

    /// The stick action wins while the camera stick is moving.
    pub fn is_open<I: InputQuery + ?Sized>(&self, stick_moving: bool, input: &I) -> bool {
        if stick_moving {
            match self.stick {
                GyroAction::Disable => return false,
                GyroAction::Enable => return true,
                GyroAction::None => {}
            }
        }

        match self.button {
            GyroAction::Disable => !input.gyro_button_held(),
            GyroAction::Enable => input.gyro_button_held(),
            GyroAction::None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingInput {
        held: bool,
        queries: Cell<u32>,
    }

    impl InputQuery for CountingInput {
        fn gyro_button_held(&self) -> bool {
            self.queries.set(self.queries.get() + 1);
            self.held
        }
    }

    #[test]
    fn button_actions() {
        let enable = ActivationGate::new(GyroAction::Enable, GyroAction::None);
        assert!(enable.is_open(false, &true));
        assert!(!enable.is_open(false, &false));

        let disable = ActivationGate::new(GyroAction::Disable, GyroAction::None);
        assert!(!disable.is_open(false, &true));
        assert!(disable.is_open(false, &false));
    }

    #[test]
    fn stick_overrides_button_only_while_moving() {
        let gate = ActivationGate::new(GyroAction::Enable, GyroAction::Disable);
        assert!(!gate.is_open(true, &true));
        assert!(gate.is_open(false, &true));

        let gate = ActivationGate::new(GyroAction::Enable, GyroAction::Enable);
        assert!(gate.is_open(true, &false));

        // Stick action None defers to the button.
        let gate = ActivationGate::new(GyroAction::Enable, GyroAction::None);
        assert!(!gate.is_open(true, &false));
    }

    #[test]
    fn unconditional_gate_never_queries_input() {
        let input = CountingInput {
            held: false,
            queries: Cell::new(0),
        };
        let gate = ActivationGate::new(GyroAction::None, GyroAction::None);
        assert!(gate.is_open(true, &input));
        assert_eq!(input.queries.get(), 0);

        let gate = ActivationGate::new(GyroAction::Enable, GyroAction::Disable);
        assert!(!gate.is_open(true, &input));
        assert_eq!(input.queries.get(), 0);
    }
}
