// Timed gripper phase primitives
//
// Each phase energizes its actuator, blocks for the requested duration and then
// de-energizes both direction pins. The lift runs on an H-bridge with a PWM
// raise, the claw is a plain two-pin DC actuator.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{HBridge, PinMap};
use crate::hw::{self, Board, Delay, Level};

/// One of the four gripper movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lower,
    Raise,
    Open,
    Close,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Lower => "Lowering",
            Phase::Raise => "Raising",
            Phase::Open => "Opening",
            Phase::Close => "Closing",
        };
        f.write_str(name)
    }
}

/// Drives the lift and claw actuators
#[derive(Debug, Clone)]
pub struct GripperActuator {
    lift: HBridge,
    claw: HBridge,
    lift_speed: u8,
}

impl GripperActuator {
    pub fn new(pins: &PinMap, lift_speed: u8) -> Self {
        Self {
            lift: pins.lift,
            claw: pins.claw,
            lift_speed,
        }
    }

    /// Run one phase to completion, blocking for `duration`
    pub fn run<B: Board, D: Delay>(
        &self,
        board: &mut B,
        delay: &mut D,
        phase: Phase,
        duration: Duration,
    ) -> hw::Result<()> {
        info!("{} gripper for {} ms", phase, duration.as_millis());
        self.energize(board, phase)?;
        delay.delay(duration);
        self.release(board, phase)
    }

    /// De-energize the lift and the claw
    pub fn stop<B: Board>(&self, board: &mut B) -> hw::Result<()> {
        self.release(board, Phase::Lower)?;
        self.release(board, Phase::Open)
    }

    fn energize<B: Board>(&self, board: &mut B, phase: Phase) -> hw::Result<()> {
        match phase {
            Phase::Lower => {
                board.analog_write(self.lift.in1, 0)?;
                board.digital_write(self.lift.in2, Level::High)
            }
            Phase::Raise => {
                board.analog_write(self.lift.in1, self.lift_speed)?;
                board.digital_write(self.lift.in2, Level::Low)
            }
            Phase::Open => {
                board.digital_write(self.claw.in1, Level::Low)?;
                board.digital_write(self.claw.in2, Level::High)
            }
            Phase::Close => {
                board.digital_write(self.claw.in1, Level::High)?;
                board.digital_write(self.claw.in2, Level::Low)
            }
        }
    }

    fn release<B: Board>(&self, board: &mut B, phase: Phase) -> hw::Result<()> {
        match phase {
            Phase::Lower | Phase::Raise => {
                board.analog_write(self.lift.in1, 0)?;
                board.digital_write(self.lift.in2, Level::Low)
            }
            Phase::Open | Phase::Close => {
                board.digital_write(self.claw.in1, Level::Low)?;
                board.digital_write(self.claw.in2, Level::Low)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::{PinWrite, SimBoard, SimDelay};

    fn setup() -> (GripperActuator, PinMap, SimBoard, SimDelay) {
        let pins = PinMap::default();
        (GripperActuator::new(&pins, 255), pins, SimBoard::new(), SimDelay::new())
    }

    #[test]
    fn test_every_phase_ends_deenergized() {
        let (actuator, pins, mut board, mut delay) = setup();
        for phase in [Phase::Lower, Phase::Raise, Phase::Open, Phase::Close] {
            actuator
                .run(&mut board, &mut delay, phase, Duration::from_millis(10))
                .unwrap();
            for pin in pins.lift.pins().into_iter().chain(pins.claw.pins()) {
                assert_eq!(board.duty(pin), 0, "{:?} left pin {} driven", phase, pin);
            }
        }
        assert_eq!(delay.delays().len(), 4);
    }

    #[test]
    fn test_phase_blocks_for_requested_duration() {
        let (actuator, _, mut board, mut delay) = setup();
        actuator
            .run(&mut board, &mut delay, Phase::Close, Duration::from_millis(750))
            .unwrap();
        assert_eq!(delay.delays(), &[Duration::from_millis(750)]);
    }

    #[test]
    fn test_raise_uses_lift_speed() {
        let pins = PinMap::default();
        let actuator = GripperActuator::new(&pins, 180);
        let mut board = SimBoard::new();
        actuator
            .run(&mut board, &mut SimDelay::new(), Phase::Raise, Duration::from_millis(1))
            .unwrap();
        assert_eq!(board.writes()[0], PinWrite::Analog(pins.lift.in1, 180));
        assert_eq!(board.writes()[1], PinWrite::Digital(pins.lift.in2, Level::Low));
    }

    #[test]
    fn test_open_and_close_drive_opposite_pins() {
        let (actuator, pins, mut board, mut delay) = setup();
        actuator.run(&mut board, &mut delay, Phase::Open, Duration::ZERO).unwrap();
        let open_writes = board.take_writes();
        assert_eq!(open_writes[1], PinWrite::Digital(pins.claw.in2, Level::High));

        actuator.run(&mut board, &mut delay, Phase::Close, Duration::ZERO).unwrap();
        let close_writes = board.take_writes();
        assert_eq!(close_writes[0], PinWrite::Digital(pins.claw.in1, Level::High));
    }
}
