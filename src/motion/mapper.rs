// Applies mixed joystick commands to the two carriage H-bridges

use tracing::debug;

use super::mixer::{map_axes, MotorCommand};
use crate::config::{HBridge, MotionConfig, PinMap};
use crate::hw::{self, Board, Level};

/// Drive one H-bridge. The idle side is always pulled low before the other is modulated.
pub fn drive_bridge<B: Board>(board: &mut B, bridge: HBridge, cmd: MotorCommand) -> hw::Result<()> {
    match cmd {
        MotorCommand::Forward(duty) => {
            board.digital_write(bridge.in1, Level::Low)?;
            board.analog_write(bridge.in2, duty)
        }
        MotorCommand::Reverse(duty) => {
            board.digital_write(bridge.in2, Level::Low)?;
            board.analog_write(bridge.in1, duty)
        }
        MotorCommand::Stop => {
            board.digital_write(bridge.in1, Level::Low)?;
            board.digital_write(bridge.in2, Level::Low)
        }
    }
}

/// Joystick -> X-Y carriage. Stateless, safe to call every tick.
#[derive(Debug, Clone)]
pub struct MotionMapper {
    cfg: MotionConfig,
    joy_x: u8,
    joy_y: u8,
    motor_1: HBridge,
    motor_2: HBridge,
}

impl MotionMapper {
    pub fn new(pins: &PinMap, cfg: MotionConfig) -> Self {
        Self {
            cfg,
            joy_x: pins.joy_x,
            joy_y: pins.joy_y,
            motor_1: pins.motor_x,
            motor_2: pins.motor_y,
        }
    }

    /// Sample both axes and drive both motors; returns the applied commands
    pub fn update<B: Board>(&self, board: &mut B) -> hw::Result<(MotorCommand, MotorCommand)> {
        let x = board.analog_read(self.joy_x)?;
        let y = board.analog_read(self.joy_y)?;
        let (cmd_1, cmd_2) = map_axes(x, y, &self.cfg);
        debug!("Joystick x={}, y={} => motor_1={:?}, motor_2={:?}", x, y, cmd_1, cmd_2);

        drive_bridge(board, self.motor_1, cmd_1)?;
        drive_bridge(board, self.motor_2, cmd_2)?;
        Ok((cmd_1, cmd_2))
    }

    /// De-energize both carriage motors
    pub fn stop<B: Board>(&self, board: &mut B) -> hw::Result<()> {
        drive_bridge(board, self.motor_1, MotorCommand::Stop)?;
        drive_bridge(board, self.motor_2, MotorCommand::Stop)
    }
}
