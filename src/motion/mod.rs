// Motion mapping for the claw carriage
//
// Provides:
// - Joystick deflection and two-motor mixing (pure functions)
// - H-bridge drive of the two planar motors

mod mapper;
pub mod mixer;

pub use mapper::{drive_bridge, MotionMapper};
pub use mixer::{map_axes, MotorCommand};
