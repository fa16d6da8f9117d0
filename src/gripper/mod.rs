// Gripper control
//
// Provides:
// - The four timed phase primitives (lower, raise, open, close)
// - The capture / release sequencer

mod actuator;
mod sequencer;

pub use actuator::{GripperActuator, Phase};
pub use sequencer::{GripperSequencer, GripperState, Progress, Sequence, Step};
