// Message types exchanged with remote callers and telemetry listeners

use serde::{Deserialize, Serialize};

use crate::gripper::GripperState;

/// Return value of a successful remote call
pub const CALL_OK: i32 = 1;
/// Return value when the argument is not an integer (or the function is unknown)
pub const CALL_MALFORMED: i32 = -1;

// Reply to a remote function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteReply {
    pub function: String,
    pub return_value: i32,
    pub lives: i32,
}

impl RemoteReply {
    pub fn is_ok(&self) -> bool {
        self.return_value == CALL_OK
    }
}

/// Status published by the runtime every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClawStatus {
    pub lives: i32,
    pub gripper: GripperState,
    pub game_over: bool,
}
