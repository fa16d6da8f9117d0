// Remote function surface
//
// Functions are addressed by name with a single string argument and answer
// with an integer return value: `add_lives <n>` adjusts the shared counter,
// the four gripper functions run one phase for `<ms>` milliseconds.

use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

use crate::controller::ClawController;
use crate::gripper::Phase;
use crate::hw::{self, Board, Delay};
use crate::lives::Lives;
use crate::messages::{RemoteReply, CALL_MALFORMED, CALL_OK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFunction {
    AddLives,
    Gripper(Phase),
}

impl RemoteFunction {
    pub fn name(&self) -> &'static str {
        match self {
            RemoteFunction::AddLives => "add_lives",
            RemoteFunction::Gripper(Phase::Lower) => "lower_gripper",
            RemoteFunction::Gripper(Phase::Raise) => "raise_gripper",
            RemoteFunction::Gripper(Phase::Open) => "open_gripper",
            RemoteFunction::Gripper(Phase::Close) => "close_gripper",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown remote function: {0}")]
pub struct UnknownFunction(pub String);

impl FromStr for RemoteFunction {
    type Err = UnknownFunction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add_lives" => Ok(RemoteFunction::AddLives),
            "lower_gripper" => Ok(RemoteFunction::Gripper(Phase::Lower)),
            "raise_gripper" => Ok(RemoteFunction::Gripper(Phase::Raise)),
            "open_gripper" => Ok(RemoteFunction::Gripper(Phase::Open)),
            "close_gripper" => Ok(RemoteFunction::Gripper(Phase::Close)),
            other => Err(UnknownFunction(other.to_string())),
        }
    }
}

/// Rejected lives adjustment; the counter is left untouched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LivesError {
    #[error("Not an integer: {0:?}")]
    Malformed(String),

    #[error("Adding {delta} to {current} lives leaves the counter range")]
    OutOfRange { delta: i32, current: i32 },
}

/// Function name addressed by a key expression (its last chunk)
pub fn function_from_key(key: &str) -> &str {
    key.rsplit_once('/').map_or(key, |(_, name)| name)
}

/// Parse a lives delta. "0" is a valid zero, anything that is not an integer is an error.
pub fn parse_lives(arg: &str) -> Result<i32, LivesError> {
    arg.trim()
        .parse::<i32>()
        .map_err(|_| LivesError::Malformed(arg.to_string()))
}

/// Parse a phase duration in milliseconds. Malformed or negative input runs for zero time.
pub fn parse_duration(arg: &str) -> Duration {
    match arg.trim().parse::<u64>() {
        Ok(ms) => Duration::from_millis(ms),
        Err(_) => {
            warn!("Invalid phase duration {:?}, using 0 ms", arg);
            Duration::ZERO
        }
    }
}

/// Dispatches remote calls against the controller and the shared counter
#[derive(Debug, Clone)]
pub struct RemoteHandler {
    lives: Lives,
}

impl RemoteHandler {
    pub fn new(lives: Lives) -> Self {
        Self { lives }
    }

    /// Apply a lives adjustment; the counter is untouched on malformed or out-of-range input
    pub fn add_lives(&self, arg: &str) -> Result<i32, LivesError> {
        let delta = parse_lives(arg)?;
        let total = self.lives.add(delta).ok_or_else(|| LivesError::OutOfRange {
            delta,
            current: self.lives.get(),
        })?;
        info!("{} lives added. Total lives left: {}", delta, total);
        Ok(total)
    }

    /// Handle one call by function name. Gripper functions block for the phase duration.
    pub fn handle<B: Board, D: Delay>(
        &self,
        function: &str,
        arg: &str,
        claw: &mut ClawController<B, D>,
    ) -> hw::Result<RemoteReply> {
        let return_value = match function.parse::<RemoteFunction>() {
            Ok(RemoteFunction::AddLives) => match self.add_lives(arg) {
                Ok(_) => CALL_OK,
                Err(e) => {
                    warn!("add_lives rejected: {}", e);
                    CALL_MALFORMED
                }
            },
            Ok(RemoteFunction::Gripper(phase)) => {
                claw.run_phase(phase, parse_duration(arg))?;
                CALL_OK
            }
            Err(e) => {
                warn!("{}", e);
                CALL_MALFORMED
            }
        };

        Ok(RemoteReply {
            function: function.to_string(),
            return_value,
            lives: self.lives.get(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClawConfig;
    use crate::hw::{SimBoard, SimDelay};

    fn setup(initial: i32) -> (RemoteHandler, ClawController<SimBoard, SimDelay>) {
        let lives = Lives::new(initial);
        let claw = ClawController::new(
            SimBoard::new(),
            SimDelay::new(),
            &ClawConfig::default(),
            lives.clone(),
        );
        (RemoteHandler::new(lives), claw)
    }

    #[test]
    fn test_parse_lives() {
        assert_eq!(parse_lives("5"), Ok(5));
        assert_eq!(parse_lives("0"), Ok(0));
        assert_eq!(parse_lives("-3"), Ok(-3));
        assert_eq!(parse_lives(" 12\n"), Ok(12));
        assert!(parse_lives("abc").is_err());
        assert!(parse_lives("").is_err());
        assert!(parse_lives("4x").is_err());
    }

    #[test]
    fn test_add_five_lives() {
        let (handler, mut claw) = setup(5);
        let reply = handler.handle("add_lives", "5", &mut claw).unwrap();
        assert_eq!(reply.return_value, CALL_OK);
        assert_eq!(reply.lives, 10);
        assert_eq!(claw.lives().get(), 10);
    }

    #[test]
    fn test_malformed_lives_leave_counter() {
        let (handler, mut claw) = setup(5);
        let reply = handler.handle("add_lives", "abc", &mut claw).unwrap();
        assert_eq!(reply.return_value, CALL_MALFORMED);
        assert_eq!(claw.lives().get(), 5);
    }

    #[test]
    fn test_zero_lives_is_success() {
        let (handler, mut claw) = setup(5);
        let reply = handler.handle("add_lives", "0", &mut claw).unwrap();
        assert_eq!(reply.return_value, CALL_OK);
        assert_eq!(claw.lives().get(), 5);
    }

    #[test]
    fn test_lives_overflow_is_rejected() {
        let (handler, mut claw) = setup(5);
        let reply = handler.handle("add_lives", "2147483647", &mut claw).unwrap();
        assert_eq!(reply.return_value, CALL_MALFORMED);
        assert_eq!(reply.lives, 5);
        assert!(!claw.status().game_over);

        let (handler, mut claw) = setup(-5);
        let reply = handler.handle("add_lives", "-2147483648", &mut claw).unwrap();
        assert_eq!(reply.return_value, CALL_MALFORMED);
        assert_eq!(claw.lives().get(), -5);

        assert_eq!(
            handler.add_lives("-2147483648"),
            Err(LivesError::OutOfRange {
                delta: i32::MIN,
                current: -5
            })
        );
    }

    #[test]
    fn test_gripper_override_uses_given_duration() {
        let (handler, mut claw) = setup(0);
        let reply = handler.handle("open_gripper", "1500", &mut claw).unwrap();
        assert!(reply.is_ok());
        assert_eq!(claw.delay().delays(), &[Duration::from_millis(1500)]);
    }

    #[test]
    fn test_gripper_override_with_bad_duration_runs_zero() {
        let (handler, mut claw) = setup(1);
        let reply = handler.handle("lower_gripper", "soon", &mut claw).unwrap();
        assert!(reply.is_ok());
        assert_eq!(claw.delay().delays(), &[Duration::ZERO]);
    }

    #[test]
    fn test_unknown_function() {
        let (handler, mut claw) = setup(1);
        let reply = handler.handle("dance", "1", &mut claw).unwrap();
        assert_eq!(reply.return_value, CALL_MALFORMED);
        assert!(claw.board().writes().is_empty());
    }

    #[test]
    fn test_function_from_key() {
        assert_eq!(function_from_key("tinyclaw/fn/add_lives"), "add_lives");
        assert_eq!(function_from_key("open_gripper"), "open_gripper");
    }

    #[test]
    fn test_function_names_round_trip() {
        for function in [
            RemoteFunction::AddLives,
            RemoteFunction::Gripper(Phase::Lower),
            RemoteFunction::Gripper(Phase::Raise),
            RemoteFunction::Gripper(Phase::Open),
            RemoteFunction::Gripper(Phase::Close),
        ] {
            assert_eq!(function.name().parse::<RemoteFunction>(), Ok(function));
        }
    }
}
