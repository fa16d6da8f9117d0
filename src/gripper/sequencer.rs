// Capture / release state machine
//
// A trigger press arms a sequence (capture when idle, release when holding a
// prize). `advance` then runs exactly one step: the phase itself plus its
// settle delay. Both block the calling thread; the control loop is meant to be
// suspended while the gripper moves.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::actuator::{GripperActuator, Phase};
use crate::config::TimingConfig;
use crate::hw::{self, Board, Delay};

/// Whether the claw is holding a prize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GripperState {
    #[default]
    Idle,
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// lower -> close -> raise
    Capture,
    /// open
    Release,
}

impl Sequence {
    pub fn for_state(state: GripperState) -> Self {
        match state {
            GripperState::Idle => Sequence::Capture,
            GripperState::Captured => Sequence::Release,
        }
    }

    /// State reached once every step has run
    pub fn target(&self) -> GripperState {
        match self {
            Sequence::Capture => GripperState::Captured,
            Sequence::Release => GripperState::Idle,
        }
    }

    pub fn steps(&self, timing: &TimingConfig) -> Vec<Step> {
        match self {
            Sequence::Capture => vec![
                Step::new(Phase::Lower, timing.lower(), timing.capture_settle()),
                Step::new(Phase::Close, timing.close(), timing.capture_settle()),
                Step::new(Phase::Raise, timing.raise(), timing.capture_settle()),
            ],
            Sequence::Release => vec![Step::new(Phase::Open, timing.open(), timing.release_settle())],
        }
    }
}

/// A timed phase followed by a settle delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub phase: Phase,
    pub duration: Duration,
    pub settle: Duration,
}

impl Step {
    pub fn new(phase: Phase, duration: Duration, settle: Duration) -> Self {
        Self {
            phase,
            duration,
            settle,
        }
    }
}

#[derive(Debug, Clone)]
struct Active {
    sequence: Sequence,
    steps: Vec<Step>,
    next: usize,
}

/// Result of one `advance` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Nothing armed
    Idle,
    /// A step ran, more remain
    Running(Phase),
    /// The last step ran and the state flipped
    Finished(Sequence),
}

#[derive(Debug, Clone, Default)]
pub struct GripperSequencer {
    state: GripperState,
    active: Option<Active>,
}

impl GripperSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GripperState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Arm the sequence matching the current state. Ignored while one is already running.
    pub fn trigger(&mut self, timing: &TimingConfig) -> Option<Sequence> {
        if self.is_running() {
            return None;
        }
        let sequence = Sequence::for_state(self.state);
        match sequence {
            Sequence::Capture => info!("Capturing sweets....."),
            Sequence::Release => info!("Releasing sweets....."),
        }
        self.active = Some(Active {
            sequence,
            steps: sequence.steps(timing),
            next: 0,
        });
        Some(sequence)
    }

    /// Run the next step of the armed sequence
    pub fn advance<B: Board, D: Delay>(
        &mut self,
        actuator: &GripperActuator,
        board: &mut B,
        delay: &mut D,
    ) -> hw::Result<Progress> {
        let Some(active) = self.active.as_mut() else {
            return Ok(Progress::Idle);
        };

        let step = active.steps[active.next];
        actuator.run(board, delay, step.phase, step.duration)?;
        delay.delay(step.settle);
        active.next += 1;

        if active.next < active.steps.len() {
            return Ok(Progress::Running(step.phase));
        }

        let sequence = active.sequence;
        self.active = None;
        self.state = sequence.target();
        Ok(Progress::Finished(sequence))
    }

    /// Advance until the armed sequence completes
    pub fn run_to_completion<B: Board, D: Delay>(
        &mut self,
        actuator: &GripperActuator,
        board: &mut B,
        delay: &mut D,
    ) -> hw::Result<Option<Sequence>> {
        loop {
            match self.advance(actuator, board, delay)? {
                Progress::Idle => return Ok(None),
                Progress::Running(_) => continue,
                Progress::Finished(sequence) => return Ok(Some(sequence)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PinMap;
    use crate::hw::{SimBoard, SimDelay};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_capture_steps_in_order() {
        let timing = TimingConfig::default();
        let phases: Vec<Phase> = Sequence::Capture.steps(&timing).iter().map(|s| s.phase).collect();
        assert_eq!(phases, vec![Phase::Lower, Phase::Close, Phase::Raise]);
        assert_eq!(
            Sequence::Release.steps(&timing),
            vec![Step::new(Phase::Open, ms(100), ms(2000))]
        );
    }

    #[test]
    fn test_advance_runs_one_step_at_a_time() {
        let timing = TimingConfig::default();
        let actuator = GripperActuator::new(&PinMap::default(), timing.lift_speed);
        let mut board = SimBoard::new();
        let mut delay = SimDelay::new();
        let mut seq = GripperSequencer::new();

        assert_eq!(seq.advance(&actuator, &mut board, &mut delay).unwrap(), Progress::Idle);
        assert_eq!(seq.trigger(&timing), Some(Sequence::Capture));

        assert_eq!(
            seq.advance(&actuator, &mut board, &mut delay).unwrap(),
            Progress::Running(Phase::Lower)
        );
        assert_eq!(delay.delays(), &[ms(300), ms(1000)]);
        assert_eq!(seq.state(), GripperState::Idle);

        assert_eq!(
            seq.advance(&actuator, &mut board, &mut delay).unwrap(),
            Progress::Running(Phase::Close)
        );
        assert_eq!(
            seq.advance(&actuator, &mut board, &mut delay).unwrap(),
            Progress::Finished(Sequence::Capture)
        );
        assert_eq!(seq.state(), GripperState::Captured);
        assert!(!seq.is_running());
        assert_eq!(delay.total(), ms(300 + 500 + 500 + 3 * 1000));
    }

    #[test]
    fn test_trigger_ignored_while_running() {
        let timing = TimingConfig::default();
        let mut seq = GripperSequencer::new();
        assert!(seq.trigger(&timing).is_some());
        assert!(seq.trigger(&timing).is_none());
    }

    #[test]
    fn test_release_returns_to_idle() {
        let timing = TimingConfig::default();
        let actuator = GripperActuator::new(&PinMap::default(), timing.lift_speed);
        let mut board = SimBoard::new();
        let mut delay = SimDelay::new();
        let mut seq = GripperSequencer::new();

        seq.trigger(&timing);
        seq.run_to_completion(&actuator, &mut board, &mut delay).unwrap();
        assert_eq!(seq.trigger(&timing), Some(Sequence::Release));
        let done = seq.run_to_completion(&actuator, &mut board, &mut delay).unwrap();
        assert_eq!(done, Some(Sequence::Release));
        assert_eq!(seq.state(), GripperState::Idle);
    }
}
