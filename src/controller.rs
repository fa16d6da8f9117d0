// One control tick of the claw cabinet
//
// Per tick: lives gate -> joystick to carriage motors -> trigger poll -> (blocking) gripper sequence.

use std::time::Duration;

use tracing::{info, warn};

use crate::config::{ClawConfig, TimingConfig};
use crate::gripper::{GripperActuator, GripperSequencer, GripperState, Phase, Sequence};
use crate::hw::{self, Board, Delay, Level};
use crate::lives::Lives;
use crate::messages::ClawStatus;
use crate::motion::{MotionMapper, MotorCommand};

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// No lives left, nothing actuated
    GameOver,
    /// Carriage updated, and possibly a gripper sequence completed
    Played {
        motors: (MotorCommand, MotorCommand),
        sequence: Option<Sequence>,
    },
}

pub struct ClawController<B, D> {
    board: B,
    delay: D,
    trigger: u8,
    timing: TimingConfig,
    mapper: MotionMapper,
    actuator: GripperActuator,
    sequencer: GripperSequencer,
    lives: Lives,
    game_over: bool,
}

impl<B: Board, D: Delay> ClawController<B, D> {
    /// `lives` is the shared counter; keep a clone for the remote surface
    pub fn new(board: B, delay: D, cfg: &ClawConfig, lives: Lives) -> Self {
        info!("TinyClaw controller ready ({} lives)", lives.get());
        Self {
            board,
            delay,
            trigger: cfg.pins.trigger,
            timing: cfg.timing.clone(),
            mapper: MotionMapper::new(&cfg.pins, cfg.motion.clone()),
            actuator: GripperActuator::new(&cfg.pins, cfg.timing.lift_speed),
            sequencer: GripperSequencer::new(),
            lives,
            game_over: false,
        }
    }

    pub fn tick(&mut self) -> hw::Result<Tick> {
        if self.lives.is_game_over() {
            if !self.game_over {
                warn!("Not enough lives....., cabinet idle until lives are added");
                self.mapper.stop(&mut self.board)?;
                self.game_over = true;
            }
            return Ok(Tick::GameOver);
        }
        if self.game_over {
            info!("Lives replenished ({} left), resuming play", self.lives.get());
            self.game_over = false;
        }

        let motors = self.mapper.update(&mut self.board)?;

        // Trigger is active-low
        let mut sequence = None;
        if self.board.digital_read(self.trigger)? == Level::Low {
            info!("Button pressed!!");
            if self.sequencer.trigger(&self.timing).is_some() {
                sequence =
                    self.sequencer
                        .run_to_completion(&self.actuator, &mut self.board, &mut self.delay)?;
            }
        }

        if sequence == Some(Sequence::Release) {
            let left = self.lives.spend_one();
            info!("Sweets released, {} lives left", left);
        }

        Ok(Tick::Played { motors, sequence })
    }

    /// Run a single gripper phase outside the game sequence (calibration)
    pub fn run_phase(&mut self, phase: Phase, duration: Duration) -> hw::Result<()> {
        self.actuator
            .run(&mut self.board, &mut self.delay, phase, duration)
    }

    /// Leave every actuator de-energized (shutdown)
    pub fn halt(&mut self) -> hw::Result<()> {
        info!("Stopping all motors");
        self.mapper.stop(&mut self.board)?;
        self.actuator.stop(&mut self.board)
    }

    pub fn gripper_state(&self) -> GripperState {
        self.sequencer.state()
    }

    pub fn lives(&self) -> &Lives {
        &self.lives
    }

    pub fn status(&self) -> ClawStatus {
        let lives = self.lives.get();
        ClawStatus {
            lives,
            gripper: self.gripper_state(),
            game_over: lives <= 0,
        }
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}
