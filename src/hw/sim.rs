// In-memory board for tests and hardware-less runs

use std::collections::HashMap;
use std::time::Duration;

use super::{Board, Delay, Level, Result};

/// Mid-scale sample returned for axes that were never set
pub const SIM_AXIS_CENTER: u16 = 2048;

/// One recorded output operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinWrite {
    Digital(u8, Level),
    Analog(u8, u8),
}

impl PinWrite {
    pub fn pin(&self) -> u8 {
        match *self {
            PinWrite::Digital(pin, _) | PinWrite::Analog(pin, _) => pin,
        }
    }

    /// Whether the write leaves the pin driven
    pub fn is_energizing(&self) -> bool {
        match *self {
            PinWrite::Digital(_, level) => level == Level::High,
            PinWrite::Analog(_, duty) => duty > 0,
        }
    }
}

/// Simulated I/O: settable inputs, recorded outputs
#[derive(Debug, Default, Clone)]
pub struct SimBoard {
    axes: HashMap<u8, u16>,
    inputs: HashMap<u8, Level>,
    duty: HashMap<u8, u8>,
    writes: Vec<PinWrite>,
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_axis(&mut self, channel: u8, sample: u16) {
        self.axes.insert(channel, sample);
    }

    pub fn set_input(&mut self, pin: u8, level: Level) {
        self.inputs.insert(pin, level);
    }

    /// Current drive of an output (digital high reads as 255)
    pub fn duty(&self, pin: u8) -> u8 {
        self.duty.get(&pin).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> &[PinWrite] {
        &self.writes
    }

    pub fn take_writes(&mut self) -> Vec<PinWrite> {
        std::mem::take(&mut self.writes)
    }
}

impl Board for SimBoard {
    fn analog_read(&mut self, channel: u8) -> Result<u16> {
        Ok(self.axes.get(&channel).copied().unwrap_or(SIM_AXIS_CENTER))
    }

    // Unset inputs idle high (pull-up)
    fn digital_read(&mut self, pin: u8) -> Result<Level> {
        Ok(self.inputs.get(&pin).copied().unwrap_or(Level::High))
    }

    fn digital_write(&mut self, pin: u8, level: Level) -> Result<()> {
        let duty = match level {
            Level::Low => 0,
            Level::High => 255,
        };
        self.duty.insert(pin, duty);
        self.writes.push(PinWrite::Digital(pin, level));
        Ok(())
    }

    fn analog_write(&mut self, pin: u8, duty: u8) -> Result<()> {
        self.duty.insert(pin, duty);
        self.writes.push(PinWrite::Analog(pin, duty));
        Ok(())
    }
}

/// Records requested delays instead of sleeping
#[derive(Debug, Default, Clone)]
pub struct SimDelay {
    delays: Vec<Duration>,
}

impl SimDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    pub fn total(&self) -> Duration {
        self.delays.iter().sum()
    }
}

impl Delay for SimDelay {
    fn delay(&mut self, duration: Duration) {
        self.delays.push(duration);
    }
}
