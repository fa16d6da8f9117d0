// Hardware access for the claw cabinet
//
// Provides:
// - The `Board` seam the control core drives (analog/digital in, digital/PWM out)
// - The `Delay` seam used by the blocking gripper phases
// - A Raspberry Pi backend (GPIO + software PWM + MCP3208 ADC)
// - An in-memory backend for tests and dry runs

pub mod rpi;
pub mod sim;

use std::time::Duration;

pub use rpi::RpiBoard;
pub use sim::{PinWrite, SimBoard, SimDelay};

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

/// Error types for board I/O
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),

    #[error("SPI error: {0}")]
    Spi(#[from] rppal::spi::Error),

    #[error("ADC channel {0} out of range (0-7)")]
    InvalidChannel(u8),

    #[error("Pin {0} was not configured at setup")]
    UnknownPin(u8),
}

pub type Result<T> = std::result::Result<T, BoardError>;

/// Physical I/O the controller needs. Pins are claimed when the board is built.
pub trait Board {
    /// Sample an analog channel (0..=4095)
    fn analog_read(&mut self, channel: u8) -> Result<u16>;

    fn digital_read(&mut self, pin: u8) -> Result<Level>;

    fn digital_write(&mut self, pin: u8, level: Level) -> Result<()>;

    /// Drive a pin with a duty cycle in 0..=255
    fn analog_write(&mut self, pin: u8, duty: u8) -> Result<()>;
}

/// Blocking wait used between actuation steps
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Suspends the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockingDelay;

impl Delay for BlockingDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
