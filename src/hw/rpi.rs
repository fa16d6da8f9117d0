// Raspberry Pi backend
//
// Digital lines via rppal GPIO, "analog" writes via rppal software PWM,
// joystick axes via an MCP3208 (12-bit, 8 channels) on SPI0.0.

use std::collections::HashMap;

use rppal::gpio::{self, Gpio, InputPin, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::{debug, info};

use super::{Board, BoardError, Level, Result};
use crate::config::PinMap;

/// Software PWM carrier frequency for motor drive
pub const PWM_FREQUENCY_HZ: f64 = 500.0;

pub const ADC_SPI_CLOCK_HZ: u32 = 1_000_000;
const ADC_CHANNELS: u8 = 8;

/// MCP3208 on SPI0, chip select 0
pub struct Mcp3208 {
    spi: Spi,
}

impl Mcp3208 {
    pub fn open() -> Result<Self> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, ADC_SPI_CLOCK_HZ, Mode::Mode0)?;
        info!("MCP3208 ADC initialized on SPI0.0");
        Ok(Self { spi })
    }

    pub fn read_channel(&mut self, channel: u8) -> Result<u16> {
        if channel >= ADC_CHANNELS {
            return Err(BoardError::InvalidChannel(channel));
        }

        // Start bit + single-ended + 3-bit channel, result in the low 12 bits
        let tx_buffer = request_frame(channel);
        let mut rx_buffer = [0u8; 3];
        self.spi.transfer(&mut rx_buffer, &tx_buffer)?;

        Ok(decode_sample(rx_buffer))
    }
}

fn request_frame(channel: u8) -> [u8; 3] {
    [0x06 | (channel >> 2), (channel & 0x03) << 6, 0x00]
}

fn decode_sample(rx: [u8; 3]) -> u16 {
    (((rx[1] & 0x0F) as u16) << 8) | rx[2] as u16
}

pub struct RpiBoard {
    adc: Mcp3208,
    inputs: HashMap<u8, InputPin>,
    outputs: HashMap<u8, OutputPin>,
}

impl RpiBoard {
    /// Claim every line named in the pin map; outputs start low, the trigger is pulled up
    pub fn new(pins: &PinMap) -> Result<Self> {
        let gpio = Gpio::new()?;

        let mut inputs = HashMap::new();
        inputs.insert(pins.trigger, gpio.get(pins.trigger)?.into_input_pullup());
        debug!("GPIO {} configured as trigger input", pins.trigger);

        let mut outputs = HashMap::new();
        for pin in pins.outputs() {
            outputs.insert(pin, gpio.get(pin)?.into_output_low());
            debug!("GPIO {} configured as output", pin);
        }

        let adc = Mcp3208::open()?;
        info!("Board setup completed ({} outputs)", outputs.len());

        Ok(Self {
            adc,
            inputs,
            outputs,
        })
    }

    fn output(&mut self, pin: u8) -> Result<&mut OutputPin> {
        self.outputs.get_mut(&pin).ok_or(BoardError::UnknownPin(pin))
    }
}

impl Board for RpiBoard {
    fn analog_read(&mut self, channel: u8) -> Result<u16> {
        self.adc.read_channel(channel)
    }

    fn digital_read(&mut self, pin: u8) -> Result<Level> {
        let input = self.inputs.get(&pin).ok_or(BoardError::UnknownPin(pin))?;
        Ok(match input.read() {
            gpio::Level::Low => Level::Low,
            gpio::Level::High => Level::High,
        })
    }

    fn digital_write(&mut self, pin: u8, level: Level) -> Result<()> {
        let output = self.output(pin)?;
        output.clear_pwm()?;
        match level {
            Level::Low => output.set_low(),
            Level::High => output.set_high(),
        }
        Ok(())
    }

    fn analog_write(&mut self, pin: u8, duty: u8) -> Result<()> {
        let output = self.output(pin)?;
        match duty {
            0 => {
                output.clear_pwm()?;
                output.set_low();
            }
            255 => {
                output.clear_pwm()?;
                output.set_high();
            }
            _ => output.set_pwm_frequency(PWM_FREQUENCY_HZ, duty as f64 / 255.0)?,
        }
        Ok(())
    }
}
