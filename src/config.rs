// Timing, topics, pin mapping and gameplay configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Control loop period (joystick polling rate)
pub const LOOP_PERIOD: Duration = Duration::from_millis(100);

// Lives granted at process start
pub const DEFAULT_LIVES: i32 = 5;

// Zenoh key expressions
pub const TOPIC_FN: &str = "tinyclaw/fn/*"; // remote functions, last chunk is the function name
pub const TOPIC_FN_PREFIX: &str = "tinyclaw/fn";
pub const TOPIC_STATUS: &str = "tinyclaw/state/status"; // telemetry
pub const TOPIC_LIVES: &str = "tinyclaw/state/lives"; // lives variable

/// Direction-pair of an H-bridge channel.
///
/// Forward drive holds `in1` low and modulates `in2`, reverse is the mirror image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HBridge {
    pub in1: u8,
    pub in2: u8,
}

impl HBridge {
    pub const fn new(in1: u8, in2: u8) -> Self {
        Self { in1, in2 }
    }

    pub fn pins(&self) -> [u8; 2] {
        [self.in1, self.in2]
    }
}

/// Logical role -> physical line. Axis entries are ADC channels, the rest are BCM GPIO numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinMap {
    pub joy_x: u8,
    pub joy_y: u8,
    pub trigger: u8,
    pub motor_x: HBridge,
    pub motor_y: HBridge,
    pub lift: HBridge,
    pub claw: HBridge,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            joy_x: 0,
            joy_y: 1,
            trigger: 17,
            motor_x: HBridge::new(5, 6),
            motor_y: HBridge::new(13, 19),
            lift: HBridge::new(20, 21),
            claw: HBridge::new(23, 24),
        }
    }
}

impl PinMap {
    /// Every output line, in a stable order.
    pub fn outputs(&self) -> Vec<u8> {
        [self.motor_x, self.motor_y, self.lift, self.claw]
            .iter()
            .flat_map(HBridge::pins)
            .collect()
    }
}

/// Joystick to motor mapping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub adc_max: u16,
    pub axis_center: i32,
    pub deadzone: i32,
    pub mix_divisor: i32,
    pub invert_x: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            adc_max: 4095,
            axis_center: 2048,
            deadzone: 200,
            mix_divisor: 8,
            invert_x: true,
        }
    }
}

/// Gripper phase durations (milliseconds) and lift speed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lower_ms: u64,
    pub close_ms: u64,
    pub raise_ms: u64,
    pub open_ms: u64,
    pub capture_settle_ms: u64,
    pub release_settle_ms: u64,
    pub lift_speed: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lower_ms: 300,
            close_ms: 500,
            raise_ms: 500,
            open_ms: 100,
            capture_settle_ms: 1000,
            release_settle_ms: 2000,
            lift_speed: 255,
        }
    }
}

impl TimingConfig {
    pub fn lower(&self) -> Duration {
        Duration::from_millis(self.lower_ms)
    }

    pub fn close(&self) -> Duration {
        Duration::from_millis(self.close_ms)
    }

    pub fn raise(&self) -> Duration {
        Duration::from_millis(self.raise_ms)
    }

    pub fn open(&self) -> Duration {
        Duration::from_millis(self.open_ms)
    }

    pub fn capture_settle(&self) -> Duration {
        Duration::from_millis(self.capture_settle_ms)
    }

    pub fn release_settle(&self) -> Duration {
        Duration::from_millis(self.release_settle_ms)
    }
}

/// Complete cabinet configuration, fixed for the lifetime of the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClawConfig {
    pub pins: PinMap,
    pub motion: MotionConfig,
    pub timing: TimingConfig,
    pub initial_lives: i32,
}

impl Default for ClawConfig {
    fn default() -> Self {
        Self {
            pins: PinMap::default(),
            motion: MotionConfig::default(),
            timing: TimingConfig::default(),
            initial_lives: DEFAULT_LIVES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl MotionConfig {
    /// Reject values the mixer cannot work with (zero divisor, negative deadzone, center off the ADC span)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mix_divisor <= 0 {
            return Err(ConfigError::Invalid(format!(
                "motion.mix_divisor must be positive, got {}",
                self.mix_divisor
            )));
        }
        if self.deadzone < 0 {
            return Err(ConfigError::Invalid(format!(
                "motion.deadzone must not be negative, got {}",
                self.deadzone
            )));
        }
        if !(0..=self.adc_max as i32).contains(&self.axis_center) {
            return Err(ConfigError::Invalid(format!(
                "motion.axis_center must be within 0..={}, got {}",
                self.adc_max, self.axis_center
            )));
        }
        Ok(())
    }
}

impl ClawConfig {
    /// Load a JSON config file. Missing fields fall back to the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()
    }
}
