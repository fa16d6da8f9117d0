// Joystick -> motor command mixing for the X-Y carriage
// The carriage is driven by two motors mounted at 45° to the axes, so each
// motor sees the sum or the difference of the two stick deflections.

use crate::config::MotionConfig;

/// Largest magnitude the PWM output accepts
pub const MAX_DUTY: u8 = 255;

/// Signed drive command for one H-bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCommand {
    Forward(u8),
    Reverse(u8),
    Stop,
}

impl MotorCommand {
    /// Apply the deadzone to a raw mixed command and clamp its magnitude to the PWM range
    pub fn from_raw(raw: i32, deadzone: i32) -> Self {
        let magnitude = raw.unsigned_abs().min(MAX_DUTY as u32) as u8;
        if raw > deadzone {
            MotorCommand::Forward(magnitude)
        } else if raw < -deadzone {
            MotorCommand::Reverse(magnitude)
        } else {
            MotorCommand::Stop
        }
    }
}

/// Raw commands for the two carriage motors, before the deadzone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MixedCommand {
    pub motor_1: i32,
    pub motor_2: i32,
}

/// Signed offset of a sample from the axis center
pub fn deflection(sample: u16, center: i32, invert: bool) -> i32 {
    let offset = sample as i32 - center;
    if invert { -offset } else { offset }
}

/// Two-motor mix: motor_1 = (dx + dy) / k, motor_2 = (dx - dy) / k
pub fn mix(dx: i32, dy: i32, divisor: i32) -> MixedCommand {
    MixedCommand {
        motor_1: (dx + dy) / divisor,
        motor_2: (dx - dy) / divisor,
    }
}

/// Full mapping from two raw axis samples to the two motor commands
pub fn map_axes(x: u16, y: u16, cfg: &MotionConfig) -> (MotorCommand, MotorCommand) {
    // Out-of-range samples are pinned to the ADC span
    let x = x.min(cfg.adc_max);
    let y = y.min(cfg.adc_max);

    let dx = deflection(x, cfg.axis_center, cfg.invert_x);
    let dy = deflection(y, cfg.axis_center, false);
    let mixed = mix(dx, dy, cfg.mix_divisor);

    (
        MotorCommand::from_raw(mixed.motor_1, cfg.deadzone),
        MotorCommand::from_raw(mixed.motor_2, cfg.deadzone),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sign(cmd: MotorCommand) -> i8 {
        match cmd {
            MotorCommand::Forward(_) => 1,
            MotorCommand::Reverse(_) => -1,
            MotorCommand::Stop => 0,
        }
    }

    #[test]
    fn test_centered_stick_stops_both_motors() {
        let cfg = MotionConfig::default();
        let (m1, m2) = map_axes(2048, 2048, &cfg);
        assert_eq!(m1, MotorCommand::Stop);
        assert_eq!(m2, MotorCommand::Stop);
    }

    #[rstest]
    #[case(200, MotorCommand::Stop)]
    #[case(-200, MotorCommand::Stop)]
    #[case(0, MotorCommand::Stop)]
    #[case(201, MotorCommand::Forward(201))]
    #[case(-201, MotorCommand::Reverse(201))]
    #[case(511, MotorCommand::Forward(255))]
    #[case(-512, MotorCommand::Reverse(255))]
    fn test_deadzone_and_clamp(#[case] raw: i32, #[case] expected: MotorCommand) {
        assert_eq!(MotorCommand::from_raw(raw, 200), expected);
    }

    #[test]
    fn test_x_axis_is_inverted() {
        assert_eq!(deflection(4095, 2048, true), -2047);
        assert_eq!(deflection(0, 2048, true), 2048);
        assert_eq!(deflection(4095, 2048, false), 2047);
    }

    #[test]
    fn test_mix_matches_transform() {
        assert_eq!(
            mix(1600, 800, 8),
            MixedCommand {
                motor_1: 300,
                motor_2: 100
            }
        );
        assert_eq!(
            mix(-1600, 800, 8),
            MixedCommand {
                motor_1: -100,
                motor_2: -300
            }
        );
    }

    #[test]
    fn test_small_deflections_stay_in_deadzone() {
        // |dx| + |dy| <= 8 * 200 keeps both mixed commands inside the deadzone
        let cfg = MotionConfig::default();
        for x in (2048 - 800..=2048 + 800).step_by(40) {
            for y in (2048 - 800..=2048 + 800).step_by(40) {
                let dx = (x as i32 - 2048).abs();
                let dy = (y as i32 - 2048).abs();
                if dx + dy > 1600 {
                    continue;
                }
                let (m1, m2) = map_axes(x, y, &cfg);
                assert_eq!(m1, MotorCommand::Stop, "x={} y={}", x, y);
                assert_eq!(m2, MotorCommand::Stop, "x={} y={}", x, y);
            }
        }
    }

    #[test]
    fn test_doubling_deflection_keeps_direction() {
        let cfg = MotionConfig::default();
        for dx in (-1000..=1000).step_by(50) {
            for dy in (-1000..=1000).step_by(50) {
                let x = (2048 + dx) as u16;
                let y = (2048 + dy) as u16;
                let x2 = (2048 + 2 * dx) as u16;
                let y2 = (2048 + 2 * dy) as u16;
                let (a1, a2) = map_axes(x, y, &cfg);
                let (b1, b2) = map_axes(x2, y2, &cfg);
                // Doubling may leave the deadzone but never flips direction
                if sign(a1) != 0 {
                    assert_eq!(sign(a1), sign(b1), "dx={} dy={}", dx, dy);
                }
                if sign(a2) != 0 {
                    assert_eq!(sign(a2), sign(b2), "dx={} dy={}", dx, dy);
                }
            }
        }
    }

    #[test]
    fn test_axis_and_diagonal_mixing() {
        // Stick pushed along +Y with X centered: motors turn in opposite directions
        let cfg = MotionConfig::default();
        let (m1, m2) = map_axes(2048, 4095, &cfg);
        assert_eq!(m1, MotorCommand::Forward(255));
        assert_eq!(m2, MotorCommand::Reverse(255));

        // Full left on X (inverted) and full up on Y: all the thrust on motor 1
        let (m1, m2) = map_axes(0, 4095, &cfg);
        assert_eq!(m1, MotorCommand::Forward(255));
        assert_eq!(m2, MotorCommand::Stop);
    }

    #[test]
    fn test_out_of_range_samples_are_clamped() {
        let cfg = MotionConfig::default();
        assert_eq!(map_axes(u16::MAX, u16::MAX, &cfg), map_axes(4095, 4095, &cfg));
    }
}
