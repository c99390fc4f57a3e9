//! Fixed pin and timing model of the target board.

pub const LED_PIN: u8 = 13;
pub const MOTOR_LEFT_FORWARD: u8 = 5;
pub const MOTOR_LEFT_BACKWARD: u8 = 6;
pub const MOTOR_RIGHT_FORWARD: u8 = 10;
pub const MOTOR_RIGHT_BACKWARD: u8 = 11;
pub const DISTANCE_SENSOR_PIN: u8 = 14;
pub const LIGHT_SENSOR_PIN: u8 = 15;
pub const SERVO_PIN: u8 = 9;

/// Drive time per `MOVE` distance unit
pub const MOVE_MS_PER_UNIT: u64 = 10;
/// Drive time per `TURN` degree
pub const TURN_MS_PER_DEGREE: u64 = 5;
/// Pause after every servo write
pub const SERVO_SETTLE_MS: u64 = 100;
pub const SERIAL_BAUD: u32 = 9600;

/// Largest PWM duty value accepted by `analogWrite`
pub const MAX_DUTY: u32 = 255;

/// `#define` name and value for every pin, in header order
pub const PIN_DEFINITIONS: &[(&str, u8)] = &[
    ("LED_PIN", LED_PIN),
    ("MOTOR_LEFT_FORWARD", MOTOR_LEFT_FORWARD),
    ("MOTOR_LEFT_BACKWARD", MOTOR_LEFT_BACKWARD),
    ("MOTOR_RIGHT_FORWARD", MOTOR_RIGHT_FORWARD),
    ("MOTOR_RIGHT_BACKWARD", MOTOR_RIGHT_BACKWARD),
    ("DISTANCE_SENSOR_PIN", DISTANCE_SENSOR_PIN),
    ("LIGHT_SENSOR_PIN", LIGHT_SENSOR_PIN),
    ("SERVO_PIN", SERVO_PIN),
];

/// Pins driven as digital outputs, configured in `setup()`
pub const OUTPUT_PINS: &[u8] = &[
    LED_PIN,
    MOTOR_LEFT_FORWARD,
    MOTOR_LEFT_BACKWARD,
    MOTOR_RIGHT_FORWARD,
    MOTOR_RIGHT_BACKWARD,
];

/// Sensor names recognised inside condition operands and their analog pin
pub const SENSORS: &[(&str, u8)] = &[
    ("sensor.distance", DISTANCE_SENSOR_PIN),
    ("sensor.light", LIGHT_SENSOR_PIN),
];

/// Scale a 0-100 speed percentage to a PWM duty value, truncating.
///
/// The parser keeps speeds within 0-100; nothing is clamped here.
pub fn speed_to_duty(speed: u32) -> u64 {
    u64::from(speed) * u64::from(MAX_DUTY) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_scaling_truncates() {
        assert_eq!(speed_to_duty(0), 0);
        assert_eq!(speed_to_duty(50), 127);
        assert_eq!(speed_to_duty(75), 191);
        assert_eq!(speed_to_duty(100), 255);
    }

    #[test]
    fn duty_scaling_is_not_clamped() {
        assert_eq!(speed_to_duty(150), 382);
        assert_eq!(speed_to_duty(u32::MAX), u64::from(u32::MAX) * 255 / 100);
    }
}
