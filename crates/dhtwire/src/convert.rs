//! Conversion of the integer and fractional bytes into readings.
//!
//! Both values are `integer + 0.1 * fraction`. The `DHT11` always sends a
//! zero humidity fraction, and readings published by earlier deployments
//! rely on this exact scaling.

#[inline]
fn to_value(int: u8, frac: u8) -> f32 {
    f32::from(int) + 0.1 * f32::from(frac)
}

/// Temperature in degrees Celsius (°C).
#[must_use]
#[inline]
pub fn to_temperature(int: u8, frac: u8) -> f32 {
    to_value(int, frac)
}

/// Relative humidity as a percentage (% RH).
#[must_use]
#[inline]
pub fn to_humidity(int: u8, frac: u8) -> f32 {
    to_value(int, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_temperature() {
        assert!((to_temperature(23, 0) - 23.0).abs() < f32::EPSILON);
        assert!((to_temperature(23, 5) - 23.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_to_humidity() {
        assert!((to_humidity(60, 0) - 60.0).abs() < f32::EPSILON);
    }
}
