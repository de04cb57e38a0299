use crate::decoder::Bit;

/// Number of bits in a [`ByteField`].
pub const BITS_PER_BYTE: usize = 8;
/// Number of [`ByteField`]s in a [`Frame`].
pub const FRAME_BYTES: usize = 5;

/// Eight decoded bits, most significant first.
///
/// The array length guarantees that a short read can never reach the
/// frame assembler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ByteField(pub [Bit; BITS_PER_BYTE]);

impl ByteField {
    /// Splits a byte into its bits, most significant first.
    #[must_use]
    pub fn from_value(value: u8) -> Self {
        Self(core::array::from_fn(|i| {
            Bit::from(value & (0x80 >> i) != 0)
        }))
    }

    /// The unsigned value of the bits.
    #[must_use]
    #[inline]
    pub fn value(&self) -> u8 {
        to_byte_value(&self.0)
    }
}

/// Interprets eight bits as an unsigned integer, weighting bit `i` by
/// `2^(7 - i)`.
#[must_use]
pub fn to_byte_value(bits: &[Bit; BITS_PER_BYTE]) -> u8 {
    bits.iter()
        .enumerate()
        .fold(0, |byte, (i, bit)| byte | (bit.value() << (7 - i)))
}

/// The five bytes transmitted by the sensor in one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    /// Integer part of the relative humidity.
    pub humidity_int: u8,
    /// Fractional part of the relative humidity.
    pub humidity_frac: u8,
    /// Integer part of the temperature.
    pub temperature_int: u8,
    /// Fractional part of the temperature.
    pub temperature_frac: u8,
    /// Checksum transmitted by the sensor.
    pub checksum: u8,
}

impl Frame {
    /// Builds a [`Frame`] from the bytes in transmission order.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; FRAME_BYTES]) -> Self {
        let [humidity_int, humidity_frac, temperature_int, temperature_frac, checksum] = bytes;
        Self {
            humidity_int,
            humidity_frac,
            temperature_int,
            temperature_frac,
            checksum,
        }
    }

    /// The bytes in transmission order.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; FRAME_BYTES] {
        [
            self.humidity_int,
            self.humidity_frac,
            self.temperature_int,
            self.temperature_frac,
            self.checksum,
        ]
    }
}

/// Assembles the five byte fields of a cycle into a [`Frame`].
#[must_use]
pub fn assemble(fields: &[ByteField; FRAME_BYTES]) -> Frame {
    Frame::from_bytes(fields.map(|field| field.value()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::decoder::Bit::{One, Zero};

    #[test]
    fn test_to_byte_value_msb_first() {
        assert_eq!(to_byte_value(&[One, Zero, Zero, Zero, Zero, Zero, Zero, Zero]), 0x80);
        assert_eq!(to_byte_value(&[Zero, Zero, Zero, Zero, Zero, Zero, Zero, One]), 0x01);
        assert_eq!(to_byte_value(&[Zero, Zero, One, One, One, One, Zero, Zero]), 0x3C);
        assert_eq!(to_byte_value(&[One; 8]), 0xFF);
        assert_eq!(to_byte_value(&[Zero; 8]), 0x00);
    }

    #[test]
    fn test_byte_value_round_trip() {
        for value in 0..=u8::MAX {
            assert_eq!(ByteField::from_value(value).value(), value);
        }
    }

    #[test]
    fn test_assemble() {
        let fields = [0x3C, 0x00, 0x17, 0x00, 0x53].map(ByteField::from_value);

        let frame = assemble(&fields);

        assert_eq!(frame.humidity_int, 60);
        assert_eq!(frame.humidity_frac, 0);
        assert_eq!(frame.temperature_int, 23);
        assert_eq!(frame.temperature_frac, 0);
        assert_eq!(frame.checksum, 0x53);
        assert_eq!(frame.to_bytes(), [0x3C, 0x00, 0x17, 0x00, 0x53]);
    }
}
