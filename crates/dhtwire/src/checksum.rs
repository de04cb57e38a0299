use crate::frame::Frame;

/// The checksum the sensor should have sent for the frame data: the sum
/// of the four data bytes, modulo 256.
#[must_use]
#[inline]
pub const fn expected_checksum(frame: &Frame) -> u8 {
    frame
        .humidity_int
        .wrapping_add(frame.humidity_frac)
        .wrapping_add(frame.temperature_int)
        .wrapping_add(frame.temperature_frac)
}

/// Whether the transmitted checksum matches the frame data.
///
/// This is the only integrity check of the protocol. Corruptions that
/// preserve the sum are not detected.
#[must_use]
#[inline]
pub const fn is_valid(frame: &Frame) -> bool {
    frame.checksum == expected_checksum(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_frame() {
        let frame = Frame::from_bytes([0x3C, 0x00, 0x17, 0x00, 0x53]);

        assert_eq!(expected_checksum(&frame), 83);
        assert!(is_valid(&frame));
    }

    #[test]
    fn test_checksum_wraps() {
        let frame = Frame::from_bytes([200, 10, 60, 5, 19]);

        assert_eq!(expected_checksum(&frame), 19);
        assert!(is_valid(&frame));
    }

    #[test]
    fn test_single_bit_perturbation_is_rejected() {
        let bytes = [0x3C, 0x00, 0x17, 0x00, 0x53];

        for byte in 0..bytes.len() {
            for bit in 0..8 {
                let mut corrupted = bytes;
                corrupted[byte] ^= 1 << bit;
                assert!(
                    !is_valid(&Frame::from_bytes(corrupted)),
                    "flipping bit {bit} of byte {byte} went unnoticed"
                );
            }
        }
    }

    #[test]
    fn test_zero_checksum_is_rejected() {
        let frame = Frame::from_bytes([0x3C, 0x00, 0x17, 0x00, 0x00]);

        assert!(!is_valid(&frame));
    }
}
