use crate::types::{errors::MessageLayoutError, signal::ByteOrder};

/// Verify that (bit_start, bit_length) fits within a frame of `byte_length` bytes.
///
/// DBC assumptions:
/// - Intel: the field occupies bits [start, start + len - 1] on a linear 0..(8*bytes-1) plane.
/// - Motorola: map DBC bit_start (the MSB) to the MSB-first linear index
///   `lin = (start & !7) + (7 - (start & 7))`, then the field covers [lin .. lin + len - 1].
pub(crate) fn check_signal_fits(
    byte_length: u16,
    bit_start: u16,
    bit_length: u16,
    byte_order: ByteOrder,
) -> Result<(), MessageLayoutError> {
    if bit_length == 0 {
        return Err(MessageLayoutError::ZeroBitLength);
    }
    if bit_length > 64 {
        return Err(MessageLayoutError::TooWide { bit_length });
    }
    let total_bits: usize = byte_length as usize * 8;

    match byte_order {
        ByteOrder::LittleEndian => {
            let start: usize = bit_start as usize;
            let end: usize = start + (bit_length as usize) - 1;
            if end < total_bits {
                Ok(())
            } else {
                Err(MessageLayoutError::IntelOutOfBounds {
                    end,
                    total_bits,
                    byte_length,
                })
            }
        }
        ByteOrder::BigEndian => {
            let start: usize = linearize(bit_start);
            let end: usize = start + (bit_length as usize) - 1;

            if start >= total_bits {
                return Err(MessageLayoutError::MotorolaStartOutOfBounds {
                    start,
                    total_bits,
                    byte_length,
                });
            }
            if end >= total_bits {
                return Err(MessageLayoutError::MotorolaEndOutOfBounds {
                    end,
                    total_bits,
                    byte_length,
                });
            }
            Ok(())
        }
    }
}

// Map a DBC bit number to the MSB-first linear index and back (the mapping is
// an involution), e.g. 0 -> 7, 7 -> 0, 8 -> 15
fn linearize(bit: u16) -> usize {
    let s: usize = bit as usize;
    (s & !7) + (7 - (s & 7))
}

/// Occupied payload bits of a signal, as a 512-bit mask (bit `n` = DBC bit `n`).
///
/// Assumes the signal already passed [`check_signal_fits`].
pub(crate) fn occupied_bits(bit_start: u16, bit_length: u16, byte_order: ByteOrder) -> [u64; 8] {
    let mut mask: [u64; 8] = [0; 8];
    let mut set = |bit: usize| mask[bit / 64] |= 1u64 << (bit % 64);

    match byte_order {
        ByteOrder::LittleEndian => {
            for bit in bit_start as usize..bit_start as usize + bit_length as usize {
                set(bit);
            }
        }
        ByteOrder::BigEndian => {
            let start: usize = linearize(bit_start);
            for lin in start..start + bit_length as usize {
                set(linearize(lin as u16));
            }
        }
    }
    mask
}

pub(crate) fn masks_intersect(a: &[u64; 8], b: &[u64; 8]) -> bool {
    a.iter().zip(b.iter()).any(|(x, y)| x & y != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intel_bounds() {
        assert!(check_signal_fits(2, 0, 16, ByteOrder::LittleEndian).is_ok());
        assert_eq!(
            check_signal_fits(2, 1, 16, ByteOrder::LittleEndian),
            Err(MessageLayoutError::IntelOutOfBounds {
                end: 16,
                total_bits: 16,
                byte_length: 2
            })
        );
        assert_eq!(
            check_signal_fits(8, 0, 0, ByteOrder::LittleEndian),
            Err(MessageLayoutError::ZeroBitLength)
        );
        assert_eq!(
            check_signal_fits(64, 0, 65, ByteOrder::LittleEndian),
            Err(MessageLayoutError::TooWide { bit_length: 65 })
        );
    }

    #[test]
    fn motorola_bounds() {
        // start 7 is the MSB of byte 0; 16 bits end at bit 8 (LSB of byte 1)
        assert!(check_signal_fits(2, 7, 16, ByteOrder::BigEndian).is_ok());
        assert_eq!(
            check_signal_fits(2, 0, 16, ByteOrder::BigEndian),
            Err(MessageLayoutError::MotorolaEndOutOfBounds {
                end: 22,
                total_bits: 16,
                byte_length: 2
            })
        );
        assert!(matches!(
            check_signal_fits(1, 8, 1, ByteOrder::BigEndian),
            Err(MessageLayoutError::MotorolaStartOutOfBounds { .. })
        ));
    }

    #[test]
    fn occupied_bits_follow_byte_order() {
        let intel = occupied_bits(4, 8, ByteOrder::LittleEndian);
        assert_eq!(intel[0], 0x0FF0);

        // Motorola start 3, 8 bits: bits 3..0 of byte 0 then bits 7..4 of byte 1
        let motorola = occupied_bits(3, 8, ByteOrder::BigEndian);
        assert_eq!(motorola[0], 0xF00F);
        assert!(!masks_intersect(&intel, &occupied_bits(12, 4, ByteOrder::LittleEndian)));
        assert!(!masks_intersect(&intel, &motorola));
        assert!(masks_intersect(&motorola, &occupied_bits(12, 4, ByteOrder::LittleEndian)));
    }
}
