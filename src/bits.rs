//! Bit-region copy primitives underlying the identifier layout.
//!
//! A bit region is a half-open range `[start, end)` of bit positions within a
//! byte buffer, where position 0 is the least significant bit of byte 0.
//! Fields are packed LSB first: bit `i` of a field occupies position
//! `start + i` of the buffer.

use thiserror::Error;

/// Error returned when a bit range does not fit the buffers involved.
///
/// Range checks run before any mutation, so a failed call leaves the
/// destination untouched.
#[derive(Clone, Copy, Eq, PartialEq, Debug, Error)]
pub enum RangeError {
    /// The `[start, end)` range reaches past the end of the buffer.
    #[error("bit range {start}..{end} exceeds a buffer of {len} bytes")]
    OutOfBounds {
        /// First bit position of the range.
        start: usize,
        /// Past-the-end bit position of the range.
        end: usize,
        /// Length of the offending buffer in bytes.
        len: usize,
    },
    /// The data buffer is too short to carry the requested number of bits.
    #[error("a buffer of {len} bytes cannot carry {bits} bits")]
    TooShort {
        /// Number of bits to transfer.
        bits: usize,
        /// Length of the offending buffer in bytes.
        len: usize,
    },
}

const MASK: [u8; 9] = [0x00, 0x01, 0x03, 0x07, 0x0f, 0x1f, 0x3f, 0x7f, 0xff];

const fn mask(size: usize) -> u8 {
    MASK[size]
}

/// Copies `end - start` bits from the low end of `data` into
/// `dest[start..end)`, merging into the existing destination bits with
/// bitwise OR so that unrelated bits sharing a byte with the range are
/// preserved.
///
/// Does nothing when `start >= end`.
///
/// # Examples
///
/// ```rust
/// use uuid200::bits::write_bits;
///
/// let mut dest = [0u8; 2];
/// write_bits(&mut dest, 5, 13, &[0xff, 0xff])?;
/// assert_eq!(dest, [0xe0, 0x1f]);
/// # Ok::<(), uuid200::bits::RangeError>(())
/// ```
pub fn write_bits(dest: &mut [u8], start: usize, end: usize, data: &[u8]) -> Result<(), RangeError> {
    if start >= end {
        return Ok(());
    }
    let bits = end - start;
    if end > dest.len() * 8 {
        return Err(RangeError::OutOfBounds {
            start,
            end,
            len: dest.len(),
        });
    }
    if bits > data.len() * 8 {
        return Err(RangeError::TooShort {
            bits,
            len: data.len(),
        });
    }

    for (i, window) in (start..end).step_by(8).enumerate() {
        put_window(dest, window, 8.min(end - window), data[i]);
    }
    Ok(())
}

/// Extracts bits `[start, end)` of `src` into the low end of `dest`, one
/// byte per 8-bit window. Bytes of `dest` beyond the extracted bits are left
/// as they are.
pub fn read_bits(src: &[u8], start: usize, end: usize, dest: &mut [u8]) -> Result<(), RangeError> {
    if start >= end {
        return Ok(());
    }
    let bits = end - start;
    if end > src.len() * 8 {
        return Err(RangeError::OutOfBounds {
            start,
            end,
            len: src.len(),
        });
    }
    if bits > dest.len() * 8 {
        return Err(RangeError::TooShort {
            bits,
            len: dest.len(),
        });
    }

    for (i, window) in (start..end).step_by(8).enumerate() {
        dest[i] = get_window(src, window, 8.min(end - window));
    }
    Ok(())
}

/// Merges the low `width` bits of `b` into `dest` at bit offset `start`.
///
/// `width` never exceeds 8, so the bits land in one byte or straddle two:
/// the part fitting the first byte is shifted up to `start % 8`, the
/// remainder is shifted down into the low end of the second byte.
fn put_window(dest: &mut [u8], start: usize, width: usize, b: u8) {
    let byte = start / 8;
    let bit = start % 8;
    let b = b & mask(width);
    dest[byte] |= b << bit;
    if bit + width > 8 {
        dest[byte + 1] |= b >> (8 - bit);
    }
}

/// Returns the `width` bits of `src` at bit offset `start`, aligned to the
/// low end of the result. The inverse of [`put_window`].
fn get_window(src: &[u8], start: usize, width: usize) -> u8 {
    let byte = start / 8;
    let bit = start % 8;
    let mut v = src[byte] >> bit;
    if bit + width > 8 {
        v |= src[byte + 1] << (8 - bit);
    }
    v & mask(width)
}

#[cfg(test)]
mod tests {
    use super::{read_bits, write_bits, RangeError};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha12Rng;

    /// Sets a byte-straddling range exactly as LSB-first packing dictates
    #[test]
    fn sets_byte_straddling_range_exactly() {
        let mut dest = [0u8; 2];
        write_bits(&mut dest, 5, 13, &[0xff, 0xff]).unwrap();
        assert_eq!(dest, [0xe0, 0x1f]);
    }

    /// Sets bits within a single byte
    #[test]
    fn sets_bits_within_a_single_byte() {
        let mut dest = [0u8; 1];
        write_bits(&mut dest, 2, 5, &[0b101]).unwrap();
        assert_eq!(dest, [0b_0001_0100]);
    }

    /// Preserves destination bits outside the written range
    #[test]
    fn preserves_destination_bits_outside_the_range() {
        let mut dest = [0x01, 0x80];
        write_bits(&mut dest, 5, 13, &[0xff, 0xff]).unwrap();
        assert_eq!(dest, [0xe1, 0x9f]);
    }

    /// Reads back exactly the bits written for in-byte, straddling, and
    /// many-byte ranges
    #[test]
    fn reads_back_exactly_the_bits_written() {
        let ranges = [
            (2usize, 5usize),
            (5, 13),
            (7, 9),
            (0, 52),
            (52, 64),
            (64, 66),
            (66, 200),
            (0, 200),
        ];
        let mut rng = ChaCha12Rng::seed_from_u64(0x200);
        for (start, end) in ranges {
            let bits = end - start;
            let mut data = vec![0u8; (bits + 7) / 8];
            rng.fill_bytes(&mut data);

            let mut buffer = [0u8; 25];
            write_bits(&mut buffer, start, end, &data).unwrap();

            let mut back = vec![0u8; data.len()];
            read_bits(&buffer, start, end, &mut back).unwrap();

            // the final data byte may carry bits beyond the range, which the
            // codec must ignore
            let tail = bits % 8;
            if tail != 0 {
                *data.last_mut().unwrap() &= (1 << tail) - 1;
            }
            assert_eq!(back, data, "range {}..{}", start, end);
        }
    }

    /// Composes the full identifier layout from adjacent field writes
    #[test]
    fn composes_adjacent_fields_without_interference() {
        let mut buffer = [0u8; 25];
        write_bits(&mut buffer, 0, 52, &u64::MAX.to_le_bytes()).unwrap();
        write_bits(&mut buffer, 64, 66, &[0b10]).unwrap();

        let mut counter = [0u8; 2];
        read_bits(&buffer, 52, 64, &mut counter).unwrap();
        assert_eq!(counter, [0, 0]);

        let mut version = [0u8; 1];
        read_bits(&buffer, 64, 66, &mut version).unwrap();
        assert_eq!(version, [0b10]);

        let mut time = [0u8; 7];
        read_bits(&buffer, 0, 52, &mut time).unwrap();
        assert_eq!(time, [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    /// Treats an empty range as a no-op
    #[test]
    fn treats_empty_range_as_a_no_op() {
        let mut dest = [0xabu8; 2];
        write_bits(&mut dest, 9, 9, &[]).unwrap();
        write_bits(&mut dest, 12, 9, &[]).unwrap();
        assert_eq!(dest, [0xab, 0xab]);

        let mut out = [0u8; 2];
        read_bits(&dest, 9, 9, &mut out).unwrap();
        assert_eq!(out, [0, 0]);
    }

    /// Fails fast on ranges exceeding the destination or source
    #[test]
    fn fails_fast_on_out_of_bounds_ranges() {
        let mut dest = [0u8; 2];
        assert_eq!(
            write_bits(&mut dest, 8, 17, &[0xff, 0xff]),
            Err(RangeError::OutOfBounds {
                start: 8,
                end: 17,
                len: 2
            })
        );

        let mut out = [0u8; 4];
        assert_eq!(
            read_bits(&dest, 0, 17, &mut out),
            Err(RangeError::OutOfBounds {
                start: 0,
                end: 17,
                len: 2
            })
        );
    }

    /// Fails fast when the data buffer cannot carry the requested bits
    #[test]
    fn fails_fast_on_short_data_buffers() {
        let mut dest = [0u8; 4];
        assert_eq!(
            write_bits(&mut dest, 0, 17, &[0xff, 0xff]),
            Err(RangeError::TooShort { bits: 17, len: 2 })
        );

        let mut out = [0u8; 2];
        assert_eq!(
            read_bits(&[0u8; 4], 0, 17, &mut out),
            Err(RangeError::TooShort { bits: 17, len: 2 })
        );
    }

    /// Leaves the destination untouched when a write is rejected
    #[test]
    fn leaves_destination_untouched_on_error() {
        let mut dest = [0x55u8; 3];
        assert!(write_bits(&mut dest, 16, 25, &[0xff, 0xff]).is_err());
        assert!(write_bits(&mut dest, 0, 17, &[0xff]).is_err());
        assert_eq!(dest, [0x55, 0x55, 0x55]);
    }
}
