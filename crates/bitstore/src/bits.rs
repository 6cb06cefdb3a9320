//! Low-level bit read and write utilities for byte slices.
//!
//! Bits are addressed in MSB-first order: bit 0 is the high bit of the first byte.
//! A bit range `[start, end)` is therefore a big-endian bit string spread across
//! one or more bytes, and partial boundary bytes keep the bits outside the range.

use crate::errors::{ReadError, WriteError};

/// Reads a single bit at `bit_pos` (0 = MSB of first byte). Returns 0 or 1.
pub fn read_bit_at(data: &[u8], bit_pos: usize) -> Result<u8, ReadError> {
    if bit_pos >= data.len() * 8 {
        return Err(ReadError::OutOfBounds);
    }

    let byte_index = bit_pos / 8;
    let bit_index = bit_pos % 8;

    Ok((data[byte_index] >> (7 - bit_index)) & 1)
}

/// Reads `n` bits starting at `bit_pos` as an unsigned value (max 64 bits). MSB-first.
pub fn read_bits_at(data: &[u8], bit_pos: usize, n: usize) -> Result<u64, ReadError> {
    if n > 64 {
        return Err(ReadError::TooManyBitsRead);
    }

    if bit_pos
        .checked_add(n)
        .is_none_or(|end| end > data.len() * 8)
    {
        return Err(ReadError::OutOfBounds);
    }

    Ok(read_span(data, bit_pos, bit_pos + n))
}

/// Writes the low `n` bits of `value` starting at `bit_pos` (max 64 bits). MSB-first.
///
/// Bits of the boundary bytes that fall outside `[bit_pos, bit_pos + n)` are preserved.
pub fn write_bits_at(
    data: &mut [u8],
    bit_pos: usize,
    n: usize,
    value: u64,
) -> Result<(), WriteError> {
    if n > 64 {
        return Err(WriteError::TooManyBitsWritten);
    }

    if bit_pos
        .checked_add(n)
        .is_none_or(|end| end > data.len() * 8)
    {
        return Err(WriteError::OutOfBounds);
    }

    write_span(data, bit_pos, bit_pos + n, value);
    Ok(())
}

/// Reads the bit range `[start, end)` without bounds checks.
///
/// The range must lie inside `data` and span at most 64 bits.
pub(crate) fn read_span(data: &[u8], start: usize, end: usize) -> u64 {
    if start >= end {
        return 0;
    }

    if end - start == 1 {
        return u64::from((data[start / 8] >> (7 - start % 8)) & 1);
    }

    let first = start / 8;
    let last = (end - 1) / 8;
    // Number of bits the last byte contributes from its high end, 1..=8.
    let tail = end - last * 8;

    let mut value = u64::from(data[first] & (0xFF >> (start % 8)));
    if first == last {
        return value >> (8 - tail);
    }

    for &byte in &data[first + 1..last] {
        value = (value << 8) | u64::from(byte);
    }

    (value << tail) | u64::from(data[last] >> (8 - tail))
}

/// Writes the low `end - start` bits of `value` into `[start, end)` without bounds checks.
///
/// Walks from the end of the range backward: trailing partial byte, whole bytes,
/// then the leading partial byte.
pub(crate) fn write_span(data: &mut [u8], start: usize, end: usize, mut value: u64) {
    let mut pos = end;

    while pos > start {
        let byte_index = (pos - 1) / 8;
        let byte_start = byte_index * 8;
        let low = start.max(byte_start);

        let count = pos - low;
        let shift = byte_start + 8 - pos;
        let bits = 0xFFu8 >> (8 - count);
        let mask = bits << shift;

        data[byte_index] = (data[byte_index] & !mask) | (((value as u8) & bits) << shift);

        value >>= count;
        pos = low;
    }
}

/// Returns the leading (highest-order) `n` bits of a `width`-bit value.
///
/// A value no wider than `n` is returned unchanged.
pub fn leading_bits(value: u64, width: usize, n: usize) -> u64 {
    if width <= n {
        value
    } else {
        value >> (width - n)
    }
}

/// Mask covering the low `bits` bits (`bits` in 0..=64).
pub fn low_mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Sign-extends the low `bits` of `value` to a full `i64`.
pub fn sign_extend(value: u64, bits: usize) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}
