//! Typed views of field values.
//!
//! Every typed accessor is a read of a fixed number of bits from the start of the
//! field, followed by a narrowing cast:
//!
//! | type | bits read |
//! |---|---|
//! | `bool` | 1 |
//! | `u8`, `i8` | 8 |
//! | `u16`, `i16` | 16 |
//! | `u32`, `i32` | 32 |
//! | `u64`, `i64` | 64 |
//!
//! A field narrower than the read is zero-extended. A field wider than the read
//! yields its leading (highest-order) bits. Writes go the other way: the value is
//! widened to 64 bits (sign-extending signed types) and its low `width` bits are stored.

use crate::bits::{leading_bits, sign_extend};

/// A primitive type a field can be read as or written from.
pub trait FieldValue: Copy + Default {
    /// Number of bits read from the start of the field.
    const BITS: usize;

    /// Narrows a raw read of [FieldValue::BITS] bits.
    fn from_raw(raw: u64) -> Self;

    /// Widens the value to 64 bits for writing.
    fn into_raw(self) -> u64;
}

macro_rules! impl_unsigned_field_value {
    ($($uint:ty),*) => {
        $(
            impl FieldValue for $uint {
                const BITS: usize = <$uint>::BITS as usize;

                fn from_raw(raw: u64) -> Self {
                    raw as $uint
                }

                fn into_raw(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

macro_rules! impl_signed_field_value {
    ($($int:ty),*) => {
        $(
            impl FieldValue for $int {
                const BITS: usize = <$int>::BITS as usize;

                fn from_raw(raw: u64) -> Self {
                    raw as $int
                }

                fn into_raw(self) -> u64 {
                    self as i64 as u64
                }
            }
        )*
    };
}

impl_unsigned_field_value!(u8, u16, u32, u64);
impl_signed_field_value!(i8, i16, i32, i64);

impl FieldValue for bool {
    const BITS: usize = 1;

    fn from_raw(raw: u64) -> Self {
        raw & 1 == 1
    }

    fn into_raw(self) -> u64 {
        u64::from(self)
    }
}

/// The value of one field, captured at the moment it was read.
///
/// Holds the field's full raw value and width; the typed accessors are pure
/// functions of those two and agree with [crate::store::BitStore::get].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSnapshot {
    index: usize,
    width: u32,
    raw: u64,
}

impl FieldSnapshot {
    pub(crate) fn new(index: usize, width: u32, raw: u64) -> Self {
        FieldSnapshot { index, width, raw }
    }

    /// Position of the field in its layout.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Full field value, zero-extended to 64 bits.
    pub fn raw(&self) -> u64 {
        self.raw
    }

    /// The value as `T`, with the same truncation rules as a store read.
    pub fn get<T: FieldValue>(&self) -> T {
        T::from_raw(leading_bits(self.raw, self.width as usize, T::BITS))
    }

    /// The value interpreted as a two's-complement number of `width` bits.
    pub fn signed(&self) -> i64 {
        sign_extend(self.raw, self.width as usize)
    }
}
