//! # bitstore
//!
//! A fixed-schema record packed into a flat byte buffer.
//!
//! A [layout::Layout] is an ordered list of named fields, each 1 to 64 bits wide.
//! Fields are packed back to back with no padding into one big-endian bit string,
//! MSB-first within each byte. A [store::BitStore] owns the zero-initialized buffer
//! for one record and reads or writes any field as an integer or boolean.
//!
//! ## Example
//!
//! ```
//! use bitstore::{layout::Layout, store::BitStore};
//!
//! bitstore::bit_fields! {
//!     enum Header {
//!         Version: 3,
//!         Flags: 5,
//!         Length: 12,
//!     }
//! }
//!
//! let mut store = BitStore::new(Layout::of::<Header>().unwrap());
//! store.set_value(Header::Version, 0b101);
//! store.set(Header::Length, 1000u16);
//!
//! assert_eq!(store.as_bytes(), &[0b101_00000, 0b0011_1110, 0b1000_0000]);
//! assert_eq!(store.value(Header::Length), 1000);
//! assert_eq!(store.get::<u8>(Header::Version), 5);
//! ```

pub mod bits;
pub mod errors;
pub mod field;
pub mod key;
pub mod layout;
#[cfg(feature = "serde")]
pub mod serde;
pub mod store;
pub mod value;
