//! BitStore: a zero-initialized byte buffer holding the fields of a [Layout].

use std::{
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    sync::Arc,
};

use crate::{
    bits::{self, sign_extend},
    errors::{AccessError, ReadError},
    key::FieldKey,
    layout::Layout,
    value::{FieldSnapshot, FieldValue},
};

/// A packed record: one buffer of `layout.byte_len()` bytes shared with nothing,
/// plus a reference to its (shared) [Layout].
///
/// Fields are addressed by any [FieldKey]. Accessors taking a key panic if the key
/// does not name a field of the layout; the `try_` variants return an [AccessError].
///
/// # Example
///
/// ```
/// use bitstore::{field::FieldSpec, layout::Layout, store::BitStore};
///
/// let layout = Layout::new(&[FieldSpec::new("a", 3), FieldSpec::new("b", 5)]).unwrap();
/// let mut store = BitStore::new(layout);
/// store.set_value("a", 0b101);
/// store.set_value("b", 0b10110);
/// assert_eq!(store.as_bytes(), &[0xB6]);
/// assert_eq!(store.get::<u8>("b"), 22);
/// ```
#[derive(Clone)]
pub struct BitStore {
    layout: Arc<Layout>,
    data: Vec<u8>,
}

impl BitStore {
    pub fn new(layout: impl Into<Arc<Layout>>) -> Self {
        let layout = layout.into();
        let data = vec![0u8; layout.byte_len()];

        Self { layout, data }
    }

    /// Restores a store from bytes previously taken with [BitStore::as_bytes].
    ///
    /// `bytes` must be exactly `layout.byte_len()` long.
    pub fn from_bytes(
        layout: impl Into<Arc<Layout>>,
        bytes: impl Into<Vec<u8>>,
    ) -> Result<Self, ReadError> {
        let layout = layout.into();
        let data = bytes.into();

        let expected = layout.byte_len();
        let actual = data.len();
        if actual < expected {
            return Err(ReadError::PacketTooShort { expected, actual });
        }
        if actual > expected {
            return Err(ReadError::PacketTooLong { expected, actual });
        }

        Ok(Self { layout, data })
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Total size in bits.
    pub fn bit_len(&self) -> usize {
        self.layout.bit_len()
    }

    /// The backing buffer, in its MSB-first packed layout.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Raw value of a field, zero-extended to 64 bits.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a field of this store's layout.
    pub fn value(&self, key: impl FieldKey) -> u64 {
        self.read(self.index(&key), 64)
    }

    pub fn try_value(&self, key: impl FieldKey) -> Result<u64, AccessError> {
        Ok(self.read(self.try_index(&key)?, 64))
    }

    /// Field value interpreted as a two's-complement number of the field's width.
    pub fn signed_value(&self, key: impl FieldKey) -> i64 {
        let index = self.index(&key);
        let (start, end) = self.layout.span(index);

        sign_extend(self.read(index, 64), end - start)
    }

    /// Reads a field as `T`, see [crate::value] for the truncation rules.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a field of this store's layout.
    pub fn get<T: FieldValue>(&self, key: impl FieldKey) -> T {
        T::from_raw(self.read(self.index(&key), T::BITS))
    }

    /// Stores the low `width` bits of `value` in a field.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not a field of this store's layout.
    pub fn set_value(&mut self, key: impl FieldKey, value: u64) {
        let index = self.index(&key);
        self.write(index, value);
    }

    pub fn try_set_value(&mut self, key: impl FieldKey, value: u64) -> Result<(), AccessError> {
        let index = self.try_index(&key)?;
        self.write(index, value);

        Ok(())
    }

    /// Widens `value` to 64 bits and stores it with [BitStore::set_value].
    pub fn set<T: FieldValue>(&mut self, key: impl FieldKey, value: T) {
        self.set_value(key, value.into_raw());
    }

    pub fn clear_value(&mut self, key: impl FieldKey) {
        self.set_value(key, 0);
    }

    /// Sets every field to 0, in layout order. The buffer is not reallocated.
    pub fn clear(&mut self) {
        for index in 0..self.len() {
            self.write(index, 0);
        }
    }

    /// Captures the current value of one field.
    pub fn snapshot(&self, key: impl FieldKey) -> FieldSnapshot {
        self.snapshot_at(self.index(&key))
    }

    /// Iterates a snapshot of every field in layout order.
    pub fn iter(&self) -> Snapshots<'_> {
        Snapshots {
            store: self,
            next: 0,
        }
    }

    /// Reads every field as `T`, in layout order.
    pub fn to_vec<T: FieldValue>(&self) -> Vec<T> {
        (0..self.len())
            .map(|index| T::from_raw(self.read(index, T::BITS)))
            .collect()
    }

    /// Reads every field as `T` into `dest`, reusing it when it is long enough.
    ///
    /// Slots past the field count are set to zero. A `dest` shorter than the field
    /// count is dropped and a new vector of exactly the field count is returned.
    pub fn export_into<T: FieldValue>(&self, mut dest: Vec<T>) -> Vec<T> {
        if dest.len() < self.len() {
            return self.to_vec();
        }

        let (fields, rest) = dest.split_at_mut(self.len());
        for (index, slot) in fields.iter_mut().enumerate() {
            *slot = T::from_raw(self.read(index, T::BITS));
        }
        rest.fill(T::default());

        dest
    }

    fn index(&self, key: &impl FieldKey) -> usize {
        match key.resolve(&self.layout) {
            Some(index) => index,
            None => panic!("unknown field `{}` for this layout", key.describe()),
        }
    }

    fn try_index(&self, key: &impl FieldKey) -> Result<usize, AccessError> {
        key.resolve(&self.layout)
            .ok_or_else(|| AccessError::UnknownField(key.describe()))
    }

    /// Reads up to `n` bits from the start of field `index`, clamped to the field's end.
    fn read(&self, index: usize, n: usize) -> u64 {
        let (start, end) = self.layout.span(index);
        let end = end.min(start + n).min(self.data.len() * 8);

        bits::read_span(&self.data, start, end)
    }

    fn write(&mut self, index: usize, value: u64) {
        let (start, end) = self.layout.span(index);
        bits::write_span(&mut self.data, start, end, value);
    }

    fn snapshot_at(&self, index: usize) -> FieldSnapshot {
        let (start, end) = self.layout.span(index);
        FieldSnapshot::new(index, (end - start) as u32, self.read(index, 64))
    }
}

/// Two stores are equal when every field of one is present in the other with the
/// same name, width and value. Stores of incompatible layouts compare unequal.
impl PartialEq for BitStore {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }

        (0..self.len()).all(|index| {
            let Some(name) = self.layout.name(index) else {
                return false;
            };
            let Some(other_index) = other.layout.index_of(name) else {
                return false;
            };

            self.layout.width(index) == other.layout.width(other_index)
                && self.read(index, 64) == other.read(other_index, 64)
        })
    }
}

impl Eq for BitStore {}

/// XOR of every field value, independent of field order.
impl Hash for BitStore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let folded = (0..self.len()).fold(0u64, |acc, index| acc ^ self.read(index, 64));
        state.write_u64(folded);
    }
}

impl fmt::Debug for BitStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries((0..self.len()).map(|index| {
                (
                    self.layout.name(index).unwrap_or_default(),
                    self.read(index, 64),
                )
            }))
            .finish()
    }
}

impl<'a> IntoIterator for &'a BitStore {
    type Item = FieldSnapshot;
    type IntoIter = Snapshots<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the fields of a [BitStore], created by [BitStore::iter].
///
/// Each snapshot is read when it is yielded.
#[derive(Debug, Clone)]
pub struct Snapshots<'a> {
    store: &'a BitStore,
    next: usize,
}

impl Iterator for Snapshots<'_> {
    type Item = FieldSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.store.len() {
            return None;
        }

        let snapshot = self.store.snapshot_at(self.next);
        self.next += 1;

        Some(snapshot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Snapshots<'_> {}

impl FusedIterator for Snapshots<'_> {}

#[cfg(test)]
mod tests {
    use std::{collections::hash_map::DefaultHasher, hash::Hasher};

    use super::*;
    use crate::field::FieldSpec;

    crate::bit_fields! {
        enum Frame {
            Version: 3,
            Flags: 5,
            Length: 12,
            Checksum: 21,
            Flag: 1,
        }
    }

    crate::bit_fields! {
        enum Foreign {
            Version,
        }
    }

    fn frame_store() -> BitStore {
        BitStore::new(Layout::of::<Frame>().unwrap())
    }

    fn hash_of(store: &BitStore) -> u64 {
        let mut hasher = DefaultHasher::new();
        store.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_new_store_is_zeroed() {
        let store = frame_store();
        assert_eq!(store.bit_len(), 42);
        assert_eq!(store.as_bytes(), &[0u8; 6]);
        assert!(store.iter().all(|snapshot| snapshot.raw() == 0));
    }

    #[test]
    fn test_byte_packing() {
        let layout = Layout::new(&[FieldSpec::new("A", 3), FieldSpec::new("B", 5)]).unwrap();
        let mut store = BitStore::new(layout);

        store.set_value("A", 0b101);
        store.set_value("B", 0b10110);

        assert_eq!(store.as_bytes(), &[0b101_10110]);
        assert_eq!(store.value("A"), 5);
        assert_eq!(store.value("B"), 22);
    }

    #[test]
    fn test_width_21_field() {
        let layout = Layout::new(&[FieldSpec::new("F", 21)]).unwrap();
        let mut store = BitStore::new(layout);

        store.set_value("F", 0b1_0101_0101_0101_0101_0101);

        assert_eq!(store.value("F"), 1_398_101);
        assert_eq!(store.as_bytes().len(), 3);
    }

    #[test]
    fn test_straddling_field_all_values() {
        let layout = Layout::new(&[FieldSpec::new("pad", 4), FieldSpec::new("x", 12)]).unwrap();
        let mut store = BitStore::new(layout);
        store.set_value("pad", 0b1001);

        for value in 0..(1u64 << 12) {
            store.set_value("x", value);
            assert_eq!(store.value("x"), value);
            assert_eq!(store.value("pad"), 0b1001);
        }
    }

    #[test]
    fn test_write_masks_to_width() {
        let mut store = frame_store();
        store.set_value(Frame::Version, 0xFF);
        assert_eq!(store.value(Frame::Version), 0b111);
        assert_eq!(store.value(Frame::Flags), 0);
    }

    #[test]
    fn test_typed_accessors() {
        let mut store = frame_store();

        store.set(Frame::Flags, -1i8);
        assert_eq!(store.value(Frame::Flags), 0b11111);
        assert_eq!(store.get::<u8>(Frame::Flags), 0b11111);
        assert_eq!(store.signed_value(Frame::Flags), -1);

        store.set(Frame::Flag, true);
        assert!(store.get::<bool>(Frame::Flag));
        store.set(Frame::Flag, false);
        assert!(!store.get::<bool>(Frame::Flag));

        store.set(Frame::Checksum, 0x1F_FFFFu32);
        assert_eq!(store.get::<i32>(Frame::Checksum), 0x1F_FFFF);
        assert_eq!(store.get::<u64>(Frame::Checksum), 0x1F_FFFF);
    }

    #[test]
    fn test_narrow_read_of_wide_field_keeps_leading_bits() {
        let mut store = frame_store();
        store.set_value(Frame::Length, 0xABC);

        assert_eq!(store.get::<u8>(Frame::Length), 0xAB);
        assert_eq!(store.get::<i8>(Frame::Length), 0xABu8 as i8);
        assert_eq!(store.get::<u16>(Frame::Length), 0xABC);
        assert!(store.get::<bool>(Frame::Length));
    }

    #[test]
    fn test_keys_by_index_name_and_enum_agree() {
        let mut store = frame_store();
        store.set_value(2usize, 77);
        assert_eq!(store.value("Length"), 77);
        assert_eq!(store.value(Frame::Length), 77);
        assert_eq!(store.value(String::from("Length")), 77);
    }

    #[test]
    fn test_unknown_keys() {
        let mut store = frame_store();
        assert_eq!(
            store.try_value("Missing"),
            Err(AccessError::UnknownField("Missing".to_string()))
        );
        assert_eq!(
            store.try_set_value(9usize, 1),
            Err(AccessError::UnknownField("#9".to_string()))
        );
        assert_eq!(store.try_set_value(Frame::Flags, 3), Ok(()));
        assert_eq!(store.try_value(Frame::Flags), Ok(3));
    }

    #[test]
    #[should_panic(expected = "unknown field `Missing`")]
    fn test_unknown_key_panics() {
        frame_store().value("Missing");
    }

    #[test]
    #[should_panic(expected = "unknown field `Version`")]
    fn test_foreign_enum_key_panics() {
        let layout = Layout::new(&[FieldSpec::new("Other", 8)]).unwrap();
        BitStore::new(layout).value(Foreign::Version);
    }

    #[test]
    fn test_clear() {
        let mut store = frame_store();
        store.set_value(Frame::Version, 5);
        store.set_value(Frame::Checksum, 12345);
        store.clear_value(Frame::Version);
        assert_eq!(store.value(Frame::Version), 0);
        assert_eq!(store.value(Frame::Checksum), 12345);

        store.clear();
        let once = store.as_bytes().to_vec();
        store.clear();

        assert_eq!(store.as_bytes(), once.as_slice());
        assert_eq!(store, frame_store());
        assert_eq!(store.bit_len(), 42);
    }

    #[test]
    fn test_iteration_snapshots() {
        let mut store = frame_store();
        store.set_value(Frame::Length, 0xABC);
        store.set_value(Frame::Flag, 1);

        let snapshots: Vec<FieldSnapshot> = store.iter().collect();
        assert_eq!(snapshots.len(), 5);
        assert_eq!(snapshots[2].raw(), 0xABC);
        assert_eq!(snapshots[2].get::<u8>(), store.get::<u8>(Frame::Length));
        assert_eq!(snapshots[4].width(), 1);

        store.set_value(Frame::Length, 1);
        assert_eq!(snapshots[2].raw(), 0xABC);

        let restarted: Vec<u64> = (&store).into_iter().map(|s| s.raw()).collect();
        assert_eq!(restarted, vec![0, 0, 1, 0, 1]);
        assert_eq!(store.iter().len(), 5);
    }

    #[test]
    fn test_to_vec_and_export_into() {
        let mut store = frame_store();
        store.set_value(Frame::Version, 3);
        store.set_value(Frame::Flag, 1);

        assert_eq!(store.to_vec::<u64>(), vec![3, 0, 0, 0, 1]);

        let reused = store.export_into(vec![9u16; 7]);
        assert_eq!(reused, vec![3, 0, 0, 0, 1, 0, 0]);

        let allocated = store.export_into(vec![9i32; 2]);
        assert_eq!(allocated, vec![3, 0, 0, 0, 1]);

        // Version holds 0b011: a 1-bit read sees its leading 0.
        assert_eq!(
            store.to_vec::<bool>(),
            vec![false, false, false, false, true]
        );
    }

    #[test]
    fn test_equality_and_hash() {
        let mut a = frame_store();
        let mut b = frame_store();
        assert_eq!(a, a);
        assert_eq!(a, b);

        a.set_value(Frame::Length, 100);
        assert_ne!(a, b);

        b.set_value(Frame::Length, 100);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_equality_across_layouts() {
        let ab = Layout::new(&[FieldSpec::new("a", 4), FieldSpec::new("b", 4)]).unwrap();
        let ba = Layout::new(&[FieldSpec::new("b", 4), FieldSpec::new("a", 4)]).unwrap();
        let wide = Layout::new(&[FieldSpec::new("a", 8), FieldSpec::new("b", 4)]).unwrap();
        let bigger = Layout::new(&[
            FieldSpec::new("a", 4),
            FieldSpec::new("b", 4),
            FieldSpec::new("c", 1),
        ])
        .unwrap();

        let mut left = BitStore::new(ab);
        let mut right = BitStore::new(ba);
        left.set_value("a", 1);
        right.set_value("a", 1);

        assert_eq!(left, right);
        assert_eq!(right, left);
        assert_eq!(hash_of(&left), hash_of(&right));
        assert_ne!(left, BitStore::new(wide));
        assert_ne!(left, BitStore::new(bigger));
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut store = frame_store();
        store.set_value(Frame::Checksum, 0x15_5555);
        let layout = store.layout().clone();

        let restored = BitStore::from_bytes(layout.clone(), store.as_bytes()).unwrap();
        assert_eq!(restored, store);
        assert_eq!(restored.into_bytes(), store.clone().into_bytes());

        assert_eq!(
            BitStore::from_bytes(layout.clone(), vec![0u8; 5]).unwrap_err(),
            ReadError::PacketTooShort {
                expected: 6,
                actual: 5
            }
        );
        assert_eq!(
            BitStore::from_bytes(layout, vec![0u8; 7]).unwrap_err(),
            ReadError::PacketTooLong {
                expected: 6,
                actual: 7
            }
        );
    }

    #[test]
    fn test_debug_map() {
        let layout = Layout::new(&[FieldSpec::new("a", 3), FieldSpec::new("b", 5)]).unwrap();
        let mut store = BitStore::new(layout);
        store.set_value("b", 9);
        assert_eq!(format!("{store:?}"), r#"{"a": 0, "b": 9}"#);
    }
}
