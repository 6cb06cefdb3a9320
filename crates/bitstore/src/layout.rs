//! Layout: the ordered, fixed set of fields a [crate::store::BitStore] packs.

use std::{collections::HashMap, fmt};

use crate::{
    errors::SchemaError,
    field::FieldSpec,
    key::{FieldDomain, FixedWidth},
};

/// Widest field a layout accepts.
pub const MAX_FIELD_BITS: u32 = 64;

/// A compiled layout: field names, widths and the prefix-sum offset table.
///
/// Field `i` occupies bits `[offset(i), offset(i) + width(i))` of the buffer. The
/// offset table has one sentinel entry past the end, so `bit_len()` is its last entry.
/// Use [Layout::new], [Layout::of] or [Layout::with_widths] to build one.
#[derive(Clone, PartialEq, Eq)]
pub struct Layout {
    names: Vec<String>,
    widths: Vec<u32>,
    offsets: Vec<usize>,
    by_name: HashMap<String, usize>,
}

impl Layout {
    /// Compiles a slice of [FieldSpec]s into a layout. Fails if any field is invalid.
    pub fn new(fields: &[FieldSpec]) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut names = Vec::with_capacity(fields.len());
        let mut widths = Vec::with_capacity(fields.len());
        let mut offsets = Vec::with_capacity(fields.len() + 1);
        let mut by_name = HashMap::with_capacity(fields.len());
        let mut total_bits = 0;

        for (index, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName(index));
            }

            if field.width == 0 || field.width > MAX_FIELD_BITS {
                return Err(SchemaError::InvalidFieldSize {
                    name: field.name.clone(),
                    width: field.width,
                });
            }

            if by_name.insert(field.name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateFieldName(field.name.clone()));
            }

            offsets.push(total_bits);
            total_bits += field.width as usize;

            names.push(field.name.clone());
            widths.push(field.width);
        }

        offsets.push(total_bits);

        Ok(Self {
            names,
            widths,
            offsets,
            by_name,
        })
    }

    /// Builds a layout from a key domain whose members report their own width.
    pub fn of<K: FixedWidth>() -> Result<Self, SchemaError> {
        Self::with_widths(K::bit_width)
    }

    /// Builds a layout from a key domain and an external width function evaluated per key.
    pub fn with_widths<K: FieldDomain>(width: impl Fn(K) -> u32) -> Result<Self, SchemaError> {
        let fields: Vec<FieldSpec> = K::FIELDS
            .iter()
            .map(|&key| FieldSpec::new(key.name(), width(key)))
            .collect();

        Self::new(&fields)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// Always `false`: a layout has at least one field.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Total size in bits: the sum of all field widths.
    pub fn bit_len(&self) -> usize {
        self.offsets[self.len()]
    }

    /// Size of the backing buffer in bytes.
    pub fn byte_len(&self) -> usize {
        self.bit_len().div_ceil(8)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn width(&self, index: usize) -> Option<u32> {
        self.widths.get(index).copied()
    }

    /// Start bit of the field at `index`.
    pub fn offset(&self, index: usize) -> Option<usize> {
        (index < self.len()).then(|| self.offsets[index])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Iterates the fields in layout order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldSpec> + '_ {
        self.names
            .iter()
            .zip(&self.widths)
            .map(|(name, &width)| FieldSpec::new(name.clone(), width))
    }

    /// Bit range `[start, end)` of the field at `index`. `index` must be in range.
    pub(crate) fn span(&self, index: usize) -> (usize, usize) {
        (self.offsets[index], self.offsets[index + 1])
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Entry<'a> {
            name: &'a str,
            width: u32,
            offset: usize,
        }

        impl fmt::Debug for Entry<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct("Field")
                    .field("name", &self.name)
                    .field("width", &self.width)
                    .field("offset", &self.offset)
                    .finish()
            }
        }

        f.debug_list()
            .entries((0..self.len()).map(|index| Entry {
                name: &self.names[index],
                width: self.widths[index],
                offset: self.offsets[index],
            }))
            .finish()
    }
}

#[cfg(feature = "serde")]
impl TryFrom<crate::serde::SchemaDef> for Layout {
    type Error = SchemaError;

    fn try_from(value: crate::serde::SchemaDef) -> Result<Self, Self::Error> {
        let fields: Vec<FieldSpec> = value.fields.into_iter().map(Into::into).collect();
        Self::new(&fields)
    }
}
