//! Definition of the field descriptors used to build a [crate::layout::Layout].

/// A single named field: a fixed-width bit range in the packed buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name used to address the field and to compare stores of different layouts.
    pub name: String,
    /// Width in bits, 1..=64.
    pub width: u32,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        FieldSpec {
            name: name.into(),
            width,
        }
    }
}

#[cfg(feature = "serde")]
impl From<crate::serde::FieldDef> for FieldSpec {
    fn from(value: crate::serde::FieldDef) -> Self {
        FieldSpec {
            name: value.name,
            width: value.width,
        }
    }
}
