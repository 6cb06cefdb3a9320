//! JSON‑deserializable layout description.
//!
//! These types describe the *shape* of a packed record. They are intended to be
//! constructed from JSON (for example a layout file shipped with your
//! application) and then compiled into a [crate::layout::Layout] with `TryFrom`.
//!
//! ```json
//! { "fields": [ { "name": "version", "width": 3 }, { "name": "flags", "width": 5 } ] }
//! ```

use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// Top‑level layout definition consisting of an ordered list of fields.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SchemaDef {
    /// Fields in packing order; the first field occupies the lowest bit offsets.
    pub fields: Vec<FieldDef>,
}

/// Description of a single packed field.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Unique, non‑empty field name.
    pub name: String,
    /// Width in bits, 1..=64.
    pub width: u32,
}

impl From<&Layout> for SchemaDef {
    fn from(layout: &Layout) -> Self {
        SchemaDef {
            fields: layout
                .fields()
                .map(|field| FieldDef {
                    name: field.name,
                    width: field.width,
                })
                .collect(),
        }
    }
}
