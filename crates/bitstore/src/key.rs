//! Keys that address the fields of a [Layout].
//!
//! A key is anything implementing [FieldKey]: a field index (`usize`), a field
//! name (`&str`/`String`), or a closed enum domain declared with [crate::bit_fields!].
//! Enum domains resolve by ordinal and are checked against the layout's field
//! name, so a key from a different domain never silently aliases another field.

use crate::layout::Layout;

/// Anything that can name a field of a [Layout].
pub trait FieldKey {
    /// Resolves this key to a field index of `layout`, or `None` if the layout has no such field.
    fn resolve(&self, layout: &Layout) -> Option<usize>;

    /// Human-readable form of the key, used in error messages.
    fn describe(&self) -> String;
}

impl FieldKey for usize {
    fn resolve(&self, layout: &Layout) -> Option<usize> {
        (*self < layout.len()).then_some(*self)
    }

    fn describe(&self) -> String {
        format!("#{self}")
    }
}

impl FieldKey for str {
    fn resolve(&self, layout: &Layout) -> Option<usize> {
        layout.index_of(self)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl FieldKey for String {
    fn resolve(&self, layout: &Layout) -> Option<usize> {
        layout.index_of(self)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl<K: FieldKey + ?Sized> FieldKey for &K {
    fn resolve(&self, layout: &Layout) -> Option<usize> {
        (**self).resolve(layout)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// A closed, ordered domain of field keys (usually a fieldless enum).
///
/// `FIELDS[i].ordinal() == i` must hold for every key; [crate::bit_fields!] guarantees it.
pub trait FieldDomain: Copy + 'static {
    /// Every key of the domain, in declaration order.
    const FIELDS: &'static [Self];

    /// Position of this key in [FieldDomain::FIELDS].
    fn ordinal(self) -> usize;

    /// Field name recorded in the layout.
    fn name(self) -> &'static str;
}

/// A key domain whose members report their own bit width.
pub trait FixedWidth: FieldDomain {
    fn bit_width(self) -> u32;
}

/// Declares a fieldless enum usable as a [FieldDomain] key.
///
/// With `Variant: width` entries the enum also implements [FixedWidth] and can be
/// turned into a layout with [Layout::of]; without widths, use [Layout::with_widths].
/// The enum derives `Debug, Clone, Copy, PartialEq, Eq, Hash`.
///
/// ```
/// bitstore::bit_fields! {
///     pub enum Header {
///         Version: 3,
///         Flags: 5,
///         Length: 12,
///     }
/// }
///
/// let layout = bitstore::layout::Layout::of::<Header>().unwrap();
/// assert_eq!(layout.bit_len(), 20);
/// ```
#[macro_export]
macro_rules! bit_fields {
    (@domain
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $crate::key::FieldDomain for $name {
            const FIELDS: &'static [Self] = &[$($name::$variant),+];

            fn ordinal(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }
        }

        impl $crate::key::FieldKey for $name {
            fn resolve(&self, layout: &$crate::layout::Layout) -> Option<usize> {
                let index = $crate::key::FieldDomain::ordinal(*self);
                (layout.name(index) == Some($crate::key::FieldDomain::name(*self))).then_some(index)
            }

            fn describe(&self) -> String {
                $crate::key::FieldDomain::name(*self).to_string()
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident : $width:expr),+ $(,)?
        }
    ) => {
        $crate::bit_fields!(@domain
            $(#[$meta])*
            $vis enum $name {
                $($(#[$vmeta])* $variant),+
            }
        );

        impl $crate::key::FixedWidth for $name {
            fn bit_width(self) -> u32 {
                match self {
                    $($name::$variant => $width,)+
                }
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $crate::bit_fields!(@domain
            $(#[$meta])*
            $vis enum $name {
                $($(#[$vmeta])* $variant),+
            }
        );
    };
}
