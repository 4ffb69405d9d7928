//! Schema descriptors.
//!
//! Each entity type declares a closed enum of its properties with the
//! [`properties!`](crate::properties) macro. A property maps to one storage
//! column and optionally carries a read transform (stored value to exposed
//! value), a write transform (incoming value to stored value) and the
//! column's affinity, which decides how storage converts what is written.
//! Because the
//! property names are enum variants, the set is fixed at compile time and
//! names cannot collide within one entity type.

use std::fmt;

use rowkeep_core::{Affinity, ColumnValue, CoreError, Transform};

#[derive(Debug, Clone, Copy)]
pub struct PropertySpec {
    pub column: &'static str,
    pub affinity: Affinity,
    pub read: Option<Transform>,
    pub write: Option<Transform>,
}

impl PropertySpec {
    pub const fn column(column: &'static str) -> Self {
        Self {
            column,
            affinity: Affinity::Blob,
            read: None,
            write: None,
        }
    }

    pub fn apply_read(&self, stored: ColumnValue) -> Result<ColumnValue, CoreError> {
        match self.read {
            Some(transform) => transform(stored),
            None => Ok(stored),
        }
    }

    /// The value storage will hold for `incoming`: the write transform
    /// followed by the column's affinity conversion.
    pub fn apply_write(&self, incoming: ColumnValue) -> Result<ColumnValue, CoreError> {
        let transformed = match self.write {
            Some(transform) => transform(incoming)?,
            None => incoming,
        };
        self.affinity.coerce(transformed)
    }
}

pub trait Property: Copy + Eq + fmt::Debug + 'static {
    /// The logical name, as used by string dispatch (`get<Name>`).
    fn name(self) -> &'static str;

    fn spec(self) -> PropertySpec;

    fn all() -> &'static [Self];

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }

    /// Distinct storage columns, in declaration order.
    fn columns() -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = Vec::new();
        for property in Self::all() {
            let column = property.spec().column;
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        columns
    }
}

/// Declare an entity's property enum and its column mapping in one place.
///
/// Without `as <Affinity>` a column is treated as having no affinity
/// ([`Affinity::Blob`]) and written values are cached unchanged.
///
/// ```ignore
/// properties! {
///     pub enum UserProperty {
///         Username => "USERNAME" as Text;
///         Color => "COLOR", read = transform::bytes_to_hex, write = transform::hex_to_bytes;
///         Suspended => "SUSPENDED" as Integer;
///     }
/// }
/// ```
#[macro_export]
macro_rules! properties {
    (@transform) => {
        ::core::option::Option::None
    };
    (@transform $f:path) => {
        ::core::option::Option::Some($f as $crate::Transform)
    };
    (@affinity) => {
        $crate::Affinity::Blob
    };
    (@affinity $affinity:ident) => {
        $crate::Affinity::$affinity
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $column:literal
                $(as $affinity:ident)?
                $(, read = $read:path)?
                $(, write = $write:path)?
            );* $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $crate::Property for $name {
            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            fn spec(self) -> $crate::PropertySpec {
                match self {
                    $(
                        Self::$variant => $crate::PropertySpec {
                            column: $column,
                            affinity: $crate::properties!(@affinity $($affinity)?),
                            read: $crate::properties!(@transform $($read)?),
                            write: $crate::properties!(@transform $($write)?),
                        },
                    )*
                }
            }

            fn all() -> &'static [Self] {
                &[$(Self::$variant),*]
            }
        }
    };
}
