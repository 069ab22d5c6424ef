//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Catalog identifiers
//! are opaque strings handed to us by the catalog collaborator, so every ID
//! wraps a `String`.

use uuid::Uuid;

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use emporium_core::define_id;
/// define_id!(ProductId);
/// define_id!(VariantId);
///
/// let product_id = ProductId::new("prod_1");
/// let variant_id = VariantId::new("prod_1");
///
/// // These are different types, so this won't compile:
/// // let _: ProductId = variant_id;
/// assert_eq!(product_id.as_str(), variant_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from any string-like value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Convert into the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CartEntryId);

impl CartEntryId {
    /// Prefix for identifiers assigned on the client before any server sync.
    pub const TEMP_PREFIX: &'static str = "temp-";

    /// Generate a fresh process-unique identifier for a new cart entry.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{}{}", Self::TEMP_PREFIX, Uuid::new_v4()))
    }

    /// Whether this identifier was generated locally.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(Self::TEMP_PREFIX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_temporary() {
        let a = CartEntryId::generate();
        let b = CartEntryId::generate();
        assert_ne!(a, b);
        assert!(a.is_temporary());
        assert!(!CartEntryId::new("line_42").is_temporary());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = VariantId::new("var_7");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"var_7\"");
        assert_eq!(id.to_string(), "var_7");
    }
}
