//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

/// Macro to define a type-safe, prefixed string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `generate()` producing `<prefix>_<epoch-millis>_<9 random chars>`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>` and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use stockroom_core::define_id;
/// define_id!(ShiftId, "shift");
///
/// let id = ShiftId::generate();
/// assert!(id.as_str().starts_with("shift_"));
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix used by [`Self::generate`].
            pub const PREFIX: &'static str = $prefix;

            /// Wrap an existing ID value.
            #[must_use]
            pub const fn new(id: String) -> Self {
                Self(id)
            }

            /// Generate a fresh ID from the current time and random suffix.
            #[must_use]
            pub fn generate() -> Self {
                let millis = ::chrono::Utc::now().timestamp_millis();
                let random = ::uuid::Uuid::new_v4().simple().to_string();
                let suffix: String = random.chars().take(9).collect();
                Self(format!("{}_{}_{}", $prefix, millis, suffix))
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
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

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
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
define_id!(AccountId, "user");
define_id!(ReceiptId, "rcpt");
