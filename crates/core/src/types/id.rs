//! Newtype labels for type-safe product and size references.
//!
//! Use the `define_label!` macro to create validated string wrappers that
//! prevent accidentally mixing product identifiers and size labels.

/// Macro to define a validated, non-empty string label.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` as a plain string (trimmed, rejecting blank input)
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `parse()`, `as_str()`, `into_inner()`
/// - `TryFrom<String>`, `TryFrom<&str>` and `Into<String>` implementations
///
/// The second argument names the error type generated alongside the label.
///
/// # Example
///
/// ```rust
/// # use shopfront_core::define_label;
/// define_label!(ColorName, ColorNameError, "color name");
///
/// assert!(ColorName::parse("teal").is_ok());
/// assert!(ColorName::parse("  ").is_err());
/// ```
#[macro_export]
macro_rules! define_label {
    ($name:ident, $error:ident, $what:literal) => {
        #[doc = concat!("Error returned when a ", $what, " is blank.")]
        #[derive(::thiserror::Error, Debug, Clone, PartialEq, Eq)]
        #[error("{} cannot be empty", $what)]
        pub struct $error;

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
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Parse a ", $what, ", trimming surrounding whitespace.")]
            ///
            /// # Errors
            ///
            /// Returns an error if the input is blank.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $error> {
                let s = s.trim();
                if s.is_empty() {
                    return Err($error);
                }
                Ok(Self(s.to_owned()))
            }

            /// Returns the label as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the label and returns its inner string.
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

        impl ::core::convert::TryFrom<String> for $name {
            type Error = $error;

            fn try_from(s: String) -> ::core::result::Result<Self, Self::Error> {
                if s.trim().len() == s.len() && !s.is_empty() {
                    return Ok(Self(s));
                }
                Self::parse(&s)
            }
        }

        impl ::core::convert::TryFrom<&str> for $name {
            type Error = $error;

            fn try_from(s: &str) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(label: $name) -> Self {
                label.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_label!(ProductId, ProductIdError, "product id");
define_label!(Size, SizeError, "size");

impl Size {
    /// Parse an optional size selection.
    ///
    /// A missing selection and a blank one are the same validation failure.
    ///
    /// # Errors
    ///
    /// Returns [`SizeError`] if no size was chosen.
    pub fn from_selection(selection: Option<&str>) -> Result<Self, SizeError> {
        selection.map_or(Err(SizeError), Self::parse)
    }
}
