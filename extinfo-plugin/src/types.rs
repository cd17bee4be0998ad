use std::fmt;

/// A newtype wrapper for plugin metadata strings.
macro_rules! metadata_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub struct $name(&'static str);

        impl $name {
            /// Creates a new instance from a static string.
            #[must_use]
            pub const fn new(value: &'static str) -> Self {
                Self(value)
            }

            /// Returns the inner string value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                self.0
            }
        }

        impl From<&'static str> for $name {
            fn from(value: &'static str) -> Self {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0
            }
        }
    };
}

metadata_type!(Name, "Name of a plugin");
metadata_type!(Author, "Author of a plugin");
metadata_type!(Version, "Version of a plugin");
metadata_type!(Description, "Short description of a plugin");
