//! Identifiers
//!
//! Opaque, ordered identifiers for rules, channels, products and customer segments.

use std::fmt;

pub mod set;

pub use set::IdSet;

macro_rules! new_id_type {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name(String);

        impl $name {
            /// Create a new identifier from anything string-like.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

new_id_type! {
    /// Discount rule identifier
    pub struct RuleId;
}

new_id_type! {
    /// Sales channel identifier
    pub struct ChannelId;
}

new_id_type! {
    /// Product identifier
    pub struct ProductId;
}

new_id_type! {
    /// Customer segment identifier
    pub struct CustomerSegment;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_order_lexicographically() {
        let mut ids = vec![RuleId::from("b"), RuleId::from("a10"), RuleId::from("a2")];

        ids.sort();

        assert_eq!(
            ids,
            vec![RuleId::from("a10"), RuleId::from("a2"), RuleId::from("b")]
        );
    }

    #[test]
    fn display_matches_inner_string() {
        let channel = ChannelId::new(String::from("web"));

        assert_eq!(channel.to_string(), "web");
        assert_eq!(channel.as_str(), "web");
    }
}
