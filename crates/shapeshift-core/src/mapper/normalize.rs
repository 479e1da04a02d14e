//! Field name normalization
//!
//! Copyright (c) 2025 Shapeshift Team
//! Licensed under the Apache-2.0 license

use std::borrow::Borrow;
use std::fmt;

const SEPARATOR: char = '_';

/// Join key between field names and map keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NormalizedKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ASCII lower-case `name` and drop every `_`
///
/// `createdAt`, `CreatedAt` and `created_at` all become `createdat`.
pub fn normalize(name: &str) -> NormalizedKey {
    NormalizedKey(
        name.chars()
            .filter(|c| *c != SEPARATOR)
            .map(|c| c.to_ascii_lowercase())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_casing_styles_collapse() {
        let expected = normalize("createdat");
        assert_eq!(normalize("createdAt"), expected);
        assert_eq!(normalize("CreatedAt"), expected);
        assert_eq!(normalize("created_at"), expected);
        assert_eq!(normalize("__CREATED__AT"), expected);
    }

    #[test]
    fn test_non_ascii_is_kept() {
        assert_eq!(normalize("Ünit_Price").as_str(), "Ünitprice");
    }

    #[test]
    fn test_empty_and_separator_only() {
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize("___").as_str(), "");
    }
}
