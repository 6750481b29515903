use serde::{Deserialize, Serialize};

use pocketbook_core::{DomainError, DomainResult, ValueObject};

/// Free-form label attached to incomes and expenses ("Salary", "Groceries").
///
/// Always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    pub fn new(name: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("category name required"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Category {}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Category {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Category::new(value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_the_name() {
        assert_eq!(Category::new("  Groceries ").unwrap().as_str(), "Groceries");
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            Category::new(" \t ").unwrap_err(),
            DomainError::Validation("category name required".to_string())
        );
    }

    #[test]
    fn deserializing_validates() {
        assert!(serde_json::from_str::<Category>("\"  \"").is_err());
        let c: Category = serde_json::from_str("\" Rent \"").unwrap();
        assert_eq!(c.to_string(), "Rent");
    }
}
