//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// The maximum number of characters allowed in a category title.
pub const MAX_TITLE_LENGTH: usize = 50;

/// The glyph shown for a category when none was provided.
pub const DEFAULT_CATEGORY_ICON: &str = "📁";

/// A validated, non-empty category title of at most [MAX_TITLE_LENGTH] characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryTitle(String);

impl CategoryTitle {
    /// Create a category title.
    ///
    /// # Errors
    ///
    /// Returns an [Error::EmptyCategoryTitle] if `title` is empty after
    /// trimming, or an [Error::CategoryTitleTooLong] if it is longer than
    /// [MAX_TITLE_LENGTH] characters.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            return Err(Error::EmptyCategoryTitle);
        }

        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(Error::CategoryTitleTooLong(MAX_TITLE_LENGTH));
        }

        Ok(Self(title.to_string()))
    }

    /// Create a category title without validation.
    ///
    /// The caller should ensure that the string is not empty and not longer
    /// than [MAX_TITLE_LENGTH] characters.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl AsRef<str> for CategoryTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryTitle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryTitle::new(s)
    }
}

impl Display for CategoryTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a category groups money coming in or going out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum CategoryKind {
    /// Money coming in, e.g. a salary.
    Income,
    /// Money going out, e.g. groceries.
    Expense,
}

impl CategoryKind {
    /// The string stored in the database for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "Income",
            CategoryKind::Expense => "Expense",
        }
    }
}

impl Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(CategoryKind::Income),
            "Expense" => Ok(CategoryKind::Expense),
            _ => Err(Error::InvalidCategoryKind(s.to_string())),
        }
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A label that transactions are grouped under (e.g., 'Salary', 'Groceries').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub title: CategoryTitle,
    pub icon: String,
    pub kind: CategoryKind,
}

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub title: String,
    #[serde(default)]
    pub icon: String,
    pub kind: String,
}

/// Clamp the submitted icon to a short display glyph, falling back to the
/// default glyph when blank.
pub(crate) fn normalize_icon(icon: &str) -> String {
    let icon = icon.trim();

    if icon.is_empty() {
        return DEFAULT_CATEGORY_ICON.to_string();
    }

    icon.chars().take(10).collect()
}

#[cfg(test)]
mod category_title_tests {
    use crate::{
        Error,
        category::{
            CategoryTitle,
            domain::MAX_TITLE_LENGTH,
        },
    };

    #[test]
    fn new_fails_on_empty_string() {
        let title = CategoryTitle::new("");

        assert_eq!(title, Err(Error::EmptyCategoryTitle));
    }

    #[test]
    fn new_fails_on_just_whitespace() {
        let title = CategoryTitle::new("\n\t \r");

        assert_eq!(title, Err(Error::EmptyCategoryTitle));
    }

    #[test]
    fn new_fails_on_title_longer_than_max_length() {
        let too_long = "x".repeat(MAX_TITLE_LENGTH + 1);

        let title = CategoryTitle::new(&too_long);

        assert_eq!(title, Err(Error::CategoryTitleTooLong(MAX_TITLE_LENGTH)));
    }

    #[test]
    fn new_counts_characters_not_bytes() {
        // 50 multi-byte characters must be accepted.
        let emoji_title = "🔥".repeat(MAX_TITLE_LENGTH);

        let title = CategoryTitle::new(&emoji_title);

        assert!(title.is_ok());
    }

    #[test]
    fn new_trims_whitespace() {
        let title = CategoryTitle::new("  Groceries  ").unwrap();

        assert_eq!(title.as_ref(), "Groceries");
    }
}
