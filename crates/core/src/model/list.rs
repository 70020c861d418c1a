use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::genre::is_hex_color;
use crate::model::ids::ListId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ListError {
    #[error("list name cannot be empty")]
    EmptyName,

    #[error("list color must be a #rrggbb hex value: {raw}")]
    InvalidColor { raw: String },
}

/// A custom, user-curated collection of books ("to read in 2026", "loans", …).
///
/// Membership lives in storage; the list itself only carries presentation
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingList {
    id: ListId,
    name: String,
    description: Option<String>,
    color: String,
    created_at: DateTime<Utc>,
}

impl ReadingList {
    /// Creates a new list.
    ///
    /// # Errors
    ///
    /// Returns `ListError::EmptyName` for a blank name and
    /// `ListError::InvalidColor` when the color is not `#rrggbb`.
    pub fn new(
        id: ListId,
        name: impl Into<String>,
        description: Option<String>,
        color: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ListError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ListError::EmptyName);
        }
        let color = color.into();
        if !is_hex_color(&color) {
            return Err(ListError::InvalidColor { raw: color });
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            description,
            color,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ListId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn list_trims_name_and_filters_empty_description() {
        let list = ReadingList::new(
            ListId::new(1),
            "  Summer reading ",
            Some("   ".into()),
            "#8b5cf6",
            fixed_now(),
        )
        .unwrap();
        assert_eq!(list.name(), "Summer reading");
        assert_eq!(list.description(), None);
    }

    #[test]
    fn list_rejects_empty_name() {
        let err =
            ReadingList::new(ListId::new(1), "", None, "#8b5cf6", fixed_now()).unwrap_err();
        assert_eq!(err, ListError::EmptyName);
    }

    #[test]
    fn list_rejects_bad_color() {
        let err =
            ReadingList::new(ListId::new(1), "Loans", None, "purple", fixed_now()).unwrap_err();
        assert!(matches!(err, ListError::InvalidColor { .. }));
    }
}
