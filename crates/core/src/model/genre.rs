use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::GenreId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GenreError {
    #[error("genre name cannot be empty")]
    EmptyName,

    #[error("genre color must be a #rrggbb hex value: {raw}")]
    InvalidColor { raw: String },
}

/// Returns true for a `#rrggbb` hex color string.
pub(crate) fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// A user-defined genre used to shelve books.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    id: GenreId,
    name: String,
    color: String,
    is_default: bool,
    created_at: DateTime<Utc>,
}

impl Genre {
    /// Creates a new genre.
    ///
    /// # Errors
    ///
    /// Returns `GenreError::EmptyName` for a blank name and
    /// `GenreError::InvalidColor` when the color is not `#rrggbb`.
    pub fn new(
        id: GenreId,
        name: impl Into<String>,
        color: impl Into<String>,
        is_default: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, GenreError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GenreError::EmptyName);
        }
        let color = color.into();
        if !is_hex_color(&color) {
            return Err(GenreError::InvalidColor { raw: color });
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            color,
            is_default,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> GenreId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
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
    fn genre_new_happy_path() {
        let genre = Genre::new(GenreId::new(1), "  Fantasy ", "#6366f1", true, fixed_now()).unwrap();
        assert_eq!(genre.name(), "Fantasy");
        assert_eq!(genre.color(), "#6366f1");
        assert!(genre.is_default());
    }

    #[test]
    fn genre_rejects_empty_name() {
        let err = Genre::new(GenreId::new(1), "  ", "#6366f1", false, fixed_now()).unwrap_err();
        assert_eq!(err, GenreError::EmptyName);
    }

    #[test]
    fn genre_rejects_bad_colors() {
        for raw in ["6366f1", "#66f", "#zzzzzz", ""] {
            let err = Genre::new(GenreId::new(1), "SF", raw, false, fixed_now()).unwrap_err();
            assert!(matches!(err, GenreError::InvalidColor { .. }), "{raw}");
        }
    }
}
