//! Sort specification carried by a [`PageLink`](super::PageLink).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Apply this direction to an ascending comparison result.
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(AppError::validation(format!(
                "Invalid sort direction: '{s}'. Expected ASC or DESC"
            ))),
        }
    }
}

/// A sort specification: entity property name plus direction.
///
/// The property is kept as the caller supplied it; each store resolves it
/// against the entity's sortable properties and rejects unknown names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    /// Entity property to sort by.
    pub property: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    /// Create a new sort order.
    pub fn new(property: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }

    /// Create an ascending sort on the given property.
    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Asc)
    }

    /// Create a descending sort on the given property.
    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(property, SortDirection::Desc)
    }
}
