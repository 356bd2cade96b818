//! Catalog entries offered as choices on the settings form.

use crate::{IndexId, LocationTypeId};
use serde::Serialize;

/// A selectable location content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationTypeOption {
    /// Content type id.
    pub id: LocationTypeId,
    /// Display label.
    pub label: Box<str>,
}

/// A selectable search index of the local-index backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchIndexOption {
    /// Index id.
    pub id: IndexId,
    /// Display label.
    pub label: Box<str>,
}
