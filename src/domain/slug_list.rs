use serde::{Deserialize, Serialize};

use crate::domain::ContentId;

/// A flat list of record slugs for one group of records.
///
/// Each slug names exactly one record, whose id is `id_prefix` followed by
/// the slug. Consumers use these lists to build navigation without loading
/// every record.
///
/// In a content directory a list is stored as an `index.yaml` file:
///
/// ```yaml
/// name: MEDICATION_GUIDE_LIST
/// idPrefix: topic-medication-
/// slugs:
///   - acetaminophen
///   - ibuprofen
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugList {
    /// Name of the list.
    pub name: String,
    /// Prefix that turns a slug into a record id.
    pub id_prefix: String,
    /// The slugs, in display order.
    pub slugs: Vec<String>,
}

impl SlugList {
    /// Creates a list from static data.
    #[must_use]
    pub fn from_static(name: &str, id_prefix: &str, slugs: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            id_prefix: id_prefix.to_string(),
            slugs: slugs.iter().map(ToString::to_string).collect(),
        }
    }

    /// Returns the record id a slug stands for, if it forms a valid id.
    #[must_use]
    pub fn id_for(&self, slug: &str) -> Option<ContentId> {
        format!("{}{slug}", self.id_prefix).parse().ok()
    }

    /// Returns the slug of a record id, if the id belongs to this list's
    /// group.
    #[must_use]
    pub fn slug_of<'a>(&self, id: &'a ContentId) -> Option<&'a str> {
        id.slug_after(&self.id_prefix)
    }
}
