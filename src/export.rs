//! JSON export for consuming applications.
//!
//! [`to_json`] writes every record as one JSON array with the same camelCase
//! keys as the record files. A [`Manifest`] is a smaller snapshot of each
//! record's id, version and text fingerprint, used to find records whose text
//! changed without a version bump.

use std::{collections::BTreeMap, fs, io, num::NonZeroU32, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    domain::{Catalog, ContentId, EducationalContent, Status},
    validation::{Check, Issue},
};

/// Serializes every record in the catalog, sorted by id, as a pretty-printed
/// JSON array.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json(catalog: &Catalog) -> Result<String, serde_json::Error> {
    let records: Vec<&EducationalContent> = catalog.iter().collect();
    serde_json::to_string_pretty(&records)
}

/// Parses a JSON array of records, as written by [`to_json`].
///
/// # Errors
///
/// Returns an error if the text is not a JSON array of valid records.
pub fn from_json(json: &str) -> Result<Vec<EducationalContent>, serde_json::Error> {
    serde_json::from_str(json)
}

/// One record's entry in a [`Manifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// The record id.
    pub id: ContentId,
    /// The record's editorial version.
    pub version: NonZeroU32,
    /// The record's editorial status.
    pub status: Status,
    /// When the record was last edited.
    pub updated_at: DateTime<Utc>,
    /// See [`EducationalContent::fingerprint`].
    pub fingerprint: String,
}

impl From<&EducationalContent> for ManifestEntry {
    fn from(record: &EducationalContent) -> Self {
        Self {
            id: record.id.clone(),
            version: record.version,
            status: record.status,
            updated_at: record.updated_at,
            fingerprint: record.fingerprint(),
        }
    }
}

/// A snapshot of every record's version and fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    records: Vec<ManifestEntry>,
}

/// A difference between a manifest and the current records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    /// The text changed but the version did not.
    UnversionedChange {
        /// The record.
        id: ContentId,
        /// The version in both the manifest and the record.
        version: NonZeroU32,
    },
    /// The version went backwards.
    VersionDecreased {
        /// The record.
        id: ContentId,
        /// The version in the manifest.
        previous: NonZeroU32,
        /// The current version.
        current: NonZeroU32,
    },
    /// The record is not in the manifest.
    Added(ContentId),
    /// The record is in the manifest but no longer exists.
    Removed(ContentId),
}

impl Drift {
    /// Converts the drift into a validation issue, if it is one.
    ///
    /// New records are expected and produce no issue; removed records are
    /// warnings; version problems are errors.
    #[must_use]
    pub fn to_issue(&self) -> Option<Issue> {
        const CHECK: Check = Check::Metadata;

        match self {
            Self::UnversionedChange { id, version } => Some(Issue::error(
                CHECK,
                id,
                format!("text changed since the manifest but version is still {version}"),
            )),
            Self::VersionDecreased {
                id,
                previous,
                current,
            } => Some(Issue::error(
                CHECK,
                id,
                format!("version decreased from {previous} to {current}"),
            )),
            Self::Added(_) => None,
            Self::Removed(id) => Some(Issue::warning(
                CHECK,
                id,
                "record in the manifest no longer exists",
            )),
        }
    }
}

impl Manifest {
    /// Snapshots every record in the catalog, sorted by id.
    #[must_use]
    pub fn from_catalog(catalog: &Catalog) -> Self {
        Self {
            records: catalog.iter().map(ManifestEntry::from).collect(),
        }
    }

    /// The entries, sorted by id.
    #[must_use]
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.records
    }

    /// Finds the entry for a record.
    #[must_use]
    pub fn get(&self, id: &ContentId) -> Option<&ManifestEntry> {
        self.records.iter().find(|entry| &entry.id == id)
    }

    /// Compares the manifest with the current records.
    ///
    /// Results are ordered by id.
    #[instrument(level = "debug", skip_all)]
    #[must_use]
    pub fn drift(&self, catalog: &Catalog) -> Vec<Drift> {
        let previous: BTreeMap<&ContentId, &ManifestEntry> =
            self.records.iter().map(|entry| (&entry.id, entry)).collect();

        let mut drift: BTreeMap<ContentId, Drift> = BTreeMap::new();

        for record in catalog.iter() {
            let Some(entry) = previous.get(&record.id) else {
                drift.insert(record.id.clone(), Drift::Added(record.id.clone()));
                continue;
            };

            if record.version < entry.version {
                drift.insert(
                    record.id.clone(),
                    Drift::VersionDecreased {
                        id: record.id.clone(),
                        previous: entry.version,
                        current: record.version,
                    },
                );
            } else if record.version == entry.version && record.fingerprint() != entry.fingerprint
            {
                drift.insert(
                    record.id.clone(),
                    Drift::UnversionedChange {
                        id: record.id.clone(),
                        version: record.version,
                    },
                );
            }
        }

        for id in previous.keys() {
            if !catalog.contains(id) {
                drift.insert((*id).clone(), Drift::Removed((*id).clone()));
            }
        }

        drift.into_values().collect()
    }

    /// Serializes the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a manifest from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a manifest.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Writes the manifest to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Errors that can occur when reading or writing a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The manifest file could not be read or written.
    #[error("failed to access manifest: {0}")]
    Io(#[from] io::Error),
    /// The manifest is not valid JSON.
    #[error("invalid manifest: {0}")]
    Json(#[from] serde_json::Error),
}
