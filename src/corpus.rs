//! The built-in content library.
//!
//! Every record is a YAML document under `content/`, compiled into the crate
//! and exposed as one named [`EmbeddedRecord`] constant. Each group module
//! also exports the full list of its records and a flat slug list:
//!
//! ```
//! use primer::corpus::medications::{ACETAMINOPHEN, MEDICATION_GUIDE_LIST};
//!
//! let record = ACETAMINOPHEN.load().unwrap();
//! assert_eq!(record.id.as_str(), "topic-medication-acetaminophen");
//! assert!(MEDICATION_GUIDE_LIST.contains(&ACETAMINOPHEN.slug));
//! ```

use thiserror::Error;
use tracing::instrument;

use crate::domain::{Catalog, CatalogError, Config, EducationalContent, SlugList};

/// Declares an [`EmbeddedRecord`] for `content/<group>/<slug>.yaml`.
macro_rules! embedded {
    ($group:literal, $prefix:literal, $slug:literal) => {
        $crate::corpus::EmbeddedRecord {
            slug: $slug,
            id: concat!($prefix, $slug),
            path: concat!("content/", $group, "/", $slug, ".yaml"),
            source: include_str!(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/content/",
                $group,
                "/",
                $slug,
                ".yaml"
            )),
        }
    };
}

pub mod medications;
pub mod rehabilitation;

const CONFIG_SOURCE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/content/.primer/config.toml"
));

/// A record compiled into the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedRecord {
    /// The record's entry in its group's slug list.
    pub slug: &'static str,
    /// The record id the YAML document must declare.
    pub id: &'static str,
    /// Source file, relative to the crate root.
    pub path: &'static str,
    /// The YAML document.
    pub source: &'static str,
}

impl EmbeddedRecord {
    /// Parses the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid record, or declares a
    /// different id than the constant.
    pub fn load(&self) -> Result<EducationalContent, CorpusError> {
        let record = EducationalContent::from_yaml(self.source).map_err(|source| {
            CorpusError::Parse {
                path: self.path,
                source,
            }
        })?;

        if record.id.as_str() != self.id {
            return Err(CorpusError::IdMismatch {
                path: self.path,
                expected: self.id,
                found: record.id.to_string(),
            });
        }

        Ok(record)
    }
}

/// Errors in the built-in corpus.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A record document does not match the schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// The source file.
        path: &'static str,
        /// The parse error.
        source: serde_yaml::Error,
    },
    /// A document declares a different id than its constant.
    #[error("{path} declares id {found}, expected {expected}")]
    IdMismatch {
        /// The source file.
        path: &'static str,
        /// The id of the constant.
        expected: &'static str,
        /// The id in the document.
        found: String,
    },
    /// Two records share an id.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The corpus configuration is invalid.
    #[error("invalid corpus configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Every built-in record, medication guides first.
pub fn records() -> impl Iterator<Item = &'static EmbeddedRecord> {
    medications::GUIDES.iter().chain(rehabilitation::TOPICS)
}

/// Parses every built-in record.
///
/// # Errors
///
/// Returns the first record that fails to load.
pub fn load_all() -> Result<Vec<EducationalContent>, CorpusError> {
    records().map(EmbeddedRecord::load).collect()
}

/// Builds a catalog of the whole built-in corpus.
///
/// # Errors
///
/// Returns an error if a record fails to load or two records share an id.
#[instrument]
pub fn catalog() -> Result<Catalog, CorpusError> {
    let catalog = Catalog::from_records(load_all()?)?;
    tracing::debug!(records = catalog.len(), "loaded built-in corpus");
    Ok(catalog)
}

/// The slug lists of the built-in corpus.
#[must_use]
pub fn slug_lists() -> Vec<SlugList> {
    vec![
        SlugList::from_static(
            "MEDICATION_GUIDE_LIST",
            medications::ID_PREFIX,
            medications::MEDICATION_GUIDE_LIST,
        ),
        SlugList::from_static(
            "REHABILITATION_TOPIC_LIST",
            rehabilitation::ID_PREFIX,
            rehabilitation::REHABILITATION_TOPIC_LIST,
        ),
    ]
}

/// The configuration the built-in corpus is validated with.
///
/// It documents the cross-reference targets that live outside this library.
///
/// # Errors
///
/// Returns an error if the embedded configuration is invalid.
pub fn config() -> Result<Config, CorpusError> {
    Ok(toml::from_str(CONFIG_SOURCE)?)
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, ffi::OsStr, path::Path};

    use walkdir::WalkDir;

    use super::*;
    use crate::{
        domain::ComplexityLevel,
        storage::{Directory, INDEX_FILE},
        validation::{Check, validate},
    };

    #[test]
    fn every_record_loads() {
        for embedded in records() {
            let record = embedded.load().unwrap_or_else(|e| panic!("{e}"));
            assert!(!record.id.as_str().is_empty());
        }
    }

    #[test]
    fn ids_are_unique() {
        let ids: BTreeSet<_> = records().map(|record| record.id).collect();
        assert_eq!(ids.len(), records().count());
        catalog().unwrap();
    }

    #[test]
    fn corpus_validates_cleanly() {
        let catalog = catalog().unwrap();
        let config = config().unwrap();
        let report = validate(&catalog, &config, &slug_lists());
        assert!(report.is_empty(), "{:#?}", report.issues());
    }

    #[test]
    fn cross_references_resolve_or_are_external() {
        let catalog = catalog().unwrap();
        let config = config().unwrap();
        for dangling in catalog.dangling_references() {
            assert!(
                config.is_external(dangling.target),
                "{} refers to unknown {}",
                dangling.source,
                dangling.target
            );
        }
    }

    #[test]
    fn hierarchy_is_acyclic_and_reciprocated() {
        let catalog = catalog().unwrap();
        assert!(catalog.hierarchy_cycles().is_empty());
        assert!(catalog.unreciprocated_links().is_empty());
    }

    #[test]
    fn every_citation_url_is_valid() {
        let catalog = catalog().unwrap();
        let report = crate::validation::Validator::new(&catalog, &config().unwrap())
            .run(&[Check::Citations]);
        assert!(report.is_ok(), "{:#?}", report.issues());
    }

    #[test]
    fn lists_match_modules() {
        let guides: Vec<_> = medications::GUIDES.iter().map(|r| r.slug).collect();
        assert_eq!(guides, medications::MEDICATION_GUIDE_LIST);

        let topics: Vec<_> = rehabilitation::TOPICS.iter().map(|r| r.slug).collect();
        assert_eq!(topics, rehabilitation::REHABILITATION_TOPIC_LIST);

        for list in slug_lists() {
            for slug in &list.slugs {
                let id = list.id_for(slug).unwrap();
                assert!(
                    records().any(|record| record.id == id.as_str()),
                    "{slug} has no record"
                );
            }
        }
    }

    #[test]
    fn every_content_file_is_embedded() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let embedded: BTreeSet<&str> = records().map(|record| record.path).collect();

        let on_disk: BTreeSet<String> = WalkDir::new(root.join("content"))
            .into_iter()
            .filter_map(Result::ok)
            .map(walkdir::DirEntry::into_path)
            .filter(|path| path.extension() == Some(OsStr::new("yaml")))
            .filter(|path| path.file_name() != Some(OsStr::new(INDEX_FILE)))
            .map(|path| {
                path.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();

        let embedded: BTreeSet<String> = embedded.into_iter().map(str::to_string).collect();
        assert_eq!(on_disk, embedded);
    }

    #[test]
    fn content_directory_matches_built_in_corpus() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("content");
        let dir = Directory::new(root).load_all().unwrap();

        let built_in = catalog().unwrap();
        assert_eq!(dir.catalog().len(), built_in.len());
        for record in built_in.iter() {
            assert_eq!(dir.catalog().get(&record.id), Some(record));
        }

        let mut lists = dir.lists().to_vec();
        lists.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(lists, slug_lists());

        assert_eq!(dir.config(), &config().unwrap());
        let mut checks = Check::CATALOG.to_vec();
        checks.push(Check::Paths);
        assert!(dir.validate(&checks).is_empty());
    }

    #[test]
    fn json_round_trip_is_identical() {
        for record in load_all().unwrap() {
            let json = serde_json::to_string(&record).unwrap();
            let back: EducationalContent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, record, "{}", record.id);
        }
    }

    #[test]
    fn acetaminophen_references_ibuprofen() {
        use medications::{ACETAMINOPHEN, IBUPROFEN};

        let acetaminophen = ACETAMINOPHEN.load().unwrap();
        assert_eq!(acetaminophen.id.as_str(), "topic-medication-acetaminophen");

        let level1 = acetaminophen.level(ComplexityLevel::Level1).unwrap();
        assert!(!level1.title.trim().is_empty());

        let catalog = catalog().unwrap();
        let resolved = catalog
            .cross_references(&acetaminophen.id)
            .into_iter()
            .find(|r| r.reference.target_id.as_str() == "topic-medication-ibuprofen")
            .unwrap();
        assert_eq!(resolved.target.unwrap().id.as_str(), IBUPROFEN.id);
        assert_eq!(IBUPROFEN.load().unwrap().id, resolved.reference.target_id);
    }

    #[test]
    fn mismatched_id_is_rejected() {
        let wrong = EmbeddedRecord {
            id: "topic-medication-paracetamol",
            ..medications::ACETAMINOPHEN
        };
        assert!(matches!(
            wrong.load().unwrap_err(),
            CorpusError::IdMismatch { .. }
        ));
    }
}
