//! Domain models for educational content.
//!
//! This module contains the core domain types: the content record schema,
//! content identifiers, complexity levels, the in-memory catalog and
//! configuration.

/// The content record schema.
pub mod content;
pub use content::{
    BodyError, Citation, CitationType, ClinicalRelevance, ContentBody, ContentTags, ContentType,
    CrossReference, EducationalContent, ExamRelevance, GuideContent, KeyTerm, LevelContent, Media,
    MediaType, Relationship, Status,
};

/// Content identifier types and parsing.
pub mod content_id;
pub use content_id::{ContentId, Error as ContentIdError};

/// Difficulty tiers.
pub mod level;
pub use level::ComplexityLevel;

/// In-memory index of records and their cross-references.
pub mod catalog;
pub use catalog::{Catalog, CatalogError};

mod config;
pub use config::Config;

/// Flat slug lists indexing groups of records.
pub mod slug_list;
pub use slug_list::SlugList;
