//! Structured patient education content
//!
//! Educational records about medications and rehabilitation topics, with the
//! schema they share, a built-in corpus, integrity validation and JSON export.
//! Records are YAML documents; external content directories in the same format
//! can be loaded with [`Directory`].

pub mod domain;
pub use domain::{Catalog, ComplexityLevel, Config, ContentId, EducationalContent, SlugList};

pub mod corpus;
pub use corpus::EmbeddedRecord;

pub mod storage;
pub use storage::Directory;

pub mod validation;
pub use validation::{Check, Issue, Severity, ValidationReport, Validator};

pub mod export;
pub use export::Manifest;
