//! Patient medication guides.
//!
//! Acetaminophen and ibuprofen are explained across complexity levels; the
//! other guides use a single flat guide body.

use super::EmbeddedRecord;

/// Prefix shared by every medication guide id.
pub const ID_PREFIX: &str = "topic-medication-";

/// Acetaminophen (paracetamol).
pub const ACETAMINOPHEN: EmbeddedRecord =
    embedded!("medications", "topic-medication-", "acetaminophen");

/// Ibuprofen.
pub const IBUPROFEN: EmbeddedRecord = embedded!("medications", "topic-medication-", "ibuprofen");

/// Naproxen.
pub const NAPROXEN: EmbeddedRecord = embedded!("medications", "topic-medication-", "naproxen");

/// Diclofenac gel.
pub const TOPICAL_DICLOFENAC: EmbeddedRecord =
    embedded!("medications", "topic-medication-", "topical-diclofenac");

/// Cyclobenzaprine.
pub const CYCLOBENZAPRINE: EmbeddedRecord =
    embedded!("medications", "topic-medication-", "cyclobenzaprine");

/// Every medication guide, in list order.
pub const GUIDES: &[EmbeddedRecord] = &[
    ACETAMINOPHEN,
    IBUPROFEN,
    NAPROXEN,
    TOPICAL_DICLOFENAC,
    CYCLOBENZAPRINE,
];

/// Slugs of every medication guide, in display order.
pub const MEDICATION_GUIDE_LIST: &[&str] = &[
    "acetaminophen",
    "ibuprofen",
    "naproxen",
    "topical-diclofenac",
    "cyclobenzaprine",
];
