//! Rehabilitation topics.

use super::EmbeddedRecord;

/// Prefix shared by every rehabilitation topic id.
pub const ID_PREFIX: &str = "topic-rehabilitation-";

/// Therapeutic exercise, the parent of the exercise topics.
pub const THERAPEUTIC_EXERCISE: EmbeddedRecord =
    embedded!("rehabilitation", "topic-rehabilitation-", "therapeutic-exercise");

/// Range of motion.
pub const RANGE_OF_MOTION: EmbeddedRecord =
    embedded!("rehabilitation", "topic-rehabilitation-", "range-of-motion");

/// Progressive overload.
pub const PROGRESSIVE_OVERLOAD: EmbeddedRecord =
    embedded!("rehabilitation", "topic-rehabilitation-", "progressive-overload");

/// Pain neuroscience education.
pub const PAIN_NEUROSCIENCE_EDUCATION: EmbeddedRecord = embedded!(
    "rehabilitation",
    "topic-rehabilitation-",
    "pain-neuroscience-education"
);

/// Gait training.
pub const GAIT_TRAINING: EmbeddedRecord =
    embedded!("rehabilitation", "topic-rehabilitation-", "gait-training");

/// Every rehabilitation topic, in list order.
pub const TOPICS: &[EmbeddedRecord] = &[
    THERAPEUTIC_EXERCISE,
    RANGE_OF_MOTION,
    PROGRESSIVE_OVERLOAD,
    PAIN_NEUROSCIENCE_EDUCATION,
    GAIT_TRAINING,
];

/// Slugs of every rehabilitation topic, in display order.
pub const REHABILITATION_TOPIC_LIST: &[&str] = &[
    "therapeutic-exercise",
    "range-of-motion",
    "progressive-overload",
    "pain-neuroscience-education",
    "gait-training",
];
