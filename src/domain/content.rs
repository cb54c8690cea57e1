use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    num::NonZeroU32,
};

use borsh::BorshSerialize;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use sha2::{Digest, Sha256};

use crate::domain::{ComplexityLevel, ContentId};

/// One educational record: a medication guide, a rehabilitation topic, or any
/// other topic in the library.
///
/// The record body is either a map of [`LevelContent`] keyed by
/// [`ComplexityLevel`] or a single flat [`GuideContent`] block. Records with
/// unknown keys, with both bodies, or with neither are rejected when parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRecord")]
pub struct EducationalContent {
    /// Unique, stable identifier. This is the target of cross-references.
    pub id: ContentId,

    /// What kind of thing the record describes.
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Display name.
    pub name: String,

    /// Localized (Spanish) display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_es: Option<String>,

    /// Other names the topic is known by (brand names, synonyms).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternate_names: Vec<String>,

    /// The educational text itself.
    #[serde(flatten)]
    pub body: ContentBody,

    /// References to images, diagrams and other assets.
    #[serde(default)]
    pub media: Vec<Media>,

    /// Sources the text is based on.
    #[serde(default)]
    pub citations: Vec<Citation>,

    /// Links to related records.
    #[serde(default)]
    pub cross_references: Vec<CrossReference>,

    /// Classification tags.
    #[serde(default)]
    pub tags: ContentTags,

    /// When the record was first written.
    pub created_at: DateTime<Utc>,

    /// When the record was last edited.
    pub updated_at: DateTime<Utc>,

    /// Editorial version, starting at 1.
    pub version: NonZeroU32,

    /// Editorial status.
    pub status: Status,
}

/// The body of a record.
///
/// Serialized as a `levels` or a `content` key on the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, BorshSerialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBody {
    /// Explanations organized by difficulty tier.
    Levels(BTreeMap<ComplexityLevel, LevelContent>),
    /// A single flat guide.
    Content(GuideContent),
}

/// Error returned when a record does not have exactly one body.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BodyError {
    /// The record has both a `levels` and a `content` key.
    #[error("record {0} has both `levels` and `content`; expected exactly one")]
    Both(ContentId),
    /// The record has neither key.
    #[error("record {0} has neither `levels` nor `content`")]
    Missing(ContentId),
}

/// A record as written in a file, before its body is checked.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawRecord {
    id: ContentId,
    #[serde(rename = "type")]
    content_type: ContentType,
    name: String,
    #[serde(default)]
    name_es: Option<String>,
    #[serde(default)]
    alternate_names: Vec<String>,
    #[serde(default)]
    levels: Option<UniqueLevels>,
    #[serde(default)]
    content: Option<GuideContent>,
    #[serde(default)]
    media: Vec<Media>,
    #[serde(default)]
    citations: Vec<Citation>,
    #[serde(default)]
    cross_references: Vec<CrossReference>,
    #[serde(default)]
    tags: ContentTags,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: NonZeroU32,
    status: Status,
}

impl TryFrom<RawRecord> for EducationalContent {
    type Error = BodyError;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let body = match (raw.levels, raw.content) {
            (Some(UniqueLevels(levels)), None) => ContentBody::Levels(levels),
            (None, Some(guide)) => ContentBody::Content(guide),
            (Some(_), Some(_)) => return Err(BodyError::Both(raw.id)),
            (None, None) => return Err(BodyError::Missing(raw.id)),
        };

        Ok(Self {
            id: raw.id,
            content_type: raw.content_type,
            name: raw.name,
            name_es: raw.name_es,
            alternate_names: raw.alternate_names,
            body,
            media: raw.media,
            citations: raw.citations,
            cross_references: raw.cross_references,
            tags: raw.tags,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            version: raw.version,
            status: raw.status,
        })
    }
}

/// A level map that rejects the same level written twice (`level1` and `1`).
struct UniqueLevels(BTreeMap<ComplexityLevel, LevelContent>);

impl<'de> Deserialize<'de> for UniqueLevels {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelsVisitor;

        impl<'de> de::Visitor<'de> for LevelsVisitor {
            type Value = UniqueLevels;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from complexity level to level content")
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut levels = BTreeMap::new();
                while let Some((level, content)) =
                    map.next_entry::<ComplexityLevel, LevelContent>()?
                {
                    if levels.insert(level, content).is_some() {
                        return Err(de::Error::custom(format_args!("duplicate level {level}")));
                    }
                }
                Ok(UniqueLevels(levels))
            }
        }

        deserializer.deserialize_map(LevelsVisitor)
    }
}

/// The explanation of a topic at one complexity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LevelContent {
    /// Heading for this level.
    pub title: String,
    /// One or two sentence summary.
    pub summary: String,
    /// Full explanation, as markdown.
    pub explanation: String,
    /// Vocabulary introduced at this level.
    #[serde(default)]
    pub key_terms: Vec<KeyTerm>,
    /// Comparisons to everyday things.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub analogies: Vec<String>,
    /// Worked examples or scenarios.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    /// Notes aimed at clinicians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<String>,
    /// Points a clinician should cover with the patient.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patient_counseling_points: Vec<String>,
}

/// A flat medication guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GuideContent {
    /// Heading for the guide.
    pub title: String,
    /// One or two sentence summary.
    pub summary: String,
    /// Full guide text, as markdown.
    pub content: String,
    /// Vocabulary used in the guide.
    #[serde(default)]
    pub key_terms: Vec<KeyTerm>,
    /// What the medication is used for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<String>,
    /// Practical instructions for taking it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub how_to_take: Vec<String>,
    /// Common side effects.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub side_effects: Vec<String>,
    /// Safety warnings and reasons to seek care.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Notable drug and food interactions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interactions: Vec<String>,
    /// Notes aimed at clinicians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_notes: Option<String>,
}

/// A vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize)]
#[serde(deny_unknown_fields)]
pub struct KeyTerm {
    /// The term.
    pub term: String,
    /// Its definition.
    pub definition: String,
}

/// What a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// An anatomical structure.
    Structure,
    /// A body system.
    System,
    /// A physiological pathway.
    Pathway,
    /// A physiological process.
    Process,
    /// A disease or condition.
    Condition,
    /// An abstract concept.
    Concept,
    /// A general topic (medication guides, rehabilitation topics).
    Topic,
}

/// Editorial status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Being written.
    Draft,
    /// Awaiting clinical review.
    Review,
    /// Approved for display.
    Published,
}

impl ContentType {
    /// All content types.
    pub const ALL: [Self; 7] = [
        Self::Structure,
        Self::System,
        Self::Pathway,
        Self::Process,
        Self::Condition,
        Self::Concept,
        Self::Topic,
    ];

    /// The lowercase name used in record files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::System => "system",
            Self::Pathway => "pathway",
            Self::Process => "process",
            Self::Condition => "condition",
            Self::Concept => "concept",
            Self::Topic => "topic",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl Status {
    /// The lowercase name used in record files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Published => "published",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A reference to an image, diagram or other asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Media {
    /// Identifier, unique within the record.
    pub id: String,
    /// Kind of asset.
    #[serde(rename = "type")]
    pub media_type: MediaType,
    /// Asset file name, resolved by the consuming application.
    pub filename: String,
    /// Caption.
    pub title: String,
    /// Longer description / alt text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Licence of the asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// Kind of media asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// A labelled diagram.
    Diagram,
    /// A photograph or illustration.
    Image,
    /// A video clip.
    Video,
    /// An animation.
    Animation,
    /// An audio clip.
    Audio,
}

/// A bibliographic or source reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Citation {
    /// Identifier, unique within the record.
    pub id: String,
    /// Kind of source.
    #[serde(rename = "type")]
    pub citation_type: CitationType,
    /// Title of the work.
    pub title: String,
    /// Authors, in citation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Journal, publisher or organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Where the work can be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Chapter, for textbooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    /// Year of publication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    /// When a website was last accessed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessed_date: Option<String>,
}

/// Kind of cited source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CitationType {
    /// A journal article.
    Article,
    /// A textbook.
    Textbook,
    /// A clinical practice guideline.
    Guideline,
    /// A website.
    Website,
    /// A journal (whole issue or trial report).
    Journal,
    /// Anything else.
    Other,
}

/// A named link from one record to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CrossReference {
    /// Identifier of the linked record.
    #[serde(alias = "id")]
    pub target_id: ContentId,
    /// Type of the linked record, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_type: Option<ContentType>,
    /// How the linked record relates to this one.
    pub relationship: Relationship,
    /// Link text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// How a cross-referenced record relates to the referring record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    /// The target is the broader topic this record belongs to.
    Parent,
    /// The target is a narrower topic under this record.
    Child,
    /// The target is a peer in the same group.
    Sibling,
    /// The target is related.
    Related,
    /// The target is further reading.
    SeeAlso,
    /// The target should be read first.
    Prerequisite,
}

impl Relationship {
    /// Returns the relationship seen from the other side, for the
    /// relationships that have one.
    #[must_use]
    pub const fn inverse(self) -> Option<Self> {
        match self {
            Self::Parent => Some(Self::Child),
            Self::Child => Some(Self::Parent),
            Self::Sibling => Some(Self::Sibling),
            Self::Related | Self::SeeAlso | Self::Prerequisite => None,
        }
    }

    /// Whether the relationship is part of the topic hierarchy.
    #[must_use]
    pub const fn is_hierarchical(self) -> bool {
        matches!(self, Self::Parent | Self::Child)
    }

    /// The kebab-case name used in record files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Child => "child",
            Self::Sibling => "sibling",
            Self::Related => "related",
            Self::SeeAlso => "see-also",
            Self::Prerequisite => "prerequisite",
        }
    }
}

/// Classification tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContentTags {
    /// Body systems involved. May include ICD-11 codes (`ICD-11:FA00`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<String>,
    /// Subject areas.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    /// Search keywords.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// How important the topic is in practice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_relevance: Option<ClinicalRelevance>,
    /// Which licensing exams the topic appears on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_relevance: Option<ExamRelevance>,
}

/// How important a topic is in clinical practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClinicalRelevance {
    /// Rarely relevant.
    Low,
    /// Sometimes relevant.
    Medium,
    /// Often relevant.
    High,
    /// Safety critical.
    Critical,
}

/// Licensing exam relevance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRelevance {
    /// Appears on the USMLE.
    #[serde(default)]
    pub usmle: bool,
    /// Appears on NBME exams.
    #[serde(default)]
    pub nbme: bool,
    /// Shelf exams the topic appears on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shelf: Vec<String>,
    /// Exams not in the list above.
    #[serde(flatten)]
    pub other: BTreeMap<String, bool>,
}

impl EducationalContent {
    /// Parses a record from a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document does not match the schema.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Serializes the record as a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Returns the level map, if the record is organized by level.
    #[must_use]
    pub const fn levels(&self) -> Option<&BTreeMap<ComplexityLevel, LevelContent>> {
        match &self.body {
            ContentBody::Levels(levels) => Some(levels),
            ContentBody::Content(_) => None,
        }
    }

    /// Returns the flat guide, if the record has one.
    #[must_use]
    pub const fn guide(&self) -> Option<&GuideContent> {
        match &self.body {
            ContentBody::Content(guide) => Some(guide),
            ContentBody::Levels(_) => None,
        }
    }

    /// Returns the content at one level, if present.
    #[must_use]
    pub fn level(&self, level: ComplexityLevel) -> Option<&LevelContent> {
        self.levels()?.get(&level)
    }

    /// Returns the title of the simplest explanation available.
    #[must_use]
    pub fn title(&self) -> &str {
        match &self.body {
            ContentBody::Levels(levels) => levels
                .values()
                .next()
                .map_or(self.name.as_str(), |level| level.title.as_str()),
            ContentBody::Content(guide) => &guide.title,
        }
    }

    /// Returns every key term in the record, across all levels.
    pub fn key_terms(&self) -> Box<dyn Iterator<Item = &KeyTerm> + '_> {
        match &self.body {
            ContentBody::Levels(levels) => {
                Box::new(levels.values().flat_map(|level| level.key_terms.iter()))
            }
            ContentBody::Content(guide) => Box::new(guide.key_terms.iter()),
        }
    }

    /// Returns the distinct relationships this record uses.
    #[must_use]
    pub fn relationships(&self) -> BTreeSet<Relationship> {
        self.cross_references
            .iter()
            .map(|reference| reference.relationship)
            .collect()
    }

    /// Case-insensitive match against names, alternate names, keywords and
    /// topics.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        let contains = |s: &str| s.to_lowercase().contains(&query);

        contains(self.id.as_str())
            || contains(&self.name)
            || self.name_es.as_deref().is_some_and(contains)
            || self.alternate_names.iter().any(|name| contains(name))
            || self.tags.keywords.iter().any(|keyword| contains(keyword))
            || self.tags.topics.iter().any(|topic| contains(topic))
    }

    /// Returns whether the record carries the given tag in any tag list.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let matches = |t: &String| t.eq_ignore_ascii_case(tag);
        self.tags.systems.iter().any(matches)
            || self.tags.topics.iter().any(matches)
            || self.tags.keywords.iter().any(matches)
    }

    /// Calculate the fingerprint of the record's text.
    ///
    /// The fingerprint is a SHA256 hash of the Borsh-serialized names and
    /// body. Metadata (version, dates, status), citations, media and
    /// cross-references do not contribute, so the fingerprint changes only
    /// when what a reader sees changes.
    ///
    /// # Panics
    ///
    /// Panics if borsh serialization fails (which should never happen for this
    /// data structure).
    #[must_use]
    pub fn fingerprint(&self) -> String {
        #[derive(BorshSerialize)]
        struct FingerprintData<'a> {
            name: &'a String,
            name_es: Option<&'a String>,
            alternate_names: &'a Vec<String>,
            body: &'a ContentBody,
        }

        let data = FingerprintData {
            name: &self.name,
            name_es: self.name_es.as_ref(),
            alternate_names: &self.alternate_names,
            body: &self.body,
        };

        // encode using [borsh](https://borsh.io/)
        let encoded = borsh::to_vec(&data).expect("this should never fail");

        let hash = Sha256::digest(encoded);
        format!("{hash:x}")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn level(title: &str) -> LevelContent {
        LevelContent {
            title: title.to_string(),
            summary: format!("{title} summary"),
            explanation: format!("{title} explanation"),
            key_terms: vec![KeyTerm {
                term: "term".to_string(),
                definition: "definition".to_string(),
            }],
            analogies: Vec::new(),
            examples: Vec::new(),
            clinical_notes: None,
            patient_counseling_points: Vec::new(),
        }
    }

    /// A minimal record organized by level, with the given cross-references.
    pub(crate) fn record(id: &str, references: &[(&str, Relationship)]) -> EducationalContent {
        let timestamp = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        EducationalContent {
            id: id.parse().unwrap(),
            content_type: ContentType::Topic,
            name: id.to_string(),
            name_es: Some(format!("{id} (es)")),
            alternate_names: Vec::new(),
            body: ContentBody::Levels(BTreeMap::from([(
                ComplexityLevel::Level1,
                level("Overview"),
            )])),
            media: Vec::new(),
            citations: Vec::new(),
            cross_references: references
                .iter()
                .map(|(target, relationship)| CrossReference {
                    target_id: target.parse().unwrap(),
                    target_type: None,
                    relationship: *relationship,
                    label: None,
                })
                .collect(),
            tags: ContentTags::default(),
            created_at: timestamp,
            updated_at: timestamp,
            version: NonZeroU32::MIN,
            status: Status::Published,
        }
    }

    const LEVELS_YAML: &str = r"
id: topic-rehabilitation-example
type: topic
name: Example
levels:
  level1:
    title: Basics
    summary: A short summary.
    explanation: A longer explanation.
    keyTerms:
      - term: range
        definition: how far a joint moves
  2:
    title: More
    summary: Another summary.
    explanation: Another explanation.
crossReferences:
  - id: topic-rehabilitation-other
    relationship: see-also
tags:
  topics: [rehabilitation]
  examRelevance:
    usmle: true
    comlex: true
createdAt: 2026-01-01T00:00:00Z
updatedAt: 2026-01-02T00:00:00Z
version: 2
status: review
";

    const GUIDE_YAML: &str = r"
id: topic-medication-example
type: topic
name: Example guide
content:
  title: Example guide
  summary: What it is.
  content: How to use it.
  sideEffects: [nausea]
createdAt: 2026-01-01T00:00:00Z
updatedAt: 2026-01-01T00:00:00Z
version: 1
status: draft
";

    #[test]
    fn parses_levels_body() {
        let record = EducationalContent::from_yaml(LEVELS_YAML).unwrap();

        let levels = record.levels().unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(record.level(ComplexityLevel::Level2).unwrap().title, "More");
        assert_eq!(record.title(), "Basics");
        assert_eq!(record.version.get(), 2);
        assert_eq!(record.status, Status::Review);
        assert!(record.guide().is_none());
    }

    #[test]
    fn cross_reference_accepts_id_alias() {
        let record = EducationalContent::from_yaml(LEVELS_YAML).unwrap();
        let reference = &record.cross_references[0];
        assert_eq!(reference.target_id.as_str(), "topic-rehabilitation-other");
        assert_eq!(reference.relationship, Relationship::SeeAlso);
    }

    #[test]
    fn unknown_exams_are_kept() {
        let record = EducationalContent::from_yaml(LEVELS_YAML).unwrap();
        let exams = record.tags.exam_relevance.unwrap();
        assert!(exams.usmle);
        assert!(!exams.nbme);
        assert_eq!(exams.other.get("comlex"), Some(&true));
    }

    #[test]
    fn parses_guide_body() {
        let record = EducationalContent::from_yaml(GUIDE_YAML).unwrap();
        let guide = record.guide().unwrap();
        assert_eq!(guide.side_effects, ["nausea"]);
        assert_eq!(record.title(), "Example guide");
        assert!(record.levels().is_none());
        assert!(record.media.is_empty());
    }

    #[test]
    fn rejects_zero_version() {
        let source = GUIDE_YAML.replace("version: 1", "version: 0");
        assert!(EducationalContent::from_yaml(&source).is_err());
    }

    #[test]
    fn rejects_unknown_relationship() {
        let source = LEVELS_YAML.replace("see-also", "cousin");
        assert!(EducationalContent::from_yaml(&source).is_err());
    }

    #[test]
    fn rejects_misspelled_keys() {
        let source = GUIDE_YAML.replace(
            "version: 1",
            "version: 1\ncitation:\n  - id: c1\n    type: website\n    title: Site\n    url: not a url",
        );
        let err = EducationalContent::from_yaml(&source).unwrap_err();
        assert!(err.to_string().contains("citation"), "{err}");

        let nested = GUIDE_YAML.replace("sideEffects", "sideEffect");
        assert!(EducationalContent::from_yaml(&nested).is_err());
    }

    #[test]
    fn rejects_both_bodies() {
        let source = GUIDE_YAML.replace(
            "content:\n",
            "levels:\n  level1:\n    title: T\n    summary: S\n    explanation: E\ncontent:\n",
        );
        let err = EducationalContent::from_yaml(&source).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("`levels`") && message.contains("`content`"), "{message}");
    }

    #[test]
    fn rejects_missing_body() {
        let start = GUIDE_YAML.find("content:\n").unwrap();
        let end = GUIDE_YAML.find("createdAt").unwrap();
        let source = format!("{}{}", &GUIDE_YAML[..start], &GUIDE_YAML[end..]);
        let err = EducationalContent::from_yaml(&source).unwrap_err();
        assert!(err.to_string().contains("neither"), "{err}");
    }

    #[test]
    fn rejects_level_written_twice() {
        let source = LEVELS_YAML.replace("  2:\n", "  1:\n");
        let err = EducationalContent::from_yaml(&source).unwrap_err();
        assert!(err.to_string().contains("duplicate level level1"), "{err}");
    }

    #[test]
    fn json_round_trip_is_identical() {
        for source in [LEVELS_YAML, GUIDE_YAML] {
            let record = EducationalContent::from_yaml(source).unwrap();
            let json = serde_json::to_string(&record).unwrap();
            let back: EducationalContent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, record);
        }
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let record = EducationalContent::from_yaml(LEVELS_YAML).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("crossReferences").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value["levels"]["level1"]["keyTerms"].is_array());
    }

    #[test]
    fn fingerprint_ignores_metadata() {
        let original = record("topic-a", &[]);
        let mut bumped = original.clone();
        bumped.version = NonZeroU32::new(7).unwrap();
        bumped.status = Status::Draft;
        assert_eq!(original.fingerprint(), bumped.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_text() {
        let original = record("topic-a", &[]);
        let mut edited = original.clone();
        if let ContentBody::Levels(levels) = &mut edited.body {
            levels.get_mut(&ComplexityLevel::Level1).unwrap().summary = "changed".to_string();
        }
        assert_ne!(original.fingerprint(), edited.fingerprint());
    }

    #[test]
    fn matches_names_and_keywords() {
        let mut record = record("topic-medication-ibuprofen", &[]);
        record.alternate_names = vec!["Advil".to_string()];
        record.tags.keywords = vec!["NSAID".to_string()];

        assert!(record.matches("advil"));
        assert!(record.matches("nsaid"));
        assert!(record.matches("IBUPROFEN"));
        assert!(!record.matches("opioid"));
    }

    #[test]
    fn inverse_relationships() {
        assert_eq!(Relationship::Parent.inverse(), Some(Relationship::Child));
        assert_eq!(Relationship::Sibling.inverse(), Some(Relationship::Sibling));
        assert_eq!(Relationship::Related.inverse(), None);
    }

    #[test]
    fn display_names_match_serialized_names() {
        for content_type in ContentType::ALL {
            let yaml = serde_yaml::to_string(&content_type).unwrap();
            assert_eq!(yaml.trim(), content_type.to_string());
        }
        for status in [Status::Draft, Status::Review, Status::Published] {
            let yaml = serde_yaml::to_string(&status).unwrap();
            assert_eq!(yaml.trim(), status.to_string());
        }
    }
}
