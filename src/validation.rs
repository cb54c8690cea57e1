//! Data-integrity checks over a catalog of records.
//!
//! A [`Validator`] runs one or more [`Check`]s and collects every problem it
//! finds into a [`ValidationReport`]. Validation never fails fast: a report
//! lists all issues so authors can fix them in one pass.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;
use tracing::instrument;
use url::Url;

use crate::domain::{
    Catalog, CitationType, ContentBody, ContentId, EducationalContent, KeyTerm, SlugList, Status,
    Config,
};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(todo|fixme|tbd|placeholder|lorem ipsum)\b").expect("valid regex")
});

/// ICD-11 stem codes (`FA00`, `8A80`) with an optional extension (`ME84.2`).
///
/// Stem codes are four characters: a digit or letter for the chapter, a
/// letter, a digit, then a digit or letter. ICD-10 style codes such as
/// `M54.5` have a digit in second position and do not match.
static ICD11_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Z][A-Z][0-9][0-9A-Z](\.[0-9A-Z]{1,2})?$").expect("valid regex")
});

/// A group of related integrity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Check {
    /// Required fields present and non-empty; levels complete; ids unique
    /// within a record.
    Structure,
    /// No placeholder text; localized names; well-formed ICD-11 codes.
    Quality,
    /// Citation URLs are valid.
    Citations,
    /// Cross-references resolve; the hierarchy is acyclic and reciprocated.
    References,
    /// Timestamps and tags are consistent.
    Metadata,
    /// Slug lists match the records exactly.
    Lists,
    /// Record files are named after their records.
    Paths,
}

impl Check {
    /// Every check that can run against a catalog alone.
    ///
    /// [`Check::Paths`] needs file locations and is run by the directory
    /// loader instead.
    pub const CATALOG: [Self; 6] = [
        Self::Structure,
        Self::Quality,
        Self::Citations,
        Self::References,
        Self::Metadata,
        Self::Lists,
    ];

    /// Lowercase name of the check.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::Quality => "quality",
            Self::Citations => "citations",
            Self::References => "references",
            Self::Metadata => "metadata",
            Self::Lists => "lists",
            Self::Paths => "paths",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How serious an issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed before publishing.
    Error,
    /// Should be reviewed.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// A single problem found by validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// How serious the issue is.
    pub severity: Severity,
    /// Which check found it.
    pub check: Check,
    /// The record concerned, if the issue is about one record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ContentId>,
    /// Human-readable description.
    pub message: String,
}

impl Issue {
    /// Creates an error about a record.
    pub fn error(check: Check, record: &ContentId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            check,
            record: Some(record.clone()),
            message: message.into(),
        }
    }

    /// Creates a warning about a record.
    pub fn warning(check: Check, record: &ContentId, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            check,
            record: Some(record.clone()),
            message: message.into(),
        }
    }

    /// Creates an error that is not about one particular record.
    pub fn general(check: Check, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            check,
            record: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.check)?;
        if let Some(record) = &self.record {
            write!(f, " {record}")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// The outcome of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    issues: Vec<Issue>,
}

impl ValidationReport {
    /// Adds an issue.
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Returns every issue, in the order found.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Returns the errors.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Error)
    }

    /// Returns the warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity == Severity::Warning)
    }

    /// Returns the issues found by one check.
    pub fn for_check(&self, check: Check) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.check == check)
    }

    /// Returns the issues about one record.
    pub fn for_record<'a>(&'a self, id: &'a ContentId) -> impl Iterator<Item = &'a Issue> {
        self.issues
            .iter()
            .filter(move |issue| issue.record.as_ref() == Some(id))
    }

    /// Number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Number of warnings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Whether the report contains no errors. Warnings are allowed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Whether the report contains no issues at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Extend<Issue> for ValidationReport {
    fn extend<T: IntoIterator<Item = Issue>>(&mut self, iter: T) {
        self.issues.extend(iter);
    }
}

/// Runs integrity checks over a catalog.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    catalog: &'a Catalog,
    config: &'a Config,
    lists: &'a [SlugList],
}

impl<'a> Validator<'a> {
    /// Creates a validator for a catalog, with no slug lists.
    #[must_use]
    pub const fn new(catalog: &'a Catalog, config: &'a Config) -> Self {
        Self {
            catalog,
            config,
            lists: &[],
        }
    }

    /// Sets the slug lists checked by [`Check::Lists`].
    #[must_use]
    pub const fn with_lists(mut self, lists: &'a [SlugList]) -> Self {
        self.lists = lists;
        self
    }

    /// Runs every catalog check.
    #[must_use]
    pub fn run_all(&self) -> ValidationReport {
        self.run(&Check::CATALOG)
    }

    /// Runs the given checks, in order.
    ///
    /// [`Check::Paths`] is ignored here.
    #[instrument(level = "debug", skip(self), fields(records = self.catalog.len()))]
    #[must_use]
    pub fn run(&self, checks: &[Check]) -> ValidationReport {
        let mut report = ValidationReport::default();

        for check in checks {
            let before = report.issues.len();
            match check {
                Check::Structure => self.check_structure(&mut report),
                Check::Quality => self.check_quality(&mut report),
                Check::Citations => self.check_citations(&mut report),
                Check::References => self.check_references(&mut report),
                Check::Metadata => self.check_metadata(&mut report),
                Check::Lists => self.check_lists(&mut report),
                Check::Paths => {}
            }
            tracing::debug!(
                check = %check,
                issues = report.issues.len() - before,
                "check complete"
            );
        }

        report
    }

    fn check_structure(&self, report: &mut ValidationReport) {
        const CHECK: Check = Check::Structure;

        for record in self.catalog.iter() {
            let id = &record.id;

            if is_blank(&record.name) {
                report.push(Issue::error(CHECK, id, "name is empty"));
            }
            if record.alternate_names.iter().any(|name| is_blank(name)) {
                report.push(Issue::warning(CHECK, id, "alternate name is empty"));
            }

            match &record.body {
                ContentBody::Levels(levels) => {
                    if levels.is_empty() {
                        report.push(Issue::error(CHECK, id, "levels are empty"));
                    }
                    for required in self.config.required_levels() {
                        if !levels.contains_key(required) {
                            report.push(Issue::error(CHECK, id, format!("missing {required}")));
                        }
                    }
                    for (level, content) in levels {
                        for (field, value) in [
                            ("title", &content.title),
                            ("summary", &content.summary),
                            ("explanation", &content.explanation),
                        ] {
                            if is_blank(value) {
                                report.push(Issue::error(CHECK, id, format!("{level}: empty {field}")));
                            }
                        }
                        check_key_terms(report, id, &level.to_string(), &content.key_terms);
                    }
                }
                ContentBody::Content(guide) => {
                    for (field, value) in [
                        ("title", &guide.title),
                        ("summary", &guide.summary),
                        ("content", &guide.content),
                    ] {
                        if is_blank(value) {
                            report.push(Issue::error(CHECK, id, format!("content: empty {field}")));
                        }
                    }
                    check_key_terms(report, id, "content", &guide.key_terms);
                }
            }

            for duplicate in duplicates(record.media.iter().map(|media| media.id.as_str())) {
                report.push(Issue::error(CHECK, id, format!("duplicate media id '{duplicate}'")));
            }
            for media in &record.media {
                if is_blank(&media.filename) {
                    report.push(Issue::error(
                        CHECK,
                        id,
                        format!("media '{}' has no filename", media.id),
                    ));
                }
            }

            for duplicate in duplicates(record.citations.iter().map(|c| c.id.as_str())) {
                report.push(Issue::error(
                    CHECK,
                    id,
                    format!("duplicate citation id '{duplicate}'"),
                ));
            }
            for citation in &record.citations {
                if is_blank(&citation.title) {
                    report.push(Issue::error(
                        CHECK,
                        id,
                        format!("citation '{}' has no title", citation.id),
                    ));
                }
            }
        }
    }

    fn check_quality(&self, report: &mut ValidationReport) {
        const CHECK: Check = Check::Quality;

        for record in self.catalog.iter() {
            let id = &record.id;

            for (field, text) in text_fields(record) {
                if PLACEHOLDER.is_match(text) {
                    report.push(Issue::error(
                        CHECK,
                        id,
                        format!("{field} contains placeholder text"),
                    ));
                }
            }

            if record.name_es.as_deref().is_none_or(is_blank) {
                let message = "missing localized name (nameEs)";
                report.push(if self.config.require_localized_name {
                    Issue::error(CHECK, id, message)
                } else {
                    Issue::warning(CHECK, id, message)
                });
            }

            for system in &record.tags.systems {
                let Some(code) = icd11_code(system) else {
                    continue;
                };
                if !ICD11_CODE.is_match(code) {
                    report.push(Issue::warning(
                        CHECK,
                        id,
                        format!("potentially invalid ICD-11 code '{code}'"),
                    ));
                }
            }
        }
    }

    fn check_citations(&self, report: &mut ValidationReport) {
        const CHECK: Check = Check::Citations;

        for record in self.catalog.iter() {
            for citation in &record.citations {
                match &citation.url {
                    Some(url) => {
                        if let Err(reason) = check_url(url) {
                            report.push(Issue::error(
                                CHECK,
                                &record.id,
                                format!("citation '{}': invalid url '{url}': {reason}", citation.id),
                            ));
                        }
                    }
                    None if citation.citation_type == CitationType::Website => {
                        report.push(Issue::warning(
                            CHECK,
                            &record.id,
                            format!("website citation '{}' has no url", citation.id),
                        ));
                    }
                    None => {}
                }
            }
        }
    }

    fn check_references(&self, report: &mut ValidationReport) {
        const CHECK: Check = Check::References;

        for dangling in self.catalog.dangling_references() {
            if self.config.is_external(dangling.target) {
                continue;
            }
            report.push(Issue::error(
                CHECK,
                dangling.source,
                format!(
                    "{} reference to unknown id '{}'",
                    dangling.relationship.as_str(),
                    dangling.target
                ),
            ));
        }

        for record in self.catalog.iter() {
            let mut seen = BTreeSet::new();
            for reference in &record.cross_references {
                if reference.target_id == record.id {
                    report.push(Issue::error(CHECK, &record.id, "record refers to itself"));
                }
                if !seen.insert((&reference.target_id, reference.relationship)) {
                    report.push(Issue::warning(
                        CHECK,
                        &record.id,
                        format!(
                            "duplicate {} reference to '{}'",
                            reference.relationship.as_str(),
                            reference.target_id
                        ),
                    ));
                }
                if let (Some(expected), Some(target)) =
                    (reference.target_type, self.catalog.get(&reference.target_id))
                {
                    if target.content_type != expected {
                        report.push(Issue::warning(
                            CHECK,
                            &record.id,
                            format!(
                                "reference to '{}' declares type {expected:?} but the record is {:?}",
                                reference.target_id, target.content_type
                            ),
                        ));
                    }
                }
            }
        }

        for cycle in self.catalog.hierarchy_cycles() {
            let ids: Vec<&str> = cycle.iter().map(ContentId::as_str).collect();
            report.push(Issue::general(
                CHECK,
                format!("cycle in parent/child hierarchy: {}", ids.join(", ")),
            ));
        }

        for link in self.catalog.unreciprocated_links() {
            report.push(Issue::warning(
                CHECK,
                link.source,
                format!(
                    "{} link to '{}' is not mirrored by a {} link back",
                    link.relationship.as_str(),
                    link.target,
                    link.expected.as_str()
                ),
            ));
        }
    }

    fn check_metadata(&self, report: &mut ValidationReport) {
        const CHECK: Check = Check::Metadata;

        for record in self.catalog.iter() {
            let id = &record.id;

            if record.updated_at < record.created_at {
                report.push(Issue::error(CHECK, id, "updatedAt is before createdAt"));
            }

            if record.status == Status::Published && record.citations.is_empty() {
                report.push(Issue::warning(CHECK, id, "published record has no citations"));
            }

            if let Some(exams) = &record.tags.exam_relevance {
                if exams.shelf.iter().any(|shelf| is_blank(shelf)) {
                    report.push(Issue::error(CHECK, id, "empty shelf exam entry"));
                }
                for exam in exams.other.keys() {
                    report.push(Issue::warning(
                        CHECK,
                        id,
                        format!("unknown exam type '{exam}' in examRelevance"),
                    ));
                }
            }
        }
    }

    fn check_lists(&self, report: &mut ValidationReport) {
        const CHECK: Check = Check::Lists;

        for list in self.lists {
            for duplicate in duplicates(list.slugs.iter().map(String::as_str)) {
                report.push(Issue::general(
                    CHECK,
                    format!("{}: duplicate slug '{duplicate}'", list.name),
                ));
            }

            let mut listed = BTreeSet::new();
            for slug in &list.slugs {
                match list.id_for(slug) {
                    None => report.push(Issue::general(
                        CHECK,
                        format!("{}: slug '{slug}' does not form a valid id", list.name),
                    )),
                    Some(id) if !self.catalog.contains(&id) => report.push(Issue::general(
                        CHECK,
                        format!("{}: slug '{slug}' has no record '{id}'", list.name),
                    )),
                    Some(id) => {
                        listed.insert(id);
                    }
                }
            }

            for record in self.catalog.with_prefix(&list.id_prefix) {
                if !listed.contains(&record.id) {
                    report.push(Issue::error(
                        CHECK,
                        &record.id,
                        format!("record is not listed in {}", list.name),
                    ));
                }
            }
        }
    }
}

/// Runs every catalog check, including the slug list checks for `lists`.
#[must_use]
pub fn validate(catalog: &Catalog, config: &Config, lists: &[SlugList]) -> ValidationReport {
    Validator::new(catalog, config).with_lists(lists).run_all()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check_key_terms(report: &mut ValidationReport, id: &ContentId, location: &str, terms: &[KeyTerm]) {
    const CHECK: Check = Check::Structure;

    if terms.is_empty() {
        report.push(Issue::warning(CHECK, id, format!("{location}: no key terms")));
    }
    for (i, term) in terms.iter().enumerate() {
        if is_blank(&term.term) {
            report.push(Issue::error(
                CHECK,
                id,
                format!("{location}: key term {} has empty term", i + 1),
            ));
        }
        if is_blank(&term.definition) {
            report.push(Issue::error(
                CHECK,
                id,
                format!("{location}: key term '{}' has empty definition", term.term),
            ));
        }
    }
}

/// Returns each value that occurs more than once, in sorted order.
fn duplicates<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(value, _)| value)
        .collect()
}

/// Returns the ICD-11 code in a `tags.systems` entry, if the entry is meant
/// to be one (`ICD-11:FA00`, or anything starting with a digit).
fn icd11_code(system: &str) -> Option<&str> {
    if let Some(code) = system.strip_prefix("ICD-11") {
        Some(code.trim_start_matches(':').trim())
    } else if system.starts_with(|c: char| c.is_ascii_digit()) {
        Some(system.trim())
    } else {
        None
    }
}

fn check_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(())
}

/// Every free-text field of a record, labelled for messages.
fn text_fields(record: &EducationalContent) -> Vec<(String, &str)> {
    let mut fields = vec![("name".to_string(), record.name.as_str())];
    if let Some(name_es) = &record.name_es {
        fields.push(("nameEs".to_string(), name_es));
    }

    match &record.body {
        ContentBody::Levels(levels) => {
            for (level, content) in levels {
                fields.push((format!("{level}.title"), &content.title));
                fields.push((format!("{level}.summary"), &content.summary));
                fields.push((format!("{level}.explanation"), &content.explanation));
                if let Some(notes) = &content.clinical_notes {
                    fields.push((format!("{level}.clinicalNotes"), notes));
                }
                for term in &content.key_terms {
                    fields.push((format!("{level}.keyTerms"), &term.term));
                    fields.push((format!("{level}.keyTerms"), &term.definition));
                }
            }
        }
        ContentBody::Content(guide) => {
            fields.push(("content.title".to_string(), &guide.title));
            fields.push(("content.summary".to_string(), &guide.summary));
            fields.push(("content.content".to_string(), &guide.content));
            if let Some(notes) = &guide.clinical_notes {
                fields.push(("content.clinicalNotes".to_string(), notes));
            }
            for term in &guide.key_terms {
                fields.push(("content.keyTerms".to_string(), &term.term));
                fields.push(("content.keyTerms".to_string(), &term.definition));
            }
        }
    }

    fields
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{
        Citation, ComplexityLevel, ContentType, CrossReference, ExamRelevance, GuideContent,
        Relationship, content::tests::record,
    };

    fn id(s: &str) -> ContentId {
        s.parse().unwrap()
    }

    /// Test records only carry level 1.
    fn config() -> Config {
        let mut config = Config::default();
        config.set_required_levels(vec![ComplexityLevel::Level1]);
        config
    }

    fn run(records: Vec<EducationalContent>, check: Check) -> ValidationReport {
        let catalog = Catalog::from_records(records).unwrap();
        Validator::new(&catalog, &config()).run(&[check])
    }

    fn messages(report: &ValidationReport) -> Vec<&str> {
        report.issues().iter().map(|i| i.message.as_str()).collect()
    }

    fn citation(id: &str, url: Option<&str>) -> Citation {
        Citation {
            id: id.to_string(),
            citation_type: CitationType::Guideline,
            title: "A guideline".to_string(),
            authors: Vec::new(),
            source: None,
            url: url.map(ToString::to_string),
            chapter: None,
            year: None,
            accessed_date: None,
        }
    }

    #[test]
    fn minimal_record_is_clean() {
        let mut record = record("topic-a", &[]);
        record.citations.push(citation("c1", Some("https://example.org/guideline")));

        let catalog = Catalog::from_records([record]).unwrap();
        let report = Validator::new(&catalog, &config()).run_all();
        assert!(report.is_empty(), "{:?}", report.issues());
    }

    #[test]
    fn empty_required_strings_are_errors() {
        let mut record = record("topic-a", &[]);
        record.name = "  ".to_string();
        if let ContentBody::Levels(levels) = &mut record.body {
            let level = levels.get_mut(&ComplexityLevel::Level1).unwrap();
            level.title.clear();
            level.key_terms[0].definition.clear();
        }

        let report = run(vec![record], Check::Structure);
        assert_eq!(
            messages(&report),
            [
                "name is empty",
                "level1: empty title",
                "level1: key term 'term' has empty definition",
            ]
        );
        assert_eq!(report.error_count(), 3);
    }

    #[test]
    fn missing_required_level_is_error() {
        let record = record("topic-a", &[]);
        let catalog = Catalog::from_records([record]).unwrap();
        let mut config = config();
        config.set_required_levels(vec![ComplexityLevel::Level1, ComplexityLevel::Level2]);

        let report = Validator::new(&catalog, &config).run(&[Check::Structure]);
        assert_eq!(messages(&report), ["missing level2"]);
    }

    #[test]
    fn every_level_is_required_by_default() {
        let mut record = record("topic-a", &[]);
        if let ContentBody::Levels(levels) = &mut record.body {
            let first = levels[&ComplexityLevel::Level1].clone();
            for level in [
                ComplexityLevel::Level2,
                ComplexityLevel::Level3,
                ComplexityLevel::Level5,
            ] {
                levels.insert(level, first.clone());
            }
        }
        let catalog = Catalog::from_records([record]).unwrap();

        let report = Validator::new(&catalog, &Config::default()).run(&[Check::Structure]);
        assert_eq!(messages(&report), ["missing level4"]);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn guide_body_fields_are_checked() {
        let mut record = record("topic-medication-a", &[]);
        record.body = ContentBody::Content(GuideContent {
            title: "Guide".to_string(),
            summary: String::new(),
            content: "Text".to_string(),
            key_terms: Vec::new(),
            uses: Vec::new(),
            how_to_take: Vec::new(),
            side_effects: Vec::new(),
            warnings: Vec::new(),
            interactions: Vec::new(),
            clinical_notes: None,
        });

        let report = run(vec![record], Check::Structure);
        assert_eq!(
            messages(&report),
            ["content: empty summary", "content: no key terms"]
        );
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn duplicate_citation_ids_are_errors() {
        let mut record = record("topic-a", &[]);
        record.citations = vec![citation("same", None), citation("same", None)];

        let report = run(vec![record], Check::Structure);
        assert_eq!(messages(&report), ["duplicate citation id 'same'"]);
    }

    #[test_case("TODO: write this"; "todo")]
    #[test_case("This is placeholder text"; "placeholder")]
    #[test_case("fixme later"; "lowercase fixme")]
    fn placeholder_text_is_error(summary: &str) {
        let mut record = record("topic-a", &[]);
        if let ContentBody::Levels(levels) = &mut record.body {
            levels.get_mut(&ComplexityLevel::Level1).unwrap().summary = summary.to_string();
        }

        let report = run(vec![record], Check::Quality);
        assert_eq!(messages(&report), ["level1.summary contains placeholder text"]);
    }

    #[test]
    fn placeholder_inside_word_is_not_flagged() {
        let mut record = record("topic-a", &[]);
        record.name = "Mastodon toddler".to_string();
        assert!(run(vec![record], Check::Quality).is_empty());
    }

    #[test]
    fn missing_localized_name_severity_follows_config() {
        let mut record = record("topic-a", &[]);
        record.name_es = None;
        let catalog = Catalog::from_records([record]).unwrap();

        let lenient = Validator::new(&catalog, &config()).run(&[Check::Quality]);
        assert_eq!(lenient.warning_count(), 1);
        assert!(lenient.is_ok());

        let mut strict_config = config();
        strict_config.require_localized_name = true;
        let strict = Validator::new(&catalog, &strict_config).run(&[Check::Quality]);
        assert_eq!(strict.error_count(), 1);
    }

    #[test_case("ICD-11:FA00", true)]
    #[test_case("ICD-11: ME84.2", true)]
    #[test_case("8A80", true)]
    #[test_case("ICD-11:fa00", false)]
    #[test_case("ICD-11:M54.5", false; "icd-10 code")]
    #[test_case("12345", false)]
    fn icd11_codes(system: &str, valid: bool) {
        let mut record = record("topic-a", &[]);
        record.tags.systems = vec![system.to_string(), "musculoskeletal".to_string()];

        let report = run(vec![record], Check::Quality);
        assert_eq!(report.is_empty(), valid, "{:?}", report.issues());
    }

    #[test_case("https://doi.org/10.1001/jama.2018.3963", true)]
    #[test_case("http://example.org", true)]
    #[test_case("doi.org/10.1001", false; "missing scheme")]
    #[test_case("ftp://example.org/file", false; "wrong scheme")]
    #[test_case("https://", false; "no host")]
    fn citation_urls(url: &str, valid: bool) {
        let mut record = record("topic-a", &[]);
        record.citations.push(citation("c1", Some(url)));

        let report = run(vec![record], Check::Citations);
        assert_eq!(report.is_ok(), valid, "{:?}", report.issues());
    }

    #[test]
    fn website_without_url_is_warning() {
        let mut record = record("topic-a", &[]);
        let mut website = citation("site", None);
        website.citation_type = CitationType::Website;
        record.citations.push(website);

        let report = run(vec![record], Check::Citations);
        assert_eq!(report.warning_count(), 1);
        assert!(report.is_ok());
    }

    #[test]
    fn dangling_references_are_errors_unless_external() {
        let records = vec![record(
            "topic-a",
            &[
                ("topic-missing", Relationship::Related),
                ("condition-osteoarthritis", Relationship::Related),
            ],
        )];
        let catalog = Catalog::from_records(records).unwrap();

        let mut config = config();
        config.add_external_prefix("condition-");
        let report = Validator::new(&catalog, &config).run(&[Check::References]);

        assert_eq!(
            messages(&report),
            ["related reference to unknown id 'topic-missing'"]
        );
        assert_eq!(report.issues()[0].record, Some(id("topic-a")));
    }

    #[test]
    fn self_and_duplicate_references() {
        let records = vec![
            record(
                "topic-a",
                &[
                    ("topic-a", Relationship::Related),
                    ("topic-b", Relationship::SeeAlso),
                    ("topic-b", Relationship::SeeAlso),
                ],
            ),
            record("topic-b", &[]),
        ];

        let report = run(records, Check::References);
        assert_eq!(
            messages(&report),
            [
                "record refers to itself",
                "duplicate see-also reference to 'topic-b'"
            ]
        );
    }

    #[test]
    fn hierarchy_problems() {
        let records = vec![
            record("topic-a", &[("topic-b", Relationship::Parent)]),
            record("topic-b", &[("topic-a", Relationship::Parent)]),
            record("topic-c", &[("topic-a", Relationship::Child)]),
        ];

        let report = run(records, Check::References);
        let cycle = report
            .issues()
            .iter()
            .find(|issue| issue.record.is_none())
            .unwrap();
        assert_eq!(
            cycle.message,
            "cycle in parent/child hierarchy: topic-a, topic-b"
        );
        assert!(messages(&report).contains(
            &"child link to 'topic-a' is not mirrored by a parent link back"
        ));
    }

    #[test]
    fn target_type_mismatch_is_warning() {
        let mut source = record("topic-a", &[]);
        source.cross_references.push(CrossReference {
            target_id: id("topic-b"),
            target_type: Some(ContentType::Condition),
            relationship: Relationship::Related,
            label: None,
        });

        let report = run(vec![source, record("topic-b", &[])], Check::References);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn metadata_checks() {
        let mut record = record("topic-a", &[]);
        record.updated_at = record.created_at - chrono::Duration::days(1);
        record.tags.exam_relevance = Some(ExamRelevance {
            usmle: true,
            nbme: false,
            shelf: vec![" ".to_string()],
            other: BTreeMap::from([("comlex".to_string(), true)]),
        });

        let report = run(vec![record], Check::Metadata);
        assert_eq!(
            messages(&report),
            [
                "updatedAt is before createdAt",
                "published record has no citations",
                "empty shelf exam entry",
                "unknown exam type 'comlex' in examRelevance",
            ]
        );
    }

    #[test]
    fn lists_must_match_records_exactly() {
        let catalog = Catalog::from_records([
            record("topic-medication-ibuprofen", &[]),
            record("topic-medication-naproxen", &[]),
            record("topic-rehabilitation-gait", &[]),
        ])
        .unwrap();
        let lists = [SlugList::from_static(
            "MEDICATION_GUIDE_LIST",
            "topic-medication-",
            &["ibuprofen", "ibuprofen", "aspirin"],
        )];

        let report = Validator::new(&catalog, &config())
            .with_lists(&lists)
            .run(&[Check::Lists]);

        assert_eq!(
            messages(&report),
            [
                "MEDICATION_GUIDE_LIST: duplicate slug 'ibuprofen'",
                "MEDICATION_GUIDE_LIST: slug 'aspirin' has no record 'topic-medication-aspirin'",
                "record is not listed in MEDICATION_GUIDE_LIST",
            ]
        );
        assert_eq!(report.issues()[2].record, Some(id("topic-medication-naproxen")));
    }

    #[test]
    fn issue_display() {
        let issue = Issue::error(Check::References, &id("topic-a"), "broken");
        assert_eq!(issue.to_string(), "[error] references topic-a: broken");
        assert_eq!(
            Issue::general(Check::Lists, "bad").to_string(),
            "[error] lists: bad"
        );
    }
}
