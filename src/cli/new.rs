use std::{
    collections::BTreeMap,
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use primer::{
    ComplexityLevel, ContentId, Directory, EducationalContent,
    domain::{ContentBody, ContentTags, ContentType, GuideContent, LevelContent, Status},
};
use tracing::instrument;

/// Create a new draft record in a content directory.
#[derive(Debug, Parser)]
#[command(about = "Create a new draft record")]
pub struct New {
    /// The id of the new record (e.g. topic-rehabilitation-balance-training)
    #[arg(value_parser = super::parse_content_id)]
    id: ContentId,

    /// The English display name
    #[arg(long)]
    name: String,

    /// The Spanish display name
    #[arg(long)]
    name_es: Option<String>,

    /// What the record describes
    #[arg(long = "type", value_enum, default_value_t)]
    content_type: Kind,

    /// Scaffold a flat guide instead of a level 1 explanation
    #[arg(long)]
    guide: bool,

    /// Directory to write the file in, relative to the root.
    ///
    /// By default the file goes next to the index whose id prefix matches,
    /// or in the root.
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum Kind {
    Structure,
    System,
    Pathway,
    Process,
    Condition,
    Concept,
    #[default]
    Topic,
}

impl From<Kind> for ContentType {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Structure => Self::Structure,
            Kind::System => Self::System,
            Kind::Pathway => Self::Pathway,
            Kind::Process => Self::Process,
            Kind::Condition => Self::Condition,
            Kind::Concept => Self::Concept,
            Kind::Topic => Self::Topic,
        }
    }
}

impl New {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let mut directory = Directory::new(root.to_path_buf())
            .load_all()
            .with_context(|| format!("failed to load {}", root.display()))?;

        let path = match &self.dir {
            Some(dir) => {
                let default = directory.path_for(&self.id);
                let file_name = default
                    .file_name()
                    .context("record path has no file name")?;
                Some(root.join(dir).join(file_name))
            }
            None => None,
        };

        let record = self.scaffold(Utc::now());
        let id = record.id.clone();
        let path = match path {
            Some(path) => directory.add_record_at(record, path)?,
            None => directory.add_record(record)?,
        };

        println!("Added {id} at {}", path.display());
        Ok(())
    }

    /// A draft with the name as title and empty text to fill in.
    fn scaffold(self, now: DateTime<Utc>) -> EducationalContent {
        let body = if self.guide {
            ContentBody::Content(GuideContent {
                title: self.name.clone(),
                summary: String::new(),
                content: String::new(),
                key_terms: Vec::new(),
                uses: Vec::new(),
                how_to_take: Vec::new(),
                side_effects: Vec::new(),
                warnings: Vec::new(),
                interactions: Vec::new(),
                clinical_notes: None,
            })
        } else {
            let level = LevelContent {
                title: self.name.clone(),
                summary: String::new(),
                explanation: String::new(),
                key_terms: Vec::new(),
                analogies: Vec::new(),
                examples: Vec::new(),
                clinical_notes: None,
                patient_counseling_points: Vec::new(),
            };
            ContentBody::Levels(BTreeMap::from([(ComplexityLevel::Level1, level)]))
        };

        EducationalContent {
            id: self.id,
            content_type: self.content_type.into(),
            name: self.name,
            name_es: self.name_es,
            alternate_names: Vec::new(),
            body,
            media: Vec::new(),
            citations: Vec::new(),
            cross_references: Vec::new(),
            tags: ContentTags::default(),
            created_at: now,
            updated_at: now,
            version: NonZeroU32::MIN,
            status: Status::Draft,
        }
    }
}

#[cfg(test)]
mod tests {
    use primer::{Check, storage::RecordFile};
    use tempfile::tempdir;

    use super::*;

    fn parse(args: &[&str]) -> New {
        New::try_parse_from(std::iter::once("new").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn scaffold_is_a_draft() {
        let record = parse(&["topic-a", "--name", "A", "--type", "concept"]).scaffold(Utc::now());
        assert_eq!(record.status, Status::Draft);
        assert_eq!(record.content_type, ContentType::Concept);
        assert_eq!(record.version, NonZeroU32::MIN);
        assert_eq!(record.created_at, record.updated_at);
        assert_eq!(record.title(), "A");
        assert!(record.level(ComplexityLevel::Level1).is_some());
    }

    #[test]
    fn guide_scaffold_has_flat_body() {
        let record = parse(&["topic-a", "--name", "A", "--guide"]).scaffold(Utc::now());
        assert!(record.guide().is_some());
        assert!(record.levels().is_none());
    }

    #[test]
    fn new_record_joins_matching_list() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir(root.join("medications")).unwrap();
        std::fs::write(
            root.join("medications/index.yaml"),
            "name: MEDICATION_GUIDE_LIST\nidPrefix: topic-medication-\nslugs: []\n",
        )
        .unwrap();

        parse(&["topic-medication-aspirin", "--name", "Aspirin", "--guide"])
            .run(root)
            .unwrap();

        let path = root.join("medications/aspirin.yaml");
        let file = RecordFile::load(&path).unwrap();
        assert_eq!(file.record().name, "Aspirin");

        let directory = Directory::new(root.to_path_buf()).load_all().unwrap();
        assert_eq!(directory.lists()[0].slugs, ["aspirin"]);
        assert!(directory.validate(&[Check::Lists]).is_ok());
    }

    #[test]
    fn explicit_dir() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        parse(&["topic-a", "--name", "A", "--dir", "drafts"])
            .run(root)
            .unwrap();

        assert!(root.join("drafts/topic-a.yaml").exists());
    }

    #[test]
    fn existing_id_is_rejected() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        parse(&["topic-a", "--name", "A"]).run(root).unwrap();
        assert!(parse(&["topic-a", "--name", "A", "--dir", "other"])
            .run(root)
            .is_err());
    }
}
