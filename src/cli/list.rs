use clap::{Parser, ValueEnum};
use primer::{
    EducationalContent,
    domain::{ContentType, Status},
};
use serde::Serialize;
use tracing::instrument;

use super::{
    Library,
    terminal::{Colorize, fit, is_narrow},
};

/// Command arguments for `primer list`.
#[derive(Debug, Parser)]
#[command(about = "List records with filters")]
pub struct List {
    /// Filter by content type (comma-separated).
    #[arg(long = "type", value_enum, value_delimiter = ',', value_name = "TYPE")]
    content_type: Vec<TypeFilter>,

    /// Filter by editorial status (comma-separated).
    #[arg(long, value_enum, value_delimiter = ',')]
    status: Vec<StatusFilter>,

    /// Filter by tag (systems, topics or keywords; case-insensitive).
    #[arg(long)]
    tag: Option<String>,

    /// Filter by id prefix (e.g. topic-medication-).
    #[arg(long)]
    prefix: Option<String>,

    /// Case-insensitive match against names and keywords.
    #[arg(long)]
    search: Option<String>,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TypeFilter {
    Structure,
    System,
    Pathway,
    Process,
    Condition,
    Concept,
    Topic,
}

impl TypeFilter {
    const fn matches(self, content_type: ContentType) -> bool {
        matches!(
            (self, content_type),
            (Self::Structure, ContentType::Structure)
                | (Self::System, ContentType::System)
                | (Self::Pathway, ContentType::Pathway)
                | (Self::Process, ContentType::Process)
                | (Self::Condition, ContentType::Condition)
                | (Self::Concept, ContentType::Concept)
                | (Self::Topic, ContentType::Topic)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusFilter {
    Draft,
    Review,
    Published,
}

impl StatusFilter {
    const fn matches(self, status: Status) -> bool {
        matches!(
            (self, status),
            (Self::Draft, Status::Draft)
                | (Self::Review, Status::Review)
                | (Self::Published, Status::Published)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Serialize)]
struct Row<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    content_type: ContentType,
    status: Status,
    version: u32,
    name: &'a str,
}

impl<'a> From<&'a EducationalContent> for Row<'a> {
    fn from(record: &'a EducationalContent) -> Self {
        Self {
            id: record.id.as_str(),
            content_type: record.content_type,
            status: record.status,
            version: record.version.get(),
            name: &record.name,
        }
    }
}

impl List {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, library: &Library) -> anyhow::Result<()> {
        let rows = self.rows(library);
        tracing::debug!(count = rows.len(), "matched records");

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table => render_table(&rows, self.quiet),
        }
        Ok(())
    }

    fn rows<'a>(&self, library: &'a Library) -> Vec<Row<'a>> {
        library
            .catalog()
            .iter()
            .filter(|record| self.matches(record))
            .map(Row::from)
            .collect()
    }

    fn matches(&self, record: &EducationalContent) -> bool {
        (self.content_type.is_empty()
            || self
                .content_type
                .iter()
                .any(|filter| filter.matches(record.content_type)))
            && (self.status.is_empty()
                || self.status.iter().any(|filter| filter.matches(record.status)))
            && self.tag.as_deref().is_none_or(|tag| record.has_tag(tag))
            && self
                .prefix
                .as_deref()
                .is_none_or(|prefix| record.id.as_str().starts_with(prefix))
            && self.search.as_deref().is_none_or(|query| record.matches(query))
    }
}

fn render_table(rows: &[Row<'_>], quiet: bool) {
    if quiet {
        for row in rows {
            println!("{}", row.id);
        }
        return;
    }

    if rows.is_empty() {
        println!("{}", "No matching records.".dim());
        return;
    }

    let id_width = rows.iter().map(|row| row.id.len()).max().unwrap_or(2).max(2);

    if is_narrow() {
        for row in rows {
            println!("{}", row.id.info());
            println!("  {} ({}, v{})", row.name, row.status, row.version);
        }
    } else {
        println!(
            "{:<id_width$}  {:<10} {:<10} {:>3}  Name",
            "ID", "Type", "Status", "Ver"
        );
        let used = id_width + 29;
        for row in rows {
            let status = match row.status {
                Status::Published => row.status.as_str().success(),
                Status::Review => row.status.as_str().warning(),
                Status::Draft => row.status.as_str().dim(),
            };
            // Pad before colouring so escape codes don't break alignment.
            let status = format!("{status}{}", " ".repeat(10 - row.status.as_str().len()));
            println!(
                "{:<id_width$}  {:<10} {status} {:>3}  {}",
                row.id,
                row.content_type.as_str(),
                row.version,
                fit(row.name, used),
            );
        }
    }

    println!();
    println!("{}", format!("{} records", rows.len()).dim());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(args: &[&str]) -> Vec<String> {
        let list = List::try_parse_from(std::iter::once("list").chain(args.iter().copied())).unwrap();
        let library = Library::open(None).unwrap();
        list.rows(&library)
            .into_iter()
            .map(|row| row.id.to_string())
            .collect()
    }

    #[test]
    fn no_filters_lists_everything() {
        assert_eq!(ids(&[]).len(), primer::corpus::records().count());
    }

    #[test]
    fn prefix_filter() {
        let ids = ids(&["--prefix", "topic-medication-"]);
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|id| id.starts_with("topic-medication-")));
    }

    #[test]
    fn status_filter() {
        assert_eq!(
            ids(&["--status", "review"]),
            ["topic-medication-cyclobenzaprine"]
        );
        assert!(ids(&["--status", "draft"]).is_empty());
    }

    #[test]
    fn filters_combine() {
        let ids = ids(&["--prefix", "topic-rehabilitation-", "--search", "gait"]);
        assert_eq!(ids, ["topic-rehabilitation-gait-training"]);
    }

    #[test]
    fn type_and_tag_filters() {
        assert!(ids(&["--type", "concept,condition"]).is_empty());
        assert_eq!(
            ids(&["--tag", "Muscle Relaxant"]),
            ["topic-medication-cyclobenzaprine"]
        );
    }
}
