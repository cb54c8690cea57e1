use anyhow::bail;
use clap::Parser;
use primer::{
    ComplexityLevel, ContentId, EducationalContent,
    domain::{ContentBody, GuideContent, KeyTerm, LevelContent},
};
use tracing::instrument;

use super::{
    Library,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser)]
#[command(about = "Display one record and its cross-references")]
pub struct Show {
    /// The id of the record to display
    #[clap(value_parser = super::parse_content_id)]
    id: ContentId,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,

    /// Print the full text of one level (1-5) instead of every summary
    #[arg(long, value_parser = parse_level)]
    level: Option<ComplexityLevel>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Yaml,
}

fn parse_level(s: &str) -> Result<ComplexityLevel, String> {
    s.parse().map_err(|e| format!("{e}"))
}

impl Show {
    #[instrument(level = "debug", skip_all, fields(id = %self.id))]
    pub fn run(self, library: &Library) -> anyhow::Result<()> {
        let Some(record) = library.catalog().get(&self.id) else {
            bail!("record {} not found", self.id);
        };

        match self.output {
            OutputFormat::Pretty => self.output_pretty(library, record)?,
            OutputFormat::Json => Self::output_json(library, record)?,
            OutputFormat::Yaml => print!("{}", record.to_yaml()?),
        }

        Ok(())
    }

    fn output_pretty(&self, library: &Library, record: &EducationalContent) -> anyhow::Result<()> {
        println!("# {}", record.id);
        match &record.name_es {
            Some(name_es) => println!("{} / {}\n", record.name, name_es),
            None => println!("{}\n", record.name),
        }

        println!("{}", "Metadata".dim());
        println!("  Type:      {}", record.content_type);
        println!("  Status:    {}", record.status);
        println!("  Version:   {}", record.version);
        println!("  Created:   {}", record.created_at.to_rfc3339());
        println!("  Updated:   {}", record.updated_at.to_rfc3339());
        if let Some(path) = library.path_for(&record.id) {
            println!("  Path:      {}", path.display());
        }
        if !record.alternate_names.is_empty() {
            println!("  Also:      {}", record.alternate_names.join(", "));
        }

        let tags: Vec<&str> = record
            .tags
            .systems
            .iter()
            .chain(&record.tags.topics)
            .chain(&record.tags.keywords)
            .map(String::as_str)
            .collect();
        if !tags.is_empty() {
            println!("\n{}", "Tags".dim());
            if is_narrow() {
                for tag in tags {
                    println!("  • {tag}");
                }
            } else {
                println!("  {}", tags.join(", "));
            }
        }

        match (&record.body, self.level) {
            (ContentBody::Levels(levels), Some(level)) => {
                let Some(content) = levels.get(&level) else {
                    bail!("{} has no {level}", record.id);
                };
                println!("\n{}", level.to_string().dim());
                print_level(content);
            }
            (ContentBody::Levels(levels), None) => {
                println!("\n{}", "Levels".dim());
                for (level, content) in levels {
                    println!("  {level}: {}", content.title.info());
                    println!("    {}", content.summary);
                }
            }
            (ContentBody::Content(guide), _) => {
                println!("\n{}", "Guide".dim());
                print_guide(guide);
            }
        }

        let references = library.catalog().cross_references(&record.id);
        if !references.is_empty() {
            println!("\n{}", "Cross-references".dim());
            for resolved in references {
                let reference = resolved.reference;
                let target = match resolved.target {
                    Some(target) => target.name.clone(),
                    None if library.config().is_external(&reference.target_id) => {
                        "(external)".dim()
                    }
                    None => "(missing) ⚠️".warning(),
                };
                println!(
                    "  • {} {} {target}",
                    reference.relationship.as_str(),
                    reference.target_id
                );
            }
        }

        let backlinks = library.catalog().referenced_by(&record.id);
        if !backlinks.is_empty() {
            println!("\n{}", "Referenced by".dim());
            for backlink in backlinks {
                println!(
                    "  • {} ({})",
                    backlink.source.id,
                    backlink.relationship.as_str()
                );
            }
        }

        if !record.citations.is_empty() {
            println!("\n{}", "Citations".dim());
            for citation in &record.citations {
                match &citation.url {
                    Some(url) => println!("  [{}] {} <{url}>", citation.id, citation.title),
                    None => println!("  [{}] {}", citation.id, citation.title),
                }
            }
        }

        Ok(())
    }

    fn output_json(library: &Library, record: &EducationalContent) -> anyhow::Result<()> {
        use serde_json::json;

        let referenced_by: Vec<_> = library
            .catalog()
            .referenced_by(&record.id)
            .into_iter()
            .map(|backlink| {
                json!({
                    "id": backlink.source.id,
                    "relationship": backlink.relationship,
                })
            })
            .collect();

        let mut output = serde_json::to_value(record)?;
        output["path"] = json!(
            library
                .path_for(&record.id)
                .map(|path| path.display().to_string())
        );
        output["referencedBy"] = json!(referenced_by);

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn print_level(level: &LevelContent) {
    println!("  {}", level.title.info());
    println!("  {}\n", level.summary);
    println!("{}", level.explanation.trim_end());
    print_key_terms(&level.key_terms);
    print_items("Analogies", &level.analogies);
    print_items("Examples", &level.examples);
    print_items("Counselling points", &level.patient_counseling_points);
    if let Some(notes) = &level.clinical_notes {
        println!("\n{}\n{}", "Clinical notes".dim(), notes.trim_end());
    }
}

fn print_guide(guide: &GuideContent) {
    println!("  {}", guide.title.info());
    println!("  {}\n", guide.summary);
    println!("{}", guide.content.trim_end());
    print_key_terms(&guide.key_terms);
    print_items("Uses", &guide.uses);
    print_items("How to take", &guide.how_to_take);
    print_items("Side effects", &guide.side_effects);
    print_items("Warnings", &guide.warnings);
    print_items("Interactions", &guide.interactions);
    if let Some(notes) = &guide.clinical_notes {
        println!("\n{}\n{}", "Clinical notes".dim(), notes.trim_end());
    }
}

fn print_key_terms(terms: &[KeyTerm]) {
    if terms.is_empty() {
        return;
    }
    println!("\n{}", "Key terms".dim());
    for term in terms {
        println!("  {}: {}", term.term, term.definition);
    }
}

fn print_items(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n{}", heading.dim());
    for item in items {
        println!("  • {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Show {
        Show::try_parse_from(std::iter::once("show").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn ids_and_levels_are_parsed() {
        let show = parse(&["Topic-Medication-Ibuprofen", "--level", "2"]);
        assert_eq!(show.id.as_str(), "topic-medication-ibuprofen");
        assert_eq!(show.level, Some(ComplexityLevel::Level2));

        assert!(Show::try_parse_from(["show", "topic-a", "--level", "9"]).is_err());
    }

    #[test]
    fn shows_built_in_records() {
        let library = Library::open(None).unwrap();
        for output in ["pretty", "json", "yaml"] {
            parse(&["topic-medication-acetaminophen", "--output", output])
                .run(&library)
                .unwrap();
        }
        parse(&["topic-medication-naproxen"]).run(&library).unwrap();
        parse(&["topic-medication-acetaminophen", "--level", "3"])
            .run(&library)
            .unwrap();
    }

    #[test]
    fn missing_record_or_level_is_an_error() {
        let library = Library::open(None).unwrap();
        assert!(parse(&["topic-medication-aspirin"]).run(&library).is_err());
        assert!(parse(&["topic-medication-acetaminophen", "--level", "5"])
            .run(&library)
            .is_err());
    }
}
