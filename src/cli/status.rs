use std::collections::BTreeMap;

use clap::Parser;
use primer::{
    Check, ValidationReport,
    domain::{ContentType, Status as RecordStatus},
};
use tracing::instrument;

use super::{
    Library,
    terminal::{Colorize, is_narrow},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show record counts and integrity totals")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, library: &Library) -> anyhow::Result<()> {
        let catalog = library.catalog();

        if catalog.is_empty() {
            println!("No records found yet. Create one with 'primer new'.");
            return Ok(());
        }

        let by_type = catalog.count_by_type();
        let by_status = catalog.count_by_status();
        let report = library.validate(&Check::CATALOG);

        match self.output {
            OutputFormat::Json => {
                Self::output_json(library, &by_type, &by_status, &report)?;
            }
            OutputFormat::Table if self.quiet => {
                println!(
                    "total={} errors={} warnings={}",
                    catalog.len(),
                    report.error_count(),
                    report.warning_count()
                );
            }
            OutputFormat::Table => Self::output_table(library, &by_type, &by_status, &report),
        }

        Ok(())
    }

    fn output_json(
        library: &Library,
        by_type: &BTreeMap<ContentType, usize>,
        by_status: &BTreeMap<RecordStatus, usize>,
        report: &ValidationReport,
    ) -> anyhow::Result<()> {
        use serde_json::json;

        let lists: Vec<_> = library
            .lists()
            .iter()
            .map(|list| json!({ "name": list.name, "count": list.slugs.len() }))
            .collect();

        let output = json!({
            "location": library.location(),
            "total": library.catalog().len(),
            "types": by_type,
            "statuses": by_status,
            "lists": lists,
            "errors": report.error_count(),
            "warnings": report.warning_count(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(
        library: &Library,
        by_type: &BTreeMap<ContentType, usize>,
        by_status: &BTreeMap<RecordStatus, usize>,
        report: &ValidationReport,
    ) {
        let narrow = is_narrow();

        println!("Records in {}", library.location());
        println!("{}", "──────────────────".dim());

        if narrow {
            for (content_type, count) in by_type {
                println!("{content_type}: {count}");
            }
        } else {
            println!("{:<12} Count", "Type");
            for (content_type, count) in by_type {
                println!("{:<12} {count}", content_type.as_str());
            }
        }
        println!("Total: {}", library.catalog().len());

        println!();
        let statuses: Vec<String> = by_status
            .iter()
            .map(|(status, count)| format!("{status} {count}"))
            .collect();
        println!("Status: {}", statuses.join(", "));

        for list in library.lists() {
            println!("{}: {} slugs", list.name, list.slugs.len());
        }

        println!();

        let errors = report.error_count();
        let warnings = report.warning_count();
        if errors == 0 {
            println!("Errors: {} ✅", "0".success());
        } else {
            println!("Errors: {} ❌", errors.to_string().error());
        }
        if warnings == 0 {
            println!("Warnings: {}", "0".success());
        } else {
            println!("Warnings: {} ⚠️", warnings.to_string().warning());
        }
        if !report.is_empty() {
            println!("{}", "Run 'primer validate' for details.".dim());
        }
    }
}
