use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use primer::{Check, Manifest, Severity, ValidationReport, export::Drift};
use tracing::instrument;

use super::{
    Library,
    terminal::{Colorize, fit},
};

#[derive(Debug, Parser)]
#[command(about = "Check the integrity of the records")]
pub struct Validate {
    /// Types of checks to run (can be specified multiple times)
    #[arg(long, value_name = "TYPE")]
    check: Vec<CheckType>,

    /// Compare against a manifest written by `primer export --format manifest`
    /// and report records whose text changed without a version bump
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
enum CheckType {
    /// Required fields, complete levels, unique media and citation ids
    Structure,
    /// Placeholder text, Spanish names, ICD-11 code format
    Quality,
    /// Citation URLs
    Citations,
    /// Dangling references, cycles and unreciprocated links
    References,
    /// Timestamps and exam tags
    Metadata,
    /// Slug lists against records
    Lists,
    /// File names against record ids (content directories only)
    Paths,
    /// Run all checks
    All,
}

impl CheckType {
    const fn check(self) -> Option<Check> {
        match self {
            Self::Structure => Some(Check::Structure),
            Self::Quality => Some(Check::Quality),
            Self::Citations => Some(Check::Citations),
            Self::References => Some(Check::References),
            Self::Metadata => Some(Check::Metadata),
            Self::Lists => Some(Check::Lists),
            Self::Paths => Some(Check::Paths),
            Self::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Summary,
}

impl Validate {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, library: &Library) -> anyhow::Result<()> {
        let report = self.report(library)?;

        match self.output {
            OutputFormat::Table => self.output_table(&report),
            OutputFormat::Json => Self::output_json(&report)?,
            OutputFormat::Summary => Self::output_summary(&report),
        }

        let failed = !report.is_ok() || (self.strict && report.warning_count() > 0);
        if failed {
            std::process::exit(2);
        }

        Ok(())
    }

    fn checks(&self) -> Vec<Check> {
        if self.check.is_empty() || self.check.contains(&CheckType::All) {
            let mut checks = Check::CATALOG.to_vec();
            checks.push(Check::Paths);
            checks
        } else {
            self.check.iter().filter_map(|check| check.check()).collect()
        }
    }

    fn report(&self, library: &Library) -> anyhow::Result<ValidationReport> {
        let checks = self.checks();
        tracing::debug!(?checks, "running checks");
        let mut report = library.validate(&checks);

        if let Some(path) = &self.manifest {
            let manifest = Manifest::load(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            report.extend(
                manifest
                    .drift(library.catalog())
                    .iter()
                    .filter_map(Drift::to_issue),
            );
        }

        Ok(report)
    }

    fn output_table(&self, report: &ValidationReport) {
        if report.is_empty() {
            if !self.quiet {
                println!("{} No issues found", "✅".success());
            }
            return;
        }

        for issue in report.issues() {
            if self.quiet && issue.severity == Severity::Warning {
                continue;
            }
            let severity = issue.severity.to_string();
            let record = issue
                .record
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string);
            let prefix = format!("{severity:<7} {:<10} {record}: ", issue.check);
            println!(
                "{}{}",
                prefix.severity(issue.severity),
                fit(&issue.message, prefix.chars().count())
            );
        }

        if !self.quiet {
            println!();
            Self::output_summary(report);
        }
    }

    fn output_json(report: &ValidationReport) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "errors": report.error_count(),
            "warnings": report.warning_count(),
            "issues": report.issues(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_summary(report: &ValidationReport) {
        let mut by_check: BTreeMap<Check, (usize, usize)> = BTreeMap::new();
        for issue in report.issues() {
            let (errors, warnings) = by_check.entry(issue.check).or_default();
            match issue.severity {
                Severity::Error => *errors += 1,
                Severity::Warning => *warnings += 1,
            }
        }

        for (check, (errors, warnings)) in &by_check {
            println!("{check:<10} {errors} errors, {warnings} warnings");
        }

        let errors = report.error_count();
        let warnings = report.warning_count();
        if errors == 0 {
            println!("Errors: {}, warnings: {}", "0".success(), warnings);
        } else {
            println!(
                "Errors: {}, warnings: {}",
                errors.to_string().error(),
                warnings
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use primer::corpus;
    use tempfile::tempdir;

    use super::*;

    fn parse(args: &[&str]) -> Validate {
        Validate::try_parse_from(std::iter::once("validate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn default_runs_every_check() {
        let checks = parse(&[]).checks();
        assert_eq!(checks.len(), 7);
        assert!(checks.contains(&Check::Paths));

        assert_eq!(parse(&["--check", "all", "--check", "lists"]).checks().len(), 7);
        assert_eq!(
            parse(&["--check", "quality", "--check", "lists"]).checks(),
            [Check::Quality, Check::Lists]
        );
    }

    #[test]
    fn built_in_corpus_passes() {
        let library = Library::open(None).unwrap();
        let report = parse(&[]).report(&library).unwrap();
        assert!(report.is_empty(), "{report:?}");
    }

    #[test]
    fn manifest_drift_is_reported() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("manifest.json");

        let mut catalog = corpus::catalog().unwrap();
        let mut removed = corpus::medications::NAPROXEN.load().unwrap();
        removed.id = "topic-medication-aspirin".parse().unwrap();
        catalog.insert(removed).unwrap();
        Manifest::from_catalog(&catalog).save(&path).unwrap();

        let library = Library::open(None).unwrap();
        let path = path.display().to_string();
        let report = parse(&["--check", "lists", "--manifest", &path])
            .report(&library)
            .unwrap();

        let issues = report.issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].check, Check::Metadata);
    }

    #[test]
    fn unreadable_manifest_is_an_error() {
        let library = Library::open(None).unwrap();
        assert!(parse(&["--manifest", "/nonexistent/manifest.json"])
            .report(&library)
            .is_err());
    }
}
