use std::path::{Path, PathBuf};

mod export;
mod list;
mod new;
mod show;
mod status;
mod terminal;
mod validate;

use clap::ArgAction;
use export::Export;
use list::List;
use new::New;
use primer::{
    Catalog, Check, Config, ContentId, Directory, SlugList, ValidationReport, corpus,
    storage::Loaded,
};
use show::Show;
use status::Status;
use validate::Validate;

/// Parse a content id from a string, normalizing to lowercase.
///
/// This is a CLI boundary function that accepts uppercase input and
/// normalizes it before parsing.
fn parse_content_id(s: &str) -> Result<ContentId, String> {
    s.trim().to_lowercase().parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to a content directory. Without it, the built-in corpus is
    /// used.
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root.as_deref())
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show record counts and integrity totals (default)
    Status(Status),

    /// List records with filters
    List(List),

    /// Show one record and its cross-references
    Show(Show),

    /// Check data integrity
    ///
    /// Exits with status 2 when errors are found.
    Validate(Validate),

    /// Export records or a fingerprint manifest as JSON
    Export(Export),

    /// Create a new draft record in a content directory
    New(New),
}

impl Command {
    fn run(self, root: Option<&Path>) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(&Library::open(root)?)?,
            Self::List(command) => command.run(&Library::open(root)?)?,
            Self::Show(command) => command.run(&Library::open(root)?)?,
            Self::Validate(command) => command.run(&Library::open(root)?)?,
            Self::Export(command) => command.run(&Library::open(root)?)?,
            Self::New(command) => command.run(root.unwrap_or_else(|| Path::new(".")))?,
        }
        Ok(())
    }
}

/// The records a command works on.
#[derive(Debug)]
enum Library {
    /// The corpus compiled into the binary.
    BuiltIn {
        catalog: Catalog,
        config: Config,
        lists: Vec<SlugList>,
    },
    /// A content directory on disk.
    Directory(Directory<Loaded>),
}

impl Library {
    fn open(root: Option<&Path>) -> anyhow::Result<Self> {
        match root {
            None => Ok(Self::BuiltIn {
                catalog: corpus::catalog()?,
                config: corpus::config()?,
                lists: corpus::slug_lists(),
            }),
            Some(root) => Ok(Self::Directory(
                Directory::new(root.to_path_buf()).load_all()?,
            )),
        }
    }

    const fn catalog(&self) -> &Catalog {
        match self {
            Self::BuiltIn { catalog, .. } => catalog,
            Self::Directory(directory) => directory.catalog(),
        }
    }

    const fn config(&self) -> &Config {
        match self {
            Self::BuiltIn { config, .. } => config,
            Self::Directory(directory) => directory.config(),
        }
    }

    fn lists(&self) -> &[SlugList] {
        match self {
            Self::BuiltIn { lists, .. } => lists,
            Self::Directory(directory) => directory.lists(),
        }
    }

    /// Where the records came from, for display.
    fn location(&self) -> String {
        match self {
            Self::BuiltIn { .. } => "built-in corpus".to_string(),
            Self::Directory(directory) => directory.root().display().to_string(),
        }
    }

    /// The file a record was loaded from, if it came from disk.
    fn path_for(&self, id: &ContentId) -> Option<PathBuf> {
        match self {
            Self::BuiltIn { .. } => corpus::records()
                .find(|record| record.id == id.as_str())
                .map(|record| PathBuf::from(record.path)),
            Self::Directory(directory) => Some(directory.path_for(id)),
        }
    }

    /// Runs the given checks. [`Check::Paths`] only applies to directories.
    fn validate(&self, checks: &[Check]) -> ValidationReport {
        match self {
            Self::BuiltIn {
                catalog,
                config,
                lists,
            } => primer::Validator::new(catalog, config)
                .with_lists(lists)
                .run(checks),
            Self::Directory(directory) => directory.validate(checks),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn content_ids_are_normalized() {
        assert_eq!(
            parse_content_id(" Topic-Medication-Ibuprofen ").unwrap().as_str(),
            "topic-medication-ibuprofen"
        );
        assert!(parse_content_id("topic medication").is_err());
    }

    #[test]
    fn built_in_library_is_healthy() {
        let library = Library::open(None).unwrap();
        assert_eq!(library.catalog().len(), corpus::records().count());
        assert_eq!(library.lists().len(), 2);
        assert_eq!(library.location(), "built-in corpus");
        assert!(library.validate(&Check::CATALOG).is_empty());

        let id: ContentId = "topic-medication-naproxen".parse().unwrap();
        assert_eq!(
            library.path_for(&id),
            Some(PathBuf::from("content/medications/naproxen.yaml"))
        );
    }

    #[test]
    fn directory_library_reads_from_disk() {
        let tmp = tempdir().unwrap();
        let library = Library::open(Some(tmp.path())).unwrap();
        assert!(library.catalog().is_empty());
        assert_eq!(library.config(), &Config::default());
        assert_eq!(library.location(), tmp.path().display().to_string());
    }

    #[test]
    fn new_then_validate_round_trip() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        let command = <New as clap::Parser>::try_parse_from([
            "new",
            "Topic-Rehabilitation-Balance-Training",
            "--name",
            "Balance training",
        ])
        .unwrap();
        command.run(root).unwrap();

        let library = Library::open(Some(root)).unwrap();
        let record = library
            .catalog()
            .get_str("topic-rehabilitation-balance-training")
            .expect("new record should load");
        assert_eq!(record.name, "Balance training");

        // A fresh scaffold has an empty summary, so it is not valid yet.
        let report = library.validate(&[Check::Structure]);
        assert!(!report.is_ok());
    }
}
