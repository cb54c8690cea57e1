use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use primer::{Manifest, export};
use tracing::instrument;

use super::Library;

#[derive(Debug, Parser)]
#[command(about = "Export records or a fingerprint manifest as JSON")]
pub struct Export {
    /// What to export
    #[arg(long, value_name = "FORMAT", default_value = "records")]
    format: ExportFormat,

    /// File to write to (default: stdout)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum ExportFormat {
    /// Every record, sorted by id
    #[default]
    Records,
    /// Id, version, status and fingerprint of every record
    Manifest,
}

impl Export {
    #[instrument(level = "debug", skip_all)]
    pub fn run(self, library: &Library) -> anyhow::Result<()> {
        let json = self.render(library)?;

        match &self.output {
            Some(path) => {
                fs::write(path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::info!(
                    path = %path.display(),
                    records = library.catalog().len(),
                    "exported"
                );
            }
            None => println!("{json}"),
        }
        Ok(())
    }

    fn render(&self, library: &Library) -> anyhow::Result<String> {
        Ok(match self.format {
            ExportFormat::Records => export::to_json(library.catalog())?,
            ExportFormat::Manifest => Manifest::from_catalog(library.catalog()).to_json()?,
        })
    }
}
