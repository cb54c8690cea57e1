//! A filesystem backed content library
//!
//! The [`Directory`] loads a tree of YAML record files into a [`Catalog`],
//! remembering where each record came from so records can be written back and
//! file names can be checked.

use std::{
    collections::BTreeMap,
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::instrument;
use walkdir::WalkDir;

use crate::{
    domain::{Catalog, CatalogError, Config, ContentId, EducationalContent, SlugList},
    storage::{CONFIG_DIR, CONFIG_FILE, INDEX_FILE, LoadError, RecordFile},
    validation::{Check, Issue, ValidationReport, Validator},
};

/// A directory that has been read from disk.
#[derive(Debug)]
pub struct Loaded {
    catalog: Catalog,
    config: Config,
    paths: BTreeMap<ContentId, PathBuf>,
    lists: Vec<SlugList>,
    list_paths: Vec<PathBuf>,
}

/// A directory that has not been read yet.
#[derive(Debug, PartialEq, Eq)]
pub struct Unloaded;

/// A filesystem backed store of records.
#[derive(Debug)]
pub struct Directory<S> {
    /// The root of the directory records are stored in.
    root: PathBuf,
    state: S,
}

impl<S> Directory<S> {
    /// The root of the directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Directory<Unloaded> {
    /// Opens a directory at the given path.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self {
            root,
            state: Unloaded,
        }
    }

    /// Load all records and slug lists from disk.
    ///
    /// Every `*.yaml` / `*.yml` file under the root is a record, except
    /// `index.yaml` files (slug lists) and anything inside `.primer`. Files
    /// are parsed in parallel.
    ///
    /// # Errors
    ///
    /// If `allow_unrecognised` is `false` (the default), any file that cannot
    /// be parsed returns an error. If it is `true`, such files are skipped.
    /// Two records with the same id are always an error.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn load_all(self) -> Result<Directory<Loaded>, DirectoryLoadError> {
        let config = load_config(&self.root);
        let (record_paths, index_paths) = collect_yaml_paths(&self.root);

        let records: Vec<Result<RecordFile, PathBuf>> = record_paths
            .par_iter()
            .map(|path| try_load_record(path))
            .collect();
        let lists: Vec<Result<(PathBuf, SlugList), PathBuf>> = index_paths
            .par_iter()
            .map(|path| try_load_list(path))
            .collect();

        let mut files = Vec::with_capacity(records.len());
        let mut unrecognised = Vec::new();
        for result in records {
            match result {
                Ok(file) => files.push(file),
                Err(path) => unrecognised.push(path),
            }
        }
        let mut index_files = Vec::with_capacity(lists.len());
        for result in lists {
            match result {
                Ok(list) => index_files.push(list),
                Err(path) => unrecognised.push(path),
            }
        }

        if !config.allow_unrecognised {
            if let Some(paths) = NonEmpty::from_vec(unrecognised) {
                return Err(DirectoryLoadError::UnrecognisedFiles(paths));
            }
        }

        let mut catalog = Catalog::with_capacity(files.len());
        let mut paths: BTreeMap<ContentId, PathBuf> = BTreeMap::new();
        for file in files {
            let path = file.path().to_path_buf();
            let record = file.into_record();
            let id = record.id.clone();
            if let Err(CatalogError::DuplicateId(id)) = catalog.insert(record) {
                let first = paths.get(&id).cloned().unwrap_or_default();
                return Err(DirectoryLoadError::DuplicateId {
                    id,
                    first,
                    second: path,
                });
            }
            paths.insert(id, path);
        }

        let (list_paths, lists): (Vec<PathBuf>, Vec<SlugList>) = index_files.into_iter().unzip();

        tracing::debug!(records = catalog.len(), "loaded content directory");

        Ok(Directory {
            root: self.root,
            state: Loaded {
                catalog,
                config,
                paths,
                lists,
                list_paths,
            },
        })
    }
}

impl Directory<Loaded> {
    /// The records in the directory.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    /// The configuration read from `.primer/config.toml`.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.state.config
    }

    /// The slug lists read from `index.yaml` files.
    #[must_use]
    pub fn lists(&self) -> &[SlugList] {
        &self.state.lists
    }

    /// Consumes the directory, returning its catalog.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        self.state.catalog
    }

    /// Returns the file a record was loaded from, or the file a new record
    /// with this id would be written to.
    ///
    /// New records go next to the `index.yaml` whose id prefix they match,
    /// named after their slug. Otherwise they go in the root, named after
    /// their id.
    #[must_use]
    pub fn path_for(&self, id: &ContentId) -> PathBuf {
        if let Some(path) = self.state.paths.get(id) {
            return path.clone();
        }

        for (list, index_path) in self.state.lists.iter().zip(&self.state.list_paths) {
            if let (Some(slug), Some(dir)) = (list.slug_of(id), index_path.parent()) {
                return dir.join(format!("{slug}.yaml"));
            }
        }

        self.root.join(format!("{id}.yaml"))
    }

    /// Checks that each record file is named after its record.
    ///
    /// A file stem must be the record id or a dash-separated suffix of it
    /// (`ibuprofen.yaml` for `topic-medication-ibuprofen`). Mismatches are
    /// warnings.
    #[must_use]
    pub fn path_issues(&self) -> Vec<Issue> {
        self.state
            .paths
            .iter()
            .filter_map(|(id, path)| {
                let stem = path.file_stem().and_then(OsStr::to_str).unwrap_or_default();
                if id_has_suffix(id, stem) {
                    None
                } else {
                    Some(Issue::warning(
                        Check::Paths,
                        id,
                        format!("file name '{}' does not match the record id", path.display()),
                    ))
                }
            })
            .collect()
    }

    /// Runs the given checks against the directory.
    ///
    /// Unlike [`Validator::run`], this includes [`Check::Paths`].
    #[must_use]
    pub fn validate(&self, checks: &[Check]) -> ValidationReport {
        let mut report = Validator::new(&self.state.catalog, &self.state.config)
            .with_lists(&self.state.lists)
            .run(checks);
        if checks.contains(&Check::Paths) {
            report.extend(self.path_issues());
        }
        report
    }

    /// Writes a new record to disk and adds it to the catalog.
    ///
    /// The record is written to [`Directory::path_for`] its id. If a slug list
    /// covers the id, the slug is appended to the list and its `index.yaml`
    /// is rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if a record with the same id exists, if the target
    /// file already exists, or if a file cannot be written.
    pub fn add_record(&mut self, record: EducationalContent) -> Result<PathBuf, AddRecordError> {
        let path = self.path_for(&record.id);
        self.add_record_at(record, path)
    }

    /// Writes a new record to a specific file and adds it to the catalog.
    ///
    /// Slug lists are updated as for [`Directory::add_record`].
    ///
    /// # Errors
    ///
    /// Returns an error if a record with the same id exists, if the file
    /// already exists, or if a file cannot be written.
    #[instrument(skip_all, fields(id = %record.id, path = %path.display()))]
    pub fn add_record_at(
        &mut self,
        record: EducationalContent,
        path: PathBuf,
    ) -> Result<PathBuf, AddRecordError> {
        if self.state.catalog.contains(&record.id) {
            return Err(AddRecordError::Exists(record.id));
        }

        if path.exists() {
            return Err(AddRecordError::PathTaken(path));
        }

        RecordFile::new(path.clone(), record.clone()).save()?;

        let state = &mut self.state;
        for (list, index_path) in state.lists.iter_mut().zip(&state.list_paths) {
            let Some(slug) = list.slug_of(&record.id) else {
                continue;
            };
            if !list.slugs.iter().any(|listed| listed == slug) {
                list.slugs.push(slug.to_string());
                let yaml = serde_yaml::to_string(list).map_err(io::Error::other)?;
                std::fs::write(index_path, yaml)?;
                tracing::debug!(list = %list.name, slug, "appended slug");
            }
        }

        state.paths.insert(record.id.clone(), path.clone());
        let id = record.id.clone();
        state
            .catalog
            .insert(record)
            .map_err(|_| AddRecordError::Exists(id))?;

        tracing::info!(path = %path.display(), "added record");

        Ok(path)
    }
}

/// Whether `stem` is the id or a suffix of it starting at a segment boundary.
fn id_has_suffix(id: &ContentId, stem: &str) -> bool {
    let id = id.as_str();
    !stem.is_empty()
        && (id == stem
            || id
                .strip_suffix(stem)
                .is_some_and(|prefix| prefix.ends_with('-')))
}

/// Loads `<root>/.primer/config.toml`, falling back to the default
/// configuration.
pub(crate) fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Config::default();
    }
    Config::load(&path).unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {e}");
        Config::default()
    })
}

/// Returns the record files and the index files under `root`, each sorted by
/// path.
fn collect_yaml_paths(root: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let (mut index_paths, mut record_paths): (Vec<_>, Vec<_>) = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            // Skip the .primer directory (configuration)
            !entry
                .path()
                .components()
                .any(|c| c.as_os_str() == CONFIG_DIR)
        })
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(OsStr::to_str),
                Some("yaml" | "yml")
            )
        })
        .map(walkdir::DirEntry::into_path)
        .partition(|path| path.file_name() == Some(OsStr::new(INDEX_FILE)));

    record_paths.sort();
    index_paths.sort();
    (record_paths, index_paths)
}

fn try_load_record(path: &Path) -> Result<RecordFile, PathBuf> {
    RecordFile::load(path).map_err(|e| {
        tracing::warn!("Failed to load record from {}: {e}", path.display());
        path.to_path_buf()
    })
}

fn try_load_list(path: &Path) -> Result<(PathBuf, SlugList), PathBuf> {
    let load = || -> Result<SlugList, LoadError> {
        let source = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&source)?)
    };
    load().map(|list| (path.to_path_buf(), list)).map_err(|e| {
        tracing::warn!("Failed to load slug list from {}: {e}", path.display());
        path.to_path_buf()
    })
}

/// Errors that can occur when loading a content directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// Some files could not be parsed.
    UnrecognisedFiles(NonEmpty<PathBuf>),
    /// Two files contain records with the same id.
    DuplicateId {
        /// The shared id.
        id: ContentId,
        /// The first file, in path order.
        first: PathBuf,
        /// The second file.
        second: PathBuf,
    },
}

impl fmt::Display for DirectoryLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        match self {
            Self::UnrecognisedFiles(paths) => {
                write!(f, "unrecognised files: ")?;
                let displayed: Vec<String> = paths
                    .iter()
                    .take(MAX_DISPLAY)
                    .map(|path| path.display().to_string())
                    .collect();
                write!(f, "{}", displayed.join(", "))?;
                if paths.len() > MAX_DISPLAY {
                    write!(f, "... (and {} more)", paths.len() - MAX_DISPLAY)?;
                }
                Ok(())
            }
            Self::DuplicateId { id, first, second } => write!(
                f,
                "duplicate content id {id} in {} and {}",
                first.display(),
                second.display()
            ),
        }
    }
}

/// Errors that can occur when adding a record to a directory.
#[derive(Debug, thiserror::Error)]
pub enum AddRecordError {
    /// A record with this id is already loaded.
    #[error("a record with id {0} already exists")]
    Exists(ContentId),
    /// The target file exists but holds no loaded record.
    #[error("{} already exists", .0.display())]
    PathTaken(PathBuf),
    /// A file could not be written.
    #[error("failed to write record: {0}")]
    Io(#[from] io::Error),
}
