use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use crate::domain::EducationalContent;

/// A record together with the file it is stored in.
///
/// Record files are YAML documents with camelCase keys, one record per file.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFile {
    path: PathBuf,
    record: EducationalContent,
}

impl RecordFile {
    /// Pairs a record with the path it should be stored at.
    #[must_use]
    pub const fn new(path: PathBuf, record: EducationalContent) -> Self {
        Self { path, record }
    }

    /// Reads a record file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or does
    /// not contain a valid record.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound,
            _ => LoadError::Io(io_error),
        })?;

        let record = Self::read(&mut BufReader::new(file))?;
        Ok(Self::new(path.to_path_buf(), record))
    }

    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<EducationalContent, LoadError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(EducationalContent::from_yaml(&source)?)
    }

    fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let yaml = self.record.to_yaml().map_err(io::Error::other)?;
        writer.write_all(yaml.as_bytes())
    }

    /// Writes the record back to its own path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save(&self) -> io::Result<()> {
        self.save_to_path(&self.path)
    }

    /// Writes the record to a specific file path.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write(&mut writer)?;
        writer.flush()
    }

    /// The path the record is stored at.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The record.
    #[must_use]
    pub const fn record(&self) -> &EducationalContent {
        &self.record
    }

    /// Consumes the file, returning the record.
    #[must_use]
    pub fn into_record(self) -> EducationalContent {
        self.record
    }
}

/// Errors that can occur when loading a record file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The record file was not found.
    #[error("record file not found")]
    NotFound,
    /// An I/O error occurred.
    #[error("failed to read record file: {0}")]
    Io(#[from] io::Error),
    /// The file is not a valid record.
    #[error("failed to parse record: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
