//! Filesystem storage for content directories.

/// Loading and writing whole content directories.
pub mod directory;
mod record_file;

pub use directory::{AddRecordError, Directory, DirectoryLoadError, Loaded, Unloaded};
pub use record_file::{LoadError, RecordFile};

/// Name of the directory holding configuration, relative to the content root.
pub const CONFIG_DIR: &str = ".primer";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// File name of slug list documents.
pub const INDEX_FILE: &str = "index.yaml";
