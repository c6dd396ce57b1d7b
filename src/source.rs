//! Config file resolution.

use std::path::{Path, PathBuf};

use crate::config::{ConfigOption, DEFAULT_FILE_BASE_NAME};
use crate::document::Document;
use crate::format::{self, SUPPORTED_EXTENSIONS};
use crate::util::string_in_slice;
use crate::{Error, Result};

/// Something that can turn a (name, extension, search paths) request into a
/// parsed document.
pub trait ConfigSource {
    /// Load the first matching document.
    ///
    /// An empty `extension` means every supported extension is tried in
    /// priority order.
    fn load(&self, base_name: &str, extension: &str, search_paths: &[String]) -> Result<Document>;
}

/// Searches directories on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileConfigSource;

impl FileConfigSource {
    pub fn new() -> Self {
        Self
    }

    /// Candidate files for one directory, paired with the format to parse them as.
    fn candidates(dir: &Path, base_name: &str, extension: &str) -> Vec<(PathBuf, &'static str)> {
        if extension.is_empty() {
            return SUPPORTED_EXTENSIONS
                .iter()
                .map(|ext| (dir.join(format!("{}.{}", base_name, ext)), *ext))
                .collect();
        }

        let Some(ext) = SUPPORTED_EXTENSIONS.iter().find(|e| **e == extension) else {
            return Vec::new();
        };

        let mut candidates = vec![(dir.join(format!("{}.{}", base_name, ext)), *ext)];
        if base_name.ends_with(&format!(".{}", ext)) {
            candidates.push((dir.join(base_name), *ext));
        }
        candidates
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self, base_name: &str, extension: &str, search_paths: &[String]) -> Result<Document> {
        let found = search_paths.iter().find_map(|dir| {
            Self::candidates(Path::new(dir), base_name, extension)
                .into_iter()
                .find(|(path, _)| path.is_file())
        });

        let Some((path, ext)) = found else {
            return Err(Error::ConfigNotFound {
                name: base_name.to_string(),
                paths: search_paths.to_vec(),
            });
        };

        let text = std::fs::read_to_string(&path)?;
        let value = format::parse(ext, &text).map_err(|message| Error::ConfigParse {
            path: path.clone(),
            message,
        })?;

        Ok(Document::from_value(value))
    }
}

/// Validate the extension in `option`, apply the default name and search
/// path, and load the document from `source`.
pub fn resolve(source: &dyn ConfigSource, option: &ConfigOption) -> Result<Document> {
    let extension = check_config_type(&option.file_extension)?;

    let base_name = match option.file_base_name.trim() {
        "" => DEFAULT_FILE_BASE_NAME,
        name => name,
    };

    let search_paths: Vec<String> = if option.search_paths.is_empty() {
        vec![".".to_string()]
    } else {
        option
            .search_paths
            .iter()
            .map(|p| p.trim().to_string())
            .collect()
    };

    source.load(base_name, extension, &search_paths)
}

/// Returns the trimmed extension, or an error when it is not supported.
fn check_config_type(extension: &str) -> Result<&str> {
    let config_type = extension.trim();
    if !config_type.is_empty() && !string_in_slice(config_type, &SUPPORTED_EXTENSIONS) {
        return Err(Error::UnsupportedConfigType(extension.to_string()));
    }
    Ok(config_type)
}
