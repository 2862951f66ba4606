use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Settings file picked up from the working directory when present.
pub const DEFAULT_FILE: &str = "historic.toml";

/// Environment variables `HISTORIC_<KEY>` override the file.
pub const ENV_PREFIX: &str = "HISTORIC";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub combined_file: String,
    /// Source extensions, compared case-insensitively.
    pub extensions: Vec<String>,
    /// File stem never treated as a property document (the site index).
    pub reserved_stem: String,
    pub write_individual: bool,
    /// Documents handed to the worker pool per batch.
    pub chunk_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("html_files"),
            output_dir: PathBuf::from("json_data"),
            combined_file: "all_properties.json".to_string(),
            extensions: vec!["html".to_string(), "htm".to_string()],
            reserved_stem: "index".to_string(),
            write_individual: true,
            chunk_size: 500,
        }
    }
}

impl Settings {
    pub fn combined_path(&self) -> PathBuf {
        self.output_dir.join(&self.combined_file)
    }
}

/// Defaults, then the settings file, then the environment.
///
/// An explicit `file` must exist; the default one is optional.
pub fn load(file: Option<&Path>) -> Result<Settings, ConfigError> {
    let source = match file {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_FILE).required(false),
    };

    let settings: Settings = config::Config::builder()
        .add_source(source)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("extensions"),
        )
        .build()?
        .try_deserialize()?;

    if settings.chunk_size == 0 {
        return Err(ConfigError(config::ConfigError::Message(
            "chunk_size must be at least 1".to_string(),
        )));
    }
    if settings.combined_file.trim().is_empty() {
        return Err(ConfigError(config::ConfigError::Message(
            "combined_file must not be empty".to_string(),
        )));
    }
    Ok(settings)
}
