use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{ImageStoreError, Result};

/// Image storage configuration.
///
/// `dir` and `url` are required; the host application decides where images
/// live and how they are served.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageStoreConfig {
    /// Base directory under which `{category}/{entity_key}/` folders are created.
    pub dir: PathBuf,
    /// Base URL the same tree is served from.
    pub url: String,
    /// Filename prefix marking the default image. Default: "^".
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Accepted extensions, compared case-insensitively. Default: jpg, gif, png.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_marker() -> String {
    "^".into()
}
fn default_allowed_extensions() -> Vec<String> {
    vec!["jpg".into(), "gif".into(), "png".into()]
}

/// Layout of a config file: everything lives under an `[images]` table.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    images: ImageStoreConfig,
}

impl ImageStoreConfig {
    pub fn new(dir: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url: url.into(),
            marker: default_marker(),
            allowed_extensions: default_allowed_extensions(),
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Load from `config/config.*`, then the file named by `FFS_CONFIG`, then
    /// environment variables (e.g. `FFS__IMAGES__DIR`, `FFS__IMAGES__URL`).
    pub fn load() -> Result<Self> {
        let mut builder =
            Config::builder().add_source(File::with_name("config/config").required(false));
        if let Ok(path) = std::env::var("FFS_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }
        Self::finish(builder.add_source(env_source()).build()?)
    }

    /// Load from one explicit file, with environment overrides on top.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(env_source())
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self> {
        let file: ConfigFile = settings.try_deserialize()?;
        file.images.normalized()
    }

    /// Lowercase the extension allow-list and check the marker is usable.
    pub fn normalized(mut self) -> Result<Self> {
        if self.marker.is_empty() {
            return Err(ImageStoreError::Config("marker cannot be empty".into()));
        }
        if self.marker.contains(['/', '\\', '\0']) {
            return Err(ImageStoreError::Config(format!(
                "marker {:?} must not contain path separators or null bytes",
                self.marker
            )));
        }
        // Sanitized names never start with these, so a marker starting with
        // one would tag ordinary uploads as the default.
        if self
            .marker
            .starts_with(|c: char| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(ImageStoreError::Config(format!(
                "marker {:?} must not start with a letter, digit or '-'",
                self.marker
            )));
        }
        self.allowed_extensions = self
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Ok(self)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("FFS")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("images.allowed_extensions")
        .try_parsing(true)
}
