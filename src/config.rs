use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{ReleaseError, Result};

/// Name of the project-level configuration file.
pub const CONFIG_FILE_NAME: &str = "pyrelease.toml";

/// Represents the complete configuration for py-release.
///
/// Contains the version descriptors to keep in sync, the external tool
/// commands for each stage, upload settings and git behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default = "default_descriptors")]
    pub descriptors: Vec<DescriptorConfig>,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub git: GitConfig,
}

/// Where the current version is read from.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct VersionConfig {
    /// Descriptor path holding the authoritative version. When unset, the
    /// first configured descriptor that exists is used.
    #[serde(default)]
    pub source: Option<PathBuf>,
}

/// How a descriptor file spells its version assignment.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    /// `version='X.Y.Z'` keyword argument in setup.py
    SetupPy,
    /// `version = "X.Y.Z"` line in pyproject.toml
    Pyproject,
    /// `__version__ = 'X.Y.Z'` line in a Python module
    VersionModule,
}

/// A file embedding the version string.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DescriptorConfig {
    pub path: PathBuf,
    pub kind: DescriptorKind,
    /// Missing optional descriptors are skipped instead of failing.
    #[serde(default)]
    pub optional: bool,
}

impl DescriptorConfig {
    pub fn new(path: impl Into<PathBuf>, kind: DescriptorKind) -> Self {
        DescriptorConfig {
            path: path.into(),
            kind,
            optional: false,
        }
    }
}

/// Returns the default descriptor set of a setuptools-era package.
fn default_descriptors() -> Vec<DescriptorConfig> {
    vec![
        DescriptorConfig {
            path: PathBuf::from("setup.py"),
            kind: DescriptorKind::SetupPy,
            optional: true,
        },
        DescriptorConfig {
            path: PathBuf::from("pyproject.toml"),
            kind: DescriptorKind::Pyproject,
            optional: true,
        },
        DescriptorConfig {
            path: PathBuf::from("__init__.py"),
            kind: DescriptorKind::VersionModule,
            optional: true,
        },
    ]
}

fn default_test_command() -> Vec<String> {
    vec!["pytest".to_string()]
}

fn default_build_command() -> Vec<String> {
    vec!["python".to_string(), "-m".to_string(), "build".to_string()]
}

fn default_check_command() -> Vec<String> {
    vec!["twine".to_string(), "check".to_string()]
}

fn default_upload_command() -> Vec<String> {
    vec!["twine".to_string(), "upload".to_string()]
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

/// External tool commands, as argv lists.
///
/// The check and upload commands receive the artifact paths as trailing
/// arguments.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_test_command")]
    pub test: Vec<String>,

    #[serde(default = "default_build_command")]
    pub build: Vec<String>,

    #[serde(default = "default_check_command")]
    pub check: Vec<String>,

    #[serde(default = "default_upload_command")]
    pub upload: Vec<String>,

    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            test: default_test_command(),
            build: default_build_command(),
            check: default_check_command(),
            upload: default_upload_command(),
            dist_dir: default_dist_dir(),
        }
    }
}

/// Package index settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct UploadConfig {
    /// Named repository from ~/.pypirc, passed as `--repository`
    #[serde(default)]
    pub repository: Option<String>,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_tag_pattern() -> String {
    "v{version}".to_string()
}

fn default_commit_message() -> String {
    "Bump version to {version}".to_string()
}

/// Configuration for the commit/tag/push stage.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            tag_pattern: default_tag_pattern(),
            commit_message: default_commit_message(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: VersionConfig::default(),
            descriptors: default_descriptors(),
            tools: ToolsConfig::default(),
            upload: UploadConfig::default(),
            git: GitConfig::default(),
        }
    }
}

impl Config {
    /// Check invariants serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.descriptors.is_empty() {
            return Err(ReleaseError::config("at least one descriptor is required"));
        }

        let commands = [
            ("tools.test", &self.tools.test),
            ("tools.build", &self.tools.build),
            ("tools.check", &self.tools.check),
            ("tools.upload", &self.tools.upload),
        ];
        for (key, argv) in commands {
            if argv.first().map_or(true, |program| program.trim().is_empty()) {
                return Err(ReleaseError::config(format!("{} must name a program", key)));
            }
        }

        if !is_project_subdir(&self.tools.dist_dir) {
            return Err(ReleaseError::config(format!(
                "tools.dist_dir '{}' must be a relative subdirectory of the project",
                self.tools.dist_dir.display()
            )));
        }

        if let Some(source) = &self.version.source {
            if !self.descriptors.iter().any(|d| &d.path == source) {
                return Err(ReleaseError::config(format!(
                    "version.source '{}' is not a configured descriptor",
                    source.display()
                )));
            }
        }

        crate::domain::TagPattern::new(self.git.tag_pattern.clone())?;
        Ok(())
    }
}

/// Whether `path` names a directory strictly below the project root: not
/// empty, not absolute, and made of plain names only (no `.`, `..` or
/// prefixes).
pub fn is_project_subdir(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `pyrelease.toml` in the project root
/// 3. `pyrelease.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `project_root` - Directory the release runs in
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration, validated
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, project_root: &Path) -> Result<Config> {
    let located = if let Some(path) = config_path {
        Some(path.to_path_buf())
    } else if project_root.join(CONFIG_FILE_NAME).exists() {
        Some(project_root.join(CONFIG_FILE_NAME))
    } else {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    };

    let config = match located {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading configuration");
            let text = fs::read_to_string(&path).map_err(|e| {
                ReleaseError::config(format!("cannot read {}: {}", path.display(), e))
            })?;
            toml::from_str::<Config>(&text).map_err(|e| {
                ReleaseError::config(format!("cannot parse {}: {}", path.display(), e))
            })?
        }
        None => {
            tracing::debug!("no configuration file found, using defaults");
            Config::default()
        }
    };

    config.validate()?;
    Ok(config)
}
