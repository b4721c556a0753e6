//! Recipe manifest model and `manifest.yaml` parsing.
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name that marks a directory as a recipe.
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Entry used when a manifest omits `recipe_entry`.
pub const DEFAULT_ENTRY: &str = "bash";

/// What a recipe does to an infrastructure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum RecipeType {
    /// Creates machines and networks.
    Provision,
    /// Installs and configures software on existing machines.
    Configure,
}

impl RecipeType {
    /// Parse the `recipe_type` value of a manifest.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "provision" => Some(Self::Provision),
            "configure" => Some(Self::Configure),
            _ => None,
        }
    }

    /// The manifest spelling of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provision => "provision",
            Self::Configure => "configure",
        }
    }
}

impl fmt::Display for RecipeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External tool family a recipe delegates to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    /// `ansible-playbook` against an inventory.
    Ansible,
    /// A local shell script.
    Bash,
    /// `vagrant up` with a provider.
    Vagrant,
}

impl Runtime {
    /// Parse the `recipe_runtime` value of a manifest.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ansible" => Some(Self::Ansible),
            "bash" => Some(Self::Bash),
            "vagrant" => Some(Self::Vagrant),
            _ => None,
        }
    }

    /// The manifest spelling of this runtime.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ansible => "ansible",
            Self::Bash => "bash",
            Self::Vagrant => "vagrant",
        }
    }

    /// Executable invoked for this runtime.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Ansible => "ansible-playbook",
            Self::Bash => "bash",
            Self::Vagrant => "vagrant",
        }
    }

    /// Whether this runtime can carry out recipes of `kind`.
    #[must_use]
    pub const fn serves(self, kind: RecipeType) -> bool {
        matches!(
            (self, kind),
            (Self::Vagrant, RecipeType::Provision)
                | (Self::Ansible | Self::Bash, RecipeType::Configure)
        )
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A loaded recipe manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Recipe name, unique within its type.
    pub name: String,
    /// Declared recipe type.
    pub recipe_type: RecipeType,
    /// Declared runtime tag, validated at dispatch time.
    pub recipe_runtime: String,
    /// Playbook, script, or Vagrantfile relative to `recipe_dir`.
    pub recipe_entry: String,
    /// Optional recipe version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional project homepage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    /// Optional source repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// Optional one-line description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Directory containing the manifest file.
    pub recipe_dir: PathBuf,
}

impl Manifest {
    /// The declared runtime, if it is one this dispatcher knows.
    #[must_use]
    pub fn runtime(&self) -> Option<Runtime> {
        Runtime::parse(&self.recipe_runtime)
    }

    /// Path to the entry file.
    #[must_use]
    pub fn entry_path(&self) -> PathBuf {
        self.recipe_dir.join(&self.recipe_entry)
    }
}

/// A manifest file that could not be indexed.
///
/// Issues are collected per file while scanning; they never stop the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanIssue {
    /// The file or directory could not be read.
    Unreadable {
        /// Offending path.
        path: PathBuf,
        /// I/O error message.
        message: String,
    },
    /// The file is not valid YAML for a manifest.
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// A required key is absent or empty.
    MissingField {
        /// Offending path.
        path: PathBuf,
        /// Name of the missing key.
        field: &'static str,
    },
    /// `recipe_type` is neither `provision` nor `configure`.
    UnknownType {
        /// Offending path.
        path: PathBuf,
        /// Declared value.
        value: String,
    },
}

impl ScanIssue {
    /// Path of the file the issue refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unreadable { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingField { path, .. }
            | Self::UnknownType { path, .. } => path,
        }
    }

    /// Whether this issue is an unrecognized `recipe_type`.
    #[must_use]
    pub const fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType { .. })
    }
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "error loading YAML file {}: {message}", path.display())
            }
            Self::MissingField { path, field } => {
                write!(f, "{} is missing required key '{field}'", path.display())
            }
            Self::UnknownType { path, value } => write!(
                f,
                "{} declares unknown recipe_type '{value}'",
                path.display()
            ),
        }
    }
}

/// Shape of `manifest.yaml` before validation.
#[derive(Debug, Default, Deserialize)]
struct RawManifest {
    name: Option<serde_yaml::Value>,
    recipe_type: Option<String>,
    recipe_runtime: Option<String>,
    recipe_entry: Option<String>,
    version: Option<serde_yaml::Value>,
    homepage: Option<String>,
    repository_url: Option<String>,
    description: Option<String>,
}

/// Render a YAML scalar as a string (`version: 1.2` parses as a float).
fn scalar(value: Option<serde_yaml::Value>) -> Option<String> {
    match value? {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
    .filter(|s| !s.trim().is_empty())
}

/// Parse manifest `content` read from `path`.
///
/// `recipe_dir` is set to the parent directory of `path`.
///
/// # Errors
///
/// Returns a [`ScanIssue`] if the content is not valid YAML, a required key
/// is missing, or `recipe_type` is unrecognized.
pub fn parse(path: &Path, content: &str) -> Result<Manifest, ScanIssue> {
    let raw: RawManifest = serde_yaml::from_str(content).map_err(|e| ScanIssue::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let missing = |field| ScanIssue::MissingField {
        path: path.to_path_buf(),
        field,
    };

    let name = scalar(raw.name).ok_or_else(|| missing("name"))?;
    let type_value = raw
        .recipe_type
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| missing("recipe_type"))?;
    let recipe_type = RecipeType::parse(type_value.trim()).ok_or_else(|| ScanIssue::UnknownType {
        path: path.to_path_buf(),
        value: type_value.clone(),
    })?;
    let recipe_runtime = raw
        .recipe_runtime
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing("recipe_runtime"))?;
    let recipe_entry = raw
        .recipe_entry
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ENTRY.to_string());

    Ok(Manifest {
        name,
        recipe_type,
        recipe_runtime,
        recipe_entry,
        version: scalar(raw.version),
        homepage: raw.homepage,
        repository_url: raw.repository_url,
        description: raw.description,
        recipe_dir: path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf),
    })
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns a [`ScanIssue`] if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<Manifest, ScanIssue> {
    let content = std::fs::read_to_string(path).map_err(|e| ScanIssue::Unreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse(path, &content)
}
