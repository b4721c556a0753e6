//! Recipe discovery: walk search directories and index manifests by type and name.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::manifest::{self, MANIFEST_FILE, Manifest, RecipeType, ScanIssue};
use crate::config::UnknownTypePolicy;
use crate::error::RecipeError;

/// Name-keyed recipes, split by type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeIndex {
    provision: BTreeMap<String, Manifest>,
    configure: BTreeMap<String, Manifest>,
}

/// A manifest that replaced an earlier one with the same type and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowed {
    /// Recipe type shared by both manifests.
    pub kind: RecipeType,
    /// Recipe name shared by both manifests.
    pub name: String,
    /// Directory of the manifest that was replaced.
    pub previous_dir: PathBuf,
    /// Directory of the manifest now in the index.
    pub dir: PathBuf,
}

/// Outcome of scanning the recipe search path.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Recipes that were indexed.
    pub index: RecipeIndex,
    /// Manifests that could not be indexed.
    pub issues: Vec<ScanIssue>,
    /// Name collisions resolved in favour of the later manifest.
    pub shadowed: Vec<Shadowed>,
}

impl ScanReport {
    /// Apply the unknown-type policy to the collected issues.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::UnknownTypes`] if the policy is
    /// [`UnknownTypePolicy::Error`] and any manifest declared an unknown type.
    pub fn enforce(&self, policy: UnknownTypePolicy) -> Result<(), RecipeError> {
        if policy == UnknownTypePolicy::Ignore {
            return Ok(());
        }
        let mut unknown = self.issues.iter().filter(|i| i.is_unknown_type());
        match unknown.next() {
            Some(first) => Err(RecipeError::UnknownTypes {
                count: 1 + unknown.count(),
                first: first.path().to_path_buf(),
            }),
            None => Ok(()),
        }
    }
}

/// Recursively scan `dirs` for `manifest.yaml` files and index them.
///
/// Directories are visited in order and each walk is sorted by file name, so
/// the result is deterministic. A manifest that fails to load is recorded as
/// an issue and the scan continues. When two manifests of the same type
/// share a name, the later one wins and the collision is recorded.
#[must_use]
pub fn scan(dirs: &[PathBuf]) -> ScanReport {
    let mut report = ScanReport::default();
    for dir in dirs {
        scan_dir(dir, &mut report);
    }
    report
}

fn scan_dir(dir: &Path, report: &mut ScanReport) {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                report.issues.push(ScanIssue::Unreadable {
                    path,
                    message: e.to_string(),
                });
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
            continue;
        }
        match manifest::load(entry.path()) {
            Ok(manifest) => {
                if let Some(previous) = report.index.insert(manifest.clone()) {
                    report.shadowed.push(Shadowed {
                        kind: manifest.recipe_type,
                        name: manifest.name,
                        previous_dir: previous.recipe_dir,
                        dir: manifest.recipe_dir,
                    });
                }
            }
            Err(issue) => report.issues.push(issue),
        }
    }
}

impl RecipeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    const fn map(&self, kind: RecipeType) -> &BTreeMap<String, Manifest> {
        match kind {
            RecipeType::Provision => &self.provision,
            RecipeType::Configure => &self.configure,
        }
    }

    /// Insert a manifest under its own type and name, returning any manifest
    /// it replaced.
    pub fn insert(&mut self, manifest: Manifest) -> Option<Manifest> {
        let map = match manifest.recipe_type {
            RecipeType::Provision => &mut self.provision,
            RecipeType::Configure => &mut self.configure,
        };
        map.insert(manifest.name.clone(), manifest)
    }

    /// Look up a recipe by type and name.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::NotFound`] if no such recipe was indexed.
    pub fn get(&self, kind: RecipeType, name: &str) -> Result<&Manifest, RecipeError> {
        self.map(kind)
            .get(name)
            .ok_or_else(|| RecipeError::NotFound {
                kind,
                name: name.to_string(),
            })
    }

    /// Recipes of `kind`, ordered by name.
    pub fn recipes(&self, kind: RecipeType) -> impl Iterator<Item = &Manifest> {
        self.map(kind).values()
    }

    /// Total number of indexed recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.provision.len() + self.configure.len()
    }

    /// Whether no recipes were indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render a human-readable listing of both recipe types.
    #[must_use]
    pub fn render_listing(&self) -> String {
        let mut out = String::new();
        for kind in [RecipeType::Provision, RecipeType::Configure] {
            out.push_str(&format!("{kind} recipes:\n"));
            let recipes: Vec<&Manifest> = self.recipes(kind).collect();
            if recipes.is_empty() {
                out.push_str("  (none)\n");
                continue;
            }
            let name_width = recipes.iter().map(|m| m.name.len()).max().unwrap_or(0);
            let runtime_width = recipes
                .iter()
                .map(|m| m.recipe_runtime.len())
                .max()
                .unwrap_or(0);
            for m in recipes {
                let version = m.version.as_deref().unwrap_or("-");
                out.push_str(&format!(
                    "  {:<name_width$}  {:<runtime_width$}  {:<8}  {}\n",
                    m.name,
                    m.recipe_runtime,
                    version,
                    m.recipe_dir.display()
                ));
            }
        }
        out
    }

    /// JSON listing: `{"provision": [...], "configure": [...]}`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "provision": self.provision.values().collect::<Vec<_>>(),
            "configure": self.configure.values().collect::<Vec<_>>(),
        })
    }
}
