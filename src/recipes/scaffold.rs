//! Starter recipes written from built-in templates.
use std::fs;
use std::path::{Path, PathBuf};

use super::manifest::{MANIFEST_FILE, RecipeType, Runtime};
use crate::error::RecipeError;
use crate::paths::is_plain_component;

/// Placeholder replaced by the recipe name in every template file.
const NAME_PLACEHOLDER: &str = "{{name}}";

/// Files making up one starter recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// `manifest.yaml` contents.
    pub manifest: &'static str,
    /// File name of the entry file.
    pub entry_name: &'static str,
    /// Entry file contents.
    pub entry: &'static str,
    /// Whether the entry file should be executable.
    pub executable: bool,
}

/// Runtime used by `recipe create` when none is given.
#[must_use]
pub const fn default_runtime(kind: RecipeType) -> Runtime {
    match kind {
        RecipeType::Provision => Runtime::Vagrant,
        RecipeType::Configure => Runtime::Ansible,
    }
}

/// Look up the starter template for `kind` and `runtime`.
///
/// # Errors
///
/// Returns [`RecipeError::NoTemplate`] for combinations the runtime cannot
/// serve.
pub fn template_for(kind: RecipeType, runtime: Runtime) -> Result<Template, RecipeError> {
    match (kind, runtime) {
        (RecipeType::Provision, Runtime::Vagrant) => Ok(Template {
            manifest: include_str!("templates/vagrant_manifest.yaml"),
            entry_name: "Vagrantfile",
            entry: include_str!("templates/Vagrantfile"),
            executable: false,
        }),
        (RecipeType::Configure, Runtime::Ansible) => Ok(Template {
            manifest: include_str!("templates/ansible_manifest.yaml"),
            entry_name: "site.yml",
            entry: include_str!("templates/site.yml"),
            executable: false,
        }),
        (RecipeType::Configure, Runtime::Bash) => Ok(Template {
            manifest: include_str!("templates/bash_manifest.yaml"),
            entry_name: "setup.sh",
            entry: include_str!("templates/setup.sh"),
            executable: true,
        }),
        _ => Err(RecipeError::NoTemplate {
            kind,
            runtime: runtime.to_string(),
        }),
    }
}

fn write(path: &Path, content: &str) -> Result<(), RecipeError> {
    fs::write(path, content).map_err(|source| RecipeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), RecipeError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(|source| {
        RecipeError::Io {
            path: path.to_path_buf(),
            source,
        }
    })
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), RecipeError> {
    Ok(())
}

/// Check that a starter recipe can be written to `parent/<name>` without
/// touching the filesystem.
///
/// Returns the destination directory and the template to write there.
///
/// # Errors
///
/// Returns [`RecipeError::InvalidName`] if `name` is not a plain directory
/// name, [`RecipeError::NoTemplate`] for unsupported combinations, and
/// [`RecipeError::AlreadyExists`] if the destination exists.
pub fn destination(
    name: &str,
    parent: &Path,
    kind: RecipeType,
    runtime: Runtime,
) -> Result<(PathBuf, Template), RecipeError> {
    if !is_plain_component(name) {
        return Err(RecipeError::InvalidName(name.to_string()));
    }
    let template = template_for(kind, runtime)?;

    let dest = parent.join(name);
    if dest.exists() {
        return Err(RecipeError::AlreadyExists(dest));
    }
    Ok((dest, template))
}

/// Write a starter recipe named `name` into `parent/<name>`.
///
/// Returns the new recipe directory.
///
/// # Errors
///
/// Returns the errors of [`destination`], and [`RecipeError::Io`] if files
/// cannot be written.
pub fn create(
    name: &str,
    parent: &Path,
    kind: RecipeType,
    runtime: Runtime,
) -> Result<PathBuf, RecipeError> {
    let (dest, template) = destination(name, parent, kind, runtime)?;
    fs::create_dir_all(&dest).map_err(|source| RecipeError::Io {
        path: dest.clone(),
        source,
    })?;

    write(
        &dest.join(MANIFEST_FILE),
        &template.manifest.replace(NAME_PLACEHOLDER, name),
    )?;
    let entry = dest.join(template.entry_name);
    write(&entry, &template.entry.replace(NAME_PLACEHOLDER, name))?;
    if template.executable {
        make_executable(&entry)?;
    }

    Ok(dest)
}
