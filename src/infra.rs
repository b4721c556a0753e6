//! Infrastructure name resolution and localhost inventory bootstrapping.
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::InfraError;
use crate::paths::is_plain_component;

/// Name of the infrastructure that always refers to the local machine.
pub const LOCALHOST: &str = "localhost";

/// Inventory file expected inside every infrastructure directory.
pub const INVENTORY_FILE: &str = "hosts.ini";

/// Inventory written for [`LOCALHOST`].
pub const LOCALHOST_INVENTORY: &str = "[local]\nlocalhost ansible_connection=local\n";

/// A resolved infrastructure target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Infrastructure {
    /// Logical infrastructure name.
    pub name: String,
    /// Directory holding the inventory data.
    pub dir: PathBuf,
}

impl Infrastructure {
    /// Whether this target is the local machine.
    #[must_use]
    pub fn is_localhost(&self) -> bool {
        self.name == LOCALHOST
    }

    /// Path of the Ansible inventory file.
    #[must_use]
    pub fn inventory(&self) -> PathBuf {
        inventory_file(&self.dir)
    }
}

/// Path of the inventory file inside `infra_dir`.
#[must_use]
pub fn inventory_file(infra_dir: &Path) -> PathBuf {
    infra_dir.join(INVENTORY_FILE)
}

/// Directory where the inventory data of `name` lives, without touching
/// the filesystem.
///
/// # Errors
///
/// Returns [`InfraError::InvalidName`] if `name` is not a plain directory name.
pub fn location(working_dir: &Path, name: &str) -> Result<PathBuf, InfraError> {
    if !is_plain_component(name) {
        return Err(InfraError::InvalidName(name.to_string()));
    }
    Ok(working_dir.join(name))
}

/// Resolve `name` to its inventory directory under `working_dir`.
///
/// For [`LOCALHOST`] the directory is created if needed and `hosts.ini` is
/// (re)written with [`LOCALHOST_INVENTORY`] on every call. Any other name
/// must already exist; it is never created here.
///
/// # Errors
///
/// Returns [`InfraError::InvalidName`] for unusable names,
/// [`InfraError::NotProvisioned`] if a non-localhost directory is absent, and
/// [`InfraError::Io`] if the localhost inventory cannot be written.
pub fn resolve(working_dir: &Path, name: &str) -> Result<Infrastructure, InfraError> {
    let dir = location(working_dir, name)?;

    if name == LOCALHOST {
        fs::create_dir_all(&dir).map_err(|source| InfraError::Io {
            path: dir.clone(),
            source,
        })?;
        let inventory = inventory_file(&dir);
        fs::write(&inventory, LOCALHOST_INVENTORY).map_err(|source| InfraError::Io {
            path: inventory,
            source,
        })?;
    } else if !dir.exists() {
        return Err(InfraError::NotProvisioned {
            name: name.to_string(),
            path: dir,
        });
    }

    Ok(Infrastructure {
        name: name.to_string(),
        dir,
    })
}
