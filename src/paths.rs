//! Search-path normalization and small path helpers.
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Resolve candidate directories into a deduplicated list of existing,
/// absolute directories.
///
/// `primary` is checked first, then `defaults` in order. Relative candidates
/// are joined onto `base`. Candidates that do not exist or are not
/// directories are dropped. Two spellings of the same directory (relative vs
/// absolute, `..` segments, symlinks) collapse to the first occurrence.
#[must_use]
pub fn normalize_dirs(primary: Option<&Path>, defaults: &[PathBuf], base: &Path) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    primary
        .into_iter()
        .chain(defaults.iter().map(PathBuf::as_path))
        .filter_map(|candidate| {
            let joined = if candidate.is_absolute() {
                candidate.to_path_buf()
            } else {
                base.join(candidate)
            };
            dunce::canonicalize(joined).ok()
        })
        .filter(|dir| dir.is_dir())
        .filter(|dir| seen.insert(dir.clone()))
        .collect()
}

/// Expand a leading `~/` to the user's home directory.
///
/// Paths without the prefix, or when no home directory is known, are
/// returned unchanged.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| path.to_path_buf(), |home| PathBuf::from(home).join(rest))
}

/// Whether `name` is a single plain path component usable as a directory
/// name (not empty, no separators, not `.` or `..`).
#[must_use]
pub fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn keeps_existing_in_order_and_drops_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a");
        let b = tmp.path().join("b");
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();

        let defaults = vec![
            PathBuf::from("missing"),
            b.clone(),
            tmp.path().join("also-missing"),
        ];
        let dirs = normalize_dirs(Some(Path::new("a")), &defaults, tmp.path());

        let canon = |p: &Path| dunce::canonicalize(p).unwrap();
        assert_eq!(dirs, vec![canon(&a), canon(&b)]);
        assert!(dirs.iter().all(|d| d.is_absolute()));
    }

    #[test]
    fn collapses_different_spellings() {
        let tmp = tempfile::tempdir().unwrap();
        let a = tmp.path().join("a");
        fs::create_dir_all(&a).unwrap();

        let defaults = vec![
            a.clone(),
            PathBuf::from("./a"),
            PathBuf::from("a/../a"),
        ];
        let dirs = normalize_dirs(Some(Path::new("a")), &defaults, tmp.path());
        assert_eq!(dirs.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn collapses_symlinked_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let real = tmp.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let dirs = normalize_dirs(None, &[link, real.clone()], tmp.path());
        assert_eq!(dirs, vec![dunce::canonicalize(&real).unwrap()]);
    }

    #[test]
    fn drops_regular_files() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("manifest.yaml");
        fs::write(&file, "").unwrap();
        assert!(normalize_dirs(Some(&file), &[], tmp.path()).is_empty());
    }

    #[test]
    fn no_candidates_yields_empty() {
        assert!(normalize_dirs(None, &[], Path::new("/")).is_empty());
    }

    #[test]
    fn expand_home_leaves_plain_paths() {
        assert_eq!(
            expand_home(Path::new("/opt/recipes")),
            PathBuf::from("/opt/recipes")
        );
        assert_eq!(expand_home(Path::new("recipes")), PathBuf::from("recipes"));
    }

    #[test]
    fn expand_home_replaces_tilde() {
        let Some(home) = std::env::var_os("HOME") else {
            return;
        };
        assert_eq!(
            expand_home(Path::new("~/recipes")),
            PathBuf::from(home).join("recipes")
        );
    }

    #[test]
    fn plain_component_rules() {
        assert!(is_plain_component("localhost"));
        assert!(is_plain_component("web-01"));
        assert!(!is_plain_component(""));
        assert!(!is_plain_component("."));
        assert!(!is_plain_component(".."));
        assert!(!is_plain_component("a/b"));
        assert!(!is_plain_component("/abs"));
        assert!(!is_plain_component("trailing/"));
    }
}
