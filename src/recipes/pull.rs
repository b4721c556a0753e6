//! Fetching recipe repositories with `git clone`.
use std::path::{Path, PathBuf};

use crate::error::RecipeError;
use crate::exec::Invocation;
use crate::paths::is_plain_component;

/// Derive a recipe directory name from a repository URL.
///
/// Takes the last path segment (after `/` or the `:` of scp-like URLs) and
/// strips a trailing `.git`.
///
/// # Errors
///
/// Returns [`RecipeError::InvalidSource`] if no usable segment remains.
pub fn derive_name(url: &str) -> Result<String, RecipeError> {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or_default();
    let name = segment.strip_suffix(".git").unwrap_or(segment);
    if is_plain_component(name) {
        Ok(name.to_string())
    } else {
        Err(RecipeError::InvalidSource(url.to_string()))
    }
}

/// A planned clone: the `git` invocation and where it will land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClonePlan {
    /// `git clone <url> <dest>`.
    pub invocation: Invocation,
    /// Destination directory.
    pub dest: PathBuf,
}

/// Plan cloning `url` into `recipes_dir/<name>`.
///
/// # Errors
///
/// Returns [`RecipeError::InvalidName`] for unusable explicit names,
/// [`RecipeError::InvalidSource`] if no name can be derived, and
/// [`RecipeError::AlreadyExists`] if the destination exists.
pub fn plan_clone(
    url: &str,
    name: Option<&str>,
    recipes_dir: &Path,
) -> Result<ClonePlan, RecipeError> {
    let name = match name {
        Some(n) if is_plain_component(n) => n.to_string(),
        Some(n) => return Err(RecipeError::InvalidName(n.to_string())),
        None => derive_name(url)?,
    };
    let dest = recipes_dir.join(name);
    if dest.exists() {
        return Err(RecipeError::AlreadyExists(dest));
    }
    let invocation = Invocation::new("git").args([
        "clone".to_string(),
        url.to_string(),
        dest.display().to_string(),
    ]);
    Ok(ClonePlan { invocation, dest })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn derives_names_from_common_urls() {
        let cases = [
            ("https://github.com/acme/web-stack.git", "web-stack"),
            ("https://github.com/acme/web-stack", "web-stack"),
            ("https://github.com/acme/web-stack/", "web-stack"),
            ("git@github.com:acme/db.git", "db"),
            ("git@host:db.git", "db"),
            ("/srv/git/local-recipes", "local-recipes"),
        ];
        for (url, expected) in cases {
            assert_eq!(derive_name(url).unwrap(), expected, "{url}");
        }
    }

    #[test]
    fn rejects_urls_without_a_name() {
        for url in ["", "/", "https://host/.git", "https://host/.."] {
            assert!(
                matches!(derive_name(url), Err(RecipeError::InvalidSource(_))),
                "{url:?}"
            );
        }
    }

    #[test]
    fn plans_clone_into_recipes_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = plan_clone("https://example.com/r/ops.git", None, tmp.path()).unwrap();
        assert_eq!(plan.dest, tmp.path().join("ops"));
        assert_eq!(plan.invocation.program, "git");
        assert_eq!(
            plan.invocation.args,
            vec![
                "clone".to_string(),
                "https://example.com/r/ops.git".to_string(),
                tmp.path().join("ops").display().to_string(),
            ]
        );
    }

    #[test]
    fn explicit_name_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let plan = plan_clone("https://example.com/r/ops.git", Some("infra"), tmp.path()).unwrap();
        assert_eq!(plan.dest, tmp.path().join("infra"));
    }

    #[test]
    fn existing_destination_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("ops")).unwrap();
        let err = plan_clone("https://example.com/r/ops.git", None, tmp.path()).unwrap_err();
        assert!(matches!(err, RecipeError::AlreadyExists(_)));
    }

    #[test]
    fn explicit_name_must_be_plain() {
        let tmp = tempfile::tempdir().unwrap();
        let err = plan_clone("https://example.com/r/ops.git", Some("a/b"), tmp.path()).unwrap_err();
        assert!(matches!(err, RecipeError::InvalidName(_)));
    }
}
