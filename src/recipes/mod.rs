//! Recipe discovery, lookup, scaffolding, and fetching.
//!
//! A recipe is a directory containing a `manifest.yaml`. Scanning the search
//! path yields a [`ScanReport`] holding the [`RecipeIndex`] plus per-file
//! [`ScanIssue`]s; nothing found during the scan is fatal on its own.
pub mod index;
pub mod manifest;
pub mod pull;
pub mod scaffold;

pub use index::{RecipeIndex, ScanReport, Shadowed, scan};
pub use manifest::{MANIFEST_FILE, Manifest, RecipeType, Runtime, ScanIssue};
