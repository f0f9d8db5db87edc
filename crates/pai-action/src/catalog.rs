//! Action catalog: two-root, two-grammar package resolution.
//!
//! Actions live in package directories containing an `action.json` manifest.
//! Two name grammars coexist: the flat scheme (`A_EXTRACT_TOPIC`, marked by
//! the `A_` prefix) and the legacy two-segment `category/name` scheme. The
//! catalog searches a personal root before the system root, so a user can
//! shadow any system action by name without touching system files.
//!
//! A resolution miss is not a catalog error — it is `Ok(None)`, surfaced by
//! the runner as an "action not found" failure.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use pai_config::EngineConfig;
use pai_types::{ActionManifest, MANIFEST_FILE};
use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, Result};

/// Distinguishing prefix of the flat name grammar.
pub const FLAT_PREFIX: &str = "A_";

/// The ordered pair of resolution roots.
#[derive(Debug, Clone)]
pub struct ActionRoots {
    /// Personal root, consulted first.
    pub user: PathBuf,
    /// System/framework root.
    pub system: PathBuf,
}

impl ActionRoots {
    /// Create roots from explicit paths.
    pub fn new(user: impl Into<PathBuf>, system: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            system: system.into(),
        }
    }

    /// Derive roots from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            user: config.paths.user_actions_dir(),
            system: config.paths.system_actions_dir(),
        }
    }
}

/// Which root a resolution or listing entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RootKind {
    /// The personal root.
    User,
    /// The system/framework root.
    System,
}

/// A successfully resolved action package.
#[derive(Debug, Clone)]
pub struct ResolvedAction {
    /// The name the caller asked for.
    pub name: String,
    /// Package directory on disk.
    pub dir: PathBuf,
    /// The loaded manifest.
    pub manifest: ActionManifest,
    /// Root the package was found in.
    pub origin: RootKind,
}

/// One entry in a catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct ActionListing {
    /// Manifest name.
    pub name: String,
    /// Manifest version.
    pub version: String,
    /// Manifest description.
    pub description: String,
    /// Root the entry came from.
    pub origin: RootKind,
}

/// Resolves action names to package locations across the two roots.
#[derive(Debug, Clone)]
pub struct ActionCatalog {
    roots: ActionRoots,
}

impl ActionCatalog {
    /// Create a catalog over the given roots.
    pub fn new(roots: ActionRoots) -> Self {
        Self { roots }
    }

    /// Resolve an action name to its winning package.
    ///
    /// Returns `Ok(None)` when no root contains a manifest for the name —
    /// including names that fit neither grammar. A manifest that exists but
    /// fails to parse is a definition error.
    pub fn resolve(&self, name: &str) -> Result<Option<ResolvedAction>> {
        for (root, origin) in self.ordered_roots() {
            let Some(dir) = candidate_dir(root, name) else {
                return Ok(None);
            };
            let manifest_path = dir.join(MANIFEST_FILE);
            if !manifest_path.is_file() {
                continue;
            }

            let manifest = ActionManifest::from_file(&manifest_path).map_err(|e| {
                EngineError::Definition(format!(
                    "Invalid manifest at {}: {e}",
                    manifest_path.display()
                ))
            })?;

            debug!(action = %name, dir = %dir.display(), origin = ?origin, "Resolved action");
            return Ok(Some(ResolvedAction {
                name: name.to_string(),
                dir,
                manifest,
                origin,
            }));
        }

        Ok(None)
    }

    /// Enumerate every action visible under either grammar from both roots,
    /// de-duplicated by resolved name with user entries winning.
    pub fn list(&self) -> Vec<ActionListing> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut listings = Vec::new();

        for (root, origin) in self.ordered_roots() {
            scan_root(root, origin, &mut seen, &mut listings);
        }

        listings
    }

    fn ordered_roots(&self) -> [(&Path, RootKind); 2] {
        [
            (self.roots.user.as_path(), RootKind::User),
            (self.roots.system.as_path(), RootKind::System),
        ]
    }
}

/// Map a name onto its package directory under a root, or `None` when the
/// name fits neither grammar.
fn candidate_dir(root: &Path, name: &str) -> Option<PathBuf> {
    if name.starts_with(FLAT_PREFIX) {
        return Some(root.join(name));
    }

    let mut parts = name.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(category), Some(action), None) if !category.is_empty() && !action.is_empty() => {
            Some(root.join(category).join(action))
        }
        _ => None,
    }
}

/// Scan one root for packages under both grammars.
fn scan_root(
    root: &Path,
    origin: RootKind,
    seen: &mut HashSet<String>,
    listings: &mut Vec<ActionListing>,
) {
    let Ok(entries) = std::fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(dir_name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
            continue;
        };
        if dir_name == "lib" {
            continue;
        }

        if dir_name.starts_with(FLAT_PREFIX) {
            push_listing(&path, dir_name, origin, seen, listings);
        } else {
            // Legacy grammar: the directory is a category holding packages.
            let Ok(children) = std::fs::read_dir(&path) else {
                continue;
            };
            for child in children.flatten() {
                let child_path = child.path();
                if !child_path.is_dir() {
                    continue;
                }
                let Some(child_name) = child_path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let key = format!("{dir_name}/{child_name}");
                push_listing(&child_path, key, origin, seen, listings);
            }
        }
    }
}

/// Load a package's manifest and append a listing entry, skipping
/// directories without a parseable manifest.
fn push_listing(
    dir: &Path,
    key: String,
    origin: RootKind,
    seen: &mut HashSet<String>,
    listings: &mut Vec<ActionListing>,
) {
    if seen.contains(&key) {
        return;
    }
    let manifest_path = dir.join(MANIFEST_FILE);
    match ActionManifest::from_file(&manifest_path) {
        Ok(manifest) => {
            seen.insert(key);
            listings.push(ActionListing {
                name: manifest.name,
                version: manifest.version,
                description: manifest.description,
                origin,
            });
        }
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Skipping directory without a valid manifest");
        }
    }
}
