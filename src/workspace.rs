//! Lookup of local workspace packages by name.
//!
//! The stack only needs to know where a package lives on disk so it can point
//! at its build output. Callers build a [`WorkspacePackages`] once and pass it
//! in; [`WorkspacePackages::discover`] builds one from a javascript style
//! monorepo (`package.json` with a `workspaces` list).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{StackError, StackResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspacePackages {
    packages: BTreeMap<String, PathBuf>,
}

#[derive(Deserialize)]
struct RootManifest {
    #[serde(default)]
    workspaces: Workspaces,
}

/// `workspaces` is either a list of globs, or (yarn) an object with a
/// `packages` list.
#[derive(Deserialize)]
#[serde(untagged)]
enum Workspaces {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

impl Default for Workspaces {
    fn default() -> Self {
        Workspaces::List(vec![])
    }
}

impl Workspaces {
    fn globs(self) -> Vec<String> {
        match self {
            Workspaces::List(l) => l,
            Workspaces::Object { packages } => packages,
        }
    }
}

#[derive(Deserialize)]
struct PackageManifest {
    name: Option<String>,
}

impl WorkspacePackages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>, P: Into<PathBuf>>(&mut self, name: S, path: P) {
        self.packages.insert(name.into(), path.into());
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// the path of `name`, or [`StackError::PackageNotFound`].
    pub fn path_of(&self, name: &str) -> StackResult<&Path> {
        self.packages
            .get(name)
            .map(|p| p.as_path())
            .ok_or_else(|| StackError::PackageNotFound { package: name.to_string() })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// reads `root/package.json` and every workspace member it lists.
    /// Patterns are globs relative to `root` (`packages/*`, `packages/**`,
    /// `apps/*-site`), a leading `!` excludes. `node_modules` and hidden
    /// directories are never searched. Members without a package.json or
    /// without a name are skipped.
    pub fn discover(root: &Path) -> StackResult<Self> {
        let root_manifest_path = root.join("package.json");
        let root_manifest: RootManifest = read_json(&root_manifest_path)?;
        let patterns = MemberPatterns::new(&root_manifest.workspaces.globs(), &root_manifest_path)?;
        let mut out = Self::new();
        for dir in patterns.member_dirs(root)? {
            let manifest_path = dir.join("package.json");
            if !manifest_path.is_file() {
                continue;
            }
            let manifest: PackageManifest = read_json(&manifest_path)?;
            if let Some(name) = manifest.name {
                debug!(package = %name, path = ?dir, "found workspace package");
                out.insert(name, dir);
            }
        }
        Ok(out)
    }
}

impl<S: Into<String>, P: Into<PathBuf>> FromIterator<(S, P)> for WorkspacePackages {
    fn from_iter<T: IntoIterator<Item = (S, P)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (name, path) in iter {
            out.insert(name, path);
        }
        out
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> StackResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|source| StackError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| StackError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

struct MemberPatterns {
    include: GlobSet,
    exclude: GlobSet,
    /// None when a pattern contains `**`.
    max_depth: Option<usize>,
}

impl MemberPatterns {
    fn new(patterns: &[String], manifest_path: &Path) -> StackResult<Self> {
        let parse_err = |e: globset::Error| StackError::Parse {
            path: manifest_path.to_path_buf(),
            reason: e.to_string(),
        };
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut max_depth = Some(0);
        for pattern in patterns {
            let (negated, pattern) = match pattern.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, pattern.as_str()),
            };
            let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(parse_err)?;
            if negated {
                exclude.add(glob);
                continue;
            }
            include.add(glob);
            max_depth = match max_depth {
                _ if pattern.contains("**") => None,
                Some(depth) => Some(depth.max(pattern.split('/').count())),
                None => None,
            };
        }
        Ok(Self {
            include: include.build().map_err(parse_err)?,
            exclude: exclude.build().map_err(parse_err)?,
            max_depth,
        })
    }

    /// directories under `root` matched by an include and by no exclude,
    /// sorted by path.
    fn member_dirs(&self, root: &Path) -> StackResult<Vec<PathBuf>> {
        let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }
        let mut dirs = vec![];
        for entry in walker.into_iter().filter_entry(|e| !is_ignored_dir(e)) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                StackError::Read { path, source: e.into() }
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(root) else {
                continue;
            };
            let rel = rel.to_string_lossy().replace('\\', "/");
            if self.include.is_match(&rel) && !self.exclude.is_match(&rel) {
                dirs.push(entry.into_path());
            }
        }
        Ok(dirs)
    }
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.depth() > 0 && entry.file_type().is_dir() && (name == "node_modules" || name.starts_with('.'))
}
