//! Audio source references
//!
//! An audio clip names its media with a descriptor string, which is one of:
//! - an absolute file path (`/media/loops/kick.wav`)
//! - a path relative to the edit file's directory (`../audio/kick.wav`)
//! - a project item id (`4215/107`) looked up in the project library
//!
//! Resolution turns a descriptor into an absolute file path. Rewriting turns a
//! file path back into a descriptor in the requested [`PathMode`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Form of a rewritten source descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMode {
    Absolute,
    Relative,
}

impl PathMode {
    /// Parse a command token: anything starting with "a" (any case) is
    /// absolute, everything else relative.
    pub fn from_token(token: &str) -> Self {
        if token
            .chars()
            .next()
            .map_or(false, |c| c.eq_ignore_ascii_case(&'a'))
        {
            PathMode::Absolute
        } else {
            PathMode::Relative
        }
    }

    pub fn is_relative(self) -> bool {
        self == PathMode::Relative
    }
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMode::Absolute => write!(f, "absolute"),
            PathMode::Relative => write!(f, "relative"),
        }
    }
}

/// Identifier of a media item managed by a project: `<project>/<item>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectItemId {
    pub project: u64,
    pub item: u64,
}

impl FromStr for ProjectItemId {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (project, item) = s.split_once('/').ok_or(())?;
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(project) || !all_digits(item) {
            return Err(());
        }
        Ok(Self {
            project: project.parse().map_err(|_| ())?,
            item: item.parse().map_err(|_| ())?,
        })
    }
}

impl fmt::Display for ProjectItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.item)
    }
}

/// The `source` descriptor of an audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceReference {
    pub source: String,
}

impl SourceReference {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Project item id, if the descriptor is one.
    pub fn project_item(&self) -> Option<ProjectItemId> {
        self.source.parse().ok()
    }

    /// Point this reference directly at `file`.
    ///
    /// With `relative` set the descriptor becomes a path relative to
    /// `edit_dir`; when there is no edit directory or no common ancestor the
    /// absolute path is written instead. `file` need not exist.
    pub fn set_to_direct_file_reference(&mut self, file: &Path, relative: bool, edit_dir: Option<&Path>) {
        let file = normalize_path(file);
        let relative_path = if relative {
            edit_dir.and_then(|dir| relative_path_from(&file, &normalize_path(dir)))
        } else {
            None
        };
        self.source = relative_path.unwrap_or_else(|| file.to_string_lossy().into_owned());
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Maps source descriptors to files.
pub trait SourceResolver {
    /// Look up a project item. `None` when the id is unknown.
    fn resolve_project_item(&self, id: ProjectItemId) -> Option<PathBuf>;

    /// Resolve a descriptor to an absolute file path.
    ///
    /// Relative paths need `edit_dir`. Whether the file exists is not checked.
    fn resolve(&self, reference: &SourceReference, edit_dir: Option<&Path>) -> Option<PathBuf> {
        let source = reference.source.trim();
        if source.is_empty() {
            return None;
        }
        if let Some(id) = reference.project_item() {
            return self.resolve_project_item(id).map(|p| normalize_path(&p));
        }

        let path = Path::new(source);
        if path.is_absolute() {
            Some(normalize_path(path))
        } else {
            edit_dir.map(|dir| normalize_path(&dir.join(path)))
        }
    }
}

/// Resolves file path descriptors only; every project item id fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl SourceResolver for PathResolver {
    fn resolve_project_item(&self, _id: ProjectItemId) -> Option<PathBuf> {
        None
    }
}

/// Known project items and the files they live in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectLibrary {
    items: BTreeMap<String, PathBuf>,
}

impl ProjectLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ProjectItemId, file: impl Into<PathBuf>) {
        self.items.insert(id.to_string(), file.into());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl SourceResolver for ProjectLibrary {
    fn resolve_project_item(&self, id: ProjectItemId) -> Option<PathBuf> {
        self.items.get(&id.to_string()).cloned()
    }
}

/// `path` made absolute against the process working directory, then
/// lexically normalized. Left relative only if the working directory is
/// unavailable.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize_path(&cwd.join(path)),
        Err(_) => normalize_path(path),
    }
}

/// Lexically remove `.` and `..` components. Does not touch the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path of `target` relative to directory `base`, with `/` separators.
///
/// Both paths must be absolute and already normalized. Returns `None` if they
/// share no ancestor (e.g. different drives) or are the same path.
pub fn relative_path_from(target: &Path, base: &Path) -> Option<String> {
    if !target.is_absolute() || !base.is_absolute() {
        return None;
    }

    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 || common == target.len() {
        return None;
    }
    // Windows paths on different drives share only the root.
    if matches!(target[0], Component::Prefix(_)) && common < 2 {
        return None;
    }

    let parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(base.len() - common)
        .chain(
            target[common..]
                .iter()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        )
        .collect();
    Some(parts.join("/"))
}
