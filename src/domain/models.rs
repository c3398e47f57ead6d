use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Opaque handle to a location in the host's file system view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderRef(PathBuf);

impl FolderRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn join(&self, name: &str) -> Self {
        Self(self.0.join(name))
    }

    /// Resolves `.` and `..` components without touching the filesystem.
    pub fn normalized(&self) -> Self {
        let mut out = PathBuf::new();
        for component in self.0.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => match out.components().next_back() {
                    Some(Component::Normal(_)) => {
                        out.pop();
                    }
                    Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                    _ => out.push(component),
                },
                other => out.push(other),
            }
        }
        if out.as_os_str().is_empty() {
            out.push(".");
        }
        Self(out)
    }

    /// Last path component, or the whole location for roots like `/`.
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl fmt::Display for FolderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for FolderRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    pub name: String,
    pub kind: FileKind,
}

impl DirEntryInfo {
    pub fn new(name: impl Into<String>, kind: FileKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFolder {
    pub name: String,
    pub folder: FolderRef,
}

impl WorkspaceFolder {
    pub fn new(folder: FolderRef) -> Self {
        Self {
            name: folder.name(),
            folder,
        }
    }
}

/// Arguments a command was invoked with: nothing, a primary folder, or a
/// primary folder plus the current multi-selection.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub primary: Option<FolderRef>,
    pub selected: Vec<FolderRef>,
}

impl Invocation {
    pub fn with_primary(mut self, folder: FolderRef) -> Self {
        self.primary = Some(folder);
        self
    }

    pub fn with_selected(mut self, folders: Vec<FolderRef>) -> Self {
        self.selected = folders;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.selected.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Selection,
    Primary,
    Workspace,
}

#[derive(Debug, Clone)]
pub struct TargetSet {
    pub source: TargetSource,
    pub folders: Vec<FolderRef>,
}

impl TargetSet {
    pub fn len(&self) -> usize {
        self.folders.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExpandConfig {
    /// Deepest level processed below a target; the target itself is depth 0.
    pub max_depth: Option<usize>,
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self { max_depth: Some(5) }
    }
}

#[derive(Debug, Default)]
pub struct ExpansionReport {
    pub visited: Vec<FolderRef>,
    pub skipped: Vec<(FolderRef, String)>,
    pub cancelled: bool,
}

impl ExpansionReport {
    pub fn merge(&mut self, other: ExpansionReport) {
        self.visited.extend(other.visited);
        self.skipped.extend(other.skipped);
        self.cancelled |= other.cancelled;
    }
}
